use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeLevel {
    Info,
    Warning,
    Error,
}

/// A transient, user-facing message about a load.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    /// Sequence number of the request the notice is about.
    pub seq: u64,
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn error(seq: u64, message: impl Into<String>) -> Self {
        Self {
            seq,
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }
}

/// A bounded channel for load notices
///
/// Uses `try_send` so a slow consumer never stalls a load. When the channel
/// is full the notice is dropped and counted.
pub struct NoticeBus {
    tx: mpsc::Sender<Notice>,
    dropped: Arc<AtomicU64>,
}

impl NoticeBus {
    /// Returns the bus and the receiver the presentation layer reads from.
    pub fn new(capacity: usize) -> (Self, mpsc::Receiver<Notice>) {
        let (tx, rx) = mpsc::channel(capacity);
        (
            Self {
                tx,
                dropped: Arc::new(AtomicU64::new(0)),
            },
            rx,
        )
    }

    pub fn publish(&self, notice: Notice) {
        if self.tx.try_send(notice).is_err() {
            self.dropped.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn dropped_count(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }

    /// Check if the receiver has been dropped.
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

impl Clone for NoticeBus {
    fn clone(&self) -> Self {
        Self {
            tx: self.tx.clone(),
            dropped: Arc::clone(&self.dropped),
        }
    }
}
