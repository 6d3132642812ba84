use std::fmt;

use report_core::EnvelopeKeys;
use serde::{Deserialize, Serialize};

/// Entity lists the dashboard reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntitySource {
    Orders,
    Users,
    Brands,
    Models,
    Problems,
}

impl EntitySource {
    pub const ALL: [EntitySource; 5] = [
        EntitySource::Orders,
        EntitySource::Users,
        EntitySource::Brands,
        EntitySource::Models,
        EntitySource::Problems,
    ];

    pub fn path(self) -> &'static str {
        match self {
            Self::Orders => "admin/orders",
            Self::Users => "admin/users",
            Self::Brands => "admin/brands",
            Self::Models => "admin/models",
            Self::Problems => "admin/problems",
        }
    }

    /// Plural key the API may wrap this entity's list in.
    pub fn plural(self) -> &'static str {
        match self {
            Self::Orders => "orders",
            Self::Users => "users",
            Self::Brands => "brands",
            Self::Models => "models",
            Self::Problems => "problems",
        }
    }

    /// Envelope key lookup order for this entity's payloads.
    pub fn envelope_keys(self) -> EnvelopeKeys<'static> {
        let domain: &'static [&'static str] = match self {
            Self::Orders => &["orders"],
            Self::Users => &["users"],
            Self::Brands => &["brands"],
            Self::Models => &["models"],
            Self::Problems => &["problems"],
        };
        EnvelopeKeys::with_domain(domain)
    }
}

impl fmt::Display for EntitySource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.plural())
    }
}
