//! Envelope normalization
//!
//! The admin API wraps lists inconsistently: bare arrays, `{data: [...]}`,
//! `{users: [...]}`, `{items: [...], total, skip, take}` and so on. This
//! module unwraps any of them into the ordered record sequence.
//!
//! Probe order for objects:
//! 1. `data`
//! 2. the caller's domain keys, in the order given (e.g. `orders`)
//! 3. `items`
//! 4. the first array-valued property in document order
//!
//! A shape that matches none of these is an empty list, never an error.

use serde_json::Value;

const DATA_KEY: &str = "data";
const ITEMS_KEY: &str = "items";

/// Priority-ordered keys tried on an enveloped payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnvelopeKeys<'a> {
    domain: &'a [&'a str],
}

impl<'a> EnvelopeKeys<'a> {
    /// Only the generic `data` / `items` keys.
    pub const GENERIC: EnvelopeKeys<'static> = EnvelopeKeys { domain: &[] };

    pub const fn with_domain(domain: &'a [&'a str]) -> Self {
        Self { domain }
    }

    /// Every named key in lookup order.
    pub fn key_order(&self) -> impl Iterator<Item = &'a str> + '_ {
        std::iter::once(DATA_KEY)
            .chain(self.domain.iter().copied())
            .chain(std::iter::once(ITEMS_KEY))
    }
}

/// Borrow the record sequence out of `payload`.
///
/// An array payload is returned as-is, so the result points at the very
/// same elements.
pub fn extract_records<'v>(payload: &'v Value, keys: EnvelopeKeys<'_>) -> &'v [Value] {
    match payload {
        Value::Array(records) => records.as_slice(),
        Value::Object(map) => keys
            .key_order()
            .find_map(|key| map.get(key).and_then(Value::as_array))
            .or_else(|| map.values().find_map(Value::as_array))
            .map(Vec::as_slice)
            .unwrap_or(&[]),
        _ => &[],
    }
}

/// Owning variant of [`extract_records`]; moves the array out of the payload
/// instead of cloning it.
pub fn into_records(payload: Value, keys: EnvelopeKeys<'_>) -> Vec<Value> {
    match payload {
        Value::Array(records) => records,
        Value::Object(mut map) => {
            let named = keys
                .key_order()
                .find(|key| map.get(*key).map_or(false, Value::is_array));
            let key = match named {
                Some(key) => Some(key.to_string()),
                None => map
                    .iter()
                    .find(|(_, value)| value.is_array())
                    .map(|(key, _)| key.clone()),
            };
            match key.and_then(|key| map.remove(&key)) {
                Some(Value::Array(records)) => records,
                _ => Vec::new(),
            }
        }
        _ => Vec::new(),
    }
}
