//! Typed, fail-open view over a [`KeyValueStore`].
//!
//! Read failures are reported as "nothing stored" and write failures are
//! logged and skipped. A broken store can therefore only make a popup show
//! once more than intended; it can never take the page down.

use serde::{Deserialize, Serialize};
use tracing::warn;

use super::KeyValueStore;
use crate::error::StorageError;

/// Persisted under a popup's storage key in durable storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuppressionRecord {
    pub last_shown_at_epoch_ms: u64,
}

impl SuppressionRecord {
    /// Accepts the JSON form and a bare millisecond timestamp.
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        if let Ok(record) = serde_json::from_str::<SuppressionRecord>(raw) {
            return Some(record);
        }
        raw.parse::<u64>().ok().map(|ms| SuppressionRecord {
            last_shown_at_epoch_ms: ms,
        })
    }
}

pub struct SuppressionStore<'a> {
    store: &'a mut dyn KeyValueStore,
}

impl<'a> SuppressionStore<'a> {
    pub fn new(store: &'a mut dyn KeyValueStore) -> Self {
        Self { store }
    }

    /// Last time the popup behind `key` was shown, if known.
    pub fn last_shown(&self, key: &str) -> Option<SuppressionRecord> {
        let raw = self.read(key)?;
        let record = SuppressionRecord::parse(&raw);
        if record.is_none() {
            let err = StorageError::Corrupt {
                key: key.to_string(),
                message: format!("unparseable suppression record: {raw:?}"),
            };
            warn!(error = %err, "ignoring stored suppression record");
        }
        record
    }

    /// Persist `last_shown_at_epoch_ms = now_ms`. Returns whether it stuck.
    pub fn record_shown(&mut self, key: &str, now_ms: u64) -> bool {
        let record = SuppressionRecord {
            last_shown_at_epoch_ms: now_ms,
        };
        match serde_json::to_string(&record) {
            Ok(value) => self.write(key, &value),
            Err(err) => {
                warn!(key, error = %err, "failed to encode suppression record");
                false
            }
        }
    }

    pub fn is_flag_set(&self, key: &str) -> bool {
        matches!(self.read(key).as_deref(), Some("true") | Some("1"))
    }

    pub fn set_flag(&mut self, key: &str) -> bool {
        self.write(key, "true")
    }

    pub fn clear(&mut self, key: &str) -> bool {
        match self.store.remove(key) {
            Ok(()) => true,
            Err(err) => {
                warn!(key, error = %err, "storage remove failed; skipping");
                false
            }
        }
    }

    fn read(&self, key: &str) -> Option<String> {
        match self.store.get(key) {
            Ok(value) => value,
            Err(err) => {
                warn!(key, error = %err, "storage read failed; treating as unset");
                None
            }
        }
    }

    fn write(&mut self, key: &str, value: &str) -> bool {
        match self.store.set(key, value) {
            Ok(()) => true,
            Err(err) => {
                warn!(key, error = %err, "storage write failed; skipping");
                false
            }
        }
    }
}
