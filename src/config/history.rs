//! Bounded processing history.
//!
//! Entries are kept most-recent-first and the list never grows past
//! [`HISTORY_LIMIT`]; older entries are dropped on insertion.

use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

/// Maximum number of entries kept in [`AppConfig::history`](super::AppConfig).
pub const HISTORY_LIMIT: usize = 20;

/// One completed run: what was sent, what came back, and with which model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    /// Payload sent to the model (selection with any `::suffix` stripped).
    pub original: String,
    /// Text delivered back to the clipboard.
    pub result: String,
    /// Milliseconds since the Unix epoch.
    pub timestamp_ms: u64,
    /// Model identifier that produced `result`.
    pub model: String,
}

impl HistoryEntry {
    /// Build an entry stamped with the current wall-clock time.
    pub fn now(
        original: impl Into<String>,
        result: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        let timestamp_ms = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0);

        Self {
            original: original.into(),
            result: result.into(),
            timestamp_ms,
            model: model.into(),
        }
    }
}

/// Prepend `entry` and truncate to [`HISTORY_LIMIT`].
pub fn push_history(history: &mut Vec<HistoryEntry>, entry: HistoryEntry) {
    history.insert(0, entry);
    history.truncate(HISTORY_LIMIT);
}
