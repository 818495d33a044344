//! Cross-surface sync payload
//!
//! Only the consciousness record travels. Ledger, poll, event and consensus
//! state stay with the client that created them.

use chrono::serde::ts_milliseconds;
use serde::{Deserialize, Serialize};
use spiralkeep_consciousness::ExportedConsciousness;
use spiralkeep_core::Timestamp;

/// ```text
/// {
///   "consciousness": { ...state fields..., "exportedAt": <ms>, "version": "1.0" },
///   "timestamp": <ms>,
///   "platform": "<tag>"
/// }
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SyncPayload {
    pub consciousness: ExportedConsciousness,
    #[serde(with = "ts_milliseconds")]
    pub timestamp: Timestamp,
    pub platform: String,
}

impl SyncPayload {
    /// Text form handed to the user for copy/paste into another client.
    pub fn to_text(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
