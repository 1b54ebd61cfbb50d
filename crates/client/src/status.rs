//! Save-state types for one deal room editing session.

use serde::{Deserialize, Serialize};

use dealflow_core::types::Timestamp;

/// The draft buffer: an open field-name to value mapping, held in memory
/// until flushed to the draft store or discarded.
pub type DraftData = serde_json::Map<String, serde_json::Value>;

/// Where the editing session currently stands relative to the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DraftStatus {
    Saved,
    Saving,
    Unsaved,
    Error,
    Conflict,
}

/// Mutable save state owned by a single [`AutosaveController`] instance
/// and mutated only through its operations.
///
/// [`AutosaveController`]: crate::autosave::AutosaveController
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveStatus {
    pub status: DraftStatus,
    /// Time of the last successful manual save or publish.
    pub last_saved: Option<Timestamp>,
    /// Time of the last successful deferred auto-save.
    pub last_auto_save: Option<Timestamp>,
    pub has_unsaved_changes: bool,
    /// Server-assigned draft version, starting at 0.
    pub version: u64,
    pub error: Option<String>,
    pub conflict_id: Option<String>,
}

impl Default for SaveStatus {
    fn default() -> Self {
        Self {
            status: DraftStatus::Saved,
            last_saved: None,
            last_auto_save: None,
            has_unsaved_changes: false,
            version: 0,
            error: None,
            conflict_id: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_state_is_saved_with_no_changes() {
        let status = SaveStatus::default();
        assert_eq!(status.status, DraftStatus::Saved);
        assert!(!status.has_unsaved_changes);
        assert_eq!(status.version, 0);
        assert!(status.error.is_none());
        assert!(status.conflict_id.is_none());
    }

    #[test]
    fn status_serializes_lowercase() {
        let json = serde_json::to_string(&DraftStatus::Unsaved).unwrap();
        assert_eq!(json, "\"unsaved\"");
        let parsed: DraftStatus = serde_json::from_str("\"conflict\"").unwrap();
        assert_eq!(parsed, DraftStatus::Conflict);
    }
}
