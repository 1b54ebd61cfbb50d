//! Save outcomes emitted by the autosave controller.
//!
//! Instead of wiring success/error/conflict callbacks into the controller,
//! each operation returns its outcome and also broadcasts it on a
//! [`tokio::sync::broadcast`] channel. Call
//! [`AutosaveController::subscribe`] to receive events; dispatching them
//! to UI handlers is the composition layer's job.
//!
//! [`AutosaveController::subscribe`]: crate::autosave::AutosaveController::subscribe

use serde::Serialize;

/// Outcome of a save, publish, or recovery operation.
#[derive(Debug, Clone, Serialize)]
pub enum SaveEvent {
    /// A save or publish reached the store. Carries the server payload.
    SaveSucceeded {
        version: u64,
        data: serde_json::Value,
    },

    /// A save or publish failed locally (validation) or remotely.
    SaveFailed { message: String },

    /// The store rejected the save with a version conflict. Resolution is
    /// external; the controller never retries.
    ConflictDetected { conflict_id: Option<String> },

    /// A draft left behind by a prior session was recovered.
    DraftRecovered { version: u64 },
}
