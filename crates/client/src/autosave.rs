//! Draft/auto-save orchestration for one deal room editing session.
//!
//! [`AutosaveController`] owns the session's [`SaveStatus`] and pending
//! draft buffer, debounces auto-saves (cancel-then-arm, so only the most
//! recent payload ever reaches the store), performs manual saves and
//! publishes, detects version conflicts, and recovers drafts left behind
//! by a crashed session.
//!
//! One controller per editing context. The state is never shared across
//! contexts; dropping the controller cancels any armed timer.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{broadcast, Mutex};
use tokio_util::sync::CancellationToken;

use dealflow_core::types::{DbId, Timestamp};
use dealflow_core::validation::ValidationOutcome;

use crate::api::{DraftApiError, DraftSaved, DraftStoreApi, RemoteSaveStatus};
use crate::events::SaveEvent;
use crate::status::{DraftData, DraftStatus, SaveStatus};

/// Broadcast channel capacity for save events.
const EVENT_CHANNEL_CAPACITY: usize = 64;

/// Tunable parameters for the auto-save behavior.
#[derive(Debug, Clone)]
pub struct AutosaveConfig {
    /// Quiet period after the last edit before a deferred save fires.
    pub debounce_interval: Duration,
}

impl Default for AutosaveConfig {
    fn default() -> Self {
        Self {
            debounce_interval: Duration::from_secs(2),
        }
    }
}

/// Validation hook run before any draft reaches the store.
pub type DraftValidator = dyn Fn(&DraftData) -> ValidationOutcome + Send + Sync;

/// Orchestrates saving one deal room draft against the remote store.
///
/// Cloning is cheap and hands out another handle to the same session
/// state (needed so the deferred-save task can reach it).
#[derive(Clone)]
pub struct AutosaveController {
    shared: Arc<Shared>,
}

struct Shared {
    api: DraftStoreApi,
    project_id: DbId,
    /// Opaque session identifier supplied by the caller.
    session_id: String,
    config: AutosaveConfig,
    validator: Option<Arc<DraftValidator>>,
    inner: Mutex<Inner>,
    event_tx: broadcast::Sender<SaveEvent>,
    /// Master token; child tokens guard armed debounce timers.
    cancel: CancellationToken,
}

struct Inner {
    status: SaveStatus,
    /// Latest draft buffer awaiting a save.
    pending: Option<DraftData>,
    /// Token for the currently armed debounce timer, if any.
    debounce: Option<CancellationToken>,
    /// True while a network save or publish is running. The deferred
    /// timer skips its pass instead of starting a second request.
    save_in_flight: bool,
}

impl Drop for Shared {
    fn drop(&mut self) {
        // Tears down any armed timer task via its child token.
        self.cancel.cancel();
    }
}

impl AutosaveController {
    /// Create a controller for one project's deal room draft.
    pub fn new(api: DraftStoreApi, project_id: DbId, session_id: String) -> Self {
        Self::with_config(api, project_id, session_id, AutosaveConfig::default())
    }

    /// Create a controller with explicit timing parameters.
    pub fn with_config(
        api: DraftStoreApi,
        project_id: DbId,
        session_id: String,
        config: AutosaveConfig,
    ) -> Self {
        let (event_tx, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            shared: Arc::new(Shared {
                api,
                project_id,
                session_id,
                config,
                validator: None,
                inner: Mutex::new(Inner {
                    status: SaveStatus::default(),
                    pending: None,
                    debounce: None,
                    save_in_flight: false,
                }),
                event_tx,
                cancel: CancellationToken::new(),
            }),
        }
    }

    /// Install a validator that gates every save. Must be called before
    /// the controller is cloned or shared.
    pub fn with_validator(
        mut self,
        validator: impl Fn(&DraftData) -> ValidationOutcome + Send + Sync + 'static,
    ) -> Self {
        match Arc::get_mut(&mut self.shared) {
            Some(shared) => shared.validator = Some(Arc::new(validator)),
            None => {
                tracing::warn!("with_validator called on a shared controller; validator ignored");
            }
        }
        self
    }

    /// Subscribe to save events. Dispatching them to UI callbacks is the
    /// composition layer's responsibility.
    pub fn subscribe(&self) -> broadcast::Receiver<SaveEvent> {
        self.shared.event_tx.subscribe()
    }

    /// Snapshot of the current save state.
    pub async fn save_status(&self) -> SaveStatus {
        self.shared.inner.lock().await.status.clone()
    }

    /// Fetch remote save status and attempt draft recovery, concurrently.
    ///
    /// Called once when the editing context mounts. Either call failing is
    /// logged and swallowed; initialization never fails visibly. Returns a
    /// recovered draft for the caller to merge into the editor, if any.
    pub async fn initialize(&self) -> Option<DraftData> {
        let (status_result, recovered) = tokio::join!(
            self.shared
                .api
                .get_save_status(self.shared.project_id, &self.shared.session_id),
            self.recover_unsaved_changes(),
        );

        match status_result {
            Ok(Some(remote)) => self.merge_remote_status(remote).await,
            Ok(None) => {}
            Err(error) => {
                tracing::warn!(
                    project_id = self.shared.project_id,
                    error = %error,
                    "Failed to fetch save status",
                );
            }
        }

        recovered
    }

    /// Record an edit and arm the debounce timer.
    ///
    /// The draft is stored as pending and sent after
    /// [`AutosaveConfig::debounce_interval`] of quiet. Re-arming cancels
    /// the previous timer, so only the most recent payload is ever sent.
    /// Status moves to `Unsaved` only from `Saved`; error and conflict
    /// states are preserved for the user to act on.
    pub async fn queue_auto_save(&self, data: DraftData) {
        let token = {
            let mut inner = self.shared.inner.lock().await;
            inner.pending = Some(data);
            inner.status.has_unsaved_changes = true;
            if inner.status.status == DraftStatus::Saved {
                inner.status.status = DraftStatus::Unsaved;
            }
            if let Some(previous) = inner.debounce.take() {
                previous.cancel();
            }
            let token = self.shared.cancel.child_token();
            inner.debounce = Some(token.clone());
            token
        };

        let controller = self.clone();
        let interval = self.shared.config.debounce_interval;
        tokio::spawn(async move {
            tokio::select! {
                _ = token.cancelled() => {}
                _ = tokio::time::sleep(interval) => {
                    controller.run_deferred_save().await;
                }
            }
        });
    }

    /// Save the draft now, awaited by the caller.
    ///
    /// A configured validator runs first; on failure the store is never
    /// contacted and the status moves to `Error` with an aggregated
    /// message. The returned event is also broadcast to subscribers.
    pub async fn save_draft(&self, data: DraftData) -> SaveEvent {
        if let Some(message) = self.failed_validation(&data) {
            return self.fail_locally(message).await;
        }

        {
            let mut inner = self.shared.inner.lock().await;
            inner.pending = Some(data.clone());
            inner.status.status = DraftStatus::Saving;
            inner.save_in_flight = true;
        }

        let result = self
            .shared
            .api
            .save_draft(self.shared.project_id, &self.shared.session_id, &data, false)
            .await;
        self.finish_save(result, false).await
    }

    /// Promote the current draft to the published record.
    ///
    /// A 404 from the store means there is no draft to publish and maps
    /// to a fixed user-facing message; a 409 is handled exactly like a
    /// save conflict.
    pub async fn publish_draft(&self, change_description: Option<&str>) -> SaveEvent {
        {
            let mut inner = self.shared.inner.lock().await;
            inner.status.status = DraftStatus::Saving;
            inner.save_in_flight = true;
        }

        let result = self
            .shared
            .api
            .publish_draft(
                self.shared.project_id,
                &self.shared.session_id,
                change_description,
            )
            .await;

        let mut inner = self.shared.inner.lock().await;
        inner.save_in_flight = false;
        let event = match result {
            Ok(version) => {
                inner.status.status = DraftStatus::Saved;
                inner.status.last_saved = Some(chrono::Utc::now());
                inner.status.version = version;
                inner.status.has_unsaved_changes = false;
                inner.status.error = None;
                inner.status.conflict_id = None;
                inner.pending = None;
                SaveEvent::SaveSucceeded {
                    version,
                    data: serde_json::json!({ "version": { "version": version } }),
                }
            }
            Err(DraftApiError::Conflict { conflict_id }) => {
                inner.status.status = DraftStatus::Conflict;
                inner.status.conflict_id = conflict_id.clone();
                SaveEvent::ConflictDetected { conflict_id }
            }
            Err(DraftApiError::NotFound) => {
                let message = "No draft found to publish".to_string();
                inner.status.status = DraftStatus::Error;
                inner.status.error = Some(message.clone());
                inner.status.conflict_id = None;
                SaveEvent::SaveFailed { message }
            }
            Err(error) => {
                let message = error.to_string();
                inner.status.status = DraftStatus::Error;
                inner.status.error = Some(message.clone());
                inner.status.conflict_id = None;
                SaveEvent::SaveFailed { message }
            }
        };
        drop(inner);

        self.emit(event.clone());
        event
    }

    /// Ask the store for a draft left behind by a prior session.
    ///
    /// On success the state is marked unsaved at the recovered version and
    /// the draft is returned for the caller to merge. No recoverable data,
    /// or any failure, yields `None` and leaves the state untouched;
    /// failures are logged, never surfaced as save errors.
    pub async fn recover_unsaved_changes(&self) -> Option<DraftData> {
        let result = self
            .shared
            .api
            .recover_changes(self.shared.project_id, &self.shared.session_id)
            .await;

        match result {
            Ok(Some(recovered)) => {
                {
                    let mut inner = self.shared.inner.lock().await;
                    inner.status.has_unsaved_changes = true;
                    inner.status.status = DraftStatus::Unsaved;
                    inner.status.version = recovered.version;
                }
                self.emit(SaveEvent::DraftRecovered {
                    version: recovered.version,
                });
                Some(recovered.draft_data)
            }
            Ok(None) => None,
            Err(error) => {
                tracing::warn!(
                    project_id = self.shared.project_id,
                    error = %error,
                    "Draft recovery failed",
                );
                None
            }
        }
    }

    /// Discard the pending draft and any armed timer, and reset to a
    /// clean saved state. Never contacts the store.
    pub async fn clear_draft(&self) {
        let mut inner = self.shared.inner.lock().await;
        inner.pending = None;
        if let Some(timer) = inner.debounce.take() {
            timer.cancel();
        }
        inner.status.status = DraftStatus::Saved;
        inner.status.has_unsaved_changes = false;
        inner.status.error = None;
    }

    /// Manual status override for UI-driven spinners.
    ///
    /// `true` forces `Saving`; `false` resolves to `Unsaved` or `Saved`
    /// depending on whether changes are pending. No other field changes.
    pub async fn set_saving(&self, saving: bool) {
        let mut inner = self.shared.inner.lock().await;
        inner.status.status = if saving {
            DraftStatus::Saving
        } else if inner.status.has_unsaved_changes {
            DraftStatus::Unsaved
        } else {
            DraftStatus::Saved
        };
    }

    /// Cancel any armed timer and stop the controller.
    pub fn shutdown(&self) {
        self.shared.cancel.cancel();
    }

    // ---- private helpers ----

    /// Body of the debounce timer: runs once the quiet period elapses.
    async fn run_deferred_save(&self) {
        let data = {
            let mut inner = self.shared.inner.lock().await;
            inner.debounce = None;
            if inner.save_in_flight {
                // A save is already running; pending stays queued for the
                // next edit or manual save.
                return;
            }
            match inner.pending.clone() {
                Some(data) => data,
                None => return,
            }
        };

        if let Some(message) = self.failed_validation(&data) {
            self.fail_locally(message).await;
            return;
        }

        {
            let mut inner = self.shared.inner.lock().await;
            inner.save_in_flight = true;
            inner.status.status = DraftStatus::Saving;
        }

        let result = self
            .shared
            .api
            .save_draft(self.shared.project_id, &self.shared.session_id, &data, true)
            .await;
        self.finish_save(result, true).await;
    }

    /// Shared tail of manual and deferred saves. Auto-saves stamp
    /// `last_auto_save`, manual saves stamp `last_saved`.
    async fn finish_save(
        &self,
        result: Result<DraftSaved, DraftApiError>,
        is_auto_save: bool,
    ) -> SaveEvent {
        let mut inner = self.shared.inner.lock().await;
        inner.save_in_flight = false;
        let event = match result {
            Ok(saved) => {
                inner.status.status = DraftStatus::Saved;
                inner.status.version = saved.version;
                inner.status.has_unsaved_changes = false;
                inner.status.error = None;
                inner.status.conflict_id = None;
                let now = chrono::Utc::now();
                if is_auto_save {
                    inner.status.last_auto_save = Some(now);
                } else {
                    inner.status.last_saved = Some(now);
                }
                inner.pending = None;
                let version = saved.version;
                let data = serde_json::to_value(&saved).unwrap_or(serde_json::Value::Null);
                SaveEvent::SaveSucceeded { version, data }
            }
            Err(DraftApiError::Conflict { conflict_id }) => {
                inner.status.status = DraftStatus::Conflict;
                inner.status.conflict_id = conflict_id.clone();
                SaveEvent::ConflictDetected { conflict_id }
            }
            Err(error) => {
                let message = error.to_string();
                inner.status.status = DraftStatus::Error;
                inner.status.error = Some(message.clone());
                inner.status.conflict_id = None;
                SaveEvent::SaveFailed { message }
            }
        };
        drop(inner);

        self.emit(event.clone());
        event
    }

    /// Run the configured validator; `Some(message)` means the save must
    /// not reach the store.
    fn failed_validation(&self, data: &DraftData) -> Option<String> {
        let validator = self.shared.validator.as_ref()?;
        let outcome = validator(data);
        if outcome.is_valid {
            None
        } else {
            Some(format!("Validation failed: {}", outcome.joined()))
        }
    }

    /// Record a local (pre-network) failure and broadcast it.
    async fn fail_locally(&self, message: String) -> SaveEvent {
        {
            let mut inner = self.shared.inner.lock().await;
            inner.status.status = DraftStatus::Error;
            inner.status.error = Some(message.clone());
        }
        let event = SaveEvent::SaveFailed { message };
        self.emit(event.clone());
        event
    }

    /// Merge a remote save-status snapshot into local state, converting
    /// wire timestamps to structured ones.
    async fn merge_remote_status(&self, remote: RemoteSaveStatus) {
        let mut inner = self.shared.inner.lock().await;
        if let Some(status) = remote.status {
            inner.status.status = status;
        }
        if let Some(last_saved) = remote.last_saved.as_deref().and_then(parse_wire_timestamp) {
            inner.status.last_saved = Some(last_saved);
        }
        if let Some(last_auto_save) = remote
            .last_auto_save
            .as_deref()
            .and_then(parse_wire_timestamp)
        {
            inner.status.last_auto_save = Some(last_auto_save);
        }
        if let Some(has_unsaved) = remote.has_unsaved_changes {
            inner.status.has_unsaved_changes = has_unsaved;
        }
        if let Some(version) = remote.version {
            inner.status.version = version;
        }
    }

    fn emit(&self, event: SaveEvent) {
        // No subscribers is fine; events are advisory.
        let _ = self.shared.event_tx.send(event);
    }
}

/// Parse an RFC 3339 wire timestamp, discarding anything malformed.
fn parse_wire_timestamp(value: &str) -> Option<Timestamp> {
    chrono::DateTime::parse_from_rfc3339(value)
        .ok()
        .map(|parsed| parsed.with_timezone(&chrono::Utc))
}
