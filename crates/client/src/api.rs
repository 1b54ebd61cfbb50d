//! REST client for the deal room draft store.
//!
//! Wraps the draft-store HTTP endpoints (save status, crash recovery,
//! draft save, publish) using [`reqwest`]. The store is consumed as a
//! black box; protocol-level outcomes (409 conflict, 404 missing draft)
//! are surfaced as dedicated error variants so the caller can branch on
//! them without inspecting status codes.

use serde::{Deserialize, Serialize};

use dealflow_core::types::DbId;

use crate::status::{DraftData, DraftStatus};

/// HTTP client for a single draft store.
pub struct DraftStoreApi {
    client: reqwest::Client,
    base_url: String,
}

/// Errors from the draft store REST layer.
#[derive(Debug, thiserror::Error)]
pub enum DraftApiError {
    /// The HTTP request itself failed (network, DNS, TLS, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The store detected a version conflict (HTTP 409).
    #[error("draft conflict detected")]
    Conflict {
        /// Conflict identifier from the response's error payload, used by
        /// the external resolution flow.
        conflict_id: Option<String>,
    },

    /// The requested draft does not exist (HTTP 404).
    #[error("draft not found")]
    NotFound,

    /// The store returned any other non-2xx status code.
    #[error("draft store error ({status}): {body}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Raw response body for debugging.
        body: String,
    },
}

/// Standard `{success, data}` envelope used by the store.
#[derive(Debug, Deserialize)]
struct Envelope<T> {
    #[serde(default)]
    success: bool,
    data: Option<T>,
}

/// Error payload on a 409 response: `{"error": {"conflictId": "..."}}`.
#[derive(Debug, Deserialize)]
struct ConflictEnvelope {
    error: Option<ConflictInfo>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConflictInfo {
    conflict_id: Option<String>,
}

/// Save-status fields as reported by the store. Timestamps arrive as
/// RFC 3339 strings and are converted by the controller on merge.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteSaveStatus {
    pub status: Option<DraftStatus>,
    pub last_saved: Option<String>,
    pub last_auto_save: Option<String>,
    pub has_unsaved_changes: Option<bool>,
    pub version: Option<u64>,
}

/// A draft recovered from a prior session.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecoveredDraft {
    pub draft_data: DraftData,
    pub version: u64,
}

/// Response data for a successful draft save.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DraftSaved {
    pub version: u64,
    /// Any additional fields the store includes alongside the version.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Response data for a successful publish: the version is nested one
/// level deeper than on a plain save.
#[derive(Debug, Deserialize)]
struct PublishData {
    version: PublishVersion,
}

#[derive(Debug, Deserialize)]
struct PublishVersion {
    version: u64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SaveDraftBody<'a> {
    session_id: &'a str,
    draft_data: &'a DraftData,
    is_auto_save: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PublishBody<'a> {
    session_id: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    change_description: Option<&'a str>,
}

impl DraftStoreApi {
    /// Create a new API client.
    ///
    /// * `base_url` - Base HTTP URL, e.g. `https://app.example.com`.
    pub fn new(base_url: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url,
        }
    }

    /// Create an API client reusing an existing [`reqwest::Client`]
    /// (useful for connection pooling across editors).
    pub fn with_client(client: reqwest::Client, base_url: String) -> Self {
        Self { client, base_url }
    }

    /// Fetch the current save status for a project's deal room draft.
    ///
    /// Sends `GET /api/projects/{id}/deal-room/save-status?sessionId=`.
    pub async fn get_save_status(
        &self,
        project_id: DbId,
        session_id: &str,
    ) -> Result<Option<RemoteSaveStatus>, DraftApiError> {
        let response = self
            .client
            .get(format!(
                "{}/api/projects/{}/deal-room/save-status",
                self.base_url, project_id
            ))
            .query(&[("sessionId", session_id)])
            .send()
            .await?;

        let envelope: Envelope<RemoteSaveStatus> = Self::parse_response(response).await?;
        Ok(envelope.data)
    }

    /// Look for a draft left behind by a prior session.
    ///
    /// Sends `GET /api/projects/{id}/deal-room/recover-changes?sessionId=`.
    /// Returns `None` when the store reports no recoverable data.
    pub async fn recover_changes(
        &self,
        project_id: DbId,
        session_id: &str,
    ) -> Result<Option<RecoveredDraft>, DraftApiError> {
        let response = self
            .client
            .get(format!(
                "{}/api/projects/{}/deal-room/recover-changes",
                self.base_url, project_id
            ))
            .query(&[("sessionId", session_id)])
            .send()
            .await?;

        let envelope: Envelope<RecoveredDraft> = Self::parse_response(response).await?;
        if envelope.success {
            Ok(envelope.data)
        } else {
            Ok(None)
        }
    }

    /// Persist the draft buffer.
    ///
    /// Sends `POST /api/projects/{id}/deal-room/draft`. A 409 response is
    /// returned as [`DraftApiError::Conflict`] with the conflict id from
    /// the error payload.
    pub async fn save_draft(
        &self,
        project_id: DbId,
        session_id: &str,
        draft_data: &DraftData,
        is_auto_save: bool,
    ) -> Result<DraftSaved, DraftApiError> {
        let body = SaveDraftBody {
            session_id,
            draft_data,
            is_auto_save,
        };

        let response = self
            .client
            .post(format!(
                "{}/api/projects/{}/deal-room/draft",
                self.base_url, project_id
            ))
            .json(&body)
            .send()
            .await?;

        let envelope: Envelope<DraftSaved> = Self::parse_response(response).await?;
        envelope.data.ok_or(DraftApiError::Api {
            status: 200,
            body: "save response missing data".to_string(),
        })
    }

    /// Promote the current draft to the published record.
    ///
    /// Sends `POST /api/projects/{id}/deal-room/draft/publish`. A 404
    /// (no draft to publish) maps to [`DraftApiError::NotFound`], a 409
    /// to [`DraftApiError::Conflict`]. Returns the new published version.
    pub async fn publish_draft(
        &self,
        project_id: DbId,
        session_id: &str,
        change_description: Option<&str>,
    ) -> Result<u64, DraftApiError> {
        let body = PublishBody {
            session_id,
            change_description,
        };

        let response = self
            .client
            .post(format!(
                "{}/api/projects/{}/deal-room/draft/publish",
                self.base_url, project_id
            ))
            .json(&body)
            .send()
            .await?;

        let envelope: Envelope<PublishData> = Self::parse_response(response).await?;
        let data = envelope.data.ok_or(DraftApiError::Api {
            status: 200,
            body: "publish response missing data".to_string(),
        })?;
        Ok(data.version.version)
    }

    // ---- private helpers ----

    /// Map a non-success response to the matching error variant, reading
    /// the conflict id out of 409 bodies.
    async fn ensure_success(
        response: reqwest::Response,
    ) -> Result<reqwest::Response, DraftApiError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "<unreadable body>".to_string());

        match status.as_u16() {
            409 => {
                let conflict_id = serde_json::from_str::<ConflictEnvelope>(&body)
                    .ok()
                    .and_then(|envelope| envelope.error)
                    .and_then(|info| info.conflict_id);
                Err(DraftApiError::Conflict { conflict_id })
            }
            404 => Err(DraftApiError::NotFound),
            _ => Err(DraftApiError::Api {
                status: status.as_u16(),
                body,
            }),
        }
    }

    /// Parse a successful JSON response body into the expected type.
    async fn parse_response<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, DraftApiError> {
        let response = Self::ensure_success(response).await?;
        Ok(response.json::<T>().await?)
    }
}
