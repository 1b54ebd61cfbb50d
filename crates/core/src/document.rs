//! Document entity model and upload validation.

use serde::{Deserialize, Serialize};

use crate::types::{DbId, Timestamp};
use crate::validation::ValidationOutcome;

/// Accepted document mime types (full type strings).
pub const ALLOWED_DOCUMENT_TYPES: &[&str] = &[
    "application/pdf",
    "application/msword",
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
    "application/vnd.ms-excel",
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
    "text/plain",
    "text/csv",
];

/// A file attached to a project (prospectus, term sheet, report, ...).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    pub id: DbId,
    pub project_id: DbId,
    /// Storage key assigned by the upload handler.
    pub filename: String,
    /// Name the user uploaded the file under.
    pub original_name: String,
    pub mime_type: String,
    pub size: i64,
    pub uploaded_at: Timestamp,
    pub category: Option<String>,
}

impl Document {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: DbId,
        project_id: DbId,
        filename: String,
        original_name: String,
        mime_type: String,
        size: i64,
        uploaded_at: Timestamp,
    ) -> Self {
        Self {
            id,
            project_id,
            filename,
            original_name,
            mime_type,
            size,
            uploaded_at,
            category: None,
        }
    }
}

/// Upload form data for a document, before timestamp parsing.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentForm {
    pub filename: String,
    pub original_name: String,
    pub mime_type: String,
    pub size: i64,
    /// RFC 3339 timestamp string from the upload widget.
    pub uploaded_at: String,
    pub category: Option<String>,
}

/// Validate a document upload form. Every rule runs before returning.
pub fn validate_document(form: &DocumentForm) -> ValidationOutcome {
    let mut errors = Vec::new();

    if form.filename.trim().is_empty() {
        errors.push("Document filename is required".to_string());
    }
    if form.original_name.trim().is_empty() {
        errors.push("Document original name is required".to_string());
    }
    if !ALLOWED_DOCUMENT_TYPES.contains(&form.mime_type.to_lowercase().as_str()) {
        errors.push("Document type is not supported".to_string());
    }
    if form.size <= 0 {
        errors.push("Document size must be positive".to_string());
    }
    if chrono::DateTime::parse_from_rfc3339(&form.uploaded_at).is_err() {
        errors.push("Document upload timestamp is invalid".to_string());
    }

    ValidationOutcome::from_errors(errors)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_form() -> DocumentForm {
        DocumentForm {
            filename: "f9a2.pdf".to_string(),
            original_name: "prospectus.pdf".to_string(),
            mime_type: "application/pdf".to_string(),
            size: 1_048_576,
            uploaded_at: "2026-03-01T09:30:00Z".to_string(),
            category: Some("legal".to_string()),
        }
    }

    #[test]
    fn valid_document_passes() {
        assert!(validate_document(&valid_form()).is_valid);
    }

    #[test]
    fn unsupported_type_rejected() {
        let form = DocumentForm {
            mime_type: "application/x-executable".to_string(),
            ..valid_form()
        };
        let outcome = validate_document(&form);
        assert_eq!(outcome.errors, vec!["Document type is not supported"]);
    }

    #[test]
    fn empty_form_reports_every_rule() {
        let outcome = validate_document(&DocumentForm::default());
        assert_eq!(outcome.errors.len(), 5);
    }
}
