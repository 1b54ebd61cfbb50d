//! Deal Room entity model and form validation.
//!
//! A deal room is the investor-facing content page of a project: a
//! showcase photo, short blurb, long summary, and two ordered link
//! collections (key info and external links).

use serde::{Deserialize, Serialize};
use url::Url;

use crate::types::{DbId, Timestamp};
use crate::validation::ValidationOutcome;

/// Maximum length of the investment blurb.
pub const MAX_BLURB_LENGTH: usize = 500;

/// Maximum length of the investment summary.
pub const MAX_SUMMARY_LENGTH: usize = 10_000;

/// Accepted showcase photo mime types (with or without an `image/` prefix).
pub const ALLOWED_PHOTO_TYPES: &[&str] = &["jpeg", "jpg", "png", "webp"];

/// One entry in the deal room's key info list.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyInfoItem {
    pub id: String,
    pub name: String,
    pub link: String,
    /// Display position, non-negative. Uniqueness is not enforced.
    pub order: i32,
}

/// One entry in the deal room's external links list.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExternalLink {
    pub id: String,
    pub name: String,
    pub url: String,
    pub order: i32,
}

impl KeyInfoItem {
    /// Create an item with a fresh opaque id.
    pub fn new(name: String, link: String, order: i32) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            name,
            link,
            order,
        }
    }
}

impl ExternalLink {
    /// Create a link with a fresh opaque id.
    pub fn new(name: String, url: String, order: i32) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            name,
            url,
            order,
        }
    }
}

/// Metadata for an uploaded showcase photo.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShowcasePhoto {
    pub filename: String,
    pub original_name: String,
    pub mime_type: String,
    pub size: i64,
    pub uploaded_at: Timestamp,
}

/// The deal room content entity.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DealRoom {
    pub id: DbId,
    pub project_id: DbId,
    pub showcase_photo: Option<ShowcasePhoto>,
    pub investment_blurb: String,
    pub investment_summary: String,
    pub key_info: Vec<KeyInfoItem>,
    pub external_links: Vec<ExternalLink>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for partially updating a deal room.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateDealRoom {
    pub showcase_photo: Option<Option<ShowcasePhoto>>,
    pub investment_blurb: Option<String>,
    pub investment_summary: Option<String>,
    pub key_info: Option<Vec<KeyInfoItem>>,
    pub external_links: Option<Vec<ExternalLink>>,
}

impl DealRoom {
    /// Create an empty deal room for a project.
    pub fn new(id: DbId, project_id: DbId) -> Self {
        let now = chrono::Utc::now();
        Self {
            id,
            project_id,
            showcase_photo: None,
            investment_blurb: String::new(),
            investment_summary: String::new(),
            key_info: Vec::new(),
            external_links: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Apply a partial update. Refreshes `updated_at` unconditionally.
    pub fn apply_update(&mut self, update: UpdateDealRoom) {
        if let Some(photo) = update.showcase_photo {
            self.showcase_photo = photo;
        }
        if let Some(blurb) = update.investment_blurb {
            self.investment_blurb = blurb;
        }
        if let Some(summary) = update.investment_summary {
            self.investment_summary = summary;
        }
        if let Some(key_info) = update.key_info {
            self.key_info = key_info;
        }
        if let Some(links) = update.external_links {
            self.external_links = links;
        }
        self.updated_at = chrono::Utc::now();
    }
}

/// Showcase photo fields as they arrive from the upload form, before the
/// upload timestamp has been parsed.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShowcasePhotoForm {
    pub filename: String,
    pub original_name: String,
    pub mime_type: String,
    pub size: i64,
    /// RFC 3339 timestamp string from the upload widget.
    pub uploaded_at: String,
}

/// Deal room form data as submitted by the editor.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DealRoomForm {
    pub showcase_photo: Option<ShowcasePhotoForm>,
    pub investment_blurb: String,
    pub investment_summary: String,
    pub key_info: Vec<KeyInfoItem>,
    pub external_links: Vec<ExternalLink>,
}

/// Validate a deal room form. Every rule runs; per-item messages are
/// indexed from 1 to match what the editor displays.
pub fn validate_deal_room(form: &DealRoomForm) -> ValidationOutcome {
    let mut errors = Vec::new();

    // Limits are in characters, not bytes; multibyte text must not be
    // penalized.
    if form.investment_blurb.chars().count() > MAX_BLURB_LENGTH {
        errors.push(format!(
            "Investment blurb must be at most {MAX_BLURB_LENGTH} characters"
        ));
    }
    if form.investment_summary.chars().count() > MAX_SUMMARY_LENGTH {
        errors.push(format!(
            "Investment summary must be at most {MAX_SUMMARY_LENGTH} characters"
        ));
    }

    for (index, item) in form.key_info.iter().enumerate() {
        validate_link_entry(
            &mut errors,
            "Key info item",
            index + 1,
            &item.name,
            &item.link,
            item.order,
        );
    }
    for (index, link) in form.external_links.iter().enumerate() {
        validate_link_entry(
            &mut errors,
            "External link",
            index + 1,
            &link.name,
            &link.url,
            link.order,
        );
    }

    if let Some(photo) = &form.showcase_photo {
        validate_showcase_photo(&mut errors, photo);
    }

    ValidationOutcome::from_errors(errors)
}

/// Shared rules for key info items and external links.
fn validate_link_entry(
    errors: &mut Vec<String>,
    label: &str,
    position: usize,
    name: &str,
    url: &str,
    order: i32,
) {
    if name.trim().is_empty() {
        errors.push(format!("{label} {position}: name is required"));
    }
    if Url::parse(url).is_err() {
        errors.push(format!("{label} {position}: link is not a valid URL"));
    }
    if order < 0 {
        errors.push(format!("{label} {position}: order must be non-negative"));
    }
}

fn validate_showcase_photo(errors: &mut Vec<String>, photo: &ShowcasePhotoForm) {
    if photo.filename.trim().is_empty() {
        errors.push("Showcase photo: filename is required".to_string());
    }
    if photo.original_name.trim().is_empty() {
        errors.push("Showcase photo: original name is required".to_string());
    }
    if !is_allowed_photo_type(&photo.mime_type) {
        errors.push(format!(
            "Showcase photo: type must be one of {}",
            ALLOWED_PHOTO_TYPES.join(", ")
        ));
    }
    if photo.size <= 0 {
        errors.push("Showcase photo: size must be positive".to_string());
    }
    if chrono::DateTime::parse_from_rfc3339(&photo.uploaded_at).is_err() {
        errors.push("Showcase photo: upload timestamp is invalid".to_string());
    }
}

/// Accepts `png` as well as `image/png` style mime types.
fn is_allowed_photo_type(mime_type: &str) -> bool {
    let lowered = mime_type.to_lowercase();
    let subtype = lowered.strip_prefix("image/").unwrap_or(&lowered);
    ALLOWED_PHOTO_TYPES.contains(&subtype)
}
