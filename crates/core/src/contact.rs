//! Contact entity model and form validation.

use serde::{Deserialize, Serialize};

use crate::types::{DbId, Timestamp};
use crate::validation::ValidationOutcome;

/// Maximum length of a contact name field.
pub const MAX_CONTACT_NAME_LENGTH: usize = 255;

/// A person attached to a project (issuer representative, advisor, ...).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Contact {
    pub id: DbId,
    pub project_id: DbId,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub role: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for partially updating a contact.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateContact {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<Option<String>>,
    pub role: Option<Option<String>>,
}

impl Contact {
    pub fn new(
        id: DbId,
        project_id: DbId,
        first_name: String,
        last_name: String,
        email: String,
    ) -> Self {
        let now = chrono::Utc::now();
        Self {
            id,
            project_id,
            first_name,
            last_name,
            email,
            phone: None,
            role: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Apply a partial update. Refreshes `updated_at` unconditionally.
    pub fn apply_update(&mut self, update: UpdateContact) {
        if let Some(first) = update.first_name {
            self.first_name = first;
        }
        if let Some(last) = update.last_name {
            self.last_name = last;
        }
        if let Some(email) = update.email {
            self.email = email;
        }
        if let Some(phone) = update.phone {
            self.phone = phone;
        }
        if let Some(role) = update.role {
            self.role = role;
        }
        self.updated_at = chrono::Utc::now();
    }
}

/// Contact form data as submitted by the UI.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactForm {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub role: Option<String>,
}

/// Validate a contact form. Every rule runs before returning.
pub fn validate_contact(form: &ContactForm) -> ValidationOutcome {
    let mut errors = Vec::new();

    if form.first_name.trim().is_empty() {
        errors.push("First name is required".to_string());
    } else if form.first_name.chars().count() > MAX_CONTACT_NAME_LENGTH {
        errors.push(format!(
            "First name must be at most {MAX_CONTACT_NAME_LENGTH} characters"
        ));
    }

    if form.last_name.trim().is_empty() {
        errors.push("Last name is required".to_string());
    } else if form.last_name.chars().count() > MAX_CONTACT_NAME_LENGTH {
        errors.push(format!(
            "Last name must be at most {MAX_CONTACT_NAME_LENGTH} characters"
        ));
    }

    if form.email.trim().is_empty() {
        errors.push("Email is required".to_string());
    } else if !looks_like_email(&form.email) {
        errors.push("Email address is not valid".to_string());
    }

    ValidationOutcome::from_errors(errors)
}

/// Minimal shape check: one `@`, non-empty local part, and a dot in the
/// domain. Full RFC 5322 parsing is deliberately out of scope.
fn looks_like_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty() && domain.contains('.') && !domain.starts_with('.') && !domain.ends_with('.')
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_form() -> ContactForm {
        ContactForm {
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            email: "ada@example.com".to_string(),
            phone: None,
            role: Some("CFO".to_string()),
        }
    }

    #[test]
    fn valid_contact_passes() {
        assert!(validate_contact(&valid_form()).is_valid);
    }

    #[test]
    fn missing_names_and_email_all_reported() {
        let outcome = validate_contact(&ContactForm::default());
        assert_eq!(outcome.errors.len(), 3);
    }

    #[test]
    fn malformed_email_rejected() {
        for email in ["ada", "ada@", "@example.com", "ada@example", "ada@.com"] {
            let form = ContactForm {
                email: email.to_string(),
                ..valid_form()
            };
            assert!(!validate_contact(&form).is_valid, "{email} should fail");
        }
    }

    #[test]
    fn update_replaces_optional_fields() {
        let mut contact = Contact::new(
            1,
            2,
            "Ada".to_string(),
            "Lovelace".to_string(),
            "ada@example.com".to_string(),
        );
        contact.apply_update(UpdateContact {
            phone: Some(Some("+44 20 7946 0000".to_string())),
            role: Some(None),
            ..UpdateContact::default()
        });
        assert_eq!(contact.phone.as_deref(), Some("+44 20 7946 0000"));
        assert!(contact.role.is_none());
    }
}
