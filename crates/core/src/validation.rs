//! Shared return shape for entity form validators.
//!
//! Every validator runs all of its rules before returning, so a single
//! pass reports every violation rather than stopping at the first one.

use serde::Serialize;

/// Result of validating one entity form.
#[derive(Debug, Clone, Serialize)]
pub struct ValidationOutcome {
    pub is_valid: bool,
    /// One human-readable message per violated rule, in rule order.
    pub errors: Vec<String>,
}

impl ValidationOutcome {
    /// Build an outcome from a collected error list. An empty list means
    /// the form is valid.
    pub fn from_errors(errors: Vec<String>) -> Self {
        Self {
            is_valid: errors.is_empty(),
            errors,
        }
    }

    /// All errors joined with `", "`, suitable for a single user-facing
    /// message.
    pub fn joined(&self) -> String {
        self.errors.join(", ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_error_list_is_valid() {
        let outcome = ValidationOutcome::from_errors(vec![]);
        assert!(outcome.is_valid);
        assert!(outcome.errors.is_empty());
    }

    #[test]
    fn errors_make_outcome_invalid() {
        let outcome = ValidationOutcome::from_errors(vec!["a".into(), "b".into()]);
        assert!(!outcome.is_valid);
        assert_eq!(outcome.joined(), "a, b");
    }
}
