//! Debt/equity class entity model and form validation.
//!
//! Each project offers one or more investment classes. Debt classes carry
//! an interest rate; equity classes do not.

use serde::{Deserialize, Serialize};

use crate::types::{DbId, Timestamp};
use crate::validation::ValidationOutcome;

/// Maximum length of a class name.
pub const MAX_CLASS_NAME_LENGTH: usize = 255;

/// Kind of investment class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClassKind {
    Debt,
    Equity,
}

/// An investment class offered by a project.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DebtEquityClass {
    pub id: DbId,
    pub project_id: DbId,
    pub name: String,
    pub kind: ClassKind,
    pub unit_price: f64,
    pub units_total: i64,
    /// Annual interest rate in percent; present for debt classes only.
    pub interest_rate: Option<f64>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for partially updating a class.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateDebtEquityClass {
    pub name: Option<String>,
    pub unit_price: Option<f64>,
    pub units_total: Option<i64>,
    pub interest_rate: Option<Option<f64>>,
}

impl DebtEquityClass {
    pub fn new(
        id: DbId,
        project_id: DbId,
        name: String,
        kind: ClassKind,
        unit_price: f64,
        units_total: i64,
    ) -> Self {
        let now = chrono::Utc::now();
        Self {
            id,
            project_id,
            name,
            kind,
            unit_price,
            units_total,
            interest_rate: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Apply a partial update. Refreshes `updated_at` unconditionally.
    pub fn apply_update(&mut self, update: UpdateDebtEquityClass) {
        if let Some(name) = update.name {
            self.name = name;
        }
        if let Some(price) = update.unit_price {
            self.unit_price = price;
        }
        if let Some(units) = update.units_total {
            self.units_total = units;
        }
        if let Some(rate) = update.interest_rate {
            self.interest_rate = rate;
        }
        self.updated_at = chrono::Utc::now();
    }
}

/// Class form data as submitted by the UI.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DebtEquityClassForm {
    pub name: String,
    pub kind: ClassKind,
    pub unit_price: f64,
    pub units_total: i64,
    pub interest_rate: Option<f64>,
}

/// Validate a class form. Every rule runs before returning.
pub fn validate_debt_equity_class(form: &DebtEquityClassForm) -> ValidationOutcome {
    let mut errors = Vec::new();

    if form.name.trim().is_empty() {
        errors.push("Class name is required".to_string());
    } else if form.name.chars().count() > MAX_CLASS_NAME_LENGTH {
        errors.push(format!(
            "Class name must be at most {MAX_CLASS_NAME_LENGTH} characters"
        ));
    }

    if form.unit_price <= 0.0 {
        errors.push("Unit price must be greater than zero".to_string());
    }

    if form.units_total < 0 {
        errors.push("Total units must not be negative".to_string());
    }

    match (form.kind, form.interest_rate) {
        (ClassKind::Debt, None) => {
            errors.push("Interest rate is required for debt classes".to_string());
        }
        (ClassKind::Debt, Some(rate)) => {
            if !(0.0..=100.0).contains(&rate) {
                errors.push("Interest rate must be between 0 and 100".to_string());
            }
        }
        (ClassKind::Equity, Some(_)) => {
            errors.push("Equity classes must not have an interest rate".to_string());
        }
        (ClassKind::Equity, None) => {}
    }

    ValidationOutcome::from_errors(errors)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn debt_form() -> DebtEquityClassForm {
        DebtEquityClassForm {
            name: "Series A Bond".to_string(),
            kind: ClassKind::Debt,
            unit_price: 1_000.0,
            units_total: 500,
            interest_rate: Some(5.5),
        }
    }

    #[test]
    fn valid_debt_class_passes() {
        assert!(validate_debt_equity_class(&debt_form()).is_valid);
    }

    #[test]
    fn debt_without_rate_rejected() {
        let form = DebtEquityClassForm {
            interest_rate: None,
            ..debt_form()
        };
        let outcome = validate_debt_equity_class(&form);
        assert_eq!(
            outcome.errors,
            vec!["Interest rate is required for debt classes"]
        );
    }

    #[test]
    fn equity_with_rate_rejected() {
        let form = DebtEquityClassForm {
            kind: ClassKind::Equity,
            ..debt_form()
        };
        let outcome = validate_debt_equity_class(&form);
        assert_eq!(
            outcome.errors,
            vec!["Equity classes must not have an interest rate"]
        );
    }

    #[test]
    fn rate_out_of_range_rejected() {
        for rate in [-0.1, 100.1] {
            let form = DebtEquityClassForm {
                interest_rate: Some(rate),
                ..debt_form()
            };
            assert!(!validate_debt_equity_class(&form).is_valid);
        }
    }

    #[test]
    fn zero_unit_price_rejected() {
        let form = DebtEquityClassForm {
            unit_price: 0.0,
            ..debt_form()
        };
        let outcome = validate_debt_equity_class(&form);
        assert!(outcome.errors[0].contains("greater than zero"));
    }

    #[test]
    fn update_can_clear_interest_rate() {
        let mut class = DebtEquityClass::new(
            1,
            2,
            "Series A Bond".to_string(),
            ClassKind::Debt,
            1_000.0,
            500,
        );
        class.apply_update(UpdateDebtEquityClass {
            interest_rate: Some(Some(4.75)),
            ..UpdateDebtEquityClass::default()
        });
        assert_eq!(class.interest_rate, Some(4.75));
    }
}
