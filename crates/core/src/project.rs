//! Project entity model, form validation, and derived KPIs.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::{DbId, Timestamp};

/// Maximum length of a project name or legal project name.
pub const MAX_PROJECT_NAME_LENGTH: usize = 255;

/// Maximum number of decimal places for unit calculations.
pub const MAX_UNIT_PRECISION: i32 = 10;

/// Fundraising window for a project.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Timeframe {
    pub start_date: Timestamp,
    pub end_date: Timestamp,
}

/// Aggregate investment totals (used for both commitments and
/// reservations). Always replaced wholesale, never merged field-by-field.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvestmentTotals {
    pub total_amount: f64,
    pub investor_count: i64,
}

/// A fundraising project.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: DbId,
    pub project_name: String,
    pub legal_project_name: String,
    /// Decimal places used when computing unit counts, 0..=10.
    pub unit_calculation_precision: i32,
    pub target_amount: f64,
    pub minimum_investment: Option<f64>,
    /// ISO 4217 currency code, e.g. `EUR`.
    pub currency: String,
    pub timeframe: Timeframe,
    pub commitments: InvestmentTotals,
    pub reservations: InvestmentTotals,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for updating an existing project. All fields are optional;
/// commitments and reservations have dedicated setters instead.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProject {
    pub project_name: Option<String>,
    pub legal_project_name: Option<String>,
    pub unit_calculation_precision: Option<i32>,
    pub target_amount: Option<f64>,
    pub minimum_investment: Option<Option<f64>>,
    pub currency: Option<String>,
    pub timeframe: Option<Timeframe>,
}

impl Project {
    /// Create a new project with zeroed commitment and reservation totals.
    pub fn new(
        id: DbId,
        project_name: String,
        legal_project_name: String,
        target_amount: f64,
        currency: String,
        timeframe: Timeframe,
    ) -> Self {
        let now = chrono::Utc::now();
        Self {
            id,
            project_name,
            legal_project_name,
            unit_calculation_precision: 2,
            target_amount,
            minimum_investment: None,
            currency,
            timeframe,
            commitments: InvestmentTotals::default(),
            reservations: InvestmentTotals::default(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Apply a partial update. Refreshes `updated_at` unconditionally.
    pub fn apply_update(&mut self, update: UpdateProject) {
        if let Some(name) = update.project_name {
            self.project_name = name;
        }
        if let Some(legal) = update.legal_project_name {
            self.legal_project_name = legal;
        }
        if let Some(precision) = update.unit_calculation_precision {
            self.unit_calculation_precision = precision;
        }
        if let Some(target) = update.target_amount {
            self.target_amount = target;
        }
        if let Some(minimum) = update.minimum_investment {
            self.minimum_investment = minimum;
        }
        if let Some(currency) = update.currency {
            self.currency = currency;
        }
        if let Some(timeframe) = update.timeframe {
            self.timeframe = timeframe;
        }
        self.updated_at = chrono::Utc::now();
    }

    /// Replace the commitment totals wholesale. Rejects negative amounts
    /// or counts.
    pub fn set_commitments(&mut self, totals: InvestmentTotals) -> Result<(), CoreError> {
        check_totals(&totals)?;
        self.commitments = totals;
        self.updated_at = chrono::Utc::now();
        Ok(())
    }

    /// Replace the reservation totals wholesale. Rejects negative amounts
    /// or counts.
    pub fn set_reservations(&mut self, totals: InvestmentTotals) -> Result<(), CoreError> {
        check_totals(&totals)?;
        self.reservations = totals;
        self.updated_at = chrono::Utc::now();
        Ok(())
    }

    /// Compute derived KPIs from the current snapshot.
    pub fn kpis(&self) -> ProjectKpis {
        ProjectKpis::from_project(self)
    }
}

fn check_totals(totals: &InvestmentTotals) -> Result<(), CoreError> {
    if totals.total_amount < 0.0 {
        return Err(CoreError::Validation(
            "Total amount must not be negative".to_string(),
        ));
    }
    if totals.investor_count < 0 {
        return Err(CoreError::Validation(
            "Investor count must not be negative".to_string(),
        ));
    }
    Ok(())
}

/// Form data for creating or editing a project, as submitted by the UI.
/// Dates are optional here because the form may be partially filled.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectForm {
    pub project_name: String,
    pub legal_project_name: String,
    pub unit_calculation_precision: i32,
    pub target_amount: f64,
    pub minimum_investment: Option<f64>,
    pub currency: String,
    pub start_date: Option<Timestamp>,
    pub end_date: Option<Timestamp>,
}

/// Validate a project form. Returns one message per violated rule; an
/// empty list means the form is valid. Every rule is evaluated, so the
/// caller sees all violations at once.
pub fn validate_project(form: &ProjectForm) -> Vec<String> {
    let mut errors = Vec::new();

    if form.project_name.trim().is_empty() {
        errors.push("Project name is required".to_string());
    } else if form.project_name.chars().count() > MAX_PROJECT_NAME_LENGTH {
        errors.push(format!(
            "Project name must be at most {MAX_PROJECT_NAME_LENGTH} characters"
        ));
    }

    if form.legal_project_name.trim().is_empty() {
        errors.push("Legal project name is required".to_string());
    } else if form.legal_project_name.chars().count() > MAX_PROJECT_NAME_LENGTH {
        errors.push(format!(
            "Legal project name must be at most {MAX_PROJECT_NAME_LENGTH} characters"
        ));
    }

    if form.target_amount <= 0.0 {
        errors.push("Target amount must be greater than zero".to_string());
    }

    if let Some(minimum) = form.minimum_investment {
        if minimum < 0.0 {
            errors.push("Minimum investment must not be negative".to_string());
        } else if minimum > form.target_amount {
            errors.push("Minimum investment must not exceed the target amount".to_string());
        }
    }

    if form.unit_calculation_precision < 0 || form.unit_calculation_precision > MAX_UNIT_PRECISION {
        errors.push(format!(
            "Unit calculation precision must be between 0 and {MAX_UNIT_PRECISION}"
        ));
    }

    match (form.start_date, form.end_date) {
        (None, None) => {
            errors.push("Start date is required".to_string());
            errors.push("End date is required".to_string());
        }
        (None, Some(_)) => errors.push("Start date is required".to_string()),
        (Some(_), None) => errors.push("End date is required".to_string()),
        (Some(start), Some(end)) => {
            if start >= end {
                errors.push("Start date must be before end date".to_string());
            }
        }
    }

    errors
}

/// Derived project KPIs. Computed on demand, never stored.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectKpis {
    /// Committed amount as a percentage of the target (0-100+).
    pub committed_percent: f64,
    /// Reserved amount as a percentage of the target (0-100+).
    pub reserved_percent: f64,
    /// Amount still needed to reach the target; never below zero.
    pub remaining_amount: f64,
    /// Committed plus reserved investors.
    pub total_investors: i64,
    /// Average committed amount per committed investor.
    pub average_commitment: f64,
}

impl ProjectKpis {
    /// Compute KPIs from a project snapshot. Guards against zero targets
    /// and zero investor counts rather than producing NaN.
    pub fn from_project(project: &Project) -> Self {
        let target = project.target_amount;
        let committed = project.commitments.total_amount;
        let reserved = project.reservations.total_amount;

        let percent_of_target = |amount: f64| {
            if target > 0.0 {
                amount / target * 100.0
            } else {
                0.0
            }
        };

        let average_commitment = if project.commitments.investor_count > 0 {
            committed / project.commitments.investor_count as f64
        } else {
            0.0
        };

        Self {
            committed_percent: percent_of_target(committed),
            reserved_percent: percent_of_target(reserved),
            remaining_amount: (target - committed).max(0.0),
            total_investors: project.commitments.investor_count
                + project.reservations.investor_count,
            average_commitment,
        }
    }
}
