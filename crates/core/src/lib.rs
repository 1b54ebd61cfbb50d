//! Domain layer for the dealflow fundraising platform.
//!
//! Pure types and validation logic with no internal dependencies, so it
//! can be used by the draft-store client, the API layer, and any future
//! CLI tooling alike: entity models (projects, deal rooms, contacts,
//! documents, debt/equity classes), field-level form validators, URL
//! normalization, and derived project KPIs.

pub mod contact;
pub mod deal_room;
pub mod debt_equity_class;
pub mod document;
pub mod error;
pub mod project;
pub mod types;
pub mod url_validation;
pub mod validation;
