//! Flag-value parsing for command arguments, with terminal-friendly errors.

use crate::output::CliError;
use garb_core::ErrorCode;
use garb_core::model::Status;
use std::str::FromStr;

#[derive(Debug, Clone)]
pub struct ValidationError {
    pub field: &'static str,
    pub value: String,
    pub reason: String,
}

impl ValidationError {
    pub fn new(field: &'static str, value: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            field,
            value: value.into(),
            reason: reason.into(),
        }
    }

    pub fn to_cli_error(&self) -> CliError {
        CliError::with_code(
            format!("invalid {} '{}': {}", self.field, self.value, self.reason),
            ErrorCode::ValidationFailed,
        )
    }
}

/// Parse a money amount (`49`, `49.9`, `$49.99`) into cents.
pub fn parse_cost(s: &str) -> Result<i64, ValidationError> {
    garb_core::rules::parse_money(s).ok_or_else(|| {
        ValidationError::new(
            "cost",
            s,
            "expected a dollar amount like 49, 49.99, or $49.99",
        )
    })
}

/// Parse an ISO-8601 calendar date (`2024-06-15`).
pub fn parse_date(s: &str) -> Result<chrono::NaiveDate, ValidationError> {
    chrono::NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
        .map_err(|_| ValidationError::new("date", s, "expected an ISO date like 2024-06-15"))
}

/// Parse a lifecycle status name.
pub fn parse_status(s: &str) -> Result<Status, ValidationError> {
    Status::from_str(s).map_err(|reason| ValidationError::new("status", s, reason))
}

/// Parse a garment id, trimming surrounding whitespace.
pub fn parse_garment_id(s: &str) -> Result<garb_core::model::GarmentId, ValidationError> {
    garb_core::model::GarmentId::parse(s.trim())
        .map_err(|reason| ValidationError::new("garment id", s, reason))
}

/// Parse a tag id.
pub fn parse_tag_id(s: &str) -> Result<garb_core::model::TagId, ValidationError> {
    garb_core::model::TagId::parse(s.trim())
        .map_err(|reason| ValidationError::new("tag id", s, reason))
}

/// Parse a collection id.
pub fn parse_collection_id(s: &str) -> Result<garb_core::model::CollectionId, ValidationError> {
    garb_core::model::CollectionId::parse(s.trim())
        .map_err(|reason| ValidationError::new("collection id", s, reason))
}

/// Parse a `field:op:value` rule triplet as accepted by `gb rule set` and
/// `gb collection create --rule`. The value may itself contain colons.
pub fn parse_rule_arg(s: &str) -> Result<garb_core::rules::Rule, ValidationError> {
    let mut parts = s.splitn(3, ':');
    let field = parts.next().unwrap_or_default();
    let op = parts.next().unwrap_or_default();
    let value = parts.next().unwrap_or_default();
    if op.is_empty() || value.is_empty() {
        return Err(ValidationError::new(
            "rule",
            s,
            "expected field:op:value, e.g. category:equals:Shirts",
        ));
    }
    garb_core::rules::Rule::parse(field, op, value)
        .map_err(|e| ValidationError::new("rule", s, e.to_string()))
}
