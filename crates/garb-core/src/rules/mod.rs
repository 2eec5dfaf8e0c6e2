//! Smart-collection rules.
//!
//! Rules are persisted as loose `field` / `operator` / `value` strings but
//! re-armed into closed enums ([`RuleField`], [`RuleOp`]) the moment they
//! cross into the core, so the evaluator can match exhaustively instead of
//! string-comparing per garment. [`Rule::parse`] is the single validation
//! point: a triplet that parses here is structurally valid forever after,
//! and the evaluator never errors on it. A *stored* triplet that no longer
//! parses (e.g. a field name from an older schema) surfaces as a validation
//! error at load time, which the synchronizer reports per collection.

pub mod eval;

pub use eval::{evaluate, format_cost, matches, parse_money};

use crate::error::Error;
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// Delimiter between candidates in an `in-set` rule value.
pub const IN_SET_DELIMITER: char = ',';

/// A garment attribute a rule can query.
///
/// `Tags` is the one set-valued field: it tests the garment's tag *names*
/// rather than a single scalar, and gets its own evaluator path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleField {
    Name,
    Category,
    Material,
    Color,
    Size,
    Brand,
    Status,
    Notes,
    Care,
    Cost,
    Purchased,
    Tags,
}

impl RuleField {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Category => "category",
            Self::Material => "material",
            Self::Color => "color",
            Self::Size => "size",
            Self::Brand => "brand",
            Self::Status => "status",
            Self::Notes => "notes",
            Self::Care => "care",
            Self::Cost => "cost",
            Self::Purchased => "purchased",
            Self::Tags => "tags",
        }
    }

    /// All fields, for help output and validation messages.
    pub const ALL: [Self; 12] = [
        Self::Name,
        Self::Category,
        Self::Material,
        Self::Color,
        Self::Size,
        Self::Brand,
        Self::Status,
        Self::Notes,
        Self::Care,
        Self::Cost,
        Self::Purchased,
        Self::Tags,
    ];
}

impl fmt::Display for RuleField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RuleField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "name" => Ok(Self::Name),
            "category" => Ok(Self::Category),
            "material" => Ok(Self::Material),
            "color" | "colour" => Ok(Self::Color),
            "size" => Ok(Self::Size),
            "brand" => Ok(Self::Brand),
            "status" => Ok(Self::Status),
            "notes" => Ok(Self::Notes),
            "care" | "care_instructions" => Ok(Self::Care),
            "cost" => Ok(Self::Cost),
            "purchased" | "purchase_date" => Ok(Self::Purchased),
            "tags" | "tag" => Ok(Self::Tags),
            other => Err(format!(
                "unknown rule field '{other}': expected one of name, category, material, \
                 color, size, brand, status, notes, care, cost, purchased, tags"
            )),
        }
    }
}

/// A rule operator.
///
/// `NotEquals` and `NotContains` are the exact negations of `Equals` and
/// `Contains` for every input, including absent garment values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RuleOp {
    Equals,
    NotEquals,
    Contains,
    NotContains,
    StartsWith,
    EndsWith,
    InSet,
}

impl RuleOp {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Equals => "equals",
            Self::NotEquals => "not-equals",
            Self::Contains => "contains",
            Self::NotContains => "not-contains",
            Self::StartsWith => "starts-with",
            Self::EndsWith => "ends-with",
            Self::InSet => "in-set",
        }
    }

    /// All operators, for help output and validation messages.
    pub const ALL: [Self; 7] = [
        Self::Equals,
        Self::NotEquals,
        Self::Contains,
        Self::NotContains,
        Self::StartsWith,
        Self::EndsWith,
        Self::InSet,
    ];
}

impl fmt::Display for RuleOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RuleOp {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "equals" | "eq" | "is" => Ok(Self::Equals),
            "not-equals" | "not_equals" | "ne" | "is-not" => Ok(Self::NotEquals),
            "contains" | "has" => Ok(Self::Contains),
            "not-contains" | "not_contains" | "lacks" => Ok(Self::NotContains),
            "starts-with" | "starts_with" | "prefix" => Ok(Self::StartsWith),
            "ends-with" | "ends_with" | "suffix" => Ok(Self::EndsWith),
            "in-set" | "in_set" | "in" | "one-of" => Ok(Self::InSet),
            other => Err(format!(
                "unknown rule operator '{other}': expected one of equals, not-equals, \
                 contains, not-contains, starts-with, ends-with, in-set"
            )),
        }
    }
}

/// A single field/operator/value predicate over a garment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rule {
    pub field: RuleField,
    pub op: RuleOp,
    pub value: String,
}

impl Rule {
    /// Re-arm a loose string triplet into a validated rule.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] naming the violated constraint when the
    /// field or operator is unknown, the value is empty, or an `in-set`
    /// value has no non-empty candidates.
    pub fn parse(field: &str, op: &str, value: &str) -> Result<Self, Error> {
        let field = RuleField::from_str(field).map_err(|e| Error::validation("rule field", e))?;
        let op = RuleOp::from_str(op).map_err(|e| Error::validation("rule operator", e))?;

        if value.trim().is_empty() {
            return Err(Error::validation(
                "rule value",
                "must not be empty".to_string(),
            ));
        }

        if op == RuleOp::InSet && in_set_candidates(value).next().is_none() {
            return Err(Error::validation(
                "rule value",
                format!("in-set needs at least one candidate between '{IN_SET_DELIMITER}' delimiters"),
            ));
        }

        Ok(Self {
            field,
            op,
            value: value.to_string(),
        })
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {:?}", self.field, self.op, self.value)
    }
}

/// Iterate the trimmed, non-empty candidates of an `in-set` rule value.
pub fn in_set_candidates(value: &str) -> impl Iterator<Item = &str> {
    value
        .split(IN_SET_DELIMITER)
        .map(str::trim)
        .filter(|c| !c.is_empty())
}
