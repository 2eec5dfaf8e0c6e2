//! Pure rule evaluation over garment snapshots.
//!
//! Everything here is side-effect-free: functions read a [`Garment`] and
//! never touch storage, so [`matches`] may short-circuit freely.
//!
//! Semantics:
//! - all string comparisons are case-insensitive (Unicode lowercasing);
//! - an absent optional value fails every positive operator and therefore
//!   *passes* `not-equals` / `not-contains`, keeping the negative operators
//!   exact negations of their positive counterparts;
//! - `cost` compares numerically (cents) for `equals` / `not-equals` and as
//!   its display string for every other operator;
//! - `tags` rules pass when *any* of the garment's tag names satisfies the
//!   operator test; a garment with no tags fails every tags rule.

use super::{Rule, RuleField, RuleOp, in_set_candidates};
use crate::model::Garment;

/// True when the garment satisfies **every** rule in the set.
///
/// An empty rule set matches nothing: a smart collection with zero rules
/// has zero derived members rather than all of them.
#[must_use]
pub fn matches(garment: &Garment, rules: &[Rule]) -> bool {
    !rules.is_empty() && rules.iter().all(|rule| evaluate(garment, rule))
}

/// Evaluate a single rule against a garment.
#[must_use]
pub fn evaluate(garment: &Garment, rule: &Rule) -> bool {
    match rule.field {
        RuleField::Tags => garment
            .tags
            .iter()
            .any(|name| scalar_test(Some(name.as_str()), rule.op, &rule.value)),
        RuleField::Cost => cost_test(garment.cost_cents, rule.op, &rule.value),
        field => {
            let purchased;
            let resolved = match field {
                RuleField::Name => Some(garment.name.as_str()),
                RuleField::Category => Some(garment.category.as_str()),
                RuleField::Material => garment.material.as_deref(),
                RuleField::Color => garment.color.as_deref(),
                RuleField::Size => garment.size.as_deref(),
                RuleField::Brand => garment.brand.as_deref(),
                RuleField::Status => Some(garment.status.as_str()),
                RuleField::Notes => garment.notes.as_deref(),
                RuleField::Care => garment.care.as_deref(),
                RuleField::Purchased => match garment.purchased {
                    Some(date) => {
                        purchased = date.format("%Y-%m-%d").to_string();
                        Some(purchased.as_str())
                    }
                    None => None,
                },
                RuleField::Cost | RuleField::Tags => unreachable!("handled above"),
            };
            scalar_test(resolved, rule.op, &rule.value)
        }
    }
}

/// Apply an operator to one scalar value (or its absence).
fn scalar_test(actual: Option<&str>, op: RuleOp, probe: &str) -> bool {
    match op {
        RuleOp::Equals => actual.is_some_and(|a| eq_ci(a, probe)),
        RuleOp::NotEquals => !actual.is_some_and(|a| eq_ci(a, probe)),
        RuleOp::Contains => actual.is_some_and(|a| contains_ci(a, probe)),
        RuleOp::NotContains => !actual.is_some_and(|a| contains_ci(a, probe)),
        RuleOp::StartsWith => {
            actual.is_some_and(|a| a.to_lowercase().starts_with(&probe.to_lowercase()))
        }
        RuleOp::EndsWith => {
            actual.is_some_and(|a| a.to_lowercase().ends_with(&probe.to_lowercase()))
        }
        RuleOp::InSet => {
            actual.is_some_and(|a| in_set_candidates(probe).any(|candidate| eq_ci(a, candidate)))
        }
    }
}

/// `cost` rules: numeric cents equality for equals/not-equals, display
/// string for everything else.
fn cost_test(cost_cents: Option<i64>, op: RuleOp, probe: &str) -> bool {
    match op {
        RuleOp::Equals => cost_eq(cost_cents, probe),
        RuleOp::NotEquals => !cost_eq(cost_cents, probe),
        _ => {
            let display;
            let resolved = match cost_cents {
                Some(cents) => {
                    display = format_cost(cents);
                    Some(display.as_str())
                }
                None => None,
            };
            scalar_test(resolved, op, probe)
        }
    }
}

fn cost_eq(cost_cents: Option<i64>, probe: &str) -> bool {
    match (cost_cents, parse_money(probe)) {
        (Some(cents), Some(probe_cents)) => cents == probe_cents,
        _ => false,
    }
}

fn eq_ci(a: &str, b: &str) -> bool {
    a.to_lowercase() == b.to_lowercase()
}

fn contains_ci(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

/// Render cents as the user-facing amount: whole dollars without decimals,
/// otherwise two decimal places.
#[must_use]
pub fn format_cost(cents: i64) -> String {
    if cents % 100 == 0 {
        format!("{}", cents / 100)
    } else {
        format!("{}.{:02}", cents / 100, (cents % 100).abs())
    }
}

/// Parse a money amount ("49", "49.9", "$49.99") into cents.
///
/// Returns `None` for anything else, including more than two fraction
/// digits; a probe that is not money simply never equals a cost.
#[must_use]
pub fn parse_money(s: &str) -> Option<i64> {
    let s = s.trim().strip_prefix('$').unwrap_or_else(|| s.trim());
    let (whole, frac) = match s.split_once('.') {
        Some((w, f)) => (w, f),
        None => (s, ""),
    };
    if whole.is_empty() || whole.chars().any(|c| !c.is_ascii_digit()) {
        return None;
    }
    if frac.len() > 2 || frac.chars().any(|c| !c.is_ascii_digit()) {
        return None;
    }
    let whole: i64 = whole.parse().ok()?;
    let frac_cents = match frac.len() {
        0 => 0,
        1 => frac.parse::<i64>().ok()? * 10,
        _ => frac.parse::<i64>().ok()?,
    };
    whole.checked_mul(100)?.checked_add(frac_cents)
}
