//! Shared condition evaluation for conditional action types
//!
//! Pure and deterministic: a left-hand string (possibly a serialized
//! JSON array, possibly absent), a comparison from one of four
//! disjoint families, and a right-hand string (scalar or JSON array
//! of `{value}` options).
//!
//! Several rules here look like bugs but are load-bearing contract:
//! a missing left side is always false (except for existence checks),
//! a left side that is a JSON array of strings matches if ANY element
//! matches, and numeric comparison falls back to ordinal
//! case-insensitive string ordering when either side fails to parse.
//! Historical playbooks depend on all three.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::str::FromStr;

// ── Comparison families ──────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExistenceComparison {
    Exists,
    NotExists,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StringComparison {
    StartsWith,
    EndsWith,
    Contains,
    ExactMatch,
    RegularExpression,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NumberComparison {
    Equals,
    NotEquals,
    GreaterThan,
    GreaterThanOrEqual,
    LessThan,
    LessThanOrEqual,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ArrayComparison {
    /// Every right-hand value present in the left-hand set
    All,
    /// At least one right-hand value present in the left-hand set
    Any,
}

/// A comparison from one of the four disjoint families
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Comparison {
    Existence(ExistenceComparison),
    String(StringComparison),
    Number(NumberComparison),
    Array(ArrayComparison),
}

impl FromStr for Comparison {
    type Err = UnknownComparison;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        use Comparison::*;
        Ok(match s {
            "exists" => Existence(ExistenceComparison::Exists),
            "not_exists" => Existence(ExistenceComparison::NotExists),
            "starts_with" => String(StringComparison::StartsWith),
            "ends_with" => String(StringComparison::EndsWith),
            "contains" => String(StringComparison::Contains),
            "exact_match" => String(StringComparison::ExactMatch),
            "regular_expression" => String(StringComparison::RegularExpression),
            "equals" => Number(NumberComparison::Equals),
            "not_equals" => Number(NumberComparison::NotEquals),
            "greater_than" => Number(NumberComparison::GreaterThan),
            "greater_than_or_equal" => Number(NumberComparison::GreaterThanOrEqual),
            "less_than" => Number(NumberComparison::LessThan),
            "less_than_or_equal" => Number(NumberComparison::LessThanOrEqual),
            "all" => Array(ArrayComparison::All),
            "any" => Array(ArrayComparison::Any),
            other => return Err(UnknownComparison(other.to_string())),
        })
    }
}

impl std::fmt::Display for Comparison {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Comparison::Existence(ExistenceComparison::Exists) => "exists",
            Comparison::Existence(ExistenceComparison::NotExists) => "not_exists",
            Comparison::String(StringComparison::StartsWith) => "starts_with",
            Comparison::String(StringComparison::EndsWith) => "ends_with",
            Comparison::String(StringComparison::Contains) => "contains",
            Comparison::String(StringComparison::ExactMatch) => "exact_match",
            Comparison::String(StringComparison::RegularExpression) => "regular_expression",
            Comparison::Number(NumberComparison::Equals) => "equals",
            Comparison::Number(NumberComparison::NotEquals) => "not_equals",
            Comparison::Number(NumberComparison::GreaterThan) => "greater_than",
            Comparison::Number(NumberComparison::GreaterThanOrEqual) => "greater_than_or_equal",
            Comparison::Number(NumberComparison::LessThan) => "less_than",
            Comparison::Number(NumberComparison::LessThanOrEqual) => "less_than_or_equal",
            Comparison::Array(ArrayComparison::All) => "all",
            Comparison::Array(ArrayComparison::Any) => "any",
        };
        f.write_str(name)
    }
}

impl TryFrom<String> for Comparison {
    type Error = UnknownComparison;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<Comparison> for String {
    fn from(c: Comparison) -> Self {
        c.to_string()
    }
}

#[derive(Debug, thiserror::Error)]
#[error("Unknown comparison: {0}")]
pub struct UnknownComparison(pub String);

// ── Options ──────────────────────────────────────────────────────────

/// Caller-configurable evaluation knobs
#[derive(Clone, Copy, Debug, Default)]
pub struct ConditionOptions {
    /// Every other string comparison is ordinal case-insensitive;
    /// regular expressions alone let the caller opt into case
    /// sensitivity.
    pub case_sensitive_regex: bool,
}

// ── Evaluation ───────────────────────────────────────────────────────

/// Evaluate one condition. Deterministic, side-effect free.
pub fn evaluate(
    left: Option<&str>,
    comparison: Comparison,
    right: &str,
    options: &ConditionOptions,
) -> bool {
    // Existence short-circuits everything else, including a missing left.
    if let Comparison::Existence(cmp) = comparison {
        let present = left.map(|l| !l.is_empty()).unwrap_or(false);
        return match cmp {
            ExistenceComparison::Exists => present,
            ExistenceComparison::NotExists => !present,
        };
    }

    // A missing left side is always false, regardless of family.
    let Some(left) = left else {
        return false;
    };

    // A JSON-array right means set semantics: left is a comma-delimited
    // set, right a collection of {value} options.
    if let Some(wanted) = parse_right_options(right) {
        let have: Vec<String> = left
            .split(',')
            .map(|item| item.trim().to_lowercase())
            .collect();
        let mut wanted = wanted
            .iter()
            .map(|option| option.value.trim().to_lowercase());
        return match comparison {
            Comparison::Array(ArrayComparison::All) => wanted.all(|w| have.contains(&w)),
            _ => wanted.any(|w| have.contains(&w)),
        };
    }

    // A left side that is a JSON array of strings holds if the
    // condition holds for any element.
    if let Some(elements) = parse_string_array(left) {
        return elements
            .iter()
            .any(|element| evaluate_scalar(element, comparison, right, options));
    }

    evaluate_scalar(left, comparison, right, options)
}

fn evaluate_scalar(
    left: &str,
    comparison: Comparison,
    right: &str,
    options: &ConditionOptions,
) -> bool {
    match comparison {
        Comparison::Existence(cmp) => match cmp {
            ExistenceComparison::Exists => !left.is_empty(),
            ExistenceComparison::NotExists => left.is_empty(),
        },
        Comparison::String(cmp) => evaluate_string(left, cmp, right, options),
        Comparison::Number(cmp) => evaluate_number(left, cmp, right),
        Comparison::Array(_) => {
            // Array comparison against a scalar right: membership of
            // the single value in left's comma-delimited set. All and
            // Any coincide for a one-element collection.
            let wanted = right.trim().to_lowercase();
            left.split(',')
                .any(|item| item.trim().to_lowercase() == wanted)
        }
    }
}

fn evaluate_string(
    left: &str,
    cmp: StringComparison,
    right: &str,
    options: &ConditionOptions,
) -> bool {
    if let StringComparison::RegularExpression = cmp {
        let pattern = if options.case_sensitive_regex {
            right.to_string()
        } else {
            format!("(?i){right}")
        };
        return match regex::Regex::new(&pattern) {
            Ok(re) => re.is_match(left),
            Err(_) => false,
        };
    }

    // Ordinal, case-insensitive.
    let l = left.to_lowercase();
    let r = right.to_lowercase();
    match cmp {
        StringComparison::StartsWith => l.starts_with(&r),
        StringComparison::EndsWith => l.ends_with(&r),
        StringComparison::Contains => l.contains(&r),
        StringComparison::ExactMatch => l == r,
        StringComparison::RegularExpression => unreachable!("handled above"),
    }
}

fn evaluate_number(left: &str, cmp: NumberComparison, right: &str) -> bool {
    let ordering = match (left.trim().parse::<f64>(), right.trim().parse::<f64>()) {
        (Ok(l), Ok(r)) => match l.partial_cmp(&r) {
            Some(ordering) => ordering,
            None => return false,
        },
        // Either side failed to parse as a base-10 decimal: fall back
        // to ordinal case-insensitive string ordering.
        _ => left.to_lowercase().cmp(&right.to_lowercase()),
    };

    match cmp {
        NumberComparison::Equals => ordering == Ordering::Equal,
        NumberComparison::NotEquals => ordering != Ordering::Equal,
        NumberComparison::GreaterThan => ordering == Ordering::Greater,
        NumberComparison::GreaterThanOrEqual => ordering != Ordering::Less,
        NumberComparison::LessThan => ordering == Ordering::Less,
        NumberComparison::LessThanOrEqual => ordering != Ordering::Greater,
    }
}

// ── Parsing helpers ──────────────────────────────────────────────────

#[derive(Deserialize)]
struct RightOption {
    value: String,
}

fn parse_right_options(right: &str) -> Option<Vec<RightOption>> {
    let trimmed = right.trim();
    if !trimmed.starts_with('[') {
        return None;
    }
    serde_json::from_str(trimmed).ok()
}

fn parse_string_array(left: &str) -> Option<Vec<String>> {
    let trimmed = left.trim();
    if !trimmed.starts_with('[') {
        return None;
    }
    serde_json::from_str(trimmed).ok()
}
