//! Field validation for untyped product payloads.
//!
//! Validators never stop at the first problem: every violated rule is
//! collected into a single [`ValidationError`] so callers can report all of
//! them at once.

use std::fmt;

use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;

use product_catalog_core::{Price, PriceError};

/// A single violated rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldViolation {
    /// Name of the offending field (`body` for payload-level problems).
    pub field: String,
    /// Human-readable description of the rule.
    pub message: String,
}

impl FieldViolation {
    /// Create a new violation.
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for FieldViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// Malformed input, carrying every violated rule.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("validation failed: {}", join_messages(.violations))]
pub struct ValidationError {
    violations: Vec<FieldViolation>,
}

impl ValidationError {
    /// Build an error from a non-empty list of violations.
    #[must_use]
    pub const fn new(violations: Vec<FieldViolation>) -> Self {
        Self { violations }
    }

    /// Shorthand for an error with one violation.
    pub fn single(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(vec![FieldViolation::new(field, message)])
    }

    /// The violated rules, in the order they were checked.
    #[must_use]
    pub fn violations(&self) -> &[FieldViolation] {
        &self.violations
    }

    /// Whether any violation concerns `field`.
    #[must_use]
    pub fn has_field(&self, field: &str) -> bool {
        self.violations.iter().any(|v| v.field == field)
    }
}

fn join_messages(violations: &[FieldViolation]) -> String {
    violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Collects violations across several fields.
#[derive(Debug, Default)]
pub(crate) struct Violations(Vec<FieldViolation>);

impl Violations {
    pub(crate) fn push(&mut self, field: &str, message: impl Into<String>) {
        self.0.push(FieldViolation::new(field, message));
    }

    /// Finish validation, returning `value` if nothing was collected.
    pub(crate) fn finish<T>(self, value: impl FnOnce() -> T) -> Result<T, ValidationError> {
        if self.0.is_empty() {
            Ok(value())
        } else {
            Err(self.into_error())
        }
    }

    /// Convert the collected violations into an error.
    pub(crate) fn into_error(self) -> ValidationError {
        ValidationError::new(self.0)
    }
}

/// Require the payload to be a JSON object.
pub(crate) fn as_object(payload: &Value) -> Result<&Map<String, Value>, ValidationError> {
    payload
        .as_object()
        .ok_or_else(|| ValidationError::single("body", "payload must be a JSON object"))
}

/// Validate a product name: a present, non-empty string.
///
/// A missing value breaks both rules; a non-string value only the first.
pub(crate) fn check_name(value: Option<&Value>, out: &mut Violations) -> Option<String> {
    match value {
        Some(Value::String(name)) if !name.is_empty() => Some(name.clone()),
        Some(Value::String(_)) => {
            out.push("name", "name should not be empty");
            None
        }
        None | Some(Value::Null) => {
            out.push("name", "name must be a string");
            out.push("name", "name should not be empty");
            None
        }
        Some(_) => {
            out.push("name", "name must be a string");
            None
        }
    }
}

/// Validate a product price: coercible to a number, positive, at most four
/// fractional digits.
///
/// JSON numbers and numeric strings are both accepted.
pub(crate) fn check_price(value: Option<&Value>, out: &mut Violations) -> Option<Price> {
    let text = match value {
        Some(Value::Number(n)) => Some(n.to_string()),
        Some(Value::String(s)) => Some(s.clone()),
        _ => None,
    };

    let amount = match text.as_deref().map(Price::parse_amount) {
        Some(Ok(amount)) => amount,
        Some(Err(PriceError::OutOfRange)) => {
            out.push("price", PriceError::OutOfRange.to_string());
            if text
                .as_deref()
                .and_then(|t| t.trim().parse::<f64>().ok())
                .is_some_and(|v| v <= 0.0)
            {
                out.push("price", PriceError::NotPositive.to_string());
            }
            return None;
        }
        Some(Err(_)) | None => {
            // Something that is not a number cannot be positive either.
            out.push("price", PriceError::NotANumber.to_string());
            out.push("price", PriceError::NotPositive.to_string());
            return None;
        }
    };

    let errors = Price::violations(amount);
    if errors.is_empty() {
        Price::new(amount).ok()
    } else {
        for err in errors {
            out.push("price", err.to_string());
        }
        None
    }
}
