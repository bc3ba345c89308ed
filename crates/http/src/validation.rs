//! Field-level validation for submitted records.
//!
//! Format and bound rules are declared on the input types with `validator`;
//! `FieldErrors` gathers those together with the rules that need context
//! (blank text, today's date, other tables), so a form can show every
//! message next to its input in one round trip.

use serde_json::{json, Value};
use validator::{ValidationError, ValidationErrors};

use crate::error::AppError;

const INVALID_MESSAGE: &str = "The given data was invalid.";

/// Accumulates `(field, message)` pairs for one submission.
#[derive(Debug, Default)]
pub struct FieldErrors {
    errors: Vec<(String, String)>,
}

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) -> &mut Self {
        self.errors.push((field.into(), message.into()));
        self
    }

    /// Non-blank text.
    pub fn required(&mut self, field: &str, value: &str) -> &mut Self {
        if value.trim().is_empty() {
            self.add(field, format!("The {} field is required.", label(field)));
        }
        self
    }

    /// Optional value that must be present.
    pub fn present<T>(&mut self, field: &str, value: Option<&T>) -> &mut Self {
        if value.is_none() {
            self.add(field, format!("The {} field is required.", label(field)));
        }
        self
    }

    /// Value must be one of a fixed set of labels (exact match).
    pub fn one_of(&mut self, field: &str, value: &str, allowed: &[&str]) -> &mut Self {
        if !allowed.contains(&value) {
            self.add(field, format!("The selected {} is invalid.", label(field)));
        }
        self
    }

    /// Folds in the outcome of a derived `Validate`. Fields that already
    /// failed here keep their first message, so a blank email reads as
    /// required rather than malformed.
    pub fn merge(&mut self, result: Result<(), ValidationErrors>) -> &mut Self {
        let Err(errors) = result else {
            return self;
        };
        let mut fields: Vec<_> = errors.field_errors().into_iter().collect();
        fields.sort_by(|a, b| a.0.cmp(&b.0));

        for (field, field_errors) in fields {
            let field = field.to_string();
            if self.errors.iter().any(|(seen, _)| *seen == field) {
                continue;
            }
            for error in field_errors.iter() {
                let message = describe(&field, error);
                self.add(field.clone(), message);
            }
        }
        self
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> + '_ {
        self.errors.iter().map(|(field, _)| field.as_str())
    }

    /// `Ok(())` when nothing was recorded, otherwise a 422 with every field error.
    pub fn finish(self) -> Result<(), AppError> {
        if self.errors.is_empty() {
            return Ok(());
        }
        let details = self
            .errors
            .into_iter()
            .map(|(field, error)| json!({ "field": field, "error": error }))
            .collect();
        Err(AppError::validation(details, INVALID_MESSAGE))
    }
}

fn label(field: &str) -> String {
    field.replace('_', " ")
}

fn describe(field: &str, error: &ValidationError) -> String {
    if let Some(message) = &error.message {
        return message.to_string();
    }
    let label = label(field);
    let bound = |key: &str| error.params.get(key).filter(|v| !v.is_null()).map(number);
    let (min, max) = (bound("min"), bound("max"));

    match (&*error.code, min, max) {
        ("email", _, _) => format!("The {label} must be a valid email address."),
        ("range", Some(min), Some(max)) => format!("The {label} must be between {min} and {max}."),
        ("range", Some(min), None) => format!("The {label} must be at least {min}."),
        ("range", None, Some(max)) => format!("The {label} may not be greater than {max}."),
        ("length", _, Some(max)) => {
            format!("The {label} may not be greater than {max} characters.")
        }
        ("length", Some(min), None) => format!("The {label} must be at least {min} characters."),
        _ => format!("The {label} is invalid."),
    }
}

/// Bounds come back as JSON numbers; `1.0` reads better as `1`.
fn number(value: &Value) -> String {
    match value.as_f64() {
        Some(n) if n.fract() == 0.0 && n.abs() < 1e15 => format!("{}", n as i64),
        Some(n) => n.to_string(),
        None => value.to_string(),
    }
}
