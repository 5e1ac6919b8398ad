// src/config/schema_validator.rs
//! Configuration schema validation

use crate::config::constants::{batch, display};
use std::collections::HashMap;

/// A single field that failed its constraint
#[derive(Debug, Clone)]
pub struct ValidationError {
    pub field: String,
    pub message: String,
    pub value: String,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {} (got {})", self.field, self.message, self.value)
    }
}

impl std::error::Error for ValidationError {}

/// Constraint attached to one dotted config path
#[derive(Debug, Clone)]
pub enum FieldConstraint {
    /// Strictly positive float
    Positive,
    IntRange { min: i64, max: i64 },
    OneOf(&'static [&'static str]),
    NonEmptyString,
    NonEmptyArray,
}

impl FieldConstraint {
    /// Description of the violation, or `None` when `value` satisfies the constraint
    ///
    /// Values of the wrong TOML type pass here; deserialization rejects them later.
    fn violation(&self, value: &toml::Value) -> Option<String> {
        match self {
            FieldConstraint::Positive => as_number(value)
                .filter(|v| !(v.is_finite() && *v > 0.0))
                .map(|_| "must be a positive finite number".to_string()),
            FieldConstraint::IntRange { min, max } => value
                .as_integer()
                .filter(|v| !(min..=max).contains(&v))
                .map(|_| format!("must be between {} and {}", min, max)),
            FieldConstraint::OneOf(options) => value
                .as_str()
                .filter(|v| !options.iter().any(|opt| opt == v))
                .map(|_| format!("must be one of: {}", options.join(", "))),
            FieldConstraint::NonEmptyString => value
                .as_str()
                .filter(|v| v.is_empty())
                .map(|_| "must not be empty".to_string()),
            FieldConstraint::NonEmptyArray => value
                .as_array()
                .filter(|items| items.is_empty())
                .map(|_| "needs at least one entry".to_string()),
        }
    }
}

/// Checks a merged TOML tree before it is deserialized
#[derive(Debug, Clone)]
pub struct SchemaValidator {
    constraints: HashMap<&'static str, FieldConstraint>,
}

impl SchemaValidator {
    /// Validator with the constraints for every known `bandlimit` field
    pub fn new() -> Self {
        let constraints = HashMap::from([
            // No upper bound: cutoffs at or above Nyquist are a no-op
            ("filter.highpass_hz", FieldConstraint::Positive),
            ("filter.lowpass_hz", FieldConstraint::Positive),
            (
                "display.time_series_cap",
                FieldConstraint::IntRange { min: display::MIN_CAP as i64, max: display::MAX_TIME_SERIES_CAP as i64 },
            ),
            (
                "display.spectrum_cap",
                FieldConstraint::IntRange { min: display::MIN_CAP as i64, max: display::MAX_SPECTRUM_CAP as i64 },
            ),
            ("display.max_frequency_hz", FieldConstraint::Positive),
            ("codec.output_format", FieldConstraint::OneOf(&["pcm16", "float32"])),
            ("batch.extensions", FieldConstraint::NonEmptyArray),
            ("batch.output_suffix", FieldConstraint::NonEmptyString),
            (
                "batch.worker_threads",
                FieldConstraint::IntRange { min: 0, max: batch::MAX_WORKER_THREADS as i64 },
            ),
        ]);

        Self { constraints }
    }

    /// Validate one dotted field path, e.g. `display.spectrum_cap`
    pub fn validate_field(&self, field_path: &str, value: &toml::Value) -> Result<(), ValidationError> {
        let Some(constraint) = self.constraints.get(field_path) else {
            return Ok(());
        };
        match constraint.violation(value) {
            Some(message) => Err(ValidationError {
                field: field_path.to_string(),
                message,
                value: value.to_string(),
            }),
            None => Ok(()),
        }
    }

    /// Validate every known field of a merged configuration
    pub fn validate_config(&self, config: &toml::Value) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();
        let Some(sections) = config.as_table() else {
            return Ok(());
        };

        for (section, fields) in sections {
            let Some(fields) = fields.as_table() else {
                continue;
            };
            for (field, value) in fields {
                if let Err(err) = self.validate_field(&format!("{}.{}", section, field), value) {
                    errors.push(err);
                }
            }
        }

        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }

    /// Rules spanning several fields (cutoff ordering)
    pub fn validate_dependencies(&self, config: &toml::Value) -> Result<(), Vec<ValidationError>> {
        let cutoff = |name: &str| config.get("filter").and_then(|filter| filter.get(name)).and_then(as_number);

        match (cutoff("highpass_hz"), cutoff("lowpass_hz")) {
            (Some(highpass), Some(lowpass)) if highpass >= lowpass => Err(vec![ValidationError {
                field: "filter".to_string(),
                message: "highpass cutoff must be below lowpass cutoff".to_string(),
                value: format!("hp: {}, lp: {}", highpass, lowpass),
            }]),
            _ => Ok(()),
        }
    }
}

impl Default for SchemaValidator {
    fn default() -> Self {
        Self::new()
    }
}

/// TOML integers and floats both count as frequencies
fn as_number(value: &toml::Value) -> Option<f64> {
    value.as_float().or_else(|| value.as_integer().map(|v| v as f64))
}
