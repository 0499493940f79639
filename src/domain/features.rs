//! Validated perioperative feature records.
//!
//! A `FeatureRecord` can only be obtained through [`FeatureRecord::validate`],
//! so every record held anywhere in the application is already known to be
//! well-formed against the feature schema.

use serde::{Deserialize, Serialize};

use super::schema::{FieldKind, FEATURE_COUNT, FEATURE_SCHEMA};

/// Why a raw input vector was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ValidationReason {
    /// Value outside the declared `[min, max]` range.
    OutOfRange,
    /// Input vector does not contain exactly 8 values.
    WrongArity,
    /// Value is not representable for the field kind (fractional value for
    /// an integer field, non-0/1 shape for a binary field, NaN or infinity).
    WrongType,
}

/// A rejected input, pointing at the first offending position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error, Serialize, Deserialize)]
#[error("{}", self.message())]
pub struct ValidationError {
    /// Index of the first field that failed (8 when too many values were given).
    pub field_index: usize,
    pub reason: ValidationReason,
}

impl ValidationError {
    /// Field-specific message suitable for showing next to the input form.
    #[must_use]
    pub fn message(&self) -> String {
        match self.reason {
            ValidationReason::WrongArity => {
                format!("expected {FEATURE_COUNT} features")
            }
            ValidationReason::OutOfRange => {
                let spec = &FEATURE_SCHEMA[self.field_index];
                format!(
                    "{} out of range [{}, {}]",
                    spec.label, spec.min, spec.max
                )
            }
            ValidationReason::WrongType => {
                let spec = &FEATURE_SCHEMA[self.field_index];
                match spec.kind {
                    FieldKind::Binary => format!("{} must be 0 or 1", spec.label),
                    FieldKind::Integer => format!("{} must be a whole number", spec.label),
                    FieldKind::Float => format!("{} must be a finite number", spec.label),
                }
            }
        }
    }
}

/// Immutable, validated 8-feature input vector in classifier order.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureRecord {
    values: [f64; FEATURE_COUNT],
}

impl FeatureRecord {
    /// Validate a raw vector against the feature schema.
    ///
    /// Checks arity, then each position in order: kind first (binary must be
    /// exactly 0 or 1, integers must be whole, everything must be finite),
    /// then range. The first violation wins.
    ///
    /// # Errors
    /// Returns the lowest-index [`ValidationError`]. Nothing is coerced or
    /// clamped.
    pub fn validate(raw: &[f64]) -> Result<Self, ValidationError> {
        if raw.len() != FEATURE_COUNT {
            return Err(ValidationError {
                field_index: raw.len().min(FEATURE_COUNT),
                reason: ValidationReason::WrongArity,
            });
        }

        let mut values = [0.0; FEATURE_COUNT];
        for (i, (&value, spec)) in raw.iter().zip(FEATURE_SCHEMA.iter()).enumerate() {
            if !value.is_finite() {
                return Err(ValidationError {
                    field_index: i,
                    reason: ValidationReason::WrongType,
                });
            }
            match spec.kind {
                FieldKind::Binary | FieldKind::Integer => {
                    if value.fract() != 0.0 {
                        return Err(ValidationError {
                            field_index: i,
                            reason: ValidationReason::WrongType,
                        });
                    }
                }
                FieldKind::Float => {}
            }
            if !spec.in_range(value) {
                return Err(ValidationError {
                    field_index: i,
                    reason: ValidationReason::OutOfRange,
                });
            }
            values[i] = value;
        }

        Ok(Self { values })
    }

    /// Order-preserving flat projection for the classifier.
    ///
    /// No renaming, no rescaling; the model artifact carries its own scaler.
    #[must_use]
    pub fn to_row(&self) -> Vec<f64> {
        self.values.to_vec()
    }

    /// Value at a schema position.
    #[must_use]
    pub fn get(&self, index: usize) -> f64 {
        self.values[index]
    }
}
