//! Declarative feature schema for the anemia risk model.
//!
//! The schema is the single source of truth for field names, order, and
//! valid ranges. Both the record validator and the input form are built
//! from it, so the two can never drift apart.

use serde::{Deserialize, Serialize};

/// Number of features the classifier expects.
pub const FEATURE_COUNT: usize = 8;

/// Scalar kind of a clinical feature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FieldKind {
    /// Encoded categorical value, exactly 0 or 1.
    Binary,
    /// Whole-number value within `[min, max]`.
    Integer,
    /// Continuous value within `[min, max]`.
    Float,
}

/// Declaration of a single clinical feature.
#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    /// Canonical feature name, matching the model artifact's column name.
    pub name: &'static str,
    /// Human-readable label for the input form.
    pub label: &'static str,
    pub kind: FieldKind,
    pub min: f64,
    pub max: f64,
    /// Measurement unit, empty for encoded categoricals.
    pub unit: &'static str,
    /// Entry hint shown in the form.
    pub hint: &'static str,
}

impl FieldSpec {
    /// Whether `value` lies within the declared range.
    #[must_use]
    pub fn in_range(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }
}

/// The 8 perioperative features, in classifier order.
///
/// Order is significant: the classifier is positional and does not check
/// names itself.
pub const FEATURE_SCHEMA: [FieldSpec; FEATURE_COUNT] = [
    FieldSpec {
        name: "type_of_anesthesia",
        label: "Type of Anesthesia",
        kind: FieldKind::Binary,
        min: 0.0,
        max: 1.0,
        unit: "",
        hint: "0=combined spinal-epidural, 1=general",
    },
    FieldSpec {
        name: "diabetes",
        label: "Diabetes History",
        kind: FieldKind::Binary,
        min: 0.0,
        max: 1.0,
        unit: "",
        hint: "0=no, 1=yes (diagnosed)",
    },
    FieldSpec {
        name: "transfusion",
        label: "Blood Reserve Volume",
        kind: FieldKind::Integer,
        min: 0.0,
        max: 5000.0,
        unit: "ml",
        hint: "ml (0-5000)",
    },
    FieldSpec {
        name: "operate_time",
        label: "Operation Time",
        kind: FieldKind::Integer,
        min: 5.0,
        max: 600.0,
        unit: "min",
        hint: "min (5-600)",
    },
    FieldSpec {
        name: "bmi",
        label: "BMI",
        kind: FieldKind::Float,
        min: 5.0,
        max: 50.0,
        unit: "kg/m2",
        hint: "kg/m2 (5.0-50.0)",
    },
    FieldSpec {
        name: "waiting_time",
        label: "Waiting Time",
        kind: FieldKind::Integer,
        min: 0.0,
        max: 60.0,
        unit: "d",
        hint: "days (0-60)",
    },
    FieldSpec {
        name: "hb",
        label: "Preop Hemoglobin",
        kind: FieldKind::Float,
        min: 30.0,
        max: 200.0,
        unit: "g/L",
        hint: "g/L (30.0-200.0)",
    },
    FieldSpec {
        name: "platelet",
        label: "Preop Platelet",
        kind: FieldKind::Float,
        min: 0.0,
        max: 20000.0,
        unit: "x10^9/L",
        hint: "x10^9/L (0-20000)",
    },
];

/// Canonical feature names in classifier order.
#[must_use]
pub fn feature_names() -> [&'static str; FEATURE_COUNT] {
    let mut names = [""; FEATURE_COUNT];
    let mut i = 0;
    while i < FEATURE_COUNT {
        names[i] = FEATURE_SCHEMA[i].name;
        i += 1;
    }
    names
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_has_eight_ordered_fields() {
        assert_eq!(FEATURE_SCHEMA.len(), FEATURE_COUNT);
        assert_eq!(
            feature_names(),
            [
                "type_of_anesthesia",
                "diabetes",
                "transfusion",
                "operate_time",
                "bmi",
                "waiting_time",
                "hb",
                "platelet",
            ]
        );
    }

    #[test]
    fn test_binary_fields_are_zero_one() {
        for spec in FEATURE_SCHEMA.iter().filter(|s| s.kind == FieldKind::Binary) {
            assert_eq!(spec.min, 0.0);
            assert_eq!(spec.max, 1.0);
        }
    }

    #[test]
    fn test_ranges_are_well_formed() {
        for spec in &FEATURE_SCHEMA {
            assert!(spec.min < spec.max, "{}: empty range", spec.name);
        }
    }
}
