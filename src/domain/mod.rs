//! Domain layer: Core business types and logic.
//!
//! This module contains pure Rust types with no external dependencies.
//! All types are serializable and implement strict validation.

mod features;
mod prediction;
mod recommendation;
pub mod schema;

pub use features::{FeatureRecord, ValidationError, ValidationReason};
pub use prediction::{PredictionResult, RiskAssessment, RiskClass};
pub use recommendation::recommendation_for;
pub use schema::{FieldKind, FieldSpec, FEATURE_COUNT, FEATURE_SCHEMA};
