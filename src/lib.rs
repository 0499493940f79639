//! # TransfuseAI
//!
//! Clinical decision support for postoperative anemia risk.
//!
//! This crate provides:
//! - Strict validation of 8 perioperative patient features
//! - Binary risk classification with calibrated probabilities
//! - Recommendation text for the clinical workflow
//! - Terminal UI for local-only deployment
//!
//! ## Architecture
//!
//! The crate follows Hexagonal Architecture:
//! - `domain`: Core business types (feature schema, records, predictions)
//! - `ports`: Trait definitions for external operations
//! - `adapters`: Concrete implementations (SVM artifact, reference dataset)
//! - `application`: Use cases orchestrating domain and ports
//! - `tui`: Terminal user interface

pub mod adapters;
pub mod application;
pub mod domain;
pub mod ports;
pub mod tui;

pub use domain::{FeatureRecord, PredictionResult, RiskAssessment, RiskClass};

/// Result type for TransfuseAI operations
pub type Result<T> = std::result::Result<T, TransfuseError>;

/// Main error type for TransfuseAI
#[derive(Debug, thiserror::Error)]
pub enum TransfuseError {
    #[error("Invalid patient data: {0}")]
    Validation(#[from] domain::ValidationError),

    #[error("Model unavailable: {0}")]
    ModelUnavailable(#[from] adapters::ModelError),

    #[error("Inference failed: {0}")]
    Inference(#[from] ports::InferenceError),

    #[error("Reference dataset unavailable: {0}")]
    Dataset(#[from] adapters::DatasetError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
