//! Classifier port: Trait for the injected risk classifier.
//!
//! This trait abstracts the trained model from the application logic. The
//! application treats the classifier as an opaque capability; the model
//! family and training provenance are invisible behind this boundary.

use crate::domain::RiskClass;

/// Error type for classifier operations.
#[derive(Debug, thiserror::Error)]
pub enum InferenceError {
    #[error("Input shape mismatch: expected {expected} features, got {actual}")]
    ShapeMismatch { expected: usize, actual: usize },

    #[error("Model produced a non-finite value")]
    NonFinite,
}

/// Trait for binary risk classification over numeric feature matrices.
///
/// Both operations take rows in schema order. The classifier is positional;
/// it never inspects feature names at prediction time.
pub trait Classifier: Send + Sync {
    /// Predict the risk class for each row.
    ///
    /// # Errors
    /// Returns `InferenceError` if a row has the wrong width or the model
    /// produces a non-finite value.
    fn predict(&self, rows: &[Vec<f64>]) -> Result<Vec<RiskClass>, InferenceError>;

    /// Predict calibrated class probabilities for each row.
    ///
    /// Each output pair is `[P(low), P(high)]`, both in `[0, 1]`, summing
    /// to 1. The predicted class from [`Classifier::predict`] on the same
    /// rows is always the argmax of the corresponding pair.
    ///
    /// # Errors
    /// Returns `InferenceError` if a row has the wrong width or the model
    /// produces a non-finite value.
    fn predict_proba(&self, rows: &[Vec<f64>]) -> Result<Vec<[f64; 2]>, InferenceError>;
}
