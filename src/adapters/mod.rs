//! Adapters layer: Concrete implementations of ports.
//!
//! These modules contain the actual integration with external artifacts:
//! - `svm`: serialized SVM model loading and prediction
//! - `dataset`: reference dataset CSV loading
//! - `sanitize`: PII filtering for logs

pub mod dataset;
pub mod sanitize;
pub mod svm;

pub use dataset::{DatasetError, ReferenceDataset};
pub use svm::{ModelError, SvmClassifier};
