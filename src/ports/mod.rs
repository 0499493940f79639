//! Ports layer: Trait definitions for external operations.
//!
//! Following Hexagonal Architecture, these traits define the boundaries
//! between the application and external systems (model artifact, reference
//! dataset, etc.).

mod classifier;

pub use classifier::{Classifier, InferenceError};
