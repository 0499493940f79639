//! TUI module: Terminal User Interface using Ratatui.
//!
//! Provides a medical-themed interface for:
//! - Dashboard with artifact status
//! - Patient feature entry
//! - Risk assessment results

mod app;
mod styles;
mod ui;
mod worker;

pub use app::{App, Screen, DATA_PATH_ENV, MODEL_PATH_ENV};
pub use styles::MedicalTheme;
pub use worker::{InferenceProgress, InferenceWorker, InferenceWorkerHandle};
