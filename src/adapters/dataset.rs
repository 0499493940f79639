//! Reference dataset adapter.
//!
//! Loads the reference sample CSV eagerly at startup and holds it read-only.
//! The prediction path never consults it; it exists for future explainability
//! tooling and as a startup sanity check that the deployment ships coherent
//! artifacts.

use std::fs;
use std::path::Path;

use crate::domain::{schema, FEATURE_COUNT};

/// Error type for reference dataset loading.
#[derive(Debug, thiserror::Error)]
pub enum DatasetError {
    #[error("Failed to read dataset: {0}")]
    Read(String),

    #[error("Dataset header mismatch: {0}")]
    Header(String),

    #[error("Dataset row {row} is malformed: {reason}")]
    Row { row: usize, reason: String },
}

/// Read-only reference dataset in schema column order.
#[derive(Debug, Clone)]
pub struct ReferenceDataset {
    rows: Vec<[f64; FEATURE_COUNT]>,
}

impl ReferenceDataset {
    /// Load the reference CSV.
    ///
    /// The header must name exactly the 8 schema features in order. Every
    /// row must parse as 8 finite numbers. Any violation fails the load;
    /// startup must abort rather than serve with a broken deployment.
    ///
    /// # Errors
    /// Returns `DatasetError` on read, header, or row failures.
    pub fn load(path: &Path) -> Result<Self, DatasetError> {
        let content = fs::read_to_string(path)
            .map_err(|e| DatasetError::Read(format!("{}: {e}", path.display())))?;

        let mut lines = content.lines().enumerate();
        let (_, header) = lines
            .next()
            .ok_or_else(|| DatasetError::Header("empty file".into()))?;
        Self::check_header(header)?;

        let mut rows = Vec::new();
        for (line_no, line) in lines {
            if line.trim().is_empty() {
                continue;
            }
            rows.push(Self::parse_row(line_no + 1, line)?);
        }

        tracing::info!("Loaded reference dataset from {:?} ({} rows)", path, rows.len());
        Ok(Self { rows })
    }

    fn check_header(header: &str) -> Result<(), DatasetError> {
        let expected = schema::feature_names();
        let actual: Vec<&str> = header.split(',').map(str::trim).collect();
        if actual.len() != FEATURE_COUNT {
            return Err(DatasetError::Header(format!(
                "expected {FEATURE_COUNT} columns, got {}",
                actual.len()
            )));
        }
        for (i, (a, e)) in actual.iter().zip(expected.iter()).enumerate() {
            if a != e {
                return Err(DatasetError::Header(format!(
                    "column {i} is {a:?}, expected {e:?}"
                )));
            }
        }
        Ok(())
    }

    fn parse_row(row: usize, line: &str) -> Result<[f64; FEATURE_COUNT], DatasetError> {
        let fields: Vec<&str> = line.split(',').map(str::trim).collect();
        if fields.len() != FEATURE_COUNT {
            return Err(DatasetError::Row {
                row,
                reason: format!("expected {FEATURE_COUNT} values, got {}", fields.len()),
            });
        }
        let mut values = [0.0; FEATURE_COUNT];
        for (i, field) in fields.iter().enumerate() {
            let value: f64 = field.parse().map_err(|_| DatasetError::Row {
                row,
                reason: format!("column {i} value {field:?} is not a number"),
            })?;
            if !value.is_finite() {
                return Err(DatasetError::Row {
                    row,
                    reason: format!("column {i} value is not finite"),
                });
            }
            values[i] = value;
        }
        Ok(values)
    }

    /// Number of reference samples.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the dataset holds no samples.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Reference samples in schema column order.
    #[must_use]
    pub fn rows(&self) -> &[[f64; FEATURE_COUNT]] {
        &self.rows
    }
}
