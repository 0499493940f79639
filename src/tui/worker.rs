//! Background worker for non-blocking inference.
//!
//! Runs the assessment on a separate thread so the TUI main loop stays
//! responsive. Inference on a single record is fast, but keeping it off
//! the render thread means a slow disk or a cold cache never freezes
//! the interface.

use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crate::application::InferenceService;
use crate::domain::{FeatureRecord, RiskAssessment};
use crate::ports::Classifier;

/// Progress updates from the inference worker.
#[derive(Debug, Clone)]
pub enum InferenceProgress {
    /// Classifier is running
    Predicting,
    /// Inference complete with assessment result
    Complete(RiskAssessment),
    /// Error occurred during inference
    Error(String),
}

/// Handle to a running inference worker.
pub struct InferenceWorkerHandle {
    /// Receiver for progress updates
    pub progress_rx: Receiver<InferenceProgress>,
    /// Thread handle (for joining)
    _handle: JoinHandle<()>,
}

impl InferenceWorkerHandle {
    /// Try to receive the next progress update (non-blocking).
    #[must_use]
    pub fn try_recv(&self) -> Option<InferenceProgress> {
        self.progress_rx.try_recv().ok()
    }
}

/// Spawns inference work onto a background thread.
pub struct InferenceWorker;

impl InferenceWorker {
    /// Spawn an assessment for a validated record.
    ///
    /// The record is moved into the worker thread; progress and the final
    /// result come back over the channel.
    pub fn spawn<C>(
        service: Arc<InferenceService<C>>,
        record: FeatureRecord,
    ) -> InferenceWorkerHandle
    where
        C: Classifier + 'static,
    {
        let (progress_tx, progress_rx) = mpsc::channel();

        let handle = thread::spawn(move || {
            run_inference(&service, &record, &progress_tx);
        });

        InferenceWorkerHandle {
            progress_rx,
            _handle: handle,
        }
    }
}

fn run_inference<C>(
    service: &InferenceService<C>,
    record: &FeatureRecord,
    tx: &Sender<InferenceProgress>,
) where
    C: Classifier,
{
    // Receiver may be gone if the user quit mid-inference; sends are
    // best-effort.
    let _ = tx.send(InferenceProgress::Predicting);

    match service.assess(record) {
        Ok(assessment) => {
            let _ = tx.send(InferenceProgress::Complete(assessment));
        }
        Err(e) => {
            tracing::error!("Inference worker failed: {e}");
            let _ = tx.send(InferenceProgress::Error(e.to_string()));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::RiskClass;
    use crate::ports::InferenceError;
    use std::time::Duration;

    struct FixedClassifier {
        p_high: f64,
    }

    impl Classifier for FixedClassifier {
        fn predict(&self, rows: &[Vec<f64>]) -> Result<Vec<RiskClass>, InferenceError> {
            Ok(rows
                .iter()
                .map(|_| {
                    if self.p_high >= 0.5 {
                        RiskClass::High
                    } else {
                        RiskClass::Low
                    }
                })
                .collect())
        }

        fn predict_proba(&self, rows: &[Vec<f64>]) -> Result<Vec<[f64; 2]>, InferenceError> {
            Ok(rows
                .iter()
                .map(|_| [1.0 - self.p_high, self.p_high])
                .collect())
        }
    }

    struct FailingClassifier;

    impl Classifier for FailingClassifier {
        fn predict(&self, _rows: &[Vec<f64>]) -> Result<Vec<RiskClass>, InferenceError> {
            Err(InferenceError::NonFinite)
        }

        fn predict_proba(&self, _rows: &[Vec<f64>]) -> Result<Vec<[f64; 2]>, InferenceError> {
            Err(InferenceError::NonFinite)
        }
    }

    fn test_record() -> FeatureRecord {
        FeatureRecord::validate(&[1.0, 0.0, 500.0, 90.0, 24.5, 2.0, 110.0, 180.0])
            .expect("valid record")
    }

    fn drain_final(handle: &InferenceWorkerHandle) -> InferenceProgress {
        let mut last = handle
            .progress_rx
            .recv_timeout(Duration::from_secs(5))
            .expect("first update");
        while let Ok(update) = handle.progress_rx.recv_timeout(Duration::from_secs(5)) {
            last = update;
        }
        last
    }

    #[test]
    fn test_worker_delivers_assessment() {
        let service = Arc::new(InferenceService::new(Arc::new(FixedClassifier {
            p_high: 0.9,
        })));
        let handle = InferenceWorker::spawn(service, test_record());

        match drain_final(&handle) {
            InferenceProgress::Complete(assessment) => {
                assert_eq!(assessment.result.predicted_class, RiskClass::High);
            }
            other => panic!("expected Complete, got {other:?}"),
        }
    }

    #[test]
    fn test_worker_reports_error() {
        let service = Arc::new(InferenceService::new(Arc::new(FailingClassifier)));
        let handle = InferenceWorker::spawn(service, test_record());

        match drain_final(&handle) {
            InferenceProgress::Error(message) => {
                assert!(!message.is_empty());
            }
            other => panic!("expected Error, got {other:?}"),
        }
    }
}
