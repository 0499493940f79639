//! Inference service: Orchestrates risk assessment.
//!
//! This service coordinates:
//! - Single-row matrix projection of a validated record
//! - Classifier prediction (label + calibrated probabilities)
//! - Recommendation mapping
//!
//! The service is stateless per request. Inference is deterministic, so no
//! retries are performed and no partial results are returned.

use std::sync::Arc;

use crate::domain::{recommendation_for, FeatureRecord, PredictionResult, RiskAssessment};
use crate::ports::Classifier;
use crate::TransfuseError;

/// Service for running risk assessments.
pub struct InferenceService<C>
where
    C: Classifier,
{
    classifier: Arc<C>,
}

impl<C> InferenceService<C>
where
    C: Classifier,
{
    /// Create a new inference service.
    pub fn new(classifier: Arc<C>) -> Self {
        Self { classifier }
    }

    /// Run a risk assessment for a validated record.
    ///
    /// Performs the full pipeline:
    /// 1. Project the record to a single-row matrix
    /// 2. Obtain calibrated probabilities from the classifier
    /// 3. Map to a prediction result and recommendation
    ///
    /// The predicted class is derived from the probability pair itself, so
    /// the label always equals the argmax of the probabilities.
    ///
    /// # Errors
    /// Returns `TransfuseError::Inference` if the classifier fails on the
    /// validated input. The request is aborted; no partial result is kept.
    pub fn assess(&self, record: &FeatureRecord) -> Result<RiskAssessment, TransfuseError> {
        tracing::debug!("Step 1: Projecting record to single-row matrix...");
        let rows = vec![record.to_row()];

        tracing::debug!("Step 2: Running classifier...");
        let proba = self.classifier.predict_proba(&rows)?;
        let result = PredictionResult::from_p_high(proba[0][1]);

        tracing::debug!("Step 3: Mapping recommendation...");
        let recommendation = recommendation_for(&result);
        let assessment = RiskAssessment::new(result, recommendation);

        tracing::info!(
            "Assessment {} complete: class={}, confidence={:.1}%",
            assessment.id,
            result.predicted_class,
            result.confidence()
        );

        Ok(assessment)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::RiskClass;
    use crate::ports::InferenceError;

    /// Stub classifier returning a fixed high-risk probability.
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
            Ok(rows.iter().map(|_| [1.0 - self.p_high, self.p_high]).collect())
        }
    }

    /// Stub classifier that always fails.
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

    #[test]
    fn test_assess_high_risk() {
        let service = InferenceService::new(Arc::new(FixedClassifier { p_high: 0.917 }));
        let assessment = service.assess(&test_record()).expect("assess");

        assert_eq!(assessment.result.predicted_class, RiskClass::High);
        assert!((assessment.result.confidence() - 91.7).abs() < 1e-9);
        assert!(assessment.recommendation.contains("91.7%"));
        assert!(assessment.recommendation.contains("blood reserve"));
    }

    #[test]
    fn test_assess_low_risk() {
        let service = InferenceService::new(Arc::new(FixedClassifier { p_high: 0.2 }));
        let assessment = service.assess(&test_record()).expect("assess");

        assert_eq!(assessment.result.predicted_class, RiskClass::Low);
        assert!(assessment.recommendation.contains("lower risk"));
    }

    #[test]
    fn test_assess_class_is_argmax() {
        for &p in &[0.1, 0.49, 0.5, 0.51, 0.9] {
            let service = InferenceService::new(Arc::new(FixedClassifier { p_high: p }));
            let assessment = service.assess(&test_record()).expect("assess");
            let proba = assessment.result.class_probabilities;
            let argmax = usize::from(proba[1] >= proba[0]);
            assert_eq!(assessment.result.predicted_class.index(), argmax);
        }
    }

    #[test]
    fn test_classifier_failure_aborts_request() {
        let service = InferenceService::new(Arc::new(FailingClassifier));
        let err = service.assess(&test_record()).expect_err("must fail");
        assert!(matches!(err, TransfuseError::Inference(_)));
    }

    #[test]
    fn test_assess_with_svm_artifact() {
        use crate::adapters::svm::{ExportedSvmModel, SvmClassifier, MODEL_FILE};
        use crate::domain::schema;

        std::env::set_var("TRANSFUSEAI_ALLOW_UNSIGNED_MODELS", "true");

        let model = ExportedSvmModel {
            feature_names: schema::feature_names()
                .iter()
                .map(ToString::to_string)
                .collect(),
            scaler_mean: vec![0.5, 0.2, 400.0, 120.0, 23.0, 5.0, 115.0, 200.0],
            scaler_std: vec![0.5, 0.4, 300.0, 60.0, 3.5, 4.0, 15.0, 60.0],
            weights: vec![0.4, 0.3, 0.8, 0.6, -0.2, 0.1, -1.1, -0.3],
            bias: -0.25,
            platt_a: -1.7,
            platt_b: 0.05,
        };
        let temp = tempfile::tempdir().expect("tempdir");
        std::fs::write(
            temp.path().join(MODEL_FILE),
            serde_json::to_string(&model).expect("serialize"),
        )
        .expect("write model");

        let classifier = SvmClassifier::load(temp.path()).expect("load model");
        let service = InferenceService::new(Arc::new(classifier));
        let assessment = service.assess(&test_record()).expect("assess");

        let proba = assessment.result.class_probabilities;
        assert!((proba[0] + proba[1] - 1.0).abs() < 1e-9);
        match assessment.result.predicted_class {
            RiskClass::High => {
                assert!(assessment.recommendation.contains("Recommended measures"));
            }
            RiskClass::Low => {
                assert!(assessment.recommendation.contains("lower risk"));
            }
        }
    }
}
