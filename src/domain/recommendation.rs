//! Clinical recommendation text.
//!
//! Pure mapping from a prediction result to advisory text. No clinical
//! directives are emitted for the low-risk class.

use super::prediction::{PredictionResult, RiskClass};

/// Render the recommendation for a prediction result.
///
/// The high-risk advisory interpolates the confidence to one decimal place
/// (e.g. "91.7%"). The low-risk branch is a neutral acknowledgment.
#[must_use]
pub fn recommendation_for(result: &PredictionResult) -> String {
    let confidence = result.confidence();
    match result.predicted_class {
        RiskClass::High => format!(
            "The patient is predicted to be at high risk of postoperative anemia \
             (confidence {confidence:.1}%). Recommended measures: increase the \
             intraoperative blood reserve volume; prefer combined spinal-epidural \
             anesthesia unless contraindicated; assign a senior surgeon experienced \
             with the procedure; monitor postoperative blood counts closely."
        ),
        RiskClass::Low => format!(
            "The patient is predicted to be at lower risk of postoperative anemia \
             (confidence {confidence:.1}%)."
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_high_risk_advisory_interpolates_confidence() {
        let result = PredictionResult::from_p_high(0.917);
        let text = recommendation_for(&result);
        assert!(text.contains("91.7%"));
        assert!(text.contains("high risk"));
        assert!(text.contains("blood reserve"));
        assert!(text.contains("spinal-epidural"));
        assert!(text.contains("senior surgeon"));
        assert!(text.contains("blood counts"));
    }

    #[test]
    fn test_low_risk_has_no_directives() {
        let result = PredictionResult::from_p_high(0.2);
        let text = recommendation_for(&result);
        assert!(text.contains("lower risk"));
        assert!(text.contains("80.0%"));
        assert!(!text.contains("Recommended measures"));
    }

    #[test]
    fn test_deterministic() {
        let result = PredictionResult::from_p_high(0.64);
        assert_eq!(recommendation_for(&result), recommendation_for(&result));
    }
}
