//! Prediction result types.
//!
//! Represents the output of the anemia risk classifier.

use serde::{Deserialize, Serialize};

/// Binary anemia risk classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RiskClass {
    /// Lower risk of postoperative anemia
    Low,
    /// High risk of postoperative anemia
    High,
}

impl RiskClass {
    /// Class index as emitted by the classifier (0 = low, 1 = high).
    #[must_use]
    pub fn index(self) -> usize {
        match self {
            Self::Low => 0,
            Self::High => 1,
        }
    }

    /// Human-readable risk label.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Low => "lower risk",
            Self::High => "high risk",
        }
    }

    /// Get the associated color for TUI display (RGB).
    #[must_use]
    pub fn color(self) -> (u8, u8, u8) {
        match self {
            Self::Low => (16, 185, 129), // Emerald (#10B981)
            Self::High => (244, 63, 94), // Rose (#F43F5E)
        }
    }
}

impl std::fmt::Display for RiskClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Low => write!(f, "LOW"),
            Self::High => write!(f, "HIGH"),
        }
    }
}

/// Classifier output for a single record.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PredictionResult {
    /// Predicted class, always the argmax of `class_probabilities`.
    pub predicted_class: RiskClass,

    /// Calibrated probabilities: index 0 = P(low), index 1 = P(high).
    pub class_probabilities: [f64; 2],
}

impl PredictionResult {
    /// Derive the full result from the calibrated high-risk probability.
    #[must_use]
    pub fn from_p_high(p_high: f64) -> Self {
        let predicted_class = if p_high >= 0.5 {
            RiskClass::High
        } else {
            RiskClass::Low
        };
        Self {
            predicted_class,
            class_probabilities: [1.0 - p_high, p_high],
        }
    }

    /// Probability of the predicted class, as a percentage (0-100).
    #[must_use]
    pub fn confidence(&self) -> f64 {
        self.class_probabilities[self.predicted_class.index()] * 100.0
    }
}

/// Complete per-request assessment including metadata.
///
/// Created fresh for each prediction and discarded after rendering. The id
/// exists only to correlate log lines for one request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskAssessment {
    /// Unique identifier for log correlation
    pub id: String,

    /// The classifier output
    pub result: PredictionResult,

    /// Clinical recommendation text
    pub recommendation: String,

    /// Timestamp of assessment
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl RiskAssessment {
    /// Create a new assessment from a prediction result.
    #[must_use]
    pub fn new(result: PredictionResult, recommendation: String) -> Self {
        Self {
            id: uuid_v4(),
            result,
            recommendation,
            created_at: chrono::Utc::now(),
        }
    }
}

/// Generate a simple UUID v4 (random) using CSPRNG.
///
/// Uses ChaCha20Rng seeded from OS entropy to ensure the id is unpredictable
/// on all platforms.
fn uuid_v4() -> String {
    use rand::Rng;
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;

    let mut rng = ChaCha20Rng::from_entropy();
    let bytes: [u8; 16] = rng.gen();

    format!(
        "{:02x}{:02x}{:02x}{:02x}-{:02x}{:02x}-{:02x}{:02x}-{:02x}{:02x}-{:02x}{:02x}{:02x}{:02x}{:02x}{:02x}",
        bytes[0], bytes[1], bytes[2], bytes[3],
        bytes[4], bytes[5],
        (bytes[6] & 0x0f) | 0x40, bytes[7],
        (bytes[8] & 0x3f) | 0x80, bytes[9],
        bytes[10], bytes[11], bytes[12], bytes[13], bytes[14], bytes[15]
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_class_from_probability() {
        assert_eq!(
            PredictionResult::from_p_high(0.1).predicted_class,
            RiskClass::Low
        );
        assert_eq!(
            PredictionResult::from_p_high(0.9).predicted_class,
            RiskClass::High
        );
    }

    #[test]
    fn test_probabilities_sum_to_one() {
        let result = PredictionResult::from_p_high(0.73);
        let sum: f64 = result.class_probabilities.iter().sum();
        assert!((sum - 1.0).abs() < 1e-12);
        assert!(result.class_probabilities.iter().all(|p| (0.0..=1.0).contains(p)));
    }

    #[test]
    fn test_class_is_argmax() {
        for &p in &[0.01, 0.49, 0.5, 0.51, 0.99] {
            let result = PredictionResult::from_p_high(p);
            let argmax = if result.class_probabilities[1] >= result.class_probabilities[0] {
                1
            } else {
                0
            };
            assert_eq!(result.predicted_class.index(), argmax);
        }
    }

    #[test]
    fn test_confidence_is_predicted_class_probability() {
        let result = PredictionResult::from_p_high(0.917);
        assert!((result.confidence() - 91.7).abs() < 1e-9);

        let result = PredictionResult::from_p_high(0.2);
        assert!((result.confidence() - 80.0).abs() < 1e-9);
    }

    #[test]
    fn test_assessment_creation() {
        let result = PredictionResult::from_p_high(0.75);
        let assessment = RiskAssessment::new(result, "advice".to_string());

        assert_eq!(assessment.result.predicted_class, RiskClass::High);
        assert_eq!(assessment.recommendation, "advice");
    }

    #[test]
    fn test_uuid_generation() {
        let id1 = uuid_v4();
        let id2 = uuid_v4();
        assert_ne!(id1, id2);
        assert_eq!(id1.len(), 36); // UUID format with dashes
    }
}
