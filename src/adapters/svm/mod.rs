//! SVM adapter: Implementation of Classifier from a serialized model export.
//!
//! Loads a JSON export of a Platt-calibrated linear SVM (standard scaler,
//! decision function, sigmoid calibration) and serves predictions from it.
//!
//! # Security
//!
//! - Model files are verified via Ed25519 digital signatures
//! - Only models signed by the developer key are loaded
//! - In release builds, ALL models MUST have valid signatures
//!
//! # Prediction consistency
//!
//! The calibrated high-risk probability is computed exactly once per row and
//! the class label is derived from it. `predict` and `predict_proba` on the
//! same rows therefore always agree (the label is the argmax of the pair).
//!
//! # Key Rotation
//!
//! To rotate the developer public key:
//! 1. Generate new keypair: `cargo run --bin generate_keypair`
//! 2. Replace `DEV_PUBKEY` constant with new public key bytes
//! 3. Re-sign the model with the new private key
//! 4. Securely destroy old private key

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use base64::Engine;
use ed25519_dalek::{Signature, Verifier, VerifyingKey};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::domain::{schema, RiskClass, FEATURE_COUNT};
use crate::ports::{Classifier, InferenceError};

/// File name of the model artifact inside the model directory.
pub const MODEL_FILE: &str = "svm_model.json";

/// Environment variable to allow loading unsigned models.
///
/// SECURITY: This bypass is compiled only in debug builds.
/// In release builds, it is physically impossible to skip model signature checks.
#[cfg(debug_assertions)]
const ALLOW_UNSIGNED_MODELS_ENV: &str = "TRANSFUSEAI_ALLOW_UNSIGNED_MODELS";

/// Error type for model loading and verification.
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    #[error("Failed to read model artifact: {0}")]
    Read(String),

    #[error("Invalid model artifact: {0}")]
    Format(String),

    #[error("Model signature rejected: {0}")]
    Signature(String),
}

/// Model parameters exported by the training pipeline.
///
/// Standardization happens inside the adapter; callers pass raw feature rows.
/// The decision function is `w . z + b` over standardized features, and the
/// calibrated probability is `1 / (1 + exp(platt_a * f + platt_b))`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportedSvmModel {
    pub feature_names: Vec<String>,
    pub scaler_mean: Vec<f64>,
    pub scaler_std: Vec<f64>,
    pub weights: Vec<f64>,
    pub bias: f64,
    pub platt_a: f64,
    pub platt_b: f64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
struct SignedModelManifest {
    version: u32,
    files: BTreeMap<String, String>,
}

/// Classifier backed by the exported SVM parameters.
///
/// Loaded once at startup and read-only afterwards; safe to share behind an
/// `Arc` across threads.
#[derive(Debug)]
pub struct SvmClassifier {
    model: ExportedSvmModel,
}

impl SvmClassifier {
    /// Load and verify the model artifact from a directory.
    ///
    /// # Security
    ///
    /// The model must be signed with the developer's Ed25519 key.
    /// The signature file (`model.sig`) must be present and valid.
    ///
    /// # Errors
    /// Returns `ModelError` if the artifact cannot be read, fails the
    /// signature check, or fails sanity checks. All failures are fatal to
    /// startup; the process must not begin serving without a model.
    pub fn load(model_dir: &Path) -> Result<Self, ModelError> {
        Self::verify_model_signature(model_dir)?;

        let model_path = model_dir.join(MODEL_FILE);
        let content = fs::read_to_string(&model_path)
            .map_err(|e| ModelError::Read(format!("{}: {e}", model_path.display())))?;
        let model: ExportedSvmModel =
            serde_json::from_str(&content).map_err(|e| ModelError::Format(e.to_string()))?;

        Self::sanity_check(&model)?;

        tracing::info!(
            "Loaded model from {:?} (n_features={}, platt_a={:.4}, platt_b={:.4})",
            model_path,
            model.feature_names.len(),
            model.platt_a,
            model.platt_b
        );

        Ok(Self { model })
    }

    /// Validate the artifact against the feature schema.
    ///
    /// Checks run in declaration order so the first structural problem is the
    /// one reported.
    fn sanity_check(model: &ExportedSvmModel) -> Result<(), ModelError> {
        let expected = schema::feature_names();
        if model.feature_names.len() != FEATURE_COUNT {
            return Err(ModelError::Format(format!(
                "Model declares {} features, expected {FEATURE_COUNT}",
                model.feature_names.len()
            )));
        }
        for (i, (actual, expected)) in model.feature_names.iter().zip(expected.iter()).enumerate() {
            if actual != expected {
                return Err(ModelError::Format(format!(
                    "Feature {i} is {actual:?}, expected {expected:?}"
                )));
            }
        }
        if model.scaler_mean.len() != FEATURE_COUNT
            || model.scaler_std.len() != FEATURE_COUNT
            || model.weights.len() != FEATURE_COUNT
        {
            return Err(ModelError::Format(
                "Model parameter lengths do not match feature_names length".into(),
            ));
        }
        let all_params = model
            .scaler_mean
            .iter()
            .chain(model.scaler_std.iter())
            .chain(model.weights.iter())
            .chain([&model.bias, &model.platt_a, &model.platt_b]);
        for &v in all_params {
            if !v.is_finite() {
                return Err(ModelError::Format(
                    "Model contains a non-finite parameter".into(),
                ));
            }
        }
        if model.scaler_std.iter().any(|&s| s <= 0.0) {
            return Err(ModelError::Format(
                "Scaler standard deviations must be positive".into(),
            ));
        }
        Ok(())
    }

    /// Verify model signature using Ed25519.
    ///
    /// Checks that the signed manifest binds `svm_model.json` by SHA-256.
    fn verify_model_signature(model_dir: &Path) -> Result<(), ModelError> {
        #[cfg(debug_assertions)]
        fn allow_unsigned_models_for_debug() -> bool {
            std::env::var(ALLOW_UNSIGNED_MODELS_ENV)
                .map(|v| v == "true")
                .unwrap_or(false)
        }

        let sig_path = model_dir.join("model.sig");
        let manifest_path = model_dir.join("manifest.json");

        // SECURITY: Signature verification is MANDATORY in release builds.
        // In debug builds, can be bypassed ONLY with explicit env var for testing.
        if !sig_path.exists() || !manifest_path.exists() {
            #[cfg(not(debug_assertions))]
            {
                tracing::error!(
                    "Model signature not found at {:?}. \
                     Production builds require signed models.",
                    sig_path
                );
                return Err(ModelError::Signature(
                    "Model signature required in production".into(),
                ));
            }

            #[cfg(debug_assertions)]
            {
                if allow_unsigned_models_for_debug() {
                    tracing::warn!(
                        "Loading UNSIGNED model ({ALLOW_UNSIGNED_MODELS_ENV}=true). \
                         This is only allowed in debug builds for testing."
                    );
                    return Ok(());
                }
                tracing::error!(
                    "Model signature not found at {:?}. \
                     Set {ALLOW_UNSIGNED_MODELS_ENV}=true to bypass in debug builds.",
                    sig_path
                );
                return Err(ModelError::Signature(format!(
                    "Model signature required. Set {ALLOW_UNSIGNED_MODELS_ENV}=true for testing."
                )));
            }
        }

        let sig_bytes = fs::read(&sig_path)
            .map_err(|e| ModelError::Signature(format!("Failed to read signature: {e}")))?;

        if sig_bytes.len() != 64 {
            return Err(ModelError::Signature(
                "Invalid signature length (expected 64 bytes)".into(),
            ));
        }

        let signature = Signature::from_bytes(
            sig_bytes
                .as_slice()
                .try_into()
                .map_err(|_| ModelError::Signature("Invalid signature format".into()))?,
        );

        let manifest_content = fs::read(&manifest_path)
            .map_err(|e| ModelError::Signature(format!("Failed to read manifest: {e}")))?;

        let public_key = Self::developer_public_key()?;
        public_key
            .verify(&manifest_content, &signature)
            .map_err(|_| ModelError::Signature("Invalid model signature".into()))?;

        // Defense-in-depth: verify that the signed manifest binds the actual model file.
        let manifest: SignedModelManifest = serde_json::from_slice(&manifest_content)
            .map_err(|e| ModelError::Signature(format!("Invalid manifest.json format: {e}")))?;
        if manifest.version != 1 {
            return Err(ModelError::Signature(format!(
                "Unsupported manifest version: {}",
                manifest.version
            )));
        }
        if !manifest.files.contains_key(MODEL_FILE) {
            return Err(ModelError::Signature(format!(
                "manifest.json must include {MODEL_FILE}"
            )));
        }

        for (rel, expected_hex) in &manifest.files {
            let path = model_dir.join(rel);
            let bytes = fs::read(&path).map_err(|e| {
                ModelError::Signature(format!(
                    "Manifest references missing/unreadable file {:?}: {e}",
                    path
                ))
            })?;
            let actual_hex: String = Sha256::digest(&bytes)
                .iter()
                .map(|b| format!("{b:02x}"))
                .collect();

            if !constant_time_eq_str(&actual_hex, expected_hex) {
                return Err(ModelError::Signature(format!(
                    "File hash mismatch for {rel}"
                )));
            }
        }

        tracing::info!("Model signature and hashes verified successfully");
        Ok(())
    }

    /// Get the embedded developer public key for model verification.
    ///
    /// This key is compiled into the binary and used to verify all model signatures.
    fn developer_public_key() -> Result<VerifyingKey, ModelError> {
        // Runtime override (recommended for deployments): load verifying key from a
        // secret file instead of the embedded constant.
        const PUBKEY_FILE_ENV: &str = "TRANSFUSEAI_MODEL_SIGNING_PUBKEY_B64_FILE";

        if let Ok(path) = std::env::var(PUBKEY_FILE_ENV) {
            let b64 = fs::read_to_string(path.trim())
                .map_err(|e| ModelError::Signature(format!("Failed reading pubkey file: {e}")))?;
            return Self::verifying_key_from_b64(&b64);
        }

        #[cfg(test)]
        {
            // Test-only override: allows unit tests to generate a fresh keypair and
            // validate the signed-model workflow without embedding any private key.
            const TEST_PUBKEY_ENV: &str = "TRANSFUSEAI_TEST_DEV_PUBKEY_B64";
            if let Ok(b64) = std::env::var(TEST_PUBKEY_ENV) {
                return Self::verifying_key_from_b64(&b64)
                    .map_err(|_| ModelError::Signature("Invalid test verifying key".into()));
            }
        }

        // Ed25519 public key (32 bytes)
        // Generated with: cargo run --bin generate_keypair
        const DEV_PUBKEY: [u8; 32] = [
            0xa1, 0xe4, 0x90, 0x6f, 0x13, 0x48, 0x1b, 0x39, 0x26, 0xa7, 0x6f, 0xb3, 0x37, 0xc1,
            0x0e, 0x7d, 0xc5, 0xcc, 0x37, 0x1f, 0x77, 0x8c, 0x20, 0x21, 0x29, 0xcc, 0x51, 0x1a,
            0x2e, 0xe7, 0x42, 0x40,
        ];

        VerifyingKey::from_bytes(&DEV_PUBKEY)
            .map_err(|_| ModelError::Signature("Invalid embedded public key".into()))
    }

    fn verifying_key_from_b64(b64: &str) -> Result<VerifyingKey, ModelError> {
        let bytes = base64::engine::general_purpose::STANDARD
            .decode(b64.trim())
            .map_err(|_| ModelError::Signature("Invalid public key base64".into()))?;
        if bytes.len() != 32 {
            return Err(ModelError::Signature(
                "Invalid public key length (expected 32 bytes)".into(),
            ));
        }
        let mut pubkey = [0u8; 32];
        pubkey.copy_from_slice(&bytes);
        VerifyingKey::from_bytes(&pubkey)
            .map_err(|_| ModelError::Signature("Invalid verifying key".into()))
    }

    /// Calibrated high-risk probability for a single raw feature row.
    ///
    /// Standardizes with the artifact's scaler, evaluates the linear decision
    /// function, then applies the Platt sigmoid.
    fn p_high_for_row(&self, row: &[f64]) -> Result<f64, InferenceError> {
        let m = &self.model;
        if row.len() != FEATURE_COUNT {
            return Err(InferenceError::ShapeMismatch {
                expected: FEATURE_COUNT,
                actual: row.len(),
            });
        }

        let mut decision = m.bias;
        for i in 0..FEATURE_COUNT {
            let z = (row[i] - m.scaler_mean[i]) / m.scaler_std[i];
            decision += m.weights[i] * z;
        }

        let p_high = 1.0 / (1.0 + (m.platt_a * decision + m.platt_b).exp());
        if !p_high.is_finite() {
            return Err(InferenceError::NonFinite);
        }
        Ok(p_high.clamp(0.0, 1.0))
    }
}

impl Classifier for SvmClassifier {
    fn predict(&self, rows: &[Vec<f64>]) -> Result<Vec<RiskClass>, InferenceError> {
        rows.iter()
            .map(|row| {
                let p_high = self.p_high_for_row(row)?;
                Ok(if p_high >= 0.5 {
                    RiskClass::High
                } else {
                    RiskClass::Low
                })
            })
            .collect()
    }

    fn predict_proba(&self, rows: &[Vec<f64>]) -> Result<Vec<[f64; 2]>, InferenceError> {
        rows.iter()
            .map(|row| {
                let p_high = self.p_high_for_row(row)?;
                Ok([1.0 - p_high, p_high])
            })
            .collect()
    }
}

// Constant-time compare for ASCII strings (used for SHA-256 hex digests).
fn constant_time_eq_str(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut diff: u8 = 0;
    for (x, y) in a.as_bytes().iter().zip(b.as_bytes().iter()) {
        diff |= x ^ y;
    }
    diff == 0
}

#[cfg(test)]
mod tests {
    use super::*;
    use ed25519_dalek::{Signer, SigningKey};
    use rand::RngCore;
    use std::sync::Once;
    use tempfile::tempdir;

    fn allow_unsigned_models_for_tests() {
        static ONCE: Once = Once::new();
        ONCE.call_once(|| {
            std::env::set_var(ALLOW_UNSIGNED_MODELS_ENV, "true");
        });
    }

    fn sha256_hex(bytes: &[u8]) -> String {
        Sha256::digest(bytes)
            .iter()
            .map(|b| format!("{b:02x}"))
            .collect()
    }

    fn test_model() -> ExportedSvmModel {
        ExportedSvmModel {
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
        }
    }

    fn write_model(dir: &Path, model: &ExportedSvmModel) {
        let json = serde_json::to_string(model).expect("serialize model");
        std::fs::write(dir.join(MODEL_FILE), json).expect("write model");
    }

    fn write_signed_manifest(dir: &Path, signing_key: &SigningKey, files: &[(&str, Vec<u8>)]) {
        let mut map = BTreeMap::new();
        for (rel, contents) in files {
            map.insert((*rel).to_string(), sha256_hex(contents));
        }

        let manifest = SignedModelManifest {
            version: 1,
            files: map,
        };
        let manifest_bytes = serde_json::to_vec(&manifest).expect("serialize manifest");
        std::fs::write(dir.join("manifest.json"), &manifest_bytes).expect("write manifest");

        let signature: Signature = signing_key.sign(&manifest_bytes);
        std::fs::write(dir.join("model.sig"), signature.to_bytes()).expect("write signature");
    }

    fn test_signing_key() -> SigningKey {
        let mut sk = [0u8; 32];
        rand::thread_rng().fill_bytes(&mut sk);
        SigningKey::from_bytes(&sk)
    }

    fn loaded_classifier() -> SvmClassifier {
        allow_unsigned_models_for_tests();
        let temp = tempdir().expect("tempdir");
        write_model(temp.path(), &test_model());
        SvmClassifier::load(temp.path()).expect("load model")
    }

    #[test]
    fn test_load_signed_model() {
        let temp = tempdir().expect("tempdir");
        let dir = temp.path();
        write_model(dir, &test_model());

        let signing_key = test_signing_key();
        let pubkey_b64 = base64::engine::general_purpose::STANDARD
            .encode(signing_key.verifying_key().to_bytes());
        std::env::set_var("TRANSFUSEAI_TEST_DEV_PUBKEY_B64", pubkey_b64);

        let model_bytes = std::fs::read(dir.join(MODEL_FILE)).expect("read model");
        write_signed_manifest(dir, &signing_key, &[(MODEL_FILE, model_bytes)]);

        SvmClassifier::load(dir).expect("load signed model");

        std::env::remove_var("TRANSFUSEAI_TEST_DEV_PUBKEY_B64");
    }

    #[test]
    fn test_load_fails_on_hash_mismatch() {
        let temp = tempdir().expect("tempdir");
        let dir = temp.path();
        write_model(dir, &test_model());

        let signing_key = test_signing_key();
        let pubkey_b64 = base64::engine::general_purpose::STANDARD
            .encode(signing_key.verifying_key().to_bytes());
        std::env::set_var("TRANSFUSEAI_TEST_DEV_PUBKEY_B64", pubkey_b64);

        // Sign a manifest over different bytes than the artifact on disk.
        write_signed_manifest(dir, &signing_key, &[(MODEL_FILE, b"tampered".to_vec())]);

        let err = SvmClassifier::load(dir).expect_err("must fail");
        assert!(err.to_string().contains("hash mismatch"));

        std::env::remove_var("TRANSFUSEAI_TEST_DEV_PUBKEY_B64");
    }

    #[test]
    fn test_load_fails_on_wrong_feature_names() {
        allow_unsigned_models_for_tests();
        let temp = tempdir().expect("tempdir");

        let mut model = test_model();
        model.feature_names[0] = "age".to_string();
        write_model(temp.path(), &model);

        let err = SvmClassifier::load(temp.path()).expect_err("must fail");
        assert!(err.to_string().contains("Feature 0"));
    }

    #[test]
    fn test_load_fails_on_zero_std() {
        allow_unsigned_models_for_tests();
        let temp = tempdir().expect("tempdir");

        let mut model = test_model();
        model.scaler_std[3] = 0.0;
        write_model(temp.path(), &model);

        let err = SvmClassifier::load(temp.path()).expect_err("must fail");
        assert!(err.to_string().contains("positive"));
    }

    #[test]
    fn test_load_fails_on_length_mismatch() {
        allow_unsigned_models_for_tests();
        let temp = tempdir().expect("tempdir");

        let mut model = test_model();
        model.weights.pop();
        write_model(temp.path(), &model);

        let err = SvmClassifier::load(temp.path()).expect_err("must fail");
        assert!(err.to_string().contains("lengths"));
    }

    #[test]
    fn test_load_fails_on_non_finite_parameter() {
        allow_unsigned_models_for_tests();
        let temp = tempdir().expect("tempdir");

        let mut model = test_model();
        model.platt_b = f64::NAN;
        write_model(temp.path(), &model);

        let err = SvmClassifier::load(temp.path()).expect_err("must fail");
        assert!(err.to_string().contains("non-finite"));
    }

    #[test]
    fn test_proba_well_formed() {
        let classifier = loaded_classifier();
        let row = vec![1.0, 0.0, 500.0, 90.0, 24.5, 2.0, 110.0, 180.0];

        let proba = classifier.predict_proba(&[row]).expect("predict_proba");
        assert_eq!(proba.len(), 1);
        let [p_low, p_high] = proba[0];
        assert!((0.0..=1.0).contains(&p_low));
        assert!((0.0..=1.0).contains(&p_high));
        assert!((p_low + p_high - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_predict_agrees_with_proba_argmax() {
        let classifier = loaded_classifier();
        let rows = vec![
            vec![1.0, 0.0, 500.0, 90.0, 24.5, 2.0, 110.0, 180.0],
            vec![0.0, 1.0, 4000.0, 480.0, 45.0, 50.0, 45.0, 30.0],
            vec![1.0, 1.0, 0.0, 5.0, 18.0, 0.0, 160.0, 400.0],
        ];

        let classes = classifier.predict(&rows).expect("predict");
        let probas = classifier.predict_proba(&rows).expect("predict_proba");
        for (class, proba) in classes.iter().zip(probas.iter()) {
            let argmax = usize::from(proba[1] >= proba[0]);
            assert_eq!(class.index(), argmax);
        }
    }

    #[test]
    fn test_predict_is_deterministic() {
        let classifier = loaded_classifier();
        let row = vec![1.0, 0.0, 500.0, 90.0, 24.5, 2.0, 110.0, 180.0];

        let a = classifier.predict_proba(&[row.clone()]).expect("first");
        let b = classifier.predict_proba(&[row]).expect("second");
        assert_eq!(a[0][1].to_bits(), b[0][1].to_bits());
    }

    #[test]
    fn test_shape_mismatch_rejected() {
        let classifier = loaded_classifier();
        let err = classifier
            .predict(&[vec![1.0, 2.0, 3.0]])
            .expect_err("must fail");
        assert!(matches!(
            err,
            InferenceError::ShapeMismatch {
                expected: 8,
                actual: 3
            }
        ));
    }
}
