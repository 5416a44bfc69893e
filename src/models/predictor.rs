//! Cost prediction engine: encoder plus regression model

use crate::config::{ArtifactLayout, ModelsConfig};
use crate::currency::format_usd;
use crate::models::loader::{ensure_present, ModelLoader};
use crate::models::preprocessor::{FeatureEncoder, Preprocessor, RawEncoder};
use crate::models::regressor::{OnnxRegressor, Regressor};
use crate::types::PolicyHolder;
use anyhow::{bail, Context, Result};
use tracing::{debug, info};

/// A single cost estimate
#[derive(Debug, Clone, PartialEq)]
pub struct CostEstimate {
    /// Predicted yearly cost in dollars, never negative
    pub amount: f64,
    /// Amount formatted for display, e.g. `$5,000.00`
    pub display: String,
}

impl CostEstimate {
    pub fn new(amount: f64) -> Self {
        Self {
            amount,
            display: format_usd(amount),
        }
    }
}

/// Read-only prediction handle, built once at startup and shared across requests
pub struct CostPredictor {
    encoder: Box<dyn FeatureEncoder>,
    regressor: Box<dyn Regressor>,
    layout: ArtifactLayout,
}

impl CostPredictor {
    /// Load the configured artifacts.
    ///
    /// Every artifact is checked for presence before ONNX Runtime starts.
    pub fn load(config: &ModelsConfig) -> Result<Self> {
        let model_path = config.model_path();
        ensure_present(&model_path)?;

        let encoder: Box<dyn FeatureEncoder> = match config.layout {
            ArtifactLayout::Pipeline => Box::new(RawEncoder::new()),
            ArtifactLayout::Separate => {
                Box::new(Preprocessor::from_file(config.preprocessor_path())?)
            }
        };

        let loader = ModelLoader::with_threads(config.onnx_threads)
            .context("Failed to initialize ONNX Runtime")?;
        let model = loader.load_model(&model_path, model_name(&config.model_file))?;

        info!(
            layout = config.layout.as_str(),
            model = %model.name,
            features = encoder.feature_count(),
            "Cost predictor ready"
        );

        Ok(Self {
            encoder,
            regressor: Box::new(OnnxRegressor::new(model)),
            layout: config.layout,
        })
    }

    /// Assemble a predictor from already-built parts
    pub fn from_parts(
        encoder: Box<dyn FeatureEncoder>,
        regressor: Box<dyn Regressor>,
        layout: ArtifactLayout,
    ) -> Self {
        Self {
            encoder,
            regressor,
            layout,
        }
    }

    pub fn layout(&self) -> ArtifactLayout {
        self.layout
    }

    pub fn model_name(&self) -> &str {
        self.regressor.name()
    }

    pub fn feature_count(&self) -> usize {
        self.encoder.feature_count()
    }

    /// Transform the record, run the model and take its single output
    pub fn predict(&self, record: &PolicyHolder) -> Result<CostEstimate> {
        let features = self.encoder.transform(record)?;
        let raw = self.regressor.predict(&features)?;

        if !raw.is_finite() {
            bail!("model returned a non-finite value ({})", raw);
        }
        if raw < 0.0 {
            debug!(model = %self.regressor.name(), raw = raw, "Negative prediction clamped to zero");
        }

        Ok(CostEstimate::new(raw.max(0.0)))
    }
}

fn model_name(file: &str) -> &str {
    file.rsplit_once('.').map(|(stem, _)| stem).unwrap_or(file)
}


#[cfg(test)]
mod tests {
    use super::testing::*;
    use super::*;
    use crate::models::loader::ArtifactError;
    use crate::types::{Region, Sex, Smoker};
    use std::sync::atomic::Ordering;

    #[test]
    fn test_reference_record() {
        let (predictor, calls) = fixed_predictor(5000.0);
        let record = PolicyHolder {
            age: 30,
            bmi: 25.0,
            children: 0,
            sex: Sex::Male,
            smoker: Smoker::No,
            region: Region::Northeast,
        };

        let estimate = predictor.predict(&record).unwrap();
        assert_eq!(estimate.amount, 5000.0);
        assert_eq!(estimate.display, "$5,000.00");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_negative_output_clamped() {
        let (predictor, _) = fixed_predictor(-321.0);
        let estimate = predictor.predict(&PolicyHolder::default()).unwrap();
        assert_eq!(estimate.amount, 0.0);
        assert_eq!(estimate.display, "$0.00");
    }

    #[test]
    fn test_non_finite_output_is_error() {
        let (predictor, _) = fixed_predictor(f64::NAN);
        let err = predictor.predict(&PolicyHolder::default()).unwrap_err();
        assert!(err.to_string().contains("non-finite"));
    }

    #[test]
    fn test_model_error_propagates() {
        let predictor = failing_predictor("input has 6 features, expected 11");
        let err = predictor.predict(&PolicyHolder::default()).unwrap_err();
        assert_eq!(err.to_string(), "input has 6 features, expected 11");
    }

    #[test]
    fn test_load_with_missing_model() {
        let dir = tempfile::tempdir().unwrap();
        let config = ModelsConfig {
            models_dir: dir.path().display().to_string(),
            ..ModelsConfig::default()
        };

        let err = CostPredictor::load(&config).err().unwrap();
        assert!(matches!(
            err.downcast_ref::<ArtifactError>(),
            Some(ArtifactError::Missing { .. })
        ));
    }

    #[test]
    fn test_load_with_missing_preprocessor() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("insurance_model.onnx"), b"onnx").unwrap();
        let config = ModelsConfig {
            models_dir: dir.path().display().to_string(),
            model_file: "insurance_model.onnx".to_string(),
            layout: ArtifactLayout::Separate,
            ..ModelsConfig::default()
        };

        let err = CostPredictor::load(&config).err().unwrap();
        match err.downcast_ref::<ArtifactError>() {
            Some(missing @ ArtifactError::Missing { .. }) => {
                assert!(missing.user_message().contains("preprocessor.json"));
            }
            other => panic!("expected missing preprocessor, got {:?}", other),
        }
    }

    #[test]
    fn test_model_name_from_file() {
        assert_eq!(model_name("insurance_model_pipeline.onnx"), "insurance_model_pipeline");
        assert_eq!(model_name("model"), "model");
    }
}
