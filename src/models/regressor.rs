//! Regression model backends

use crate::models::loader::LoadedModel;
use anyhow::{anyhow, Context, Result};
use ort::value::Tensor;
use std::sync::Mutex;
use tracing::debug;

/// A model mapping one encoded row to one numeric prediction
pub trait Regressor: Send + Sync {
    fn name(&self) -> &str;

    /// Predict the value for a single feature row
    fn predict(&self, features: &[f32]) -> Result<f64>;
}

/// Regressor backed by an ONNX Runtime session
pub struct OnnxRegressor {
    name: String,
    // Running a session needs `&mut`
    model: Mutex<LoadedModel>,
}

impl OnnxRegressor {
    pub fn new(model: LoadedModel) -> Self {
        Self {
            name: model.name.clone(),
            model: Mutex::new(model),
        }
    }
}

impl Regressor for OnnxRegressor {
    fn name(&self) -> &str {
        &self.name
    }

    fn predict(&self, features: &[f32]) -> Result<f64> {
        // Input tensor shape [1, num_features]
        let shape = vec![1_i64, features.len() as i64];
        let input_tensor =
            Tensor::from_array((shape, features.to_vec())).context("Failed to create input tensor")?;

        let mut guard = self
            .model
            .lock()
            .map_err(|e| anyhow!("Lock error: {}", e))?;
        let model = &mut *guard;

        let outputs = model
            .session
            .run(ort::inputs![model.input_name.as_str() => input_tensor])?;

        let output = outputs
            .get(model.output_name.as_str())
            .ok_or_else(|| anyhow!("Model produced no output named '{}'", model.output_name))?;
        let (_, data) = output.try_extract_tensor::<f32>()?;
        let value = data
            .first()
            .copied()
            .ok_or_else(|| anyhow!("Model returned an empty prediction"))?;

        debug!(model = %self.name, value = value, "Regression output extracted");
        Ok(value as f64)
    }
}
