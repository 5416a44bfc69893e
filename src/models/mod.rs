//! Model artifacts and cost inference

pub mod loader;
pub mod predictor;
pub mod preprocessor;
pub mod regressor;

pub use loader::{ArtifactError, ModelLoader};
pub use predictor::{CostEstimate, CostPredictor};
pub use preprocessor::{FeatureEncoder, Preprocessor, RawEncoder};
pub use regressor::{OnnxRegressor, Regressor};
