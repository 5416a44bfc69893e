//! Configuration management for the insurance cost predictor

use anyhow::{ensure, Context, Result};
use config::{Config, File};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Where input preprocessing happens
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ArtifactLayout {
    /// The model graph embeds its own preprocessing and takes the raw row
    #[default]
    Pipeline,
    /// A separate preprocessor artifact transforms the row before predict
    Separate,
}

impl ArtifactLayout {
    pub fn as_str(&self) -> &'static str {
        match self {
            ArtifactLayout::Pipeline => "pipeline",
            ArtifactLayout::Separate => "separate",
        }
    }
}

/// Main application configuration
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub models: ModelsConfig,
    pub validation: ValidationConfig,
    pub metrics: MetricsConfig,
    pub logging: LoggingConfig,
}

/// HTTP listener configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Number of HTTP workers
    pub workers: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8501,
            workers: 1,
        }
    }
}

/// Model artifact configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ModelsConfig {
    /// Directory holding the artifacts
    pub models_dir: String,
    /// ONNX regression model file name
    pub model_file: String,
    /// Preprocessor file name, only read with the `separate` layout
    pub preprocessor_file: String,
    pub layout: ArtifactLayout,
    /// Intra-op threads for ONNX Runtime
    pub onnx_threads: usize,
}

impl Default for ModelsConfig {
    fn default() -> Self {
        Self {
            models_dir: ".".to_string(),
            model_file: "insurance_model_pipeline.onnx".to_string(),
            preprocessor_file: "preprocessor.json".to_string(),
            layout: ArtifactLayout::Pipeline,
            onnx_threads: 1,
        }
    }
}

impl ModelsConfig {
    pub fn model_path(&self) -> PathBuf {
        Path::new(&self.models_dir).join(&self.model_file)
    }

    pub fn preprocessor_path(&self) -> PathBuf {
        Path::new(&self.models_dir).join(&self.preprocessor_file)
    }
}

/// Input validation configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ValidationConfig {
    /// Upper BMI bound accepted by the form
    pub bmi_max: f64,
    /// Re-check ranges after submission and warn instead of predicting
    pub recheck: bool,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            bmi_max: 60.0,
            recheck: true,
        }
    }
}

/// Periodic metrics summary
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MetricsConfig {
    /// Seconds between summaries, 0 disables the reporter
    pub report_interval_secs: u64,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            report_interval_secs: 300,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
    /// Log format (json, pretty)
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

impl AppConfig {
    /// Load configuration from `config/config.toml`, falling back to defaults
    pub fn load() -> Result<Self> {
        let config = Config::builder()
            .add_source(File::with_name("config/config").required(false))
            .build()
            .context("Failed to build configuration")?;

        let app: AppConfig = config
            .try_deserialize()
            .context("Failed to deserialize configuration")?;
        app.validate()?;
        Ok(app)
    }

    /// Load configuration from a specific path
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let config = Config::builder()
            .add_source(File::from(path.as_ref()))
            .build()
            .context("Failed to build configuration")?;

        let app: AppConfig = config
            .try_deserialize()
            .context("Failed to deserialize configuration")?;
        app.validate()?;
        Ok(app)
    }

    fn validate(&self) -> Result<()> {
        ensure!(
            self.validation.bmi_max.is_finite() && self.validation.bmi_max > 10.0,
            "validation.bmi_max must be greater than 10.0 (got {})",
            self.validation.bmi_max
        );
        ensure!(self.server.port != 0, "server.port must be non-zero");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.server.port, 8501);
        assert_eq!(config.server.workers, 1);
        assert_eq!(config.models.layout, ArtifactLayout::Pipeline);
        assert_eq!(config.validation.bmi_max, 60.0);
        assert!(config.validation.recheck);
        assert_eq!(
            config.models.model_path(),
            Path::new(".").join("insurance_model_pipeline.onnx")
        );
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            "[models]\nlayout = \"separate\"\nmodels_dir = \"artifacts\"\n\n[validation]\nbmi_max = 100.0"
        )
        .unwrap();

        let config = AppConfig::load_from_path(file.path()).unwrap();
        assert_eq!(config.models.layout, ArtifactLayout::Separate);
        assert_eq!(config.models.preprocessor_file, "preprocessor.json");
        assert_eq!(
            config.models.preprocessor_path(),
            Path::new("artifacts").join("preprocessor.json")
        );
        assert_eq!(config.validation.bmi_max, 100.0);
        assert!(config.validation.recheck);
        assert_eq!(config.server.host, "127.0.0.1");
    }

    #[test]
    fn test_rejects_bad_bmi_ceiling() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "[validation]\nbmi_max = 5.0").unwrap();

        let err = AppConfig::load_from_path(file.path()).unwrap_err();
        assert!(err.to_string().contains("bmi_max"));
    }
}
