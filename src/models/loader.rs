//! ONNX model loader

use anyhow::Result;
use ort::session::{builder::GraphOptimizationLevel, Session};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

/// Startup failure while reading an artifact from disk
#[derive(Debug, Error)]
pub enum ArtifactError {
    #[error("artifact not found: {}", .path.display())]
    Missing { path: PathBuf },

    #[error("artifact {} could not be loaded: {reason}", .path.display())]
    Malformed { path: PathBuf, reason: String },
}

impl ArtifactError {
    pub fn path(&self) -> &Path {
        match self {
            ArtifactError::Missing { path } | ArtifactError::Malformed { path, .. } => path,
        }
    }

    /// Static message shown on the page when startup failed
    pub fn user_message(&self) -> String {
        let file = self
            .path()
            .file_name()
            .map(|f| f.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path().display().to_string());
        match self {
            ArtifactError::Missing { .. } => format!(
                "Model file not found. Please ensure '{}' is in the same directory.",
                file
            ),
            ArtifactError::Malformed { .. } => {
                format!("Failed to load model artifact '{}'.", file)
            }
        }
    }
}

/// Loaded ONNX model with metadata
pub struct LoadedModel {
    /// Model name
    pub name: String,
    /// ONNX Runtime session
    pub session: Session,
    /// Input name for the model
    pub input_name: String,
    /// Output name holding the regression value
    pub output_name: String,
}

/// Loader for ONNX models
pub struct ModelLoader {
    onnx_threads: usize,
}

impl ModelLoader {
    /// Create a new model loader with the given intra-op thread count
    pub fn with_threads(onnx_threads: usize) -> Result<Self> {
        ort::init().commit()?;
        info!(onnx_threads = onnx_threads, "ONNX Runtime initialized");
        Ok(Self {
            onnx_threads: onnx_threads.max(1),
        })
    }

    /// Load a single ONNX model from file.
    ///
    /// A missing file is reported before ONNX Runtime is touched.
    pub fn load_model<P: AsRef<Path>>(&self, path: P, name: &str) -> Result<LoadedModel> {
        let path = path.as_ref();
        ensure_present(path)?;

        info!(model = %name, path = %path.display(), threads = self.onnx_threads, "Loading ONNX model");

        let session =
            build_session(path, self.onnx_threads).map_err(|e| ArtifactError::Malformed {
                path: path.to_path_buf(),
                reason: format!("{:#}", e),
            })?;

        let input_name = session
            .inputs
            .first()
            .map(|i| i.name.clone())
            .unwrap_or_else(|| "float_input".to_string());

        // skl2onnx names regressor outputs "variable"
        let output_name = session
            .outputs
            .iter()
            .find(|o| {
                o.name.contains("variable") || o.name.contains("output") || o.name.contains("predict")
            })
            .or_else(|| session.outputs.first())
            .map(|o| o.name.clone())
            .unwrap_or_else(|| "variable".to_string());

        info!(
            model = %name,
            input = %input_name,
            output = %output_name,
            "Model loaded successfully"
        );

        Ok(LoadedModel {
            name: name.to_string(),
            session,
            input_name,
            output_name,
        })
    }
}

fn build_session(path: &Path, threads: usize) -> Result<Session> {
    let session = Session::builder()?
        .with_optimization_level(GraphOptimizationLevel::Level3)?
        .with_intra_threads(threads)?
        .commit_from_file(path)?;
    Ok(session)
}

/// Fail with [`ArtifactError::Missing`] unless `path` is an existing file
pub fn ensure_present(path: &Path) -> Result<(), ArtifactError> {
    if path.is_file() {
        Ok(())
    } else {
        Err(ArtifactError::Missing {
            path: path.to_path_buf(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_detected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("insurance_model_pipeline.onnx");

        let err = ensure_present(&path).unwrap_err();
        assert!(matches!(err, ArtifactError::Missing { .. }));
        assert_eq!(
            err.user_message(),
            "Model file not found. Please ensure 'insurance_model_pipeline.onnx' is in the same directory."
        );
    }

    #[test]
    fn test_directory_is_not_an_artifact() {
        let dir = tempfile::tempdir().unwrap();
        assert!(ensure_present(dir.path()).is_err());
    }

    #[test]
    fn test_malformed_message_names_file() {
        let err = ArtifactError::Malformed {
            path: PathBuf::from("models/broken.onnx"),
            reason: "protobuf parsing failed".to_string(),
        };
        assert_eq!(err.user_message(), "Failed to load model artifact 'broken.onnx'.");
        assert!(err.to_string().contains("protobuf parsing failed"));
    }
}
