//! Feature encoding for regression model inference.
//!
//! Turns a [`PolicyHolder`] into the float row the ONNX model consumes.
//! Two encoders exist: the raw row for models that embed their own
//! preprocessing, and a fitted column transformer loaded from JSON.

use crate::models::loader::{ensure_present, ArtifactError};
use crate::types::{Column, PolicyHolder, Region, Sex, Smoker};
use anyhow::{anyhow, Result};
use serde::Deserialize;
use std::path::Path;
use tracing::info;

/// Transforms a record into model input features
pub trait FeatureEncoder: Send + Sync {
    /// Encode one record; errors surface to the user verbatim
    fn transform(&self, record: &PolicyHolder) -> Result<Vec<f32>>;

    /// Output feature names, in row order
    fn feature_names(&self) -> Vec<String>;

    fn feature_count(&self) -> usize {
        self.feature_names().len()
    }
}

/// Raw row for pipeline models.
///
/// Columns keep training order. Categories are encoded by their index in the
/// sorted category list (female=0, male=1; no=0, yes=1; northeast=0 .. southwest=3).
#[derive(Debug, Default, Clone, Copy)]
pub struct RawEncoder;

impl RawEncoder {
    pub fn new() -> Self {
        Self
    }
}

impl FeatureEncoder for RawEncoder {
    fn transform(&self, record: &PolicyHolder) -> Result<Vec<f32>> {
        let sex = match record.sex {
            Sex::Female => 0.0,
            Sex::Male => 1.0,
        };
        let smoker = match record.smoker {
            Smoker::No => 0.0,
            Smoker::Yes => 1.0,
        };
        let region = match record.region {
            Region::Northeast => 0.0,
            Region::Northwest => 1.0,
            Region::Southeast => 2.0,
            Region::Southwest => 3.0,
        };

        Ok(vec![
            record.age as f32,
            sex,
            record.bmi as f32,
            record.children as f32,
            smoker,
            region,
        ])
    }

    fn feature_names(&self) -> Vec<String> {
        Column::ALL.iter().map(|c| c.name().to_string()).collect()
    }
}

/// Standard-scaled numeric column
#[derive(Debug, Clone, Deserialize)]
pub struct NumericColumn {
    pub column: Column,
    pub mean: f64,
    pub scale: f64,
}

/// One-hot encoded categorical column
#[derive(Debug, Clone, Deserialize)]
pub struct CategoricalColumn {
    pub column: Column,
    /// Fitted categories, in output order
    pub categories: Vec<String>,
    /// Drop the indicator of the first category
    #[serde(default)]
    pub drop_first: bool,
}

/// Fitted column transformer read from a JSON artifact.
///
/// Output is every numeric column, standardised, followed by the one-hot
/// blocks, both in file order.
#[derive(Debug, Clone, Deserialize)]
pub struct Preprocessor {
    #[serde(default)]
    pub numeric: Vec<NumericColumn>,
    #[serde(default)]
    pub categorical: Vec<CategoricalColumn>,
}

impl Preprocessor {
    /// Load and check a preprocessor artifact
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        ensure_present(path)?;

        let malformed = |reason: String| ArtifactError::Malformed {
            path: path.to_path_buf(),
            reason,
        };

        let raw = std::fs::read_to_string(path).map_err(|e| malformed(e.to_string()))?;
        let preprocessor: Preprocessor =
            serde_json::from_str(&raw).map_err(|e| malformed(e.to_string()))?;
        preprocessor.check().map_err(malformed)?;

        info!(
            path = %path.display(),
            numeric = preprocessor.numeric.len(),
            categorical = preprocessor.categorical.len(),
            features = preprocessor.feature_count(),
            "Preprocessor loaded"
        );

        Ok(preprocessor)
    }

    fn check(&self) -> std::result::Result<(), String> {
        if self.numeric.is_empty() && self.categorical.is_empty() {
            return Err("preprocessor defines no columns".to_string());
        }
        for spec in &self.numeric {
            if !spec.column.is_numeric() {
                return Err(format!("column '{}' is not numeric", spec.column));
            }
            if !spec.mean.is_finite() {
                return Err(format!("column '{}' has a non-finite mean", spec.column));
            }
            if !spec.scale.is_finite() || spec.scale == 0.0 {
                return Err(format!("column '{}' has an invalid scale {}", spec.column, spec.scale));
            }
        }
        for spec in &self.categorical {
            if spec.column.is_numeric() {
                return Err(format!("column '{}' is not categorical", spec.column));
            }
            if spec.categories.is_empty() {
                return Err(format!("column '{}' has no categories", spec.column));
            }
        }
        Ok(())
    }
}

impl FeatureEncoder for Preprocessor {
    fn transform(&self, record: &PolicyHolder) -> Result<Vec<f32>> {
        let mut features = Vec::with_capacity(self.feature_count());

        for spec in &self.numeric {
            let value = record
                .numeric(spec.column)
                .ok_or_else(|| anyhow!("column '{}' is not numeric", spec.column))?;
            features.push(((value - spec.mean) / spec.scale) as f32);
        }

        for spec in &self.categorical {
            let value = record
                .category(spec.column)
                .ok_or_else(|| anyhow!("column '{}' is not categorical", spec.column))?;
            let position = spec
                .categories
                .iter()
                .position(|c| c == value)
                .ok_or_else(|| {
                    anyhow!(
                        "Found unknown category '{}' in column '{}' during transform",
                        value,
                        spec.column
                    )
                })?;

            let skip = usize::from(spec.drop_first);
            for index in skip..spec.categories.len() {
                features.push(if index == position { 1.0 } else { 0.0 });
            }
        }

        Ok(features)
    }

    fn feature_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .numeric
            .iter()
            .map(|spec| spec.column.name().to_string())
            .collect();
        for spec in &self.categorical {
            let skip = usize::from(spec.drop_first);
            names.extend(
                spec.categories
                    .iter()
                    .skip(skip)
                    .map(|category| format!("{}_{}", spec.column, category)),
            );
        }
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const FITTED: &str = r#"{
        "numeric": [
            {"column": "age", "mean": 39.0, "scale": 14.0},
            {"column": "bmi", "mean": 30.0, "scale": 6.0},
            {"column": "children", "mean": 1.0, "scale": 1.0}
        ],
        "categorical": [
            {"column": "sex", "categories": ["female", "male"], "drop_first": true},
            {"column": "smoker", "categories": ["no", "yes"], "drop_first": true},
            {"column": "region", "categories": ["northeast", "northwest", "southeast", "southwest"]}
        ]
    }"#;

    fn write_artifact(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_raw_encoding() {
        let encoder = RawEncoder::new();
        let record = PolicyHolder {
            sex: Sex::Female,
            smoker: Smoker::No,
            region: Region::Southeast,
            ..PolicyHolder::default()
        };

        let features = encoder.transform(&record).unwrap();
        assert_eq!(features, vec![30.0, 0.0, 25.0, 0.0, 0.0, 2.0]);
        assert_eq!(encoder.feature_count(), 6);
        assert_eq!(encoder.feature_names()[2], "bmi");
    }

    #[test]
    fn test_fitted_transform() {
        let file = write_artifact(FITTED);
        let preprocessor = Preprocessor::from_file(file.path()).unwrap();

        let record = PolicyHolder {
            age: 53,
            bmi: 36.0,
            children: 3,
            sex: Sex::Male,
            smoker: Smoker::No,
            region: Region::Northwest,
        };
        let features = preprocessor.transform(&record).unwrap();

        assert_eq!(features.len(), preprocessor.feature_count());
        assert_eq!(features, vec![1.0, 1.0, 2.0, 1.0, 0.0, 0.0, 1.0, 0.0, 0.0]);
        assert_eq!(
            preprocessor.feature_names(),
            vec![
                "age",
                "bmi",
                "children",
                "sex_male",
                "smoker_yes",
                "region_northeast",
                "region_northwest",
                "region_southeast",
                "region_southwest"
            ]
        );
    }

    #[test]
    fn test_unknown_category_fails_at_transform() {
        let file = write_artifact(
            r#"{"categorical": [{"column": "region", "categories": ["northeast", "southeast"]}]}"#,
        );
        let preprocessor = Preprocessor::from_file(file.path()).unwrap();

        let record = PolicyHolder {
            region: Region::Southwest,
            ..PolicyHolder::default()
        };
        let err = preprocessor.transform(&record).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Found unknown category 'southwest' in column 'region' during transform"
        );
    }

    #[test]
    fn test_bundled_artifact_loads() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("artifacts/preprocessor.json");
        let preprocessor = Preprocessor::from_file(path).unwrap();

        assert_eq!(preprocessor.feature_count(), 8);
        let features = preprocessor.transform(&PolicyHolder::default()).unwrap();
        assert_eq!(features.len(), 8);
        // male, smoker, northeast
        assert_eq!(&features[3..], &[1.0, 1.0, 0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_missing_artifact() {
        let dir = tempfile::tempdir().unwrap();
        let err = Preprocessor::from_file(dir.path().join("preprocessor.json")).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ArtifactError>(),
            Some(ArtifactError::Missing { .. })
        ));
    }

    #[test]
    fn test_malformed_artifacts() {
        let cases = [
            "not json",
            r#"{}"#,
            r#"{"numeric": [{"column": "sex", "mean": 0.0, "scale": 1.0}]}"#,
            r#"{"numeric": [{"column": "age", "mean": 0.0, "scale": 0.0}]}"#,
            r#"{"categorical": [{"column": "bmi", "categories": ["a"]}]}"#,
            r#"{"categorical": [{"column": "smoker", "categories": []}]}"#,
        ];
        for contents in cases {
            let file = write_artifact(contents);
            let err = Preprocessor::from_file(file.path()).unwrap_err();
            assert!(
                matches!(
                    err.downcast_ref::<ArtifactError>(),
                    Some(ArtifactError::Malformed { .. })
                ),
                "expected malformed for {contents}"
            );
        }
    }
}
