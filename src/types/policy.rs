//! Policy holder record submitted through the prediction form

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::RangeInclusive;
use thiserror::Error;

/// Biological sex as recorded in the training data
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Sex {
    #[default]
    Male,
    Female,
}

/// Smoking status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Smoker {
    #[default]
    Yes,
    No,
}

/// US residential region
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Region {
    #[default]
    Northeast,
    Northwest,
    Southeast,
    Southwest,
}

impl Sex {
    /// Options in the order the form lists them
    pub const ALL: [Sex; 2] = [Sex::Male, Sex::Female];

    pub fn as_str(&self) -> &'static str {
        match self {
            Sex::Male => "male",
            Sex::Female => "female",
        }
    }
}

impl Smoker {
    pub const ALL: [Smoker; 2] = [Smoker::Yes, Smoker::No];

    pub fn as_str(&self) -> &'static str {
        match self {
            Smoker::Yes => "yes",
            Smoker::No => "no",
        }
    }
}

impl Region {
    pub const ALL: [Region; 4] = [
        Region::Northeast,
        Region::Northwest,
        Region::Southeast,
        Region::Southwest,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Region::Northeast => "northeast",
            Region::Northwest => "northwest",
            Region::Southeast => "southeast",
            Region::Southwest => "southwest",
        }
    }
}

impl fmt::Display for Sex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for Smoker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Input columns, in the order the model was trained on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Column {
    Age,
    Sex,
    Bmi,
    Children,
    Smoker,
    Region,
}

impl Column {
    /// Training column order (age, sex, bmi, children, smoker, region)
    pub const ALL: [Column; 6] = [
        Column::Age,
        Column::Sex,
        Column::Bmi,
        Column::Children,
        Column::Smoker,
        Column::Region,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Column::Age => "age",
            Column::Sex => "sex",
            Column::Bmi => "bmi",
            Column::Children => "children",
            Column::Smoker => "smoker",
            Column::Region => "region",
        }
    }

    /// Whether the column holds a number rather than a category
    pub fn is_numeric(&self) -> bool {
        matches!(self, Column::Age | Column::Bmi | Column::Children)
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One prediction request. Built per submission and dropped afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolicyHolder {
    /// Age in years
    pub age: u32,
    /// Body mass index
    pub bmi: f64,
    /// Number of dependent children
    pub children: u32,
    pub sex: Sex,
    pub smoker: Smoker,
    pub region: Region,
}

impl Default for PolicyHolder {
    fn default() -> Self {
        Self {
            age: 30,
            bmi: 25.0,
            children: 0,
            sex: Sex::default(),
            smoker: Smoker::default(),
            region: Region::default(),
        }
    }
}

impl PolicyHolder {
    /// Numeric value of a column, `None` for categorical columns
    pub fn numeric(&self, column: Column) -> Option<f64> {
        match column {
            Column::Age => Some(self.age as f64),
            Column::Bmi => Some(self.bmi),
            Column::Children => Some(self.children as f64),
            _ => None,
        }
    }

    /// Category label of a column, `None` for numeric columns
    pub fn category(&self, column: Column) -> Option<&'static str> {
        match column {
            Column::Sex => Some(self.sex.as_str()),
            Column::Smoker => Some(self.smoker.as_str()),
            Column::Region => Some(self.region.as_str()),
            _ => None,
        }
    }

    /// Re-check the numeric fields against the form bounds.
    ///
    /// Fields are checked in form order and the first violation wins.
    pub fn check(&self, bounds: &InputBounds) -> Result<(), RangeViolation> {
        if !bounds.age.range.contains(&self.age) {
            return Err(RangeViolation::Age {
                min: *bounds.age.range.start(),
                max: *bounds.age.range.end(),
            });
        }
        if !self.bmi.is_finite() || !bounds.bmi.range.contains(&self.bmi) {
            return Err(RangeViolation::Bmi {
                min: *bounds.bmi.range.start(),
                max: *bounds.bmi.range.end(),
            });
        }
        if !bounds.children.range.contains(&self.children) {
            return Err(RangeViolation::Children {
                min: *bounds.children.range.start(),
                max: *bounds.children.range.end(),
            });
        }
        Ok(())
    }
}

/// Out-of-range field reported after submission
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RangeViolation {
    #[error("Please enter a valid age between {min} and {max}.")]
    Age { min: u32, max: u32 },

    #[error("Please enter a valid BMI between {min:.1} and {max:.1}.")]
    Bmi { min: f64, max: f64 },

    #[error("Please enter a number of children between {min} and {max}.")]
    Children { min: u32, max: u32 },
}

/// Inclusive range plus the step the form control uses
#[derive(Debug, Clone, PartialEq)]
pub struct Bound<T> {
    pub range: RangeInclusive<T>,
    pub step: T,
}

/// Accepted ranges for the numeric inputs
#[derive(Debug, Clone, PartialEq)]
pub struct InputBounds {
    pub age: Bound<u32>,
    pub bmi: Bound<f64>,
    pub children: Bound<u32>,
}

impl InputBounds {
    pub const DEFAULT_BMI_MAX: f64 = 60.0;

    /// Bounds with a custom BMI ceiling (some deployments accept up to 100)
    pub fn with_bmi_max(bmi_max: f64) -> Self {
        Self {
            age: Bound {
                range: 18..=100,
                step: 1,
            },
            bmi: Bound {
                range: 10.0..=bmi_max,
                step: 0.1,
            },
            children: Bound {
                range: 0..=10,
                step: 1,
            },
        }
    }
}

impl Default for InputBounds {
    fn default() -> Self {
        Self::with_bmi_max(Self::DEFAULT_BMI_MAX)
    }
}
