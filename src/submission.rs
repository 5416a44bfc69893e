//! Form submission handling: validate, predict, map the result to a message

use crate::models::{CostEstimate, CostPredictor};
use crate::types::{InputBounds, PolicyHolder};
use tracing::{info, warn};
use uuid::Uuid;

/// How submissions are checked before prediction
#[derive(Debug, Clone)]
pub struct SubmitPolicy {
    pub bounds: InputBounds,
    /// Re-check numeric ranges server side and skip prediction on violation
    pub recheck: bool,
}

impl Default for SubmitPolicy {
    fn default() -> Self {
        Self {
            bounds: InputBounds::default(),
            recheck: true,
        }
    }
}

/// Result of one submission as shown to the user
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// Prediction succeeded
    Estimate(CostEstimate),
    /// Input out of range, prediction skipped
    Warning(String),
    /// Transform or predict failed; carries the error text verbatim
    Failed(String),
}

impl Outcome {
    /// Message rendered in the result banner
    pub fn message(&self) -> String {
        match self {
            Outcome::Estimate(estimate) => {
                format!("Estimated Insurance Cost: {}", estimate.display)
            }
            Outcome::Warning(text) => text.clone(),
            Outcome::Failed(error) => {
                format!("An error occurred during prediction:\n\n{}", error)
            }
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Outcome::Estimate(_) => "success",
            Outcome::Warning(_) => "warning",
            Outcome::Failed(_) => "error",
        }
    }
}

/// Handle one submission.
///
/// Nothing is mutated, so a failed prediction leaves the predictor usable and
/// each call is independent of the previous ones.
pub fn submit(predictor: &CostPredictor, policy: &SubmitPolicy, record: &PolicyHolder) -> Outcome {
    let submission_id = Uuid::new_v4();

    if policy.recheck {
        if let Err(violation) = record.check(&policy.bounds) {
            info!(submission_id = %submission_id, reason = %violation, "Submission rejected");
            return Outcome::Warning(violation.to_string());
        }
    }

    match predictor.predict(record) {
        Ok(estimate) => {
            info!(submission_id = %submission_id, amount = estimate.amount, "Prediction served");
            Outcome::Estimate(estimate)
        }
        Err(e) => {
            warn!(submission_id = %submission_id, error = %e, "Prediction failed");
            Outcome::Failed(e.to_string())
        }
    }
}
