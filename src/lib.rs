//! Medical Insurance Cost Predictor
//!
//! Serves a single-page form that collects a policy holder's details,
//! runs a pre-trained regression model and shows the estimated yearly cost.

pub mod config;
pub mod currency;
pub mod metrics;
pub mod models;
pub mod submission;
pub mod types;
pub mod web;

pub use config::AppConfig;
pub use models::{CostEstimate, CostPredictor};
pub use submission::{submit, Outcome, SubmitPolicy};
pub use types::{InputBounds, PolicyHolder};
