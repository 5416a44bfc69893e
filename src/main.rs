//! Medical Insurance Cost Predictor - Main Entry Point
//!
//! Loads the model artifacts once, then serves the prediction form.

use actix_web::web;
use anyhow::Result;
use insurance_cost_predictor::{
    config::AppConfig,
    metrics::{MetricsReporter, ServiceMetrics},
    models::CostPredictor,
    submission::SubmitPolicy,
    types::InputBounds,
    web::{serve, AppState, ModelState},
};
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[actix_web::main]
async fn main() -> Result<()> {
    let config = AppConfig::load()?;
    init_logging(&config)?;

    info!("Starting Medical Insurance Cost Predictor");
    info!(
        layout = config.models.layout.as_str(),
        model = %config.models.model_path().display(),
        bmi_max = config.validation.bmi_max,
        recheck = config.validation.recheck,
        "Configuration loaded"
    );

    // Startup failure is not retried; the page shows a static message instead
    let model = ModelState::from_load(CostPredictor::load(&config.models));
    if !model.is_ready() {
        warn!("Serving without a model, predictions are disabled");
    }

    let metrics = Arc::new(ServiceMetrics::new());
    if config.metrics.report_interval_secs > 0 {
        let reporter = MetricsReporter::new(metrics.clone(), config.metrics.report_interval_secs);
        actix_web::rt::spawn(reporter.start());
    }

    let policy = SubmitPolicy {
        bounds: InputBounds::with_bmi_max(config.validation.bmi_max),
        recheck: config.validation.recheck,
    };
    let state = web::Data::new(AppState::new(model, policy, metrics.clone()));

    serve(&config.server, state).await?;

    info!("Server shutting down...");
    metrics.print_summary();

    Ok(())
}

fn init_logging(config: &AppConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().or_else(|_| {
        EnvFilter::try_new(format!(
            "insurance_cost_predictor={},actix_web=info",
            config.logging.level
        ))
    })?;

    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    if config.logging.format == "json" {
        builder.json().init();
    } else {
        builder.init();
    }
    Ok(())
}
