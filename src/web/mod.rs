//! HTTP surface: the prediction form and a health probe

pub mod page;
pub mod routes;

use crate::config::ServerConfig;
use crate::metrics::ServiceMetrics;
use crate::models::{ArtifactError, CostPredictor};
use crate::submission::SubmitPolicy;
use actix_web::middleware::{DefaultHeaders, Logger};
use actix_web::{web, App, HttpServer};
use std::sync::Arc;
use tracing::{error, info};

pub use routes::configure;

/// Whether startup produced a usable model
pub enum ModelState {
    Ready(Arc<CostPredictor>),
    /// Startup failed; every page shows this message and nothing is predicted
    Unavailable(String),
}

impl ModelState {
    /// Turn the startup load result into a model state, logging failures
    pub fn from_load(result: anyhow::Result<CostPredictor>) -> Self {
        match result {
            Ok(predictor) => ModelState::Ready(Arc::new(predictor)),
            Err(e) => {
                error!(error = format!("{:#}", e), "Model artifacts could not be loaded");
                let message = e
                    .downcast_ref::<ArtifactError>()
                    .map(ArtifactError::user_message)
                    .unwrap_or_else(|| "Failed to load model artifacts.".to_string());
                ModelState::Unavailable(message)
            }
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, ModelState::Ready(_))
    }
}

/// Shared, read-only state handed to every request
pub struct AppState {
    pub model: ModelState,
    pub policy: SubmitPolicy,
    pub metrics: Arc<ServiceMetrics>,
}

impl AppState {
    pub fn new(model: ModelState, policy: SubmitPolicy, metrics: Arc<ServiceMetrics>) -> Self {
        Self {
            model,
            policy,
            metrics,
        }
    }
}

/// Run the HTTP server until it is stopped
pub async fn serve(server: &ServerConfig, state: web::Data<AppState>) -> std::io::Result<()> {
    let bind_address = (server.host.clone(), server.port);
    info!(
        host = %server.host,
        port = server.port,
        workers = server.workers,
        "Serving prediction form on http://{}:{}/",
        server.host,
        server.port
    );

    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .wrap(DefaultHeaders::new().add(("X-Content-Type-Options", "nosniff")))
            .app_data(state.clone())
            .configure(configure)
    })
    .workers(server.workers.max(1))
    .bind(bind_address)?
    .run()
    .await
}
