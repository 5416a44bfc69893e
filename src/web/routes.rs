//! HTTP handlers for the prediction form

use crate::submission::{submit, Outcome};
use crate::types::PolicyHolder;
use crate::web::page::{self, Banner};
use crate::web::{AppState, ModelState};
use actix_web::error::{InternalError, UrlencodedError};
use actix_web::http::header::ContentType;
use actix_web::http::StatusCode;
use actix_web::{web, HttpRequest, HttpResponse, Responder};
use serde::Serialize;
use std::time::Instant;
use tracing::{error, warn};

/// Register routes and the form decoder on an app
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::FormConfig::default().error_handler(form_error))
        .route("/", web::get().to(index))
        .route("/predict", web::post().to(predict))
        .route("/health", web::get().to(health));
}

fn html(status: StatusCode, body: String) -> HttpResponse {
    HttpResponse::build(status)
        .content_type(ContentType::html())
        .body(body)
}

async fn index(state: web::Data<AppState>) -> impl Responder {
    match &state.model {
        ModelState::Ready(_) => html(
            StatusCode::OK,
            page::render_form(&state.policy.bounds, &PolicyHolder::default(), None),
        ),
        ModelState::Unavailable(message) => {
            html(StatusCode::SERVICE_UNAVAILABLE, page::render_unavailable(message))
        }
    }
}

async fn predict(state: web::Data<AppState>, form: web::Form<PolicyHolder>) -> impl Responder {
    let predictor = match &state.model {
        ModelState::Ready(predictor) => predictor.clone(),
        ModelState::Unavailable(message) => {
            return html(StatusCode::SERVICE_UNAVAILABLE, page::render_unavailable(message));
        }
    };

    let start_time = Instant::now();
    let record = form.into_inner();
    let policy = state.policy.clone();
    let shown = record.clone();

    let outcome = match web::block(move || submit(&predictor, &policy, &record)).await {
        Ok(outcome) => outcome,
        Err(e) => {
            error!(error = %e, "Prediction task did not complete");
            Outcome::Failed(e.to_string())
        }
    };
    state.metrics.record(&outcome, start_time.elapsed());

    html(
        StatusCode::OK,
        page::render_form(&state.policy.bounds, &shown, Some(&Banner::from(&outcome))),
    )
}

/// Render undecodable submissions as a warning on the form
fn form_error(err: UrlencodedError, req: &HttpRequest) -> actix_web::Error {
    warn!(error = %err, "Rejected malformed form submission");

    let body = match req.app_data::<web::Data<AppState>>() {
        Some(state) => match &state.model {
            ModelState::Ready(_) => page::render_form(
                &state.policy.bounds,
                &PolicyHolder::default(),
                Some(&Banner::warning(&format!("Invalid form input: {}", err))),
            ),
            ModelState::Unavailable(message) => page::render_unavailable(message),
        },
        None => page::render_unavailable(&format!("Invalid form input: {}", err)),
    };

    InternalError::from_response(err, html(StatusCode::BAD_REQUEST, body)).into()
}

#[derive(Debug, Serialize)]
struct HealthReport {
    status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    layout: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    features: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    timestamp: String,
}

async fn health(state: web::Data<AppState>) -> impl Responder {
    let timestamp = chrono::Utc::now().to_rfc3339();
    match &state.model {
        ModelState::Ready(predictor) => HttpResponse::Ok().json(HealthReport {
            status: "ready",
            model: Some(predictor.model_name().to_string()),
            layout: Some(predictor.layout().as_str()),
            features: Some(predictor.feature_count()),
            error: None,
            timestamp,
        }),
        ModelState::Unavailable(message) => HttpResponse::ServiceUnavailable().json(HealthReport {
            status: "unavailable",
            model: None,
            layout: None,
            features: None,
            error: Some(message.clone()),
            timestamp,
        }),
    }
}
