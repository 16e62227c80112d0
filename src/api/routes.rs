//! HTTP routes for submitting signals

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

use super::models::{ErrorResponse, SignalPayload, TradeResponse};
use crate::common::errors::ReconcileError;
use crate::reconciler::{DesiredSignal, ReconciliationService};

/// Build the application router
pub fn router(service: ReconciliationService) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/webhook", post(submit_signal))
        .route("/api/trade", post(submit_signal))
        .layer(TraceLayer::new_for_http())
        .with_state(service)
}

async fn root() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

async fn submit_signal(
    State(service): State<ReconciliationService>,
    payload: Result<Json<SignalPayload>, JsonRejection>,
) -> Response {
    let Json(payload) = match payload {
        Ok(payload) => payload,
        Err(rejection) => {
            warn!(error = %rejection, "Rejected signal body");
            return error_response(
                StatusCode::BAD_REQUEST,
                "invalid_signal",
                rejection.body_text(),
            );
        }
    };
    info!(?payload, "Signal request");

    let signal = match DesiredSignal::try_from(payload) {
        Ok(signal) => signal,
        Err(err) => {
            warn!(error = %err, "Invalid signal");
            return error_response(StatusCode::BAD_REQUEST, err.kind(), err.to_string());
        }
    };

    match service.handle(&signal).await {
        Ok(report) if report.is_success() => {
            let message = if report.steps.is_empty() {
                "no action needed".to_string()
            } else {
                format!("executed {} operation(s)", report.steps.len())
            };
            (StatusCode::OK, Json(TradeResponse { message, report })).into_response()
        }
        Ok(report) => {
            let (kind, message) = report
                .failure
                .as_ref()
                .map(|f| (f.kind.clone(), f.message.clone()))
                .unwrap_or_default();
            (
                StatusCode::BAD_GATEWAY,
                Json(ErrorResponse {
                    kind,
                    message,
                    report: Some(report),
                }),
            )
                .into_response()
        }
        Err(err) => {
            error!(error = %err, "Reconciliation failed before any operation");
            let status = match err {
                ReconcileError::InvalidSignal(_) => StatusCode::BAD_REQUEST,
                _ => StatusCode::BAD_GATEWAY,
            };
            error_response(status, err.kind(), err.to_string())
        }
    }
}

fn error_response(status: StatusCode, kind: &str, message: String) -> Response {
    (
        status,
        Json(ErrorResponse {
            kind: kind.to_string(),
            message,
            report: None,
        }),
    )
        .into_response()
}
