//! Axum request handlers for all service endpoints.

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use common::{
    protocol::{CreateSecretRequest, ErrorResponse, HealthResponse},
    ServiceError,
};
use tracing::{debug, warn};

use super::state::AppState;

/// `POST /api/secret` — store a client-encrypted secret.
///
/// Returns `{ id }` on success, 400 with a field-level message on validation
/// failure, and 503 if the store could not take the write.
pub async fn create_secret(
    State(state): State<AppState>,
    payload: Result<Json<CreateSecretRequest>, JsonRejection>,
) -> Response {
    let Json(req) = match payload {
        Ok(p) => p,
        Err(rejection) => {
            debug!(error = %rejection, "malformed create request body");
            let err = ErrorResponse::new("bad_request", rejection.body_text());
            return (rejection.status(), Json(err)).into_response();
        }
    };

    match state.lifecycle.create(req).await {
        Ok(resp) => (StatusCode::OK, Json(resp)).into_response(),
        Err(e) => error_response(&e.into()),
    }
}

/// `GET /api/secret/{id}` — fetch, and for burn-on-read secrets destroy, a secret.
///
/// The caller is identified by its `User-Agent`; non-UTF-8 bytes in it are
/// replaced rather than treated as a missing header. Every not-found cause,
/// including an id that does not decode, yields the same 404 body. Responses
/// are marked `no-store`.
pub async fn consume_secret(
    State(state): State<AppState>,
    path: Result<Path<String>, PathRejection>,
    headers: HeaderMap,
) -> Response {
    let id = match path {
        Ok(Path(id)) => id,
        Err(rejection) => {
            debug!(error = %rejection, "undecodable secret id");
            return no_store(error_response(&ServiceError::NotFound));
        }
    };

    let user_agent = headers
        .get(header::USER_AGENT)
        .map(|v| String::from_utf8_lossy(v.as_bytes()));

    let resp = match state.lifecycle.consume(&id, user_agent.as_deref()).await {
        Ok(envelope) => (StatusCode::OK, Json(envelope)).into_response(),
        Err(e) => error_response(&e.into()),
    };
    no_store(resp)
}

/// `GET /health` — liveness and readiness check.
///
/// Returns `200 OK` when the store answers a ping within the store timeout,
/// `503 Service Unavailable` otherwise.
pub async fn health(State(state): State<AppState>) -> Response {
    let (status_code, status_str) = match state.lifecycle.check_store().await {
        Ok(()) => (StatusCode::OK, "ok"),
        Err(e) => {
            warn!(error = %e, "store health check failed");
            (StatusCode::SERVICE_UNAVAILABLE, "degraded")
        }
    };

    let body = HealthResponse {
        status: status_str.into(),
        store: state.lifecycle.backend().into(),
    };
    (status_code, Json(body)).into_response()
}

/// Catch-all 404 handler.
pub async fn not_found() -> impl IntoResponse {
    let err = ErrorResponse::new("not_found", "the requested resource does not exist");
    (StatusCode::NOT_FOUND, Json(err))
}

fn no_store(mut resp: Response) -> Response {
    resp.headers_mut()
        .insert(header::CACHE_CONTROL, HeaderValue::from_static("no-store"));
    resp
}

fn error_response(err: &ServiceError) -> Response {
    let status =
        StatusCode::from_u16(err.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, Json(ErrorResponse::from(err))).into_response()
}
