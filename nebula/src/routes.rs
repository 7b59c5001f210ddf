//! HTTP adapter. Extract, call into `Registry`, wrap in JSON.

use std::collections::HashMap;
use std::time::Instant;

use axum::Router;
use axum::extract::Json;
use axum::extract::Path;
use axum::extract::Query;
use axum::extract::Request;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::middleware::Next;
use axum::response::IntoResponse;
use axum::response::Json as ResponseJson;
use axum::response::Response;
use axum::routing::get;
use axum::routing::post;
use nebula_api::prelude::*;

use super::NebulaError;
use super::NebulaState;
use crate::execute;

pub const AVAILABLE_ENDPOINTS: [&str; 12] = [
    "GET /status",
    "GET /packages",
    "GET /packages/{name}",
    "POST /packages",
    "POST /packages/{name}/install",
    "GET /search?q=",
    "GET /reviews",
    "POST /reviews",
    "POST /reviews/{id}/like",
    "POST /reviews/{id}/dislike",
    "POST /execute",
    "GET /stats",
];

pub fn api_routes() -> Router<NebulaState> {
    Router::new()
        .route("/status", get(status))
        .route("/packages", get(list_packages).post(publish_package))
        .route("/packages/{name}", get(get_package))
        .route("/packages/{name}/install", post(install_package))
        .route("/search", get(search_packages))
        .route("/reviews", get(list_reviews).post(submit_review))
        .route("/reviews/{id}/like", post(like_review))
        .route("/reviews/{id}/dislike", post(dislike_review))
        .route("/execute", post(execute_code))
        .route("/stats", get(stats))
}

async fn status(State(state): State<NebulaState>) -> ResponseJson<StatusResponse> {
    ResponseJson(state.registry.status())
}

async fn list_packages(
    State(state): State<NebulaState>,
) -> Result<ResponseJson<PackageListResponse>, NebulaError> {
    Ok(ResponseJson(state.registry.list_packages()?))
}

async fn search_packages(
    State(state): State<NebulaState>,
    Query(mut params): Query<HashMap<String, String>>,
) -> Result<ResponseJson<PackageListResponse>, NebulaError> {
    Ok(ResponseJson(
        state.registry.search_packages(params.remove("q"))?,
    ))
}

async fn get_package(
    State(state): State<NebulaState>,
    Path(name): Path<String>,
) -> Result<ResponseJson<PackageResponse>, NebulaError> {
    Ok(ResponseJson(state.registry.get_package(&name)?))
}

async fn publish_package(
    State(state): State<NebulaState>,
    payload: Result<Json<PublishRequest>, JsonRejection>,
) -> Result<(StatusCode, ResponseJson<PackageResponse>), NebulaError> {
    let Json(payload) = payload?;
    Ok((
        StatusCode::CREATED,
        ResponseJson(state.registry.publish_package(payload)?),
    ))
}

async fn install_package(
    State(state): State<NebulaState>,
    Path(name): Path<String>,
) -> Result<ResponseJson<PackageResponse>, NebulaError> {
    Ok(ResponseJson(state.registry.install_package(&name)?))
}

async fn list_reviews(
    State(state): State<NebulaState>,
) -> Result<ResponseJson<ReviewListResponse>, NebulaError> {
    Ok(ResponseJson(state.registry.list_reviews()?))
}

async fn submit_review(
    State(state): State<NebulaState>,
    payload: Result<Json<ReviewRequest>, JsonRejection>,
) -> Result<(StatusCode, ResponseJson<ReviewResponse>), NebulaError> {
    let Json(payload) = payload?;
    Ok((
        StatusCode::CREATED,
        ResponseJson(state.registry.submit_review(payload)?),
    ))
}

async fn like_review(
    State(state): State<NebulaState>,
    Path(id): Path<String>,
) -> Result<ResponseJson<ReviewResponse>, NebulaError> {
    Ok(ResponseJson(
        state.registry.react_to_review(&id, Reaction::Like)?,
    ))
}

async fn dislike_review(
    State(state): State<NebulaState>,
    Path(id): Path<String>,
) -> Result<ResponseJson<ReviewResponse>, NebulaError> {
    Ok(ResponseJson(
        state.registry.react_to_review(&id, Reaction::Dislike)?,
    ))
}

async fn execute_code(
    payload: Result<Json<ExecuteRequest>, JsonRejection>,
) -> Result<ResponseJson<ExecuteResponse>, NebulaError> {
    let Json(payload) = payload?;
    Ok(ResponseJson(execute::execute(payload)?))
}

async fn stats(
    State(state): State<NebulaState>,
) -> Result<ResponseJson<StatsResponse>, NebulaError> {
    Ok(ResponseJson(state.registry.stats()?))
}

pub async fn not_found() -> (StatusCode, ResponseJson<ErrorResponse>) {
    (
        StatusCode::NOT_FOUND,
        ResponseJson(ErrorResponse {
            success: false,
            error: "Endpoint not found".to_string(),
            message: "The requested API endpoint does not exist".to_string(),
            available_endpoints: Some(
                AVAILABLE_ENDPOINTS
                    .iter()
                    .map(|e| e.to_string())
                    .collect(),
            ),
        }),
    )
}

pub async fn method_not_allowed() -> (StatusCode, ResponseJson<ErrorResponse>) {
    (
        StatusCode::METHOD_NOT_ALLOWED,
        ResponseJson(ErrorResponse {
            success: false,
            error: "Method not allowed".to_string(),
            message: "This endpoint does not accept that method".to_string(),
            available_endpoints: None,
        }),
    )
}

pub async fn log_request(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let started = Instant::now();
    let response = next.run(request).await;
    log::info!(
        "{method} {path} -> {} ({:?})",
        response.status().as_u16(),
        started.elapsed()
    );
    response
}

/// Catches panics in handlers so clients get the standard envelope
/// instead of a dropped connection.
pub fn internal_error(_: Box<dyn std::any::Any + Send + 'static>) -> Response {
    log::error!("handler panicked");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        ResponseJson(ErrorResponse {
            success: false,
            error: "Internal server error".to_string(),
            message: "Something went wrong on the server".to_string(),
            available_endpoints: None,
        }),
    )
        .into_response()
}
