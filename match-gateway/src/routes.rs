//! Axum route handlers for the match API.
//!
//! Every collection route answers `GET` with a list and `POST` with a
//! create; every `/{id}` route answers `GET` with one row. Other methods get
//! axum's 405.

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use match_core::{CohortId, ProgrammeId, TagId, UserId};
use match_store::Registry;
use serde_json::{json, Value};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::error::GatewayError;

// ── Shared state ─────────────────────────────────────────────────────────────

type Shared = Arc<Registry>;

type Body = Result<Json<Value>, JsonRejection>;

// ── Router ────────────────────────────────────────────────────────────────────

/// Build the application router over the given registry.
pub fn create_router(registry: Shared) -> Router {
    Router::new()
        .route("/tags", get(list_tags).post(create_tag))
        .route("/tags/{id}", get(get_tag))
        .route("/users", get(list_users).post(create_user))
        .route("/users/{id}", get(get_user))
        .route("/programmes", get(list_programmes).post(create_programme))
        .route("/programmes/{id}", get(get_programme))
        .route("/cohorts", get(list_cohorts).post(create_cohort))
        .route("/cohorts/{id}", get(get_cohort))
        .route("/health", get(health))
        .with_state(registry)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

// ── Handlers ──────────────────────────────────────────────────────────────────

/// `GET /health`: liveness check that also pings the store.
pub async fn health(State(registry): State<Shared>) -> impl IntoResponse {
    match registry.store().health_check().await {
        Ok(()) => (StatusCode::OK, Json(json!({"status": "ok"}))),
        Err(e) => {
            tracing::warn!(error = %e, "store health check failed");
            (StatusCode::SERVICE_UNAVAILABLE, Json(json!({"status": "unavailable"})))
        }
    }
}

/// `GET /tags`
///
/// # Errors
/// Returns [`GatewayError::Registry`] if the store fails.
pub async fn list_tags(State(registry): State<Shared>) -> Result<impl IntoResponse, GatewayError> {
    Ok(Json(registry.list_tags().await?))
}

/// `POST /tags`: create a tag and return it with `201`.
///
/// # Errors
/// Returns [`GatewayError::MalformedBody`] for unparsable JSON and
/// [`GatewayError::Registry`] for validation or store failures.
pub async fn create_tag(
    State(registry): State<Shared>,
    body: Body,
) -> Result<impl IntoResponse, GatewayError> {
    let Json(body) = body?;
    let tag = registry.create_tag(&body).await?;
    Ok((StatusCode::CREATED, Json(tag)))
}

/// `GET /tags/{id}`
///
/// # Errors
/// Returns `404` via [`GatewayError`] for unknown or malformed ids.
pub async fn get_tag(
    State(registry): State<Shared>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, GatewayError> {
    let id: TagId = id.parse()?;
    Ok(Json(registry.get_tag(id).await?))
}

/// `GET /users`
///
/// # Errors
/// Returns [`GatewayError::Registry`] if the store fails.
pub async fn list_users(State(registry): State<Shared>) -> Result<impl IntoResponse, GatewayError> {
    Ok(Json(registry.list_users().await?))
}

/// `POST /users`: create a user with its nested profile.
///
/// The password is accepted here and never echoed back.
///
/// # Errors
/// Returns [`GatewayError::MalformedBody`] for unparsable JSON and
/// [`GatewayError::Registry`] for validation or store failures.
pub async fn create_user(
    State(registry): State<Shared>,
    body: Body,
) -> Result<impl IntoResponse, GatewayError> {
    let Json(body) = body?;
    let user = registry.create_user(&body).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

/// `GET /users/{id}`
///
/// # Errors
/// Returns `404` via [`GatewayError`] for unknown or malformed ids.
pub async fn get_user(
    State(registry): State<Shared>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, GatewayError> {
    let id: UserId = id.parse()?;
    Ok(Json(registry.get_user(id).await?))
}

/// `GET /programmes`
///
/// # Errors
/// Returns [`GatewayError::Registry`] if the store fails.
pub async fn list_programmes(
    State(registry): State<Shared>,
) -> Result<impl IntoResponse, GatewayError> {
    Ok(Json(registry.list_programmes().await?))
}

/// `POST /programmes`
///
/// # Errors
/// Returns [`GatewayError::MalformedBody`] for unparsable JSON and
/// [`GatewayError::Registry`] for validation or store failures.
pub async fn create_programme(
    State(registry): State<Shared>,
    body: Body,
) -> Result<impl IntoResponse, GatewayError> {
    let Json(body) = body?;
    let programme = registry.create_programme(&body).await?;
    Ok((StatusCode::CREATED, Json(programme)))
}

/// `GET /programmes/{id}`
///
/// # Errors
/// Returns `404` via [`GatewayError`] for unknown or malformed ids.
pub async fn get_programme(
    State(registry): State<Shared>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, GatewayError> {
    let id: ProgrammeId = id.parse()?;
    Ok(Json(registry.get_programme(id).await?))
}

/// `GET /cohorts`
///
/// # Errors
/// Returns [`GatewayError::Registry`] if the store fails.
pub async fn list_cohorts(
    State(registry): State<Shared>,
) -> Result<impl IntoResponse, GatewayError> {
    Ok(Json(registry.list_cohorts().await?))
}

/// `POST /cohorts`: create a cohort. `openDate` defaults to now.
///
/// # Errors
/// Returns [`GatewayError::MalformedBody`] for unparsable JSON and
/// [`GatewayError::Registry`] for validation or store failures.
pub async fn create_cohort(
    State(registry): State<Shared>,
    body: Body,
) -> Result<impl IntoResponse, GatewayError> {
    let Json(body) = body?;
    let cohort = registry.create_cohort(&body).await?;
    Ok((StatusCode::CREATED, Json(cohort)))
}

/// `GET /cohorts/{id}`
///
/// # Errors
/// Returns `404` via [`GatewayError`] for unknown or malformed ids.
pub async fn get_cohort(
    State(registry): State<Shared>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, GatewayError> {
    let id: CohortId = id.parse()?;
    Ok(Json(registry.get_cohort(id).await?))
}
