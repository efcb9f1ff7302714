//! JSON API for extraction and stored agent specifications.
//!
//! - `POST   /api/v1/extract`                suggest a specification from free text
//! - `POST   /api/v1/specifications`         store a specification
//! - `GET    /api/v1/specifications`         list in creation order
//! - `GET    /api/v1/specifications/{id}`    fetch one
//! - `PATCH  /api/v1/specifications/{id}`    partial update
//! - `DELETE /api/v1/specifications/{id}`    remove one

use std::sync::Arc;

use agentspec_core::domain::specification::{
    AgentSpecification, AgentSpecificationPatch, NewAgentSpecification, SpecificationId,
};
use agentspec_core::errors::{ApplicationError, DomainError, InterfaceErrorKind};
use agentspec_core::extraction::{ExtractionPipeline, ExtractionResult};
use agentspec_db::{AgentSpecificationRepository, RepositoryError};
use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        FromRequest, FromRequestParts, Path, Request, State,
    },
    http::{request::Parts, StatusCode},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tracing::{error, info};
use uuid::Uuid;

#[derive(Clone)]
pub struct ApiState {
    repository: Arc<dyn AgentSpecificationRepository>,
    pipeline: ExtractionPipeline,
}

impl ApiState {
    pub fn new(repository: Arc<dyn AgentSpecificationRepository>) -> Self {
        Self { repository, pipeline: ExtractionPipeline }
    }
}

#[derive(Debug, Deserialize)]
pub struct ExtractRequest {
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorBody {
    pub error: String,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct DeleteResponse {
    pub deleted: bool,
}

type ApiError = (StatusCode, Json<ErrorBody>);

/// JSON body whose rejections answer in the `{"error": ...}` shape with 400.
pub struct ApiJson<T>(pub T);

/// Path parameters whose rejections answer in the `{"error": ...}` shape.
pub struct ApiPath<T>(pub T);

impl<S, T> FromRequest<S> for ApiJson<T>
where
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        Json::<T>::from_request(req, state)
            .await
            .map(|Json(value)| Self(value))
            .map_err(|rejection| malformed_request("body", rejection.body_text()))
    }
}

impl<S, T> FromRequestParts<S> for ApiPath<T>
where
    Path<T>: FromRequestParts<S, Rejection = PathRejection>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        Path::<T>::from_request_parts(parts, state)
            .await
            .map(|Path(value)| Self(value))
            .map_err(|rejection| malformed_request("id", rejection.body_text()))
    }
}

pub fn router(state: ApiState) -> Router {
    Router::new()
        .route("/api/v1/extract", post(extract))
        .route("/api/v1/specifications", post(create_specification).get(list_specifications))
        .route(
            "/api/v1/specifications/{id}",
            get(get_specification).patch(update_specification).delete(delete_specification),
        )
        .with_state(state)
}

pub async fn extract(
    State(state): State<ApiState>,
    ApiJson(body): ApiJson<ExtractRequest>,
) -> Result<Json<ExtractionResult>, ApiError> {
    let correlation_id = new_correlation_id();
    let result = state
        .pipeline
        .extract(&body.description)
        .map_err(|e| interface_error(ApplicationError::from(e), &correlation_id))?;

    info!(
        event_name = "api.extract.completed",
        correlation_id = %correlation_id,
        agent_name = %result.name,
        tool_count = result.tools.len(),
        "description extracted"
    );

    Ok(Json(result))
}

pub async fn create_specification(
    State(state): State<ApiState>,
    ApiJson(body): ApiJson<NewAgentSpecification>,
) -> Result<(StatusCode, Json<AgentSpecification>), ApiError> {
    let correlation_id = new_correlation_id();
    body.validate().map_err(|e| interface_error(ApplicationError::from(e), &correlation_id))?;

    let created = state
        .repository
        .create(body)
        .await
        .map_err(|e| repository_error(e, &correlation_id))?;

    info!(
        event_name = "api.specification.created",
        correlation_id = %correlation_id,
        specification_id = %created.id,
        "agent specification created"
    );

    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn list_specifications(
    State(state): State<ApiState>,
) -> Result<Json<Vec<AgentSpecification>>, ApiError> {
    let correlation_id = new_correlation_id();
    let specifications =
        state.repository.list().await.map_err(|e| repository_error(e, &correlation_id))?;
    Ok(Json(specifications))
}

pub async fn get_specification(
    ApiPath(id): ApiPath<i64>,
    State(state): State<ApiState>,
) -> Result<Json<AgentSpecification>, ApiError> {
    let correlation_id = new_correlation_id();
    let id = SpecificationId(id);

    state
        .repository
        .find_by_id(id)
        .await
        .map_err(|e| repository_error(e, &correlation_id))?
        .map(Json)
        .ok_or_else(|| not_found(id, &correlation_id))
}

pub async fn update_specification(
    ApiPath(id): ApiPath<i64>,
    State(state): State<ApiState>,
    ApiJson(patch): ApiJson<AgentSpecificationPatch>,
) -> Result<Json<AgentSpecification>, ApiError> {
    let correlation_id = new_correlation_id();
    let id = SpecificationId(id);

    if patch.is_empty() {
        let empty = DomainError::InvalidInput {
            field: "body",
            message: "at least one field must be provided".to_string(),
        };
        return Err(interface_error(empty.into(), &correlation_id));
    }
    patch.validate().map_err(|e| interface_error(ApplicationError::from(e), &correlation_id))?;

    let updated = state
        .repository
        .update(id, patch)
        .await
        .map_err(|e| repository_error(e, &correlation_id))?
        .ok_or_else(|| not_found(id, &correlation_id))?;

    info!(
        event_name = "api.specification.updated",
        correlation_id = %correlation_id,
        specification_id = %id,
        "agent specification updated"
    );

    Ok(Json(updated))
}

pub async fn delete_specification(
    ApiPath(id): ApiPath<i64>,
    State(state): State<ApiState>,
) -> Result<Json<DeleteResponse>, ApiError> {
    let correlation_id = new_correlation_id();
    let id = SpecificationId(id);

    let deleted =
        state.repository.delete(id).await.map_err(|e| repository_error(e, &correlation_id))?;
    if !deleted {
        return Err(not_found(id, &correlation_id));
    }

    info!(
        event_name = "api.specification.deleted",
        correlation_id = %correlation_id,
        specification_id = %id,
        "agent specification deleted"
    );

    Ok(Json(DeleteResponse { deleted: true }))
}

fn new_correlation_id() -> String {
    Uuid::new_v4().simple().to_string()
}

fn malformed_request(field: &'static str, message: String) -> ApiError {
    let invalid = DomainError::InvalidInput { field, message };
    interface_error(invalid.into(), &new_correlation_id())
}

fn not_found(id: SpecificationId, correlation_id: &str) -> ApiError {
    interface_error(
        ApplicationError::NotFound(format!("agent specification {id}")),
        correlation_id,
    )
}

fn repository_error(error: RepositoryError, correlation_id: &str) -> ApiError {
    error!(
        event_name = "api.repository.error",
        correlation_id = %correlation_id,
        error = %error,
        "agent specification repository failed"
    );
    interface_error(ApplicationError::Persistence(error.to_string()), correlation_id)
}

fn interface_error(error: ApplicationError, correlation_id: &str) -> ApiError {
    let interface = error.into_interface(correlation_id);
    let status = match interface.kind {
        InterfaceErrorKind::BadRequest => StatusCode::BAD_REQUEST,
        InterfaceErrorKind::NotFound => StatusCode::NOT_FOUND,
        InterfaceErrorKind::ServiceUnavailable => StatusCode::SERVICE_UNAVAILABLE,
    };
    (status, Json(ErrorBody { error: interface.public_message().to_string() }))
}
