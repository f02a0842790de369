use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Router,
};
use serde::Deserialize;
use serde_json::json;

use super::domain::{EssayId, EssaySubmission, GradingPayload};
use super::repository::{AnnotationStore, DeliveryPublisher, EssayRepository, RepositoryError};
use super::scoring::ScoringError;
use super::service::{EssayGradingService, GradingServiceError};
use super::status::StatusError;

/// Router builder exposing the essay grading endpoints.
pub fn grading_router<R, N, D>(service: Arc<EssayGradingService<R, N, D>>) -> Router
where
    R: EssayRepository + 'static,
    N: AnnotationStore + 'static,
    D: DeliveryPublisher + 'static,
{
    Router::new()
        .route("/api/v1/essays", post(submit_handler::<R, N, D>))
        .route("/api/v1/essays/:essay_id", get(status_handler::<R, N, D>))
        .route(
            "/api/v1/essays/:essay_id/correction",
            put(correction_handler::<R, N, D>),
        )
        .route(
            "/api/v1/essays/:essay_id/grade",
            put(grade_handler::<R, N, D>),
        )
        .route(
            "/api/v1/essays/:essay_id/status",
            post(transition_handler::<R, N, D>),
        )
        .route(
            "/api/v1/essays/:essay_id/send",
            post(send_handler::<R, N, D>),
        )
        .with_state(service)
}

#[derive(Debug, Deserialize)]
pub(crate) struct CorrectionRequest {
    #[serde(default)]
    general_comments: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TransitionRequest {
    #[serde(default)]
    status: Option<String>,
}

pub(crate) async fn submit_handler<R, N, D>(
    State(service): State<Arc<EssayGradingService<R, N, D>>>,
    axum::Json(submission): axum::Json<EssaySubmission>,
) -> Response
where
    R: EssayRepository + 'static,
    N: AnnotationStore + 'static,
    D: DeliveryPublisher + 'static,
{
    match service.submit(submission) {
        Ok(essay) => (StatusCode::CREATED, axum::Json(essay.status_view())).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn status_handler<R, N, D>(
    State(service): State<Arc<EssayGradingService<R, N, D>>>,
    Path(essay_id): Path<String>,
) -> Response
where
    R: EssayRepository + 'static,
    N: AnnotationStore + 'static,
    D: DeliveryPublisher + 'static,
{
    let id = EssayId(essay_id);
    match service.get(&id) {
        Ok(essay) => (StatusCode::OK, axum::Json(essay.status_view())).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn correction_handler<R, N, D>(
    State(service): State<Arc<EssayGradingService<R, N, D>>>,
    Path(essay_id): Path<String>,
    axum::Json(request): axum::Json<CorrectionRequest>,
) -> Response
where
    R: EssayRepository + 'static,
    N: AnnotationStore + 'static,
    D: DeliveryPublisher + 'static,
{
    let id = EssayId(essay_id);
    match service.begin_correction(&id, request.general_comments) {
        Ok(essay) => (StatusCode::OK, axum::Json(essay.status_view())).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn grade_handler<R, N, D>(
    State(service): State<Arc<EssayGradingService<R, N, D>>>,
    Path(essay_id): Path<String>,
    axum::Json(payload): axum::Json<GradingPayload>,
) -> Response
where
    R: EssayRepository + 'static,
    N: AnnotationStore + 'static,
    D: DeliveryPublisher + 'static,
{
    let id = EssayId(essay_id);
    match service.grade(&id, payload) {
        Ok(essay) => (StatusCode::OK, axum::Json(essay.status_view())).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn transition_handler<R, N, D>(
    State(service): State<Arc<EssayGradingService<R, N, D>>>,
    Path(essay_id): Path<String>,
    axum::Json(request): axum::Json<TransitionRequest>,
) -> Response
where
    R: EssayRepository + 'static,
    N: AnnotationStore + 'static,
    D: DeliveryPublisher + 'static,
{
    let id = EssayId(essay_id);
    match service.transition(&id, request.status.as_deref()) {
        Ok(essay) => (StatusCode::OK, axum::Json(essay.status_view())).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn send_handler<R, N, D>(
    State(service): State<Arc<EssayGradingService<R, N, D>>>,
    Path(essay_id): Path<String>,
) -> Response
where
    R: EssayRepository + 'static,
    N: AnnotationStore + 'static,
    D: DeliveryPublisher + 'static,
{
    let id = EssayId(essay_id);
    match service.send(&id) {
        Ok(essay) => (StatusCode::OK, axum::Json(essay.status_view())).into_response(),
        Err(err) => error_response(err),
    }
}

/// Map service failures onto the 4xx/5xx surface the HTTP layer owns. All
/// validation errors bubble straight through with their messages intact so
/// clients can match on the "invalid value" / "invalid transition" markers.
fn error_response(err: GradingServiceError) -> Response {
    let status = match &err {
        GradingServiceError::Scoring(ScoringError::InvalidScoreValue { .. }) => {
            StatusCode::UNPROCESSABLE_ENTITY
        }
        GradingServiceError::Status(StatusError::MissingArgument(_)) => StatusCode::BAD_REQUEST,
        GradingServiceError::Status(StatusError::InvalidTransition { .. }) => StatusCode::CONFLICT,
        GradingServiceError::Repository(RepositoryError::NotFound) => StatusCode::NOT_FOUND,
        GradingServiceError::Repository(RepositoryError::Conflict) => StatusCode::CONFLICT,
        GradingServiceError::Repository(RepositoryError::Unavailable(_))
        | GradingServiceError::Delivery(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };

    let payload = json!({ "error": err.to_string() });
    (status, axum::Json(payload)).into_response()
}
