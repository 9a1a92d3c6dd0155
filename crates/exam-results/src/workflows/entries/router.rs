use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Router,
};
use serde_json::json;

use super::domain::{CandidateResult, EntryId, PlaceholderId};
use super::repository::{EntryRepository, RepositoryError};
use super::service::{
    CreateEntryRequest, CreatePlaceholderRequest, EntryError, EntryService,
    ResolvePlaceholderRequest,
};
use super::views::EntryFilter;
use crate::workflows::catalog::CandidateId;
use crate::workflows::results::{ResultsOverview, ResultsQuery};

/// Router builder exposing entry, placeholder, and results endpoints.
pub fn entry_router<R>(service: Arc<EntryService<R>>) -> Router
where
    R: EntryRepository + 'static,
{
    Router::new()
        .route(
            "/api/v1/entries",
            get(list_entries_handler::<R>).post(create_entry_handler::<R>),
        )
        .route("/api/v1/entries/:entry_id", get(entry_details_handler::<R>))
        .route(
            "/api/v1/entries/:entry_id/results/:candidate_id",
            put(record_result_handler::<R>),
        )
        .route(
            "/api/v1/entries/:entry_id/results/:candidate_id/validate",
            post(validate_result_handler::<R>),
        )
        .route(
            "/api/v1/placeholders",
            get(list_placeholders_handler::<R>).post(create_placeholder_handler::<R>),
        )
        .route(
            "/api/v1/placeholders/:placeholder_id/resolve",
            post(resolve_placeholder_handler::<R>),
        )
        .route("/api/v1/results", get(results_handler::<R>))
        .with_state(service)
}

pub(crate) fn error_response(error: EntryError) -> Response {
    match error {
        EntryError::PlaceholderOptions(failures) => {
            let details: Vec<_> = failures
                .iter()
                .map(|failure| {
                    json!({
                        "option_id": failure.option_id,
                        "option_code": failure.option_code,
                        "error": failure.reason.to_string(),
                    })
                })
                .collect();
            let payload = json!({
                "error": EntryError::PlaceholderOptions(failures).to_string(),
                "options": details,
            });
            (StatusCode::UNPROCESSABLE_ENTITY, axum::Json(payload)).into_response()
        }
        error if error.is_validation() => {
            let payload = json!({
                "error": error.to_string(),
            });
            (StatusCode::UNPROCESSABLE_ENTITY, axum::Json(payload)).into_response()
        }
        error if error.is_not_found() => {
            let payload = json!({
                "error": error.to_string(),
            });
            (StatusCode::NOT_FOUND, axum::Json(payload)).into_response()
        }
        EntryError::Repository(RepositoryError::Conflict) => {
            let payload = json!({
                "error": "record already exists",
            });
            (StatusCode::CONFLICT, axum::Json(payload)).into_response()
        }
        other => {
            let payload = json!({
                "error": other.to_string(),
            });
            (StatusCode::INTERNAL_SERVER_ERROR, axum::Json(payload)).into_response()
        }
    }
}

pub(crate) async fn list_entries_handler<R>(
    State(service): State<Arc<EntryService<R>>>,
    Query(filter): Query<EntryFilter>,
) -> Response
where
    R: EntryRepository + 'static,
{
    match service.list(&filter) {
        Ok(listings) => (StatusCode::OK, axum::Json(listings)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn create_entry_handler<R>(
    State(service): State<Arc<EntryService<R>>>,
    axum::Json(request): axum::Json<CreateEntryRequest>,
) -> Response
where
    R: EntryRepository + 'static,
{
    match service.create_entry(request) {
        Ok(entry) => (StatusCode::CREATED, axum::Json(entry)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn entry_details_handler<R>(
    State(service): State<Arc<EntryService<R>>>,
    Path(entry_id): Path<u32>,
) -> Response
where
    R: EntryRepository + 'static,
{
    match service.entry_details(EntryId(entry_id)) {
        Ok(details) => (StatusCode::OK, axum::Json(details)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn record_result_handler<R>(
    State(service): State<Arc<EntryService<R>>>,
    Path((entry_id, candidate_id)): Path<(u32, u32)>,
    axum::Json(result): axum::Json<CandidateResult>,
) -> Response
where
    R: EntryRepository + 'static,
{
    match service.record_result(EntryId(entry_id), CandidateId(candidate_id), result) {
        Ok(entry) => (StatusCode::OK, axum::Json(entry)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn validate_result_handler<R>(
    State(service): State<Arc<EntryService<R>>>,
    Path((entry_id, candidate_id)): Path<(u32, u32)>,
) -> Response
where
    R: EntryRepository + 'static,
{
    match service.validate_result(EntryId(entry_id), CandidateId(candidate_id)) {
        Ok(entry) => (StatusCode::OK, axum::Json(entry)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn list_placeholders_handler<R>(
    State(service): State<Arc<EntryService<R>>>,
) -> Response
where
    R: EntryRepository + 'static,
{
    match service.placeholders() {
        Ok(placeholders) => (StatusCode::OK, axum::Json(placeholders)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn create_placeholder_handler<R>(
    State(service): State<Arc<EntryService<R>>>,
    axum::Json(request): axum::Json<CreatePlaceholderRequest>,
) -> Response
where
    R: EntryRepository + 'static,
{
    match service.create_placeholder(&request.syllabus_code) {
        Ok(placeholder) => (StatusCode::CREATED, axum::Json(placeholder)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn resolve_placeholder_handler<R>(
    State(service): State<Arc<EntryService<R>>>,
    Path(placeholder_id): Path<u32>,
    axum::Json(request): axum::Json<ResolvePlaceholderRequest>,
) -> Response
where
    R: EntryRepository + 'static,
{
    match service.resolve_placeholder(PlaceholderId(placeholder_id), request) {
        Ok(outcome) => (StatusCode::CREATED, axum::Json(outcome)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn results_handler<R>(
    State(service): State<Arc<EntryService<R>>>,
    Query(query): Query<ResultsQuery>,
) -> Response
where
    R: EntryRepository + 'static,
{
    match service.candidate_results() {
        Ok(records) => {
            let overview = ResultsOverview::from_records(&records);
            let payload = json!({
                "overview": overview,
                "records": query.apply(&records),
            });
            (StatusCode::OK, axum::Json(payload)).into_response()
        }
        Err(error) => error_response(error),
    }
}
