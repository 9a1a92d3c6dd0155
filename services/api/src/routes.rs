use crate::infra::{deserialize_optional_datetime, AppState, ExamsOffice};
use axum::extract::{Path, Query};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post, put};
use axum::Extension;
use axum::Json;
use chrono::{Local, NaiveDateTime};
use exam_results::error::AppError;
use exam_results::workflows::catalog::{
    accept_upload, Candidate, CatalogStats, NewSeason, Series, SeriesId, SeriesKind, Syllabus,
    SyllabusDraft, UploadReceipt,
};
use exam_results::workflows::embargo::{
    student_statement, BoardEmbargo, EmbargoControls, EmbargoState, StudentStatement,
};
use exam_results::workflows::entries::entry_router;
use exam_results::workflows::results::{
    validation_queue, CandidateResults, ResultsImporter, ResultsOverview,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::io::Cursor;

#[derive(Debug, Default, Deserialize)]
pub(crate) struct SeriesQuery {
    #[serde(default)]
    pub(crate) search: Option<String>,
    #[serde(default)]
    pub(crate) kind: Option<SeriesKind>,
}

#[derive(Debug, Serialize)]
pub(crate) struct SeriesListing {
    pub(crate) stats: CatalogStats,
    pub(crate) series: Vec<Series>,
}

#[derive(Debug, Serialize)]
pub(crate) struct RosterResponse {
    pub(crate) candidates: usize,
}

#[derive(Debug, Serialize)]
pub(crate) struct ImportResponse {
    pub(crate) imported_students: usize,
    pub(crate) overview: ResultsOverview,
    pub(crate) awaiting_validation: usize,
    pub(crate) records: Vec<CandidateResults>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct UploadRequest {
    #[serde(default)]
    pub(crate) file_name: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct UploadResponse {
    #[serde(flatten)]
    pub(crate) receipt: UploadReceipt,
    pub(crate) content_type: String,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct StatementQuery {
    #[serde(default, deserialize_with = "deserialize_optional_datetime")]
    pub(crate) at: Option<NaiveDateTime>,
}

#[derive(Debug, Serialize)]
pub(crate) struct BoardView {
    #[serde(flatten)]
    pub(crate) board: BoardEmbargo,
    pub(crate) state: EmbargoState,
    pub(crate) embargoed: bool,
    pub(crate) notice_due: bool,
}

#[derive(Debug, Serialize)]
pub(crate) struct EmbargoOverview {
    pub(crate) controls: EmbargoControls,
    pub(crate) boards: Vec<BoardView>,
}

pub(crate) fn with_exam_routes(office: ExamsOffice) -> axum::Router {
    entry_router(office.entries.clone())
        .route("/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
        .route(
            "/api/v1/series",
            get(list_series_endpoint).post(create_series_endpoint),
        )
        .route(
            "/api/v1/series/:series_id/syllabuses",
            post(add_syllabus_endpoint),
        )
        .route(
            "/api/v1/roster",
            get(roster_endpoint).put(replace_roster_endpoint),
        )
        .route("/api/v1/results/import", post(import_results_endpoint))
        .route("/api/v1/basedata/uploads", post(basedata_upload_endpoint))
        .route("/api/v1/embargo", get(embargo_endpoint))
        .route(
            "/api/v1/embargo/:organization/release",
            post(release_embargo_endpoint),
        )
        .route(
            "/api/v1/students/:student_key/statement",
            get(statement_endpoint),
        )
        .layer(Extension(office))
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

pub(crate) async fn list_series_endpoint(
    Extension(office): Extension<ExamsOffice>,
    Query(query): Query<SeriesQuery>,
) -> Json<SeriesListing> {
    let listing = office.reference.read(|catalog| SeriesListing {
        stats: catalog.stats(),
        series: catalog
            .filter(query.search.as_deref().unwrap_or(""), query.kind)
            .into_iter()
            .cloned()
            .collect(),
    });
    Json(listing)
}

pub(crate) async fn create_series_endpoint(
    Extension(office): Extension<ExamsOffice>,
    Json(season): Json<NewSeason>,
) -> Result<(StatusCode, Json<Series>), AppError> {
    let series = office
        .reference
        .write(|catalog| catalog.create_season(season).map(Series::clone))?;
    Ok((StatusCode::CREATED, Json(series)))
}

pub(crate) async fn add_syllabus_endpoint(
    Extension(office): Extension<ExamsOffice>,
    Path(series_id): Path<u32>,
    Json(draft): Json<SyllabusDraft>,
) -> Result<(StatusCode, Json<Syllabus>), AppError> {
    let syllabus = office.reference.write(|catalog| {
        catalog
            .add_syllabus(SeriesId(series_id), draft)
            .map(Syllabus::clone)
    })?;
    Ok((StatusCode::CREATED, Json(syllabus)))
}

pub(crate) async fn roster_endpoint(Extension(office): Extension<ExamsOffice>) -> Json<Vec<Candidate>> {
    Json(office.reference.roster())
}

/// Replaces the whole roster. Entries created earlier keep their candidate ids.
pub(crate) async fn replace_roster_endpoint(
    Extension(office): Extension<ExamsOffice>,
    Json(roster): Json<Vec<Candidate>>,
) -> Result<Json<RosterResponse>, AppError> {
    let candidates = office.reference.replace_roster(roster)?;
    Ok(Json(RosterResponse { candidates }))
}

/// Body is the raw CSV export. The batch replaces any earlier import.
pub(crate) async fn import_results_endpoint(
    Extension(office): Extension<ExamsOffice>,
    body: String,
) -> Result<Json<ImportResponse>, AppError> {
    let imported = ResultsImporter::from_reader(Cursor::new(body.into_bytes()))?;
    let imported_students = imported.len();
    *office.imported.lock().expect("import mutex poisoned") = imported;

    let records = office.merged_results()?;
    let overview = ResultsOverview::from_records(&records);
    let awaiting_validation = validation_queue(&records).len();

    Ok(Json(ImportResponse {
        imported_students,
        overview,
        awaiting_validation,
        records,
    }))
}

pub(crate) async fn basedata_upload_endpoint(
    Json(request): Json<UploadRequest>,
) -> Result<(StatusCode, Json<UploadResponse>), AppError> {
    let receipt = accept_upload(&request.file_name)?;
    let content_type = mime_guess::from_path(&receipt.file_name)
        .first_or_octet_stream()
        .essence_str()
        .to_string();

    Ok((
        StatusCode::ACCEPTED,
        Json(UploadResponse {
            receipt,
            content_type,
        }),
    ))
}

pub(crate) async fn embargo_endpoint(
    Extension(office): Extension<ExamsOffice>,
    Query(query): Query<StatementQuery>,
) -> Json<EmbargoOverview> {
    let now = query.at.unwrap_or_else(|| Local::now().naive_local());
    let register = office.embargo.lock().expect("embargo mutex poisoned");
    let boards = register
        .boards()
        .iter()
        .map(|board| BoardView {
            board: board.clone(),
            state: board.state_at(now),
            embargoed: register.is_embargoed(&board.organization, now),
            notice_due: register.notice_due(&board.organization, now),
        })
        .collect();

    Json(EmbargoOverview {
        controls: register.controls(),
        boards,
    })
}

pub(crate) async fn release_embargo_endpoint(
    Extension(office): Extension<ExamsOffice>,
    Path(organization): Path<String>,
) -> Result<StatusCode, AppError> {
    office
        .embargo
        .lock()
        .expect("embargo mutex poisoned")
        .release(&organization)?;
    Ok(StatusCode::NO_CONTENT)
}

pub(crate) async fn statement_endpoint(
    Extension(office): Extension<ExamsOffice>,
    Path(student_key): Path<String>,
    Query(query): Query<StatementQuery>,
) -> axum::response::Response {
    let now = query.at.unwrap_or_else(|| Local::now().naive_local());
    let records = match office.merged_results() {
        Ok(records) => records,
        Err(err) => return err.into_response(),
    };

    let Some(record) = records.iter().find(|record| record.student_key == student_key) else {
        let payload = json!({ "error": format!("no results found for student {student_key}") });
        return (StatusCode::NOT_FOUND, Json(payload)).into_response();
    };

    let register = office.embargo.lock().expect("embargo mutex poisoned");
    let statement: StudentStatement = student_statement(record, &register, now);
    Json(statement).into_response()
}
