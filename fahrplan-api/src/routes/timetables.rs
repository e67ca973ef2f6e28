use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    routing::{get, put},
    Json, Router,
};
use chrono::{DateTime, Utc};
use fahrplan_core::{generate_base_timetable, Timetable, TimetableEntry};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::{
    pdf::build_timetable_pdf,
    repositories::{RouteRepository, TimetableRepository},
    routes::ApiError,
    AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(get_timetables).post(generate_timetable))
        .route("/:id", get(get_timetable).put(update_timetable))
        .route("/:id/pdf", get(download_pdf))
}

#[derive(Serialize)]
struct TimetablesResponse {
    timetables: Vec<Timetable>,
}

#[instrument(name = "GET /timetables", skip(app_state))]
async fn get_timetables(
    State(app_state): State<AppState>,
) -> Result<Json<TimetablesResponse>, ApiError> {
    let timetables = app_state.timetable_repo.get_timetables().await?;
    Ok(Json(TimetablesResponse { timetables }))
}

#[derive(Debug, Deserialize)]
struct GenerateTimetableBody {
    route_id: String,
    /// ISO-8601 instant; the client converts its local start input first.
    start_time: DateTime<Utc>,
    dwell_minutes: Option<u32>,
}

#[instrument(
    name = "POST /timetables",
    skip(app_state, body),
    fields(route_id = %body.route_id, start_time = %body.start_time)
)]
async fn generate_timetable(
    State(app_state): State<AppState>,
    Json(body): Json<GenerateTimetableBody>,
) -> Result<(StatusCode, Json<Timetable>), ApiError> {
    let route = app_state.route_repo.get_route(&body.route_id).await?;
    let dwell = body
        .dwell_minutes
        .unwrap_or(app_state.default_dwell_minutes);

    let timetable = generate_base_timetable(
        &route,
        app_state.timetable_repo.allocate_id(),
        body.start_time,
        dwell,
    );
    let timetable = app_state.timetable_repo.add_timetable(timetable).await?;

    Ok((StatusCode::CREATED, Json(timetable)))
}

#[instrument(name = "GET /timetables/:id", skip(app_state))]
async fn get_timetable(
    State(app_state): State<AppState>,
    Path(timetable_id): Path<String>,
) -> Result<Json<Timetable>, ApiError> {
    let timetable = app_state.timetable_repo.get_timetable(&timetable_id).await?;
    Ok(Json(timetable))
}

#[derive(Debug, Deserialize)]
struct UpdateTimetableBody {
    entries: Vec<TimetableEntry>,
}

#[instrument(name = "PUT /timetables/:id", skip(app_state, body))]
async fn update_timetable(
    State(app_state): State<AppState>,
    Path(timetable_id): Path<String>,
    Json(body): Json<UpdateTimetableBody>,
) -> Result<Json<Timetable>, ApiError> {
    let timetable = app_state
        .timetable_repo
        .update_entries(&timetable_id, body.entries)
        .await?;
    Ok(Json(timetable))
}

#[instrument(name = "GET /timetables/:id/pdf", skip(app_state))]
async fn download_pdf(
    State(app_state): State<AppState>,
    Path(timetable_id): Path<String>,
) -> Result<([(header::HeaderName, String); 2], Vec<u8>), ApiError> {
    let timetable = app_state.timetable_repo.get_timetable(&timetable_id).await?;
    let route = app_state.route_repo.get_route(&timetable.route_id).await?;

    let bytes = build_timetable_pdf(&timetable, &route, app_state.timezone)?;

    Ok((
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}.pdf\"", timetable_id),
            ),
        ],
        bytes,
    ))
}
