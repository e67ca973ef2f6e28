use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use fahrplan_core::{Route, Station, TrackSegment};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::{
    repositories::RouteRepository,
    routes::ApiError,
    AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(get_routes))
        .route("/", post(add_route))
}

#[derive(Serialize)]
struct RoutesResponse {
    routes: Vec<Route>,
}

#[instrument(name = "GET /routes", skip(app_state))]
async fn get_routes(State(app_state): State<AppState>) -> Result<Json<RoutesResponse>, ApiError> {
    let routes = app_state.route_repo.get_routes().await?;
    Ok(Json(RoutesResponse { routes }))
}

#[derive(Debug, Deserialize)]
struct AddRouteBody {
    id: Option<String>,
    name: String,
    #[serde(default)]
    description: String,
    country: Option<String>,
    estimated_speed_kmh: Option<u32>,
    #[serde(default)]
    stations: Vec<StationPayload>,
    #[serde(default)]
    segments: Vec<SegmentPayload>,
}

#[derive(Debug, Deserialize)]
struct StationPayload {
    id: Option<String>,
    name: String,
    #[serde(default)]
    kilometer: f64,
    elevation: Option<i32>,
}

#[derive(Debug, Deserialize)]
struct SegmentPayload {
    id: Option<String>,
    km_start: f64,
    km_end: f64,
    speed_limit: u32,
    gradient: Option<i32>,
    note: Option<String>,
}

#[instrument(name = "POST /routes", skip(app_state, body), fields(name = %body.name))]
async fn add_route(
    State(app_state): State<AppState>,
    Json(body): Json<AddRouteBody>,
) -> Result<(StatusCode, Json<Route>), ApiError> {
    if body.name.trim().is_empty() {
        return Err(ApiError::bad_request("Route name must not be empty"));
    }

    let route = route_from_payload(body);
    let route = app_state.route_repo.add_route(route).await?;
    Ok((StatusCode::CREATED, Json(route)))
}

fn route_from_payload(body: AddRouteBody) -> Route {
    let id = body
        .id
        .filter(|id| !id.trim().is_empty())
        .unwrap_or_else(|| body.name.to_lowercase().replace(' ', "-"));

    let stations = body
        .stations
        .into_iter()
        .enumerate()
        .map(|(idx, station)| Station {
            id: station.id.unwrap_or_else(|| format!("st-{}", idx + 1)),
            name: station.name,
            kilometer: station.kilometer,
            elevation: station.elevation,
        })
        .collect();

    let segments = body
        .segments
        .into_iter()
        .enumerate()
        .map(|(idx, segment)| TrackSegment {
            id: segment.id.unwrap_or_else(|| format!("{}-s{}", id, idx + 1)),
            km_start: segment.km_start,
            km_end: segment.km_end,
            speed_limit: segment.speed_limit,
            gradient: segment.gradient,
            note: segment.note,
        })
        .collect();

    Route {
        id,
        name: body.name,
        description: body.description,
        country: body.country.unwrap_or_else(|| "AT".to_string()),
        estimated_speed_kmh: body.estimated_speed_kmh.unwrap_or(100),
        stations,
        segments,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payload_defaults_fill_in_ids_country_and_speed() {
        let body = AddRouteBody {
            id: None,
            name: "Brennerbahn Innsbruck Bozen".into(),
            description: String::new(),
            country: None,
            estimated_speed_kmh: None,
            stations: vec![StationPayload {
                id: None,
                name: "Innsbruck Hbf".into(),
                kilometer: 0.0,
                elevation: Some(582),
            }],
            segments: vec![SegmentPayload {
                id: None,
                km_start: 0.0,
                km_end: 35.0,
                speed_limit: 100,
                gradient: Some(25),
                note: None,
            }],
        };

        let route = route_from_payload(body);
        assert_eq!(route.id, "brennerbahn-innsbruck-bozen");
        assert_eq!(route.country, "AT");
        assert_eq!(route.estimated_speed_kmh, 100);
        assert_eq!(route.stations[0].id, "st-1");
        assert_eq!(route.segments[0].id, "brennerbahn-innsbruck-bozen-s1");
    }
}
