use axum::{http::Method, routing::get, Router};
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::{DefaultMakeSpan, TraceLayer},
};

use crate::{app_state::AppState, config::Settings, routes};

pub fn create(app_state: AppState, config: &Settings) -> Router<()> {
    let base_app = Router::new()
        .route("/", get(|| async { "Fahrplan API" }))
        .nest("/api/routes", routes::routes::router())
        .nest("/api/timetables", routes::timetables::router());

    let app_url = config.application.app_url.clone();
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT])
        .allow_headers(["content-type".parse().unwrap()])
        .allow_origin(AllowOrigin::predicate(move |origin, _| {
            origin.to_str().unwrap_or_default() == app_url
        }));

    base_app
        .with_state(app_state)
        .layer(cors)
        .layer(TraceLayer::new_for_http().make_span_with(DefaultMakeSpan::default()))
}
