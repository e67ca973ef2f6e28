use chrono_tz::Tz;
use fahrplan_api::{app_state::AppState, config, router};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=debug".into()),
        )
        .init();

    let config = config::read_config().expect("Failed to read configuration");
    let timezone: Tz = config
        .timetable
        .timezone
        .parse()
        .expect("Invalid timetable timezone in configuration");

    let app_state = AppState::new(timezone, config.timetable.default_dwell_minutes).await;
    let app = router::create(app_state, &config);

    let address = format!("{}:{}", config.application.host, config.application.port);
    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .expect("Failed to bind address");

    tracing::info!("Listening on {}", address);
    axum::serve(listener, app).await.expect("Server failed");
}
