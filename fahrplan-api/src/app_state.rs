use std::sync::Arc;

use chrono::TimeZone;
use chrono_tz::Tz;
use fahrplan_core::generate_base_timetable;

use crate::{
    repositories::{InMemoryRouteRepository, InMemoryTimetableRepository, TimetableRepository},
    seed,
};

#[derive(Clone)]
pub struct AppState {
    pub route_repo: Arc<InMemoryRouteRepository>,
    pub timetable_repo: Arc<InMemoryTimetableRepository>,
    /// Zone all wall-clock rendering and reconciliation happens in.
    pub timezone: Tz,
    pub default_dwell_minutes: u32,
}

impl AppState {
    pub async fn new(timezone: Tz, default_dwell_minutes: u32) -> Self {
        let routes = seed::demo_routes();
        let timetable_repo = InMemoryTimetableRepository::new();

        // one baseline timetable for the first demo route, departing at
        // 08:00 local on a fixed reference date
        if let Some(route) = routes.first() {
            let start = timezone
                .with_ymd_and_hms(2024, 1, 1, 8, 0, 0)
                .earliest()
                .map(|dt| dt.to_utc());
            if let Some(start) = start {
                let timetable = generate_base_timetable(
                    route,
                    timetable_repo.allocate_id(),
                    start,
                    default_dwell_minutes,
                );
                if let Err(err) = timetable_repo.add_timetable(timetable).await {
                    tracing::error!("Failed to seed baseline timetable: {}", err);
                }
            }
        }

        Self {
            route_repo: Arc::new(InMemoryRouteRepository::new(routes)),
            timetable_repo: Arc::new(timetable_repo),
            timezone,
            default_dwell_minutes,
        }
    }
}
