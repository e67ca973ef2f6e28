use chrono::{DateTime, TimeDelta, Timelike, Utc};

use crate::{Route, Timetable, TimetableEntry};

/// Compute a baseline timetable for a route: the origin has no arrival and
/// departs at `start_time`; each following station is reached after the
/// segment distance at the route's estimated speed and left again after
/// `dwell_minutes`; the terminus has no departure.
///
/// All published instants are truncated to whole minutes so the HH:MM a
/// user sees maps back onto the exact stored instant when re-submitted
/// unchanged.
pub fn generate_base_timetable(
    route: &Route,
    id: impl Into<String>,
    start_time: DateTime<Utc>,
    dwell_minutes: u32,
) -> Timetable {
    let start_time = floor_to_minute(start_time);
    let dwell = TimeDelta::minutes(i64::from(dwell_minutes));

    let mut entries = Vec::with_capacity(route.stations.len());
    let mut current = start_time;
    let mut previous_km: Option<f64> = None;
    let last = route.stations.len().saturating_sub(1);

    for (idx, station) in route.stations.iter().enumerate() {
        let arrival = previous_km.map(|prev_km| {
            // degenerate data (co-located or unordered stations) still
            // moves the clock forward a little
            let distance_km = (station.kilometer - prev_km).max(0.1);
            let travel_secs =
                (distance_km / f64::from(route.estimated_speed_kmh) * 3600.0).round() as i64;
            floor_to_minute(current + TimeDelta::seconds(travel_secs))
        });

        // the origin departs at the requested start, dwell applies only
        // where the train actually arrives first
        let departure = if idx == last {
            None
        } else {
            Some(arrival.map_or(start_time, |arr| arr + dwell))
        };

        entries.push(TimetableEntry {
            station_id: station.id.clone(),
            station_name: station.name.clone(),
            arrival,
            departure,
            track: None,
            remarks: None,
        });

        previous_km = Some(station.kilometer);
        current = departure.or(arrival).unwrap_or(current);
    }

    Timetable {
        id: id.into(),
        route_id: route.id.clone(),
        train_number: format!("{}-001", route.id.to_uppercase()),
        title: format!("{} – Grundfahrplan", route.name),
        entries,
    }
}

fn floor_to_minute(instant: DateTime<Utc>) -> DateTime<Utc> {
    instant
        - TimeDelta::seconds(i64::from(instant.second()))
        - TimeDelta::nanoseconds(i64::from(instant.nanosecond()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Station;
    use chrono::TimeZone;

    fn test_route() -> Route {
        Route {
            id: "wb".into(),
            name: "Westbahn Wien – Salzburg".into(),
            description: String::new(),
            country: "AT".into(),
            estimated_speed_kmh: 120,
            stations: vec![
                Station {
                    id: "wb-1".into(),
                    name: "Wien Hbf".into(),
                    kilometer: 0.0,
                    elevation: None,
                },
                Station {
                    id: "wb-2".into(),
                    name: "St. Pölten Hbf".into(),
                    kilometer: 60.0,
                    elevation: None,
                },
                Station {
                    id: "wb-3".into(),
                    name: "Linz Hbf".into(),
                    kilometer: 180.0,
                    elevation: None,
                },
            ],
            segments: vec![],
        }
    }

    #[test]
    fn open_ends_and_travel_times() {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 8, 0, 0).unwrap();
        let tt = generate_base_timetable(&test_route(), "tt-1", start, 2);

        assert_eq!(tt.train_number, "WB-001");
        assert_eq!(tt.title, "Westbahn Wien – Salzburg – Grundfahrplan");
        assert_eq!(tt.entries.len(), 3);

        // origin: no arrival, departs at start
        assert!(tt.entries[0].arrival.is_none());
        assert_eq!(tt.entries[0].departure, Some(start));

        // 60 km at 120 km/h = 30 min, plus 2 min dwell
        let arr2 = Utc.with_ymd_and_hms(2024, 1, 1, 8, 30, 0).unwrap();
        assert_eq!(tt.entries[1].arrival, Some(arr2));
        assert_eq!(tt.entries[1].departure, Some(arr2 + TimeDelta::minutes(2)));

        // terminus: 120 km leg, no departure
        let arr3 = Utc.with_ymd_and_hms(2024, 1, 1, 9, 32, 0).unwrap();
        assert_eq!(tt.entries[2].arrival, Some(arr3));
        assert!(tt.entries[2].departure.is_none());
    }

    #[test]
    fn instants_are_minute_aligned() {
        let mut route = test_route();
        route.estimated_speed_kmh = 130; // non-round travel times
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 8, 0, 37).unwrap();
        let tt = generate_base_timetable(&route, "tt-1", start, 2);

        for entry in &tt.entries {
            for instant in entry.arrival.iter().chain(entry.departure.iter()) {
                assert_eq!(instant.second(), 0, "entry {:?}", entry.station_id);
                assert_eq!(instant.nanosecond(), 0);
            }
        }
    }

    #[test]
    fn colocated_stations_still_advance() {
        let mut route = test_route();
        route.stations[1].kilometer = 0.0;
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 8, 0, 0).unwrap();
        let tt = generate_base_timetable(&route, "tt-1", start, 2);

        // clamped to 0.1 km minimum distance, rounded down to the minute:
        // the arrival may equal the departure but must never precede it
        assert!(tt.entries[1].arrival.unwrap() >= tt.entries[0].departure.unwrap());
    }

    #[test]
    fn empty_route_yields_empty_timetable() {
        let mut route = test_route();
        route.stations.clear();
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 8, 0, 0).unwrap();
        let tt = generate_base_timetable(&route, "tt-1", start, 2);
        assert!(tt.entries.is_empty());
    }
}
