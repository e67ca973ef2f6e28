use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Station {
    pub id: String,
    pub name: String,
    pub kilometer: f64,
    pub elevation: Option<i32>,
}

/// A stretch of a route with physical/operating parameters. Gradient is
/// signed per-mille, `None` where the source data has no survey value.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TrackSegment {
    pub id: String,
    pub km_start: f64,
    pub km_end: f64,
    pub speed_limit: u32,
    pub gradient: Option<i32>,
    pub note: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Route {
    pub id: String,
    pub name: String,
    pub description: String,
    pub country: String,
    pub estimated_speed_kmh: u32,
    pub stations: Vec<Station>,
    pub segments: Vec<TrackSegment>,
}

impl Route {
    /// The segment covering a kilometre mark, falling back to the last
    /// segment past the end of the line.
    pub fn segment_at(&self, kilometer: f64) -> Option<&TrackSegment> {
        self.segments
            .iter()
            .find(|seg| seg.km_start <= kilometer && kilometer < seg.km_end)
            .or_else(|| self.segments.last())
    }

    pub fn station(&self, station_id: &str) -> Option<&Station> {
        self.stations.iter().find(|st| st.id == station_id)
    }
}

/// One station's scheduled stop. Arrival/departure are absolute instants
/// or absent (origin has no arrival, terminus no departure, cleared fields
/// stay absent). Absent instants serialize as `null`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TimetableEntry {
    pub station_id: String,
    pub station_name: String,
    pub arrival: Option<DateTime<Utc>>,
    pub departure: Option<DateTime<Utc>>,
    pub track: Option<String>,
    pub remarks: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Timetable {
    pub id: String,
    pub route_id: String,
    pub train_number: String,
    pub title: String,
    pub entries: Vec<TimetableEntry>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn segment(id: &str, from: f64, to: f64) -> TrackSegment {
        TrackSegment {
            id: id.to_string(),
            km_start: from,
            km_end: to,
            speed_limit: 120,
            gradient: Some(3),
            note: None,
        }
    }

    #[test]
    fn segment_lookup_covers_marks_and_overflows_to_last() {
        let route = Route {
            id: "r1".into(),
            name: "Testbahn".into(),
            description: String::new(),
            country: "AT".into(),
            estimated_speed_kmh: 100,
            stations: vec![],
            segments: vec![segment("s1", 0.0, 10.0), segment("s2", 10.0, 25.0)],
        };

        assert_eq!(route.segment_at(0.0).unwrap().id, "s1");
        assert_eq!(route.segment_at(10.0).unwrap().id, "s2");
        // beyond the last segment end, the last segment still applies
        assert_eq!(route.segment_at(30.0).unwrap().id, "s2");
    }

    #[test]
    fn absent_instants_serialize_as_null() {
        let entry = TimetableEntry {
            station_id: "st-1".into(),
            station_name: "Wien Hbf".into(),
            arrival: None,
            departure: Some(Utc.with_ymd_and_hms(2024, 1, 1, 8, 0, 0).unwrap()),
            track: None,
            remarks: None,
        };

        let json = serde_json::to_value(&entry).unwrap();
        assert!(json["arrival"].is_null());
        assert_eq!(json["departure"], "2024-01-01T08:00:00Z");
    }
}
