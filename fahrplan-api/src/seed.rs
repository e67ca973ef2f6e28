use fahrplan_core::{Route, Station, TrackSegment};

/// Demo routes available on a fresh start, so the editor has something to
/// generate against before anyone posts their own route data.
pub fn demo_routes() -> Vec<Route> {
    vec![westbahn(), muenchner_s3()]
}

fn westbahn() -> Route {
    Route {
        id: "wb".into(),
        name: "Westbahn Wien – Salzburg".into(),
        description: "Schnellfahrstrecke von Wien über Linz nach Salzburg".into(),
        country: "AT".into(),
        estimated_speed_kmh: 160,
        stations: vec![
            station("wb-1", "Wien Hbf", 0.0),
            station("wb-2", "St. Pölten Hbf", 59.1),
            station("wb-3", "Linz Hbf", 185.6),
            station("wb-4", "Wels Hbf", 210.4),
            station("wb-5", "Salzburg Hbf", 312.2),
        ],
        segments: vec![
            segment("wb-s1", 0.0, 15.0, 120, 3, "Ausfahrt Wien Hbf – Lainzer Tunnel"),
            segment("wb-s2", 15.0, 59.1, 160, 6, "Tullnerfelder Hochgeschwindigkeitsabschnitt"),
            segment("wb-s3", 59.1, 185.6, 230, -2, "Westbahn Hochleistungsstrecke"),
            segment("wb-s4", 185.6, 210.4, 200, 1, "Einfahrt Raum Linz/Wels"),
            segment("wb-s5", 210.4, 312.2, 160, -4, "Innviertel Richtung Salzburg"),
        ],
    }
}

fn muenchner_s3() -> Route {
    Route {
        id: "s3".into(),
        name: "S-Bahn München S3 Holzkirchen – Mammendorf".into(),
        description: "S-Bahn Linie durch München".into(),
        country: "DE".into(),
        estimated_speed_kmh: 80,
        stations: vec![
            station("s3-1", "Holzkirchen", 0.0),
            station("s3-2", "Deisenhofen", 14.7),
            station("s3-3", "München Hbf (tief)", 34.1),
            station("s3-4", "Pasing", 41.4),
            station("s3-5", "Mammendorf", 61.7),
        ],
        segments: vec![
            segment("s3-s1", 0.0, 14.7, 120, 8, "Mangfalltal – leichte Steigung"),
            segment("s3-s2", 14.7, 34.1, 100, -3, "Ein- und Ausfahrt Stammstrecke Süd"),
            segment("s3-s3", 34.1, 41.4, 90, 0, "Stammstrecke Tunnelbereich"),
            segment("s3-s4", 41.4, 61.7, 120, 2, "Landkreis Fürstenfeldbruck"),
        ],
    }
}

fn station(id: &str, name: &str, kilometer: f64) -> Station {
    Station {
        id: id.into(),
        name: name.into(),
        kilometer,
        elevation: None,
    }
}

fn segment(id: &str, km_start: f64, km_end: f64, speed_limit: u32, gradient: i32, note: &str) -> TrackSegment {
    TrackSegment {
        id: id.into(),
        km_start,
        km_end,
        speed_limit,
        gradient: Some(gradient),
        note: Some(note.into()),
    }
}
