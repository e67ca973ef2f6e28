use chrono::{DateTime, Utc};
use chrono_tz::Tz;

use crate::{reconcile, to_local_time_of_day, TimeError, TimetableEntry};

/// One editable table row of the timetable form. Times are wall-clock
/// "HH:MM" strings ("" where nothing is scheduled); the fallback instants
/// carry the anchoring dates the strings alone would lose.
#[derive(Clone, Debug, PartialEq)]
pub struct EntryRow {
    pub station_id: String,
    pub station_name: String,
    pub arrival: String,
    pub departure: String,
    pub track: String,
    pub remarks: String,
    pub arrival_fallback: Option<DateTime<Utc>>,
    pub departure_fallback: Option<DateTime<Utc>>,
}

impl EntryRow {
    pub fn from_entry(entry: &TimetableEntry, tz: Tz) -> Self {
        let render = |instant: Option<DateTime<Utc>>| {
            instant.map_or_else(String::new, |i| to_local_time_of_day(i, tz))
        };

        Self {
            station_id: entry.station_id.clone(),
            station_name: entry.station_name.clone(),
            arrival: render(entry.arrival),
            departure: render(entry.departure),
            track: entry.track.clone().unwrap_or_default(),
            remarks: entry.remarks.clone().unwrap_or_default(),
            arrival_fallback: entry.arrival,
            departure_fallback: entry.departure,
        }
    }

    /// Collect the row back into an entry. Each time field is reconciled
    /// against the instant it was loaded with; a field that never had a
    /// value anchors to `now` instead. Cleared text fields become absent,
    /// not empty strings.
    pub fn into_entry(self, tz: Tz, now: DateTime<Utc>) -> Result<TimetableEntry, TimeError> {
        let arrival = reconcile(&self.arrival, self.arrival_fallback.unwrap_or(now), tz)?;
        let departure = reconcile(&self.departure, self.departure_fallback.unwrap_or(now), tz)?;

        Ok(TimetableEntry {
            station_id: self.station_id,
            station_name: self.station_name,
            arrival,
            departure,
            track: none_if_empty(self.track),
            remarks: none_if_empty(self.remarks),
        })
    }
}

/// Render a timetable's entries as form rows.
pub fn entry_rows(entries: &[TimetableEntry], tz: Tz) -> Vec<EntryRow> {
    entries
        .iter()
        .map(|entry| EntryRow::from_entry(entry, tz))
        .collect()
}

/// Collect edited rows back into entries, failing on the first malformed
/// time field.
pub fn collect_entries(
    rows: Vec<EntryRow>,
    tz: Tz,
    now: DateTime<Utc>,
) -> Result<Vec<TimetableEntry>, TimeError> {
    rows.into_iter()
        .map(|row| row.into_entry(tz, now))
        .collect()
}

fn none_if_empty(value: String) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else if trimmed.len() == value.len() {
        Some(value)
    } else {
        Some(trimmed.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use chrono_tz::Europe::Vienna;

    fn entry() -> TimetableEntry {
        TimetableEntry {
            station_id: "wb-2".into(),
            station_name: "St. Pölten Hbf".into(),
            arrival: Some(Utc.with_ymd_and_hms(2024, 3, 1, 8, 3, 0).unwrap()),
            departure: Some(Utc.with_ymd_and_hms(2024, 3, 1, 8, 5, 0).unwrap()),
            track: Some("4".into()),
            remarks: None,
        }
    }

    #[test]
    fn renders_local_times_and_empty_for_absent() {
        let mut source = entry();
        source.departure = None;

        let row = EntryRow::from_entry(&source, Vienna);
        assert_eq!(row.arrival, "09:03"); // UTC+1
        assert_eq!(row.departure, "");
        assert_eq!(row.track, "4");
        assert_eq!(row.remarks, "");
    }

    #[test]
    fn unchanged_row_reproduces_identical_instants() {
        let source = entry();
        let row = EntryRow::from_entry(&source, Vienna);
        let now = Utc.with_ymd_and_hms(2025, 7, 7, 12, 0, 0).unwrap();

        let collected = row.into_entry(Vienna, now).unwrap();
        assert_eq!(collected.arrival, source.arrival);
        assert_eq!(collected.departure, source.departure);
        assert_eq!(collected.track, source.track);
        assert_eq!(collected.remarks, source.remarks);
    }

    #[test]
    fn edited_minute_keeps_the_loaded_date() {
        // arrival 2024-03-01T08:03:00Z shown as 09:03, edited to 09:15,
        // saved on a much later day
        let mut row = EntryRow::from_entry(&entry(), Vienna);
        row.arrival = "09:15".into();
        let now = Utc.with_ymd_and_hms(2025, 7, 7, 12, 0, 0).unwrap();

        let collected = row.into_entry(Vienna, now).unwrap();
        assert_eq!(
            collected.arrival,
            Some(Utc.with_ymd_and_hms(2024, 3, 1, 8, 15, 0).unwrap())
        );
    }

    #[test]
    fn cleared_time_field_becomes_absent() {
        let mut row = EntryRow::from_entry(&entry(), Vienna);
        row.departure = String::new();

        let now = Utc.with_ymd_and_hms(2025, 7, 7, 12, 0, 0).unwrap();
        let collected = row.into_entry(Vienna, now).unwrap();
        assert!(collected.departure.is_none());
    }

    #[test]
    fn time_typed_into_an_empty_field_anchors_to_now() {
        let mut source = entry();
        source.arrival = None;
        let mut row = EntryRow::from_entry(&source, Vienna);
        row.arrival = "10:30".into();

        // "now" is 2025-07-07 in Vienna (CEST, UTC+2)
        let now = Utc.with_ymd_and_hms(2025, 7, 7, 12, 0, 0).unwrap();
        let collected = row.into_entry(Vienna, now).unwrap();
        assert_eq!(
            collected.arrival,
            Some(Utc.with_ymd_and_hms(2025, 7, 7, 8, 30, 0).unwrap())
        );
    }

    #[test]
    fn blank_track_and_remarks_are_absent_not_empty() {
        let mut row = EntryRow::from_entry(&entry(), Vienna);
        row.track = "  ".into();
        row.remarks = "Halt entfällt".into();

        let now = Utc.with_ymd_and_hms(2025, 7, 7, 12, 0, 0).unwrap();
        let collected = row.into_entry(Vienna, now).unwrap();
        assert!(collected.track.is_none());
        assert_eq!(collected.remarks.as_deref(), Some("Halt entfällt"));
    }

    #[test]
    fn malformed_edit_fails_the_whole_collect() {
        let rows = vec![
            EntryRow::from_entry(&entry(), Vienna),
            {
                let mut row = EntryRow::from_entry(&entry(), Vienna);
                row.arrival = "half past nine".into();
                row
            },
        ];
        let now = Utc.with_ymd_and_hms(2025, 7, 7, 12, 0, 0).unwrap();
        assert!(collect_entries(rows, Vienna, now).is_err());
    }
}
