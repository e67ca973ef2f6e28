use chrono::{DateTime, NaiveDateTime, NaiveTime, TimeDelta, TimeZone, Timelike, Utc};
use chrono_tz::Tz;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TimeError {
    #[error("invalid time of day '{0}', expected HH:MM")]
    InvalidTimeOfDay(String),
    #[error("invalid local date-time '{0}', expected YYYY-MM-DDTHH:MM")]
    InvalidLocalDateTime(String),
    #[error("local time {0} does not exist in {1} (DST gap)")]
    NonexistentLocalTime(NaiveDateTime, Tz),
}

/// Render an absolute instant as a two-digit "HH:MM" wall-clock string
/// in `tz`. Callers with an absent instant substitute "" themselves.
pub fn to_local_time_of_day(instant: DateTime<Utc>, tz: Tz) -> String {
    instant.with_timezone(&tz).format("%H:%M").to_string()
}

/// Reconcile a user-edited time-of-day string with the instant the field
/// was loaded with. The fallback's calendar date (in `tz`) is kept, only
/// hour and minute are replaced, seconds are zeroed. An empty string means
/// the field was cleared and yields `None`. The current date is never
/// consulted; a multi-day timetable keeps its dates when only times are
/// edited.
pub fn reconcile(
    edited: &str,
    fallback: DateTime<Utc>,
    tz: Tz,
) -> Result<Option<DateTime<Utc>>, TimeError> {
    let edited = edited.trim();
    if edited.is_empty() {
        return Ok(None);
    }

    let time = parse_time_of_day(edited)?;
    let local_date = fallback.with_timezone(&tz).date_naive();
    let instant = resolve_local(local_date.and_time(time), tz)?;
    Ok(Some(instant))
}

/// Local "YYYY-MM-DDTHH:MM" suitable for pre-filling a start-time input:
/// `now` in `tz`, minute rounded up to the next 5-minute boundary,
/// seconds zeroed. Rounding at :59 carries into the next hour (and date)
/// through plain instant arithmetic.
pub fn default_start_local(now: DateTime<Utc>, tz: Tz) -> String {
    let local = now.with_timezone(&tz);
    let floored = local
        - TimeDelta::seconds(i64::from(local.second()))
        - TimeDelta::nanoseconds(i64::from(local.nanosecond()));
    let carry = (5 - floored.minute() % 5) % 5;
    let rounded = floored + TimeDelta::minutes(i64::from(carry));
    rounded.format("%Y-%m-%dT%H:%M").to_string()
}

/// Interpret a "YYYY-MM-DDTHH:MM[:SS]" local date-time input value in `tz`
/// and produce the absolute instant for transmission.
pub fn to_absolute_instant(local: &str, tz: Tz) -> Result<DateTime<Utc>, TimeError> {
    let naive = NaiveDateTime::parse_from_str(local, "%Y-%m-%dT%H:%M")
        .or_else(|_| NaiveDateTime::parse_from_str(local, "%Y-%m-%dT%H:%M:%S"))
        .map_err(|_| TimeError::InvalidLocalDateTime(local.to_string()))?;
    resolve_local(naive, tz)
}

fn parse_time_of_day(value: &str) -> Result<NaiveTime, TimeError> {
    let invalid = || TimeError::InvalidTimeOfDay(value.to_string());

    let (hour, minute) = value.split_once(':').ok_or_else(invalid)?;
    let hour: u32 = hour.parse().map_err(|_| invalid())?;
    let minute: u32 = minute.parse().map_err(|_| invalid())?;
    NaiveTime::from_hms_opt(hour, minute, 0).ok_or_else(invalid)
}

/// Pin a naive local date-time to the timeline. Autumn-fold ambiguity
/// resolves to the earliest instant; a spring-forward gap is an error.
fn resolve_local(naive: NaiveDateTime, tz: Tz) -> Result<DateTime<Utc>, TimeError> {
    tz.from_local_datetime(&naive)
        .earliest()
        .map(|dt| dt.with_timezone(&Utc))
        .ok_or(TimeError::NonexistentLocalTime(naive, tz))
}
