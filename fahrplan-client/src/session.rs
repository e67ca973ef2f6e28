use std::sync::{
    atomic::{AtomicBool, Ordering},
    Mutex,
};

use chrono::Utc;
use chrono_tz::Tz;
use fahrplan_core::{
    collect_entries, default_start_local, entry_rows, to_absolute_instant, EntryRow, TimeError,
    Timetable,
};
use thiserror::Error;

use crate::{ClientError, FahrplanClient};

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("no route selected")]
    NoRouteSelected,
    #[error("no start time set")]
    NoStartTime,
    #[error("a generate request is already in flight")]
    Busy,
    #[error("no timetable loaded")]
    NothingLoaded,
    #[error(transparent)]
    Time(#[from] TimeError),
    #[error(transparent)]
    Client(#[from] ClientError),
}

/// Editing session for one timetable form: holds the single cached
/// timetable (replaced wholesale on every successful generate, save or
/// refresh) and the timezone the user edits wall-clock times in.
pub struct TimetableSession {
    client: FahrplanClient,
    timezone: Tz,
    current: Mutex<Option<Timetable>>,
    generating: AtomicBool,
}

impl TimetableSession {
    pub fn new(client: FahrplanClient, timezone: Tz) -> Self {
        Self {
            client,
            timezone,
            current: Mutex::new(None),
            generating: AtomicBool::new(false),
        }
    }

    pub fn current(&self) -> Option<Timetable> {
        self.current.lock().expect("session lock poisoned").clone()
    }

    /// Pre-fill value for the start-time input: now, rounded up to the
    /// next 5-minute boundary.
    pub fn default_start(&self) -> String {
        default_start_local(Utc::now(), self.timezone)
    }

    /// Generate a baseline timetable. Validation failures are reported
    /// before any request goes out; while one generate is in flight,
    /// further ones are refused rather than raced.
    pub async fn generate(
        &self,
        route_id: &str,
        start_local: &str,
        dwell_minutes: u32,
    ) -> Result<Timetable, SessionError> {
        if route_id.trim().is_empty() {
            return Err(SessionError::NoRouteSelected);
        }
        if start_local.trim().is_empty() {
            return Err(SessionError::NoStartTime);
        }
        let start_time = to_absolute_instant(start_local, self.timezone)?;

        if self
            .generating
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(SessionError::Busy);
        }
        // released on every exit path, including the future being dropped
        // mid-flight
        let _busy = BusyGuard(&self.generating);

        let timetable = self
            .client
            .generate_timetable(route_id, start_time, dwell_minutes)
            .await?;
        self.replace(timetable.clone());
        Ok(timetable)
    }

    /// The current timetable's entries as editable form rows.
    pub fn rows(&self) -> Result<Vec<EntryRow>, SessionError> {
        let current = self.current.lock().expect("session lock poisoned");
        let timetable = current.as_ref().ok_or(SessionError::NothingLoaded)?;
        Ok(entry_rows(&timetable.entries, self.timezone))
    }

    /// Reconcile edited rows against their loaded instants and persist.
    pub async fn save(&self, rows: Vec<EntryRow>) -> Result<Timetable, SessionError> {
        let timetable_id = {
            let current = self.current.lock().expect("session lock poisoned");
            current
                .as_ref()
                .map(|tt| tt.id.clone())
                .ok_or(SessionError::NothingLoaded)?
        };

        let entries = collect_entries(rows, self.timezone, Utc::now())?;
        let timetable = self.client.save_timetable(&timetable_id, &entries).await?;
        self.replace(timetable.clone());
        Ok(timetable)
    }

    pub async fn refresh(&self) -> Result<Timetable, SessionError> {
        let timetable_id = self
            .current()
            .map(|tt| tt.id)
            .ok_or(SessionError::NothingLoaded)?;
        let timetable = self.client.fetch_timetable(&timetable_id).await?;
        self.replace(timetable.clone());
        Ok(timetable)
    }

    pub async fn download_pdf(&self) -> Result<Vec<u8>, SessionError> {
        let timetable_id = self
            .current()
            .map(|tt| tt.id)
            .ok_or(SessionError::NothingLoaded)?;
        Ok(self.client.download_pdf(&timetable_id).await?)
    }

    fn replace(&self, timetable: Timetable) {
        *self.current.lock().expect("session lock poisoned") = Some(timetable);
    }
}

struct BusyGuard<'a>(&'a AtomicBool);

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono_tz::Europe::Vienna;

    fn session() -> TimetableSession {
        // nothing here may actually be reached over the network
        TimetableSession::new(FahrplanClient::new("http://127.0.0.1:1"), Vienna)
    }

    #[tokio::test]
    async fn generate_validates_before_any_request() {
        let session = session();
        assert!(matches!(
            session.generate("", "2024-01-01T08:00", 2).await,
            Err(SessionError::NoRouteSelected)
        ));
        assert!(matches!(
            session.generate("wb", "  ", 2).await,
            Err(SessionError::NoStartTime)
        ));
        assert!(matches!(
            session.generate("wb", "not-a-time", 2).await,
            Err(SessionError::Time(_))
        ));
    }

    #[tokio::test]
    async fn generate_refuses_while_one_is_in_flight() {
        let session = session();
        session.generating.store(true, Ordering::Release);
        assert!(matches!(
            session.generate("wb", "2024-01-01T08:00", 2).await,
            Err(SessionError::Busy)
        ));
    }

    #[tokio::test]
    async fn cancelled_generate_releases_the_busy_guard() {
        // a server that accepts the connection but never answers
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let address = listener.local_addr().unwrap();
        let server = tokio::spawn(async move {
            let (_stream, _) = listener.accept().await.unwrap();
            std::future::pending::<()>().await;
        });

        let session =
            TimetableSession::new(FahrplanClient::new(format!("http://{}", address)), Vienna);

        // the caller times out and drops the in-flight generate future
        let result = tokio::time::timeout(
            std::time::Duration::from_millis(200),
            session.generate("wb", "2024-01-01T08:00", 2),
        )
        .await;
        assert!(result.is_err(), "generate should still be hanging");

        server.abort();

        // the session must accept the next attempt; with the server gone
        // it fails in transport, never with Busy
        assert!(!session.generating.load(Ordering::Acquire));
        assert!(matches!(
            session.generate("wb", "2024-01-01T08:00", 2).await,
            Err(SessionError::Client(_))
        ));
    }

    #[tokio::test]
    async fn form_and_save_need_a_loaded_timetable() {
        let session = session();
        assert!(matches!(session.rows(), Err(SessionError::NothingLoaded)));
        assert!(matches!(
            session.save(vec![]).await,
            Err(SessionError::NothingLoaded)
        ));
        assert!(matches!(
            session.download_pdf().await,
            Err(SessionError::NothingLoaded)
        ));
    }

    #[test]
    fn default_start_is_a_local_datetime_string() {
        let value = session().default_start();
        // "YYYY-MM-DDTHH:MM"
        assert_eq!(value.len(), 16);
        assert_eq!(value.as_bytes()[10], b'T');
    }
}
