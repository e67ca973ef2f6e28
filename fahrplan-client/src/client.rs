use chrono::{DateTime, Utc};
use fahrplan_core::{Route, Timetable, TimetableEntry};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("{action} failed")]
    Failed {
        action: &'static str,
        status: reqwest::StatusCode,
    },
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
}

/// Typed client for the Fahrplan API. One instance per backend; all
/// methods are independent requests.
pub struct FahrplanClient {
    http: reqwest::Client,
    base_url: String,
}

#[derive(Deserialize)]
struct RoutesResponse {
    routes: Vec<Route>,
}

#[derive(Serialize)]
struct GenerateTimetableRequest<'a> {
    route_id: &'a str,
    start_time: DateTime<Utc>,
    dwell_minutes: u32,
}

#[derive(Serialize)]
struct SaveTimetableRequest<'a> {
    entries: &'a [TimetableEntry],
}

impl FahrplanClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub async fn list_routes(&self) -> Result<Vec<Route>, ClientError> {
        let resp = self.http.get(self.url("/api/routes")).send().await?;
        let resp = check("Loading routes", resp).await?;
        Ok(resp.json::<RoutesResponse>().await?.routes)
    }

    pub async fn create_route(&self, route: &Route) -> Result<Route, ClientError> {
        let resp = self
            .http
            .post(self.url("/api/routes"))
            .json(route)
            .send()
            .await?;
        let resp = check("Creating route", resp).await?;
        Ok(resp.json().await?)
    }

    pub async fn generate_timetable(
        &self,
        route_id: &str,
        start_time: DateTime<Utc>,
        dwell_minutes: u32,
    ) -> Result<Timetable, ClientError> {
        let resp = self
            .http
            .post(self.url("/api/timetables"))
            .json(&GenerateTimetableRequest {
                route_id,
                start_time,
                dwell_minutes,
            })
            .send()
            .await?;
        let resp = check("Generation", resp).await?;
        Ok(resp.json().await?)
    }

    pub async fn fetch_timetable(&self, timetable_id: &str) -> Result<Timetable, ClientError> {
        let resp = self
            .http
            .get(self.url(&format!("/api/timetables/{}", timetable_id)))
            .send()
            .await?;
        let resp = check("Loading timetable", resp).await?;
        Ok(resp.json().await?)
    }

    pub async fn save_timetable(
        &self,
        timetable_id: &str,
        entries: &[TimetableEntry],
    ) -> Result<Timetable, ClientError> {
        let resp = self
            .http
            .put(self.url(&format!("/api/timetables/{}", timetable_id)))
            .json(&SaveTimetableRequest { entries })
            .send()
            .await?;
        let resp = check("Save", resp).await?;
        Ok(resp.json().await?)
    }

    pub async fn download_pdf(&self, timetable_id: &str) -> Result<Vec<u8>, ClientError> {
        let resp = self
            .http
            .get(self.url(&format!("/api/timetables/{}/pdf", timetable_id)))
            .send()
            .await?;
        let resp = check("PDF download", resp).await?;
        Ok(resp.bytes().await?.to_vec())
    }
}

/// Map non-success responses to a per-action error. The response detail is
/// logged for diagnostics, never surfaced verbatim.
async fn check(
    action: &'static str,
    resp: reqwest::Response,
) -> Result<reqwest::Response, ClientError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }

    let detail = resp.text().await.unwrap_or_default();
    tracing::error!("{} failed with {}: {}", action, status, detail);
    Err(ClientError::Failed { action, status })
}
