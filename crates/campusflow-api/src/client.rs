// Hand-crafted async HTTP client for the CampusFlow backend REST API.
//
// Base path: / (endpoints live under /api/, health at /health)
// Auth: optional bearer token

use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue};
use secrecy::ExposeSecret;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};
use url::Url;

use crate::Error;
use crate::types;

// ── Error response shape from the backend ───────────────────────────

#[derive(serde::Deserialize)]
struct ErrorResponse {
    #[serde(default)]
    detail: Option<String>,
}

// ── Client ──────────────────────────────────────────────────────────

/// Async client for the CampusFlow backend.
///
/// One method per endpoint; JSON request/response bodies; errors carry
/// the backend's `detail` string when available. The client performs
/// **no retries** — callers own their own refresh/backoff policy.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: Url,
}

impl ApiClient {
    // ── Constructors ────────────────────────────────────────────────

    /// Build an unauthenticated client against `base_url`.
    pub fn new(base_url: &str) -> Result<Self, Error> {
        Self::build(base_url, None)
    }

    /// Build a client that sends `Authorization: Bearer <token>` on
    /// every request.
    pub fn with_token(base_url: &str, token: &secrecy::SecretString) -> Result<Self, Error> {
        Self::build(base_url, Some(token))
    }

    /// Wrap an existing `reqwest::Client` (caller manages headers).
    pub fn from_reqwest(base_url: &str, http: reqwest::Client) -> Result<Self, Error> {
        Ok(Self {
            http,
            base_url: normalize_base_url(base_url)?,
        })
    }

    fn build(base_url: &str, token: Option<&secrecy::SecretString>) -> Result<Self, Error> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        if let Some(token) = token {
            let mut value = HeaderValue::from_str(&format!("Bearer {}", token.expose_secret()))
                .map_err(|e| Error::InvalidToken(e.to_string()))?;
            value.set_sensitive(true);
            headers.insert(reqwest::header::AUTHORIZATION, value);
        }

        let http = reqwest::Client::builder().default_headers(headers).build()?;

        Ok(Self {
            http,
            base_url: normalize_base_url(base_url)?,
        })
    }

    /// Base URL this client talks to.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    // ── URL builders ────────────────────────────────────────────────

    /// Join fixed path segments onto the base URL. Each segment is
    /// percent-encoded, so caller-supplied identifiers are URL-safe.
    fn url(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    // ── HTTP verbs ──────────────────────────────────────────────────

    async fn get<T: DeserializeOwned>(&self, segments: &[&str]) -> Result<T, Error> {
        self.get_with_params(segments, &[]).await
    }

    async fn get_with_params<T: DeserializeOwned>(
        &self,
        segments: &[&str],
        params: &[(&str, String)],
    ) -> Result<T, Error> {
        let url = self.url(segments);
        debug!("GET {url} params={params:?}");

        let resp = self
            .http
            .get(url.clone())
            .query(params)
            .send()
            .await
            .map_err(|e| self.log_failure(&url, e.into()))?;
        self.handle_response(&url, resp).await
    }

    async fn put_with_params<T: DeserializeOwned>(
        &self,
        segments: &[&str],
        params: &[(&str, String)],
    ) -> Result<T, Error> {
        let url = self.url(segments);
        debug!("PUT {url} params={params:?}");

        let resp = self
            .http
            .put(url.clone())
            .query(params)
            .send()
            .await
            .map_err(|e| self.log_failure(&url, e.into()))?;
        self.handle_response(&url, resp).await
    }

    async fn post<T: DeserializeOwned, B: Serialize + Sync>(
        &self,
        segments: &[&str],
        body: &B,
    ) -> Result<T, Error> {
        let url = self.url(segments);
        debug!("POST {url}");

        let resp = self
            .http
            .post(url.clone())
            .json(body)
            .send()
            .await
            .map_err(|e| self.log_failure(&url, e.into()))?;
        self.handle_response(&url, resp).await
    }

    // ── Response handling ───────────────────────────────────────────

    async fn handle_response<T: DeserializeOwned>(
        &self,
        url: &Url,
        resp: reqwest::Response,
    ) -> Result<T, Error> {
        let status = resp.status();
        if status.is_success() {
            let body = resp
                .text()
                .await
                .map_err(|e| self.log_failure(url, e.into()))?;
            serde_json::from_str(&body).map_err(|e| {
                // Truncate for the log; fall back to the whole body if
                // 200 lands mid-character.
                let preview = body.get(..200).unwrap_or(&body);
                self.log_failure(
                    url,
                    Error::Deserialization {
                        message: format!("{e} (body preview: {preview:?})"),
                        body,
                    },
                )
            })
        } else {
            let raw = resp.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorResponse>(&raw)
                .ok()
                .and_then(|e| e.detail)
                .unwrap_or_else(|| format!("HTTP {}", status.as_u16()));
            Err(self.log_failure(
                url,
                Error::Api {
                    status: status.as_u16(),
                    message,
                },
            ))
        }
    }

    /// Log a failure with the endpoint path before handing it back.
    fn log_failure(&self, url: &Url, err: Error) -> Error {
        warn!(endpoint = url.path(), error = %err, "request failed");
        err
    }

    // ━━ Public API ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

    // ── Profiles ────────────────────────────────────────────────────

    pub async fn list_profiles(
        &self,
        limit: u32,
        offset: u32,
    ) -> Result<Vec<types::Profile>, Error> {
        self.get_with_params(
            &["api", "profiles"],
            &[("limit", limit.to_string()), ("offset", offset.to_string())],
        )
        .await
    }

    pub async fn get_profile(&self, entity_id: &str) -> Result<types::Profile, Error> {
        self.get(&["api", "profiles", entity_id]).await
    }

    pub async fn search_profiles(
        &self,
        query: &str,
        field: &str,
    ) -> Result<Vec<types::Profile>, Error> {
        self.get_with_params(
            &["api", "profiles", "search", query],
            &[("field", field.to_owned())],
        )
        .await
    }

    // ── Activity sources ────────────────────────────────────────────

    pub async fn list_swipes(
        &self,
        limit: u32,
        entity_id: Option<&str>,
    ) -> Result<Vec<types::Swipe>, Error> {
        let mut params = vec![("limit", limit.to_string())];
        if let Some(id) = entity_id {
            params.push(("entity_id", id.to_owned()));
        }
        self.get_with_params(&["api", "swipes"], &params).await
    }

    pub async fn list_wifi_logs(
        &self,
        limit: u32,
        entity_id: Option<&str>,
    ) -> Result<Vec<types::WifiLog>, Error> {
        let mut params = vec![("limit", limit.to_string())];
        if let Some(id) = entity_id {
            params.push(("entity_id", id.to_owned()));
        }
        self.get_with_params(&["api", "wifi_logs"], &params).await
    }

    pub async fn list_lab_bookings(
        &self,
        entity_id: Option<&str>,
        upcoming: bool,
    ) -> Result<Vec<types::LabBooking>, Error> {
        let mut params = Vec::new();
        if let Some(id) = entity_id {
            params.push(("entity_id", id.to_owned()));
        }
        if upcoming {
            params.push(("upcoming", "true".to_owned()));
        }
        self.get_with_params(&["api", "lab_bookings"], &params).await
    }

    pub async fn list_library_checkouts(
        &self,
        entity_id: Option<&str>,
    ) -> Result<Vec<types::LibraryCheckout>, Error> {
        let mut params = Vec::new();
        if let Some(id) = entity_id {
            params.push(("entity_id", id.to_owned()));
        }
        self.get_with_params(&["api", "library_checkouts"], &params)
            .await
    }

    pub async fn list_notes(
        &self,
        entity_id: Option<&str>,
        source: Option<&str>,
    ) -> Result<Vec<types::Note>, Error> {
        let mut params = Vec::new();
        if let Some(id) = entity_id {
            params.push(("entity_id", id.to_owned()));
        }
        if let Some(source) = source {
            params.push(("source", source.to_owned()));
        }
        self.get_with_params(&["api", "notes"], &params).await
    }

    pub async fn list_cctv_frames(
        &self,
        location_id: Option<&str>,
        limit: u32,
    ) -> Result<Vec<types::CctvFrame>, Error> {
        let mut params = vec![("limit", limit.to_string())];
        if let Some(id) = location_id {
            params.push(("location_id", id.to_owned()));
        }
        self.get_with_params(&["api", "cctv_frame"], &params).await
    }

    // ── Entity resolution ───────────────────────────────────────────

    /// Resolve an entity by any combination of identifiers. At least
    /// one selector must be supplied — that precondition is enforced
    /// upstream (the core layer never issues a call without one).
    pub async fn resolve(
        &self,
        card_id: Option<&str>,
        device_hash: Option<&str>,
        face_id: Option<&str>,
    ) -> Result<types::EntityResolution, Error> {
        let mut params = Vec::new();
        if let Some(v) = card_id {
            params.push(("card_id", v.to_owned()));
        }
        if let Some(v) = device_hash {
            params.push(("device_hash", v.to_owned()));
        }
        if let Some(v) = face_id {
            params.push(("face_id", v.to_owned()));
        }
        self.get_with_params(&["api", "resolve"], &params).await
    }

    pub async fn entity_timeline(
        &self,
        entity_id: &str,
        days: u32,
    ) -> Result<types::ActivityTimeline, Error> {
        self.get_with_params(
            &["api", "entity", entity_id, "timeline"],
            &[("days", days.to_string())],
        )
        .await
    }

    // ── Entities ────────────────────────────────────────────────────

    pub async fn list_entities(
        &self,
        limit: u32,
        offset: u32,
    ) -> Result<types::EntitiesResponse, Error> {
        self.get_with_params(
            &["api", "entities"],
            &[("limit", limit.to_string()), ("offset", offset.to_string())],
        )
        .await
    }

    pub async fn get_entity(&self, entity_id: &str) -> Result<types::EntityDetails, Error> {
        self.get(&["api", "entities", entity_id]).await
    }

    pub async fn entities_with_timeline(&self) -> Result<serde_json::Value, Error> {
        self.get(&["api", "entities-with-timeline"]).await
    }

    // ── Dashboard & analytics ───────────────────────────────────────

    pub async fn dashboard_stats(&self) -> Result<types::DashboardStats, Error> {
        self.get(&["api", "dashboard", "stats"]).await
    }

    pub async fn activity_heatmap(&self, days: u32) -> Result<serde_json::Value, Error> {
        self.get_with_params(
            &["api", "analytics", "activity-heatmap"],
            &[("days", days.to_string())],
        )
        .await
    }

    pub async fn weekly_activity(&self) -> Result<serde_json::Value, Error> {
        self.get(&["api", "analytics", "weekly-activity"]).await
    }

    pub async fn source_distribution(&self) -> Result<serde_json::Value, Error> {
        self.get(&["api", "analytics", "source-distribution"]).await
    }

    // ── Security ────────────────────────────────────────────────────

    pub async fn security_stats(&self) -> Result<types::SecurityStats, Error> {
        self.get(&["api", "security", "stats"]).await
    }

    pub async fn inactive_entities(&self) -> Result<serde_json::Value, Error> {
        self.get(&["api", "security", "inactive-entities"]).await
    }

    pub async fn entity_history(&self, entity_id: &str) -> Result<serde_json::Value, Error> {
        self.get_with_params(
            &["api", "security", "entity-history"],
            &[("entity_id", entity_id.to_owned())],
        )
        .await
    }

    // ── Alerts ──────────────────────────────────────────────────────

    pub async fn list_alerts(
        &self,
        status: Option<&str>,
        limit: Option<u32>,
    ) -> Result<types::AlertsResponse, Error> {
        let mut params = Vec::new();
        if let Some(status) = status {
            params.push(("status", status.to_owned()));
        }
        if let Some(limit) = limit {
            params.push(("limit", limit.to_string()));
        }
        self.get_with_params(&["api", "alerts"], &params).await
    }

    pub async fn update_alert_status(
        &self,
        alert_id: &str,
        status: &str,
    ) -> Result<types::WireAlert, Error> {
        self.put_with_params(
            &["api", "alerts", alert_id],
            &[("status", status.to_owned())],
        )
        .await
    }

    // ── SpaceFlow ───────────────────────────────────────────────────

    pub async fn spaceflow_forecast(
        &self,
        request: &types::ForecastRequest,
    ) -> Result<Vec<types::Forecast>, Error> {
        self.post(&["api", "spaceflow", "forecast"], request).await
    }

    // ── Health ──────────────────────────────────────────────────────

    pub async fn health(&self) -> Result<types::HealthStatus, Error> {
        self.get(&["health"]).await
    }
}

/// Parse and canonicalize the base URL (strip a trailing slash so
/// segment joining is uniform).
fn normalize_base_url(raw: &str) -> Result<Url, Error> {
    let url = Url::parse(raw)?;
    if url.cannot_be_a_base() {
        return Err(Error::Url(url::ParseError::RelativeUrlWithoutBase));
    }
    Ok(url)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn url_joins_segments() {
        let client = ApiClient::new("http://localhost:8000").unwrap();
        let url = client.url(&["api", "profiles", "E100234"]);
        assert_eq!(url.as_str(), "http://localhost:8000/api/profiles/E100234");
    }

    #[test]
    fn url_percent_encodes_segments() {
        let client = ApiClient::new("http://localhost:8000").unwrap();
        let url = client.url(&["api", "profiles", "search", "Anita Rao"]);
        assert_eq!(
            url.as_str(),
            "http://localhost:8000/api/profiles/search/Anita%20Rao"
        );
    }

    #[test]
    fn base_url_with_trailing_slash() {
        let client = ApiClient::new("http://localhost:8000/").unwrap();
        let url = client.url(&["health"]);
        assert_eq!(url.as_str(), "http://localhost:8000/health");
    }

    #[test]
    fn rejects_unparseable_base_url() {
        assert!(ApiClient::new("not a url").is_err());
    }
}
