// Portal HTTP client
//
// Wraps `reqwest::Client` with endpoint resolution, per-call timeouts,
// bearer-token injection, and status/body decoding. Login lives in
// `auth.rs` as an inherent impl to keep this module focused on transport
// mechanics.

use std::sync::{PoisonError, RwLock};
use std::time::Duration;

use reqwest::header::{AUTHORIZATION, HeaderValue};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, trace};
use url::Url;

use crate::error::Error;
use crate::models::{AnnualLog, AnnualLogRequest, DailyLog, DailyLogRequest};
use crate::transport::{Endpoints, Timeouts, TransportConfig};

/// Async client for a single portal account.
///
/// The bearer token is shared mutable state: it is written by login and
/// read by every fetch, possibly from different tasks, so it sits behind
/// a lock and is cloned out per request.
pub struct DeliosClient {
    http: reqwest::Client,
    endpoints: Endpoints,
    timeouts: Timeouts,
    bearer: RwLock<Option<HeaderValue>>,
}

impl DeliosClient {
    /// Create a client from endpoint, timeout, and transport settings.
    pub fn new(
        endpoints: Endpoints,
        timeouts: Timeouts,
        transport: &TransportConfig,
    ) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Ok(Self::with_client(http, endpoints, timeouts))
    }

    /// Create a client with a pre-built `reqwest::Client`.
    ///
    /// The caller is responsible for any default headers on `http`.
    pub fn with_client(http: reqwest::Client, endpoints: Endpoints, timeouts: Timeouts) -> Self {
        Self {
            http,
            endpoints,
            timeouts,
            bearer: RwLock::new(None),
        }
    }

    pub fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }

    pub fn timeouts(&self) -> &Timeouts {
        &self.timeouts
    }

    pub(crate) fn http(&self) -> &reqwest::Client {
        &self.http
    }

    // ── Bearer token ─────────────────────────────────────────────────

    /// Whether a token from a successful login is currently held.
    pub fn has_token(&self) -> bool {
        self.bearer
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    /// Drop the held token; the next fetch cycle will log in again.
    pub fn clear_token(&self) {
        let mut guard = self.bearer.write().unwrap_or_else(PoisonError::into_inner);
        if guard.take().is_some() {
            debug!("bearer token cleared");
        }
    }

    pub(crate) fn set_token(&self, token: &str) -> Result<(), Error> {
        let mut value = HeaderValue::from_str(&format!("Bearer {token}"))?;
        value.set_sensitive(true);
        *self.bearer.write().unwrap_or_else(PoisonError::into_inner) = Some(value);
        trace!("bearer token stored");
        Ok(())
    }

    fn apply_bearer(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        let guard = self.bearer.read().unwrap_or_else(PoisonError::into_inner);
        match guard.as_ref() {
            Some(value) => builder.header(AUTHORIZATION, value.clone()),
            None => builder,
        }
    }

    // ── Endpoints ────────────────────────────────────────────────────

    /// Fetch instantaneous power and day-to-date energy for `plant_id`.
    pub async fn daily_log(&self, plant_id: &str) -> Result<DailyLog, Error> {
        let url = self.endpoints.daily_log_url()?;
        let body = DailyLogRequest {
            plant_id,
            machine_id: "",
        };
        self.post(url, &body, self.timeouts.daily).await
    }

    /// Fetch the yearly aggregate series.
    pub async fn annual_log(&self, request: &AnnualLogRequest) -> Result<AnnualLog, Error> {
        let url = self.endpoints.annual_log_url()?;
        self.post(url, request, self.timeouts.annual).await
    }

    // ── Request helpers ──────────────────────────────────────────────

    /// Send an authenticated JSON POST and decode the response body.
    pub(crate) async fn post<T: DeserializeOwned>(
        &self,
        url: Url,
        body: &(impl Serialize + Sync),
        timeout: Duration,
    ) -> Result<T, Error> {
        debug!("POST {}", url);

        let builder = self.apply_bearer(self.http.post(url).json(body).timeout(timeout));
        let resp = builder
            .send()
            .await
            .map_err(|e| map_send_error(e, timeout))?;

        parse_response(resp, timeout).await
    }
}

/// Translate a reqwest failure, surfacing timeouts as their own variant.
pub(crate) fn map_send_error(err: reqwest::Error, timeout: Duration) -> Error {
    if err.is_timeout() {
        Error::Timeout {
            timeout_secs: timeout.as_secs(),
        }
    } else {
        Error::Transport(err)
    }
}

/// Check the status and decode the JSON body.
pub(crate) async fn parse_response<T: DeserializeOwned>(
    resp: reqwest::Response,
    timeout: Duration,
) -> Result<T, Error> {
    let status = resp.status();

    if status == reqwest::StatusCode::UNAUTHORIZED {
        return Err(Error::Authentication {
            message: "token expired or invalid credentials".into(),
        });
    }

    let body = resp
        .text()
        .await
        .map_err(|e| map_send_error(e, timeout))?;

    if !status.is_success() {
        return Err(Error::Api {
            status: status.as_u16(),
            message: preview(&body).to_owned(),
        });
    }

    serde_json::from_str(&body).map_err(|e| Error::Deserialization {
        message: format!("{e} (body preview: {:?})", preview(&body)),
        body,
    })
}

fn preview(body: &str) -> &str {
    match body.char_indices().nth(200) {
        Some((idx, _)) => &body[..idx],
        None => body,
    }
}
