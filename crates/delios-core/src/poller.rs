// ── Metrics poller ──
//
// Issues the daily and annual fetches, maps payloads into readings, and
// merges them into the shared store. Each refresh returns an explicit
// result; the caller decides how to log it. A failed refresh never
// touches the store, so consumers keep seeing the last good values.

use std::sync::Arc;

use chrono::{Local, NaiveDate};
use delios_api::{AnnualLogRequest, DeliosClient};
use tracing::{debug, info};

use crate::config::PollerConfig;
use crate::convert::{annual_readings, daily_readings};
use crate::error::{FetchError, SetupError};
use crate::reading::Cycle;
use crate::session::SessionManager;
use crate::store::ReadingStore;

/// Results of a combined daily-then-annual refresh.
#[derive(Debug)]
pub struct RefreshOutcome {
    pub daily: Result<(), FetchError>,
    pub annual: Result<(), FetchError>,
}

impl RefreshOutcome {
    pub fn is_ok(&self) -> bool {
        self.daily.is_ok() && self.annual.is_ok()
    }

    /// Failures paired with the cycle that produced them.
    pub fn failures(&self) -> impl Iterator<Item = (Cycle, &FetchError)> {
        [(Cycle::Daily, &self.daily), (Cycle::Annual, &self.annual)]
            .into_iter()
            .filter_map(|(cycle, result)| result.as_ref().err().map(|e| (cycle, e)))
    }
}

/// Polls one plant and keeps its readings current.
///
/// Safe to share across tasks via `Arc`: the token and the store carry
/// their own locks.
pub struct Poller {
    client: Arc<DeliosClient>,
    session: SessionManager,
    store: Arc<ReadingStore>,
    annual_start: NaiveDate,
}

impl Poller {
    /// Build the client and session from configuration.
    ///
    /// Does NOT contact the portal; the first refresh logs in lazily.
    pub fn new(config: PollerConfig) -> Result<Self, SetupError> {
        Self::with_store(config, Arc::new(ReadingStore::new()))
    }

    /// Like [`new`](Self::new), writing into an existing store.
    pub fn with_store(config: PollerConfig, store: Arc<ReadingStore>) -> Result<Self, SetupError> {
        config.validate()?;

        let client = DeliosClient::new(config.endpoints, config.timeouts, &config.transport)
            .map_err(SetupError::Client)?;
        let client = Arc::new(client);
        let session = SessionManager::new(Arc::clone(&client), config.credentials);

        Ok(Self {
            client,
            session,
            store,
            annual_start: config.annual_start,
        })
    }

    pub fn store(&self) -> &Arc<ReadingStore> {
        &self.store
    }

    pub fn session(&self) -> &SessionManager {
        &self.session
    }

    // ── Refresh operations ───────────────────────────────────────────

    /// Run one cycle by name.
    pub async fn refresh(&self, cycle: Cycle) -> Result<(), FetchError> {
        match cycle {
            Cycle::Daily => self.refresh_daily().await,
            Cycle::Annual => self.refresh_annual().await,
        }
    }

    /// Fetch instantaneous power and day-to-date energy.
    pub async fn refresh_daily(&self) -> Result<(), FetchError> {
        self.session.ensure_session().await;

        let plant_id = self.session.credentials().plant_id();
        let log = self
            .client
            .daily_log(plant_id)
            .await
            .map_err(|e| self.fetch_failed(Cycle::Daily, e))?;

        let readings = daily_readings(&log);
        debug!(?readings, "daily payload mapped");
        info!(count = readings.len(), "daily readings updated");
        self.store.apply(Cycle::Daily, readings);
        Ok(())
    }

    /// Fetch year-to-date aggregates from the most recent yearly record.
    ///
    /// A response without yearly records leaves the store untouched and
    /// counts as success.
    pub async fn refresh_annual(&self) -> Result<(), FetchError> {
        self.session.ensure_session().await;

        let request = AnnualLogRequest::new(
            self.session.credentials().plant_number(),
            self.annual_start,
            Local::now().date_naive(),
        );
        let log = self
            .client
            .annual_log(&request)
            .await
            .map_err(|e| self.fetch_failed(Cycle::Annual, e))?;

        match annual_readings(&log)? {
            Some(readings) => {
                debug!(?readings, "annual payload mapped");
                info!(count = readings.len(), "annual readings updated");
                self.store.apply(Cycle::Annual, readings);
            }
            None => debug!("annual log contained no yearly records"),
        }
        Ok(())
    }

    /// Daily then annual, sequentially. The annual cycle runs even if the
    /// daily one failed.
    pub async fn refresh_all(&self) -> RefreshOutcome {
        let daily = self.refresh_daily().await;
        let annual = self.refresh_annual().await;
        RefreshOutcome { daily, annual }
    }

    /// Translate a client error; a rejected token is dropped so the next
    /// tick logs in again.
    fn fetch_failed(&self, cycle: Cycle, err: delios_api::Error) -> FetchError {
        if err.is_auth_expired() {
            self.session.invalidate();
        }
        FetchError::from_api(cycle, err)
    }
}
