// ── Runtime poller configuration ──
//
// These types describe *what* to poll and *how*. They carry credential
// data and timing, but never touch disk: the host (or `delios-config`)
// builds a `PollerConfig` and hands it in.

use std::time::Duration;

use chrono::NaiveDate;
use delios_api::{Endpoints, Timeouts, TransportConfig};
use secrecy::{ExposeSecret, SecretString};

use crate::error::SetupError;

/// First day of the yearly series the portal keeps.
pub const DEFAULT_ANNUAL_START: (i32, u32, u32) = (2019, 12, 1);

/// Portal account plus the plant it is polled for.
///
/// Validated once at construction and immutable afterwards.
#[derive(Debug, Clone)]
pub struct Credentials {
    identity: String,
    secret: SecretString,
    plant_id: String,
    plant_number: i64,
}

impl Credentials {
    /// Validate the three required settings.
    ///
    /// Each must be non-blank. The plant id travels as a string to the
    /// daily endpoint and as an integer to the annual one, so it must
    /// parse as an integer.
    pub fn new(
        identity: impl Into<String>,
        secret: SecretString,
        plant_id: impl Into<String>,
    ) -> Result<Self, SetupError> {
        let identity = identity.into().trim().to_owned();
        let plant_id = plant_id.into().trim().to_owned();

        if identity.is_empty() {
            return Err(SetupError::Missing { field: "username" });
        }
        if secret.expose_secret().is_empty() {
            return Err(SetupError::Missing { field: "password" });
        }
        if plant_id.is_empty() {
            return Err(SetupError::Missing { field: "plant_id" });
        }

        let plant_number = plant_id.parse().map_err(|_| SetupError::Invalid {
            field: "plant_id",
            reason: format!("expected an integer, got '{plant_id}'"),
        })?;

        Ok(Self {
            identity,
            secret,
            plant_id,
            plant_number,
        })
    }

    pub fn identity(&self) -> &str {
        &self.identity
    }

    pub fn secret(&self) -> &SecretString {
        &self.secret
    }

    pub fn plant_id(&self) -> &str {
        &self.plant_id
    }

    pub fn plant_number(&self) -> i64 {
        self.plant_number
    }
}

/// Configuration for polling a single plant.
#[derive(Debug, Clone)]
pub struct PollerConfig {
    pub credentials: Credentials,
    pub endpoints: Endpoints,
    pub timeouts: Timeouts,
    pub transport: TransportConfig,
    /// Cadence of the daily cycle.
    pub daily_interval: Duration,
    /// Cadence of the annual cycle.
    pub annual_interval: Duration,
    /// Start of the yearly series requested from the chart endpoint.
    pub annual_start: NaiveDate,
}

impl PollerConfig {
    /// Defaults for everything except the account.
    pub fn new(credentials: Credentials) -> Self {
        let (y, m, d) = DEFAULT_ANNUAL_START;
        Self {
            credentials,
            endpoints: Endpoints::default(),
            timeouts: Timeouts::default(),
            transport: TransportConfig::default(),
            daily_interval: Duration::from_secs(60),
            annual_interval: Duration::from_secs(24 * 60 * 60),
            annual_start: NaiveDate::from_ymd_opt(y, m, d).unwrap_or_default(),
        }
    }

    /// Reject settings that would panic or spin at runtime.
    pub fn validate(&self) -> Result<(), SetupError> {
        let positive = [
            ("intervals.daily", self.daily_interval),
            ("intervals.annual", self.annual_interval),
            ("timeouts.login", self.timeouts.login),
            ("timeouts.daily", self.timeouts.daily),
            ("timeouts.annual", self.timeouts.annual),
        ];
        for (field, value) in positive {
            if value.is_zero() {
                return Err(SetupError::Invalid {
                    field,
                    reason: "must be greater than zero".into(),
                });
            }
        }
        Ok(())
    }
}
