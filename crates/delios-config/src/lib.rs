//! Host-side configuration for the Delios poller.
//!
//! A TOML file layered under `DELIOS_`-prefixed environment variables,
//! translated into `delios_core::PollerConfig`. The binary is the only
//! consumer; nothing in `delios-core` reads files or the environment.

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::NaiveDate;
use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::SecretString;
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

use delios_core::{
    Credentials, Endpoints, PollerConfig, SetupError, Timeouts,
    config::DEFAULT_ANNUAL_START,
};

/// Prefix for environment overrides; nested keys use `__`.
pub const ENV_PREFIX: &str = "DELIOS_";

/// Keys whose environment values are taken verbatim.
///
/// figment parses env values as TOML scalars, which would turn a password
/// of `007` into `7`. These are read straight from the environment instead.
const VERBATIM_KEYS: &[&str] = &["username", "password", "plant_id"];

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error(transparent)]
    Setup(#[from] SetupError),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level configuration file.
#[derive(Deserialize, Serialize)]
pub struct Config {
    /// Portal account e-mail.
    #[serde(
        default,
        deserialize_with = "lenient_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub username: Option<String>,

    /// Portal password (plaintext; prefer `DELIOS_PASSWORD`).
    #[serde(
        default,
        deserialize_with = "lenient_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub password: Option<String>,

    /// Plant identifier as shown in the portal.
    #[serde(
        default,
        deserialize_with = "lenient_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub plant_id: Option<String>,

    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// First day of the yearly series, `YYYY-MM-DD`.
    #[serde(default = "default_annual_start")]
    pub annual_start_date: NaiveDate,

    #[serde(default)]
    pub endpoints: EndpointPaths,

    #[serde(default)]
    pub timeouts: TimeoutSecs,

    #[serde(default)]
    pub intervals: IntervalSecs,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            username: None,
            password: None,
            plant_id: None,
            base_url: default_base_url(),
            annual_start_date: default_annual_start(),
            endpoints: EndpointPaths::default(),
            timeouts: TimeoutSecs::default(),
            intervals: IntervalSecs::default(),
        }
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "[REDACTED]"))
            .field("plant_id", &self.plant_id)
            .field("base_url", &self.base_url)
            .field("annual_start_date", &self.annual_start_date)
            .field("endpoints", &self.endpoints)
            .field("timeouts", &self.timeouts)
            .field("intervals", &self.intervals)
            .finish()
    }
}

/// Endpoint paths, joined onto `base_url`.
#[derive(Debug, Deserialize, Serialize)]
pub struct EndpointPaths {
    #[serde(default = "default_login_path")]
    pub login: String,
    #[serde(default = "default_daily_path")]
    pub daily: String,
    #[serde(default = "default_annual_path")]
    pub annual: String,
}

impl Default for EndpointPaths {
    fn default() -> Self {
        Self {
            login: default_login_path(),
            daily: default_daily_path(),
            annual: default_annual_path(),
        }
    }
}

/// Per-call timeouts, in seconds.
#[derive(Debug, Deserialize, Serialize)]
pub struct TimeoutSecs {
    #[serde(default = "default_login_timeout")]
    pub login: u64,
    #[serde(default = "default_daily_timeout")]
    pub daily: u64,
    #[serde(default = "default_annual_timeout")]
    pub annual: u64,
}

impl Default for TimeoutSecs {
    fn default() -> Self {
        Self {
            login: default_login_timeout(),
            daily: default_daily_timeout(),
            annual: default_annual_timeout(),
        }
    }
}

/// Refresh cadence per cycle, in seconds.
#[derive(Debug, Deserialize, Serialize)]
pub struct IntervalSecs {
    #[serde(default = "default_daily_interval")]
    pub daily: u64,
    #[serde(default = "default_annual_interval")]
    pub annual: u64,
}

impl Default for IntervalSecs {
    fn default() -> Self {
        Self {
            daily: default_daily_interval(),
            annual: default_annual_interval(),
        }
    }
}

fn default_base_url() -> String {
    delios_core::DEFAULT_BASE_URL.into()
}
fn default_login_path() -> String {
    Endpoints::DEFAULT_LOGIN_PATH.into()
}
fn default_daily_path() -> String {
    Endpoints::DEFAULT_DAILY_LOG_PATH.into()
}
fn default_annual_path() -> String {
    Endpoints::DEFAULT_ANNUAL_LOG_PATH.into()
}
fn default_login_timeout() -> u64 {
    Timeouts::default().login.as_secs()
}
fn default_daily_timeout() -> u64 {
    Timeouts::default().daily.as_secs()
}
fn default_annual_timeout() -> u64 {
    Timeouts::default().annual.as_secs()
}
fn default_daily_interval() -> u64 {
    60
}
fn default_annual_interval() -> u64 {
    24 * 60 * 60
}
fn default_annual_start() -> NaiveDate {
    let (y, m, d) = DEFAULT_ANNUAL_START;
    NaiveDate::from_ymd_opt(y, m, d).unwrap_or_default()
}

/// Accept a string or a bare scalar, so `plant_id = 4211` in the TOML file
/// works as well as `plant_id = "4211"`.
fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Scalar {
        Text(String),
        Signed(i64),
        Unsigned(u64),
        Float(f64),
        Bool(bool),
    }

    let value = Option::<Scalar>::deserialize(deserializer)?;
    Ok(value.map(|v| match v {
        Scalar::Text(s) => s,
        Scalar::Signed(n) => n.to_string(),
        Scalar::Unsigned(n) => n.to_string(),
        Scalar::Float(n) => n.to_string(),
        Scalar::Bool(b) => b.to_string(),
    }))
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("com", "delios", "delios").map_or_else(
        || PathBuf::from(".").join("delios.toml"),
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

// ── Config loading ──────────────────────────────────────────────────

/// The provider chain: defaults, then the TOML file, then environment.
///
/// The credential keys are left out of the env layer; see [`VERBATIM_KEYS`].
pub fn figment(path: &Path) -> Figment {
    Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(
            Env::prefixed(ENV_PREFIX)
                .ignore(VERBATIM_KEYS)
                .split("__"),
        )
}

/// Load configuration from `path` (or the platform default) plus environment.
///
/// A missing file is not an error; every key can come from the environment.
pub fn load_config(path: Option<&Path>) -> Result<Config, ConfigError> {
    let path = path.map_or_else(config_path, Path::to_path_buf);
    let mut config: Config = figment(&path).extract()?;
    apply_verbatim_env(&mut config);
    Ok(config)
}

/// Overlay `DELIOS_USERNAME`, `DELIOS_PASSWORD` and `DELIOS_PLANT_ID` as
/// raw strings.
fn apply_verbatim_env(config: &mut Config) {
    for key in VERBATIM_KEYS {
        let var = format!("{ENV_PREFIX}{}", key.to_ascii_uppercase());
        let Ok(value) = std::env::var(&var) else {
            continue;
        };
        let slot = match *key {
            "username" => &mut config.username,
            "password" => &mut config.password,
            _ => &mut config.plant_id,
        };
        *slot = Some(value);
    }
}

// ── Translation ─────────────────────────────────────────────────────

impl Config {
    /// Validate and build the core's runtime configuration.
    pub fn to_poller_config(&self) -> Result<PollerConfig, ConfigError> {
        let credentials = Credentials::new(
            self.username.clone().unwrap_or_default(),
            SecretString::from(self.password.clone().unwrap_or_default()),
            self.plant_id.clone().unwrap_or_default(),
        )?;

        let base_url: url::Url = self
            .base_url
            .parse()
            .map_err(|e| ConfigError::Validation {
                field: "base_url".into(),
                reason: format!("invalid URL '{}': {e}", self.base_url),
            })?;

        let endpoints = Endpoints {
            base_url,
            login_path: self.endpoints.login.clone(),
            daily_log_path: self.endpoints.daily.clone(),
            annual_log_path: self.endpoints.annual.clone(),
        };
        let timeouts = Timeouts {
            login: Duration::from_secs(self.timeouts.login),
            daily: Duration::from_secs(self.timeouts.daily),
            annual: Duration::from_secs(self.timeouts.annual),
        };

        let mut config = PollerConfig::new(credentials);
        config.endpoints = endpoints;
        config.timeouts = timeouts;
        config.daily_interval = Duration::from_secs(self.intervals.daily);
        config.annual_interval = Duration::from_secs(self.intervals.annual);
        config.annual_start = self.annual_start_date;
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use std::io::Write;

    use figment::Jail;
    use pretty_assertions::assert_eq;

    use super::*;

    fn write_toml(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    fn from_file(path: &Path) -> Config {
        Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(path))
            .extract()
            .unwrap()
    }

    #[test]
    fn defaults_match_core_defaults() {
        let cfg = Config::default();
        assert_eq!(cfg.timeouts.login, 15);
        assert_eq!(cfg.timeouts.daily, 20);
        assert_eq!(cfg.timeouts.annual, 30);
        assert_eq!(cfg.intervals.daily, 60);
        assert_eq!(cfg.intervals.annual, 86_400);
        assert_eq!(cfg.annual_start_date.to_string(), "2019-12-01");
        assert_eq!(cfg.endpoints.login, Endpoints::DEFAULT_LOGIN_PATH);
    }

    #[test]
    fn file_values_override_defaults() {
        let file = write_toml(
            r#"
            username = "ops@example.com"
            password = "hunter2"
            plant_id = 4211
            base_url = "https://portal.test"

            [timeouts]
            daily = 5

            [intervals]
            daily = 30
            "#,
        );

        let cfg = from_file(file.path());

        assert_eq!(cfg.username.as_deref(), Some("ops@example.com"));
        assert_eq!(cfg.plant_id.as_deref(), Some("4211"));
        assert_eq!(cfg.timeouts.daily, 5);
        assert_eq!(cfg.timeouts.login, 15);
        assert_eq!(cfg.intervals.daily, 30);
        assert_eq!(cfg.intervals.annual, 86_400);
    }

    #[test]
    fn translation_builds_poller_config() {
        let file = write_toml(
            r#"
            username = " ops@example.com "
            password = "hunter2"
            plant_id = "4211"
            base_url = "https://portal.test"
            annual_start_date = "2021-01-01"

            [endpoints]
            daily = "/v2/daily"
            "#,
        );

        let poller = from_file(file.path()).to_poller_config().unwrap();

        assert_eq!(poller.credentials.identity(), "ops@example.com");
        assert_eq!(poller.credentials.plant_number(), 4211);
        assert_eq!(
            poller.endpoints.daily_log_url().unwrap().as_str(),
            "https://portal.test/v2/daily"
        );
        assert_eq!(poller.timeouts, Timeouts::default());
        assert_eq!(poller.annual_start, NaiveDate::from_ymd_opt(2021, 1, 1).unwrap());
    }

    #[test]
    fn missing_password_is_setup_error() {
        let file = write_toml(
            r#"
            username = "ops@example.com"
            plant_id = "4211"
            "#,
        );

        let err = from_file(file.path()).to_poller_config().unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Setup(SetupError::Missing { field: "password" })
        ));
    }

    #[test]
    fn bad_base_url_is_validation_error() {
        let cfg = Config {
            username: Some("a".into()),
            password: Some("b".into()),
            plant_id: Some("1".into()),
            base_url: "not a url".into(),
            ..Config::default()
        };
        let err = cfg.to_poller_config().unwrap_err();
        assert!(matches!(err, ConfigError::Validation { ref field, .. } if field == "base_url"));
    }

    #[test]
    fn zero_interval_is_rejected() {
        let mut cfg = Config {
            username: Some("a".into()),
            password: Some("b".into()),
            plant_id: Some("1".into()),
            ..Config::default()
        };
        cfg.intervals.annual = 0;
        let err = cfg.to_poller_config().unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Setup(SetupError::Invalid { field: "intervals.annual", .. })
        ));
    }

    #[test]
    fn environment_overrides_file() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "delios.toml",
                r#"
                username = "file@example.com"
                plant_id = "1"
                "#,
            )?;
            jail.set_env("DELIOS_USERNAME", "env@example.com");
            jail.set_env("DELIOS_PASSWORD", "123456");
            jail.set_env("DELIOS_PLANT_ID", "4211");
            jail.set_env("DELIOS_TIMEOUTS__ANNUAL", "45");

            let cfg = load_config(Some(Path::new("delios.toml"))).map_err(|e| e.to_string())?;

            assert_eq!(cfg.username.as_deref(), Some("env@example.com"));
            assert_eq!(cfg.password.as_deref(), Some("123456"));
            assert_eq!(cfg.plant_id.as_deref(), Some("4211"));
            assert_eq!(cfg.timeouts.annual, 45);
            Ok(())
        });
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        Jail::expect_with(|_jail| {
            let cfg = load_config(Some(Path::new("absent.toml"))).map_err(|e| e.to_string())?;
            assert!(cfg.username.is_none());
            assert_eq!(cfg.base_url, delios_core::DEFAULT_BASE_URL);
            Ok(())
        });
    }

    #[test]
    fn credential_env_values_are_kept_verbatim() {
        Jail::expect_with(|jail| {
            jail.create_file("delios.toml", r#"password = "from-file""#)?;
            jail.set_env("DELIOS_PASSWORD", "007");
            jail.set_env("DELIOS_USERNAME", "1.50");
            jail.set_env("DELIOS_PLANT_ID", "0042");

            let cfg = load_config(Some(Path::new("delios.toml"))).map_err(|e| e.to_string())?;

            assert_eq!(cfg.password.as_deref(), Some("007"));
            assert_eq!(cfg.username.as_deref(), Some("1.50"));
            assert_eq!(cfg.plant_id.as_deref(), Some("0042"));
            Ok(())
        });
    }

    #[test]
    fn file_credentials_survive_without_env() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "delios.toml",
                r#"
                username = "file@example.com"
                password = "from-file"
                "#,
            )?;

            let cfg = load_config(Some(Path::new("delios.toml"))).map_err(|e| e.to_string())?;

            assert_eq!(cfg.username.as_deref(), Some("file@example.com"));
            assert_eq!(cfg.password.as_deref(), Some("from-file"));
            Ok(())
        });
    }

    #[test]
    fn debug_output_redacts_password() {
        let cfg = Config {
            password: Some("hunter2".into()),
            ..Config::default()
        };
        let rendered = format!("{cfg:?}");
        assert!(!rendered.contains("hunter2"));
        assert!(rendered.contains("[REDACTED]"));
    }
}
