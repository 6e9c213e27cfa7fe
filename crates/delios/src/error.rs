//! Host error types with miette diagnostics.
//!
//! Setup problems (configuration, credentials) exit with `SETUP` and are
//! never retried. Everything else is a runtime failure.

use miette::Diagnostic;
use thiserror::Error;

use delios_config::ConfigError;
use delios_core::SetupError;

pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const SETUP: i32 = 2;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Setup ────────────────────────────────────────────────────────

    #[error("Could not load configuration from {path}")]
    #[diagnostic(
        code(delios::config),
        help("Check the TOML syntax and value types in {path}.")
    )]
    Config {
        path: String,
        #[source]
        source: ConfigError,
    },

    #[error("Poller setup failed")]
    #[diagnostic(
        code(delios::setup),
        help(
            "Set username, password and plant_id in {path}\n\
             or export DELIOS_USERNAME, DELIOS_PASSWORD and DELIOS_PLANT_ID."
        )
    )]
    Setup {
        path: String,
        #[source]
        source: SetupError,
    },

    #[error("Could not initialise the portal client")]
    #[diagnostic(code(delios::client))]
    Client {
        #[source]
        source: SetupError,
    },

    // ── Runtime ──────────────────────────────────────────────────────

    #[error("Refresh failed: {summary}")]
    #[diagnostic(
        code(delios::refresh),
        help("Previous readings are kept; rerun with -v for details.")
    )]
    Refresh { summary: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Could not render readings: {0}")]
    #[diagnostic(code(delios::json))]
    Json(#[from] serde_json::Error),
}

impl CliError {
    /// Build from a config-layer error, splitting setup failures out.
    pub fn from_config(err: ConfigError, path: String) -> Self {
        match err {
            ConfigError::Setup(source) => Self::Setup { path, source },
            source => Self::Config { path, source },
        }
    }

    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Config { .. } | Self::Setup { .. } | Self::Client { .. } => exit_code::SETUP,
            Self::Refresh { .. } | Self::Io(_) | Self::Json(_) => exit_code::GENERAL,
        }
    }
}
