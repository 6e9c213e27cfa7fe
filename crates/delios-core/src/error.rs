// ── Core error types ──
//
// Three categories, matching how far each one travels:
// - `SetupError` aborts construction and is reported once to the operator.
// - `AuthError` is contained by the session manager; the session stays
//   unauthenticated and the next fetch tries again.
// - `FetchError` is returned to the refresh caller, which logs it and
//   keeps the previous readings.
//
// The `From<delios_api::Error>` impls translate transport-layer errors so
// consumers never match on HTTP details directly.

use thiserror::Error;

use crate::reading::Cycle;

/// Invalid or missing configuration. Fatal; no poller is constructed.
#[derive(Debug, Error)]
pub enum SetupError {
    #[error("missing required setting '{field}'")]
    Missing { field: &'static str },

    #[error("invalid setting '{field}': {reason}")]
    Invalid { field: &'static str, reason: String },

    #[error("failed to build HTTP client: {0}")]
    Client(#[source] delios_api::Error),
}

/// Login failed or returned no usable token.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("login rejected: {message}")]
    Rejected { message: String },

    #[error("login response contained no token (tried: {tried})")]
    MissingToken { tried: String },

    #[error("login timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    #[error("login request failed: {reason}")]
    Network { reason: String },

    #[error("unexpected login response: {message}")]
    Protocol { message: String },
}

/// A metrics fetch failed; the reading store was left untouched.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    #[error("request failed: {reason}")]
    Network { reason: String },

    #[error("session rejected by portal: {message}")]
    Unauthorized { message: String },

    #[error("portal returned HTTP {status}: {message}")]
    Api { status: u16, message: String },

    #[error("malformed {cycle} payload: {message}")]
    Payload { cycle: Cycle, message: String },

    #[error("invalid request: {message}")]
    Request { message: String },
}

impl FetchError {
    /// Attach the cycle to a payload decoding failure.
    pub(crate) fn payload(cycle: Cycle, err: impl std::fmt::Display) -> Self {
        Self::Payload {
            cycle,
            message: err.to_string(),
        }
    }

    /// Returns `true` if the next tick may well succeed without operator action.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Timeout { .. } | Self::Network { .. } | Self::Unauthorized { .. } => true,
            Self::Api { status, .. } => *status >= 500,
            Self::Payload { .. } | Self::Request { .. } => false,
        }
    }
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<delios_api::Error> for AuthError {
    fn from(err: delios_api::Error) -> Self {
        use delios_api::Error as Api;
        match err {
            Api::Authentication { message } => Self::Rejected { message },
            Api::Api { status, message } => Self::Rejected {
                message: format!("HTTP {status}: {message}"),
            },
            Api::MissingToken { tried } => Self::MissingToken { tried },
            Api::Timeout { timeout_secs } => Self::Timeout { timeout_secs },
            Api::Transport(e) => Self::Network {
                reason: e.to_string(),
            },
            Api::InvalidUrl(e) => Self::Network {
                reason: format!("invalid login URL: {e}"),
            },
            Api::InvalidHeader(e) => Self::Protocol {
                message: format!("token is not a valid header value: {e}"),
            },
            Api::Deserialization { message, body: _ } => Self::Protocol { message },
        }
    }
}

impl FetchError {
    /// Translate a transport-layer error raised during `cycle`.
    pub(crate) fn from_api(cycle: Cycle, err: delios_api::Error) -> Self {
        use delios_api::Error as Api;
        match err {
            Api::Authentication { message } => Self::Unauthorized { message },
            Api::Api { status, message } => Self::Api { status, message },
            Api::Timeout { timeout_secs } => Self::Timeout { timeout_secs },
            Api::Transport(e) => Self::Network {
                reason: e.to_string(),
            },
            Api::InvalidUrl(e) => Self::Request {
                message: format!("invalid URL: {e}"),
            },
            Api::InvalidHeader(e) => Self::Request {
                message: e.to_string(),
            },
            Api::MissingToken { tried } => Self::Unauthorized {
                message: format!("no token (tried: {tried})"),
            },
            Api::Deserialization { message, body: _ } => Self::Payload { cycle, message },
        }
    }
}
