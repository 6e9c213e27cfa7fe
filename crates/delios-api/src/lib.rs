// delios-api: Async Rust client for the Delios energy-monitoring portal

pub mod auth;
pub mod client;
pub mod error;
pub mod models;
pub mod transport;

pub use auth::{TOKEN_FIELDS, extract_token};
pub use client::DeliosClient;
pub use error::Error;
pub use models::{AnnualLog, AnnualLogRequest, AnnualRecord, DailyLog};
pub use transport::{Endpoints, Timeouts, TransportConfig};
