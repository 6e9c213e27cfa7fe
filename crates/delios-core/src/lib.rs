// delios-core: Session management and metric polling between delios-api and the host.

pub mod config;
pub mod convert;
pub mod error;
pub mod poller;
pub mod reading;
pub mod scheduler;
pub mod session;
pub mod store;

// ── Primary re-exports ──────────────────────────────────────────────
pub use config::{Credentials, PollerConfig};
pub use error::{AuthError, FetchError, SetupError};
pub use poller::{Poller, RefreshOutcome};
pub use reading::{Category, Cycle, Metric, ReadingValue, Unit};
pub use scheduler::Scheduler;
pub use session::SessionManager;
pub use store::ReadingStore;

pub use delios_api::transport::DEFAULT_BASE_URL;
pub use delios_api::{Endpoints, Timeouts, TransportConfig};
