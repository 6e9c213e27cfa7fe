// ── Session management ──
//
// Owns the account credentials and drives (re)authentication against the
// shared client. There is no expiry tracking: a session is re-established
// lazily whenever a fetch finds no token held.

use std::sync::Arc;

use delios_api::DeliosClient;
use secrecy::SecretString;
use tokio::sync::Mutex;
use tracing::{error, info, warn};

use crate::config::Credentials;
use crate::error::AuthError;

pub struct SessionManager {
    client: Arc<DeliosClient>,
    credentials: Credentials,
    /// Serializes logins when both cycles find the token missing at once.
    login_lock: Mutex<()>,
}

impl SessionManager {
    pub fn new(client: Arc<DeliosClient>, credentials: Credentials) -> Self {
        Self {
            client,
            credentials,
            login_lock: Mutex::new(()),
        }
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    /// Whether the client currently holds a bearer token.
    pub fn is_authenticated(&self) -> bool {
        self.client.has_token()
    }

    /// Drop the current token so the next fetch logs in again.
    pub fn invalidate(&self) {
        self.client.clear_token();
    }

    /// Log in with the held credentials.
    ///
    /// On success the token is attached to every later request on the
    /// shared client. On failure the session is left unauthenticated.
    pub async fn authenticate(&self) -> Result<SecretString, AuthError> {
        let token = self
            .client
            .login(self.credentials.identity(), self.credentials.secret())
            .await?;
        info!(identity = self.credentials.identity(), "portal login OK");
        Ok(token)
    }

    /// Best-effort login if no token is held.
    ///
    /// Never fails: the outcome is logged and reported as a bool, and the
    /// caller proceeds either way. Downstream fetches surface a missing
    /// token as an authorization failure of their own.
    pub async fn ensure_session(&self) -> bool {
        if self.client.has_token() {
            return true;
        }

        let _guard = self.login_lock.lock().await;
        // Another cycle may have logged in while we waited.
        if self.client.has_token() {
            return true;
        }

        match self.authenticate().await {
            Ok(_) => true,
            Err(e @ AuthError::MissingToken { .. }) => {
                warn!(error = %e, "portal login returned no token");
                false
            }
            Err(e) => {
                error!(error = %e, "portal login failed");
                false
            }
        }
    }
}
