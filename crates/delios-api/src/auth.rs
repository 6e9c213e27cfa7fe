// Portal authentication
//
// Email/password login returning a bearer token. The portal has shipped
// the token under more than one field name, so extraction walks an
// ordered candidate list.

use secrecy::{ExposeSecret, SecretString};
use serde_json::Value;
use tracing::debug;

use crate::client::{DeliosClient, map_send_error, parse_response};
use crate::error::Error;
use crate::models::LoginRequest;

/// Login response fields that may carry the token, in priority order.
pub const TOKEN_FIELDS: &[&str] = &["token", "access_token"];

/// Return the first non-empty string found under one of [`TOKEN_FIELDS`].
pub fn extract_token(body: &Value) -> Option<&str> {
    TOKEN_FIELDS
        .iter()
        .filter_map(|field| body.get(field).and_then(Value::as_str))
        .find(|token| !token.is_empty())
}

impl DeliosClient {
    /// Authenticate with the portal using email/password.
    ///
    /// On success the token is stored and sent as `Authorization: Bearer`
    /// on every later request made through this client. On any failure the
    /// previously held token, if any, is dropped.
    pub async fn login(&self, email: &str, password: &SecretString) -> Result<SecretString, Error> {
        let url = self.endpoints().login_url()?;
        let timeout = self.timeouts().login;

        debug!("logging in at {}", url);

        let body = LoginRequest {
            email,
            password: password.expose_secret(),
        };

        let result = async {
            let resp = self
                .http()
                .post(url)
                .json(&body)
                .timeout(timeout)
                .send()
                .await
                .map_err(|e| map_send_error(e, timeout))?;

            let payload: Value = parse_response(resp, timeout).await?;
            let token = extract_token(&payload).ok_or_else(|| Error::MissingToken {
                tried: TOKEN_FIELDS.join(", "),
            })?;
            self.set_token(token)?;
            Ok::<_, Error>(SecretString::from(token.to_owned()))
        }
        .await;

        match result {
            Ok(token) => {
                debug!("login successful");
                Ok(token)
            }
            Err(e) => {
                self.clear_token();
                Err(e)
            }
        }
    }
}
