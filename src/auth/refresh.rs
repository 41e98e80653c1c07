//! Scoped bearer token refresh.
//!
//! Tokens expire well before the captured cookies do. The token-authorize
//! endpoint trades the current session for a new token of a given scope,
//! which avoids a full browser login for routine expiry.

use serde::Deserialize;
use tracing::debug;

use crate::client::ClientInner;
use crate::{Error, Result};

#[derive(Deserialize)]
struct TokenResponse {
    token: String,
}

impl ClientInner {
    /// Fetch a token for `scope` and install it in the session.
    ///
    /// Only the bearer token and the `Authorization` header change.
    pub(crate) async fn refresh_token(&self, scope: &str) -> Result<()> {
        let url = self.config.endpoints.token_url(scope)?;
        let headers = self.build_headers(false).await?;

        let response = self.get(url, headers).await?;
        if !response.is_ok() {
            return Err(Error::TokenRefresh {
                status: response.status.as_u16(),
            });
        }

        let TokenResponse { token } = serde_json::from_str(&response.body)?;
        self.session.apply_refreshed_token(&token).await;
        debug!(scope, "Bearer token refreshed");
        Ok(())
    }
}
