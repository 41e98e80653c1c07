//! Session state shared by the client's services.

use chrono::{DateTime, Utc};
use reqwest::header::HeaderMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use super::credentials::CredentialBundle;

/// Header naming the account the captured session was looking at.
const CLIENT_ACCOUNT_HEADER: &str = "schwab-client-account";

/// Authenticated session of a client.
///
/// Holds the [`CredentialBundle`] behind a lock. A login replaces the whole
/// bundle; a token refresh touches only the bearer token. Requests read a
/// snapshot of the headers and never hold the lock across network I/O.
///
/// # Thread Safety
///
/// `Session` is cheap to clone and can be shared across tasks.
#[derive(Clone)]
pub struct Session {
    inner: Arc<RwLock<CredentialBundle>>,
}

impl Session {
    /// A session with an empty bundle.
    pub fn new() -> Self {
        Self::from_bundle(CredentialBundle::empty())
    }

    /// A session seeded with existing credentials.
    pub fn from_bundle(bundle: CredentialBundle) -> Self {
        Self {
            inner: Arc::new(RwLock::new(bundle)),
        }
    }

    /// Returns `true` once a login has populated the bundle.
    pub async fn is_authenticated(&self) -> bool {
        !self.inner.read().await.is_empty()
    }

    /// When the current credentials were captured.
    pub async fn captured_at(&self) -> Option<DateTime<Utc>> {
        self.inner.read().await.captured_at()
    }

    /// When the bearer token was last refreshed.
    pub async fn refreshed_at(&self) -> Option<DateTime<Utc>> {
        self.inner.read().await.refreshed_at()
    }

    /// Names of the headers replayed on API calls.
    pub async fn header_names(&self) -> Vec<String> {
        self.inner.read().await.headers().keys().cloned().collect()
    }

    /// Account id the captured session carried, if any.
    pub async fn client_account(&self) -> Option<String> {
        self.inner
            .read()
            .await
            .header(CLIENT_ACCOUNT_HEADER)
            .map(str::to_string)
    }

    /// Header map for an outbound request.
    pub(crate) async fn request_headers(&self) -> HeaderMap {
        self.inner.read().await.to_header_map()
    }

    /// Swap in the bundle of a new login.
    pub(crate) async fn replace(&self, bundle: CredentialBundle) {
        *self.inner.write().await = bundle;
    }

    /// Install a refreshed bearer token.
    pub(crate) async fn apply_refreshed_token(&self, token: &str) {
        self.inner.write().await.apply_refreshed_token(token);
    }

    /// Run `f` against the current bundle.
    pub async fn with_bundle<R>(&self, f: impl FnOnce(&CredentialBundle) -> R) -> R {
        f(&*self.inner.read().await)
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("credentials", &"[REDACTED]")
            .finish()
    }
}
