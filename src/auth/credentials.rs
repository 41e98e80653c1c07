//! The credential bundle: everything needed to act as the logged-in
//! browser session.

use chrono::{DateTime, Utc};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use secrecy::{ExposeSecret, SecretString};
use std::collections::BTreeMap;
use std::fmt;
use tracing::debug;

use crate::{Error, Result};

/// Header carrying the bearer token.
pub const AUTHORIZATION: &str = "Authorization";
/// Header carrying the session cookies.
pub const COOKIE: &str = "Cookie";

/// Captured headers that the HTTP transport manages itself and that must
/// not be replayed.
const TRANSPORT_HEADERS: [&str; 5] = [
    "host",
    "content-length",
    "accept-encoding",
    "connection",
    "transfer-encoding",
];

/// Bearer token, replayable header set and cookie string of one login.
///
/// Once populated, the `Authorization` header and the bearer token always
/// agree: both are only ever written together. Header names keep the case
/// they were captured with, but at most one header of each name (ignoring
/// ASCII case) is stored.
pub struct CredentialBundle {
    bearer_token: SecretString,
    headers: BTreeMap<String, String>,
    cookie_string: SecretString,
    captured_at: Option<DateTime<Utc>>,
    refreshed_at: Option<DateTime<Utc>>,
}

impl CredentialBundle {
    /// An empty bundle, as held by a client that has not logged in yet.
    pub fn empty() -> Self {
        Self {
            bearer_token: SecretString::from(String::new()),
            headers: BTreeMap::new(),
            cookie_string: SecretString::from(String::new()),
            captured_at: None,
            refreshed_at: None,
        }
    }

    /// Assemble a bundle from the headers of an intercepted request and the
    /// aggregated cookie string.
    ///
    /// The captured headers are kept verbatim, then `Authorization` is set
    /// to the captured bearer value and `Cookie` to `cookie_string`,
    /// replacing any captured variant of either name.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Authentication`] if the captured headers carry no
    /// authorization value or the cookie string is empty.
    pub fn from_capture<I, K, V>(captured: I, cookie_string: impl Into<String>) -> Result<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let headers: BTreeMap<String, String> = captured
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();

        let bearer = find_header(&headers, AUTHORIZATION)
            .filter(|v| !v.is_empty())
            .map(str::to_string)
            .ok_or_else(|| Error::Authentication("no authorization header captured".to_string()))?;

        let cookie_string = cookie_string.into();
        if cookie_string.is_empty() {
            return Err(Error::Authentication("no session cookies".to_string()));
        }

        let mut bundle = Self {
            bearer_token: SecretString::from(String::new()),
            headers,
            cookie_string: SecretString::from(String::new()),
            captured_at: Some(Utc::now()),
            refreshed_at: None,
        };
        bundle.set_authorization(bearer);
        bundle.set_header(COOKIE, cookie_string.clone());
        bundle.cookie_string = SecretString::from(cookie_string);
        Ok(bundle)
    }

    /// Returns `true` if no login has populated this bundle.
    pub fn is_empty(&self) -> bool {
        self.bearer_token.expose_secret().is_empty()
    }

    /// The bearer token, `Bearer <token>`.
    pub fn bearer_token(&self) -> &SecretString {
        &self.bearer_token
    }

    /// The `; `-joined session cookie string.
    pub fn cookie_string(&self) -> &SecretString {
        &self.cookie_string
    }

    /// All headers, with names as captured.
    pub fn headers(&self) -> &BTreeMap<String, String> {
        &self.headers
    }

    /// Look up a header ignoring ASCII case.
    pub fn header(&self, name: &str) -> Option<&str> {
        find_header(&self.headers, name)
    }

    /// When the browser login produced this bundle.
    pub fn captured_at(&self) -> Option<DateTime<Utc>> {
        self.captured_at
    }

    /// When the bearer token was last refreshed.
    pub fn refreshed_at(&self) -> Option<DateTime<Utc>> {
        self.refreshed_at
    }

    /// Install a freshly issued token. Only the bearer token and the
    /// `Authorization` header change.
    pub(crate) fn apply_refreshed_token(&mut self, token: &str) {
        self.set_authorization(format!("Bearer {token}"));
        self.refreshed_at = Some(Utc::now());
    }

    fn set_authorization(&mut self, bearer: String) {
        self.set_header(AUTHORIZATION, bearer.clone());
        self.bearer_token = SecretString::from(bearer);
    }

    fn set_header(&mut self, name: &str, value: String) {
        self.headers.retain(|k, _| !k.eq_ignore_ascii_case(name));
        self.headers.insert(name.to_string(), value);
    }

    /// Build the header map replayed on every REST call.
    ///
    /// HTTP/2 pseudo-headers and transport-managed headers are dropped;
    /// names or values the HTTP stack rejects are skipped.
    pub fn to_header_map(&self) -> HeaderMap {
        let mut map = HeaderMap::with_capacity(self.headers.len());
        for (name, value) in &self.headers {
            if name.starts_with(':')
                || TRANSPORT_HEADERS.iter().any(|h| name.eq_ignore_ascii_case(h))
            {
                continue;
            }
            match (
                HeaderName::from_bytes(name.as_bytes()),
                HeaderValue::from_str(value),
            ) {
                (Ok(name), Ok(value)) => {
                    map.insert(name, value);
                }
                _ => debug!(header = %name, "Skipping header the HTTP client cannot send"),
            }
        }
        map
    }
}

impl Default for CredentialBundle {
    fn default() -> Self {
        Self::empty()
    }
}

impl fmt::Debug for CredentialBundle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.headers.keys().map(String::as_str).collect();
        f.debug_struct("CredentialBundle")
            .field("bearer_token", &"[REDACTED]")
            .field("headers", &names)
            .field("cookie_string", &"[REDACTED]")
            .field("captured_at", &self.captured_at)
            .field("refreshed_at", &self.refreshed_at)
            .finish()
    }
}

fn find_header<'a>(headers: &'a BTreeMap<String, String>, name: &str) -> Option<&'a str> {
    headers
        .iter()
        .find(|(k, _)| k.eq_ignore_ascii_case(name))
        .map(|(_, v)| v.as_str())
}
