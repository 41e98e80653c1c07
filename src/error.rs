//! Error types for the Schwab web client.
//!
//! One enum covers every failure mode of the client: input validation,
//! browser session capture, token refresh, transport and API errors.
//! Platform-level order rejections are not errors; they are reported through
//! [`TradeOutcome`](crate::models::TradeOutcome).

use thiserror::Error;

/// A specialized `Result` type for client operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Longest response body excerpt carried by [`Error::Api`].
pub const BODY_EXCERPT_LIMIT: usize = 500;

/// The main error type for all client operations.
#[derive(Error, Debug)]
pub enum Error {
    /// HTTP request failed (connection, TLS, timeout inside the transport)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// API returned a non-success status
    #[error("API request failed with status {status}: {body}")]
    Api {
        /// HTTP status code
        status: u16,
        /// Response body, truncated to [`BODY_EXCERPT_LIMIT`] characters
        body: String,
    },

    /// Session capture failed (no authorization header, no cookies, a login
    /// step that could not be performed)
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// The browser driver reported a failure
    #[error("Browser error: {0}")]
    Browser(String),

    /// A browser step did not finish within its deadline
    #[error("Timed out waiting to {0}")]
    Timeout(String),

    /// The token-authorize endpoint answered with a non-200 status
    #[error("Failed to update token, status: {status}")]
    TokenRefresh {
        /// HTTP status code
        status: u16,
    },

    /// Invalid input provided to a function
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// URL parsing error
    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Returns `true` if this error is potentially transient and the
    /// operation could be retried.
    ///
    /// # Example
    ///
    /// ```
    /// use schwab_web_rs::Error;
    ///
    /// fn handle_error(err: Error) {
    ///     if err.is_retryable() {
    ///         println!("Retrying operation...");
    ///     }
    /// }
    /// ```
    pub fn is_retryable(&self) -> bool {
        match self {
            Error::Http(_) | Error::Timeout(_) => true,
            Error::Api { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }

    /// Returns `true` if this is an authentication-related error.
    ///
    /// A failed token refresh counts: the caller usually answers it by
    /// running the browser login again.
    pub fn is_auth_error(&self) -> bool {
        match self {
            Error::Authentication(_) | Error::Browser(_) | Error::TokenRefresh { .. } => true,
            Error::Api { status, .. } => *status == 401,
            _ => false,
        }
    }

    /// Returns `true` if this error indicates a client-side issue
    /// (invalid input, bad request, etc.).
    pub fn is_client_error(&self) -> bool {
        match self {
            Error::Api { status, .. } => *status >= 400 && *status < 500,
            Error::InvalidInput(_) | Error::Config(_) => true,
            _ => false,
        }
    }

    /// Returns `true` if this error indicates a server-side issue.
    pub fn is_server_error(&self) -> bool {
        match self {
            Error::Api { status, .. } => *status >= 500,
            _ => false,
        }
    }

    /// Create an API error from a status and raw response body.
    pub(crate) fn from_api_response(status: u16, body: &str) -> Self {
        Error::Api {
            status,
            body: excerpt(body, BODY_EXCERPT_LIMIT),
        }
    }
}

/// Truncate `body` to at most `limit` characters, marking the cut with `...`.
pub(crate) fn excerpt(body: &str, limit: usize) -> String {
    match body.char_indices().nth(limit) {
        Some((cut, _)) => format!("{}...", &body[..cut]),
        None => body.to_string(),
    }
}
