//! HTTP client implementation for the Schwab web platform.

use reqwest::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE};
use reqwest::StatusCode;
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, warn};
use url::Url;

use crate::api::{OrdersService, PositionsService};
use crate::auth::{capture_session, BrowserLauncher, LoginCredentials, Session};
use crate::models::TokenScope;
use crate::{Error, Result};

use super::config::ClientConfig;

/// Header naming the account a multi-account call is about.
const CLIENT_IDS_HEADER: &str = "Schwab-Client-Ids";
/// Header the order endpoint requires.
const RESOURCE_VERSION_HEADER: &str = "schwab-resource-version";
const RESOURCE_VERSION: &str = "1.0";

/// The main client for the Schwab web platform.
///
/// The client owns one [`Session`]. [`authenticate`](Self::authenticate)
/// fills it through a browser login; the services returned by
/// [`positions`](Self::positions) and [`orders`](Self::orders) replay it on
/// every call and refresh its bearer token as they go.
///
/// # Example
///
/// ```no_run
/// use schwab_web_rs::{ClientConfig, LoginCredentials, SchwabClient};
/// use schwab_web_rs::auth::BrowserLauncher;
///
/// # async fn example(browser: &dyn BrowserLauncher) -> schwab_web_rs::Result<()> {
/// let client = SchwabClient::new(ClientConfig::from_env())?;
/// client.authenticate(browser, &LoginCredentials::from_env()?).await?;
///
/// for (id, account) in client.positions().get().await? {
///     println!("{id}: {}", account.totals.account_value);
/// }
///
/// let outcome = client.orders().trade("AAPL", "Buy", 1.0, "12345678", true).await?;
/// println!("accepted: {} {:?}", outcome.success, outcome.messages);
/// # Ok(())
/// # }
/// ```
pub struct SchwabClient {
    pub(crate) inner: Arc<ClientInner>,
}

pub(crate) struct ClientInner {
    pub(crate) http: reqwest::Client,
    pub(crate) session: Session,
    pub(crate) config: ClientConfig,
}

impl SchwabClient {
    /// Create a client with an empty session.
    pub fn new(config: ClientConfig) -> Result<Self> {
        Self::with_session(Session::new(), config)
    }

    /// Create a client around an existing session.
    pub fn with_session(session: Session, config: ClientConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(&config.user_agent)
            .build()?;

        Ok(Self {
            inner: Arc::new(ClientInner {
                http,
                session,
                config,
            }),
        })
    }

    /// Log in through a browser and replace the session credentials.
    ///
    /// On failure the previous credentials are left untouched.
    pub async fn authenticate(
        &self,
        launcher: &dyn BrowserLauncher,
        credentials: &LoginCredentials,
    ) -> Result<()> {
        let bundle = capture_session(
            launcher,
            &self.inner.config.login,
            &self.inner.config.endpoints.homepage,
            credentials,
        )
        .await?;
        self.inner.session.replace(bundle).await;
        info!("Session credentials installed");
        Ok(())
    }

    /// Exchange the session for a fresh bearer token of `scope`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TokenRefresh`] with the status code if the
    /// endpoint does not answer 200.
    pub async fn refresh_token(&self, scope: impl AsRef<str>) -> Result<()> {
        self.inner.refresh_token(scope.as_ref()).await
    }

    /// Get the positions service.
    pub fn positions(&self) -> PositionsService {
        PositionsService::new(self.inner.clone())
    }

    /// Get the orders service.
    pub fn orders(&self) -> OrdersService {
        OrdersService::new(self.inner.clone())
    }

    /// Get a reference to the session.
    pub fn session(&self) -> &Session {
        &self.inner.session
    }

    /// Get the client configuration.
    pub fn config(&self) -> &ClientConfig {
        &self.inner.config
    }
}

/// Status and body of a gateway call. The body is kept as text so callers
/// can report it verbatim when it is not the JSON they expect.
pub(crate) struct RawResponse {
    pub(crate) status: StatusCode,
    pub(crate) body: String,
}

impl RawResponse {
    pub(crate) fn is_ok(&self) -> bool {
        self.status == StatusCode::OK
    }

    /// Turn a non-200 response into [`Error::Api`].
    pub(crate) fn error_for_status(self) -> Result<Self> {
        if self.is_ok() {
            Ok(self)
        } else {
            Err(Error::from_api_response(self.status.as_u16(), &self.body))
        }
    }
}

impl ClientInner {
    /// Session headers plus the multi-account hint, if one is known.
    ///
    /// The hint comes from the captured `schwab-client-account` header,
    /// otherwise from the first configured account id.
    pub(crate) async fn build_headers(&self, with_account_hint: bool) -> Result<HeaderMap> {
        let mut headers = self.session.request_headers().await;

        if with_account_hint {
            let hint = match self.session.client_account().await {
                Some(account) => Some(account),
                None => self
                    .config
                    .account_ids
                    .first()
                    .map(|id| id.as_str().to_string()),
            };
            if let Some(hint) = hint {
                headers.insert(
                    HeaderName::from_static("schwab-client-ids"),
                    HeaderValue::from_str(&hint).map_err(|_| {
                        Error::InvalidInput(format!("invalid {CLIENT_IDS_HEADER} value"))
                    })?,
                );
            }
        }

        Ok(headers)
    }

    /// Make a GET request.
    pub(crate) async fn get(&self, url: Url, headers: HeaderMap) -> Result<RawResponse> {
        let response = self.http.get(url).headers(headers).send().await?;
        Self::read_response(response).await
    }

    /// POST a JSON body to the order endpoint.
    pub(crate) async fn post_order<B: Serialize>(&self, body: &B) -> Result<RawResponse> {
        let mut headers = self.build_headers(false).await?;
        headers.insert(
            HeaderName::from_static(RESOURCE_VERSION_HEADER),
            HeaderValue::from_static(RESOURCE_VERSION),
        );
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let payload = serde_json::to_vec(body)?;
        let response = self
            .http
            .post(self.config.endpoints.orders.clone())
            .headers(headers)
            .body(payload)
            .send()
            .await?;
        Self::read_response(response).await
    }

    async fn read_response(response: reqwest::Response) -> Result<RawResponse> {
        let status = response.status();
        let body = response.text().await?;
        Ok(RawResponse { status, body })
    }

    /// Refresh the token, logging instead of failing.
    ///
    /// A stale token may still be accepted; a truly expired session shows
    /// up as an error from the call that follows.
    pub(crate) async fn refresh_best_effort(&self, scope: TokenScope) {
        if let Err(err) = self.refresh_token(scope.as_str()).await {
            warn!(
                scope = %scope.as_str(),
                error = %err,
                "Token refresh failed, continuing with current token"
            );
        }
    }
}

impl Clone for SchwabClient {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl std::fmt::Debug for SchwabClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SchwabClient")
            .field("config", &self.inner.config)
            .field("session", &self.inner.session)
            .finish()
    }
}
