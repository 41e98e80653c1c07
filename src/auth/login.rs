//! Browser login and session capture.

use chrono::Utc;
use secrecy::{ExposeSecret, SecretString};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};
use url::Url;

use super::browser::{
    BrowserLauncher, BrowserSession, InterceptedRequest, LaunchOptions, RequestHandler,
};
use super::capture::HeaderCapture;
use super::cookies::join_cookies;
use super::credentials::CredentialBundle;
use super::totp;
use crate::client::LoginConfig;
use crate::{Error, Result};

/// Environment variable holding `username:password:totp_secret` entries,
/// comma separated.
pub const CREDENTIALS_ENV: &str = "SCHWAB";

/// Login credentials.
///
/// When a TOTP secret is present, the current code is appended to the
/// password with no separator, the way the platform's combined login field
/// expects it.
pub struct LoginCredentials {
    username: String,
    password: SecretString,
    totp_secret: Option<SecretString>,
}

impl LoginCredentials {
    /// Credentials without a second factor.
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: SecretString::from(password.into()),
            totp_secret: None,
        }
    }

    /// Add a TOTP secret. An empty secret disables the second factor.
    pub fn with_totp_secret(mut self, secret: impl Into<String>) -> Self {
        let secret = secret.into();
        self.totp_secret = if secret.trim().is_empty() {
            None
        } else {
            Some(SecretString::from(secret))
        };
        self
    }

    /// Read the first entry of the `SCHWAB` environment variable.
    ///
    /// The format is `username:password:totp_secret`; a secret of `NA`
    /// means no second factor. Fields after the third are ignored, so a
    /// password cannot contain `:`.
    pub fn from_env() -> Result<Self> {
        let raw = std::env::var(CREDENTIALS_ENV)
            .map_err(|_| Error::Config(format!("{CREDENTIALS_ENV} environment variable not set")))?;
        Self::parse(&raw)
    }

    fn parse(raw: &str) -> Result<Self> {
        let first = raw.split(',').next().unwrap_or_default().trim();
        let parts: Vec<&str> = first.split(':').collect();
        match parts.as_slice() {
            [username, password, secret, ..] if !username.is_empty() => {
                let secret = if secret.eq_ignore_ascii_case("NA") { "" } else { secret };
                Ok(Self::new(*username, *password).with_totp_secret(secret))
            }
            _ => Err(Error::Config(
                "invalid account format, expected username:password:totpSecret".to_string(),
            )),
        }
    }

    /// The login id.
    pub fn username(&self) -> &str {
        &self.username
    }

    /// Returns `true` if a second factor is configured.
    pub fn has_totp(&self) -> bool {
        self.totp_secret.is_some()
    }

    /// The password as submitted at `unix_time`.
    pub(crate) fn submitted_password(&self, unix_time: u64) -> Result<SecretString> {
        match &self.totp_secret {
            Some(secret) => {
                let code = totp::generate(secret.expose_secret(), unix_time)?;
                Ok(SecretString::from(format!(
                    "{}{}",
                    self.password.expose_secret(),
                    code
                )))
            }
            None => Ok(SecretString::from(self.password.expose_secret().to_string())),
        }
    }
}

impl std::fmt::Debug for LoginCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginCredentials")
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .field("totp", &self.totp_secret.is_some())
            .finish()
    }
}

/// Log in through a browser and capture the session credentials.
///
/// Either a fully populated bundle is returned or the call fails; the
/// browser is closed in both cases. Nothing is retried.
pub(crate) async fn capture_session(
    launcher: &dyn BrowserLauncher,
    config: &LoginConfig,
    homepage: &Url,
    credentials: &LoginCredentials,
) -> Result<CredentialBundle> {
    let now = Utc::now().timestamp().max(0) as u64;
    let password = credentials.submitted_password(now)?;

    info!(username = %credentials.username(), "Launching browser for login");
    let mut browser = step(
        "launch the browser",
        config.navigation_timeout,
        launcher.launch(&LaunchOptions::from(config)),
    )
    .await?;

    let flow = LoginFlow { config, homepage };
    let result = flow
        .run(browser.as_mut(), credentials.username(), &password)
        .await;

    if let Err(err) = browser.close().await {
        warn!(error = %err, "Failed to close browser");
    }
    result
}

struct LoginFlow<'a> {
    config: &'a LoginConfig,
    homepage: &'a Url,
}

impl LoginFlow<'_> {
    async fn run(
        &self,
        page: &mut dyn BrowserSession,
        username: &str,
        password: &SecretString,
    ) -> Result<CredentialBundle> {
        let cfg = self.config;
        let frame = cfg.login_frame_selector.as_str();

        // Must be in place before the first navigation.
        let mut capture = HeaderCapture::new();
        let handle = capture.handle();
        let handler: RequestHandler = Arc::new(move |request: &InterceptedRequest| {
            if handle.offer(&request.headers) {
                debug!(url = %request.url, "Captured authorization header");
            }
        });
        step(
            "register the request interceptor",
            cfg.element_timeout,
            page.route(&cfg.intercept_pattern, handler),
        )
        .await?;

        info!("Navigating to login page");
        step("load the homepage", cfg.navigation_timeout, page.goto(self.homepage.as_str())).await?;
        step(
            "find the login iframe",
            cfg.element_timeout,
            page.wait_for_selector(frame),
        )
        .await?;

        info!("Entering credentials");
        step(
            "select the Trade landing page",
            cfg.element_timeout,
            page.select_option_in_frame(frame, &cfg.role_selector, cfg.role_option_index),
        )
        .await?;
        step(
            "fill the login id",
            cfg.element_timeout,
            page.fill_in_frame(frame, &cfg.username_selector, username),
        )
        .await?;
        step(
            "tab to the password field",
            cfg.element_timeout,
            page.press_in_frame(frame, &cfg.username_selector, "Tab"),
        )
        .await?;
        step(
            "fill the password",
            cfg.element_timeout,
            page.fill_in_frame(frame, &cfg.password_selector, password.expose_secret()),
        )
        .await?;
        step(
            "submit the login form",
            cfg.element_timeout,
            page.press_in_frame(frame, &cfg.password_selector, "Enter"),
        )
        .await?;

        // The session is not established until the page is reloaded.
        tokio::time::sleep(cfg.post_login_settle).await;
        step("reload after login", cfg.element_timeout, page.reload()).await?;

        info!("Waiting for authorization header");
        let captured = capture
            .wait(cfg.header_capture_timeout)
            .await
            .ok_or_else(|| Error::Authentication("no authorization header captured".to_string()))?;
        info!("Captured bearer token");

        step(
            "reach the trade application",
            cfg.url_timeout,
            page.wait_for_url(&cfg.trade_url_pattern),
        )
        .await?;
        step(
            "load the trade page",
            cfg.element_timeout,
            page.wait_for_selector(&cfg.trade_page_selector),
        )
        .await?;
        // The trade page only sets its full cookie set on the second load.
        step("reload the trade page", cfg.element_timeout, page.reload()).await?;
        step(
            "load the trade page after reload",
            cfg.element_timeout,
            page.wait_for_selector(&cfg.trade_page_selector),
        )
        .await?;
        tokio::time::sleep(cfg.cookie_settle).await;

        let cookie_string = self.collect_cookies(page).await;
        if cookie_string.is_empty() {
            return Err(Error::Authentication("no session cookies".to_string()));
        }

        let bundle = CredentialBundle::from_capture(captured, cookie_string)?;
        info!(headers = bundle.headers().len(), "Session captured");
        Ok(bundle)
    }

    /// Cookies of the allow-listed origins only; the full jar is large
    /// enough to trip header size limits on the REST gateway.
    async fn collect_cookies(&self, page: &mut dyn BrowserSession) -> String {
        let mut cookies = Vec::new();
        for domain in &self.config.cookie_domains {
            match step("read cookies", self.config.element_timeout, page.cookies(domain)).await {
                Ok(found) => {
                    debug!(domain = %domain, count = found.len(), "Read cookies");
                    cookies.extend(found);
                }
                Err(err) => warn!(domain = %domain, error = %err, "Skipping cookie domain"),
            }
        }
        join_cookies(cookies)
    }
}

/// Run one browser step under a deadline, naming the step in any error.
async fn step<T, F>(name: &str, limit: Duration, action: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    match tokio::time::timeout(limit, action).await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(Error::Timeout(_))) | Err(_) => Err(Error::Timeout(name.to_string())),
        Ok(Err(err)) => Err(Error::Authentication(format!("failed to {name}: {err}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_password_without_totp() {
        let creds = LoginCredentials::new("user", "hunter2");
        assert!(!creds.has_totp());
        assert_eq!(creds.submitted_password(59).unwrap().expose_secret(), "hunter2");
    }

    #[test]
    fn test_password_with_totp_appends_code() {
        let creds = LoginCredentials::new("user", "hunter2")
            .with_totp_secret("GEZDGNBVGY3TQOJQGEZDGNBVGY3TQOJQ");
        assert!(creds.has_totp());
        assert_eq!(
            creds.submitted_password(59).unwrap().expose_secret(),
            "hunter2287082"
        );
    }

    #[test]
    fn test_empty_totp_secret_disables_second_factor() {
        let creds = LoginCredentials::new("user", "pw").with_totp_secret("  ");
        assert!(!creds.has_totp());
    }

    #[test]
    fn test_parse_env_format() {
        let creds = LoginCredentials::parse("alice:pw:NA,bob:pw2:SECRET").unwrap();
        assert_eq!(creds.username(), "alice");
        assert!(!creds.has_totp());

        let creds = LoginCredentials::parse("alice:pw:GEZDGNBVGY3TQOJQGEZDGNBVGY3TQOJQ").unwrap();
        assert!(creds.has_totp());
        assert_eq!(creds.submitted_password(59).unwrap().expose_secret(), "pw287082");

        assert!(LoginCredentials::parse("alice:pw").is_err());
        assert!(LoginCredentials::parse(":pw:NA").is_err());
        assert!(LoginCredentials::parse("").is_err());
    }

    #[test]
    fn test_parse_ignores_extra_fields() {
        let creds = LoginCredentials::parse("alice:pw:NA:extra").unwrap();
        assert_eq!(creds.username(), "alice");
        assert!(!creds.has_totp());
        assert_eq!(creds.submitted_password(0).unwrap().expose_secret(), "pw");

        let creds = LoginCredentials::parse("bob:pw:GEZDGNBVGY3TQOJQGEZDGNBVGY3TQOJQ:x:y").unwrap();
        assert_eq!(creds.submitted_password(59).unwrap().expose_secret(), "pw287082");
    }

    #[test]
    fn test_debug_redacts_password() {
        let creds = LoginCredentials::new("user", "hunter2");
        let debug_str = format!("{:?}", creds);
        assert!(!debug_str.contains("hunter2"));
        assert!(debug_str.contains("REDACTED"));
    }

    #[tokio::test]
    async fn test_step_maps_errors() {
        let err = step("do a thing", Duration::from_secs(1), async {
            Err::<(), _>(Error::Browser("boom".into()))
        })
        .await
        .unwrap_err();
        assert!(matches!(&err, Error::Authentication(msg) if msg.contains("do a thing") && msg.contains("boom")));

        let err = step("wait forever", Duration::from_millis(10), std::future::pending::<Result<()>>())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Timeout(name) if name == "wait forever"));
    }
}
