//! Authentication and session management for the Schwab web platform.
//!
//! The platform has no public login API. A session is captured from a real
//! browser instead:
//!
//! 1. A browser driver (anything implementing [`BrowserLauncher`]) logs in
//!    through the public homepage, appending a TOTP code to the password
//!    when a secret is configured.
//! 2. The headers of the first authorized `balancespositions` request and
//!    the cookies of the platform origins are collected into a
//!    [`CredentialBundle`].
//! 3. The bundle is replayed on every REST call. Its bearer token is
//!    refreshed per scope through the token-authorize endpoint, without the
//!    browser.
//!
//! ```no_run
//! use schwab_web_rs::{ClientConfig, LoginCredentials, SchwabClient};
//! use schwab_web_rs::auth::BrowserLauncher;
//!
//! # async fn example(browser: &dyn BrowserLauncher) -> schwab_web_rs::Result<()> {
//! let credentials = LoginCredentials::new("login-id", "password")
//!     .with_totp_secret("JBSWY3DPEHPK3PXP");
//!
//! let client = SchwabClient::new(ClientConfig::default())?;
//! client.authenticate(browser, &credentials).await?;
//! assert!(client.session().is_authenticated().await);
//! # Ok(())
//! # }
//! ```

mod browser;
mod capture;
mod cookies;
mod credentials;
mod login;
mod refresh;
mod session;
pub mod totp;

pub use browser::{
    BrowserCookie, BrowserLauncher, BrowserSession, InterceptedRequest, LaunchOptions,
    RequestHandler,
};
pub use capture::CapturedHeaders;
pub use cookies::join_cookies;
pub use credentials::{CredentialBundle, AUTHORIZATION, COOKIE};
pub use login::{LoginCredentials, CREDENTIALS_ENV};
pub use session::Session;

pub(crate) use login::capture_session;
