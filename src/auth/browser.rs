//! The browser driver seam.
//!
//! The login flow needs a real browser but no particular engine. Anything
//! that can launch a browser, drive a page, intercept requests and read
//! cookies can back it by implementing [`BrowserLauncher`] and
//! [`BrowserSession`].
//!
//! # Contract
//!
//! - Every request whose URL contains a routed pattern is passed to the
//!   registered [`RequestHandler`] and is then continued unchanged. The
//!   handler never decides whether a request proceeds.
//! - The handler may be called from the driver's own event loop,
//!   concurrently with the session methods, and more than once.
//! - Frame-scoped methods locate the frame by its selector at call time and
//!   wait for the element inside it.
//! - Methods may run as long as the underlying engine needs; the login flow
//!   puts its own deadline on each step.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;

use crate::client::{LoginConfig, Viewport};
use crate::Result;

/// Options for launching the browser.
#[derive(Debug, Clone, PartialEq)]
pub struct LaunchOptions {
    /// Run without a window
    pub headless: bool,
    /// Browser command-line flags
    pub args: Vec<String>,
    /// User agent of the browsing context
    pub user_agent: String,
    /// Window size
    pub viewport: Viewport,
}

impl From<&LoginConfig> for LaunchOptions {
    fn from(config: &LoginConfig) -> Self {
        Self {
            headless: config.headless,
            args: config.launch_args.clone(),
            user_agent: config.user_agent.clone(),
            viewport: config.viewport,
        }
    }
}

/// A request seen by the interception hook.
#[derive(Debug, Clone, Default)]
pub struct InterceptedRequest {
    /// Full request URL
    pub url: String,
    /// Every header the browser attached, names as reported
    pub headers: HashMap<String, String>,
}

/// Callback invoked for each intercepted request.
pub type RequestHandler = Arc<dyn Fn(&InterceptedRequest) + Send + Sync>;

/// A cookie read from the browsing context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrowserCookie {
    /// Cookie name
    pub name: String,
    /// Cookie value
    pub value: String,
    /// Domain the cookie is scoped to
    pub domain: String,
}

impl BrowserCookie {
    /// Create a cookie.
    pub fn new(
        name: impl Into<String>,
        value: impl Into<String>,
        domain: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            domain: domain.into(),
        }
    }
}

/// Starts browser sessions.
#[async_trait]
pub trait BrowserLauncher: Send + Sync {
    /// Launch a browser with a fresh context and one open page.
    async fn launch(&self, options: &LaunchOptions) -> Result<Box<dyn BrowserSession>>;
}

/// One browser context with a single page.
#[async_trait]
pub trait BrowserSession: Send {
    /// Pass every request whose URL contains `url_pattern` to `handler`,
    /// then continue it.
    async fn route(&mut self, url_pattern: &str, handler: RequestHandler) -> Result<()>;

    /// Navigate the page to `url` and wait for the load.
    async fn goto(&mut self, url: &str) -> Result<()>;

    /// Wait for an element matching `selector` to attach to the page.
    async fn wait_for_selector(&mut self, selector: &str) -> Result<()>;

    /// Select the option at `index` of a `<select>` inside a frame.
    async fn select_option_in_frame(
        &mut self,
        frame_selector: &str,
        selector: &str,
        index: usize,
    ) -> Result<()>;

    /// Fill an input inside a frame.
    async fn fill_in_frame(&mut self, frame_selector: &str, selector: &str, value: &str)
        -> Result<()>;

    /// Press a key on an element inside a frame.
    async fn press_in_frame(&mut self, frame_selector: &str, selector: &str, key: &str)
        -> Result<()>;

    /// Reload the page.
    async fn reload(&mut self) -> Result<()>;

    /// Wait until the page URL contains `url_pattern`.
    async fn wait_for_url(&mut self, url_pattern: &str) -> Result<()>;

    /// Cookies the context would send to `url`.
    async fn cookies(&mut self, url: &str) -> Result<Vec<BrowserCookie>>;

    /// Close the page, context and browser.
    async fn close(self: Box<Self>) -> Result<()>;
}
