//! Client configuration options.

use std::time::Duration;

use super::endpoints::Endpoints;
use crate::AccountId;

/// Environment variable listing account ids, colon separated.
pub const ACCOUNT_NUMBERS_ENV: &str = "SCHWAB_ACCOUNT_NUMBERS";

/// Browser user agent presented during login and on API calls. The platform
/// blocks user agents that identify as automation.
pub const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36";

/// Configuration for the Schwab web client.
///
/// # Example
///
/// ```
/// use schwab_web_rs::{AccountId, ClientConfig};
/// use std::time::Duration;
///
/// let config = ClientConfig::default()
///     .with_timeout(Duration::from_secs(20))
///     .with_account_ids(vec![AccountId::new("12345678")]);
/// ```
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Deadline for every REST call
    pub timeout: Duration,
    /// Fallback User-Agent when the captured headers carry none
    pub user_agent: String,
    /// Account ids; the first one is sent as the multi-account hint when
    /// the captured headers do not name an account
    pub account_ids: Vec<AccountId>,
    /// URLs the client talks to
    pub endpoints: Endpoints,
    /// Browser login settings
    pub login: LoginConfig,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            user_agent: BROWSER_USER_AGENT.to_string(),
            account_ids: Vec::new(),
            endpoints: Endpoints::default(),
            login: LoginConfig::default(),
        }
    }
}

impl ClientConfig {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Default configuration with account ids read from
    /// `SCHWAB_ACCOUNT_NUMBERS`. A missing or empty variable leaves the
    /// list empty.
    pub fn from_env() -> Self {
        let raw = std::env::var(ACCOUNT_NUMBERS_ENV).unwrap_or_default();
        Self::default().with_account_ids(parse_account_ids(&raw))
    }

    /// Set the REST request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the fallback User-Agent header.
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Set the account id hints.
    pub fn with_account_ids(mut self, account_ids: Vec<AccountId>) -> Self {
        self.account_ids = account_ids;
        self
    }

    /// Override the endpoint URLs.
    pub fn with_endpoints(mut self, endpoints: Endpoints) -> Self {
        self.endpoints = endpoints;
        self
    }

    /// Set the browser login settings.
    pub fn with_login(mut self, login: LoginConfig) -> Self {
        self.login = login;
        self
    }
}

fn parse_account_ids(raw: &str) -> Vec<AccountId> {
    raw.trim()
        .split(':')
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(AccountId::new)
        .collect()
}

/// Browser window size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    /// Width in CSS pixels
    pub width: u32,
    /// Height in CSS pixels
    pub height: u32,
}

/// Settings of the browser login flow.
///
/// The defaults match the platform's current login page. Timeouts bound
/// each browser step; the settle pauses are fixed waits the session needs
/// before it is usable.
#[derive(Debug, Clone)]
pub struct LoginConfig {
    /// Run the browser without a window. The platform is more likely to
    /// flag headless sessions.
    pub headless: bool,
    /// User agent of the browser context
    pub user_agent: String,
    /// Window size of the browser context
    pub viewport: Viewport,
    /// Extra browser command-line flags
    pub launch_args: Vec<String>,
    /// Deadline for page navigation
    pub navigation_timeout: Duration,
    /// Deadline for element lookups, input and reloads
    pub element_timeout: Duration,
    /// Deadline for reaching the trade application URL
    pub url_timeout: Duration,
    /// Wall-clock deadline for the authorization header to be captured
    pub header_capture_timeout: Duration,
    /// Pause between submitting the login form and reloading
    pub post_login_settle: Duration,
    /// Pause after the final reload before cookies are read
    pub cookie_settle: Duration,
    /// Selector of the login iframe
    pub login_frame_selector: String,
    /// Selector of the landing-page dropdown inside the iframe
    pub role_selector: String,
    /// Dropdown option index for the "Trade" landing page
    pub role_option_index: usize,
    /// Selector of the login id field inside the iframe
    pub username_selector: String,
    /// Selector of the password field inside the iframe
    pub password_selector: String,
    /// URL substring of the request whose headers are captured
    pub intercept_pattern: String,
    /// URL substring of the trade application
    pub trade_url_pattern: String,
    /// Element that only exists once the trade page is usable
    pub trade_page_selector: String,
    /// Origins whose cookies make up the session cookie string
    pub cookie_domains: Vec<String>,
}

impl Default for LoginConfig {
    fn default() -> Self {
        Self {
            headless: false,
            user_agent: BROWSER_USER_AGENT.to_string(),
            viewport: Viewport {
                width: 1920,
                height: 1080,
            },
            launch_args: vec![
                "--disable-blink-features=AutomationControlled".to_string(),
                "--disable-automation".to_string(),
            ],
            navigation_timeout: Duration::from_secs(60),
            element_timeout: Duration::from_secs(30),
            url_timeout: Duration::from_secs(60),
            header_capture_timeout: Duration::from_secs(60),
            post_login_settle: Duration::from_secs(5),
            cookie_settle: Duration::from_millis(1500),
            login_frame_selector: "iframe#schwablmslogin".to_string(),
            role_selector: "select#landingPageOptions".to_string(),
            role_option_index: 3,
            username_selector: r#"[placeholder="Login ID"]"#.to_string(),
            password_selector: r#"[placeholder="Password"]"#.to_string(),
            intercept_pattern: "balancespositions".to_string(),
            trade_url_pattern: "app/trade".to_string(),
            trade_page_selector: "#_txtSymbol".to_string(),
            cookie_domains: vec![
                "https://www.schwab.com".to_string(),
                "https://client.schwab.com".to_string(),
                "https://ausgateway.schwab.com".to_string(),
            ],
        }
    }
}

impl LoginConfig {
    /// Create a login configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Run the browser headless or headed.
    pub fn with_headless(mut self, headless: bool) -> Self {
        self.headless = headless;
        self
    }

    /// Set the two fixed settle pauses.
    pub fn with_settle_intervals(mut self, post_login: Duration, cookies: Duration) -> Self {
        self.post_login_settle = post_login;
        self.cookie_settle = cookies;
        self
    }

    /// Set the authorization header capture deadline.
    pub fn with_header_capture_timeout(mut self, timeout: Duration) -> Self {
        self.header_capture_timeout = timeout;
        self
    }

    /// Set the navigation, element and URL step deadlines.
    pub fn with_step_timeouts(
        mut self,
        navigation: Duration,
        element: Duration,
        url: Duration,
    ) -> Self {
        self.navigation_timeout = navigation;
        self.element_timeout = element;
        self.url_timeout = url;
        self
    }

    /// Set the cookie origin allow-list.
    pub fn with_cookie_domains(mut self, domains: Vec<String>) -> Self {
        self.cookie_domains = domains;
        self
    }
}
