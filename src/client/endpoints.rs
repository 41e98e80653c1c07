//! Platform URLs.
//!
//! The REST endpoints are private to the platform's web application and may
//! change without notice. Only the homepage, holdings, orders and
//! token-authorize URLs are used by this crate; the rest are listed so
//! callers can reach them with the captured credentials.

use url::Url;

use crate::Result;

/// Public homepage hosting the login iframe.
pub const HOMEPAGE_URL: &str = "https://www.schwab.com/";
/// Account summary page of the web application.
pub const ACCOUNT_SUMMARY_URL: &str = "https://client.schwab.com/clientapps/accounts/summary/";
/// Trade ticket page of the web application.
pub const TRADE_TICKET_URL: &str = "https://client.schwab.com/app/trade/tom/trade?ShowUN=YES";

/// Origin of the REST gateway.
pub const GATEWAY_ORIGIN: &str = "https://ausgateway.schwab.com";
/// Origin of the client web application.
pub const CLIENT_ORIGIN: &str = "https://client.schwab.com";

/// Path of the order endpoint (verification and execution).
pub const ORDERS_PATH: &str = "/api/is.TradeOrderManagementWeb/v1/TradeOrderManagementWebPort/orders";
/// Path of the holdings endpoint.
pub const POSITIONS_PATH: &str = "/api/is.Holdings/V1/Holdings/HoldingV2";
/// Path prefix of the token-authorize endpoint; the scope is appended.
pub const TOKEN_AUTHORIZE_PATH: &str = "/api/auth/authorize/scope/";

/// Customer accounts listing.
pub const ACCOUNT_INFO_URL: &str =
    "https://ausgateway.schwab.com/api/is.TradeOrderManagementWeb/v1/TradeOrderManagementWebPort/customer/accounts";
/// Quote list.
pub const TICKER_QUOTES_URL: &str =
    "https://ausgateway.schwab.com/api/is.TradeOrderManagementWeb/v1/TradeOrderManagementWebPort/market/quotes/list";
/// Order status list view.
pub const ORDERS_STATUS_URL: &str = "https://ausgateway.schwab.com/api/is.TradeOrderStatusWeb/ITradeOrderStatusWeb/ITradeOrderStatusWebPort/orders/listView?DateRange=All&OrderStatusType=All&SecurityType=AllSecurities&Type=All&ShowAdvanceOrder=true&SortOrder=Ascending&SortColumn=Status&CostMethod=M&IsSimOrManagedAccount=false&EnableDateFilterByActivity=true";
/// Order cancellation.
pub const CANCEL_ORDER_URL: &str =
    "https://ausgateway.schwab.com/api/is.TradeOrderStatusWeb/ITradeOrderStatusWeb/ITradeOrderStatusWebPort/orders/cancelorder";
/// Transaction history export.
pub const TRANSACTION_HISTORY_URL: &str =
    "https://ausgateway.schwab.com/api/is.TransactionHistoryWeb/TransactionHistoryInterface/TransactionHistory/brokerage/transactions/export";
/// Tax lot details.
pub const LOT_DETAILS_URL: &str = "https://ausgateway.schwab.com/api/is.Holdings/V1/Lots";
/// Option chains.
pub const OPTION_CHAINS_URL: &str =
    "https://ausgateway.schwab.com/api/is.CSOptionChainsWeb/v1/OptionChainsPort/OptionChains/chains";

/// Positions endpoint of the previous web application generation.
pub const LEGACY_POSITIONS_URL: &str = "https://client.schwab.com/api/PositionV2/PositionsDataV2";
/// Order verification endpoint of the previous generation.
pub const LEGACY_ORDER_VERIFICATION_URL: &str = "https://client.schwab.com/api/ts/stamp/verifyOrder";
/// Order confirmation endpoint of the previous generation.
pub const LEGACY_ORDER_CONFIRMATION_URL: &str = "https://client.schwab.com/api/ts/stamp/confirmorder";

/// The URLs the client talks to.
///
/// `Default` points at production. [`Endpoints::for_base_url`] re-roots
/// every REST endpoint on one origin, which is how tests aim the client at a
/// mock server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    /// Page the login flow navigates to first
    pub homepage: Url,
    /// Holdings endpoint
    pub positions: Url,
    /// Order endpoint, shared by verification and execution
    pub orders: Url,
    /// Token-authorize prefix, ending in `/`
    pub token_authorize: Url,
}

impl Default for Endpoints {
    fn default() -> Self {
        // Compile-time constants; parsing them cannot fail.
        let parse = |s: &str| Url::parse(s).expect("static endpoint URL is valid");
        Self {
            homepage: parse(HOMEPAGE_URL),
            positions: parse(&format!("{GATEWAY_ORIGIN}{POSITIONS_PATH}")),
            orders: parse(&format!("{GATEWAY_ORIGIN}{ORDERS_PATH}")),
            token_authorize: parse(&format!("{CLIENT_ORIGIN}{TOKEN_AUTHORIZE_PATH}")),
        }
    }
}

impl Endpoints {
    /// Point every REST endpoint at `base` (scheme, host and port only).
    /// The homepage is kept.
    pub fn for_base_url(base: &str) -> Result<Self> {
        let base = Url::parse(base)?;
        Ok(Self {
            homepage: Url::parse(HOMEPAGE_URL)?,
            positions: base.join(POSITIONS_PATH)?,
            orders: base.join(ORDERS_PATH)?,
            token_authorize: base.join(TOKEN_AUTHORIZE_PATH)?,
        })
    }

    /// URL of the token-authorize endpoint for a scope.
    pub fn token_url(&self, scope: &str) -> Result<Url> {
        Ok(self.token_authorize.join(scope)?)
    }
}
