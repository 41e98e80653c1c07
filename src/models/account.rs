//! Account snapshot models decoded from the holdings endpoint.
//!
//! The holdings payload nests most scalars one level deep
//! (`{"qty": {"qty": 10}}`) and is inconsistent about the shape of a
//! position's description. The public types here are flat and serialize
//! as themselves; the wire shapes live in the private `wire` module and are
//! only used when decoding a holdings response.

use serde::de::{Deserializer, IgnoredAny};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Positions and totals of one brokerage account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountSnapshot {
    /// Account identifier exactly as the API sent it
    pub account_id: String,
    /// Account-level totals
    pub totals: AccountTotals,
    /// Named position groups, in response order
    pub groups: Vec<PositionGroup>,
}

impl AccountSnapshot {
    /// The account identifier as an integer, if it is one.
    pub fn numeric_id(&self) -> Option<i64> {
        self.account_id.trim().parse().ok()
    }

    /// Iterate every holdings row across all groups, group order first,
    /// row order within a group second.
    pub fn rows(&self) -> impl Iterator<Item = &HoldingRow> {
        self.groups.iter().flat_map(|g| g.rows.iter())
    }

    /// Project this snapshot onto the legacy `account_value + positions`
    /// shape. No network access is involved.
    pub fn to_legacy(&self) -> LegacyAccount {
        LegacyAccount {
            account_value: self.totals.account_value,
            positions: self
                .rows()
                .map(|row| LegacyPosition {
                    symbol: row.symbol.clone(),
                    market_value: row.market_value,
                    quantity: row.quantity,
                })
                .collect(),
        }
    }
}

/// Account-level totals.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct AccountTotals {
    /// Market value of all holdings
    pub market_value: f64,
    /// Cash and cash-equivalent investments
    pub cash_investments: f64,
    /// Total account value
    pub account_value: f64,
    /// Aggregate cost basis
    pub cost_basis: f64,
}

/// A named group of holdings (e.g. "Equities", "Cash").
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PositionGroup {
    /// Display name of the group
    pub name: String,
    /// Holdings in this group
    pub rows: Vec<HoldingRow>,
}

/// One holding.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HoldingRow {
    /// Ticker symbol
    pub symbol: String,
    /// Platform-internal security id
    pub security_id: i64,
    /// Number of shares held
    pub quantity: f64,
    /// Current market value
    pub market_value: f64,
    /// Cost basis
    pub cost_basis: f64,
    /// Human-readable description, normalized to plain text
    pub description: String,
}

/// Legacy projection of an account: total value plus a flat position list.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LegacyAccount {
    /// Total account value
    pub account_value: f64,
    /// One entry per holdings row, across all groups
    pub positions: Vec<LegacyPosition>,
}

/// One position in the legacy shape.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LegacyPosition {
    /// Ticker symbol
    pub symbol: String,
    /// Current market value
    pub market_value: f64,
    /// Number of shares held
    pub quantity: f64,
}

/// Object keys probed for a description, highest priority first.
const DESCRIPTION_KEYS: [&str; 3] = ["description", "text", "value"];

/// A position description normalized to plain text.
///
/// The API sends either a bare string or an object. For objects the first
/// string-valued key among `description`, `text` and `value` wins; anything
/// else normalizes to an empty string.
///
/// ```
/// use schwab_web_rs::models::Description;
///
/// let d: Description = serde_json::from_str(r#"{"text":"x"}"#).unwrap();
/// assert_eq!(d.as_str(), "x");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Description(String);

impl Description {
    /// Get the description as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Unwrap into the plain string.
    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for Description {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for Description {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Text(String),
            Object(Map<String, Value>),
            Other(IgnoredAny),
        }

        let text = match Raw::deserialize(deserializer)? {
            Raw::Text(s) => s,
            Raw::Object(mut fields) => DESCRIPTION_KEYS
                .iter()
                .find_map(|key| match fields.remove(*key) {
                    Some(Value::String(s)) => Some(s),
                    _ => None,
                })
                .unwrap_or_default(),
            Raw::Other(_) => String::new(),
        };
        Ok(Description(text))
    }
}

/// Response envelope of the holdings endpoint.
#[derive(Default, Deserialize)]
pub(crate) struct PositionsResponse {
    #[serde(default)]
    accounts: Vec<wire::Account>,
}

impl PositionsResponse {
    pub(crate) fn into_snapshots(self) -> Vec<AccountSnapshot> {
        self.accounts.into_iter().map(AccountSnapshot::from).collect()
    }
}

mod wire {
    use serde::Deserialize;

    use super::{AccountSnapshot, AccountTotals, Description, HoldingRow, PositionGroup};

    #[derive(Deserialize)]
    #[serde(untagged)]
    pub(super) enum AccountIdText {
        Text(String),
        Number(i64),
    }

    impl Default for AccountIdText {
        fn default() -> Self {
            AccountIdText::Text(String::new())
        }
    }

    #[derive(Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub(super) struct Account {
        #[serde(default)]
        account_id: Option<AccountIdText>,
        #[serde(default)]
        totals: Option<Totals>,
        #[serde(default)]
        grouped_positions: Option<Vec<Group>>,
    }

    #[derive(Default, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub(super) struct Totals {
        #[serde(default)]
        market_value: Option<f64>,
        #[serde(default)]
        cash_investments: Option<f64>,
        #[serde(default)]
        account_value: Option<f64>,
        #[serde(default)]
        cost_basis: Option<f64>,
    }

    #[derive(Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub(super) struct Group {
        #[serde(default)]
        group_name: Option<String>,
        #[serde(default)]
        holdings_rows: Option<Vec<Row>>,
    }

    #[derive(Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub(super) struct Row {
        #[serde(default)]
        symbol: Option<SymbolInfo>,
        #[serde(default)]
        description: Option<Description>,
        #[serde(default)]
        qty: Option<Qty>,
        #[serde(default)]
        cost_basis: Option<CostBasis>,
        #[serde(default)]
        market_value: Option<MarketValue>,
    }

    #[derive(Deserialize)]
    pub(super) struct SymbolInfo {
        #[serde(default)]
        symbol: Option<String>,
        #[serde(default, rename = "ssId")]
        ss_id: Option<i64>,
    }

    #[derive(Deserialize)]
    pub(super) struct Qty {
        #[serde(default)]
        qty: Option<f64>,
    }

    #[derive(Deserialize)]
    pub(super) struct CostBasis {
        #[serde(default, rename = "cstBasis")]
        cst_basis: Option<f64>,
    }

    #[derive(Deserialize)]
    pub(super) struct MarketValue {
        #[serde(default)]
        val: Option<f64>,
    }

    impl From<Account> for AccountSnapshot {
        fn from(raw: Account) -> Self {
            let account_id = match raw.account_id.unwrap_or_default() {
                AccountIdText::Text(s) => s,
                AccountIdText::Number(n) => n.to_string(),
            };
            let totals = raw.totals.unwrap_or_default();
            AccountSnapshot {
                account_id,
                totals: AccountTotals {
                    market_value: totals.market_value.unwrap_or_default(),
                    cash_investments: totals.cash_investments.unwrap_or_default(),
                    account_value: totals.account_value.unwrap_or_default(),
                    cost_basis: totals.cost_basis.unwrap_or_default(),
                },
                groups: raw
                    .grouped_positions
                    .unwrap_or_default()
                    .into_iter()
                    .map(PositionGroup::from)
                    .collect(),
            }
        }
    }

    impl From<Group> for PositionGroup {
        fn from(raw: Group) -> Self {
            PositionGroup {
                name: raw.group_name.unwrap_or_default(),
                rows: raw
                    .holdings_rows
                    .unwrap_or_default()
                    .into_iter()
                    .map(HoldingRow::from)
                    .collect(),
            }
        }
    }

    impl From<Row> for HoldingRow {
        fn from(raw: Row) -> Self {
            let (symbol, security_id) = match raw.symbol {
                Some(info) => (info.symbol.unwrap_or_default(), info.ss_id.unwrap_or_default()),
                None => (String::new(), 0),
            };
            HoldingRow {
                symbol,
                security_id,
                quantity: raw.qty.and_then(|q| q.qty).unwrap_or_default(),
                market_value: raw.market_value.and_then(|m| m.val).unwrap_or_default(),
                cost_basis: raw.cost_basis.and_then(|c| c.cst_basis).unwrap_or_default(),
                description: raw.description.map(Description::into_string).unwrap_or_default(),
            }
        }
    }
}
