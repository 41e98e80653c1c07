//! Order models for the two-phase verify/execute protocol.
//!
//! An [`OrderIntent`] describes what the caller wants. It is turned into an
//! [`OrderRequest`] for the verification phase; the execution request is a
//! clone of that request with the server-assigned identifiers filled in, so
//! it always echoes every field the verification call sent.

use serde::{Deserialize, Serialize};

use super::enums::*;
use super::primitives::{AccountId, Symbol};
use crate::{Error, Result};

/// A market order the caller wants to place.
///
/// # Example
///
/// ```
/// use schwab_web_rs::models::{OrderIntent, OrderSide};
///
/// let intent = OrderIntent::new("AAPL", OrderSide::Buy, 1.0, "12345678").dry_run(true);
/// assert!(intent.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct OrderIntent {
    /// Ticker to trade
    pub symbol: Symbol,
    /// Buy or sell
    pub side: OrderSide,
    /// Number of shares; fractional values are sent as-is
    pub quantity: f64,
    /// Account to trade in
    pub account_id: AccountId,
    /// Stop after a successful verification
    pub dry_run: bool,
}

impl OrderIntent {
    /// Create a live (non dry-run) order intent.
    pub fn new(
        symbol: impl Into<Symbol>,
        side: OrderSide,
        quantity: f64,
        account_id: impl Into<AccountId>,
    ) -> Self {
        Self {
            symbol: symbol.into(),
            side,
            quantity,
            account_id: account_id.into(),
            dry_run: false,
        }
    }

    /// Set the dry-run flag.
    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Check the intent before any request is built.
    pub fn validate(&self) -> Result<()> {
        if self.symbol.as_str().trim().is_empty() {
            return Err(Error::InvalidInput("ticker must not be empty".to_string()));
        }
        if self.account_id.is_blank() {
            return Err(Error::InvalidInput("account id must not be empty".to_string()));
        }
        if !self.quantity.is_finite() || self.quantity <= 0.0 {
            return Err(Error::InvalidInput(format!(
                "quantity must be a positive number, got {}",
                self.quantity
            )));
        }
        Ok(())
    }
}

/// Request body of the order endpoint.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct OrderRequest {
    /// Account context
    pub user_context: UserContext,
    /// The order itself
    pub order_strategy: OrderStrategyRequest,
    /// Which phase this request belongs to
    pub order_processing_control: OrderPhase,
}

/// Account context of an order request.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct UserContext {
    /// Account to trade in
    pub account_id: String,
    /// Always 0
    pub account_color: u32,
    /// Customer context, present on execution only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_id: Option<i64>,
}

/// Order strategy of an order request.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct OrderStrategyRequest {
    /// Security type code of the primary instrument
    pub primary_security_type: u32,
    /// Cost basis selection
    pub cost_basis_request: CostBasisRequest,
    /// Order type code
    pub order_type: String,
    /// Limit price; "0" for market orders
    pub limit_price: String,
    /// Stop price; "0" for market orders
    pub stop_price: String,
    /// Duration code
    pub duration: String,
    /// All-or-none flag
    pub all_none_in: bool,
    /// Do-not-reduce flag
    pub do_not_reduce_in: bool,
    /// Strategy type code
    pub order_strategy_type: u32,
    /// Order legs
    pub order_legs: Vec<OrderLegRequest>,
    /// Server-assigned order id, present on execution only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_id: Option<i64>,
}

/// Cost basis selection. This object uses camelCase keys on the wire.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CostBasisRequest {
    /// Method for this order
    pub cost_basis_method: String,
    /// Account default method
    pub default_cost_basis_method: String,
}

/// One leg of an order request.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct OrderLegRequest {
    /// Quantity, six decimal places
    pub quantity: String,
    /// Unfilled quantity, equal to `quantity` for a new order
    pub leaves_quantity: String,
    /// Instrument traded by this leg
    pub instrument: Instrument,
    /// Security type code
    pub security_type: u32,
    /// Buy/sell instruction code
    pub instruction: String,
}

/// Instrument of an order leg.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Instrument {
    /// Ticker symbol
    pub symbol: String,
    /// Platform security id, known after verification
    #[serde(skip_serializing_if = "Option::is_none")]
    pub item_issue_id: Option<i64>,
}

impl OrderRequest {
    /// Build the verification request for an intent.
    pub fn verification(intent: &OrderIntent) -> Self {
        let quantity = format!("{:.6}", intent.quantity);
        Self {
            user_context: UserContext {
                account_id: intent.account_id.to_string(),
                account_color: 0,
                customer_id: None,
            },
            order_strategy: OrderStrategyRequest {
                primary_security_type: SECURITY_TYPE_EQUITY,
                cost_basis_request: CostBasisRequest {
                    cost_basis_method: COST_BASIS_FIFO.to_string(),
                    default_cost_basis_method: COST_BASIS_FIFO.to_string(),
                },
                order_type: ORDER_TYPE_MARKET.to_string(),
                limit_price: "0".to_string(),
                stop_price: "0".to_string(),
                duration: DURATION_DAY.to_string(),
                all_none_in: false,
                do_not_reduce_in: false,
                order_strategy_type: ORDER_STRATEGY_SINGLE,
                order_legs: vec![OrderLegRequest {
                    quantity: quantity.clone(),
                    leaves_quantity: quantity,
                    instrument: Instrument {
                        symbol: intent.symbol.to_string(),
                        item_issue_id: None,
                    },
                    security_type: SECURITY_TYPE_EQUITY,
                    instruction: intent.side.instruction_code().to_string(),
                }],
                order_id: None,
            },
            order_processing_control: OrderPhase::Verification,
        }
    }

    /// Clone this request into the execution request for a verified order.
    ///
    /// Adds the verified security id to the first leg's instrument, the
    /// customer context, and the server order id, then flips the phase.
    /// Every other field is carried over unchanged.
    pub fn for_execution(&self, verified: &OrderResult) -> Self {
        let mut request = self.clone();
        if let (Some(leg), Some(security_id)) = (
            request.order_strategy.order_legs.first_mut(),
            verified.leg_security_ids.first(),
        ) {
            leg.instrument.item_issue_id = Some(*security_id);
        }
        request.user_context.customer_id = Some(0);
        request.order_strategy.order_id = Some(verified.order_id);
        request.order_processing_control = OrderPhase::Execution;
        request
    }

    /// The phase this request belongs to.
    pub fn phase(&self) -> OrderPhase {
        self.order_processing_control
    }
}

/// Decoded response of the order endpoint, for either phase.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(from = "wire::OrderResponse")]
pub struct OrderResult {
    /// Server-assigned order id
    pub order_id: i64,
    /// Platform return code; see [`is_accepted_return_code`]
    pub return_code: i32,
    /// Order messages in response order
    pub messages: Vec<String>,
    /// Security id of each order leg
    pub leg_security_ids: Vec<i64>,
}

impl OrderResult {
    /// Decode a verification response.
    ///
    /// Unlike the lenient [`Deserialize`] impl, the order strategy and its
    /// return code must both be present: a verification answer without
    /// them must never be treated as accepted.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Json`] if the body is not JSON or lacks either field.
    pub fn from_verification(body: &str) -> Result<Self> {
        let raw: wire::VerificationResponse = serde_json::from_str(body)?;
        Ok(raw.into())
    }

    /// Returns `true` if the platform accepted the order.
    pub fn is_accepted(&self) -> bool {
        is_accepted_return_code(self.return_code)
    }
}

/// Result of a trade call.
///
/// A platform-level rejection is reported here with `success == false`,
/// never as an error. Callers must check `success`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TradeOutcome {
    /// Messages of the last phase that ran
    pub messages: Vec<String>,
    /// Whether that phase was accepted
    pub success: bool,
}

impl TradeOutcome {
    /// An accepted outcome.
    pub fn accepted(messages: Vec<String>) -> Self {
        Self {
            messages,
            success: true,
        }
    }

    /// A rejected outcome.
    pub fn rejected(messages: Vec<String>) -> Self {
        Self {
            messages,
            success: false,
        }
    }
}

mod wire {
    use serde::Deserialize;

    use super::OrderResult;

    #[derive(Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub(super) struct OrderResponse {
        #[serde(default)]
        order_strategy: Option<OrderStrategy>,
    }

    #[derive(Default, Deserialize)]
    #[serde(rename_all = "camelCase")]
    struct OrderStrategy {
        #[serde(default)]
        order_id: Option<i64>,
        #[serde(default)]
        order_messages: Option<Vec<OrderMessage>>,
        #[serde(default)]
        order_return_code: Option<i32>,
        #[serde(default)]
        order_legs: Option<Vec<OrderLeg>>,
    }

    #[derive(Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub(super) struct VerificationResponse {
        order_strategy: VerifiedStrategy,
    }

    #[derive(Deserialize)]
    #[serde(rename_all = "camelCase")]
    struct VerifiedStrategy {
        order_return_code: i32,
        #[serde(default)]
        order_id: Option<i64>,
        #[serde(default)]
        order_messages: Option<Vec<OrderMessage>>,
        #[serde(default)]
        order_legs: Option<Vec<OrderLeg>>,
    }

    #[derive(Deserialize)]
    struct OrderMessage {
        #[serde(default)]
        message: Option<String>,
    }

    #[derive(Deserialize)]
    #[serde(rename_all = "camelCase")]
    struct OrderLeg {
        #[serde(default)]
        schwab_security_id: Option<i64>,
    }

    impl From<VerificationResponse> for OrderResult {
        fn from(raw: VerificationResponse) -> Self {
            let strategy = raw.order_strategy;
            OrderResponse {
                order_strategy: Some(OrderStrategy {
                    order_id: strategy.order_id,
                    order_messages: strategy.order_messages,
                    order_return_code: Some(strategy.order_return_code),
                    order_legs: strategy.order_legs,
                }),
            }
            .into()
        }
    }

    impl From<OrderResponse> for OrderResult {
        fn from(raw: OrderResponse) -> Self {
            let strategy = raw.order_strategy.unwrap_or_default();
            OrderResult {
                order_id: strategy.order_id.unwrap_or_default(),
                return_code: strategy.order_return_code.unwrap_or_default(),
                messages: strategy
                    .order_messages
                    .unwrap_or_default()
                    .into_iter()
                    .map(|m| m.message.unwrap_or_default())
                    .collect(),
                leg_security_ids: strategy
                    .order_legs
                    .unwrap_or_default()
                    .into_iter()
                    .map(|l| l.schwab_security_id.unwrap_or_default())
                    .collect(),
            }
        }
    }
}
