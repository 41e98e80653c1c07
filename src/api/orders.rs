//! Orders service for the two-phase verify/execute protocol.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::client::ClientInner;
use crate::models::{
    AccountId, OrderIntent, OrderRequest, OrderResult, OrderSide, Symbol, TokenScope,
    TradeOutcome,
};
use crate::Result;

/// Service for placing market orders.
///
/// Every order is verified first. A dry run stops after an accepted
/// verification; otherwise the verified request is sent again for
/// execution with the server-assigned identifiers filled in.
///
/// # Example
///
/// ```no_run
/// use schwab_web_rs::models::{OrderIntent, OrderSide};
///
/// # async fn example(client: schwab_web_rs::SchwabClient) -> schwab_web_rs::Result<()> {
/// // Verify only
/// let outcome = client.orders().trade("AAPL", "Buy", 1.0, "12345678", true).await?;
/// if !outcome.success {
///     println!("Rejected: {:?}", outcome.messages);
/// }
///
/// // Verify and execute
/// let intent = OrderIntent::new("AAPL", OrderSide::Sell, 0.5, "12345678");
/// let outcome = client.orders().place(&intent).await?;
/// println!("success={} messages={:?}", outcome.success, outcome.messages);
/// # Ok(())
/// # }
/// ```
pub struct OrdersService {
    inner: Arc<ClientInner>,
}

impl OrdersService {
    pub(crate) fn new(inner: Arc<ClientInner>) -> Self {
        Self { inner }
    }

    /// Place a market day order.
    ///
    /// `side` must be exactly `"Buy"` or `"Sell"`; anything else fails
    /// before any network activity.
    ///
    /// # Errors
    ///
    /// Invalid input, transport failures and an undecodable verification
    /// response are errors. A platform rejection is not: it comes back as
    /// a [`TradeOutcome`] with `success == false`.
    pub async fn trade(
        &self,
        ticker: &str,
        side: &str,
        quantity: f64,
        account_id: &str,
        dry_run: bool,
    ) -> Result<TradeOutcome> {
        let side: OrderSide = side.parse()?;
        let intent = OrderIntent::new(
            Symbol::new(ticker),
            side,
            quantity,
            AccountId::new(account_id),
        )
        .dry_run(dry_run);
        self.place(&intent).await
    }

    /// Alias of [`trade`](Self::trade) kept for callers of the older API.
    pub async fn trade_v2(
        &self,
        ticker: &str,
        side: &str,
        quantity: f64,
        account_id: &str,
        dry_run: bool,
    ) -> Result<TradeOutcome> {
        self.trade(ticker, side, quantity, account_id, dry_run).await
    }

    /// Verify and, unless it is a dry run, execute an order.
    pub async fn place(&self, intent: &OrderIntent) -> Result<TradeOutcome> {
        intent.validate()?;

        self.inner.refresh_best_effort(TokenScope::Update).await;

        let request = OrderRequest::verification(intent);
        let response = self.inner.post_order(&request).await?;
        debug!(status = %response.status, body = %response.body, "Verification response");

        if !response.is_ok() {
            return Ok(TradeOutcome::rejected(vec![response.body]));
        }

        let verified = OrderResult::from_verification(&response.body)?;
        if !verified.is_accepted() {
            info!(
                code = verified.return_code,
                symbol = %intent.symbol,
                "Order rejected at verification"
            );
            return Ok(TradeOutcome::rejected(verified.messages));
        }

        if intent.dry_run {
            info!(order_id = verified.order_id, symbol = %intent.symbol, "Dry run verified");
            return Ok(TradeOutcome::accepted(verified.messages));
        }

        let execution = request.for_execution(&verified);

        self.inner.refresh_best_effort(TokenScope::Update).await;

        let response = self.inner.post_order(&execution).await?;
        debug!(status = %response.status, body = %response.body, "Execution response");

        if !response.is_ok() {
            warn!(
                status = %response.status,
                order_id = verified.order_id,
                "Execution request failed"
            );
            return Ok(TradeOutcome::rejected(vec![response.body]));
        }

        // The order is placed by now; an unreadable answer is not an error.
        let executed: OrderResult = serde_json::from_str(&response.body)
            .unwrap_or_else(|err| {
                warn!(
                    error = %err,
                    order_id = verified.order_id,
                    "Could not decode execution response"
                );
                OrderResult::default()
            });

        info!(
            order_id = verified.order_id,
            code = executed.return_code,
            symbol = %intent.symbol,
            "Order executed"
        );
        Ok(TradeOutcome {
            success: executed.is_accepted(),
            messages: executed.messages,
        })
    }
}
