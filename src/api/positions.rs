//! Positions service for account balances and holdings.

use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::client::ClientInner;
use crate::models::{AccountSnapshot, LegacyAccount, PositionsResponse, TokenScope};
use crate::Result;

/// Service for reading positions and balances.
///
/// # Example
///
/// ```no_run
/// # async fn example(client: schwab_web_rs::SchwabClient) -> schwab_web_rs::Result<()> {
/// let accounts = client.positions().get().await?;
/// for (id, account) in &accounts {
///     println!("Account {id}: {:.2}", account.totals.account_value);
///     for row in account.rows() {
///         println!("  {} x {} ({})", row.symbol, row.quantity, row.description);
///     }
/// }
/// # Ok(())
/// # }
/// ```
pub struct PositionsService {
    inner: Arc<ClientInner>,
}

impl PositionsService {
    pub(crate) fn new(inner: Arc<ClientInner>) -> Self {
        Self { inner }
    }

    /// Get every account visible to the session, keyed by numeric account id.
    ///
    /// The bearer token is refreshed first on a best-effort basis.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Api`](crate::Error::Api) with a body excerpt if the
    /// holdings endpoint does not answer 200.
    pub async fn get(&self) -> Result<BTreeMap<i64, AccountSnapshot>> {
        self.inner.refresh_best_effort(TokenScope::Api).await;

        let headers = self.inner.build_headers(true).await?;
        let response = self
            .inner
            .get(self.inner.config.endpoints.positions.clone(), headers)
            .await?
            .error_for_status()?;

        let decoded: PositionsResponse = serde_json::from_str(&response.body)?;
        let snapshots = decoded.into_snapshots();
        debug!(accounts = snapshots.len(), "Positions received");

        let mut accounts = BTreeMap::new();
        for account in snapshots {
            match account.numeric_id() {
                Some(id) => {
                    accounts.insert(id, account);
                }
                None => warn!(
                    account_id = %account.account_id,
                    "Skipping account with non-numeric id"
                ),
            }
        }
        Ok(accounts)
    }

    /// Get positions in the legacy `account_value + positions` shape, keyed
    /// by the account id as a string.
    pub async fn get_legacy(&self) -> Result<BTreeMap<String, LegacyAccount>> {
        Ok(self
            .get()
            .await?
            .into_iter()
            .map(|(id, account)| (id.to_string(), account.to_legacy()))
            .collect())
    }
}
