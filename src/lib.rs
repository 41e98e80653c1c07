//! # schwab-web-rs
//!
//! An unofficial Rust client for the Schwab retail web platform.
//!
//! The platform's browser front end talks to a private REST gateway. This
//! crate logs in through a real browser once, captures the session the
//! front end uses, and then calls the gateway directly.
//!
//! ## Features
//!
//! - **Session capture**: browser login with optional TOTP, header
//!   interception and cookie collection behind a pluggable driver trait
//! - **Token refresh**: scoped bearer token refresh without a new login
//! - **Positions**: balances and holdings per account, plus the legacy
//!   `account_value + positions` shape
//! - **Trading**: market day orders through the two-phase verify/execute
//!   protocol, with dry-run support
//! - **Async-first**: built on Tokio and reqwest
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use schwab_web_rs::{ClientConfig, LoginCredentials, SchwabClient};
//! use schwab_web_rs::auth::BrowserLauncher;
//!
//! async fn run(browser: &dyn BrowserLauncher) -> schwab_web_rs::Result<()> {
//!     // SCHWAB=user:password:totpSecret, SCHWAB_ACCOUNT_NUMBERS=123:456
//!     let client = SchwabClient::new(ClientConfig::from_env())?;
//!     client.authenticate(browser, &LoginCredentials::from_env()?).await?;
//!
//!     let accounts = client.positions().get().await?;
//!     println!("Found {} accounts", accounts.len());
//!
//!     for (id, account) in client.positions().get_legacy().await? {
//!         println!("{id}: {:.2} in {} positions", account.account_value, account.positions.len());
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Order Placement
//!
//! ```rust,no_run
//! use schwab_web_rs::SchwabClient;
//!
//! async fn buy(client: &SchwabClient) -> schwab_web_rs::Result<()> {
//!     // Dry run first: verification only
//!     let check = client.orders().trade("AAPL", "Buy", 1.0, "12345678", true).await?;
//!     if !check.success {
//!         println!("Would be rejected: {:?}", check.messages);
//!         return Ok(());
//!     }
//!
//!     let outcome = client.orders().trade("AAPL", "Buy", 1.0, "12345678", false).await?;
//!     println!("Placed: {} {:?}", outcome.success, outcome.messages);
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]
#![deny(unsafe_code)]

pub mod api;
pub mod auth;
pub mod client;
pub mod error;
pub mod models;

// Re-export primary types at crate root for convenience
pub use error::{Error, Result};
pub use models::{AccountId, Symbol};
pub use client::{ClientConfig, SchwabClient};
pub use auth::{LoginCredentials, Session};

/// Prelude module for convenient imports.
///
/// ```rust
/// use schwab_web_rs::prelude::*;
/// ```
pub mod prelude {
    pub use crate::error::{Error, Result};
    pub use crate::models::{
        // Primitives
        AccountId, Symbol,
        // Enums
        OrderSide, OrderPhase, TokenScope,
        // Account models
        AccountSnapshot, AccountTotals, PositionGroup, HoldingRow, LegacyAccount,
        LegacyPosition,
        // Order models
        OrderIntent, OrderRequest, OrderResult, TradeOutcome,
    };
    pub use crate::client::{ClientConfig, Endpoints, LoginConfig, SchwabClient};
    pub use crate::auth::{
        BrowserLauncher, BrowserSession, CredentialBundle, LoginCredentials, Session,
    };
}
