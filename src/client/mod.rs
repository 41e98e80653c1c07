//! HTTP client and service layer for the Schwab web platform.
//!
//! This module provides the main entry point [`SchwabClient`], its
//! configuration and the endpoint catalogue.
//!
//! # Example
//!
//! ```no_run
//! use schwab_web_rs::client::{ClientConfig, Endpoints, SchwabClient};
//! use std::time::Duration;
//!
//! # fn example() -> schwab_web_rs::Result<()> {
//! let config = ClientConfig::from_env()
//!     .with_timeout(Duration::from_secs(15))
//!     .with_endpoints(Endpoints::default());
//! let client = SchwabClient::new(config)?;
//! # Ok(())
//! # }
//! ```

mod config;
pub mod endpoints;
mod http;

pub use config::{
    ClientConfig, LoginConfig, Viewport, ACCOUNT_NUMBERS_ENV, BROWSER_USER_AGENT,
};
pub use endpoints::Endpoints;
pub use http::SchwabClient;
pub(crate) use http::ClientInner;
