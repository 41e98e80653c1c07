//! Data models for the Schwab web API.
//!
//! Models are organized by domain:
//!
//! - [`primitives`] - Core types like `AccountId` and `Symbol`
//! - [`enums`] - Order sides, phases, token scopes and wire codes
//! - [`account`] - Account snapshots and the legacy position shape
//! - [`order`] - Order intents, typed request bodies and results

pub mod primitives;
pub mod enums;
pub mod account;
pub mod order;

// Re-export commonly used types
pub use primitives::*;
pub use enums::*;
pub use account::*;
pub use order::*;
