//! Enumeration types and wire codes for the private order API.
//!
//! The order endpoint speaks in numeric codes. They are part of the
//! platform's schema and must be sent exactly as defined here.

use serde::{Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::Error;

/// Security type code for equities.
pub const SECURITY_TYPE_EQUITY: u32 = 46;
/// Order type code for a market order.
pub const ORDER_TYPE_MARKET: &str = "49";
/// Duration code for a day order.
pub const DURATION_DAY: &str = "48";
/// Order strategy type for a single-leg order.
pub const ORDER_STRATEGY_SINGLE: u32 = 1;
/// Cost basis method sent with every order.
pub const COST_BASIS_FIFO: &str = "FIFO";

/// Return codes the platform uses for an accepted order: 0 is success,
/// 10 is success with warnings.
pub const ACCEPTED_RETURN_CODES: [i32; 2] = [0, 10];

/// Returns `true` if an order return code means the platform accepted the
/// order. Every other value, negative ones included, is a rejection.
pub fn is_accepted_return_code(code: i32) -> bool {
    ACCEPTED_RETURN_CODES.contains(&code)
}

/// Side of an equity order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OrderSide {
    /// Buy shares
    Buy,
    /// Sell shares
    Sell,
}

impl OrderSide {
    /// The instruction code placed on the order leg.
    pub fn instruction_code(&self) -> &'static str {
        match self {
            OrderSide::Buy => "49",
            OrderSide::Sell => "50",
        }
    }

    /// The side's canonical name.
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderSide::Buy => "Buy",
            OrderSide::Sell => "Sell",
        }
    }
}

impl fmt::Display for OrderSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderSide {
    type Err = Error;

    /// Parse a side. Only the exact names `Buy` and `Sell` are accepted.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Buy" => Ok(OrderSide::Buy),
            "Sell" => Ok(OrderSide::Sell),
            _ => Err(Error::InvalidInput(
                "side must be 'Buy' or 'Sell'".to_string(),
            )),
        }
    }
}

/// Phase of the two-step order protocol.
///
/// Verification and execution go to the same URL; the phase travels in the
/// request body as `OrderProcessingControl`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OrderPhase {
    /// Validate the order and obtain server-assigned identifiers
    Verification,
    /// Commit the previously verified order
    Execution,
}

impl OrderPhase {
    /// The processing-control code sent on the wire.
    pub fn processing_control(&self) -> u8 {
        match self {
            OrderPhase::Verification => 1,
            OrderPhase::Execution => 2,
        }
    }
}

impl Serialize for OrderPhase {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(self.processing_control())
    }
}

impl fmt::Display for OrderPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrderPhase::Verification => f.write_str("verification"),
            OrderPhase::Execution => f.write_str("execution"),
        }
    }
}

/// Scope requested from the token-authorize endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenScope {
    /// Read access, used before positions requests
    Api,
    /// Trading access, used around order submission
    Update,
}

impl TokenScope {
    /// The scope as it appears in the URL path.
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenScope::Api => "api",
            TokenScope::Update => "update",
        }
    }
}

impl AsRef<str> for TokenScope {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for TokenScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
