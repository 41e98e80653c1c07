//! Primitive types and newtypes for type-safe API interactions.
//!
//! Strongly-typed wrappers around string identifiers so account ids and
//! ticker symbols cannot be swapped by accident.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A brokerage account identifier as the order API expects it.
///
/// # Example
///
/// ```
/// use schwab_web_rs::AccountId;
///
/// let account = AccountId::new("12345678");
/// println!("Account: {}", account);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccountId(String);

impl AccountId {
    /// Create a new account id from a string.
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Get the account id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns `true` if the id is empty or only whitespace.
    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for AccountId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<String> for AccountId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for AccountId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// A trading symbol (e.g., "AAPL", "SPY").
///
/// # Example
///
/// ```
/// use schwab_web_rs::Symbol;
///
/// let symbol = Symbol::new("AAPL");
/// assert_eq!(symbol.as_str(), "AAPL");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Symbol(String);

impl Symbol {
    /// Create a new symbol.
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Get the symbol as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for Symbol {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<String> for Symbol {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for Symbol {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_account_id() {
        let account = AccountId::new("12345678");
        assert_eq!(account.as_str(), "12345678");
        assert_eq!(account.to_string(), "12345678");
        assert!(!account.is_blank());
        assert!(AccountId::new("  ").is_blank());
    }

    #[test]
    fn test_symbol() {
        let symbol: Symbol = "AAPL".into();
        assert_eq!(symbol.as_str(), "AAPL");
    }

    #[test]
    fn test_account_id_serializes_transparently() {
        let json = serde_json::to_string(&AccountId::new("42")).unwrap();
        assert_eq!(json, "\"42\"");
    }
}
