//! API service modules for the Schwab web platform.
//!
//! Each service provides methods for one area of the platform's private
//! REST gateway.

mod orders;
mod positions;

pub use orders::OrdersService;
pub use positions::PositionsService;
