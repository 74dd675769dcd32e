//! Swap session coordinator
//!
//! Owns token price state, the derived conversion calculation, the periodic
//! price-refresh timer, and the swap-confirmation countdown, and exposes the
//! operations a presentation layer needs to drive a swap flow:
//!
//! - load/refresh prices from an external [`PriceSource`]
//! - select the token pair and input amount
//! - submit a swap, then confirm or cancel it
//!
//! All timers are owned by the coordinator instance and are torn down on
//! every exit path, including [`Drop`].

mod config;
mod coordinator;
mod settlement;
mod source;

pub use config::CoordinatorConfig;
pub use coordinator::{SessionSnapshot, SwapCoordinator};
pub use settlement::{Settlement, SimulatedSettlement};
pub use source::{HttpPriceSource, PriceSource};
