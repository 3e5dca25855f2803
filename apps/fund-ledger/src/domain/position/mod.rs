//! Position Bounded Context
//!
//! Investor holdings per fund, tracked at weighted-average cost.
//!
//! # Key Concepts
//!
//! - **Position**: `units` and cost-basis `amount` for one investor in one
//!   fund; `average_price` is derived on read
//! - **Ledger effect**: The exact signed deltas a settlement applied. A
//!   cancellation replays the inverse of the recorded deltas, so reversal
//!   never re-derives (and never re-rounds) a cost
//! - **Position ledger**: A working set of positions and funds. Every
//!   operation validates all of its deltas before writing any of them

pub mod effect;
pub mod errors;
pub mod ledger;
pub mod position;

pub use effect::{LedgerEffect, PositionDelta};
pub use errors::PositionError;
pub use ledger::PositionLedger;
pub use position::{Position, PositionKey};
