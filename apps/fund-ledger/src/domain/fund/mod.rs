//! Fund Bounded Context
//!
//! A fund is read-mostly from the ledger's point of view: the NAV belongs to
//! the market-data collaborator, and the ledger only maintains `total_units`
//! during settlement.

pub mod aggregate;

pub use aggregate::{Fund, NewFund};
