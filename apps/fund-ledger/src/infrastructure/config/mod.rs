//! Infrastructure Configuration
//!
//! Dependency wiring for the binary and integration tests.

mod container;

pub use container::{Container, LedgerContainer, LedgerSettings, build_container};
