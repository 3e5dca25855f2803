//! Application Layer
//!
//! The application layer orchestrates domain logic through use cases.
//! It defines:
//!
//! - **Ports**: Interfaces for the execution venue, market data, account
//!   directory and event sinks
//! - **Use Cases**: Submit, settle, match, dispatch and query
//! - **Services**: The periodic matching scheduler

pub mod ports;
pub mod services;
pub mod use_cases;

pub use ports::*;
pub use services::*;
pub use use_cases::*;
