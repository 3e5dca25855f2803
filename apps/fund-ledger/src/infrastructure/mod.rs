//! Infrastructure Layer
//!
//! Adapters for the ports defined in the application layer, following
//! hexagonal architecture:
//!
//! - **Driven Adapters (Outbound)**
//!   - `persistence/`: In-memory ledger and matched-pair stores
//!   - `gateway/`: Execution venue adapters (paper, HTTP) with retry
//!   - `market_data/`: NAV provider
//!   - `accounts/`: Investor to venue account directory
//!   - `messaging/`: Event publishing
//!
//! - **Wiring**
//!   - `config/`: Dependency injection container

pub mod accounts;
pub mod config;
pub mod gateway;
pub mod market_data;
pub mod messaging;
pub mod persistence;
