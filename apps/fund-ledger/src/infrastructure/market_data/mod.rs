//! Market Data Adapters
//!
//! NAV lookups for price proposals.

mod static_nav;

pub use static_nav::StaticNavProvider;
