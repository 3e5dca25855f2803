//! Domain Layer
//!
//! The innermost layer containing business logic with zero infrastructure dependencies.
//! This layer defines:
//!
//! - **Aggregates**: Consistency boundaries with invariants
//! - **Value Objects**: Immutable domain types with equality by value
//! - **Domain Events**: Records of state transitions
//! - **Domain Services**: Stateless business logic
//! - **Repository Traits**: Persistence abstractions (implemented in adapters)
//!
//! # Bounded Contexts
//!
//! - [`pricing`]: Price rounding and tiered fee computation
//! - [`fund`]: Fund aggregate (NAV view and unit totals)
//! - [`position`]: Investor holdings with weighted-average cost
//! - [`transaction`]: Transaction lifecycle (pending → completed → cancelled)
//! - [`matching`]: FIFO pairing of opposing pending orders

pub mod fund;
pub mod matching;
pub mod position;
pub mod pricing;
pub mod shared;
pub mod transaction;
