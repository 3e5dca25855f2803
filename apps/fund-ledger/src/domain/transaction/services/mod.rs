//! Transaction domain services.

mod state_machine;

pub use state_machine::TransactionStateMachine;
