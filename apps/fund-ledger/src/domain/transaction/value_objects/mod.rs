//! Transaction value objects.

mod exchange_destination;
mod transaction_state;
mod transaction_status;
mod transaction_type;

pub use exchange_destination::ExchangeDestination;
pub use transaction_state::TransactionState;
pub use transaction_status::TransactionStatus;
pub use transaction_type::TransactionType;
