//! Error handling at the ledger's API boundary.
//!
//! Domain and repository errors are folded into a single [`LedgerError`]
//! carrying a stable [`ErrorCode`] plus key/value context, so callers can
//! branch on the code without matching every inner enum.
//!
//! | Code | Raised when |
//! |------|-------------|
//! | `VALIDATION_ERROR` | Bad input: non-positive units/price, missing exchange destination |
//! | `INSUFFICIENT_UNITS` | Sell, exchange or cancel-reversal exceeds holdings |
//! | `INVALID_STATE_TRANSITION` | Operation on a transaction in the wrong state |
//! | `GATEWAY_UNAVAILABLE` | Dispatch call failed or timed out |
//! | `CONCURRENCY_CONFLICT` | Unit of work could not be serialized after retries |
//! | `NOT_FOUND` | Transaction, fund or pair does not exist |
//! | `ACCOUNT_NOT_MAPPED` | No venue account for the investor |
//! | `SERVICE_UNAVAILABLE` | NAV provider or account directory unreachable |
//! | `STORAGE_ERROR` | Repository backend failure |

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::application::ports::{AccountDirectoryError, NavError};
use crate::domain::matching::MatchingError;
use crate::domain::position::PositionError;
use crate::domain::pricing::PricingError;
use crate::domain::shared::{DomainError, RepositoryError};
use crate::domain::transaction::TransactionError;

/// Error codes exposed to collaborators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Bad input.
    ValidationError,
    /// Holdings cannot cover the operation.
    InsufficientUnits,
    /// Transaction is in the wrong state.
    InvalidStateTransition,
    /// Execution venue unreachable or timed out.
    GatewayUnavailable,
    /// Unit of work lost an optimistic-concurrency race too many times.
    ConcurrencyConflict,
    /// Entity not found.
    NotFound,
    /// Investor has no venue account.
    AccountNotMapped,
    /// A read-side collaborator (NAV, account directory) is unreachable.
    ServiceUnavailable,
    /// Storage backend failure.
    StorageError,
}

impl ErrorCode {
    /// Stable reason string.
    #[must_use]
    pub const fn reason(&self) -> &'static str {
        match self {
            Self::ValidationError => "VALIDATION_ERROR",
            Self::InsufficientUnits => "INSUFFICIENT_UNITS",
            Self::InvalidStateTransition => "INVALID_STATE_TRANSITION",
            Self::GatewayUnavailable => "GATEWAY_UNAVAILABLE",
            Self::ConcurrencyConflict => "CONCURRENCY_CONFLICT",
            Self::NotFound => "NOT_FOUND",
            Self::AccountNotMapped => "ACCOUNT_NOT_MAPPED",
            Self::ServiceUnavailable => "SERVICE_UNAVAILABLE",
            Self::StorageError => "STORAGE_ERROR",
        }
    }

    /// Returns true if the caller may retry the same request unchanged.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::GatewayUnavailable | Self::ConcurrencyConflict | Self::ServiceUnavailable
        )
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.reason())
    }
}

/// A ledger error with code and context.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("[{code}] {message}")]
pub struct LedgerError {
    code: ErrorCode,
    message: String,
    context: Vec<(String, String)>,
}

impl LedgerError {
    /// Create a new ledger error.
    #[must_use]
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            context: Vec::new(),
        }
    }

    /// Add context to the error.
    #[must_use]
    pub fn with_context(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.context.push((key.into(), value.into()));
        self
    }

    /// Get the error code.
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        self.code
    }

    /// Get the message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Get the context.
    #[must_use]
    pub fn context(&self) -> &[(String, String)] {
        &self.context
    }

    /// Look up a context value.
    #[must_use]
    pub fn context_value(&self, key: &str) -> Option<&str> {
        self.context
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

/// Convenience constructors for common errors.
impl LedgerError {
    /// Invalid input.
    #[must_use]
    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ValidationError, message)
    }

    /// Entity not found.
    #[must_use]
    pub fn not_found(entity: &str, id: &str) -> Self {
        Self::new(ErrorCode::NotFound, format!("{entity} {id} not found"))
            .with_context("entity", entity)
            .with_context("id", id)
    }

    /// Execution venue unavailable.
    #[must_use]
    pub fn gateway_unavailable(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::GatewayUnavailable, message)
    }

    /// Investor has no venue account.
    #[must_use]
    pub fn account_not_mapped(investor: &str) -> Self {
        Self::new(
            ErrorCode::AccountNotMapped,
            format!("No execution account mapped for investor {investor}"),
        )
        .with_context("investor", investor)
    }

    /// Optimistic-concurrency retries exhausted.
    #[must_use]
    pub fn concurrency_conflict(attempts: u32) -> Self {
        Self::new(
            ErrorCode::ConcurrencyConflict,
            format!("Unit of work conflicted {attempts} times; retry the request"),
        )
        .with_context("attempts", attempts.to_string())
    }

    /// Storage failure.
    #[must_use]
    pub fn storage(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::StorageError, message)
    }
}

impl From<PositionError> for LedgerError {
    fn from(e: PositionError) -> Self {
        let code = match &e {
            PositionError::InsufficientUnits { .. }
            | PositionError::CostBasisUnderflow { .. }
            | PositionError::FundUnitsUnderflow { .. } => ErrorCode::InsufficientUnits,
            PositionError::UnknownFund { .. } => ErrorCode::NotFound,
            PositionError::InvalidInput { .. } => ErrorCode::ValidationError,
        };
        let error = Self::new(code, e.to_string());
        match e {
            PositionError::InsufficientUnits {
                investor,
                fund,
                requested,
                available,
            } => error
                .with_context("investor", investor)
                .with_context("fund", fund)
                .with_context("requested", requested)
                .with_context("available", available),
            PositionError::CostBasisUnderflow { investor, fund, .. } => error
                .with_context("investor", investor)
                .with_context("fund", fund),
            PositionError::FundUnitsUnderflow { fund, .. }
            | PositionError::UnknownFund { fund } => error.with_context("fund", fund),
            PositionError::InvalidInput { field, .. } => error.with_context("field", field),
        }
    }
}

impl From<TransactionError> for LedgerError {
    fn from(e: TransactionError) -> Self {
        match e {
            TransactionError::InvalidParameters { ref field, .. } => {
                let field = field.clone();
                Self::validation(e.to_string()).with_context("field", field)
            }
            TransactionError::InvalidStateTransition {
                ref transaction_id,
                from,
                to,
                ..
            } => {
                let id = transaction_id.clone();
                Self::new(ErrorCode::InvalidStateTransition, e.to_string())
                    .with_context("transaction_id", id)
                    .with_context("from", from.to_string())
                    .with_context("to", to.to_string())
            }
            TransactionError::Ledger(inner) => inner.into(),
        }
    }
}

impl From<RepositoryError> for LedgerError {
    fn from(e: RepositoryError) -> Self {
        match &e {
            RepositoryError::Conflict { entity, id, .. } => {
                let (entity, id) = (entity.clone(), id.clone());
                Self::new(ErrorCode::ConcurrencyConflict, e.to_string())
                    .with_context("entity", entity)
                    .with_context("id", id)
            }
            RepositoryError::NotFound { entity, id } => Self::not_found(entity, id),
            RepositoryError::Duplicate { .. }
            | RepositoryError::Constraint(_)
            | RepositoryError::Storage(_) => Self::storage(e.to_string()),
        }
    }
}

impl From<MatchingError> for LedgerError {
    fn from(e: MatchingError) -> Self {
        let code = match e {
            MatchingError::AlreadySent { .. } => ErrorCode::InvalidStateTransition,
            MatchingError::InvalidQuantity { .. } | MatchingError::FundMismatch { .. } => {
                ErrorCode::ValidationError
            }
        };
        Self::new(code, e.to_string())
    }
}

impl From<NavError> for LedgerError {
    fn from(e: NavError) -> Self {
        match e {
            NavError::NotFound { ref fund } => {
                let fund = fund.clone();
                Self::new(ErrorCode::NotFound, e.to_string()).with_context("fund", fund)
            }
            NavError::Unavailable { .. } => {
                Self::new(ErrorCode::ServiceUnavailable, e.to_string())
            }
        }
    }
}

impl From<AccountDirectoryError> for LedgerError {
    fn from(e: AccountDirectoryError) -> Self {
        Self::new(ErrorCode::ServiceUnavailable, e.to_string())
    }
}

impl From<DomainError> for LedgerError {
    fn from(e: DomainError) -> Self {
        Self::validation(e.to_string())
    }
}

impl From<PricingError> for LedgerError {
    fn from(e: PricingError) -> Self {
        Self::validation(e.to_string())
    }
}
