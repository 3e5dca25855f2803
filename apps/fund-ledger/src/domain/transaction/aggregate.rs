//! Transaction Aggregate Root
//!
//! A transaction records one purchase, sell or exchange request and drives
//! the position ledger when it settles or is cancelled.

use serde::{Deserialize, Serialize};

use super::errors::TransactionError;
use super::events::{
    TransactionCancelled, TransactionCompleted, TransactionEvent, TransactionSubmitted,
};
use super::services::TransactionStateMachine;
use super::value_objects::{
    ExchangeDestination, TransactionState, TransactionStatus, TransactionType,
};
use crate::domain::position::{PositionKey, PositionLedger};
use crate::domain::pricing::FeeSchedule;
use crate::domain::shared::{FundId, InvestorId, Money, Timestamp, TransactionId, Units};

/// Command to submit a new transaction.
#[derive(Debug, Clone)]
pub struct SubmitTransactionCommand {
    /// Acting investor, supplied by the identity collaborator.
    pub investor: InvestorId,
    /// Source fund.
    pub fund: FundId,
    /// Transaction type.
    pub transaction_type: TransactionType,
    /// Units bought, sold or exchanged out.
    pub units: Units,
    /// Price per source unit.
    pub price_per_unit: Money,
    /// Destination leg (exchange only).
    pub destination: Option<ExchangeDestination>,
    /// Reference to the signed subscription document, carried with the
    /// transaction itself.
    pub document_reference: Option<String>,
}

impl SubmitTransactionCommand {
    /// Validate the command parameters.
    ///
    /// # Errors
    ///
    /// Returns error if units or prices are not positive, or the exchange
    /// destination is missing, malformed or present on a non-exchange.
    pub fn validate(&self) -> Result<(), TransactionError> {
        self.units
            .validate_positive("units")
            .map_err(|e| TransactionError::invalid("units", e.to_string()))?;
        self.price_per_unit
            .validate_positive("price_per_unit")
            .map_err(|e| TransactionError::invalid("price_per_unit", e.to_string()))?;

        match (&self.destination, self.transaction_type.requires_destination()) {
            (None, true) => Err(TransactionError::invalid(
                "destination",
                "exchange requires a destination fund and pricing",
            )),
            (Some(_), false) => Err(TransactionError::invalid(
                "destination",
                format!("{} must not carry a destination", self.transaction_type),
            )),
            (Some(dest), true) => {
                if dest.fund == self.fund {
                    return Err(TransactionError::invalid(
                        "destination.fund",
                        "must differ from the source fund",
                    ));
                }
                dest.units
                    .validate_positive("destination.units")
                    .map_err(|e| TransactionError::invalid("destination.units", e.to_string()))?;
                dest.price_per_unit
                    .validate_positive("destination.price_per_unit")
                    .map_err(|e| {
                        TransactionError::invalid("destination.price_per_unit", e.to_string())
                    })?;
                dest.amount()
                    .map_err(|e| TransactionError::invalid("destination.amount", e.to_string()))?;
                Ok(())
            }
            (None, false) => Ok(()),
        }
    }
}

/// Parameters for reconstituting a Transaction from storage.
///
/// No domain events are generated during reconstitution.
#[derive(Debug, Clone)]
pub struct ReconstitutedTransactionParams {
    /// Transaction ID.
    pub id: TransactionId,
    /// Investor.
    pub investor: InvestorId,
    /// Source fund.
    pub fund: FundId,
    /// Transaction type.
    pub transaction_type: TransactionType,
    /// Units.
    pub units: Units,
    /// Price per unit.
    pub price_per_unit: Money,
    /// Recorded amount.
    pub amount: Money,
    /// Recorded fee.
    pub fee: Money,
    /// Exchange destination.
    pub destination: Option<ExchangeDestination>,
    /// Signed document reference.
    pub document_reference: Option<String>,
    /// Current state.
    pub state: TransactionState,
    /// Creation timestamp.
    pub created_at: Timestamp,
    /// Last update timestamp.
    pub updated_at: Timestamp,
}

/// Transaction Aggregate Root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    id: TransactionId,
    investor: InvestorId,
    fund: FundId,
    transaction_type: TransactionType,
    units: Units,
    price_per_unit: Money,
    amount: Money,
    fee: Money,
    destination: Option<ExchangeDestination>,
    document_reference: Option<String>,
    state: TransactionState,
    #[serde(skip)]
    events: Vec<TransactionEvent>,
    created_at: Timestamp,
    updated_at: Timestamp,
}

impl Transaction {
    /// Submit a new pending transaction.
    ///
    /// Amount and fee are computed here, rounded once, and never recomputed.
    /// Generates a `Submitted` event.
    ///
    /// # Errors
    ///
    /// Returns error if command validation fails.
    pub fn submit(
        cmd: SubmitTransactionCommand,
        fees: &FeeSchedule,
    ) -> Result<Self, TransactionError> {
        Self::submit_at(cmd, fees, Timestamp::now())
    }

    /// Submit with an explicit creation time.
    ///
    /// # Errors
    ///
    /// Returns error if command validation fails.
    pub fn submit_at(
        cmd: SubmitTransactionCommand,
        fees: &FeeSchedule,
        created_at: Timestamp,
    ) -> Result<Self, TransactionError> {
        cmd.validate()?;

        let amount = cmd
            .units
            .value_at(cmd.price_per_unit)
            .map_err(|e| TransactionError::invalid("amount", e.to_string()))?;
        let fee = fees
            .tiered_fee(amount)
            .map_err(|e| TransactionError::invalid("amount", e.to_string()))?;
        let id = TransactionId::generate();

        let mut transaction = Self {
            id: id.clone(),
            investor: cmd.investor.clone(),
            fund: cmd.fund.clone(),
            transaction_type: cmd.transaction_type,
            units: cmd.units,
            price_per_unit: cmd.price_per_unit,
            amount,
            fee,
            destination: cmd.destination,
            document_reference: cmd.document_reference,
            state: TransactionState::Pending,
            events: Vec::new(),
            created_at,
            updated_at: created_at,
        };

        transaction
            .events
            .push(TransactionEvent::Submitted(TransactionSubmitted {
                transaction_id: id,
                investor: cmd.investor,
                fund: cmd.fund,
                transaction_type: cmd.transaction_type,
                units: cmd.units,
                amount,
                fee,
                occurred_at: created_at,
            }));

        Ok(transaction)
    }

    /// Reconstitute a transaction from stored state (no events generated).
    #[must_use]
    pub fn reconstitute(params: ReconstitutedTransactionParams) -> Self {
        Self {
            id: params.id,
            investor: params.investor,
            fund: params.fund,
            transaction_type: params.transaction_type,
            units: params.units,
            price_per_unit: params.price_per_unit,
            amount: params.amount,
            fee: params.fee,
            destination: params.destination,
            document_reference: params.document_reference,
            state: params.state,
            events: Vec::new(),
            created_at: params.created_at,
            updated_at: params.updated_at,
        }
    }

    // ========================================================================
    // Getters
    // ========================================================================

    /// Get the transaction ID.
    #[must_use]
    pub const fn id(&self) -> &TransactionId {
        &self.id
    }

    /// Get the investor.
    #[must_use]
    pub const fn investor(&self) -> &InvestorId {
        &self.investor
    }

    /// Get the source fund.
    #[must_use]
    pub const fn fund(&self) -> &FundId {
        &self.fund
    }

    /// Get the transaction type.
    #[must_use]
    pub const fn transaction_type(&self) -> TransactionType {
        self.transaction_type
    }

    /// Get the units.
    #[must_use]
    pub const fn units(&self) -> Units {
        self.units
    }

    /// Get the price per unit.
    #[must_use]
    pub const fn price_per_unit(&self) -> Money {
        self.price_per_unit
    }

    /// Get the recorded amount, `units × price_per_unit` rounded to 2 dp.
    #[must_use]
    pub const fn amount(&self) -> Money {
        self.amount
    }

    /// Get the fee recorded at submission.
    #[must_use]
    pub const fn fee(&self) -> Money {
        self.fee
    }

    /// Get the exchange destination.
    #[must_use]
    pub const fn destination(&self) -> Option<&ExchangeDestination> {
        self.destination.as_ref()
    }

    /// Get the signed document reference.
    #[must_use]
    pub fn document_reference(&self) -> Option<&str> {
        self.document_reference.as_deref()
    }

    /// Get the state.
    #[must_use]
    pub const fn state(&self) -> &TransactionState {
        &self.state
    }

    /// Get the status.
    #[must_use]
    pub const fn status(&self) -> TransactionStatus {
        self.state.status()
    }

    /// Returns true while the transaction is pending.
    #[must_use]
    pub const fn is_pending(&self) -> bool {
        matches!(self.state, TransactionState::Pending)
    }

    /// Get the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> Timestamp {
        self.created_at
    }

    /// Get the last update timestamp.
    #[must_use]
    pub const fn updated_at(&self) -> Timestamp {
        self.updated_at
    }

    /// Positions this transaction touches when it settles.
    #[must_use]
    pub fn position_keys(&self) -> Vec<PositionKey> {
        let mut keys = vec![PositionKey::new(self.investor.clone(), self.fund.clone())];
        if let Some(dest) = &self.destination {
            keys.push(PositionKey::new(self.investor.clone(), dest.fund.clone()));
        }
        keys
    }

    /// Funds this transaction touches when it settles.
    #[must_use]
    pub fn fund_ids(&self) -> Vec<FundId> {
        let mut funds = vec![self.fund.clone()];
        if let Some(dest) = &self.destination {
            funds.push(dest.fund.clone());
        }
        funds
    }

    // ========================================================================
    // State Transitions
    // ========================================================================

    /// Settle the transaction against the ledger.
    ///
    /// Generates a `Completed` event.
    ///
    /// # Errors
    ///
    /// Returns `InvalidStateTransition` unless pending, or the ledger error if
    /// the position cannot absorb the effect. The ledger is untouched on error.
    pub fn complete(&mut self, ledger: &mut PositionLedger) -> Result<(), TransactionError> {
        TransactionStateMachine::validate_transition(
            self.id.as_str(),
            self.status(),
            TransactionStatus::Completed,
        )?;

        let effect = match self.transaction_type {
            TransactionType::Purchase => {
                ledger
                    .apply_purchase(&self.investor, &self.fund, self.units, self.amount)?
                    .1
            }
            TransactionType::Sell => ledger.apply_sell(&self.investor, &self.fund, self.units)?.1,
            TransactionType::Exchange => {
                let dest = self.destination.as_ref().ok_or_else(|| {
                    TransactionError::invalid("destination", "exchange has no destination")
                })?;
                let dest_amount = dest
                    .amount()
                    .map_err(|e| TransactionError::invalid("destination.amount", e.to_string()))?;
                ledger
                    .apply_exchange(
                        &self.investor,
                        &self.fund,
                        self.units,
                        &dest.fund,
                        dest.units,
                        dest_amount,
                    )?
                    .2
            }
        };

        let now = Timestamp::now();
        self.state = TransactionState::Completed {
            effect,
            completed_at: now,
        };
        self.updated_at = now;

        self.events
            .push(TransactionEvent::Completed(TransactionCompleted {
                transaction_id: self.id.clone(),
                investor: self.investor.clone(),
                fund: self.fund.clone(),
                transaction_type: self.transaction_type,
                units: self.units,
                occurred_at: now,
            }));

        Ok(())
    }

    /// Cancel the transaction.
    ///
    /// A pending transaction is cancelled with no ledger effect. A completed
    /// one replays the inverse of its recorded effect first. Generates a
    /// `Cancelled` event.
    ///
    /// # Errors
    ///
    /// Returns `InvalidStateTransition` if already cancelled, or the ledger
    /// error if the reversal would drive a position negative.
    pub fn cancel(&mut self, ledger: &mut PositionLedger) -> Result<(), TransactionError> {
        TransactionStateMachine::validate_transition(
            self.id.as_str(),
            self.status(),
            TransactionStatus::Cancelled,
        )?;

        let reversal = match &self.state {
            TransactionState::Completed { effect, .. } => {
                ledger.reverse(effect)?;
                Some(effect.inverse())
            }
            _ => None,
        };

        let now = Timestamp::now();
        let reversed = reversal.is_some();
        self.state = TransactionState::Cancelled {
            reversal,
            cancelled_at: now,
        };
        self.updated_at = now;

        self.events
            .push(TransactionEvent::Cancelled(TransactionCancelled {
                transaction_id: self.id.clone(),
                investor: self.investor.clone(),
                fund: self.fund.clone(),
                reversed,
                occurred_at: now,
            }));

        Ok(())
    }

    // ========================================================================
    // Events
    // ========================================================================

    /// Drain accumulated domain events.
    pub fn drain_events(&mut self) -> Vec<TransactionEvent> {
        std::mem::take(&mut self.events)
    }

    /// Get pending events without draining.
    #[must_use]
    pub fn pending_events(&self) -> &[TransactionEvent] {
        &self.events
    }
}
