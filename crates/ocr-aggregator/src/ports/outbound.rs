//! # Outbound Ports
//!
//! The engine's two external collaborators: the fee-token ledger that
//! balances are paid from, and the access-control list that gates the
//! administrative surface.

use shared_types::Address;
use thiserror::Error;

/// Administrative operation, for per-operation access decisions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OperationTag {
    InstallConfig,
    SetBilling,
    SetPayees,
    RequestNewRound,
}

/// Fee-token transfer failure.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransferError {
    /// The engine's vault cannot cover the requested amount.
    #[error("insufficient funds: need {needed}, have {available}")]
    InsufficientFunds { needed: u64, available: u64 },

    /// The token backend refused the transfer.
    #[error("transfer rejected: {reason}")]
    Rejected { reason: String },
}

/// External fee-token ledger holding the engine's vault.
///
/// Implementations must be atomic per call: a returned error means no
/// balance moved.
pub trait FeeTokenGateway {
    /// Current balance of `holder` in fee-token units.
    fn balance_of(&self, holder: &Address) -> u64;

    /// Move `amount` from the engine's vault to `recipient`.
    fn transfer_to(&mut self, recipient: &Address, amount: u64) -> Result<(), TransferError>;

    /// Credit `amount` into the engine's vault on behalf of `depositor`.
    /// The funding side of the collaborator; the engine itself never calls
    /// this.
    fn deposit_for(&mut self, depositor: &Address, amount: u64) -> Result<(), TransferError>;
}

/// Access-control list over the administrative surface.
pub trait AccessGateway {
    /// Whether `caller` may perform `operation`.
    fn is_authorized(&self, caller: &Address, operation: OperationTag) -> bool;
}
