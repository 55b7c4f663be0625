//! # In-Memory Port Adapters
//!
//! A single-process fee-token ledger and an allow-list keyed by caller and
//! operation. Both support the failure injection the engine's atomicity
//! tests need.

use std::collections::{HashMap, HashSet};

use shared_types::Address;

use crate::ports::outbound::{AccessGateway, FeeTokenGateway, OperationTag, TransferError};

/// Fee-token ledger backed by a hash map, with one vault balance for the
/// engine and per-recipient balances for payouts.
#[derive(Debug, Default)]
pub struct MemoryFeeToken {
    vault: u64,
    balances: HashMap<Address, u64>,
    fail_next: Option<String>,
}

impl MemoryFeeToken {
    /// Create a ledger whose vault already holds `funding` units.
    pub fn funded(funding: u64) -> Self {
        MemoryFeeToken {
            vault: funding,
            ..Default::default()
        }
    }

    /// Vault balance available for payouts.
    pub fn vault_balance(&self) -> u64 {
        self.vault
    }

    /// Make the next transfer fail with [`TransferError::Rejected`].
    pub fn fail_next_transfer(&mut self, reason: impl Into<String>) {
        self.fail_next = Some(reason.into());
    }
}

impl FeeTokenGateway for MemoryFeeToken {
    fn balance_of(&self, holder: &Address) -> u64 {
        self.balances.get(holder).copied().unwrap_or(0)
    }

    fn transfer_to(&mut self, recipient: &Address, amount: u64) -> Result<(), TransferError> {
        if let Some(reason) = self.fail_next.take() {
            return Err(TransferError::Rejected { reason });
        }
        if amount > self.vault {
            return Err(TransferError::InsufficientFunds {
                needed: amount,
                available: self.vault,
            });
        }
        self.vault -= amount;
        *self.balances.entry(*recipient).or_default() += amount;
        Ok(())
    }

    fn deposit_for(&mut self, _depositor: &Address, amount: u64) -> Result<(), TransferError> {
        self.vault = self.vault.saturating_add(amount);
        Ok(())
    }
}

/// Allow-list over the administrative surface.
///
/// Either wide open (every caller authorized for everything) or closed with
/// explicit per-caller, per-operation grants.
#[derive(Debug)]
pub struct AccessRegistry {
    open: bool,
    grants: HashSet<(Address, OperationTag)>,
}

impl AccessRegistry {
    /// Registry that authorizes everyone for everything.
    pub fn allow_all() -> Self {
        AccessRegistry {
            open: true,
            grants: HashSet::new(),
        }
    }

    /// Registry that authorizes nobody until granted.
    pub fn closed() -> Self {
        AccessRegistry {
            open: false,
            grants: HashSet::new(),
        }
    }

    /// Grant `caller` the right to perform `operation`.
    pub fn grant(&mut self, caller: Address, operation: OperationTag) {
        self.grants.insert((caller, operation));
    }
}

impl AccessGateway for AccessRegistry {
    fn is_authorized(&self, caller: &Address, operation: OperationTag) -> bool {
        self.open || self.grants.contains(&(*caller, operation))
    }
}
