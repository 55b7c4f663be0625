//! # Engine Events
//!
//! Emitted on every successful state transition and buffered inside the
//! engine until drained with [`crate::Aggregator::take_events`]. Rejected
//! operations emit nothing.

use serde::{Deserialize, Serialize};

use ocr_report_codec::AggregateAnswer;
use shared_types::{Address, ConfigDigest};

use crate::domain::entities::BillingParams;

/// Observable state transition.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum AggregatorEvent {
    /// A new configuration epoch became active.
    ConfigInstalled {
        digest: ConfigDigest,
        version: u64,
        epoch: u32,
    },
    /// An authorized caller asked for an extra round.
    RoundRequested { requester: Address, round_id: u64 },
    /// A report passed the full pipeline and was committed.
    NewRound {
        round_id: u64,
        answer: AggregateAnswer,
        transmitter: Address,
    },
    /// Billing parameters were replaced.
    BillingUpdated { params: BillingParams },
    /// An accrued balance was paid out and zeroed.
    PaymentWithdrawn {
        transmitter: Address,
        payee: Address,
        amount: u64,
    },
}
