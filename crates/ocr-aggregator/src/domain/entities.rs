//! # Engine Entities
//!
//! Configuration epochs, committed rounds and the per-reporter ledger.
//! Signers, transmitters and ledger entries share one index space: position
//! `i` in each parallel list refers to the same oracle.

use serde::{Deserialize, Serialize};
use serde_with::{serde_as, Bytes};

use ocr_report_codec::{AggregateAnswer, Observation, MAX_OBSERVERS};
use ocr_signature_verification::QuorumRule;
use shared_types::{Address, ConfigDigest};

/// Maximum oracle count per configuration; bounded by the report format's
/// observer index space.
pub const MAX_ORACLES: usize = MAX_OBSERVERS;

/// One configuration epoch: who may sign, who may transmit, and the digest
/// that reports must echo while this epoch is active.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OracleConfig {
    /// Deployment-supplied configuration version; strictly increasing.
    pub version: u64,
    /// Install counter, starting at 1 for the first install.
    pub epoch: u32,
    /// Authentication identities, parallel to `transmitters`.
    pub signers: Vec<Address>,
    /// Submission identities, parallel to `signers`.
    pub transmitters: Vec<Address>,
    /// Opaque configuration bytes passed through to consumers.
    pub encoded_extra: Vec<u8>,
    /// Deterministic fingerprint of this epoch.
    pub digest: ConfigDigest,
    /// Distinct-signer quorum resolved from the engine's [`QuorumRule`].
    pub quorum: u8,
}

impl OracleConfig {
    /// Index of `transmitter` in the shared oracle index space.
    pub fn transmitter_index(&self, transmitter: &Address) -> Option<usize> {
        self.transmitters.iter().position(|t| t == transmitter)
    }
}

/// One committed, quorum-authenticated round.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Round {
    /// Engine-assigned round id; increments by one per accepted report.
    pub round_id: u64,
    /// Round id carried by the report itself; strictly increasing across
    /// commits, acts as the replay counter.
    pub report_round_id: u64,
    /// The aggregated answer of record.
    pub answer: AggregateAnswer,
    /// Reporter indices credited with this round.
    pub observer_order: Vec<u8>,
    /// Per-reporter observations, parallel to `observer_order`.
    pub observations: Vec<Observation>,
    /// The transmitter that submitted the accepted report.
    pub transmitter: Address,
}

/// Per-oracle ledger slot, index-parallel with the active configuration.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OracleLedger {
    /// Rounds this oracle has been credited with, per the credit policy.
    pub observation_count: u32,
    /// Accrued fee-token units not yet withdrawn.
    pub owed_payment: u64,
    /// Withdrawal destination; settable once, replaceable only by itself.
    pub payee: Option<Address>,
}

/// Unpaid balance of a transmitter removed by reconfiguration. Stays
/// withdrawable under the same payee rules as an active slot.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeftoverPayment {
    pub transmitter: Address,
    pub payee: Option<Address>,
    pub amount: u64,
}

/// Fee parameters read on every successful transmission.
///
/// Mirrors the original deployment's constructor arguments (maximum and
/// reasonable gas price, micro-fee-token per native unit, fee units per
/// observation and per transmission).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BillingParams {
    pub maximum_gas_price: u64,
    pub reasonable_gas_price: u64,
    pub micro_fee_token_per_native_unit: u64,
    pub fee_units_per_observation: u64,
    pub fee_units_per_transmission: u64,
}

/// Who earns observation credit for a committed round.
///
/// Kept configurable: the available evidence is ambiguous on whether credit
/// accrues to the submitter alone or to every reporter named in the
/// observer order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum CreditPolicy {
    /// Only the submitting transmitter's count advances.
    SubmitterOnly,
    /// Every index in the observer order advances, plus the submitter.
    ObserverSet,
}

/// Deployment-time engine settings.
#[serde_as]
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineSettings {
    /// Instance-identifying salt folded into every config digest, so two
    /// deployments never produce colliding digests.
    #[serde_as(as = "Bytes")]
    pub instance_salt: [u8; 32],
    /// Quorum threshold policy, fixed for the engine's lifetime.
    pub quorum_rule: QuorumRule,
    /// Observation-credit attribution.
    pub credit_policy: CreditPolicy,
    /// Initial billing parameters.
    pub billing: BillingParams,
}
