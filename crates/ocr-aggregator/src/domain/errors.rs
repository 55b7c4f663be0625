//! # Engine Errors
//!
//! One taxonomy for every operation; all failures surface synchronously to
//! the caller and none mutate state.

use ocr_report_codec::ReportError;
use ocr_signature_verification::VerifyError;
use shared_types::Address;
use thiserror::Error;

use crate::ports::outbound::TransferError;

/// Engine-level failure.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AggregatorError {
    /// Codec-level structural violation in the submitted report.
    #[error("malformed report: {0}")]
    MalformedReport(#[from] ReportError),

    /// Signature, quorum or permission failure.
    #[error("unauthorized")]
    Unauthorized,

    /// The report's context does not match the active configuration epoch,
    /// or replays an already-committed report round.
    #[error("report context does not match the active configuration epoch")]
    StaleConfig,

    /// A signature recovered to an identity outside the active signer set.
    #[error("unknown signer")]
    UnknownSigner { address: Address },

    /// The same signer identity was recovered more than once.
    #[error("duplicate signer at index {index}")]
    DuplicateSigner { index: u8 },

    /// No configuration epoch has been installed yet.
    #[error("no active configuration")]
    NoActiveConfig,

    /// No payee registered for the transmitter.
    #[error("no payee registered")]
    NoPayee,

    /// The transmitter already has a payee and the caller is not it.
    #[error("payee already set for transmitter")]
    AlreadySet { transmitter: Address },

    /// A payee assignment names a transmitter outside the active set.
    #[error("unknown transmitter")]
    UnknownTransmitter { transmitter: Address },

    /// The external fee-token transfer failed; the ledger is unchanged.
    #[error("fee-token transfer failed: {0}")]
    TransferFailed(#[from] TransferError),

    /// Signer and transmitter lists differ in length.
    #[error("oracle set mismatch: {signers} signers, {transmitters} transmitters")]
    OracleSetMismatch { signers: usize, transmitters: usize },

    /// An installed configuration must name at least one oracle.
    #[error("empty oracle set")]
    EmptyOracleSet,

    /// More oracles than the format's index space allows.
    #[error("too many oracles: {count} (maximum {max})")]
    TooManyOracles { count: usize, max: usize },

    /// The same oracle identity appears twice in a submitted list (a new
    /// configuration's signers or transmitters, or a payee batch).
    #[error("duplicate oracle identity")]
    DuplicateOracle { address: Address },

    /// Configuration versions must be nonzero and strictly increasing.
    #[error("configuration version {version} does not supersede {current}")]
    NonMonotonicVersion { version: u64, current: u64 },

    /// The engine's quorum rule cannot be met by a set of this size.
    #[error("quorum of {required} unsatisfiable with {signers} signers")]
    QuorumUnsatisfiable { required: u8, signers: usize },

    /// Payee assignment lists differ in length.
    #[error("payee list mismatch: {transmitters} transmitters, {payees} payees")]
    PayeeListMismatch { transmitters: usize, payees: usize },
}

impl From<VerifyError> for AggregatorError {
    fn from(err: VerifyError) -> Self {
        match err {
            VerifyError::UnknownSigner { address } => AggregatorError::UnknownSigner { address },
            VerifyError::DuplicateSigner { index } => AggregatorError::DuplicateSigner { index },
            // Invalid signatures and missed quorums are both plain
            // authentication failures to the caller.
            VerifyError::QuorumNotMet { .. } | VerifyError::Signature(_) => {
                AggregatorError::Unauthorized
            }
        }
    }
}
