//! # Verification Errors

use shared_types::Address;
use thiserror::Error;

/// Failure while validating or recovering a single signature.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SignatureError {
    /// R or S is out of the valid scalar range, or the encoding is broken.
    #[error("invalid signature format")]
    InvalidFormat,

    /// High S value rejected per EIP-2.
    #[error("malleable signature (high S value)")]
    MalleableSignature,

    /// Recovery id is not 0, 1, 27 or 28.
    #[error("invalid recovery id: {0}")]
    InvalidRecoveryId(u8),

    /// Public-key recovery failed for the given digest and signature.
    #[error("failed to recover public key")]
    RecoveryFailed,
}

/// Failure while authenticating a signature set against a signer set.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum VerifyError {
    /// A signature recovered to an identity outside the active signer set.
    #[error("recovered signer {} is not in the active signer set", hex_address(.address))]
    UnknownSigner { address: Address },

    /// The same signer identity was recovered more than once.
    #[error("signer index {index} signed more than once")]
    DuplicateSigner { index: u8 },

    /// Fewer distinct known signers than the quorum threshold.
    #[error("quorum not met: {have} distinct signers, {need} required")]
    QuorumNotMet { have: u32, need: u8 },

    /// A signature failed structural validation or recovery.
    #[error(transparent)]
    Signature(#[from] SignatureError),
}

fn hex_address(address: &Address) -> String {
    let mut out = String::with_capacity(2 + address.len() * 2);
    out.push_str("0x");
    for byte in address {
        out.push_str(&format!("{byte:02x}"));
    }
    out
}
