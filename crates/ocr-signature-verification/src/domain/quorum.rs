//! # Quorum Verification
//!
//! Matches recovered signer addresses against an ordered signer set and
//! enforces the quorum threshold. Signer indices are collected into a
//! bitmask, so duplicate detection and cardinality checks are O(1).

use shared_types::{Address, Hash};
use tracing::debug;

use super::ecdsa::recover_address;
use super::entities::{EcdsaSignature, SignerSet};
use super::errors::VerifyError;

/// Authenticate a signature set against `signers`.
///
/// Every signature must recover to a distinct member of `signers`; the
/// result is accepted when the number of distinct signers reaches `quorum`.
/// Only the first [`SignerSet::CAPACITY`] entries of `signers` are
/// considered; an identity beyond that bound is treated as unknown.
/// Fails with:
///
/// - [`VerifyError::Signature`]: a signature is structurally invalid or
///   recovery fails;
/// - [`VerifyError::UnknownSigner`]: a signature recovers to an identity
///   outside `signers`;
/// - [`VerifyError::DuplicateSigner`]: the same identity recovers twice;
/// - [`VerifyError::QuorumNotMet`]: fewer distinct signers than `quorum`.
pub fn verify_quorum(
    message_hash: &Hash,
    signatures: &[EcdsaSignature],
    signers: &[Address],
    quorum: u8,
) -> Result<SignerSet, VerifyError> {
    let mut set = SignerSet::default();

    for signature in signatures {
        let address = recover_address(message_hash, signature)?;
        // Lookups are capped at the bitmask capacity; valid configurations
        // stay within the format's 31-reporter maximum, and an oversized
        // caller-supplied list must not overflow the index space.
        let index = signers
            .iter()
            .take(SignerSet::CAPACITY)
            .position(|signer| *signer == address)
            .ok_or(VerifyError::UnknownSigner { address })?;

        if !set.insert(index as u8) {
            return Err(VerifyError::DuplicateSigner { index: index as u8 });
        }
    }

    if set.len() < u32::from(quorum) {
        debug!(have = set.len(), need = quorum, "quorum not met");
        return Err(VerifyError::QuorumNotMet {
            have: set.len(),
            need: quorum,
        });
    }

    Ok(set)
}
