//! # Configuration Validation and Digest Derivation
//!
//! A configuration epoch is fingerprinted by a 16-byte digest over the full
//! install: instance salt, epoch counter, version, both identity lists and
//! the opaque extra bytes. Any change to any input yields a different digest,
//! so a report carrying a digest binds itself to exactly one install on
//! exactly one engine instance.

use sha3::{Digest, Keccak256};

use shared_types::{Address, ConfigDigest, DIGEST_SIZE};

use super::entities::MAX_ORACLES;
use super::errors::AggregatorError;

/// Domain separator folded into every digest preimage.
const DIGEST_TAG: &[u8] = b"ocr-config-digest-v1";

/// Digest prefix identifying the derivation scheme.
const DIGEST_PREFIX: [u8; 2] = [0x00, 0x04];

/// Validate a candidate oracle set before install.
///
/// Signers and transmitters must be parallel lists of equal, nonzero length
/// within the format's index space, and no identity may appear twice within
/// either list.
pub fn validate_oracle_set(
    signers: &[Address],
    transmitters: &[Address],
) -> Result<(), AggregatorError> {
    if signers.len() != transmitters.len() {
        return Err(AggregatorError::OracleSetMismatch {
            signers: signers.len(),
            transmitters: transmitters.len(),
        });
    }
    if signers.is_empty() {
        return Err(AggregatorError::EmptyOracleSet);
    }
    if signers.len() > MAX_ORACLES {
        return Err(AggregatorError::TooManyOracles {
            count: signers.len(),
            max: MAX_ORACLES,
        });
    }

    for list in [signers, transmitters] {
        for (i, address) in list.iter().enumerate() {
            if list[..i].contains(address) {
                return Err(AggregatorError::DuplicateOracle { address: *address });
            }
        }
    }

    Ok(())
}

/// Derive the configuration digest for an install.
///
/// Keccak-256 over a length-framed preimage, truncated to [`DIGEST_SIZE`]
/// bytes with the two leading bytes replaced by the scheme prefix.
pub fn derive_digest(
    instance_salt: &[u8; 32],
    epoch: u32,
    version: u64,
    signers: &[Address],
    transmitters: &[Address],
    encoded_extra: &[u8],
) -> ConfigDigest {
    let mut hasher = Keccak256::new();
    hasher.update(DIGEST_TAG);
    hasher.update(instance_salt);
    hasher.update(epoch.to_be_bytes());
    hasher.update(version.to_be_bytes());

    // Oracle count frames the identity lists; lists are parallel so one
    // count covers both.
    hasher.update([signers.len() as u8]);
    for signer in signers {
        hasher.update(signer);
    }
    for transmitter in transmitters {
        hasher.update(transmitter);
    }

    hasher.update((encoded_extra.len() as u64).to_be_bytes());
    hasher.update(encoded_extra);

    let hash = hasher.finalize();
    let mut digest = [0u8; DIGEST_SIZE];
    digest.copy_from_slice(&hash[..DIGEST_SIZE]);
    digest[0] = DIGEST_PREFIX[0];
    digest[1] = DIGEST_PREFIX[1];
    ConfigDigest(digest)
}
