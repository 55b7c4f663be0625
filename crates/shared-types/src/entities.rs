//! # Core Domain Entities
//!
//! Identity and digest primitives shared across the report codec, the
//! signature verifier and the aggregation engine.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_with::{serde_as, Bytes};

/// A 32-byte hash (Keccak-256 throughout this workspace).
pub type Hash = [u8; 32];

/// A 20-byte Ethereum-style address.
///
/// Signers, transmitters and payees all use this representation; signer
/// addresses are derived from secp256k1 public keys, the rest are opaque
/// identities supplied by the deployment.
pub type Address = [u8; 20];

/// Number of bytes in a [`ConfigDigest`].
pub const DIGEST_SIZE: usize = 16;

/// Deterministic fingerprint of a configuration epoch.
///
/// Embedded in every report's context word; a report is only accepted while
/// the configuration it was produced under is still the active one.
#[serde_as]
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct ConfigDigest(#[serde_as(as = "Bytes")] pub [u8; DIGEST_SIZE]);

impl ConfigDigest {
    /// Borrow the raw digest bytes.
    pub fn as_bytes(&self) -> &[u8; DIGEST_SIZE] {
        &self.0
    }
}

impl From<[u8; DIGEST_SIZE]> for ConfigDigest {
    fn from(bytes: [u8; DIGEST_SIZE]) -> Self {
        Self(bytes)
    }
}

impl AsRef<[u8]> for ConfigDigest {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Debug for ConfigDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ConfigDigest(")?;
        for byte in &self.0 {
            write!(f, "{byte:02x}")?;
        }
        write!(f, ")")
    }
}

impl fmt::Display for ConfigDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in &self.0 {
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}
