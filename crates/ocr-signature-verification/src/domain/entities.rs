//! # Verification Entities

use serde::{Deserialize, Serialize};

/// Recoverable ECDSA signature on the secp256k1 curve.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EcdsaSignature {
    /// R component (32 bytes).
    pub r: [u8; 32],
    /// S component (32 bytes).
    pub s: [u8; 32],
    /// Recovery id (0, 1, 27 or 28).
    pub v: u8,
}

/// Quorum threshold policy.
///
/// The exact threshold relative to signer-set size is a deployment decision,
/// so it is carried as explicit configuration rather than a hard-coded
/// formula. The observed two-signer deployment requires both signatures,
/// i.e. `Threshold(2)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum QuorumRule {
    /// A fixed number of distinct known signers.
    Threshold(u8),
    /// Tolerate `f` faulty signers: requires `f + 1` distinct signatures.
    FaultTolerance(u8),
}

impl QuorumRule {
    /// The number of distinct signers this rule requires.
    pub fn required(&self) -> u8 {
        match self {
            QuorumRule::Threshold(n) => *n,
            QuorumRule::FaultTolerance(f) => f.saturating_add(1),
        }
    }

    /// Whether the rule can be met at all by a signer set of `signer_count`.
    pub fn satisfiable(&self, signer_count: usize) -> bool {
        let required = usize::from(self.required());
        required >= 1 && required <= signer_count
    }
}

/// Set of signer indices, packed into a bitmask.
///
/// Indices are bounded by the format's 31-reporter maximum, so a `u32` always
/// suffices.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SignerSet(u32);

impl SignerSet {
    /// Number of index slots in the bitmask.
    pub const CAPACITY: usize = 32;

    /// Insert an index; returns `false` if it was already present.
    ///
    /// `index` must be below [`SignerSet::CAPACITY`].
    pub fn insert(&mut self, index: u8) -> bool {
        debug_assert!(usize::from(index) < Self::CAPACITY);
        let bit = 1u32 << index;
        let fresh = self.0 & bit == 0;
        self.0 |= bit;
        fresh
    }

    /// Whether the index is present.
    pub fn contains(&self, index: u8) -> bool {
        debug_assert!(usize::from(index) < Self::CAPACITY);
        self.0 & (1u32 << index) != 0
    }

    /// Number of distinct indices in the set.
    pub fn len(&self) -> u32 {
        self.0.count_ones()
    }

    /// Whether the set is empty.
    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    /// Iterate the indices in ascending order.
    pub fn indices(&self) -> impl Iterator<Item = u8> + '_ {
        let mask = self.0;
        (0u8..32).filter(move |index| mask & (1u32 << index) != 0)
    }
}
