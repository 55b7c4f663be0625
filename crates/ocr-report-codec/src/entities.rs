//! # Report Entities
//!
//! In-memory form of a decoded observation report.

use serde::{Deserialize, Serialize};
use serde_with::{serde_as, Bytes};
use shared_types::ConfigDigest;

/// Fixed word size of the wire format, in bytes.
pub const WORD_SIZE: usize = 32;

/// Maximum number of distinct reporters a report may name.
///
/// The observer-order section stores single-byte indices inside one word, and
/// downstream bookkeeping packs reporter indices into a `u32` bitmask, so the
/// format is designed around a hard cap of 31.
pub const MAX_OBSERVERS: usize = 31;

/// The aggregated answer word of a round.
///
/// Physically a full 32-byte word; only the leading `valid_len` bytes are
/// significant. The codec guarantees the tail is zero on the wire.
#[serde_as]
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct AggregateAnswer {
    /// Word-padded answer bytes.
    #[serde_as(as = "Bytes")]
    pub bytes: [u8; WORD_SIZE],
    /// Number of meaningful leading bytes (`0..=32`).
    pub valid_len: u8,
}

impl AggregateAnswer {
    /// Build an answer from its logical value, zero-padding to a word.
    ///
    /// Returns `None` if the value does not fit a word.
    pub fn from_value(value: &[u8]) -> Option<Self> {
        if value.len() > WORD_SIZE {
            return None;
        }
        let mut bytes = [0u8; WORD_SIZE];
        bytes[..value.len()].copy_from_slice(value);
        Some(Self {
            bytes,
            valid_len: value.len() as u8,
        })
    }

    /// The logical answer: the leading `valid_len` bytes of the word.
    pub fn value(&self) -> &[u8] {
        &self.bytes[..usize::from(self.valid_len)]
    }
}

/// A single reporter's observation: an opaque byte string with its own
/// logical length (`0..=32` bytes on the wire).
#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct Observation(pub Vec<u8>);

impl Observation {
    /// Borrow the observation bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

/// A fully decoded observation report.
///
/// Invariant (enforced by [`crate::decode`] and checked by [`crate::encode`]):
/// `observer_order.len() == observations.len()`, and an empty observer order
/// means the aggregate answer is the sole value of record.
#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct Report {
    /// Digest of the configuration epoch the report was produced under.
    pub config_digest: ConfigDigest,
    /// Wire round id; must strictly increase across accepted reports.
    pub round_id: u64,
    /// The aggregated answer.
    pub answer: AggregateAnswer,
    /// Reporter indices credited with this round, in report order.
    pub observer_order: Vec<u8>,
    /// Per-reporter observations, parallel to `observer_order`.
    pub observations: Vec<Observation>,
}

impl Report {
    /// Number of distinct per-reporter observations carried by the report.
    pub fn observer_count(&self) -> u8 {
        self.observer_order.len() as u8
    }

    /// Number of meaningful leading bytes in the aggregate answer.
    pub fn valid_byte_count(&self) -> u8 {
        self.answer.valid_len
    }
}
