//! # Signature Verification Subsystem
//!
//! Quorum authentication for observation reports.
//!
//! The verifier is stateless: [`recover_address`] is a pure function from a
//! message digest and a recoverable secp256k1 signature to an Ethereum-style
//! signer address, and [`verify_quorum`] matches the recovered addresses
//! against an ordered signer set, rejecting unknown or repeated signers and
//! enforcing an explicit quorum threshold.
//!
//! The message digest handed to the verifier must be the Keccak-256 hash of
//! the exact report byte string on the wire, never of a re-encoded
//! structure, so authentication cannot be bypassed by canonicalization
//! tricks.
//!
//! ## Security Notes
//!
//! - **Malleability (EIP-2)**: signatures with a high S value are rejected.
//! - **Scalar ranges**: R and S must lie in `[1, n-1]`; comparisons are
//!   constant time via the `subtle` crate.

pub mod domain;

pub use domain::ecdsa::{address_from_pubkey, keccak256, recover_address};
pub use domain::entities::{EcdsaSignature, QuorumRule, SignerSet};
pub use domain::errors::{SignatureError, VerifyError};
pub use domain::quorum::verify_quorum;

#[cfg(any(test, feature = "test-helpers"))]
pub use domain::ecdsa::test_helpers;
