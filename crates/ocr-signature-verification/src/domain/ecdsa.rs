//! # ECDSA Recovery (secp256k1)
//!
//! Recover-then-match authentication: a pure function from (digest,
//! signature) to the Ethereum-style address of the signer. Matching against
//! the active signer set is the caller's job, which keeps this module
//! stateless and independently testable.
//!
//! ## Security Notes
//!
//! - **Malleability (EIP-2)**: S must be strictly below half the curve order.
//! - **Scalar ranges**: R and S must be in `[1, n-1]`.
//! - Range comparisons run in constant time (`subtle`).

use k256::ecdsa::{RecoveryId, Signature, VerifyingKey};
use sha3::{Digest, Keccak256};
use shared_types::{Address, Hash};
use subtle::{Choice, ConstantTimeEq};
use zeroize::Zeroize;

use super::entities::EcdsaSignature;
use super::errors::SignatureError;

/// secp256k1 curve order n.
const SECP256K1_ORDER: [u8; 32] = [
    0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFE,
    0xBA, 0xAE, 0xDC, 0xE6, 0xAF, 0x48, 0xA0, 0x3B, 0xBF, 0xD2, 0x5E, 0x8C, 0xD0, 0x36, 0x41, 0x41,
];

/// n / 2, the EIP-2 malleability boundary.
const SECP256K1_HALF_ORDER: [u8; 32] = [
    0x7F, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF,
    0x5D, 0x57, 0x6E, 0x73, 0x57, 0xA4, 0x50, 0x1D, 0xDF, 0xE9, 0x2F, 0x46, 0x68, 0x1B, 0x20, 0xA0,
];

/// Keccak-256 hash. Used both for report message digests and for deriving
/// signer addresses from recovered public keys.
pub fn keccak256(data: &[u8]) -> Hash {
    let mut hasher = Keccak256::new();
    hasher.update(data);
    let mut hash = [0u8; 32];
    hash.copy_from_slice(&hasher.finalize());
    hash
}

/// Derive the Ethereum-style address for a secp256k1 public key: the last 20
/// bytes of `keccak256(uncompressed key without the 0x04 prefix)`.
pub fn address_from_pubkey(public_key: &VerifyingKey) -> Address {
    let encoded = public_key.to_encoded_point(false);
    let hash = keccak256(&encoded.as_bytes()[1..]);

    let mut address = [0u8; 20];
    address.copy_from_slice(&hash[12..]);
    address
}

/// Validate a signature and recover its signer address from a 32-byte
/// prehash.
///
/// Rejects zero or out-of-range scalars, high-S signatures and unknown
/// recovery ids before attempting recovery.
pub fn recover_address(
    message_hash: &Hash,
    signature: &EcdsaSignature,
) -> Result<Address, SignatureError> {
    if !scalar_in_range(&signature.r) || !scalar_in_range(&signature.s) {
        return Err(SignatureError::InvalidFormat);
    }
    if !is_low_s(&signature.s) {
        return Err(SignatureError::MalleableSignature);
    }
    let recovery_id = parse_recovery_id(signature.v)?;

    let mut sig_bytes = [0u8; 64];
    sig_bytes[..32].copy_from_slice(&signature.r);
    sig_bytes[32..].copy_from_slice(&signature.s);
    let parsed = Signature::from_slice(&sig_bytes);
    sig_bytes.zeroize();
    let sig = parsed.map_err(|_| SignatureError::InvalidFormat)?;

    let recovered = VerifyingKey::recover_from_prehash(message_hash, &sig, recovery_id)
        .map_err(|_| SignatureError::RecoveryFailed)?;

    Ok(address_from_pubkey(&recovered))
}

/// Constant-time strict less-than over 32-byte big-endian values.
fn ct_less_than(lhs: &[u8; 32], rhs: &[u8; 32]) -> Choice {
    let mut less = Choice::from(0u8);
    let mut greater = Choice::from(0u8);

    for (&l, &r) in lhs.iter().zip(rhs.iter()) {
        let undecided = !(less | greater);
        less |= undecided & Choice::from(u8::from(l < r));
        greater |= undecided & Choice::from(u8::from(l > r));
    }

    less
}

/// Whether a scalar lies in `[1, n-1]`, in constant time.
fn scalar_in_range(scalar: &[u8; 32]) -> bool {
    let mut zero = Choice::from(1u8);
    for byte in scalar {
        zero &= byte.ct_eq(&0u8);
    }
    bool::from(!zero & ct_less_than(scalar, &SECP256K1_ORDER))
}

/// Whether S is strictly below n/2 (EIP-2), in constant time.
fn is_low_s(s: &[u8; 32]) -> bool {
    bool::from(ct_less_than(s, &SECP256K1_HALF_ORDER))
}

/// Accepts the raw recovery ids 0/1 and their legacy 27/28 aliases.
fn parse_recovery_id(v: u8) -> Result<RecoveryId, SignatureError> {
    let id = match v {
        0 | 27 => 0u8,
        1 | 28 => 1u8,
        _ => return Err(SignatureError::InvalidRecoveryId(v)),
    };
    RecoveryId::try_from(id).map_err(|_| SignatureError::InvalidRecoveryId(v))
}

/// Key-generation and signing helpers for building signed-report fixtures.
///
/// Compiled for this crate's own tests and, behind the `test-helpers`
/// feature, for downstream test suites. Never part of the production API.
#[cfg(any(test, feature = "test-helpers"))]
pub mod test_helpers {
    use super::*;
    use k256::ecdsa::SigningKey;

    /// Generate a fresh secp256k1 keypair.
    pub fn generate_keypair() -> (SigningKey, VerifyingKey) {
        let signing_key = SigningKey::random(&mut rand::thread_rng());
        let verifying_key = *signing_key.verifying_key();
        (signing_key, verifying_key)
    }

    /// Sign a prehash, normalizing to a low-S signature.
    pub fn sign(message_hash: &Hash, private_key: &SigningKey) -> EcdsaSignature {
        let (sig, recid) = private_key
            .sign_prehash_recoverable(message_hash)
            .expect("signing failed");

        let bytes = sig.to_bytes();
        let mut r = [0u8; 32];
        let mut s = [0u8; 32];
        r.copy_from_slice(&bytes[..32]);
        s.copy_from_slice(&bytes[32..]);

        if is_low_s(&s) {
            EcdsaSignature {
                r,
                s,
                v: recid.to_byte(),
            }
        } else {
            // Flip S to the low half; the recovery id's parity flips with it.
            EcdsaSignature {
                r,
                s: order_minus(&s),
                v: recid.to_byte() ^ 1,
            }
        }
    }

    /// n - s, for malleability fixtures.
    pub fn order_minus(s: &[u8; 32]) -> [u8; 32] {
        let mut result = [0u8; 32];
        let mut borrow = 0i32;
        for i in (0..32).rev() {
            let diff = i32::from(SECP256K1_ORDER[i]) - i32::from(s[i]) - borrow;
            result[i] = diff.rem_euclid(256) as u8;
            borrow = i32::from(diff < 0);
        }
        result
    }
}
