//! Pure verification logic: no I/O, no state.

pub mod ecdsa;
pub mod entities;
pub mod errors;
pub mod quorum;
