//! # Shared Types Crate
//!
//! Cross-subsystem primitives for the Offchain-Reporting engine.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: identity and digest types used by more than
//!   one crate are defined here, nowhere else.
//! - **Plain data**: no crypto, no I/O, only the types themselves and their
//!   formatting helpers.

pub mod entities;

pub use entities::*;
