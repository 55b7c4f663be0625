//! # Report Codec
//!
//! Byte-exact binary codec for offchain-reporting observation reports.
//!
//! A report is a self-describing, word-aligned byte string: a context word
//! carrying the configuration digest and round id, a 32-byte aggregate
//! answer with a declared number of valid leading bytes, and (optionally) a
//! per-reporter observation section. Decoding is a pure function over the
//! wire bytes: identical input decodes identically, and any structural
//! violation fails with a [`ReportError`] without producing partial output.
//!
//! Encoding is the exact inverse and exists for round-trip verification and
//! fixture generation rather than production use.

pub mod codec;
pub mod entities;
pub mod errors;

pub use codec::{decode, encode};
pub use entities::{AggregateAnswer, Observation, Report, MAX_OBSERVERS, WORD_SIZE};
pub use errors::ReportError;
