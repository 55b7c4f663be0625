//! # Codec Errors
//!
//! Structural violations detected while decoding or encoding a report.

use thiserror::Error;

/// A malformed report. Decoding never mutates anything, so every variant
/// simply describes the first violation encountered in wire order.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ReportError {
    /// The buffer ends before the structure it declares.
    #[error("report buffer too short: expected at least {expected} bytes, got {actual}")]
    BufferTooShort { expected: usize, actual: usize },

    /// Bytes remain after the declared structure was fully consumed.
    #[error("report buffer has {count} trailing bytes")]
    TrailingBytes { count: usize },

    /// A byte that the layout requires to be zero was not.
    ///
    /// Mandatory-zero padding defends against hidden data smuggled past the
    /// signed byte string.
    #[error("non-zero padding byte at offset {offset}")]
    NonZeroPadding { offset: usize },

    /// The observer count exceeds the format maximum.
    #[error("observer count {count} exceeds maximum {max}")]
    TooManyObservers { count: u8, max: u8 },

    /// The declared aggregate-answer length exceeds the word size.
    #[error("valid byte count {len} exceeds word size {max}")]
    AnswerLengthOutOfRange { len: u8, max: u8 },

    /// An observer index is outside the permitted index space.
    #[error("observer index {index} out of range (limit {limit})")]
    ObserverIndexOutOfRange { index: u8, limit: u8 },

    /// The same observer index appears more than once.
    #[error("duplicate observer index {index}")]
    DuplicateObserver { index: u8 },

    /// An observation's length prefix exceeds the per-observation maximum.
    #[error("observation length {len} exceeds maximum {max}")]
    ObservationTooLong { len: u8, max: u8 },

    /// An observation's length prefix runs past the end of the buffer.
    #[error("observation declares {declared} bytes but only {remaining} remain")]
    ObservationOverrun { declared: usize, remaining: usize },

    /// Encoding input whose observer order and observation list disagree.
    #[error("observer order names {orders} reporters but {observations} observations given")]
    ObservationCountMismatch { orders: usize, observations: usize },
}
