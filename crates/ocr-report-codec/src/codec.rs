//! # Wire Codec
//!
//! Decode/encode between raw report bytes and [`Report`].
//!
//! Layout (word = 32 bytes):
//!
//! ```text
//! word 0   | 6 zero bytes | 16-byte config digest | u64 BE round id | count | valid |
//! word 1   | aggregate answer, `valid` leading bytes, zero tail              |
//! word 2   | observer order: `count` index bytes, zero tail   (count > 0)    |
//! word 3.. | per observation: length byte + bytes, packed, zero-padded to a
//!          | word boundary                                    (count > 0)    |
//! ```
//!
//! Every padding byte is required to be zero and the buffer must be exactly
//! consumed; anything else is a [`ReportError`].

use shared_types::{ConfigDigest, DIGEST_SIZE};

use crate::entities::{AggregateAnswer, Observation, Report, MAX_OBSERVERS, WORD_SIZE};
use crate::errors::ReportError;

/// Zero bytes preceding the config digest in the header word.
const HEADER_PAD: usize = 6;
/// Offset of the config digest within the header word.
const DIGEST_OFFSET: usize = HEADER_PAD;
/// Offset of the big-endian round id.
const ROUND_ID_OFFSET: usize = DIGEST_OFFSET + DIGEST_SIZE;
/// Offset of the observer-count byte.
const OBSERVER_COUNT_OFFSET: usize = ROUND_ID_OFFSET + 8;
/// Offset of the valid-byte-count byte.
const VALID_BYTES_OFFSET: usize = OBSERVER_COUNT_OFFSET + 1;

/// Offset of the aggregate-answer word.
const ANSWER_OFFSET: usize = WORD_SIZE;
/// Offset of the observer-order word (present only when `count > 0`).
const ORDER_OFFSET: usize = 2 * WORD_SIZE;
/// Offset of the observation section (present only when `count > 0`).
const OBSERVATIONS_OFFSET: usize = 3 * WORD_SIZE;

/// Decode a report from its wire bytes.
///
/// Pure and total: the same input always yields the same output, and no
/// partial result survives a failure.
pub fn decode(bytes: &[u8]) -> Result<Report, ReportError> {
    if bytes.len() < ANSWER_OFFSET + WORD_SIZE {
        return Err(ReportError::BufferTooShort {
            expected: ANSWER_OFFSET + WORD_SIZE,
            actual: bytes.len(),
        });
    }

    check_zero(bytes, 0, HEADER_PAD)?;

    let mut digest = [0u8; DIGEST_SIZE];
    digest.copy_from_slice(&bytes[DIGEST_OFFSET..DIGEST_OFFSET + DIGEST_SIZE]);

    let mut round_bytes = [0u8; 8];
    round_bytes.copy_from_slice(&bytes[ROUND_ID_OFFSET..ROUND_ID_OFFSET + 8]);
    let round_id = u64::from_be_bytes(round_bytes);

    let observer_count = bytes[OBSERVER_COUNT_OFFSET];
    let valid_len = bytes[VALID_BYTES_OFFSET];

    if usize::from(observer_count) > MAX_OBSERVERS {
        return Err(ReportError::TooManyObservers {
            count: observer_count,
            max: MAX_OBSERVERS as u8,
        });
    }
    if usize::from(valid_len) > WORD_SIZE {
        return Err(ReportError::AnswerLengthOutOfRange {
            len: valid_len,
            max: WORD_SIZE as u8,
        });
    }

    let mut answer = [0u8; WORD_SIZE];
    answer.copy_from_slice(&bytes[ANSWER_OFFSET..ANSWER_OFFSET + WORD_SIZE]);
    check_zero(
        bytes,
        ANSWER_OFFSET + usize::from(valid_len),
        ANSWER_OFFSET + WORD_SIZE,
    )?;

    let answer = AggregateAnswer {
        bytes: answer,
        valid_len,
    };

    if observer_count == 0 {
        // The aggregate is the sole value of record: nothing may follow it.
        if bytes.len() != ANSWER_OFFSET + WORD_SIZE {
            return Err(ReportError::TrailingBytes {
                count: bytes.len() - (ANSWER_OFFSET + WORD_SIZE),
            });
        }
        return Ok(Report {
            config_digest: ConfigDigest(digest),
            round_id,
            answer,
            observer_order: Vec::new(),
            observations: Vec::new(),
        });
    }

    if bytes.len() < OBSERVATIONS_OFFSET {
        return Err(ReportError::BufferTooShort {
            expected: OBSERVATIONS_OFFSET,
            actual: bytes.len(),
        });
    }

    let observer_order = decode_observer_order(bytes, observer_count)?;

    let mut observations = Vec::with_capacity(usize::from(observer_count));
    let mut cursor = OBSERVATIONS_OFFSET;
    for _ in 0..observer_count {
        if cursor >= bytes.len() {
            return Err(ReportError::BufferTooShort {
                expected: cursor + 1,
                actual: bytes.len(),
            });
        }
        let declared = bytes[cursor];
        if usize::from(declared) > WORD_SIZE {
            return Err(ReportError::ObservationTooLong {
                len: declared,
                max: WORD_SIZE as u8,
            });
        }
        let remaining = bytes.len() - cursor - 1;
        if usize::from(declared) > remaining {
            return Err(ReportError::ObservationOverrun {
                declared: usize::from(declared),
                remaining,
            });
        }
        let start = cursor + 1;
        let end = start + usize::from(declared);
        observations.push(Observation(bytes[start..end].to_vec()));
        cursor = end;
    }

    // The section is zero-padded up to the next word boundary and nothing
    // may follow it.
    let padded_end = cursor + (WORD_SIZE - cursor % WORD_SIZE) % WORD_SIZE;
    if bytes.len() < padded_end {
        return Err(ReportError::BufferTooShort {
            expected: padded_end,
            actual: bytes.len(),
        });
    }
    if bytes.len() > padded_end {
        return Err(ReportError::TrailingBytes {
            count: bytes.len() - padded_end,
        });
    }
    check_zero(bytes, cursor, padded_end)?;

    Ok(Report {
        config_digest: ConfigDigest(digest),
        round_id,
        answer,
        observer_order,
        observations,
    })
}

/// Encode a report into its wire bytes. Inverse of [`decode`].
pub fn encode(report: &Report) -> Result<Vec<u8>, ReportError> {
    if report.observer_order.len() != report.observations.len() {
        return Err(ReportError::ObservationCountMismatch {
            orders: report.observer_order.len(),
            observations: report.observations.len(),
        });
    }
    if report.observer_order.len() > MAX_OBSERVERS {
        return Err(ReportError::TooManyObservers {
            count: report.observer_order.len() as u8,
            max: MAX_OBSERVERS as u8,
        });
    }
    if usize::from(report.answer.valid_len) > WORD_SIZE {
        return Err(ReportError::AnswerLengthOutOfRange {
            len: report.answer.valid_len,
            max: WORD_SIZE as u8,
        });
    }
    if report.answer.bytes[usize::from(report.answer.valid_len)..]
        .iter()
        .any(|&b| b != 0)
    {
        return Err(ReportError::NonZeroPadding {
            offset: ANSWER_OFFSET + usize::from(report.answer.valid_len),
        });
    }

    let mut seen: u32 = 0;
    for &index in &report.observer_order {
        if usize::from(index) >= MAX_OBSERVERS {
            return Err(ReportError::ObserverIndexOutOfRange {
                index,
                limit: MAX_OBSERVERS as u8,
            });
        }
        if seen & (1 << index) != 0 {
            return Err(ReportError::DuplicateObserver { index });
        }
        seen |= 1 << index;
    }

    let mut out = Vec::with_capacity(4 * WORD_SIZE);
    out.extend_from_slice(&[0u8; HEADER_PAD]);
    out.extend_from_slice(report.config_digest.as_bytes());
    out.extend_from_slice(&report.round_id.to_be_bytes());
    out.push(report.observer_order.len() as u8);
    out.push(report.answer.valid_len);
    out.extend_from_slice(&report.answer.bytes);

    if report.observer_order.is_empty() {
        return Ok(out);
    }

    let mut order_word = [0u8; WORD_SIZE];
    order_word[..report.observer_order.len()].copy_from_slice(&report.observer_order);
    out.extend_from_slice(&order_word);

    for observation in &report.observations {
        if observation.0.len() > WORD_SIZE {
            return Err(ReportError::ObservationTooLong {
                len: observation.0.len() as u8,
                max: WORD_SIZE as u8,
            });
        }
        out.push(observation.0.len() as u8);
        out.extend_from_slice(&observation.0);
    }
    while out.len() % WORD_SIZE != 0 {
        out.push(0);
    }

    Ok(out)
}

/// Decode the observer-order word: `count` index bytes, zero tail, each index
/// in range and no duplicates.
fn decode_observer_order(bytes: &[u8], count: u8) -> Result<Vec<u8>, ReportError> {
    let order = &bytes[ORDER_OFFSET..ORDER_OFFSET + usize::from(count)];
    check_zero(bytes, ORDER_OFFSET + usize::from(count), ORDER_OFFSET + WORD_SIZE)?;

    let mut seen: u32 = 0;
    for &index in order {
        if usize::from(index) >= MAX_OBSERVERS {
            return Err(ReportError::ObserverIndexOutOfRange {
                index,
                limit: MAX_OBSERVERS as u8,
            });
        }
        if seen & (1 << index) != 0 {
            return Err(ReportError::DuplicateObserver { index });
        }
        seen |= 1 << index;
    }
    Ok(order.to_vec())
}

/// Require `bytes[start..end]` to be all zero.
fn check_zero(bytes: &[u8], start: usize, end: usize) -> Result<(), ReportError> {
    for (offset, &byte) in bytes[start..end].iter().enumerate() {
        if byte != 0 {
            return Err(ReportError::NonZeroPadding {
                offset: start + offset,
            });
        }
    }
    Ok(())
}
