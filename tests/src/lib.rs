//! # Offchain-Reporting Test Suite
//!
//! Unified test crate for flows that span the codec, the signature verifier
//! and the aggregation engine.
//!
//! ## Structure
//!
//! ```text
//! tests/src/integration/
//! ├── pipeline.rs        # Submit-report pipeline end to end
//! ├── billing.rs         # Fee accrual, withdrawal, conservation
//! └── reconfiguration.rs # Epoch rollover and ledger survival
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! # All tests
//! cargo test -p ocr-tests
//!
//! # By flow
//! cargo test -p ocr-tests integration::pipeline
//! cargo test -p ocr-tests integration::billing
//! ```

#![allow(dead_code)]

pub mod integration;
