//! # Aggregation Engine
//!
//! The core of the offchain-reporting pipeline: a caller submits a report
//! byte string with a signature set; the engine decodes it, authenticates it
//! against the active configuration epoch's signer quorum, advances the
//! round state machine and accrues payment for the submitting transmitter.
//!
//! ## Architecture
//!
//! Hexagonal:
//! - **Domain** (`domain/`): configuration epochs, round bookkeeping and fee
//!   arithmetic. Pure logic, no I/O.
//! - **Ports** (`ports/`): outbound traits for the fee-token ledger and the
//!   access-control allow-list, both external collaborators.
//! - **Adapters** (`adapters/`): in-memory implementations of the outbound
//!   ports for tests and examples.
//! - **Service** (`service.rs`): the [`Aggregator`] engine wiring domain
//!   logic to the ports.
//!
//! ## Execution model
//!
//! Strictly serialized: the engine owns all mutable state behind `&mut self`
//! and every operation is an all-or-nothing transition. Each fallible check
//! runs before the first write, so a rejected call leaves the round history
//! and ledger byte-for-byte unchanged.

pub mod adapters;
pub mod domain;
pub mod events;
pub mod ports;
pub mod service;

pub use domain::billing::compute_payment;
pub use domain::entities::{
    BillingParams, CreditPolicy, EngineSettings, LeftoverPayment, OracleConfig, OracleLedger,
    Round, MAX_ORACLES,
};
pub use domain::errors::AggregatorError;
pub use events::AggregatorEvent;
pub use ports::outbound::{AccessGateway, FeeTokenGateway, OperationTag, TransferError};
pub use service::Aggregator;
