//! In-memory adapters for the outbound ports, used in tests and examples.

pub mod memory;

pub use memory::{AccessRegistry, MemoryFeeToken};
