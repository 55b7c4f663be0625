//! Cross-crate integration flows.

pub mod billing;
pub mod harness;
pub mod pipeline;
