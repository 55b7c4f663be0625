//! Outbound contracts the engine depends on; adapters implement them.

pub mod outbound;
