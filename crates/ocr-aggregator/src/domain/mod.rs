//! Pure engine logic: configuration epochs, fee arithmetic, no I/O.

pub mod billing;
pub mod config;
pub mod entities;
pub mod errors;
