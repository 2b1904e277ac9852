//! Registers Module
//!
//! The register map and the shared store behind it.
//!
//! ## Address Spaces
//! - **Reported**: values the device owns (applied power/mode/temperature,
//!   outdoor and supply sensors)
//! - **Commanded**: values a client stages (control and target registers)
//!
//! No address belongs to both spaces. Values are always raw `u16`; scaling
//! (e.g. 0.1 °C) only happens when rendering logs.

mod map;
mod mode;
mod store;

pub use map::*;
pub use mode::Mode;
pub use store::{Diagnostics, RegisterSpaces, RegisterStore, WriteOutcome};

/// A 16-bit register address
pub type Address = u16;
