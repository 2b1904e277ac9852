//! # ventsim
//!
//! A Modbus-TCP simulator for a heat-recovery ventilation unit:
//! - Register-oriented wire protocol (function codes 3, 6 and 16)
//! - Shared register store split into reported and commanded spaces
//! - Two-phase commits: writes are staged, a background tick applies them
//! - Time-driven sensor model (supply and outdoor temperature)
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      TCP Server                              │
//! │              (one Session thread per client)                 │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │ frames
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                   Engine (get / set)                         │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//!               ┌───────▼───────┐          ┌───────────────────┐
//!               │ RegisterStore │◀─────────│  Ticker (100 ms)  │
//!               │    (Mutex)    │  batch   │ commits + physics │
//!               └───────────────┘          └───────────────────┘
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;
pub mod shutdown;

pub mod registers;
pub mod protocol;
pub mod simulation;
pub mod network;
pub mod engine;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{SimError, Result};
pub use config::Config;
pub use engine::Engine;
pub use shutdown::ShutdownHandle;

// =============================================================================
// Version Info
// =============================================================================

/// Current version of ventsim
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
