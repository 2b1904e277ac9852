//! Error types for ventsim
//!
//! Provides a unified error type for all operations.

use thiserror::Error;

/// Result type alias using SimError
pub type Result<T> = std::result::Result<T, SimError>;

/// Unified error type for ventsim operations
#[derive(Debug, Error)]
pub enum SimError {
    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // -------------------------------------------------------------------------
    // Protocol Errors
    // -------------------------------------------------------------------------
    #[error("Framing error: expected at least {expected} bytes, got {actual}")]
    Framing { expected: usize, actual: usize },

    #[error("Malformed request: {0}")]
    MalformedRequest(String),

    #[error("Unsupported function code: 0x{0:02x}")]
    UnsupportedFunction(u8),

    #[error("Device answered function 0x{function:02x} with exception code {code}")]
    Exception { function: u8, code: u8 },

    // -------------------------------------------------------------------------
    // Network Errors
    // -------------------------------------------------------------------------
    #[error("Network error: {0}")]
    Network(String),

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Configuration error: {0}")]
    Config(String),
}
