//! Frame definitions
//!
//! Decoded MBAP header and the raw payload that follows it.

use bytes::Bytes;

/// MBAP header plus function code
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    pub transaction_id: u16,

    /// 0 for Modbus; other values are carried through unchanged
    pub protocol_id: u16,

    /// Declared byte count of unit id + function code + payload
    pub length: u16,

    pub unit_id: u8,

    pub function: u8,
}

/// One complete protocol message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub header: Header,
    pub payload: Bytes,
}
