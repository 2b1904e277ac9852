//! Protocol Module
//!
//! Modbus-TCP framing and the three supported function codes.
//!
//! ## Frame Format (MBAP header + PDU, big-endian)
//!
//! ```text
//! ┌───────────┬───────────┬──────────┬─────────┬──────────┬──────────────┐
//! │ TxnId (2) │ Proto (2) │ Len (2)  │ Unit(1) │ Func (1) │   Payload    │
//! └───────────┴───────────┴──────────┴─────────┴──────────┴──────────────┘
//! ```
//!
//! `Len` counts the unit id, the function code and the payload.
//!
//! ### Function Codes
//! - 0x03: Read Holding Registers    - Payload: start (2) + count (2)
//! - 0x06: Write Single Register     - Payload: address (2) + value (2)
//! - 0x10: Write Multiple Registers  - Payload: start (2) + count (2) + byte_count (1) + values
//!
//! ### Responses
//! - 0x03: byte_count (1) + values
//! - 0x06: echo of address + value
//! - 0x10: echo of start + count
//!
//! Any other function code gets no response at all.

mod frame;
mod request;
mod response;
mod codec;

pub use frame::{Frame, Header};
pub use request::{FunctionCode, Request};
pub use response::Response;
pub use codec::{
    decode_buffered, decode_frame, decode_header, decode_request, decode_response, encode_request, encode_response,
    read_frame, write_frame,
};

/// MBAP header plus function code
pub const HEADER_SIZE: usize = 8;

/// Largest Modbus-TCP ADU
pub const MAX_FRAME_SIZE: usize = 260;

/// Most registers a single read may return (byte count must fit in a u8)
pub const MAX_READ_COUNT: u16 = 125;

/// Most registers a single multi-write may carry
pub const MAX_WRITE_COUNT: u16 = 123;
