//! Protocol codec
//!
//! Encoding and decoding functions for Modbus-TCP frames.
//!
//! ## Server side
//! - [`decode_buffered`]: split one complete frame off a session buffer
//! - [`decode_frame`]: decode one frame from a byte slice
//! - [`decode_request`]: interpret the frame's payload by function code
//! - [`encode_response`]: build the reply, mirroring the request header
//!
//! ## Client side
//! - [`encode_request`], [`read_frame`], [`decode_response`]

use std::io::{Read, Write};

use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::error::{Result, SimError};
use super::{
    Frame, FunctionCode, Header, Request, Response, HEADER_SIZE, MAX_FRAME_SIZE, MAX_READ_COUNT,
    MAX_WRITE_COUNT,
};

/// Bytes of the MBAP header that precede the counted `length` region
const PREFIX_SIZE: usize = 6;

// =============================================================================
// Frame Encoding/Decoding
// =============================================================================

/// Decode the header at the front of `bytes`
pub fn decode_header(bytes: &[u8]) -> Result<Header> {
    if bytes.len() < HEADER_SIZE {
        return Err(SimError::Framing {
            expected: HEADER_SIZE,
            actual: bytes.len(),
        });
    }

    let mut buf = &bytes[..HEADER_SIZE];
    Ok(Header {
        transaction_id: buf.get_u16(),
        protocol_id: buf.get_u16(),
        length: buf.get_u16(),
        unit_id: buf.get_u8(),
        function: buf.get_u8(),
    })
}

/// Decode one frame from the front of `bytes`
///
/// Returns the frame and the number of bytes it occupied. The declared
/// length decides where the frame ends; when it is implausible or runs
/// past the end of `bytes`, the rest of the buffer is taken as payload.
pub fn decode_frame(bytes: &[u8]) -> Result<(Frame, usize)> {
    let header = decode_header(bytes)?;

    let declared = PREFIX_SIZE + header.length as usize;
    let consumed = if declared >= HEADER_SIZE && declared <= bytes.len() {
        declared
    } else {
        bytes.len()
    };

    let payload = Bytes::copy_from_slice(&bytes[HEADER_SIZE..consumed]);
    Ok((Frame { header, payload }, consumed))
}

/// Take one frame off the front of a session buffer
///
/// - `Ok(Some(frame))`: a whole frame was split off `buf`
/// - `Ok(None)`: the header declares more bytes than have arrived; wait
/// - `Err(Framing)`: fewer bytes than a header; `buf` is left untouched
///
/// A declared length that cannot describe a valid frame makes the rest of
/// the buffer the payload, same as [`decode_frame`].
pub fn decode_buffered(buf: &mut BytesMut) -> Result<Option<Frame>> {
    let header = decode_header(&buf[..])?;

    let declared = PREFIX_SIZE + header.length as usize;
    let plausible = declared >= HEADER_SIZE && declared <= MAX_FRAME_SIZE;
    let take = if plausible {
        if buf.len() < declared {
            return Ok(None);
        }
        declared
    } else {
        buf.len()
    };

    let bytes = buf.split_to(take);
    let (frame, _) = decode_frame(&bytes)?;
    Ok(Some(frame))
}

/// Serialize a frame: header fields are mirrored, `length` is recomputed
fn encode_frame(header: &Header, function: u8, payload: &[u8]) -> Vec<u8> {
    let mut buf = BytesMut::with_capacity(HEADER_SIZE + payload.len());
    buf.put_u16(header.transaction_id);
    buf.put_u16(header.protocol_id);
    // unit id + function code + payload
    buf.put_u16((2 + payload.len()) as u16);
    buf.put_u8(header.unit_id);
    buf.put_u8(function);
    buf.put_slice(payload);
    buf.to_vec()
}

// =============================================================================
// Request Encoding/Decoding
// =============================================================================

/// Decode the request carried by a frame
pub fn decode_request(frame: &Frame) -> Result<Request> {
    let function = FunctionCode::from_u8(frame.header.function)
        .ok_or(SimError::UnsupportedFunction(frame.header.function))?;

    let mut payload = frame.payload.clone();

    match function {
        FunctionCode::ReadHoldingRegisters => {
            ensure_len(&payload, 4, "read holding registers")?;
            let start = payload.get_u16();
            let count = payload.get_u16();
            if count > MAX_READ_COUNT {
                return Err(SimError::MalformedRequest(format!(
                    "read holding registers: count {} exceeds {}",
                    count, MAX_READ_COUNT
                )));
            }
            Ok(Request::ReadHoldingRegisters { start, count })
        }
        FunctionCode::WriteSingleRegister => {
            ensure_len(&payload, 4, "write single register")?;
            let address = payload.get_u16();
            let value = payload.get_u16();
            Ok(Request::WriteSingleRegister { address, value })
        }
        FunctionCode::WriteMultipleRegisters => {
            ensure_len(&payload, 5, "write multiple registers")?;
            let start = payload.get_u16();
            let count = payload.get_u16();
            // The byte count is not cross-checked; `count` is authoritative
            let _byte_count = payload.get_u8();

            if count > MAX_WRITE_COUNT {
                return Err(SimError::MalformedRequest(format!(
                    "write multiple registers: count {} exceeds {}",
                    count, MAX_WRITE_COUNT
                )));
            }
            ensure_len(&payload, count as usize * 2, "write multiple registers values")?;

            let values = (0..count).map(|_| payload.get_u16()).collect();
            Ok(Request::WriteMultipleRegisters { start, values })
        }
    }
}

/// Encode a request as a complete frame
pub fn encode_request(transaction_id: u16, unit_id: u8, request: &Request) -> Vec<u8> {
    let header = request.header(transaction_id, unit_id);

    let mut payload = BytesMut::new();
    match request {
        Request::ReadHoldingRegisters { start, count } => {
            payload.put_u16(*start);
            payload.put_u16(*count);
        }
        Request::WriteSingleRegister { address, value } => {
            payload.put_u16(*address);
            payload.put_u16(*value);
        }
        Request::WriteMultipleRegisters { start, values } => {
            payload.put_u16(*start);
            payload.put_u16(values.len() as u16);
            payload.put_u8((values.len() * 2) as u8);
            for value in values {
                payload.put_u16(*value);
            }
        }
    }

    encode_frame(&header, header.function, &payload)
}

// =============================================================================
// Response Encoding/Decoding
// =============================================================================

/// Encode a response to the request identified by `request`
pub fn encode_response(request: &Header, response: &Response) -> Vec<u8> {
    let mut payload = BytesMut::new();
    match response {
        Response::ReadHoldingRegisters { values } => {
            payload.put_u8((values.len() * 2) as u8);
            for value in values {
                payload.put_u16(*value);
            }
        }
        Response::WriteSingleRegister { address, value } => {
            payload.put_u16(*address);
            payload.put_u16(*value);
        }
        Response::WriteMultipleRegisters { start, count } => {
            payload.put_u16(*start);
            payload.put_u16(*count);
        }
        Response::Exception { code, .. } => {
            payload.put_u8(*code);
        }
    }

    encode_frame(request, response.function(), &payload)
}

/// Decode a response frame
pub fn decode_response(frame: &Frame) -> Result<Response> {
    let function = frame.header.function;
    let mut payload = frame.payload.clone();

    if function & 0x80 != 0 {
        ensure_len(&payload, 1, "exception response")?;
        return Ok(Response::Exception {
            function: function & 0x7f,
            code: payload.get_u8(),
        });
    }

    match FunctionCode::from_u8(function) {
        Some(FunctionCode::ReadHoldingRegisters) => {
            ensure_len(&payload, 1, "read response")?;
            let byte_count = payload.get_u8() as usize;
            ensure_len(&payload, byte_count, "read response values")?;
            let values = (0..byte_count / 2).map(|_| payload.get_u16()).collect();
            Ok(Response::ReadHoldingRegisters { values })
        }
        Some(FunctionCode::WriteSingleRegister) => {
            ensure_len(&payload, 4, "write single response")?;
            Ok(Response::WriteSingleRegister {
                address: payload.get_u16(),
                value: payload.get_u16(),
            })
        }
        Some(FunctionCode::WriteMultipleRegisters) => {
            ensure_len(&payload, 4, "write multiple response")?;
            Ok(Response::WriteMultipleRegisters {
                start: payload.get_u16(),
                count: payload.get_u16(),
            })
        }
        None => Err(SimError::UnsupportedFunction(function)),
    }
}

// =============================================================================
// Stream-based I/O helpers
// =============================================================================

/// Read exactly one frame from a stream, using the declared length
///
/// Blocks until the whole frame has arrived. Used by clients, which only
/// ever talk to one peer and trust its framing.
pub fn read_frame<R: Read>(reader: &mut R) -> Result<Frame> {
    let mut header_bytes = [0u8; HEADER_SIZE];
    reader.read_exact(&mut header_bytes)?;
    let header = decode_header(&header_bytes)?;

    let body_len = (header.length as usize).checked_sub(2).ok_or_else(|| {
        SimError::Network(format!("declared frame length {} is too short", header.length))
    })?;
    if HEADER_SIZE + body_len > MAX_FRAME_SIZE {
        return Err(SimError::Network(format!(
            "frame too large: {} bytes (max {})",
            HEADER_SIZE + body_len,
            MAX_FRAME_SIZE
        )));
    }

    let mut payload = vec![0u8; body_len];
    reader.read_exact(&mut payload)?;

    Ok(Frame {
        header,
        payload: Bytes::from(payload),
    })
}

/// Write encoded frame bytes to a stream
pub fn write_frame<W: Write>(writer: &mut W, bytes: &[u8]) -> Result<()> {
    writer.write_all(bytes)?;
    writer.flush()?;
    Ok(())
}

fn ensure_len(payload: &Bytes, needed: usize, what: &str) -> Result<()> {
    if payload.remaining() < needed {
        return Err(SimError::MalformedRequest(format!(
            "{}: expected {} bytes, got {}",
            what,
            needed,
            payload.remaining()
        )));
    }
    Ok(())
}
