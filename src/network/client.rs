//! Modbus-TCP client
//!
//! Blocking client for the three supported function codes. Works against
//! the simulator as well as a real unit.

use std::io::{BufReader, BufWriter};
use std::net::{TcpStream, ToSocketAddrs};
use std::time::Duration;

use crate::error::{Result, SimError};
use crate::protocol::{decode_response, encode_request, read_frame, write_frame, Request, Response};

/// Connection to a Modbus-TCP device
pub struct Client {
    reader: BufReader<TcpStream>,
    writer: BufWriter<TcpStream>,
    unit_id: u8,
    next_transaction: u16,
}

impl Client {
    /// Connect to a device, addressing unit 1
    pub fn connect(addr: impl ToSocketAddrs) -> Result<Self> {
        let stream = TcpStream::connect(addr)?;
        stream.set_nodelay(true)?;

        let read_stream = stream.try_clone()?;
        Ok(Self {
            reader: BufReader::new(read_stream),
            writer: BufWriter::new(stream),
            unit_id: 1,
            next_transaction: 1,
        })
    }

    /// Address a different unit id
    pub fn with_unit_id(mut self, unit_id: u8) -> Self {
        self.unit_id = unit_id;
        self
    }

    /// Fail reads that take longer than `timeout`
    pub fn set_timeout(&mut self, timeout: Option<Duration>) -> Result<()> {
        self.reader.get_ref().set_read_timeout(timeout)?;
        Ok(())
    }

    /// Read `count` holding registers starting at `start`
    pub fn read_holding_registers(&mut self, start: u16, count: u16) -> Result<Vec<u16>> {
        match self.call(Request::ReadHoldingRegisters { start, count })? {
            Response::ReadHoldingRegisters { values } if values.len() == count as usize => {
                Ok(values)
            }
            other => Err(unexpected(&other)),
        }
    }

    /// Write one register, returning the echoed address and value
    pub fn write_single_register(&mut self, address: u16, value: u16) -> Result<(u16, u16)> {
        match self.call(Request::WriteSingleRegister { address, value })? {
            Response::WriteSingleRegister { address, value } => Ok((address, value)),
            other => Err(unexpected(&other)),
        }
    }

    /// Write consecutive registers, returning the echoed start and count
    pub fn write_multiple_registers(&mut self, start: u16, values: &[u16]) -> Result<(u16, u16)> {
        let request = Request::WriteMultipleRegisters {
            start,
            values: values.to_vec(),
        };
        match self.call(request)? {
            Response::WriteMultipleRegisters { start, count } => Ok((start, count)),
            other => Err(unexpected(&other)),
        }
    }

    /// Send one request and wait for the matching response
    fn call(&mut self, request: Request) -> Result<Response> {
        let transaction_id = self.next_transaction;
        self.next_transaction = self.next_transaction.wrapping_add(1);

        let bytes = encode_request(transaction_id, self.unit_id, &request);
        write_frame(&mut self.writer, &bytes)?;

        let frame = read_frame(&mut self.reader)?;
        if frame.header.transaction_id != transaction_id {
            return Err(SimError::Network(format!(
                "transaction id mismatch: sent {}, got {}",
                transaction_id, frame.header.transaction_id
            )));
        }

        match decode_response(&frame)? {
            Response::Exception { function, code } => Err(SimError::Exception { function, code }),
            response => Ok(response),
        }
    }
}

fn unexpected(response: &Response) -> SimError {
    SimError::Network(format!("unexpected response: {:?}", response))
}
