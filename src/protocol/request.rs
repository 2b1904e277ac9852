//! Request definitions
//!
//! Represents register operations issued by clients.

use super::Header;

/// Supported function codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum FunctionCode {
    ReadHoldingRegisters = 0x03,
    WriteSingleRegister = 0x06,
    WriteMultipleRegisters = 0x10,
}

impl FunctionCode {
    pub fn from_u8(code: u8) -> Option<Self> {
        match code {
            0x03 => Some(FunctionCode::ReadHoldingRegisters),
            0x06 => Some(FunctionCode::WriteSingleRegister),
            0x10 => Some(FunctionCode::WriteMultipleRegisters),
            _ => None,
        }
    }
}

/// A parsed request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    /// Read `count` consecutive registers starting at `start`
    ReadHoldingRegisters { start: u16, count: u16 },

    /// Write one register
    WriteSingleRegister { address: u16, value: u16 },

    /// Write consecutive registers starting at `start`
    WriteMultipleRegisters { start: u16, values: Vec<u16> },
}

impl Request {
    /// Get the function code
    pub fn function_code(&self) -> FunctionCode {
        match self {
            Request::ReadHoldingRegisters { .. } => FunctionCode::ReadHoldingRegisters,
            Request::WriteSingleRegister { .. } => FunctionCode::WriteSingleRegister,
            Request::WriteMultipleRegisters { .. } => FunctionCode::WriteMultipleRegisters,
        }
    }

    /// Header for sending this request as a new transaction
    pub fn header(&self, transaction_id: u16, unit_id: u8) -> Header {
        Header {
            transaction_id,
            protocol_id: 0,
            length: 0,
            unit_id,
            function: self.function_code() as u8,
        }
    }
}
