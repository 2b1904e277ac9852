//! Response definitions
//!
//! Represents responses sent back to clients.

/// A response to a request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Response {
    /// Register values in address order
    ReadHoldingRegisters { values: Vec<u16> },

    /// Echo of the written address and value
    WriteSingleRegister { address: u16, value: u16 },

    /// Echo of the start address and register count
    WriteMultipleRegisters { start: u16, count: u16 },

    /// Exception reply from a device (never produced by the simulator)
    Exception { function: u8, code: u8 },
}

impl Response {
    /// Function code byte this response is sent with
    pub fn function(&self) -> u8 {
        match self {
            Response::ReadHoldingRegisters { .. } => 0x03,
            Response::WriteSingleRegister { .. } => 0x06,
            Response::WriteMultipleRegisters { .. } => 0x10,
            Response::Exception { function, .. } => function | 0x80,
        }
    }
}
