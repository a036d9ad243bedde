use thiserror::Error;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum CpuError {
    /// No entry in the primary decode table for this byte.
    #[error("invalid opcode 0x{opcode:02X} at {address:#06x}")]
    InvalidOpcode { opcode: u8, address: u16 },

    /// No entry in the 0xCB decode table for this byte. The stock table
    /// fills every slot; this only fires for a table edited after construction.
    #[error("invalid opcode 0xCB{opcode:02X} at {address:#06x}")]
    InvalidExtendedOpcode { opcode: u8, address: u16 },

    /// Instruction exists but this build refuses to emulate it.
    #[error("{mnemonic} at {address:#06x} is not implemented")]
    Unimplemented { mnemonic: &'static str, address: u16 },
}

impl CpuError {
    /// Address of the offending instruction's first byte.
    pub fn address(&self) -> u16 {
        match *self {
            CpuError::InvalidOpcode { address, .. }
            | CpuError::InvalidExtendedOpcode { address, .. }
            | CpuError::Unimplemented { address, .. } => address,
        }
    }
}
