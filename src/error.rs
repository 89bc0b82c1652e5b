use thiserror::Error;

/// Conditions that stop the machine. None of them can be resumed from.
#[derive(Debug, Error)]
pub enum VmError {
    #[error("instruction pointer {ip} is outside memory of {len} words")]
    FetchOutOfBounds { ip: usize, len: usize },

    #[error("read from address {index} is outside memory of {len} words")]
    ReadOutOfBounds { index: usize, len: usize },

    #[error("write to address {index} is outside memory of {len} words")]
    WriteOutOfBounds { index: usize, len: usize },

    #[error("invalid opcode {opcode} at address {ip}")]
    InvalidOpcode { opcode: u32, ip: usize },

    #[error("reserved opcode 4 at address {ip}")]
    ReservedOpcode { ip: usize },

    #[error("invalid operand {operand} for IO instruction at address {ip}")]
    InvalidIoOperand { operand: u32, ip: usize },

    #[error("OTC at address {ip} is a non-standard extension and extensions are disabled")]
    ExtensionDisabled { ip: usize },

    #[error("end of input reached while reading a number")]
    InputExhausted,

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type VmResult<T> = Result<T, VmError>;
