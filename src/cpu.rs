use crate::error::{VmError, VmResult};
use crate::io::Io;
use crate::memory::Memory;
use crate::{opcode_of, operand_of, Word};
use num_derive::FromPrimitive;
use num_traits::FromPrimitive;
use std::io::{BufRead, Write};

pub type CycleResult = VmResult<()>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, FromPrimitive)]
#[repr(u32)]
pub enum OpCode {
    HLT, // 0
    ADD, // 1
    SUB, // 2
    STA, // 3
    RES, // 4 // reserved
    LDA, // 5
    BRA, // 6
    BRZ, // 7
    BRP, // 8
    IO,  // 9
}

impl TryFrom<u32> for OpCode {
    type Error = u32;

    fn try_from(val: u32) -> Result<Self, Self::Error> {
        OpCode::from_u32(val).ok_or(val)
    }
}

/// Sub-commands selected by the operand of `IO`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromPrimitive)]
#[repr(u32)]
pub enum IoOp {
    INP = 1,
    OUT = 2,
    OTC = 22,
}

impl TryFrom<u32> for IoOp {
    type Error = u32;

    fn try_from(val: u32) -> Result<Self, Self::Error> {
        IoOp::from_u32(val).ok_or(val)
    }
}

/// Where the instruction pointer goes after a cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Next,
    Jump(usize),
    Halt,
}

pub struct CPU<R, W> {
    memory: Memory,
    io: Io<R, W>,
    ip: usize,
    acc: Word,
    halted: bool,
    cycles: u64,
    extensions: bool,
}

impl<R: BufRead, W: Write> CPU<R, W> {
    pub fn new(memory: Memory, io: Io<R, W>) -> Self {
        CPU {
            memory,
            io,
            ip: 0,
            acc: 0,
            halted: false,
            cycles: 0,
            extensions: true,
        }
    }

    /// Allow `OTC`. On by default.
    pub fn with_extensions(mut self, enabled: bool) -> Self {
        self.extensions = enabled;
        self
    }

    pub fn is_running(&self) -> bool {
        !self.halted
    }

    pub fn ip(&self) -> usize {
        self.ip
    }

    pub fn acc(&self) -> Word {
        self.acc
    }

    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    pub fn memory(&self) -> &Memory {
        &self.memory
    }

    pub fn io(&self) -> &Io<R, W> {
        &self.io
    }

    pub fn into_io(self) -> Io<R, W> {
        self.io
    }

    /// Runs until `HLT`. A program that never halts never returns.
    pub fn run(&mut self) -> CycleResult {
        while self.is_running() {
            if let Err(e) = self.tick() {
                let _ = self.io.flush();
                return Err(e);
            }
        }
        info!("halted at {} after {} cycles", self.ip, self.cycles);
        self.io.flush()
    }

    /// One fetch-decode-execute cycle. On error the instruction pointer is
    /// left on the faulting instruction.
    pub fn tick(&mut self) -> CycleResult {
        if self.halted {
            return Ok(());
        }

        let ip = self.ip;
        let instr = self.fetch()?;
        let opcode = OpCode::try_from(opcode_of(instr))
            .map_err(|opcode| VmError::InvalidOpcode { opcode, ip })?;
        let operand = operand_of(instr);

        let flow = match opcode {
            OpCode::HLT => Flow::Halt,
            OpCode::ADD => self.mnemonic_add(operand)?,
            OpCode::SUB => self.mnemonic_sub(operand)?,
            OpCode::STA => self.mnemonic_sta(operand)?,
            OpCode::RES => return Err(VmError::ReservedOpcode { ip }),
            OpCode::LDA => self.mnemonic_lda(operand)?,
            OpCode::BRA => Flow::Jump(operand as usize),
            OpCode::BRZ => self.mnemonic_branch_if(operand, self.acc == 0),
            // zero counts as positive
            OpCode::BRP => self.mnemonic_branch_if(operand, self.acc >= 0),
            OpCode::IO => self.mnemonic_io(operand)?,
        };

        match flow {
            Flow::Next => self.ip = ip + 1,
            Flow::Jump(addr) => self.ip = addr,
            Flow::Halt => self.halted = true,
        }
        self.cycles += 1;

        Ok(())
    }

    fn fetch(&self) -> VmResult<Word> {
        self.memory
            .get(self.ip)
            .map_err(|_| VmError::FetchOutOfBounds {
                ip: self.ip,
                len: self.memory.len(),
            })
    }

    fn mnemonic_arith<F>(&mut self, operand: u32, func: F) -> VmResult<Flow>
    where
        F: Fn(Word, Word) -> Word,
    {
        let val = self.memory.get(operand as usize)?;
        self.acc = func(self.acc, val);
        Ok(Flow::Next)
    }

    fn mnemonic_add(&mut self, operand: u32) -> VmResult<Flow> {
        self.mnemonic_arith(operand, |acc, val| acc.wrapping_add(val))
    }

    fn mnemonic_sub(&mut self, operand: u32) -> VmResult<Flow> {
        self.mnemonic_arith(operand, |acc, val| acc.wrapping_sub(val))
    }

    fn mnemonic_sta(&mut self, operand: u32) -> VmResult<Flow> {
        self.memory.set(operand as usize, self.acc)?;
        Ok(Flow::Next)
    }

    fn mnemonic_lda(&mut self, operand: u32) -> VmResult<Flow> {
        self.acc = self.memory.get(operand as usize)?;
        Ok(Flow::Next)
    }

    fn mnemonic_branch_if(&self, operand: u32, taken: bool) -> Flow {
        if taken {
            Flow::Jump(operand as usize)
        } else {
            Flow::Next
        }
    }

    fn mnemonic_io(&mut self, operand: u32) -> VmResult<Flow> {
        let op = IoOp::try_from(operand).map_err(|operand| VmError::InvalidIoOperand {
            operand,
            ip: self.ip,
        })?;

        match op {
            IoOp::INP => self.acc = self.io.read_num()?,
            IoOp::OUT => self.io.write_num(self.acc)?,
            IoOp::OTC if !self.extensions => {
                return Err(VmError::ExtensionDisabled { ip: self.ip })
            }
            IoOp::OTC => self.io.write_char(self.acc)?,
        }
        Ok(Flow::Next)
    }
}
