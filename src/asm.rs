//! Assembler for LMC source text.
//!
//! One statement per line, `[label[:]] [MNEMONIC [operand]]`, with `//`
//! starting a comment. A line holding only a label names the next
//! statement. Operands are decimal numbers or labels.
//!
//! ```text
//!         INP
//!         STA x
//!         INP
//!         SUB x
//!         BRP addx
//!         LDA zero
//! addx    ADD x
//!         OUT
//! zero    HLT
//! x       DAT
//! ```

use crate::cpu::{IoOp, OpCode};
use crate::{encode, Word, OPERAND_MASK};
use std::collections::HashMap;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AsmError {
    #[error("line {line}: unknown mnemonic `{word}`")]
    UnknownMnemonic { line: usize, word: String },

    #[error("line {line}: expected `[label] [mnemonic [operand]]`")]
    Malformed { line: usize },

    #[error("line {line}: label `{label}` used more than once")]
    DuplicateLabel { line: usize, label: String },

    #[error("line {line}: label `{label}` is not defined")]
    UndefinedLabel { line: usize, label: String },

    #[error("line {line}: {mnemonic:?} requires an operand")]
    MissingOperand { line: usize, mnemonic: Mnemonic },

    #[error("line {line}: {mnemonic:?} takes no operand")]
    UnexpectedOperand { line: usize, mnemonic: Mnemonic },

    #[error("line {line}: operand {value} out of range for {mnemonic:?}")]
    OperandOutOfRange {
        line: usize,
        mnemonic: Mnemonic,
        value: String,
    },

    #[error("line {line}: OTC is a non-standard extension and extensions are disabled")]
    ExtensionDisabled { line: usize },
}

pub type AsmResult<T> = Result<T, AsmError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mnemonic {
    HLT,
    ADD,
    SUB,
    STA,
    LDA,
    BRA,
    BRZ,
    BRP,
    INP,
    OUT,
    OTC,
    DAT,
}

impl Mnemonic {
    pub fn parse(word: &str) -> Option<Self> {
        let m = match word {
            "HLT" => Mnemonic::HLT,
            "ADD" => Mnemonic::ADD,
            "SUB" => Mnemonic::SUB,
            "STA" | "STO" => Mnemonic::STA,
            "LDA" => Mnemonic::LDA,
            "BRA" => Mnemonic::BRA,
            "BRZ" => Mnemonic::BRZ,
            "BRP" => Mnemonic::BRP,
            "INP" => Mnemonic::INP,
            "OUT" => Mnemonic::OUT,
            "OTC" => Mnemonic::OTC,
            "DAT" => Mnemonic::DAT,
            _ => return None,
        };
        Some(m)
    }

    fn addressed(self) -> Option<OpCode> {
        match self {
            Mnemonic::ADD => Some(OpCode::ADD),
            Mnemonic::SUB => Some(OpCode::SUB),
            Mnemonic::STA => Some(OpCode::STA),
            Mnemonic::LDA => Some(OpCode::LDA),
            Mnemonic::BRA => Some(OpCode::BRA),
            Mnemonic::BRZ => Some(OpCode::BRZ),
            Mnemonic::BRP => Some(OpCode::BRP),
            _ => None,
        }
    }

    fn io(self) -> Option<IoOp> {
        match self {
            Mnemonic::INP => Some(IoOp::INP),
            Mnemonic::OUT => Some(IoOp::OUT),
            Mnemonic::OTC => Some(IoOp::OTC),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Operand<'a> {
    Number(i64),
    // digits that do not fit in an i64
    Overflow(&'a str),
    Label(&'a str),
}

impl<'a> Operand<'a> {
    fn parse(word: &'a str) -> Self {
        let digits = word.strip_prefix(|c: char| c == '+' || c == '-').unwrap_or(word);
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Operand::Label(word);
        }
        word.parse()
            .map(Operand::Number)
            .unwrap_or(Operand::Overflow(word))
    }
}

#[derive(Debug)]
struct Statement<'a> {
    line: usize,
    mnemonic: Mnemonic,
    operand: Option<Operand<'a>>,
}

#[derive(Debug, Clone, Copy)]
pub struct Assembler {
    extensions: bool,
    append_hlt: bool,
}

impl Default for Assembler {
    fn default() -> Self {
        Assembler {
            extensions: true,
            append_hlt: false,
        }
    }
}

impl Assembler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allow `OTC`. On by default.
    pub fn extensions(mut self, enabled: bool) -> Self {
        self.extensions = enabled;
        self
    }

    /// End the program with an extra `HLT`, which also takes any trailing labels.
    pub fn append_hlt(mut self, enabled: bool) -> Self {
        self.append_hlt = enabled;
        self
    }

    pub fn assemble(&self, src: &str) -> AsmResult<Vec<Word>> {
        let mut pass = Pass::default();
        let mut last_line = 0;

        for (idx, text) in src.lines().enumerate() {
            last_line = idx + 1;
            self.parse_line(&mut pass, last_line, text)?;
        }

        if self.append_hlt {
            pass.push(Statement {
                line: last_line + 1,
                mnemonic: Mnemonic::HLT,
                operand: None,
            })?;
        } else {
            let end = pass.statements.len();
            pass.bind_queued(end)?;
        }

        pass.statements
            .iter()
            .map(|stmt| pass.encode(stmt))
            .collect()
    }

    fn parse_line<'a>(&self, pass: &mut Pass<'a>, line: usize, text: &'a str) -> AsmResult<()> {
        let code = text.split("//").next().unwrap_or("");
        let words: Vec<&str> = code.split_whitespace().collect();
        let known = |w: &str| Mnemonic::parse(w).is_some();

        let (label, op, operand) = match words.as_slice() {
            [] => return Ok(()),
            [label, op, operand] => (Some(*label), Some(*op), Some(*operand)),
            [op, operand] if known(*op) => (None, Some(*op), Some(*operand)),
            [label, op] if known(*op) => (Some(*label), Some(*op), None),
            [a, _] => {
                return Err(AsmError::UnknownMnemonic {
                    line,
                    word: a.to_string(),
                })
            }
            [op] if known(*op) => (None, Some(*op), None),
            [label] => (Some(*label), None, None),
            _ => return Err(AsmError::Malformed { line }),
        };

        if let Some(label) = label {
            pass.queued.push((label.strip_suffix(':').unwrap_or(label), line));
        }

        if let Some(op) = op {
            let mnemonic = Mnemonic::parse(op).ok_or_else(|| AsmError::UnknownMnemonic {
                line,
                word: op.to_string(),
            })?;
            if mnemonic == Mnemonic::OTC && !self.extensions {
                return Err(AsmError::ExtensionDisabled { line });
            }
            pass.push(Statement {
                line,
                mnemonic,
                operand: operand.map(Operand::parse),
            })?;
        }

        Ok(())
    }
}

#[derive(Debug, Default)]
struct Pass<'a> {
    statements: Vec<Statement<'a>>,
    labels: HashMap<&'a str, usize>,
    queued: Vec<(&'a str, usize)>,
}

impl<'a> Pass<'a> {
    fn push(&mut self, stmt: Statement<'a>) -> AsmResult<()> {
        self.statements.push(stmt);
        self.bind_queued(self.statements.len() - 1)
    }

    fn bind_queued(&mut self, addr: usize) -> AsmResult<()> {
        for (label, line) in self.queued.drain(..) {
            if self.labels.insert(label, addr).is_some() {
                return Err(AsmError::DuplicateLabel {
                    line,
                    label: label.to_string(),
                });
            }
        }
        Ok(())
    }

    fn resolve(&self, stmt: &Statement<'a>) -> AsmResult<Option<i64>> {
        match stmt.operand {
            None => Ok(None),
            Some(Operand::Number(n)) => Ok(Some(n)),
            Some(Operand::Overflow(word)) => Err(AsmError::OperandOutOfRange {
                line: stmt.line,
                mnemonic: stmt.mnemonic,
                value: word.to_string(),
            }),
            Some(Operand::Label(label)) => self
                .labels
                .get(label)
                .map(|&addr| Some(addr as i64))
                .ok_or_else(|| AsmError::UndefinedLabel {
                    line: stmt.line,
                    label: label.to_string(),
                }),
        }
    }

    fn encode(&self, stmt: &Statement<'a>) -> AsmResult<Word> {
        let value = self.resolve(stmt)?;
        let line = stmt.line;
        let mnemonic = stmt.mnemonic;
        let out_of_range = |value: i64| AsmError::OperandOutOfRange {
            line,
            mnemonic,
            value: value.to_string(),
        };
        let address = |value: i64| {
            if (0..=OPERAND_MASK as i64).contains(&value) {
                Ok(value as u32)
            } else {
                Err(out_of_range(value))
            }
        };

        if let Some(io) = mnemonic.io() {
            return match value {
                Some(_) => Err(AsmError::UnexpectedOperand { line, mnemonic }),
                None => Ok(encode(OpCode::IO as u32, io as u32)),
            };
        }

        if let Some(opcode) = mnemonic.addressed() {
            let value = value.ok_or(AsmError::MissingOperand { line, mnemonic })?;
            return Ok(encode(opcode as u32, address(value)?));
        }

        match mnemonic {
            Mnemonic::HLT => Ok(encode(OpCode::HLT as u32, address(value.unwrap_or(0))?)),
            _ => {
                let value = value.unwrap_or(0);
                Word::try_from(value).map_err(|_| out_of_range(value))
            }
        }
    }
}

/// Assembles `src` with extensions enabled and no trailing `HLT`.
pub fn assemble(src: &str) -> AsmResult<Vec<Word>> {
    Assembler::default().assemble(src)
}
