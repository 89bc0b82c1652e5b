#[macro_use]
pub mod log;

pub mod asm;
pub mod cli;
pub mod cpu;
pub mod error;
pub mod io;
pub mod memory;

pub type Word = i32;

pub const OPCODE_BITS: u32 = 5;
pub const OPERAND_BITS: u32 = 27;
pub const OPCODE_MASK: u32 = (1 << OPCODE_BITS) - 1;
pub const OPERAND_MASK: u32 = 0x07ff_ffff;

/// Top five bits of an instruction word.
pub fn opcode_of(word: Word) -> u32 {
    ((word as u32) >> OPERAND_BITS) & OPCODE_MASK
}

/// Low 27 bits of an instruction word, unsigned.
pub fn operand_of(word: Word) -> u32 {
    (word as u32) & OPERAND_MASK
}

/// Packs an opcode and operand into one word. Bits outside the fields are dropped.
pub fn encode(opcode: u32, operand: u32) -> Word {
    (((opcode & OPCODE_MASK) << OPERAND_BITS) | (operand & OPERAND_MASK)) as Word
}

/// Encodes an `(opcode, operand)` pair. Opcode 0 marks a raw data word,
/// so the operand is stored as-is, sign included.
pub fn encode_pair(opcode: u32, operand: Word) -> Word {
    if opcode == 0 {
        operand
    } else {
        encode(opcode, operand as u32)
    }
}

pub fn encode_pairs(pairs: &[(u32, Word)]) -> Vec<Word> {
    pairs
        .iter()
        .map(|&(opcode, operand)| encode_pair(opcode, operand))
        .collect()
}
