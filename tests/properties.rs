//! Property-based checks of memory, encoding and branch invariants.

use lmc::cpu::CPU;
use lmc::io::Io;
use lmc::memory::Memory;
use lmc::{encode, opcode_of, operand_of, Word, OPERAND_MASK};
use proptest::prelude::*;

fn boot(words: &[Word]) -> CPU<&'static [u8], Vec<u8>> {
    CPU::new(Memory::copied(words), Io::new(&b""[..], Vec::new(), false))
}

proptest! {
    /// A write is visible to the next read of the same cell.
    #[test]
    fn prop_set_then_get(len in 1usize..256, seed in any::<usize>(), val in any::<i32>()) {
        let index = seed % len;
        let mut mem = Memory::zeroed(len);
        mem.set(index, val).unwrap();
        prop_assert_eq!(mem.get(index).unwrap(), val);
    }

    /// Every index at or past the end is rejected for reads and writes.
    #[test]
    fn prop_out_of_range_rejected(len in 0usize..256, past in 0usize..1024) {
        let mut mem = Memory::zeroed(len);
        prop_assert!(mem.get(len + past).is_err());
        prop_assert!(mem.set(len + past, 1).is_err());
    }

    /// Resizing keeps the common prefix and zero-fills the rest.
    #[test]
    fn prop_copy_resized(
        src in prop::collection::vec(any::<i32>(), 0..64),
        len in 0usize..128,
    ) {
        let mem = Memory::copy_resized(&src, len);
        prop_assert_eq!(mem.len(), len);
        let kept = src.len().min(len);
        prop_assert_eq!(&mem.words()[..kept], &src[..kept]);
        prop_assert!(mem.words()[kept..].iter().all(|&w| w == 0));
    }

    /// Decoding undoes encoding for in-range fields.
    #[test]
    fn prop_fields_survive_encoding(opcode in 0u32..32, operand in 0u32..=OPERAND_MASK) {
        let word = encode(opcode, operand);
        prop_assert_eq!(opcode_of(word), opcode);
        prop_assert_eq!(operand_of(word), operand);
    }

    /// ADD matches wrapping 32-bit addition for any pair.
    #[test]
    fn prop_add_wraps(a in any::<i32>(), b in any::<i32>()) {
        let mut cpu = boot(&[encode(5, 3), encode(1, 4), 0, a, b]);
        cpu.run().unwrap();
        prop_assert_eq!(cpu.acc(), a.wrapping_add(b));
    }

    /// SUB matches wrapping 32-bit subtraction for any pair.
    #[test]
    fn prop_sub_wraps(a in any::<i32>(), b in any::<i32>()) {
        let mut cpu = boot(&[encode(5, 3), encode(2, 4), 0, a, b]);
        cpu.run().unwrap();
        prop_assert_eq!(cpu.acc(), a.wrapping_sub(b));
    }

    /// BRZ is taken exactly on zero, BRP exactly on non-negative values.
    #[test]
    fn prop_conditional_branches(acc in any::<i32>()) {
        // LDA 3; BRZ 9; HLT; acc
        let brz = [encode(5, 3), encode(7, 9), 0, acc];
        let mut cpu = boot(&brz);
        cpu.tick().unwrap();
        cpu.tick().unwrap();
        prop_assert_eq!(cpu.ip(), if acc == 0 { 9 } else { 2 });

        let brp = [encode(5, 3), encode(8, 9), 0, acc];
        let mut cpu = boot(&brp);
        cpu.tick().unwrap();
        cpu.tick().unwrap();
        prop_assert_eq!(cpu.ip(), if acc >= 0 { 9 } else { 2 });
    }
}
