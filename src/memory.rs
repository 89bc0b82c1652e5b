use crate::error::{VmError, VmResult};
use crate::Word;

/// Flat word-addressed storage. Knows nothing about instructions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Memory(Vec<Word>);

impl Memory {
    /// Takes ownership of `words` as the whole of memory.
    pub fn from_vec(words: Vec<Word>) -> Self {
        Memory(words)
    }

    pub fn zeroed(len: usize) -> Self {
        Memory(vec![0; len])
    }

    pub fn copied(src: &[Word]) -> Self {
        Memory(src.to_vec())
    }

    /// Copies `src` into a memory of `len` words, truncating or zero-padding the tail.
    pub fn copy_resized(src: &[Word], len: usize) -> Self {
        let mut words = vec![0; len];
        let n = src.len().min(len);
        words[..n].copy_from_slice(&src[..n]);
        Memory(words)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn words(&self) -> &[Word] {
        &self.0
    }

    pub fn get(&self, index: usize) -> VmResult<Word> {
        self.0.get(index).copied().ok_or(VmError::ReadOutOfBounds {
            index,
            len: self.len(),
        })
    }

    pub fn set(&mut self, index: usize, val: Word) -> VmResult<()> {
        let len = self.len();
        match self.0.get_mut(index) {
            Some(cell) => {
                *cell = val;
                Ok(())
            }
            None => Err(VmError::WriteOutOfBounds { index, len }),
        }
    }
}
