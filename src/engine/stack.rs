//! Saved cursors for PUSH and POP.

use std::hash::Hash;

use crate::engine::cursor::Cursor;
use crate::error::ModificationError;

/// LIFO of cursor snapshots.
///
/// Snapshots are owned copies, so later moves of the live cursor never
/// reach a saved one.
#[derive(Debug, Clone)]
pub struct Stack<N> {
    frames: Vec<Cursor<N>>,
}

impl<N: Copy + Eq + Hash> Stack<N> {
    pub fn new() -> Self {
        Self { frames: Vec::new() }
    }

    pub fn push(&mut self, cursor: &Cursor<N>) {
        self.frames.push(cursor.clone());
    }

    pub fn pop(&mut self) -> Result<Cursor<N>, ModificationError> {
        self.frames.pop().ok_or(ModificationError::EmptyStack)
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}

impl<N: Copy + Eq + Hash> Default for Stack<N> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pop_empty_fails() {
        let mut stack = Stack::<u32>::new();
        assert_eq!(stack.pop(), Err(ModificationError::EmptyStack));
    }

    #[test]
    fn test_last_in_first_out() {
        let mut stack = Stack::new();
        stack.push(&Cursor::single(1u32));
        stack.push(&Cursor::single(2u32));
        assert_eq!(stack.len(), 2);
        assert_eq!(stack.pop().unwrap(), Cursor::single(2));
        assert_eq!(stack.pop().unwrap(), Cursor::single(1));
        assert!(stack.is_empty());
    }
}
