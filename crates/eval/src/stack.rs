//! The boolean scratch stack used during postfix evaluation.

use smallvec::SmallVec;
use thiserror::Error;

/// Inline capacity of the stack; expressions this shallow never touch the
/// heap.
const INLINE_SLOTS: usize = 32;

/// Number of slots reserved per spill growth.
const GROWTH_SLOTS: usize = 64;

/// Errors produced by [`EvalStack`] operations.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum StackError {
    /// Popped a logically empty stack.
    #[error("evaluation stack underflow")]
    Underflow,
    /// Growing the backing storage failed.
    #[error("evaluation stack could not be grown")]
    OutOfMemory,
}

/// Growable boolean stack for postfix evaluation.
///
/// Caller-owned scratch space: one evaluation resets it logically via
/// [`clear`](Self::clear) while the allocated capacity is retained, so
/// repeated dispatch passes reuse the same backing storage. Growth goes
/// through `try_reserve`, so allocator exhaustion is reported to the caller
/// instead of aborting the boot flow.
#[derive(Clone, Debug, Default)]
pub struct EvalStack {
    values: SmallVec<[bool; INLINE_SLOTS]>,
}

impl EvalStack {
    /// Creates an empty stack.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a value to the top of the stack, growing the backing storage
    /// if it is full.
    pub fn push(&mut self, value: bool) -> Result<(), StackError> {
        if self.values.len() == self.values.capacity() {
            self.values.try_reserve(GROWTH_SLOTS).map_err(|_| StackError::OutOfMemory)?;
        }
        self.values.push(value);
        Ok(())
    }

    /// Removes and returns the top value.
    pub fn pop(&mut self) -> Result<bool, StackError> {
        self.values.pop().ok_or(StackError::Underflow)
    }

    /// Resets the logical length to zero, retaining capacity.
    pub fn clear(&mut self) {
        self.values.clear();
    }

    /// Number of values currently on the stack.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns `true` if the stack is logically empty.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_pop_is_lifo() {
        let mut stack = EvalStack::new();
        stack.push(true).unwrap();
        stack.push(false).unwrap();
        assert_eq!(stack.pop(), Ok(false));
        assert_eq!(stack.pop(), Ok(true));
        assert_eq!(stack.pop(), Err(StackError::Underflow));
    }

    #[test]
    fn pop_empty_underflows() {
        let mut stack = EvalStack::new();
        assert_eq!(stack.pop(), Err(StackError::Underflow));
        // Still usable afterwards.
        stack.push(true).unwrap();
        assert_eq!(stack.pop(), Ok(true));
    }

    #[test]
    fn grows_past_inline_capacity() {
        let mut stack = EvalStack::new();
        for i in 0..INLINE_SLOTS * 4 {
            stack.push(i % 2 == 0).unwrap();
        }
        assert_eq!(stack.len(), INLINE_SLOTS * 4);
        for i in (0..INLINE_SLOTS * 4).rev() {
            assert_eq!(stack.pop(), Ok(i % 2 == 0));
        }
        assert!(stack.is_empty());
    }

    #[test]
    fn clear_retains_capacity() {
        let mut stack = EvalStack::new();
        for _ in 0..INLINE_SLOTS * 4 {
            stack.push(true).unwrap();
        }
        let spilled = stack.values.capacity();
        stack.clear();
        assert!(stack.is_empty());
        assert_eq!(stack.values.capacity(), spilled);
    }
}
