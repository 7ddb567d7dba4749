//! Reversible scalar cells.

use crate::trail::Env;

/// A trailed 32-bit integer.
///
/// Reads are free; a write registers one undo record per open world at most.
#[derive(Debug, Clone)]
pub struct ReversibleInt {
    env: Env,
    index: usize,
}

impl ReversibleInt {
    pub(crate) fn new(env: Env, index: usize) -> Self {
        Self { env, index }
    }

    #[inline]
    pub fn get(&self) -> i32 {
        self.env.int(self.index)
    }

    #[inline]
    pub fn set(&self, value: i32) {
        self.env.set_int(self.index, value);
    }

    /// Adds `delta` and returns the new value.
    pub fn add(&self, delta: i32) -> i32 {
        let value = self.get() + delta;
        self.set(value);
        value
    }
}

/// A trailed 64-bit integer.
#[derive(Debug, Clone)]
pub struct ReversibleLong {
    env: Env,
    index: usize,
}

impl ReversibleLong {
    pub(crate) fn new(env: Env, index: usize) -> Self {
        Self { env, index }
    }

    #[inline]
    pub fn get(&self) -> i64 {
        self.env.long(self.index)
    }

    #[inline]
    pub fn set(&self, value: i64) {
        self.env.set_long(self.index, value);
    }

    /// Adds `delta` and returns the new value.
    pub fn add(&self, delta: i64) -> i64 {
        let value = self.get() + delta;
        self.set(value);
        value
    }
}
