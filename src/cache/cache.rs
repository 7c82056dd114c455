use std::collections::HashMap;
use std::fmt;

use crate::error::{NnError, Result};
use crate::math::matrix::Matrix;

/// Names of the entries written by the forward and backward passes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CacheKey {
    /// The pass's input, `"input"`.
    Input,
    /// Pre-activation of layer i, `"z_<i>"`.
    Z(usize),
    /// Post-activation of layer i, `"a_<i>"`.
    A(usize),
    /// Backpropagated error of layer i, `"delta_<i>"`.
    Delta(usize),
}

impl CacheKey {
    /// Activation feeding layer `index`: the input for layer 0, `a_<index-1>` otherwise.
    pub fn layer_input(index: usize) -> CacheKey {
        match index {
            0 => CacheKey::Input,
            i => CacheKey::A(i - 1),
        }
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CacheKey::Input    => f.write_str("input"),
            CacheKey::Z(i)     => write!(f, "z_{i}"),
            CacheKey::A(i)     => write!(f, "a_{i}"),
            CacheKey::Delta(i) => write!(f, "delta_{i}"),
        }
    }
}

/// String-keyed store of intermediate matrices shared by the forward and
/// backward passes.
///
/// `put` takes ownership and replaces any previous value under the same key.
/// `get` hands out an independent copy, so mutating what it returns never
/// touches the stored value. Read-only borrows through `peek` are also
/// isolated: the borrow checker forbids mutation through them.
#[derive(Debug, Default, Clone)]
pub struct Cache {
    entries: HashMap<String, Matrix>,
}

impl Cache {
    pub fn new() -> Cache {
        Cache::default()
    }

    /// Stores `m` under `key`, dropping whatever was there before.
    pub fn put(&mut self, key: impl ToString, m: Matrix) {
        let key = key.to_string();
        log::trace!("cache put '{}' ({}x{})", key, m.rows(), m.cols());
        self.entries.insert(key, m);
    }

    /// Deep copy of the entry under `key`.
    pub fn get(&self, key: impl ToString) -> Result<Matrix> {
        self.peek(key).cloned()
    }

    /// Borrow of the entry under `key`.
    pub fn peek(&self, key: impl ToString) -> Result<&Matrix> {
        let key = key.to_string();
        self.entries
            .get(&key)
            .ok_or(NnError::MissingCacheEntry(key))
    }

    pub fn contains(&self, key: impl ToString) -> bool {
        self.entries.contains_key(&key.to_string())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Removes every entry.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Stored keys in sorted order.
    pub fn keys(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = self.entries.keys().map(String::as_str).collect();
        keys.sort_unstable();
        keys
    }
}
