//! Key registry: key → slot, in registration order

use std::collections::HashMap;

use crate::error::IndexError;

/// Registered keys with stable slots
///
/// Slots are assigned in registration order and define the tie-break order
/// of nearest-neighbour results.
#[derive(Debug, Clone, Default)]
pub struct KeyIndex {
    slots: HashMap<String, usize>,
    keys: Vec<String>,
}

impl KeyIndex {
    /// Register `keys` in order.
    ///
    /// With `allow_duplicates = false` a repeated key fails with
    /// [`IndexError::DuplicateKey`]. With `true` the repeat keeps the slot of
    /// its first occurrence.
    pub fn build<I, S>(keys: I, allow_duplicates: bool) -> Result<Self, IndexError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut index = Self::default();
        for key in keys {
            index.register(key.into(), allow_duplicates)?;
        }
        Ok(index)
    }

    /// Register one key and return its slot
    pub fn register(&mut self, key: String, allow_duplicates: bool) -> Result<usize, IndexError> {
        if let Some(slot) = self.slots.get(&key) {
            if allow_duplicates {
                return Ok(*slot);
            }
            return Err(IndexError::DuplicateKey(key));
        }

        let slot = self.keys.len();
        self.slots.insert(key.clone(), slot);
        self.keys.push(key);
        Ok(slot)
    }

    pub fn slot(&self, key: &str) -> Option<usize> {
        self.slots.get(key).copied()
    }

    pub fn key(&self, slot: usize) -> Option<&str> {
        self.keys.get(slot).map(String::as_str)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.slots.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Keys in slot order
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.keys.iter().map(String::as_str)
    }
}
