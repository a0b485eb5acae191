//! Persistent single-string preferences.
//!
//! The page persists exactly one value (the theme name), but the store is a
//! trait so the web host can plug in `localStorage` while tests use
//! [`MemoryStore`].
//!
//! # Failure modes
//!
//! | Failure | Behavior |
//! |---------|----------|
//! | Store unavailable | `load` returns an error; caller falls back to the default |
//! | Write rejected (quota, privacy mode) | `save` returns an error; caller logs it |
//! | Missing key | `load` returns `Ok(None)` |

use std::cell::RefCell;
use std::collections::HashMap;

use crate::error::PreferenceError;

/// Key-value store for string preferences.
pub trait PreferenceStore {
    /// Human-readable name for logging.
    fn name(&self) -> &str;

    fn load(&self, key: &str) -> Result<Option<String>, PreferenceError>;

    fn save(&self, key: &str, value: &str) -> Result<(), PreferenceError>;
}

/// In-memory store for tests and hosts without persistent storage.
#[derive(Debug, Default)]
pub struct MemoryStore {
    data: RefCell<HashMap<String, String>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populate with one entry.
    #[must_use]
    pub fn with_entry(key: &str, value: &str) -> Self {
        let store = Self::new();
        store
            .data
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        store
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.data.borrow().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.borrow().is_empty()
    }
}

impl PreferenceStore for MemoryStore {
    fn name(&self) -> &str {
        "MemoryStore"
    }

    fn load(&self, key: &str) -> Result<Option<String>, PreferenceError> {
        Ok(self.data.borrow().get(key).cloned())
    }

    fn save(&self, key: &str, value: &str) -> Result<(), PreferenceError> {
        self.data
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}
