use serde::Serialize;

use crate::error::FetchError;

/// Options fetched for the current upstream selection.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OptionSet<T> {
    pub loading: bool,
    pub error: bool,
    pub items: Vec<T>,
}

impl<T> Default for OptionSet<T> {
    fn default() -> Self {
        Self {
            loading: false,
            error: false,
            items: Vec::new(),
        }
    }
}

impl<T> OptionSet<T> {
    /// Discard whatever was loaded and mark a fetch as pending.
    pub fn reset_loading(&mut self) {
        self.loading = true;
        self.error = false;
        self.items.clear();
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Store a fetch outcome. On failure the set is left empty with `error`
    /// raised, and the error is handed back for the caller to report.
    pub fn resolve(&mut self, result: Result<Vec<T>, FetchError>) -> Option<FetchError> {
        self.loading = false;
        match result {
            Ok(items) => {
                self.error = false;
                self.items = items;
                None
            }
            Err(e) => {
                self.error = true;
                self.items.clear();
                Some(e)
            }
        }
    }

    pub fn is_ready(&self) -> bool {
        !self.loading && !self.error
    }
}

/// Identifies one load started by a [`KeyedLoader`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadTicket<K> {
    pub key: K,
    pub generation: u64,
}

/// Tracks which upstream key the wizard currently wants data for. Every
/// `begin` supersedes all earlier tickets, so a late response for an old
/// key can be recognised and dropped.
#[derive(Debug, Clone)]
pub struct KeyedLoader<K> {
    current: Option<K>,
    generation: u64,
}

impl<K> Default for KeyedLoader<K> {
    fn default() -> Self {
        Self {
            current: None,
            generation: 0,
        }
    }
}

impl<K: Clone + PartialEq> KeyedLoader<K> {
    pub fn begin(&mut self, key: K) -> LoadTicket<K> {
        self.generation += 1;
        self.current = Some(key.clone());
        LoadTicket {
            key,
            generation: self.generation,
        }
    }

    /// Forget the current key; every outstanding ticket becomes stale.
    pub fn cancel(&mut self) {
        self.generation += 1;
        self.current = None;
    }

    pub fn is_current(&self, ticket: &LoadTicket<K>) -> bool {
        ticket.generation == self.generation && self.current.as_ref() == Some(&ticket.key)
    }

    pub fn current_key(&self) -> Option<&K> {
        self.current.as_ref()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }
}
