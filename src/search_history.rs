//! Search History

use std::{fmt, sync::Arc};

use tracing::warn;

use crate::storage::{KeyValueStore, StorageError};

/// Key of the goods search history.
pub const GOODS_HISTORY_KEY: &str = "griya_history_banten";

/// Key of the venue search history.
pub const VENUE_HISTORY_KEY: &str = "griya_history_venue";

/// Number of terms kept per context.
pub const HISTORY_LIMIT: usize = 5;

/// Recent distinct search terms for one search context, most recent first.
pub struct SearchHistory {
    storage: Arc<dyn KeyValueStore>,
    key: String,
}

impl fmt::Debug for SearchHistory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SearchHistory")
            .field("key", &self.key)
            .finish_non_exhaustive()
    }
}

impl SearchHistory {
    /// History stored under `key`.
    pub fn new(storage: Arc<dyn KeyValueStore>, key: impl Into<String>) -> Self {
        Self {
            storage,
            key: key.into(),
        }
    }

    /// Stored terms; malformed storage reads as empty.
    pub fn list(&self) -> Vec<String> {
        let stored = match self.storage.read(&self.key) {
            Ok(stored) => stored,
            Err(err) => {
                warn!(key = %self.key, error = %err, "treating unreadable search history as empty");
                return Vec::new();
            }
        };

        stored
            .and_then(|contents| serde_json::from_str(&contents).ok())
            .unwrap_or_default()
    }

    /// Puts a term at the front, dropping earlier case-insensitive duplicates
    /// and anything past [`HISTORY_LIMIT`]. Blank terms are ignored.
    ///
    /// # Errors
    ///
    /// Returns an error if the history cannot be written.
    pub fn record(&self, term: &str) -> Result<Vec<String>, StorageError> {
        if term.trim().is_empty() {
            return Ok(self.list());
        }

        let folded = term.to_lowercase();

        let history: Vec<String> = std::iter::once(term.to_string())
            .chain(
                self.list()
                    .into_iter()
                    .filter(|previous| previous.to_lowercase() != folded),
            )
            .take(HISTORY_LIMIT)
            .collect();

        self.storage
            .write(&self.key, &serde_json::to_string(&history)?)?;

        Ok(history)
    }

    /// Forgets every term.
    ///
    /// # Errors
    ///
    /// Returns an error if the key cannot be removed.
    pub fn clear(&self) -> Result<(), StorageError> {
        self.storage.remove(&self.key)
    }
}
