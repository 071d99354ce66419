//! Construction options shared by every facade

use crate::serializer::{JsonSerializer, Serializer};
use serde::Deserialize;

/// Prefix and serializer for a facade
///
/// The adapter is passed to the facade constructor separately; the sync
/// facade defaults it to [`crate::MemoryAdapter`], the async facade has no
/// default.
///
/// # Example
///
/// ```
/// use keystash::{Storage, StorageOptions};
///
/// let storage = Storage::in_memory(StorageOptions::new().prefix("app:"));
/// assert_eq!(storage.prefix(), "app:");
/// ```
#[derive(Debug, Clone, Default)]
pub struct StorageOptions<S = JsonSerializer> {
    pub(crate) prefix: String,
    pub(crate) serializer: S,
}

#[derive(Deserialize)]
struct OptionsFile {
    #[serde(default)]
    prefix: String,
}

impl StorageOptions {
    /// Empty prefix, JSON serializer
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Read options from a JSON object such as `{"prefix": "app:"}`.
    ///
    /// Missing fields keep their defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON input is malformed.
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        let file: OptionsFile = serde_json::from_str(text)?;
        Ok(Self::new().prefix(file.prefix))
    }
}

impl<S> StorageOptions<S> {
    #[must_use]
    pub fn prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    #[must_use]
    pub fn serializer<T: Serializer>(self, serializer: T) -> StorageOptions<T> {
        StorageOptions {
            prefix: self.prefix,
            serializer,
        }
    }
}
