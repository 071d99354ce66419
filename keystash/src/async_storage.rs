//! Asynchronous storage facade with a cache overlay
//!
//! [`AsyncStorage`] offers the same contract as [`crate::Storage`] over an
//! [`AsyncAdapter`]: every operation suspends at the adapter call. The
//! facade does not queue or order concurrent calls; two racing writes to
//! one key are settled by the backend.
//!
//! The cache overlay is a private [`MemoryAdapter`] holding already
//! serialized text. It is written and read synchronously and reaches the
//! backend only when [`AsyncStorage::sync_cache`] runs.
//!
//! ```text
//!  set_cache / get_cache / remove_cache      get / set / remove / pop
//!              │                                      │
//!              ▼                                      ▼
//!    ┌───────────────────┐   sync_cache()   ┌───────────────────┐
//!    │  overlay (memory) │ ───────────────▶ │  AsyncAdapter     │
//!    └───────────────────┘  one by one,     └───────────────────┘
//!                           overlay order
//! ```

use crate::adapter::{AsyncAdapter, MemoryAdapter};
use crate::define::{Define, Facade};
use crate::error::StorageError;
use crate::options::StorageOptions;
use crate::serializer::{from_store, to_store, JsonSerializer, Serializer};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use tracing::{debug, trace, warn};

/// Key/value facade over an asynchronous adapter
#[derive(Debug)]
pub struct AsyncStorage<A, S = JsonSerializer> {
    adapter: A,
    prefix: String,
    serializer: S,
    cache: MemoryAdapter,
}

impl<A: AsyncAdapter, S: Serializer> AsyncStorage<A, S> {
    /// The adapter is required; there is no in-memory default here.
    #[must_use]
    pub fn new(adapter: A, options: StorageOptions<S>) -> Self {
        Self {
            adapter,
            prefix: options.prefix,
            serializer: options.serializer,
            cache: MemoryAdapter::new(),
        }
    }

    #[must_use]
    pub fn adapter(&self) -> &A {
        &self.adapter
    }

    #[must_use]
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    fn full_key(&self, key: &str) -> String {
        format!("{}{key}", self.prefix)
    }

    /// # Errors
    ///
    /// Returns [`StorageError::Adapter`] if the adapter fails to read.
    pub async fn get(&self, key: &str) -> Result<Option<Value>, StorageError> {
        let raw = self
            .adapter
            .get_item(&self.full_key(key))
            .await
            .map_err(StorageError::adapter)?;
        Ok(from_store(&self.serializer, raw))
    }

    /// # Errors
    ///
    /// Returns [`StorageError::Adapter`] if the adapter fails to read.
    pub async fn get_as<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, StorageError> {
        Ok(self
            .get(key)
            .await?
            .and_then(|value| serde_json::from_value(value).ok()))
    }

    /// Returns `false` if serialization or the adapter failed.
    pub async fn set(&self, key: &str, value: Option<&Value>) -> bool {
        self.write(key, value, None).await
    }

    pub async fn set_with(&self, key: &str, value: Option<&Value>, config: &A::Config) -> bool {
        self.write(key, value, Some(config)).await
    }

    pub async fn set_as<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> bool {
        match serde_json::to_value(value) {
            Ok(value) => self.write(key, Some(&value), None).await,
            Err(e) => {
                debug!(key, error = %e, "set: value conversion failed");
                false
            }
        }
    }

    pub(crate) async fn write(
        &self,
        key: &str,
        value: Option<&Value>,
        config: Option<&A::Config>,
    ) -> bool {
        let text = match to_store(&self.serializer, value) {
            Ok(text) => text,
            Err(e) => {
                debug!(key, error = %e, "set: serialization failed");
                return false;
            }
        };
        match self
            .adapter
            .set_item(&self.full_key(key), &text, config)
            .await
        {
            Ok(()) => true,
            Err(e) => {
                debug!(key, error = %e, "set: adapter write failed");
                false
            }
        }
    }

    /// # Errors
    ///
    /// Returns [`StorageError::Adapter`] if the adapter fails to remove.
    pub async fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.adapter
            .remove_item(&self.full_key(key))
            .await
            .map_err(StorageError::adapter)
    }

    /// Read `key`, then remove it. Other tasks may interleave between the two.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Adapter`] if the read or the removal fails.
    pub async fn pop(&self, key: &str) -> Result<Option<Value>, StorageError> {
        let value = self.get(key).await?;
        self.remove(key).await?;
        Ok(value)
    }

    /// Clear the entire adapter. The overlay is left alone.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Adapter`] if the adapter fails to clear.
    pub async fn clear(&self) -> Result<(), StorageError> {
        self.adapter.clear().await.map_err(StorageError::adapter)
    }

    #[must_use]
    pub fn define(&self, key: impl Into<String>) -> Define<'_, Self> {
        Define::new(self, key, None)
    }

    #[must_use]
    pub fn define_with(&self, key: impl Into<String>, config: A::Config) -> Define<'_, Self> {
        Define::new(self, key, Some(config))
    }

    /// See [`crate::Storage::define_group`].
    pub fn define_group<L, K, I>(&self, mapping: I) -> BTreeMap<L, Define<'_, Self>>
    where
        L: Ord,
        K: Into<String>,
        I: IntoIterator<Item = (L, K)>,
    {
        mapping
            .into_iter()
            .map(|(name, key)| (name, self.define(key)))
            .collect()
    }

    /// Stage already serialized text in the overlay. `None` is ignored.
    pub fn set_cache(&self, key: &str, value: Option<&str>) {
        if let Some(value) = value {
            self.cache.set_item(key, value);
        }
    }

    #[must_use]
    pub fn get_cache(&self, key: &str) -> Option<String> {
        self.cache.get_item(key)
    }

    pub fn remove_cache(&self, key: &str) {
        self.cache.remove_item(key);
    }

    /// Write every overlay entry to the adapter, one at a time.
    ///
    /// Works on a snapshot taken when the call starts, in overlay order.
    /// Entries are written under the facade prefix and stay in the overlay.
    /// Stops at the first failing write; earlier writes are not rolled back.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Adapter`] from the first failing write.
    pub async fn sync_cache(&self) -> Result<(), StorageError> {
        let entries = self.cache.entries();
        let total = entries.len();
        for (key, value) in entries {
            trace!(key = %key, "syncing cache entry");
            if let Err(e) = self
                .adapter
                .set_item(&self.full_key(&key), &value, None)
                .await
            {
                warn!(key = %key, error = %e, "cache sync stopped");
                return Err(StorageError::adapter(e));
            }
        }
        debug!(entries = total, "cache synced");
        Ok(())
    }
}

impl<A: AsyncAdapter, S: Serializer> Facade for AsyncStorage<A, S> {
    type Config = A::Config;
}
