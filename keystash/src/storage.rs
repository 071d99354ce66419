//! Synchronous storage facade
//!
//! [`Storage`] layers a key prefix and a [`Serializer`] over any [`Adapter`].
//! Every key it touches lives under `prefix + key` in the adapter's
//! keyspace. The one exception is [`Storage::clear`], which clears the whole
//! adapter: prefixes separate reads and writes, not clears.
//!
//! Write failures (serializer or adapter) are swallowed and reported as a
//! `false` return from `set`. Read, remove and clear failures of the
//! adapter are returned as [`StorageError`].

use crate::adapter::{Adapter, MemoryAdapter};
use crate::define::{Define, Facade};
use crate::error::StorageError;
use crate::options::StorageOptions;
use crate::serializer::{from_store, to_store, JsonSerializer, Serializer};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use tracing::debug;

/// Key/value facade over a synchronous adapter
#[derive(Debug)]
pub struct Storage<A = MemoryAdapter, S = JsonSerializer> {
    adapter: A,
    prefix: String,
    serializer: S,
}

impl Storage {
    /// Facade over a fresh [`MemoryAdapter`]
    #[must_use]
    pub fn in_memory<S: Serializer>(options: StorageOptions<S>) -> Storage<MemoryAdapter, S> {
        Storage::new(MemoryAdapter::new(), options)
    }
}

impl Default for Storage {
    fn default() -> Self {
        Self::in_memory(StorageOptions::new())
    }
}

impl<A: Adapter, S: Serializer> Storage<A, S> {
    #[must_use]
    pub fn new(adapter: A, options: StorageOptions<S>) -> Self {
        Self {
            adapter,
            prefix: options.prefix,
            serializer: options.serializer,
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

    /// Read the value stored under `key`.
    ///
    /// Absent keys and stored nulls give `Ok(None)`; text the serializer
    /// cannot parse comes back as a string value.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Adapter`] if the adapter fails to read.
    pub fn get(&self, key: &str) -> Result<Option<Value>, StorageError> {
        let raw = self
            .adapter
            .get_item(&self.full_key(key))
            .map_err(StorageError::adapter)?;
        Ok(from_store(&self.serializer, raw))
    }

    /// Read and convert into `T`; a value of the wrong shape gives `None`.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Adapter`] if the adapter fails to read.
    pub fn get_as<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, StorageError> {
        Ok(self
            .get(key)?
            .and_then(|value| serde_json::from_value(value).ok()))
    }

    /// Store `value` under `key`; `None` stores the serializer's null.
    ///
    /// Returns `false` if serialization or the adapter failed.
    pub fn set(&self, key: &str, value: Option<&Value>) -> bool {
        self.write(key, value, None)
    }

    /// Like [`Storage::set`], passing `config` through to the adapter.
    pub fn set_with(&self, key: &str, value: Option<&Value>, config: &A::Config) -> bool {
        self.write(key, value, Some(config))
    }

    /// Convert `value` with serde and store it.
    pub fn set_as<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> bool {
        match serde_json::to_value(value) {
            Ok(value) => self.write(key, Some(&value), None),
            Err(e) => {
                debug!(key, error = %e, "set: value conversion failed");
                false
            }
        }
    }

    pub(crate) fn write(
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
        match self.adapter.set_item(&self.full_key(key), &text, config) {
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
    pub fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.adapter
            .remove_item(&self.full_key(key))
            .map_err(StorageError::adapter)
    }

    /// Read `key`, then remove it. Not atomic.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Adapter`] if the read or the removal fails.
    pub fn pop(&self, key: &str) -> Result<Option<Value>, StorageError> {
        let value = self.get(key)?;
        self.remove(key)?;
        Ok(value)
    }

    /// Clear the entire adapter, including keys outside this prefix.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Adapter`] if the adapter fails to clear.
    pub fn clear(&self) -> Result<(), StorageError> {
        self.adapter.clear().map_err(StorageError::adapter)
    }

    /// Handle bound to `key`.
    #[must_use]
    pub fn define(&self, key: impl Into<String>) -> Define<'_, Self> {
        Define::new(self, key, None)
    }

    /// Handle bound to `key` whose writes default to `config`.
    #[must_use]
    pub fn define_with(&self, key: impl Into<String>, config: A::Config) -> Define<'_, Self> {
        Define::new(self, key, Some(config))
    }

    /// Define every physical key in `mapping`, indexed by its logical name.
    ///
    /// Physical keys are not checked for uniqueness; two names mapping to
    /// one key share a slot. [`crate::key_group!`] gives the same result
    /// with the logical names as struct fields.
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
}

impl<A: Adapter, S: Serializer> Facade for Storage<A, S> {
    type Config = A::Config;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_prefix_applied_on_write_and_read() {
        let storage = Storage::in_memory(StorageOptions::new().prefix("ns:"));
        assert!(storage.set("a", Some(&json!("v"))));

        assert_eq!(storage.adapter().get_item("ns:a").as_deref(), Some("v"));
        assert_eq!(storage.adapter().get_item("a"), None);
        assert_eq!(storage.get("a").unwrap(), Some(json!("v")));
    }

    #[test]
    fn test_set_absent_reads_back_none() {
        let storage: Storage = Storage::default();
        assert!(storage.set("k", None));
        assert_eq!(storage.adapter().get_item("k").as_deref(), Some("null"));
        assert_eq!(storage.get("k").unwrap(), None);

        assert!(storage.set("k", Some(&Value::Null)));
        assert_eq!(storage.get("k").unwrap(), None);
    }

    #[test]
    fn test_pop() {
        let storage: Storage = Storage::default();
        storage.set("k", Some(&json!([1, 2, 3])));

        assert_eq!(storage.pop("k").unwrap(), Some(json!([1, 2, 3])));
        assert_eq!(storage.get("k").unwrap(), None);
        assert_eq!(storage.pop("k").unwrap(), None);
    }

    #[test]
    fn test_clear_ignores_prefix() {
        let storage = Storage::in_memory(StorageOptions::new().prefix("mine:"));
        storage.adapter().set_item("theirs:x", "1");
        storage.set("y", Some(&json!(2)));

        storage.clear().unwrap();

        assert!(storage.adapter().is_empty());
    }

    #[test]
    fn test_get_as_and_set_as() {
        #[derive(Debug, PartialEq, serde::Serialize, serde::Deserialize)]
        struct User {
            name: String,
            age: u32,
        }

        let storage: Storage = Storage::default();
        let user = User {
            name: "ann".to_string(),
            age: 7,
        };
        assert!(storage.set_as("user", &user));
        assert_eq!(storage.get_as::<User>("user").unwrap(), Some(user));

        // Wrong shape reads as None
        assert_eq!(storage.get_as::<u64>("user").unwrap(), None);
    }
}
