//! Key definitions
//!
//! A [`Define`] is a handle bound to one facade and one fixed key. It keeps
//! nothing in the backend; it only saves repeating the key name and the
//! write configuration at every call site.
//!
//! Groups of definitions come either from `define_group` on a facade (a map
//! indexed by logical name) or from [`key_group!`](crate::key_group), which
//! turns the logical names into struct fields:
//!
//! ```
//! use keystash::{key_group, Storage};
//! use serde_json::json;
//!
//! key_group! {
//!     pub struct AuthKeys {
//!         token: "refresh_token",
//!         user: "user_info",
//!     }
//! }
//!
//! let storage: Storage = Storage::default();
//! let auth = AuthKeys::new(&storage);
//! auth.token.set(Some(&json!("x")));
//! assert_eq!(storage.get("refresh_token").unwrap(), Some(json!("x")));
//! ```

use crate::adapter::{Adapter, AsyncAdapter};
use crate::async_storage::AsyncStorage;
use crate::error::StorageError;
use crate::serializer::Serializer;
use crate::storage::Storage;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

/// A facade key definitions can be bound to
pub trait Facade {
    /// Write configuration understood by the facade's adapter
    type Config;
}

/// Handle for one fixed key of a facade
pub struct Define<'a, F: Facade> {
    storage: &'a F,
    key: String,
    config: Option<F::Config>,
}

impl<'a, F: Facade> Define<'a, F> {
    /// Bind `key` on `storage`; writes without a config use `config`.
    pub fn new(storage: &'a F, key: impl Into<String>, config: Option<F::Config>) -> Self {
        Self {
            storage,
            key: key.into(),
            config,
        }
    }

    /// The unprefixed key
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    #[must_use]
    pub fn default_config(&self) -> Option<&F::Config> {
        self.config.as_ref()
    }
}

impl<F: Facade> std::fmt::Debug for Define<'_, F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Define")
            .field("key", &self.key)
            .field("has_config", &self.config.is_some())
            .finish()
    }
}

impl<A: Adapter, S: Serializer> Define<'_, Storage<A, S>> {
    /// # Errors
    ///
    /// See [`Storage::get`].
    pub fn get(&self) -> Result<Option<Value>, StorageError> {
        self.storage.get(&self.key)
    }

    /// # Errors
    ///
    /// See [`Storage::get_as`].
    pub fn get_as<T: DeserializeOwned>(&self) -> Result<Option<T>, StorageError> {
        self.storage.get_as(&self.key)
    }

    /// Write with the definition's default config.
    pub fn set(&self, value: Option<&Value>) -> bool {
        self.storage.write(&self.key, value, self.config.as_ref())
    }

    /// Write with `config` instead of the default.
    pub fn set_with(&self, value: Option<&Value>, config: &A::Config) -> bool {
        self.storage.write(&self.key, value, Some(config))
    }

    pub fn set_as<T: Serialize + ?Sized>(&self, value: &T) -> bool {
        match serde_json::to_value(value) {
            Ok(value) => self.set(Some(&value)),
            Err(e) => {
                debug!(key = %self.key, error = %e, "set: value conversion failed");
                false
            }
        }
    }

    /// # Errors
    ///
    /// See [`Storage::remove`].
    pub fn remove(&self) -> Result<(), StorageError> {
        self.storage.remove(&self.key)
    }

    /// # Errors
    ///
    /// See [`Storage::pop`].
    pub fn pop(&self) -> Result<Option<Value>, StorageError> {
        self.storage.pop(&self.key)
    }
}

impl<A: AsyncAdapter, S: Serializer> Define<'_, AsyncStorage<A, S>> {
    /// # Errors
    ///
    /// See [`AsyncStorage::get`].
    pub async fn get(&self) -> Result<Option<Value>, StorageError> {
        self.storage.get(&self.key).await
    }

    /// # Errors
    ///
    /// See [`AsyncStorage::get_as`].
    pub async fn get_as<T: DeserializeOwned>(&self) -> Result<Option<T>, StorageError> {
        self.storage.get_as(&self.key).await
    }

    pub async fn set(&self, value: Option<&Value>) -> bool {
        self.storage
            .write(&self.key, value, self.config.as_ref())
            .await
    }

    pub async fn set_with(&self, value: Option<&Value>, config: &A::Config) -> bool {
        self.storage.write(&self.key, value, Some(config)).await
    }

    pub async fn set_as<T: Serialize + ?Sized>(&self, value: &T) -> bool {
        match serde_json::to_value(value) {
            Ok(value) => self.set(Some(&value)).await,
            Err(e) => {
                debug!(key = %self.key, error = %e, "set: value conversion failed");
                false
            }
        }
    }

    /// # Errors
    ///
    /// See [`AsyncStorage::remove`].
    pub async fn remove(&self) -> Result<(), StorageError> {
        self.storage.remove(&self.key).await
    }

    /// # Errors
    ///
    /// See [`AsyncStorage::pop`].
    pub async fn pop(&self) -> Result<Option<Value>, StorageError> {
        self.storage.pop(&self.key).await
    }
}

/// Declare a struct of key definitions
///
/// Each field is a [`Define`] bound to the given physical key. The struct is
/// generic over the facade, so the same group works with [`Storage`] and
/// [`AsyncStorage`]. Physical keys may repeat; repeated keys alias.
#[macro_export]
macro_rules! key_group {
    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident {
            $($field:ident : $key:expr),* $(,)?
        }
    ) => {
        $(#[$meta])*
        $vis struct $name<'a, F: $crate::Facade> {
            $(pub $field: $crate::Define<'a, F>,)*
        }

        impl<'a, F: $crate::Facade> $name<'a, F> {
            pub fn new(storage: &'a F) -> Self {
                Self {
                    $($field: $crate::Define::new(storage, $key, None),)*
                }
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use crate::adapter::MemoryAdapter;
    use crate::{AsyncStorage, Storage, StorageOptions};
    use serde_json::json;

    key_group! {
        struct Session {
            token: "refresh_token",
            user: "user_info",
            alias: "refresh_token",
        }
    }

    #[test]
    fn test_define_is_bound_to_key() {
        let storage = Storage::in_memory(StorageOptions::new().prefix("p:"));
        let token = storage.define("token");

        assert_eq!(token.key(), "token");
        assert!(token.set(Some(&json!("abc"))));
        assert_eq!(storage.get("token").unwrap(), Some(json!("abc")));
        assert_eq!(storage.adapter().get_item("p:token").as_deref(), Some("abc"));

        assert_eq!(token.pop().unwrap(), Some(json!("abc")));
        assert_eq!(token.get().unwrap(), None);
    }

    #[test]
    fn test_key_group_fields() {
        let storage: Storage = Storage::default();
        let group = Session::new(&storage);

        assert!(group.token.set(Some(&json!("x"))));
        assert_eq!(storage.get("refresh_token").unwrap(), Some(json!("x")));

        group.user.set_as(&json!({"name": "ann"}));
        assert_eq!(storage.get("user_info").unwrap(), Some(json!({"name": "ann"})));

        // Duplicate physical keys share a slot
        assert_eq!(group.alias.get().unwrap(), Some(json!("x")));
    }

    #[tokio::test]
    async fn test_key_group_on_async_storage() {
        let storage = AsyncStorage::new(MemoryAdapter::new(), StorageOptions::new());
        let group = Session::new(&storage);

        assert!(group.token.set(Some(&json!("y"))).await);
        assert_eq!(storage.get("refresh_token").await.unwrap(), Some(json!("y")));
        assert_eq!(group.alias.pop().await.unwrap(), Some(json!("y")));
        assert_eq!(group.token.get().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_set_as_rejects_unconvertible_values() {
        use std::collections::HashMap;

        // Maps with non-string keys have no JSON form
        let mut bad = HashMap::new();
        bad.insert((1, 2), "x");

        let storage: Storage = Storage::default();
        let handle = storage.define("k");
        assert!(!handle.set_as(&bad));
        assert_eq!(handle.get().unwrap(), None);

        let storage = AsyncStorage::new(MemoryAdapter::new(), StorageOptions::new());
        let handle = storage.define("k");
        assert!(!handle.set_as(&bad).await);
        assert_eq!(handle.get().await.unwrap(), None);
    }
}
