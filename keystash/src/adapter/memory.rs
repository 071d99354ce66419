//! In-memory adapter

use super::{Adapter, AsyncAdapter};
use linked_hash_map::LinkedHashMap;
use parking_lot::Mutex;
use std::convert::Infallible;

/// In-memory implementation of [`Adapter`] and [`AsyncAdapter`]
///
/// Insertion-ordered map from key to stored text. It is the default
/// backend, the substitute when a platform backend is missing, and the
/// staging area behind the async facade's cache overlay.
///
/// The inherent methods are infallible and take no write configuration;
/// the trait implementations delegate to them.
#[derive(Debug, Default)]
pub struct MemoryAdapter {
    items: Mutex<LinkedHashMap<String, String>>,
}

impl MemoryAdapter {
    /// Create a new empty store
    #[must_use]
    pub fn new() -> Self {
        Self {
            items: Mutex::new(LinkedHashMap::new()),
        }
    }

    #[must_use]
    pub fn get_item(&self, key: &str) -> Option<String> {
        self.items.lock().get(key).cloned()
    }

    pub fn set_item(&self, key: &str, value: &str) {
        self.items.lock().insert(key.to_string(), value.to_string());
    }

    pub fn remove_item(&self, key: &str) {
        self.items.lock().remove(key);
    }

    pub fn clear(&self) {
        self.items.lock().clear();
    }

    /// Snapshot of all entries in map order.
    ///
    /// Later writes do not affect a snapshot already taken.
    #[must_use]
    pub fn entries(&self) -> Vec<(String, String)> {
        self.items
            .lock()
            .iter()
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.lock().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.lock().is_empty()
    }
}

impl Adapter for MemoryAdapter {
    type Config = ();
    type Error = Infallible;

    fn get_item(&self, key: &str) -> Result<Option<String>, Infallible> {
        Ok(MemoryAdapter::get_item(self, key))
    }

    fn set_item(&self, key: &str, value: &str, _config: Option<&()>) -> Result<(), Infallible> {
        MemoryAdapter::set_item(self, key, value);
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<(), Infallible> {
        MemoryAdapter::remove_item(self, key);
        Ok(())
    }

    fn clear(&self) -> Result<(), Infallible> {
        MemoryAdapter::clear(self);
        Ok(())
    }
}

impl AsyncAdapter for MemoryAdapter {
    type Config = ();
    type Error = Infallible;

    async fn get_item(&self, key: &str) -> Result<Option<String>, Infallible> {
        Ok(MemoryAdapter::get_item(self, key))
    }

    async fn set_item(
        &self,
        key: &str,
        value: &str,
        _config: Option<&()>,
    ) -> Result<(), Infallible> {
        MemoryAdapter::set_item(self, key, value);
        Ok(())
    }

    async fn remove_item(&self, key: &str) -> Result<(), Infallible> {
        MemoryAdapter::remove_item(self, key);
        Ok(())
    }

    async fn clear(&self) -> Result<(), Infallible> {
        MemoryAdapter::clear(self);
        Ok(())
    }
}
