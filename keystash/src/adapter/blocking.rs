//! Sync adapters driven from async code
//!
//! [`Blocking`] moves every call of a synchronous [`Adapter`] onto tokio's
//! blocking pool, so backends that do real I/O (sqlite) can serve the
//! async facade without stalling the runtime's worker threads.

use super::{Adapter, AsyncAdapter};
use std::sync::Arc;
use tokio::task::{spawn_blocking, JoinError};

/// Errors from a [`Blocking`] adapter
#[derive(Debug, thiserror::Error)]
pub enum BlockingError<E> {
    #[error(transparent)]
    Adapter(E),

    #[error("blocking task failed: {0}")]
    Join(#[from] JoinError),
}

/// Async view of a synchronous adapter
///
/// Requires a tokio runtime with the blocking pool available.
#[derive(Debug)]
pub struct Blocking<A> {
    inner: Arc<A>,
}

impl<A> Blocking<A> {
    #[must_use]
    pub fn new(adapter: A) -> Self {
        Self {
            inner: Arc::new(adapter),
        }
    }

    /// Wrap an adapter that is also used synchronously elsewhere.
    #[must_use]
    pub fn from_shared(adapter: Arc<A>) -> Self {
        Self { inner: adapter }
    }

    #[must_use]
    pub fn inner(&self) -> &Arc<A> {
        &self.inner
    }
}

impl<A> Clone for Blocking<A> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<A> AsyncAdapter for Blocking<A>
where
    A: Adapter + Send + Sync + 'static,
    A::Config: Clone + Send + Sync + 'static,
{
    type Config = A::Config;
    type Error = BlockingError<A::Error>;

    async fn get_item(&self, key: &str) -> Result<Option<String>, Self::Error> {
        let inner = Arc::clone(&self.inner);
        let key = key.to_string();
        spawn_blocking(move || inner.get_item(&key))
            .await?
            .map_err(BlockingError::Adapter)
    }

    async fn set_item(
        &self,
        key: &str,
        value: &str,
        config: Option<&A::Config>,
    ) -> Result<(), Self::Error> {
        let inner = Arc::clone(&self.inner);
        let key = key.to_string();
        let value = value.to_string();
        let config = config.cloned();
        spawn_blocking(move || inner.set_item(&key, &value, config.as_ref()))
            .await?
            .map_err(BlockingError::Adapter)
    }

    async fn remove_item(&self, key: &str) -> Result<(), Self::Error> {
        let inner = Arc::clone(&self.inner);
        let key = key.to_string();
        spawn_blocking(move || inner.remove_item(&key))
            .await?
            .map_err(BlockingError::Adapter)
    }

    async fn clear(&self) -> Result<(), Self::Error> {
        let inner = Arc::clone(&self.inner);
        spawn_blocking(move || inner.clear())
            .await?
            .map_err(BlockingError::Adapter)
    }
}
