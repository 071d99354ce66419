//! Named-backend facades
//!
//! [`local_storage`] and [`session_storage`] build a [`Storage`] over the
//! persistent or the session-scoped backend of a [`Platform`]. The backend
//! is acquired once, at construction. If the platform cannot provide it the
//! facade is built over a [`MemoryAdapter`] instead: construction never
//! fails, data just stops outliving the process.

use crate::adapter::{Adapter, Fallback, MemoryAdapter};
use crate::error::StorageError;
use crate::options::StorageOptions;
use crate::serializer::{JsonSerializer, Serializer};
use crate::storage::Storage;
use tracing::info;

/// Source of the persistent and session-scoped backends
pub trait Platform {
    type Persistent: Adapter;
    type Session: Adapter;

    /// Backend whose data survives the process.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Unavailable`] if the platform has none.
    fn persistent(&self) -> Result<Self::Persistent, StorageError>;

    /// Backend whose data lives as long as the returned adapter.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Unavailable`] if the platform has none.
    fn session(&self) -> Result<Self::Session, StorageError>;
}

/// Platform without storage backends (build-time rendering, tests)
///
/// Every named facade built on it falls back to memory.
#[derive(Debug, Clone, Copy, Default)]
pub struct Headless;

impl Platform for Headless {
    type Persistent = MemoryAdapter;
    type Session = MemoryAdapter;

    fn persistent(&self) -> Result<MemoryAdapter, StorageError> {
        Err(StorageError::Unavailable {
            backend: "persistent",
            reason: "headless platform".to_string(),
        })
    }

    fn session(&self) -> Result<MemoryAdapter, StorageError> {
        Err(StorageError::Unavailable {
            backend: "session",
            reason: "headless platform".to_string(),
        })
    }
}

/// Facade over a platform's persistent backend
pub type LocalStorage<P, S = JsonSerializer> = Storage<Fallback<<P as Platform>::Persistent>, S>;

/// Facade over a platform's session-scoped backend
pub type SessionStorage<P, S = JsonSerializer> = Storage<Fallback<<P as Platform>::Session>, S>;

fn acquire<A>(backend: &'static str, acquired: Result<A, StorageError>) -> Fallback<A> {
    match acquired {
        Ok(adapter) => Fallback::Native(adapter),
        Err(e) => {
            info!(backend, reason = %e, "backend unavailable, using in-memory storage");
            Fallback::Memory(MemoryAdapter::new())
        }
    }
}

/// Storage over the platform's persistent backend, or memory.
pub fn local_storage<P: Platform, S: Serializer>(
    platform: &P,
    options: StorageOptions<S>,
) -> LocalStorage<P, S> {
    Storage::new(acquire("persistent", platform.persistent()), options)
}

/// Storage over the platform's session-scoped backend, or memory.
pub fn session_storage<P: Platform, S: Serializer>(
    platform: &P,
    options: StorageOptions<S>,
) -> SessionStorage<P, S> {
    Storage::new(acquire("session", platform.session()), options)
}
