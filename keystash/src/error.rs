//! Facade-level errors

use std::error::Error as StdError;

/// Boxed error coming from an adapter or a serializer
pub type BoxError = Box<dyn StdError + Send + Sync + 'static>;

/// Errors surfaced by the storage facades
///
/// Only reads, removals and clears report errors. Writes collapse every
/// failure into a `false` return value instead.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("adapter error: {0}")]
    Adapter(#[source] BoxError),

    #[error("serializer error: {0}")]
    Serialize(#[source] BoxError),

    #[error("{backend} backend unavailable: {reason}")]
    Unavailable {
        backend: &'static str,
        reason: String,
    },
}

impl StorageError {
    pub(crate) fn adapter<E>(err: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        Self::Adapter(Box::new(err))
    }

    pub(crate) fn serialize<E>(err: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        Self::Serialize(Box::new(err))
    }
}
