//! Key/value storage facades
//!
//! `keystash` puts three conveniences on top of any string key/value
//! backend: automatic value (de)serialization, key prefixing, and named key
//! definitions.
//!
//! ```text
//!  caller ──▶ Storage / AsyncStorage ──▶ prefix + key ──▶ Adapter ──▶ backend
//!                     │                                      ▲
//!                     └── to_store / from_store (Serializer) ┘
//! ```
//!
//! # Features
//!
//! - `sqlite` - Enable the SQLite adapter and [`SqlitePlatform`]

pub mod adapter;
pub mod async_storage;
pub mod backends;
pub mod define;
pub mod error;
pub mod options;
pub mod serializer;
pub mod storage;

// Re-export adapter types for convenience
pub use adapter::{Adapter, AsyncAdapter, Blocking, BlockingError, Fallback, MemoryAdapter};
#[cfg(feature = "sqlite")]
pub use adapter::{SqliteAdapter, SqliteConfig, SqlitePlatform};

// Re-export facades
pub use async_storage::AsyncStorage;
pub use backends::{local_storage, session_storage, Headless, LocalStorage, Platform, SessionStorage};
pub use define::{Define, Facade};
pub use options::StorageOptions;
pub use storage::Storage;

pub use error::{BoxError, StorageError};
pub use serializer::{from_store, to_store, JsonSerializer, Serializer};
