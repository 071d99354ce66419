//! Key/value adapters
//!
//! An adapter is the minimal string-to-string capability a backend has to
//! offer before a facade can sit on top of it.
//!
//! ```text
//! ┌─────────────────────────────────────┐
//! │  Storage / AsyncStorage (facades)   │
//! │  - prefix, serializer, define       │
//! └─────────────────────────────────────┘
//!          ▲                  ▲
//!          │ Adapter          │ AsyncAdapter
//!          ▼                  ▼
//! ┌──────────────────┐  ┌──────────────────┐
//! │  Fallback<A>     │  │  Blocking<A>     │
//! │  native | memory │  │  spawn_blocking  │
//! └──────────────────┘  └──────────────────┘
//!      ▲         ▲
//!      │         │
//! MemoryAdapter  SqliteAdapter
//! ```

pub mod blocking;
pub mod fallback;
pub mod memory;
#[cfg(feature = "sqlite")]
pub mod sqlite;

use std::error::Error as StdError;
use std::future::Future;

pub use blocking::{Blocking, BlockingError};
pub use fallback::Fallback;
pub use memory::MemoryAdapter;
#[cfg(feature = "sqlite")]
pub use sqlite::{SqliteAdapter, SqliteConfig, SqlitePlatform};

/// Synchronous key/value backend
///
/// All methods take `&self`; implementations use interior mutability.
pub trait Adapter {
    /// Backend-specific write configuration, passed through untouched.
    type Config;
    type Error: StdError + Send + Sync + 'static;

    /// Returns `Ok(None)` if the key does not exist.
    fn get_item(&self, key: &str) -> Result<Option<String>, Self::Error>;

    fn set_item(
        &self,
        key: &str,
        value: &str,
        config: Option<&Self::Config>,
    ) -> Result<(), Self::Error>;

    /// Returns `Ok(())` even if the key did not exist.
    fn remove_item(&self, key: &str) -> Result<(), Self::Error>;

    /// Remove every key in the backend.
    ///
    /// Optional: backends without a clear operation keep this no-op.
    fn clear(&self) -> Result<(), Self::Error> {
        Ok(())
    }
}

/// Asynchronous key/value backend
///
/// Same shape as [`Adapter`], each operation completing later.
pub trait AsyncAdapter: Send + Sync {
    type Config: Send + Sync;
    type Error: StdError + Send + Sync + 'static;

    fn get_item(
        &self,
        key: &str,
    ) -> impl Future<Output = Result<Option<String>, Self::Error>> + Send;

    fn set_item(
        &self,
        key: &str,
        value: &str,
        config: Option<&Self::Config>,
    ) -> impl Future<Output = Result<(), Self::Error>> + Send;

    fn remove_item(&self, key: &str) -> impl Future<Output = Result<(), Self::Error>> + Send;

    /// Optional, see [`Adapter::clear`].
    fn clear(&self) -> impl Future<Output = Result<(), Self::Error>> + Send {
        async { Ok(()) }
    }
}
