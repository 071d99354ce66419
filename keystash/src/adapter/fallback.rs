//! Platform backend with an in-memory substitute

use super::{Adapter, MemoryAdapter};

/// Either the requested platform backend or the in-memory substitute
///
/// Built by the named facades: when the platform cannot provide its
/// backend, the facade keeps working on [`Fallback::Memory`] and simply
/// stops persisting anything.
#[derive(Debug)]
pub enum Fallback<A> {
    Native(A),
    Memory(MemoryAdapter),
}

impl<A> Fallback<A> {
    /// True when the platform backend was acquired.
    #[must_use]
    pub fn is_native(&self) -> bool {
        matches!(self, Self::Native(_))
    }
}

impl<A: Adapter> Adapter for Fallback<A> {
    type Config = A::Config;
    type Error = A::Error;

    fn get_item(&self, key: &str) -> Result<Option<String>, A::Error> {
        match self {
            Self::Native(adapter) => adapter.get_item(key),
            Self::Memory(mem) => Ok(mem.get_item(key)),
        }
    }

    fn set_item(
        &self,
        key: &str,
        value: &str,
        config: Option<&A::Config>,
    ) -> Result<(), A::Error> {
        match self {
            Self::Native(adapter) => adapter.set_item(key, value, config),
            // Write hints mean nothing to the substitute
            Self::Memory(mem) => {
                mem.set_item(key, value);
                Ok(())
            }
        }
    }

    fn remove_item(&self, key: &str) -> Result<(), A::Error> {
        match self {
            Self::Native(adapter) => adapter.remove_item(key),
            Self::Memory(mem) => {
                mem.remove_item(key);
                Ok(())
            }
        }
    }

    fn clear(&self) -> Result<(), A::Error> {
        match self {
            Self::Native(adapter) => adapter.clear(),
            Self::Memory(mem) => {
                mem.clear();
                Ok(())
            }
        }
    }
}
