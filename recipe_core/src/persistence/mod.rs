//! Persistence adapters for the recipe store.
//!
//! A [`PersistenceAdapter`] loads and saves a whole [`StoreState`]. Three
//! interchangeable backends are provided:
//! - [`JsonFileAdapter`]: one JSON document, replaced atomically
//! - [`SqliteAdapter`]: relational tables with a comma-joined ingredients column
//! - [`MemoryAdapter`]: in-process, for tests and throwaway stores

mod json;
mod memory;
mod sqlite;

pub use json::JsonFileAdapter;
pub use memory::MemoryAdapter;
pub use sqlite::SqliteAdapter;

use crate::{Result, StoreState};

/// Backend able to persist the full state of a recipe store
pub trait PersistenceAdapter {
    /// Load the most recently saved state
    ///
    /// Returns `Ok(None)` when nothing has been saved yet. Any other failure
    /// (unreadable or corrupt data) is an error.
    fn load(&mut self) -> Result<Option<StoreState>>;

    /// Save the full state
    ///
    /// Either the whole new state becomes durable or the previously saved
    /// state remains loadable.
    fn save(&mut self, state: &StoreState) -> Result<()>;
}

impl<A: PersistenceAdapter + ?Sized> PersistenceAdapter for Box<A> {
    fn load(&mut self) -> Result<Option<StoreState>> {
        (**self).load()
    }

    fn save(&mut self, state: &StoreState) -> Result<()> {
        (**self).save(state)
    }
}
