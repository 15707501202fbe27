#![forbid(unsafe_code)]

//! Core domain model and business logic for the Recipe Box system.
//!
//! This crate provides:
//! - Domain types (recipes, difficulty ratings)
//! - Ingredient catalog with insertion and alphabetical views
//! - Recipe store with CRUD and ingredient search
//! - Persistence adapters (JSON file, SQLite, in-memory)
//! - Configuration and logging setup

pub mod error;
pub mod difficulty;
pub mod recipe;
pub mod ingredients;
pub mod store;
pub mod persistence;
pub mod config;
pub mod logging;

// Re-export commonly used types
pub use error::{Error, ErrorKind, Result};
pub use difficulty::{classify, Difficulty};
pub use recipe::{Recipe, RecipeId, MAX_NAME_LEN};
pub use ingredients::{CatalogOrder, IngredientCatalog};
pub use store::{RecipeStore, RecipeUpdate, StoreState};
pub use persistence::{JsonFileAdapter, MemoryAdapter, PersistenceAdapter, SqliteAdapter};
pub use config::{Backend, Config};
