//! Error types for the recipe_core library.

use crate::RecipeId;
use std::io;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for recipe_core operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// IO error occurred
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// SQLite error
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// TOML parsing error
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Configuration validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// A recipe field failed validation
    #[error("Validation error: {0}")]
    Validation(String),

    /// No recipe with this id exists in the store
    #[error("Recipe {0} not found")]
    RecipeNotFound(RecipeId),

    /// Catalog index outside `[0, len)`
    #[error("Index {index} out of range (catalog has {len} ingredients)")]
    OutOfRange { index: usize, len: usize },

    /// A numbered menu choice outside `1..=len`, as the user typed it
    #[error("Choice {choice} out of range (pick 1 to {len})")]
    ChoiceOutOfRange { choice: String, len: usize },

    /// A menu selection that is not a number at all
    #[error("'{0}' is not a number")]
    NotANumber(String),

    /// Caller passed a value outside a function's domain
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Persisted state is unusable
    #[error("Persistence error: {0}")]
    Persistence(String),
}

/// Coarse classification of [`Error`] variants
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    NotFound,
    InvalidArgument,
    Persistence,
    Config,
}

impl Error {
    /// Map this error onto the kind a caller should react to.
    ///
    /// IO, JSON and SQLite failures only arise at the persistence boundary,
    /// so they all report [`ErrorKind::Persistence`].
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Io(_) | Error::Json(_) | Error::Sqlite(_) | Error::Persistence(_) => {
                ErrorKind::Persistence
            }
            Error::Toml(_) | Error::Config(_) => ErrorKind::Config,
            Error::Validation(_) | Error::NotANumber(_) => ErrorKind::Validation,
            Error::RecipeNotFound(_)
            | Error::OutOfRange { .. }
            | Error::ChoiceOutOfRange { .. } => ErrorKind::NotFound,
            Error::InvalidArgument(_) => ErrorKind::InvalidArgument,
        }
    }
}
