//! Difficulty rating derived from cooking time and ingredient count.
//!
//! The rule is a fixed two-axis threshold table:
//!
//! | cooking time | ingredients | difficulty   |
//! |--------------|-------------|--------------|
//! | < 10 min     | < 4         | Easy         |
//! | < 10 min     | >= 4        | Medium       |
//! | >= 10 min    | < 4         | Intermediate |
//! | >= 10 min    | >= 4        | Hard         |

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Cooking time (minutes) at which a recipe stops counting as quick
pub const QUICK_TIME_LIMIT: u32 = 10;

/// Ingredient count at which a recipe stops counting as simple
pub const SIMPLE_INGREDIENT_LIMIT: usize = 4;

/// Difficulty rating of a recipe
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Difficulty {
    Easy,
    Medium,
    Intermediate,
    Hard,
}

impl Difficulty {
    /// Classify already-validated measurements.
    pub fn from_measures(cooking_time: u32, ingredient_count: usize) -> Self {
        let quick = cooking_time < QUICK_TIME_LIMIT;
        let simple = ingredient_count < SIMPLE_INGREDIENT_LIMIT;

        match (quick, simple) {
            (true, true) => Difficulty::Easy,
            (true, false) => Difficulty::Medium,
            (false, true) => Difficulty::Intermediate,
            (false, false) => Difficulty::Hard,
        }
    }

    /// Label as stored and displayed
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "Easy",
            Difficulty::Medium => "Medium",
            Difficulty::Intermediate => "Intermediate",
            Difficulty::Hard => "Hard",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Difficulty {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "easy" => Ok(Difficulty::Easy),
            "medium" => Ok(Difficulty::Medium),
            "intermediate" => Ok(Difficulty::Intermediate),
            "hard" => Ok(Difficulty::Hard),
            other => Err(Error::InvalidArgument(format!(
                "unknown difficulty label '{}'",
                other
            ))),
        }
    }
}

/// Classify raw caller-supplied measurements
///
/// Negative inputs are a contract violation and fail with
/// [`Error::InvalidArgument`] instead of being classified.
pub fn classify(cooking_time: i64, ingredient_count: i64) -> Result<Difficulty> {
    if cooking_time < 0 {
        return Err(Error::InvalidArgument(format!(
            "cooking time must be non-negative, got {}",
            cooking_time
        )));
    }
    if ingredient_count < 0 {
        return Err(Error::InvalidArgument(format!(
            "ingredient count must be non-negative, got {}",
            ingredient_count
        )));
    }

    // Anything past u32::MAX minutes is as slow as it gets.
    let time = u32::try_from(cooking_time).unwrap_or(u32::MAX);
    let count = usize::try_from(ingredient_count).unwrap_or(usize::MAX);

    Ok(Difficulty::from_measures(time, count))
}
