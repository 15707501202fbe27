//! The recipe entity.
//!
//! A [`Recipe`] keeps its difficulty consistent with its cooking time and
//! ingredient list: every setter validates its input first and recomputes
//! the difficulty before returning, so no caller can observe a stale rating.

use crate::{Difficulty, Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Maximum recipe name length, in characters
pub const MAX_NAME_LEN: usize = 50;

/// Separator used when an ingredient list is flattened to text
pub const INGREDIENT_SEPARATOR: &str = ", ";

/// Store-assigned recipe identifier
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(transparent)]
pub struct RecipeId(u64);

impl RecipeId {
    pub fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub fn get(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for RecipeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A cooking recipe
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(try_from = "RecipeRecord")]
pub struct Recipe {
    id: Option<RecipeId>,
    name: String,
    cooking_time: u32,
    ingredients: Vec<String>,
    difficulty: Difficulty,
}

/// Wire shape of a recipe; the stored difficulty is ignored and recomputed
#[derive(Deserialize)]
struct RecipeRecord {
    #[serde(default)]
    id: Option<RecipeId>,
    name: String,
    cooking_time: i64,
    #[serde(default)]
    ingredients: Vec<String>,
}

impl TryFrom<RecipeRecord> for Recipe {
    type Error = Error;

    fn try_from(record: RecipeRecord) -> Result<Self> {
        let mut recipe = Recipe::new(record.name, record.cooking_time, record.ingredients)?;
        recipe.id = record.id;
        Ok(recipe)
    }
}

impl Recipe {
    /// Create a recipe without an id
    ///
    /// Fails with [`Error::Validation`] when the name is empty or longer than
    /// [`MAX_NAME_LEN`] characters, the cooking time is negative, or an
    /// ingredient is blank. An empty ingredient list is accepted.
    pub fn new(
        name: impl Into<String>,
        cooking_time: i64,
        ingredients: Vec<String>,
    ) -> Result<Self> {
        let name = name.into();
        validate_name(&name)?;
        let cooking_time = validate_cooking_time(cooking_time)?;
        validate_ingredients(&ingredients)?;

        let difficulty = Difficulty::from_measures(cooking_time, ingredients.len());

        Ok(Self {
            id: None,
            name,
            cooking_time,
            ingredients,
            difficulty,
        })
    }

    /// Rebuild a persisted recipe with its id
    pub fn restore(
        id: RecipeId,
        name: impl Into<String>,
        cooking_time: i64,
        ingredients: Vec<String>,
    ) -> Result<Self> {
        let mut recipe = Self::new(name, cooking_time, ingredients)?;
        recipe.id = Some(id);
        Ok(recipe)
    }

    pub fn id(&self) -> Option<RecipeId> {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn cooking_time(&self) -> u32 {
        self.cooking_time
    }

    pub fn ingredients(&self) -> &[String] {
        &self.ingredients
    }

    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    pub fn set_name(&mut self, name: impl Into<String>) -> Result<()> {
        let name = name.into();
        validate_name(&name)?;
        self.name = name;
        Ok(())
    }

    /// Change the cooking time and recompute difficulty
    pub fn set_cooking_time(&mut self, cooking_time: i64) -> Result<()> {
        self.cooking_time = validate_cooking_time(cooking_time)?;
        self.recompute_difficulty();
        Ok(())
    }

    /// Replace the whole ingredient list and recompute difficulty
    ///
    /// Unlike [`Recipe::new`], an empty replacement list is rejected.
    pub fn set_ingredients(&mut self, ingredients: Vec<String>) -> Result<()> {
        if ingredients.is_empty() {
            return Err(Error::Validation(
                "ingredient list cannot be empty".into(),
            ));
        }
        validate_ingredients(&ingredients)?;
        self.ingredients = ingredients;
        self.recompute_difficulty();
        Ok(())
    }

    /// Exact, case-sensitive membership test
    pub fn contains_ingredient(&self, name: &str) -> bool {
        self.ingredients.iter().any(|i| i == name)
    }

    /// Ingredients flattened to a single `", "`-joined string
    pub fn ingredients_text(&self) -> String {
        self.ingredients.join(INGREDIENT_SEPARATOR)
    }

    pub(crate) fn assign_id(&mut self, id: RecipeId) {
        self.id = Some(id);
    }

    fn recompute_difficulty(&mut self) {
        self.difficulty = Difficulty::from_measures(self.cooking_time, self.ingredients.len());
    }
}

impl fmt::Display for Recipe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Recipe: {}", self.name)?;
        if let Some(id) = self.id {
            writeln!(f, "  ID: {}", id)?;
        }
        writeln!(f, "  Cooking Time: {} minutes", self.cooking_time)?;
        writeln!(f, "  Ingredients: {}", self.ingredients_text())?;
        write!(f, "  Difficulty: {}", self.difficulty)
    }
}

fn validate_name(name: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(Error::Validation("recipe name cannot be empty".into()));
    }
    let len = name.chars().count();
    if len > MAX_NAME_LEN {
        return Err(Error::Validation(format!(
            "recipe name must be {} characters or less, got {}",
            MAX_NAME_LEN, len
        )));
    }
    Ok(())
}

fn validate_cooking_time(cooking_time: i64) -> Result<u32> {
    if cooking_time < 0 {
        return Err(Error::Validation(format!(
            "cooking time must be non-negative, got {}",
            cooking_time
        )));
    }
    u32::try_from(cooking_time).map_err(|_| {
        Error::Validation(format!("cooking time {} is too large", cooking_time))
    })
}

fn validate_ingredients(ingredients: &[String]) -> Result<()> {
    for (idx, ingredient) in ingredients.iter().enumerate() {
        if ingredient.trim().is_empty() {
            return Err(Error::Validation(format!(
                "ingredient #{} is empty",
                idx + 1
            )));
        }
    }
    Ok(())
}
