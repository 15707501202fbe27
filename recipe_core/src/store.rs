//! Recipe store: CRUD and ingredient search over an owned catalog.
//!
//! The store keeps recipes and the [`IngredientCatalog`] consistent as one
//! unit. Every mutation is a single step against in-memory state; durability
//! is delegated to a [`PersistenceAdapter`] on explicit save.

use crate::{Error, IngredientCatalog, PersistenceAdapter, Recipe, RecipeId, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Current on-disk layout of [`StoreState`]
pub const STATE_FORMAT_VERSION: u32 = 1;

const FIRST_ID: u64 = 1;

fn default_format_version() -> u32 {
    STATE_FORMAT_VERSION
}

/// Full persisted snapshot of a store
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct StoreState {
    #[serde(default = "default_format_version")]
    pub format_version: u32,
    pub next_id: u64,
    pub recipes: Vec<Recipe>,
    pub ingredients: IngredientCatalog,
}

/// A single-field edit applied through [`RecipeStore::update`]
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RecipeUpdate {
    Name(String),
    CookingTime(i64),
    Ingredients(Vec<String>),
}

/// In-memory recipe collection plus its ingredient catalog
#[derive(Clone, Debug)]
pub struct RecipeStore {
    recipes: BTreeMap<RecipeId, Recipe>,
    catalog: IngredientCatalog,
    next_id: u64,
}

impl Default for RecipeStore {
    fn default() -> Self {
        Self {
            recipes: BTreeMap::new(),
            catalog: IngredientCatalog::new(),
            next_id: FIRST_ID,
        }
    }
}

impl RecipeStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a store from an adapter, or start empty if nothing was saved yet
    ///
    /// Only absence yields an empty store. Unreadable or corrupt state is
    /// returned as an error so it is never silently discarded.
    pub fn open<A: PersistenceAdapter + ?Sized>(adapter: &mut A) -> Result<Self> {
        match adapter.load()? {
            Some(state) => {
                let store = Self::from_state(state)?;
                tracing::info!(
                    "Loaded {} recipes and {} ingredients",
                    store.len(),
                    store.catalog.len()
                );
                Ok(store)
            }
            None => {
                tracing::info!("No saved recipes found, starting with an empty store");
                Ok(Self::new())
            }
        }
    }

    /// Persist the full store through an adapter
    ///
    /// The store itself is not modified, so it stays usable if the save fails.
    pub fn save<A: PersistenceAdapter + ?Sized>(&self, adapter: &mut A) -> Result<()> {
        adapter.save(&self.state())?;
        tracing::debug!("Saved {} recipes", self.len());
        Ok(())
    }

    /// Snapshot the current state
    pub fn state(&self) -> StoreState {
        StoreState {
            format_version: STATE_FORMAT_VERSION,
            next_id: self.next_id,
            recipes: self.recipes.values().cloned().collect(),
            ingredients: self.catalog.clone(),
        }
    }

    /// Rebuild a store from a snapshot
    ///
    /// Recipes must carry unique ids. A `next_id` that would reuse an id is
    /// raised, and ingredients missing from the catalog are registered.
    pub fn from_state(state: StoreState) -> Result<Self> {
        if state.format_version > STATE_FORMAT_VERSION {
            return Err(Error::Persistence(format!(
                "unsupported state format version {} (expected at most {})",
                state.format_version, STATE_FORMAT_VERSION
            )));
        }

        let mut catalog = state.ingredients;
        let mut recipes = BTreeMap::new();
        let mut next_id = state.next_id.max(FIRST_ID);

        for recipe in state.recipes {
            let id = recipe.id().ok_or_else(|| {
                Error::Persistence(format!("stored recipe '{}' has no id", recipe.name()))
            })?;

            if id.get() >= next_id {
                tracing::warn!(
                    "Stored next id {} would reuse recipe id {}, raising it",
                    next_id,
                    id
                );
                next_id = id.get().checked_add(1).ok_or_else(|| {
                    Error::Persistence(format!("recipe id {} leaves no room for new ids", id))
                })?;
            }

            let added = catalog.register_all(recipe.ingredients());
            if added > 0 {
                tracing::warn!(
                    "Recipe {} had {} ingredients missing from the catalog",
                    id,
                    added
                );
            }

            if recipes.insert(id, recipe).is_some() {
                return Err(Error::Persistence(format!("duplicate recipe id {}", id)));
            }
        }

        Ok(Self {
            recipes,
            catalog,
            next_id,
        })
    }

    /// Insert a new recipe and register its ingredients
    ///
    /// Ids come from a counter that never goes backwards, so an id is never
    /// handed out twice, even after the recipe holding it is deleted.
    pub fn add(&mut self, mut recipe: Recipe) -> Result<RecipeId> {
        if let Some(existing) = recipe.id() {
            return Err(Error::Validation(format!(
                "recipe '{}' already has id {}",
                recipe.name(),
                existing
            )));
        }

        let id = RecipeId::new(self.next_id);
        let next_id = self
            .next_id
            .checked_add(1)
            .ok_or_else(|| Error::Validation("recipe id space exhausted".into()))?;

        recipe.assign_id(id);
        self.catalog.register_all(recipe.ingredients());
        self.recipes.insert(id, recipe);
        self.next_id = next_id;

        tracing::debug!("Added recipe {}", id);
        Ok(id)
    }

    pub fn get(&self, id: RecipeId) -> Result<&Recipe> {
        self.recipes.get(&id).ok_or(Error::RecipeNotFound(id))
    }

    /// Apply a single-field edit
    ///
    /// Cooking time and ingredient edits recompute the difficulty as part of
    /// the same step. New ingredients are registered in the catalog.
    pub fn update(&mut self, id: RecipeId, change: RecipeUpdate) -> Result<&Recipe> {
        let recipe = self
            .recipes
            .get_mut(&id)
            .ok_or(Error::RecipeNotFound(id))?;

        match change {
            RecipeUpdate::Name(name) => recipe.set_name(name)?,
            RecipeUpdate::CookingTime(minutes) => recipe.set_cooking_time(minutes)?,
            RecipeUpdate::Ingredients(ingredients) => {
                recipe.set_ingredients(ingredients)?;
                let added = self.catalog.register_all(recipe.ingredients());
                tracing::debug!("Registered {} new ingredients", added);
            }
        }

        tracing::debug!("Updated recipe {} ({})", id, recipe.difficulty());
        Ok(&*recipe)
    }

    /// Remove a recipe; the catalog keeps its ingredients
    pub fn delete(&mut self, id: RecipeId) -> Result<Recipe> {
        let removed = self.recipes.remove(&id).ok_or(Error::RecipeNotFound(id))?;
        tracing::debug!("Deleted recipe {}", id);
        Ok(removed)
    }

    /// Recipes containing exactly this ingredient, in store order
    pub fn search_by_ingredient(&self, name: &str) -> Vec<&Recipe> {
        self.recipes
            .values()
            .filter(|r| r.contains_ingredient(name))
            .collect()
    }

    /// Recipes whose ingredient text contains `fragment`, in store order
    ///
    /// Looser than [`RecipeStore::search_by_ingredient`]: "Sugar" also
    /// matches "Brown Sugar", and a fragment may span the `", "` separator.
    pub fn search_by_ingredient_substring(&self, fragment: &str) -> Vec<&Recipe> {
        self.recipes
            .values()
            .filter(|r| r.ingredients_text().contains(fragment))
            .collect()
    }

    /// Recipes containing any of the ingredients exactly, in store order
    pub fn search_any_ingredient<S: AsRef<str>>(&self, names: &[S]) -> Vec<&Recipe> {
        self.recipes
            .values()
            .filter(|r| names.iter().any(|n| r.contains_ingredient(n.as_ref())))
            .collect()
    }

    /// Recipes matching any of the fragments by substring, in store order
    pub fn search_any_substring<S: AsRef<str>>(&self, fragments: &[S]) -> Vec<&Recipe> {
        self.recipes
            .values()
            .filter(|r| {
                let text = r.ingredients_text();
                fragments.iter().any(|f| text.contains(f.as_ref()))
            })
            .collect()
    }

    /// All recipes in store order
    pub fn recipes(&self) -> impl Iterator<Item = &Recipe> {
        self.recipes.values()
    }

    pub fn catalog(&self) -> &IngredientCatalog {
        &self.catalog
    }

    pub fn len(&self) -> usize {
        self.recipes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.recipes.is_empty()
    }
}
