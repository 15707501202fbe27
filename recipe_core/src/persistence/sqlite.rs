//! Relational persistence backed by SQLite.
//!
//! Recipes live in a `recipes` table whose `ingredients` column holds the
//! `", "`-joined ingredient list. The catalog and the id counter get their
//! own tables so a reload reproduces the store exactly.

use crate::persistence::PersistenceAdapter;
use crate::recipe::INGREDIENT_SEPARATOR;
use crate::{Difficulty, Error, IngredientCatalog, Recipe, RecipeId, Result, StoreState};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;

const SCHEMA_SQL: &str = "
CREATE TABLE IF NOT EXISTS recipes (
    id INTEGER PRIMARY KEY,
    name VARCHAR(50) NOT NULL,
    ingredients VARCHAR(255) NOT NULL,
    cooking_time INTEGER NOT NULL,
    difficulty VARCHAR(20) NOT NULL
);
CREATE TABLE IF NOT EXISTS ingredient_catalog (
    position INTEGER PRIMARY KEY,
    name TEXT NOT NULL UNIQUE
);
CREATE TABLE IF NOT EXISTS store_meta (
    key TEXT PRIMARY KEY,
    value INTEGER NOT NULL
);
";

const NEXT_ID_KEY: &str = "next_id";

/// SQLite database adapter
pub struct SqliteAdapter {
    conn: Connection,
}

struct RecipeRow {
    id: i64,
    name: String,
    ingredients: String,
    cooking_time: i64,
    difficulty: String,
}

impl RecipeRow {
    fn into_recipe(self) -> Result<Recipe> {
        let id = u64::try_from(self.id)
            .map_err(|_| Error::Persistence(format!("negative recipe id {}", self.id)))?;
        let recipe = Recipe::restore(
            RecipeId::new(id),
            self.name,
            self.cooking_time,
            split_ingredients(&self.ingredients),
        )
        .map_err(|e| Error::Persistence(format!("invalid recipe row {}: {}", id, e)))?;

        match self.difficulty.parse::<Difficulty>() {
            Ok(stored) if stored == recipe.difficulty() => {}
            _ => tracing::warn!(
                "Recipe {} stored difficulty '{}', recomputed as {}",
                id,
                self.difficulty,
                recipe.difficulty()
            ),
        }

        Ok(recipe)
    }
}

/// Join names into the `ingredients` column.
///
/// A `\` or `,` inside a name is backslash-escaped so the `", "` separator
/// stays unambiguous. Names without either character are stored as is.
fn join_ingredients(ingredients: &[String]) -> String {
    ingredients
        .iter()
        .map(|name| name.replace('\\', "\\\\").replace(',', "\\,"))
        .collect::<Vec<_>>()
        .join(INGREDIENT_SEPARATOR)
}

/// Inverse of [`join_ingredients`]; splits only on an unescaped `", "`.
fn split_ingredients(column: &str) -> Vec<String> {
    if column.is_empty() {
        return Vec::new();
    }

    let mut names = Vec::new();
    let mut current = String::new();
    let mut chars = column.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\\' => {
                if let Some(escaped) = chars.next() {
                    current.push(escaped);
                }
            }
            ',' if chars.peek() == Some(&' ') => {
                chars.next();
                names.push(std::mem::take(&mut current));
            }
            other => current.push(other),
        }
    }
    names.push(current);
    names
}

fn to_sql_int(value: u64, what: &str) -> Result<i64> {
    i64::try_from(value)
        .map_err(|_| Error::Persistence(format!("{} {} does not fit in SQLite", what, value)))
}

impl SqliteAdapter {
    /// Open (or create) a database file and ensure the schema exists.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let conn = Connection::open(path)?;
        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA busy_timeout = 5000;",
        )?;
        tracing::debug!("Opened recipe database {:?}", path);
        Self::with_connection(conn)
    }

    /// Database that lives only as long as the adapter.
    pub fn open_in_memory() -> Result<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self> {
        conn.execute_batch(SCHEMA_SQL)?;
        Ok(Self { conn })
    }

    fn load_catalog(&self) -> Result<IngredientCatalog> {
        let mut stmt = self
            .conn
            .prepare("SELECT name FROM ingredient_catalog ORDER BY position")?;
        let names = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(IngredientCatalog::from(names))
    }

    /// Counter for a database that has rows but no `next_id` meta row.
    ///
    /// `None` only when both the recipe and catalog tables are empty.
    /// Otherwise the counter restarts one past the largest stored id and
    /// the catalog is completed from the recipe rows on load.
    fn recovered_next_id(&self) -> Result<Option<u64>> {
        let (recipe_rows, max_id): (i64, Option<i64>) = self.conn.query_row(
            "SELECT COUNT(*), MAX(id) FROM recipes",
            [],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )?;
        let catalog_rows: i64 =
            self.conn
                .query_row("SELECT COUNT(*) FROM ingredient_catalog", [], |row| row.get(0))?;

        if recipe_rows == 0 && catalog_rows == 0 {
            return Ok(None);
        }

        let next_id = match max_id {
            Some(max) => u64::try_from(max)
                .ok()
                .and_then(|max| max.checked_add(1))
                .ok_or_else(|| Error::Persistence(format!("unusable recipe id {}", max)))?,
            None => 1,
        };
        tracing::warn!(
            "Recipe database has {} rows but no stored next id, continuing from {}",
            recipe_rows,
            next_id
        );
        Ok(Some(next_id))
    }
}

impl PersistenceAdapter for SqliteAdapter {
    fn load(&mut self) -> Result<Option<StoreState>> {
        let next_id: Option<i64> = self
            .conn
            .query_row(
                "SELECT value FROM store_meta WHERE key = ?1",
                params![NEXT_ID_KEY],
                |row| row.get(0),
            )
            .optional()?;

        let next_id = match next_id {
            Some(value) => u64::try_from(value)
                .map_err(|_| Error::Persistence(format!("negative next id {}", value)))?,
            None => match self.recovered_next_id()? {
                Some(value) => value,
                None => {
                    tracing::info!("Recipe database has no saved store yet");
                    return Ok(None);
                }
            },
        };

        let rows = {
            let mut stmt = self.conn.prepare(
                "SELECT id, name, ingredients, cooking_time, difficulty
                 FROM recipes
                 ORDER BY id ASC",
            )?;
            let rows = stmt
                .query_map([], |row| {
                    Ok(RecipeRow {
                        id: row.get(0)?,
                        name: row.get(1)?,
                        ingredients: row.get(2)?,
                        cooking_time: row.get(3)?,
                        difficulty: row.get(4)?,
                    })
                })?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            rows
        };

        let recipes = rows
            .into_iter()
            .map(RecipeRow::into_recipe)
            .collect::<Result<Vec<_>>>()?;
        let ingredients = self.load_catalog()?;

        tracing::debug!("Loaded {} recipe rows", recipes.len());
        Ok(Some(StoreState {
            format_version: crate::store::STATE_FORMAT_VERSION,
            next_id,
            recipes,
            ingredients,
        }))
    }

    /// Replace every row in a single transaction
    ///
    /// Dropping the transaction on any error rolls it back, leaving the
    /// previously saved rows in place.
    fn save(&mut self, state: &StoreState) -> Result<()> {
        let tx = self.conn.transaction()?;

        tx.execute("DELETE FROM recipes", [])?;
        tx.execute("DELETE FROM ingredient_catalog", [])?;

        {
            let mut insert = tx.prepare(
                "INSERT INTO recipes (id, name, ingredients, cooking_time, difficulty)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
            )?;
            for recipe in &state.recipes {
                let id = recipe.id().ok_or_else(|| {
                    Error::Persistence(format!("recipe '{}' has no id", recipe.name()))
                })?;
                insert.execute(params![
                    to_sql_int(id.get(), "recipe id")?,
                    recipe.name(),
                    join_ingredients(recipe.ingredients()),
                    i64::from(recipe.cooking_time()),
                    recipe.difficulty().as_str(),
                ])?;
            }

            let mut insert = tx.prepare(
                "INSERT INTO ingredient_catalog (position, name) VALUES (?1, ?2)",
            )?;
            for (position, name) in state
                .ingredients
                .all(crate::CatalogOrder::Insertion)
                .enumerate()
            {
                insert.execute(params![to_sql_int(position as u64, "position")?, name])?;
            }
        }

        tx.execute(
            "INSERT INTO store_meta (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            params![NEXT_ID_KEY, to_sql_int(state.next_id, "next id")?],
        )?;

        tx.commit()?;
        tracing::debug!("Saved {} recipe rows", state.recipes.len());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Difficulty, ErrorKind, RecipeStore, RecipeUpdate};

    fn names(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn sample_store() -> RecipeStore {
        let mut store = RecipeStore::new();
        store
            .add(Recipe::new("Tea", 5, names(&["Tea Leaves", "Sugar", "Water"])).unwrap())
            .unwrap();
        let cake = store
            .add(
                Recipe::new(
                    "Cake",
                    50,
                    names(&["Sugar", "Butter", "Eggs", "Vanilla Essence", "Flour"]),
                )
                .unwrap(),
            )
            .unwrap();
        store
            .add(Recipe::new("Ice", 0, vec![]).unwrap())
            .unwrap();
        let brine = store
            .add(Recipe::new("Brine", 1, names(&["Salt", "Water"])).unwrap())
            .unwrap();
        store.delete(brine).unwrap();
        store.update(cake, RecipeUpdate::CookingTime(5)).unwrap();
        store
    }

    #[test]
    fn test_empty_database_loads_none() {
        let mut adapter = SqliteAdapter::open_in_memory().unwrap();
        assert!(adapter.load().unwrap().is_none());
    }

    #[test]
    fn test_rows_without_meta_are_kept() {
        let mut adapter = SqliteAdapter::open_in_memory().unwrap();
        adapter
            .conn
            .execute(
                "INSERT INTO recipes (id, name, ingredients, cooking_time, difficulty)
                 VALUES (3, 'Tea', 'Tea Leaves, Water', 5, 'Easy')",
                [],
            )
            .unwrap();

        let mut store = RecipeStore::open(&mut adapter).unwrap();
        assert_eq!(store.len(), 1);
        assert!(store.catalog().contains("Tea Leaves"));

        let toast = store
            .add(Recipe::new("Toast", 3, names(&["Bread"])).unwrap())
            .unwrap();
        assert_eq!(toast, RecipeId::new(4));
        store.save(&mut adapter).unwrap();

        let tea_rows: i64 = adapter
            .conn
            .query_row("SELECT COUNT(*) FROM recipes WHERE name = 'Tea'", [], |row| {
                row.get(0)
            })
            .unwrap();
        assert_eq!(tea_rows, 1);
        assert_eq!(adapter.load().unwrap().unwrap().next_id, 5);
    }

    #[test]
    fn test_catalog_without_meta_is_not_absent() {
        let mut adapter = SqliteAdapter::open_in_memory().unwrap();
        adapter
            .conn
            .execute(
                "INSERT INTO ingredient_catalog (position, name) VALUES (0, 'Salt')",
                [],
            )
            .unwrap();

        let state = adapter.load().unwrap().unwrap();
        assert!(state.recipes.is_empty());
        assert_eq!(state.next_id, 1);
        assert!(state.ingredients.contains("Salt"));
    }

    #[test]
    fn test_roundtrip_in_memory() {
        let store = sample_store();
        let mut adapter = SqliteAdapter::open_in_memory().unwrap();
        store.save(&mut adapter).unwrap();

        let loaded = RecipeStore::open(&mut adapter).unwrap();
        assert_eq!(loaded.state(), store.state());
        assert!(loaded.catalog().contains("Salt"));
        assert_eq!(loaded.recipes().nth(2).unwrap().ingredients().len(), 0);
    }

    #[test]
    fn test_roundtrip_on_disk() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("db/recipes.db");
        let store = sample_store();

        {
            let mut adapter = SqliteAdapter::open(&path).unwrap();
            store.save(&mut adapter).unwrap();
        }

        let mut adapter = SqliteAdapter::open(&path).unwrap();
        let mut loaded = RecipeStore::open(&mut adapter).unwrap();
        assert_eq!(loaded.state(), store.state());

        // Deleted id 4 is not handed out again
        let id = loaded.add(Recipe::new("Toast", 3, names(&["Bread"])).unwrap()).unwrap();
        assert_eq!(id, RecipeId::new(5));
    }

    #[test]
    fn test_save_replaces_previous_rows() {
        let mut adapter = SqliteAdapter::open_in_memory().unwrap();
        let mut store = sample_store();
        store.save(&mut adapter).unwrap();

        let first = store.recipes().next().unwrap().id().unwrap();
        store.delete(first).unwrap();
        store.save(&mut adapter).unwrap();

        let loaded = adapter.load().unwrap().unwrap();
        assert_eq!(loaded.recipes.len(), 2);
    }

    #[test]
    fn test_columns_use_joined_ingredients() {
        let mut adapter = SqliteAdapter::open_in_memory().unwrap();
        sample_store().save(&mut adapter).unwrap();

        let (ingredients, difficulty): (String, String) = adapter
            .conn
            .query_row(
                "SELECT ingredients, difficulty FROM recipes WHERE name = 'Tea'",
                [],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .unwrap();
        assert_eq!(ingredients, "Tea Leaves, Sugar, Water");
        assert_eq!(difficulty, "Easy");
    }

    #[test]
    fn test_commas_inside_names_survive() {
        let mut store = RecipeStore::new();
        let salad = names(&["Salt, to taste", "Lettuce", "C:\\herbs", "Oil,"]);
        store
            .add(Recipe::new("Salad", 5, salad.clone()).unwrap())
            .unwrap();

        let mut adapter = SqliteAdapter::open_in_memory().unwrap();
        store.save(&mut adapter).unwrap();

        let column: String = adapter
            .conn
            .query_row("SELECT ingredients FROM recipes", [], |row| row.get(0))
            .unwrap();
        assert_eq!(column, r"Salt\, to taste, Lettuce, C:\\herbs, Oil\,");

        let loaded = RecipeStore::open(&mut adapter).unwrap();
        assert_eq!(loaded.recipes().next().unwrap().ingredients(), salad.as_slice());
        assert_eq!(loaded.state(), store.state());
    }

    #[test]
    fn test_stale_difficulty_is_recomputed() {
        let mut adapter = SqliteAdapter::open_in_memory().unwrap();
        sample_store().save(&mut adapter).unwrap();
        adapter
            .conn
            .execute("UPDATE recipes SET difficulty = 'Hard' WHERE name = 'Tea'", [])
            .unwrap();

        let state = adapter.load().unwrap().unwrap();
        assert_eq!(state.recipes[0].difficulty(), Difficulty::Easy);
    }

    #[test]
    fn test_invalid_row_is_a_persistence_error() {
        let mut adapter = SqliteAdapter::open_in_memory().unwrap();
        sample_store().save(&mut adapter).unwrap();
        adapter
            .conn
            .execute("UPDATE recipes SET cooking_time = -4 WHERE name = 'Tea'", [])
            .unwrap();

        let err = adapter.load().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Persistence);
    }

    #[test]
    fn test_failed_save_rolls_back() {
        let mut adapter = SqliteAdapter::open_in_memory().unwrap();
        let store = sample_store();
        store.save(&mut adapter).unwrap();

        // A recipe without an id aborts the save midway
        let mut broken = store.state();
        broken
            .recipes
            .push(Recipe::new("Orphan", 5, names(&["Air"])).unwrap());
        assert!(adapter.save(&broken).is_err());

        let loaded = adapter.load().unwrap().unwrap();
        assert_eq!(loaded, store.state());
    }
}
