//! Ingredient catalog shared by all recipes in a store.
//!
//! The catalog is append-only: names are registered the first time a recipe
//! uses them and never removed, even once no recipe references them.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::num::IntErrorKind;

/// Enumeration order for catalog views
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum CatalogOrder {
    /// First-seen order
    #[default]
    Insertion,
    /// Case-sensitive lexicographic order
    Alphabetical,
}

/// Deduplicated registry of ingredient names
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct IngredientCatalog {
    names: Vec<String>,
    seen: HashSet<String>,
}

impl From<Vec<String>> for IngredientCatalog {
    fn from(names: Vec<String>) -> Self {
        let mut catalog = Self::default();
        for name in names {
            catalog.register(&name);
        }
        catalog
    }
}

impl From<IngredientCatalog> for Vec<String> {
    fn from(catalog: IngredientCatalog) -> Self {
        catalog.names
    }
}

impl IngredientCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a name, returning `true` if it was not already present
    pub fn register(&mut self, name: &str) -> bool {
        if self.seen.contains(name) {
            return false;
        }
        self.seen.insert(name.to_string());
        self.names.push(name.to_string());
        true
    }

    /// Register every name in order, returning how many were new
    pub fn register_all<S: AsRef<str>>(&mut self, names: &[S]) -> usize {
        names
            .iter()
            .filter(|name| self.register(name.as_ref()))
            .count()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.seen.contains(name)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Iterate over all names in the requested order
    ///
    /// The iterator is cloneable, so a view can be walked more than once.
    pub fn all(&self, order: CatalogOrder) -> Ingredients<'_> {
        match order {
            CatalogOrder::Insertion => Ingredients::Insertion(self.names.iter()),
            CatalogOrder::Alphabetical => {
                let mut sorted: Vec<&str> = self.names.iter().map(String::as_str).collect();
                sorted.sort_unstable();
                Ingredients::Alphabetical(sorted.into_iter())
            }
        }
    }

    /// Name at `index` in insertion order
    pub fn by_index(&self, index: usize) -> Result<&str> {
        self.by_index_in(index, CatalogOrder::Insertion)
    }

    /// Name at `index` in the given order
    pub fn by_index_in(&self, index: usize, order: CatalogOrder) -> Result<&str> {
        if index >= self.names.len() {
            return Err(Error::OutOfRange {
                index,
                len: self.names.len(),
            });
        }
        match order {
            CatalogOrder::Insertion => Ok(&self.names[index]),
            CatalogOrder::Alphabetical => self.all(order).nth(index).ok_or(Error::OutOfRange {
                index,
                len: self.names.len(),
            }),
        }
    }

    /// Resolve a 1-based menu choice as typed by a user
    ///
    /// Input that does not parse as an integer fails with
    /// [`Error::NotANumber`]. Any integer outside `1..=len`, including zero,
    /// negatives and values too large to represent, fails with
    /// [`Error::ChoiceOutOfRange`] carrying the choice as typed.
    pub fn select(&self, raw: &str, order: CatalogOrder) -> Result<&str> {
        let trimmed = raw.trim();
        let out_of_range = || Error::ChoiceOutOfRange {
            choice: trimmed.to_string(),
            len: self.names.len(),
        };

        let choice = match trimmed.parse::<i128>() {
            Ok(choice) => choice,
            Err(e)
                if matches!(
                    e.kind(),
                    IntErrorKind::PosOverflow | IntErrorKind::NegOverflow
                ) =>
            {
                return Err(out_of_range())
            }
            Err(_) => return Err(Error::NotANumber(trimmed.to_string())),
        };

        let index = choice
            .checked_sub(1)
            .and_then(|index| usize::try_from(index).ok())
            .filter(|index| *index < self.names.len())
            .ok_or_else(out_of_range)?;

        self.by_index_in(index, order)
    }
}

/// Iterator over catalog names, see [`IngredientCatalog::all`]
#[derive(Clone, Debug)]
pub enum Ingredients<'a> {
    Insertion(std::slice::Iter<'a, String>),
    Alphabetical(std::vec::IntoIter<&'a str>),
}

impl<'a> Iterator for Ingredients<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<Self::Item> {
        match self {
            Ingredients::Insertion(iter) => iter.next().map(String::as_str),
            Ingredients::Alphabetical(iter) => iter.next(),
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        match self {
            Ingredients::Insertion(iter) => iter.size_hint(),
            Ingredients::Alphabetical(iter) => iter.size_hint(),
        }
    }
}

impl ExactSizeIterator for Ingredients<'_> {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;

    fn sample() -> IngredientCatalog {
        let mut catalog = IngredientCatalog::new();
        catalog.register_all(&["Tea Leaves", "Sugar", "Water", "Coffee Powder", "butter"]);
        catalog
    }

    #[test]
    fn test_register_is_idempotent() {
        let mut catalog = sample();
        let before: Vec<_> = catalog.all(CatalogOrder::Insertion).map(String::from).collect();

        assert!(!catalog.register("Sugar"));
        assert_eq!(catalog.len(), 5);
        let after: Vec<_> = catalog.all(CatalogOrder::Insertion).map(String::from).collect();
        assert_eq!(before, after);
    }

    #[test]
    fn test_register_is_case_sensitive() {
        let mut catalog = sample();
        assert!(catalog.register("sugar"));
        assert!(catalog.contains("Sugar"));
        assert!(catalog.contains("sugar"));
        assert_eq!(catalog.len(), 6);
    }

    #[test]
    fn test_register_all_counts_new_names() {
        let mut catalog = sample();
        let added = catalog.register_all(&["Water", "Milk", "Milk"]);
        assert_eq!(added, 1);
    }

    #[test]
    fn test_insertion_order() {
        let catalog = sample();
        let names: Vec<_> = catalog.all(CatalogOrder::Insertion).collect();
        assert_eq!(
            names,
            vec!["Tea Leaves", "Sugar", "Water", "Coffee Powder", "butter"]
        );
    }

    #[test]
    fn test_alphabetical_order_is_case_sensitive() {
        let catalog = sample();
        let names: Vec<_> = catalog.all(CatalogOrder::Alphabetical).collect();
        // Uppercase sorts before lowercase
        assert_eq!(
            names,
            vec!["Coffee Powder", "Sugar", "Tea Leaves", "Water", "butter"]
        );
    }

    #[test]
    fn test_views_are_restartable() {
        let catalog = sample();
        let view = catalog.all(CatalogOrder::Alphabetical);
        assert_eq!(view.len(), 5);
        let first: Vec<_> = view.clone().collect();
        let second: Vec<_> = view.collect();
        assert_eq!(first, second);
    }

    #[test]
    fn test_by_index() {
        let catalog = sample();
        assert_eq!(catalog.by_index(0).unwrap(), "Tea Leaves");
        assert_eq!(
            catalog.by_index_in(0, CatalogOrder::Alphabetical).unwrap(),
            "Coffee Powder"
        );

        let err = catalog.by_index(5).unwrap_err();
        assert!(matches!(err, Error::OutOfRange { index: 5, len: 5 }));
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn test_by_index_on_empty_catalog() {
        let catalog = IngredientCatalog::new();
        assert!(matches!(
            catalog.by_index(0),
            Err(Error::OutOfRange { index: 0, len: 0 })
        ));
    }

    #[test]
    fn test_select_distinguishes_errors() {
        let catalog = sample();
        assert_eq!(catalog.select("2", CatalogOrder::Insertion).unwrap(), "Sugar");
        assert_eq!(
            catalog.select(" 1 ", CatalogOrder::Alphabetical).unwrap(),
            "Coffee Powder"
        );

        assert!(matches!(
            catalog.select("two", CatalogOrder::Insertion),
            Err(Error::NotANumber(_))
        ));
        assert!(matches!(
            catalog.select("2.5", CatalogOrder::Insertion),
            Err(Error::NotANumber(_))
        ));
        assert!(matches!(
            catalog.select("", CatalogOrder::Insertion),
            Err(Error::NotANumber(_))
        ));
        assert!(matches!(
            catalog.select("6", CatalogOrder::Insertion),
            Err(Error::ChoiceOutOfRange { len: 5, .. })
        ));
    }

    #[test]
    fn test_select_reports_out_of_range_numbers_as_typed() {
        let catalog = sample();

        for raw in ["0", "-1", "6", "99999999999999999999999999999999999999999999"] {
            match catalog.select(raw, CatalogOrder::Insertion) {
                Err(Error::ChoiceOutOfRange { choice, len }) => {
                    assert_eq!(choice, raw);
                    assert_eq!(len, 5);
                }
                other => panic!("expected out of range for {:?}, got {:?}", raw, other),
            }
        }

        let err = catalog.select("0", CatalogOrder::Insertion).unwrap_err();
        assert_eq!(err.to_string(), "Choice 0 out of range (pick 1 to 5)");
        assert_eq!(err.kind(), ErrorKind::NotFound);

        assert!(matches!(
            IngredientCatalog::new().select("1", CatalogOrder::Alphabetical),
            Err(Error::ChoiceOutOfRange { len: 0, .. })
        ));
    }

    #[test]
    fn test_serde_as_plain_list() {
        let catalog = sample();
        let json = serde_json::to_string(&catalog).unwrap();
        assert_eq!(
            json,
            r#"["Tea Leaves","Sugar","Water","Coffee Powder","butter"]"#
        );

        let parsed: IngredientCatalog = serde_json::from_str(r#"["Salt","Pepper","Salt"]"#).unwrap();
        assert_eq!(parsed.len(), 2);
    }
}
