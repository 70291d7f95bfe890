use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

use super::money::Money;

// ============================================================================
// Menu Catalog
// ============================================================================
//
// Read-only reference data: ordered categories, each with ordered priced
// drinks. Validated once at load; a bad menu is a startup failure, never a
// per-event condition.
//
// ============================================================================

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum MenuError {
    #[error("Category not found: {0}")]
    CategoryNotFound(String),

    #[error("Item '{item}' not found in category '{category}'")]
    ItemNotFound { category: String, item: String },

    #[error("Menu has no categories")]
    Empty,

    #[error("Category '{0}' has no items")]
    EmptyCategory(String),

    #[error("Duplicate category: {0}")]
    DuplicateCategory(String),

    #[error("Duplicate item '{item}' in category '{category}'")]
    DuplicateItem { category: String, item: String },

    #[error("Item '{item}' has a negative price")]
    NegativePrice { item: String },

    #[error("Blank name in menu definition")]
    BlankName,

    #[error("Failed to read menu file: {0}")]
    Io(String),

    #[error("Malformed menu file: {0}")]
    Malformed(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuItem {
    pub name: String,
    #[serde(rename = "price_cents")]
    pub price: Money,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub name: String,
    pub items: Vec<MenuItem>,
}

#[derive(Debug, Clone, Deserialize)]
struct MenuFile {
    categories: Vec<Category>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MenuCatalog {
    categories: Vec<Category>,
}

impl MenuCatalog {
    /// Build a catalog, rejecting empty, duplicated or negatively priced entries
    pub fn new(categories: Vec<Category>) -> Result<Self, MenuError> {
        if categories.is_empty() {
            return Err(MenuError::Empty);
        }

        let mut seen_categories = HashSet::new();
        for category in &categories {
            if category.name.trim().is_empty() {
                return Err(MenuError::BlankName);
            }
            if !seen_categories.insert(category.name.as_str()) {
                return Err(MenuError::DuplicateCategory(category.name.clone()));
            }
            if category.items.is_empty() {
                return Err(MenuError::EmptyCategory(category.name.clone()));
            }

            let mut seen_items = HashSet::new();
            for item in &category.items {
                if item.name.trim().is_empty() {
                    return Err(MenuError::BlankName);
                }
                if !seen_items.insert(item.name.as_str()) {
                    return Err(MenuError::DuplicateItem {
                        category: category.name.clone(),
                        item: item.name.clone(),
                    });
                }
                if item.price.is_negative() {
                    return Err(MenuError::NegativePrice { item: item.name.clone() });
                }
            }
        }

        Ok(Self { categories })
    }

    /// The storefront's standing menu
    pub fn builtin() -> Self {
        fn category(name: &str, items: &[(&str, i64)]) -> Category {
            Category {
                name: name.to_string(),
                items: items
                    .iter()
                    .map(|(item, cents)| MenuItem {
                        name: item.to_string(),
                        price: Money::from_cents(*cents),
                    })
                    .collect(),
            }
        }

        Self {
            categories: vec![
                category(
                    "Coffee",
                    &[("Americano", 150), ("Iced Latte", 200), ("Hot Latte", 175), ("Milked Coffee", 125)],
                ),
                category(
                    "Matcha",
                    &[("Matcha Latte", 225), ("Matcha Espresso", 250), ("Strawberry Matcha", 275)],
                ),
                category(
                    "Soda",
                    &[("Strawberry Soda", 150), ("Blueberry Soda", 150), ("Passion Soda", 175)],
                ),
            ],
        }
    }

    pub fn from_json_str(json: &str) -> Result<Self, MenuError> {
        let file: MenuFile =
            serde_json::from_str(json).map_err(|e| MenuError::Malformed(e.to_string()))?;
        Self::new(file.categories)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, MenuError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .map_err(|e| MenuError::Io(format!("{}: {}", path.display(), e)))?;
        let catalog = Self::from_json_str(&json)?;

        tracing::info!(
            path = %path.display(),
            categories = catalog.categories.len(),
            "Loaded menu from file"
        );

        Ok(catalog)
    }

    pub fn categories(&self) -> Vec<&str> {
        self.categories.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn contains_category(&self, category: &str) -> bool {
        self.find_category(category).is_some()
    }

    pub fn items(&self, category: &str) -> Result<&[MenuItem], MenuError> {
        self.find_category(category)
            .map(|c| c.items.as_slice())
            .ok_or_else(|| MenuError::CategoryNotFound(category.to_string()))
    }

    pub fn price(&self, category: &str, item: &str) -> Result<Money, MenuError> {
        self.items(category)?
            .iter()
            .find(|i| i.name == item)
            .map(|i| i.price)
            .ok_or_else(|| MenuError::ItemNotFound {
                category: category.to_string(),
                item: item.to_string(),
            })
    }

    fn find_category(&self, category: &str) -> Option<&Category> {
        self.categories.iter().find(|c| c.name == category)
    }
}

impl Default for MenuCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}
