//! Item catalog.
//!
//! An ordered, immutable list of selectable items. Storage is shared, so
//! cloning a catalog is a pointer copy; the spin engine relies on this to
//! snapshot the active catalog when a spin starts.

pub mod devops;

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A selectable wheel entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub id: String,
    pub display_name: String,
    pub category: String,
    #[serde(default)]
    pub description: String,
    /// Relative weight; `None` means uniform
    #[serde(default)]
    pub weight: Option<f64>,
}

impl Item {
    pub fn new(id: &str, display_name: &str, category: &str) -> Self {
        Self {
            id: id.to_string(),
            display_name: display_name.to_string(),
            category: category.to_string(),
            description: String::new(),
            weight: None,
        }
    }

    pub fn with_description(mut self, description: &str) -> Self {
        self.description = description.to_string();
        self
    }

    pub fn with_weight(mut self, weight: f64) -> Self {
        self.weight = Some(weight);
        self
    }

    /// Effective weight (1.0 when unspecified)
    pub fn weight(&self) -> f64 {
        self.weight.unwrap_or(1.0)
    }
}

/// Which part of the catalog is on the wheel
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CategoryFilter {
    #[default]
    All,
    Only(String),
}

impl CategoryFilter {
    /// Parse a host-side selection; "All" (any case) or empty selects everything.
    pub fn parse(s: &str) -> Self {
        let s = s.trim();
        if s.is_empty() || s.eq_ignore_ascii_case("all") {
            Self::All
        } else {
            Self::Only(s.to_string())
        }
    }

    pub fn matches(&self, item: &Item) -> bool {
        match self {
            Self::All => true,
            Self::Only(category) => item.category == *category,
        }
    }
}

/// Error while loading a catalog
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to read catalog: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid catalog JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Ordered item list with shared storage
#[derive(Debug, Clone, PartialEq)]
pub struct Catalog {
    items: Arc<[Item]>,
}

impl Catalog {
    pub fn new(items: Vec<Item>) -> Self {
        Self {
            items: items.into(),
        }
    }

    /// Parse a JSON array of items.
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let items: Vec<Item> = serde_json::from_str(json)?;
        Ok(Self::new(items))
    }

    /// Load a JSON array of items from disk.
    pub fn load(path: &std::path::Path) -> Result<Self, CatalogError> {
        let text = std::fs::read_to_string(path)?;
        let catalog = Self::from_json(&text)?;
        log::debug!("Loaded {} items from {}", catalog.len(), path.display());
        Ok(catalog)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Item> {
        self.items.get(index)
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    /// Distinct categories in first-seen order
    pub fn categories(&self) -> Vec<&str> {
        let mut seen: Vec<&str> = Vec::new();
        for item in self.items.iter() {
            if !seen.contains(&item.category.as_str()) {
                seen.push(&item.category);
            }
        }
        seen
    }

    /// New catalog holding only the items that pass `filter`, order preserved.
    /// May be empty; `SpinEngine::configure` rejects that.
    pub fn filter(&self, filter: &CategoryFilter) -> Catalog {
        match filter {
            CategoryFilter::All => self.clone(),
            CategoryFilter::Only(_) => Catalog::new(
                self.items
                    .iter()
                    .filter(|item| filter.matches(item))
                    .cloned()
                    .collect(),
            ),
        }
    }
}

impl FromIterator<Item> for Catalog {
    fn from_iter<T: IntoIterator<Item = Item>>(iter: T) -> Self {
        Self::new(iter.into_iter().collect())
    }
}
