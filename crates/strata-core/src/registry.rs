//! Catalog registry
//!
//! Maps catalog types to the path pattern of their directory in the bucket.
//! Entries can be added or overwritten at any time, including while the
//! registry is shared between tasks; they are never removed.

use crate::types::{CatalogType, PathPattern};
use parking_lot::RwLock;
use std::collections::HashMap;
use tracing::debug;

#[derive(Debug)]
pub struct CatalogRegistry {
    patterns: RwLock<HashMap<CatalogType, PathPattern>>,
}

impl CatalogRegistry {
    /// Registry holding only the built-in custom catalog
    pub fn new() -> Self {
        let mut patterns = HashMap::new();
        patterns.insert(CatalogType::CUSTOM, PathPattern::identity());
        Self {
            patterns: RwLock::new(patterns),
        }
    }

    /// Build a registry from `(catalog, pattern)` pairs on top of the built-in entry
    pub fn with_catalogs<I, C, P>(catalogs: I) -> Self
    where
        I: IntoIterator<Item = (C, P)>,
        C: Into<CatalogType>,
        P: Into<PathPattern>,
    {
        let registry = Self::new();
        for (catalog, pattern) in catalogs {
            registry.register(catalog, pattern);
        }
        registry
    }

    /// Insert or overwrite the pattern for `catalog_type`. The pattern is not validated.
    pub fn register(&self, catalog_type: impl Into<CatalogType>, pattern: impl Into<PathPattern>) {
        let catalog_type = catalog_type.into();
        let pattern = pattern.into();
        debug!("Registering catalog '{}' -> '{}'", catalog_type, pattern);
        self.patterns.write().insert(catalog_type, pattern);
    }

    /// Pattern registered for `catalog_type`, or `None` if it was never registered
    pub fn resolve(&self, catalog_type: &CatalogType) -> Option<PathPattern> {
        self.patterns.read().get(catalog_type).cloned()
    }

    pub fn contains(&self, catalog_type: &CatalogType) -> bool {
        self.patterns.read().contains_key(catalog_type)
    }

    /// Snapshot of every entry, sorted by catalog type
    pub fn catalogs(&self) -> Vec<(CatalogType, PathPattern)> {
        let mut entries: Vec<_> = self
            .patterns
            .read()
            .iter()
            .map(|(catalog, pattern)| (catalog.clone(), pattern.clone()))
            .collect();
        entries.sort_by(|a, b| a.0.cmp(&b.0));
        entries
    }

    pub fn len(&self) -> usize {
        self.patterns.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.read().is_empty()
    }
}

impl Default for CatalogRegistry {
    fn default() -> Self {
        Self::new()
    }
}
