//! Path resolution
//!
//! Turns a [`StoragePath`] into the directory-level key prefix its files live under.

use crate::error::{Error, Result};
use crate::registry::CatalogRegistry;
use crate::types::{CatalogType, PathSelector, StoragePath};
use tracing::{debug, warn};

/// Outcome of resolving a storage path against the registry
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogResolution {
    /// Root catalog plus the formatted pattern, always ending in `/` when non-empty
    Resolved(String),
    /// The catalog type was never registered
    Unregistered,
}

impl CatalogResolution {
    pub fn is_unregistered(&self) -> bool {
        matches!(self, CatalogResolution::Unregistered)
    }

    /// Directory prefix, with an unregistered catalog collapsing to the empty string
    pub fn into_prefix(self) -> String {
        match self {
            CatalogResolution::Resolved(prefix) => prefix,
            CatalogResolution::Unregistered => String::new(),
        }
    }
}

/// Resolve `path` to its directory prefix, reporting unregistered catalogs explicitly
pub fn resolve(registry: &CatalogRegistry, path: &StoragePath) -> Result<CatalogResolution> {
    let Some(pattern) = registry.resolve(&path.catalog_type) else {
        if !path.catalog_type.is_root() {
            warn!(
                "Catalog '{}' is not registered, falling back to the root catalog",
                path.catalog_type
            );
        }
        return Ok(CatalogResolution::Unregistered);
    };

    let value = selector_value(&path.catalog_type, &path.selector)?;
    let mut fragment = pattern.format(&path.catalog_type, &value)?;
    if !fragment.is_empty() && !fragment.ends_with('/') {
        fragment.push('/');
    }

    let prefix = format!("{}{}", path.root_catalog, fragment);
    debug!("Resolved catalog '{}' to '{}'", path.catalog_type, prefix);
    Ok(CatalogResolution::Resolved(prefix))
}

/// Directory prefix of `path`; an unregistered catalog yields exactly `""`
pub fn resolve_catalog_path(registry: &CatalogRegistry, path: &StoragePath) -> Result<String> {
    resolve(registry, path).map(CatalogResolution::into_prefix)
}

fn selector_value(catalog: &CatalogType, selector: &PathSelector) -> Result<String> {
    match (catalog.is_custom(), selector) {
        (true, PathSelector::Custom(path)) => Ok(path.clone()),
        (false, PathSelector::Entity(id)) => Ok(id.to_string()),
        (true, PathSelector::Entity(_)) => Err(Error::SelectorMismatch {
            catalog: catalog.to_string(),
            expected: "a custom path",
        }),
        (false, PathSelector::Custom(_)) => Err(Error::SelectorMismatch {
            catalog: catalog.to_string(),
            expected: "an entity id",
        }),
    }
}
