//! # Catalog Registry — Per-Jurisdiction Mint Allow-Lists
//!
//! Holds the runtime-mutable catalog of `(category, recordType)`
//! combinations a jurisdiction may mint. The grammar consults one
//! immutable [`CatalogSnapshot`] per parse/generate operation; the
//! [`CatalogRegistry`] swaps the active snapshot atomically on
//! administrative reload.
//!
//! ## Precedence
//!
//! Per dimension (categories, record types):
//!
//! 1. a jurisdiction override, when present, entirely replaces the global
//!    list — no union;
//! 2. otherwise the global list applies;
//! 3. an absent or empty global list leaves the dimension unconstrained.
//!
//! An override that is present but empty allows nothing for that
//! dimension.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::error::CatalogError;

/// Lowercase, trim, and drop empty entries from a catalog list.
fn normalize_list(entries: &[String]) -> Vec<String> {
    entries
        .iter()
        .map(|e| e.trim().to_ascii_lowercase())
        .filter(|e| !e.is_empty())
        .collect()
}

/// Split a comma-separated configuration list into normalized entries.
fn parse_csv_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|e| e.trim().to_ascii_lowercase())
        .filter(|e| !e.is_empty())
        .collect()
}

/// Per-jurisdiction catalog override.
///
/// Matches the administrative JSON shape
/// `{"categories": [...], "recordTypes": [...]}`. A `None` dimension
/// falls through to the global list; a present list replaces it entirely.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogOverride {
    /// Replacement category list, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub categories: Option<Vec<String>>,
    /// Replacement record-type list, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub record_types: Option<Vec<String>>,
}

impl CatalogOverride {
    fn normalized(&self) -> Self {
        Self {
            categories: self.categories.as_deref().map(normalize_list),
            record_types: self.record_types.as_deref().map(normalize_list),
        }
    }
}

/// String-shaped catalog configuration, as supplied by an external loader.
#[derive(Debug, Clone, Default)]
pub struct CatalogConfig {
    /// Global allowed categories, comma-separated. Empty = unconstrained.
    pub allowed_categories: String,
    /// Global allowed record types, comma-separated. Empty = unconstrained.
    pub allowed_record_types: String,
    /// JSON object mapping jurisdiction code to a [`CatalogOverride`].
    /// Empty = no overrides.
    pub overrides_json: String,
}

/// One immutable, internally consistent view of the catalog.
///
/// Snapshots are built whole and never mutated; the registry replaces the
/// active snapshot by pointer swap, so a reader holding an
/// `Arc<CatalogSnapshot>` keeps a consistent view for as long as it needs
/// one.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct CatalogSnapshot {
    global_categories: Vec<String>,
    global_record_types: Vec<String>,
    overrides: HashMap<String, CatalogOverride>,
}

impl CatalogSnapshot {
    /// A snapshot with no constraints: any category and record type parses.
    pub fn unrestricted() -> Self {
        Self::default()
    }

    /// Build a snapshot from explicit lists, normalizing all entries.
    pub fn new(
        global_categories: Vec<String>,
        global_record_types: Vec<String>,
        overrides: HashMap<String, CatalogOverride>,
    ) -> Self {
        Self {
            global_categories: normalize_list(&global_categories),
            global_record_types: normalize_list(&global_record_types),
            overrides: overrides
                .into_iter()
                .map(|(j, o)| (j.trim().to_ascii_lowercase(), o.normalized()))
                .collect(),
        }
    }

    /// Build a snapshot from string-shaped configuration.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::InvalidOverrides`] if the overrides JSON is
    /// malformed. The caller's previously active snapshot is unaffected.
    pub fn from_config(config: &CatalogConfig) -> Result<Self, CatalogError> {
        let overrides: HashMap<String, CatalogOverride> = if config.overrides_json.trim().is_empty()
        {
            HashMap::new()
        } else {
            serde_json::from_str(&config.overrides_json)
                .map_err(|source| CatalogError::InvalidOverrides { source })?
        };
        Ok(Self::new(
            parse_csv_list(&config.allowed_categories),
            parse_csv_list(&config.allowed_record_types),
            overrides,
        ))
    }

    /// The effective allow-lists for one jurisdiction, per the precedence
    /// rule in the module docs.
    pub fn effective(&self, jurisdiction: &str) -> EffectiveCatalog<'_> {
        let ov = self.overrides.get(&jurisdiction.trim().to_ascii_lowercase());
        let categories = match ov.and_then(|o| o.categories.as_deref()) {
            Some(list) => Some(list),
            None if self.global_categories.is_empty() => None,
            None => Some(self.global_categories.as_slice()),
        };
        let record_types = match ov.and_then(|o| o.record_types.as_deref()) {
            Some(list) => Some(list),
            None if self.global_record_types.is_empty() => None,
            None => Some(self.global_record_types.as_slice()),
        };
        EffectiveCatalog {
            categories,
            record_types,
        }
    }
}

/// The allow-lists in force for one jurisdiction. `None` = unconstrained.
#[derive(Debug, Clone, Copy)]
pub struct EffectiveCatalog<'a> {
    /// Allowed categories, or `None` when unconstrained.
    pub categories: Option<&'a [String]>,
    /// Allowed record types, or `None` when unconstrained.
    pub record_types: Option<&'a [String]>,
}

impl EffectiveCatalog<'_> {
    /// Whether the (lowercase) category may be minted.
    pub fn allows_category(&self, category: &str) -> bool {
        match self.categories {
            None => true,
            Some(list) => list.iter().any(|c| c == category),
        }
    }

    /// Whether the (lowercase) record type may be minted.
    pub fn allows_record_type(&self, record_type: &str) -> bool {
        match self.record_types {
            None => true,
            Some(list) => list.iter().any(|t| t == record_type),
        }
    }
}

/// Long-lived registry holding the active catalog snapshot.
///
/// Readers take an `Arc` to the current snapshot and dereference only that
/// object; writers build a complete replacement snapshot and swap the
/// pointer under a short write lock. No reader can observe a half-updated
/// catalog.
#[derive(Debug, Default)]
pub struct CatalogRegistry {
    active: RwLock<Arc<CatalogSnapshot>>,
}

impl CatalogRegistry {
    /// Create a registry with the given initial snapshot.
    pub fn new(snapshot: CatalogSnapshot) -> Self {
        Self {
            active: RwLock::new(Arc::new(snapshot)),
        }
    }

    /// The currently active snapshot.
    pub fn snapshot(&self) -> Arc<CatalogSnapshot> {
        self.active.read().clone()
    }

    /// Re-read the catalog from configuration and atomically replace the
    /// active snapshot, returning the new view for confirmation.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError`] on malformed configuration; the prior
    /// snapshot stays active.
    pub fn reload(&self, config: &CatalogConfig) -> Result<Arc<CatalogSnapshot>, CatalogError> {
        let next = Arc::new(CatalogSnapshot::from_config(config)?);
        *self.active.write() = next.clone();
        tracing::info!(
            global_categories = next.global_categories.len(),
            global_record_types = next.global_record_types.len(),
            overrides = next.overrides.len(),
            "catalog reloaded"
        );
        Ok(next)
    }

    /// Install a new override mapping, keeping the current global lists,
    /// and atomically replace the active snapshot.
    pub fn set_overrides(
        &self,
        overrides: HashMap<String, CatalogOverride>,
    ) -> Arc<CatalogSnapshot> {
        let current = self.snapshot();
        let next = Arc::new(CatalogSnapshot::new(
            current.global_categories.clone(),
            current.global_record_types.clone(),
            overrides,
        ));
        *self.active.write() = next.clone();
        tracing::info!(overrides = next.overrides.len(), "catalog overrides replaced");
        next
    }
}
