use std::collections::HashMap;
use std::fs;

use camino::Utf8Path;

use crate::domain::{CatalogEntry, GroupId, ProductId};
use crate::error::TrackerError;

/// Canonical product reference list. Loaded in full on every call site that
/// needs it; the file is required static configuration, so a missing catalog
/// is fatal rather than a degraded lookup.
#[derive(Debug, Clone)]
pub struct Catalog {
    entries: Vec<CatalogEntry>,
}

impl Catalog {
    pub fn load(path: &Utf8Path) -> Result<Self, TrackerError> {
        if !path.as_std_path().exists() {
            return Err(TrackerError::MissingCatalog(path.to_owned()));
        }
        let content = fs::read_to_string(path.as_std_path())
            .map_err(|_| TrackerError::CatalogRead(path.to_owned()))?;
        let entries: Vec<CatalogEntry> = serde_json::from_str(&content)
            .map_err(|err| TrackerError::CatalogParse(err.to_string()))?;
        Ok(Self { entries })
    }

    pub fn from_entries(entries: Vec<CatalogEntry>) -> Self {
        Self { entries }
    }

    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    /// Linear scan for an exact (group, product) id pair, compared as text.
    /// First match wins when the catalog carries duplicates.
    pub fn find_by_ids(&self, group: &GroupId, product: &ProductId) -> Option<&CatalogEntry> {
        self.entries.iter().find(|entry| {
            entry.group_id == group.as_str() && entry.product_id == product.as_str()
        })
    }

    /// Linear scan for an exact display name. No normalization here; callers
    /// that want fuzzy behavior go through [`NameIndex`].
    pub fn find_by_name(&self, name: &str) -> Option<&CatalogEntry> {
        self.entries.iter().find(|entry| entry.name == name)
    }
}

/// Collapses internal whitespace, trims, and lowercases for matching.
pub fn normalize_name(value: &str) -> String {
    value
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Normalized-name index over a catalog, preserving catalog order for the
/// substring fallback. On duplicate normalized names the first-encountered
/// entry wins; later duplicates are ignored for matching.
pub struct NameIndex<'a> {
    ordered: Vec<(String, &'a CatalogEntry)>,
    exact: HashMap<String, usize>,
}

impl<'a> NameIndex<'a> {
    pub fn build(catalog: &'a Catalog) -> Self {
        let mut ordered = Vec::new();
        let mut exact = HashMap::new();
        for entry in catalog.entries() {
            let normalized = normalize_name(&entry.name);
            if normalized.is_empty() || exact.contains_key(&normalized) {
                continue;
            }
            exact.insert(normalized.clone(), ordered.len());
            ordered.push((normalized, entry));
        }
        Self { ordered, exact }
    }

    /// Exact normalized match first, then a substring fallback scanned in
    /// catalog order (entry name within item or item within entry name).
    /// The fallback is order-dependent: reordering the catalog can change
    /// which entry wins even when its content does not. It also means empty
    /// item text matches the first entry, since the empty string is a
    /// substring of every name.
    pub fn match_item(&self, item: &str) -> Option<&'a CatalogEntry> {
        let normalized = normalize_name(item);
        if let Some(&index) = self.exact.get(&normalized) {
            return Some(self.ordered[index].1);
        }
        self.ordered
            .iter()
            .find(|(name, _)| normalized.contains(name) || name.contains(&normalized))
            .map(|(_, entry)| *entry)
    }
}
