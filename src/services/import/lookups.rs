//! Lookup resolver
//!
//! Resolves free-text director/service-type/sale-type names to entity ids,
//! creating missing entities on the fly. Uses the bulk pre-scan strategy:
//! one fetch and at most one bulk insert per kind, then every row resolves
//! against the in-memory map. The cache lives for exactly one import
//! invocation; nothing here is shared across requests.

use std::collections::HashMap;

use anyhow::Result;
use tracing::info;
use uuid::Uuid;

use super::cell::CellValue;
use super::columns::{CaseField, ColumnMap};
use super::store::LookupStore;
use crate::types::LookupKind;

const SCANNED_KINDS: &[(LookupKind, CaseField)] = &[
    (LookupKind::Director, CaseField::Director),
    (LookupKind::ServiceType, CaseField::ServiceType),
    (LookupKind::SaleType, CaseField::SaleType),
];

/// Per-import cache of lookup name → id, keyed case-insensitively.
#[derive(Debug, Default)]
pub struct LookupCache {
    maps: HashMap<LookupKind, HashMap<String, Uuid>>,
}

impl LookupCache {
    /// Build the cache for one import: pre-scan all data rows for distinct
    /// names, fetch the existing entities once per kind, and bulk-create
    /// whatever the file mentions that the store does not yet have.
    pub async fn prepare(
        store: &dyn LookupStore,
        rows: &[Vec<CellValue>],
        columns: &ColumnMap,
    ) -> Result<Self> {
        let mut cache = Self::default();

        for &(kind, field) in SCANNED_KINDS {
            for entity in store.fetch_all(kind).await? {
                cache.insert(kind, &entity.name, entity.id);
            }

            // Distinct unseen names, first-seen casing preserved.
            let mut new_names: Vec<String> = Vec::new();
            for row in rows {
                let name = columns.cell(row, field).as_trimmed();
                if name.is_empty() {
                    continue;
                }
                let key = name.to_lowercase();
                if cache.contains(kind, &key)
                    || new_names.iter().any(|n| n.to_lowercase() == key)
                {
                    continue;
                }
                new_names.push(name);
            }

            if !new_names.is_empty() {
                info!(
                    "Creating {} new {} entries discovered in import file",
                    new_names.len(),
                    kind.label()
                );
                for entity in store.create_many(kind, &new_names).await? {
                    cache.insert(kind, &entity.name, entity.id);
                }
            }
        }

        Ok(cache)
    }

    /// Resolve a trimmed name, case-insensitively. Empty names never match.
    pub fn resolve(&self, kind: LookupKind, name: &str) -> Option<Uuid> {
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return None;
        }
        self.maps
            .get(&kind)
            .and_then(|m| m.get(&trimmed.to_lowercase()))
            .copied()
    }

    pub(crate) fn insert(&mut self, kind: LookupKind, name: &str, id: Uuid) {
        self.maps
            .entry(kind)
            .or_default()
            .insert(name.trim().to_lowercase(), id);
    }

    fn contains(&self, kind: LookupKind, lowercase_key: &str) -> bool {
        self.maps
            .get(&kind)
            .is_some_and(|m| m.contains_key(lowercase_key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_is_case_insensitive() {
        let mut cache = LookupCache::default();
        let id = Uuid::new_v4();
        cache.insert(LookupKind::Director, "Sam Hale", id);

        assert_eq!(cache.resolve(LookupKind::Director, "sam hale"), Some(id));
        assert_eq!(cache.resolve(LookupKind::Director, "  SAM HALE  "), Some(id));
        assert_eq!(cache.resolve(LookupKind::ServiceType, "Sam Hale"), None);
    }

    #[test]
    fn test_empty_name_never_matches() {
        let mut cache = LookupCache::default();
        cache.insert(LookupKind::SaleType, "", Uuid::new_v4());
        assert_eq!(cache.resolve(LookupKind::SaleType, ""), None);
        assert_eq!(cache.resolve(LookupKind::SaleType, "   "), None);
    }
}
