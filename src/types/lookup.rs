//! Lookup entity types (directors, service types, sale types)

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The three lookup tables the import pipeline resolves names against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LookupKind {
    Director,
    ServiceType,
    SaleType,
}

impl LookupKind {
    /// Database table backing this lookup kind.
    pub fn table(self) -> &'static str {
        match self {
            LookupKind::Director => "directors",
            LookupKind::ServiceType => "service_types",
            LookupKind::SaleType => "sale_types",
        }
    }

    /// Human-readable label used in log lines.
    pub fn label(self) -> &'static str {
        match self {
            LookupKind::Director => "director",
            LookupKind::ServiceType => "service type",
            LookupKind::SaleType => "sale type",
        }
    }
}

/// One lookup entity. Identity is case-insensitive on `name` within a kind.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct LookupEntity {
    pub id: Uuid,
    pub name: String,
    pub is_active: bool,
}

impl LookupEntity {
    /// A freshly auto-created entity, active by default.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            is_active: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_tables() {
        assert_eq!(LookupKind::Director.table(), "directors");
        assert_eq!(LookupKind::ServiceType.table(), "service_types");
        assert_eq!(LookupKind::SaleType.table(), "sale_types");
    }

    #[test]
    fn test_new_entity_is_active() {
        let entity = LookupEntity::new("Cremation");
        assert!(entity.is_active);
        assert_eq!(entity.name, "Cremation");
    }
}
