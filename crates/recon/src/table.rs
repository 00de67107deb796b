use std::collections::HashMap;

use crate::config::DuplicatePolicy;
use crate::model::{DuplicateWarning, ReferenceGroup};

/// Comparison key for SKU IDs: whitespace-trimmed, uppercased.
pub fn normalize_key(id: &str) -> String {
    id.trim().to_uppercase()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceEntry {
    /// Identifier as scraped (case preserved).
    pub identifier: String,
    pub group: String,
}

/// Normalized identifier → owning group, built once over every reference
/// group in processing order.
#[derive(Debug, Clone, Default)]
pub struct ReferenceTable {
    entries: HashMap<String, ReferenceEntry>,
}

impl ReferenceTable {
    /// Build the table, collecting a warning each time an identifier turns up
    /// under a second, different group. `policy` decides which group keeps it.
    pub fn build(
        groups: &[ReferenceGroup],
        policy: DuplicatePolicy,
    ) -> (Self, Vec<DuplicateWarning>) {
        let mut entries: HashMap<String, ReferenceEntry> = HashMap::new();
        let mut warnings = Vec::new();

        for group in groups {
            for identifier in &group.identifiers {
                let key = normalize_key(identifier);
                match entries.get_mut(&key) {
                    Some(existing) => {
                        if existing.group != group.name {
                            warnings.push(DuplicateWarning {
                                identifier: identifier.clone(),
                                earlier_group: existing.group.clone(),
                                later_group: group.name.clone(),
                            });
                        }
                        if policy == DuplicatePolicy::LastWins {
                            existing.identifier = identifier.clone();
                            existing.group = group.name.clone();
                        }
                    }
                    None => {
                        entries.insert(
                            key,
                            ReferenceEntry {
                                identifier: identifier.clone(),
                                group: group.name.clone(),
                            },
                        );
                    }
                }
            }
        }

        (Self { entries }, warnings)
    }

    /// Look up an input SKU ID; normalization is applied here.
    pub fn lookup(&self, sku_id: &str) -> Option<&ReferenceEntry> {
        self.entries.get(&normalize_key(sku_id))
    }

    pub fn group_of(&self, sku_id: &str) -> Option<&str> {
        self.lookup(sku_id).map(|e| e.group.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
