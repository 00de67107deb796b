use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use crate::config::{DuplicatePolicy, ExportSelection};

// ---------------------------------------------------------------------------
// Input
// ---------------------------------------------------------------------------

/// One billed line item from the input dataset.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkuRecord {
    /// SKU ID exactly as stored in the dataset (not trimmed, not uppercased).
    pub sku_id: String,
    pub description: String,
    pub cost: f64,
}

/// Input records keyed by their original SKU ID.
#[derive(Debug, Clone, Default)]
pub struct InputSet {
    records: BTreeMap<String, SkuRecord>,
}

impl InputSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a record. Returns the record it replaced when the same SKU ID
    /// was already present (later rows win).
    pub fn insert(&mut self, record: SkuRecord) -> Option<SkuRecord> {
        self.records.insert(record.sku_id.clone(), record)
    }

    pub fn get(&self, sku_id: &str) -> Option<&SkuRecord> {
        self.records.get(sku_id)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &SkuRecord> {
        self.records.values()
    }
}

impl FromIterator<SkuRecord> for InputSet {
    fn from_iter<I: IntoIterator<Item = SkuRecord>>(iter: I) -> Self {
        let mut set = InputSet::new();
        for record in iter {
            set.insert(record);
        }
        set
    }
}

/// Identifiers scraped from one reference URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceGroup {
    pub name: String,
    pub identifiers: BTreeSet<String>,
}

impl ReferenceGroup {
    pub fn new(name: impl Into<String>, identifiers: BTreeSet<String>) -> Self {
        Self {
            name: name.into(),
            identifiers,
        }
    }

    /// Group for a URL whose fetch failed: contributes nothing.
    pub fn empty(name: impl Into<String>) -> Self {
        Self::new(name, BTreeSet::new())
    }
}

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

/// The same identifier was published under two different groups.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DuplicateWarning {
    pub identifier: String,
    pub earlier_group: String,
    pub later_group: String,
}

impl std::fmt::Display for DuplicateWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "SKU {} found in both {} and {}",
            self.identifier, self.earlier_group, self.later_group
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FoundSku {
    pub record: SkuRecord,
    pub group: String,
}

/// Found / not-found partition of the input set, keyed by original SKU ID.
#[derive(Debug, Clone, Default)]
pub struct ReconOutcome {
    pub found: BTreeMap<String, FoundSku>,
    pub not_found: BTreeMap<String, SkuRecord>,
    pub duplicates: Vec<DuplicateWarning>,
    /// Distinct (normalized) identifiers in the reference table.
    pub reference_identifiers: usize,
    pub groups: usize,
    /// Groups that contributed no identifiers at all.
    pub empty_groups: usize,
}

// ---------------------------------------------------------------------------
// Summary
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReconSummary {
    pub input_records: usize,
    pub groups: usize,
    pub empty_groups: usize,
    pub reference_identifiers: usize,
    pub found: usize,
    pub not_found: usize,
    pub duplicates: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct RunMeta {
    pub config_path: String,
    pub selection: ExportSelection,
    pub duplicate_policy: DuplicatePolicy,
    pub engine_version: String,
    pub run_at: String,
}

/// Everything `skucheck run --json` prints.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub meta: RunMeta,
    pub summary: ReconSummary,
    pub duplicates: Vec<DuplicateWarning>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report_path: Option<String>,
}
