use crate::model::{ReconOutcome, ReconSummary};

/// Compute summary statistics from a reconciliation outcome.
pub fn compute_summary(outcome: &ReconOutcome) -> ReconSummary {
    ReconSummary {
        input_records: outcome.found.len() + outcome.not_found.len(),
        groups: outcome.groups,
        empty_groups: outcome.empty_groups,
        reference_identifiers: outcome.reference_identifiers,
        found: outcome.found.len(),
        not_found: outcome.not_found.len(),
        duplicates: outcome.duplicates.len(),
    }
}

impl ReconOutcome {
    pub fn summary(&self) -> ReconSummary {
        compute_summary(self)
    }
}
