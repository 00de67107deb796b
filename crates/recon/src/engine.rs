use crate::config::DuplicatePolicy;
use crate::model::{FoundSku, InputSet, ReconOutcome, ReferenceGroup};
use crate::table::ReferenceTable;

/// Partition `input` into found / not-found against every reference group.
///
/// Groups are consumed in the order given (config order of the URLs); that
/// order drives duplicate warnings and, with `policy`, group assignment.
/// Identifiers that only exist on the reference side are ignored.
pub fn reconcile(
    input: &InputSet,
    groups: &[ReferenceGroup],
    policy: DuplicatePolicy,
) -> ReconOutcome {
    let (table, duplicates) = ReferenceTable::build(groups, policy);

    let mut outcome = ReconOutcome {
        duplicates,
        reference_identifiers: table.len(),
        groups: groups.len(),
        empty_groups: groups.iter().filter(|g| g.identifiers.is_empty()).count(),
        ..Default::default()
    };

    for record in input.iter() {
        match table.lookup(&record.sku_id) {
            Some(entry) => {
                outcome.found.insert(
                    record.sku_id.clone(),
                    FoundSku {
                        record: record.clone(),
                        group: entry.group.clone(),
                    },
                );
            }
            None => {
                outcome.not_found.insert(record.sku_id.clone(), record.clone());
            }
        }
    }

    outcome
}
