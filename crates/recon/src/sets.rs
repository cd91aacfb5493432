use std::collections::BTreeSet;

use crate::model::ReconciliationReport;

/// Symmetric difference of two identifier collections.
///
/// Inputs are deduplicated first; multiplicity never shows up in the result.
/// Both difference lists come out in ascending lexical order.
pub fn reconcile<A, B>(first: A, second: B) -> ReconciliationReport
where
    A: IntoIterator,
    A::Item: Into<String>,
    B: IntoIterator,
    B::Item: Into<String>,
{
    let first: BTreeSet<String> = first.into_iter().map(Into::into).collect();
    let second: BTreeSet<String> = second.into_iter().map(Into::into).collect();

    ReconciliationReport {
        first_count: first.len(),
        second_count: second.len(),
        in_both: first.intersection(&second).count(),
        only_in_first: first.difference(&second).cloned().collect(),
        only_in_second: second.difference(&first).cloned().collect(),
    }
}
