// emsctl - app/bulk.rs
//
// Generic bulk apply: run one operation per selected id, sequentially,
// with continue-on-error semantics and a progress callback. Employees
// and departments share this loop; only the per-id operation differs.
//
// The loop is intentionally sequential. Progress is recomputed from the
// completed-so-far count, so parallel dispatch would make the percentage
// lie about how much work is actually done.

use std::future::Future;

use crate::core::model::BulkReport;
use crate::util::error::ApiError;

/// Percentage of `done` out of `total`, rounded to the nearest integer.
/// Callers must not pass `total == 0`; handle the empty case first.
pub(crate) fn percent(done: usize, total: usize) -> u8 {
    ((done as f64 / total as f64) * 100.0).round() as u8
}

/// Apply `op` to every id in `ids`, in order.
///
/// A failed item is recorded in the report and the loop continues; one
/// bad record never aborts the batch. `on_progress` is invoked with the
/// rounded percentage after each successful item and with a final 100
/// once the batch completes, so the last value is always 100 even when
/// some items failed.
///
/// `label` names the record kind ("employee", "department") in error
/// entries.
pub async fn bulk_apply<F, Fut, P>(
    label: &str,
    ids: &[u64],
    mut op: F,
    mut on_progress: P,
) -> BulkReport
where
    F: FnMut(u64) -> Fut,
    Fut: Future<Output = Result<(), ApiError>>,
    P: FnMut(u8),
{
    let total = ids.len();
    let mut applied = 0usize;
    let mut errors = Vec::new();

    for &id in ids {
        match op(id).await {
            Ok(()) => {
                applied += 1;
                on_progress(percent(applied, total));
            }
            Err(e) => {
                tracing::warn!(id, error = %e, "Bulk operation failed for one item");
                errors.push(format!("{label} {id}: {e}"));
            }
        }
    }

    on_progress(100);
    tracing::info!(label, applied, failed = errors.len(), "Bulk operation finished");

    BulkReport {
        applied,
        total,
        errors,
    }
}

// =============================================================================
// Unit tests
// =============================================================================
