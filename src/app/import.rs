// emsctl - app/import.rs
//
// CSV import pipeline. Orchestrates one import run end to end:
//
//   1. Snapshot the valid department ids from the service.
//   2. Parse the file into data rows (file-level failures stop here).
//   3. Per row: validate against the snapshot, create valid rows one at
//      a time, collect a warning for everything else.
//
// Every data row becomes exactly one create attempt or exactly one
// warning, never both and never neither, so imported + warnings always
// equals the number of data rows. Per-row failures never abort the
// batch; file-level failures abort before any row is processed.
//
// The department snapshot is point-in-time: departments deleted while
// the import runs are not detected, the affected creates simply fail
// and turn into row warnings.

use std::path::Path;

use crate::api::backend::Backend;
use crate::app::bulk::percent;
use crate::core::model::ImportReport;
use crate::core::reconcile::{self, DepartmentIndex, RowPlan};
use crate::util::error::ImportError;

/// Run one import of `csv_text` against the service.
///
/// `path` is the file the text came from and only feeds error messages.
/// `on_progress` receives the rounded percentage of rows imported so
/// far, recomputed after each successful create, and a final 100 once
/// every row has been processed.
pub async fn run_import<P>(
    backend: &dyn Backend,
    csv_text: &str,
    path: &Path,
    mut on_progress: P,
) -> Result<ImportReport, ImportError>
where
    P: FnMut(u8),
{
    // The validity snapshot comes first: a service that cannot even list
    // departments is a file-level failure, not fifty row warnings.
    let departments = backend
        .list_departments()
        .await
        .map_err(|source| ImportError::Snapshot { source })?;
    let index = DepartmentIndex::new(&departments);

    let rows = reconcile::parse_rows(csv_text, path)?;
    let total = rows.len();
    tracing::info!(
        file = %path.display(),
        rows = total,
        departments = index.len(),
        "Import started"
    );

    let mut imported = 0usize;
    let mut warnings = Vec::new();

    for row in &rows {
        match reconcile::plan_row(row, &index) {
            RowPlan::Create(payload) => match backend.create_employee(&payload).await {
                Ok(_) => {
                    imported += 1;
                    on_progress(percent(imported, total));
                }
                Err(e) => {
                    tracing::warn!(line = row.line, email = %row.email, error = %e, "Row import failed");
                    warnings.push(reconcile::import_failure_warning(row));
                }
            },
            RowPlan::Reject { warning } => {
                tracing::debug!(line = row.line, "Row rejected: {warning}");
                warnings.push(warning);
            }
        }
    }

    on_progress(100);
    tracing::info!(imported, warnings = warnings.len(), "Import finished");

    Ok(ImportReport {
        imported,
        total_rows: total,
        warnings,
    })
}

// =============================================================================
// Unit tests
// =============================================================================
