// emsctl - core/reconcile.rs
//
// CSV roster parsing and per-row validation against the department
// snapshot. Core layer: works on text already in memory, never touches
// the filesystem or the network.

use std::collections::HashMap;
use std::path::Path;

use crate::core::model::{Department, DepartmentRef, NewEmployee};
use crate::util::constants::MAX_IMPORT_ROWS;
use crate::util::error::ImportError;

/// One data row lifted from an import file.
///
/// Values are kept exactly as written; trimming and number coercion happen
/// at plan time so warnings can echo the original cell content.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CsvRow {
    /// Display line number: position among the parsed data rows plus the
    /// header offset, so the first data row is "Row 2".
    pub line: u64,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub age: String,
    pub department_id: String,
}

/// Decision for one row: either a payload to send to the create endpoint,
/// or the exact warning to report. Never both, never neither.
#[derive(Debug, Clone, PartialEq)]
pub enum RowPlan {
    Create(NewEmployee),
    Reject { warning: String },
}

/// Point-in-time snapshot of valid department ids, keyed by the string
/// form import rows are matched against.
///
/// Matching is exact after trimming: "01" does not resolve to department 1.
#[derive(Debug, Clone, Default)]
pub struct DepartmentIndex {
    by_id: HashMap<String, u64>,
}

impl DepartmentIndex {
    pub fn new(departments: &[Department]) -> DepartmentIndex {
        let by_id = departments
            .iter()
            .map(|d| (d.id.to_string(), d.id))
            .collect();
        DepartmentIndex { by_id }
    }

    /// Resolves a raw departmentId cell to a known department id.
    pub fn resolve(&self, raw: &str) -> Option<u64> {
        self.by_id.get(raw.trim()).copied()
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }
}

/// Parse import file content into data rows.
///
/// The first line is a header row; columns are matched by name against the
/// expected import headers, so column order does not matter. A column that
/// is absent from the header yields empty values (and therefore per-row
/// warnings downstream), not a file-level error. Blank lines are skipped
/// and do not advance row numbering. Structurally broken CSV (for example
/// a row with a different field count than the header) is a file-level
/// error: no rows are returned.
///
/// `path` is only used for error context.
pub fn parse_rows(text: &str, path: &Path) -> Result<Vec<CsvRow>, ImportError> {
    let mut reader = csv::Reader::from_reader(text.as_bytes());

    let headers = reader
        .headers()
        .map_err(|e| ImportError::Csv {
            path: path.to_path_buf(),
            source: e,
        })?
        .clone();
    let column = |name: &str| headers.iter().position(|h| h == name);
    let first_name_col = column("firstName");
    let last_name_col = column("lastName");
    let email_col = column("email");
    let age_col = column("age");
    let department_id_col = column("departmentId");

    let mut rows = Vec::new();
    for (idx, record) in reader.records().enumerate() {
        let record = record.map_err(|e| ImportError::Csv {
            path: path.to_path_buf(),
            source: e,
        })?;
        let field = |col: Option<usize>| {
            col.and_then(|i| record.get(i))
                .unwrap_or_default()
                .to_string()
        };
        rows.push(CsvRow {
            line: idx as u64 + 2,
            first_name: field(first_name_col),
            last_name: field(last_name_col),
            email: field(email_col),
            age: field(age_col),
            department_id: field(department_id_col),
        });
    }

    if rows.len() > MAX_IMPORT_ROWS {
        return Err(ImportError::TooManyRows {
            count: rows.len(),
            max: MAX_IMPORT_ROWS,
        });
    }

    tracing::debug!(
        file = %path.display(),
        rows = rows.len(),
        "Import file parsed"
    );

    Ok(rows)
}

/// Decide what happens to one row.
///
/// A row whose departmentId cell is empty or does not resolve against the
/// snapshot is rejected with the canonical warning and must never reach the
/// create endpoint. Any other row becomes exactly one create payload; an
/// age cell that is not a number coerces to a null age rather than
/// rejecting the row.
pub fn plan_row(row: &CsvRow, departments: &DepartmentIndex) -> RowPlan {
    let Some(dept_id) = departments.resolve(&row.department_id) else {
        return RowPlan::Reject {
            warning: format!(
                "Row {}: Invalid or missing departmentId ({})",
                row.line, row.department_id
            ),
        };
    };

    RowPlan::Create(NewEmployee {
        first_name: row.first_name.clone(),
        last_name: row.last_name.clone(),
        email: row.email.clone(),
        age: row.age.trim().parse::<i32>().ok(),
        department: DepartmentRef { id: dept_id },
    })
}

/// The canonical warning for a row whose create call failed.
pub fn import_failure_warning(row: &CsvRow) -> String {
    format!("Row {}: Error importing employee ({})", row.line, row.email)
}
