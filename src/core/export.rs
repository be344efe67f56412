// emsctl - core/export.rs
//
// CSV export of the employee roster.
// Core layer: writes to any Write trait object.

use crate::core::model::Employee;
use crate::util::constants::CSV_HEADERS;
use crate::util::error::ExportError;
use std::io::Write;
use std::path::Path;

/// Export employees to CSV.
///
/// The header row matches the import format exactly, so an exported file
/// re-imports cleanly. `departmentId` is the employee's department id or
/// the empty string for records without one. Returns the number of data
/// rows written.
pub fn export_csv<W: Write>(
    employees: &[Employee],
    writer: W,
    export_path: &Path,
) -> Result<usize, ExportError> {
    let mut csv_writer = csv::Writer::from_writer(writer);

    csv_writer
        .write_record(CSV_HEADERS)
        .map_err(|e| ExportError::Csv {
            path: export_path.to_path_buf(),
            source: e,
        })?;

    let mut count = 0;
    for employee in employees {
        let age = employee.age.to_string();
        let department_id = employee
            .department
            .as_ref()
            .map(|d| d.id.to_string())
            .unwrap_or_default();

        csv_writer
            .write_record([
                employee.first_name.as_str(),
                employee.last_name.as_str(),
                employee.email.as_str(),
                age.as_str(),
                department_id.as_str(),
            ])
            .map_err(|e| ExportError::Csv {
                path: export_path.to_path_buf(),
                source: e,
            })?;
        count += 1;
    }

    csv_writer.flush().map_err(|e| ExportError::Io {
        path: export_path.to_path_buf(),
        source: e,
    })?;

    Ok(count)
}
