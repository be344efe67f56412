// emsctl - core/filter.rs
//
// Derived views over parsed log records and fetched rosters.
// All active filters are AND-combined; filtering never mutates the
// underlying data. Core layer: pure logic, no I/O.

use crate::core::model::{Department, Employee, LogRecord};

/// Filter state for the activity log view. Both fields are AND-combined
/// when applied; an empty field is inactive.
#[derive(Debug, Clone, Default)]
pub struct LogFilter {
    /// Substring match on the acting user (case-insensitive).
    pub user: String,

    /// Substring match on the action verb phrase (case-insensitive),
    /// e.g. "creat" matches "is creating", "created" and "error creating".
    pub action: String,
}

impl LogFilter {
    /// Returns true if no filters are active.
    pub fn is_empty(&self) -> bool {
        self.user.is_empty() && self.action.is_empty()
    }
}

/// Apply the log filter to a slice of records, returning indices of matches.
///
/// Returns indices into the original slice. The records themselves are
/// never copied or modified, so the unfiltered view stays intact.
pub fn apply_log_filter(records: &[LogRecord], filter: &LogFilter) -> Vec<usize> {
    if filter.is_empty() {
        return (0..records.len()).collect();
    }

    let user_lower = filter.user.to_lowercase();
    let action_lower = filter.action.to_lowercase();

    records
        .iter()
        .enumerate()
        .filter(|(_, record)| matches_all(record, &user_lower, &action_lower))
        .map(|(idx, _)| idx)
        .collect()
}

/// Check if a single record matches all active filters.
fn matches_all(record: &LogRecord, user_lower: &str, action_lower: &str) -> bool {
    if !user_lower.is_empty() && !record.user.to_lowercase().contains(user_lower) {
        return false;
    }

    if !action_lower.is_empty() && !record.action.as_str().contains(action_lower) {
        return false;
    }

    true
}

/// Filter the employee roster by a search term, returning indices.
///
/// A row matches when the term appears in the first name, last name or
/// email (case-insensitive). An empty term matches everything.
pub fn filter_employees(employees: &[Employee], term: &str) -> Vec<usize> {
    if term.is_empty() {
        return (0..employees.len()).collect();
    }

    let term_lower = term.to_lowercase();
    employees
        .iter()
        .enumerate()
        .filter(|(_, e)| {
            e.first_name.to_lowercase().contains(&term_lower)
                || e.last_name.to_lowercase().contains(&term_lower)
                || e.email.to_lowercase().contains(&term_lower)
        })
        .map(|(idx, _)| idx)
        .collect()
}

/// Filter the department list by a search term on the name, returning indices.
pub fn filter_departments(departments: &[Department], term: &str) -> Vec<usize> {
    if term.is_empty() {
        return (0..departments.len()).collect();
    }

    let term_lower = term.to_lowercase();
    departments
        .iter()
        .enumerate()
        .filter(|(_, d)| d.name.to_lowercase().contains(&term_lower))
        .map(|(idx, _)| idx)
        .collect()
}
