// emsctl - core/model.rs
//
// Core data model types. Pure data definitions with no I/O and no
// network dependencies.
//
// These types are the shared vocabulary across all layers.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::util::constants::{DEFAULT_LOG_LINES, LOG_LINE_OPTIONS};

// =============================================================================
// Employee / Department (authoritative records from the service)
// =============================================================================

/// An employee record as the service returns it.
///
/// Existence is authoritative in the external store; nothing here is cached
/// beyond the lifetime of the command that fetched it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Employee {
    pub id: u64,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub age: i32,

    /// Department the employee belongs to. Absent on records created before
    /// departments became mandatory, so export treats it as optional.
    #[serde(default)]
    pub department: Option<Department>,
}

/// A department record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Department {
    pub id: u64,
    pub name: String,
}

/// Reference to an existing department inside a create/update payload.
/// The service only reads the id.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DepartmentRef {
    pub id: u64,
}

/// Payload for creating or replacing an employee.
///
/// `age` is nullable on the wire: an import row whose age cell is not a
/// number still produces a create attempt, with a null age.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewEmployee {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub age: Option<i32>,
    pub department: DepartmentRef,
}

// =============================================================================
// Activity log records
// =============================================================================

/// Action verbs the service writes into its activity log.
///
/// This is a closed set: the line pattern is built from exactly these
/// variants, so a log line carrying any other verb does not parse into a
/// structured record. Extending the set is a deliberate change here, not
/// an accident of a looser pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LogAction {
    IsCreating,
    Created,
    IsUpdating,
    Updated,
    IsDeleting,
    Deleted,
    ErrorCreating,
    ErrorUpdating,
    ErrorDeleting,
}

impl LogAction {
    /// All variants, in the order the line pattern tries them.
    pub fn all() -> &'static [LogAction] {
        &[
            LogAction::IsCreating,
            LogAction::Created,
            LogAction::IsUpdating,
            LogAction::Updated,
            LogAction::IsDeleting,
            LogAction::Deleted,
            LogAction::ErrorCreating,
            LogAction::ErrorUpdating,
            LogAction::ErrorDeleting,
        ]
    }

    /// The exact phrase as it appears in a log line.
    pub fn as_str(&self) -> &'static str {
        match self {
            LogAction::IsCreating => "is creating",
            LogAction::Created => "created",
            LogAction::IsUpdating => "is updating",
            LogAction::Updated => "updated",
            LogAction::IsDeleting => "is deleting",
            LogAction::Deleted => "deleted",
            LogAction::ErrorCreating => "error creating",
            LogAction::ErrorUpdating => "error updating",
            LogAction::ErrorDeleting => "error deleting",
        }
    }

    /// Maps a captured verb phrase back to its variant.
    pub fn from_phrase(phrase: &str) -> Option<LogAction> {
        Self::all().iter().copied().find(|a| a.as_str() == phrase)
    }
}

impl std::fmt::Display for LogAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Entity types the activity log talks about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogEntity {
    Employee,
    Department,
}

impl LogEntity {
    pub fn all() -> &'static [LogEntity] {
        &[LogEntity::Employee, LogEntity::Department]
    }

    /// The exact token as it appears in a log line.
    pub fn as_str(&self) -> &'static str {
        match self {
            LogEntity::Employee => "employee",
            LogEntity::Department => "department",
        }
    }

    pub fn from_token(token: &str) -> Option<LogEntity> {
        Self::all().iter().copied().find(|e| e.as_str() == token)
    }
}

impl std::fmt::Display for LogEntity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single service log line decomposed into named fields.
///
/// Lines that do not match the fixed pattern never become records; they
/// only survive in the raw-text fallback held by the log view.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LogRecord {
    /// Timestamp as written by the service (no timezone on the wire).
    pub timestamp: NaiveDateTime,

    /// Level token, e.g. "INFO" or "ERROR". Kept as written.
    pub level: String,

    /// The acting user named after the literal phrase "User".
    pub user: String,

    /// Action verb, one of the closed set.
    pub action: LogAction,

    /// Entity the action applied to.
    pub entity: LogEntity,

    /// Record id, present on completed mutations ("with id: N").
    pub id: Option<u64>,

    /// Trailing free text, e.g. an error detail.
    pub details: Option<String>,

    /// The original unparsed line.
    pub raw: String,
}

// =============================================================================
// Log fetch line count
// =============================================================================

/// Number of log lines to request from the service.
///
/// The service endpoint accepts a fixed set of values; this type cannot hold
/// anything outside it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineCount(u32);

impl LineCount {
    /// Builds a line count, rejecting values outside the allowed set.
    pub fn new(n: u32) -> Option<LineCount> {
        LOG_LINE_OPTIONS.contains(&n).then_some(LineCount(n))
    }

    pub fn get(self) -> u32 {
        self.0
    }
}

impl Default for LineCount {
    fn default() -> Self {
        LineCount(DEFAULT_LOG_LINES)
    }
}

impl std::fmt::Display for LineCount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for LineCount {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let allowed = || {
            LOG_LINE_OPTIONS
                .iter()
                .map(u32::to_string)
                .collect::<Vec<_>>()
                .join(", ")
        };
        let n: u32 = s
            .parse()
            .map_err(|_| format!("'{s}' is not a number (allowed: {})", allowed()))?;
        LineCount::new(n).ok_or_else(|| format!("'{n}' is not allowed (allowed: {})", allowed()))
    }
}

// =============================================================================
// Operation reports
// =============================================================================

/// Outcome of one CSV import run.
///
/// Per-row problems land in `warnings`; file-level failures abort the run
/// with an `ImportError` instead and produce no report at all.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImportReport {
    /// Rows successfully created in the service.
    pub imported: usize,

    /// Data rows present in the file (header and blank lines excluded).
    pub total_rows: usize,

    /// One entry per skipped or failed row, in row order.
    /// Row numbers are 1-based file line numbers (header is line 1).
    pub warnings: Vec<String>,
}

/// Outcome of one bulk apply run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BulkReport {
    /// Items the operation succeeded on.
    pub applied: usize,

    /// Items attempted in total.
    pub total: usize,

    /// One entry per failed item, in attempt order.
    pub errors: Vec<String>,
}

// =============================================================================
// Staff summary (aggregate view over the roster)
// =============================================================================

/// One bar of the age histogram.
#[derive(Debug, Clone, PartialEq)]
pub struct AgeBand {
    pub label: &'static str,
    pub count: usize,
}

/// Aggregates over the current employee and department lists.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StaffSummary {
    pub employee_count: usize,
    pub department_count: usize,

    /// Mean age across the roster; 0.0 when there are no employees.
    /// Render with one decimal place.
    pub average_age: f64,

    /// Histogram over the fixed bands 20-29 through 60+. Ages below 20
    /// fall outside every band.
    pub age_bands: Vec<AgeBand>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn action_phrases_round_trip() {
        for action in LogAction::all() {
            assert_eq!(LogAction::from_phrase(action.as_str()), Some(*action));
        }
    }

    #[test]
    fn unknown_action_phrase_is_rejected() {
        assert_eq!(LogAction::from_phrase("archived"), None);
        assert_eq!(LogAction::from_phrase("creating"), None);
    }

    #[test]
    fn entity_tokens_round_trip() {
        for entity in LogEntity::all() {
            assert_eq!(LogEntity::from_token(entity.as_str()), Some(*entity));
        }
        assert_eq!(LogEntity::from_token("user"), None);
    }

    #[test]
    fn line_count_accepts_only_the_fixed_set() {
        for &n in LOG_LINE_OPTIONS {
            assert_eq!(LineCount::new(n).map(LineCount::get), Some(n));
        }
        assert!(LineCount::new(0).is_none());
        assert!(LineCount::new(51).is_none());
        assert!(LineCount::new(10_000).is_none());
    }

    #[test]
    fn line_count_parses_from_str() {
        let ok: LineCount = "500".parse().unwrap();
        assert_eq!(ok.get(), 500);
        assert!("abc".parse::<LineCount>().is_err());
        assert!("300".parse::<LineCount>().is_err());
    }

    #[test]
    fn default_line_count_is_in_the_allowed_set() {
        assert!(LOG_LINE_OPTIONS.contains(&LineCount::default().get()));
    }

    #[test]
    fn new_employee_serialises_with_wire_field_names() {
        let payload = NewEmployee {
            first_name: "John".into(),
            last_name: "Doe".into(),
            email: "john@x.com".into(),
            age: Some(30),
            department: DepartmentRef { id: 1 },
        };
        let value = serde_json::to_value(&payload).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "firstName": "John",
                "lastName": "Doe",
                "email": "john@x.com",
                "age": 30,
                "department": {"id": 1}
            })
        );
    }

    #[test]
    fn unparsable_age_serialises_as_null() {
        let payload = NewEmployee {
            first_name: "Jane".into(),
            last_name: "Doe".into(),
            email: "jane@x.com".into(),
            age: None,
            department: DepartmentRef { id: 2 },
        };
        let value = serde_json::to_value(&payload).unwrap();
        assert_eq!(value["age"], serde_json::Value::Null);
    }

    #[test]
    fn employee_deserialises_without_department() {
        let emp: Employee = serde_json::from_str(
            r#"{"id":9,"firstName":"A","lastName":"B","email":"a@b.c","age":41}"#,
        )
        .unwrap();
        assert_eq!(emp.department, None);
        assert_eq!(emp.age, 41);
    }
}
