// emsctl - util/constants.rs
//
// Single source of truth for all named constants, limits, and defaults.

// =============================================================================
// Application metadata
// =============================================================================

/// Application display name.
pub const APP_NAME: &str = "emsctl";

/// Application identifier used for config/data directories.
pub const APP_ID: &str = "emsctl";

/// Current application version (updated by release script).
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

// =============================================================================
// Service endpoint defaults
// =============================================================================

/// Default base URL of the employee service when no config file overrides it.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8080";

/// Default HTTP request timeout in seconds.
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;

/// Minimum user-configurable HTTP timeout (seconds).
pub const MIN_HTTP_TIMEOUT_SECS: u64 = 1;

/// Maximum user-configurable HTTP timeout (seconds).
/// Anything longer than this and the operator is better served by a retry.
pub const MAX_HTTP_TIMEOUT_SECS: u64 = 300; // 5 min

// =============================================================================
// Import limits
// =============================================================================

/// Maximum number of data rows accepted in one CSV import.
///
/// Each valid row becomes one sequential HTTP create call, so a runaway file
/// would otherwise hold the command (and the service) for hours. Files above
/// this cap are rejected before any row is processed.
pub const MAX_IMPORT_ROWS: usize = 50_000;

/// Column header row required on import files and written on export.
pub const CSV_HEADERS: &[&str] = &["firstName", "lastName", "email", "age", "departmentId"];

// =============================================================================
// Activity log viewer
// =============================================================================

/// Line counts the service accepts for a log fetch. The CLI restricts the
/// `--lines` argument to exactly this set.
pub const LOG_LINE_OPTIONS: &[u32] = &[50, 100, 200, 500, 1000];

/// Default number of log lines requested when neither flag nor config says.
pub const DEFAULT_LOG_LINES: u32 = 200;

// =============================================================================
// Logging
// =============================================================================

/// Default log level.
pub const DEFAULT_LOG_LEVEL: &str = "info";

// =============================================================================
// Configuration
// =============================================================================

/// Configuration file name.
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Session persistence file name (stored in the platform data directory).
pub const SESSION_FILE_NAME: &str = "session.json";
