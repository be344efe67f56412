// emsctl - util/error.rs
//
// Typed error hierarchy with context-preserving error chains.
// No string-based error propagation; all errors preserve the causal
// chain for diagnostic logging.

use std::fmt;
use std::io;
use std::path::PathBuf;

/// Top-level error type for all emsctl operations.
/// Errors are categorised by the subsystem that produced them.
#[derive(Debug)]
pub enum EmsError {
    /// A call to the employee service failed.
    Api(ApiError),

    /// CSV import failed at file level (per-row failures are warnings,
    /// not errors).
    Import(ImportError),

    /// Activity log retrieval or interpretation failed.
    LogView(LogViewError),

    /// Export operation failed.
    Export(ExportError),

    /// Session persistence failed.
    Session(String),

    /// I/O error with path context.
    Io {
        path: PathBuf,
        operation: &'static str,
        source: io::Error,
    },
}

impl fmt::Display for EmsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Api(e) => write!(f, "Service error: {e}"),
            Self::Import(e) => write!(f, "Import error: {e}"),
            Self::LogView(e) => write!(f, "Log viewer error: {e}"),
            Self::Export(e) => write!(f, "Export error: {e}"),
            Self::Session(reason) => write!(f, "Session error: {reason}"),
            Self::Io {
                path,
                operation,
                source,
            } => write!(
                f,
                "I/O error during {operation} on '{}': {source}",
                path.display()
            ),
        }
    }
}

impl std::error::Error for EmsError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Api(e) => Some(e),
            Self::Import(e) => Some(e),
            Self::LogView(e) => Some(e),
            Self::Export(e) => Some(e),
            Self::Session(_) => None,
            Self::Io { source, .. } => Some(source),
        }
    }
}

// ---------------------------------------------------------------------------
// Service (REST) errors
// ---------------------------------------------------------------------------

/// Errors produced by calls to the employee service.
#[derive(Debug)]
pub enum ApiError {
    /// The request never completed (connection refused, DNS, timeout).
    Transport { url: String, source: reqwest::Error },

    /// The service answered with a non-success status code.
    Status {
        url: String,
        status: u16,
        body: String,
    },

    /// The response body could not be decoded into the expected shape.
    Decode { url: String, source: reqwest::Error },

    /// The response decoded but a field the operation depends on is absent.
    MissingField { url: String, field: &'static str },
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Transport { url, source } => {
                write!(f, "Request to '{url}' failed: {source}")
            }
            Self::Status { url, status, body } => {
                if body.is_empty() {
                    write!(f, "'{url}' returned HTTP {status}")
                } else {
                    write!(f, "'{url}' returned HTTP {status}: {body}")
                }
            }
            Self::Decode { url, source } => {
                write!(f, "Unexpected response from '{url}': {source}")
            }
            Self::MissingField { url, field } => {
                write!(f, "Response from '{url}' is missing the '{field}' field")
            }
        }
    }
}

impl std::error::Error for ApiError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Transport { source, .. } => Some(source),
            Self::Decode { source, .. } => Some(source),
            Self::Status { .. } | Self::MissingField { .. } => None,
        }
    }
}

impl From<ApiError> for EmsError {
    fn from(e: ApiError) -> Self {
        Self::Api(e)
    }
}

// ---------------------------------------------------------------------------
// Import errors (file-level only)
// ---------------------------------------------------------------------------

/// File-level import failures. These short-circuit the whole import before
/// or during row processing; per-row problems are reported as warnings in
/// the import report instead.
#[derive(Debug)]
pub enum ImportError {
    /// The import file could not be read.
    File { path: PathBuf, source: io::Error },

    /// The file content is not parseable as CSV.
    Csv { path: PathBuf, source: csv::Error },

    /// The file holds more data rows than one import may process.
    TooManyRows { count: usize, max: usize },

    /// The department snapshot could not be fetched, so no row can be
    /// validated.
    Snapshot { source: ApiError },
}

impl fmt::Display for ImportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::File { path, source } => {
                write!(f, "Failed to read '{}': {source}", path.display())
            }
            Self::Csv { path, source } => {
                write!(f, "Failed to parse CSV '{}': {source}", path.display())
            }
            Self::TooManyRows { count, max } => {
                write!(f, "File holds {count} rows, exceeds maximum of {max}")
            }
            Self::Snapshot { source } => {
                write!(f, "Could not fetch departments for validation: {source}")
            }
        }
    }
}

impl std::error::Error for ImportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::File { source, .. } => Some(source),
            Self::Csv { source, .. } => Some(source),
            Self::Snapshot { source } => Some(source),
            Self::TooManyRows { .. } => None,
        }
    }
}

impl From<ImportError> for EmsError {
    fn from(e: ImportError) -> Self {
        Self::Import(e)
    }
}

// ---------------------------------------------------------------------------
// Log viewer errors
// ---------------------------------------------------------------------------

/// Errors raised when fetching or interpreting the service activity log.
#[derive(Debug)]
pub enum LogViewError {
    /// The log fetch itself failed.
    Fetch { source: ApiError },

    /// The service answered with an HTML document instead of log text,
    /// which means the request hit something other than the log endpoint
    /// (wrong base URL, proxy error page, service down behind a gateway).
    HtmlResponse,
}

impl fmt::Display for LogViewError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fetch { source } => write!(f, "Failed to fetch logs: {source}"),
            Self::HtmlResponse => write!(
                f,
                "Received an HTML document instead of log text. \
                 Check the configured base URL and that the service is running."
            ),
        }
    }
}

impl std::error::Error for LogViewError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Fetch { source } => Some(source),
            Self::HtmlResponse => None,
        }
    }
}

impl From<LogViewError> for EmsError {
    fn from(e: LogViewError) -> Self {
        Self::LogView(e)
    }
}

// ---------------------------------------------------------------------------
// Export errors
// ---------------------------------------------------------------------------

/// Errors related to roster export.
#[derive(Debug)]
pub enum ExportError {
    /// I/O error writing the export file.
    Io { path: PathBuf, source: io::Error },

    /// CSV serialisation error.
    Csv { path: PathBuf, source: csv::Error },
}

impl fmt::Display for ExportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "Export I/O error '{}': {source}", path.display())
            }
            Self::Csv { path, source } => {
                write!(f, "CSV export error '{}': {source}", path.display())
            }
        }
    }
}

impl std::error::Error for ExportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Csv { source, .. } => Some(source),
        }
    }
}

impl From<ExportError> for EmsError {
    fn from(e: ExportError) -> Self {
        Self::Export(e)
    }
}

/// Convenience type alias for emsctl results.
pub type Result<T> = std::result::Result<T, EmsError>;
