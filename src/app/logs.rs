// emsctl - app/logs.rs
//
// Log view pipeline: fetch the requested number of lines from the
// service, reject HTML error pages masquerading as log text, and parse
// what remains into structured records. The raw text is kept alongside
// the records so the caller can fall back to it when nothing parses.

use crate::api::backend::Backend;
use crate::core::logparse;
use crate::core::model::{LineCount, LogRecord};
use crate::util::error::LogViewError;

/// One fetched log view: the raw text exactly as the service sent it and
/// the lines that parsed into structured records.
#[derive(Debug, Clone)]
pub struct LogView {
    pub raw: String,
    pub records: Vec<LogRecord>,
}

impl LogView {
    /// True when no line parsed and the caller should show raw text.
    pub fn is_unstructured(&self) -> bool {
        self.records.is_empty() && !self.raw.is_empty()
    }
}

/// Fetch and parse one log view.
///
/// An HTML response is a misrouted or misconfigured service, not log
/// content; it is reported as an error and the raw blob is suppressed so
/// markup never renders as if it were log lines.
pub async fn fetch_log_view(
    backend: &dyn Backend,
    lines: LineCount,
) -> Result<LogView, LogViewError> {
    let raw = backend
        .fetch_logs(lines)
        .await
        .map_err(|source| LogViewError::Fetch { source })?;

    if logparse::looks_like_html(&raw) {
        tracing::warn!(lines = lines.get(), "Log endpoint returned an HTML document");
        return Err(LogViewError::HtmlResponse);
    }

    let records = logparse::parse_log_text(&raw);
    Ok(LogView { raw, records })
}

// =============================================================================
// Unit tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::model::{Department, Employee, NewEmployee};
    use crate::util::error::ApiError;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Serves a canned log body and records the line count requested.
    struct FakeBackend {
        body: Result<String, u16>,
        requested: Mutex<Vec<u32>>,
    }

    impl FakeBackend {
        fn serving(body: &str) -> FakeBackend {
            FakeBackend {
                body: Ok(body.to_string()),
                requested: Mutex::new(Vec::new()),
            }
        }

        fn failing(status: u16) -> FakeBackend {
            FakeBackend {
                body: Err(status),
                requested: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl Backend for FakeBackend {
        async fn list_employees(&self) -> Result<Vec<Employee>, ApiError> {
            unimplemented!("not used by the log pipeline")
        }

        async fn create_employee(&self, _payload: &NewEmployee) -> Result<Employee, ApiError> {
            unimplemented!("not used by the log pipeline")
        }

        async fn delete_employee(&self, _id: u64) -> Result<(), ApiError> {
            unimplemented!("not used by the log pipeline")
        }

        async fn list_departments(&self) -> Result<Vec<Department>, ApiError> {
            unimplemented!("not used by the log pipeline")
        }

        async fn delete_department(&self, _id: u64) -> Result<(), ApiError> {
            unimplemented!("not used by the log pipeline")
        }

        async fn fetch_logs(&self, lines: LineCount) -> Result<String, ApiError> {
            self.requested.lock().unwrap().push(lines.get());
            match &self.body {
                Ok(text) => Ok(text.clone()),
                Err(status) => Err(ApiError::Status {
                    url: "http://test/api/employees/logs".to_string(),
                    status: *status,
                    body: String::new(),
                }),
            }
        }
    }

    const SAMPLE: &str = "\
2024-01-01 10:00:00.123 INFO 42 --- [main] User alice created employee with id: 7
noise line without the magic phrase
2024-01-01 10:00:01.456 WARN 42 --- [main] User bob deleted department with id: 3";

    #[tokio::test]
    async fn test_log_view_parses_structured_records() {
        let backend = FakeBackend::serving(SAMPLE);
        let view = fetch_log_view(&backend, LineCount::default()).await.unwrap();

        assert_eq!(view.records.len(), 2);
        assert_eq!(view.records[0].user, "alice");
        assert_eq!(view.records[1].user, "bob");
        // Raw text survives untouched for the fallback view.
        assert_eq!(view.raw, SAMPLE);
        assert!(!view.is_unstructured());
    }

    #[tokio::test]
    async fn test_log_view_html_page_is_a_transport_error() {
        let backend = FakeBackend::serving("<html><body><h1>502 Bad Gateway</h1></body></html>");
        let err = fetch_log_view(&backend, LineCount::default()).await.unwrap_err();
        assert!(matches!(err, LogViewError::HtmlResponse));
    }

    #[tokio::test]
    async fn test_log_view_fetch_failure_is_propagated() {
        let backend = FakeBackend::failing(503);
        let err = fetch_log_view(&backend, LineCount::default()).await.unwrap_err();
        assert!(matches!(err, LogViewError::Fetch { .. }));
    }

    #[tokio::test]
    async fn test_log_view_unparsable_text_falls_back_to_raw() {
        let backend = FakeBackend::serving("free-form text\nno structure here");
        let view = fetch_log_view(&backend, LineCount::default()).await.unwrap();

        assert!(view.records.is_empty());
        assert!(view.is_unstructured());
        assert_eq!(view.raw, "free-form text\nno structure here");
    }

    #[tokio::test]
    async fn test_log_view_requests_selected_line_count() {
        let backend = FakeBackend::serving("");
        let lines = LineCount::new(500).unwrap();
        fetch_log_view(&backend, lines).await.unwrap();

        assert_eq!(*backend.requested.lock().unwrap(), vec![500]);
    }
}
