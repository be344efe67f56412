// emsctl - tests/e2e_logs.rs
//
// End-to-end tests for the log viewing pipeline.
//
// These tests exercise a real captured log payload from disk, the real
// line pattern, real chrono timestamp parsing and the real filter logic.
// The only faked collaborator is the employee service, replaced by an
// in-memory Backend serving canned payloads.

use async_trait::async_trait;
use std::fs;
use std::path::PathBuf;
use std::sync::Mutex;

use emsctl::api::backend::Backend;
use emsctl::app::logs::fetch_log_view;
use emsctl::core::filter::{apply_log_filter, LogFilter};
use emsctl::core::model::{
    Department, Employee, LineCount, LogAction, LogEntity, NewEmployee,
};
use emsctl::util::error::{ApiError, LogViewError};

// =============================================================================
// Helpers
// =============================================================================

/// Absolute path to the on-disk fixture files.
fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

fn sample_payload() -> String {
    fs::read_to_string(fixture("service_sample.log")).expect("read log fixture")
}

/// In-memory employee service that serves one canned log payload and
/// records every requested line count.
struct FakeService {
    body: Result<String, u16>,
    requested: Mutex<Vec<u32>>,
}

impl FakeService {
    fn serving(body: &str) -> Self {
        FakeService {
            body: Ok(body.to_string()),
            requested: Mutex::new(Vec::new()),
        }
    }

    fn failing(status: u16) -> Self {
        FakeService {
            body: Err(status),
            requested: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl Backend for FakeService {
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
                url: "http://fake/api/employees/logs".to_string(),
                status: *status,
                body: "Service Unavailable".to_string(),
            }),
        }
    }
}

// =============================================================================
// Log view E2E
// =============================================================================

/// The captured payload holds nine lines; five follow the activity
/// pattern and four are framework noise (startup banner, a slow-query
/// warning, a stack trace). Only the five structured lines become records.
#[tokio::test]
async fn e2e_log_fixture_parses_into_structured_records() {
    let service = FakeService::serving(&sample_payload());

    let view = fetch_log_view(&service, LineCount::default())
        .await
        .expect("fetch should succeed");

    assert_eq!(view.records.len(), 5, "five lines follow the pattern");

    let first = &view.records[0];
    assert_eq!(first.user, "alice");
    assert_eq!(first.action, LogAction::Created);
    assert_eq!(first.entity, LogEntity::Employee);
    assert_eq!(first.id, Some(7));
    assert_eq!(
        first.timestamp.format("%Y-%m-%d %H:%M:%S%.3f").to_string(),
        "2024-01-01 10:00:00.123"
    );

    // Each record keeps the raw line it came from, byte for byte.
    for record in &view.records {
        assert!(
            view.raw.contains(&record.raw),
            "raw view should contain the source line for {record:?}"
        );
    }
}

/// Lines without the "User" phrase never reach the structured table.
#[tokio::test]
async fn e2e_noise_lines_never_become_records() {
    let service = FakeService::serving(&sample_payload());

    let view = fetch_log_view(&service, LineCount::default())
        .await
        .expect("fetch should succeed");

    for record in &view.records {
        assert!(
            record.raw.contains("User"),
            "structured record from a non-activity line: {}",
            record.raw
        );
    }
    assert!(
        !view
            .records
            .iter()
            .any(|r| r.raw.contains("Slow query") || r.raw.contains("Started EmsApplication")),
        "noise lines leaked into the structured table"
    );
}

/// An HTML document means the request was misrouted (wrong base URL or a
/// gateway error page); that is a transport error, not log content.
#[tokio::test]
async fn e2e_html_payload_is_reported_as_misconfiguration() {
    let service =
        FakeService::serving("<html><body><h1>404 Not Found</h1></body></html>");

    let result = fetch_log_view(&service, LineCount::default()).await;

    assert!(
        matches!(result, Err(LogViewError::HtmlResponse)),
        "expected HtmlResponse, got {result:?}"
    );
}

/// A service-side failure surfaces as a fetch error with the status intact.
#[tokio::test]
async fn e2e_service_failure_propagates_as_fetch_error() {
    let service = FakeService::failing(503);

    let result = fetch_log_view(&service, LineCount::default()).await;

    match result {
        Err(LogViewError::Fetch {
            source: ApiError::Status { status, .. },
        }) => assert_eq!(status, 503),
        other => panic!("expected Fetch error wrapping a 503, got {other:?}"),
    }
}

/// A payload where nothing matches the pattern is still a successful
/// fetch; the view flags itself unstructured and keeps the raw text.
#[tokio::test]
async fn e2e_unparsable_payload_keeps_raw_text_for_fallback() {
    let payload = "plain text the service wrote\nwith no activity lines\n";
    let service = FakeService::serving(payload);

    let view = fetch_log_view(&service, LineCount::default())
        .await
        .expect("fetch should succeed");

    assert!(view.is_unstructured());
    assert!(view.records.is_empty());
    assert_eq!(view.raw, payload);
}

/// The requested line count is passed through to the service untouched.
#[tokio::test]
async fn e2e_requested_line_count_reaches_the_service() {
    let service = FakeService::serving(&sample_payload());
    let lines = LineCount::new(500).expect("500 is an allowed line count");

    fetch_log_view(&service, lines)
        .await
        .expect("fetch should succeed");

    assert_eq!(*service.requested.lock().unwrap(), vec![500]);
}

/// Filtering is a view over the parsed records: a user term that matches
/// nothing yields an empty index list while the records stay intact, and
/// a matching term selects exactly the matching indices.
#[tokio::test]
async fn e2e_filtering_is_a_non_destructive_view() {
    let service = FakeService::serving(&sample_payload());

    let view = fetch_log_view(&service, LineCount::default())
        .await
        .expect("fetch should succeed");

    let no_match = LogFilter {
        user: "zzz".to_string(),
        action: String::new(),
    };
    assert!(apply_log_filter(&view.records, &no_match).is_empty());
    assert_eq!(view.records.len(), 5, "records must survive filtering");

    let alice_only = LogFilter {
        user: "ali".to_string(),
        action: String::new(),
    };
    let indices = apply_log_filter(&view.records, &alice_only);
    assert_eq!(indices, vec![0, 4]);
    assert!(indices.iter().all(|&i| view.records[i].user == "alice"));
}
