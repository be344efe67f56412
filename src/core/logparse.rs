// emsctl - core/logparse.rs
//
// Pattern matcher for the service activity log. Core layer: works on text
// already in memory.
//
// The service writes one event per line in this shape:
//
//   <timestamp> <level> <pid> --- ... User <user> <action> <entity>[ with id: <id>][: <details>]
//
// where <timestamp> is `YYYY-MM-DD HH:MM:SS.mmm`, <action> is one of the
// closed verb set in `LogAction` and <entity> one of `LogEntity`. The
// pattern below is assembled from those enums, so a verb the enums do not
// know never parses; growing the verb set is an explicit change to
// `LogAction`, not a looser regex.
//
// Lines that do not match (framework noise, stack traces, startup banners)
// produce no record; callers keep the raw text around as a fallback view.

use chrono::NaiveDateTime;
use regex::Regex;
use std::sync::OnceLock;

use crate::core::model::{LogAction, LogEntity, LogRecord};

/// chrono format matching the `(?P<time>...)` capture. Public so views
/// render timestamps exactly as the service wrote them.
pub const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.3f";

/// The compiled line pattern, built once on first use.
fn line_pattern() -> &'static Regex {
    static LINE_PATTERN: OnceLock<Regex> = OnceLock::new();
    LINE_PATTERN.get_or_init(|| {
        let actions = LogAction::all()
            .iter()
            .map(|a| a.as_str())
            .collect::<Vec<_>>()
            .join("|");
        let entities = LogEntity::all()
            .iter()
            .map(|e| e.as_str())
            .collect::<Vec<_>>()
            .join("|");
        let pattern = format!(
            r"(?P<time>\d{{4}}-\d{{2}}-\d{{2}} \d{{2}}:\d{{2}}:\d{{2}}\.\d{{3}})\s+(?P<level>\w+)\s+\d+ --- .*User (?P<user>\w+) (?P<action>{actions}) (?P<entity>{entities})(?: with id: (?P<id>\d+))?(?:[: ](?P<details>.*))?"
        );
        // Pattern text is fixed at compile time apart from the enum-driven
        // alternations; the unit tests below exercise every variant, so a
        // mistake here fails tests rather than panicking in the field.
        Regex::new(&pattern).expect("logparse: invalid line pattern")
    })
}

/// True when the text is an HTML document rather than log content.
///
/// A misrouted request (wrong base URL, gateway error page) answers with
/// HTML; treating that as parseable log text would show an empty table over
/// a blob of markup, so callers turn it into a transport error instead.
pub fn looks_like_html(text: &str) -> bool {
    static HTML_SIGNATURE: OnceLock<Regex> = OnceLock::new();
    let re = HTML_SIGNATURE
        .get_or_init(|| Regex::new(r"(?i)<\s*html").expect("logparse: invalid html signature"));
    re.is_match(text)
}

/// Parse a single line into a structured record.
///
/// Returns `None` for lines that do not match the pattern, carry a verb or
/// entity outside the closed sets, or whose timestamp digits do not form a
/// real calendar date.
pub fn parse_line(line: &str) -> Option<LogRecord> {
    let caps = line_pattern().captures(line)?;

    let time = caps.name("time")?.as_str();
    let timestamp = NaiveDateTime::parse_from_str(time, TIME_FORMAT).ok()?;
    let action = LogAction::from_phrase(caps.name("action")?.as_str())?;
    let entity = LogEntity::from_token(caps.name("entity")?.as_str())?;

    Some(LogRecord {
        timestamp,
        level: caps.name("level")?.as_str().to_string(),
        user: caps.name("user")?.as_str().to_string(),
        action,
        entity,
        id: caps.name("id").and_then(|m| m.as_str().parse().ok()),
        details: caps.name("details").map(|m| m.as_str().to_string()),
        raw: line.to_string(),
    })
}

/// Parse a whole log blob into structured records.
///
/// Splits on both `\n` and `\r\n`. Non-matching lines are dropped from the
/// structured output; parsing is pure and idempotent.
pub fn parse_log_text(text: &str) -> Vec<LogRecord> {
    let records: Vec<LogRecord> = text.lines().filter_map(parse_line).collect();
    tracing::debug!(
        lines = text.lines().count(),
        records = records.len(),
        "Log text parsed"
    );
    records
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Timelike};

    #[test]
    fn test_parse_completed_create_with_id() {
        let line = "2024-01-01 10:00:00.123 INFO 42 --- [main] User alice created employee with id: 7";
        let record = parse_line(line).unwrap();

        assert_eq!(record.user, "alice");
        assert_eq!(record.action, LogAction::Created);
        assert_eq!(record.entity, LogEntity::Employee);
        assert_eq!(record.id, Some(7));
        assert_eq!(record.details, None);
        assert_eq!(record.level, "INFO");
        assert_eq!(record.raw, line);
        assert_eq!(
            record.timestamp.date(),
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
        );
        assert_eq!(record.timestamp.nanosecond(), 123_000_000);
    }

    #[test]
    fn test_parse_in_progress_action_without_id() {
        let line =
            "2024-03-05 08:15:30.001 INFO 7 --- [http-nio-8080-exec-1] User bob is creating employee";
        let record = parse_line(line).unwrap();

        assert_eq!(record.action, LogAction::IsCreating);
        assert_eq!(record.id, None);
        assert_eq!(record.details, None);
    }

    #[test]
    fn test_parse_error_line_keeps_details_as_captured() {
        let line = "2024-03-05 08:15:31.900 ERROR 7 --- [http-nio-8080-exec-1] User carol error creating employee: Email already exists";
        let record = parse_line(line).unwrap();

        assert_eq!(record.action, LogAction::ErrorCreating);
        assert_eq!(record.level, "ERROR");
        // The separator class consumes the colon only; the capture starts at
        // the following space, exactly as the service wrote it.
        assert_eq!(record.details.as_deref(), Some(" Email already exists"));
    }

    #[test]
    fn test_parse_department_actions() {
        let line = "2024-06-10 23:59:59.999 INFO 1 --- [main] User dave deleted department with id: 12";
        let record = parse_line(line).unwrap();

        assert_eq!(record.entity, LogEntity::Department);
        assert_eq!(record.action, LogAction::Deleted);
        assert_eq!(record.id, Some(12));
    }

    #[test]
    fn test_every_verb_in_the_closed_set_parses() {
        for action in LogAction::all() {
            let line = format!(
                "2024-01-01 10:00:00.000 INFO 1 --- [main] User eve {} department",
                action.as_str()
            );
            let record = parse_line(&line)
                .unwrap_or_else(|| panic!("verb '{}' should parse", action.as_str()));
            assert_eq!(record.action, *action);
        }
    }

    #[test]
    fn test_unknown_verb_never_parses() {
        let line = "2024-01-01 10:00:00.000 INFO 1 --- [main] User eve archived employee with id: 3";
        assert!(parse_line(line).is_none());
    }

    #[test]
    fn test_line_without_user_phrase_never_parses() {
        let line = "2024-01-01 10:00:00.000 INFO 1 --- [main] Started EmployeeServiceApplication in 4.2 seconds";
        assert!(parse_line(line).is_none());
    }

    #[test]
    fn test_line_without_separator_never_parses() {
        let line = "2024-01-01 10:00:00.000 INFO 1 User alice created employee with id: 7";
        assert!(parse_line(line).is_none());
    }

    #[test]
    fn test_timestamp_digits_must_form_a_real_date() {
        let line = "2024-13-01 10:00:00.000 INFO 1 --- [main] User alice created employee with id: 7";
        assert!(parse_line(line).is_none());
    }

    #[test]
    fn test_blob_parsing_skips_noise_lines() {
        let text = "Spring banner line\n\
                    2024-01-01 10:00:00.123 INFO 42 --- [main] User alice created employee with id: 7\n\
                    \tat com.example.Handler.handle(Handler.java:30)\n\
                    2024-01-01 10:00:01.000 INFO 42 --- [main] User bob is deleting department\n";
        let records = parse_log_text(text);

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].user, "alice");
        assert_eq!(records[1].action, LogAction::IsDeleting);
    }

    #[test]
    fn test_blob_parsing_handles_crlf_endings() {
        let text = "2024-01-01 10:00:00.123 INFO 42 --- [main] User alice created employee with id: 7\r\n\
                    2024-01-01 10:00:01.000 INFO 42 --- [main] User alice updated employee with id: 7\r\n";
        let records = parse_log_text(text);

        assert_eq!(records.len(), 2);
        assert_eq!(records[1].action, LogAction::Updated);
        // No stray carriage return survives in the raw line.
        assert!(!records[0].raw.ends_with('\r'));
    }

    #[test]
    fn test_parsing_is_idempotent() {
        let text = "2024-01-01 10:00:00.123 INFO 42 --- [main] User alice created employee with id: 7\n\
                    noise\n\
                    2024-01-01 10:00:02.456 WARN 42 --- [main] User bob error deleting department: In use\n";
        assert_eq!(parse_log_text(text), parse_log_text(text));
    }

    #[test]
    fn test_empty_text_yields_no_records() {
        assert!(parse_log_text("").is_empty());
    }

    #[test]
    fn test_html_signature_detection() {
        assert!(looks_like_html("<html><body>502 Bad Gateway</body></html>"));
        assert!(looks_like_html("<!DOCTYPE html>\n<  HTML lang=\"en\">"));
        assert!(looks_like_html(
            "prefix junk < html attribute-soup: still html"
        ));
        assert!(!looks_like_html(
            "2024-01-01 10:00:00.123 INFO 42 --- [main] User alice created employee with id: 7"
        ));
        assert!(!looks_like_html(""));
    }
}
