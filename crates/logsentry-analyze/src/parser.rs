//! Line-oriented access-log parser.
//!
//! Grammar (Common/Combined log format):
//!
//! ```text
//! IP IDENT AUTHUSER [TIMESTAMP] "METHOD PATH PROTOCOL" STATUS BYTES "REFERRER" "AGENT"
//! ```
//!
//! A line either yields all eleven fields in grammar order or a single
//! `raw` record holding the trimmed line. Nothing fails the whole parse.

use std::sync::LazyLock;

use logsentry_core::{FIELD_NAMES, FieldRecord};
use regex::Regex;
use tracing::debug;

const ACCESS_LOG_PATTERN: &str = concat!(
    r"^(?P<ip>\S+)\s+",
    r"(?P<ident>\S+)\s+",
    r"(?P<authuser>\S+)\s+",
    r"\[(?P<timestamp>[^\]]+)\]\s+",
    r#""(?P<method>\S+)\s+(?P<path>[^"]+?)\s+(?P<protocol>\S+)"\s+"#,
    r"(?P<status>\d{3})\s+",
    r"(?P<bytes>\S+)\s+",
    r#""(?P<referrer>[^"]*)"\s+"#,
    r#""(?P<agent>[^"]*)""#,
);

static ACCESS_LOG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(ACCESS_LOG_PATTERN).expect("access log pattern compiles"));

/// Parses access-log bytes into field records.
#[derive(Debug, Clone, Copy, Default)]
pub struct LineParser;

impl LineParser {
    /// Create a new parser.
    pub fn new() -> Self {
        Self
    }

    /// Parse raw file bytes.
    ///
    /// Bytes are decoded as UTF-8 (invalid sequences become U+FFFD), split on
    /// `\n` with empty pieces dropped, and each remaining line is trimmed
    /// before matching. Line numbers count the remaining lines from 1.
    pub fn parse(&self, bytes: &[u8]) -> Vec<FieldRecord> {
        let text = String::from_utf8_lossy(bytes);
        let mut records = Vec::new();
        let mut unparsed = 0usize;

        for (index, line) in text.split('\n').filter(|l| !l.is_empty()).enumerate() {
            let line_number = index + 1;
            let line = line.trim();

            match ACCESS_LOG.captures(line) {
                Some(caps) => {
                    records.extend(FIELD_NAMES.iter().map(|&name| {
                        FieldRecord::new(
                            line_number,
                            name,
                            caps.name(name).map(|m| m.as_str().to_string()),
                        )
                    }));
                }
                None => {
                    unparsed += 1;
                    records.push(FieldRecord::raw(line_number, line));
                }
            }
        }

        debug!(records = records.len(), unparsed, "parsed access log");
        records
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn value<'a>(records: &'a [FieldRecord], key: &str) -> Option<&'a str> {
        records
            .iter()
            .find(|r| r.key == key)
            .and_then(|r| r.value_str())
    }

    #[test]
    fn test_pattern_compiles_with_all_fields() {
        let names: Vec<&str> = ACCESS_LOG.capture_names().flatten().collect();
        assert_eq!(names, FIELD_NAMES.to_vec());
    }

    #[test]
    fn test_combined_line() {
        let line = br#"177.71.128.21 - - [10/Jul/2018:22:21:28 +0200] "GET /intranet-analytics/ HTTP/1.1" 200 3574 "-" "Mozilla/5.0 (X11; U; Linux x86_64)""#;
        let records = LineParser::new().parse(line);

        assert_eq!(records.len(), 11);
        assert_eq!(value(&records, "ip"), Some("177.71.128.21"));
        assert_eq!(value(&records, "timestamp"), Some("10/Jul/2018:22:21:28 +0200"));
        assert_eq!(value(&records, "method"), Some("GET"));
        assert_eq!(value(&records, "path"), Some("/intranet-analytics/"));
        assert_eq!(value(&records, "protocol"), Some("HTTP/1.1"));
        assert_eq!(value(&records, "status"), Some("200"));
        assert_eq!(value(&records, "bytes"), Some("3574"));
        assert_eq!(value(&records, "referrer"), Some("-"));
        assert_eq!(value(&records, "agent"), Some("Mozilla/5.0 (X11; U; Linux x86_64)"));
    }

    #[test]
    fn test_path_with_spaces() {
        let line = br#"1.2.3.4 - - [t] "GET /a b c HTTP/1.0" 404 0 "" """#;
        let records = LineParser::new().parse(line);
        assert_eq!(value(&records, "path"), Some("/a b c"));
        assert_eq!(value(&records, "referrer"), Some(""));
        assert_eq!(value(&records, "agent"), Some(""));
    }

    #[test]
    fn test_non_numeric_status_is_raw() {
        let line = br#"1.2.3.4 - - [t] "GET / HTTP/1.0" OK 0 "-" "-""#;
        let records = LineParser::new().parse(line);
        assert_eq!(records.len(), 1);
        assert!(records[0].is_raw());
    }
}
