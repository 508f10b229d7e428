//! Claude Code JSONL line parser

use crate::types::{Result, UsageError, UsageRecord};
use serde::Deserialize;

/// Claude Code JSONL line structure (assistant messages with usage)
#[derive(Deserialize)]
struct ClaudeJsonLine<'a> {
    timestamp: &'a str,
    #[serde(rename = "requestId", borrow, default)]
    request_id: Option<&'a str>,
    #[serde(borrow)]
    message: ClaudeMessage<'a>,
    #[serde(rename = "costUSD", default)]
    cost_usd: Option<f64>,
}

#[derive(Deserialize)]
struct ClaudeMessage<'a> {
    #[serde(borrow, default)]
    model: Option<&'a str>,
    #[serde(borrow, default)]
    id: Option<&'a str>,
    usage: ClaudeUsage,
}

#[derive(Deserialize)]
struct ClaudeUsage {
    input_tokens: u64,
    output_tokens: u64,
    #[serde(default)]
    cache_creation_input_tokens: Option<u64>,
    #[serde(default)]
    cache_read_input_tokens: Option<u64>,
}

/// Parse one log line.
///
/// Blank lines yield `Ok(None)`. Lines that are not JSON, or lack
/// `timestamp` / `message.usage.input_tokens` / `message.usage.output_tokens`,
/// yield [`UsageError::MalformedLine`].
pub fn parse_line(line: &str) -> Result<Option<UsageRecord>> {
    if line.trim().is_empty() {
        return Ok(None);
    }
    let mut bytes = line.as_bytes().to_vec();
    parse_bytes(&mut bytes).map(Some)
}

/// Owned variant of [`parse_line`] that reuses the line's buffer.
pub fn parse_owned_line(line: String) -> Result<Option<UsageRecord>> {
    if line.trim().is_empty() {
        return Ok(None);
    }
    let mut bytes = line.into_bytes();
    parse_bytes(&mut bytes).map(Some)
}

/// Decode a single JSON object in place (simd-json unescapes into the buffer).
fn parse_bytes(bytes: &mut [u8]) -> Result<UsageRecord> {
    let data: ClaudeJsonLine =
        simd_json::from_slice(bytes).map_err(|e| UsageError::MalformedLine(e.to_string()))?;

    let usage = &data.message.usage;

    Ok(UsageRecord {
        timestamp: data.timestamp.to_string(),
        message_id: data.message.id.map(String::from),
        request_id: data.request_id.map(String::from),
        model: data.message.model.map(String::from),
        input_tokens: usage.input_tokens,
        output_tokens: usage.output_tokens,
        cache_creation_tokens: usage.cache_creation_input_tokens.unwrap_or(0),
        cache_read_tokens: usage.cache_read_input_tokens.unwrap_or(0),
        cost_usd: data.cost_usd,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn fixture_path(name: &str) -> PathBuf {
        PathBuf::from(env!("CARGO_MANIFEST_DIR"))
            .join("tests")
            .join("fixtures")
            .join(name)
    }

    fn parse_fixture(name: &str) -> (Vec<UsageRecord>, usize) {
        let content = std::fs::read_to_string(fixture_path(name)).unwrap();
        let mut records = Vec::new();
        let mut malformed = 0;
        for line in content.lines() {
            match parse_line(line) {
                Ok(Some(record)) => records.push(record),
                Ok(None) => {}
                Err(_) => malformed += 1,
            }
        }
        (records, malformed)
    }

    #[test]
    fn test_parse_full_line() {
        let line = r#"{"timestamp":"2025-06-01T10:00:00.000Z","requestId":"req-001","costUSD":0.012,"message":{"id":"msg-001","model":"claude-sonnet-4-20250514","usage":{"input_tokens":100,"output_tokens":50,"cache_creation_input_tokens":10,"cache_read_input_tokens":20}}}"#;
        let record = parse_line(line).unwrap().unwrap();

        assert_eq!(record.timestamp, "2025-06-01T10:00:00.000Z");
        assert_eq!(record.model.as_deref(), Some("claude-sonnet-4-20250514"));
        assert_eq!(record.input_tokens, 100);
        assert_eq!(record.output_tokens, 50);
        assert_eq!(record.cache_creation_tokens, 10);
        assert_eq!(record.cache_read_tokens, 20);
        assert_eq!(record.message_id.as_deref(), Some("msg-001"));
        assert_eq!(record.request_id.as_deref(), Some("req-001"));
        assert_eq!(record.cost_usd, Some(0.012));
    }

    #[test]
    fn test_optional_fields_default() {
        let line = r#"{"timestamp":"2025-06-01T10:00:00.000Z","message":{"usage":{"input_tokens":7,"output_tokens":3}}}"#;
        let record = parse_line(line).unwrap().unwrap();

        assert_eq!(record.cache_creation_tokens, 0);
        assert_eq!(record.cache_read_tokens, 0);
        assert_eq!(record.model, None);
        assert_eq!(record.model_or_unknown(), "unknown");
        assert_eq!(record.message_id, None);
        assert_eq!(record.request_id, None);
        assert_eq!(record.cost_usd, None);
    }

    #[test]
    fn test_blank_lines_are_skipped() {
        assert!(parse_line("").unwrap().is_none());
        assert!(parse_line("   \t ").unwrap().is_none());
        assert!(parse_owned_line(" ".to_string()).unwrap().is_none());
    }

    #[test]
    fn test_invalid_json_is_malformed() {
        let err = parse_line("{not json").unwrap_err();
        assert!(matches!(err, UsageError::MalformedLine(_)));
    }

    #[test]
    fn test_missing_required_fields_are_malformed() {
        let no_timestamp = r#"{"message":{"usage":{"input_tokens":1,"output_tokens":1}}}"#;
        let no_usage = r#"{"timestamp":"2025-06-01T10:00:00.000Z","message":{"role":"user"}}"#;
        let no_output = r#"{"timestamp":"2025-06-01T10:00:00.000Z","message":{"usage":{"input_tokens":1}}}"#;
        let no_message = r#"{"timestamp":"2025-06-01T10:00:00.000Z","type":"user"}"#;

        for line in [no_timestamp, no_usage, no_output, no_message] {
            assert!(
                matches!(parse_line(line), Err(UsageError::MalformedLine(_))),
                "expected malformed: {}",
                line
            );
        }
    }

    #[test]
    fn test_negative_tokens_are_malformed() {
        let line = r#"{"timestamp":"2025-06-01T10:00:00.000Z","message":{"usage":{"input_tokens":-5,"output_tokens":1}}}"#;
        assert!(parse_line(line).is_err());
    }

    #[test]
    fn test_synthetic_records_still_parse() {
        let line = r#"{"timestamp":"2025-06-01T10:00:00.000Z","message":{"model":"<synthetic>","usage":{"input_tokens":0,"output_tokens":0}}}"#;
        let record = parse_line(line).unwrap().unwrap();
        assert!(record.is_synthetic());
    }

    #[test]
    fn test_owned_and_borrowed_agree() {
        let line = r#"{"timestamp":"2025-06-01T10:00:00.000Z","message":{"id":"m\"1","usage":{"input_tokens":1,"output_tokens":2}}}"#;
        let borrowed = parse_line(line).unwrap().unwrap();
        let owned = parse_owned_line(line.to_string()).unwrap().unwrap();
        assert_eq!(borrowed, owned);
        assert_eq!(owned.message_id.as_deref(), Some("m\"1"));
    }

    #[test]
    fn test_parse_sample_fixture() {
        let (records, malformed) = parse_fixture("claude-sample.jsonl");

        // 4 usage lines; the user message and the broken line are malformed
        assert_eq!(records.len(), 4);
        assert_eq!(malformed, 2);
        assert_eq!(records[1].model.as_deref(), Some("claude-opus-4-20250514"));
        assert_eq!(records[1].cost_usd, Some(0.025));
        assert!(records[3].is_synthetic());
    }

    #[test]
    fn test_parse_empty_fixture() {
        let (records, malformed) = parse_fixture("empty.jsonl");
        assert!(records.is_empty());
        assert_eq!(malformed, 0);
    }
}
