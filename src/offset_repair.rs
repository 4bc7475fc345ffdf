//! Position-guided repair: take the byte offset a failed parse reported,
//! inspect a small window around it, and attempt one of two bounded edits.
//! The orchestrator re-parses after each edit and caps the total rounds.

use crate::scanner::{is_unterminated_string, open_string_start};

/// How far back from the failure offset an edit may look.
const REPAIR_WINDOW: usize = 50;

/// Translate serde_json's 1-based line/column into a byte offset.
pub(crate) fn error_offset(text: &str, err: &serde_json::Error) -> usize {
    let line = err.line();
    if line == 0 {
        return 0;
    }
    let mut remaining = line - 1;
    let mut line_start = 0usize;
    if remaining > 0 {
        for (i, b) in text.bytes().enumerate() {
            if b == b'\n' {
                line_start = i + 1;
                remaining -= 1;
                if remaining == 0 {
                    break;
                }
            }
        }
    }
    (line_start + err.column().saturating_sub(1)).min(text.len())
}

/// Edit (a): a value ended and the next token opens a new key without a
/// separating comma. Insert one.
fn insert_missing_comma(text: &str, offset: usize) -> Option<String> {
    let bytes = text.as_bytes();
    let offset = offset.min(bytes.len());

    // The next non-whitespace character must begin a new key.
    let mut j = offset;
    while j < bytes.len() && bytes[j].is_ascii_whitespace() {
        j += 1;
    }
    if j >= bytes.len() || bytes[j] != b'"' {
        return None;
    }

    // The character before the offset must terminate a value.
    let floor = offset.saturating_sub(REPAIR_WINDOW);
    let mut i = offset;
    while i > floor && bytes[i - 1].is_ascii_whitespace() {
        i -= 1;
    }
    let prev = *bytes.get(i.checked_sub(1)?)?;
    if prev == b'"' || prev == b'}' || prev == b']' || prev.is_ascii_alphanumeric() {
        let mut out = String::with_capacity(text.len() + 1);
        out.push_str(&text[..i]);
        out.push(',');
        out.push_str(&text[i..]);
        return Some(out);
    }
    None
}

/// Edit (b): the text ends inside a string literal. Close the string at the
/// first structural character following its opening quote.
fn close_dangling_quote(text: &str) -> Option<String> {
    if !is_unterminated_string(text) {
        return None;
    }
    let open = open_string_start(text)?;
    let bytes = text.as_bytes();
    for i in (open + 1)..bytes.len() {
        if matches!(bytes[i], b',' | b'}' | b']') {
            let mut out = String::with_capacity(text.len() + 1);
            out.push_str(&text[..i]);
            out.push('"');
            out.push_str(&text[i..]);
            return Some(out);
        }
    }
    None
}

/// One repair round: the first applicable edit wins. `None` means no edit
/// applied, which tells the orchestrator to stop retrying.
pub fn repair_at_offset(text: &str, offset: usize) -> Option<String> {
    insert_missing_comma(text, offset).or_else(|| close_dangling_quote(text))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    fn offset_of_error(text: &str) -> usize {
        let err = serde_json::from_str::<Value>(text).unwrap_err();
        error_offset(text, &err)
    }

    #[test]
    fn test_error_offset_single_line() {
        let text = r#"{"a": 1 "b": 2}"#;
        let off = offset_of_error(text);
        assert_eq!(text.as_bytes()[off], b'"');
    }

    #[test]
    fn test_error_offset_multi_line() {
        let text = "{\n  \"a\": 1\n  \"b\": 2\n}";
        let off = offset_of_error(text);
        assert_eq!(text.as_bytes()[off], b'"');
        assert!(off > text.find('1').unwrap());
    }

    #[test]
    fn test_insert_comma_after_number() {
        let text = r#"{"a": 1 "b": 2}"#;
        let fixed = repair_at_offset(text, offset_of_error(text)).unwrap();
        assert_eq!(fixed, r#"{"a": 1, "b": 2}"#);
        assert!(serde_json::from_str::<Value>(&fixed).is_ok());
    }

    #[test]
    fn test_insert_comma_after_string() {
        let text = r#"{"a": "x" "b": 2}"#;
        let fixed = repair_at_offset(text, offset_of_error(text)).unwrap();
        assert_eq!(fixed, r#"{"a": "x", "b": 2}"#);
    }

    #[test]
    fn test_insert_comma_after_container() {
        let text = r#"{"a": [1] "b": 2}"#;
        let fixed = repair_at_offset(text, offset_of_error(text)).unwrap();
        assert_eq!(fixed, r#"{"a": [1], "b": 2}"#);
    }

    #[test]
    fn test_close_dangling_quote_mid_text() {
        let text = r#"{"a": "x}"#;
        let fixed = repair_at_offset(text, offset_of_error(text)).unwrap();
        assert_eq!(fixed, r#"{"a": "x"}"#);
        assert!(serde_json::from_str::<Value>(&fixed).is_ok());
    }

    #[test]
    fn test_no_edit_when_nothing_applies() {
        // Bare identifier: neither edit's precondition holds.
        let text = r#"{"a": oops}"#;
        assert_eq!(repair_at_offset(text, offset_of_error(text)), None);
    }

    #[test]
    fn test_no_comma_after_open_brace() {
        // The failure token is `1`, not a quote, so edit (a) must not fire.
        let text = r#"{"a" 1}"#;
        assert_eq!(repair_at_offset(text, offset_of_error(text)), None);
    }
}
