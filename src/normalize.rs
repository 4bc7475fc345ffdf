//! Input normalization: peel a markdown code fence off the raw completion
//! and slice out the document body, dropping any prose the model wrapped
//! around it ("Here is your result: ...").

use crate::scanner::{find_matching_close, ScanState};

fn is_ws(b: u8) -> bool {
    matches!(b, b' ' | b'\n' | b'\r' | b'\t')
}

/// Locate a ``` fence pair and return the inner body span, if any.
/// The language tag after the opening fence is optional.
fn find_code_fence(text: &str) -> Option<(usize, usize)> {
    let bytes = text.as_bytes();
    let mut i = 0;
    while i + 2 < bytes.len() {
        if bytes[i] == b'`' && bytes[i + 1] == b'`' && bytes[i + 2] == b'`' {
            i += 3;
            // optional language tag, e.g. "json"
            while i < bytes.len() && !is_ws(bytes[i]) && bytes[i] != b'`' {
                i += 1;
            }
            while i < bytes.len() && is_ws(bytes[i]) {
                i += 1;
            }
            let inner_start = i;
            while i + 2 < bytes.len() {
                if bytes[i] == b'`' && bytes[i + 1] == b'`' && bytes[i + 2] == b'`' {
                    return Some((inner_start, i));
                }
                i += 1;
            }
            // Opening fence without a closing one: the generation was cut
            // inside the fenced block. Treat the rest as the body.
            return Some((inner_start, bytes.len()));
        }
        i += 1;
    }
    None
}

/// Offset of the first `{`/`[` outside a string literal. A quoted brace in
/// leading prose ("use the \"{}\" placeholder: ...") must never be taken
/// for the document start. When the scan ends still inside a string the
/// prose quotes were unbalanced and the string states are unreliable; fall
/// back to the first opener seen at all rather than hide a real document.
fn document_start(text: &str) -> Option<usize> {
    let mut st = ScanState::new();
    let mut in_string_opener = None;
    for (i, &b) in text.as_bytes().iter().enumerate() {
        if matches!(b, b'{' | b'[') {
            if !st.in_string {
                return Some(i);
            }
            if in_string_opener.is_none() {
                in_string_opener = Some(i);
            }
        }
        st.step(b);
    }
    if st.in_string {
        in_string_opener
    } else {
        None
    }
}

/// Slice from the first structural `{`/`[` through its matching close;
/// trailing prose after a balanced document is dropped. Without a matching
/// close the text runs to the end (truncated input, a later stage's
/// problem).
fn slice_document(text: &str) -> &str {
    let start = match document_start(text) {
        Some(start) => start,
        None => return text.trim(),
    };
    match find_matching_close(text, start) {
        Some(end) => &text[start..=end],
        None => text[start..].trim_end(),
    }
}

/// Strip an optional code fence, then locate the document body. Input with
/// no opening brace or bracket outside a string comes back trimmed but
/// otherwise unchanged; the orchestrator classifies that as
/// `NoDocumentFound`.
pub fn normalize(raw: &str) -> String {
    if let Some((inner_start, inner_end)) = find_code_fence(raw) {
        let inner = raw[inner_start..inner_end].trim();
        if inner.starts_with('{') || inner.starts_with('[') {
            return slice_document(inner).to_string();
        }
    }
    slice_document(raw).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_document_unchanged() {
        assert_eq!(normalize(r#"{"x": 1}"#), r#"{"x": 1}"#);
    }

    #[test]
    fn test_fence_with_language_tag() {
        let raw = "```json\n{\"x\": 1}\n```";
        assert_eq!(normalize(raw), r#"{"x": 1}"#);
    }

    #[test]
    fn test_fence_without_language_tag() {
        let raw = "```\n[1, 2, 3]\n```";
        assert_eq!(normalize(raw), "[1, 2, 3]");
    }

    #[test]
    fn test_fence_inside_prose() {
        let raw = "Sure! Here you go:\n```json\n{\"x\": 1}\n```\nHope that helps.";
        assert_eq!(normalize(raw), r#"{"x": 1}"#);
    }

    #[test]
    fn test_unclosed_fence_keeps_body() {
        let raw = "```json\n{\"x\": 1";
        assert_eq!(normalize(raw), r#"{"x": 1"#);
    }

    #[test]
    fn test_leading_prose_dropped() {
        let raw = "Here is your itinerary: {\"x\": 1}";
        assert_eq!(normalize(raw), r#"{"x": 1}"#);
    }

    #[test]
    fn test_trailing_prose_dropped() {
        let raw = "{\"x\": 1} -- let me know if you need changes";
        assert_eq!(normalize(raw), r#"{"x": 1}"#);
    }

    #[test]
    fn test_array_document() {
        let raw = "Result: [1, {\"y\": 2}] done";
        assert_eq!(normalize(raw), r#"[1, {"y": 2}]"#);
    }

    #[test]
    fn test_no_document_returns_trimmed_input() {
        assert_eq!(normalize("  not json at all  "), "not json at all");
    }

    #[test]
    fn test_quoted_brace_in_prose_skipped() {
        let raw = r#"The "{}" placeholder: {"x":1}"#;
        assert_eq!(normalize(raw), r#"{"x":1}"#);
        let raw = r#"Lists use "[]" syntax: [1, 2]"#;
        assert_eq!(normalize(raw), "[1, 2]");
    }

    #[test]
    fn test_braces_only_inside_quotes_is_no_document() {
        let raw = r#"use the "{}" placeholder"#;
        assert_eq!(normalize(raw), raw);
    }

    #[test]
    fn test_unbalanced_prose_quote_falls_back_to_first_opener() {
        // Three quotes total, so the scan ends inside a string; the opener
        // swallowed by the never-closing prose quote is still the document.
        let raw = r#"odd " quote {"a": 1}"#;
        assert_eq!(normalize(raw), r#"{"a": 1}"#);
    }

    #[test]
    fn test_fence_with_non_json_body_falls_through() {
        let raw = "```\nplain text\n``` but later {\"x\": 1}";
        assert_eq!(normalize(raw), r#"{"x": 1}"#);
    }

    #[test]
    fn test_truncated_document_runs_to_end() {
        let raw = "prefix {\"a\": [1, 2";
        assert_eq!(normalize(raw), r#"{"a": [1, 2"#);
    }
}
