//! `scanner` – string-literal-aware bracket-depth state machine.
//
//  Every higher-level repair strategy leans on the single guarantee made
//  here: a structural character inside a string literal is never mistaken
//  for structure. The scanner works on bytes; all structural characters
//  are ASCII, so UTF-8 continuation bytes can never collide with them.

/// Transient scan state. Reset per scan, never shared across calls.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScanState {
    pub in_string: bool,
    pub escape_next: bool,
    pub depth: i64,
}

impl ScanState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance over one byte. Escape handling comes before the quote
    /// toggle: an escaped quote must never close a string.
    #[inline]
    pub fn step(&mut self, b: u8) {
        if self.escape_next {
            self.escape_next = false;
            return;
        }
        if self.in_string {
            match b {
                b'\\' => self.escape_next = true,
                b'"' => self.in_string = false,
                _ => {}
            }
            return;
        }
        match b {
            b'"' => self.in_string = true,
            b'{' | b'[' => self.depth += 1,
            b'}' | b']' => self.depth -= 1,
            _ => {}
        }
    }
}

/// Offset of the byte that brings `depth` back to zero relative to the
/// opener at `open_offset`, or `None` when the text ends first (the usual
/// truncation signal).
pub fn find_matching_close(text: &str, open_offset: usize) -> Option<usize> {
    let bytes = text.as_bytes();
    match bytes.get(open_offset) {
        Some(b'{') | Some(b'[') => {}
        _ => return None,
    }
    let mut st = ScanState::new();
    for (i, &b) in bytes.iter().enumerate().skip(open_offset) {
        st.step(b);
        if st.depth == 0 {
            return Some(i);
        }
    }
    None
}

/// True when the text ends while still inside a string literal.
pub fn is_unterminated_string(text: &str) -> bool {
    let mut st = ScanState::new();
    for &b in text.as_bytes() {
        st.step(b);
    }
    st.in_string
}

/// Offset of the opening quote of a trailing unterminated string, if any.
pub fn open_string_start(text: &str) -> Option<usize> {
    let mut st = ScanState::new();
    let mut open_at = None;
    for (i, &b) in text.as_bytes().iter().enumerate() {
        let was_in_string = st.in_string;
        st.step(b);
        if !was_in_string && st.in_string {
            open_at = Some(i);
        }
    }
    if st.in_string {
        open_at
    } else {
        None
    }
}

/// Counts of unmatched `{` and `[` openers, outside string literals.
pub fn unclosed_container_counts(text: &str) -> (usize, usize) {
    let mut braces = 0usize;
    let mut brackets = 0usize;
    for &b in unclosed_openers(text).iter() {
        match b {
            b'{' => braces += 1,
            _ => brackets += 1,
        }
    }
    (braces, brackets)
}

/// The stack of unmatched openers, outermost first.
pub fn unclosed_openers(text: &str) -> Vec<u8> {
    let mut st = ScanState::new();
    let mut stack: Vec<u8> = Vec::new();
    for &b in text.as_bytes() {
        let in_string = st.in_string;
        let escaped = st.escape_next;
        st.step(b);
        if in_string || escaped {
            continue;
        }
        match b {
            b'{' | b'[' => stack.push(b),
            b'}' | b']' => {
                stack.pop();
            }
            _ => {}
        }
    }
    stack
}

/// Closing text that balances every unmatched opener, innermost first.
/// Counts alone cannot order `]}` against `}]`, hence the opener stack.
pub fn closing_suffix(text: &str) -> String {
    unclosed_openers(text)
        .iter()
        .rev()
        .map(|&b| if b == b'{' { '}' } else { ']' })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_brace_inside_string_is_not_structure() {
        let text = r#"{"a": "} ] {{ [", "b": 1}"#;
        assert_eq!(find_matching_close(text, 0), Some(text.len() - 1));
        assert_eq!(unclosed_container_counts(text), (0, 0));
    }

    #[test]
    fn test_escaped_quote_does_not_close_string() {
        let text = r#"{"a": "x\"}y"}"#;
        assert_eq!(find_matching_close(text, 0), Some(text.len() - 1));
        assert!(!is_unterminated_string(text));
    }

    #[test]
    fn test_escaped_backslash_then_quote_closes() {
        // "x\\" is a complete string: the backslash escapes itself.
        let text = r#"{"a": "x\\"}"#;
        assert_eq!(find_matching_close(text, 0), Some(text.len() - 1));
        assert!(!is_unterminated_string(text));
    }

    #[test]
    fn test_matching_close_nested() {
        let text = r#"[{"a": [1, 2]}, 3]"#;
        assert_eq!(find_matching_close(text, 0), Some(text.len() - 1));
        assert_eq!(find_matching_close(text, 1), Some(13));
    }

    #[test]
    fn test_matching_close_truncated() {
        assert_eq!(find_matching_close(r#"{"a": [1, 2"#, 0), None);
        assert_eq!(find_matching_close("no opener here", 0), None);
    }

    #[test]
    fn test_unterminated_string() {
        assert!(is_unterminated_string(r#"{"a": "cut of"#));
        assert!(!is_unterminated_string(r#"{"a": "done"}"#));
        // Trailing escape keeps the string open.
        assert!(is_unterminated_string(r#"{"a": "cut\"#));
    }

    #[test]
    fn test_open_string_start() {
        let text = r#"{"a": 1, "b": "cut"#;
        assert_eq!(open_string_start(text), Some(14));
        assert_eq!(open_string_start(r#"{"a": 1}"#), None);
    }

    #[test]
    fn test_unclosed_counts() {
        assert_eq!(unclosed_container_counts(r#"{"a": [{"b": 1"#), (2, 1));
        assert_eq!(unclosed_container_counts(r#"{"a": [1, 2]}"#), (0, 0));
    }

    #[test]
    fn test_closing_suffix_order() {
        assert_eq!(closing_suffix(r#"{"a": [{"b": 1"#), "}]}");
        assert_eq!(closing_suffix(r#"[[{"#), "}]]");
        assert_eq!(closing_suffix(r#"{"a": 1}"#), "");
    }

    #[test]
    fn test_closing_suffix_ignores_string_content() {
        assert_eq!(closing_suffix(r#"{"a": "[[{{"#), "");
        // The string is unterminated, so the opener stack is only the brace.
        assert!(is_unterminated_string(r#"{"a": "[[{{"#));
    }

    #[test]
    fn test_depth_tracks_negative_on_overclosed() {
        let mut st = ScanState::new();
        for &b in b"[]]" {
            st.step(b);
        }
        assert_eq!(st.depth, -1);
    }
}
