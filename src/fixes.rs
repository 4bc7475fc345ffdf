//! Cosmetic, idempotent textual fixes applied before any parse attempt.
//! Every pass is string-aware: substitutions only ever touch text outside
//! string literals, except for escaping raw control characters *inside*
//! strings, which no valid document contains in the first place.

use crate::scanner::ScanState;

/// Which quote character opened the string we are currently inside.
#[derive(Debug, Clone, Copy, PartialEq)]
enum QuoteKind {
    Straight,
    Curly,
}

fn is_curly_quote(c: char) -> bool {
    matches!(c, '\u{201C}' | '\u{201D}' | '\u{2018}' | '\u{2019}')
}

/// Normalize typographic quotation marks to `"` where they act as string
/// delimiters. Curly quotes inside a straight-quoted string are content and
/// stay untouched; a straight quote inside a curly-quoted string becomes an
/// escaped quote so the converted string stays well-formed.
fn normalize_quotes(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_string: Option<QuoteKind> = None;
    let mut escape_next = false;
    for c in text.chars() {
        if escape_next {
            escape_next = false;
            out.push(c);
            continue;
        }
        match in_string {
            Some(QuoteKind::Straight) => {
                match c {
                    '\\' => escape_next = true,
                    '"' => in_string = None,
                    _ => {}
                }
                out.push(c);
            }
            Some(QuoteKind::Curly) => {
                if is_curly_quote(c) {
                    in_string = None;
                    out.push('"');
                } else if c == '"' {
                    out.push_str("\\\"");
                } else {
                    if c == '\\' {
                        escape_next = true;
                    }
                    out.push(c);
                }
            }
            None => {
                if c == '"' {
                    in_string = Some(QuoteKind::Straight);
                    out.push(c);
                } else if is_curly_quote(c) {
                    in_string = Some(QuoteKind::Curly);
                    out.push('"');
                } else {
                    out.push(c);
                }
            }
        }
    }
    out
}

/// Drop `//` line comments and `/* */` block comments outside strings.
fn strip_comments(text: &str) -> String {
    let bytes = text.as_bytes();
    let mut out: Vec<u8> = Vec::with_capacity(bytes.len());
    let mut st = ScanState::new();
    let mut i = 0usize;
    while i < bytes.len() {
        let b = bytes[i];
        if !st.in_string && b == b'/' && i + 1 < bytes.len() {
            match bytes[i + 1] {
                b'/' => {
                    i += 2;
                    while i < bytes.len() && bytes[i] != b'\n' && bytes[i] != b'\r' {
                        i += 1;
                    }
                    continue;
                }
                b'*' => {
                    i += 2;
                    while i + 1 < bytes.len() && !(bytes[i] == b'*' && bytes[i + 1] == b'/') {
                        i += 1;
                    }
                    i = (i + 2).min(bytes.len());
                    continue;
                }
                _ => {}
            }
        }
        st.step(b);
        out.push(b);
        i += 1;
    }
    // Comments were skipped whole, never split, so this is valid UTF-8.
    String::from_utf8_lossy(&out).into_owned()
}

/// Remove a comma that is followed only by whitespace and a closing
/// `}` / `]`, outside strings.
fn remove_trailing_commas(text: &str) -> String {
    let bytes = text.as_bytes();
    let mut out: Vec<u8> = Vec::with_capacity(bytes.len());
    let mut st = ScanState::new();
    let mut i = 0usize;
    while i < bytes.len() {
        let b = bytes[i];
        if !st.in_string && b == b',' {
            let mut j = i + 1;
            while j < bytes.len() && bytes[j].is_ascii_whitespace() {
                j += 1;
            }
            if j < bytes.len() && (bytes[j] == b'}' || bytes[j] == b']') {
                i += 1;
                continue;
            }
        }
        st.step(b);
        out.push(b);
        i += 1;
    }
    String::from_utf8_lossy(&out).into_owned()
}

/// Strip disallowed control characters outside strings (the JSON whitespace
/// bytes `\t` `\n` `\r` are legal and kept), and escape raw control
/// characters inside strings — a literal newline mid-string is one of the
/// most common generation defects.
fn handle_control_chars(text: &str) -> String {
    let mut out: Vec<u8> = Vec::with_capacity(text.len());
    let mut st = ScanState::new();
    for &b in text.as_bytes() {
        let in_string = st.in_string;
        let escaped = st.escape_next;
        st.step(b);
        if b >= 0x20 || escaped {
            out.push(b);
            continue;
        }
        if in_string {
            match b {
                b'\n' => out.extend_from_slice(b"\\n"),
                b'\r' => out.extend_from_slice(b"\\r"),
                b'\t' => out.extend_from_slice(b"\\t"),
                _ => out.extend_from_slice(format!("\\u{:04x}", b).as_bytes()),
            }
        } else if matches!(b, b'\t' | b'\n' | b'\r') {
            out.push(b);
        }
        // other controls outside strings: dropped
    }
    // Only single-byte controls were rewritten, so this stays valid UTF-8.
    String::from_utf8_lossy(&out).into_owned()
}

/// The full cosmetic stage. Pure and idempotent: applying it twice yields
/// the same text as applying it once.
pub fn apply_cosmetic_fixes(text: &str) -> String {
    let text = normalize_quotes(text);
    let text = strip_comments(&text);
    // Controls go first: a stray control byte between a comma and its
    // closer would otherwise hide the trailing comma from the next pass.
    let text = handle_control_chars(&text);
    remove_trailing_commas(&text)
}
