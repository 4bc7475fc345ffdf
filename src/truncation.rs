//! Fallback techniques for genuinely truncated input: container
//! truncation, string closing, named-array rescue, and scalar-field
//! rescue, in decreasing order of how much structure must survive.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Map, Value};

use crate::scanner::{closing_suffix, find_matching_close, is_unterminated_string, ScanState};

/// Keep at least this share of the input when truncating back to the last
/// complete container, i.e. discard at most 85%.
const MIN_SALVAGE_RATIO: f64 = 0.15;

/// Truncate at the greatest offset where an inner object/array fully
/// closed outside a string, then balance what remains. Recovers all
/// fully-formed siblings before the cut; the incomplete tail is dropped,
/// never guessed at.
pub fn truncate_to_last_container(text: &str) -> Option<String> {
    let bytes = text.as_bytes();
    let mut st = ScanState::new();
    let mut last_boundary: Option<usize> = None;
    for (i, &b) in bytes.iter().enumerate() {
        let in_string = st.in_string;
        let escaped = st.escape_next;
        st.step(b);
        if !in_string && !escaped && matches!(b, b'}' | b']') && st.depth >= 1 {
            last_boundary = Some(i);
        }
    }
    let boundary = last_boundary?;
    let kept_len = boundary + 1;
    if (kept_len as f64) < text.len() as f64 * MIN_SALVAGE_RATIO {
        return None;
    }
    // Cutting at a closer leaves nothing dangling; any comma that preceded
    // the incomplete tail falls away with it.
    let mut kept = text[..kept_len].to_string();
    kept.push_str(&closing_suffix(&kept));
    Some(kept)
}

/// Close an unterminated trailing string, then balance every container
/// still open. Returns `None` when the text needs neither.
pub fn close_open_string(text: &str) -> Option<String> {
    let mut out = text.trim_end().to_string();
    if out.ends_with(',') {
        out.pop();
    }
    let mut changed = false;
    if is_unterminated_string(&out) {
        out.push('"');
        changed = true;
    }
    let suffix = closing_suffix(&out);
    if !suffix.is_empty() {
        out.push_str(&suffix);
        changed = true;
    }
    if changed {
        Some(out)
    } else {
        None
    }
}

static ARRAY_HEAD_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s*:\s*\[").unwrap());

static SCALAR_VALUE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"^\s*:\s*("(?:[^"\\]|\\.)*"|-?(?:0|[1-9]\d*)(?:\.\d+)?(?:[eE][+-]?\d+)?|true|false|null)"#)
        .expect("scalar literal pattern")
});

/// Walk an array body collecting each fully-closed object element; the
/// trailing incomplete element (no matching close) is discarded.
fn collect_closed_elements<'a>(text: &'a str, open_bracket: usize) -> Vec<&'a str> {
    let bytes = text.as_bytes();
    let mut elements = Vec::new();
    let mut i = open_bracket + 1;
    while i < bytes.len() {
        match bytes[i] {
            b if b.is_ascii_whitespace() => i += 1,
            b',' => i += 1,
            b'{' => match find_matching_close(text, i) {
                Some(end) => {
                    elements.push(&text[i..=end]);
                    i = end + 1;
                }
                None => break,
            },
            // `]` ends the array; anything else is a non-object element,
            // which this rescue does not collect.
            _ => break,
        }
    }
    elements
}

/// Rescue a single array by field name when whole-document recovery is
/// impossible: find `"name" : [`, collect its closed object elements, and
/// wrap them as `{"name": [...]}`. First name with a non-empty collection
/// wins.
pub fn named_array_rescue(text: &str, names: &[String]) -> Option<Value> {
    for name in names {
        let needle = format!("\"{}\"", name);
        let mut search_from = 0usize;
        while let Some(rel) = text[search_from..].find(&needle) {
            let key_end = search_from + rel + needle.len();
            if let Some(m) = ARRAY_HEAD_RE.find(&text[key_end..]) {
                let open_bracket = key_end + m.end() - 1;
                let elements: Vec<Value> = collect_closed_elements(text, open_bracket)
                    .into_iter()
                    .filter_map(|el| serde_json::from_str(el).ok())
                    .collect();
                if !elements.is_empty() {
                    log::debug!("named-array rescue recovered {} element(s) of {:?}", elements.len(), name);
                    let mut map = Map::new();
                    map.insert(name.clone(), Value::Array(elements));
                    return Some(Value::Object(map));
                }
            }
            search_from = key_end;
        }
    }
    None
}

/// Last resort: positional pattern search for expected top-level fields,
/// ignoring surrounding structure entirely. Returns a flat object of the
/// fields actually found; zero fields means the whole engine gives up.
pub fn scalar_field_rescue(text: &str, names: &[String]) -> Option<Value> {
    let mut map = Map::new();
    for name in names {
        let needle = format!("\"{}\"", name);
        let mut search_from = 0usize;
        while let Some(rel) = text[search_from..].find(&needle) {
            let key_end = search_from + rel + needle.len();
            if let Some(caps) = SCALAR_VALUE_RE.captures(&text[key_end..]) {
                if let Ok(v) = serde_json::from_str::<Value>(&caps[1]) {
                    map.insert(name.clone(), v);
                    break;
                }
            }
            search_from = key_end;
        }
    }
    if map.is_empty() {
        None
    } else {
        Some(Value::Object(map))
    }
}
