//! JSON-object extraction from HTML documents
//!
//! Tier-2 sources ship their search state as a JSON blob assigned to a
//! global inside a `<script>` tag. The surrounding document is frequently
//! malformed enough to defeat a strict parser, so the object is carved out
//! by brace counting with string-literal and escape awareness, then handed
//! to serde_json on its own.

use serde_json::Value;

/// Extract the first balanced `{...}` object following `marker`.
///
/// Returns the raw slice; trailing garbage after the object is ignored.
pub fn embedded_json_object<'a>(html: &'a str, marker: &str) -> Option<&'a str> {
    let marker_at = html.find(marker)?;
    let after = &html[marker_at + marker.len()..];
    let open = after.find('{')?;
    let object = &after[open..];

    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (i, c) in object.char_indices() {
        if in_string {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
            continue;
        }
        match c {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&object[..=i]);
                }
            }
            _ => {}
        }
    }
    None
}

/// Extract and parse the object following `marker`.
pub fn embedded_json_value(html: &str, marker: &str) -> Option<Value> {
    let raw = embedded_json_object(html, marker)?;
    serde_json::from_str(raw).ok()
}
