//! Minimal codec for flat JSON objects of string keys and string values.
//!
//! Registration only ever carries two string fields, so this parses exactly
//! one level: `{"k": "v", ...}`. No nesting, arrays, numbers or booleans.
//! Segments are split on every comma, so keys and values must not contain
//! literal commas. Keys must not contain colons; values may.

use std::collections::HashMap;

/// Parse a flat object. Returns `None` when the text is not brace-wrapped
/// or a segment has no `key:value` split.
///
/// Trailing empty segments (`{"a":"b",}`) are ignored. Later duplicate keys
/// overwrite earlier ones.
pub fn parse_flat_object(text: &str) -> Option<HashMap<String, String>> {
    let inner = text.trim().strip_prefix('{')?.strip_suffix('}')?.trim();

    let mut map = HashMap::new();
    if inner.is_empty() {
        return Some(map);
    }

    let mut segments: Vec<&str> = inner.split(',').collect();
    while segments.last().is_some_and(|s| s.is_empty()) {
        segments.pop();
    }

    for segment in segments {
        let (key, value) = segment.split_once(':')?;
        map.insert(unquote(key.trim()), unquote(value.trim()));
    }
    Some(map)
}

/// Encode pairs as a flat object that `parse_flat_object` reads back.
pub fn encode_flat_object<'a, I>(pairs: I) -> String
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    let fields: Vec<String> = pairs
        .into_iter()
        .map(|(k, v)| format!("\"{}\":\"{}\"", escape(k), escape(v)))
        .collect();
    format!("{{{}}}", fields.join(","))
}

/// Strip one pair of surrounding quotes, then unescape `\"` and `\\`,
/// in that order.
fn unquote(s: &str) -> String {
    let s = if s.len() >= 2 && s.starts_with('"') && s.ends_with('"') {
        &s[1..s.len() - 1]
    } else {
        s
    };
    s.replace("\\\"", "\"").replace("\\\\", "\\")
}

fn escape(s: &str) -> String {
    s.replace('\\', "\\\\").replace('"', "\\\"")
}
