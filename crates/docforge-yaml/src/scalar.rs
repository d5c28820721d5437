//! Decoding and encoding of scalar text.
//!
//! Single-line plain scalars are resolved here; quoted, multi-line and block
//! scalars are handed to `yaml-rust2` so escapes and folding follow the YAML
//! rules exactly.

use yaml_rust2::{Yaml, YamlLoader};

/// Resolve a plain (unquoted) single-line scalar to a typed value.
///
/// Uses the same core-schema resolution `yaml-rust2` applies inside flow
/// collections and multi-line values.
pub fn decode_plain(value: &str) -> Yaml {
    Yaml::from_str(value)
}

/// Words YAML 1.1 readers such as PyYAML take as booleans. mkdocs reads its
/// configuration that way, so strings spelled like this are always quoted.
const YAML11_BOOLEANS: &[&str] = &[
    "y", "Y", "yes", "Yes", "YES", "n", "N", "no", "No", "NO", "on", "On", "ON", "off", "Off",
    "OFF",
];

/// Decode a scalar from its first-line text plus continuation lines.
///
/// Continuation lines are relative to the owning line's column, so each one
/// that carries text starts with at least one space.
pub fn decode(raw: &str, continuation: &[String]) -> Yaml {
    let first = raw.trim();
    let simple_plain = continuation.is_empty()
        && !first.starts_with(['"', '\'', '|', '>', '[', '{']);
    if simple_plain {
        return decode_plain(first);
    }

    let mut text = format!("v: {first}\n");
    for line in continuation {
        text.push_str(line);
        text.push('\n');
    }
    YamlLoader::load_from_str(&text)
        .ok()
        .and_then(|docs| docs.into_iter().next())
        .map(|doc| doc["v"].clone())
        .filter(|value| !value.is_badvalue())
        .unwrap_or_else(|| Yaml::String(first.to_string()))
}

/// Split a leading `!tag` from scalar text.
pub fn split_tag(text: &str) -> (Option<&str>, &str) {
    if !text.starts_with('!') {
        return (None, text);
    }
    match text.find(char::is_whitespace) {
        Some(end) => (Some(&text[..end]), text[end..].trim_start()),
        None => (Some(text), ""),
    }
}

/// Render a string as a YAML scalar, plain when that reads back unchanged.
pub fn encode_string(value: &str) -> String {
    if is_plain_safe(value) {
        value.to_string()
    } else {
        double_quote(value)
    }
}

/// Render a decoded value as single-line YAML text.
pub fn encode(value: &Yaml) -> String {
    match value {
        Yaml::String(s) => encode_string(s),
        Yaml::Integer(i) => i.to_string(),
        Yaml::Real(r) => r.clone(),
        Yaml::Boolean(b) => b.to_string(),
        Yaml::Array(items) => {
            let items: Vec<String> = items.iter().map(encode).collect();
            format!("[{}]", items.join(", "))
        }
        Yaml::Hash(hash) => {
            let entries: Vec<String> = hash
                .iter()
                .map(|(k, v)| format!("{}: {}", encode(k), encode(v)))
                .collect();
            format!("{{{}}}", entries.join(", "))
        }
        Yaml::Null | Yaml::BadValue | Yaml::Alias(_) => "null".to_string(),
    }
}

fn is_plain_safe(value: &str) -> bool {
    let Some(first) = value.chars().next() else {
        return false;
    };
    if "-?:,[]{}#&*!|>'\"%@`".contains(first) || first.is_whitespace() {
        return false;
    }
    if value.ends_with(char::is_whitespace) || value.ends_with(':') {
        return false;
    }
    if value.contains(": ") || value.contains(" #") || value.chars().any(char::is_control) {
        return false;
    }
    // Flow indicators and quotes would change meaning inside `[...]` / `{...}`
    if value.contains([',', '[', ']', '{', '}', '\'', '"']) {
        return false;
    }
    matches!(decode_plain(value), Yaml::String(_)) && !YAML11_BOOLEANS.contains(&value)
}

fn double_quote(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for ch in value.chars() {
        match ch {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            c if c.is_control() => out.push_str(&format!("\\u{:04X}", c as u32)),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}
