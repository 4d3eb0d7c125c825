//! `{{env.KEY}}` / `{env.KEY}` placeholder interpolation.
//!
//! # Grammar
//! ```text
//! placeholder := "{{" path "}}" | "{" path "}"
//! path        := prefix "." key          (prefix is "env", ASCII case-insensitive)
//! key         := digit+ | [A-Za-z$_] [A-Za-z0-9_$.-]*
//! ```
//!
//! A double-brace placeholder is tried first at every `{`; when it does not
//! match, the single-brace form is tried at the same position. Anything that
//! does not match is copied through unchanged.
//!
//! Values are looked up by walking the dotted path (`env.KEY`) through the
//! data object, so `{{env.KEY}}` against `{"env": {"KEY": "v"}}` yields `v`.

use std::collections::HashMap;

use serde_json::{Map, Value};

const ENV_PREFIX: &str = "env";

/// Outcome of interpolating a mesh document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InterpolationResult {
    /// Every placeholder resolved.
    Success { interpolated: String },
    /// At least one placeholder could not be resolved. The caller must stop.
    Failed { missing_keys: Vec<String> },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Placeholder<'a> {
    /// Byte length of the whole placeholder, braces included.
    len: usize,
    /// Prefix as written (`env`, `ENV`, ...).
    prefix: &'a str,
    /// Key after the prefix.
    key: &'a str,
}

/// Wrap a flat environment map under the `env` root key.
pub fn env_data(env: &HashMap<String, String>) -> Value {
    let env: Map<String, Value> = env
        .iter()
        .map(|(k, v)| (k.clone(), Value::String(v.clone())))
        .collect();

    let mut root = Map::new();
    root.insert(ENV_PREFIX.to_string(), Value::Object(env));
    Value::Object(root)
}

/// Whether `text` contains any env placeholder.
pub fn check_placeholders(text: &str) -> bool {
    text.char_indices()
        .any(|(i, c)| c == '{' && parse_placeholder(&text[i..]).is_some())
}

/// Substitute every env placeholder in `text` with its value from `data`.
pub fn interpolate_mesh(text: &str, data: &Value) -> InterpolationResult {
    let mut output = String::with_capacity(text.len());
    let mut missing_keys: Vec<String> = Vec::new();
    let mut rest = text;

    while let Some(offset) = rest.find('{') {
        output.push_str(&rest[..offset]);
        rest = &rest[offset..];

        match parse_placeholder(rest) {
            Some(placeholder) => {
                match lookup(data, placeholder.prefix, placeholder.key) {
                    Some(value) => output.push_str(&value),
                    None => {
                        if !missing_keys.iter().any(|k| k == placeholder.key) {
                            missing_keys.push(placeholder.key.to_string());
                        }
                        output.push_str(&rest[..placeholder.len]);
                    }
                }
                rest = &rest[placeholder.len..];
            }
            None => {
                output.push('{');
                rest = &rest[1..];
            }
        }
    }
    output.push_str(rest);

    if missing_keys.is_empty() {
        InterpolationResult::Success {
            interpolated: output,
        }
    } else {
        InterpolationResult::Failed { missing_keys }
    }
}

/// Parse a placeholder at the start of `input`, which begins with `{`.
fn parse_placeholder(input: &str) -> Option<Placeholder<'_>> {
    if let Some(inner) = input.strip_prefix("{{") {
        if let Some((prefix, key, consumed)) = parse_path(inner) {
            if inner[consumed..].starts_with("}}") {
                return Some(Placeholder {
                    len: 2 + consumed + 2,
                    prefix,
                    key,
                });
            }
        }
    }

    let inner = input.strip_prefix('{')?;
    let (prefix, key, consumed) = parse_path(inner)?;
    inner[consumed..].starts_with('}').then_some(Placeholder {
        len: 1 + consumed + 1,
        prefix,
        key,
    })
}

/// Parse `env.<key>`, returning the prefix, the key and the bytes consumed.
fn parse_path(input: &str) -> Option<(&str, &str, usize)> {
    let prefix = input.get(..ENV_PREFIX.len())?;
    if !prefix.eq_ignore_ascii_case(ENV_PREFIX) {
        return None;
    }
    let rest = input[ENV_PREFIX.len()..].strip_prefix('.')?;
    let start = ENV_PREFIX.len() + 1;

    let first = rest.chars().next()?;
    let key_len = if first.is_ascii_digit() {
        rest.find(|c: char| !c.is_ascii_digit()).unwrap_or(rest.len())
    } else if first.is_ascii_alphabetic() || first == '$' || first == '_' {
        rest.find(|c: char| !is_key_char(c)).unwrap_or(rest.len())
    } else {
        return None;
    };

    Some((prefix, &rest[..key_len], start + key_len))
}

fn is_key_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '_' | '$' | '-' | '.')
}

/// Walk `prefix.key` through `data`. Only scalar values resolve.
fn lookup(data: &Value, prefix: &str, key: &str) -> Option<String> {
    let mut current = data.get(prefix)?;
    for segment in key.split('.') {
        current = current.get(segment)?;
    }

    match current {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}
