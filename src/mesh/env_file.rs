//! Environment file validation.
//!
//! # Grammar
//! ```text
//! file    := line (("\r\n" | "\n") line)*
//! line    := blank | comment | entry
//! comment := ws* "#" any*
//! entry   := key "=" value              (split on the first "=")
//! key     := [A-Za-z_] [A-Za-z0-9_]*
//! value   := token+
//! token   := dquoted | squoted | bare
//! dquoted := '"' ( "\" any | [^"\\] )* '"'
//! squoted := "'" ( "\" any | [^'\\] )* "'"
//! bare    := [^'"\s]                    (one character)
//! ```
//!
//! Lines are trimmed before matching. `entries` keeps values verbatim;
//! [`EnvFileReport::values`] applies dotenv unquoting for interpolation:
//! one layer of matching quotes is stripped, `\n` and `\r` expand inside
//! double quotes only, and `$VAR` is never substituted.

use std::collections::HashMap;

/// Outcome of validating an environment file.
#[derive(Debug, Clone, Default)]
pub struct EnvFileReport {
    /// Parsed entries. A repeated key keeps its last value.
    pub entries: HashMap<String, String>,

    /// Every format and duplicate-key error, in line order.
    pub errors: Vec<String>,
}

impl EnvFileReport {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// All errors joined with `,`, or `None` when the file is valid.
    pub fn error(&self) -> Option<String> {
        if self.errors.is_empty() {
            None
        } else {
            Some(self.errors.join(","))
        }
    }

    /// Entries with their values unquoted.
    pub fn values(&self) -> HashMap<String, String> {
        self.entries
            .iter()
            .map(|(key, value)| (key.clone(), unquote_value(value)))
            .collect()
    }
}

/// Strip one layer of matching `"`, `'` or `` ` `` quotes. Double-quoted
/// values get `\n` and `\r` expanded; everything else stays literal.
pub fn unquote_value(value: &str) -> String {
    let mut chars = value.chars();
    let (Some(first), Some(last)) = (chars.next(), chars.next_back()) else {
        return value.to_string();
    };
    if first != last || !matches!(first, '"' | '\'' | '`') {
        return value.to_string();
    }

    let inner = &value[1..value.len() - 1];
    if first == '"' {
        inner.replace("\\n", "\n").replace("\\r", "\r")
    } else {
        inner.to_string()
    }
}

/// Validate the content of an environment file.
///
/// Every line is checked; errors never stop the scan.
pub fn validate_env_file_format(content: &str) -> EnvFileReport {
    let mut report = EnvFileReport::default();

    for (index, line) in content.split('\n').enumerate() {
        let line_no = index + 1;
        let trimmed = line.strip_suffix('\r').unwrap_or(line).trim();

        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        let Some((key, value)) = trimmed.split_once('=') else {
            report
                .errors
                .push(format!("Invalid format << {trimmed} >> on line {line_no}"));
            continue;
        };

        if !is_valid_key(key) || !is_valid_value(value) {
            report
                .errors
                .push(format!("Invalid format for key/value << {trimmed} >> on line {line_no}"));
        }

        if report.entries.contains_key(key) {
            report
                .errors
                .push(format!("Duplicate key << {key} >> on line {line_no}"));
        }

        report.entries.insert(key.to_string(), value.to_string());
    }

    report
}

/// `[A-Za-z_][A-Za-z0-9_]*`
pub fn is_valid_key(key: &str) -> bool {
    let mut chars = key.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// One or more quoted strings or bare characters.
pub fn is_valid_value(value: &str) -> bool {
    let mut chars = value.chars();
    let mut tokens = 0usize;

    while let Some(c) = chars.next() {
        match c {
            '"' | '\'' => {
                if !consume_quoted(&mut chars, c) {
                    return false;
                }
            }
            c if c.is_whitespace() => return false,
            _ => {}
        }
        tokens += 1;
    }

    tokens > 0
}

/// Consume a quoted string body up to and including the closing `quote`.
/// A backslash escapes the next character, including the quote itself.
fn consume_quoted(chars: &mut std::str::Chars<'_>, quote: char) -> bool {
    while let Some(c) = chars.next() {
        match c {
            '\\' => {
                if chars.next().is_none() {
                    return false;
                }
            }
            c if c == quote => return true,
            _ => {}
        }
    }
    false
}
