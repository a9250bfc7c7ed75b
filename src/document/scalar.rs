//! Rendering of replacement scalars.
//!
//! A rewritten scalar keeps its original style whenever that style can carry
//! the new value. Plain scalars are only emitted when the text would be read
//! back as the same string, so a tag like `1.0` is never written bare.

use super::node::ScalarStyle;
use once_cell::sync::Lazy;
use std::collections::HashSet;

/// Plain words that resolve to null or bool under YAML 1.1 or 1.2.
static RESERVED_WORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "", "~", "null", "Null", "NULL", "true", "True", "TRUE", "false", "False", "FALSE",
        "yes", "Yes", "YES", "no", "No", "NO", "on", "On", "ON", "off", "Off", "OFF", "y",
        "Y", "n", "N", ".inf", ".Inf", ".INF", "+.inf", "+.Inf", "+.INF", "-.inf", "-.Inf",
        "-.INF", ".nan", ".NaN", ".NAN", "<<", "=",
    ]
    .into_iter()
    .collect()
});

/// Returns true if `value` written as a plain scalar is read back as a string.
pub fn resolves_to_string(value: &str) -> bool {
    !(RESERVED_WORDS.contains(value) || is_number(value) || is_timestamp(value))
}

fn is_number(value: &str) -> bool {
    let unsigned = value.strip_prefix(|c: char| c == '+' || c == '-').unwrap_or(value);
    if unsigned.is_empty() {
        return false;
    }
    if let Some(hex) = unsigned.strip_prefix("0x") {
        return !hex.is_empty() && hex.chars().all(|c| c.is_ascii_hexdigit() || c == '_');
    }
    if let Some(oct) = unsigned.strip_prefix("0o") {
        return !oct.is_empty() && oct.chars().all(|c| c.is_digit(8) || c == '_');
    }
    if let Some(bin) = unsigned.strip_prefix("0b") {
        return !bin.is_empty() && bin.chars().all(|c| c == '0' || c == '1' || c == '_');
    }

    let (mantissa, exponent) = match unsigned.find(|c: char| c == 'e' || c == 'E') {
        Some(pos) => (&unsigned[..pos], Some(&unsigned[pos + 1..])),
        None => (unsigned, None),
    };
    let mut digits = 0;
    let mut dots = 0;
    for c in mantissa.chars() {
        match c {
            '0'..='9' => digits += 1,
            '.' => dots += 1,
            '_' => {}
            _ => return false,
        }
    }
    if digits == 0 || dots > 1 {
        return false;
    }
    match exponent {
        None => true,
        Some(exp) => {
            let exp = exp.strip_prefix(|c: char| c == '+' || c == '-').unwrap_or(exp);
            !exp.is_empty() && exp.chars().all(|c| c.is_ascii_digit())
        }
    }
}

/// Matches the leading `YYYY-MM-DD` of a YAML 1.1 timestamp.
fn is_timestamp(value: &str) -> bool {
    let bytes = value.as_bytes();
    if bytes.len() < 8 || !bytes[..4].iter().all(u8::is_ascii_digit) || bytes[4] != b'-' {
        return false;
    }
    let rest = &value[5..];
    let mut parts = rest.splitn(2, '-');
    let month = parts.next().unwrap_or("");
    let day: String = parts
        .next()
        .unwrap_or("")
        .chars()
        .take_while(char::is_ascii_digit)
        .collect();
    (1..=2).contains(&month.len())
        && month.chars().all(|c| c.is_ascii_digit())
        && (1..=2).contains(&day.len())
}

/// Returns true if `value` can be written as a plain scalar without changing
/// its text.
pub fn is_plain_safe(value: &str, flow: bool) -> bool {
    let Some(first) = value.chars().next() else {
        return false;
    };
    if value.starts_with(char::is_whitespace) || value.ends_with(char::is_whitespace) {
        return false;
    }
    if value.chars().any(|c| c.is_control()) {
        return false;
    }
    match first {
        '[' | ']' | '{' | '}' | ',' | '#' | '&' | '*' | '!' | '|' | '>' | '\'' | '"' | '%'
        | '@' | '`' => return false,
        '-' | '?' | ':' => {
            let second = value[1..].chars().next();
            if second.map_or(true, |c| c.is_whitespace() || (flow && is_flow_indicator(c))) {
                return false;
            }
        }
        _ => {}
    }
    if value == "---" || value == "..." || value.starts_with("--- ") || value.starts_with("... ") {
        return false;
    }
    if value.contains(": ") || value.contains(" #") || value.ends_with(':') {
        return false;
    }
    if flow && value.chars().any(is_flow_indicator) {
        return false;
    }
    true
}

fn is_flow_indicator(c: char) -> bool {
    matches!(c, ',' | '[' | ']' | '{' | '}')
}

/// Renders `value` for the given original style.
///
/// Returns the source text and the style actually used.
pub fn render(value: &str, style: ScalarStyle, flow: bool) -> (String, ScalarStyle) {
    let needs_double = value.contains('\n') || value.chars().any(|c| c.is_control());
    match style {
        ScalarStyle::DoubleQuoted => (double_quoted(value), ScalarStyle::DoubleQuoted),
        _ if needs_double => (double_quoted(value), ScalarStyle::DoubleQuoted),
        ScalarStyle::SingleQuoted => (single_quoted(value), ScalarStyle::SingleQuoted),
        ScalarStyle::Plain | ScalarStyle::Literal | ScalarStyle::Folded => {
            if is_plain_safe(value, flow) && resolves_to_string(value) {
                (value.to_string(), ScalarStyle::Plain)
            } else {
                (single_quoted(value), ScalarStyle::SingleQuoted)
            }
        }
    }
}

fn single_quoted(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

fn double_quoted(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for c in value.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            c if c.is_control() => out.push_str(&format!("\\x{:02x}", c as u32)),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}
