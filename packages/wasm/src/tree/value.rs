//! Typing of user-edited values and labels.
//!
//! The editor shows leaves as `key: <json>` and lets the user type either a
//! bare value or a whole `key: value` line. Values are typed by sniffing the
//! text: quoted → string, numeric → number, `true`/`false` → boolean,
//! `null` → null, anything else → the raw string.

use serde::Serialize;
use serde_json::{Number, Value};

/// Type a value the user typed into a leaf.
///
/// Rules, in order:
/// 1. Wrapped in double quotes: the inner text, as a string.
/// 2. Parses as a finite number: that number. Empty or blank text is not a
///    number and stays a string.
/// 3. `true` / `false`: a boolean.
/// 4. `null`: null.
/// 5. Otherwise the text itself, as a string.
pub fn parse_edited_value(text: &str) -> Value {
    if text.len() >= 2 && text.starts_with('"') && text.ends_with('"') {
        return Value::String(text[1..text.len() - 1].to_string());
    }
    if let Some(number) = parse_number(text) {
        return Value::Number(number);
    }
    match text {
        "true" => Value::Bool(true),
        "false" => Value::Bool(false),
        "null" => Value::Null,
        _ => Value::String(text.to_string()),
    }
}

fn parse_number(text: &str) -> Option<Number> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }
    if let Some(uint) = parse_radix(trimmed) {
        return Some(uint.into());
    }
    // Rust's float grammar also takes words like "inf" and "nan".
    if !trimmed
        .bytes()
        .all(|b| b.is_ascii_digit() || matches!(b, b'+' | b'-' | b'.' | b'e' | b'E'))
    {
        return None;
    }
    if let Ok(int) = trimmed.parse::<i64>() {
        return Some(int.into());
    }
    if let Ok(uint) = trimmed.parse::<u64>() {
        return Some(uint.into());
    }
    let float = trimmed.parse::<f64>().ok().filter(|f| f.is_finite())?;
    // `1e3` and `2.0` are stored as integers, the way a JS number prints.
    if float.fract() == 0.0 && float >= i64::MIN as f64 && float < i64::MAX as f64 {
        return Some((float as i64).into());
    }
    Number::from_f64(float)
}

/// `0x1F`, `0o17`, `0b101` (prefix in any case) as an unsigned integer.
fn parse_radix(text: &str) -> Option<u64> {
    let prefix = text.get(..2)?.to_ascii_lowercase();
    let radix = match prefix.as_str() {
        "0x" => 16,
        "0o" => 8,
        "0b" => 2,
        _ => return None,
    };
    let digits = &text[2..];
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_alphanumeric()) {
        return None;
    }
    u64::from_str_radix(digits, radix).ok()
}

/// Key and typed value recovered from a `key: value` label.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParsedLabel {
    pub key: String,
    /// `None` when the label has no colon.
    pub value: Option<Value>,
}

/// Split a label at its first colon into key and value.
///
/// The key is trimmed; the remainder is trimmed and typed with
/// [`parse_edited_value`]. A label without a colon is all key.
pub fn parse_label(label: &str) -> ParsedLabel {
    match label.split_once(':') {
        Some((key, rest)) => ParsedLabel {
            key: key.trim().to_string(),
            value: Some(parse_edited_value(rest.trim())),
        },
        None => ParsedLabel {
            key: label.trim().to_string(),
            value: None,
        },
    }
}

/// Display label for a key and optional leaf value.
pub fn format_label(key: &str, value: Option<&Value>) -> String {
    match value {
        Some(v) => format!("{key}: {v}"),
        None => key.to_string(),
    }
}
