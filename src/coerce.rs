//! Coercion from raw tier values into requested shapes.
//!
//! `get` itself never errors: flag values that fail to decode per their
//! declared type tag degrade to plain strings, and type-mismatch detection
//! happens here, on behalf of the typed accessors and the deserializer.

use std::time::Duration;

use crate::value::Value;

/// Parse a boolean from its canonical string tokens.
pub(crate) fn parse_bool(s: &str) -> Option<bool> {
    match s.trim().to_ascii_lowercase().as_str() {
        "true" | "t" | "1" | "yes" | "on" => Some(true),
        "false" | "f" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

pub(crate) fn to_bool(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::Integer(0) => Some(false),
        Value::Integer(1) => Some(true),
        Value::String(s) => parse_bool(s),
        _ => None,
    }
}

pub(crate) fn to_i64(value: &Value) -> Option<i64> {
    match value {
        Value::Integer(n) => Some(*n),
        Value::Bool(b) => Some(i64::from(*b)),
        Value::Float(x) if x.fract() == 0.0 => Some(*x as i64),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

pub(crate) fn to_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Float(x) => Some(*x),
        Value::Integer(n) => Some(*n as f64),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Render a scalar value as a string. Arrays and tables do not stringify.
pub(crate) fn to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Bool(_) | Value::Integer(_) | Value::Float(_) => Some(value.to_string()),
        _ => None,
    }
}

/// Coerce a value into a string sequence.
///
/// Arrays stringify element-wise; a plain string is parsed as one CSV line.
pub(crate) fn to_string_slice(value: &Value) -> Option<Vec<String>> {
    match value {
        Value::Array(items) => items.iter().map(to_string).collect(),
        Value::String(s) => Some(parse_csv_line(s)),
        _ => None,
    }
}

/// Coerce a value into a duration.
///
/// Strings use the `number+unit` grammar of [`parse_duration`]; bare integers
/// count whole nanoseconds. Negative integers do not coerce.
pub(crate) fn to_duration(value: &Value) -> Option<Duration> {
    match value {
        Value::Integer(n) => u64::try_from(*n).ok().map(Duration::from_nanos),
        Value::String(s) => parse_duration(s),
        _ => None,
    }
}

/// Parse a unit-suffixed duration such as `300ms`, `2.5s` or `1h30m`.
///
/// Units: `ns`, `us`, `ms`, `s`, `m`, `h`. A sequence of number+unit pairs
/// accumulates; `0` alone is accepted.
pub(crate) fn parse_duration(s: &str) -> Option<Duration> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    if s == "0" {
        return Some(Duration::ZERO);
    }

    let mut total_secs = 0f64;
    let mut rest = s;
    while !rest.is_empty() {
        let number_len = rest
            .find(|c: char| !c.is_ascii_digit() && c != '.')
            .unwrap_or(rest.len());
        if number_len == 0 {
            return None;
        }
        let number: f64 = rest[..number_len].parse().ok()?;
        rest = &rest[number_len..];

        let unit_len = rest
            .find(|c: char| c.is_ascii_digit() || c == '.')
            .unwrap_or(rest.len());
        let factor = match &rest[..unit_len] {
            "ns" => 1e-9,
            "us" => 1e-6,
            "ms" => 1e-3,
            "s" => 1.0,
            "m" => 60.0,
            "h" => 3600.0,
            _ => return None,
        };
        rest = &rest[unit_len..];

        total_secs += number * factor;
    }
    Some(Duration::from_secs_f64(total_secs))
}

/// Parse one CSV-style line into fields.
///
/// Comma-separated; a double-quoted field may contain embedded commas, and a
/// doubled quote inside a quoted field escapes a literal quote. The empty
/// input yields an empty sequence, not one empty field.
pub(crate) fn parse_csv_line(input: &str) -> Vec<String> {
    if input.is_empty() {
        return Vec::new();
    }

    let mut fields = Vec::new();
    let mut chars = input.chars().peekable();

    'fields: loop {
        let mut field = String::new();

        if chars.peek() == Some(&'"') {
            chars.next();
            loop {
                match chars.next() {
                    Some('"') => {
                        if chars.peek() == Some(&'"') {
                            chars.next();
                            field.push('"');
                        } else {
                            break;
                        }
                    }
                    Some(c) => field.push(c),
                    // Unterminated quote: keep what we have.
                    None => break,
                }
            }
            // Consume up to the next separator; text between a closing quote
            // and the comma is dropped.
            loop {
                match chars.next() {
                    Some(',') => {
                        fields.push(field);
                        continue 'fields;
                    }
                    Some(_) => {}
                    None => {
                        fields.push(field);
                        break 'fields;
                    }
                }
            }
        }

        loop {
            match chars.next() {
                Some(',') => {
                    fields.push(field);
                    continue 'fields;
                }
                Some(c) => field.push(c),
                None => {
                    fields.push(field);
                    break 'fields;
                }
            }
        }
    }

    fields
}

/// Decode a flag's raw string per its declared type tag.
///
/// Unrecognized tags, and values that fail to parse under their tag, fall
/// back to the plain string.
pub(crate) fn decode_flag_value(raw: &str, type_tag: &str) -> Value {
    match type_tag {
        "bool" => parse_bool(raw)
            .map(Value::Bool)
            .unwrap_or_else(|| Value::String(raw.to_string())),
        "int" => raw
            .trim()
            .parse::<i64>()
            .map(Value::Integer)
            .unwrap_or_else(|_| Value::String(raw.to_string())),
        "float" => raw
            .trim()
            .parse::<f64>()
            .map(Value::Float)
            .unwrap_or_else(|_| Value::String(raw.to_string())),
        "string_slice" => Value::Array(
            parse_csv_line(raw)
                .into_iter()
                .map(Value::String)
                .collect(),
        ),
        _ => Value::String(raw.to_string()),
    }
}
