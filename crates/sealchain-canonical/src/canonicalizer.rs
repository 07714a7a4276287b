//! Canonical JSON text encoding.
//!
//! Semantically equal values produce byte-identical output regardless of key
//! insertion order. The encoding is total over `serde_json::Value`: every
//! representable value has exactly one canonical form, so the functions here
//! are infallible. Non-finite numbers cannot occur in a `Value`
//! (`Number::from_f64` maps NaN and the infinities to `Null`), which is how
//! the "non-finite serializes as null" rule is realized.

use serde_json::{Number, Value};

/// Largest integer exactly representable in an f64 (2^53 - 1).
const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_991.0;

/// Renders a value as canonical JSON text.
///
/// Object keys are sorted lexicographically by Unicode code point, no
/// whitespace is emitted, and numbers follow the fixed rendering rules of
/// the sealing profile. The output is the single source of truth for all
/// content hashing.
pub fn to_canonical_json(value: &Value) -> String {
    let mut out = String::new();
    write_value(&mut out, value);
    out
}

/// Renders a value as canonical UTF-8 bytes.
pub fn canonical_bytes(value: &Value) -> Vec<u8> {
    to_canonical_json(value).into_bytes()
}

fn write_value(out: &mut String, value: &Value) {
    match value {
        Value::Null => out.push_str("null"),
        Value::Bool(true) => out.push_str("true"),
        Value::Bool(false) => out.push_str("false"),
        Value::Number(n) => write_number(out, n),
        Value::String(s) => write_string(out, s),
        Value::Array(items) => {
            out.push('[');
            for (idx, item) in items.iter().enumerate() {
                if idx > 0 {
                    out.push(',');
                }
                write_value(out, item);
            }
            out.push(']');
        }
        Value::Object(map) => {
            // Sorting by String order is sorting by code point: Rust string
            // comparison is bytewise over UTF-8, which preserves code point
            // order.
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort_unstable();
            out.push('{');
            for (idx, key) in keys.iter().enumerate() {
                if idx > 0 {
                    out.push(',');
                }
                write_string(out, key);
                out.push(':');
                write_value(out, &map[key.as_str()]);
            }
            out.push('}');
        }
    }
}

/// Renders a number per the canonical profile.
///
/// Integers render without decimal point, positive sign, or exponent as long
/// as the magnitude stays within the safe-integer range and below 1e20.
/// Other finite values use Rust's shortest round-tripping `Display` form,
/// which never emits exponent notation. Negative zero renders as `0`.
fn write_number(out: &mut String, number: &Number) {
    if let Some(i) = number.as_i64() {
        out.push_str(&i.to_string());
    } else if let Some(u) = number.as_u64() {
        out.push_str(&u.to_string());
    } else {
        // Finite by construction: serde_json::Number cannot hold NaN/Inf.
        let f = number.as_f64().unwrap_or(0.0);
        if f == 0.0 {
            out.push('0');
        } else if f.fract() == 0.0 && f.abs() <= MAX_SAFE_INTEGER && f.abs() < 1e20 {
            out.push_str(&format!("{:.0}", f));
        } else {
            out.push_str(&format!("{}", f));
        }
    }
}

/// Renders a string with minimal JSON escaping.
///
/// Only the backslash, the double quote, and control characters are escaped;
/// the short forms `\b \t \n \f \r` are used where they exist and `\u00xx`
/// (lowercase hex) otherwise.
fn write_string(out: &mut String, s: &str) {
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\u{8}' => out.push_str("\\b"),
            '\t' => out.push_str("\\t"),
            '\n' => out.push_str("\\n"),
            '\u{c}' => out.push_str("\\f"),
            '\r' => out.push_str("\\r"),
            c if (c as u32) < 0x20 => {
                out.push_str(&format!("\\u{:04x}", c as u32));
            }
            c => out.push(c),
        }
    }
    out.push('"');
}
