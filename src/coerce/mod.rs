//! Conversion of loosely-typed TOML values into the primitive kinds a
//! [`Slot`](crate::Slot) can hold.
//!
//! The rules are lenient on purpose: numbers become booleans, numeric
//! strings become numbers, and a bare integer is a duration in nanoseconds.
//! Anything that would lose meaning (a table as a string, `"yes"` as a bool)
//! fails with a [`CoerceError`].

mod duration;
mod error;
mod time;

use std::num::IntErrorKind;

use chrono::TimeDelta;
use toml::Value;

pub use duration::parse_duration;
pub use error::CoerceError;
pub use time::{parse_time, to_time};

/// Converts a value to `bool`.
///
/// Numbers are `true` when non-zero. Strings accept `1`, `t`, `T`, `TRUE`,
/// `true`, `True` and their false counterparts.
pub fn to_bool(value: &Value) -> Result<bool, CoerceError> {
    match value {
        Value::Boolean(b) => Ok(*b),
        Value::Integer(i) => Ok(*i != 0),
        Value::Float(f) => Ok(*f != 0.0),
        Value::String(s) => parse_bool(s).ok_or_else(|| incompatible(value, "bool")),
        _ => Err(incompatible(value, "bool")),
    }
}

/// Converts a value to `i64`. Floats truncate toward zero.
pub fn to_i64(value: &Value) -> Result<i64, CoerceError> {
    match value {
        Value::Integer(i) => Ok(*i),
        Value::Float(f) => float_to_i64(*f).ok_or_else(|| overflow(value, "i64")),
        Value::Boolean(b) => Ok(i64::from(*b)),
        Value::String(s) => {
            let (negative, digits) = split_sign(trim_zero_decimal(s));
            let magnitude = parse_magnitude(digits).map_err(|e| e.into_coerce(value, "i64"))?;
            if !negative {
                return i64::try_from(magnitude).map_err(|_| overflow(value, "i64"));
            }
            if magnitude > i64::MIN.unsigned_abs() {
                return Err(overflow(value, "i64"));
            }
            Ok((magnitude as i64).wrapping_neg())
        }
        _ => Err(incompatible(value, "i64")),
    }
}

/// Converts a value to `u64`. Negative input of any kind is rejected.
pub fn to_u64(value: &Value) -> Result<u64, CoerceError> {
    match value {
        Value::Integer(i) => u64::try_from(*i).map_err(|_| CoerceError::Negative(i.to_string())),
        Value::Float(f) if *f < 0.0 => Err(CoerceError::Negative(f.to_string())),
        Value::Float(f) => {
            if f.is_finite() && *f < u64::MAX as f64 {
                Ok(f.trunc() as u64)
            } else {
                Err(overflow(value, "u64"))
            }
        }
        Value::Boolean(b) => Ok(u64::from(*b)),
        Value::String(s) => {
            let (negative, digits) = split_sign(trim_zero_decimal(s));
            let magnitude = parse_magnitude(digits).map_err(|e| e.into_coerce(value, "u64"))?;
            if negative && magnitude != 0 {
                return Err(CoerceError::Negative(s.clone()));
            }
            Ok(magnitude)
        }
        _ => Err(incompatible(value, "u64")),
    }
}

/// Converts a value to `f64`.
pub fn to_f64(value: &Value) -> Result<f64, CoerceError> {
    match value {
        Value::Float(f) => Ok(*f),
        Value::Integer(i) => Ok(*i as f64),
        Value::Boolean(b) => Ok(if *b { 1.0 } else { 0.0 }),
        Value::String(s) => s.trim().parse().map_err(|_| incompatible(value, "f64")),
        _ => Err(incompatible(value, "f64")),
    }
}

/// Converts a scalar value to its string form. Arrays and tables fail.
pub fn to_string(value: &Value) -> Result<String, CoerceError> {
    match value {
        Value::String(s) => Ok(s.clone()),
        Value::Boolean(b) => Ok(b.to_string()),
        Value::Integer(i) => Ok(i.to_string()),
        Value::Float(f) => Ok(f.to_string()),
        Value::Datetime(dt) => Ok(dt.to_string()),
        Value::Array(_) | Value::Table(_) => Err(incompatible(value, "string")),
    }
}

/// Converts a value to a list of strings.
///
/// Arrays convert element by element; a single string splits on whitespace.
pub fn to_string_seq(value: &Value) -> Result<Vec<String>, CoerceError> {
    match value {
        Value::Array(items) => items.iter().map(to_string).collect(),
        Value::String(s) => Ok(s.split_whitespace().map(str::to_owned).collect()),
        _ => Err(incompatible(value, "Vec<String>")),
    }
}

/// Converts a value to a signed duration.
///
/// Integers and floats count nanoseconds. Strings that mention a unit letter
/// use [`parse_duration`] syntax; other strings are read as nanoseconds.
pub fn to_duration(value: &Value) -> Result<TimeDelta, CoerceError> {
    let nanos = match value {
        Value::Integer(i) => *i,
        Value::Float(f) => float_to_i64(*f).ok_or_else(|| overflow(value, "duration"))?,
        Value::String(s) if s.contains(['n', 's', 'u', 'µ', 'm', 'h']) => parse_duration(s)?,
        Value::String(s) => parse_duration(&format!("{s}ns"))?,
        _ => return Err(incompatible(value, "duration")),
    };
    Ok(TimeDelta::nanoseconds(nanos))
}

fn incompatible(value: &Value, target: &'static str) -> CoerceError {
    CoerceError::Incompatible {
        value: value.to_string(),
        kind: value.type_str(),
        target,
    }
}

fn overflow(value: &Value, target: &'static str) -> CoerceError {
    CoerceError::Overflow {
        value: value.to_string(),
        target,
    }
}

fn parse_bool(s: &str) -> Option<bool> {
    match s {
        "1" | "t" | "T" | "TRUE" | "true" | "True" => Some(true),
        "0" | "f" | "F" | "FALSE" | "false" | "False" => Some(false),
        _ => None,
    }
}

fn float_to_i64(f: f64) -> Option<i64> {
    // 2^63 is exactly representable; anything at or past it does not fit.
    const LIMIT: f64 = 9_223_372_036_854_775_808.0;
    (f.is_finite() && f < LIMIT && f >= -LIMIT).then(|| f.trunc() as i64)
}

/// Drops a trailing all-zero fraction: `"10.00"` becomes `"10"`, `"10.5"`
/// and `"10."` stay as they are.
fn trim_zero_decimal(s: &str) -> &str {
    let mut found_zero = false;
    for (i, b) in s.bytes().enumerate().rev() {
        match b {
            b'.' if found_zero => return &s[..i],
            b'0' => found_zero = true,
            _ => return s,
        }
    }
    s
}

fn split_sign(s: &str) -> (bool, &str) {
    match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    }
}

enum NumError {
    Invalid,
    Overflow,
}

impl NumError {
    fn into_coerce(self, value: &Value, target: &'static str) -> CoerceError {
        match self {
            NumError::Invalid => incompatible(value, target),
            NumError::Overflow => overflow(value, target),
        }
    }
}

/// Parses unsigned digits with an optional `0x`, `0o`, `0b` or legacy `0`
/// (octal) prefix. Underscores between digits are ignored.
fn parse_magnitude(digits: &str) -> Result<u64, NumError> {
    let (radix, body) = match digits.get(..2) {
        Some("0x" | "0X") => (16, &digits[2..]),
        Some("0o" | "0O") => (8, &digits[2..]),
        Some("0b" | "0B") => (2, &digits[2..]),
        _ if digits.len() > 1 && digits.starts_with('0') => (8, &digits[1..]),
        _ => (10, digits),
    };
    if body.starts_with(['+', '-']) {
        return Err(NumError::Invalid);
    }
    let body: String = body.chars().filter(|c| *c != '_').collect();
    u64::from_str_radix(&body, radix).map_err(|e| match e.kind() {
        IntErrorKind::PosOverflow => NumError::Overflow,
        _ => NumError::Invalid,
    })
}
