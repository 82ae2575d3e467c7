use super::CoerceError;

const NANOSECOND: u64 = 1;
const MICROSECOND: u64 = 1_000 * NANOSECOND;
const MILLISECOND: u64 = 1_000 * MICROSECOND;
const SECOND: u64 = 1_000 * MILLISECOND;
const MINUTE: u64 = 60 * SECOND;
const HOUR: u64 = 60 * MINUTE;

/// Magnitude of `i64::MIN`, the largest total a negative duration can reach.
const LIMIT: u64 = 1 << 63;

/// Parses a duration such as `"300ms"`, `"-1.5h"` or `"2h45m"` into signed
/// nanoseconds.
///
/// The input is an optional sign followed by one or more decimal numbers,
/// each with an optional fraction and a unit suffix. Valid units are `ns`,
/// `us` (or `µs`), `ms`, `s`, `m` and `h`. A lone `"0"` needs no unit.
pub fn parse_duration(input: &str) -> Result<i64, CoerceError> {
    let invalid = || CoerceError::InvalidDuration(input.to_string());
    let overflow = || CoerceError::Overflow {
        value: input.to_string(),
        target: "duration",
    };

    let mut s = input;
    let mut negative = false;
    if let Some(rest) = s.strip_prefix('-') {
        negative = true;
        s = rest;
    } else if let Some(rest) = s.strip_prefix('+') {
        s = rest;
    }
    if s == "0" {
        return Ok(0);
    }
    if s.is_empty() {
        return Err(invalid());
    }

    let mut total: u64 = 0;
    while !s.is_empty() {
        let first = s.as_bytes()[0];
        if !(first == b'.' || first.is_ascii_digit()) {
            return Err(invalid());
        }

        let (whole, rest, pre) = leading_int(s).ok_or_else(overflow)?;
        s = rest;

        let mut fraction = 0u64;
        let mut scale = 1f64;
        let mut post = false;
        if let Some(rest) = s.strip_prefix('.') {
            let (f, sc, rest, consumed) = leading_fraction(rest);
            fraction = f;
            scale = sc;
            post = consumed;
            s = rest;
        }
        if !pre && !post {
            return Err(invalid());
        }

        let unit_len = s
            .bytes()
            .position(|b| b == b'.' || b.is_ascii_digit())
            .unwrap_or(s.len());
        if unit_len == 0 {
            return Err(CoerceError::MissingUnit(input.to_string()));
        }
        let (unit, rest) = s.split_at(unit_len);
        s = rest;
        let unit = unit_nanos(unit).ok_or_else(|| CoerceError::UnknownUnit {
            unit: unit.to_string(),
            input: input.to_string(),
        })?;

        if whole > LIMIT / unit {
            return Err(overflow());
        }
        let mut v = whole * unit;
        if fraction > 0 {
            v += (fraction as f64 * (unit as f64 / scale)) as u64;
            if v > LIMIT {
                return Err(overflow());
            }
        }
        total = total.checked_add(v).filter(|t| *t <= LIMIT).ok_or_else(overflow)?;
    }

    if negative {
        return Ok((total as i64).wrapping_neg());
    }
    i64::try_from(total).map_err(|_| overflow())
}

fn unit_nanos(unit: &str) -> Option<u64> {
    Some(match unit {
        "ns" => NANOSECOND,
        "us" | "µs" | "μs" => MICROSECOND,
        "ms" => MILLISECOND,
        "s" => SECOND,
        "m" => MINUTE,
        "h" => HOUR,
        _ => return None,
    })
}

/// Consumes leading digits. Returns `None` when the number exceeds the
/// duration range; the bool reports whether any digit was read.
fn leading_int(s: &str) -> Option<(u64, &str, bool)> {
    let end = s.bytes().position(|b| !b.is_ascii_digit()).unwrap_or(s.len());
    let mut x: u64 = 0;
    for b in s[..end].bytes() {
        x = x.checked_mul(10)?.checked_add(u64::from(b - b'0'))?;
        if x > LIMIT {
            return None;
        }
    }
    Some((x, &s[end..], end > 0))
}

/// Consumes fractional digits. Digits past the precision of `u64` are read
/// but dropped.
fn leading_fraction(s: &str) -> (u64, f64, &str, bool) {
    let end = s.bytes().position(|b| !b.is_ascii_digit()).unwrap_or(s.len());
    let mut x: u64 = 0;
    let mut scale = 1f64;
    let mut saturated = false;
    for b in s[..end].bytes() {
        if saturated {
            continue;
        }
        match x.checked_mul(10).and_then(|y| y.checked_add(u64::from(b - b'0'))) {
            Some(y) if y <= LIMIT => {
                x = y;
                scale *= 10.0;
            }
            _ => saturated = true,
        }
    }
    (x, scale, &s[end..], end > 0)
}
