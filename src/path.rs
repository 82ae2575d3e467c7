//! Dotted key lookup into a parsed document.

use toml::{Table, Value};

use crate::ConfigError;

/// Splits a dotted key path into its segments.
///
/// Segments may be double-quoted to contain dots (`servers."eu.west".port`).
/// An empty path, an empty segment or an unterminated quote is an error.
pub(crate) fn split_path(path: &str) -> Result<Vec<String>, ConfigError> {
    let invalid = || ConfigError::InvalidPath(path.to_string());

    let mut segments = Vec::new();
    let mut current = String::new();
    let mut quoted = false;
    let mut was_quoted = false;

    for ch in path.chars() {
        match ch {
            '"' if quoted => quoted = false,
            '"' if current.is_empty() && !was_quoted => {
                quoted = true;
                was_quoted = true;
            }
            '"' => return Err(invalid()),
            '.' if !quoted => {
                if current.is_empty() && !was_quoted {
                    return Err(invalid());
                }
                segments.push(std::mem::take(&mut current));
                was_quoted = false;
            }
            _ if was_quoted && !quoted => return Err(invalid()),
            _ => current.push(ch),
        }
    }

    if quoted || (current.is_empty() && !was_quoted) {
        return Err(invalid());
    }
    segments.push(current);
    Ok(segments)
}

/// Looks up a dotted path in the table.
///
/// Returns `Ok(None)` when any segment is missing. Passing through an array
/// of tables continues into its last element.
pub(crate) fn lookup<'t>(root: &'t Table, path: &str) -> Result<Option<&'t Value>, ConfigError> {
    let segments = split_path(path)?;
    let (first, rest) = match segments.split_first() {
        Some(parts) => parts,
        None => return Err(ConfigError::InvalidPath(path.to_string())),
    };

    let mut current = match root.get(first) {
        Some(value) => value,
        None => return Ok(None),
    };
    for part in rest {
        let table = match current {
            Value::Table(t) => t,
            Value::Array(items) => match items.last() {
                Some(Value::Table(t)) => t,
                _ => return Ok(None),
            },
            _ => return Ok(None),
        };
        current = match table.get(part) {
            Some(value) => value,
            None => return Ok(None),
        };
    }
    Ok(Some(current))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_table(toml_str: &str) -> Table {
        toml::from_str(toml_str).unwrap()
    }

    #[test]
    fn test_split_plain_and_quoted() {
        assert_eq!(split_path("a.b.c").unwrap(), vec!["a", "b", "c"]);
        assert_eq!(split_path(r#"a."b.c".d"#).unwrap(), vec!["a", "b.c", "d"]);
        assert_eq!(split_path(r#""""#).unwrap(), vec![""]);
    }

    #[test]
    fn test_split_rejects_malformed() {
        for bad in ["", ".", "a.", ".a", "a..b", r#""a"#, r#"a"b""#, r#""a"b"#] {
            assert!(
                matches!(split_path(bad), Err(ConfigError::InvalidPath(_))),
                "{bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_lookup_nested() {
        let table = make_table(
            r#"
            [server]
            host = "example.com"

            [server."eu.west"]
            port = 8080
            "#,
        );
        assert_eq!(
            lookup(&table, "server.host").unwrap(),
            Some(&Value::String("example.com".into()))
        );
        assert_eq!(
            lookup(&table, r#"server."eu.west".port"#).unwrap(),
            Some(&Value::Integer(8080))
        );
        assert_eq!(lookup(&table, "server.missing").unwrap(), None);
        assert_eq!(lookup(&table, "server.host.deeper").unwrap(), None);
    }

    #[test]
    fn test_lookup_descends_into_last_array_element() {
        let table = make_table(
            r#"
            [[data]]
            val = 0

            [[data]]
            val = 1
            "#,
        );
        assert_eq!(lookup(&table, "data.val").unwrap(), Some(&Value::Integer(1)));
    }
}
