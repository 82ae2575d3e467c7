//! The binding pass: walks a record's fields and fills them from a table.

use std::path::Path;

use chrono::Utc;
use toml::{Table, Value};
use tracing::trace;

use crate::coerce;
use crate::document::load_config_file;
use crate::path::lookup;
use crate::record::{DurationSlot, OutOfRange, Record, Slot, TimeSlot};
use crate::tag::FieldTag;
use crate::{ConfigError, TAG_NAME};

/// Binds one record against one table in a single pass.
///
/// Fields are visited in declaration order and the first failure aborts the
/// pass. Fields already written before the failure keep their new values.
#[derive(Debug, Clone, Copy)]
pub(crate) struct TreeParser<'t> {
    tag_key: &'t str,
    tree: &'t Table,
}

impl<'t> TreeParser<'t> {
    pub(crate) fn new(tree: &'t Table, tag_key: Option<&'t str>) -> Self {
        Self {
            tag_key: tag_key.filter(|k| !k.is_empty()).unwrap_or(TAG_NAME),
            tree,
        }
    }

    pub(crate) fn bind<R: Record + ?Sized>(&self, record: &mut R) -> Result<(), ConfigError> {
        for field in record.fields() {
            let Some(tag) = FieldTag::resolve(&field, self.tag_key)? else {
                continue;
            };

            let Some(raw) = lookup(self.tree, tag.path())? else {
                if tag.is_required() {
                    return Err(ConfigError::MissingField(tag.path().to_string()));
                }
                trace!(field = field.name(), path = tag.path(), "skipping absent field");
                continue;
            };

            let name = field.name();
            assign(name, field.into_slot(), raw, &tag)?;
            trace!(field = name, path = tag.path(), "bound field");
        }
        Ok(())
    }
}

fn assign(field: &'static str, slot: Slot<'_>, raw: &Value, tag: &FieldTag) -> Result<(), ConfigError> {
    let coerce_err = |source| ConfigError::Coerce {
        path: tag.path().to_string(),
        source,
    };
    let range_err = |OutOfRange(ty), value: String| ConfigError::OutOfRange {
        path: tag.path().to_string(),
        ty,
        value,
    };

    match slot {
        Slot::Bool(target) => *target = coerce::to_bool(raw).map_err(coerce_err)?,
        Slot::Int(target) => {
            let value = coerce::to_i64(raw).map_err(coerce_err)?;
            target.set(value).map_err(|e| range_err(e, value.to_string()))?;
        }
        Slot::Uint(target) => {
            let value = coerce::to_u64(raw).map_err(coerce_err)?;
            target.set(value).map_err(|e| range_err(e, value.to_string()))?;
        }
        Slot::Float(target) => {
            let value = coerce::to_f64(raw).map_err(coerce_err)?;
            target.set(value).map_err(|e| range_err(e, value.to_string()))?;
        }
        Slot::Str(target) => *target = coerce::to_string(raw).map_err(coerce_err)?,
        Slot::StrSeq(target) => {
            let values = coerce::to_string_seq(raw).map_err(coerce_err)?;
            if tag.is_required() && values.is_empty() {
                return Err(ConfigError::MissingField(tag.path().to_string()));
            }
            *target = values;
        }
        Slot::Duration(target) => {
            let delta = coerce::to_duration(raw).map_err(coerce_err)?;
            match target {
                DurationSlot::Std(target) => {
                    *target = delta.to_std().map_err(|_| {
                        coerce_err(coerce::CoerceError::NegativeDuration(delta.to_string()))
                    })?;
                }
                DurationSlot::Delta(target) => *target = delta,
            }
        }
        Slot::Time(target) => {
            let time = coerce::to_time(raw).map_err(coerce_err)?;
            match target {
                TimeSlot::Fixed(target) => *target = time,
                TimeSlot::Utc(target) => *target = time.with_timezone(&Utc),
            }
        }
        Slot::Unsupported(ty) => return Err(ConfigError::UnsupportedType { field, ty }),
    }
    Ok(())
}

/// Parses the TOML file at `path` and binds `record` against it.
///
/// `tag_key` selects which annotation each field is read from; `None` uses
/// [`TAG_NAME`].
pub fn bind_file<R: Record + ?Sized>(
    record: &mut R,
    path: impl AsRef<Path>,
    tag_key: Option<&str>,
) -> Result<(), ConfigError> {
    let path = path.as_ref();
    if path.as_os_str().is_empty() {
        return Err(ConfigError::EmptyPath);
    }
    let tree = load_config_file(path)?;
    bind_tree(record, &tree, tag_key)
}

/// Binds `record` against an already parsed table.
pub fn bind_tree<R: Record + ?Sized>(
    record: &mut R,
    tree: &Table,
    tag_key: Option<&str>,
) -> Result<(), ConfigError> {
    TreeParser::new(tree, tag_key).bind(record)
}

/// Parses TOML text and binds `record` against it.
pub fn bind_str<R: Record + ?Sized>(
    record: &mut R,
    text: &str,
    tag_key: Option<&str>,
) -> Result<(), ConfigError> {
    let tree: Table = toml::from_str(text)?;
    bind_tree(record, &tree, tag_key)
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::io::Write;
    use std::time::Duration;

    use chrono::{DateTime, TimeDelta};
    use tempfile::NamedTempFile;

    use super::*;
    use crate::coerce::CoerceError;
    use crate::record::Field;

    crate::record! {
        #[derive(Debug, Default, PartialEq)]
        struct Server {
            host: String => { conf = "server.host,required" },
            port: u16 => { conf = "server.port", alt = "listen.port" },
            debug: bool => { conf = "server.debug" },
            ratio: f32 => { conf = "server.ratio" },
            retries: i32 => { conf = "server.retries" },
            timeout: Duration => { conf = "server.timeout" },
            skew: TimeDelta => { conf = "server.skew" },
            started: DateTime<Utc> => { conf = "server.started" },
            aliases: Vec<String> => { conf = "server.aliases" },
            notes: String,
        }
    }

    const SERVER: &str = r#"
        [server]
        host = "db.internal"
        port = "8080"
        debug = 1
        ratio = 0.25
        retries = -3
        timeout = "1500ms"
        skew = "-2s"
        started = 2024-03-01T10:20:30Z
        aliases = ["db", "primary"]

        [listen]
        port = 9090
    "#;

    #[test]
    fn test_binds_every_kind() {
        let mut server = Server::default();
        bind_str(&mut server, SERVER, None).unwrap();

        assert_eq!(server.host, "db.internal");
        assert_eq!(server.port, 8080);
        assert!(server.debug);
        assert_eq!(server.ratio, 0.25);
        assert_eq!(server.retries, -3);
        assert_eq!(server.timeout, Duration::from_nanos(1_500_000_000));
        assert_eq!(server.skew, TimeDelta::seconds(-2));
        assert_eq!(server.started.to_rfc3339(), "2024-03-01T10:20:30+00:00");
        assert_eq!(server.aliases, ["db", "primary"]);
        assert_eq!(server.notes, "");
    }

    #[test]
    fn test_alternate_tag_key() {
        let mut server = Server::default();
        bind_str(&mut server, SERVER, Some("alt")).unwrap();

        assert_eq!(server.port, 9090);
        assert_eq!(server.host, "");

        let mut fallback = Server::default();
        bind_str(&mut fallback, SERVER, Some("")).unwrap();
        assert_eq!(fallback.port, 8080);
    }

    #[test]
    fn test_untagged_record_is_untouched() {
        #[derive(Debug, PartialEq)]
        struct Plain {
            a: u32,
            b: String,
        }
        impl Record for Plain {
            fn fields(&mut self) -> Vec<Field<'_>> {
                vec![Field::new("a", &mut self.a), Field::new("b", &mut self.b)]
            }
        }

        let mut plain = Plain { a: 7, b: "keep".into() };
        bind_str(&mut plain, "a = 1\nb = \"x\"", None).unwrap();
        assert_eq!(plain, Plain { a: 7, b: "keep".into() });
    }

    #[test]
    fn test_missing_required_names_path() {
        let mut server = Server::default();
        let err = bind_str(&mut server, "[server]\nport = 1", None).unwrap_err();
        assert!(matches!(&err, ConfigError::MissingField(p) if p == "server.host"));
        assert_eq!(err.to_string(), "field server.host must be set");
    }

    #[test]
    fn test_required_empty_sequence_is_missing() {
        crate::record! {
            #[derive(Default)]
            struct Peers {
                peers: Vec<String> => { conf = "cluster.peers,required" },
            }
        }

        let mut peers = Peers::default();
        let err = bind_str(&mut peers, "[cluster]\npeers = []", None).unwrap_err();
        assert!(matches!(&err, ConfigError::MissingField(p) if p == "cluster.peers"));

        let err = bind_str(&mut peers, "[cluster]\npeers = \"  \"", None).unwrap_err();
        assert!(matches!(err, ConfigError::MissingField(_)));

        bind_str(&mut peers, "[cluster]\npeers = \"a b\"", None).unwrap();
        assert_eq!(peers.peers, ["a", "b"]);
    }

    #[test]
    fn test_first_error_aborts_after_partial_writes() {
        let mut server = Server::default();
        let err = bind_str(
            &mut server,
            "[server]\nhost = \"h\"\nport = 80\ndebug = \"maybe\"\nratio = 2.0",
            None,
        )
        .unwrap_err();

        assert!(matches!(
            &err,
            ConfigError::Coerce { path, source: CoerceError::Incompatible { .. } }
                if path == "server.debug"
        ));
        assert_eq!(server.host, "h");
        assert_eq!(server.port, 80);
        assert_eq!(server.ratio, 0.0);
    }

    #[test]
    fn test_out_of_range_integer() {
        let mut server = Server::default();
        let err = bind_str(&mut server, "[server]\nhost = \"h\"\nport = 70000", None).unwrap_err();
        match err {
            ConfigError::OutOfRange { path, ty, value } => {
                assert_eq!(path, "server.port");
                assert_eq!(ty, "u16");
                assert_eq!(value, "70000");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_negative_std_duration_rejected() {
        let mut server = Server::default();
        let err = bind_str(&mut server, "[server]\nhost = \"h\"\ntimeout = \"-1s\"", None)
            .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Coerce { source: CoerceError::NegativeDuration(_), .. }
        ));
    }

    #[test]
    fn test_unsupported_type_names_type() {
        #[derive(Default)]
        struct Labels {
            labels: HashMap<String, String>,
        }
        impl Record for Labels {
            fn fields(&mut self) -> Vec<Field<'_>> {
                vec![Field::new("labels", &mut self.labels).tag("conf", "labels")]
            }
        }

        let mut labels = Labels::default();
        let err = bind_str(&mut labels, "[labels]\na = \"b\"", None).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::UnsupportedType { field: "labels", ty: "HashMap<String, String>" }
        ));

        bind_str(&mut labels, "other = 1", None).unwrap();
    }

    #[test]
    fn test_malformed_tag_aborts() {
        crate::record! {
            #[derive(Default)]
            struct Broken {
                level: String => { conf = "log.level,unrequired" },
            }
        }

        let err = bind_str(&mut Broken::default(), "", None).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidTag { ref token, .. } if token == "unrequired"));
    }

    #[test]
    fn test_bind_file_reads_and_binds() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{SERVER}").unwrap();

        let mut server = Server::default();
        bind_file(&mut server, file.path(), None).unwrap();
        assert_eq!(server.host, "db.internal");
    }

    #[test]
    fn test_bind_file_errors() {
        let mut server = Server::default();
        assert!(matches!(
            bind_file(&mut server, "", None),
            Err(ConfigError::EmptyPath)
        ));
        assert!(matches!(
            bind_file(&mut server, "/nonexistent/path/config.toml", None),
            Err(ConfigError::FileNotFound(_))
        ));

        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[server").unwrap();
        assert!(matches!(
            bind_file(&mut server, file.path(), None),
            Err(ConfigError::ParseError { .. })
        ));
    }
}
