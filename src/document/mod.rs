//! Reusable parsed documents.

mod cursor;
mod file;

use std::path::{Path, PathBuf};
use std::str::FromStr;

use toml::{Table, Value};
use tracing::debug;

use crate::bind::TreeParser;
use crate::path::lookup;
use crate::{ConfigError, Record};

pub use cursor::{ArrayCursor, Records};
pub(crate) use file::load_config_file;

/// A parsed TOML document that can be bound against any number of records.
///
/// ## Example
///
/// ```no_run
/// use confbind::Document;
///
/// confbind::record! {
///     #[derive(Default)]
///     struct Listener {
///         addr: String => { conf = "addr,required" },
///     }
/// }
///
/// let doc = Document::open("config.toml")?;
/// if let Some(listeners) = doc.array("listener")? {
///     for listener in listeners.records::<Listener>(None) {
///         println!("listening on {}", listener?.addr);
///     }
/// }
/// # Ok::<(), confbind::ConfigError>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct Document {
    tree: Table,
    source: Option<PathBuf>,
}

impl Document {
    /// Parses the TOML file at `path`.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if path.as_os_str().is_empty() {
            return Err(ConfigError::EmptyPath);
        }
        Ok(Self {
            tree: load_config_file(path)?,
            source: Some(path.to_path_buf()),
        })
    }

    pub fn from_table(tree: Table) -> Self {
        Self { tree, source: None }
    }

    pub fn tree(&self) -> &Table {
        &self.tree
    }

    /// The file this document was read from, if any.
    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    /// Looks up a dotted key path.
    pub fn get(&self, path: &str) -> Result<Option<&Value>, ConfigError> {
        lookup(&self.tree, path)
    }

    /// Binds `record` against the whole document.
    pub fn bind<R: Record + ?Sized>(
        &self,
        record: &mut R,
        tag_key: Option<&str>,
    ) -> Result<(), ConfigError> {
        TreeParser::new(&self.tree, tag_key).bind(record)
    }

    /// Opens a cursor over the array of tables at `path`.
    ///
    /// Returns `Ok(None)` when nothing is stored at `path`, and
    /// [`ConfigError::NotAnArray`] when something other than an array of
    /// tables is.
    pub fn array(&self, path: &str) -> Result<Option<ArrayCursor<'_>>, ConfigError> {
        let Some(value) = lookup(&self.tree, path)? else {
            debug!(path, "array not found");
            return Ok(None);
        };
        let not_an_array = || ConfigError::NotAnArray {
            path: path.to_string(),
            found: value.type_str(),
        };

        let Value::Array(items) = value else {
            return Err(not_an_array());
        };
        let sections = items
            .iter()
            .map(|item| item.as_table().ok_or_else(not_an_array))
            .collect::<Result<Vec<_>, _>>()?;

        debug!(path, len = sections.len(), "opened array cursor");
        Ok(Some(ArrayCursor::new(path, sections)))
    }
}

impl FromStr for Document {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from_table(toml::from_str(s)?))
    }
}

impl From<Table> for Document {
    fn from(tree: Table) -> Self {
        Self::from_table(tree)
    }
}

/// Binding through a handle that may not exist.
///
/// An absent [`Document`] binds nothing and succeeds, so optional sections
/// need no special casing. An absent [`ArrayCursor`] reports
/// [`ConfigError::EndOfArray`] right away.
pub trait OptionalBind {
    fn bind<R: Record + ?Sized>(
        &mut self,
        record: &mut R,
        tag_key: Option<&str>,
    ) -> Result<(), ConfigError>;
}

impl OptionalBind for Option<&Document> {
    fn bind<R: Record + ?Sized>(
        &mut self,
        record: &mut R,
        tag_key: Option<&str>,
    ) -> Result<(), ConfigError> {
        match self {
            Some(doc) => doc.bind(record, tag_key),
            None => Ok(()),
        }
    }
}

impl OptionalBind for Option<Document> {
    fn bind<R: Record + ?Sized>(
        &mut self,
        record: &mut R,
        tag_key: Option<&str>,
    ) -> Result<(), ConfigError> {
        self.as_ref().bind(record, tag_key)
    }
}

impl OptionalBind for Option<ArrayCursor<'_>> {
    fn bind<R: Record + ?Sized>(
        &mut self,
        record: &mut R,
        tag_key: Option<&str>,
    ) -> Result<(), ConfigError> {
        match self {
            Some(cursor) => cursor.bind(record, tag_key),
            None => Err(ConfigError::EndOfArray),
        }
    }
}
