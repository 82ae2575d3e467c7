use std::iter::FusedIterator;
use std::marker::PhantomData;

use toml::Table;
use tracing::debug;

use crate::bind::TreeParser;
use crate::{ConfigError, Record};

/// Forward-only cursor over an array of tables.
///
/// Each successful [`bind`](Self::bind) fills a record from the current
/// table and moves to the next one. The cursor borrows its tables from the
/// [`Document`](crate::Document) that created it.
#[derive(Debug, Clone)]
pub struct ArrayCursor<'a> {
    path: String,
    sections: Vec<&'a Table>,
    position: usize,
}

impl<'a> ArrayCursor<'a> {
    pub(crate) fn new(path: &str, sections: Vec<&'a Table>) -> Self {
        Self {
            path: path.to_string(),
            sections,
            position: 0,
        }
    }

    /// Binds `record` against the current table and advances.
    ///
    /// Returns [`ConfigError::EndOfArray`] once every table has been bound,
    /// leaving `record` untouched. A failed bind does not advance.
    pub fn bind<R: Record + ?Sized>(
        &mut self,
        record: &mut R,
        tag_key: Option<&str>,
    ) -> Result<(), ConfigError> {
        let Some(section) = self.sections.get(self.position) else {
            return Err(ConfigError::EndOfArray);
        };
        TreeParser::new(section, tag_key).bind(record)?;
        self.position += 1;
        debug!(path = %self.path, position = self.position, len = self.sections.len(), "bound array element");
        Ok(())
    }

    /// Path of the array this cursor walks.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Index of the next table to bind.
    pub fn position(&self) -> usize {
        self.position
    }

    pub fn len(&self) -> usize {
        self.sections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    pub fn remaining(&self) -> usize {
        self.sections.len() - self.position
    }

    /// Turns the cursor into an iterator of freshly bound records.
    ///
    /// The iterator stops after yielding the first error.
    pub fn records<'k, R: Record + Default>(self, tag_key: Option<&'k str>) -> Records<'a, 'k, R> {
        Records {
            cursor: self,
            tag_key,
            failed: false,
            _record: PhantomData,
        }
    }
}

/// Iterator returned by [`ArrayCursor::records`].
#[derive(Debug)]
pub struct Records<'a, 'k, R> {
    cursor: ArrayCursor<'a>,
    tag_key: Option<&'k str>,
    failed: bool,
    _record: PhantomData<fn() -> R>,
}

impl<R: Record + Default> Iterator for Records<'_, '_, R> {
    type Item = Result<R, ConfigError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        let mut record = R::default();
        match self.cursor.bind(&mut record, self.tag_key) {
            Ok(()) => Some(Ok(record)),
            Err(ConfigError::EndOfArray) => None,
            Err(e) => {
                self.failed = true;
                Some(Err(e))
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        if self.failed {
            (0, Some(0))
        } else {
            (0, Some(self.cursor.remaining()))
        }
    }
}

impl<R: Record + Default> FusedIterator for Records<'_, '_, R> {}
