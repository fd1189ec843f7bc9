use crate::cursor::Cursor;
use crate::error::QsResult;
use crate::row::{FromRow, Row};
use std::fmt;
use std::iter::FusedIterator;
use std::sync::Arc;

/// Maps an untyped row into the query set's result type.
pub struct Projection<T>(Arc<dyn Fn(&Row) -> QsResult<T> + Send + Sync>);

impl<T> Projection<T> {
    pub fn new(f: impl Fn(&Row) -> QsResult<T> + Send + Sync + 'static) -> Self {
        Self(Arc::new(f))
    }

    pub fn apply(&self, row: &Row) -> QsResult<T> {
        (self.0)(row)
    }
}

impl<T: FromRow + 'static> Projection<T> {
    /// Projection through the type's [`FromRow`] impl.
    pub fn from_row() -> Self {
        Self(Arc::new(T::from_row))
    }
}

impl<T> Clone for Projection<T> {
    fn clone(&self) -> Self {
        Self(Arc::clone(&self.0))
    }
}

impl<T> fmt::Debug for Projection<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Projection")
    }
}

/// Lazily maps cursor rows to `T`, one row per `next()`.
///
/// The iterator is fused: after the first error it yields `None`.
pub struct RowIter<'c, T> {
    cursor: Box<dyn Cursor + 'c>,
    columns: Option<Arc<[String]>>,
    projection: Projection<T>,
    done: bool,
}

impl<'c, T> RowIter<'c, T> {
    pub fn new(cursor: Box<dyn Cursor + 'c>, projection: Projection<T>) -> Self {
        Self {
            cursor,
            columns: None,
            projection,
            done: false,
        }
    }

    /// Column names, once the first row has been read.
    pub fn columns(&self) -> Option<&[String]> {
        self.columns.as_deref()
    }

    fn read(&mut self) -> QsResult<Option<T>> {
        if !self.cursor.advance()? {
            return Ok(None);
        }
        let cursor = &*self.cursor;
        let columns = self
            .columns
            .get_or_insert_with(|| Row::column_names(cursor));
        let row = Row::read(cursor, columns)?;
        self.projection.apply(&row).map(Some)
    }
}

impl<T> Iterator for RowIter<'_, T> {
    type Item = QsResult<T>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.read() {
            Ok(Some(item)) => Some(Ok(item)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}

impl<T> FusedIterator for RowIter<'_, T> {}

impl<T> fmt::Debug for RowIter<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RowIter")
            .field("columns", &self.columns)
            .field("done", &self.done)
            .finish()
    }
}
