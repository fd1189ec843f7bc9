//! Forward-only row cursors.
//!
//! [`Cursor`] is the contract an external connection hands back from
//! `execute`; both projectors consume it one row at a time. This module also
//! provides [`MemoryCursor`] (fixtures, drivers that buffer) and
//! [`MaskedCursor`], which hides synthetic columns such as the row number
//! introduced by row-number pagination.

use crate::error::{QsError, QsResult};
use crate::value::Value;
use std::collections::VecDeque;

/// A forward-only, single-pass source of rows.
///
/// `advance` moves to the next row and reports whether one exists. Field
/// accessors refer to the current row; the field count is fixed once the
/// first row has been read.
pub trait Cursor {
    /// Move to the next row. `Ok(false)` means the cursor is exhausted.
    fn advance(&mut self) -> QsResult<bool>;

    /// Number of fields in each row.
    fn field_count(&self) -> usize;

    /// Name of the field at `ordinal`.
    fn name(&self, ordinal: usize) -> &str;

    /// Whether the current row's field at `ordinal` is NULL.
    fn is_null(&self, ordinal: usize) -> bool;

    /// Value of the current row's field at `ordinal`.
    fn value(&self, ordinal: usize) -> QsResult<Value>;
}

impl<C: Cursor + ?Sized> Cursor for Box<C> {
    fn advance(&mut self) -> QsResult<bool> {
        (**self).advance()
    }

    fn field_count(&self) -> usize {
        (**self).field_count()
    }

    fn name(&self, ordinal: usize) -> &str {
        (**self).name(ordinal)
    }

    fn is_null(&self, ordinal: usize) -> bool {
        (**self).is_null(ordinal)
    }

    fn value(&self, ordinal: usize) -> QsResult<Value> {
        (**self).value(ordinal)
    }
}

impl<C: Cursor + ?Sized> Cursor for &mut C {
    fn advance(&mut self) -> QsResult<bool> {
        (**self).advance()
    }

    fn field_count(&self) -> usize {
        (**self).field_count()
    }

    fn name(&self, ordinal: usize) -> &str {
        (**self).name(ordinal)
    }

    fn is_null(&self, ordinal: usize) -> bool {
        (**self).is_null(ordinal)
    }

    fn value(&self, ordinal: usize) -> QsResult<Value> {
        (**self).value(ordinal)
    }
}

/// A cursor over rows held in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryCursor {
    columns: Vec<String>,
    pending: VecDeque<Vec<Value>>,
    current: Option<Vec<Value>>,
}

impl MemoryCursor {
    /// Create a cursor; every row must have one value per column.
    pub fn new<S: Into<String>>(
        columns: impl IntoIterator<Item = S>,
        rows: impl IntoIterator<Item = Vec<Value>>,
    ) -> QsResult<Self> {
        let columns: Vec<String> = columns.into_iter().map(Into::into).collect();
        let pending: VecDeque<Vec<Value>> = rows.into_iter().collect();
        if let Some((i, row)) = pending
            .iter()
            .enumerate()
            .find(|(_, r)| r.len() != columns.len())
        {
            return Err(QsError::validation(format!(
                "MemoryCursor: row {i} has {} values for {} columns",
                row.len(),
                columns.len()
            )));
        }
        Ok(Self {
            columns,
            pending,
            current: None,
        })
    }

    /// Rows not yet read.
    pub fn remaining(&self) -> usize {
        self.pending.len()
    }

    fn current_value(&self, ordinal: usize) -> Option<&Value> {
        self.current.as_ref().and_then(|r| r.get(ordinal))
    }
}

impl Cursor for MemoryCursor {
    fn advance(&mut self) -> QsResult<bool> {
        self.current = self.pending.pop_front();
        Ok(self.current.is_some())
    }

    fn field_count(&self) -> usize {
        self.columns.len()
    }

    fn name(&self, ordinal: usize) -> &str {
        self.columns.get(ordinal).map_or("", String::as_str)
    }

    fn is_null(&self, ordinal: usize) -> bool {
        self.current_value(ordinal).is_none_or(Value::is_null)
    }

    fn value(&self, ordinal: usize) -> QsResult<Value> {
        self.current_value(ordinal).cloned().ok_or_else(|| {
            QsError::projection(format!("no current row or field {ordinal} out of range"))
        })
    }
}

/// Hides named columns of an inner cursor.
///
/// The visible ordinal map is computed on the first successful `advance`,
/// which is when the field layout becomes fixed.
pub struct MaskedCursor<C> {
    inner: C,
    hidden: Vec<String>,
    visible: Option<Vec<usize>>,
}

impl<C: Cursor> MaskedCursor<C> {
    pub fn new(inner: C, hidden: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            inner,
            hidden: hidden.into_iter().map(Into::into).collect(),
            visible: None,
        }
    }

    pub fn into_inner(self) -> C {
        self.inner
    }

    fn layout(&self) -> Vec<usize> {
        (0..self.inner.field_count())
            .filter(|&i| {
                let name = self.inner.name(i);
                !self.hidden.iter().any(|h| h.eq_ignore_ascii_case(name))
            })
            .collect()
    }

    fn map(&self, ordinal: usize) -> usize {
        match &self.visible {
            Some(v) => v.get(ordinal).copied().unwrap_or(usize::MAX),
            None => ordinal,
        }
    }
}

impl<C: Cursor> Cursor for MaskedCursor<C> {
    fn advance(&mut self) -> QsResult<bool> {
        let more = self.inner.advance()?;
        if more && self.visible.is_none() {
            self.visible = Some(self.layout());
        }
        Ok(more)
    }

    fn field_count(&self) -> usize {
        match &self.visible {
            Some(v) => v.len(),
            None => self.layout().len(),
        }
    }

    fn name(&self, ordinal: usize) -> &str {
        match &self.visible {
            Some(v) => v.get(ordinal).map_or("", |&i| self.inner.name(i)),
            None => self.inner.name(ordinal),
        }
    }

    fn is_null(&self, ordinal: usize) -> bool {
        self.inner.is_null(self.map(ordinal))
    }

    fn value(&self, ordinal: usize) -> QsResult<Value> {
        self.inner.value(self.map(ordinal))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixture() -> MemoryCursor {
        MemoryCursor::new(
            ["id", "qs_rownum", "name"],
            vec![
                vec![Value::I32(1), Value::I64(1), Value::from("a")],
                vec![Value::I32(2), Value::I64(2), Value::Null],
            ],
        )
        .unwrap()
    }

    #[test]
    fn memory_cursor_is_forward_only() {
        let mut c = fixture();
        assert!(c.advance().unwrap());
        assert_eq!(c.value(0).unwrap(), Value::I32(1));
        assert!(c.advance().unwrap());
        assert!(c.is_null(2));
        assert!(!c.advance().unwrap());
        assert!(!c.advance().unwrap());
        assert!(c.value(0).is_err());
    }

    #[test]
    fn memory_cursor_rejects_ragged_rows() {
        let err = MemoryCursor::new(["a", "b"], vec![vec![Value::I32(1)]]).unwrap_err();
        assert!(err.to_string().contains("row 0"));
    }

    #[test]
    fn masked_cursor_hides_columns() {
        let mut c = MaskedCursor::new(fixture(), ["QS_ROWNUM"]);
        assert_eq!(c.field_count(), 2);
        assert!(c.advance().unwrap());
        assert_eq!(c.field_count(), 2);
        assert_eq!(c.name(0), "id");
        assert_eq!(c.name(1), "name");
        assert_eq!(c.value(1).unwrap(), Value::from("a"));
        assert!(c.advance().unwrap());
        assert!(c.is_null(1));
    }
}
