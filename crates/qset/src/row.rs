//! Row records and row mapping traits

use crate::cursor::Cursor;
use crate::error::{QsError, QsResult};
use crate::value::{FromValue, Value};
use std::sync::Arc;

/// An owned row: ordered column names plus one value per column.
///
/// Rows produced by one enumeration share the same column list.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    columns: Arc<[String]>,
    values: Vec<Value>,
}

impl Row {
    /// Build a row from parallel column/value lists.
    pub fn new(columns: Arc<[String]>, values: Vec<Value>) -> QsResult<Self> {
        if columns.len() != values.len() {
            return Err(QsError::validation(format!(
                "Row: {} columns but {} values",
                columns.len(),
                values.len()
            )));
        }
        Ok(Self { columns, values })
    }

    /// Snapshot the cursor's current row.
    pub fn read(cursor: &dyn Cursor, columns: &Arc<[String]>) -> QsResult<Self> {
        let values = (0..columns.len())
            .map(|i| cursor.value(i))
            .collect::<QsResult<Vec<_>>>()?;
        Ok(Self {
            columns: Arc::clone(columns),
            values,
        })
    }

    /// Column names of the cursor, in ordinal order.
    pub fn column_names(cursor: &dyn Cursor) -> Arc<[String]> {
        (0..cursor.field_count())
            .map(|i| cursor.name(i).to_string())
            .collect::<Vec<_>>()
            .into()
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Ordinal of a column (ASCII case-insensitive, first match).
    pub fn index_of(&self, column: &str) -> Option<usize> {
        self.columns
            .iter()
            .position(|c| c == column)
            .or_else(|| self.columns.iter().position(|c| c.eq_ignore_ascii_case(column)))
    }

    /// Raw value of a column, if present.
    pub fn value(&self, column: &str) -> Option<&Value> {
        self.index_of(column).map(|i| &self.values[i])
    }

    /// Typed value of a column, returning `QsError::Decode` on failure.
    pub fn get<T: FromValue>(&self, column: &str) -> QsResult<T> {
        let value = self
            .value(column)
            .ok_or_else(|| QsError::decode(column, "no such column"))?;
        T::from_value(value).map_err(|e| with_column(e, column))
    }

    /// Typed value by ordinal.
    pub fn get_idx<T: FromValue>(&self, ordinal: usize) -> QsResult<T> {
        let value = self.values.get(ordinal).ok_or_else(|| {
            QsError::decode(ordinal.to_string(), "ordinal out of range")
        })?;
        let column = self.columns[ordinal].as_str();
        T::from_value(value).map_err(|e| with_column(e, column))
    }

    /// Typed value of a column; `Ok(None)` if the column is absent.
    pub fn try_get<T: FromValue>(&self, column: &str) -> QsResult<Option<T>> {
        match self.value(column) {
            Some(v) => T::from_value(v).map(Some).map_err(|e| with_column(e, column)),
            None => Ok(None),
        }
    }
}

fn with_column(err: QsError, column: &str) -> QsError {
    match err {
        QsError::Decode { message, .. } => QsError::decode(column, message),
        other => other,
    }
}

/// Trait for converting a row into a Rust value.
///
/// This trait should typically be derived using `#[derive(FromRow)]`
/// from the `qset-derive` crate.
///
/// # Example
///
/// ```ignore
/// use qset::FromRow;
///
/// #[derive(FromRow)]
/// struct User {
///     id: i64,
///     username: String,
///     #[qset(column = "email_address")]
///     email: Option<String>,
/// }
/// ```
pub trait FromRow: Sized {
    /// Convert a row into Self
    fn from_row(row: &Row) -> QsResult<Self>;
}

impl FromRow for Row {
    fn from_row(row: &Row) -> QsResult<Self> {
        Ok(row.clone())
    }
}

// Single-column results (`SELECT COUNT(*)`, `SELECT name`) map from ordinal 0.
macro_rules! impl_from_row_scalar {
    ($($ty:ty),* $(,)?) => {
        $(
            impl FromRow for $ty {
                fn from_row(row: &Row) -> QsResult<Self> {
                    row.get_idx(0)
                }
            }
        )*
    };
}

impl_from_row_scalar!(
    bool,
    i16,
    i32,
    i64,
    f32,
    f64,
    String,
    Value,
    rust_decimal::Decimal,
    uuid::Uuid,
    chrono::NaiveDate,
    chrono::NaiveDateTime,
    chrono::DateTime<chrono::Utc>,
    serde_json::Value,
);

macro_rules! impl_from_row_tuple {
    ($($name:ident : $idx:tt),+) => {
        impl<$($name: FromValue),+> FromRow for ($($name,)+) {
            fn from_row(row: &Row) -> QsResult<Self> {
                Ok(($(row.get_idx::<$name>($idx)?,)+))
            }
        }
    };
}

impl_from_row_tuple!(A: 0);
impl_from_row_tuple!(A: 0, B: 1);
impl_from_row_tuple!(A: 0, B: 1, C: 2);
impl_from_row_tuple!(A: 0, B: 1, C: 2, D: 3);
impl_from_row_tuple!(A: 0, B: 1, C: 2, D: 3, E: 4);
impl_from_row_tuple!(A: 0, B: 1, C: 2, D: 3, E: 4, F: 5);
