#![allow(dead_code)]

use qset::document::text::value_text;
use qset::{
    Connection, ConnectionKind, Cursor, Dialect, MemoryCursor, PlaceholderStyle, QsError,
    QsResult, Statement, Value,
};
use rusqlite::types::{Value as SqliteValue, ValueRef};
use std::cell::RefCell;
use std::marker::PhantomData;

/// Pagination dialect a [`Sqlite`] connection claims to speak.
pub trait Mode: 'static {
    const DIALECT: Dialect;
}

pub struct Limit;
impl Mode for Limit {
    const DIALECT: Dialect = Dialect::Default;
}

/// SQLite has window functions, so it can run the row-number emulation too.
pub struct RowNumber;
impl Mode for RowNumber {
    const DIALECT: Dialect = Dialect::RowNumberEmulation;
}

/// In-memory SQLite behind the `Connection` trait. Results are buffered into
/// a `MemoryCursor`.
pub struct Sqlite<M = Limit> {
    conn: rusqlite::Connection,
    pub executed: RefCell<Vec<String>>,
    _mode: PhantomData<M>,
}

impl<M: Mode> Sqlite<M> {
    pub fn open(setup: &str) -> Self {
        let conn = rusqlite::Connection::open_in_memory().unwrap();
        conn.execute_batch(setup).unwrap();
        Self {
            conn,
            executed: RefCell::new(Vec::new()),
            _mode: PhantomData,
        }
    }

    pub fn last_sql(&self) -> String {
        self.executed.borrow().last().cloned().unwrap_or_default()
    }
}

fn to_sqlite(value: &Value) -> SqliteValue {
    match value {
        Value::Null => SqliteValue::Null,
        Value::Bool(b) => SqliteValue::Integer(i64::from(*b)),
        Value::I16(n) => SqliteValue::Integer(i64::from(*n)),
        Value::I32(n) => SqliteValue::Integer(i64::from(*n)),
        Value::I64(n) => SqliteValue::Integer(*n),
        Value::F32(n) => SqliteValue::Real(f64::from(*n)),
        Value::F64(n) => SqliteValue::Real(*n),
        Value::Bytes(b) => SqliteValue::Blob(b.to_vec()),
        other => SqliteValue::Text(value_text(other)),
    }
}

fn from_sqlite(value: ValueRef<'_>) -> Value {
    match value {
        ValueRef::Null => Value::Null,
        ValueRef::Integer(n) => Value::I64(n),
        ValueRef::Real(n) => Value::F64(n),
        ValueRef::Text(t) => Value::Text(String::from_utf8_lossy(t).into_owned()),
        ValueRef::Blob(b) => Value::from(b),
    }
}

fn source(err: rusqlite::Error) -> QsError {
    QsError::source_failure(err.to_string())
}

impl<M: Mode> Connection for Sqlite<M> {
    fn kind(&self) -> ConnectionKind {
        ConnectionKind::of::<Self>()
    }

    fn provider_name(&self) -> &str {
        "sqlite"
    }

    fn dialect(&self) -> QsResult<Dialect> {
        Ok(M::DIALECT)
    }

    fn placeholder_style(&self) -> PlaceholderStyle {
        PlaceholderStyle::Question
    }

    fn execute(&self, statement: &Statement) -> QsResult<Box<dyn Cursor + '_>> {
        self.executed.borrow_mut().push(statement.text.clone());
        let mut stmt = self.conn.prepare(&statement.text).map_err(source)?;
        let columns: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();
        let width = columns.len();

        let params = rusqlite::params_from_iter(statement.params.iter().map(to_sqlite));
        let mut rows = stmt.query(params).map_err(source)?;
        let mut buffered = Vec::new();
        while let Some(row) = rows.next().map_err(source)? {
            let mut values = Vec::with_capacity(width);
            for i in 0..width {
                values.push(from_sqlite(row.get_ref(i).map_err(source)?));
            }
            buffered.push(values);
        }
        Ok(Box::new(MemoryCursor::new(columns, buffered)?))
    }
}

/// Ten people, ids 1..=10, ages 21..=30, `name` = "p{id}".
pub const PEOPLE: &str = "
    CREATE TABLE people (id INTEGER PRIMARY KEY, name TEXT NOT NULL, age INTEGER, city TEXT);
    WITH RECURSIVE n(i) AS (SELECT 1 UNION ALL SELECT i + 1 FROM n WHERE i < 10)
    INSERT INTO people (id, name, age, city)
    SELECT i, 'p' || i, 20 + i, CASE WHEN i % 2 = 0 THEN 'Oslo' ELSE NULL END FROM n;
";
