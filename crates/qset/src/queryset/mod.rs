//! Immutable, buffered query sets.
//!
//! A [`QuerySet`] describes a relational query plus the filter, ordering and
//! paging operations stacked on top of it. Every combinator returns a new
//! value; nothing touches a connection until a materializer (`to_vec`,
//! `first`, `count`, `to_document`, ...) runs. At that point the buffered
//! operations are compiled into one statement for the connection's
//! [`Dialect`].
//!
//! # Example
//!
//! ```ignore
//! use qset::{QuerySet, Value};
//!
//! let page = QuerySet::table("users")
//!     .filter("status = {0}", ["active"])
//!     .order_by("created_at DESC")
//!     .skip(20)
//!     .take(10);
//!
//! let rows = page.to_vec(&conn)?;
//! let total = QuerySet::table("users").count(&conn)?;
//! ```
//!
//! Operations that cannot share a level with what is already buffered (a
//! filter after a page, any operation after `select`) close the current level
//! into a sub-query; see [`buffer::RULES`].

pub mod buffer;
mod compile;
mod iter;
mod layer;


pub use compile::CompiledQuery;
pub use iter::{Projection, RowIter};

use crate::connection::Connection;
use crate::cursor::{Cursor, MaskedCursor};
use crate::dialect::{Dialect, DialectCache};
use crate::document::{DocumentOptions, DocumentReader};
use crate::entity::Entity;
use crate::error::{QsError, QsResult};
use crate::expr::Expr;
use crate::ident::{Ident, IntoIdent};
use crate::row::{FromRow, Row};
use crate::sql::SqlFragment;
use crate::value::{FromValue, Value};
use buffer::BufferedOp;
use compile::Compiler;
use layer::{Columns, Layer, Source};
use std::fmt;
use std::sync::Arc;

/// An immutable, composable query.
///
/// `T` is the type rows are projected into; untyped query sets yield
/// [`Row`]. Cloning is cheap: levels are shared behind `Arc`.
pub struct QuerySet<T = Row> {
    layer: Arc<Layer>,
    projection: Projection<T>,
    /// First invalid combinator argument; reported when the set is compiled.
    build_error: Option<String>,
}

impl<T> Clone for QuerySet<T> {
    fn clone(&self) -> Self {
        Self {
            layer: Arc::clone(&self.layer),
            projection: self.projection.clone(),
            build_error: self.build_error.clone(),
        }
    }
}

impl<T> fmt::Debug for QuerySet<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QuerySet")
            .field("layer", &self.layer)
            .field("build_error", &self.build_error)
            .finish()
    }
}

impl QuerySet<Row> {
    /// All rows of a table (`schema.table` and quoted parts allowed).
    pub fn table(name: impl IntoIdent) -> Self {
        match name.into_ident() {
            Ok(ident) => Self::from_layer(Layer::new(Source::Table(ident))),
            Err(e) => Self::from_layer(Layer::new(Source::Raw(SqlFragment::raw("")))).defer(e),
        }
    }

    /// Rows of an arbitrary statement, used as a derived table.
    pub fn from_sql(sql: impl Into<SqlFragment>) -> Self {
        Self::from_layer(Layer::new(Source::Raw(sql.into())))
    }

    fn from_layer(layer: Layer) -> Self {
        Self {
            layer: Arc::new(layer),
            projection: Projection::from_row(),
            build_error: None,
        }
    }
}

impl<E: Entity + FromRow + 'static> QuerySet<E> {
    /// The persistent columns of an entity's table, storage names aliased to
    /// field names where they differ.
    pub fn entity() -> Self {
        let mut build_error = None;
        let source = match Ident::parse(E::table_name()) {
            Ok(ident) => Source::Table(ident),
            Err(e) => {
                build_error = Some(deferred_message(e));
                Source::Raw(SqlFragment::raw(""))
            }
        };
        let mut layer = Layer::new(source);
        let columns = E::persistent_columns();
        if !columns.is_empty() {
            layer.columns = Some(Columns::from_entity(columns));
        }
        Self {
            layer: Arc::new(layer),
            projection: Projection::from_row(),
            build_error,
        }
    }
}

impl<T> QuerySet<T> {
    fn with_layer(&self, layer: Arc<Layer>) -> Self {
        Self {
            layer,
            projection: self.projection.clone(),
            build_error: self.build_error.clone(),
        }
    }

    fn with_projection<R>(&self, layer: Arc<Layer>, projection: Projection<R>) -> QuerySet<R> {
        QuerySet {
            layer,
            projection,
            build_error: self.build_error.clone(),
        }
    }

    fn defer(mut self, err: QsError) -> Self {
        if self.build_error.is_none() {
            self.build_error = Some(deferred_message(err));
        }
        self
    }

    fn push(&self, op: BufferedOp) -> Self {
        self.with_layer(self.layer.push(op))
    }

    fn check(&self) -> QsResult<()> {
        match &self.build_error {
            Some(msg) => Err(QsError::Validation(msg.clone())),
            None => Ok(()),
        }
    }

    // ==================== Filtering & ordering ====================

    /// Keep rows matching a predicate template.
    ///
    /// `{0}`, `{1}`, ... refer to `args` by position.
    pub fn filter<V: Into<Value>>(&self, format: &str, args: impl IntoIterator<Item = V>) -> Self {
        match SqlFragment::new(format, args) {
            Ok(f) => self.filter_fragment(f),
            Err(e) => self.clone().defer(e),
        }
    }

    /// Keep rows matching a raw predicate (no parameters, braces literal).
    pub fn filter_raw(&self, predicate: &str) -> Self {
        self.filter_fragment(SqlFragment::raw(predicate))
    }

    pub fn filter_fragment(&self, predicate: SqlFragment) -> Self {
        if predicate.is_blank() {
            return self.clone();
        }
        self.push(BufferedOp::Where(predicate))
    }

    /// Keep rows matching a typed expression.
    pub fn where_expr(&self, expr: Expr) -> Self {
        if expr.is_empty() {
            return self.clone();
        }
        self.filter_fragment(expr.to_fragment())
    }

    /// Sort by the given `ORDER BY` list, replacing any buffered ordering.
    pub fn order_by(&self, columns: &str) -> Self {
        self.order_by_fragment(SqlFragment::raw(columns))
    }

    /// Sort by a parameterized `ORDER BY` template.
    pub fn order_by_with<V: Into<Value>>(
        &self,
        format: &str,
        args: impl IntoIterator<Item = V>,
    ) -> Self {
        match SqlFragment::new(format, args) {
            Ok(f) => self.order_by_fragment(f),
            Err(e) => self.clone().defer(e),
        }
    }

    pub fn order_by_fragment(&self, columns: SqlFragment) -> Self {
        if columns.is_blank() {
            return self.clone().defer(QsError::validation("order_by requires a column list"));
        }
        self.push(BufferedOp::OrderBy(columns))
    }

    // ==================== Paging ====================

    /// Bypass the first `n` rows.
    pub fn skip(&self, n: u64) -> Self {
        self.push(BufferedOp::Skip(n))
    }

    /// Return at most `n` rows.
    pub fn take(&self, n: u64) -> Self {
        self.push(BufferedOp::Take(n))
    }

    // ==================== Projection ====================

    /// Project onto a column list and map rows through `R::from_row`.
    pub fn select<R: FromRow + 'static>(&self, columns: &[&str]) -> QuerySet<R> {
        self.select_with(columns, Projection::from_row())
    }

    /// Project onto a column list and map rows with a closure.
    pub fn select_map<R, F>(&self, columns: &[&str], f: F) -> QuerySet<R>
    where
        F: Fn(&Row) -> QsResult<R> + Send + Sync + 'static,
    {
        self.select_with(columns, Projection::new(f))
    }

    fn select_with<R>(&self, columns: &[&str], projection: Projection<R>) -> QuerySet<R> {
        if columns.iter().all(|c| c.trim().is_empty()) {
            let set = self.with_projection(Arc::clone(&self.layer), projection);
            return set.defer(QsError::validation("select requires at least one column"));
        }
        let layer = self.layer.project(Columns::from_list(columns));
        self.with_projection(layer, projection)
    }

    /// Reinterpret the rows as `R`.
    ///
    /// Buffered operations are compiled into a sub-query first; a set with
    /// nothing buffered keeps its level.
    pub fn cast<R: FromRow + 'static>(&self) -> QuerySet<R> {
        let layer = if self.layer.buffer.is_empty() {
            Arc::clone(&self.layer)
        } else {
            Arc::new(Layer::wrap(&self.layer))
        };
        self.with_projection(layer, Projection::from_row())
    }

    // ==================== Set operations ====================

    /// Distinct rows of both sets (`UNION`).
    pub fn union(&self, other: &QuerySet<T>) -> Self {
        self.combine(other, false)
    }

    /// All rows of both sets (`UNION ALL`).
    pub fn union_all(&self, other: &QuerySet<T>) -> Self {
        self.combine(other, true)
    }

    fn combine(&self, other: &QuerySet<T>, all: bool) -> Self {
        let layer = Arc::new(Layer::union(&self.layer, &other.layer, all));
        let mut set = self.with_layer(layer);
        if set.build_error.is_none() {
            set.build_error = other.build_error.clone();
        }
        set
    }

    // ==================== Compilation ====================

    /// Compile for a connection, using its dialect and identifier quoting.
    pub fn compile<C: Connection + ?Sized>(&self, conn: &C) -> QsResult<CompiledQuery> {
        self.compile_with(conn, &self.layer, |c, layer| c.select(layer))
    }

    /// Compile for a dialect with ANSI identifier quoting.
    pub fn compile_for(&self, dialect: Dialect) -> QsResult<CompiledQuery> {
        self.check()?;
        Compiler::ansi(dialect).select(&self.layer)
    }

    /// Compile the `COUNT(*)` statement for a dialect.
    pub fn compile_count_for(&self, dialect: Dialect) -> QsResult<CompiledQuery> {
        self.check()?;
        Compiler::ansi(dialect).count(&self.layer)
    }

    fn compile_with<C: Connection + ?Sized>(
        &self,
        conn: &C,
        layer: &Layer,
        f: impl FnOnce(Compiler<'_>, &Layer) -> QsResult<CompiledQuery>,
    ) -> QsResult<CompiledQuery> {
        self.check()?;
        let dialect = DialectCache::global().resolve(conn)?;
        let quote = |name: &str| conn.quote_identifier(name);
        f(Compiler::new(dialect, &quote), layer)
    }

    fn open<'c, C: Connection + ?Sized>(
        &self,
        conn: &'c C,
        layer: &Layer,
    ) -> QsResult<Box<dyn Cursor + 'c>> {
        let compiled = self.compile_with(conn, layer, |c, layer| c.select(layer))?;
        execute(conn, compiled)
    }

    // ==================== Materializers ====================

    /// Number of rows in the set.
    pub fn count<C: Connection + ?Sized>(&self, conn: &C) -> QsResult<u64> {
        let compiled = self.compile_with(conn, &self.layer, |c, layer| c.count(layer))?;
        let mut cursor = execute(conn, compiled)?;
        if !cursor.advance()? {
            return Err(QsError::source_failure("COUNT(*) returned no row"));
        }
        let n = i64::from_value(&cursor.value(0)?)?;
        u64::try_from(n).map_err(|_| QsError::decode("COUNT(*)", format!("negative count {n}")))
    }

    /// Whether the set has at least one row.
    pub fn any<C: Connection + ?Sized>(&self, conn: &C) -> QsResult<bool> {
        let layer = self.layer.push(BufferedOp::Take(1));
        let mut cursor = self.open(conn, &layer)?;
        cursor.advance()
    }

    /// Lazily project every row.
    pub fn iter<'c, C: Connection + ?Sized>(&self, conn: &'c C) -> QsResult<RowIter<'c, T>> {
        let cursor = self.open(conn, &self.layer)?;
        Ok(RowIter::new(cursor, self.projection.clone()))
    }

    /// Project every row into a vector.
    pub fn to_vec<C: Connection + ?Sized>(&self, conn: &C) -> QsResult<Vec<T>> {
        self.iter(conn)?.collect()
    }

    /// The first row, or `None` for an empty set.
    pub fn first_or_default<C: Connection + ?Sized>(&self, conn: &C) -> QsResult<Option<T>> {
        let layer = self.layer.push(BufferedOp::Take(1));
        let cursor = self.open(conn, &layer)?;
        RowIter::new(cursor, self.projection.clone()).next().transpose()
    }

    /// The first row; `NotFound` for an empty set.
    pub fn first<C: Connection + ?Sized>(&self, conn: &C) -> QsResult<T> {
        self.first_or_default(conn)?
            .ok_or_else(|| QsError::not_found("query set returned no rows"))
    }

    /// The only row, or `None` for an empty set; `TooManyRows` if more than
    /// one row matches.
    pub fn single_or_default<C: Connection + ?Sized>(&self, conn: &C) -> QsResult<Option<T>> {
        let layer = self.layer.push(BufferedOp::Take(2));
        let cursor = self.open(conn, &layer)?;
        let mut rows = RowIter::new(cursor, self.projection.clone());
        let Some(first) = rows.next().transpose()? else {
            return Ok(None);
        };
        if rows.next().transpose()?.is_some() {
            return Err(QsError::too_many_rows(1, 2));
        }
        Ok(Some(first))
    }

    /// The only row; `NotFound` for an empty set, `TooManyRows` if more than
    /// one row matches.
    pub fn single<C: Connection + ?Sized>(&self, conn: &C) -> QsResult<T> {
        self.single_or_default(conn)?
            .ok_or_else(|| QsError::not_found("query set returned no rows"))
    }

    /// Project the rows as a lazily produced document tree.
    pub fn to_document<'c, C: Connection + ?Sized>(
        &self,
        conn: &'c C,
        options: DocumentOptions,
    ) -> QsResult<DocumentReader<Box<dyn Cursor + 'c>>> {
        let cursor = self.open(conn, &self.layer)?;
        Ok(DocumentReader::new(cursor, options))
    }
}

fn execute<'c, C: Connection + ?Sized>(
    conn: &'c C,
    compiled: CompiledQuery,
) -> QsResult<Box<dyn Cursor + 'c>> {
    let (sql, hidden) = compiled.into_parts();
    sql.validate()?;
    let statement = conn.compile(&sql);
    let cursor = conn.execute(&statement)?;
    if hidden.is_empty() {
        Ok(cursor)
    } else {
        Ok(Box::new(MaskedCursor::new(cursor, hidden)))
    }
}

fn deferred_message(err: QsError) -> String {
    match err {
        QsError::Validation(msg) => msg,
        other => other.to_string(),
    }
}
