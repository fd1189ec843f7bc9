//! Per-dialect SQL generation for query-set layers.

use super::layer::{Layer, Source};
use crate::dialect::Dialect;
use crate::error::{QsError, QsResult};
use crate::ident::quote_ansi;
use crate::sql::{PlaceholderStyle, Sql, SqlFragment};

/// Ordering used when an engine needs an `ORDER BY` but none was requested.
const NATURAL_ORDER: &str = "(SELECT 0)";

/// `LIMIT` placed in front of an `OFFSET` when no take is buffered; engines
/// of the default dialect reject a bare `OFFSET`.
const UNBOUNDED_LIMIT: i64 = i64::MAX;

/// A compiled query-set statement.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledQuery {
    sql: Sql,
    hidden_columns: Vec<String>,
}

impl CompiledQuery {
    /// The statement buffer (text plus bound parameters).
    pub fn sql(&self) -> &Sql {
        &self.sql
    }

    /// Synthetic columns the statement returns that callers must not see.
    pub fn hidden_columns(&self) -> &[String] {
        &self.hidden_columns
    }

    /// Render with `$n` placeholders.
    pub fn to_sql(&self) -> String {
        self.sql.to_sql()
    }

    pub fn render(&self, style: PlaceholderStyle) -> String {
        self.sql.render(style)
    }

    pub fn into_parts(self) -> (Sql, Vec<String>) {
        (self.sql, self.hidden_columns)
    }
}

pub(crate) struct Compiler<'a> {
    dialect: Dialect,
    quote: &'a dyn Fn(&str) -> String,
    out: Sql,
    hidden: Vec<String>,
    error: Option<QsError>,
}

impl<'a> Compiler<'a> {
    pub(crate) fn new(dialect: Dialect, quote: &'a dyn Fn(&str) -> String) -> Self {
        Self {
            dialect,
            quote,
            out: Sql::empty(),
            hidden: Vec::new(),
            error: None,
        }
    }

    pub(crate) fn ansi(dialect: Dialect) -> Compiler<'static> {
        Compiler::new(dialect, &quote_ansi)
    }

    pub(crate) fn select(mut self, layer: &Layer) -> QsResult<CompiledQuery> {
        self.layer(layer, false);
        self.finish()
    }

    /// `SELECT COUNT(*)` over the layer. An ordering that does not select a
    /// page does not change the count and is left out.
    pub(crate) fn count(mut self, layer: &Layer) -> QsResult<CompiledQuery> {
        let mut counted = layer.clone();
        if !counted.buffer.is_paged() {
            counted.buffer.order_by = None;
        }
        self.out.push("SELECT COUNT(*) FROM (");
        self.layer(&counted, true);
        self.out.push(&format!(") qs_set{}", layer.alias + 1));
        self.finish()
    }

    fn finish(self) -> QsResult<CompiledQuery> {
        if let Some(err) = self.error {
            return Err(err);
        }
        #[cfg(feature = "tracing")]
        tracing::trace!(
            target: "qset",
            dialect = %self.dialect,
            sql = %self.out.to_sql(),
            params = self.out.param_count(),
            "compiled query set"
        );

        Ok(CompiledQuery {
            sql: self.out,
            hidden_columns: self.hidden,
        })
    }

    /// Emit one layer. Returns whether its output still carries synthetic
    /// row-number columns.
    fn layer(&mut self, layer: &Layer, nested: bool) -> bool {
        match self.dialect {
            Dialect::Default => self.limit_offset(layer),
            Dialect::WindowedTop => self.windowed(layer, nested),
            Dialect::RowNumberEmulation if layer.buffer.is_paged() => self.row_number(layer),
            Dialect::RowNumberEmulation => self.plain(layer),
        }
    }

    fn limit_offset(&mut self, layer: &Layer) -> bool {
        let exposed = self.plain(layer);
        let limit = match (layer.buffer.take, layer.buffer.skip) {
            (Some(take), _) => Some(take.to_string()),
            (None, Some(_)) => Some(UNBOUNDED_LIMIT.to_string()),
            (None, None) => None,
        };
        if let Some(limit) = limit {
            self.out.push(&format!(" LIMIT {limit}"));
        }
        if let Some(skip) = layer.buffer.skip {
            self.out.push(&format!(" OFFSET {skip}"));
        }
        exposed
    }

    fn windowed(&mut self, layer: &Layer, nested: bool) -> bool {
        let b = &layer.buffer;
        match (b.skip, b.take) {
            // FETCH NEXT needs a positive count; an empty page is TOP (0).
            (_, Some(take @ 0)) | (None, Some(take)) => {
                self.out.push(&format!("SELECT TOP ({take}) "));
                self.projection(layer);
                let exposed = self.from_where(layer);
                self.order_by(b.order_by.as_ref());
                exposed && layer.columns.is_none()
            }
            (Some(skip), take) => {
                self.out.push("SELECT ");
                self.projection(layer);
                let exposed = self.from_where(layer);
                self.out.push(" ORDER BY ");
                self.fragment_or(b.order_by.as_ref(), NATURAL_ORDER);
                self.out.push(&format!(" OFFSET {skip} ROWS"));
                if let Some(take) = take {
                    self.out.push(&format!(" FETCH NEXT {take} ROWS ONLY"));
                }
                exposed && layer.columns.is_none()
            }
            (None, None) => {
                let exposed = self.plain(layer);
                // A sub-query may only carry ORDER BY together with paging.
                if nested && b.order_by.is_some() {
                    self.out.push(" OFFSET 0 ROWS");
                }
                exposed
            }
        }
    }

    fn row_number(&mut self, layer: &Layer) -> bool {
        let b = &layer.buffer;
        let n = layer.alias;
        let rownum = format!("qs_rownum{n}");

        self.out.push("SELECT ");
        let names = layer.output_names();
        match &names {
            Some(names) => self.out.push(&names.join(", ")),
            None => {
                self.hidden.push(rownum.clone());
                self.out.push("*")
            }
        };
        self.out.push(" FROM (SELECT ");
        match &layer.columns {
            Some(columns) => self.out.push(&columns.sql),
            None => {
                let source = self.source_ref(layer);
                self.out.push(&format!("{source}.*"))
            }
        };
        self.out.push(", ROW_NUMBER() OVER (ORDER BY ");
        self.fragment_or(b.order_by.as_ref(), NATURAL_ORDER);
        self.out.push(&format!(") AS {rownum}"));
        self.from_where(layer);

        let skip = b.skip.unwrap_or(0);
        let bound = match b.take {
            Some(take) => format!(
                "BETWEEN {} AND {}",
                skip.saturating_add(1),
                skip.saturating_add(take)
            ),
            None => format!("> {skip}"),
        };
        self.out.push(&format!(
            ") qs_page{n} WHERE {rownum} {bound} ORDER BY {rownum}"
        ));
        names.is_none()
    }

    /// `SELECT cols FROM src [WHERE] [ORDER BY]`.
    fn plain(&mut self, layer: &Layer) -> bool {
        self.out.push("SELECT ");
        self.projection(layer);
        let exposed = self.from_where(layer);
        self.order_by(layer.buffer.order_by.as_ref());
        exposed && layer.columns.is_none()
    }

    fn projection(&mut self, layer: &Layer) {
        match &layer.columns {
            Some(columns) => self.out.push(&columns.sql),
            None => self.out.push("*"),
        };
    }

    /// Returns whether the source exposes synthetic columns.
    fn from_where(&mut self, layer: &Layer) -> bool {
        self.out.push(" FROM ");
        let exposed = self.source(layer);
        if let Some(filter) = &layer.buffer.where_ {
            self.out.push(" WHERE ").push_fragment(filter);
        }
        exposed
    }

    fn order_by(&mut self, order: Option<&SqlFragment>) {
        if let Some(order) = order {
            self.out.push(" ORDER BY ").push_fragment(order);
        }
    }

    fn fragment_or(&mut self, fragment: Option<&SqlFragment>, fallback: &str) {
        match fragment {
            Some(f) => self.out.push_fragment(f),
            None => self.out.push(fallback),
        };
    }

    /// How columns of the layer's source are qualified.
    fn source_ref(&self, layer: &Layer) -> String {
        match &layer.source {
            Source::Table(ident) => ident.render(self.quote),
            _ => format!("qs_set{}", layer.alias),
        }
    }

    fn source(&mut self, layer: &Layer) -> bool {
        let n = layer.alias;
        match &layer.source {
            Source::Table(ident) => {
                let table = ident.render(self.quote);
                self.out.push(&table);
                false
            }
            Source::Raw(fragment) => {
                self.out.push("(").push_fragment(fragment);
                self.out.push(&format!(") qs_set{n}"));
                false
            }
            Source::Query(inner) => {
                self.out.push("(");
                let exposed = self.layer(inner, true);
                self.out.push(&format!(") qs_set{n}"));
                exposed
            }
            Source::Union { left, right, all } => {
                self.out.push("(SELECT * FROM (");
                self.operand(left);
                self.out.push(&format!(") qs_set{} UNION ", n - 2));
                if *all {
                    self.out.push("ALL ");
                }
                self.out.push("SELECT * FROM (");
                self.operand(right);
                self.out.push(&format!(") qs_set{}) qs_set{n}", n - 1));
                false
            }
        }
    }

    /// A union operand must expose exactly its own columns: a row number
    /// would break both column alignment and duplicate elimination.
    fn operand(&mut self, layer: &Layer) {
        if self.layer(layer, true) && self.error.is_none() {
            self.error = Some(QsError::validation(format!(
                "union operand qs_set{} is paged with row numbers but its columns are \
                 unknown; select explicit columns before the union",
                layer.alias
            )));
        }
    }
}
