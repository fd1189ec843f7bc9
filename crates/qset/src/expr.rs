//! Typed boolean predicates for `QuerySet::where_expr`.
//!
//! `Expr` supports AND/OR/NOT grouping, comparisons, IN lists, BETWEEN,
//! NULL checks, `?` templates and raw text. [`Expr::to_fragment`] turns the
//! tree into a [`SqlFragment`], so it is buffered exactly like a hand-written
//! filter and numbered only when the statement is compiled.

use crate::sql::{Segment, SqlFragment};
use crate::value::Value;

/// Expression node for building WHERE clauses.
#[derive(Clone, Debug, PartialEq)]
pub enum Expr {
    /// AND group: all conditions must be true.
    And(Vec<Expr>),

    /// OR group: at least one condition must be true.
    Or(Vec<Expr>),

    /// NOT: negate the inner expression.
    Not(Box<Expr>),

    /// Simple comparison: column op value
    Compare {
        column: String,
        op: &'static str,
        value: Value,
    },

    /// NULL check: column IS NULL or column IS NOT NULL
    NullCheck { column: String, is_null: bool },

    /// IN list: column IN (...) or column NOT IN (...)
    InList {
        column: String,
        values: Vec<Value>,
        negated: bool,
    },

    /// BETWEEN: column BETWEEN a AND b
    Between {
        column: String,
        from: Value,
        to: Value,
        negated: bool,
    },

    /// Template with `?` placeholders bound in order.
    Template { sql: String, params: Vec<Value> },

    /// Raw SQL fragment without parameters.
    Raw(String),

    /// Always true (used for empty NOT IN lists).
    True,

    /// Always false (used for empty IN lists).
    False,
}

macro_rules! compare_ctor {
    ($($(#[$doc:meta])* $name:ident => $op:literal),* $(,)?) => {
        $(
            $(#[$doc])*
            pub fn $name(column: impl Into<String>, value: impl Into<Value>) -> Self {
                Expr::Compare {
                    column: column.into(),
                    op: $op,
                    value: value.into(),
                }
            }
        )*
    };
}

impl Expr {
    /// Create an AND expression from a list of expressions.
    pub fn and(exprs: Vec<Expr>) -> Self {
        Expr::And(exprs)
    }

    /// Create an OR expression from a list of expressions.
    pub fn or(exprs: Vec<Expr>) -> Self {
        Expr::Or(exprs)
    }

    /// Create a NOT expression.
    #[allow(clippy::should_implement_trait)]
    pub fn not(expr: Expr) -> Self {
        Expr::Not(Box::new(expr))
    }

    compare_ctor! {
        /// column = value
        eq => "=",
        /// column <> value
        ne => "<>",
        /// column > value
        gt => ">",
        /// column >= value
        gte => ">=",
        /// column < value
        lt => "<",
        /// column <= value
        lte => "<=",
        /// column LIKE pattern
        like => "LIKE",
        /// column NOT LIKE pattern
        not_like => "NOT LIKE",
    }

    /// column IS NULL
    pub fn is_null(column: impl Into<String>) -> Self {
        Expr::NullCheck {
            column: column.into(),
            is_null: true,
        }
    }

    /// column IS NOT NULL
    pub fn is_not_null(column: impl Into<String>) -> Self {
        Expr::NullCheck {
            column: column.into(),
            is_null: false,
        }
    }

    /// column IN (values...); an empty list never matches.
    pub fn in_list<V: Into<Value>>(column: impl Into<String>, values: impl IntoIterator<Item = V>) -> Self {
        let values: Vec<Value> = values.into_iter().map(Into::into).collect();
        if values.is_empty() {
            return Expr::False;
        }
        Expr::InList {
            column: column.into(),
            values,
            negated: false,
        }
    }

    /// column NOT IN (values...); an empty list always matches.
    pub fn not_in<V: Into<Value>>(column: impl Into<String>, values: impl IntoIterator<Item = V>) -> Self {
        let values: Vec<Value> = values.into_iter().map(Into::into).collect();
        if values.is_empty() {
            return Expr::True;
        }
        Expr::InList {
            column: column.into(),
            values,
            negated: true,
        }
    }

    /// column BETWEEN from AND to
    pub fn between(column: impl Into<String>, from: impl Into<Value>, to: impl Into<Value>) -> Self {
        Expr::Between {
            column: column.into(),
            from: from.into(),
            to: to.into(),
            negated: false,
        }
    }

    /// column NOT BETWEEN from AND to
    pub fn not_between(column: impl Into<String>, from: impl Into<Value>, to: impl Into<Value>) -> Self {
        Expr::Between {
            column: column.into(),
            from: from.into(),
            to: to.into(),
            negated: true,
        }
    }

    /// Template with `?` placeholders.
    ///
    /// ```ignore
    /// Expr::template("a = ? OR b = ?", [1, 2])
    /// ```
    pub fn template<V: Into<Value>>(sql: impl Into<String>, values: impl IntoIterator<Item = V>) -> Self {
        Expr::Template {
            sql: sql.into(),
            params: values.into_iter().map(Into::into).collect(),
        }
    }

    /// Raw SQL fragment.
    pub fn raw(sql: impl Into<String>) -> Self {
        Expr::Raw(sql.into())
    }

    /// Check if this expression is empty (contains no conditions).
    pub fn is_empty(&self) -> bool {
        match self {
            Expr::And(exprs) | Expr::Or(exprs) => exprs.iter().all(|e| e.is_empty()),
            Expr::Not(inner) => inner.is_empty(),
            _ => false,
        }
    }

    /// Compile into a deferred fragment. An empty expression yields `1=1`.
    pub fn to_fragment(&self) -> SqlFragment {
        let mut out = FragmentWriter::default();
        if self.is_empty() {
            out.text("1=1");
        } else {
            self.write(&mut out);
        }
        SqlFragment::from_segments(out.segments, out.args)
    }

    fn write(&self, out: &mut FragmentWriter) {
        match self {
            Expr::And(exprs) => write_group(exprs, " AND ", |e| matches!(e, Expr::Or(_)), out),
            Expr::Or(exprs) => write_group(exprs, " OR ", |e| matches!(e, Expr::And(_)), out),
            Expr::Not(inner) => {
                if inner.is_empty() {
                    return;
                }
                out.text("NOT (");
                inner.write(out);
                out.text(")");
            }
            Expr::Compare { column, op, value } => {
                out.text(&format!("{column} {op} "));
                out.arg(value.clone());
            }
            Expr::NullCheck { column, is_null } => {
                let check = if *is_null { "IS NULL" } else { "IS NOT NULL" };
                out.text(&format!("{column} {check}"));
            }
            Expr::InList {
                column,
                values,
                negated,
            } => {
                let op = if *negated { "NOT IN" } else { "IN" };
                out.text(&format!("{column} {op} ("));
                for (i, v) in values.iter().enumerate() {
                    if i > 0 {
                        out.text(", ");
                    }
                    out.arg(v.clone());
                }
                out.text(")");
            }
            Expr::Between {
                column,
                from,
                to,
                negated,
            } => {
                let op = if *negated { "NOT BETWEEN" } else { "BETWEEN" };
                out.text(&format!("{column} {op} "));
                out.arg(from.clone());
                out.text(" AND ");
                out.arg(to.clone());
            }
            Expr::Template { sql, params } => {
                let mut next = params.iter();
                let mut buf = String::new();
                for ch in sql.chars() {
                    if ch == '?' {
                        if let Some(v) = next.next() {
                            out.text(&std::mem::take(&mut buf));
                            out.arg(v.clone());
                            continue;
                        }
                    }
                    buf.push(ch);
                }
                out.text(&buf);
            }
            Expr::Raw(sql) => out.text(sql),
            Expr::True => out.text("1=1"),
            Expr::False => out.text("1=0"),
        }
    }
}

fn write_group(
    exprs: &[Expr],
    sep: &str,
    needs_parens: impl Fn(&Expr) -> bool,
    out: &mut FragmentWriter,
) {
    let mut first = true;
    for e in exprs.iter().filter(|e| !e.is_empty()) {
        if !first {
            out.text(sep);
        }
        first = false;
        let wrap = needs_parens(e);
        if wrap {
            out.text("(");
        }
        e.write(out);
        if wrap {
            out.text(")");
        }
    }
}

#[derive(Default)]
struct FragmentWriter {
    segments: Vec<Segment>,
    args: Vec<Value>,
}

impl FragmentWriter {
    fn text(&mut self, s: &str) {
        if s.is_empty() {
            return;
        }
        match self.segments.last_mut() {
            Some(Segment::Text(last)) => last.push_str(s),
            _ => self.segments.push(Segment::Text(s.to_string())),
        }
    }

    fn arg(&mut self, value: Value) {
        self.segments.push(Segment::Arg(self.args.len()));
        self.args.push(value);
    }
}

impl From<Expr> for SqlFragment {
    fn from(expr: Expr) -> Self {
        expr.to_fragment()
    }
}
