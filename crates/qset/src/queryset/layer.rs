use super::buffer::{Buffer, BufferedOp};
use crate::entity::ColumnMeta;
use crate::ident::{Ident, IdentPart};
use crate::sql::SqlFragment;
use std::sync::Arc;

/// What a layer selects from.
#[derive(Debug, Clone)]
pub(crate) enum Source {
    Table(Ident),
    Raw(SqlFragment),
    Query(Arc<Layer>),
    Union {
        left: Arc<Layer>,
        right: Arc<Layer>,
        all: bool,
    },
}

/// An explicit projection list.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Columns {
    pub(crate) sql: String,
    /// Output column names, when every item has a recognizable name.
    pub(crate) names: Option<Vec<String>>,
}

impl Columns {
    pub(crate) fn from_list(columns: &[&str]) -> Self {
        let names = columns
            .iter()
            .map(|c| output_name(c))
            .collect::<Option<Vec<_>>>();
        Self {
            sql: columns.join(", "),
            names,
        }
    }

    pub(crate) fn from_entity(columns: &[ColumnMeta]) -> Self {
        let sql = columns
            .iter()
            .map(|c| {
                if c.is_renamed() {
                    format!("{} AS {}", c.storage_name, c.logical_name)
                } else {
                    c.storage_name.to_string()
                }
            })
            .collect::<Vec<_>>()
            .join(", ");
        Self {
            sql,
            names: Some(columns.iter().map(|c| c.logical_name.to_string()).collect()),
        }
    }
}

/// Name a select item is exposed under: its `AS` alias, or the last part of
/// a plain unquoted column reference.
fn output_name(item: &str) -> Option<String> {
    let item = item.trim();
    let lower = item.to_ascii_lowercase();
    let name = match lower.rfind(" as ") {
        Some(pos) => item[pos + 4..].trim(),
        None => item,
    };
    let ident = Ident::parse(name).ok()?;
    match ident.parts().last()? {
        IdentPart::Unquoted(s) => Some(s.clone()),
        IdentPart::Quoted(_) => None,
    }
}

/// One level of a query set: a source, an optional projection and the
/// operations buffered on top of it.
#[derive(Debug, Clone)]
pub(crate) struct Layer {
    pub(crate) source: Source,
    pub(crate) columns: Option<Columns>,
    pub(crate) buffer: Buffer,
    /// Alias number of this level; strictly greater than every nested level.
    pub(crate) alias: u32,
}

impl Layer {
    pub(crate) fn new(source: Source) -> Self {
        Self {
            source,
            columns: None,
            buffer: Buffer::default(),
            alias: 0,
        }
    }

    /// A fresh layer selecting everything from `inner`.
    pub(crate) fn wrap(inner: &Arc<Layer>) -> Self {
        Self {
            source: Source::Query(Arc::clone(inner)),
            columns: None,
            buffer: Buffer::default(),
            alias: inner.alias + 1,
        }
    }

    /// Union of two layers. The operands take the two aliases just below
    /// the union's own.
    pub(crate) fn union(left: &Arc<Layer>, right: &Arc<Layer>, all: bool) -> Self {
        Self {
            source: Source::Union {
                left: Arc::clone(left),
                right: Arc::clone(right),
                all,
            },
            columns: None,
            buffer: Buffer::default(),
            alias: left.alias.max(right.alias) + 3,
        }
    }

    /// A sealed layer accepts no further buffered operations.
    pub(crate) fn is_sealed(&self) -> bool {
        self.columns.is_some() || matches!(self.source, Source::Union { .. })
    }

    /// Apply an operation, wrapping first when the precedence rules require it.
    pub(crate) fn push(self: &Arc<Self>, op: BufferedOp) -> Arc<Layer> {
        let mut next = if self.is_sealed() || self.buffer.needs_wrap(op.kind()) {
            Layer::wrap(self)
        } else {
            (**self).clone()
        };
        next.buffer.apply(op);
        Arc::new(next)
    }

    /// Replace the projection, compiling any buffered operation into a
    /// sub-query first.
    pub(crate) fn project(self: &Arc<Self>, columns: Columns) -> Arc<Layer> {
        let mut next = if self.is_sealed() || !self.buffer.is_empty() {
            Layer::wrap(self)
        } else {
            (**self).clone()
        };
        next.columns = Some(columns);
        Arc::new(next)
    }

    /// Output column names, if statically known.
    pub(crate) fn output_names(&self) -> Option<Vec<String>> {
        if let Some(columns) = &self.columns {
            return columns.names.clone();
        }
        match &self.source {
            Source::Query(inner) => inner.output_names(),
            Source::Union { left, .. } => left.output_names(),
            Source::Table(_) | Source::Raw(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn output_names_of_select_items() {
        assert_eq!(output_name("id").as_deref(), Some("id"));
        assert_eq!(output_name("u.name").as_deref(), Some("name"));
        assert_eq!(output_name("COUNT(*) AS total").as_deref(), Some("total"));
        assert_eq!(output_name("price * qty as amount").as_deref(), Some("amount"));
        assert_eq!(output_name("price * qty"), None);
        assert_eq!(output_name(r#""Weird Name""#), None);
    }

    #[test]
    fn unknown_item_hides_all_names() {
        let cols = Columns::from_list(&["id", "a + b"]);
        assert_eq!(cols.sql, "id, a + b");
        assert_eq!(cols.names, None);
    }

    #[test]
    fn entity_columns_alias_renamed_fields() {
        const COLS: [ColumnMeta; 2] = [
            ColumnMeta::new("id", "id"),
            ColumnMeta::new("user_name", "name"),
        ];
        let cols = Columns::from_entity(&COLS);
        assert_eq!(cols.sql, "id, user_name AS name");
        assert_eq!(cols.names, Some(vec!["id".to_string(), "name".to_string()]));
    }

    #[test]
    fn wrapping_increments_alias() {
        let base = Arc::new(Layer::new(Source::Table(Ident::parse("t").unwrap())));
        let paged = base.push(BufferedOp::Take(5));
        assert_eq!(paged.alias, 0);
        let filtered = paged.push(BufferedOp::Where(SqlFragment::raw("a = 1")));
        assert_eq!(filtered.alias, 1);
        let u = Arc::new(Layer::union(&base, &filtered, true));
        assert_eq!(u.alias, 4);
        assert!(u.is_sealed());
        assert_eq!(u.push(BufferedOp::Take(1)).alias, 5);
    }
}
