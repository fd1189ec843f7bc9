//! Connection abstraction.
//!
//! A [`Connection`] is the external collaborator that turns a compiled
//! [`Statement`] into a forward-only [`Cursor`]. Query sets only ever see this
//! trait, so any driver (or a test double) can sit behind it.

use crate::cursor::Cursor;
use crate::dialect::Dialect;
use crate::error::QsResult;
use crate::ident::quote_ansi;
use crate::sql::{PlaceholderStyle, Sql};
use crate::value::Value;
use std::any::TypeId;
use std::fmt;
use std::hash::{Hash, Hasher};

/// Identity of a connection implementation, used as the dialect cache key.
#[derive(Clone, Copy)]
pub struct ConnectionKind {
    id: TypeId,
    name: &'static str,
}

impl ConnectionKind {
    /// The kind of connection type `C`.
    pub fn of<C: ?Sized + 'static>() -> Self {
        Self {
            id: TypeId::of::<C>(),
            name: std::any::type_name::<C>(),
        }
    }

    /// Rust type name of the implementation.
    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl PartialEq for ConnectionKind {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for ConnectionKind {}

impl Hash for ConnectionKind {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for ConnectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// A rendered statement ready for a driver.
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    pub text: String,
    pub params: Vec<Value>,
}

impl Statement {
    pub fn new(text: impl Into<String>, params: Vec<Value>) -> Self {
        Self {
            text: text.into(),
            params,
        }
    }
}

/// A source of cursors for compiled statements.
///
/// Implementors provide [`kind`](Connection::kind),
/// [`provider_name`](Connection::provider_name) and
/// [`execute`](Connection::execute); the remaining methods have defaults that
/// suit ANSI engines with `$n` placeholders.
pub trait Connection {
    /// Identity of this implementation; dialects are cached per kind.
    fn kind(&self) -> ConnectionKind;

    /// Engine name, e.g. `"postgres"`, `"sqlserver"`, `"oracle"`.
    fn provider_name(&self) -> &str;

    /// Pagination dialect of the engine.
    fn dialect(&self) -> QsResult<Dialect> {
        Dialect::from_provider(self.provider_name())
    }

    /// Placeholder spelling used by [`compile`](Connection::compile).
    fn placeholder_style(&self) -> PlaceholderStyle {
        PlaceholderStyle::Dollar
    }

    /// Quote one identifier part.
    fn quote_identifier(&self, name: &str) -> String {
        quote_ansi(name)
    }

    /// Render a statement buffer for this engine.
    fn compile(&self, sql: &Sql) -> Statement {
        Statement::new(sql.render(self.placeholder_style()), sql.params().to_vec())
    }

    /// Execute a statement and return a cursor over its rows.
    fn execute(&self, statement: &Statement) -> QsResult<Box<dyn Cursor + '_>>;
}

impl<C: Connection + ?Sized> Connection for &C {
    fn kind(&self) -> ConnectionKind {
        (**self).kind()
    }

    fn provider_name(&self) -> &str {
        (**self).provider_name()
    }

    fn dialect(&self) -> QsResult<Dialect> {
        (**self).dialect()
    }

    fn placeholder_style(&self) -> PlaceholderStyle {
        (**self).placeholder_style()
    }

    fn quote_identifier(&self, name: &str) -> String {
        (**self).quote_identifier(name)
    }

    fn compile(&self, sql: &Sql) -> Statement {
        (**self).compile(sql)
    }

    fn execute(&self, statement: &Statement) -> QsResult<Box<dyn Cursor + '_>> {
        (**self).execute(statement)
    }
}
