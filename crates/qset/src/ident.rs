//! Table and column identifiers.
//!
//! [`Ident`] checks a dotted name (`schema.table`) once, when a query set is
//! created, so compiled statements never splice unchecked text into `FROM`.
//! Unquoted parts (`[A-Za-z_][A-Za-z0-9_$]*`) are emitted as written and keep
//! the engine's case folding; `"quoted"` parts may hold anything but NUL and
//! are re-quoted by the target connection.
//!
//! ```ignore
//! use qset::Ident;
//!
//! let t = Ident::parse("public.users")?;
//! let c = Ident::parse(r#"dbo."Order Lines""#)?;
//! ```

use crate::error::{QsError, QsResult};
use std::fmt;
use std::iter::Peekable;
use std::str::Chars;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdentPart {
    Unquoted(String),
    /// Text between double quotes, with `""` already unescaped.
    Quoted(String),
}

impl IdentPart {
    pub fn as_str(&self) -> &str {
        match self {
            IdentPart::Unquoted(s) | IdentPart::Quoted(s) => s,
        }
    }
}

/// A validated, possibly schema-qualified identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ident {
    parts: Vec<IdentPart>,
}

fn invalid(message: impl Into<String>) -> QsError {
    QsError::validation(format!("invalid identifier: {}", message.into()))
}

/// Read one quoted part; the opening quote is already consumed.
fn quoted_part(chars: &mut Peekable<Chars<'_>>) -> QsResult<IdentPart> {
    let mut name = String::new();
    loop {
        match chars.next() {
            Some('"') if chars.peek() == Some(&'"') => {
                chars.next();
                name.push('"');
            }
            Some('"') => break,
            Some(c) => name.push(c),
            None => return Err(invalid("unclosed quote")),
        }
    }
    if name.is_empty() {
        return Err(invalid("empty quoted part"));
    }
    Ok(IdentPart::Quoted(name))
}

fn unquoted_part(chars: &mut Peekable<Chars<'_>>) -> QsResult<IdentPart> {
    let mut name = String::new();
    while let Some(&c) = chars.peek() {
        if c == '.' {
            break;
        }
        let ok = if name.is_empty() {
            c == '_' || c.is_ascii_alphabetic()
        } else {
            c == '_' || c == '$' || c.is_ascii_alphanumeric()
        };
        if !ok {
            return Err(invalid(format!("unexpected character '{c}'")));
        }
        name.push(c);
        chars.next();
    }
    if name.is_empty() {
        return Err(invalid("empty part"));
    }
    Ok(IdentPart::Unquoted(name))
}

impl Ident {
    /// Parse `name`, `schema.name` or any mix of quoted and unquoted parts
    /// (`public."UserTable"`).
    pub fn parse(s: &str) -> QsResult<Self> {
        if s.contains('\0') {
            return Err(invalid("NUL character"));
        }
        let mut chars = s.chars().peekable();
        let mut parts = Vec::new();
        loop {
            let part = if chars.next_if_eq(&'"').is_some() {
                quoted_part(&mut chars)?
            } else {
                unquoted_part(&mut chars)?
            };
            parts.push(part);
            match chars.next() {
                None => break,
                Some('.') => {}
                Some(c) => return Err(invalid(format!("expected '.', found '{c}'"))),
            }
        }
        Ok(Self { parts })
    }

    pub fn parts(&self) -> &[IdentPart] {
        &self.parts
    }

    /// Unqualified name (the last part).
    pub fn name(&self) -> &str {
        self.parts.last().map(IdentPart::as_str).unwrap_or_default()
    }

    /// Render with `quote` applied to the quoted parts.
    pub fn render(&self, quote: &dyn Fn(&str) -> String) -> String {
        self.parts
            .iter()
            .map(|part| match part {
                IdentPart::Unquoted(s) => s.clone(),
                IdentPart::Quoted(s) => quote(s),
            })
            .collect::<Vec<_>>()
            .join(".")
    }
}

impl fmt::Display for Ident {
    /// ANSI rendering.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render(&quote_ansi))
    }
}

/// `"name"`, with embedded quotes doubled.
pub fn quote_ansi(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Anything a query set accepts as a table name.
pub trait IntoIdent {
    fn into_ident(self) -> QsResult<Ident>;
}

impl IntoIdent for Ident {
    fn into_ident(self) -> QsResult<Ident> {
        Ok(self)
    }
}

impl IntoIdent for &Ident {
    fn into_ident(self) -> QsResult<Ident> {
        Ok(self.clone())
    }
}

impl IntoIdent for &str {
    fn into_ident(self) -> QsResult<Ident> {
        Ident::parse(self)
    }
}

impl IntoIdent for String {
    fn into_ident(self) -> QsResult<Ident> {
        Ident::parse(&self)
    }
}
