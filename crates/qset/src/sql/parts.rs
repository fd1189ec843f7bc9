use crate::value::Value;

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum SqlPart {
    Raw(String),
    Param,
}

/// One piece of a parsed fragment template.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Segment {
    Text(String),
    /// Index into the fragment's argument list.
    Arg(usize),
}

/// How positional parameters are spelled in rendered SQL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PlaceholderStyle {
    /// `$1, $2, ...` (PostgreSQL)
    #[default]
    Dollar,
    /// `?, ?, ...` (SQLite, MySQL, ODBC)
    Question,
    /// `@p1, @p2, ...` (SQL Server)
    AtP,
    /// `:1, :2, ...` (Oracle)
    Colon,
}

impl PlaceholderStyle {
    pub(crate) fn write(self, out: &mut String, idx: usize) {
        use std::fmt::Write;
        let _ = match self {
            PlaceholderStyle::Dollar => write!(out, "${idx}"),
            PlaceholderStyle::Question => write!(out, "?"),
            PlaceholderStyle::AtP => write!(out, "@p{idx}"),
            PlaceholderStyle::Colon => write!(out, ":{idx}"),
        };
    }
}

pub(crate) fn count_params(parts: &[SqlPart]) -> usize {
    parts.iter().filter(|p| matches!(p, SqlPart::Param)).count()
}

pub(crate) fn push_raw(parts: &mut Vec<SqlPart>, sql: &str) {
    if sql.is_empty() {
        return;
    }
    match parts.last_mut() {
        Some(SqlPart::Raw(last)) => last.push_str(sql),
        _ => parts.push(SqlPart::Raw(sql.to_string())),
    }
}

pub(crate) fn push_param(parts: &mut Vec<SqlPart>, params: &mut Vec<Value>, value: Value) {
    parts.push(SqlPart::Param);
    params.push(value);
}
