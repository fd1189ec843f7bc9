//! Parameterized SQL text.
//!
//! - [`SqlFragment`] is an immutable clause template with positional
//!   arguments (`{0}`, `{1}`, ...).
//! - [`Sql`] is the growing buffer a statement is compiled into; fragments are
//!   renumbered against it so placeholder indices never need manual tracking.
//!
//! # Example
//!
//! ```ignore
//! use qset::{Sql, SqlFragment};
//!
//! let filter = SqlFragment::new("status = {0} AND age > {1}", ["active".into(), Value::from(18)])?;
//! let mut q = Sql::new("SELECT * FROM users WHERE ");
//! q.push_fragment(&filter);
//! assert_eq!(q.to_sql(), "SELECT * FROM users WHERE status = $1 AND age > $2");
//! ```

mod builder;
mod fragment;
mod parts;

#[cfg(test)]
mod tests;

pub use builder::Sql;
pub use fragment::SqlFragment;
pub use parts::PlaceholderStyle;
pub(crate) use parts::Segment;

/// Start building a SQL statement.
pub fn sql(initial_sql: impl Into<String>) -> Sql {
    Sql::new(initial_sql)
}

/// Skip whitespace, `--` and `/* */` comments and opening parentheses in
/// front of the first keyword. An unterminated comment leaves nothing.
pub(crate) fn strip_sql_prefix(sql: &str) -> &str {
    let mut rest = sql.trim_start();
    while !rest.is_empty() {
        let skipped = if let Some(line) = rest.strip_prefix("--") {
            line.split_once('\n').map_or("", |(_, after)| after)
        } else if let Some(block) = rest.strip_prefix("/*") {
            block.split_once("*/").map_or("", |(_, after)| after)
        } else if let Some(after) = rest.strip_prefix('(') {
            after
        } else {
            break;
        };
        rest = skipped.trim_start();
    }
    rest
}

/// Case-insensitive prefix test.
pub(crate) fn starts_with_keyword(s: &str, keyword: &str) -> bool {
    s.get(..keyword.len())
        .is_some_and(|head| head.eq_ignore_ascii_case(keyword))
}
