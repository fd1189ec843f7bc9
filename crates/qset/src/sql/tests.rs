use super::*;
use crate::value::Value;

#[test]
fn builds_placeholders_in_order() {
    let mut q = sql("SELECT * FROM users WHERE a = ");
    q.push_bind(1).push(" AND b = ").push_bind("x");

    assert_eq!(q.to_sql(), "SELECT * FROM users WHERE a = $1 AND b = $2");
    assert_eq!(q.params().len(), 2);
}

#[test]
fn can_compose_buffers() {
    let mut w = Sql::empty();
    w.push(" WHERE id = ").push_bind(42);

    let mut q = sql("SELECT * FROM users");
    q.push_sql(w);

    assert_eq!(q.to_sql(), "SELECT * FROM users WHERE id = $1");
    assert_eq!(q.params(), &[Value::I32(42)]);
}

#[test]
fn bind_list_empty_is_valid_sql() {
    let mut q = sql("SELECT * FROM users WHERE id IN (");
    q.push_bind_list(Vec::<i32>::new()).push(")");
    assert_eq!(q.to_sql(), "SELECT * FROM users WHERE id IN (NULL)");
    assert_eq!(q.param_count(), 0);
}

#[test]
fn fragment_placeholders_follow_existing_params() {
    let f = SqlFragment::new("b = {0} OR c = {1}", [Value::from("x"), Value::from(2)]).unwrap();
    let mut q = sql("SELECT * FROM t WHERE a = ");
    q.push_bind(1).push(" AND (").push_fragment(&f).push(")");

    assert_eq!(q.to_sql(), "SELECT * FROM t WHERE a = $1 AND (b = $2 OR c = $3)");
    assert_eq!(q.params()[1], Value::from("x"));
    q.validate().unwrap();
}

#[test]
fn fragment_reused_argument_binds_twice() {
    let f = SqlFragment::new("lo <= {0} AND hi >= {0}", [5_i64]).unwrap();
    assert_eq!(f.placeholder_count(), 2);

    let mut q = Sql::empty();
    q.push_fragment(&f);
    assert_eq!(q.to_sql(), "lo <= $1 AND hi >= $2");
    assert_eq!(q.params(), &[Value::I64(5), Value::I64(5)]);
}

#[test]
fn fragment_escaped_braces_are_literal() {
    let f = SqlFragment::new("data @> '{{\"a\": 1}}' AND id = {0}", [1]).unwrap();
    let mut q = Sql::empty();
    q.push_fragment(&f);
    assert_eq!(q.to_sql(), "data @> '{\"a\": 1}' AND id = $1");
}

#[test]
fn fragment_rejects_missing_argument() {
    let err = SqlFragment::new("a = {0} AND b = {1}", [1]).unwrap_err();
    assert!(err.to_string().contains("placeholder {1}"));
}

#[test]
fn fragment_rejects_malformed_placeholder() {
    assert!(SqlFragment::new("a = {x}", [1]).is_err());
    assert!(SqlFragment::new("a = {}", [1]).is_err());
    assert!(SqlFragment::new("a = 1 }", Vec::<Value>::new()).is_err());
}

#[test]
fn raw_fragment_keeps_braces() {
    let f = SqlFragment::raw("payload = '{}'");
    let mut q = Sql::empty();
    q.push_fragment(&f);
    assert_eq!(q.to_sql(), "payload = '{}'");
    assert_eq!(f.placeholder_count(), 0);
}

#[test]
fn joined_fragments_shift_arguments() {
    let a = SqlFragment::new("a = {0}", [1]).unwrap();
    let b = SqlFragment::new("b = {0}", [2]).unwrap();
    let joined = a.parenthesized().join(" AND ", &b.parenthesized());

    let mut q = Sql::empty();
    q.push_fragment(&joined);
    assert_eq!(q.to_sql(), "(a = $1) AND (b = $2)");
    assert_eq!(q.params(), &[Value::I32(1), Value::I32(2)]);
    assert_eq!(joined.format(), "(a = {0}) AND (b = {1})");
}

#[test]
fn render_styles() {
    let mut q = sql("x = ");
    q.push_bind(1).push(" AND y = ").push_bind(2);
    assert_eq!(q.render(PlaceholderStyle::Question), "x = ? AND y = ?");
    assert_eq!(q.render(PlaceholderStyle::AtP), "x = @p1 AND y = @p2");
    assert_eq!(q.render(PlaceholderStyle::Colon), "x = :1 AND y = :2");
}

#[test]
fn strip_prefix_skips_comments_and_parens() {
    assert_eq!(strip_sql_prefix("  -- c\n /* d */ (SELECT 1)"), "SELECT 1)");
    assert!(starts_with_keyword("select 1", "SELECT"));
    assert!(!starts_with_keyword("sel", "SELECT"));
}
