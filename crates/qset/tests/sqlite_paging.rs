//! Compiled query sets executed against SQLite.

mod common;

use common::{Limit, Mode, PEOPLE, RowNumber, Sqlite};
use qset::{Dialect, Expr, QsError, QuerySet, Row};

fn people() -> QuerySet {
    QuerySet::table("people")
}

fn ids<M: Mode>(conn: &Sqlite<M>, set: &QuerySet) -> Vec<i64> {
    set.to_vec(conn)
        .unwrap()
        .iter()
        .map(|row| row.get::<i64>("id").unwrap())
        .collect()
}

fn paging_window<M: Mode>() {
    let conn = Sqlite::<M>::open(PEOPLE);
    let page = people().order_by("id").skip(2).take(3);
    assert_eq!(ids(&conn, &page), [3, 4, 5]);

    let rows: Vec<Row> = page.to_vec(&conn).unwrap();
    assert_eq!(rows[0].columns(), ["id", "name", "age", "city"]);
    assert_eq!(page.count(&conn).unwrap(), 3);
}

#[test]
fn limit_offset_window() {
    paging_window::<Limit>();
}

#[test]
fn row_number_window() {
    paging_window::<RowNumber>();
    let conn = Sqlite::<RowNumber>::open(PEOPLE);
    people().order_by("id").skip(2).take(3).to_vec(&conn).unwrap();
    assert!(conn.last_sql().contains("BETWEEN 3 AND 5"));
}

fn filtered_descending<M: Mode>() {
    let conn = Sqlite::<M>::open(PEOPLE);
    let set = people().filter("age > {0}", [23]).order_by("id DESC").take(2);
    assert_eq!(ids(&conn, &set), [10, 9]);
    assert!(conn.last_sql().contains("age > ?"));
}

#[test]
fn filter_then_page() {
    filtered_descending::<Limit>();
    filtered_descending::<RowNumber>();
}

fn filter_after_take<M: Mode>() {
    let conn = Sqlite::<M>::open(PEOPLE);
    // The filter applies to the first five rows, not to the whole table.
    let set = people()
        .order_by("id")
        .take(5)
        .filter("city = {0}", ["Oslo"]);
    assert_eq!(ids(&conn, &set), [2, 4]);
    assert_eq!(set.count(&conn).unwrap(), 2);
}

#[test]
fn filter_after_paging_wraps() {
    filter_after_take::<Limit>();
    filter_after_take::<RowNumber>();
}

fn skip_after_take<M: Mode>() {
    let conn = Sqlite::<M>::open(PEOPLE);
    let set = people().order_by("id").take(5).skip(2);
    assert_eq!(ids(&conn, &set), [3, 4, 5]);

    let past_the_end = people().order_by("id").take(2).skip(5);
    assert!(ids(&conn, &past_the_end).is_empty());
    assert!(!past_the_end.any(&conn).unwrap());
}

#[test]
fn skip_after_take_keeps_the_window() {
    skip_after_take::<Limit>();
    skip_after_take::<RowNumber>();
}

#[test]
fn chained_skips_and_takes() {
    let conn = Sqlite::<Limit>::open(PEOPLE);
    let set = people().order_by("id").skip(1).skip(2).take(4).take(6);
    assert_eq!(ids(&conn, &set), [4, 5, 6, 7]);
}

#[test]
fn unions() {
    let conn = Sqlite::<Limit>::open(PEOPLE);
    let low = people().where_expr(Expr::lte("id", 2));
    let high = people().where_expr(Expr::gte("id", 9));

    let both = low.union(&high).order_by("id");
    assert_eq!(ids(&conn, &both), [1, 2, 9, 10]);
    assert_eq!(low.union(&low).count(&conn).unwrap(), 2);
    assert_eq!(low.union_all(&low).count(&conn).unwrap(), 4);

    let paged = both.skip(1).take(2);
    assert_eq!(ids(&conn, &paged), [2, 9]);
}

#[test]
fn projection_then_filter() {
    let conn = Sqlite::<Limit>::open(PEOPLE);
    let names = people()
        .select::<(i64, String)>(&["id", "name"])
        .filter("id = {0}", [7]);
    assert_eq!(names.single(&conn).unwrap(), (7, "p7".to_string()));
}

#[test]
fn select_map_with_nulls() {
    let conn = Sqlite::<Limit>::open(PEOPLE);
    let cities = people()
        .order_by("id")
        .take(3)
        .select_map(&["id", "city"], |row| row.get::<Option<String>>("city"));
    assert_eq!(
        cities.to_vec(&conn).unwrap(),
        [None, Some("Oslo".to_string()), None]
    );
}

#[test]
fn cardinality_materializers() {
    let conn = Sqlite::<Limit>::open(PEOPLE);
    assert_eq!(people().count(&conn).unwrap(), 10);
    assert!(people().any(&conn).unwrap());

    let first = people().order_by("age DESC").first(&conn).unwrap();
    assert_eq!(first.get::<i64>("id").unwrap(), 10);

    let none = people().filter("id > {0}", [100]);
    assert!(none.first(&conn).unwrap_err().is_not_found());
    assert!(none.first_or_default(&conn).unwrap().is_none());
    assert!(none.single(&conn).unwrap_err().is_not_found());

    let many = people().filter("city = {0}", ["Oslo"]);
    assert!(many.single(&conn).unwrap_err().is_too_many_rows());
    assert!(many.single_or_default(&conn).unwrap_err().is_too_many_rows());
    assert_eq!(
        people()
            .filter("name = {0}", ["p3"])
            .cast::<i64>()
            .single(&conn)
            .unwrap(),
        3
    );
}

#[test]
fn raw_source() {
    let conn = Sqlite::<Limit>::open(PEOPLE);
    let set = QuerySet::from_sql("SELECT id, age FROM people WHERE age < 24")
        .order_by("age DESC")
        .take(1);
    assert_eq!(ids(&conn, &set), [3]);
}

fn lazy_iteration<M: Mode>() {
    let conn = Sqlite::<M>::open(PEOPLE);
    let mut iter = people().order_by("id").skip(5).iter(&conn).unwrap();
    assert_eq!(iter.columns().map(<[String]>::len), None);
    let row = iter.next().unwrap().unwrap();
    assert_eq!(row.get::<i64>("id").unwrap(), 6);
    assert_eq!(iter.count(), 4);
}

#[test]
fn lazy_iteration_in_both_modes() {
    lazy_iteration::<Limit>();
    lazy_iteration::<RowNumber>();
}

#[test]
fn skip_without_take_runs_on_limit_engines() {
    let conn = Sqlite::<Limit>::open(PEOPLE);
    let tail = people().order_by("id").skip(7);
    assert_eq!(ids(&conn, &tail), [8, 9, 10]);
    assert!(conn.last_sql().contains(" LIMIT 9223372036854775807 OFFSET 7"));
    assert_eq!(tail.count(&conn).unwrap(), 3);
}

fn page_sweep<M: Mode>() {
    let conn = Sqlite::<M>::open(PEOPLE);
    for a in 0..=10u64 {
        let tail: Vec<i64> = ((a as i64 + 1)..=10).collect();
        assert_eq!(ids(&conn, &people().order_by("id").skip(a)), tail, "skip {a}");
        for b in 0..=10u64 {
            let expected: Vec<i64> = ((a + 1)..=(a + b).min(10)).map(|i| i as i64).collect();
            let page = people().order_by("id").skip(a).take(b);
            assert_eq!(ids(&conn, &page), expected, "skip {a} take {b}");
            assert_eq!(page.count(&conn).unwrap(), expected.len() as u64, "skip {a} take {b}");
        }
    }
}

#[test]
fn every_page_of_the_fixture_limit() {
    page_sweep::<Limit>();
}

#[test]
fn every_page_of_the_fixture_row_number() {
    page_sweep::<RowNumber>();
}

#[test]
fn windowed_pages_are_well_formed() {
    for a in 0..=10u64 {
        let skip_only = people().order_by("id").skip(a);
        assert_eq!(
            skip_only.compile_for(Dialect::WindowedTop).unwrap().to_sql(),
            format!("SELECT * FROM people ORDER BY id OFFSET {a} ROWS")
        );
        for b in 0..=10u64 {
            let text = people()
                .order_by("id")
                .skip(a)
                .take(b)
                .compile_for(Dialect::WindowedTop)
                .unwrap()
                .to_sql();
            let expected = if b == 0 {
                "SELECT TOP (0) * FROM people ORDER BY id".to_string()
            } else {
                format!("SELECT * FROM people ORDER BY id OFFSET {a} ROWS FETCH NEXT {b} ROWS ONLY")
            };
            assert_eq!(text, expected);
        }
    }
}

#[test]
fn row_number_unions() {
    let conn = Sqlite::<RowNumber>::open(PEOPLE);
    let columns = ["id", "name"];
    let first_two = people().select::<Row>(&columns).order_by("id").take(2);
    let ninth = people().select::<Row>(&columns).filter("id = {0}", [9]);
    let both = first_two.union(&ninth).order_by("id");
    assert_eq!(ids(&conn, &both), [1, 2, 9]);

    // Overlapping pages are deduplicated on the visible columns only.
    let head = people().select::<Row>(&columns).order_by("id").take(3);
    let shifted = people().select::<Row>(&columns).order_by("id").skip(1).take(3);
    assert_eq!(ids(&conn, &head.union(&shifted).order_by("id")), [1, 2, 3, 4]);
    assert_eq!(head.union_all(&shifted).count(&conn).unwrap(), 6);

    // Without a column list the row number would leak into the union.
    let executed = conn.executed.borrow().len();
    let err = people()
        .order_by("id")
        .take(2)
        .union(&people().filter("id = {0}", [9]))
        .to_vec(&conn)
        .unwrap_err();
    assert!(matches!(err, QsError::Validation(_)));
    assert_eq!(conn.executed.borrow().len(), executed);
}

#[test]
fn statement_errors_surface_as_source_errors() {
    let conn = Sqlite::<Limit>::open(PEOPLE);
    let err = QuerySet::table("missing").to_vec(&conn).unwrap_err();
    assert!(matches!(err, QsError::Source(_)));
}
