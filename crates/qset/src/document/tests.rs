use super::*;
use crate::cursor::{Cursor, MemoryCursor};
use crate::error::{QsError, QsResult};
use crate::value::Value;

fn cursor(columns: &[&str], rows: Vec<Vec<Value>>) -> MemoryCursor {
    MemoryCursor::new(columns.iter().copied(), rows).unwrap()
}

/// Compact rendering of the node stream: `<A>`, `@name=value`, `"text"`, `</A>`.
fn trace<C: Cursor>(reader: DocumentReader<C>) -> Vec<String> {
    reader.map(|n| n.unwrap().to_string()).collect()
}

fn nested_row() -> MemoryCursor {
    cursor(
        &["A$B", "A$C", "D"],
        vec![vec![Value::I32(1), Value::Null, Value::from("x")]],
    )
}

#[test]
fn multipart_names_nest_and_nulls_are_omitted() {
    let reader = DocumentReader::new(nested_row(), DocumentOptions::default());
    assert_eq!(
        trace(reader),
        [
            "<table>", "<row>", "<A>", "<B>", "\"1\"", "</B>", "</A>", "<D>", "\"x\"", "</D>",
            "</row>", "</table>"
        ]
    );
}

#[test]
fn nil_policy_marks_null_fields() {
    let options = DocumentOptions::new().with_null_handling(NullHandling::Nil);
    let reader = DocumentReader::new(nested_row(), options);
    assert_eq!(
        trace(reader),
        [
            "<table>",
            "@xmlns:xsi=\"http://www.w3.org/2001/XMLSchema-instance\"",
            "<row>",
            "<A>",
            "<B>",
            "\"1\"",
            "</B>",
            "<C>",
            "@xsi:nil=\"true\"",
            "</C>",
            "</A>",
            "<D>",
            "\"x\"",
            "</D>",
            "</row>",
            "</table>"
        ]
    );
}

#[test]
fn shared_prefix_stays_open() {
    let rows = cursor(&["A$B", "A$D$E"], vec![vec![Value::I32(1), Value::I32(2)]]);
    assert_eq!(
        trace(DocumentReader::new(rows, DocumentOptions::default())),
        [
            "<table>", "<row>", "<A>", "<B>", "\"1\"", "</B>", "<D>", "<E>", "\"2\"", "</E>",
            "</D>", "</A>", "</row>", "</table>"
        ]
    );
}

#[test]
fn innermost_element_is_never_shared() {
    // "A" carries a value, so "A$B" must open a new "A".
    let rows = cursor(&["A", "A$B"], vec![vec![Value::I32(1), Value::I32(2)]]);
    assert_eq!(
        trace(DocumentReader::new(rows, DocumentOptions::default())),
        [
            "<table>", "<row>", "<A>", "\"1\"", "</A>", "<A>", "<B>", "\"2\"", "</B>", "</A>",
            "</row>", "</table>"
        ]
    );
}

#[test]
fn depth_tracks_open_elements() {
    let rows = cursor(&["A$D$E"], vec![vec![Value::I32(2)]]);
    let mut reader = DocumentReader::new(rows, DocumentOptions::default());
    let mut depths = Vec::new();
    while reader.read().unwrap().is_some() {
        depths.push(reader.depth());
    }
    assert_eq!(depths, [1, 2, 3, 4, 5, 5, 4, 3, 2, 1, 0]);
    assert_eq!(reader.state(), ReaderState::Closed);
}

#[test]
fn empty_result_is_an_empty_root() {
    let rows = cursor(&["id"], vec![]);
    let mut reader = DocumentReader::new(rows, DocumentOptions::default());
    assert_eq!(reader.read().unwrap(), Some(DocumentNode::start("table", None)));
    assert_eq!(reader.read().unwrap(), Some(DocumentNode::end("table")));
    assert_eq!(reader.state(), ReaderState::EndDocument);
    assert_eq!(reader.read().unwrap(), None);
    assert_eq!(reader.read().unwrap(), None);
}

#[test]
fn zero_field_and_all_null_rows_are_empty() {
    let rows = cursor(&[], vec![vec![]]);
    assert_eq!(
        trace(DocumentReader::new(rows, DocumentOptions::default())),
        ["<table>", "<row>", "</row>", "</table>"]
    );

    let rows = cursor(&["a", "b"], vec![vec![Value::Null, Value::Null]]);
    assert_eq!(
        trace(DocumentReader::new(rows, DocumentOptions::default())),
        ["<table>", "<row>", "</row>", "</table>"]
    );
}

#[test]
fn several_rows() {
    let rows = cursor(
        &["id"],
        vec![vec![Value::I32(1)], vec![Value::I32(2)]],
    );
    let options = DocumentOptions::new().with_root_name("people").with_row_name("person");
    assert_eq!(
        trace(DocumentReader::new(rows, options)),
        [
            "<people>", "<person>", "<id>", "\"1\"", "</id>", "</person>", "<person>", "<id>",
            "\"2\"", "</id>", "</person>", "</people>"
        ]
    );
}

#[test]
fn type_hints_and_namespaces() {
    let rows = cursor(&["n", "s"], vec![vec![Value::I64(7), Value::from("x")]]);
    let options = DocumentOptions::new()
        .with_namespace("urn:people")
        .with_type_annotation(TypeAnnotation::SchemaType);
    let mut reader = DocumentReader::new(rows, options);
    assert_eq!(
        reader.read().unwrap(),
        Some(DocumentNode::start("table", Some("urn:people")))
    );
    let nodes = trace(reader);
    assert_eq!(
        nodes,
        [
            "@xmlns=\"urn:people\"",
            "@xmlns:xsi=\"http://www.w3.org/2001/XMLSchema-instance\"",
            "@xmlns:xs=\"http://www.w3.org/2001/XMLSchema\"",
            "<row>",
            "<n>",
            "@xsi:type=\"xs:long\"",
            "\"7\"",
            "</n>",
            "<s>",
            "@xsi:type=\"xs:string\"",
            "\"x\"",
            "</s>",
            "</row>",
            "</table>"
        ]
    );
}

#[test]
fn custom_separators_and_encoded_names() {
    let rows = cursor(&["order.line/qty", "unit price"], vec![vec![Value::I32(3), Value::I32(9)]]);
    let options = DocumentOptions::new().with_separators(['/']);
    assert_eq!(
        trace(DocumentReader::new(rows, options)),
        [
            "<table>",
            "<row>",
            "<order.line>",
            "<qty>",
            "\"3\"",
            "</qty>",
            "</order.line>",
            "<unit_x0020_price>",
            "\"9\"",
            "</unit_x0020_price>",
            "</row>",
            "</table>"
        ]
    );
}

#[test]
fn restart_is_rejected() {
    let mut reader = DocumentReader::new(nested_row(), DocumentOptions::default());
    assert!(reader.restart().unwrap_err().is_projection());
    reader.read().unwrap();
    assert!(reader.restart().unwrap_err().is_projection());
}

/// Yields one row, then fails.
struct BrokenCursor {
    advanced: bool,
}

impl Cursor for BrokenCursor {
    fn advance(&mut self) -> QsResult<bool> {
        if self.advanced {
            return Err(QsError::source_failure("network down"));
        }
        self.advanced = true;
        Ok(true)
    }

    fn field_count(&self) -> usize {
        1
    }

    fn name(&self, _ordinal: usize) -> &str {
        "id"
    }

    fn is_null(&self, _ordinal: usize) -> bool {
        false
    }

    fn value(&self, _ordinal: usize) -> QsResult<Value> {
        Ok(Value::I32(1))
    }
}

#[test]
fn source_error_terminates_the_document() {
    let mut reader = DocumentReader::new(BrokenCursor { advanced: false }, DocumentOptions::default());
    for _ in 0..6 {
        // <table> <row> <id> "1" </id> </row>
        assert!(reader.read().unwrap().is_some());
    }
    assert!(matches!(reader.read(), Err(QsError::Source(_))));
    assert_eq!(reader.state(), ReaderState::Failed);
    assert!(reader.read().unwrap_err().is_projection());
}

#[test]
fn iterator_yields_source_error_once() {
    let reader = DocumentReader::new(BrokenCursor { advanced: false }, DocumentOptions::default());
    let items: Vec<_> = reader.collect();
    assert_eq!(items.len(), 7);
    assert!(matches!(items.last(), Some(Err(QsError::Source(_)))));
}

#[test]
fn options_deserialize_with_defaults() {
    let options: DocumentOptions =
        serde_json::from_str(r#"{"root_name": "users", "null_handling": "nil", "separators": ["/", "$"]}"#)
            .unwrap();
    assert_eq!(options.root_name, "users");
    assert_eq!(options.row_name, "row");
    assert_eq!(options.null_handling, NullHandling::Nil);
    assert_eq!(options.type_annotation, TypeAnnotation::None);
    assert_eq!(options.separators, vec!['/', '$']);

    let empty: DocumentOptions = serde_json::from_str("{}").unwrap();
    assert_eq!(empty, DocumentOptions::default());
}

#[test]
fn writes_xml() {
    let options = DocumentOptions::new().with_null_handling(NullHandling::Nil);
    let mut reader = DocumentReader::new(
        cursor(
            &["A$B", "A$C", "D"],
            vec![vec![Value::I32(1), Value::Null, Value::from("x < y")]],
        ),
        options,
    );
    let xml = to_xml_string(&mut reader).unwrap();
    assert_eq!(
        xml,
        "<table xmlns:xsi=\"http://www.w3.org/2001/XMLSchema-instance\"><row><A><B>1</B>\
         <C xsi:nil=\"true\"/></A><D>x &lt; y</D></row></table>"
    );
}

#[test]
fn writes_empty_document() {
    let mut reader = DocumentReader::new(cursor(&["id"], vec![]), DocumentOptions::default());
    assert_eq!(to_xml_string(&mut reader).unwrap(), "<table/>");
}
