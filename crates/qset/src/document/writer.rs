//! XML rendering of a document node stream.

use super::node::DocumentNode;
use super::reader::DocumentReader;
use crate::cursor::Cursor;
use crate::error::{QsError, QsResult};
use quick_xml::Writer;
use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use std::io;

fn xml_error(err: impl std::fmt::Display) -> QsError {
    QsError::Serialization(err.to_string())
}

/// Drain `reader` into `out` as XML and return the sink.
///
/// Elements without content are written as empty tags (`<C xsi:nil="true"/>`).
/// With `indent` the output is indented by two spaces per level.
pub fn write_document<C: Cursor, W: io::Write>(
    reader: &mut DocumentReader<C>,
    out: W,
    indent: bool,
) -> QsResult<W> {
    let mut writer = if indent {
        Writer::new_with_indent(out, b' ', 2)
    } else {
        Writer::new(out)
    };
    // A start tag stays open until its attributes are complete.
    let mut open: Option<BytesStart<'static>> = None;

    while let Some(node) = reader.read()? {
        match node {
            DocumentNode::StartElement { name, .. } => {
                if let Some(start) = open.take() {
                    writer.write_event(Event::Start(start)).map_err(xml_error)?;
                }
                open = Some(BytesStart::new(name));
            }
            DocumentNode::Attribute { name, value } => match open.as_mut() {
                Some(start) => start.push_attribute((name.as_str(), value.as_str())),
                None => {
                    return Err(QsError::Serialization(format!(
                        "attribute '{name}' outside of a start tag"
                    )));
                }
            },
            DocumentNode::Text(text) => {
                if let Some(start) = open.take() {
                    writer.write_event(Event::Start(start)).map_err(xml_error)?;
                }
                writer
                    .write_event(Event::Text(BytesText::new(&text)))
                    .map_err(xml_error)?;
            }
            DocumentNode::EndElement { name } => match open.take() {
                Some(start) => writer.write_event(Event::Empty(start)).map_err(xml_error)?,
                None => writer
                    .write_event(Event::End(BytesEnd::new(name)))
                    .map_err(xml_error)?,
            },
        }
    }
    Ok(writer.into_inner())
}

/// Render the whole document as a string.
pub fn to_xml_string<C: Cursor>(reader: &mut DocumentReader<C>) -> QsResult<String> {
    let bytes = write_document(reader, Vec::new(), false)?;
    String::from_utf8(bytes).map_err(xml_error)
}
