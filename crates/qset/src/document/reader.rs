use super::node::{DocumentNode, XS_NAMESPACE, XSI_NAMESPACE};
use super::options::{DocumentOptions, NullHandling, TypeAnnotation};
use super::text::{encode_name, value_text};
use crate::cursor::Cursor;
use crate::error::{QsError, QsResult};
use crate::value::Value;
use std::collections::VecDeque;

/// Position of a [`DocumentReader`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReaderState {
    /// Nothing read yet.
    Initial,
    /// Root element open, no row read yet.
    Document,
    /// Row element open, no field opened yet.
    Row,
    /// Opening the segments of a field path.
    Field,
    /// Innermost segment open; its value comes next.
    Value,
    /// Closing the segments not shared with the next field.
    EndField,
    /// Row element closed.
    EndRow,
    /// Root element closed.
    EndDocument,
    /// Exhausted.
    Closed,
    /// The cursor failed; the reader can no longer be used.
    Failed,
}

/// The field being projected.
#[derive(Debug)]
struct Field {
    ordinal: usize,
    path: Vec<String>,
}

/// Pull-based projection of a cursor into a document tree.
///
/// The tree is `root > row > field`, where a field whose column name holds
/// separator characters (`A$B`) becomes nested elements (`<A><B>`). Adjacent
/// fields keep their shared leading elements open, so `A$B`, `A$C` produce a
/// single `A` with two children.
///
/// Each [`read`](DocumentReader::read) returns one node. The reader owns the
/// cursor for a single pass and cannot be restarted.
pub struct DocumentReader<C> {
    cursor: C,
    options: DocumentOptions,
    root: String,
    row: String,
    state: ReaderState,
    /// Attributes of the element just opened.
    pending: VecDeque<DocumentNode>,
    field: Option<Field>,
    /// Value of the current field, fetched when its innermost element opens.
    value: Option<Value>,
    /// Number of segments of `field.path` currently open.
    open: usize,
    next: Option<Field>,
    /// Segments shared with `next` that stay open.
    keep: usize,
    depth: usize,
}

impl<C: Cursor> DocumentReader<C> {
    pub fn new(cursor: C, options: DocumentOptions) -> Self {
        Self {
            root: encode_name(&options.root_name),
            row: encode_name(&options.row_name),
            cursor,
            options,
            state: ReaderState::Initial,
            pending: VecDeque::new(),
            field: None,
            value: None,
            open: 0,
            next: None,
            keep: 0,
            depth: 0,
        }
    }

    pub fn state(&self) -> ReaderState {
        self.state
    }

    /// Number of currently open elements.
    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn options(&self) -> &DocumentOptions {
        &self.options
    }

    /// Always fails: the underlying query is never re-run.
    pub fn restart(&mut self) -> QsResult<()> {
        Err(QsError::projection(
            "document reader is forward-only and cannot be restarted",
        ))
    }

    /// Produce the next node, or `None` once the document is complete.
    ///
    /// A cursor failure is returned once; afterwards every call fails with a
    /// projection error.
    pub fn read(&mut self) -> QsResult<Option<DocumentNode>> {
        if self.state == ReaderState::Failed {
            return Err(QsError::projection(
                "document reader stopped after a source error",
            ));
        }
        match self.step() {
            Ok(node) => Ok(node),
            Err(e) => {
                #[cfg(feature = "tracing")]
                tracing::debug!(target: "qset", error = %e, state = ?self.state, "document projection failed");

                self.state = ReaderState::Failed;
                Err(e)
            }
        }
    }

    fn step(&mut self) -> QsResult<Option<DocumentNode>> {
        if let Some(attr) = self.pending.pop_front() {
            return Ok(Some(attr));
        }
        loop {
            match self.state {
                ReaderState::Initial => {
                    self.queue_root_attributes();
                    self.state = ReaderState::Document;
                    return Ok(Some(self.open_element(self.root.clone())));
                }
                ReaderState::Document | ReaderState::EndRow => return self.next_row(),
                ReaderState::Row => match self.find_field(0)? {
                    Some(field) => {
                        self.begin_field(field);
                    }
                    None => return Ok(Some(self.close_row())),
                },
                ReaderState::Field => return self.open_segment().map(Some),
                ReaderState::Value => match self.value.take() {
                    Some(value) if !value.is_null() => {
                        self.enter_end_field()?;
                        return Ok(Some(DocumentNode::text(value_text(&value))));
                    }
                    _ => self.enter_end_field()?,
                },
                ReaderState::EndField => {
                    if self.open > self.keep {
                        return Ok(Some(self.close_segment()));
                    }
                    match self.next.take() {
                        Some(next) => {
                            self.field = Some(next);
                            self.state = ReaderState::Field;
                        }
                        None => {
                            self.field = None;
                            return Ok(Some(self.close_row()));
                        }
                    }
                }
                ReaderState::EndDocument => {
                    self.state = ReaderState::Closed;
                    return Ok(None);
                }
                ReaderState::Closed => return Ok(None),
                ReaderState::Failed => {
                    return Err(QsError::projection("document reader has failed"));
                }
            }
        }
    }

    fn next_row(&mut self) -> QsResult<Option<DocumentNode>> {
        if self.cursor.advance()? {
            self.state = ReaderState::Row;
            Ok(Some(self.open_element(self.row.clone())))
        } else {
            self.state = ReaderState::EndDocument;
            self.depth -= 1;
            Ok(Some(DocumentNode::end(self.root.clone())))
        }
    }

    fn close_row(&mut self) -> DocumentNode {
        self.state = ReaderState::EndRow;
        self.depth -= 1;
        DocumentNode::end(self.row.clone())
    }

    fn begin_field(&mut self, field: Field) {
        self.field = Some(field);
        self.open = 0;
        self.state = ReaderState::Field;
    }

    /// Open the next segment of the current field's path.
    fn open_segment(&mut self) -> QsResult<DocumentNode> {
        let (ordinal, name, innermost) = match &self.field {
            Some(f) => (f.ordinal, f.path[self.open].clone(), self.open + 1 == f.path.len()),
            None => return Err(QsError::projection("no field to open")),
        };
        self.open += 1;
        if innermost {
            let value = self.cursor.value(ordinal)?;
            self.queue_value_attributes(&value);
            self.value = Some(value);
            self.state = ReaderState::Value;
        }
        Ok(self.open_element(name))
    }

    fn close_segment(&mut self) -> DocumentNode {
        self.open -= 1;
        self.depth -= 1;
        let name = self
            .field
            .as_ref()
            .map(|f| f.path[self.open].clone())
            .unwrap_or_default();
        DocumentNode::end(name)
    }

    /// Look up the field after the current one and how much of the current
    /// path it shares. The innermost element of either path is never shared.
    fn enter_end_field(&mut self) -> QsResult<()> {
        let (from, path_len) = match &self.field {
            Some(f) => (f.ordinal + 1, f.path.len()),
            None => (0, 0),
        };
        let next = self.find_field(from)?;
        self.keep = match (&self.field, &next) {
            (Some(cur), Some(next)) => {
                let common = cur
                    .path
                    .iter()
                    .zip(&next.path)
                    .take_while(|(a, b)| a == b)
                    .count();
                common.min(path_len - 1).min(next.path.len() - 1)
            }
            _ => 0,
        };
        self.next = next;
        self.state = ReaderState::EndField;
        Ok(())
    }

    /// First field at or after `from` that produces an element.
    fn find_field(&self, from: usize) -> QsResult<Option<Field>> {
        let count = self.cursor.field_count();
        for ordinal in from..count {
            let include = match self.options.null_handling {
                NullHandling::Nil => true,
                NullHandling::Omit => !self.cursor.is_null(ordinal),
            };
            if include {
                let path = self
                    .options
                    .split(self.cursor.name(ordinal))
                    .into_iter()
                    .map(encode_name)
                    .collect();
                return Ok(Some(Field { ordinal, path }));
            }
        }
        Ok(None)
    }

    fn open_element(&mut self, name: String) -> DocumentNode {
        self.depth += 1;
        DocumentNode::StartElement {
            name,
            namespace: self.options.namespace.clone(),
        }
    }

    fn queue_root_attributes(&mut self) {
        if let Some(ns) = &self.options.namespace {
            self.pending.push_back(DocumentNode::attribute("xmlns", ns.clone()));
        }
        if self.options.uses_xsi() {
            self.pending
                .push_back(DocumentNode::attribute("xmlns:xsi", XSI_NAMESPACE));
        }
        if self.options.type_annotation == TypeAnnotation::SchemaType {
            self.pending
                .push_back(DocumentNode::attribute("xmlns:xs", XS_NAMESPACE));
        }
    }

    fn queue_value_attributes(&mut self, value: &Value) {
        if value.is_null() {
            if self.options.null_handling == NullHandling::Nil {
                self.pending.push_back(DocumentNode::attribute("xsi:nil", "true"));
            }
            return;
        }
        if self.options.type_annotation == TypeAnnotation::SchemaType {
            if let Some(ty) = value.kind().schema_type() {
                self.pending.push_back(DocumentNode::attribute("xsi:type", ty));
            }
        }
    }

    pub fn into_cursor(self) -> C {
        self.cursor
    }
}

impl<C: Cursor> Iterator for DocumentReader<C> {
    type Item = QsResult<DocumentNode>;

    /// Yields nodes until the document ends; a source error is yielded once
    /// and ends the sequence.
    fn next(&mut self) -> Option<Self::Item> {
        if self.state == ReaderState::Failed {
            return None;
        }
        self.read().transpose()
    }
}
