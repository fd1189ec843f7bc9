use super::parts::Segment;
use crate::error::{QsError, QsResult};
use crate::value::Value;
use std::fmt;
use std::sync::Arc;

/// An immutable, deferred SQL clause: a template plus its positional arguments.
///
/// Templates reference arguments by position with `{0}`, `{1}`, ...; literal
/// braces are written `{{` and `}}`. Placeholders are only numbered when the
/// fragment is appended to a [`Sql`](super::Sql) buffer, so the same fragment
/// can be reused at any position of any statement.
///
/// ```ignore
/// let f = SqlFragment::new("age > {0} AND name <> {1}", [Value::from(18), Value::from("x")])?;
/// ```
#[derive(Clone, PartialEq)]
pub struct SqlFragment {
    format: Arc<str>,
    segments: Arc<[Segment]>,
    args: Arc<[Value]>,
}

impl SqlFragment {
    /// Parse a template and attach its arguments.
    ///
    /// Fails if the template references an argument that was not supplied or
    /// contains an unbalanced brace.
    pub fn new<I, V>(format: &str, args: I) -> QsResult<Self>
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        let args: Vec<Value> = args.into_iter().map(Into::into).collect();
        let segments = parse_template(format, args.len())?;
        Ok(Self {
            format: Arc::from(format),
            segments: segments.into(),
            args: args.into(),
        })
    }

    /// A fragment with no arguments; braces are taken literally.
    pub fn raw(sql: impl Into<String>) -> Self {
        let sql = sql.into();
        Self {
            format: Arc::from(sql.replace('{', "{{").replace('}', "}}").as_str()),
            segments: vec![Segment::Text(sql)].into(),
            args: Arc::from(Vec::new()),
        }
    }

    pub(crate) fn from_segments(segments: Vec<Segment>, args: Vec<Value>) -> Self {
        let mut format = String::new();
        for seg in &segments {
            match seg {
                Segment::Text(t) => format.push_str(&t.replace('{', "{{").replace('}', "}}")),
                Segment::Arg(i) => {
                    use std::fmt::Write;
                    let _ = write!(format, "{{{i}}}");
                }
            }
        }
        Self {
            format: Arc::from(format.as_str()),
            segments: segments.into(),
            args: args.into(),
        }
    }

    /// The original template text.
    pub fn format(&self) -> &str {
        &self.format
    }

    /// The bound arguments, in positional order.
    pub fn args(&self) -> &[Value] {
        &self.args
    }

    pub(crate) fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Number of placeholders this fragment renders (an argument used twice counts twice).
    pub fn placeholder_count(&self) -> usize {
        self.segments
            .iter()
            .filter(|s| matches!(s, Segment::Arg(_)))
            .count()
    }

    pub fn is_blank(&self) -> bool {
        self.segments.iter().all(|s| match s {
            Segment::Text(t) => t.trim().is_empty(),
            Segment::Arg(_) => false,
        })
    }

    /// Join two fragments with `sep`, renumbering the right-hand arguments.
    pub(crate) fn join(&self, sep: &str, other: &SqlFragment) -> SqlFragment {
        let shift = self.args.len();
        let mut segments: Vec<Segment> = self.segments.to_vec();
        segments.push(Segment::Text(sep.to_string()));
        segments.extend(other.segments.iter().map(|s| match s {
            Segment::Arg(i) => Segment::Arg(i + shift),
            Segment::Text(t) => Segment::Text(t.clone()),
        }));
        let mut args = self.args.to_vec();
        args.extend(other.args.iter().cloned());
        SqlFragment::from_segments(segments, args)
    }

    /// Wrap the fragment in parentheses.
    pub(crate) fn parenthesized(&self) -> SqlFragment {
        let mut segments = Vec::with_capacity(self.segments.len() + 2);
        segments.push(Segment::Text("(".to_string()));
        segments.extend(self.segments.iter().cloned());
        segments.push(Segment::Text(")".to_string()));
        SqlFragment::from_segments(segments, self.args.to_vec())
    }
}

impl fmt::Debug for SqlFragment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SqlFragment")
            .field("format", &self.format)
            .field("args", &self.args)
            .finish()
    }
}

impl From<&str> for SqlFragment {
    fn from(sql: &str) -> Self {
        SqlFragment::raw(sql)
    }
}

impl From<String> for SqlFragment {
    fn from(sql: String) -> Self {
        SqlFragment::raw(sql)
    }
}

fn parse_template(format: &str, arg_count: usize) -> QsResult<Vec<Segment>> {
    let mut segments = Vec::new();
    let mut text = String::new();
    let mut chars = format.char_indices().peekable();

    while let Some((pos, ch)) = chars.next() {
        match ch {
            '{' if matches!(chars.peek(), Some((_, '{'))) => {
                chars.next();
                text.push('{');
            }
            '}' if matches!(chars.peek(), Some((_, '}'))) => {
                chars.next();
                text.push('}');
            }
            '{' => {
                let mut digits = String::new();
                loop {
                    match chars.next() {
                        Some((_, '}')) => break,
                        Some((_, c)) if c.is_ascii_digit() => digits.push(c),
                        _ => {
                            return Err(QsError::validation(format!(
                                "SqlFragment: malformed placeholder at byte {pos} in '{format}'"
                            )));
                        }
                    }
                }
                let idx: usize = digits.parse().map_err(|_| {
                    QsError::validation(format!(
                        "SqlFragment: empty placeholder at byte {pos} in '{format}'"
                    ))
                })?;
                if idx >= arg_count {
                    return Err(QsError::validation(format!(
                        "SqlFragment: placeholder {{{idx}}} but only {arg_count} argument(s)"
                    )));
                }
                if !text.is_empty() {
                    segments.push(Segment::Text(std::mem::take(&mut text)));
                }
                segments.push(Segment::Arg(idx));
            }
            '}' => {
                return Err(QsError::validation(format!(
                    "SqlFragment: unmatched '}}' at byte {pos} in '{format}'"
                )));
            }
            c => text.push(c),
        }
    }
    if !text.is_empty() {
        segments.push(Segment::Text(text));
    }
    Ok(segments)
}
