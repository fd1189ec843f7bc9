use super::fragment::SqlFragment;
use super::parts::{PlaceholderStyle, Segment, SqlPart, count_params, push_param, push_raw};
use crate::error::{QsError, QsResult};
use crate::value::Value;

/// A parameter-safe, growing SQL buffer.
///
/// `Sql` stores SQL pieces and parameters separately and generates placeholders
/// (`$1, $2, ...` by default) only when rendered. Appending a
/// [`SqlFragment`] renumbers its `{n}` placeholders against the parameters
/// already in the buffer.
#[must_use]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Sql {
    parts: Vec<SqlPart>,
    params: Vec<Value>,
}

impl Sql {
    /// Create a new builder with an initial SQL fragment.
    pub fn new(initial_sql: impl Into<String>) -> Self {
        let initial = initial_sql.into();
        let parts = if initial.is_empty() {
            Vec::new()
        } else {
            vec![SqlPart::Raw(initial)]
        };
        Self {
            parts,
            params: Vec::new(),
        }
    }

    /// Create an empty builder.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Append raw SQL (no parameters).
    pub fn push(&mut self, sql: &str) -> &mut Self {
        push_raw(&mut self.parts, sql);
        self
    }

    /// Append a parameter placeholder and bind its value.
    pub fn push_bind(&mut self, value: impl Into<Value>) -> &mut Self {
        push_param(&mut self.parts, &mut self.params, value.into());
        self
    }

    /// Append a comma-separated list of placeholders and bind all values.
    ///
    /// If `values` is empty, this appends `NULL` (so `IN (NULL)` is valid SQL).
    pub fn push_bind_list<V: Into<Value>>(&mut self, values: impl IntoIterator<Item = V>) -> &mut Self {
        let mut iter = values.into_iter();
        let Some(first) = iter.next() else {
            return self.push("NULL");
        };

        self.push_bind(first);
        for v in iter {
            self.push(", ");
            self.push_bind(v);
        }
        self
    }

    /// Append a fragment, binding its arguments at their placeholder positions.
    pub fn push_fragment(&mut self, fragment: &SqlFragment) -> &mut Self {
        let args = fragment.args();
        for seg in fragment.segments() {
            match seg {
                Segment::Text(t) => push_raw(&mut self.parts, t),
                // Index validity is checked when the fragment is parsed.
                Segment::Arg(i) => {
                    push_param(&mut self.parts, &mut self.params, args[*i].clone())
                }
            }
        }
        self
    }

    /// Append another `Sql` buffer, consuming it.
    pub fn push_sql(&mut self, mut other: Sql) -> &mut Self {
        for part in other.parts.drain(..) {
            match part {
                SqlPart::Raw(s) => push_raw(&mut self.parts, &s),
                SqlPart::Param => self.parts.push(SqlPart::Param),
            }
        }
        self.params.append(&mut other.params);
        self
    }

    /// Render SQL with `$1, $2, ...` placeholders.
    pub fn to_sql(&self) -> String {
        self.render(PlaceholderStyle::Dollar)
    }

    /// Render SQL with the given placeholder style.
    pub fn render(&self, style: PlaceholderStyle) -> String {
        let cap: usize = self
            .parts
            .iter()
            .map(|p| match p {
                SqlPart::Raw(s) => s.len(),
                SqlPart::Param => 4,
            })
            .sum();

        let mut out = String::with_capacity(cap);
        let mut idx: usize = 0;
        for part in &self.parts {
            match part {
                SqlPart::Raw(s) => out.push_str(s),
                SqlPart::Param => {
                    idx += 1;
                    style.write(&mut out, idx);
                }
            }
        }
        out
    }

    /// Bound parameters, in placeholder order.
    pub fn params(&self) -> &[Value] {
        &self.params
    }

    /// Number of bound parameters.
    pub fn param_count(&self) -> usize {
        self.params.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    /// Check the placeholder/parameter invariant.
    pub fn validate(&self) -> QsResult<()> {
        let placeholder_count = count_params(&self.parts);
        if placeholder_count != self.params.len() {
            let params_len = self.params.len();
            return Err(QsError::Validation(format!(
                "Sql: placeholders({placeholder_count}) != params({params_len})"
            )));
        }
        Ok(())
    }
}
