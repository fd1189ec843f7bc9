use std::fmt;

pub const XSI_NAMESPACE: &str = "http://www.w3.org/2001/XMLSchema-instance";
pub const XS_NAMESPACE: &str = "http://www.w3.org/2001/XMLSchema";

/// One step of a projected document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentNode {
    /// Opens an element. `name` is an encoded local name.
    StartElement {
        name: String,
        namespace: Option<String>,
    },
    /// An attribute of the element opened just before. `name` may carry a
    /// prefix (`xsi:nil`, `xmlns:xs`).
    Attribute { name: String, value: String },
    /// Text content of the innermost open element.
    Text(String),
    /// Closes the innermost open element.
    EndElement { name: String },
}

impl DocumentNode {
    pub fn start(name: impl Into<String>, namespace: Option<&str>) -> Self {
        DocumentNode::StartElement {
            name: name.into(),
            namespace: namespace.map(str::to_string),
        }
    }

    pub fn attribute(name: impl Into<String>, value: impl Into<String>) -> Self {
        DocumentNode::Attribute {
            name: name.into(),
            value: value.into(),
        }
    }

    pub fn text(text: impl Into<String>) -> Self {
        DocumentNode::Text(text.into())
    }

    pub fn end(name: impl Into<String>) -> Self {
        DocumentNode::EndElement { name: name.into() }
    }

    /// Element or attribute name; `None` for text.
    pub fn name(&self) -> Option<&str> {
        match self {
            DocumentNode::StartElement { name, .. }
            | DocumentNode::Attribute { name, .. }
            | DocumentNode::EndElement { name } => Some(name),
            DocumentNode::Text(_) => None,
        }
    }
}

impl fmt::Display for DocumentNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DocumentNode::StartElement { name, .. } => write!(f, "<{name}>"),
            DocumentNode::Attribute { name, value } => write!(f, "@{name}={value:?}"),
            DocumentNode::Text(text) => write!(f, "{text:?}"),
            DocumentNode::EndElement { name } => write!(f, "</{name}>"),
        }
    }
}
