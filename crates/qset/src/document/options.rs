use serde::Deserialize;

/// How a NULL field is represented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NullHandling {
    /// The field element is left out.
    #[default]
    Omit,
    /// An empty element marked `xsi:nil="true"`.
    Nil,
}

/// Whether value elements carry an `xsi:type` hint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeAnnotation {
    #[default]
    None,
    /// `xsi:type="xs:int"` and friends.
    SchemaType,
}

/// Shape of a projected document.
///
/// Every field is optional when deserialized:
///
/// ```ignore
/// let options: DocumentOptions = serde_json::from_str(r#"{"root_name": "users", "null_handling": "nil"}"#)?;
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct DocumentOptions {
    /// Local name of the root (collection) element.
    pub root_name: String,
    /// Namespace URI declared on the root element.
    pub namespace: Option<String>,
    /// Local name of each row element.
    pub row_name: String,
    pub null_handling: NullHandling,
    pub type_annotation: TypeAnnotation,
    /// Characters that split a column name into nested element names.
    pub separators: Vec<char>,
}

impl Default for DocumentOptions {
    fn default() -> Self {
        Self {
            root_name: "table".to_string(),
            namespace: None,
            row_name: "row".to_string(),
            null_handling: NullHandling::Omit,
            type_annotation: TypeAnnotation::None,
            separators: vec!['$'],
        }
    }
}

impl DocumentOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_root_name(mut self, name: impl Into<String>) -> Self {
        self.root_name = name.into();
        self
    }

    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }

    pub fn with_row_name(mut self, name: impl Into<String>) -> Self {
        self.row_name = name.into();
        self
    }

    pub fn with_null_handling(mut self, policy: NullHandling) -> Self {
        self.null_handling = policy;
        self
    }

    pub fn with_type_annotation(mut self, policy: TypeAnnotation) -> Self {
        self.type_annotation = policy;
        self
    }

    /// Replace the multipart separators. An empty set disables splitting.
    pub fn with_separators(mut self, separators: impl IntoIterator<Item = char>) -> Self {
        self.separators = separators.into_iter().collect();
        self
    }

    /// Whether the `xsi` prefix is used anywhere in the document.
    pub(crate) fn uses_xsi(&self) -> bool {
        self.null_handling == NullHandling::Nil || self.type_annotation == TypeAnnotation::SchemaType
    }

    /// Split a column name into its element path. Empty segments are dropped;
    /// a name without any non-empty segment stays a single element.
    pub(crate) fn split<'a>(&self, name: &'a str) -> Vec<&'a str> {
        let parts: Vec<&str> = name
            .split(|c| self.separators.contains(&c))
            .filter(|s| !s.is_empty())
            .collect();
        if parts.is_empty() { vec![name] } else { parts }
    }
}
