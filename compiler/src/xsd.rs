//! XSD document loading.
//!
//! Parses a schema document with [`roxmltree`] and extracts only the
//! declarations the compiler understands: named `xs:simpleType`s and
//! `xs:element`s that have child elements. Everything else in the document
//! (attributes, groups, imports, annotations) is ignored.

use std::fmt;
use std::path::{Path, PathBuf};

use roxmltree::{Document, Node, ParsingOptions};
use thiserror::Error;

/// XML Schema namespace.
pub const XS_NS: &str = "http://www.w3.org/2001/XMLSchema";

/// `minOccurs` value marking a child element as mandatory-singleton.
const REQUIRED_MIN_OCCURS: &str = "1";

/// Errors that make a document unusable.
#[derive(Debug, Error)]
pub enum XsdError {
    /// The document could not be read.
    #[error("failed to read '{path}': {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// The document is not well-formed XML.
    #[error("not well-formed: {0}")]
    Xml(#[from] roxmltree::Error),

    /// The root element is not `xs:schema`.
    #[error("root element must be xs:schema, found '{0}'")]
    NotASchema(String),
}

/// Where a schema document comes from.
///
/// # Examples
///
/// ```
/// use xsd_model_compiler::xsd::DocumentSource;
///
/// let source = DocumentSource::inline(
///     "move.xsd",
///     r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema"/>"#,
/// );
/// assert_eq!(source.label(), "move.xsd");
/// assert!(source.load().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentSource {
    /// A document on disk.
    File(PathBuf),
    /// An in-memory document with a display label.
    Inline { label: String, content: String },
}

impl DocumentSource {
    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self::File(path.into())
    }

    pub fn inline(label: impl Into<String>, content: impl Into<String>) -> Self {
        Self::Inline {
            label: label.into(),
            content: content.into(),
        }
    }

    /// Human-readable name used in diagnostics and reports.
    pub fn label(&self) -> String {
        match self {
            Self::File(path) => path.display().to_string(),
            Self::Inline { label, .. } => label.clone(),
        }
    }

    /// Reads and parses the document.
    ///
    /// # Errors
    ///
    /// Returns [`XsdError::Read`] if the file cannot be read,
    /// [`XsdError::Xml`] if it is not well-formed, and
    /// [`XsdError::NotASchema`] if its root is not `xs:schema`.
    pub fn load(&self) -> Result<SchemaDocument, XsdError> {
        match self {
            Self::File(path) => {
                let content = std::fs::read_to_string(path).map_err(|source| XsdError::Read {
                    path: path.display().to_string(),
                    source,
                })?;
                SchemaDocument::parse(self.label(), &content)
            }
            Self::Inline { label, content } => SchemaDocument::parse(label.clone(), content),
        }
    }
}

impl From<&Path> for DocumentSource {
    fn from(path: &Path) -> Self {
        Self::File(path.to_path_buf())
    }
}

impl From<PathBuf> for DocumentSource {
    fn from(path: PathBuf) -> Self {
        Self::File(path)
    }
}

/// Declared type of a child element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeclaredType {
    /// A type in the XML Schema namespace, by local name (`string`, `date`).
    Builtin(String),
    /// Any other type reference, verbatim (domain enumerations etc.).
    Other(String),
}

impl DeclaredType {
    /// Local name of a built-in type, if this is one.
    pub fn builtin(&self) -> Option<&str> {
        match self {
            Self::Builtin(local) => Some(local.as_str()),
            Self::Other(_) => None,
        }
    }
}

impl fmt::Display for DeclaredType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Builtin(local) => write!(f, "xs:{local}"),
            Self::Other(raw) => f.write_str(raw),
        }
    }
}

/// What a child element declaration points at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChildTarget {
    /// Locally named leaf with an optional declared type.
    Named {
        name: String,
        declared_type: Option<DeclaredType>,
    },
    /// Reference to another element declaration by name.
    Reference(String),
    /// Neither a name nor a reference.
    Anonymous,
}

/// A descendant `xs:element` of a complex element declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChildField {
    pub target: ChildTarget,
    /// Raw `minOccurs` attribute, if present.
    pub min_occurs: Option<String>,
}

impl ChildField {
    /// Whether the declaration is marked `minOccurs="1"`.
    ///
    /// This is a literal attribute check: an absent `minOccurs` (which XSD
    /// defaults to 1) does not count.
    pub fn is_required(&self) -> bool {
        self.min_occurs.as_deref() == Some(REQUIRED_MIN_OCCURS)
    }
}

/// A named `xs:simpleType`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimpleTypeDeclaration {
    pub raw_name: Option<String>,
}

/// An `xs:element` with at least one child element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComplexElementDeclaration {
    pub raw_name: Option<String>,
    /// Descendant elements marked `minOccurs="1"`.
    pub required_children: Vec<ChildField>,
    /// All other descendant elements, in document order.
    pub fields: Vec<ChildField>,
}

/// The declarations of one parsed schema document, in document order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaDocument {
    pub label: String,
    pub simple_types: Vec<SimpleTypeDeclaration>,
    pub elements: Vec<ComplexElementDeclaration>,
}

impl SchemaDocument {
    /// Parses schema text.
    ///
    /// Nested element declarations are collected too: every `xs:element` with
    /// child elements becomes a [`ComplexElementDeclaration`], wherever it
    /// sits in the tree.
    ///
    /// # Examples
    ///
    /// ```
    /// use xsd_model_compiler::xsd::SchemaDocument;
    ///
    /// let xsd = r#"
    /// <xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema">
    ///   <xs:simpleType name="pokemon_type"/>
    ///   <xs:element name="move">
    ///     <xs:complexType><xs:sequence>
    ///       <xs:element name="name" type="xs:string"/>
    ///     </xs:sequence></xs:complexType>
    ///   </xs:element>
    /// </xs:schema>"#;
    ///
    /// let doc = SchemaDocument::parse("move.xsd", xsd).unwrap();
    /// assert_eq!(doc.simple_types.len(), 1);
    /// assert_eq!(doc.elements.len(), 1);
    /// assert_eq!(doc.elements[0].fields.len(), 1);
    /// ```
    pub fn parse(label: impl Into<String>, content: &str) -> Result<Self, XsdError> {
        let options = ParsingOptions {
            allow_dtd: true,
            ..Default::default()
        };
        let doc = Document::parse_with_options(content, options)?;
        let root = doc.root_element();

        if !is_xs(&root, "schema") {
            return Err(XsdError::NotASchema(root.tag_name().name().to_string()));
        }

        let simple_types = root
            .descendants()
            .filter(|node| is_xs(node, "simpleType"))
            .map(|node| SimpleTypeDeclaration {
                raw_name: node.attribute("name").map(String::from),
            })
            .collect();

        let elements = root
            .descendants()
            .filter(|node| is_xs(node, "element") && node.children().any(|c| c.is_element()))
            .map(|node| complex_element(&node))
            .collect();

        Ok(Self {
            label: label.into(),
            simple_types,
            elements,
        })
    }
}

fn complex_element(node: &Node) -> ComplexElementDeclaration {
    let mut required_children = Vec::new();
    let mut fields = Vec::new();

    for child in node.descendants().skip(1).filter(|n| is_xs(n, "element")) {
        let field = child_field(&child);
        if field.is_required() {
            required_children.push(field);
        } else {
            fields.push(field);
        }
    }

    ComplexElementDeclaration {
        raw_name: node.attribute("name").map(String::from),
        required_children,
        fields,
    }
}

fn child_field(node: &Node) -> ChildField {
    let name = node.attribute("name").filter(|n| !n.is_empty());
    let reference = node.attribute("ref").filter(|r| !r.is_empty());

    let target = match (name, reference) {
        (Some(name), _) => ChildTarget::Named {
            name: name.to_string(),
            declared_type: declared_type(node),
        },
        (None, Some(reference)) => ChildTarget::Reference(reference.to_string()),
        (None, None) => ChildTarget::Anonymous,
    };

    ChildField {
        target,
        min_occurs: node.attribute("minOccurs").map(String::from),
    }
}

/// Resolves the `type` attribute's prefix against the in-scope namespaces.
fn declared_type(node: &Node) -> Option<DeclaredType> {
    let raw = node.attribute("type")?;
    let (prefix, local) = match raw.split_once(':') {
        Some((prefix, local)) => (Some(prefix), local),
        None => (None, raw),
    };
    if node.lookup_namespace_uri(prefix) == Some(XS_NS) {
        Some(DeclaredType::Builtin(local.to_string()))
    } else {
        Some(DeclaredType::Other(raw.to_string()))
    }
}

fn is_xs(node: &Node, local: &str) -> bool {
    node.is_element() && node.tag_name().namespace() == Some(XS_NS) && node.tag_name().name() == local
}
