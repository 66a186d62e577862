//! Model type definitions for XSD-derived data models.
//!
//! This module defines the inferred output unit of a compilation: a [`Model`]
//! identified by a normalized class name and owning an ordered list of
//! [`FieldSpec`]s. The types are designed for serialization with [`serde`] and
//! can round-trip through JSON, YAML, and the SQLite emitter.

use serde::{Deserialize, Serialize};

/// Version of the model contract (semver).
///
/// Embedded in every [`ModelPackage`](crate::ModelPackage) to track
/// compatibility of serialized model sets.
pub const MODEL_CONTRACT_VERSION: &str = "1.0.0";

/// Maximum length of string columns inferred from schema fields.
pub const STRING_MAX_LENGTH: u32 = 500;

/// Maximum length of the single `value` column of an enumeration model.
pub const ENUMERATION_MAX_LENGTH: u32 = 50;

/// Suffix appended to the class name of list wrapper models.
pub const LIST_ELEMENT_SUFFIX: &str = "ListElement";

/// Name of the list-group identifier column of list element models.
pub const LIST_ID_FIELD: &str = "list_id";

/// Name of the ordinal column of list element models.
pub const SEQUENCE_NUMBER_FIELD: &str = "sequence_number";

/// Name of the listed-element reference column of list element models.
pub const ELEMENT_FIELD: &str = "element";

/// Name of the single column of enumeration models.
pub const ENUMERATION_VALUE_FIELD: &str = "value";

/// Normalized CamelCase identifier under which a model is registered.
pub type ClassName = String;

/// Scalar column type of a field.
///
/// # Examples
///
/// ```
/// use xsd_model_core::ScalarType;
///
/// let text = ScalarType::string(500);
/// assert_eq!(text, ScalarType::String { max_length: 500 });
///
/// let count = ScalarType::Integer { default: Some(0) };
/// assert!(matches!(count, ScalarType::Integer { .. }));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ScalarType {
    /// Bounded-length string.
    String { max_length: u32 },
    /// Integer, with an optional default value.
    Integer {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        default: Option<i64>,
    },
    /// Date/time value.
    DateTime,
}

impl ScalarType {
    /// Creates a bounded string type.
    pub fn string(max_length: u32) -> Self {
        Self::String { max_length }
    }

    /// Integer without a default value.
    pub fn integer() -> Self {
        Self::Integer { default: None }
    }
}

/// What a field stores.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FieldKind {
    /// Plain scalar column.
    Scalar { scalar: ScalarType },
    /// Direct relation to another model.
    Reference { target: ClassName },
    /// Integer list-group identifier pointing at a list element model.
    ///
    /// List element models have no single row to relate to, so references to
    /// them store the shared `list_id` instead of a foreign key.
    ForeignList { target: ClassName },
}

/// One field of a model.
///
/// Use the constructors [`scalar`](FieldSpec::scalar),
/// [`reference`](FieldSpec::reference) and
/// [`foreign_list`](FieldSpec::foreign_list), then chain
/// [`nullable`](FieldSpec::nullable) where needed.
///
/// # Examples
///
/// ```
/// use xsd_model_core::{FieldSpec, ScalarType};
///
/// let name = FieldSpec::scalar("name", ScalarType::string(500)).nullable();
/// assert!(name.nullable);
/// assert_eq!(name.scalar_type(), Some(ScalarType::String { max_length: 500 }));
///
/// let move_ref = FieldSpec::reference("move", "Move");
/// assert_eq!(move_ref.target(), Some("Move"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSpec {
    /// Column name (already normalized).
    pub name: String,
    /// Column kind.
    #[serde(flatten)]
    pub kind: FieldKind,
    /// Whether the column accepts NULL.
    #[serde(default)]
    pub nullable: bool,
}

impl FieldSpec {
    /// Creates a non-nullable scalar field.
    pub fn scalar(name: impl Into<String>, scalar: ScalarType) -> Self {
        Self {
            name: name.into(),
            kind: FieldKind::Scalar { scalar },
            nullable: false,
        }
    }

    /// Creates a mandatory reference field.
    pub fn reference(name: impl Into<String>, target: impl Into<ClassName>) -> Self {
        Self {
            name: name.into(),
            kind: FieldKind::Reference {
                target: target.into(),
            },
            nullable: false,
        }
    }

    /// Creates a list-id field pointing at a list element model.
    pub fn foreign_list(name: impl Into<String>, target: impl Into<ClassName>) -> Self {
        Self {
            name: name.into(),
            kind: FieldKind::ForeignList {
                target: target.into(),
            },
            nullable: false,
        }
    }

    /// Marks the field as nullable.
    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    /// Returns the scalar type, if this is a scalar field.
    pub fn scalar_type(&self) -> Option<ScalarType> {
        match self.kind {
            FieldKind::Scalar { scalar } => Some(scalar),
            _ => None,
        }
    }

    /// Returns the referenced class name for reference and list-id fields.
    pub fn target(&self) -> Option<&str> {
        match &self.kind {
            FieldKind::Scalar { .. } => None,
            FieldKind::Reference { target } | FieldKind::ForeignList { target } => {
                Some(target.as_str())
            }
        }
    }
}

/// Shape of an inferred model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "shape", rename_all = "snake_case")]
pub enum ModelKind {
    /// Single-field model for a closed set of string options.
    Enumeration,
    /// Plain record.
    Record,
    /// One row of a logical list of `element` values.
    ListElement { element: ClassName },
}

impl ModelKind {
    /// Short lowercase label used by renderers.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Enumeration => "enumeration",
            Self::Record => "record",
            Self::ListElement { .. } => "list_element",
        }
    }
}

/// An inferred model: a class name plus its ordered fields.
///
/// # Examples
///
/// ```
/// use xsd_model_core::{Model, ModelKind};
///
/// let enumeration = Model::enumeration("Type");
/// assert_eq!(enumeration.kind, ModelKind::Enumeration);
/// assert_eq!(enumeration.fields.len(), 1);
///
/// let list = Model::list_element("MovesListElement", "Move");
/// assert!(list.is_list_element());
/// assert_eq!(list.fields[2].target(), Some("Move"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Model {
    /// Normalized class name.
    pub class_name: ClassName,
    /// Model shape.
    #[serde(flatten)]
    pub kind: ModelKind,
    /// Ordered fields.
    pub fields: Vec<FieldSpec>,
    /// Label of the document this model was derived from.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

impl Model {
    /// Creates an enumeration model with its single bounded `value` field.
    pub fn enumeration(class_name: impl Into<ClassName>) -> Self {
        Self {
            class_name: class_name.into(),
            kind: ModelKind::Enumeration,
            fields: vec![FieldSpec::scalar(
                ENUMERATION_VALUE_FIELD,
                ScalarType::string(ENUMERATION_MAX_LENGTH),
            )],
            source: None,
        }
    }

    /// Creates an empty record model.
    pub fn record(class_name: impl Into<ClassName>) -> Self {
        Self {
            class_name: class_name.into(),
            kind: ModelKind::Record,
            fields: Vec::new(),
            source: None,
        }
    }

    /// Creates a list element model with its three synthetic leading fields.
    pub fn list_element(class_name: impl Into<ClassName>, element: impl Into<ClassName>) -> Self {
        let element = element.into();
        Self {
            class_name: class_name.into(),
            fields: vec![
                FieldSpec::scalar(LIST_ID_FIELD, ScalarType::integer()),
                FieldSpec::scalar(SEQUENCE_NUMBER_FIELD, ScalarType::integer()),
                FieldSpec::reference(ELEMENT_FIELD, element.clone()),
            ],
            kind: ModelKind::ListElement { element },
            source: None,
        }
    }

    /// Records the document this model came from.
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Appends a field.
    pub fn with_field(mut self, field: FieldSpec) -> Self {
        self.fields.push(field);
        self
    }

    pub fn is_list_element(&self) -> bool {
        matches!(self.kind, ModelKind::ListElement { .. })
    }

    pub fn is_enumeration(&self) -> bool {
        matches!(self.kind, ModelKind::Enumeration)
    }

    /// Finds a field by name.
    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Names of the classes this model points at, in field order.
    pub fn referenced_classes(&self) -> Vec<&str> {
        self.fields.iter().filter_map(FieldSpec::target).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_element_synthetic_fields() {
        let model = Model::list_element("MovesListElement", "Move");

        let names: Vec<&str> = model.fields.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["list_id", "sequence_number", "element"]);
        assert_eq!(model.fields[0].scalar_type(), Some(ScalarType::integer()));
        assert_eq!(model.fields[2].kind, FieldKind::Reference { target: "Move".into() });
        assert!(!model.fields[2].nullable);
    }

    #[test]
    fn test_enumeration_has_single_bounded_field() {
        let model = Model::enumeration("Type");
        assert_eq!(model.fields.len(), 1);
        assert_eq!(model.fields[0].name, "value");
        assert_eq!(
            model.fields[0].scalar_type(),
            Some(ScalarType::String { max_length: 50 })
        );
    }

    #[test]
    fn test_referenced_classes_skip_scalars() {
        let model = Model::record("Pokemon")
            .with_field(FieldSpec::scalar("name", ScalarType::string(500)))
            .with_field(FieldSpec::reference("ability", "Ability"))
            .with_field(FieldSpec::foreign_list("moves", "MovesListElement"));
        assert_eq!(model.referenced_classes(), vec!["Ability", "MovesListElement"]);
    }

    #[test]
    fn test_model_serde_shape() {
        let model = Model::list_element("TmSetListElement", "TmSet");
        let json = serde_json::to_value(&model).unwrap();
        assert_eq!(json["class_name"], "TmSetListElement");
        assert_eq!(json["shape"], "list_element");
        assert_eq!(json["element"], "TmSet");
        assert_eq!(json["fields"][0]["kind"], "scalar");
        assert_eq!(json["fields"][2]["kind"], "reference");
        assert_eq!(json["fields"][2]["target"], "TmSet");

        let back: Model = serde_json::from_value(json).unwrap();
        assert_eq!(back, model);
    }
}
