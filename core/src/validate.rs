//! Model and package validation.
//!
//! Checks structural invariants of inferred models before they reach an
//! emitter: identifier syntax, duplicate fields, the fixed shapes of
//! enumeration and list element models, and references that point at classes
//! missing from the package. Compilation never fails on these findings; they
//! are surfaced next to the compile diagnostics.
//!
//! # Examples
//!
//! ```
//! use xsd_model_core::*;
//!
//! let mut package = ModelPackage::new("1.0.0");
//! package.models.push(Model::record("Move"));
//! package.models.push(Model::list_element("MovesListElement", "Move"));
//! assert!(validate_package(&package).is_empty());
//!
//! // The listed element type is missing from the package.
//! let mut broken = ModelPackage::new("1.0.0");
//! broken.models.push(Model::list_element("MovesListElement", "Move"));
//! assert!(!validate_package(&broken).is_empty());
//! ```

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;

use crate::{
    ELEMENT_FIELD, FieldKind, LIST_ID_FIELD, Model, ModelKind, ModelPackage, SEQUENCE_NUMBER_FIELD,
};

static IDENTIFIER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("static regex must compile"));

/// Model/package validation errors.
///
/// Each variant describes one structural problem. The `Display` impl provides
/// a human-readable message.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Package version string is empty.
    #[error("package version cannot be empty")]
    EmptyPackageVersion,
    /// Class name is empty.
    #[error("model class name cannot be empty")]
    EmptyClassName,
    /// Class name is not a valid identifier.
    #[error("invalid class name: {0}")]
    InvalidClassName(String),
    /// Field name is not a valid identifier.
    #[error("invalid field name in {class}: {field}")]
    InvalidFieldName { class: String, field: String },
    /// Two models in the same package share a class name.
    #[error("duplicate class in package: {0}")]
    DuplicateClass(String),
    /// Two fields in the same model share a name.
    #[error("duplicate field in {class}: {field}")]
    DuplicateField { class: String, field: String },
    /// An enumeration does not consist of exactly one string field.
    #[error("enumeration {0} must have exactly one string field")]
    InvalidEnumeration(String),
    /// A list element does not start with its synthetic fields.
    #[error("list element {0} must start with list_id, sequence_number and element")]
    InvalidListElement(String),
    /// A reference or list-id field names a class absent from the package.
    #[error("{class}.{field} references unknown class {target}")]
    DanglingReference {
        class: String,
        field: String,
        target: String,
    },
}

/// Validates a full model package.
///
/// Checks the version string, duplicate class names, each model individually,
/// and that every reference target is present in the package. All findings
/// are returned, in model order.
pub fn validate_package(package: &ModelPackage) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    if package.version.trim().is_empty() {
        errors.push(ValidationError::EmptyPackageVersion);
    }

    let known: HashSet<&str> = package.models.iter().map(|m| m.class_name.as_str()).collect();
    let mut seen: HashSet<&str> = HashSet::new();

    for model in &package.models {
        if !seen.insert(model.class_name.as_str()) {
            errors.push(ValidationError::DuplicateClass(model.class_name.clone()));
        }
        errors.extend(validate_model(model));

        for field in &model.fields {
            if let Some(target) = field.target() {
                if !known.contains(target) {
                    errors.push(ValidationError::DanglingReference {
                        class: model.class_name.clone(),
                        field: field.name.clone(),
                        target: target.to_string(),
                    });
                }
            }
        }
    }

    errors
}

/// Validates a single model in isolation.
///
/// # Examples
///
/// ```
/// use xsd_model_core::*;
///
/// let model = Model::record("Move")
///     .with_field(FieldSpec::scalar("name", ScalarType::string(500)))
///     .with_field(FieldSpec::scalar("name", ScalarType::string(500)));
///
/// let errors = validate_model(&model);
/// assert!(errors.iter().any(|e| matches!(e, ValidationError::DuplicateField { .. })));
/// ```
pub fn validate_model(model: &Model) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    if model.class_name.is_empty() {
        errors.push(ValidationError::EmptyClassName);
        return errors;
    }
    if !IDENTIFIER_RE.is_match(&model.class_name) {
        errors.push(ValidationError::InvalidClassName(model.class_name.clone()));
    }

    let mut seen = HashSet::new();
    for field in &model.fields {
        if !IDENTIFIER_RE.is_match(&field.name) {
            errors.push(ValidationError::InvalidFieldName {
                class: model.class_name.clone(),
                field: field.name.clone(),
            });
        }
        if !seen.insert(field.name.as_str()) {
            errors.push(ValidationError::DuplicateField {
                class: model.class_name.clone(),
                field: field.name.clone(),
            });
        }
    }

    match &model.kind {
        ModelKind::Enumeration => {
            let well_formed = model.fields.len() == 1
                && matches!(
                    model.fields[0].scalar_type(),
                    Some(crate::ScalarType::String { .. })
                );
            if !well_formed {
                errors.push(ValidationError::InvalidEnumeration(model.class_name.clone()));
            }
        }
        ModelKind::ListElement { element } => {
            if !has_list_prefix(model, element) {
                errors.push(ValidationError::InvalidListElement(model.class_name.clone()));
            }
        }
        ModelKind::Record => {}
    }

    errors
}

fn has_list_prefix(model: &Model, element: &str) -> bool {
    let [list_id, sequence, element_field, ..] = model.fields.as_slice() else {
        return false;
    };
    list_id.name == LIST_ID_FIELD
        && sequence.name == SEQUENCE_NUMBER_FIELD
        && element_field.name == ELEMENT_FIELD
        && matches!(&element_field.kind, FieldKind::Reference { target } if target == element)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{FieldSpec, ScalarType};

    #[test]
    fn test_validate_package_rejects_duplicate_classes() {
        let mut package = ModelPackage::new("1.0.0");
        package.models.push(Model::record("Move"));
        package.models.push(Model::record("Move"));

        let errors = validate_package(&package);
        assert_eq!(errors, vec![ValidationError::DuplicateClass("Move".to_string())]);
    }

    #[test]
    fn test_validate_package_reports_dangling_list_id() {
        let mut package = ModelPackage::new("1.0.0");
        package
            .models
            .push(Model::record("Pokemon").with_field(FieldSpec::foreign_list("moves", "MovesListElement")));

        let errors = validate_package(&package);
        assert_eq!(
            errors,
            vec![ValidationError::DanglingReference {
                class: "Pokemon".into(),
                field: "moves".into(),
                target: "MovesListElement".into(),
            }]
        );
    }

    #[test]
    fn test_validate_model_rejects_bad_identifiers() {
        let model = Model::record("Learn-Method")
            .with_field(FieldSpec::scalar("2nd", ScalarType::integer()));
        let errors = validate_model(&model);
        assert!(errors.contains(&ValidationError::InvalidClassName("Learn-Method".into())));
        assert!(errors.contains(&ValidationError::InvalidFieldName {
            class: "Learn-Method".into(),
            field: "2nd".into(),
        }));
    }

    #[test]
    fn test_validate_model_empty_class_name() {
        assert_eq!(
            validate_model(&Model::enumeration("")),
            vec![ValidationError::EmptyClassName]
        );
    }

    #[test]
    fn test_validate_model_enumeration_shape() {
        let mut model = Model::enumeration("Type");
        assert!(validate_model(&model).is_empty());

        model.fields.push(FieldSpec::scalar("extra", ScalarType::integer()));
        assert_eq!(
            validate_model(&model),
            vec![ValidationError::InvalidEnumeration("Type".into())]
        );
    }

    #[test]
    fn test_validate_model_list_element_shape() {
        let mut model = Model::list_element("MovesListElement", "Move");
        assert!(validate_model(&model).is_empty());

        model.fields.remove(1);
        assert_eq!(
            validate_model(&model),
            vec![ValidationError::InvalidListElement("MovesListElement".into())]
        );
    }

    #[test]
    fn test_underscored_enumeration_name_is_valid() {
        assert!(validate_model(&Model::enumeration("Learn_method")).is_empty());
    }
}
