use serde::{Deserialize, Serialize};

use crate::{Model, ModelKind, ModelRegistry};

/// Serializable, ordered bundle of inferred models.
///
/// A package is the artifact handed to emitters: the registry's models in
/// first-insertion order plus version metadata. It carries no timestamps, so
/// compiling the same inputs twice yields byte-identical packages.
///
/// # Examples
///
/// ```
/// use xsd_model_core::*;
///
/// let mut registry = ModelRegistry::new();
/// registry.insert(Model::enumeration("Type")).unwrap();
/// registry.insert(Model::record("Move")).unwrap();
///
/// let package = ModelPackage::from_registry("1.0.0", registry);
/// assert_eq!(package.model_count(), 2);
/// assert!(package.find("Move").is_some());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelPackage {
    /// Model contract version (populated from
    /// [`MODEL_CONTRACT_VERSION`](crate::MODEL_CONTRACT_VERSION)).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema_version: Option<String>,
    /// Package format version (semver string).
    pub version: String,
    /// Optional package name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Optional hash of the deterministic model content.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_hash: Option<String>,
    /// Models in registration order.
    pub models: Vec<Model>,
}

impl ModelPackage {
    /// Creates an empty package.
    pub fn new(version: impl Into<String>) -> Self {
        Self {
            schema_version: Some(crate::MODEL_CONTRACT_VERSION.to_string()),
            version: version.into(),
            name: None,
            content_hash: None,
            models: Vec::new(),
        }
    }

    /// Creates a package holding every model of `registry`, in order.
    pub fn from_registry(version: impl Into<String>, registry: ModelRegistry) -> Self {
        let mut package = Self::new(version);
        package.models = registry.into_models();
        package
    }

    pub fn model_count(&self) -> usize {
        self.models.len()
    }

    pub fn find(&self, class_name: &str) -> Option<&Model> {
        self.models.iter().find(|m| m.class_name == class_name)
    }

    /// Counts models of each shape: `(enumerations, records, list elements)`.
    pub fn kind_counts(&self) -> (usize, usize, usize) {
        self.models
            .iter()
            .fold((0, 0, 0), |(e, r, l), model| match model.kind {
                ModelKind::Enumeration => (e + 1, r, l),
                ModelKind::Record => (e, r + 1, l),
                ModelKind::ListElement { .. } => (e, r, l + 1),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_counts() {
        let mut package = ModelPackage::new("1.0.0");
        package.models.push(Model::enumeration("Type"));
        package.models.push(Model::enumeration("LearnMethod"));
        package.models.push(Model::record("Move"));
        package.models.push(Model::list_element("MovesListElement", "Move"));
        assert_eq!(package.kind_counts(), (2, 1, 1));
    }

    #[test]
    fn test_optional_fields_omitted_from_json() {
        let package = ModelPackage::new("1.0.0");
        let json = serde_json::to_string(&package).unwrap();
        assert!(!json.contains("content_hash"));
        assert!(!json.contains("\"name\""));
        assert!(json.contains("\"schema_version\":\"1.0.0\""));
    }
}
