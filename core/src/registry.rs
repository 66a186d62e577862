//! Ordered model registry.
//!
//! The registry maps class names to models and remembers the order in which
//! classes were first registered, so emission is deterministic. A class name
//! is inserted at most once: later [`insert`](ModelRegistry::insert) calls for
//! the same name are rejected and leave the first definition in place.
//!
//! # Examples
//!
//! ```
//! use xsd_model_core::{Model, ModelRegistry, RegistryError};
//!
//! let mut registry = ModelRegistry::new();
//! registry.insert(Model::enumeration("Type")).unwrap();
//! registry.insert(Model::record("Move")).unwrap();
//!
//! let err = registry.insert(Model::record("Type")).unwrap_err();
//! assert_eq!(err, RegistryError::Duplicate("Type".into()));
//!
//! let names: Vec<&str> = registry.class_names().collect();
//! assert_eq!(names, vec!["Type", "Move"]);
//! ```

use std::collections::HashMap;

use thiserror::Error;

use crate::Model;

/// Registry mutation errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// A model with this class name is already registered.
    #[error("duplicate class: {0}")]
    Duplicate(String),
}

/// Insertion-ordered mapping from class name to [`Model`].
#[derive(Debug, Clone, Default)]
pub struct ModelRegistry {
    models: Vec<Model>,
    index: HashMap<String, usize>,
}

impl ModelRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if `class_name` is registered.
    pub fn has(&self, class_name: &str) -> bool {
        self.index.contains_key(class_name)
    }

    pub fn get(&self, class_name: &str) -> Option<&Model> {
        self.index.get(class_name).map(|&i| &self.models[i])
    }

    /// Registers a model under its class name.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::Duplicate`] without touching the registry if
    /// the class name is already present.
    pub fn insert(&mut self, model: Model) -> Result<(), RegistryError> {
        if self.has(&model.class_name) {
            return Err(RegistryError::Duplicate(model.class_name));
        }
        self.index
            .insert(model.class_name.clone(), self.models.len());
        self.models.push(model);
        Ok(())
    }

    /// Registers a model, replacing any existing model of the same name in
    /// place (its position in iteration order is kept).
    ///
    /// Returns the replaced model, if any.
    ///
    /// # Examples
    ///
    /// ```
    /// use xsd_model_core::{Model, ModelRegistry};
    ///
    /// let mut registry = ModelRegistry::new();
    /// registry.replace(Model::enumeration("Type"));
    /// registry.replace(Model::enumeration("Stat"));
    /// let old = registry.replace(Model::enumeration("Type").with_source("second.xsd"));
    ///
    /// assert!(old.is_some());
    /// assert_eq!(registry.class_names().collect::<Vec<_>>(), vec!["Type", "Stat"]);
    /// assert_eq!(registry.get("Type").unwrap().source.as_deref(), Some("second.xsd"));
    /// ```
    pub fn replace(&mut self, model: Model) -> Option<Model> {
        match self.index.get(&model.class_name) {
            Some(&i) => Some(std::mem::replace(&mut self.models[i], model)),
            None => {
                self.index
                    .insert(model.class_name.clone(), self.models.len());
                self.models.push(model);
                None
            }
        }
    }

    /// Iterates models in first-insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Model> {
        self.models.iter()
    }

    /// Ordered `(class name, model)` pairs, as consumed by emitters.
    pub fn all(&self) -> impl Iterator<Item = (&str, &Model)> {
        self.models.iter().map(|m| (m.class_name.as_str(), m))
    }

    pub fn class_names(&self) -> impl Iterator<Item = &str> {
        self.models.iter().map(|m| m.class_name.as_str())
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }

    /// Consumes the registry, returning models in first-insertion order.
    pub fn into_models(self) -> Vec<Model> {
        self.models
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{FieldSpec, ScalarType};

    #[test]
    fn test_first_definition_wins() {
        let mut registry = ModelRegistry::new();
        let first = Model::record("Move").with_field(FieldSpec::scalar("power", ScalarType::integer()));
        registry.insert(first.clone()).unwrap();

        let second = Model::record("Move").with_field(FieldSpec::scalar("name", ScalarType::string(500)));
        assert!(registry.insert(second).is_err());

        assert_eq!(registry.len(), 1);
        assert_eq!(registry.get("Move"), Some(&first));
    }

    #[test]
    fn test_iteration_follows_insertion_order() {
        let mut registry = ModelRegistry::new();
        for name in ["Zeta", "Alpha", "Mid"] {
            registry.insert(Model::record(name)).unwrap();
        }
        let names: Vec<&str> = registry.all().map(|(name, _)| name).collect();
        assert_eq!(names, vec!["Zeta", "Alpha", "Mid"]);
    }

    #[test]
    fn test_replace_inserts_when_absent() {
        let mut registry = ModelRegistry::new();
        assert!(registry.replace(Model::enumeration("Type")).is_none());
        assert!(registry.has("Type"));
    }

    #[test]
    fn test_empty_registry() {
        let registry = ModelRegistry::new();
        assert!(registry.is_empty());
        assert!(!registry.has("Anything"));
        assert!(registry.get("Anything").is_none());
        assert!(registry.into_models().is_empty());
    }
}
