//! Core model types and shared primitives for XSD-derived data models.
//!
//! This crate defines the output unit of the schema-to-model compiler and the
//! rules used to name it:
//!
//! - [`Model`]: a normalized class name with ordered [`FieldSpec`]s, shaped as
//!   an enumeration, a record, or a list element ([`ModelKind`]).
//! - [`ModelRegistry`]: insertion-ordered class name → model mapping with
//!   first-definition-wins semantics.
//! - [`ModelPackage`]: a versioned, serializable bundle of models handed to
//!   emitters.
//! - Naming rules ([`to_camel_case`], [`singularize`],
//!   [`enumeration_class_name`], [`ReservedWords`]).
//!
//! Validation ([`validate_model`], [`validate_package`]) catches structural
//! problems such as duplicate fields and references to unknown classes.
//!
//! # Example
//!
//! ```
//! use xsd_model_core::*;
//!
//! let mut registry = ModelRegistry::new();
//! registry.insert(Model::enumeration(enumeration_class_name("pokemon_type", "Pokemon"))).unwrap();
//!
//! let class = to_camel_case("moves");
//! registry
//!     .insert(Model::record(singularize(&class)).with_field(FieldSpec::reference("type", "Type")))
//!     .unwrap();
//!
//! let package = ModelPackage::from_registry("1.0.0", registry);
//! assert_eq!(package.models[0].class_name, "Type");
//! assert_eq!(package.models[1].class_name, "Move");
//! assert!(validate_package(&package).is_empty());
//! ```

mod naming;
mod package;
mod registry;
mod types;
mod validate;

pub use naming::{
    DEFAULT_BRAND_SUBSTRING, RESERVED_SUFFIX, ReservedWords, Target, enumeration_class_name,
    list_element_base, normalize_field_name, singularize, to_camel_case, to_snake_case,
};
pub use package::ModelPackage;
pub use registry::{ModelRegistry, RegistryError};
pub use types::*;
pub use validate::{ValidationError, validate_model, validate_package};
