//! Relational model inference from XML Schema documents.
//!
//! Compilation runs in two phases over caller-supplied document lists:
//!
//! 1. **Enumerations** ([`enumeration`]): every named `xs:simpleType` becomes a
//!    single-column enumeration model.
//! 2. **Structure** ([`inference`]): every `xs:element` with child elements
//!    becomes a record or a list element model, with typed scalar fields and
//!    references to previously registered classes.
//!
//! Invalid documents, duplicate classes and unresolved references are
//! reported as [`Diagnostic`]s; they never abort the run.
//!
//! # Main entry points
//!
//! - [`compile`]: compile enumeration and schema sources into a
//!   [`CompileOutcome`].
//! - [`config::CompileConfig`]: YAML description of the inputs, naming and
//!   lint targets.
//! - [`output::format_package`]: render a package as JSON, YAML, Markdown, a
//!   text table, or Django model source.
//! - [`lint::Linter`]: validate XML instances against their schema with
//!   `xmllint`.
//!
//! # Example
//!
//! ```
//! use xsd_model_compiler::{CompileInputs, CompileOptions, compile};
//! use xsd_model_compiler::xsd::DocumentSource;
//!
//! let ns = "http://www.w3.org/2001/XMLSchema";
//! let inputs = CompileInputs {
//!     enumerations: vec![DocumentSource::inline(
//!         "type.xsd",
//!         format!(r#"<xs:schema xmlns:xs="{ns}"><xs:simpleType name="pokemon_type"/></xs:schema>"#),
//!     )],
//!     schemas: vec![DocumentSource::inline(
//!         "move.xsd",
//!         format!(
//!             r#"<xs:schema xmlns:xs="{ns}">
//!                  <xs:element name="move"><xs:complexType><xs:sequence>
//!                    <xs:element name="name" type="xs:string"/>
//!                    <xs:element ref="type"/>
//!                  </xs:sequence></xs:complexType></xs:element>
//!                </xs:schema>"#
//!         ),
//!     )],
//! };
//!
//! let outcome = compile(&inputs, &CompileOptions::default());
//! let names: Vec<_> = outcome.package.models.iter().map(|m| m.class_name.as_str()).collect();
//! assert_eq!(names, vec!["Type", "Move"]);
//! assert!(outcome.diagnostics.is_empty());
//! ```

pub mod config;
pub mod context;
pub mod diagnostics;
pub mod enumeration;
pub mod error;
pub mod inference;
pub mod lint;
pub mod ordering;
pub mod output;
pub mod report;
pub mod xsd;

use sha2::{Digest, Sha256};
use tracing::{debug, info};
use xsd_model_core::{Model, ModelPackage, ValidationError, validate_package};

pub use context::{CompileContext, CompileOptions, ResolutionMode};
pub use diagnostics::{Diagnostic, Severity};
pub use error::{CompileError, Result};
pub use report::{CompileReport, DocumentReport};

use report::Phase;
use xsd::DocumentSource;

/// Ordered input document lists.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompileInputs {
    /// Documents scanned for named simple types, processed first.
    pub enumerations: Vec<DocumentSource>,
    /// Documents scanned for complex elements, processed second.
    pub schemas: Vec<DocumentSource>,
}

/// Everything one compilation produced.
#[derive(Debug, Clone)]
pub struct CompileOutcome {
    /// Inferred models in registration order, with a content hash.
    pub package: ModelPackage,
    pub diagnostics: Vec<Diagnostic>,
    pub documents: Vec<DocumentReport>,
    /// Structural findings on the finished package.
    pub validation_errors: Vec<ValidationError>,
}

impl CompileOutcome {
    pub fn warnings(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter().filter(|d| d.is_warning())
    }
}

/// Compiles enumeration and schema documents into a model package.
///
/// Enumeration documents are always processed first, in order. Schema
/// documents follow in caller order, or in dependency order when
/// `options.resolution` is [`ResolutionMode::DependencySorted`].
pub fn compile(inputs: &CompileInputs, options: &CompileOptions) -> CompileOutcome {
    info!(
        enumerations = inputs.enumerations.len(),
        schemas = inputs.schemas.len(),
        resolution = %options.resolution,
        "Compiling models"
    );
    let mut ctx = CompileContext::new(options.clone());

    enumeration::collect_enumerations(&inputs.enumerations, &mut ctx);

    match options.resolution {
        ResolutionMode::Ordered => {
            for source in &inputs.schemas {
                match source.load() {
                    Ok(doc) => inference::infer_document(&doc, &mut ctx),
                    Err(e) => ctx.document_failed(source.label(), Phase::Structure, e.to_string()),
                }
            }
        }
        ResolutionMode::DependencySorted => {
            let mut loaded = Vec::with_capacity(inputs.schemas.len());
            for source in &inputs.schemas {
                match source.load() {
                    Ok(doc) => loaded.push(doc),
                    Err(e) => ctx.document_failed(source.label(), Phase::Structure, e.to_string()),
                }
            }
            for doc in ordering::sort_documents(loaded) {
                inference::infer_document(&doc, &mut ctx);
            }
        }
    }

    let (registry, diagnostics, documents) = ctx.into_parts();
    let mut package = ModelPackage::from_registry(options.package_version.clone(), registry);
    package.content_hash = content_hash(&package.models);

    let validation_errors = validate_package(&package);
    for error in &validation_errors {
        debug!(error = %error, "Package validation finding");
    }

    info!(
        models = package.model_count(),
        diagnostics = diagnostics.len(),
        "Compilation finished"
    );

    CompileOutcome {
        package,
        diagnostics,
        documents,
        validation_errors,
    }
}

/// SHA-256 hex digest of the models' canonical JSON.
///
/// Identical inputs always hash identically; the digest changes with any
/// class, field, or ordering difference.
pub fn content_hash(models: &[Model]) -> Option<String> {
    let bytes = serde_json::to_vec(models).ok()?;
    Some(format!("{:x}", Sha256::digest(&bytes)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::xsd::XS_NS;

    fn schema(label: &str, body: &str) -> DocumentSource {
        DocumentSource::inline(label, format!(r#"<xs:schema xmlns:xs="{XS_NS}">{body}</xs:schema>"#))
    }

    fn element(name: &str, children: &str) -> String {
        format!(r#"<xs:element name="{name}"><xs:complexType><xs:sequence>{children}</xs:sequence></xs:complexType></xs:element>"#)
    }

    #[test]
    fn test_ordered_mode_drops_forward_references() {
        let inputs = CompileInputs {
            enumerations: vec![],
            schemas: vec![
                schema("pokemon.xsd", &element("pokemon", r#"<xs:element ref="ability"/>"#)),
                schema("ability.xsd", &element("ability", r#"<xs:element name="name" type="xs:string"/>"#)),
            ],
        };
        let outcome = compile(&inputs, &CompileOptions::default());
        assert_eq!(outcome.warnings().count(), 1);
        assert!(outcome.package.find("Pokemon").unwrap().fields.is_empty());
    }

    #[test]
    fn test_dependency_sorted_mode_resolves_forward_references() {
        let inputs = CompileInputs {
            enumerations: vec![],
            schemas: vec![
                schema("pokemon.xsd", &element("pokemon", r#"<xs:element ref="ability"/>"#)),
                schema("ability.xsd", &element("ability", r#"<xs:element name="name" type="xs:string"/>"#)),
            ],
        };
        let options = CompileOptions {
            resolution: ResolutionMode::DependencySorted,
            ..CompileOptions::default()
        };
        let outcome = compile(&inputs, &options);
        assert_eq!(outcome.warnings().count(), 0);

        let names: Vec<_> = outcome.package.models.iter().map(|m| m.class_name.as_str()).collect();
        assert_eq!(names, vec!["Ability", "Pokemon"]);
        assert_eq!(outcome.package.find("Pokemon").unwrap().fields[0].target(), Some("Ability"));
    }

    #[test]
    fn test_invalid_schema_document_is_skipped() {
        let inputs = CompileInputs {
            enumerations: vec![],
            schemas: vec![
                DocumentSource::inline("broken.xsd", "<xs:schema><unclosed>"),
                schema("game.xsd", &element("game", r#"<xs:element name="name" type="xs:string"/>"#)),
            ],
        };
        let outcome = compile(&inputs, &CompileOptions::default());
        assert_eq!(outcome.package.model_count(), 1);
        assert!(matches!(outcome.diagnostics[0], Diagnostic::ParseFailure { .. }));
        assert_eq!(outcome.documents.len(), 2);
    }

    #[test]
    fn test_empty_inputs_produce_empty_package() {
        let outcome = compile(&CompileInputs::default(), &CompileOptions::default());
        assert_eq!(outcome.package.model_count(), 0);
        assert!(outcome.diagnostics.is_empty());
        assert!(outcome.validation_errors.is_empty());
    }

    #[test]
    fn test_content_hash_is_deterministic() {
        let inputs = CompileInputs {
            enumerations: vec![schema("t.xsd", r#"<xs:simpleType name="stat"/>"#)],
            schemas: vec![schema("g.xsd", &element("game", r#"<xs:element name="name" type="xs:string"/>"#))],
        };
        let first = compile(&inputs, &CompileOptions::default());
        let second = compile(&inputs, &CompileOptions::default());
        assert!(first.package.content_hash.is_some());
        assert_eq!(first.package, second.package);
        assert_eq!(first.package.content_hash.as_ref().map(String::len), Some(64));
    }

    #[test]
    fn test_list_element_dangling_element_is_validation_finding() {
        let inputs = CompileInputs {
            enumerations: vec![],
            schemas: vec![schema(
                "tm_set.xsd",
                &element("tm_set", r#"<xs:element name="tm" type="xs:integer" minOccurs="1"/>"#),
            )],
        };
        let outcome = compile(&inputs, &CompileOptions::default());
        assert!(outcome.package.find("TmSetListElement").is_some());
        assert!(outcome.validation_errors.iter().any(|e| matches!(
            e,
            ValidationError::DanglingReference { target, .. } if target == "TmSet"
        )));
    }
}
