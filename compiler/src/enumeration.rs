//! Enumeration collection.
//!
//! Every named `xs:simpleType` in an enumeration document registers a model
//! with a single bounded string column. Restrictions and facets are not read:
//! the enumerated values live in the data, not in the model.

use tracing::{debug, info};
use xsd_model_core::{Model, enumeration_class_name};

use crate::context::CompileContext;
use crate::report::{DocumentReport, Phase};
use crate::xsd::{DocumentSource, SchemaDocument};

/// Loads each source in order and registers its enumerations.
///
/// Unreadable or malformed documents are recorded as parse failures and
/// skipped.
pub fn collect_enumerations(sources: &[DocumentSource], ctx: &mut CompileContext) {
    for source in sources {
        match source.load() {
            Ok(doc) => register_enumerations(&doc, ctx),
            Err(e) => ctx.document_failed(source.label(), Phase::Enumeration, e.to_string()),
        }
    }
}

/// Registers one enumeration model per named simple type in `doc`.
///
/// A class name seen before (in this or an earlier enumeration document) is
/// replaced in place: the last definition wins and no diagnostic is raised.
pub fn register_enumerations(doc: &SchemaDocument, ctx: &mut CompileContext) {
    info!(document = %doc.label, "Processing enumeration document");
    let mut report = DocumentReport::processed(&doc.label, Phase::Enumeration);

    for declaration in &doc.simple_types {
        let Some(raw) = declaration.raw_name.as_deref().filter(|n| !n.is_empty()) else {
            continue;
        };
        let class_name = enumeration_class_name(raw, &ctx.options().brand_substring);
        let model = Model::enumeration(class_name.clone()).with_source(&doc.label);

        if ctx.registry_mut().replace(model).is_some() {
            debug!(class = %class_name, document = %doc.label, "Enumeration redefined");
        } else {
            info!(class = %class_name, "New enumeration");
        }
        report.classes.push(class_name);
    }

    ctx.record_document(report);
}
