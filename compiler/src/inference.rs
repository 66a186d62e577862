//! Structural model inference.
//!
//! Each element declaration with child elements becomes a record, or a list
//! element when exactly one of its descendants is marked `minOccurs="1"`.
//! Remaining descendants become fields in document order:
//!
//! | child declaration                        | field                       |
//! |------------------------------------------|-----------------------------|
//! | `type="xs:string" minOccurs="0"`         | nullable string (500)       |
//! | `type="xs:string"`                       | string (500)                |
//! | `type="xs:integer"` / `xs:positiveInteger` | integer, default 0        |
//! | `type="xs:date"`                         | date/time                   |
//! | any other or missing type                | string (500)                |
//! | `ref="x"`, `X` is a record               | reference to `X`            |
//! | `ref="x"`, `X` or `XListElement` is a list | list id of that class     |
//!
//! References only resolve against classes registered *before* the element
//! is processed. Anything else is dropped with a warning.

use tracing::{debug, info};
use xsd_model_core::{
    FieldSpec, LIST_ELEMENT_SUFFIX, Model, ModelRegistry, ReservedWords, STRING_MAX_LENGTH,
    ScalarType, singularize, to_camel_case,
};

use crate::context::CompileContext;
use crate::diagnostics::Diagnostic;
use crate::report::{DocumentReport, Phase};
use crate::xsd::{ChildTarget, ComplexElementDeclaration, DeclaredType, SchemaDocument};

/// Class name and shape chosen for an element declaration.
///
/// Returns `(class_name, listed_element)`; `listed_element` is set when the
/// declaration is a list wrapper.
///
/// # Examples
///
/// ```
/// use xsd_model_compiler::inference::structural_class_name;
///
/// assert_eq!(structural_class_name("moves", 1), ("MovesListElement".into(), Some("Move".into())));
/// assert_eq!(structural_class_name("move", 0), ("Move".into(), None));
/// assert_eq!(structural_class_name("type_effectiveness", 2), ("TypeEffectiveness".into(), None));
/// ```
pub fn structural_class_name(raw: &str, required_children: usize) -> (String, Option<String>) {
    let class_name = to_camel_case(raw);
    if required_children == 1 {
        let element = singularize(&class_name).to_string();
        (format!("{class_name}{LIST_ELEMENT_SUFFIX}"), Some(element))
    } else {
        (class_name, None)
    }
}

/// Infers models for every complex element of `doc`, in document order.
pub fn infer_document(doc: &SchemaDocument, ctx: &mut CompileContext) {
    info!(document = %doc.label, "Processing schema document");
    let mut report = DocumentReport::processed(&doc.label, Phase::Structure);

    for element in &doc.elements {
        infer_element(element, &doc.label, ctx, &mut report);
    }

    ctx.record_document(report);
}

fn infer_element(
    element: &ComplexElementDeclaration,
    document: &str,
    ctx: &mut CompileContext,
    report: &mut DocumentReport,
) {
    let Some(raw) = element.raw_name.as_deref().filter(|n| !n.is_empty()) else {
        return;
    };
    let (class_name, listed) = structural_class_name(raw, element.required_children.len());

    if ctx.registry().has(&class_name) {
        report.duplicates += 1;
        ctx.push_diagnostic(Diagnostic::DuplicateClass {
            document: document.to_string(),
            class_name,
        });
        return;
    }

    let mut model = match listed {
        Some(listed) => Model::list_element(&class_name, listed),
        None => Model::record(&class_name),
    };

    for field in &element.fields {
        match &field.target {
            ChildTarget::Named {
                name,
                declared_type,
            } => {
                let reserved = &ctx.options().reserved_words;
                model.fields.push(scalar_field(
                    name,
                    declared_type.as_ref(),
                    field.min_occurs.as_deref(),
                    reserved,
                ));
            }
            ChildTarget::Reference(reference) => {
                match resolve_reference(reference, ctx.registry()) {
                    Some(spec) => model.fields.push(spec),
                    None => {
                        report.unresolved_references += 1;
                        ctx.push_diagnostic(Diagnostic::UnresolvedReference {
                            document: document.to_string(),
                            class_name: class_name.clone(),
                            reference: reference.clone(),
                        });
                    }
                }
            }
            ChildTarget::Anonymous => {
                debug!(class = %class_name, "Skipping child element without name or ref");
            }
        }
    }

    let model = model.with_source(document);
    let field_count = model.fields.len();
    match ctx.registry_mut().insert(model) {
        Ok(()) => {
            info!(class = %class_name, fields = field_count, "New class");
            report.classes.push(class_name);
        }
        Err(e) => {
            debug!(error = %e, "Registry rejected inferred class");
            report.duplicates += 1;
            ctx.push_diagnostic(Diagnostic::DuplicateClass {
                document: document.to_string(),
                class_name,
            });
        }
    }
}

/// Maps a named child declaration to a scalar field.
///
/// # Examples
///
/// ```
/// use xsd_model_compiler::inference::scalar_field;
/// use xsd_model_compiler::xsd::DeclaredType;
/// use xsd_model_core::{ReservedWords, ScalarType, Target};
///
/// let reserved = ReservedWords::for_target(Target::Django);
/// let string = DeclaredType::Builtin("string".into());
///
/// let field = scalar_field("nickname", Some(&string), Some("0"), &reserved);
/// assert!(field.nullable);
///
/// let field = scalar_field("type", Some(&DeclaredType::Other("pokemon_type".into())), None, &reserved);
/// assert_eq!(field.name, "type_1");
/// assert_eq!(field.scalar_type(), Some(ScalarType::String { max_length: 500 }));
/// ```
pub fn scalar_field(
    name: &str,
    declared_type: Option<&DeclaredType>,
    min_occurs: Option<&str>,
    reserved: &ReservedWords,
) -> FieldSpec {
    let name = reserved.normalize_field_name(name);
    match declared_type.and_then(DeclaredType::builtin) {
        Some("string") => {
            let field = FieldSpec::scalar(name, ScalarType::string(STRING_MAX_LENGTH));
            if min_occurs == Some("0") {
                field.nullable()
            } else {
                field
            }
        }
        Some("positiveInteger" | "integer") => {
            FieldSpec::scalar(name, ScalarType::Integer { default: Some(0) })
        }
        Some("date") => FieldSpec::scalar(name, ScalarType::DateTime),
        _ => FieldSpec::scalar(name, ScalarType::string(STRING_MAX_LENGTH)),
    }
}

/// Resolves a `ref` child against the registry.
///
/// Tries the CamelCase class name first, then its list element variant. The
/// field keeps the raw reference as its name.
///
/// # Examples
///
/// ```
/// use xsd_model_compiler::inference::resolve_reference;
/// use xsd_model_core::{FieldKind, Model, ModelRegistry};
///
/// let mut registry = ModelRegistry::new();
/// registry.insert(Model::record("Ability")).unwrap();
/// registry.insert(Model::list_element("MovesListElement", "Move")).unwrap();
///
/// let ability = resolve_reference("ability", &registry).unwrap();
/// assert_eq!(ability.kind, FieldKind::Reference { target: "Ability".into() });
///
/// let moves = resolve_reference("moves", &registry).unwrap();
/// assert_eq!(moves.kind, FieldKind::ForeignList { target: "MovesListElement".into() });
///
/// assert!(resolve_reference("nature", &registry).is_none());
/// ```
pub fn resolve_reference(reference: &str, registry: &ModelRegistry) -> Option<FieldSpec> {
    let plain = to_camel_case(reference);
    let target = if registry.has(&plain) {
        plain
    } else {
        let listed = format!("{plain}{LIST_ELEMENT_SUFFIX}");
        if !registry.has(&listed) {
            return None;
        }
        listed
    };

    let model = registry.get(&target)?;
    if model.is_list_element() {
        Some(FieldSpec::foreign_list(reference, target))
    } else {
        Some(FieldSpec::reference(reference, target))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::CompileOptions;
    use crate::xsd::XS_NS;
    use xsd_model_core::{FieldKind, ModelKind};

    fn compile_one(ctx: &mut CompileContext, label: &str, body: &str) {
        let xsd = format!(r#"<xs:schema xmlns:xs="{XS_NS}">{body}</xs:schema>"#);
        let doc = SchemaDocument::parse(label, &xsd).unwrap();
        infer_document(&doc, ctx);
    }

    #[test]
    fn test_record_with_typed_fields() {
        let mut ctx = CompileContext::new(CompileOptions::default());
        compile_one(
            &mut ctx,
            "move.xsd",
            r#"<xs:element name="move"><xs:complexType><xs:sequence>
                 <xs:element name="name" type="xs:string"/>
                 <xs:element name="description" type="xs:string" minOccurs="0"/>
                 <xs:element name="power" type="xs:positiveInteger"/>
                 <xs:element name="introduced" type="xs:date"/>
                 <xs:element name="type" type="pokemon_type"/>
               </xs:sequence></xs:complexType></xs:element>"#,
        );

        let model = ctx.registry().get("Move").unwrap();
        assert_eq!(model.kind, ModelKind::Record);
        let summary: Vec<_> = model
            .fields
            .iter()
            .map(|f| (f.name.as_str(), f.scalar_type(), f.nullable))
            .collect();
        assert_eq!(
            summary,
            vec![
                ("name", Some(ScalarType::string(500)), false),
                ("description", Some(ScalarType::string(500)), true),
                ("power", Some(ScalarType::Integer { default: Some(0) }), false),
                ("introduced", Some(ScalarType::DateTime), false),
                ("type_1", Some(ScalarType::string(500)), false),
            ]
        );
    }

    #[test]
    fn test_single_required_child_makes_list_element() {
        let mut ctx = CompileContext::new(CompileOptions::default());
        compile_one(
            &mut ctx,
            "tm_set.xsd",
            r#"<xs:element name="tm_set"><xs:complexType><xs:sequence>
                 <xs:element name="tm" minOccurs="1" maxOccurs="unbounded">
                   <xs:complexType><xs:sequence>
                     <xs:element name="number" type="xs:integer"/>
                   </xs:sequence></xs:complexType>
                 </xs:element>
               </xs:sequence></xs:complexType></xs:element>"#,
        );

        let model = ctx.registry().get("TmSetListElement").unwrap();
        assert_eq!(
            model.kind,
            ModelKind::ListElement {
                element: "TmSet".into()
            }
        );
        let names: Vec<_> = model.fields.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["list_id", "sequence_number", "element", "number"]);
        // The nested element itself has no required children and is a record.
        assert!(ctx.registry().has("Tm"));
    }

    #[test]
    fn test_two_required_children_make_a_record() {
        let mut ctx = CompileContext::new(CompileOptions::default());
        compile_one(
            &mut ctx,
            "pair.xsd",
            r#"<xs:element name="pairs"><xs:complexType><xs:sequence>
                 <xs:element name="a" type="xs:string" minOccurs="1"/>
                 <xs:element name="b" type="xs:string" minOccurs="1"/>
               </xs:sequence></xs:complexType></xs:element>"#,
        );
        let model = ctx.registry().get("Pairs").unwrap();
        assert_eq!(model.kind, ModelKind::Record);
        assert!(model.fields.is_empty());
    }

    #[test]
    fn test_forward_reference_is_dropped_with_warning() {
        let mut ctx = CompileContext::new(CompileOptions::default());
        compile_one(
            &mut ctx,
            "pokemon.xsd",
            r#"<xs:element name="pokemon"><xs:complexType><xs:sequence>
                 <xs:element ref="ability"/>
                 <xs:element name="name" type="xs:string"/>
               </xs:sequence></xs:complexType></xs:element>
               <xs:element name="ability"><xs:complexType><xs:sequence>
                 <xs:element name="name" type="xs:string"/>
               </xs:sequence></xs:complexType></xs:element>"#,
        );

        let pokemon = ctx.registry().get("Pokemon").unwrap();
        assert_eq!(pokemon.fields.len(), 1);
        assert_eq!(
            ctx.diagnostics(),
            &[Diagnostic::UnresolvedReference {
                document: "pokemon.xsd".into(),
                class_name: "Pokemon".into(),
                reference: "ability".into(),
            }]
        );
        assert_eq!(ctx.documents()[0].unresolved_references, 1);
    }

    #[test]
    fn test_reference_to_list_element_becomes_list_id() {
        let mut ctx = CompileContext::new(CompileOptions::default());
        compile_one(
            &mut ctx,
            "learnset.xsd",
            r#"<xs:element name="learnset"><xs:complexType><xs:sequence>
                 <xs:element ref="move" minOccurs="1"/>
               </xs:sequence></xs:complexType></xs:element>
               <xs:element name="pokemon"><xs:complexType><xs:sequence>
                 <xs:element ref="learnset" minOccurs="0"/>
               </xs:sequence></xs:complexType></xs:element>"#,
        );

        let pokemon = ctx.registry().get("Pokemon").unwrap();
        assert_eq!(
            pokemon.fields[0].kind,
            FieldKind::ForeignList {
                target: "LearnsetListElement".into()
            }
        );
        assert_eq!(pokemon.fields[0].name, "learnset");
    }

    #[test]
    fn test_duplicate_structural_class_keeps_first() {
        let mut ctx = CompileContext::new(CompileOptions::default());
        compile_one(
            &mut ctx,
            "a.xsd",
            r#"<xs:element name="form"><xs:complexType><xs:sequence>
                 <xs:element name="name" type="xs:string"/>
               </xs:sequence></xs:complexType></xs:element>"#,
        );
        compile_one(
            &mut ctx,
            "b.xsd",
            r#"<xs:element name="form"><xs:complexType><xs:sequence>
                 <xs:element name="power" type="xs:integer"/>
               </xs:sequence></xs:complexType></xs:element>"#,
        );

        let form = ctx.registry().get("Form").unwrap();
        assert_eq!(form.fields[0].name, "name");
        assert_eq!(form.source.as_deref(), Some("a.xsd"));
        assert_eq!(ctx.documents()[1].duplicates, 1);
        assert!(!ctx.diagnostics()[0].is_warning());
    }

    #[test]
    fn test_enumeration_name_collision_is_duplicate() {
        let mut ctx = CompileContext::new(CompileOptions::default());
        ctx.registry_mut().insert(Model::enumeration("Type")).unwrap();
        compile_one(
            &mut ctx,
            "types.xsd",
            r#"<xs:element name="type"><xs:complexType><xs:sequence>
                 <xs:element name="name" type="xs:string"/>
               </xs:sequence></xs:complexType></xs:element>"#,
        );
        assert!(ctx.registry().get("Type").unwrap().is_enumeration());
        assert_eq!(ctx.diagnostics().len(), 1);
    }

    #[test]
    fn test_self_reference_is_unresolved() {
        let mut ctx = CompileContext::new(CompileOptions::default());
        compile_one(
            &mut ctx,
            "evo.xsd",
            r#"<xs:element name="evolution"><xs:complexType><xs:sequence>
                 <xs:element ref="evolution" minOccurs="0"/>
                 <xs:element name="level" type="xs:integer"/>
               </xs:sequence></xs:complexType></xs:element>"#,
        );
        assert_eq!(ctx.registry().get("Evolution").unwrap().fields.len(), 1);
        assert!(ctx.diagnostics()[0].is_warning());
    }
}
