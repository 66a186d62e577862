//! Dependency ordering of structural documents.
//!
//! In [`ResolutionMode::DependencySorted`](crate::ResolutionMode) documents
//! are reordered so that a document defining a class comes before documents
//! referencing it. The sort is stable: among documents with no dependency
//! between them, caller order is kept. Cycles cannot be ordered; the earliest
//! remaining document is emitted and its forward references stay unresolved.

use std::collections::{BTreeSet, HashMap, HashSet};

use tracing::debug;
use xsd_model_core::{LIST_ELEMENT_SUFFIX, to_camel_case};

use crate::inference::structural_class_name;
use crate::xsd::{ChildTarget, SchemaDocument};

/// Class names a document would register.
fn defined_classes(doc: &SchemaDocument) -> HashSet<String> {
    doc.elements
        .iter()
        .filter_map(|e| {
            let raw = e.raw_name.as_deref().filter(|n| !n.is_empty())?;
            Some(structural_class_name(raw, e.required_children.len()).0)
        })
        .collect()
}

/// Class names a document's references could resolve to.
fn referenced_classes(doc: &SchemaDocument) -> HashSet<String> {
    doc.elements
        .iter()
        .flat_map(|e| e.fields.iter())
        .filter_map(|f| match &f.target {
            ChildTarget::Reference(reference) => Some(to_camel_case(reference)),
            _ => None,
        })
        .flat_map(|plain| {
            let listed = format!("{plain}{LIST_ELEMENT_SUFFIX}");
            [plain, listed]
        })
        .collect()
}

/// Returns the processing order for `docs` as indices into the slice.
///
/// # Examples
///
/// ```
/// use xsd_model_compiler::ordering::dependency_order;
/// use xsd_model_compiler::xsd::SchemaDocument;
///
/// let ns = "http://www.w3.org/2001/XMLSchema";
/// let pokemon = SchemaDocument::parse("pokemon.xsd", &format!(
///     r#"<xs:schema xmlns:xs="{ns}"><xs:element name="pokemon"><xs:complexType><xs:sequence>
///          <xs:element ref="ability"/>
///        </xs:sequence></xs:complexType></xs:element></xs:schema>"#)).unwrap();
/// let ability = SchemaDocument::parse("ability.xsd", &format!(
///     r#"<xs:schema xmlns:xs="{ns}"><xs:element name="ability"><xs:complexType><xs:sequence>
///          <xs:element name="name" type="xs:string"/>
///        </xs:sequence></xs:complexType></xs:element></xs:schema>"#)).unwrap();
///
/// assert_eq!(dependency_order(&[pokemon, ability]), vec![1, 0]);
/// ```
pub fn dependency_order(docs: &[SchemaDocument]) -> Vec<usize> {
    let defines: Vec<HashSet<String>> = docs.iter().map(defined_classes).collect();

    // First definer of each class wins, matching registry semantics.
    let mut definer: HashMap<&str, usize> = HashMap::new();
    for (i, classes) in defines.iter().enumerate() {
        for class in classes {
            definer.entry(class.as_str()).or_insert(i);
        }
    }

    let mut dependencies: Vec<BTreeSet<usize>> = vec![BTreeSet::new(); docs.len()];
    let mut dependents: Vec<Vec<usize>> = vec![Vec::new(); docs.len()];
    for (i, doc) in docs.iter().enumerate() {
        for class in referenced_classes(doc) {
            if let Some(&j) = definer.get(class.as_str()) {
                if j != i && dependencies[i].insert(j) {
                    dependents[j].push(i);
                }
            }
        }
    }

    let mut remaining: BTreeSet<usize> = (0..docs.len()).collect();
    let mut ready: BTreeSet<usize> = remaining
        .iter()
        .copied()
        .filter(|&i| dependencies[i].is_empty())
        .collect();
    let mut order = Vec::with_capacity(docs.len());

    while let Some(&first) = remaining.first() {
        let next = match ready.pop_first() {
            Some(i) => i,
            None => {
                debug!(document = %docs[first].label, "Dependency cycle, keeping caller order");
                first
            }
        };
        remaining.remove(&next);
        order.push(next);

        for &dependent in &dependents[next] {
            dependencies[dependent].remove(&next);
            if dependencies[dependent].is_empty() && remaining.contains(&dependent) {
                ready.insert(dependent);
            }
        }
    }

    order
}

/// Reorders documents by [`dependency_order`].
pub fn sort_documents(docs: Vec<SchemaDocument>) -> Vec<SchemaDocument> {
    let order = dependency_order(&docs);
    let mut slots: Vec<Option<SchemaDocument>> = docs.into_iter().map(Some).collect();
    order.into_iter().filter_map(|i| slots[i].take()).collect()
}
