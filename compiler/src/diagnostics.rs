//! Compile diagnostics.
//!
//! A compilation never aborts on a bad document or an unresolved reference.
//! Each problem is recorded as a [`Diagnostic`] and the run continues with the
//! next declaration or document.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// How serious a diagnostic is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// Expected in normal runs (redefinitions, skipped documents).
    Notice,
    /// Output is missing something the schema asked for.
    Warning,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Notice => write!(f, "notice"),
            Self::Warning => write!(f, "warning"),
        }
    }
}

/// One problem found while compiling.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Diagnostic {
    /// The document could not be read or parsed and was skipped.
    #[error("INVALID: {document}: {detail}")]
    ParseFailure { document: String, detail: String },

    /// A reference named a class that was not registered yet; the field was
    /// omitted.
    #[error("{document}: reference \"{reference}\" in {class_name} used before being defined")]
    UnresolvedReference {
        document: String,
        class_name: String,
        reference: String,
    },

    /// A structural class name was already registered; the declaration was
    /// ignored.
    #[error("{document}: duplicate class {class_name}")]
    DuplicateClass { document: String, class_name: String },
}

impl Diagnostic {
    pub fn severity(&self) -> Severity {
        match self {
            Self::UnresolvedReference { .. } => Severity::Warning,
            Self::ParseFailure { .. } | Self::DuplicateClass { .. } => Severity::Notice,
        }
    }

    /// Label of the document the diagnostic belongs to.
    pub fn document(&self) -> &str {
        match self {
            Self::ParseFailure { document, .. }
            | Self::UnresolvedReference { document, .. }
            | Self::DuplicateClass { document, .. } => document,
        }
    }

    pub fn is_warning(&self) -> bool {
        self.severity() == Severity::Warning
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_display_matches_serde() {
        for (severity, expected) in [(Severity::Notice, "notice"), (Severity::Warning, "warning")] {
            assert_eq!(severity.to_string(), expected);
            assert_eq!(serde_json::to_string(&severity).unwrap(), format!("\"{expected}\""));
        }
    }

    #[test]
    fn test_only_unresolved_references_are_warnings() {
        let unresolved = Diagnostic::UnresolvedReference {
            document: "pokemon.xsd".into(),
            class_name: "Pokemon".into(),
            reference: "ability".into(),
        };
        let duplicate = Diagnostic::DuplicateClass {
            document: "form.xsd".into(),
            class_name: "Form".into(),
        };
        assert!(unresolved.is_warning());
        assert!(!duplicate.is_warning());
        assert_eq!(duplicate.document(), "form.xsd");
    }

    #[test]
    fn test_serialized_with_kind_tag() {
        let diag = Diagnostic::ParseFailure {
            document: "broken.xsd".into(),
            detail: "not well-formed".into(),
        };
        let json = serde_json::to_value(&diag).unwrap();
        assert_eq!(json["kind"], "parse_failure");
        assert_eq!(json["document"], "broken.xsd");
        assert_eq!(diag.to_string(), "INVALID: broken.xsd: not well-formed");
    }
}
