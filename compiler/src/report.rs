//! Structured compile reporting.

use serde::{Deserialize, Serialize};

use crate::context::ResolutionMode;
use crate::diagnostics::Diagnostic;
use crate::CompileOutcome;

/// Compilation phase a document was processed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Enumeration,
    Structure,
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Enumeration => write!(f, "enumeration"),
            Self::Structure => write!(f, "structure"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentStatus {
    Processed,
    Invalid,
}

/// Outcome for one input document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentReport {
    pub document: String,
    pub phase: Phase,
    pub status: DocumentStatus,
    /// Classes registered (or redefined, for enumerations) by this document.
    pub classes: Vec<String>,
    pub duplicates: usize,
    pub unresolved_references: usize,
}

impl DocumentReport {
    pub fn processed(document: impl Into<String>, phase: Phase) -> Self {
        Self {
            document: document.into(),
            phase,
            status: DocumentStatus::Processed,
            classes: Vec::new(),
            duplicates: 0,
            unresolved_references: 0,
        }
    }

    pub fn invalid(document: impl Into<String>, phase: Phase) -> Self {
        Self {
            status: DocumentStatus::Invalid,
            ..Self::processed(document, phase)
        }
    }

    pub fn is_processed(&self) -> bool {
        self.status == DocumentStatus::Processed
    }
}

/// Summary of one compiler run.
///
/// Unlike the [`ModelPackage`](xsd_model_core::ModelPackage) itself, the
/// report carries a generation timestamp.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompileReport {
    pub generated_at: String,
    pub compiler_version: String,
    pub package_version: String,
    pub resolution: ResolutionMode,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_hash: Option<String>,
    pub model_count: usize,
    pub enumeration_count: usize,
    pub record_count: usize,
    pub list_element_count: usize,
    pub warning_count: usize,
    pub documents: Vec<DocumentReport>,
    pub diagnostics: Vec<Diagnostic>,
    pub validation_errors: Vec<String>,
}

impl CompileReport {
    pub fn from_outcome(outcome: &CompileOutcome, resolution: ResolutionMode) -> Self {
        let (enumeration_count, record_count, list_element_count) = outcome.package.kind_counts();
        Self {
            generated_at: chrono::Utc::now().to_rfc3339(),
            compiler_version: env!("CARGO_PKG_VERSION").to_string(),
            package_version: outcome.package.version.clone(),
            resolution,
            content_hash: outcome.package.content_hash.clone(),
            model_count: outcome.package.model_count(),
            enumeration_count,
            record_count,
            list_element_count,
            warning_count: outcome.diagnostics.iter().filter(|d| d.is_warning()).count(),
            documents: outcome.documents.clone(),
            diagnostics: outcome.diagnostics.clone(),
            validation_errors: outcome
                .validation_errors
                .iter()
                .map(ToString::to_string)
                .collect(),
        }
    }

    pub fn invalid_documents(&self) -> impl Iterator<Item = &DocumentReport> {
        self.documents.iter().filter(|d| !d.is_processed())
    }

    /// True when no document was skipped, no reference was dropped and the
    /// package passed validation.
    pub fn is_clean(&self) -> bool {
        self.warning_count == 0
            && self.invalid_documents().next().is_none()
            && self.validation_errors.is_empty()
    }
}
