//! Per-run compilation state.

use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use xsd_model_core::{DEFAULT_BRAND_SUBSTRING, ModelRegistry, ReservedWords, Target};

use crate::diagnostics::{Diagnostic, Severity};
use crate::report::{DocumentReport, Phase};

/// Order in which structural documents are processed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
#[serde(rename_all = "snake_case")]
pub enum ResolutionMode {
    /// Caller order. A reference resolves only against classes defined by
    /// enumerations or by earlier declarations.
    #[default]
    Ordered,
    /// Reorder documents so definitions come before their references,
    /// keeping caller order where there is no dependency.
    DependencySorted,
}

impl std::fmt::Display for ResolutionMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Ordered => write!(f, "ordered"),
            Self::DependencySorted => write!(f, "dependency_sorted"),
        }
    }
}

/// Knobs that change inferred names and processing order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompileOptions {
    /// Field names that get the reserved suffix.
    pub reserved_words: ReservedWords,
    /// Substring removed from enumeration class names.
    pub brand_substring: String,
    pub resolution: ResolutionMode,
    /// Version stamped on the produced package.
    pub package_version: String,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self::for_target(Target::Django)
    }
}

impl CompileOptions {
    /// Default options with the reserved words of `target`.
    pub fn for_target(target: Target) -> Self {
        Self {
            reserved_words: ReservedWords::for_target(target),
            brand_substring: DEFAULT_BRAND_SUBSTRING.to_string(),
            resolution: ResolutionMode::default(),
            package_version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

/// Mutable state threaded through one compilation.
///
/// Owns the model registry, collected diagnostics and the per-document
/// reports. Nothing here is global, so independent compilations can run side
/// by side.
#[derive(Debug)]
pub struct CompileContext {
    options: CompileOptions,
    registry: ModelRegistry,
    diagnostics: Vec<Diagnostic>,
    documents: Vec<DocumentReport>,
}

impl CompileContext {
    pub fn new(options: CompileOptions) -> Self {
        Self {
            options,
            registry: ModelRegistry::new(),
            diagnostics: Vec::new(),
            documents: Vec::new(),
        }
    }

    pub fn options(&self) -> &CompileOptions {
        &self.options
    }

    pub fn registry(&self) -> &ModelRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut ModelRegistry {
        &mut self.registry
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn documents(&self) -> &[DocumentReport] {
        &self.documents
    }

    /// Records a diagnostic and logs it at a level matching its severity.
    pub fn push_diagnostic(&mut self, diagnostic: Diagnostic) {
        match diagnostic.severity() {
            Severity::Warning => warn!(document = diagnostic.document(), "{diagnostic}"),
            Severity::Notice => info!(document = diagnostic.document(), "{diagnostic}"),
        }
        self.diagnostics.push(diagnostic);
    }

    pub fn record_document(&mut self, report: DocumentReport) {
        self.documents.push(report);
    }

    /// Records a document that could not be loaded.
    pub fn document_failed(&mut self, document: String, phase: Phase, detail: String) {
        self.push_diagnostic(Diagnostic::ParseFailure {
            document: document.clone(),
            detail,
        });
        self.record_document(DocumentReport::invalid(document, phase));
    }

    /// Splits the context into registry, diagnostics and document reports.
    pub fn into_parts(self) -> (ModelRegistry, Vec<Diagnostic>, Vec<DocumentReport>) {
        (self.registry, self.diagnostics, self.documents)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_options_use_django_reserved_words() {
        let options = CompileOptions::default();
        assert!(options.reserved_words.contains("type"));
        assert_eq!(options.brand_substring, "Pokemon");
        assert_eq!(options.resolution, ResolutionMode::Ordered);
    }

    #[test]
    fn test_document_failed_records_diagnostic_and_report() {
        let mut ctx = CompileContext::new(CompileOptions::default());
        ctx.document_failed("bad.xsd".into(), Phase::Structure, "boom".into());

        assert_eq!(ctx.diagnostics().len(), 1);
        assert_eq!(ctx.documents().len(), 1);
        assert!(!ctx.documents()[0].is_processed());
    }

    #[test]
    fn test_resolution_mode_display_matches_serde() {
        for mode in [ResolutionMode::Ordered, ResolutionMode::DependencySorted] {
            let json = serde_json::to_string(&mode).unwrap();
            assert_eq!(json, format!("\"{mode}\""));
        }
    }
}
