//! Output formatting for model packages and compile reports.

use xsd_model_core::{FieldKind, FieldSpec, Model, ModelKind, ModelPackage, ScalarType, to_camel_case};

use crate::report::CompileReport;

/// Supported output formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
pub enum OutputFormat {
    Json,
    Yaml,
    Markdown,
    Table,
    /// Django `models.py` source.
    Django,
}

/// Formats a package in the requested output format.
pub fn format_package(package: &ModelPackage, format: OutputFormat) -> Result<String, String> {
    match format {
        OutputFormat::Json => serde_json::to_string_pretty(package)
            .map_err(|e| format!("JSON serialization failed: {e}")),
        OutputFormat::Yaml => {
            serde_yaml::to_string(package).map_err(|e| format!("YAML serialization failed: {e}"))
        }
        OutputFormat::Markdown => Ok(package_to_markdown(package)),
        OutputFormat::Table => Ok(package_to_table(package)),
        OutputFormat::Django => Ok(package_to_django(package)),
    }
}

/// Formats a compile report in the requested output format.
pub fn format_report(report: &CompileReport, format: OutputFormat) -> Result<String, String> {
    match format {
        OutputFormat::Json => serde_json::to_string_pretty(report)
            .map_err(|e| format!("JSON serialization failed: {e}")),
        OutputFormat::Yaml => {
            serde_yaml::to_string(report).map_err(|e| format!("YAML serialization failed: {e}"))
        }
        OutputFormat::Markdown => Ok(report_to_markdown(report)),
        OutputFormat::Table => Ok(report_to_table(report)),
        OutputFormat::Django => Err("django format is only available for model packages".into()),
    }
}

/// Renders Django model source.
///
/// Classes appear in registration order, each followed by a blank line.
///
/// # Examples
///
/// ```
/// use xsd_model_compiler::output::package_to_django;
/// use xsd_model_core::*;
///
/// let mut package = ModelPackage::new("1.0.0");
/// package.models.push(Model::enumeration("Type"));
/// package.models.push(
///     Model::record("Move")
///         .with_field(FieldSpec::scalar("name", ScalarType::string(500)))
///         .with_field(FieldSpec::reference("type", "Type")),
/// );
///
/// let source = package_to_django(&package);
/// assert_eq!(
///     source,
///     "from django.db import models\n\n\
///      class Type(models.Model):\n    \
///      value = models.CharField(max_length=50)    # Enumeration\n\n\
///      class Move(models.Model):\n    \
///      name = models.CharField(max_length=500)\n    \
///      type = models.ForeignKey(Type, on_delete=models.CASCADE)\n\n"
/// );
/// ```
pub fn package_to_django(package: &ModelPackage) -> String {
    let mut out = String::from("from django.db import models\n\n");
    for model in &package.models {
        out.push_str(&format!("class {}(models.Model):\n", model.class_name));
        if model.fields.is_empty() {
            out.push_str("    pass\n");
        }
        for field in &model.fields {
            out.push_str(&django_field(model, field));
            out.push('\n');
        }
        out.push('\n');
    }
    out
}

fn django_field(model: &Model, field: &FieldSpec) -> String {
    let name = &field.name;
    match &field.kind {
        FieldKind::Scalar { scalar } => {
            let mut line = format!("    {name} = models.{}", django_scalar(scalar, field.nullable));
            if model.is_enumeration() {
                line.push_str("    # Enumeration");
            }
            line
        }
        FieldKind::Reference { target } => {
            format!("    {name} = models.ForeignKey({target}, on_delete=models.CASCADE)")
        }
        FieldKind::ForeignList { .. } => {
            format!("    {name} = models.IntegerField()    # {} list_id", to_camel_case(name))
        }
    }
}

fn django_scalar(scalar: &ScalarType, nullable: bool) -> String {
    let mut args = Vec::new();
    let class = match scalar {
        ScalarType::String { max_length } => {
            args.push(format!("max_length={max_length}"));
            "CharField"
        }
        ScalarType::Integer { default } => {
            if let Some(default) = default {
                args.push(format!("default={default}"));
            }
            "IntegerField"
        }
        ScalarType::DateTime => "DateTimeField",
    };
    if nullable {
        args.push("null=True".to_string());
    }
    format!("{class}({})", args.join(", "))
}

/// Short type description used by the markdown and table renderers.
fn field_type(field: &FieldSpec) -> String {
    match &field.kind {
        FieldKind::Scalar { scalar } => match scalar {
            ScalarType::String { max_length } => format!("string({max_length})"),
            ScalarType::Integer { default: Some(d) } => format!("integer = {d}"),
            ScalarType::Integer { default: None } => "integer".to_string(),
            ScalarType::DateTime => "datetime".to_string(),
        },
        FieldKind::Reference { target } => format!("-> {target}"),
        FieldKind::ForeignList { target } => format!("list_id of {target}"),
    }
}

fn shape(model: &Model) -> String {
    match &model.kind {
        ModelKind::ListElement { element } => format!("{} of {element}", model.kind.label()),
        kind => kind.label().to_string(),
    }
}

fn package_to_markdown(package: &ModelPackage) -> String {
    let mut out = String::new();

    out.push_str("# Models\n\n");
    out.push_str(&format!("**Version:** {}\n\n", package.version));
    if let Some(ref hash) = package.content_hash {
        out.push_str(&format!("**Content hash:** `{hash}`\n\n"));
    }

    for model in &package.models {
        out.push_str(&format!("## {}\n\n", model.class_name));
        out.push_str(&format!("*{}*", shape(model)));
        if let Some(ref source) = model.source {
            out.push_str(&format!(" from `{source}`"));
        }
        out.push_str("\n\n");

        if model.fields.is_empty() {
            out.push_str("No fields.\n\n");
            continue;
        }
        out.push_str("| Field | Type | Nullable |\n");
        out.push_str("|-------|------|----------|\n");
        for field in &model.fields {
            let nullable = if field.nullable { "yes" } else { "no" };
            out.push_str(&format!(
                "| `{}` | {} | {nullable} |\n",
                field.name,
                field_type(field)
            ));
        }
        out.push('\n');
    }

    out
}

fn package_to_table(package: &ModelPackage) -> String {
    let mut out = String::new();
    let (enumerations, records, lists) = package.kind_counts();

    out.push_str(&format!(
        "Models: {}  Enumerations: {enumerations}  Records: {records}  List elements: {lists}\n",
        package.model_count()
    ));

    for model in &package.models {
        out.push_str(&format!("\n{} ({})\n", model.class_name, shape(model)));
        let max_name = model
            .fields
            .iter()
            .map(|f| f.name.len())
            .max()
            .unwrap_or(4);
        for field in &model.fields {
            let null = if field.nullable { "  null" } else { "" };
            out.push_str(&format!(
                "  {:<width$}  {}{null}\n",
                field.name,
                field_type(field),
                width = max_name
            ));
        }
    }

    out
}

fn report_to_markdown(report: &CompileReport) -> String {
    let mut out = String::new();

    out.push_str("# Compile Report\n\n");
    out.push_str(&format!("- **Generated:** {}\n", report.generated_at));
    out.push_str(&format!("- **Resolution:** {}\n", report.resolution));
    out.push_str(&format!(
        "- **Models:** {} ({} enumerations, {} records, {} list elements)\n",
        report.model_count, report.enumeration_count, report.record_count, report.list_element_count
    ));
    out.push_str(&format!("- **Warnings:** {}\n", report.warning_count));

    if !report.documents.is_empty() {
        out.push_str("\n## Documents\n\n");
        out.push_str("| Document | Phase | Status | Classes | Duplicates | Unresolved |\n");
        out.push_str("|----------|-------|--------|---------|------------|------------|\n");
        for doc in &report.documents {
            let status = if doc.is_processed() { "ok" } else { "invalid" };
            out.push_str(&format!(
                "| `{}` | {} | {status} | {} | {} | {} |\n",
                doc.document,
                doc.phase,
                doc.classes.len(),
                doc.duplicates,
                doc.unresolved_references
            ));
        }
    }

    if !report.diagnostics.is_empty() {
        out.push_str("\n## Diagnostics\n\n");
        for d in &report.diagnostics {
            out.push_str(&format!("- {}: {d}\n", d.severity()));
        }
    }

    if !report.validation_errors.is_empty() {
        out.push_str("\n## Validation\n\n");
        for e in &report.validation_errors {
            out.push_str(&format!("- {e}\n"));
        }
    }

    out
}

fn report_to_table(report: &CompileReport) -> String {
    let mut out = String::new();

    out.push_str(&format!(
        "Models: {}  Warnings: {}  Resolution: {}\n",
        report.model_count, report.warning_count, report.resolution
    ));

    let max_doc = report
        .documents
        .iter()
        .map(|d| d.document.len())
        .max()
        .unwrap_or(8);
    for doc in &report.documents {
        let status = if doc.is_processed() { "ok" } else { "INVALID" };
        out.push_str(&format!(
            "  {:<width$}  {:<11}  {status:<7}  {} classes\n",
            doc.document,
            doc.phase.to_string(),
            doc.classes.len(),
            width = max_doc
        ));
    }

    for d in &report.diagnostics {
        out.push_str(&format!("{}: {d}\n", d.severity()));
    }

    out
}
