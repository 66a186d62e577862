use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;
use xsd_model_compiler::config::CompileConfig;
use xsd_model_compiler::lint::{LintTarget, Linter};
use xsd_model_compiler::output::{OutputFormat, format_package, format_report};
use xsd_model_compiler::xsd::DocumentSource;
use xsd_model_compiler::{CompileInputs, CompileReport, ResolutionMode, compile};
use xsd_model_core::{ModelPackage, Target, validate_package};
use xsd_model_sqlite::Migration;

const PACKAGE_VERSION: &str = env!("CARGO_PKG_VERSION");

/// CLI-specific output format enum with clap argument parsing support.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum CliOutputFormat {
    Json,
    Yaml,
    Markdown,
    Table,
    Django,
}

impl From<CliOutputFormat> for OutputFormat {
    fn from(fmt: CliOutputFormat) -> Self {
        match fmt {
            CliOutputFormat::Json => Self::Json,
            CliOutputFormat::Yaml => Self::Yaml,
            CliOutputFormat::Markdown => Self::Markdown,
            CliOutputFormat::Table => Self::Table,
            CliOutputFormat::Django => Self::Django,
        }
    }
}

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum CliTarget {
    Django,
    Sqlite,
}

impl From<CliTarget> for Target {
    fn from(target: CliTarget) -> Self {
        match target {
            CliTarget::Django => Self::Django,
            CliTarget::Sqlite => Self::Sqlite,
        }
    }
}

#[derive(Debug, Parser)]
#[command(name = "xsd-model")]
#[command(version, about = "Infer relational data models from XML Schema documents")]
struct Cli {
    /// Only log warnings and errors.
    #[arg(long, short, global = true)]
    quiet: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Compile XSD documents into models.
    Compile(CompileArgs),
    /// Validate XML instance directories against their schemas with xmllint.
    Lint(LintArgs),
    /// Validate one or more model package JSON files.
    Validate(ValidateArgs),
    /// SQLite table migration operations.
    Migrate(MigrateArgs),
}

#[derive(Debug, Args)]
struct CompileArgs {
    /// Compile configuration YAML (defaults to the stock xsd/ layout).
    #[arg(long, conflicts_with_all = ["enumerations", "schemas"])]
    config: Option<PathBuf>,
    /// Comma-separated enumeration documents, processed first.
    #[arg(long)]
    enumerations: Option<String>,
    /// Comma-separated structural documents.
    #[arg(long)]
    schemas: Option<String>,
    /// Processing order of structural documents.
    #[arg(long)]
    resolution: Option<ResolutionMode>,
    /// Reserved-word preset.
    #[arg(long)]
    target: Option<CliTarget>,
    /// Comma-separated reserved field names (replaces the target preset).
    #[arg(long)]
    reserved_words: Option<String>,
    /// Substring removed from enumeration class names.
    #[arg(long)]
    brand: Option<String>,
    /// Output format.
    #[arg(long, default_value = "django")]
    format: CliOutputFormat,
    /// Write models here instead of stdout.
    #[arg(long)]
    output: Option<PathBuf>,
    /// Write a JSON compile report to this path.
    #[arg(long)]
    report: Option<PathBuf>,
    /// Version stamped on the model package.
    #[arg(long, default_value = PACKAGE_VERSION)]
    package_version: String,
    /// Fail if any document was invalid, any reference unresolved, or the
    /// package has validation findings.
    #[arg(long)]
    strict: bool,
}

#[derive(Debug, Args)]
struct LintArgs {
    /// Compile configuration YAML providing lint targets.
    #[arg(long, conflicts_with_all = ["schema", "dir"])]
    config: Option<PathBuf>,
    /// Schema to validate against.
    #[arg(long, requires = "dir")]
    schema: Option<PathBuf>,
    /// Directory of XML instances.
    #[arg(long, requires = "schema")]
    dir: Option<PathBuf>,
    /// Validator executable.
    #[arg(long)]
    xmllint: Option<String>,
    /// Per-file timeout in milliseconds.
    #[arg(long)]
    timeout_ms: Option<u64>,
}

#[derive(Debug, Args)]
struct ValidateArgs {
    /// Model package JSON files.
    #[arg(required = true)]
    inputs: Vec<PathBuf>,
}

#[derive(Debug, Args)]
struct MigrateArgs {
    #[command(subcommand)]
    operation: MigrateOperation,
}

#[derive(Debug, Subcommand)]
enum MigrateOperation {
    /// Create model tables in the database.
    Up(MigrateModelArgs),
    /// Drop model tables from the database.
    Down(MigrateModelArgs),
    /// Drop and recreate model tables.
    Refresh(MigrateModelArgs),
    /// Show table status.
    Status(MigrateModelArgs),
}

#[derive(Debug, Args)]
struct MigrateModelArgs {
    /// Database file path.
    #[arg(long)]
    db: PathBuf,
    /// Table prefix.
    #[arg(long)]
    prefix: String,
    /// Model package JSON to migrate.
    #[arg(long, conflicts_with = "config", required_unless_present = "config")]
    package: Option<PathBuf>,
    /// Compile configuration to compile the models from.
    #[arg(long)]
    config: Option<PathBuf>,
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.quiet);

    let result = match cli.command {
        Command::Compile(args) => run_compile(args),
        Command::Lint(args) => run_lint(args),
        Command::Validate(args) => run_validate(args),
        Command::Migrate(args) => run_migrate(args),
    };

    if let Err(err) = result {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn init_tracing(quiet: bool) {
    let default_level = if quiet { "warn" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

// ---------------------------------------------------------------------------
// compile command
// ---------------------------------------------------------------------------

fn run_compile(args: CompileArgs) -> Result<(), String> {
    let mut config = match &args.config {
        Some(path) => load_config(path)?,
        None => CompileConfig::default_layout(),
    };

    if let Some(target) = args.target {
        config.target = target.into();
    }
    if let Some(resolution) = args.resolution {
        config.resolution = resolution;
    }
    if let Some(brand) = args.brand {
        config.naming.brand_substring = brand;
    }
    if let Some(words) = args.reserved_words {
        config.naming.reserved_words = Some(parse_csv_list(Some(words)));
    }

    let mut inputs = config.inputs();
    if args.enumerations.is_some() || args.schemas.is_some() {
        inputs = CompileInputs {
            enumerations: to_sources(parse_csv_list(args.enumerations)),
            schemas: to_sources(parse_csv_list(args.schemas)),
        };
    }

    let mut options = config.options();
    options.package_version = args.package_version;

    let outcome = compile(&inputs, &options);
    let report = CompileReport::from_outcome(&outcome, options.resolution);

    let rendered = format_package(&outcome.package, args.format.into())?;
    match &args.output {
        Some(path) => {
            write_file(path, &rendered)?;
            info!(path = %path.display(), models = outcome.package.model_count(), "Wrote models");
        }
        None => print!("{rendered}"),
    }

    if let Some(path) = &args.report {
        let raw = format_report(&report, OutputFormat::Json)?;
        write_file(path, &raw)?;
    }

    if !report.validation_errors.is_empty() {
        eprintln!(
            "{} validation finding(s) in the compiled models.",
            report.validation_errors.len()
        );
    }
    if report.warning_count > 0 {
        eprintln!("{} warning(s) emitted during compilation.", report.warning_count);
    }

    if args.strict && !report.is_clean() {
        return Err(format!(
            "compilation not clean: {} invalid document(s), {} warning(s), {} validation finding(s)",
            report.invalid_documents().count(),
            report.warning_count,
            report.validation_errors.len()
        ));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// lint command
// ---------------------------------------------------------------------------

fn run_lint(args: LintArgs) -> Result<(), String> {
    let config = match &args.config {
        Some(path) => load_config(path)?,
        None => CompileConfig::default_layout(),
    };

    let targets = match (args.schema, args.dir) {
        (Some(schema), Some(directory)) => vec![LintTarget { schema, directory }],
        _ => config.lint_targets(),
    };
    if targets.is_empty() {
        return Err("no lint targets configured".to_string());
    }

    let program = args.xmllint.unwrap_or_else(|| config.lint.xmllint.clone());
    let timeout = Duration::from_millis(args.timeout_ms.unwrap_or(config.lint.timeout_ms));
    let linter = Linter::new(program, timeout);

    let report = linter.lint(&targets).map_err(|e| format!("{e}!"))?;
    for path in &report.invalid {
        if report.timed_out.contains(path) {
            println!("INVALID: {} (timed out)", path.display());
        } else {
            println!("INVALID: {}", path.display());
        }
    }
    if !report.is_valid() {
        return Err("Invalid data!".to_string());
    }
    println!("All data is valid! ({} file(s) checked)", report.checked);
    Ok(())
}

// ---------------------------------------------------------------------------
// validate command
// ---------------------------------------------------------------------------

fn run_validate(args: ValidateArgs) -> Result<(), String> {
    let mut invalid = 0usize;
    for path in &args.inputs {
        let package = load_package(path)?;
        let errors = validate_package(&package);
        if errors.is_empty() {
            debug!(path = %path.display(), models = package.model_count(), "Package valid");
            continue;
        }
        invalid += 1;
        for error in &errors {
            eprintln!("{}: {error}", path.display());
        }
    }

    if invalid > 0 {
        return Err(format!("{invalid} of {} package(s) failed validation", args.inputs.len()));
    }
    println!("Validated {} package file(s).", args.inputs.len());
    Ok(())
}

// ---------------------------------------------------------------------------
// migrate command
// ---------------------------------------------------------------------------

fn run_migrate(args: MigrateArgs) -> Result<(), String> {
    match args.operation {
        MigrateOperation::Up(a) => run_migrate_up(a),
        MigrateOperation::Down(a) => run_migrate_down(a),
        MigrateOperation::Refresh(a) => run_migrate_refresh(a),
        MigrateOperation::Status(a) => run_migrate_status(a),
    }
}

fn open_migration(args: &MigrateModelArgs) -> Result<Migration, String> {
    let package = match (&args.package, &args.config) {
        (Some(path), _) => load_package(path)?,
        (None, Some(path)) => {
            let config = load_config(path)?;
            compile(&config.inputs(), &config.options()).package
        }
        (None, None) => return Err("either --package or --config is required".to_string()),
    };
    let conn = rusqlite::Connection::open(&args.db)
        .map_err(|e| format!("Failed to open database '{}': {e}", args.db.display()))?;
    Migration::from_package(conn, &args.prefix, &package)
        .map_err(|e| format!("Failed to initialize migration: {e}"))
}

fn run_migrate_up(args: MigrateModelArgs) -> Result<(), String> {
    let mut migration = open_migration(&args)?;
    migration
        .up()
        .map_err(|e| format!("Migration up failed: {e}"))?;
    println!(
        "Migration up complete. {} table(s) created with prefix '{}' in '{}'.",
        migration.models().len(),
        args.prefix,
        args.db.display()
    );
    Ok(())
}

fn run_migrate_down(args: MigrateModelArgs) -> Result<(), String> {
    let mut migration = open_migration(&args)?;
    migration
        .down()
        .map_err(|e| format!("Migration down failed: {e}"))?;
    println!(
        "Migration down complete. Tables with prefix '{}' dropped from '{}'.",
        args.prefix,
        args.db.display()
    );
    Ok(())
}

fn run_migrate_refresh(args: MigrateModelArgs) -> Result<(), String> {
    let mut migration = open_migration(&args)?;
    migration
        .refresh()
        .map_err(|e| format!("Refresh failed: {e}"))?;
    println!(
        "Refresh complete. {} table(s) dropped and recreated.",
        migration.models().len()
    );
    Ok(())
}

fn run_migrate_status(args: MigrateModelArgs) -> Result<(), String> {
    let migration = open_migration(&args)?;
    let status = migration
        .status()
        .map_err(|e| format!("Failed to get migration status: {e}"))?;
    println!("Migration Status:");
    println!(
        "  Tables exist: {}",
        if status.tables_exist() { "yes" } else { "no" }
    );
    println!(
        "  Existing tables: {}/{}",
        status.existing_tables(),
        status.tables.len()
    );
    println!("  Total rows: {}", status.total_rows());
    for table in &status.tables {
        let state = if table.exists { "present" } else { "missing" };
        println!("  {:<40} {state:<8} {}", table.table, table.row_count);
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn load_config(path: &Path) -> Result<CompileConfig, String> {
    CompileConfig::load(path)
        .map_err(|e| format!("Failed to load config '{}': {e}", path.display()))
}

fn load_package(path: &Path) -> Result<ModelPackage, String> {
    let raw = fs::read_to_string(path)
        .map_err(|err| format!("Failed to read '{}': {err}", path.display()))?;
    serde_json::from_str(&raw)
        .map_err(|err| format!("Failed to parse package '{}': {err}", path.display()))
}

fn write_file(path: &Path, contents: &str) -> Result<(), String> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|err| {
                format!(
                    "Failed to create output directory '{}': {err}",
                    parent.display()
                )
            })?;
        }
    }
    fs::write(path, contents).map_err(|err| format!("Failed to write '{}': {err}", path.display()))
}

fn to_sources(paths: Vec<String>) -> Vec<DocumentSource> {
    paths.into_iter().map(DocumentSource::file).collect()
}

/// Splits a comma-separated list, trimming whitespace and dropping empties.
fn parse_csv_list(raw: Option<String>) -> Vec<String> {
    raw.map(|value| {
        value
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from)
            .collect()
    })
    .unwrap_or_default()
}
