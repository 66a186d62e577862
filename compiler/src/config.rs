//! Compile configuration.
//!
//! Describes which documents to compile, in which order, how names are
//! normalized, and which XML instance directories to lint.
//!
//! # Example YAML
//!
//! ```yaml
//! version: "1.0"
//! enumerations:
//!   - xsd/enumerations/type.xsd
//!   - xsd/enumerations/learn_method.xsd
//! schemas:
//!   - xsd/game.xsd
//!   - xsd/pokemon.xsd
//! resolution: ordered
//! target: django
//! naming:
//!   brand_substring: Pokemon
//!   reserved_words: [type]
//! lint:
//!   xmllint: xmllint
//!   timeout_ms: 30000
//!   targets:
//!     - schema: xsd/pokemon.xsd
//!       directory: xml/pokemon
//! ```
//!
//! Relative paths are resolved against the directory of the config file.

use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use xsd_model_core::{DEFAULT_BRAND_SUBSTRING, ReservedWords, Target};

use crate::context::{CompileOptions, ResolutionMode};
use crate::error::{CompileError, Result};
use crate::lint::{DEFAULT_LINT_TIMEOUT_MS, DEFAULT_XMLLINT, LintTarget, Linter};
use crate::xsd::DocumentSource;
use crate::CompileInputs;

/// Configuration format version written by [`CompileConfig::default_layout`].
pub const CONFIG_VERSION: &str = "1.0";

/// Enumeration documents of the stock data layout, in processing order.
pub const DEFAULT_ENUMERATION_DOCUMENTS: &[&str] = &[
    "xsd/enumerations/type.xsd",
    "xsd/enumerations/learn_method.xsd",
];

/// Structural documents of the stock data layout, in dependency order.
pub const DEFAULT_SCHEMA_DOCUMENTS: &[&str] = &[
    "xsd/game.xsd",
    "xsd/types.xsd",
    "xsd/pokemon.xsd",
    "xsd/move.xsd",
    "xsd/ability.xsd",
    "xsd/learn_methods.xsd",
    "xsd/learnset.xsd",
    "xsd/tm_set.xsd",
    "xsd/item.xsd",
    "xsd/type_effectiveness.xsd",
    "xsd/nature.xsd",
    "xsd/form.xsd",
    "xsd/rom_hack.xsd",
    "xsd/tutor_set.xsd",
];

/// `(schema, instance directory)` pairs of the stock data layout.
pub const DEFAULT_LINT_TARGETS: &[(&str, &str)] = &[
    ("xsd/pokemon.xsd", "xml/pokemon"),
    ("xsd/move.xsd", "xml/moves"),
];

fn default_brand_substring() -> String {
    DEFAULT_BRAND_SUBSTRING.to_string()
}

fn default_xmllint() -> String {
    DEFAULT_XMLLINT.to_string()
}

fn default_timeout_ms() -> u64 {
    DEFAULT_LINT_TIMEOUT_MS
}

/// Name normalization settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamingConfig {
    /// Substring removed from enumeration class names.
    #[serde(default = "default_brand_substring")]
    pub brand_substring: String,
    /// Replaces the target's reserved-word preset when set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reserved_words: Option<Vec<String>>,
}

impl Default for NamingConfig {
    fn default() -> Self {
        Self {
            brand_substring: default_brand_substring(),
            reserved_words: None,
        }
    }
}

/// One schema and the directory of XML instances validated against it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LintTargetConfig {
    pub schema: PathBuf,
    pub directory: PathBuf,
}

/// XML instance validation settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LintConfig {
    /// Validator executable.
    #[serde(default = "default_xmllint")]
    pub xmllint: String,
    /// Per-file timeout in milliseconds.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    #[serde(default)]
    pub targets: Vec<LintTargetConfig>,
}

impl Default for LintConfig {
    fn default() -> Self {
        Self {
            xmllint: default_xmllint(),
            timeout_ms: default_timeout_ms(),
            targets: Vec::new(),
        }
    }
}

/// Top-level compile configuration.
///
/// # Examples
///
/// ```
/// use xsd_model_compiler::config::CompileConfig;
///
/// let yaml = "
/// version: '1.0'
/// enumerations: [enums/type.xsd]
/// schemas: [game.xsd, pokemon.xsd]
/// resolution: dependency_sorted
/// ";
/// let config: CompileConfig = serde_yaml::from_str(yaml).unwrap();
/// config.validate().unwrap();
/// assert_eq!(config.schemas.len(), 2);
/// assert_eq!(config.naming.brand_substring, "Pokemon");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompileConfig {
    /// Configuration format version (e.g., `"1.0"`).
    pub version: String,
    /// Enumeration documents, processed first and in order.
    #[serde(default)]
    pub enumerations: Vec<PathBuf>,
    /// Structural documents.
    #[serde(default)]
    pub schemas: Vec<PathBuf>,
    #[serde(default)]
    pub resolution: ResolutionMode,
    /// Reserved-word preset.
    #[serde(default)]
    pub target: Target,
    #[serde(default)]
    pub naming: NamingConfig,
    #[serde(default)]
    pub lint: LintConfig,
    /// Directory relative paths are resolved against. Set by [`load`](Self::load).
    #[serde(skip)]
    pub base_dir: Option<PathBuf>,
}

impl CompileConfig {
    /// The stock data layout: two enumeration documents, fourteen schema
    /// documents and two lint targets, relative to the working directory.
    pub fn default_layout() -> Self {
        Self {
            version: CONFIG_VERSION.to_string(),
            enumerations: DEFAULT_ENUMERATION_DOCUMENTS.iter().map(PathBuf::from).collect(),
            schemas: DEFAULT_SCHEMA_DOCUMENTS.iter().map(PathBuf::from).collect(),
            resolution: ResolutionMode::Ordered,
            target: Target::Django,
            naming: NamingConfig::default(),
            lint: LintConfig {
                targets: DEFAULT_LINT_TARGETS
                    .iter()
                    .map(|(schema, directory)| LintTargetConfig {
                        schema: schema.into(),
                        directory: directory.into(),
                    })
                    .collect(),
                ..LintConfig::default()
            },
            base_dir: None,
        }
    }

    /// Loads configuration from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns [`IoError`](CompileError::IoError) if the file cannot be read,
    /// [`YamlError`](CompileError::YamlError) if parsing fails, or
    /// [`InvalidConfig`](CompileError::InvalidConfig) if
    /// [`validate`](Self::validate) rejects it.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = std::fs::File::open(path)?;
        let reader = BufReader::new(file);
        let mut config: Self = serde_yaml::from_reader(reader)?;
        config.validate()?;
        config.base_dir = path.parent().map(Path::to_path_buf);
        Ok(config)
    }

    /// Saves the configuration as YAML.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let file = std::fs::File::create(path)?;
        let writer = BufWriter::new(file);
        serde_yaml::to_writer(writer, self)?;
        Ok(())
    }

    /// Checks for settings no compilation could use.
    pub fn validate(&self) -> Result<()> {
        if self.version.trim().is_empty() {
            return Err(CompileError::InvalidConfig("version cannot be empty".into()));
        }
        if self.lint.timeout_ms == 0 {
            return Err(CompileError::InvalidConfig("lint.timeout_ms must be positive".into()));
        }
        if self.lint.xmllint.trim().is_empty() {
            return Err(CompileError::InvalidConfig("lint.xmllint cannot be empty".into()));
        }
        if let Some(words) = &self.naming.reserved_words {
            if let Some(bad) = words.iter().find(|w| w.trim().is_empty()) {
                return Err(CompileError::InvalidConfig(format!(
                    "naming.reserved_words contains an empty entry: {bad:?}"
                )));
            }
        }
        Ok(())
    }

    /// Resolves `path` against [`base_dir`](Self::base_dir).
    pub fn resolve(&self, path: &Path) -> PathBuf {
        match &self.base_dir {
            Some(base) if path.is_relative() => base.join(path),
            _ => path.to_path_buf(),
        }
    }

    pub fn inputs(&self) -> CompileInputs {
        CompileInputs {
            enumerations: self
                .enumerations
                .iter()
                .map(|p| DocumentSource::file(self.resolve(p)))
                .collect(),
            schemas: self
                .schemas
                .iter()
                .map(|p| DocumentSource::file(self.resolve(p)))
                .collect(),
        }
    }

    pub fn reserved_words(&self) -> ReservedWords {
        match &self.naming.reserved_words {
            Some(words) => ReservedWords::new(words.iter().map(String::as_str)),
            None => ReservedWords::for_target(self.target),
        }
    }

    pub fn options(&self) -> CompileOptions {
        CompileOptions {
            reserved_words: self.reserved_words(),
            brand_substring: self.naming.brand_substring.clone(),
            resolution: self.resolution,
            ..CompileOptions::for_target(self.target)
        }
    }

    pub fn lint_targets(&self) -> Vec<LintTarget> {
        self.lint
            .targets
            .iter()
            .map(|t| LintTarget {
                schema: self.resolve(&t.schema),
                directory: self.resolve(&t.directory),
            })
            .collect()
    }

    pub fn linter(&self) -> Linter {
        Linter::new(&self.lint.xmllint, Duration::from_millis(self.lint.timeout_ms))
    }
}

impl Default for CompileConfig {
    fn default() -> Self {
        Self::default_layout()
    }
}
