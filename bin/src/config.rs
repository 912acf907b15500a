use std::{
    collections::BTreeMap,
    fs::File,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result, anyhow};
use clap::Args;
use extraction::{
    fieldmatch::{FieldRules, RuleError, RuleSpec},
    record::{DEFAULT_FILE_COLUMN, DEFAULT_NOT_FOUND},
};
use serde::{Deserialize, Serialize};

pub const DEFAULT_CONFIG_PATH: &str = "setup.yaml";
const DEFAULT_OUTPUT_PREFIX: &str = "br";

#[derive(Clone, Copy, Debug, Eq, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("no fields to extract are configured")]
    NoFields,
    #[error("a field to extract has the same name as the file column")]
    FieldIsFileColumn,
}

/// CLI arguments relating to [Config].
#[derive(Args, Clone, Debug)]
pub struct ConfigArgs {
    /// Path to the YAML configuration. A default configuration is written
    /// to this path if it does not exist.
    #[arg(long, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Folder to read PDF files from, instead of the configured one.
    #[arg(long)]
    source: Option<PathBuf>,

    /// Folder to write the CSV and log files into, instead of the configured
    /// one.
    #[arg(long)]
    output: Option<PathBuf>,

    /// Fields to extract, instead of the configured ones.
    #[arg(long, value_delimiter(','))]
    fields: Vec<String>,
}

impl ConfigArgs {
    /// Loads the configuration, applying any overrides from the arguments.
    pub fn load(&self) -> Result<Config> {
        let mut config = load_or_create(&self.config)?;

        if let Some(source) = &self.source {
            config.source_folder = source.clone();
        }
        if let Some(output) = &self.output {
            config.output_folder = output.clone();
        }
        if !self.fields.is_empty() {
            config.fields = clean_fields(self.fields.iter().cloned());
        }

        if config.fields.is_empty() {
            return Err(anyhow!(ConfigError::NoFields))
                .with_context(|| format!("checking configuration {:?}", self.config));
        }
        if config.fields.contains(&config.file_column) {
            return Err(anyhow!(ConfigError::FieldIsFileColumn)).with_context(|| {
                format!(
                    "checking field {:?} in configuration {:?}",
                    config.file_column, self.config
                )
            });
        }
        Ok(config)
    }
}

/// Configuration, read and prepared from a YAML file.
#[derive(Clone, Debug)]
pub struct Config {
    pub source_folder: PathBuf,
    pub output_folder: PathBuf,
    /// Fields to extract, in output order, without duplicates.
    pub fields: Vec<String>,
    pub file_column: String,
    pub not_found: String,
    pub output_prefix: String,
    pub patterns: BTreeMap<String, RuleSpec>,
}

impl Config {
    /// Builtin field rules, extended by any configured patterns.
    pub fn field_rules(&self) -> Result<FieldRules, RuleError> {
        FieldRules::with_specs(&self.patterns)
    }
}

/// Loads the configuration from `path`, first writing a default configuration
/// there if no file exists.
pub fn load_or_create(path: &Path) -> Result<Config> {
    if !path.exists() {
        write_default(path)
            .with_context(|| format!("writing default configuration to {:?}", path))?;
    }

    let rdr = File::open(path).with_context(|| format!("opening configuration {:?}", path))?;
    let config: YamlConfig = serde_yaml_ng::from_reader(rdr)
        .with_context(|| format!("parsing configuration {:?}", path))?;

    Ok(config.prepare())
}

fn write_default(path: &Path) -> Result<()> {
    let contents = serde_yaml_ng::to_string(&YamlConfig::default())?;
    std::fs::write(path, contents)?;
    Ok(())
}

/// Trims field names, dropping empty and repeated names.
fn clean_fields<I>(fields: I) -> Vec<String>
where
    I: IntoIterator<Item = String>,
{
    let mut cleaned: Vec<String> = Vec::new();
    for field in fields {
        let field = field.trim();
        if !field.is_empty() && !cleaned.iter().any(|existing| existing == field) {
            cleaned.push(field.to_string());
        }
    }
    cleaned
}

/// Configuration, as read from YAML.
#[derive(Debug, Deserialize, Serialize)]
struct YamlConfig {
    source_folder: PathBuf,
    output_folder: PathBuf,
    fields_to_extract: YamlFields,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    file_column: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    not_found: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    output_prefix: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    patterns: BTreeMap<String, RuleSpec>,
}

impl YamlConfig {
    fn prepare(self) -> Config {
        Config {
            source_folder: self.source_folder,
            output_folder: self.output_folder,
            fields: clean_fields(self.fields_to_extract.into_vec()),
            file_column: self
                .file_column
                .unwrap_or_else(|| DEFAULT_FILE_COLUMN.to_string()),
            not_found: self
                .not_found
                .unwrap_or_else(|| DEFAULT_NOT_FOUND.to_string()),
            output_prefix: self
                .output_prefix
                .unwrap_or_else(|| DEFAULT_OUTPUT_PREFIX.to_string()),
            patterns: self.patterns,
        }
    }
}

impl Default for YamlConfig {
    fn default() -> Self {
        Self {
            source_folder: PathBuf::from(r"C:\pdf\br"),
            output_folder: PathBuf::from(r"C:\pdf\br\output"),
            fields_to_extract: YamlFields::List(vec![
                "Nome".into(),
                "PIS/PASEP/NIT".into(),
                "Valor Base para Fins".into(),
            ]),
            file_column: None,
            not_found: None,
            output_prefix: None,
            patterns: BTreeMap::new(),
        }
    }
}

/// Fields to extract, either as a YAML list or a single comma separated
/// string.
#[derive(Debug, Deserialize, Serialize)]
#[serde(untagged)]
enum YamlFields {
    List(Vec<String>),
    CommaSeparated(String),
}

impl YamlFields {
    fn into_vec(self) -> Vec<String> {
        match self {
            YamlFields::List(fields) => fields,
            YamlFields::CommaSeparated(fields) => fields.split(',').map(str::to_string).collect(),
        }
    }
}
