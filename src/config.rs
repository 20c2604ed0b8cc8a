//! Configuration file handling.
//!
//! This module handles loading and merging configuration from
//! `.reportcards.toml` files.

use crate::batch::BatchConfig;
use crate::report::{Layout, ReportFormat};
use crate::source::Schema;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default configuration file name.
pub const CONFIG_FILE: &str = ".reportcards.toml";

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// General settings.
    #[serde(default)]
    pub general: GeneralConfig,

    /// Source workbook settings.
    #[serde(default)]
    pub source: SourceConfig,

    /// Report card settings.
    #[serde(default)]
    pub report: ReportConfig,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Directory receiving the report cards.
    #[serde(default = "default_output_dir")]
    pub output_dir: String,

    /// Enable verbose logging by default.
    #[serde(default)]
    pub verbose: bool,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            verbose: false,
        }
    }
}

fn default_output_dir() -> String {
    ".".to_string()
}

/// Source workbook settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Path of the workbook.
    #[serde(default = "default_source_path")]
    pub path: String,

    /// Worksheet name; the first sheet when absent.
    #[serde(default)]
    pub sheet: Option<String>,

    /// Identity column header.
    #[serde(default = "default_id_column")]
    pub id_column: String,

    /// Display-name column header.
    #[serde(default = "default_name_column")]
    pub name_column: String,

    /// Score column header.
    #[serde(default = "default_score_column")]
    pub score_column: String,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            path: default_source_path(),
            sheet: None,
            id_column: default_id_column(),
            name_column: default_name_column(),
            score_column: default_score_column(),
        }
    }
}

fn default_source_path() -> String {
    "student_scores.xlsx".to_string()
}

fn default_id_column() -> String {
    Schema::default().id_column
}

fn default_name_column() -> String {
    Schema::default().name_column
}

fn default_score_column() -> String {
    Schema::default().score_column
}

/// Report card settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Output format.
    #[serde(default)]
    pub format: ReportFormat,

    /// File name prefix, followed by the student id.
    #[serde(default = "default_file_prefix")]
    pub file_prefix: String,

    /// Title prefix, followed by the student name.
    #[serde(default = "default_title_prefix")]
    pub title_prefix: String,

    /// Prefix of the positional score labels.
    #[serde(default = "default_label_prefix")]
    pub label_prefix: String,

    /// Header of the label column.
    #[serde(default = "default_label_header")]
    pub label_header: String,

    /// Header of the score column.
    #[serde(default = "default_score_header")]
    pub score_header: String,

    /// Seconds allowed for writing one report card.
    #[serde(default = "default_write_timeout")]
    pub write_timeout_seconds: u64,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            format: ReportFormat::default(),
            file_prefix: default_file_prefix(),
            title_prefix: default_title_prefix(),
            label_prefix: default_label_prefix(),
            label_header: default_label_header(),
            score_header: default_score_header(),
            write_timeout_seconds: default_write_timeout(),
        }
    }
}

fn default_file_prefix() -> String {
    Layout::default().file_prefix
}

fn default_title_prefix() -> String {
    Layout::default().title_prefix
}

fn default_label_prefix() -> String {
    Layout::default().label_prefix
}

fn default_label_header() -> String {
    Layout::default().label_header
}

fn default_score_header() -> String {
    Layout::default().score_header
}

fn default_write_timeout() -> u64 {
    30
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Try to load configuration from the default location.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but can't be parsed.
    pub fn load_default() -> Result<Option<Self>> {
        let default_path = Path::new(CONFIG_FILE);

        if default_path.exists() {
            Ok(Some(Self::load(default_path)?))
        } else {
            Ok(None)
        }
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// CLI arguments take precedence over config file settings.
    /// Only values the user actually passed override the file.
    pub fn merge_with_args(&mut self, args: &crate::cli::Args) {
        if let Some(ref input) = args.input {
            self.source.path = input.display().to_string();
        }
        if let Some(ref dir) = args.output_dir {
            self.general.output_dir = dir.display().to_string();
        }
        if let Some(ref sheet) = args.sheet {
            self.source.sheet = Some(sheet.clone());
        }
        if let Some(ref column) = args.id_column {
            self.source.id_column = column.clone();
        }
        if let Some(ref column) = args.name_column {
            self.source.name_column = column.clone();
        }
        if let Some(ref column) = args.score_column {
            self.source.score_column = column.clone();
        }
        if let Some(format) = args.format {
            self.report.format = format;
        }
        if let Some(timeout) = args.timeout {
            self.report.write_timeout_seconds = timeout;
        }

        // Flags always override
        if args.verbose {
            self.general.verbose = true;
        }
    }

    /// Build the explicit batch configuration.
    pub fn batch_config(&self) -> BatchConfig {
        BatchConfig {
            source_path: PathBuf::from(&self.source.path),
            sheet: self.source.sheet.clone(),
            schema: Schema {
                id_column: self.source.id_column.clone(),
                name_column: self.source.name_column.clone(),
                score_column: self.source.score_column.clone(),
            },
            output_dir: PathBuf::from(&self.general.output_dir),
            format: self.report.format,
            layout: Layout {
                file_prefix: self.report.file_prefix.clone(),
                title_prefix: self.report.title_prefix.clone(),
                label_prefix: self.report.label_prefix.clone(),
                label_header: self.report.label_header.clone(),
                score_header: self.report.score_header.clone(),
            },
            write_timeout: Duration::from_secs(self.report.write_timeout_seconds.max(1)),
        }
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_else(|_| String::new())
    }
}
