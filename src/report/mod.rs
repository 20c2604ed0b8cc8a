//! Report-card rendering.
//!
//! [`generator`] builds the document model and its text formats,
//! [`xlsx`] draws the styled workbook, and [`writer`] puts artifacts on
//! disk under deterministic names.

pub mod generator;
pub mod writer;
pub mod xlsx;

pub use generator::build_report_card;
pub use writer::{artifact_path, write_with_timeout};

use serde::{Deserialize, Serialize};

/// Output format of the per-entity artifact.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    /// Styled Excel workbook (default)
    #[default]
    Xlsx,
    /// Markdown document
    Markdown,
    /// JSON document
    Json,
}

impl ReportFormat {
    /// File extension used for artifacts of this format.
    pub fn extension(&self) -> &'static str {
        match self {
            ReportFormat::Xlsx => "xlsx",
            ReportFormat::Markdown => "md",
            ReportFormat::Json => "json",
        }
    }
}

/// Fixed text pieces of the report-card layout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    /// Artifact name prefix, followed by the entity id.
    pub file_prefix: String,
    /// Title prefix, followed by the display name.
    pub title_prefix: String,
    /// Label prefix for positional measurement labels.
    pub label_prefix: String,
    pub label_header: String,
    pub score_header: String,
}

impl Default for Layout {
    fn default() -> Self {
        Self {
            file_prefix: "report_card_".to_string(),
            title_prefix: "Report Card for".to_string(),
            label_prefix: "Measurement".to_string(),
            label_header: "Label".to_string(),
            score_header: "Score".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_extensions() {
        assert_eq!(ReportFormat::Xlsx.extension(), "xlsx");
        assert_eq!(ReportFormat::Markdown.extension(), "md");
        assert_eq!(ReportFormat::Json.extension(), "json");
    }

    #[test]
    fn test_format_parses_from_toml_value() {
        #[derive(Deserialize)]
        struct Wrapper {
            format: ReportFormat,
        }
        let parsed: Wrapper = toml::from_str("format = \"markdown\"").unwrap();
        assert_eq!(parsed.format, ReportFormat::Markdown);
    }
}
