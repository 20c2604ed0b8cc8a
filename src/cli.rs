//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation. Options left unset fall back to the
//! configuration file and then to built-in defaults.

use crate::report::ReportFormat;
use clap::Parser;
use std::path::PathBuf;

/// ReportCards - one report card per student from a score workbook
///
/// Reads a workbook with one score per row, groups rows by student,
/// and writes a report card with total and average for each student.
///
/// Examples:
///   reportcards --input student_scores.xlsx
///   reportcards -i scores.xlsx -o cards --format markdown
///   reportcards -i scores.xlsx --score-column "Score" --dry-run
///   reportcards --init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// Source workbook (.xlsx)
    ///
    /// Defaults to the config file value, then student_scores.xlsx.
    #[arg(short, long, value_name = "FILE", env = "REPORTCARDS_INPUT")]
    pub input: Option<PathBuf>,

    /// Directory that receives the report cards
    #[arg(short, long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Worksheet to read (defaults to the first sheet)
    #[arg(long, value_name = "NAME")]
    pub sheet: Option<String>,

    /// Output format (xlsx, markdown, json)
    #[arg(long, value_name = "FORMAT")]
    pub format: Option<ReportFormat>,

    /// Header of the identity column
    #[arg(long, value_name = "NAME")]
    pub id_column: Option<String>,

    /// Header of the display-name column
    #[arg(long, value_name = "NAME")]
    pub name_column: Option<String>,

    /// Header of the score column
    #[arg(long, value_name = "NAME")]
    pub score_column: Option<String>,

    /// Also write the batch summary as JSON to this file
    #[arg(long, value_name = "FILE")]
    pub summary: Option<PathBuf>,

    /// Path to configuration file
    ///
    /// If not specified, looks for .reportcards.toml in the current directory
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Seconds allowed for writing one report card
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Run in quiet mode (minimal output)
    #[arg(short, long)]
    pub quiet: bool,

    /// Dry run: load, validate and group without writing anything
    ///
    /// Shows which report cards would be written and exits.
    #[arg(long)]
    pub dry_run: bool,

    /// Generate a default .reportcards.toml configuration file
    #[arg(long)]
    pub init_config: bool,
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        // Skip validation for --init-config
        if self.init_config {
            return Ok(());
        }

        // Check for conflicting options
        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        // Column names must not be blank
        for (flag, value) in [
            ("--id-column", &self.id_column),
            ("--name-column", &self.name_column),
            ("--score-column", &self.score_column),
        ] {
            if let Some(name) = value {
                if name.trim().is_empty() {
                    return Err(format!("{} must not be empty", flag));
                }
            }
        }

        // Validate timeout if provided
        if let Some(timeout) = self.timeout {
            if timeout == 0 {
                return Err("Timeout must be at least 1 second".to_string());
            }
        }

        // Output directory must not be an existing file
        if let Some(ref dir) = self.output_dir {
            if dir.exists() && !dir.is_dir() {
                return Err(format!(
                    "Output path is not a directory: {}",
                    dir.display()
                ));
            }
        }

        Ok(())
    }

    /// Returns the log level based on verbosity settings.
    pub fn log_level(&self) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_args() -> Args {
        Args {
            input: Some(PathBuf::from("student_scores.xlsx")),
            output_dir: None,
            sheet: None,
            format: None,
            id_column: None,
            name_column: None,
            score_column: None,
            summary: None,
            config: None,
            timeout: None,
            verbose: false,
            quiet: false,
            dry_run: false,
            init_config: false,
        }
    }

    #[test]
    fn test_parse_flags() {
        let args = Args::try_parse_from([
            "reportcards",
            "-i",
            "scores.xlsx",
            "-o",
            "cards",
            "--format",
            "markdown",
            "--score-column",
            "Score",
        ])
        .unwrap();
        assert_eq!(args.input, Some(PathBuf::from("scores.xlsx")));
        assert_eq!(args.output_dir, Some(PathBuf::from("cards")));
        assert_eq!(args.format, Some(ReportFormat::Markdown));
        assert_eq!(args.score_column.as_deref(), Some("Score"));
    }

    #[test]
    fn test_validation_conflicting_options() {
        let mut args = make_args();
        args.verbose = true;
        args.quiet = true;
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_validation_blank_column() {
        let mut args = make_args();
        args.name_column = Some("   ".to_string());
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_validation_zero_timeout() {
        let mut args = make_args();
        args.timeout = Some(0);
        assert!(args.validate().is_err());
        args.timeout = Some(5);
        assert!(args.validate().is_ok());
    }

    #[test]
    fn test_log_level() {
        let mut args = make_args();
        assert_eq!(args.log_level(), tracing::Level::INFO);

        args.verbose = true;
        assert_eq!(args.log_level(), tracing::Level::DEBUG);

        args.verbose = false;
        args.quiet = true;
        assert_eq!(args.log_level(), tracing::Level::ERROR);
    }
}
