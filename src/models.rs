//! Data models for the report-card batch.
//!
//! This module contains the records that flow through the pipeline:
//! source rows, entity groups, summaries, the report-card document and
//! the batch report.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Opaque entity identifier, compared by its text form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(String);

impl EntityId {
    /// Build an identifier from cell text. Returns `None` for blank text.
    pub fn new(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A single score cell as it was found in the source.
#[derive(Debug, Clone, PartialEq)]
pub enum Measurement {
    /// A numeric score.
    Value(f64),
    /// The cell was blank.
    Missing,
    /// The cell held non-numeric text.
    Invalid(String),
}

/// One measurement record from the source table.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceRow {
    /// 1-based worksheet row number.
    pub row_number: u32,
    pub entity_id: EntityId,
    pub entity_name: String,
    pub measurement: Measurement,
}

/// All source rows sharing one entity identifier, in source order.
#[derive(Debug, Clone, PartialEq)]
pub struct EntityGroup {
    pub entity_id: EntityId,
    /// Display name taken from the first row of the group.
    pub entity_name: String,
    pub rows: Vec<SourceRow>,
}

/// A measurement with its positional label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabeledMeasurement {
    pub label: String,
    pub value: f64,
}

/// Aggregate statistics for one entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntitySummary {
    /// Sum of all measurements.
    pub total: f64,
    /// `total / count`.
    pub average: f64,
    /// Number of measurements that contributed.
    pub count: usize,
    /// Measurements in source order, labeled `"<prefix> N"`.
    pub labeled_measurements: Vec<LabeledMeasurement>,
}

/// The fixed-layout document produced for one entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportCard {
    pub entity_id: EntityId,
    pub entity_name: String,
    /// Title line, e.g. "Report Card for Ann".
    pub title: String,
    pub total: f64,
    pub average: f64,
    /// Header cells of the detail table.
    pub headers: [String; 2],
    pub rows: Vec<LabeledMeasurement>,
}

impl ReportCard {
    /// The "Total Score" summary line.
    pub fn total_line(&self) -> String {
        format!("Total Score: {}", format_number(self.total))
    }

    /// The "Average Score" summary line, two decimals.
    pub fn average_line(&self) -> String {
        format!("Average Score: {:.2}", self.average)
    }
}

/// An artifact that has been written for one entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderedDocument {
    pub entity_id: EntityId,
    pub path: PathBuf,
}

/// What happened to one entity during the batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", tag = "status")]
pub enum EntityOutcome {
    /// The artifact was written.
    Rendered { path: PathBuf },
    /// The entity had nothing to render.
    Skipped { reason: String },
    /// Aggregation or rendering failed for this entity.
    Failed { reason: String },
}

/// Outcome record for one entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityReport {
    pub entity_id: EntityId,
    pub entity_name: String,
    #[serde(flatten)]
    pub outcome: EntityOutcome,
}

/// Result of a completed batch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchReport {
    /// Source workbook that was processed.
    pub source: PathBuf,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    /// Source rows discarded because their identity cell was blank.
    pub dropped_rows: usize,
    pub entities: Vec<EntityReport>,
}

impl BatchReport {
    pub fn rendered(&self) -> usize {
        self.count(|o| matches!(o, EntityOutcome::Rendered { .. }))
    }

    pub fn skipped(&self) -> usize {
        self.count(|o| matches!(o, EntityOutcome::Skipped { .. }))
    }

    pub fn failed(&self) -> usize {
        self.count(|o| matches!(o, EntityOutcome::Failed { .. }))
    }

    fn count(&self, pred: impl Fn(&EntityOutcome) -> bool) -> usize {
        self.entities.iter().filter(|e| pred(&e.outcome)).count()
    }
}

/// Format a number without a trailing `.0` for whole values.
pub fn format_number(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        value.to_string()
    }
}
