//! Batch orchestration: load → validate → group → per-entity render.
//!
//! Fatal conditions ([`BatchError`]) stop the batch before anything is
//! written. Everything that goes wrong for a single entity is caught at
//! the per-entity boundary and recorded in the [`BatchReport`].

pub mod progress;

pub use progress::{BarProgress, ProgressReporter, SilentProgress, Stage};

use crate::analysis::{group_rows, summarize};
use crate::error::{BatchError, EntityError};
use crate::models::{
    BatchReport, EntityGroup, EntityId, EntityOutcome, EntityReport, RenderedDocument,
};
use crate::report::{artifact_path, build_report_card, write_with_timeout, Layout, ReportFormat};
use crate::source::{extract_rows, load_table, Schema};
use chrono::Utc;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Everything the batch needs; no implicit paths.
#[derive(Debug, Clone)]
pub struct BatchConfig {
    /// Source workbook.
    pub source_path: PathBuf,
    /// Worksheet to read (first sheet when `None`).
    pub sheet: Option<String>,
    pub schema: Schema,
    /// Directory receiving one artifact per entity.
    pub output_dir: PathBuf,
    pub format: ReportFormat,
    pub layout: Layout,
    /// Upper bound for writing one artifact.
    pub write_timeout: Duration,
}

/// Grouped entities ready for rendering.
#[derive(Debug, Clone)]
pub struct BatchPlan {
    pub groups: Vec<EntityGroup>,
    /// Source rows dropped for a blank identity.
    pub dropped_rows: usize,
}

/// An artifact the batch would write (dry run).
#[derive(Debug, Clone, PartialEq)]
pub struct PlannedArtifact {
    pub entity_id: EntityId,
    pub entity_name: String,
    /// Source rows belonging to the entity.
    pub rows: usize,
    pub path: PathBuf,
}

/// Load, validate and group the source.
pub fn prepare(config: &BatchConfig, progress: &dyn ProgressReporter) -> Result<BatchPlan, BatchError> {
    progress.stage(Stage::Loading);
    let table = load_table(&config.source_path, config.sheet.as_deref())?;
    debug!("Loaded {} rows from {}", table.rows.len(), config.source_path.display());

    progress.stage(Stage::Validating);
    let index = config.schema.validate(&table.headers)?;
    debug!("Column positions: {:?}", index);

    progress.stage(Stage::Grouping);
    let extracted = extract_rows(&table, index);
    if extracted.dropped > 0 {
        warn!("Dropped {} row(s) without an identity", extracted.dropped);
    }
    let groups = group_rows(extracted.rows);
    info!("Found {} entities", groups.len());

    Ok(BatchPlan {
        groups,
        dropped_rows: extracted.dropped,
    })
}

/// Dry run: list the artifacts a batch would write, writing nothing.
pub fn plan_batch(config: &BatchConfig) -> Result<Vec<PlannedArtifact>, BatchError> {
    let plan = prepare(config, &SilentProgress)?;

    Ok(plan
        .groups
        .into_iter()
        .map(|group| PlannedArtifact {
            path: artifact_path(
                &config.output_dir,
                &config.layout.file_prefix,
                &group.entity_id,
                config.format,
            ),
            rows: group.rows.len(),
            entity_id: group.entity_id,
            entity_name: group.entity_name,
        })
        .collect())
}

/// Run the whole batch.
///
/// Returns `Err` only for fatal conditions. Once the source is validated
/// the batch always completes; per-entity outcomes are in the report.
pub async fn run_batch(
    config: &BatchConfig,
    progress: &dyn ProgressReporter,
) -> Result<BatchReport, BatchError> {
    let started_at = Utc::now();

    let plan = prepare(config, progress)?;

    std::fs::create_dir_all(&config.output_dir).map_err(|source| BatchError::OutputDir {
        path: config.output_dir.clone(),
        source,
    })?;

    progress.stage(Stage::Rendering);
    progress.entities(plan.groups.len());

    let mut entities = Vec::with_capacity(plan.groups.len());
    for group in &plan.groups {
        let outcome = match render_entity(group, config).await {
            Ok(doc) => {
                info!("Wrote report card for {} (ID: {})", group.entity_name, group.entity_id);
                EntityOutcome::Rendered { path: doc.path }
            }
            Err(e) if e.is_skip() => {
                debug!(
                    "Missing scores for {} (ID: {}), skipping",
                    group.entity_name, group.entity_id
                );
                EntityOutcome::Skipped {
                    reason: e.to_string(),
                }
            }
            Err(e) => {
                debug!(
                    "Failed to produce report card for {} (ID: {}): {}",
                    group.entity_name, group.entity_id, e
                );
                EntityOutcome::Failed {
                    reason: e.to_string(),
                }
            }
        };

        let entity = EntityReport {
            entity_id: group.entity_id.clone(),
            entity_name: group.entity_name.clone(),
            outcome,
        };
        progress.entity_done(&entity);
        entities.push(entity);
    }

    let report = BatchReport {
        source: config.source_path.clone(),
        started_at,
        finished_at: Utc::now(),
        dropped_rows: plan.dropped_rows,
        entities,
    };

    info!(
        "Batch completed: {} rendered, {} skipped, {} failed",
        report.rendered(),
        report.skipped(),
        report.failed()
    );
    progress.done(&report);

    Ok(report)
}

/// Aggregate and render one entity.
async fn render_entity(
    group: &EntityGroup,
    config: &BatchConfig,
) -> Result<RenderedDocument, EntityError> {
    let summary = summarize(group, &config.layout.label_prefix)?;
    let card = build_report_card(group, &summary, &config.layout);
    let target = artifact_path(
        &config.output_dir,
        &config.layout.file_prefix,
        &group.entity_id,
        config.format,
    );

    write_with_timeout(card, config.format, target, config.write_timeout).await
}
