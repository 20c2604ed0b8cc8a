//! Progress reporting for the batch loop.

use crate::models::{BatchReport, EntityOutcome, EntityReport};
use indicatif::{ProgressBar, ProgressStyle};
use std::fmt;

/// Pipeline stage, reported as the batch moves forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Loading,
    Validating,
    Grouping,
    Rendering,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Loading => write!(f, "Loading source"),
            Stage::Validating => write!(f, "Validating columns"),
            Stage::Grouping => write!(f, "Grouping rows"),
            Stage::Rendering => write!(f, "Rendering report cards"),
        }
    }
}

/// Progress callback for reporting batch status.
pub trait ProgressReporter: Send + Sync {
    /// Called when entering a new stage.
    fn stage(&self, stage: Stage);
    /// Called once the number of entities is known.
    fn entities(&self, total: usize);
    /// Called after each entity has been handled.
    fn entity_done(&self, entity: &EntityReport);
    /// Called when the batch completes.
    fn done(&self, report: &BatchReport);
}

/// No-op progress reporter for quiet runs and tests.
pub struct SilentProgress;

impl ProgressReporter for SilentProgress {
    fn stage(&self, _stage: Stage) {}
    fn entities(&self, _total: usize) {}
    fn entity_done(&self, _entity: &EntityReport) {}
    fn done(&self, _report: &BatchReport) {}
}

/// Terminal progress bar over the entity loop.
pub struct BarProgress {
    bar: ProgressBar,
}

impl BarProgress {
    pub fn new() -> Self {
        let bar = ProgressBar::new(0);
        bar.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("#>-"),
        );
        Self { bar }
    }
}

impl Default for BarProgress {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressReporter for BarProgress {
    fn stage(&self, stage: Stage) {
        self.bar.set_message(stage.to_string());
    }

    fn entities(&self, total: usize) {
        self.bar.set_length(total as u64);
    }

    fn entity_done(&self, entity: &EntityReport) {
        if let Some(line) = outcome_line(entity) {
            self.bar.println(line);
        }
        self.bar.set_message(entity.entity_name.clone());
        self.bar.inc(1);
    }

    fn done(&self, _report: &BatchReport) {
        self.bar.finish_and_clear();
    }
}

/// User-facing line for an entity that did not produce a document.
fn outcome_line(entity: &EntityReport) -> Option<String> {
    match &entity.outcome {
        EntityOutcome::Rendered { .. } => None,
        EntityOutcome::Skipped { reason } => Some(format!(
            "   ⏭️  Skipped {} (ID: {}): {}",
            entity.entity_name, entity.entity_id, reason
        )),
        EntityOutcome::Failed { reason } => Some(format!(
            "   ❌ Failed {} (ID: {}): {}",
            entity.entity_name, entity.entity_id, reason
        )),
    }
}
