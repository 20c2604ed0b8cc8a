//! Artifact naming and writing.
//!
//! Artifact names depend only on the entity id, so a re-run overwrites the
//! same files. Content is written to a temporary file in the output
//! directory and then persisted over the target name.

use super::{generator, xlsx, ReportFormat};
use crate::error::EntityError;
use crate::models::{EntityId, RenderedDocument, ReportCard};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tempfile::NamedTempFile;
use tracing::debug;

/// Deterministic artifact path for an entity.
pub fn artifact_path(
    output_dir: &Path,
    file_prefix: &str,
    entity_id: &EntityId,
    format: ReportFormat,
) -> PathBuf {
    output_dir.join(format!(
        "{}{}.{}",
        file_prefix,
        sanitize_file_component(entity_id.as_str()),
        format.extension()
    ))
}

/// Replace characters that are unsafe in file names with `_`.
pub fn sanitize_file_component(raw: &str) -> String {
    raw.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// Write one report card to `target` in the given format.
pub fn write_report_card(
    card: &ReportCard,
    format: ReportFormat,
    target: &Path,
) -> Result<(), EntityError> {
    let staged = stage_report_card(card, format, target)?;
    persist_staged(staged, target)
}

/// Render the report card into a temporary file next to `target`.
fn stage_report_card(
    card: &ReportCard,
    format: ReportFormat,
    target: &Path,
) -> Result<NamedTempFile, EntityError> {
    let dir = target.parent().unwrap_or_else(|| Path::new("."));
    let mut staged = tempfile::Builder::new()
        .prefix(".report_card")
        .suffix(&format!(".{}", format.extension()))
        .tempfile_in(dir)
        .map_err(|e| EntityError::io(target, e))?;

    match format {
        ReportFormat::Xlsx => xlsx::write_workbook(card, staged.path())?,
        ReportFormat::Markdown => {
            let content = generator::generate_markdown_report(card);
            staged
                .write_all(content.as_bytes())
                .map_err(|e| EntityError::io(target, e))?;
        }
        ReportFormat::Json => {
            let content = generator::generate_json_report(card)?;
            staged
                .write_all(content.as_bytes())
                .map_err(|e| EntityError::io(target, e))?;
        }
    }

    Ok(staged)
}

fn persist_staged(staged: NamedTempFile, target: &Path) -> Result<(), EntityError> {
    staged
        .persist(target)
        .map_err(|e| EntityError::io(target, e.error))?;

    debug!("Wrote {}", target.display());
    Ok(())
}

/// Decides, exactly once, whether a bounded write is committed or abandoned.
#[derive(Debug, Default)]
struct WriteGate(AtomicU8);

impl WriteGate {
    const PENDING: u8 = 0;
    const COMMITTED: u8 = 1;
    const CANCELLED: u8 = 2;

    /// Claim the right to persist. False once the write was cancelled.
    fn commit(&self) -> bool {
        self.settle(Self::COMMITTED)
    }

    /// Abandon the write. False once the writer has committed.
    fn cancel(&self) -> bool {
        self.settle(Self::CANCELLED)
    }

    fn settle(&self, to: u8) -> bool {
        self.0
            .compare_exchange(Self::PENDING, to, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }
}

/// Write a report card on the blocking pool, bounded by `limit`.
///
/// On timeout the staged file is discarded and the target is left as it
/// was. A writer that is already persisting when the limit expires is
/// awaited instead, and its own result is returned.
pub async fn write_with_timeout(
    card: ReportCard,
    format: ReportFormat,
    target: PathBuf,
    limit: Duration,
) -> Result<RenderedDocument, EntityError> {
    let path = target.clone();
    let gate = Arc::new(WriteGate::default());
    let writer_gate = Arc::clone(&gate);

    let mut task = tokio::task::spawn_blocking(move || -> Result<RenderedDocument, EntityError> {
        let staged = stage_report_card(&card, format, &target)?;
        if !writer_gate.commit() {
            debug!("Discarding {} after timeout", target.display());
            return Err(EntityError::Timeout {
                path: target,
                limit,
            });
        }
        persist_staged(staged, &target)?;
        Ok(RenderedDocument {
            entity_id: card.entity_id,
            path: target,
        })
    });

    let joined = match tokio::time::timeout(limit, &mut task).await {
        Ok(joined) => joined,
        Err(_) if gate.cancel() => return Err(EntityError::Timeout { path, limit }),
        Err(_) => task.await,
    };

    joined.unwrap_or_else(|join_err| {
        Err(EntityError::render(format!(
            "writer task failed: {}",
            join_err
        )))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::LabeledMeasurement;
    use tempfile::tempdir;

    fn create_test_card(id: &str) -> ReportCard {
        ReportCard {
            entity_id: EntityId::new(id).unwrap(),
            entity_name: "Ann".to_string(),
            title: "Report Card for Ann".to_string(),
            total: 80.0,
            average: 80.0,
            headers: ["Label".to_string(), "Score".to_string()],
            rows: vec![LabeledMeasurement {
                label: "Measurement 1".to_string(),
                value: 80.0,
            }],
        }
    }

    #[test]
    fn test_artifact_path_is_derived_from_id() {
        let id = EntityId::new("S-001").unwrap();
        let path = artifact_path(Path::new("out"), "report_card_", &id, ReportFormat::Xlsx);
        assert_eq!(path, PathBuf::from("out/report_card_S-001.xlsx"));
    }

    #[test]
    fn test_sanitize_file_component() {
        assert_eq!(sanitize_file_component("a/b c"), "a_b_c");
        assert_eq!(sanitize_file_component("12.5"), "12.5");
        assert_eq!(sanitize_file_component("..\\x"), ".._x");
    }

    #[test]
    fn test_write_report_card_overwrites_target() {
        let dir = tempdir().unwrap();
        let target = dir.path().join("report_card_1.md");
        std::fs::write(&target, "stale").unwrap();

        write_report_card(&create_test_card("1"), ReportFormat::Markdown, &target).unwrap();

        let content = std::fs::read_to_string(&target).unwrap();
        assert!(content.starts_with("# Report Card for Ann"));
        let leftovers = std::fs::read_dir(dir.path()).unwrap().count();
        assert_eq!(leftovers, 1);
    }

    #[test]
    fn test_write_report_card_into_missing_directory_fails() {
        let dir = tempdir().unwrap();
        let target = dir.path().join("missing").join("report_card_1.json");

        let err = write_report_card(&create_test_card("1"), ReportFormat::Json, &target)
            .unwrap_err();
        assert!(matches!(err, EntityError::Io { .. }));
    }

    #[tokio::test]
    async fn test_write_with_timeout_returns_document() {
        let dir = tempdir().unwrap();
        let target = dir.path().join("report_card_1.xlsx");

        let doc = write_with_timeout(
            create_test_card("1"),
            ReportFormat::Xlsx,
            target.clone(),
            Duration::from_secs(30),
        )
        .await
        .unwrap();

        assert_eq!(doc.path, target);
        assert_eq!(doc.entity_id.as_str(), "1");
        assert!(target.is_file());
    }

    #[test]
    fn test_write_gate_settles_once() {
        let gate = WriteGate::default();
        assert!(gate.cancel());
        assert!(!gate.commit());
        assert!(!gate.cancel());

        let gate = WriteGate::default();
        assert!(gate.commit());
        assert!(!gate.cancel());
    }

    #[tokio::test]
    async fn test_timed_out_write_leaves_target_untouched() {
        let dir = tempdir().unwrap();
        let target = dir.path().join("report_card_1.xlsx");
        std::fs::write(&target, "previous run").unwrap();

        let mut card = create_test_card("1");
        card.rows = (1..=2000)
            .map(|i| LabeledMeasurement {
                label: format!("Measurement {}", i),
                value: i as f64,
            })
            .collect();

        let result =
            write_with_timeout(card, ReportFormat::Xlsx, target.clone(), Duration::ZERO).await;

        // Wait for the abandoned writer to drop its staged file.
        for _ in 0..200 {
            if std::fs::read_dir(dir.path()).unwrap().count() == 1 {
                break;
            }
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);

        match result {
            Err(EntityError::Timeout { path, limit }) => {
                assert_eq!(path, target);
                assert_eq!(limit, Duration::ZERO);
                assert_eq!(std::fs::read_to_string(&target).unwrap(), "previous run");
            }
            // The writer won the race and committed before the deadline check.
            Ok(doc) => {
                assert_eq!(doc.path, target);
                assert_ne!(std::fs::read(&target).unwrap(), b"previous run");
            }
            Err(other) => panic!("unexpected error: {other}"),
        }
    }
}
