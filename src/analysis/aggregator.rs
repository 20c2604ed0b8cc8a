//! Score aggregation and statistics.
//!
//! This module groups source rows by entity and computes the summary
//! statistics that go on each report card.

use crate::error::EntityError;
use crate::models::{EntityGroup, EntityId, EntitySummary, LabeledMeasurement, Measurement, SourceRow};
use indexmap::IndexMap;

/// Group rows by entity identifier.
///
/// Groups come out in order of first appearance and keep their rows in
/// source order, so every row lands in exactly one group.
pub fn group_rows(rows: Vec<SourceRow>) -> Vec<EntityGroup> {
    let mut grouped: IndexMap<EntityId, EntityGroup> = IndexMap::new();

    for row in rows {
        grouped
            .entry(row.entity_id.clone())
            .or_insert_with(|| EntityGroup {
                entity_id: row.entity_id.clone(),
                entity_name: row.entity_name.clone(),
                rows: Vec::new(),
            })
            .rows
            .push(row);
    }

    grouped.into_values().collect()
}

/// Compute the summary for one entity group.
///
/// Blank scores are ignored. A non-numeric score or a name that differs
/// from the group's name fails this entity only. A group with no usable
/// score yields [`EntityError::EmptyMeasurements`].
pub fn summarize(group: &EntityGroup, label_prefix: &str) -> Result<EntitySummary, EntityError> {
    let mut values = Vec::with_capacity(group.rows.len());

    for row in &group.rows {
        if row.entity_name != group.entity_name {
            return Err(EntityError::InconsistentName {
                row: row.row_number,
                expected: group.entity_name.clone(),
                found: row.entity_name.clone(),
            });
        }

        match &row.measurement {
            Measurement::Value(v) => values.push(*v),
            Measurement::Missing => {}
            Measurement::Invalid(text) => {
                return Err(EntityError::DataType {
                    row: row.row_number,
                    value: text.clone(),
                })
            }
        }
    }

    if values.is_empty() {
        return Err(EntityError::EmptyMeasurements);
    }

    let total: f64 = values.iter().sum();
    let count = values.len();

    Ok(EntitySummary {
        total,
        average: total / count as f64,
        count,
        labeled_measurements: label_measurements(&values, label_prefix),
    })
}

/// Label values positionally: `"<prefix> 1"`, `"<prefix> 2"`, ...
pub fn label_measurements(values: &[f64], prefix: &str) -> Vec<LabeledMeasurement> {
    values
        .iter()
        .enumerate()
        .map(|(i, value)| LabeledMeasurement {
            label: format!("{} {}", prefix, i + 1),
            value: *value,
        })
        .collect()
}
