//! Header validation and row extraction.
//!
//! The validator resolves the required column names against the header
//! row once; rows are then read through the resulting [`ColumnIndex`].

use super::Table;
use crate::error::BatchError;
use crate::models::{EntityId, Measurement, SourceRow};
use tracing::warn;

/// Names of the columns a source must provide.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schema {
    pub id_column: String,
    pub name_column: String,
    pub score_column: String,
}

impl Default for Schema {
    fn default() -> Self {
        Self {
            id_column: "Student ID".to_string(),
            name_column: "Name".to_string(),
            score_column: "Subject Score".to_string(),
        }
    }
}

/// Positions of the required columns within a table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnIndex {
    pub id: usize,
    pub name: usize,
    pub score: usize,
}

impl Schema {
    /// Resolve the required columns against `headers`.
    ///
    /// Header names are trimmed before comparison. Every missing column
    /// is named in the returned error.
    pub fn validate(&self, headers: &[String]) -> Result<ColumnIndex, BatchError> {
        let position = |wanted: &str| headers.iter().position(|h| h.trim() == wanted.trim());

        let id = position(&self.id_column);
        let name = position(&self.name_column);
        let score = position(&self.score_column);

        match (id, name, score) {
            (Some(id), Some(name), Some(score)) => Ok(ColumnIndex { id, name, score }),
            _ => {
                let missing = [
                    (id, &self.id_column),
                    (name, &self.name_column),
                    (score, &self.score_column),
                ]
                .into_iter()
                .filter(|(found, _)| found.is_none())
                .map(|(_, column)| column.trim().to_string())
                .collect();
                Err(BatchError::Schema { missing })
            }
        }
    }
}

/// Rows read from a validated table.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExtractedRows {
    pub rows: Vec<SourceRow>,
    /// Rows skipped because the identity cell was blank.
    pub dropped: usize,
}

/// Turn table rows into [`SourceRow`]s through a validated column index.
pub fn extract_rows(table: &Table, index: ColumnIndex) -> ExtractedRows {
    let mut extracted = ExtractedRows::default();

    for row in &table.rows {
        let Some(entity_id) = row.cell(index.id).and_then(EntityId::new) else {
            warn!("Row {} has no identity, dropping it", row.row_number);
            extracted.dropped += 1;
            continue;
        };

        let entity_name = row.cell(index.name).unwrap_or_default().trim().to_string();

        extracted.rows.push(SourceRow {
            row_number: row.row_number,
            entity_id,
            entity_name,
            measurement: parse_measurement(row.cell(index.score)),
        });
    }

    extracted
}

fn parse_measurement(cell: Option<&str>) -> Measurement {
    match cell.map(str::trim) {
        None | Some("") => Measurement::Missing,
        Some(text) => match text.parse::<f64>() {
            Ok(value) if value.is_finite() => Measurement::Value(value),
            _ => Measurement::Invalid(text.to_string()),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::TableRow;

    fn headers(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    fn row(row_number: u32, cells: &[Option<&str>]) -> TableRow {
        TableRow {
            row_number,
            cells: cells.iter().map(|c| c.map(String::from)).collect(),
        }
    }

    #[test]
    fn test_validate_trims_header_names() {
        let schema = Schema::default();
        let index = schema
            .validate(&headers(&["  Name", "Student ID ", "Comment", " Subject Score "]))
            .unwrap();
        assert_eq!(
            index,
            ColumnIndex {
                id: 1,
                name: 0,
                score: 3
            }
        );
    }

    #[test]
    fn test_validate_names_missing_score_column() {
        let err = Schema::default()
            .validate(&headers(&["Student ID", "Name"]))
            .unwrap_err();
        match err {
            BatchError::Schema { missing } => assert_eq!(missing, vec!["Subject Score"]),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_validate_names_all_missing_columns() {
        let err = Schema::default().validate(&[]).unwrap_err();
        match err {
            BatchError::Schema { missing } => {
                assert_eq!(missing, vec!["Student ID", "Name", "Subject Score"])
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_extract_rows_types_measurements() {
        let table = Table {
            headers: headers(&["Student ID", "Name", "Subject Score"]),
            rows: vec![
                row(2, &[Some("1"), Some(" Ann "), Some("80")]),
                row(3, &[Some("1"), Some("Ann"), None]),
                row(4, &[Some("1"), Some("Ann"), Some("abc")]),
                row(5, &[None, Some("Ghost"), Some("70")]),
            ],
        };
        let index = Schema::default().validate(&table.headers).unwrap();

        let extracted = extract_rows(&table, index);

        assert_eq!(extracted.dropped, 1);
        assert_eq!(extracted.rows.len(), 3);
        assert_eq!(extracted.rows[0].entity_name, "Ann");
        assert_eq!(extracted.rows[0].measurement, Measurement::Value(80.0));
        assert_eq!(extracted.rows[1].measurement, Measurement::Missing);
        assert_eq!(
            extracted.rows[2].measurement,
            Measurement::Invalid("abc".to_string())
        );
        assert_eq!(extracted.rows[2].row_number, 4);
    }

    #[test]
    fn test_parse_measurement_rejects_non_finite() {
        assert_eq!(
            parse_measurement(Some("NaN")),
            Measurement::Invalid("NaN".to_string())
        );
        assert_eq!(parse_measurement(Some(" 7.5 ")), Measurement::Value(7.5));
    }
}
