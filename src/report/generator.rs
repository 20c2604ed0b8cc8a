//! Report-card document generation.
//!
//! This module builds the [`ReportCard`] model for one entity and renders
//! it as Markdown or JSON. The styled workbook lives in [`super::xlsx`].

use super::Layout;
use crate::error::EntityError;
use crate::models::{format_number, EntityGroup, EntitySummary, ReportCard};

/// Assemble the document model for one entity.
pub fn build_report_card(group: &EntityGroup, summary: &EntitySummary, layout: &Layout) -> ReportCard {
    ReportCard {
        entity_id: group.entity_id.clone(),
        entity_name: group.entity_name.clone(),
        title: format!("{} {}", layout.title_prefix, group.entity_name),
        total: summary.total,
        average: summary.average,
        headers: [layout.label_header.clone(), layout.score_header.clone()],
        rows: summary.labeled_measurements.clone(),
    }
}

/// Generate a complete Markdown report card.
pub fn generate_markdown_report(card: &ReportCard) -> String {
    let mut output = String::new();

    // Title
    output.push_str(&format!("# {}\n\n", card.title));

    // Summary lines
    output.push_str(&format!("{}\n\n", card.total_line()));
    output.push_str(&format!("{}\n\n", card.average_line()));

    // Detail table, score column centered
    output.push_str(&format!(
        "| **{}** | **{}** |\n",
        escape_cell(&card.headers[0]),
        escape_cell(&card.headers[1])
    ));
    output.push_str("|:---|:---:|\n");
    for row in &card.rows {
        output.push_str(&format!(
            "| {} | {} |\n",
            escape_cell(&row.label),
            format_number(row.value)
        ));
    }

    output
}

/// Generate a JSON report card.
pub fn generate_json_report(card: &ReportCard) -> Result<String, EntityError> {
    serde_json::to_string_pretty(card).map_err(EntityError::render)
}

fn escape_cell(text: &str) -> String {
    text.replace('|', "\\|")
}
