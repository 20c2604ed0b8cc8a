//! Styled workbook output.
//!
//! Draws the report-card layout onto the first worksheet of a new
//! workbook: title, summary lines, then the detail table with a filled
//! header row, a thin grid, and a centered score column.

use crate::error::EntityError;
use crate::models::ReportCard;
use std::path::Path;
use umya_spreadsheet::structs::HorizontalAlignmentValues;
use umya_spreadsheet::{Border, PatternValues, Spreadsheet, Style, Worksheet};

const SHEET_NAME: &str = "Sheet1";

const HEADER_BACKGROUND: &str = "FF00008B"; // dark blue
const HEADER_FOREGROUND: &str = "FFF5F5F5"; // white smoke
const GRID_COLOR: &str = "FF000000";
const TABLE_FONT: &str = "Helvetica";
const TABLE_FONT_SIZE: f64 = 10.0;
const TITLE_FONT_SIZE: f64 = 16.0;

const LABEL_COLUMN_WIDTH: f64 = 22.0;
const SCORE_COLUMN_WIDTH: f64 = 14.0;

/// Row of the table header; data rows follow directly below.
const TABLE_HEADER_ROW: u32 = 5;

/// Build the workbook for one report card.
pub fn build_workbook(card: &ReportCard) -> Result<Spreadsheet, EntityError> {
    let mut book = umya_spreadsheet::new_file();
    let sheet = book
        .get_sheet_by_name_mut(SHEET_NAME)
        .ok_or_else(|| EntityError::render("new workbook has no default sheet"))?;

    draw_report_card(sheet, card);

    Ok(book)
}

/// Write the report card workbook to `path`.
pub fn write_workbook(card: &ReportCard, path: &Path) -> Result<(), EntityError> {
    let book = build_workbook(card)?;
    umya_spreadsheet::writer::xlsx::write(&book, path).map_err(EntityError::render)
}

fn draw_report_card(sheet: &mut Worksheet, card: &ReportCard) {
    // Title and summary lines
    let title = sheet.get_cell_mut("A1");
    title.set_value(card.title.as_str());
    let font = title.get_style_mut().get_font_mut();
    font.set_bold(true);
    font.set_size(TITLE_FONT_SIZE);

    sheet.get_cell_mut("A2").set_value(card.total_line());
    sheet.get_cell_mut("A3").set_value(card.average_line());

    // Header row
    let header_row = TABLE_HEADER_ROW;
    for (col, text) in [(1u32, &card.headers[0]), (2u32, &card.headers[1])] {
        let cell = sheet.get_cell_mut((col, header_row));
        cell.set_value(text.as_str());
        let style = cell.get_style_mut();
        apply_table_style(style);
        apply_header_style(style);
    }

    // Data rows
    for (offset, row) in card.rows.iter().enumerate() {
        let row_number = header_row + 1 + offset as u32;

        let label = sheet.get_cell_mut((1u32, row_number));
        label.set_value(row.label.as_str());
        apply_table_style(label.get_style_mut());

        let score = sheet.get_cell_mut((2u32, row_number));
        score.set_value_number(row.value);
        let style = score.get_style_mut();
        apply_table_style(style);
        style
            .get_alignment_mut()
            .set_horizontal(HorizontalAlignmentValues::Center);
    }

    sheet
        .get_column_dimension_mut("A")
        .set_width(LABEL_COLUMN_WIDTH);
    sheet
        .get_column_dimension_mut("B")
        .set_width(SCORE_COLUMN_WIDTH);
}

/// Font and grid shared by every table cell.
fn apply_table_style(style: &mut Style) {
    let font = style.get_font_mut();
    font.set_name(TABLE_FONT);
    font.set_size(TABLE_FONT_SIZE);

    let borders = style.get_borders_mut();
    apply_grid_side(borders.get_left_border_mut());
    apply_grid_side(borders.get_right_border_mut());
    apply_grid_side(borders.get_top_border_mut());
    apply_grid_side(borders.get_bottom_border_mut());
}

fn apply_grid_side(border: &mut Border) {
    border.set_border_style(Border::BORDER_THIN);
    border.get_color_mut().set_argb(GRID_COLOR);
}

fn apply_header_style(style: &mut Style) {
    style.get_font_mut().get_color_mut().set_argb(HEADER_FOREGROUND);

    let fill = style.get_fill_mut().get_pattern_fill_mut();
    fill.set_pattern_type(PatternValues::Solid);
    fill.get_foreground_color_mut().set_argb(HEADER_BACKGROUND);
    fill.get_background_color_mut().set_argb(HEADER_BACKGROUND);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{EntityId, LabeledMeasurement};
    use tempfile::tempdir;

    fn create_test_card() -> ReportCard {
        ReportCard {
            entity_id: EntityId::new("1").unwrap(),
            entity_name: "Ann".to_string(),
            title: "Report Card for Ann".to_string(),
            total: 170.0,
            average: 85.0,
            headers: ["Label".to_string(), "Score".to_string()],
            rows: vec![
                LabeledMeasurement {
                    label: "Measurement 1".to_string(),
                    value: 80.0,
                },
                LabeledMeasurement {
                    label: "Measurement 2".to_string(),
                    value: 90.0,
                },
            ],
        }
    }

    #[test]
    fn test_build_workbook_layout() {
        let book = build_workbook(&create_test_card()).unwrap();
        let sheet = book.get_sheet_by_name(SHEET_NAME).unwrap();

        let text = |coord: &str| sheet.get_value(coord);
        assert_eq!(text("A1"), "Report Card for Ann");
        assert_eq!(text("A2"), "Total Score: 170");
        assert_eq!(text("A3"), "Average Score: 85.00");
        assert_eq!(text("A5"), "Label");
        assert_eq!(text("B5"), "Score");
        assert_eq!(text("A6"), "Measurement 1");
        assert_eq!(text("B6"), "80");
        assert_eq!(text("A7"), "Measurement 2");
        assert_eq!(text("B7"), "90");
    }

    #[test]
    fn test_header_is_filled_and_data_is_centered() {
        let book = build_workbook(&create_test_card()).unwrap();
        let sheet = book.get_sheet_by_name(SHEET_NAME).unwrap();

        let header = sheet.get_cell("A5").unwrap().get_style();
        let fill = header.get_fill().unwrap().get_pattern_fill().unwrap();
        assert_eq!(fill.get_pattern_type(), &PatternValues::Solid);
        assert_eq!(
            fill.get_foreground_color().unwrap().get_argb(),
            HEADER_BACKGROUND
        );

        let score = sheet.get_cell("B6").unwrap().get_style();
        assert_eq!(
            score.get_alignment().unwrap().get_horizontal(),
            &HorizontalAlignmentValues::Center
        );
        let label = sheet.get_cell("A6").unwrap().get_style();
        let label_filled = label
            .get_fill()
            .and_then(|f| f.get_pattern_fill())
            .map_or(false, |p| p.get_pattern_type() == &PatternValues::Solid);
        assert!(!label_filled);
    }

    #[test]
    fn test_write_workbook_round_trips_through_reader() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("report_card_1.xlsx");

        write_workbook(&create_test_card(), &path).unwrap();

        let book = umya_spreadsheet::reader::xlsx::read(&path).unwrap();
        let sheet = book.get_sheet_collection().first().unwrap();
        assert_eq!(sheet.get_value("A1"), "Report Card for Ann");
        assert_eq!(sheet.get_value("B7"), "90");
    }
}
