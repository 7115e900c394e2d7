//! Plain-text rendering of the inventory screen.

use std::fmt::Write;

use client_core::{
    export_preset_label, Modal, NoticeKind, ViewState, EXPORT_AGE_PRESETS,
};
use shared::domain::VehicleRecord;

pub const COLUMNS: [&str; 11] = [
    "ID",
    "First Name",
    "Last Name",
    "Email",
    "Car Make",
    "Car Model",
    "VIN",
    "Manufacture Date",
    "Age",
    "Update",
    "Delete",
];

pub const EMPTY_ROW: &str = "No vehicles found";

pub fn render_view(state: &ViewState) -> String {
    let mut out = String::new();

    let search = if state.search_text().is_empty() {
        "none".to_string()
    } else {
        format!("\"{}\"", state.search_text())
    };
    let _ = writeln!(out, "Vehicles | page {} | search: {search}", state.page());
    if let Some(path) = state.selected_file() {
        let _ = writeln!(out, "Import file: {}", path.display());
    }

    if let Some(notice) = state.notification() {
        let tag = match notice.kind {
            NoticeKind::Success => "ok",
            NoticeKind::Failure => "error",
        };
        let _ = writeln!(out, "[{tag}] {}", notice.message);
    }

    if state.is_export_menu_open() {
        let _ = writeln!(out, "Export:");
        for age in EXPORT_AGE_PRESETS {
            let _ = writeln!(out, "  export {age:<3} {}", export_preset_label(age));
        }
    }

    out.push_str(&render_table(state.records()));

    match state.modal() {
        Some(Modal::Update { record, buffer }) => {
            let _ = writeln!(out, "Update vehicle {}:", record.id);
            let _ = writeln!(out, "  first: {}", buffer.first_name);
            let _ = writeln!(out, "  last:  {}", buffer.last_name);
            let _ = writeln!(out, "  email: {}", buffer.email);
            let _ = writeln!(out, "  (set <field> <value>, save, cancel)");
        }
        Some(Modal::Delete { record }) => {
            let _ = writeln!(
                out,
                "Delete vehicle {} ({} {}, {})? (confirm, cancel)",
                record.id, record.car_make, record.car_model, record.vin
            );
        }
        None => {}
    }

    out
}

fn row_cells(record: &VehicleRecord) -> [String; 11] {
    [
        record.id.to_string(),
        record.first_name.clone(),
        record.last_name.clone(),
        record.email.clone(),
        record.car_make.clone(),
        record.car_model.clone(),
        record.vin.clone(),
        record.display_date(),
        record.age_of_vehicle.to_string(),
        format!("edit {}", record.id),
        format!("delete {}", record.id),
    ]
}

pub fn render_table(records: &[VehicleRecord]) -> String {
    let rows: Vec<[String; 11]> = records.iter().map(row_cells).collect();

    let mut widths = COLUMNS.map(str::len);
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let mut out = String::new();
    let header: Vec<String> = COLUMNS
        .iter()
        .zip(widths)
        .map(|(name, width)| format!("{name:<width$}"))
        .collect();
    let _ = writeln!(out, "{}", header.join(" | ").trim_end());

    let total_width = widths.iter().sum::<usize>() + 3 * (COLUMNS.len() - 1);
    let _ = writeln!(out, "{}", "-".repeat(total_width));

    if rows.is_empty() {
        // single row spanning every column
        let _ = writeln!(out, "{EMPTY_ROW:^total_width$}");
        return out;
    }

    for row in rows {
        let cells: Vec<String> = row
            .iter()
            .zip(widths)
            .map(|(cell, width)| format!("{cell:<width$}"))
            .collect();
        let _ = writeln!(out, "{}", cells.join(" | ").trim_end());
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use shared::domain::VehicleId;

    fn record(id: i64) -> VehicleRecord {
        VehicleRecord {
            id: VehicleId(id),
            first_name: "Grace".into(),
            last_name: "Hopper".into(),
            email: "grace@example.com".into(),
            car_make: "Honda".into(),
            car_model: "Civic".into(),
            vin: "2HGFA16598H512345".into(),
            manufactured_date: NaiveDate::from_ymd_opt(2008, 6, 30),
            age_of_vehicle: 16,
        }
    }

    #[test]
    fn empty_page_renders_single_placeholder_row() {
        let table = render_table(&[]);
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("ID | First Name"));
        assert_eq!(lines[2].trim(), EMPTY_ROW);
    }

    #[test]
    fn rows_carry_all_eleven_columns_and_short_date() {
        let table = render_table(&[record(3)]);
        let row = table.lines().nth(2).expect("row");
        let cells: Vec<&str> = row.split(" | ").map(str::trim).collect();
        assert_eq!(cells.len(), COLUMNS.len());
        assert_eq!(cells[0], "3");
        assert_eq!(cells[7], "2008-06-30");
        assert_eq!(cells[8], "16");
        assert_eq!(cells[10], "delete 3");
    }

    #[test]
    fn unknown_date_renders_an_empty_cell() {
        let mut undated = record(4);
        undated.manufactured_date = None;
        let table = render_table(&[undated]);
        let row = table.lines().nth(2).expect("row");
        let cells: Vec<&str> = row.split(" | ").map(str::trim).collect();
        assert_eq!(cells.len(), COLUMNS.len());
        assert_eq!(cells[7], "");
    }

    #[test]
    fn default_view_shows_first_page_without_extras() {
        let text = render_view(&ViewState::default());
        assert!(text.starts_with("Vehicles | page 1 | search: none"));
        assert!(text.contains(EMPTY_ROW));
        assert!(!text.contains("Export:"));
        assert!(!text.contains("[ok]"));
    }
}
