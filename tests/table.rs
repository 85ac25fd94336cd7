use chrono::NaiveDate;
use opsboard::{
    dataset::Dataset,
    table::{DueState, TableView, render_table},
};

fn dataset(raw: &[&[&str]]) -> Dataset {
    let rows = raw
        .iter()
        .map(|row| row.iter().map(|cell| cell.to_string()).collect())
        .collect::<Vec<_>>();
    Dataset::from_rows(&rows)
}

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
}

#[test]
fn truncated_cell_aligns_next_to_persian_header() {
    let data = dataset(&[
        &["عنوان", "note"],
        &["پروژه A", "Description A that might need truncating"],
    ]);
    let view = TableView::build(&data, today());

    let rendered = render_table(&view, false);
    let lines: Vec<&str> = rendered.lines().collect();

    assert_eq!(
        lines,
        vec![
            "عنوان    note",
            "-------  -----------------------",
            "پروژه A  Description A that m...",
        ]
    );
}

#[test]
fn multiline_cell_is_truncated_then_flattened() {
    let data = dataset(&[&["id", "note"], &["7", "line1\nline2 and a long tail here"]]);
    let view = TableView::build(&data, today());
    assert_eq!(
        view.rows[0].cells[1].full_text,
        "line1\nline2 and a long tail here"
    );

    let rendered = render_table(&view, false);
    let lines: Vec<&str> = rendered.lines().collect();

    assert_eq!(lines.len(), 3);
    assert_eq!(lines[2], "7   line1 line2 and a lo...");
}

#[test]
fn table_view_truncates_but_keeps_full_text() {
    let data = dataset(&[
        &["title", "description"],
        &["A", "Description A that might need truncating if too long"],
    ]);
    let view = TableView::build(&data, today());
    let cell = &view.rows[0].cells[1];
    assert_eq!(cell.display, "Description A that m...");
    assert_eq!(
        cell.full_text,
        "Description A that might need truncating if too long"
    );

    let short = render_table(&view, false);
    let full = render_table(&view, true);
    assert!(short.contains("Description A that m..."));
    assert!(full.contains("if too long"));
}

#[test]
fn table_view_highlights_rows_by_first_date_column() {
    let data = dataset(&[
        &["Equipment", "Calibration Date", "Delivery date"],
        &["Gauge", "2023/12/01", "2030/01/01"],
        &["Scale", "2024/01/15", ""],
        &["Meter", "unknown", "2020/01/01"],
    ]);
    let view = TableView::build(&data, today());
    let states = view.rows.iter().map(|row| row.due).collect::<Vec<_>>();
    assert_eq!(
        states,
        vec![DueState::Overdue, DueState::DueSoon, DueState::None]
    );
}

#[test]
fn table_view_marks_due_today_and_zoned_dates() {
    let data = dataset(&[
        &["Item", "Due Date"],
        &["Valve", "2024-01-01"],
        &["Seal", "2024-01-20T09:00:00Z"],
        &["Shaft", "2023-12-31T22:00:00-04:00"],
    ]);
    let view = TableView::build(&data, today());
    let states = view.rows.iter().map(|row| row.due).collect::<Vec<_>>();
    assert_eq!(
        states,
        vec![DueState::Overdue, DueState::DueSoon, DueState::Overdue]
    );
}
