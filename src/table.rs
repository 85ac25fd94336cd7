use std::borrow::Cow;
use std::fmt::Write as _;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::Serialize;

use crate::dataset::{Dataset, HeaderSpec};

/// Cells longer than this many characters are shown truncated.
pub const TRUNCATE_AT: usize = 20;
const ELLIPSIS: &str = "...";
const DUE_SOON_DAYS: i64 = 30;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Cell {
    pub display: String,
    pub full_text: String,
}

impl Cell {
    pub fn new(value: &str) -> Self {
        Self {
            display: truncate(value),
            full_text: value.to_string(),
        }
    }

    pub fn is_truncated(&self) -> bool {
        self.display != self.full_text
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DueState {
    Overdue,
    DueSoon,
    None,
}

impl DueState {
    /// A date on or before `today` is overdue. Unparseable or blank dates
    /// carry no signal.
    pub fn classify(value: &str, today: NaiveDate) -> Self {
        let Some(date) = parse_date(value) else {
            return DueState::None;
        };
        if date <= today {
            DueState::Overdue
        } else if (date - today).num_days() <= DUE_SOON_DAYS {
            DueState::DueSoon
        } else {
            DueState::None
        }
    }

    pub fn css_class(self) -> Option<&'static str> {
        match self {
            DueState::Overdue => Some("highlight-red"),
            DueState::DueSoon => Some("highlight-yellow"),
            DueState::None => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableRow {
    pub cells: Vec<Cell>,
    pub due: DueState,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableView {
    pub headers: Vec<String>,
    pub rows: Vec<TableRow>,
}

impl TableView {
    pub fn build(dataset: &Dataset, today: NaiveDate) -> Self {
        let date_column = date_column(dataset.header());
        let rows = dataset
            .records()
            .iter()
            .map(|record| TableRow {
                cells: record.values().iter().map(|value| Cell::new(value)).collect(),
                due: date_column
                    .and_then(|idx| record.value(idx))
                    .map(|value| DueState::classify(value, today))
                    .unwrap_or(DueState::None),
            })
            .collect();
        Self {
            headers: dataset.header().names().to_vec(),
            rows,
        }
    }
}

/// First column whose name marks it as a date (English or Persian).
pub fn date_column(header: &HeaderSpec) -> Option<usize> {
    header.iter().position(|name| {
        name.to_lowercase().contains("date")
            || name.contains("تاریخ")
            || name.contains("کالیبراسیون")
    })
}

/// Dates with an offset (`2024-03-01T10:00:00Z`) keep the calendar date as
/// written, not the date after conversion to local time.
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y", "%d-%m-%Y"];
    const DATETIME_FORMATS: &[&str] =
        &["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"];
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(value, fmt).ok())
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
                .map(|dt| dt.date())
        })
        .or_else(|| {
            DateTime::parse_from_rfc3339(value)
                .ok()
                .map(|dt| dt.date_naive())
        })
}

pub fn truncate(value: &str) -> String {
    match value.char_indices().nth(TRUNCATE_AT) {
        Some((cut, _)) => format!("{}{ELLIPSIS}", &value[..cut]),
        None => value.to_string(),
    }
}

/// Renders an elastic, space-aligned table. With `full` unset, cells show
/// their truncated text.
pub fn render_table(view: &TableView, full: bool) -> String {
    let lines = view
        .rows
        .iter()
        .map(|row| {
            row.cells
                .iter()
                .map(|cell| if full { &cell.full_text } else { &cell.display })
                .cloned()
                .collect::<Vec<_>>()
        })
        .collect::<Vec<_>>();
    render_rows(&view.headers, &lines)
}

pub fn render_rows(headers: &[String], rows: &[Vec<String>]) -> String {
    let mut widths = headers.iter().map(|h| display_width(h).max(1)).collect::<Vec<_>>();
    for row in rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(display_width(cell));
        }
    }

    let mut output = String::new();
    let _ = writeln!(output, "{}", format_row(headers, &widths));
    let separator_widths = widths.iter().map(|w| (*w).max(3)).collect::<Vec<_>>();
    let separators = separator_widths
        .iter()
        .map(|w| "-".repeat(*w))
        .collect::<Vec<_>>();
    let _ = writeln!(output, "{}", format_row(&separators, &separator_widths));
    for row in rows {
        let _ = writeln!(output, "{}", format_row(row, &widths));
    }
    output
}

pub fn print_table(view: &TableView, full: bool) {
    print!("{}", render_table(view, full));
}

fn format_row(values: &[String], widths: &[usize]) -> String {
    let mut line = values
        .iter()
        .zip(widths)
        .map(|(value, width)| {
            let sanitized = sanitize_cell(value);
            let padding = width.saturating_sub(display_width(&sanitized));
            format!("{sanitized}{}", " ".repeat(padding))
        })
        .collect::<Vec<_>>()
        .join("  ");
    line.truncate(line.trim_end_matches(' ').len());
    line
}

fn display_width(value: &str) -> usize {
    let mut width = 0usize;
    let mut chars = value.chars();
    while let Some(ch) = chars.next() {
        if ch == '\u{1b}' {
            // ANSI escape, e.g. \x1b[31m
            for next in chars.by_ref() {
                if next == 'm' {
                    break;
                }
            }
        } else {
            width += 1;
        }
    }
    width
}

fn sanitize_cell(value: &str) -> Cow<'_, str> {
    if value.contains(['\n', '\r', '\t']) {
        Cow::Owned(value.replace(['\n', '\r', '\t'], " "))
    } else {
        Cow::Borrowed(value)
    }
}
