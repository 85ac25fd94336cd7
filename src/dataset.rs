//! Header normalization and row materialization.
//!
//! A [`Dataset`] is built once per load: the first raw row becomes a
//! [`HeaderSpec`] as wide as the widest row in the file, and every following
//! row becomes a [`Record`] keyed by that header.

use std::sync::Arc;

/// One CSV line as positional cells.
pub type RawRow = Vec<String>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderSpec {
    names: Vec<String>,
}

impl HeaderSpec {
    /// Derives column names from the first row, sized to the widest row.
    /// Blank (or absent) header cells become `Column N`, 1-based.
    pub fn from_rows(rows: &[RawRow]) -> Self {
        let width = rows.iter().map(Vec::len).max().unwrap_or(0);
        let first = rows.first().map(Vec::as_slice).unwrap_or(&[]);
        Self::normalize(first, width)
    }

    pub fn normalize(first_row: &[String], width: usize) -> Self {
        let width = width.max(first_row.len());
        let names = (0..width)
            .map(|idx| match first_row.get(idx).map(|cell| cell.trim()) {
                Some(text) if !text.is_empty() => text.to_string(),
                _ => placeholder_name(idx),
            })
            .collect();
        Self { names }
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|candidate| candidate == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }
}

pub fn placeholder_name(index: usize) -> String {
    format!("Column {}", index + 1)
}

/// A data row keyed by its dataset header. Values are never absent: missing
/// trailing cells are stored as empty strings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    header: Arc<HeaderSpec>,
    values: Vec<String>,
}

impl Record {
    pub fn materialize(header: Arc<HeaderSpec>, row: &[String]) -> Self {
        let values = (0..header.len())
            .map(|idx| row.get(idx).cloned().unwrap_or_default())
            .collect();
        Self { header, values }
    }

    /// Looks up a field by column name. Duplicate names resolve to the first
    /// matching column.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.header
            .position(name)
            .map(|idx| self.values[idx].as_str())
    }

    pub fn value(&self, index: usize) -> Option<&str> {
        self.values.get(index).map(String::as_str)
    }

    pub fn values(&self) -> &[String] {
        &self.values
    }

    pub fn header(&self) -> &HeaderSpec {
        &self.header
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &str)> {
        self.header
            .iter()
            .zip(self.values.iter().map(String::as_str))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dataset {
    header: Arc<HeaderSpec>,
    records: Vec<Record>,
}

impl Dataset {
    pub fn from_rows(rows: &[RawRow]) -> Self {
        let header = Arc::new(HeaderSpec::from_rows(rows));
        let records = rows
            .iter()
            .skip(1)
            .map(|row| Record::materialize(Arc::clone(&header), row))
            .collect();
        Self { header, records }
    }

    pub fn header(&self) -> &HeaderSpec {
        &self.header
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn row_count(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rows(raw: &[&[&str]]) -> Vec<RawRow> {
        raw.iter()
            .map(|row| row.iter().map(|cell| cell.to_string()).collect())
            .collect()
    }

    #[test]
    fn header_fills_blank_cells_with_positional_names() {
        let header = HeaderSpec::from_rows(&rows(&[&["Title", " ", "", " Date "]]));
        assert_eq!(header.names(), ["Title", "Column 2", "Column 3", "Date"]);
    }

    #[test]
    fn header_widens_to_the_widest_row() {
        let header = HeaderSpec::from_rows(&rows(&[&["", ""], &["a", "b", "c", "d"]]));
        assert_eq!(
            header.names(),
            ["Column 1", "Column 2", "Column 3", "Column 4"]
        );
    }

    #[test]
    fn empty_input_yields_empty_dataset() {
        let dataset = Dataset::from_rows(&[]);
        assert!(dataset.header().is_empty());
        assert!(dataset.is_empty());
    }

    #[test]
    fn short_rows_pad_and_long_rows_truncate() {
        let header = Arc::new(HeaderSpec::normalize(
            &rows(&[&["a", "b", "c", "d", "e"]])[0],
            5,
        ));
        let short = Record::materialize(Arc::clone(&header), &rows(&[&["1", "2", "3"]])[0]);
        assert_eq!(short.get("d"), Some(""));
        assert_eq!(short.get("e"), Some(""));

        let narrow = Arc::new(HeaderSpec::normalize(&rows(&[&["a"]])[0], 1));
        let long = Record::materialize(narrow, &rows(&[&["1", "extra"]])[0]);
        assert_eq!(long.values(), ["1"]);
    }

    #[test]
    fn duplicate_header_names_resolve_to_first_column() {
        let dataset = Dataset::from_rows(&rows(&[&["x", "x"], &["first", "second"]]));
        let record = &dataset.records()[0];
        assert_eq!(record.get("x"), Some("first"));
        assert_eq!(record.value(1), Some("second"));
    }
}
