//! CSV ingestion into an untyped table

use csv::ReaderBuilder;
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;
use tracing::info;

use crate::error::DashboardError;

/// Header names plus string cells, exactly as read from the file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl RawTable {
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    /// Cells of one column, top to bottom.
    pub fn column(&self, index: usize) -> impl Iterator<Item = &str> + '_ {
        self.rows
            .iter()
            .map(move |row| row.get(index).map(String::as_str).unwrap_or(""))
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Read a delimited table with a header row. Short rows are padded with empty cells.
pub fn read_table<R: Read>(reader: R) -> Result<RawTable, csv::Error> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::Headers)
        .from_reader(reader);

    let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
    let width = headers.len();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        let mut row: Vec<String> = record.iter().map(str::to_string).collect();
        row.resize(width.max(row.len()), String::new());
        rows.push(row);
    }

    Ok(RawTable { headers, rows })
}

/// Load the dataset file. A missing file is the dashboard's one fatal condition.
pub fn load_table(path: &Path) -> Result<RawTable, DashboardError> {
    let file = File::open(path).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => DashboardError::DatasetNotFound {
            path: path.to_path_buf(),
        },
        _ => DashboardError::DatasetUnreadable {
            path: path.to_path_buf(),
            source: csv::Error::from(e),
        },
    })?;

    let table = read_table(file).map_err(|source| DashboardError::DatasetUnreadable {
        path: path.to_path_buf(),
        source,
    })?;

    info!(
        "Read {} rows x {} columns from {:?}",
        table.len(),
        table.headers.len(),
        path
    );
    Ok(table)
}
