//! CSV serialization of fetched report data.

use std::fs::File;
use std::io::Write;
use std::path::Path;

/// One row of a report: column names mapped to rendered values, kept in
/// the order the columns were added.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Record {
    columns: Vec<(String, String)>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, column: &str, value: impl Into<String>) -> Self {
        self.columns.push((column.to_string(), value.into()));
        self
    }

    pub fn get(&self, column: &str) -> Option<&str> {
        self.columns
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value.as_str())
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|(name, _)| name.as_str())
    }
}

/// Write the records to `path`, replacing whatever was there. Each run
/// produces a fresh snapshot, never an appended log.
pub fn write_records(
    path: &Path,
    baseline_columns: &[&'static str],
    records: &[Record],
) -> Result<(), csv::Error> {
    let file = File::create(path)?;
    write_to(file, baseline_columns, records)
}

fn write_to<W: Write>(
    out: W,
    baseline_columns: &[&'static str],
    records: &[Record],
) -> Result<(), csv::Error> {
    let mut writer = csv::Writer::from_writer(out);
    let header = header(baseline_columns, records);
    if !header.is_empty() {
        writer.write_record(&header)?;
        for record in records {
            writer.write_record(header.iter().map(|column| record.get(column).unwrap_or("")))?;
        }
    }
    writer.flush()?;
    Ok(())
}

/// The header starts with the baseline columns of the report kind, so an
/// empty fetch still yields a well-formed file, and is extended by any
/// further column in the order it is first seen across the records.
fn header<'a>(baseline_columns: &[&'static str], records: &'a [Record]) -> Vec<&'a str> {
    let mut columns: Vec<&'a str> = baseline_columns.iter().copied().collect();
    for record in records {
        for column in record.columns() {
            if !columns.contains(&column) {
                columns.push(column);
            }
        }
    }
    columns
}
