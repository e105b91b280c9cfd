//! In-memory CSV table and the preview shown before mapping columns.

use std::io::Read;

use serde::Serialize;

use crate::{Result, error::RowError, mapping::ColumnMapping};

pub const DEFAULT_SAMPLE_ROWS: usize = 5;

/// A parsed CSV file: one header row plus data rows.
///
/// Rows may be shorter or longer than the header; missing cells read as
/// empty. A data row that could not be decoded keeps its position in `rows`
/// as an empty row and is listed in `unreadable`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CsvTable {
  pub headers:    Vec<String>,
  pub rows:       Vec<Vec<String>>,
  pub unreadable: Vec<RowError>,
}

impl CsvTable {
  /// Read a header row and every data row from `reader`. Fields are trimmed.
  ///
  /// Only an unreadable header row or an I/O failure is an error; a bad data
  /// row is recorded in `unreadable` and reading continues.
  pub fn parse<R: Read>(reader: R) -> Result<Self> {
    let mut reader = csv::ReaderBuilder::new()
      .has_headers(true)
      .flexible(true)
      .trim(csv::Trim::All)
      .from_reader(reader);

    let headers = reader.headers()?.iter().map(str::to_owned).collect();

    let mut table = Self { headers, ..Default::default() };
    for record in reader.byte_records() {
      let row = table.rows.len() + 1;
      let decoded = match record {
        Ok(record) => decode(&record),
        Err(e) if e.is_io_error() => return Err(e.into()),
        Err(e) => Err(format!("unreadable CSV record: {e}")),
      };
      match decoded {
        Ok(cells) => table.rows.push(cells),
        Err(reason) => {
          table.unreadable.push(RowError::new(row, reason));
          table.rows.push(Vec::new());
        }
      }
    }

    Ok(table)
  }

  /// The decode failure for data row `row` (1-based), if it had one.
  pub fn unreadable_row(&self, row: usize) -> Option<&RowError> {
    self.unreadable.iter().find(|e| e.row == row)
  }

  pub fn column_index(&self, header: &str) -> Option<usize> {
    self.headers.iter().position(|h| h == header)
  }

  pub fn len(&self) -> usize { self.rows.len() }

  pub fn is_empty(&self) -> bool { self.rows.is_empty() }
}

fn decode(record: &csv::ByteRecord) -> std::result::Result<Vec<String>, String> {
  record
    .iter()
    .enumerate()
    .map(|(i, field)| {
      std::str::from_utf8(field)
        .map(str::to_owned)
        .map_err(|_| format!("column {} is not valid UTF-8", i + 1))
    })
    .collect()
}

/// Cell `index` of `row`, or `""` when the row is short.
pub(crate) fn cell(row: &[String], index: usize) -> &str {
  row.get(index).map(String::as_str).unwrap_or("")
}

/// What the caller sees before committing to a mapping.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CsvPreview {
  pub headers:           Vec<String>,
  pub sample_rows:       Vec<Vec<String>>,
  pub total_rows:        usize,
  pub suggested_mapping: ColumnMapping,
}

/// Headers, the first `sample` rows, the row count and an automatic mapping.
pub fn preview(table: &CsvTable, sample: usize) -> CsvPreview {
  CsvPreview {
    headers:           table.headers.clone(),
    sample_rows:       table.rows.iter().take(sample).cloned().collect(),
    total_rows:        table.rows.len(),
    suggested_mapping: ColumnMapping::auto(&table.headers),
  }
}
