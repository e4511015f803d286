use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use csv::{ReaderBuilder, WriterBuilder};

use crate::error::SentimentError;

/// In-memory CSV table with a mandatory header row.
#[derive(Debug, Clone)]
pub struct Table {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Table {
    /// Read a table from disk. Fails with `InputNotFound` before any parsing
    /// when the path does not exist.
    pub fn open(path: &Path) -> Result<Self, SentimentError> {
        if !path.exists() {
            return Err(SentimentError::InputNotFound(path.to_path_buf()));
        }
        Self::from_reader(File::open(path)?)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, SentimentError> {
        let mut rdr = ReaderBuilder::new().has_headers(true).from_reader(reader);

        let headers = rdr.headers()?.iter().map(|h| h.to_string()).collect();

        let mut rows = Vec::new();
        for record in rdr.records() {
            let record = record?;
            rows.push(record.iter().map(|f| f.to_string()).collect());
        }

        Ok(Self { headers, rows })
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Values of the named column, in row order. Fails with `ColumnNotFound`
    /// listing the available headers.
    pub fn column(&self, name: &str) -> Result<Vec<String>, SentimentError> {
        let idx = self
            .headers
            .iter()
            .position(|h| h == name)
            .ok_or_else(|| SentimentError::ColumnNotFound {
                column: name.to_string(),
                available: self.headers.clone(),
            })?;
        Ok(self
            .rows
            .iter()
            .map(|row| row.get(idx).cloned().unwrap_or_default())
            .collect())
    }

    /// Append one trailing column. `values` must hold one entry per row.
    pub fn append_column(&mut self, name: &str, values: Vec<String>) {
        debug_assert_eq!(values.len(), self.rows.len());
        self.headers.push(name.to_string());
        for (row, value) in self.rows.iter_mut().zip(values) {
            row.push(value);
        }
    }

    pub fn to_csv_bytes(&self) -> Result<Vec<u8>, SentimentError> {
        let mut wtr = WriterBuilder::new().from_writer(Vec::new());
        wtr.write_record(&self.headers)?;
        for row in &self.rows {
            wtr.write_record(row)?;
        }
        wtr.into_inner()
            .map_err(|e| SentimentError::Io(std::io::Error::other(e.to_string())))
    }

    pub fn write_to(&self, path: &Path) -> Result<(), SentimentError> {
        std::fs::write(path, self.to_csv_bytes()?)?;
        Ok(())
    }
}

/// `<input-stem>_sentiment.<ext>`, next to the input file.
pub fn default_output_path(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "output".to_string());
    let ext = input
        .extension()
        .map(|e| e.to_string_lossy().into_owned())
        .unwrap_or_else(|| "csv".to_string());
    input.with_file_name(format!("{stem}_sentiment.{ext}"))
}
