use anyhow::{Context, Result};
use std::io::{ErrorKind as IoErrorKind, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

pub mod csv;
pub mod workbook;

use crate::config::DatasetConfig;
use crate::extract::{TranscriptOutcome, ERROR_PREFIX};
use crate::HarvesterError;

/// What an existing transcript cell says about its row
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellState {
    /// Never processed
    Empty,
    /// Holds an `Error:` cell from an earlier run
    Failed,
    /// Holds a transcript
    Done,
}

impl CellState {
    pub fn parse(cell: &str) -> Self {
        let cell = cell.trim();
        if cell.is_empty() {
            CellState::Empty
        } else if cell.starts_with(ERROR_PREFIX) {
            CellState::Failed
        } else {
            CellState::Done
        }
    }
}

/// How the dataset is stored on disk
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Format {
    /// Delimited text with this separator
    Delimited(char),
    /// First worksheet of an `.xlsx` workbook
    Workbook { sheet: String },
}

impl Format {
    fn for_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("xlsx") => Format::Workbook {
                sheet: "Sheet1".to_string(),
            },
            Some(ext) if ext.eq_ignore_ascii_case("tsv") => Format::Delimited('\t'),
            _ => Format::Delimited(','),
        }
    }
}

/// Tabular input of page URLs with one transcript cell per row
#[derive(Debug, Clone)]
pub struct Dataset {
    path: PathBuf,
    format: Format,
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
    url_idx: usize,
    transcript_idx: usize,
}

impl Dataset {
    /// Read an `.xlsx` workbook, or CSV (`.tsv` for tab separated) otherwise.
    /// The transcript column is added when missing.
    pub fn open(path: &Path, columns: &DatasetConfig) -> Result<Self, HarvesterError> {
        let bytes = fs_err::read(path).map_err(|e| match e.kind() {
            IoErrorKind::NotFound => HarvesterError::DatasetNotFound(path.display().to_string()),
            _ => HarvesterError::DatasetUnreadable(e.to_string()),
        })?;

        match Format::for_path(path) {
            Format::Workbook { .. } => {
                let (sheet, rows) = workbook::read_rows(&bytes).map_err(|e| {
                    HarvesterError::DatasetUnreadable(format!("{}: {:#}", path.display(), e))
                })?;
                Self::from_rows(path, Format::Workbook { sheet }, rows, columns)
            }
            Format::Delimited(_) => {
                let text = String::from_utf8(bytes).map_err(|e| {
                    HarvesterError::DatasetUnreadable(format!("{}: {}", path.display(), e))
                })?;
                Self::parse(path, &text, columns)
            }
        }
    }

    /// Build a delimited dataset from already loaded text; `path` is where `save` writes
    pub fn parse(path: &Path, text: &str, columns: &DatasetConfig) -> Result<Self, HarvesterError> {
        let sep = match Format::for_path(path) {
            Format::Delimited(sep) => sep,
            Format::Workbook { .. } => ',',
        };

        // Spreadsheet exports often start with a byte order mark
        let text = text.strip_prefix('\u{feff}').unwrap_or(text);
        Self::from_rows(path, Format::Delimited(sep), csv::parse_rows(text, sep), columns)
    }

    fn from_rows(
        path: &Path,
        format: Format,
        mut rows: Vec<Vec<String>>,
        columns: &DatasetConfig,
    ) -> Result<Self, HarvesterError> {
        if rows.is_empty() {
            return Err(HarvesterError::DatasetUnreadable(format!(
                "{} has no header row",
                path.display()
            )));
        }
        let mut headers: Vec<String> = rows.remove(0).into_iter().map(|h| h.trim().to_string()).collect();

        // Cells beyond the header get unnamed columns, so an appended
        // transcript column never lands on existing data
        let width = rows.iter().map(Vec::len).max().unwrap_or(0);
        if headers.len() < width {
            headers.resize(width, String::new());
        }

        let url_idx = headers
            .iter()
            .position(|h| *h == columns.url_column)
            .ok_or_else(|| HarvesterError::MissingColumn(columns.url_column.clone()))?;

        let transcript_idx = match headers.iter().position(|h| *h == columns.transcript_column) {
            Some(idx) => idx,
            None => {
                headers.push(columns.transcript_column.clone());
                headers.len() - 1
            }
        };

        for row in &mut rows {
            if row.len() < headers.len() {
                row.resize(headers.len(), String::new());
            }
        }

        Ok(Self {
            path: path.to_path_buf(),
            format,
            headers,
            rows,
            url_idx,
            transcript_idx,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
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

    /// URL of a row, trimmed
    pub fn url(&self, row: usize) -> &str {
        self.rows[row][self.url_idx].trim()
    }

    /// Current transcript cell of a row
    pub fn cell(&self, row: usize) -> &str {
        &self.rows[row][self.transcript_idx]
    }

    pub fn cell_state(&self, row: usize) -> CellState {
        CellState::parse(self.cell(row))
    }

    /// Store the outcome of a row as its transcript cell
    pub fn record(&mut self, row: usize, outcome: &TranscriptOutcome) {
        self.rows[row][self.transcript_idx] = outcome.to_cell();
    }

    pub fn format(&self) -> &Format {
        &self.format
    }

    /// Render the whole dataset as delimited text, header first
    pub fn to_text(&self) -> String {
        let sep = match self.format {
            Format::Delimited(sep) => sep,
            Format::Workbook { .. } => ',',
        };

        let mut out = String::new();
        csv::write_row(&mut out, &self.headers, sep);
        for row in &self.rows {
            csv::write_row(&mut out, row, sep);
        }
        out
    }

    fn encode(&self) -> Result<Vec<u8>> {
        match &self.format {
            Format::Delimited(_) => Ok(self.to_text().into_bytes()),
            Format::Workbook { sheet } => {
                let rows = std::iter::once(self.headers.as_slice()).chain(self.rows.iter().map(Vec::as_slice));
                workbook::write_rows(sheet, rows)
            }
        }
    }

    /// Write the dataset back to its file. The file is replaced atomically so an
    /// interrupted run never leaves a half-written dataset behind.
    pub fn save(&self) -> Result<()> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };

        let bytes = self
            .encode()
            .with_context(|| format!("Failed to encode {}", self.path.display()))?;

        let mut tmp = NamedTempFile::new_in(&dir)
            .with_context(|| format!("Failed to create temporary file in {}", dir.display()))?;
        tmp.write_all(&bytes).context("Failed to write dataset")?;
        tmp.persist(&self.path)
            .with_context(|| format!("Failed to replace {}", self.path.display()))?;

        Ok(())
    }
}
