//! Flat delimited tables.
//!
//! Every human-measure and model-revision table is a tab-separated file
//! with a header row: the first column is the token-identifier index, the
//! rest are named data columns. [`Frame`] keeps all of that as strings in
//! insertion order; interpretation (subject columns, revision columns)
//! belongs to the merge stage.

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use crate::error::{PipelineError, Result};

/// One named column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    pub name: String,
    pub values: Vec<String>,
}

/// An in-memory delimited table: index plus ordered named columns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub index_name: String,
    pub index: Vec<String>,
    pub columns: Vec<Column>,
}

impl Frame {
    /// Empty frame with an index header but no rows.
    pub fn new(index_name: impl Into<String>) -> Self {
        Self {
            index_name: index_name.into(),
            index: Vec::new(),
            columns: Vec::new(),
        }
    }

    /// Frame with a prefilled index and no data columns yet.
    pub fn with_index(index_name: impl Into<String>, index: Vec<String>) -> Self {
        Self {
            index_name: index_name.into(),
            index,
            columns: Vec::new(),
        }
    }

    pub fn n_rows(&self) -> usize {
        self.index.len()
    }

    /// Append a column; its length must match the index.
    pub fn push_column(&mut self, name: impl Into<String>, values: Vec<String>) -> Result<()> {
        if values.len() != self.index.len() {
            return Err(PipelineError::LengthMismatch {
                what: "column values vs table index",
                expected: self.index.len(),
                got: values.len(),
            });
        }
        self.columns.push(Column {
            name: name.into(),
            values,
        });
        Ok(())
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column(name).is_some()
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.name.as_str())
    }

    /// Read a tab-separated file with a header row. Ragged rows are
    /// malformed-table errors, never padded.
    pub fn read_tsv(path: &Path) -> Result<Frame> {
        let malformed = |reason: String| PipelineError::Table {
            path: path.to_path_buf(),
            reason,
        };

        let reader = BufReader::new(File::open(path)?);
        let mut lines = reader.lines();
        let header = lines
            .next()
            .ok_or_else(|| malformed("empty file".into()))??;
        let mut fields = header.split('\t');
        let index_name = fields
            .next()
            .unwrap_or_default()
            .to_string();
        let names: Vec<String> = fields.map(|f| f.to_string()).collect();

        let mut frame = Frame::new(index_name);
        let mut columns: Vec<Vec<String>> = vec![Vec::new(); names.len()];

        for (row, line) in lines.enumerate() {
            let line = line?;
            if line.is_empty() {
                continue;
            }
            let cells: Vec<&str> = line.split('\t').collect();
            if cells.len() != names.len() + 1 {
                return Err(malformed(format!(
                    "row {} has {} fields, header has {}",
                    row + 2,
                    cells.len(),
                    names.len() + 1
                )));
            }
            frame.index.push(cells[0].to_string());
            for (col, cell) in columns.iter_mut().zip(&cells[1..]) {
                col.push(cell.to_string());
            }
        }

        for (name, values) in names.into_iter().zip(columns) {
            frame.columns.push(Column { name, values });
        }
        log::debug!(
            "read {} rows x {} columns from {}",
            frame.n_rows(),
            frame.columns.len(),
            path.display()
        );
        Ok(frame)
    }

    /// Write the frame as a tab-separated file with a header row.
    pub fn write_tsv(&self, path: &Path) -> Result<()> {
        let mut writer = BufWriter::new(File::create(path)?);

        write!(writer, "{}", self.index_name)?;
        for column in &self.columns {
            write!(writer, "\t{}", column.name)?;
        }
        writeln!(writer)?;

        for (row, id) in self.index.iter().enumerate() {
            write!(writer, "{id}")?;
            for column in &self.columns {
                write!(writer, "\t{}", column.values[row])?;
            }
            writeln!(writer)?;
        }
        writer.flush()?;
        Ok(())
    }
}
