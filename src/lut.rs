//! Torque-curve lookup tables and their delimited text format.
//!
//! A LUT file holds one `input<delim>output` pair per line with no header.
//! The canonical delimiter is `|`, as used by the simulator's `.lut` files.
//! A whitespace-delimited variant exists for tables exported by numeric
//! tools; the two are never auto-detected.

use std::fs::File;
use std::io;
use std::path::Path;

use csv::{QuoteStyle, ReaderBuilder, StringRecord, Terminator, WriterBuilder};
use log::debug;
use serde::{Deserialize, Serialize};

use crate::error::LutError;

/// Field separator of a LUT file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Delimiter {
    #[default]
    Pipe,
    Whitespace,
}

impl Delimiter {
    pub const ALL: [Delimiter; 2] = [Delimiter::Pipe, Delimiter::Whitespace];

    pub fn label(self) -> &'static str {
        match self {
            Delimiter::Pipe => "Pipe ( | )",
            Delimiter::Whitespace => "Whitespace",
        }
    }

    fn as_byte(self) -> u8 {
        match self {
            Delimiter::Pipe => b'|',
            Delimiter::Whitespace => b' ',
        }
    }

    /// Split a raw record into its non-blank fields
    fn fields(self, record: &StringRecord) -> Vec<&str> {
        match self {
            Delimiter::Pipe => {
                let fields: Vec<&str> = record.iter().map(str::trim).collect();
                if fields.iter().all(|f| f.is_empty()) {
                    Vec::new()
                } else {
                    fields
                }
            }
            // Runs of spaces produce empty csv fields and tabs are not split by
            // the reader at all, so re-split on any whitespace.
            Delimiter::Whitespace => record.iter().flat_map(str::split_whitespace).collect(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LutPoint {
    pub x: f64,
    pub y: f64,
}

impl LutPoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Ordered (input, output) pairs. Duplicate or unsorted inputs are allowed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LutTable {
    points: Vec<LutPoint>,
}

impl LutTable {
    pub fn new(points: Vec<LutPoint>) -> Self {
        Self { points }
    }

    pub fn from_pairs(pairs: &[(f64, f64)]) -> Self {
        Self::new(pairs.iter().map(|&(x, y)| LutPoint::new(x, y)).collect())
    }

    pub fn points(&self) -> &[LutPoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<LutPoint> {
        self.points.get(index).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = &LutPoint> {
        self.points.iter()
    }

    /// Overwrite the output value at `index`. Returns false if out of range.
    pub fn set_y(&mut self, index: usize, y: f64) -> bool {
        match self.points.get_mut(index) {
            Some(point) => {
                point.y = y;
                true
            }
            None => false,
        }
    }

    /// Replace both coordinates at `index`. Returns false if out of range.
    pub fn set_point(&mut self, index: usize, point: LutPoint) -> bool {
        match self.points.get_mut(index) {
            Some(slot) => {
                *slot = point;
                true
            }
            None => false,
        }
    }

    pub fn push(&mut self, point: LutPoint) {
        self.points.push(point);
    }

    pub fn remove(&mut self, index: usize) -> Option<LutPoint> {
        (index < self.points.len()).then(|| self.points.remove(index))
    }

    /// `[x, y]` pairs in sequence order, the shape plot widgets take
    pub fn as_plot_points(&self) -> Vec<[f64; 2]> {
        self.points.iter().map(|p| [p.x, p.y]).collect()
    }
}

/// Parse a LUT table from any reader
pub fn parse_lut<R: io::Read>(mut reader: R, delimiter: Delimiter) -> Result<LutTable, LutError> {
    let mut text = Vec::new();
    reader.read_to_end(&mut text).map_err(csv::Error::from)?;

    let mut rdr = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .quoting(false)
        .delimiter(delimiter.as_byte())
        .from_reader(text.as_slice());

    let mut points = Vec::new();
    for result in rdr.records() {
        let record = result?;
        let line = record.position().map_or(0, |p| record_line(&text, p.byte()));
        let fields = delimiter.fields(&record);
        if fields.is_empty() {
            continue;
        }
        if fields.len() != 2 {
            return Err(LutError::Parse {
                line,
                message: format!("expected 2 fields, found {}", fields.len()),
            });
        }
        let x = parse_number(fields[0], line)?;
        let y = parse_number(fields[1], line)?;
        points.push(LutPoint::new(x, y));
    }

    Ok(LutTable::new(points))
}

/// 1-based line of the record starting at `byte`.
///
/// The reader skips empty lines without reporting them, and a record's
/// position points at the start of any empty lines before it.
fn record_line(text: &[u8], byte: u64) -> u64 {
    let start = usize::try_from(byte).map_or(text.len(), |b| b.min(text.len()));
    let mut line = text[..start].iter().filter(|&&b| b == b'\n').count() as u64 + 1;
    for &b in &text[start..] {
        match b {
            b'\n' => line += 1,
            b'\r' => {}
            _ => break,
        }
    }
    line
}

fn parse_number(field: &str, line: u64) -> Result<f64, LutError> {
    field.parse::<f64>().map_err(|_| LutError::Parse {
        line,
        message: format!("'{field}' is not a number"),
    })
}

/// Read a LUT file from disk. A file without any rows is an error.
pub fn read_lut(path: &Path, delimiter: Delimiter) -> Result<LutTable, LutError> {
    let file = File::open(path).map_err(|source| LutError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let table = parse_lut(file, delimiter)?;
    if table.is_empty() {
        return Err(LutError::Empty(path.to_path_buf()));
    }
    debug!("Read {} points from {}", table.len(), path.display());
    Ok(table)
}

/// Serialize a table to any writer, one row per line, no header
pub fn write_lut_to<W: io::Write>(
    table: &LutTable,
    writer: W,
    delimiter: Delimiter,
) -> Result<(), LutError> {
    let mut wtr = WriterBuilder::new()
        .has_headers(false)
        .delimiter(delimiter.as_byte())
        .terminator(Terminator::Any(b'\n'))
        .quote_style(QuoteStyle::Never)
        .from_writer(writer);

    for point in table.iter() {
        wtr.write_record([format_input(point.x), format_output(point.y)])?;
    }
    wtr.flush().map_err(csv::Error::from)?;
    Ok(())
}

/// Write a table to disk, truncating any existing file
pub fn write_lut(table: &LutTable, path: &Path, delimiter: Delimiter) -> Result<(), LutError> {
    let file = File::create(path).map_err(|source| LutError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    write_lut_to(table, file, delimiter)?;
    debug!("Wrote {} points to {}", table.len(), path.display());
    Ok(())
}

/// Inputs are usually whole RPM values and are written without a fraction
fn format_input(value: f64) -> String {
    format!("{value}")
}

/// Outputs always carry a decimal point (`50.0`)
fn format_output(value: f64) -> String {
    format!("{value:?}")
}
