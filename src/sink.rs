//! Table export.
//!
//! Engines hand a [`Table`] of display strings to a [`TabularSink`]; where the
//! table ends up (timestamped CSV, JSON, a terminal, memory) is the sink's
//! business.

use colored::Colorize;
use hourglass_rs::SafeTimeProvider;
use serde_json::{Map, Value};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tabled::builder::Builder;
use tabled::settings::object::Columns;
use tabled::settings::{Alignment, Modify, Style};

use crate::errors::Result;

pub const DEFAULT_OUTPUT_DIR: &str = "output_files";

/// timestamp suffix for exported file names, e.g. `2024_1115_093000`
const FILE_TIMESTAMP_FORMAT: &str = "%Y_%m%d_%H%M%S";

const HIGHLIGHT_COLUMNS: [&str; 3] = [
    "Principal repaid",
    "Principal repaid standard",
    "Principal repaid overpayment",
];

/// headers plus formatted rows, ready for export
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self { headers, rows }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    /// cells of one column, top to bottom
    pub fn column(&self, name: &str) -> Option<Vec<&str>> {
        let idx = self.column_index(name)?;
        Some(
            self.rows
                .iter()
                .map(|row| row.get(idx).map(String::as_str).unwrap_or(""))
                .collect(),
        )
    }
}

/// anything that can be rendered as a table
pub trait Tabular {
    fn to_table(&self) -> Table;
}

/// destination for exported tables
pub trait TabularSink {
    /// write `table` on behalf of `producer`, returning the file written if any
    fn write_table(&mut self, producer: &str, table: &Table) -> Result<Option<PathBuf>>;
}

fn timestamped_path(dir: &Path, producer: &str, extension: &str, time: &SafeTimeProvider) -> PathBuf {
    let stamp = time.now().format(FILE_TIMESTAMP_FORMAT);
    dir.join(format!("{}_{}.{}", producer, stamp, extension))
}

/// writes `<dir>/<producer>_<timestamp>.csv`
pub struct CsvSink<'a> {
    dir: PathBuf,
    time: &'a SafeTimeProvider,
}

impl<'a> CsvSink<'a> {
    pub fn new(dir: impl Into<PathBuf>, time: &'a SafeTimeProvider) -> Self {
        Self {
            dir: dir.into(),
            time,
        }
    }

    /// sink rooted at `output_files` in the working directory
    pub fn in_default_dir(time: &'a SafeTimeProvider) -> Self {
        Self::new(DEFAULT_OUTPUT_DIR, time)
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl TabularSink for CsvSink<'_> {
    fn write_table(&mut self, producer: &str, table: &Table) -> Result<Option<PathBuf>> {
        fs::create_dir_all(&self.dir)?;
        let path = timestamped_path(&self.dir, producer, "csv", self.time);

        let mut wtr = csv::Writer::from_path(&path)?;
        wtr.write_record(&table.headers)?;
        for row in &table.rows {
            wtr.write_record(row)?;
        }
        wtr.flush()?;

        tracing::info!(producer, rows = table.len(), path = %path.display(), "table exported");
        Ok(Some(path))
    }
}

/// writes `<dir>/<producer>_<timestamp>.json` as an array of header-keyed objects
pub struct JsonSink<'a> {
    dir: PathBuf,
    time: &'a SafeTimeProvider,
}

impl<'a> JsonSink<'a> {
    pub fn new(dir: impl Into<PathBuf>, time: &'a SafeTimeProvider) -> Self {
        Self {
            dir: dir.into(),
            time,
        }
    }
}

pub(crate) fn table_to_json(table: &Table) -> Value {
    let records = table
        .rows
        .iter()
        .map(|row| {
            let record: Map<String, Value> = table
                .headers
                .iter()
                .zip(row.iter())
                .map(|(h, cell)| (h.clone(), Value::String(cell.clone())))
                .collect();
            Value::Object(record)
        })
        .collect();
    Value::Array(records)
}

impl TabularSink for JsonSink<'_> {
    fn write_table(&mut self, producer: &str, table: &Table) -> Result<Option<PathBuf>> {
        fs::create_dir_all(&self.dir)?;
        let path = timestamped_path(&self.dir, producer, "json", self.time);

        let json = serde_json::to_string_pretty(&table_to_json(table))?;
        fs::write(&path, json)?;

        tracing::info!(producer, rows = table.len(), path = %path.display(), "table exported");
        Ok(Some(path))
    }
}

/// rounded text table with the principal columns highlighted
pub struct ConsoleSink<W: Write> {
    out: W,
    highlight: bool,
}

impl ConsoleSink<std::io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }
}

impl<W: Write> ConsoleSink<W> {
    pub fn new(out: W) -> Self {
        Self { out, highlight: true }
    }

    /// disable colouring, e.g. when output is not a terminal
    pub fn plain(mut self) -> Self {
        self.highlight = false;
        self
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn render(&self, table: &Table) -> String {
        let highlighted = highlighted_columns(&table.headers);
        let paint = |idx: usize, cell: &str| -> String {
            if self.highlight && highlighted.contains(&idx) {
                cell.green().bold().to_string()
            } else {
                cell.to_string()
            }
        };

        let mut builder = Builder::default();
        builder.push_record(table.headers.iter().enumerate().map(|(i, h)| paint(i, h)));
        for row in &table.rows {
            builder.push_record(row.iter().enumerate().map(|(i, cell)| paint(i, cell)));
        }

        builder
            .build()
            .with(Style::rounded())
            .with(Modify::new(Columns::new(1..)).with(Alignment::right()))
            .to_string()
    }
}

/// indices of the `Principal repaid` columns, including comparison suffixes
fn highlighted_columns(headers: &[String]) -> Vec<usize> {
    headers
        .iter()
        .enumerate()
        .filter(|(_, h)| HIGHLIGHT_COLUMNS.contains(&h.as_str()))
        .map(|(i, _)| i)
        .collect()
}

impl<W: Write> TabularSink for ConsoleSink<W> {
    fn write_table(&mut self, producer: &str, table: &Table) -> Result<Option<PathBuf>> {
        let rendered = self.render(table);
        if self.highlight {
            writeln!(self.out, "{}", producer.bold().underline())?;
        } else {
            writeln!(self.out, "{}", producer)?;
        }
        writeln!(self.out, "{}", rendered)?;
        self.out.flush()?;
        Ok(None)
    }
}

/// keeps every table it is given; used by tests and embedding callers
#[derive(Debug, Default)]
pub struct MemorySink {
    tables: Vec<(String, Table)>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tables(&self) -> &[(String, Table)] {
        &self.tables
    }

    pub fn last(&self) -> Option<&Table> {
        self.tables.last().map(|(_, t)| t)
    }
}

impl TabularSink for MemorySink {
    fn write_table(&mut self, producer: &str, table: &Table) -> Result<Option<PathBuf>> {
        self.tables.push((producer.to_string(), table.clone()));
        Ok(None)
    }
}
