//! The parsed SeaBASS document and the parse pipeline that builds it.
//!
//! Parsing is a single linear scan over the whole file: every line is
//! normalized and fed to the header builder until `/end_header`, the
//! resolved descriptor then gates row decoding for the rest of the file.

use crate::columns::{ColumnSet, FieldSource, HeaderMap};
use crate::config::ReadOptions;
use crate::constants::directives;
use crate::datetime::{self, Timestamp};
use crate::error::{Result, SeabassError};
use crate::header::{HeaderBuilder, MatrixDescriptor, normalize_line};
use crate::models::{Delimiter, ParseWarning, Sentinels, Value};
use crate::record::RowDecoder;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// One SeaBASS file held in memory
///
/// Created by [`SeabassFile::open`] or [`SeabassFile::parse_str`]; after
/// that it is only changed through [`SeabassFile::set_value`], which may
/// add rows and columns but never removes them.
#[derive(Debug, Clone)]
pub struct SeabassFile {
    pub(crate) path: PathBuf,
    pub(crate) headers: HeaderMap,
    pub(crate) comments: Vec<String>,
    pub(crate) columns: ColumnSet,
    pub(crate) delimiter: Delimiter,
    pub(crate) sentinels: Sentinels,
    pub(crate) row_count: usize,
    pub(crate) investigator: Option<String>,
    pub(crate) data_use_warning: bool,
    pub(crate) warnings: Vec<ParseWarning>,
    pub(crate) options: ReadOptions,
}

impl SeabassFile {
    /// Read and parse a file from disk
    pub fn open(path: impl AsRef<Path>, options: &ReadOptions) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| SeabassError::io(path, e))?;
        Self::parse_str(&content, path, options)
    }

    /// Parse file contents already in memory; `path` is used for error
    /// messages only
    pub fn parse_str(content: &str, path: impl AsRef<Path>, options: &ReadOptions) -> Result<Self> {
        let path = path.as_ref();
        debug!("Parsing SeaBASS content from {}", path.display());

        let mut lines = content.lines().enumerate();
        let mut builder = HeaderBuilder::new(path, options);
        let mut terminated = false;
        for (index, raw) in lines.by_ref() {
            let line = normalize_line(raw);
            if builder.parse_line(index + 1, &line)? {
                terminated = true;
                break;
            }
        }
        if !terminated {
            return Err(SeabassError::MissingHeaderTerminator {
                path: path.to_path_buf(),
            });
        }

        let MatrixDescriptor {
            headers,
            comments,
            mut columns,
            delimiter,
            sentinels,
            investigator,
            data_use_warning,
            warnings,
        } = builder.build()?;

        let decoder = RowDecoder::new(path, delimiter, columns.len(), &sentinels, options);
        let mut row_count = 0;
        for (index, raw) in lines {
            let line = normalize_line(raw);
            if line.is_empty() {
                continue;
            }
            columns.push_row(decoder.decode(index + 1, &line)?);
            row_count += 1;
        }

        info!(
            "Parsed {}: {} fields, {} rows, {} comments",
            path.display(),
            columns.len(),
            row_count,
            comments.len()
        );

        Ok(Self {
            path: path.to_path_buf(),
            headers,
            comments,
            columns,
            delimiter,
            sentinels,
            row_count,
            investigator,
            data_use_warning,
            warnings,
            options: *options,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Header directives in file order, keys case-folded without the `/`
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Comment lines without their leading `!`
    pub fn comments(&self) -> &[String] {
        &self.comments
    }

    pub fn columns(&self) -> &ColumnSet {
        &self.columns
    }

    /// Values of one field, `None` if the field is not present
    pub fn column(&self, field: &str) -> Option<&[Value]> {
        self.columns.column(field)
    }

    /// Field names in `/fields` order
    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.columns.field_names()
    }

    /// (field, unit) pairs in `/fields` order
    pub fn variables(&self) -> impl Iterator<Item = (&str, &str)> {
        self.columns
            .iter()
            .map(|column| (column.name.as_str(), column.unit.as_str()))
    }

    pub fn unit(&self, field: &str) -> Option<&str> {
        self.columns.unit(field)
    }

    /// Principal investigator, the first name in `/investigators`
    pub fn investigator(&self) -> Option<&str> {
        self.investigator.as_deref()
    }

    pub fn has_data_use_warning(&self) -> bool {
        self.data_use_warning
    }

    pub fn warnings(&self) -> &[ParseWarning] {
        &self.warnings
    }

    pub fn sentinels(&self) -> &Sentinels {
        &self.sentinels
    }

    pub fn delimiter(&self) -> Delimiter {
        self.delimiter
    }

    pub fn row_count(&self) -> usize {
        self.row_count
    }

    pub fn options(&self) -> &ReadOptions {
        &self.options
    }

    /// First and last year covered, from `/start_date` and `/end_date`
    pub fn year_span(&self) -> Option<(i32, i32)> {
        let start = leading_year(self.headers.get(directives::START_DATE)?)?;
        let end = leading_year(self.headers.get(directives::END_DATE)?)?;
        Some((start, end))
    }

    /// Whether the file's year span intersects `start..=end`
    ///
    /// Files without a readable span never overlap.
    pub fn overlaps_years(&self, start: i32, end: i32) -> bool {
        self.year_span()
            .is_some_and(|(first, last)| first <= end && last >= start)
    }

    /// One timestamp per row, derived from the temporal fields present
    pub fn reconstruct_timestamps(&self) -> Result<Vec<Timestamp>> {
        datetime::reconstruct_timestamps(self)
    }
}

impl FieldSource for SeabassFile {
    fn has_field(&self, name: &str) -> bool {
        self.columns.has_field(name)
    }

    fn column(&self, name: &str) -> Option<&[Value]> {
        self.columns.column(name)
    }

    fn header(&self, key: &str) -> Option<&str> {
        self.headers.get(key)
    }

    fn row_count(&self) -> usize {
        self.row_count
    }

    fn source_path(&self) -> &Path {
        &self.path
    }

    fn token(&self, name: &str, row: usize) -> Option<&str> {
        self.columns.token(name, row)
    }

    fn suppresses_warnings(&self) -> bool {
        self.options.suppress_warnings
    }
}

fn leading_year(date: &str) -> Option<i32> {
    date.trim().get(..4)?.parse().ok()
}
