//! Ordered header and column containers.
//!
//! Field sets differ from file to file, so both the header directives and
//! the data columns live in insertion-ordered containers keyed by name.
//! Order is fixed at creation; entries may be appended but never removed
//! or reordered.

use crate::constants::{DEFAULT_UNIT, UNCERTAINTY_SUFFIXES};
use crate::models::Value;
use crate::record::DecodedRow;
use std::collections::HashMap;
use std::path::Path;

/// Header directives in the order they appeared, keyed case-folded
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HeaderMap {
    entries: Vec<(String, String)>,
    name_to_index: HashMap<String, usize>,
}

impl HeaderMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a directive; a replaced key keeps its position
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.name_to_index.get(&key) {
            Some(&index) => self.entries[index].1 = value,
            None => {
                self.name_to_index.insert(key.clone(), self.entries.len());
                self.entries.push((key, value));
            }
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.name_to_index
            .get(key)
            .map(|&index| self.entries[index].1.as_str())
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.name_to_index.contains_key(key)
    }

    /// Extend a comma-separated directive value; `false` if the key is absent
    pub fn append_list_item(&mut self, key: &str, item: &str) -> bool {
        match self.name_to_index.get(key) {
            Some(&index) => {
                let value = &mut self.entries[index].1;
                value.push(',');
                value.push_str(item);
                true
            }
            None => false,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|(key, value)| (key.as_str(), value.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// One field of the data matrix
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub unit: String,
    pub values: Vec<Value>,
    /// Source text of numeric cells whose formatted value would differ
    /// from the file, e.g. `22.7500`; parallel to `values`
    tokens: Vec<Option<String>>,
}

impl Column {
    fn new(name: String, unit: String, values: Vec<Value>) -> Self {
        let tokens = vec![None; values.len()];
        Self {
            name,
            unit,
            values,
            tokens,
        }
    }

    /// Text of a cell as it appeared in the file, if it was kept
    pub fn token(&self, row: usize) -> Option<&str> {
        self.tokens.get(row).and_then(|token| token.as_deref())
    }

    /// Replace one cell; any kept source text is dropped
    pub(crate) fn set(&mut self, row: usize, value: Value) {
        if let Some(cell) = self.values.get_mut(row) {
            *cell = value;
        }
        if let Some(token) = self.tokens.get_mut(row) {
            *token = None;
        }
    }
}

/// Data columns in `/fields` order
///
/// Every column holds exactly the same number of values. A field name
/// declared twice keeps both positional columns; lookups by name resolve
/// to the first.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ColumnSet {
    columns: Vec<Column>,
    name_to_index: HashMap<String, usize>,
}

impl ColumnSet {
    /// Create empty columns, one per field name, all with unit "none"
    pub fn from_fields<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut set = Self::default();
        for name in fields {
            set.push_column(name.into(), DEFAULT_UNIT.to_string(), Vec::new());
        }
        set
    }

    /// Append a column at the end of the field order
    pub fn push_column(&mut self, name: String, unit: String, values: Vec<Value>) {
        self.name_to_index
            .entry(name.clone())
            .or_insert(self.columns.len());
        self.columns.push(Column::new(name, unit, values));
    }

    /// Attach units positionally; on absence or length mismatch every
    /// field falls back to "none" and `false` is returned
    pub fn attach_units(&mut self, units: Option<&[String]>) -> bool {
        match units {
            Some(units) if units.len() == self.columns.len() => {
                for (column, unit) in self.columns.iter_mut().zip(units) {
                    column.unit = unit.clone();
                }
                true
            }
            _ => {
                for column in &mut self.columns {
                    column.unit = DEFAULT_UNIT.to_string();
                }
                false
            }
        }
    }

    /// Append one decoded row; `row` must be in field order
    pub(crate) fn push_row(&mut self, row: DecodedRow) {
        debug_assert_eq!(row.values.len(), self.columns.len());
        for ((column, value), token) in self.columns.iter_mut().zip(row.values).zip(row.tokens) {
            column.values.push(value);
            column.tokens.push(token);
        }
    }

    /// Pad every column with `fill` until it holds `rows` values
    pub(crate) fn extend_to(&mut self, rows: usize, fill: &Value) {
        for column in &mut self.columns {
            if column.values.len() < rows {
                column.values.resize(rows, fill.clone());
                column.tokens.resize(rows, None);
            }
        }
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn has_field(&self, name: &str) -> bool {
        self.name_to_index.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Option<&Column> {
        self.name_to_index
            .get(name)
            .map(|&index| &self.columns[index])
    }

    pub(crate) fn get_mut(&mut self, name: &str) -> Option<&mut Column> {
        match self.name_to_index.get(name) {
            Some(&index) => Some(&mut self.columns[index]),
            None => None,
        }
    }

    pub fn column(&self, name: &str) -> Option<&[Value]> {
        self.get(name).map(|column| column.values.as_slice())
    }

    pub fn unit(&self, name: &str) -> Option<&str> {
        self.get(name).map(|column| column.unit.as_str())
    }

    /// Source text of one cell, if it differs from the formatted value
    pub fn token(&self, name: &str, row: usize) -> Option<&str> {
        self.get(name).and_then(|column| column.token(row))
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Column> {
        self.columns.iter()
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|column| column.name.as_str())
    }

    /// Fields reporting the spread or count of another field (`_sd`, `_cv`, ...)
    pub fn uncertainty_fields(&self) -> impl Iterator<Item = &str> {
        self.field_names()
            .filter(|name| base_field(name).is_some())
    }

    /// Fields that are not uncertainty companions of another field
    pub fn measurement_fields(&self) -> impl Iterator<Item = &str> {
        self.field_names()
            .filter(|name| base_field(name).is_none())
    }
}

/// The measurement an uncertainty field describes, e.g. `chl_sd` -> `chl`
pub fn base_field(name: &str) -> Option<&str> {
    UNCERTAINTY_SUFFIXES
        .iter()
        .find_map(|suffix| name.strip_suffix(suffix))
        .filter(|base| !base.is_empty())
}

/// Read-only view of columns and header directives used by timestamp
/// reconstruction
pub trait FieldSource {
    fn has_field(&self, name: &str) -> bool;

    fn column(&self, name: &str) -> Option<&[Value]>;

    fn header(&self, key: &str) -> Option<&str>;

    fn row_count(&self) -> usize;

    /// Path named in error messages
    fn source_path(&self) -> &Path;

    fn has_header(&self, key: &str) -> bool {
        self.header(key).is_some()
    }

    /// Cell text as written in the file, when it differs from the value's
    /// formatted form
    fn token(&self, _name: &str, _row: usize) -> Option<&str> {
        None
    }

    /// Whether non-fatal conditions should stay silent
    fn suppresses_warnings(&self) -> bool {
        false
    }
}
