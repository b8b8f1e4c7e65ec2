//! Point mutation and serialization back to SeaBASS text.

use crate::columns::Column;
use crate::constants::{BEGIN_HEADER, COMMENT_MARKER, DEFAULT_UNIT, END_HEADER, directives};
use crate::document::SeabassFile;
use crate::error::{Result, SeabassError};
use crate::models::{Delimiter, ParseWarning, Sentinel, Value};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing::{debug, info, warn};

impl SeabassFile {
    /// Store one value at `row_index` of `field_name`
    ///
    /// Rows past the end are created, every column padded with the missing
    /// sentinel. An unknown field becomes a new column (all missing) and is
    /// appended to `/fields` and `/units`. Without `overwrite` the cell is
    /// written only while it still holds no real data.
    ///
    /// Fails only when `row_index` is too large to address a row.
    pub fn set_value(
        &mut self,
        row_index: usize,
        field_name: &str,
        unit: &str,
        value: impl Into<Value>,
        overwrite: bool,
    ) -> Result<()> {
        let field = field_name.trim().to_lowercase();
        let value = match value.into() {
            Value::Text(text) if text.trim().is_empty() => self.sentinels.missing.as_value(),
            other => other,
        };

        if row_index >= self.row_count {
            let rows = row_index
                .checked_add(1)
                .ok_or_else(|| SeabassError::RowIndexOutOfRange {
                    path: self.path.clone(),
                    row_index,
                })?;
            let fill = self.sentinels.missing.as_value();
            self.columns.extend_to(rows, &fill);
            debug!(
                "Extended {} from {} to {} rows",
                self.path.display(),
                self.row_count,
                rows
            );
            self.row_count = rows;
        }

        if !self.columns.has_field(&field) {
            self.add_field(&field, unit);
        }

        let missing = &self.sentinels.missing;
        if let Some(column) = self.columns.get_mut(&field) {
            let vacant = column
                .values
                .get(row_index)
                .is_some_and(|cell| is_vacant(cell, missing));
            if overwrite || vacant {
                column.set(row_index, value);
            }
        }
        Ok(())
    }

    fn add_field(&mut self, field: &str, unit: &str) {
        let unit = match unit.trim() {
            "" => DEFAULT_UNIT.to_string(),
            unit => unit.to_lowercase(),
        };

        let fill = self.sentinels.missing.as_value();
        self.columns
            .push_column(field.to_string(), unit.clone(), vec![fill; self.row_count]);

        if !self.headers.append_list_item(directives::FIELDS, field) {
            self.headers.insert(directives::FIELDS, field);
        }
        if !self.headers.append_list_item(directives::UNITS, &unit) {
            let warning = ParseWarning::UnitsHeaderAbsent {
                field: field.to_string(),
            };
            if !self.options.suppress_warnings {
                warn!("{}: {}", self.path.display(), warning);
                self.warnings.push(warning);
            }
        }
        debug!("Added field '{}' ({}) to {}", field, unit, self.path.display());
    }

    /// Delimiter used on write, resolved from the `/delimiter` directive
    pub fn output_delimiter(&self) -> Delimiter {
        self.headers
            .get(directives::DELIMITER)
            .and_then(Delimiter::from_directive)
            .unwrap_or(self.delimiter)
    }

    /// Render the whole document as SeaBASS text
    pub fn to_sb_string(&self) -> String {
        let mut out = String::new();
        out.push_str(BEGIN_HEADER);
        out.push('\n');

        for (key, value) in self.headers.iter() {
            out.push('/');
            out.push_str(key);
            out.push('=');
            out.push_str(value);
            out.push('\n');
        }
        for comment in &self.comments {
            out.push(COMMENT_MARKER);
            out.push_str(comment);
            out.push('\n');
        }

        out.push_str(END_HEADER);
        out.push('\n');

        let separator = self.output_delimiter().as_char().to_string();
        let missing = &self.sentinels.missing;
        for row in 0..self.row_count {
            let cells: Vec<String> = self
                .columns
                .iter()
                .map(|column| render_cell(column, row, missing))
                .collect();
            out.push_str(&cells.join(&separator));
            out.push('\n');
        }

        out
    }

    /// Write the document to any byte sink
    pub fn write<W: Write>(&self, writer: &mut W) -> std::io::Result<()> {
        writer.write_all(self.to_sb_string().as_bytes())?;
        writer.flush()
    }

    /// Write the document to a file, replacing it if it exists
    pub fn write_to(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let file = File::create(path).map_err(|e| SeabassError::io(path, e))?;
        let mut writer = BufWriter::new(file);
        self.write(&mut writer)
            .map_err(|e| SeabassError::io(path, e))?;

        info!(
            "Wrote {} rows x {} fields to {}",
            self.row_count,
            self.columns.len(),
            path.display()
        );
        Ok(())
    }
}

/// A cell holds no real data if it is masked or equal to the missing sentinel
fn is_vacant(cell: &Value, missing: &Sentinel) -> bool {
    cell.is_nan() || cell.equals_sentinel(missing) || cell.as_str() == Some(missing.token.as_str())
}

/// Masked and missing numeric cells collapse to the missing token; other
/// cells keep the text they were read with
fn render_cell(column: &Column, row: usize, missing: &Sentinel) -> String {
    match column.values.get(row) {
        None => missing.token.clone(),
        Some(value) if value.is_nan() || value.equals_sentinel(missing) => missing.token.clone(),
        Some(value) => column
            .token(row)
            .map_or_else(|| value.to_string(), str::to_string),
    }
}
