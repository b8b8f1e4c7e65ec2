//! Data row decoding and sentinel masking
//!
//! Each post-header line is split on the resolved delimiter, zipped against
//! the field order, coerced token by token and masked against whichever
//! sentinels the caller asked for.

use crate::config::ReadOptions;
use crate::error::{Result, SeabassError};
use crate::models::{Delimiter, Sentinels, Value};
use regex::Regex;
use std::path::Path;
use std::sync::LazyLock;

static COMMA_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(Delimiter::Comma.pattern()).expect("valid delimiter pattern"));
static WHITESPACE_RUN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(Delimiter::Whitespace.pattern()).expect("valid delimiter pattern")
});
static TAB_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(Delimiter::Tab.pattern()).expect("valid delimiter pattern"));

/// Split a data line into raw tokens
pub fn split_row(delimiter: Delimiter, line: &str) -> Vec<&str> {
    let splitter = match delimiter {
        Delimiter::Comma => &*COMMA_RUN,
        Delimiter::Whitespace => &*WHITESPACE_RUN,
        Delimiter::Tab => &*TAB_RUN,
    };
    splitter.split(line).collect()
}

/// Replace a value with NaN if it matches an enabled sentinel
///
/// Detection-limit checks run first; the missing-value check is
/// independent of them.
pub fn mask_value(value: Value, sentinels: &Sentinels, options: &ReadOptions) -> Value {
    if !value.is_numeric() {
        return value;
    }
    let above = options.mask_above_limit
        && sentinels
            .above_limit
            .as_ref()
            .is_some_and(|sentinel| value.equals_sentinel(sentinel));
    let below = options.mask_below_limit
        && sentinels
            .below_limit
            .as_ref()
            .is_some_and(|sentinel| value.equals_sentinel(sentinel));
    let missing = options.mask_missing && value.equals_sentinel(&sentinels.missing);

    if above || below || missing {
        Value::NaN
    } else {
        value
    }
}

/// One data line after coercion and masking, in field order
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedRow {
    pub values: Vec<Value>,
    /// Source text of numeric cells the formatted value would not reproduce
    pub tokens: Vec<Option<String>>,
}

/// Keep the token of an unmasked numeric cell unless formatting the value
/// gives the same text back
fn source_token(value: &Value, token: &str) -> Option<String> {
    match value {
        Value::Int(_) | Value::Float(_) if value.to_string() != token => Some(token.to_string()),
        _ => None,
    }
}

/// Decodes data lines against a resolved matrix descriptor
#[derive(Debug)]
pub struct RowDecoder<'a> {
    path: &'a Path,
    delimiter: Delimiter,
    field_count: usize,
    sentinels: &'a Sentinels,
    options: &'a ReadOptions,
}

impl<'a> RowDecoder<'a> {
    pub fn new(
        path: &'a Path,
        delimiter: Delimiter,
        field_count: usize,
        sentinels: &'a Sentinels,
        options: &'a ReadOptions,
    ) -> Self {
        Self {
            path,
            delimiter,
            field_count,
            sentinels,
            options,
        }
    }

    /// Decode one normalized, non-empty line (`line_num` is 1-based)
    pub fn decode(&self, line_num: usize, line: &str) -> Result<DecodedRow> {
        let tokens = split_row(self.delimiter, line);
        if tokens.len() != self.field_count {
            return Err(SeabassError::RowArityMismatch {
                path: self.path.to_path_buf(),
                line: line_num,
                expected: self.field_count,
                found: tokens.len(),
            });
        }

        let mut row = DecodedRow {
            values: Vec::with_capacity(tokens.len()),
            tokens: Vec::with_capacity(tokens.len()),
        };
        for token in tokens {
            let value = mask_value(Value::from_token(token), self.sentinels, self.options);
            row.tokens.push(source_token(&value, token));
            row.values.push(value);
        }
        Ok(row)
    }
}
