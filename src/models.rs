//! Core data structures for the SeaBASS format engine.
//!
//! Defines the tagged cell value, the delimiter classes, the sentinel value
//! objects and the non-fatal warnings recorded while parsing.

use crate::constants::{DELIMITER_COMMA, DELIMITER_SPACE, DELIMITER_TAB};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A single cell of the data matrix
///
/// Coercion is attempted per token, so one column may hold a mix of
/// variants. `NaN` marks a masked or not-a-number value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    Int(i64),
    Float(f64),
    Text(String),
    NaN,
}

impl Value {
    /// Coerce a raw token: integer first, then float, else text
    pub fn from_token(token: &str) -> Self {
        if let Ok(int) = token.parse::<i64>() {
            return Value::Int(int);
        }
        match token.parse::<f64>() {
            Ok(float) if float.is_nan() => Value::NaN,
            Ok(float) => Value::Float(float),
            Err(_) => Value::Text(token.to_string()),
        }
    }

    /// Whether the value takes part in numeric comparisons
    pub fn is_numeric(&self) -> bool {
        !matches!(self, Value::Text(_))
    }

    pub fn is_nan(&self) -> bool {
        matches!(self, Value::NaN)
    }

    /// Numeric view of the value; `NaN` maps to `f64::NAN`
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(int) => Some(*int as f64),
            Value::Float(float) => Some(*float),
            Value::NaN => Some(f64::NAN),
            Value::Text(_) => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(text) => Some(text),
            _ => None,
        }
    }

    /// Exact numeric equality against a sentinel
    pub fn equals_sentinel(&self, sentinel: &Sentinel) -> bool {
        self.as_f64().is_some_and(|value| value == sentinel.value)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(int) => write!(f, "{}", int),
            // Debug keeps a trailing ".0" on integral floats
            Value::Float(float) => write!(f, "{:?}", float),
            Value::Text(text) => f.write_str(text),
            Value::NaN => f.write_str("nan"),
        }
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Int(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        if value.is_nan() {
            Value::NaN
        } else {
            Value::Float(value)
        }
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Text(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Text(value)
    }
}

/// Field separator class declared by `/delimiter=`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Delimiter {
    /// One or more commas
    Comma,
    /// Any run of whitespace
    Whitespace,
    /// One or more tabs
    Tab,
}

impl Delimiter {
    /// Map a `/delimiter=` value; the first keyword found wins
    pub fn from_directive(value: &str) -> Option<Self> {
        let value = value.to_lowercase();
        if value.contains(DELIMITER_COMMA) {
            Some(Delimiter::Comma)
        } else if value.contains(DELIMITER_SPACE) {
            Some(Delimiter::Whitespace)
        } else if value.contains(DELIMITER_TAB) {
            Some(Delimiter::Tab)
        } else {
            None
        }
    }

    /// Character used to join cells on write
    pub fn as_char(&self) -> char {
        match self {
            Delimiter::Comma => ',',
            Delimiter::Whitespace => ' ',
            Delimiter::Tab => '\t',
        }
    }

    /// Regex matching one separator run on read
    pub fn pattern(&self) -> &'static str {
        match self {
            Delimiter::Comma => ",+",
            Delimiter::Whitespace => r"\s+",
            Delimiter::Tab => r"\t+",
        }
    }
}

/// A reserved numeric value read from the header
///
/// The token as written is kept so the writer can reproduce it verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sentinel {
    pub value: f64,
    pub token: String,
}

impl Sentinel {
    pub fn parse(token: &str) -> Option<Self> {
        let token = token.trim();
        token.parse::<f64>().ok().map(|value| Self {
            value,
            token: token.to_string(),
        })
    }

    /// The sentinel as a cell, coerced the same way data tokens are
    pub fn as_value(&self) -> Value {
        Value::from_token(&self.token)
    }
}

/// Sentinels resolved from the header, passed by reference wherever
/// masking or writing needs them
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sentinels {
    pub missing: Sentinel,
    pub above_limit: Option<Sentinel>,
    pub below_limit: Option<Sentinel>,
}

/// Non-fatal conditions observed while parsing or mutating a file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ParseWarning {
    /// `/data_use_warning` is present
    DataUseWarning,
    /// Above-limit masking requested but no `/above_detection_limit`
    AboveLimitUnavailable,
    /// Below-limit masking requested but no `/below_detection_limit`
    BelowLimitUnavailable,
    /// `/units` absent or not matching `/fields`; every unit is "none"
    UnitsUnavailable,
    /// A field was added but there is no `/units` directive to extend
    UnitsHeaderAbsent { field: String },
}

impl fmt::Display for ParseWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseWarning::DataUseWarning => f.write_str(
                "data_use_warning header is present; measurements were collected under \
                 unique conditions, consult headers, comments and documentation",
            ),
            ParseWarning::AboveLimitUnavailable => {
                f.write_str("no above_detection_limit in header; unable to mask values as NaN")
            }
            ParseWarning::BelowLimitUnavailable => {
                f.write_str("no below_detection_limit in header; unable to mask values as NaN")
            }
            ParseWarning::UnitsUnavailable => {
                f.write_str("no valid units detected; every field uses unit 'none'")
            }
            ParseWarning::UnitsHeaderAbsent { field } => {
                write!(f, "no units found in header; unit for '{}' not recorded", field)
            }
        }
    }
}
