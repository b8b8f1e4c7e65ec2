//! SeaBASS header parsing and matrix descriptor resolution.
//!
//! Header lines are fed one at a time to a [`HeaderBuilder`] until the
//! `/end_header` terminator is seen. The builder keeps every directive in
//! order, collects comments, and tracks the directives the data section
//! depends on. [`HeaderBuilder::build`] then validates the mandatory
//! descriptors and produces the [`MatrixDescriptor`] that gates row
//! decoding.

use crate::columns::{ColumnSet, HeaderMap};
use crate::config::ReadOptions;
use crate::constants::{
    BEGIN_HEADER, COMMENT_MARKER, DIRECTIVE_CHANGE_MARKER, END_HEADER, directives,
};
use crate::error::{Result, SeabassError};
use crate::models::{Delimiter, ParseWarning, Sentinel, Sentinels};
use std::borrow::Cow;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Strip line-ending characters and surrounding whitespace
pub fn normalize_line(raw: &str) -> Cow<'_, str> {
    if raw.contains(['\r', '\n']) {
        Cow::Owned(raw.replace(['\r', '\n'], "").trim().to_string())
    } else {
        Cow::Borrowed(raw.trim())
    }
}

/// Classification of a normalized header line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HeaderLine<'a> {
    Blank,
    BeginHeader,
    EndHeader,
    /// Comment text with the leading marker removed
    Comment {
        text: &'a str,
        directive_change: bool,
    },
    Directive {
        key: String,
        value: &'a str,
    },
    /// Neither comment nor `key=value`
    Malformed,
}

impl<'a> HeaderLine<'a> {
    pub fn classify(line: &'a str) -> Self {
        if line.is_empty() {
            return HeaderLine::Blank;
        }
        if line.eq_ignore_ascii_case(BEGIN_HEADER) {
            return HeaderLine::BeginHeader;
        }
        if line.eq_ignore_ascii_case(END_HEADER) {
            return HeaderLine::EndHeader;
        }
        if line.contains(COMMENT_MARKER) {
            let mut chars = line.chars();
            chars.next();
            return HeaderLine::Comment {
                text: chars.as_str(),
                directive_change: line.contains(DIRECTIVE_CHANGE_MARKER),
            };
        }
        match line.split_once('=') {
            Some((key, value)) => {
                let key = key.to_lowercase();
                let key = key.strip_prefix('/').unwrap_or(&key).to_string();
                HeaderLine::Directive { key, value }
            }
            None => HeaderLine::Malformed,
        }
    }
}

/// Everything the data section needs, resolved from the header
#[derive(Debug, Clone)]
pub struct MatrixDescriptor {
    pub headers: HeaderMap,
    pub comments: Vec<String>,
    pub columns: ColumnSet,
    pub delimiter: Delimiter,
    pub sentinels: Sentinels,
    pub investigator: Option<String>,
    pub data_use_warning: bool,
    pub warnings: Vec<ParseWarning>,
}

/// Accumulates header state line by line
#[derive(Debug)]
pub struct HeaderBuilder<'o> {
    path: PathBuf,
    options: &'o ReadOptions,
    headers: HeaderMap,
    comments: Vec<String>,
    fields: Option<Vec<String>>,
    units: Option<Vec<String>>,
    missing: Option<Sentinel>,
    above_limit: Option<Sentinel>,
    below_limit: Option<Sentinel>,
    delimiter: Option<Delimiter>,
    investigator: Option<String>,
    data_use_warning: bool,
}

impl<'o> HeaderBuilder<'o> {
    pub fn new(path: &Path, options: &'o ReadOptions) -> Self {
        Self {
            path: path.to_path_buf(),
            options,
            headers: HeaderMap::new(),
            comments: Vec::new(),
            fields: None,
            units: None,
            missing: None,
            above_limit: None,
            below_limit: None,
            delimiter: None,
            investigator: None,
            data_use_warning: false,
        }
    }

    /// Consume one normalized header line (`line_num` is 1-based)
    ///
    /// Returns `true` once the `/end_header` terminator has been read.
    pub fn parse_line(&mut self, line_num: usize, line: &str) -> Result<bool> {
        match HeaderLine::classify(line) {
            HeaderLine::Blank | HeaderLine::BeginHeader => {}
            HeaderLine::EndHeader => return Ok(true),
            HeaderLine::Comment {
                text,
                directive_change,
            } => {
                if !directive_change || self.options.retain_directive_comments {
                    self.comments.push(text.to_string());
                }
            }
            HeaderLine::Directive { key, value } => {
                self.apply_directive(line_num, &key, value)?;
                self.headers.insert(key, value);
            }
            HeaderLine::Malformed => {
                return Err(SeabassError::MalformedDirective {
                    path: self.path.clone(),
                    line: line_num,
                    content: line.to_string(),
                });
            }
        }
        Ok(false)
    }

    fn apply_directive(&mut self, line_num: usize, key: &str, value: &str) -> Result<()> {
        match key {
            directives::FIELDS => {
                self.fields = Some(split_list(value));
            }
            directives::UNITS => {
                self.units = Some(split_list(value));
            }
            directives::MISSING => {
                self.missing = Some(self.parse_sentinel(line_num, key, value)?);
            }
            directives::ABOVE_DETECTION_LIMIT => {
                self.above_limit = Some(self.parse_sentinel(line_num, key, value)?);
            }
            directives::BELOW_DETECTION_LIMIT => {
                self.below_limit = Some(self.parse_sentinel(line_num, key, value)?);
            }
            directives::DELIMITER => {
                let delimiter = Delimiter::from_directive(value).ok_or_else(|| {
                    SeabassError::InvalidDelimiter {
                        path: self.path.clone(),
                        line: line_num,
                        value: value.to_string(),
                    }
                })?;
                self.delimiter = Some(delimiter);
            }
            directives::INVESTIGATORS => {
                self.investigator = value
                    .split(',')
                    .next()
                    .map(str::trim)
                    .filter(|pi| !pi.is_empty())
                    .map(str::to_string);
            }
            directives::DATA_USE_WARNING => {
                self.data_use_warning = true;
            }
            _ => {}
        }
        Ok(())
    }

    fn parse_sentinel(&self, line_num: usize, key: &str, value: &str) -> Result<Sentinel> {
        Sentinel::parse(value).ok_or_else(|| SeabassError::InvalidSentinelValue {
            path: self.path.clone(),
            line: line_num,
            directive: key.to_string(),
            value: value.to_string(),
        })
    }

    /// Validate mandatory descriptors and resolve the data matrix layout
    pub fn build(self) -> Result<MatrixDescriptor> {
        let delimiter = self.delimiter.ok_or_else(|| SeabassError::MissingDelimiter {
            path: self.path.clone(),
        })?;
        let missing = self.missing.ok_or_else(|| SeabassError::MissingSentinel {
            path: self.path.clone(),
        })?;
        let fields = self.fields.ok_or_else(|| SeabassError::MissingFields {
            path: self.path.clone(),
        })?;

        let mut warnings = Vec::new();
        if self.data_use_warning {
            warnings.push(ParseWarning::DataUseWarning);
        }
        if self.options.mask_above_limit && self.above_limit.is_none() {
            warnings.push(ParseWarning::AboveLimitUnavailable);
        }
        if self.options.mask_below_limit && self.below_limit.is_none() {
            warnings.push(ParseWarning::BelowLimitUnavailable);
        }

        let mut columns = ColumnSet::from_fields(fields);
        if !columns.attach_units(self.units.as_deref()) {
            warnings.push(ParseWarning::UnitsUnavailable);
        }

        if self.options.suppress_warnings {
            warnings.clear();
        }
        for warning in &warnings {
            warn!("{}: {}", self.path.display(), warning);
        }

        debug!(
            "Resolved header for {}: {} directives, {} comments, {} fields, delimiter={:?}",
            self.path.display(),
            self.headers.len(),
            self.comments.len(),
            columns.len(),
            delimiter
        );

        Ok(MatrixDescriptor {
            headers: self.headers,
            comments: self.comments,
            columns,
            delimiter,
            sentinels: Sentinels {
                missing,
                above_limit: self.above_limit,
                below_limit: self.below_limit,
            },
            investigator: self.investigator,
            data_use_warning: self.data_use_warning,
            warnings,
        })
    }
}

/// Case-fold and split a comma-separated directive value
fn split_list(value: &str) -> Vec<String> {
    value
        .to_lowercase()
        .split(',')
        .map(|item| item.trim().to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn feed(builder: &mut HeaderBuilder<'_>, lines: &[&str]) -> Result<bool> {
        let mut terminated = false;
        for (i, line) in lines.iter().enumerate() {
            terminated = builder.parse_line(i + 1, line)?;
        }
        Ok(terminated)
    }

    #[test]
    fn test_normalize_line() {
        assert_eq!(normalize_line("  /missing=-999\r\n"), "/missing=-999");
        assert_eq!(normalize_line("a\rb"), "ab");
        assert_eq!(normalize_line("\t"), "");
    }

    #[test]
    fn test_classify_lines() {
        assert_eq!(HeaderLine::classify(""), HeaderLine::Blank);
        assert_eq!(HeaderLine::classify("/BEGIN_HEADER"), HeaderLine::BeginHeader);
        assert_eq!(HeaderLine::classify("/end_header"), HeaderLine::EndHeader);
        assert_eq!(
            HeaderLine::classify("! calibrated 2021"),
            HeaderLine::Comment {
                text: " calibrated 2021",
                directive_change: false
            }
        );
        assert_eq!(
            HeaderLine::classify("!/missing=-9999"),
            HeaderLine::Comment {
                text: "/missing=-9999",
                directive_change: true
            }
        );
        assert_eq!(
            HeaderLine::classify("/Station=ALOHA=1"),
            HeaderLine::Directive {
                key: "station".to_string(),
                value: "ALOHA=1"
            }
        );
        assert_eq!(HeaderLine::classify("/investigators"), HeaderLine::Malformed);
    }

    #[test]
    fn test_header_directives() {
        let options = ReadOptions::default();
        let mut builder = HeaderBuilder::new(Path::new("test.sb"), &options);
        let terminated = feed(
            &mut builder,
            &[
                "/begin_header",
                "/investigators=Jane_Doe,John_Roe",
                "/Fields=Date,Time,CHL",
                "/units=yyyymmdd,hh:mm:ss,mg/m^3",
                "/missing=-999",
                "/below_detection_limit=-888",
                "/above_detection_limit=-777",
                "/delimiter=comma",
                "! sampled with a rosette",
                "!/missing=-9999",
                "/end_header",
            ],
        )
        .unwrap();
        assert!(terminated);

        let descriptor = builder.build().unwrap();
        let fields: Vec<&str> = descriptor.columns.field_names().collect();
        assert_eq!(fields, vec!["date", "time", "chl"]);
        assert_eq!(descriptor.columns.unit("chl"), Some("mg/m^3"));
        assert_eq!(descriptor.headers.get("fields"), Some("Date,Time,CHL"));
        assert_eq!(descriptor.delimiter, Delimiter::Comma);
        assert_eq!(descriptor.sentinels.missing.value, -999.0);
        assert_eq!(descriptor.sentinels.below_limit.as_ref().unwrap().value, -888.0);
        assert_eq!(descriptor.sentinels.above_limit.as_ref().unwrap().value, -777.0);
        assert_eq!(descriptor.investigator.as_deref(), Some("Jane_Doe"));
        assert_eq!(descriptor.comments, vec![" sampled with a rosette".to_string()]);
        assert!(descriptor.warnings.is_empty());
    }

    #[test]
    fn test_directive_comments_retained_on_request() {
        let options = ReadOptions::default().with_directive_comments();
        let mut builder = HeaderBuilder::new(Path::new("test.sb"), &options);
        feed(
            &mut builder,
            &[
                "/fields=a",
                "/missing=-999",
                "/delimiter=space",
                "!/missing=-9999",
                "/end_header",
            ],
        )
        .unwrap();
        let descriptor = builder.build().unwrap();
        assert_eq!(descriptor.comments, vec!["/missing=-9999".to_string()]);
    }

    #[test]
    fn test_malformed_directive_names_line() {
        let options = ReadOptions::default();
        let mut builder = HeaderBuilder::new(Path::new("bad.sb"), &options);
        let err = feed(&mut builder, &["/begin_header", "/fields=a", "not a directive"])
            .unwrap_err();
        match err {
            SeabassError::MalformedDirective { path, line, content } => {
                assert_eq!(path, PathBuf::from("bad.sb"));
                assert_eq!(line, 3);
                assert_eq!(content, "not a directive");
            }
            other => panic!("Expected MalformedDirective, got {other:?}"),
        }
    }

    #[test]
    fn test_invalid_sentinel_value() {
        let options = ReadOptions::default();
        let mut builder = HeaderBuilder::new(Path::new("bad.sb"), &options);
        let err = builder.parse_line(4, "/missing=n/a").unwrap_err();
        assert!(matches!(
            err,
            SeabassError::InvalidSentinelValue { ref directive, line: 4, .. } if directive == "missing"
        ));
    }

    #[test]
    fn test_invalid_delimiter() {
        let options = ReadOptions::default();
        let mut builder = HeaderBuilder::new(Path::new("bad.sb"), &options);
        let err = builder.parse_line(2, "/delimiter=semicolon").unwrap_err();
        assert!(matches!(err, SeabassError::InvalidDelimiter { line: 2, .. }));
    }

    #[test]
    fn test_mandatory_descriptors_checked_in_order() {
        let options = ReadOptions::default();

        let mut builder = HeaderBuilder::new(Path::new("x.sb"), &options);
        feed(&mut builder, &["/fields=a", "/missing=-999"]).unwrap();
        assert!(matches!(
            builder.build(),
            Err(SeabassError::MissingDelimiter { .. })
        ));

        let mut builder = HeaderBuilder::new(Path::new("x.sb"), &options);
        feed(&mut builder, &["/fields=a", "/delimiter=comma"]).unwrap();
        assert!(matches!(
            builder.build(),
            Err(SeabassError::MissingSentinel { .. })
        ));

        let mut builder = HeaderBuilder::new(Path::new("x.sb"), &options);
        feed(&mut builder, &["/missing=-999", "/delimiter=comma"]).unwrap();
        assert!(matches!(
            builder.build(),
            Err(SeabassError::MissingFields { .. })
        ));
    }

    #[test]
    fn test_zero_is_a_valid_missing_value() {
        let options = ReadOptions::default();
        let mut builder = HeaderBuilder::new(Path::new("x.sb"), &options);
        feed(&mut builder, &["/fields=a", "/missing=0", "/delimiter=comma"]).unwrap();
        let descriptor = builder.build().unwrap();
        assert_eq!(descriptor.sentinels.missing.value, 0.0);
    }

    #[test]
    fn test_non_fatal_warnings() {
        let options = ReadOptions::default();
        let mut builder = HeaderBuilder::new(Path::new("x.sb"), &options);
        feed(
            &mut builder,
            &[
                "/fields=a,b",
                "/units=m",
                "/missing=-999",
                "/delimiter=comma",
                "/data_use_warning=optically_shallow",
            ],
        )
        .unwrap();
        let descriptor = builder.build().unwrap();

        assert!(descriptor.data_use_warning);
        assert_eq!(
            descriptor.warnings,
            vec![
                ParseWarning::DataUseWarning,
                ParseWarning::AboveLimitUnavailable,
                ParseWarning::BelowLimitUnavailable,
                ParseWarning::UnitsUnavailable,
            ]
        );
        assert_eq!(descriptor.columns.unit("a"), Some("none"));
    }

    #[test]
    fn test_suppressed_warnings() {
        let options = ReadOptions::default().with_suppressed_warnings();
        let mut builder = HeaderBuilder::new(Path::new("x.sb"), &options);
        feed(
            &mut builder,
            &["/fields=a", "/missing=-999", "/delimiter=comma", "/data_use_warning=yes"],
        )
        .unwrap();
        let descriptor = builder.build().unwrap();
        assert!(descriptor.data_use_warning);
        assert!(descriptor.warnings.is_empty());
    }
}
