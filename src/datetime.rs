//! Timestamp reconstruction from temporal fields and header directives.
//!
//! A SeaBASS file may carry its time information in many shapes: a
//! `date`/`time` pair, separate `year`/`month`/`day`/... columns, a
//! year plus day-of-year (`sdy`), or only `/start_date` and `/start_time`
//! in the header. The shapes are tried in a fixed priority order
//! ([`RULE_PRIORITY`]); the first rule whose required columns and headers
//! are all present produces one timestamp per row. Rules are never mixed.
//!
//! Any unparseable cell aborts reconstruction for the whole file; a partial
//! sequence is never returned.

use crate::columns::FieldSource;
use crate::constants::{
    DATE_PATTERN, DATE_TIME_PATTERN, MICROSECOND_DIGITS, TIME_PATTERN, directives,
};
use crate::error::{Result, SeabassError};
use crate::models::Value;
use chrono::{NaiveDate, NaiveDateTime};
use regex::{Captures, Regex};
use std::borrow::Cow;
use std::sync::LazyLock;
use tracing::{debug, warn};

/// One reconstructed row time, microsecond precision, no time zone
pub type Timestamp = NaiveDateTime;

static DATE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(DATE_PATTERN).expect("valid date pattern"));
static TIME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(TIME_PATTERN).expect("valid time pattern"));
static DATE_TIME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(DATE_TIME_PATTERN).expect("valid date_time pattern"));

/// A field combination that can yield one timestamp per row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TemporalRule {
    DateTime,
    YearMonthDayHourMinuteSecond,
    YearMonthDayTime,
    DateHourMinuteSecond,
    DateTimeColumn,
    YearDayHourMinuteSecond,
    YearDayTime,
    StartDateTime,
    StartDateHourMinuteSecond,
    YearMonthDayHourMinute,
    DateHourMinute,
    YearDayHourMinute,
    YearMonthDayHour,
    DateHour,
    YearDayHour,
    YearMonthDay,
    Date,
    YearDay,
    StartDateStartTime,
    StartDate,
}

/// Rules in evaluation order, highest priority first
pub const RULE_PRIORITY: [TemporalRule; 20] = [
    TemporalRule::DateTime,
    TemporalRule::YearMonthDayHourMinuteSecond,
    TemporalRule::YearMonthDayTime,
    TemporalRule::DateHourMinuteSecond,
    TemporalRule::DateTimeColumn,
    TemporalRule::YearDayHourMinuteSecond,
    TemporalRule::YearDayTime,
    TemporalRule::StartDateTime,
    TemporalRule::StartDateHourMinuteSecond,
    TemporalRule::YearMonthDayHourMinute,
    TemporalRule::DateHourMinute,
    TemporalRule::YearDayHourMinute,
    TemporalRule::YearMonthDayHour,
    TemporalRule::DateHour,
    TemporalRule::YearDayHour,
    TemporalRule::YearMonthDay,
    TemporalRule::Date,
    TemporalRule::YearDay,
    TemporalRule::StartDateStartTime,
    TemporalRule::StartDate,
];

/// Where the calendar date of a row comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DatePart {
    DateColumn,
    YearMonthDay,
    YearDay,
    StartDateHeader,
}

/// Where the time of day of a row comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TimePart {
    TimeColumn,
    HourMinuteSecond,
    HourMinute,
    Hour,
    StartTimeHeader,
    Midnight,
}

impl TemporalRule {
    /// Columns that must all be present for the rule to apply
    pub fn required_columns(self) -> &'static [&'static str] {
        use TemporalRule::*;
        match self {
            DateTime => &["date", "time"],
            YearMonthDayHourMinuteSecond => &["year", "month", "day", "hour", "minute", "second"],
            YearMonthDayTime => &["year", "month", "day", "time"],
            DateHourMinuteSecond => &["date", "hour", "minute", "second"],
            DateTimeColumn => &["date_time"],
            YearDayHourMinuteSecond => &["year", "sdy", "hour", "minute", "second"],
            YearDayTime => &["year", "sdy", "time"],
            StartDateTime => &["time"],
            StartDateHourMinuteSecond => &["hour", "minute", "second"],
            YearMonthDayHourMinute => &["year", "month", "day", "hour", "minute"],
            DateHourMinute => &["date", "hour", "minute"],
            YearDayHourMinute => &["year", "sdy", "hour", "minute"],
            YearMonthDayHour => &["year", "month", "day", "hour"],
            DateHour => &["date", "hour"],
            YearDayHour => &["year", "sdy", "hour"],
            YearMonthDay => &["year", "month", "day"],
            Date => &["date"],
            YearDay => &["year", "sdy"],
            StartDateStartTime | StartDate => &[],
        }
    }

    /// Header directives that must all be present for the rule to apply
    pub fn required_headers(self) -> &'static [&'static str] {
        use TemporalRule::*;
        match self {
            StartDateTime | StartDateHourMinuteSecond | StartDate => &[directives::START_DATE],
            StartDateStartTime => &[directives::START_DATE, directives::START_TIME],
            _ => &[],
        }
    }

    /// Human-readable field combination, used in error messages
    pub fn label(self) -> &'static str {
        use TemporalRule::*;
        match self {
            DateTime => "date/time",
            YearMonthDayHourMinuteSecond => "year/month/day/hour/minute/second",
            YearMonthDayTime => "year/month/day/time",
            DateHourMinuteSecond => "date/hour/minute/second",
            DateTimeColumn => "date_time",
            YearDayHourMinuteSecond => "year/sdy/hour/minute/second",
            YearDayTime => "year/sdy/time",
            StartDateTime => "start_date header and time",
            StartDateHourMinuteSecond => "start_date header and hour/minute/second",
            YearMonthDayHourMinute => "year/month/day/hour/minute",
            DateHourMinute => "date/hour/minute",
            YearDayHourMinute => "year/sdy/hour/minute",
            YearMonthDayHour => "year/month/day/hour",
            DateHour => "date/hour",
            YearDayHour => "year/sdy/hour",
            YearMonthDay => "year/month/day",
            Date => "date",
            YearDay => "year/sdy",
            StartDateStartTime => "start_date/start_time headers",
            StartDate => "start_date header",
        }
    }

    /// Whether every required column and header is present
    pub fn matches<S: FieldSource + ?Sized>(self, source: &S) -> bool {
        self.required_columns()
            .iter()
            .all(|name| source.has_field(name))
            && self
                .required_headers()
                .iter()
                .all(|key| source.has_header(key))
    }

    /// Split a rule into its date and time sources; `None` for the
    /// combined `date_time` column
    fn parts(self) -> Option<(DatePart, TimePart)> {
        use TemporalRule::*;
        let parts = match self {
            DateTime => (DatePart::DateColumn, TimePart::TimeColumn),
            YearMonthDayHourMinuteSecond => (DatePart::YearMonthDay, TimePart::HourMinuteSecond),
            YearMonthDayTime => (DatePart::YearMonthDay, TimePart::TimeColumn),
            DateHourMinuteSecond => (DatePart::DateColumn, TimePart::HourMinuteSecond),
            DateTimeColumn => return None,
            YearDayHourMinuteSecond => (DatePart::YearDay, TimePart::HourMinuteSecond),
            YearDayTime => (DatePart::YearDay, TimePart::TimeColumn),
            StartDateTime => (DatePart::StartDateHeader, TimePart::TimeColumn),
            StartDateHourMinuteSecond => (DatePart::StartDateHeader, TimePart::HourMinuteSecond),
            YearMonthDayHourMinute => (DatePart::YearMonthDay, TimePart::HourMinute),
            DateHourMinute => (DatePart::DateColumn, TimePart::HourMinute),
            YearDayHourMinute => (DatePart::YearDay, TimePart::HourMinute),
            YearMonthDayHour => (DatePart::YearMonthDay, TimePart::Hour),
            DateHour => (DatePart::DateColumn, TimePart::Hour),
            YearDayHour => (DatePart::YearDay, TimePart::Hour),
            YearMonthDay => (DatePart::YearMonthDay, TimePart::Midnight),
            Date => (DatePart::DateColumn, TimePart::Midnight),
            YearDay => (DatePart::YearDay, TimePart::Midnight),
            StartDateStartTime => (DatePart::StartDateHeader, TimePart::StartTimeHeader),
            StartDate => (DatePart::StartDateHeader, TimePart::Midnight),
        };
        Some(parts)
    }

    /// Produce one timestamp per row using this rule alone
    pub fn evaluate<S: FieldSource + ?Sized>(self, source: &S) -> Result<Vec<Timestamp>> {
        let ctx = RuleContext { source, rule: self };
        let rows = source.row_count();

        let Some((date_part, time_part)) = self.parts() else {
            return (0..rows).map(|row| ctx.date_time_at(row)).collect();
        };

        // Header-derived parts are resolved once and broadcast to every row
        let header_date = match date_part {
            DatePart::StartDateHeader => Some(ctx.header_date()?),
            _ => None,
        };
        let header_clock = match time_part {
            TimePart::StartTimeHeader => Some(ctx.header_clock()?),
            _ => None,
        };

        (0..rows)
            .map(|row| {
                let date = match header_date {
                    Some(date) => date,
                    None => ctx.date_at(date_part, row)?,
                };
                let clock = match header_clock {
                    Some(clock) => clock,
                    None => ctx.clock_at(time_part, row)?,
                };
                ctx.combine(date, clock)
            })
            .collect()
    }
}

/// First rule, in priority order, whose inputs are all present
pub fn select_rule<S: FieldSource + ?Sized>(source: &S) -> Option<TemporalRule> {
    RULE_PRIORITY.into_iter().find(|rule| rule.matches(source))
}

/// Derive one timestamp per data row
///
/// Returns an empty sequence, with a logged warning, when no rule applies.
pub fn reconstruct_timestamps<S: FieldSource + ?Sized>(source: &S) -> Result<Vec<Timestamp>> {
    if source.row_count() == 0 {
        return Err(SeabassError::EmptyDataMatrix {
            path: source.source_path().to_path_buf(),
        });
    }

    match select_rule(source) {
        Some(rule) => {
            debug!(
                "Reconstructing {} timestamps for {} from {}",
                source.row_count(),
                source.source_path().display(),
                rule.label()
            );
            rule.evaluate(source)
        }
        None => {
            if !source.suppresses_warnings() {
                warn!(
                    "No temporal fields in {}: file must contain valid date and time information",
                    source.source_path().display()
                );
            }
            Ok(Vec::new())
        }
    }
}

/// Time of day before it is joined to a date
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Clock {
    hour: i64,
    minute: i64,
    second: i64,
    micro: u32,
}

impl Clock {
    const MIDNIGHT: Clock = Clock {
        hour: 0,
        minute: 0,
        second: 0,
        micro: 0,
    };
}

struct RuleContext<'s, S: ?Sized> {
    source: &'s S,
    rule: TemporalRule,
}

impl<'s, S: FieldSource + ?Sized> RuleContext<'s, S> {
    fn parse_failure(&self, detail: impl Into<String>) -> SeabassError {
        SeabassError::TemporalParseFailure {
            rule: self.rule.label().to_string(),
            path: self.source.source_path().to_path_buf(),
            detail: detail.into(),
        }
    }

    fn invalid_date(&self, detail: impl Into<String>) -> SeabassError {
        SeabassError::InvalidDateField {
            rule: self.rule.label().to_string(),
            path: self.source.source_path().to_path_buf(),
            detail: detail.into(),
        }
    }

    fn cell(&self, name: &str, row: usize) -> Result<&'s Value> {
        self.source
            .column(name)
            .and_then(|values| values.get(row))
            .ok_or_else(|| self.parse_failure(format!("no '{}' value for row {}", name, row + 1)))
    }

    /// Cell text as written in the file, falling back to the formatted value
    fn cell_text(&self, name: &str, row: usize) -> Result<Cow<'s, str>> {
        let value = self.cell(name, row)?;
        Ok(match self.source.token(name, row) {
            Some(token) => Cow::Borrowed(token),
            None => cell_repr(value),
        })
    }

    fn int_at(&self, name: &str, row: usize) -> Result<i64> {
        let value = self.cell(name, row)?;
        cell_int(value).ok_or_else(|| {
            self.parse_failure(format!(
                "'{}' value '{}' in row {} is not an integer",
                name,
                value,
                row + 1
            ))
        })
    }

    fn header(&self, key: &str) -> Result<&'s str> {
        self.source
            .header(key)
            .ok_or_else(|| self.parse_failure(format!("no /{} header", key)))
    }

    fn date_at(&self, part: DatePart, row: usize) -> Result<NaiveDate> {
        match part {
            DatePart::DateColumn => {
                let text = self.cell_text("date", row)?;
                let caps = DATE_RE.captures(&text).ok_or_else(|| {
                    self.parse_failure(format!("date '{}' in row {} is not YYYYMMDD", text, row + 1))
                })?;
                self.date_from_captures(&caps, 1)
            }
            DatePart::YearMonthDay => {
                let year = self.int_at("year", row)?;
                let month = self.int_at("month", row)?;
                let day = self.int_at("day", row)?;
                self.ymd(year, month, day)
            }
            DatePart::YearDay => {
                let year = self.int_at("year", row)?;
                let day = self.int_at("sdy", row)?;
                self.year_day(year, day)
            }
            DatePart::StartDateHeader => self.header_date(),
        }
    }

    fn clock_at(&self, part: TimePart, row: usize) -> Result<Clock> {
        match part {
            TimePart::TimeColumn => {
                let text = self.cell_text("time", row)?;
                let caps = TIME_RE.captures(&text).ok_or_else(|| {
                    self.parse_failure(format!("time '{}' in row {} is not H:MM:SS", text, row + 1))
                })?;
                self.clock_from_captures(&caps, 1)
            }
            TimePart::HourMinuteSecond => {
                let (second, micro) = self.second_at(row)?;
                Ok(Clock {
                    hour: self.int_at("hour", row)?,
                    minute: self.int_at("minute", row)?,
                    second,
                    micro,
                })
            }
            TimePart::HourMinute => Ok(Clock {
                hour: self.int_at("hour", row)?,
                minute: self.int_at("minute", row)?,
                ..Clock::MIDNIGHT
            }),
            TimePart::Hour => Ok(Clock {
                hour: self.int_at("hour", row)?,
                ..Clock::MIDNIGHT
            }),
            TimePart::StartTimeHeader => self.header_clock(),
            TimePart::Midnight => Ok(Clock::MIDNIGHT),
        }
    }

    /// A `second` cell may carry a fraction, e.g. `45.25`
    fn second_at(&self, row: usize) -> Result<(i64, u32)> {
        let text = self.cell_text("second", row)?;
        let (whole, fraction) = match text.split_once('.') {
            Some((whole, fraction)) => (whole, Some(fraction)),
            None => (&*text, None),
        };
        let second = whole.trim().parse::<i64>().map_err(|_| {
            self.parse_failure(format!("second '{}' in row {} is not numeric", text, row + 1))
        })?;
        let micro = match fraction {
            Some(digits) => microseconds(digits).ok_or_else(|| {
                self.parse_failure(format!(
                    "second '{}' in row {} has an invalid fraction",
                    text,
                    row + 1
                ))
            })?,
            None => 0,
        };
        Ok((second, micro))
    }

    fn date_time_at(&self, row: usize) -> Result<Timestamp> {
        let text = self.cell_text("date_time", row)?;
        let caps = DATE_TIME_RE.captures(&text).ok_or_else(|| {
            self.parse_failure(format!(
                "date_time '{}' in row {} is not YYYY-MM-DD HH:MM:SS",
                text,
                row + 1
            ))
        })?;
        let date = self.date_from_captures(&caps, 1)?;
        let clock = self.clock_from_captures(&caps, 4)?;
        self.combine(date, clock)
    }

    fn header_date(&self) -> Result<NaiveDate> {
        let text = self.header(directives::START_DATE)?;
        let caps = DATE_RE
            .captures(text)
            .ok_or_else(|| self.parse_failure(format!("/start_date '{}' is not YYYYMMDD", text)))?;
        self.date_from_captures(&caps, 1)
    }

    fn header_clock(&self) -> Result<Clock> {
        let text = self.header(directives::START_TIME)?;
        let caps = TIME_RE
            .captures(text)
            .ok_or_else(|| self.parse_failure(format!("/start_time '{}' is not H:MM:SS", text)))?;
        self.clock_from_captures(&caps, 1)
    }

    /// Read year, month and day from three consecutive capture groups
    fn date_from_captures(&self, caps: &Captures<'_>, first: usize) -> Result<NaiveDate> {
        let year = self.capture_int(caps, first)?;
        let month = self.capture_int(caps, first + 1)?;
        let day = self.capture_int(caps, first + 2)?;
        self.ymd(year, month, day)
    }

    /// Read hour, minute, second and an optional fraction from four
    /// consecutive capture groups
    fn clock_from_captures(&self, caps: &Captures<'_>, first: usize) -> Result<Clock> {
        let micro = match caps.get(first + 3) {
            Some(digits) => microseconds(digits.as_str())
                .ok_or_else(|| self.parse_failure(format!("invalid fraction '{}'", digits.as_str())))?,
            None => 0,
        };
        Ok(Clock {
            hour: self.capture_int(caps, first)?,
            minute: self.capture_int(caps, first + 1)?,
            second: self.capture_int(caps, first + 2)?,
            micro,
        })
    }

    fn capture_int(&self, caps: &Captures<'_>, group: usize) -> Result<i64> {
        caps.get(group)
            .and_then(|m| m.as_str().parse::<i64>().ok())
            .ok_or_else(|| self.parse_failure(format!("capture group {} is not an integer", group)))
    }

    fn ymd(&self, year: i64, month: i64, day: i64) -> Result<NaiveDate> {
        let date = match (i32::try_from(year), u32::try_from(month), u32::try_from(day)) {
            (Ok(y), Ok(m), Ok(d)) => NaiveDate::from_ymd_opt(y, m, d),
            _ => None,
        };
        date.ok_or_else(|| self.invalid_date(format!("{:04}-{:02}-{:02}", year, month, day)))
    }

    fn year_day(&self, year: i64, day: i64) -> Result<NaiveDate> {
        let year = i32::try_from(year)
            .map_err(|_| self.parse_failure(format!("year {} is out of range", year)))?;
        u32::try_from(day)
            .ok()
            .and_then(|ordinal| NaiveDate::from_yo_opt(year, ordinal))
            .ok_or_else(|| SeabassError::InvalidOrdinalDay {
                path: self.source.source_path().to_path_buf(),
                year,
                day,
            })
    }

    fn combine(&self, date: NaiveDate, clock: Clock) -> Result<Timestamp> {
        let time = match (
            u32::try_from(clock.hour),
            u32::try_from(clock.minute),
            u32::try_from(clock.second),
        ) {
            (Ok(h), Ok(m), Ok(s)) => date.and_hms_micro_opt(h, m, s, clock.micro),
            _ => None,
        };
        time.ok_or_else(|| {
            self.invalid_date(format!(
                "{} {:02}:{:02}:{:02}.{:06}",
                date, clock.hour, clock.minute, clock.second, clock.micro
            ))
        })
    }
}

/// Right-pad fractional-second digits to microseconds: "5" -> 500000
///
/// Digits beyond the sixth are dropped.
pub fn microseconds(digits: &str) -> Option<u32> {
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let mut padded: String = digits.chars().take(MICROSECOND_DIGITS).collect();
    while padded.len() < MICROSECOND_DIGITS {
        padded.push('0');
    }
    padded.parse().ok()
}

/// Formatted text of a cell
fn cell_repr(value: &Value) -> Cow<'_, str> {
    match value {
        Value::Text(text) => Cow::Borrowed(text.as_str()),
        other => Cow::Owned(other.to_string()),
    }
}

/// Integer view of a cell; floats truncate toward zero
fn cell_int(value: &Value) -> Option<i64> {
    match value {
        Value::Int(int) => Some(*int),
        Value::Float(float) if float.is_finite() => Some(float.trunc() as i64),
        Value::Text(text) => text.trim().parse::<i64>().ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::columns::{ColumnSet, HeaderMap};
    use std::path::{Path, PathBuf};

    /// In-memory field source for exercising rules without a file
    struct MockSource {
        columns: ColumnSet,
        headers: HeaderMap,
        rows: usize,
        path: PathBuf,
    }

    impl MockSource {
        fn new(rows: usize) -> Self {
            Self {
                columns: ColumnSet::default(),
                headers: HeaderMap::new(),
                rows,
                path: PathBuf::from("mock.sb"),
            }
        }

        fn with_column(mut self, name: &str, values: Vec<Value>) -> Self {
            assert_eq!(values.len(), self.rows);
            self.columns
                .push_column(name.to_string(), "none".to_string(), values);
            self
        }

        fn with_header(mut self, key: &str, value: &str) -> Self {
            self.headers.insert(key, value);
            self
        }
    }

    impl FieldSource for MockSource {
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
            self.rows
        }

        fn source_path(&self) -> &Path {
            &self.path
        }
    }

    fn text(s: &str) -> Value {
        Value::Text(s.to_string())
    }

    fn ts(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32, us: u32) -> Timestamp {
        NaiveDate::from_ymd_opt(y, mo, d)
            .unwrap()
            .and_hms_micro_opt(h, mi, s, us)
            .unwrap()
    }

    #[test]
    fn test_microseconds_right_padded() {
        assert_eq!(microseconds("5"), Some(500_000));
        assert_eq!(microseconds("05"), Some(50_000));
        assert_eq!(microseconds("123456"), Some(123_456));
        assert_eq!(microseconds("1234567"), Some(123_456));
        assert_eq!(microseconds(""), None);
        assert_eq!(microseconds("5a"), None);
    }

    #[test]
    fn test_priority_table_has_every_rule_once() {
        let unique: std::collections::HashSet<_> = RULE_PRIORITY.iter().collect();
        assert_eq!(unique.len(), RULE_PRIORITY.len());
        assert_eq!(RULE_PRIORITY[0], TemporalRule::DateTime);
        assert_eq!(RULE_PRIORITY[19], TemporalRule::StartDate);
    }

    #[test]
    fn test_date_and_time_columns() {
        let source = MockSource::new(2)
            .with_column("date", vec![Value::Int(20230615), Value::Int(20230616)])
            .with_column("time", vec![text("12:30:45.5"), text("1:02:03")]);

        let stamps = reconstruct_timestamps(&source).unwrap();
        assert_eq!(
            stamps,
            vec![ts(2023, 6, 15, 12, 30, 45, 500_000), ts(2023, 6, 16, 1, 2, 3, 0)]
        );
    }

    #[test]
    fn test_date_time_beats_component_columns() {
        let source = MockSource::new(1)
            .with_column("date", vec![Value::Int(20230615)])
            .with_column("time", vec![text("12:00:00")])
            .with_column("year", vec![Value::Int(1999)])
            .with_column("month", vec![Value::Int(1)])
            .with_column("day", vec![Value::Int(2)])
            .with_column("hour", vec![Value::Int(3)])
            .with_column("minute", vec![Value::Int(4)])
            .with_column("second", vec![Value::Int(5)]);

        assert_eq!(select_rule(&source), Some(TemporalRule::DateTime));
        assert_eq!(
            reconstruct_timestamps(&source).unwrap(),
            vec![ts(2023, 6, 15, 12, 0, 0, 0)]
        );
    }

    #[test]
    fn test_component_columns_with_fractional_second() {
        let source = MockSource::new(2)
            .with_column("year", vec![Value::Int(2020), Value::Int(2020)])
            .with_column("month", vec![Value::Int(2), Value::Int(2)])
            .with_column("day", vec![Value::Int(29), Value::Int(29)])
            .with_column("hour", vec![Value::Int(23), Value::Int(0)])
            .with_column("minute", vec![Value::Int(59), Value::Int(0)])
            .with_column("second", vec![Value::Float(59.25), Value::Int(7)]);

        assert_eq!(
            reconstruct_timestamps(&source).unwrap(),
            vec![ts(2020, 2, 29, 23, 59, 59, 250_000), ts(2020, 2, 29, 0, 0, 7, 0)]
        );
    }

    #[test]
    fn test_year_and_ordinal_day() {
        let source = MockSource::new(2)
            .with_column("year", vec![Value::Int(2021), Value::Int(2020)])
            .with_column("sdy", vec![Value::Int(60), Value::Int(60)]);

        assert_eq!(select_rule(&source), Some(TemporalRule::YearDay));
        assert_eq!(
            reconstruct_timestamps(&source).unwrap(),
            vec![ts(2021, 3, 1, 0, 0, 0, 0), ts(2020, 2, 29, 0, 0, 0, 0)]
        );
    }

    #[test]
    fn test_year_day_time() {
        let source = MockSource::new(1)
            .with_column("year", vec![Value::Int(2019)])
            .with_column("sdy", vec![Value::Int(1)])
            .with_column("time", vec![text("06:15:00.125")]);

        assert_eq!(
            reconstruct_timestamps(&source).unwrap(),
            vec![ts(2019, 1, 1, 6, 15, 0, 125_000)]
        );
    }

    #[test]
    fn test_invalid_ordinal_day() {
        let source = MockSource::new(1)
            .with_column("year", vec![Value::Int(2021)])
            .with_column("sdy", vec![Value::Int(366)]);

        match reconstruct_timestamps(&source).unwrap_err() {
            SeabassError::InvalidOrdinalDay { year, day, .. } => {
                assert_eq!(year, 2021);
                assert_eq!(day, 366);
            }
            other => panic!("Expected InvalidOrdinalDay, got {other:?}"),
        }
    }

    #[test]
    fn test_date_time_column() {
        let source = MockSource::new(1).with_column("date_time", vec![text("2022-11-05 08:09:10.75")]);
        assert_eq!(
            reconstruct_timestamps(&source).unwrap(),
            vec![ts(2022, 11, 5, 8, 9, 10, 750_000)]
        );
    }

    #[test]
    fn test_start_date_with_time_column() {
        let source = MockSource::new(2)
            .with_header("start_date", "20180704")
            .with_column("time", vec![text("10:00:00"), text("10:00:30.1")]);

        assert_eq!(select_rule(&source), Some(TemporalRule::StartDateTime));
        assert_eq!(
            reconstruct_timestamps(&source).unwrap(),
            vec![ts(2018, 7, 4, 10, 0, 0, 0), ts(2018, 7, 4, 10, 0, 30, 100_000)]
        );
    }

    #[test]
    fn test_start_date_and_start_time_broadcast() {
        let source = MockSource::new(3)
            .with_header("start_date", "20180704")
            .with_header("start_time", "14:20:00[GMT]")
            .with_column("depth", vec![Value::Int(1), Value::Int(2), Value::Int(3)]);

        assert_eq!(select_rule(&source), Some(TemporalRule::StartDateStartTime));
        let stamps = reconstruct_timestamps(&source).unwrap();
        assert_eq!(stamps, vec![ts(2018, 7, 4, 14, 20, 0, 0); 3]);
    }

    #[test]
    fn test_start_date_only_broadcast() {
        let source = MockSource::new(2)
            .with_header("start_date", "20180704")
            .with_column("depth", vec![Value::Int(1), Value::Int(2)]);

        assert_eq!(
            reconstruct_timestamps(&source).unwrap(),
            vec![ts(2018, 7, 4, 0, 0, 0, 0); 2]
        );
    }

    #[test]
    fn test_hour_minute_rules_default_seconds() {
        let source = MockSource::new(1)
            .with_column("date", vec![Value::Int(20200101)])
            .with_column("hour", vec![Value::Int(5)])
            .with_column("minute", vec![Value::Int(45)]);

        assert_eq!(select_rule(&source), Some(TemporalRule::DateHourMinute));
        assert_eq!(
            reconstruct_timestamps(&source).unwrap(),
            vec![ts(2020, 1, 1, 5, 45, 0, 0)]
        );
    }

    #[test]
    fn test_no_temporal_fields_is_empty() {
        let source = MockSource::new(1).with_column("chl", vec![Value::Float(0.3)]);
        assert_eq!(select_rule(&source), None);
        assert!(reconstruct_timestamps(&source).unwrap().is_empty());
    }

    #[test]
    fn test_empty_matrix_is_an_error() {
        let source = MockSource::new(0).with_column("date", vec![]);
        assert!(matches!(
            reconstruct_timestamps(&source),
            Err(SeabassError::EmptyDataMatrix { .. })
        ));
    }

    #[test]
    fn test_unparseable_time_aborts_whole_file() {
        let source = MockSource::new(2)
            .with_column("date", vec![Value::Int(20230615), Value::Int(20230615)])
            .with_column("time", vec![text("12:00:00"), text("noon")]);

        match reconstruct_timestamps(&source).unwrap_err() {
            SeabassError::TemporalParseFailure { rule, path, .. } => {
                assert_eq!(rule, "date/time");
                assert_eq!(path, PathBuf::from("mock.sb"));
            }
            other => panic!("Expected TemporalParseFailure, got {other:?}"),
        }
    }

    #[test]
    fn test_masked_component_is_a_parse_failure() {
        let source = MockSource::new(1)
            .with_column("year", vec![Value::NaN])
            .with_column("month", vec![Value::Int(1)])
            .with_column("day", vec![Value::Int(1)]);

        assert!(matches!(
            reconstruct_timestamps(&source),
            Err(SeabassError::TemporalParseFailure { .. })
        ));
    }

    #[test]
    fn test_impossible_calendar_date() {
        let source = MockSource::new(1).with_column("date", vec![Value::Int(20230230)]);
        assert!(matches!(
            reconstruct_timestamps(&source),
            Err(SeabassError::InvalidDateField { .. })
        ));
    }

    #[test]
    fn test_out_of_range_hour() {
        let source = MockSource::new(1)
            .with_column("date", vec![Value::Int(20230201)])
            .with_column("hour", vec![Value::Int(24)]);
        assert!(matches!(
            reconstruct_timestamps(&source),
            Err(SeabassError::InvalidDateField { .. })
        ));
    }
}
