//! Constants for the SeaBASS format engine
//!
//! Directive keys, section markers, delimiter keywords and the temporal
//! patterns used throughout the reader and writer.

// =============================================================================
// Section markers and comment prefixes
// =============================================================================

/// Literal line opening the header block (matched case-insensitively)
pub const BEGIN_HEADER: &str = "/begin_header";

/// Literal line closing the header block (matched case-insensitively)
pub const END_HEADER: &str = "/end_header";

/// Conventional file extension, without the dot
pub const SEABASS_EXTENSION: &str = "sb";

/// Marker introducing a comment line
pub const COMMENT_MARKER: char = '!';

/// Comments recording a change to a header directive
pub const DIRECTIVE_CHANGE_MARKER: &str = "!/";

// =============================================================================
// Directive keys (stored case-folded, without the leading '/')
// =============================================================================

pub mod directives {
    pub const FIELDS: &str = "fields";
    pub const UNITS: &str = "units";
    pub const MISSING: &str = "missing";
    pub const BELOW_DETECTION_LIMIT: &str = "below_detection_limit";
    pub const ABOVE_DETECTION_LIMIT: &str = "above_detection_limit";
    pub const DELIMITER: &str = "delimiter";
    pub const INVESTIGATORS: &str = "investigators";
    pub const DATA_USE_WARNING: &str = "data_use_warning";
    pub const START_DATE: &str = "start_date";
    pub const END_DATE: &str = "end_date";
    pub const START_TIME: &str = "start_time";
}

// =============================================================================
// Delimiters
// =============================================================================

/// Keywords recognised inside the `/delimiter=` value
pub const DELIMITER_COMMA: &str = "comma";
pub const DELIMITER_SPACE: &str = "space";
pub const DELIMITER_TAB: &str = "tab";

// =============================================================================
// Fields and units
// =============================================================================

/// Unit assigned when the units directive is absent or unusable
pub const DEFAULT_UNIT: &str = "none";

/// Suffixes marking uncertainty/statistics columns of a base measurement
pub const UNCERTAINTY_SUFFIXES: &[&str] = &["_cv", "_sd", "_se", "_bincount"];

// =============================================================================
// Temporal patterns
// =============================================================================

/// Eight-digit `YYYYMMDD` date
pub const DATE_PATTERN: &str = r"(\d{4})(\d{2})(\d{2})";

/// `H:MM:SS` with an optional 1-6 digit fraction
pub const TIME_PATTERN: &str = r"(\d{1,2}):(\d{2}):(\d{2})(?:\.(\d{1,6}))?";

/// `YYYY-MM-DD HH:MM:SS` with an optional 1-6 digit fraction
pub const DATE_TIME_PATTERN: &str =
    r"(\d{4})-(\d{2})-(\d{2})\s+(\d{1,2}):(\d{2}):(\d{2})(?:\.(\d{1,6}))?";

/// Width fractional seconds are right-padded to
pub const MICROSECOND_DIGITS: usize = 6;
