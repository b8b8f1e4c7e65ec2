//! SeaBASS Processor Library
//!
//! Reads and writes SeaBASS files, the self-describing text format used to
//! exchange oceanographic field measurements: a `/begin_header` ...
//! `/end_header` block of directives and comments followed by a delimited
//! data matrix.
//!
//! This library provides tools for:
//! - Parsing headers, fields, units, delimiters and sentinel values
//! - Masking missing and detection-limit values as NaN
//! - Reconstructing one timestamp per row from whichever temporal fields
//!   a file carries
//! - Editing single values and writing the document back out
//!
//! ```no_run
//! use seabass_processor::{ReadOptions, SeabassFile};
//!
//! let file = SeabassFile::open("cruise.sb", &ReadOptions::default())?;
//! for timestamp in file.reconstruct_timestamps()? {
//!     println!("{timestamp}");
//! }
//! # Ok::<(), seabass_processor::SeabassError>(())
//! ```

pub mod cli;
pub mod columns;
pub mod config;
pub mod constants;
pub mod datetime;
pub mod discovery;
pub mod document;
pub mod error;
pub mod header;
pub mod models;
pub mod record;
pub mod writer;

// Re-export commonly used types
pub use columns::{Column, ColumnSet, FieldSource, HeaderMap};
pub use config::ReadOptions;
pub use datetime::{TemporalRule, Timestamp, reconstruct_timestamps};
pub use discovery::collect_file_paths;
pub use document::SeabassFile;
pub use error::{Result, SeabassError};
pub use models::{Delimiter, ParseWarning, Sentinel, Sentinels, Value};
