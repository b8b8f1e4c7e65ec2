//! Reader configuration.
//!
//! [`ReadOptions`] controls value masking, warning output and comment
//! retention for a single parse. It is a plain value object: the parser
//! reads it, never mutates it, and it can be round-tripped through serde
//! so batch callers can keep it alongside their own settings.

use serde::{Deserialize, Serialize};

/// Options accepted by [`crate::SeabassFile::open`] and
/// [`crate::SeabassFile::parse_str`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReadOptions {
    /// Replace values equal to `/missing` with NaN
    pub mask_missing: bool,

    /// Replace values equal to `/above_detection_limit` with NaN
    pub mask_above_limit: bool,

    /// Replace values equal to `/below_detection_limit` with NaN
    pub mask_below_limit: bool,

    /// Neither log nor record non-fatal warnings
    pub suppress_warnings: bool,

    /// Keep `!/` directive-change annotations in the comment list
    pub retain_directive_comments: bool,
}

impl Default for ReadOptions {
    fn default() -> Self {
        Self {
            mask_missing: true,
            mask_above_limit: true,
            mask_below_limit: true,
            suppress_warnings: false,
            retain_directive_comments: false,
        }
    }
}

impl ReadOptions {
    /// Options that keep every value exactly as written
    pub fn unmasked() -> Self {
        Self {
            mask_missing: false,
            mask_above_limit: false,
            mask_below_limit: false,
            ..Self::default()
        }
    }

    /// Keep missing-value sentinels as numbers
    pub fn without_missing_mask(mut self) -> Self {
        self.mask_missing = false;
        self
    }

    /// Keep above-detection-limit sentinels as numbers
    pub fn without_above_limit_mask(mut self) -> Self {
        self.mask_above_limit = false;
        self
    }

    /// Keep below-detection-limit sentinels as numbers
    pub fn without_below_limit_mask(mut self) -> Self {
        self.mask_below_limit = false;
        self
    }

    /// Silence data-quality and header warnings
    pub fn with_suppressed_warnings(mut self) -> Self {
        self.suppress_warnings = true;
        self
    }

    /// Include `!/` directive-change lines in the comments
    pub fn with_directive_comments(mut self) -> Self {
        self.retain_directive_comments = true;
        self
    }

    /// Whether any sentinel masking is enabled
    pub fn masks_anything(&self) -> bool {
        self.mask_missing || self.mask_above_limit || self.mask_below_limit
    }
}
