//! # Reporting Window
//!
//! The caller-supplied period every report is scoped to. Boundaries are
//! inclusive on both ends, matching the clipping arithmetic used for
//! residency segments.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use adote_core::Timestamp;

/// Errors from report-input validation.
#[derive(Error, Debug)]
pub enum ReportError {
    /// The window's start is after its end.
    #[error("invalid report window: {start} is after {end}")]
    InvalidWindow {
        /// Requested start.
        start: Timestamp,
        /// Requested end.
        end: Timestamp,
    },
}

/// A validated reporting period `[start, end]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportWindow {
    start: Timestamp,
    end: Timestamp,
}

impl ReportWindow {
    /// Build a window, rejecting inverted bounds.
    pub fn new(start: Timestamp, end: Timestamp) -> Result<Self, ReportError> {
        if start > end {
            return Err(ReportError::InvalidWindow { start, end });
        }
        Ok(Self { start, end })
    }

    /// Window start (inclusive).
    pub fn start(&self) -> Timestamp {
        self.start
    }

    /// Window end (inclusive).
    pub fn end(&self) -> Timestamp {
        self.end
    }

    /// Whether a timestamp falls inside the window.
    pub fn contains(&self, ts: Timestamp) -> bool {
        self.start <= ts && ts <= self.end
    }
}

// ─── Tests ───────────────────────────────────────────────────────────
