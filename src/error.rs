//! Error types for the layout core.
//!
//! Data-shape problems never cross the public boundary as failures. Bad
//! records are dropped during validation and surfaced as [`DataWarning`]s
//! so one broken record cannot blank a whole view.

use std::fmt;

use thiserror::Error;

/// Errors raised while validating records or building layouts.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LayoutError {
    #[error("range ends before it starts ({start} to {end})")]
    InvalidRange { start: String, end: String },

    #[error("invalid time '{0}', expected HH:MM")]
    InvalidTimeFormat(String),

    #[error("invalid date '{0}'")]
    InvalidDate(String),

    #[error("invalid month {year}-{month}")]
    InvalidMonth { year: i32, month: u32 },

    #[error("unknown weekday '{0}'")]
    UnknownWeekday(String),

    #[error("malformed record: {0}")]
    InvalidRecord(String),
}

impl LayoutError {
    pub fn range(start: impl fmt::Display, end: impl fmt::Display) -> Self {
        LayoutError::InvalidRange {
            start: start.to_string(),
            end: end.to_string(),
        }
    }
}

pub type LayoutResult<T> = Result<T, LayoutError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKind {
    Event,
    ScheduleItem,
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordKind::Event => f.write_str("event"),
            RecordKind::ScheduleItem => f.write_str("schedule item"),
        }
    }
}

/// A record that was excluded from layout, with the reason.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataWarning {
    pub kind: RecordKind,
    pub record_id: String,
    pub error: LayoutError,
}

impl DataWarning {
    pub fn new(kind: RecordKind, record_id: impl Into<String>, error: LayoutError) -> Self {
        Self {
            kind,
            record_id: record_id.into(),
            error,
        }
    }
}

impl fmt::Display for DataWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} '{}' skipped: {}", self.kind, self.record_id, self.error)
    }
}
