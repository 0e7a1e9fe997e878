//! One-time validation of directory records.

use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::{DataWarning, LayoutError, RecordKind};

use super::event::{Event, RawEvent};
use super::schedule::{RawScheduleItem, ScheduleItem};

/// Records that passed validation, plus a warning for each one that did not.
#[derive(Debug, Clone)]
pub struct Sanitized<T> {
    pub records: Vec<T>,
    pub warnings: Vec<DataWarning>,
}

impl<T> Default for Sanitized<T> {
    fn default() -> Self {
        Self {
            records: Vec::new(),
            warnings: Vec::new(),
        }
    }
}

pub fn sanitize_events(raw: impl IntoIterator<Item = Value>) -> Sanitized<Event> {
    sanitize::<RawEvent, _>(raw, RecordKind::Event)
}

pub fn sanitize_schedule(raw: impl IntoIterator<Item = Value>) -> Sanitized<ScheduleItem> {
    sanitize::<RawScheduleItem, _>(raw, RecordKind::ScheduleItem)
}

/// Decodes and validates each record on its own, so a wrong field type in
/// one record costs only that record.
fn sanitize<R, T>(raw: impl IntoIterator<Item = Value>, kind: RecordKind) -> Sanitized<T>
where
    R: DeserializeOwned,
    T: TryFrom<R, Error = LayoutError>,
{
    let mut out = Sanitized::default();

    for value in raw {
        let id = record_id(&value);
        let parsed = serde_json::from_value::<R>(value)
            .map_err(|e| LayoutError::InvalidRecord(e.to_string()))
            .and_then(T::try_from);
        match parsed {
            Ok(valid) => out.records.push(valid),
            Err(error) => {
                warn!(%kind, record_id = %id, %error, "excluding invalid record");
                out.warnings.push(DataWarning::new(kind, id, error));
            }
        }
    }

    debug!(
        %kind,
        kept = out.records.len(),
        dropped = out.warnings.len(),
        "sanitized records"
    );
    out
}

fn record_id(value: &Value) -> String {
    match value.get("_id").or_else(|| value.get("id")) {
        Some(Value::String(id)) => id.clone(),
        Some(Value::Null) | None => "<no id>".to_string(),
        Some(other) => other.to_string(),
    }
}
