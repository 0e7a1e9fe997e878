use std::collections::HashMap;
use std::path::Path;

use chrono::{NaiveDate, Weekday};
use color_eyre::eyre::{Result, WrapErr};
use serde::Deserialize;
use tracing::info;

use super::event::{Event, NamedRef};
use super::sanitize::{sanitize_events, sanitize_schedule};
use super::schedule::ScheduleItem;
use crate::error::DataWarning;
use crate::layout::dates;

/// Already-fetched event and schedule collections.
///
/// Every record handed out has been validated; the ones that failed are
/// available through [`Directory::warnings`].
pub trait Directory {
    /// Events whose civil-date range intersects `[start, end]`, by start.
    fn events_in_range(&self, start: NaiveDate, end: NaiveDate) -> Vec<Event>;

    fn schedule_flat(&self) -> Vec<ScheduleItem>;

    fn subjects(&self) -> &[NamedRef];

    fn teachers(&self) -> &[NamedRef];

    fn classes(&self) -> &[NamedRef];

    fn warnings(&self) -> &[DataWarning];

    fn events_for_date(&self, date: NaiveDate) -> Vec<Event> {
        self.events_in_range(date, date)
    }

    fn events_for_month(&self, year: i32, month: u32) -> Vec<Event> {
        let Ok(first) = dates::first_of_month(year, month) else {
            return Vec::new();
        };
        let Ok(len) = dates::days_in_month(year, month) else {
            return Vec::new();
        };
        self.events_in_range(first, first + chrono::Duration::days(len as i64 - 1))
    }

    fn schedule_grouped_by_day(&self) -> HashMap<Weekday, Vec<ScheduleItem>> {
        let mut grouped: HashMap<Weekday, Vec<ScheduleItem>> = HashMap::new();
        for item in self.schedule_flat() {
            grouped.entry(item.day_of_week).or_default().push(item);
        }
        grouped
    }
}

/// Wire shape of a data file.
///
/// Events and schedule rows stay untyped here and are decoded one by one
/// in [`sanitize_events`] and [`sanitize_schedule`].
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Document {
    pub events: Vec<serde_json::Value>,
    pub schedule: Vec<serde_json::Value>,
    pub subjects: Vec<NamedRef>,
    pub teachers: Vec<NamedRef>,
    pub classes: Vec<NamedRef>,
}

/// In-memory directory backed by a JSON document.
#[derive(Debug, Default)]
pub struct Store {
    events: Vec<Event>,
    schedule: Vec<ScheduleItem>,
    subjects: Vec<NamedRef>,
    teachers: Vec<NamedRef>,
    classes: Vec<NamedRef>,
    warnings: Vec<DataWarning>,
}

impl Store {
    pub fn open(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .wrap_err_with(|| format!("failed to read data file {}", path.display()))?;
        let store = Self::from_json(&content)
            .wrap_err_with(|| format!("failed to parse data file {}", path.display()))?;

        info!(
            file = %path.display(),
            events = store.events.len(),
            schedule = store.schedule.len(),
            warnings = store.warnings.len(),
            "loaded calendar data"
        );
        Ok(store)
    }

    pub fn from_json(content: &str) -> Result<Self> {
        let doc: Document = serde_json::from_str(content)?;
        Ok(Self::from_document(doc))
    }

    pub fn from_document(doc: Document) -> Self {
        let events = sanitize_events(doc.events);
        let schedule = sanitize_schedule(doc.schedule);

        let mut warnings = events.warnings;
        warnings.extend(schedule.warnings);

        Self {
            events: events.records,
            schedule: schedule.records,
            subjects: doc.subjects,
            teachers: doc.teachers,
            classes: doc.classes,
            warnings,
        }
    }
}

impl Directory for Store {
    fn events_in_range(&self, start: NaiveDate, end: NaiveDate) -> Vec<Event> {
        let mut events: Vec<Event> = self
            .events
            .iter()
            .filter(|e| e.start_date() <= end && e.end_date() >= start)
            .cloned()
            .collect();

        events.sort_by_key(|e| e.start);
        events
    }

    fn schedule_flat(&self) -> Vec<ScheduleItem> {
        self.schedule.clone()
    }

    fn subjects(&self) -> &[NamedRef] {
        &self.subjects
    }

    fn teachers(&self) -> &[NamedRef] {
        &self.teachers
    }

    fn classes(&self) -> &[NamedRef] {
        &self.classes
    }

    fn warnings(&self) -> &[DataWarning] {
        &self.warnings
    }
}
