use chrono::Weekday;
use serde::{Deserialize, Serialize};

use crate::error::LayoutError;
use crate::layout::dates::ClockTime;
use crate::layout::timeline::TimeSpan;

use super::event::NamedRef;

/// A weekly class-schedule row as the directory service sends it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawScheduleItem {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    pub day_of_week: String,
    pub start_time: String,
    pub end_time: String,
    #[serde(default)]
    pub subject_id: Option<NamedRef>,
    #[serde(default)]
    pub teacher_id: Option<NamedRef>,
    #[serde(default)]
    pub class_id: Option<NamedRef>,
    #[serde(default)]
    pub room: Option<String>,
}

/// A validated schedule row. `end > start` always holds.
#[derive(Debug, Clone, PartialEq)]
pub struct ScheduleItem {
    pub id: String,
    pub day_of_week: Weekday,
    pub span: TimeSpan,
    pub subject: Option<NamedRef>,
    pub teacher: Option<NamedRef>,
    pub class: Option<NamedRef>,
    pub room: Option<String>,
}

impl TryFrom<RawScheduleItem> for ScheduleItem {
    type Error = LayoutError;

    fn try_from(raw: RawScheduleItem) -> Result<Self, Self::Error> {
        let day_of_week = raw
            .day_of_week
            .trim()
            .parse::<Weekday>()
            .map_err(|_| LayoutError::UnknownWeekday(raw.day_of_week.clone()))?;

        let start: ClockTime = raw.start_time.parse()?;
        let end: ClockTime = raw.end_time.parse()?;
        if end <= start {
            return Err(LayoutError::range(&raw.start_time, &raw.end_time));
        }

        Ok(ScheduleItem {
            id: raw.id,
            day_of_week,
            span: TimeSpan::new(start, end)?,
            subject: raw.subject_id,
            teacher: raw.teacher_id,
            class: raw.class_id,
            room: raw.room.filter(|r| !r.trim().is_empty()),
        })
    }
}

impl ScheduleItem {
    pub fn title(&self) -> &str {
        self.subject
            .as_ref()
            .map(|s| s.name.as_str())
            .filter(|name| !name.is_empty())
            .unwrap_or("Untitled")
    }
}
