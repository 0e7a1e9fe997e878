use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::error::LayoutError;
use crate::layout::dates::{self, ClockTime};
use crate::layout::timeline::TimeSpan;

/// Category of an academic event. Drives color and glyph only.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "kebab-case")]
pub enum EventType {
    Holiday,
    Exam,
    Meeting,
    Class,
    #[serde(alias = "assignment", alias = "assignment_deadline")]
    AssignmentDeadline,
    #[serde(alias = "fee_due", alias = "fee")]
    FeeDue,
    /// Also the landing spot for types this viewer does not know.
    #[serde(alias = "school_event", alias = "event", other)]
    #[default]
    SchoolEvent,
}

impl EventType {
    pub const ALL: [EventType; 7] = [
        EventType::Holiday,
        EventType::Exam,
        EventType::Meeting,
        EventType::Class,
        EventType::AssignmentDeadline,
        EventType::FeeDue,
        EventType::SchoolEvent,
    ];

    pub fn label(self) -> &'static str {
        match self {
            EventType::Holiday => "Holiday",
            EventType::Exam => "Exam",
            EventType::Meeting => "Meeting",
            EventType::Class => "Class",
            EventType::AssignmentDeadline => "Assignment",
            EventType::FeeDue => "Fee due",
            EventType::SchoolEvent => "Event",
        }
    }

    pub fn glyph(self) -> char {
        match self {
            EventType::Holiday => '*',
            EventType::Exam => '!',
            EventType::Meeting => '@',
            EventType::Class => '#',
            EventType::AssignmentDeadline => '>',
            EventType::FeeDue => '$',
            EventType::SchoolEvent => '+',
        }
    }

    /// The next type in [`EventType::ALL`], or `None` after the last one.
    pub fn cycle(current: Option<EventType>) -> Option<EventType> {
        match current {
            None => Some(Self::ALL[0]),
            Some(t) => {
                let idx = Self::ALL.iter().position(|x| *x == t).unwrap_or(0);
                Self::ALL.get(idx + 1).copied()
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Teacher,
    Student,
    Parent,
    #[serde(other)]
    Other,
}

/// A reference into one of the class, subject or teacher directories.
///
/// Unpopulated references arrive as a bare id string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RefRepr")]
pub struct NamedRef {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub section: Option<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RefRepr {
    Bare(String),
    Full {
        #[serde(rename = "_id", alias = "id")]
        id: String,
        #[serde(default)]
        name: String,
        #[serde(default)]
        section: Option<String>,
    },
}

impl From<RefRepr> for NamedRef {
    fn from(repr: RefRepr) -> Self {
        match repr {
            RefRepr::Bare(id) => NamedRef::new(id, ""),
            RefRepr::Full { id, name, section } => NamedRef { id, name, section },
        }
    }
}

impl NamedRef {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            section: None,
        }
    }

    pub fn display_name(&self) -> String {
        let name = if self.name.is_empty() { &self.id } else { &self.name };
        match self.section.as_deref() {
            Some(section) if !section.is_empty() => format!("{name} - {section}"),
            _ => name.clone(),
        }
    }
}

/// An event record as the directory service sends it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawEvent {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub start_date: String,
    pub end_date: String,
    #[serde(default)]
    pub event_type: EventType,
    #[serde(default)]
    pub is_all_day: bool,
    #[serde(default)]
    pub role_visibility: Vec<Role>,
    #[serde(default)]
    pub class_id: Option<NamedRef>,
    #[serde(default)]
    pub is_published: bool,
}

/// A validated event. `end >= start` always holds.
#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub event_type: EventType,
    pub is_all_day: bool,
    pub role_visibility: Vec<Role>,
    pub class: Option<NamedRef>,
    pub is_published: bool,
}

impl TryFrom<RawEvent> for Event {
    type Error = LayoutError;

    fn try_from(raw: RawEvent) -> Result<Self, Self::Error> {
        let mut start = dates::parse_civil_datetime(&raw.start_date)?;
        let mut end = dates::parse_civil_datetime(&raw.end_date)?;

        if end < start {
            return Err(LayoutError::range(&raw.start_date, &raw.end_date));
        }

        if raw.is_all_day {
            start = start.date().and_time(chrono::NaiveTime::MIN);
            end = end.date().and_time(chrono::NaiveTime::MIN);
        }

        Ok(Event {
            id: raw.id,
            title: raw.title,
            description: raw.description.filter(|d| !d.trim().is_empty()),
            start,
            end,
            event_type: raw.event_type,
            is_all_day: raw.is_all_day,
            role_visibility: raw.role_visibility,
            class: raw.class_id,
            is_published: raw.is_published,
        })
    }
}

impl Event {
    pub fn start_date(&self) -> NaiveDate {
        self.start.date()
    }

    pub fn end_date(&self) -> NaiveDate {
        self.end.date()
    }

    /// Whether the event's civil-date range covers `day`.
    pub fn occurs_on(&self, day: NaiveDate) -> bool {
        dates::day_in_range(day, self.start, self.end)
    }

    /// Number of civil days the event touches.
    pub fn span_days(&self) -> i64 {
        dates::days_between(self.start_date(), self.end_date()) + 1
    }

    /// Time-of-day span of this event on `day`, clipped to that day.
    ///
    /// All-day events and days outside the event have no span. Neither does
    /// the closing day of an event that ends exactly at its midnight.
    pub fn span_on(&self, day: NaiveDate) -> Option<TimeSpan> {
        if self.is_all_day || !self.occurs_on(day) {
            return None;
        }
        let ends_at_midnight = self.end.time() == NaiveTime::MIN;
        if ends_at_midnight && day == self.end_date() && day != self.start_date() {
            return None;
        }

        let start = if day == self.start_date() {
            ClockTime::of(self.start.time())
        } else {
            ClockTime::MIDNIGHT
        };
        let end = if day == self.end_date() {
            ClockTime::of(self.end.time())
        } else {
            ClockTime::END_OF_DAY
        };

        TimeSpan::new(start, end).ok()
    }

    pub fn duration_display(&self) -> String {
        if self.is_all_day {
            "All day".to_string()
        } else {
            format!("{} - {}", self.start.format("%H:%M"), self.end.format("%H:%M"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(start: &str, end: &str) -> RawEvent {
        RawEvent {
            id: "ev-1".to_string(),
            title: "Midterm".to_string(),
            description: None,
            start_date: start.to_string(),
            end_date: end.to_string(),
            event_type: EventType::Exam,
            is_all_day: false,
            role_visibility: vec![Role::Student],
            class_id: None,
            is_published: true,
        }
    }

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, d).unwrap()
    }

    #[test]
    fn decodes_directory_json() {
        let json = r#"{
            "_id": "65f0",
            "title": "Spring break",
            "startDate": "2024-03-25T00:00:00.000Z",
            "endDate": "2024-03-29T00:00:00.000Z",
            "eventType": "holiday",
            "isAllDay": true,
            "roleVisibility": ["student", "teacher"],
            "classId": { "_id": "c1", "name": "Grade 9", "section": "B" }
        }"#;
        let raw: RawEvent = serde_json::from_str(json).unwrap();
        let event = Event::try_from(raw).unwrap();

        assert_eq!(event.id, "65f0");
        assert_eq!(event.event_type, EventType::Holiday);
        assert_eq!(event.span_days(), 5);
        assert!(!event.is_published);
        assert_eq!(event.class.unwrap().display_name(), "Grade 9 - B");
    }

    #[test]
    fn legacy_type_names_are_accepted() {
        let t: EventType = serde_json::from_str("\"fee_due\"").unwrap();
        assert_eq!(t, EventType::FeeDue);
        let t: EventType = serde_json::from_str("\"assignment\"").unwrap();
        assert_eq!(t, EventType::AssignmentDeadline);
    }

    #[test]
    fn inverted_range_is_rejected() {
        let err = Event::try_from(raw("2024-03-05", "2024-03-04")).unwrap_err();
        assert!(matches!(err, LayoutError::InvalidRange { .. }));
    }

    #[test]
    fn malformed_date_is_rejected() {
        let err = Event::try_from(raw("tomorrow", "2024-03-04")).unwrap_err();
        assert_eq!(err, LayoutError::InvalidDate("tomorrow".to_string()));
    }

    #[test]
    fn span_is_clipped_per_day() {
        let ev = Event::try_from(raw("2024-03-04T22:00", "2024-03-06T01:30")).unwrap();

        let first = ev.span_on(day(4)).unwrap();
        assert_eq!((first.start.to_string(), first.end.to_string()), ("22:00".into(), "24:00".into()));

        let middle = ev.span_on(day(5)).unwrap();
        assert_eq!(middle.duration_minutes(), 24 * 60);

        let last = ev.span_on(day(6)).unwrap();
        assert_eq!(last.end.to_string(), "01:30");

        assert!(ev.span_on(day(7)).is_none());
    }

    #[test]
    fn ending_at_midnight_leaves_the_next_day_empty() {
        let ev = Event::try_from(raw("2024-03-04T22:00", "2024-03-05T00:00")).unwrap();

        let evening = ev.span_on(day(4)).unwrap();
        assert_eq!(evening.start.to_string(), "22:00");
        assert_eq!(evening.end, ClockTime::END_OF_DAY);
        assert!(ev.span_on(day(5)).is_none());
    }

    #[test]
    fn deadline_keeps_an_empty_span() {
        let ev = Event::try_from(raw("2024-03-04T09:00", "2024-03-04T09:00")).unwrap();
        assert!(ev.occurs_on(day(4)));
        assert_eq!(ev.span_on(day(4)).unwrap().duration_minutes(), 0);
    }

    #[test]
    fn type_cycle_wraps_to_none() {
        let mut current = None;
        let mut seen = 0;
        loop {
            current = EventType::cycle(current);
            if current.is_none() {
                break;
            }
            seen += 1;
        }
        assert_eq!(seen, EventType::ALL.len());
    }
}
