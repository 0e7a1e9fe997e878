//! Conjunctive filters and text search applied before any builder runs.

use std::collections::HashMap;
use std::hash::Hash;

use crate::calendar::{Event, EventType, ScheduleItem};

/// Identifier facets a record may carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Facet {
    Subject,
    Teacher,
    Class,
}

pub trait Filterable {
    /// Whether this kind of record carries `facet` at all.
    fn has_facet(&self, facet: Facet) -> bool;

    fn facet_id(&self, facet: Facet) -> Option<&str>;

    /// `None` when this kind of record has no event type.
    fn event_type(&self) -> Option<EventType> {
        None
    }

    /// Text fields searched by [`Filters::search_text`].
    fn search_fields(&self) -> Vec<&str>;
}

impl Filterable for ScheduleItem {
    fn has_facet(&self, _facet: Facet) -> bool {
        true
    }

    fn facet_id(&self, facet: Facet) -> Option<&str> {
        let named = match facet {
            Facet::Subject => self.subject.as_ref(),
            Facet::Teacher => self.teacher.as_ref(),
            Facet::Class => self.class.as_ref(),
        };
        named.map(|n| n.id.as_str())
    }

    fn search_fields(&self) -> Vec<&str> {
        let mut fields = Vec::with_capacity(4);
        if let Some(subject) = &self.subject {
            fields.push(subject.name.as_str());
        }
        if let Some(teacher) = &self.teacher {
            fields.push(teacher.name.as_str());
        }
        if let Some(room) = &self.room {
            fields.push(room.as_str());
        }
        if let Some(class) = &self.class {
            fields.push(class.name.as_str());
        }
        fields
    }
}

impl Filterable for Event {
    fn has_facet(&self, facet: Facet) -> bool {
        facet == Facet::Class
    }

    fn facet_id(&self, facet: Facet) -> Option<&str> {
        match facet {
            Facet::Class => self.class.as_ref().map(|c| c.id.as_str()),
            Facet::Subject | Facet::Teacher => None,
        }
    }

    fn event_type(&self) -> Option<EventType> {
        Some(self.event_type)
    }

    fn search_fields(&self) -> Vec<&str> {
        let mut fields = vec![self.title.as_str()];
        if let Some(description) = &self.description {
            fields.push(description.as_str());
        }
        if let Some(class) = &self.class {
            fields.push(class.name.as_str());
        }
        fields
    }
}

/// Active filters. Every one that is set must match.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Filters {
    pub subject_id: Option<String>,
    pub teacher_id: Option<String>,
    pub class_id: Option<String>,
    pub event_type: Option<EventType>,
    pub search_text: Option<String>,
}

impl Filters {
    pub fn is_empty(&self) -> bool {
        self.subject_id.is_none()
            && self.teacher_id.is_none()
            && self.class_id.is_none()
            && self.event_type.is_none()
            && self.needle().is_none()
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn matches<T: Filterable + ?Sized>(&self, item: &T) -> bool {
        let facets = [
            (Facet::Subject, &self.subject_id),
            (Facet::Teacher, &self.teacher_id),
            (Facet::Class, &self.class_id),
        ];
        for (facet, wanted) in facets {
            if let Some(wanted) = wanted {
                if item.has_facet(facet) && item.facet_id(facet) != Some(wanted.as_str()) {
                    return false;
                }
            }
        }

        if let (Some(wanted), Some(actual)) = (self.event_type, item.event_type()) {
            if wanted != actual {
                return false;
            }
        }

        match self.needle() {
            Some(needle) => item
                .search_fields()
                .iter()
                .any(|field| field.to_lowercase().contains(&needle)),
            None => true,
        }
    }

    /// A new filtered view; the source is left untouched.
    pub fn apply<'a, T: Filterable + 'a>(
        &self,
        items: impl IntoIterator<Item = &'a T>,
    ) -> Vec<&'a T> {
        items.into_iter().filter(|item| self.matches(*item)).collect()
    }

    /// Filter each bucket of a per-day collection independently.
    pub fn apply_per_day<'a, K, T>(&self, grouped: &'a HashMap<K, Vec<T>>) -> HashMap<K, Vec<&'a T>>
    where
        K: Eq + Hash + Clone,
        T: Filterable,
    {
        grouped
            .iter()
            .map(|(day, items)| (day.clone(), self.apply(items)))
            .collect()
    }

    fn needle(&self) -> Option<String> {
        self.search_text
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_lowercase)
    }
}

#[cfg(test)]
mod tests {
    use chrono::Weekday;

    use super::*;
    use crate::calendar::{NamedRef, RawEvent, RawScheduleItem};

    fn lesson(id: &str, subject: (&str, &str), teacher: (&str, &str), room: &str) -> ScheduleItem {
        ScheduleItem::try_from(RawScheduleItem {
            id: id.to_string(),
            day_of_week: "Monday".to_string(),
            start_time: "09:00".to_string(),
            end_time: "10:00".to_string(),
            subject_id: Some(NamedRef::new(subject.0, subject.1)),
            teacher_id: Some(NamedRef::new(teacher.0, teacher.1)),
            class_id: Some(NamedRef::new("c-9", "Grade 9")),
            room: Some(room.to_string()),
        })
        .unwrap()
    }

    fn lessons() -> Vec<ScheduleItem> {
        vec![
            lesson("1", ("sub-math", "Mathematics"), ("t-1", "A. Rivera"), "101"),
            lesson("2", ("sub-phy", "Physics"), ("t-2", "B. Chen"), "Lab 2"),
            lesson("3", ("sub-math", "Mathematics"), ("t-2", "B. Chen"), "102"),
        ]
    }

    fn ids(items: &[&ScheduleItem]) -> Vec<String> {
        items.iter().map(|i| i.id.clone()).collect()
    }

    fn event(id: &str, event_type: EventType) -> Event {
        Event::try_from(RawEvent {
            id: id.to_string(),
            title: format!("{id} title"),
            description: Some("Bring a calculator".to_string()),
            start_date: "2024-06-03".to_string(),
            end_date: "2024-06-03".to_string(),
            event_type,
            is_all_day: true,
            role_visibility: Vec::new(),
            class_id: None,
            is_published: true,
        })
        .unwrap()
    }

    #[test]
    fn search_is_case_insensitive_substring() {
        let items = lessons();
        let filters = Filters {
            search_text: Some("Math".to_string()),
            ..Filters::default()
        };
        assert_eq!(ids(&filters.apply(&items)), ["1", "3"]);

        let filters = Filters {
            search_text: Some("lab".to_string()),
            ..Filters::default()
        };
        assert_eq!(ids(&filters.apply(&items)), ["2"]);
    }

    #[test]
    fn filters_are_conjunctive() {
        let items = lessons();
        let filters = Filters {
            subject_id: Some("sub-math".to_string()),
            teacher_id: Some("t-2".to_string()),
            ..Filters::default()
        };
        assert_eq!(ids(&filters.apply(&items)), ["3"]);

        let filters = Filters {
            subject_id: Some("sub-math".to_string()),
            search_text: Some("chen".to_string()),
            ..Filters::default()
        };
        assert_eq!(ids(&filters.apply(&items)), ["3"]);
    }

    #[test]
    fn filtering_is_idempotent() {
        let items = lessons();
        let filters = Filters {
            teacher_id: Some("t-2".to_string()),
            search_text: Some("a".to_string()),
            ..Filters::default()
        };
        let once = filters.apply(&items);
        let twice = filters.apply(once.iter().copied());
        assert_eq!(ids(&once), ids(&twice));
        assert_eq!(items.len(), 3);
    }

    #[test]
    fn blank_search_is_unset() {
        let items = lessons();
        let filters = Filters {
            search_text: Some("   ".to_string()),
            ..Filters::default()
        };
        assert!(filters.is_empty());
        assert_eq!(filters.apply(&items).len(), 3);
    }

    #[test]
    fn facets_a_record_lacks_are_ignored() {
        let events = [event("exam", EventType::Exam), event("trip", EventType::SchoolEvent)];
        let filters = Filters {
            subject_id: Some("sub-math".to_string()),
            event_type: Some(EventType::Exam),
            ..Filters::default()
        };
        let kept: Vec<_> = filters.apply(&events).iter().map(|e| e.id.clone()).collect();
        assert_eq!(kept, ["exam"]);

        // Schedule items carry no event type.
        assert_eq!(filters.apply(&lessons()).len(), 2);
    }

    #[test]
    fn events_search_title_and_description() {
        let events = [event("exam", EventType::Exam)];
        let filters = Filters {
            search_text: Some("CALCULATOR".to_string()),
            ..Filters::default()
        };
        assert_eq!(filters.apply(&events).len(), 1);
    }

    #[test]
    fn per_day_filtering_keeps_every_bucket() {
        let mut grouped: HashMap<Weekday, Vec<ScheduleItem>> = HashMap::new();
        grouped.insert(Weekday::Mon, lessons());
        grouped.insert(Weekday::Tue, Vec::new());

        let filters = Filters {
            subject_id: Some("sub-phy".to_string()),
            ..Filters::default()
        };
        let filtered = filters.apply_per_day(&grouped);
        assert_eq!(ids(&filtered[&Weekday::Mon]), ["2"]);
        assert!(filtered[&Weekday::Tue].is_empty());
        assert_eq!(grouped[&Weekday::Mon].len(), 3);
    }
}
