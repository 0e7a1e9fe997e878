use std::collections::BTreeMap;

use chrono::{NaiveDate, NaiveDateTime};
use serde::Deserialize;

use crate::calendar::{Event, EventType};

/// How date groups are ordered in the list view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GroupOrder {
    /// Groups and their events sorted by start date.
    #[default]
    Chronological,
    /// Groups appear in the order their first event was seen.
    Insertion,
}

#[derive(Debug, Clone)]
pub struct DateGroup<'a> {
    pub date: NaiveDate,
    pub events: Vec<&'a Event>,
}

impl DateGroup<'_> {
    /// Display key, e.g. "Thursday, February 29, 2024".
    pub fn key(&self) -> String {
        self.date.format("%A, %B %-d, %Y").to_string()
    }
}

/// Group events under the civil date they start on.
pub fn group_by_date<'a>(
    events: impl IntoIterator<Item = &'a Event>,
    event_type: Option<EventType>,
    order: GroupOrder,
) -> Vec<DateGroup<'a>> {
    let mut events: Vec<&Event> = events
        .into_iter()
        .filter(|e| event_type.map_or(true, |t| e.event_type == t))
        .collect();

    if order == GroupOrder::Chronological {
        events.sort_by_key(|e| e.start);
    }

    let mut groups: Vec<DateGroup<'a>> = Vec::new();
    for event in events {
        let date = event.start_date();
        match groups.iter_mut().find(|g| g.date == date) {
            Some(group) => group.events.push(event),
            None => groups.push(DateGroup {
                date,
                events: vec![event],
            }),
        }
    }
    groups
}

/// The next `limit` events that have not ended before `now`.
pub fn upcoming<'a>(
    events: impl IntoIterator<Item = &'a Event>,
    now: NaiveDateTime,
    limit: usize,
) -> Vec<&'a Event> {
    let mut pending: Vec<&Event> = events
        .into_iter()
        .filter(|e| {
            if e.is_all_day {
                e.end_date() >= now.date()
            } else {
                e.end >= now
            }
        })
        .collect();
    pending.sort_by_key(|e| e.start);
    pending.truncate(limit);
    pending
}

pub fn count_by_type<'a>(events: impl IntoIterator<Item = &'a Event>) -> BTreeMap<EventType, usize> {
    let mut counts = BTreeMap::new();
    for event in events {
        *counts.entry(event.event_type).or_insert(0) += 1;
    }
    counts
}
