use chrono::{Datelike, NaiveDate, Weekday};

use crate::calendar::{Event, ScheduleItem};

use super::dates;

#[derive(Debug, Clone)]
pub struct DayColumn<'a> {
    pub date: NaiveDate,
    pub weekday: Weekday,
    pub is_today: bool,
    pub events: Vec<&'a Event>,
}

/// Seven consecutive days starting on a Sunday.
#[derive(Debug, Clone)]
pub struct WeekGrid<'a> {
    pub week_start: NaiveDate,
    pub days: Vec<DayColumn<'a>>,
}

impl<'a> WeekGrid<'a> {
    pub fn column(&self, weekday: Weekday) -> &DayColumn<'a> {
        &self.days[weekday.num_days_from_sunday() as usize]
    }

    pub fn week_end(&self) -> NaiveDate {
        self.week_start + chrono::Duration::days(6)
    }
}

/// Build the week containing `anchor`.
pub fn build_week_grid<'a>(
    anchor: NaiveDate,
    events: impl IntoIterator<Item = &'a Event>,
    today: NaiveDate,
) -> WeekGrid<'a> {
    let events: Vec<&Event> = events.into_iter().collect();
    let week_start = dates::week_start(anchor);

    let days = (0..7)
        .map(|offset| {
            let date = week_start + chrono::Duration::days(offset);
            DayColumn {
                date,
                weekday: date.weekday(),
                is_today: date == today,
                events: events.iter().copied().filter(|e| e.occurs_on(date)).collect(),
            }
        })
        .collect();

    WeekGrid { week_start, days }
}

/// Weekly class schedule bucketed by weekday, Sunday first.
#[derive(Debug, Clone, Default)]
pub struct ScheduleWeek<'a> {
    days: [Vec<&'a ScheduleItem>; 7],
}

impl<'a> ScheduleWeek<'a> {
    pub fn day(&self, weekday: Weekday) -> &[&'a ScheduleItem] {
        &self.days[weekday.num_days_from_sunday() as usize]
    }

    pub fn iter(&self) -> impl Iterator<Item = (Weekday, &[&'a ScheduleItem])> {
        self.days
            .iter()
            .enumerate()
            .map(|(i, items)| (dates::weekday_from_sunday(i as u32), items.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.days.iter().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Bucket schedule items by weekday, each day sorted by start time.
pub fn group_schedule_by_day<'a>(
    items: impl IntoIterator<Item = &'a ScheduleItem>,
) -> ScheduleWeek<'a> {
    let mut week = ScheduleWeek::default();
    for item in items {
        week.days[item.day_of_week.num_days_from_sunday() as usize].push(item);
    }
    for day in &mut week.days {
        day.sort_by_key(|item| item.span.start);
    }
    week
}
