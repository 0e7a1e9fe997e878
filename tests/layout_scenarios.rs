use std::collections::HashMap;

use academic_calendar::calendar::{Directory, Store};
use academic_calendar::layout::dates::{self, ClockTime};
use academic_calendar::layout::list::{self, GroupOrder};
use academic_calendar::layout::timeline::{self, TimelineOptions};
use academic_calendar::layout::{build_month_grid, build_week_grid, Filters};
use academic_calendar::{LayoutError, RecordKind};
use chrono::{NaiveDate, Weekday};

const SCHOOL: &str = r#"{
    "events": [
        { "_id": "ev-leap", "title": "Science fair", "eventType": "school-event",
          "startDate": "2024-02-28", "endDate": "2024-03-01", "isAllDay": true },
        { "_id": "ev-exam", "title": "Algebra midterm", "eventType": "exam",
          "startDate": "2024-02-12T09:00:00", "endDate": "2024-02-12T11:00:00",
          "classId": { "_id": "cls-10a", "name": "Grade 10", "section": "A" } },
        { "_id": "ev-fee", "title": "Term fees", "eventType": "fee-due",
          "startDate": "2024-02-20T00:00:00Z", "endDate": "2024-02-20T00:00:00Z" },
        { "_id": "ev-bad", "title": "Backwards", "eventType": "meeting",
          "startDate": "2024-02-15T10:00", "endDate": "2024-02-14T10:00" }
    ],
    "schedule": [
        { "_id": "sch-math", "dayOfWeek": "Monday", "startTime": "09:00", "endTime": "10:30",
          "subjectId": { "_id": "sub-math", "name": "Mathematics" },
          "teacherId": { "_id": "t-okafor", "name": "Ms. Okafor" }, "room": "B12" },
        { "_id": "sch-bio", "dayOfWeek": "Monday", "startTime": "10:30", "endTime": "11:00",
          "subjectId": { "_id": "sub-bio", "name": "Biology" },
          "teacherId": { "_id": "t-lind", "name": "Mr. Lind" }, "room": "Lab 2" },
        { "_id": "sch-hist", "dayOfWeek": "Tuesday", "startTime": "13:00", "endTime": "14:00",
          "subjectId": { "_id": "sub-hist", "name": "History" } },
        { "_id": "sch-bad", "dayOfWeek": "Monday", "startTime": "25:00", "endTime": "26:00" },
        { "_id": "sch-empty", "dayOfWeek": "Friday", "startTime": "10:00", "endTime": "10:00" }
    ]
}"#;

fn store() -> Store {
    Store::from_json(SCHOOL).unwrap()
}

fn group_dates(groups: &[list::DateGroup<'_>]) -> Vec<NaiveDate> {
    groups.iter().map(|g| g.date).collect()
}

fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[test]
fn invalid_records_become_warnings() {
    let store = store();
    let warnings = store.warnings();
    assert_eq!(warnings.len(), 3);

    let bad_event = warnings.iter().find(|w| w.record_id == "ev-bad").unwrap();
    assert_eq!(bad_event.kind, RecordKind::Event);
    assert!(matches!(bad_event.error, LayoutError::InvalidRange { .. }));

    let bad_time = warnings.iter().find(|w| w.record_id == "sch-bad").unwrap();
    assert!(matches!(bad_time.error, LayoutError::InvalidTimeFormat(_)));

    let empty = warnings.iter().find(|w| w.record_id == "sch-empty").unwrap();
    assert_eq!(empty.kind, RecordKind::ScheduleItem);
    assert!(matches!(empty.error, LayoutError::InvalidRange { .. }));
}

#[test]
fn leap_february_grid() {
    let store = store();
    let events = store.events_for_month(2024, 2);
    let grid = build_month_grid(2024, 2, &events, day(2024, 2, 29), false).unwrap();

    assert_eq!(grid.cells.len(), 42);
    assert_eq!(grid.current_month_cells().count(), 29);
    assert_eq!(grid.cells.iter().filter(|c| c.is_today).count(), 1);

    let holding: Vec<NaiveDate> = grid
        .cells
        .iter()
        .filter(|c| c.events.iter().any(|e| e.id == "ev-leap"))
        .map(|c| c.date)
        .collect();
    assert_eq!(holding, vec![day(2024, 2, 28), day(2024, 2, 29)]);

    // Mar 1 is a padding cell and stays empty by default
    let mar1 = grid.cell(day(2024, 3, 1)).unwrap();
    assert!(!mar1.is_current_month);
    assert!(mar1.events.is_empty());

    let march_events = store.events_for_month(2024, 3);
    let march = build_month_grid(2024, 3, &march_events, day(2024, 2, 29), false).unwrap();
    assert!(march
        .cell(day(2024, 3, 1))
        .unwrap()
        .events
        .iter()
        .any(|e| e.id == "ev-leap"));
}

#[test]
fn month_buckets_count_every_event_day() {
    let store = store();
    let events = store.events_for_month(2024, 2);
    let grid = build_month_grid(2024, 2, &events, day(2024, 2, 1), false).unwrap();

    let placed: usize = grid.current_month_cells().map(|c| c.events.len()).sum();
    let first = day(2024, 2, 1);
    let last = day(2024, 2, 29);
    let expected: usize = events
        .iter()
        .map(|e| {
            let from = e.start_date().max(first);
            let to = e.end_date().min(last);
            (dates::days_between(from, to) + 1) as usize
        })
        .sum();
    assert_eq!(placed, expected);
}

#[test]
fn single_day_event_lands_in_one_bucket_everywhere() {
    let store = store();
    let events = store.events_for_month(2024, 2);
    let exam = events.iter().find(|e| e.id == "ev-exam").unwrap();

    let grid = build_month_grid(2024, 2, [exam], day(2024, 2, 1), true).unwrap();
    assert_eq!(grid.cells.iter().filter(|c| !c.events.is_empty()).count(), 1);

    let week = build_week_grid(day(2024, 2, 14), [exam], day(2024, 2, 1));
    assert_eq!(week.week_start, day(2024, 2, 11));
    assert_eq!(week.days.iter().filter(|d| !d.events.is_empty()).count(), 1);
    assert_eq!(week.column(Weekday::Mon).events.len(), 1);

    let groups = list::group_by_date([exam], None, GroupOrder::Chronological);
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].key(), "Monday, February 12, 2024");
}

#[test]
fn monday_timeline_places_lessons_proportionally() {
    let store = store();
    let grouped = store.schedule_grouped_by_day();
    let monday = &grouped[&Weekday::Mon];
    assert_eq!(monday.len(), 2);

    let now = ClockTime::from_hm(10, 0).unwrap();
    let layout = timeline::layout_timeline(monday, now, &TimelineOptions::default());

    assert_eq!((layout.window.start_hour, layout.window.end_hour), (8, 12));
    let math = &layout.items[0];
    assert_eq!(math.item.id, "sch-math");
    assert_eq!(math.top_percent, 25.0);
    assert_eq!(math.height_percent, 37.5);
    assert!(math.status.is_now);

    let bio = &layout.items[1];
    assert_eq!(bio.top_percent, 62.5);
    // 30 minutes is 12.5%, above the floor
    assert_eq!(bio.height_percent, 12.5);
    assert!(!bio.status.is_now && !bio.status.is_past);

    assert_eq!(layout.now_marker, Some(50.0));
}

#[test]
fn search_for_math_ignores_unset_facets() {
    let store = store();
    let schedule = store.schedule_flat();
    let filters = Filters {
        search_text: Some("Math".into()),
        ..Filters::default()
    };

    let hits = filters.apply(&schedule);
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].id, "sch-math");

    // Same predicate on an already-filtered view changes nothing
    let again = filters.apply(hits.iter().copied());
    assert_eq!(again.len(), 1);
}

#[test]
fn per_day_filters_keep_buckets_consistent() {
    let store = store();
    let grouped = store.schedule_grouped_by_day();
    let filters = Filters {
        teacher_id: Some("t-lind".into()),
        ..Filters::default()
    };

    let filtered: HashMap<Weekday, Vec<_>> = filters.apply_per_day(&grouped);
    assert_eq!(filtered[&Weekday::Mon].len(), 1);
    assert_eq!(filtered[&Weekday::Mon][0].id, "sch-bio");
    assert!(filtered[&Weekday::Tue].is_empty());
    // The source collection is untouched
    assert_eq!(grouped[&Weekday::Mon].len(), 2);
}

#[test]
fn class_filter_reaches_events() {
    let store = store();
    let events = store.events_for_month(2024, 2);
    let filters = Filters {
        class_id: Some("cls-10a".into()),
        ..Filters::default()
    };

    let hits = filters.apply(&events);
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].id, "ev-exam");
    assert_eq!(hits[0].class.as_ref().unwrap().display_name(), "Grade 10 - A");
}

#[test]
fn insertion_order_is_available_on_request() {
    let store = store();
    let mut events = store.events_for_month(2024, 2);
    events.reverse();

    let sorted = list::group_by_date(&events, None, GroupOrder::Chronological);
    let as_given = list::group_by_date(&events, None, GroupOrder::Insertion);

    assert_eq!(
        group_dates(&sorted),
        vec![day(2024, 2, 12), day(2024, 2, 20), day(2024, 2, 28)]
    );
    assert_eq!(
        group_dates(&as_given),
        vec![day(2024, 2, 28), day(2024, 2, 20), day(2024, 2, 12)]
    );
}
