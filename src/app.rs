use std::sync::Arc;
use std::time::Duration;

use chrono::{Datelike, NaiveDate};
use tracing::{debug, info};

use crate::calendar::{Directory, Event, EventType, NamedRef, ScheduleItem};
use crate::event::Action;
use crate::layout::dates::{self, ClockTime};
use crate::layout::list::{self, DateGroup};
use crate::layout::month::{self, MonthGrid};
use crate::layout::timeline::{self, EventOnDay, Timeline, TimelineItem, TimelineMode, TimeSpan};
use crate::layout::week::{self, WeekGrid};
use crate::layout::{Clock, Filters, LayoutOptions, NowSample, NowSampler, SamplerHandle};

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ViewMode {
    Month,
    Week,
    List,
    Timeline,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Search,
}

/// One row on the day timeline: a scheduled lesson or a timed event.
#[derive(Debug, Clone, Copy)]
pub enum AgendaItem<'a> {
    Lesson(&'a ScheduleItem),
    Event(EventOnDay<'a>),
}

impl AgendaItem<'_> {
    pub fn title(&self) -> &str {
        match self {
            AgendaItem::Lesson(item) => item.title(),
            AgendaItem::Event(e) => &e.event.title,
        }
    }

    pub fn detail(&self) -> Option<String> {
        match self {
            AgendaItem::Lesson(item) => {
                let parts: Vec<&str> = [
                    item.teacher.as_ref().map(|t| t.name.as_str()),
                    item.room.as_deref(),
                ]
                .into_iter()
                .flatten()
                .collect();
                (!parts.is_empty()).then(|| parts.join(" \u{b7} "))
            }
            AgendaItem::Event(e) => Some(e.event.event_type.label().to_string()),
        }
    }

    pub fn accent_key(&self) -> &str {
        match self {
            AgendaItem::Lesson(item) => item
                .subject
                .as_ref()
                .map(|s| s.id.as_str())
                .unwrap_or(item.id.as_str()),
            AgendaItem::Event(e) => &e.event.id,
        }
    }
}

impl TimelineItem for AgendaItem<'_> {
    fn span(&self) -> TimeSpan {
        match self {
            AgendaItem::Lesson(item) => item.span,
            AgendaItem::Event(e) => e.span,
        }
    }
}

pub struct App {
    pub running: bool,
    pub view_mode: ViewMode,
    pub input_mode: InputMode,
    pub timeline_mode: TimelineMode,
    pub selected_date: NaiveDate,
    pub today: NaiveDate,
    pub now: NowSample,
    pub filters: Filters,
    pub search_input: String,
    pub options: LayoutOptions,
    pub events: Vec<Event>,
    pub schedule: Vec<ScheduleItem>,
    pub list_scroll: usize,
    pub show_help: bool,
    pub status_message: Option<String>,
    loaded_month: Option<(i32, u32)>,
    directory: Box<dyn Directory>,
    clock: Arc<dyn Clock>,
    sampler: Option<SamplerHandle>,
}

impl App {
    pub fn new(directory: Box<dyn Directory>, clock: Arc<dyn Clock>, options: LayoutOptions) -> Self {
        let now = NowSample::take(clock.as_ref());

        let mut app = Self {
            running: true,
            view_mode: ViewMode::Month,
            input_mode: InputMode::Normal,
            timeline_mode: TimelineMode::default(),
            selected_date: now.date,
            today: now.date,
            now,
            filters: Filters::default(),
            search_input: String::new(),
            options,
            events: Vec::new(),
            schedule: directory.schedule_flat(),
            list_scroll: 0,
            show_help: false,
            status_message: None,
            loaded_month: None,
            directory,
            clock,
            sampler: None,
        };

        app.refresh_events();
        info!(
            events = app.events.len(),
            schedule = app.schedule.len(),
            warnings = app.warning_count(),
            "calendar ready"
        );
        app
    }

    pub fn warning_count(&self) -> usize {
        self.directory.warnings().len()
    }

    /// Fetch everything the month grid around the selected date can show.
    pub fn refresh_events(&mut self) {
        let year = self.selected_date.year();
        let month = self.selected_date.month();
        let first = self.selected_date.with_day(1).unwrap_or(self.selected_date);
        let grid_start = dates::week_start(first);
        let grid_end = grid_start + chrono::Duration::days(month::GRID_CELLS as i64 - 1);

        self.events = self.directory.events_in_range(grid_start, grid_end);
        self.loaded_month = Some((year, month));
        debug!(year, month, events = self.events.len(), "refreshed events");
    }

    pub fn set_view_mode(&mut self, mode: ViewMode) {
        if self.view_mode == mode {
            return;
        }
        self.view_mode = mode;
        self.list_scroll = 0;

        if mode == ViewMode::Timeline {
            self.start_sampler();
        } else {
            self.stop_sampler();
        }
    }

    fn start_sampler(&mut self) {
        let cadence = Duration::from_secs(self.options.now_refresh_secs);
        let handle = NowSampler::spawn(self.clock.clone(), cadence);
        self.apply_sample(handle.current());
        self.sampler = Some(handle);
    }

    fn stop_sampler(&mut self) {
        if let Some(handle) = self.sampler.take() {
            handle.stop();
        }
    }

    pub fn sampler_running(&self) -> bool {
        self.sampler.is_some()
    }

    /// Pick up a new "now" sample if the sampler published one, and roll
    /// `today` over when the clock's date has moved.
    pub fn tick(&mut self) -> bool {
        let mut changed = false;
        if let Some(handle) = self.sampler.as_mut() {
            if handle.has_changed() {
                let sample = handle.mark_seen();
                self.apply_sample(sample);
                changed = true;
            }
        }

        // Without a running sampler the date still has to roll over
        if self.clock.today() != self.today {
            let sample = NowSample::take(self.clock.as_ref());
            debug!(today = %sample.date, "date changed");
            self.apply_sample(sample);
            changed = true;
        }
        changed
    }

    fn apply_sample(&mut self, sample: NowSample) {
        self.now = sample;
        self.today = sample.date;
    }

    pub fn apply(&mut self, action: Action) {
        match action {
            Action::Quit => self.running = false,
            Action::SetView(mode) => self.set_view_mode(mode),
            Action::PrevDay => self.prev_day(),
            Action::NextDay => self.next_day(),
            Action::PrevWeek => self.prev_week(),
            Action::NextWeek => self.next_week(),
            Action::PrevMonth => self.prev_month(),
            Action::NextMonth => self.next_month(),
            Action::Today => self.go_to_today(),
            Action::CycleEventType => self.cycle_event_type(),
            Action::CycleSubject => self.cycle_subject(),
            Action::CycleTeacher => self.cycle_teacher(),
            Action::CycleClass => self.cycle_class(),
            Action::BeginSearch => self.begin_search(),
            Action::SearchChar(c) => self.search_input_char(c),
            Action::SearchBackspace => self.search_backspace(),
            Action::EndSearch => self.end_search(),
            Action::ClearFilters => {
                self.clear_filters();
                self.status_message = Some("Filters cleared".to_string());
            }
            Action::ToggleTimelineMode => self.timeline_mode = self.timeline_mode.toggle(),
            Action::ToggleHelp => self.show_help = !self.show_help,
            Action::ScrollUp => self.scroll_up(),
            Action::ScrollDown => self.scroll_down(),
        }
    }

    // ── derived views ──

    pub fn filtered_events(&self) -> Vec<&Event> {
        self.filters.apply(&self.events)
    }

    pub fn month_grid(&self) -> MonthGrid<'_> {
        let (year, month) = (self.selected_date.year(), self.selected_date.month());
        month::build_month_grid(
            year,
            month,
            self.filtered_events(),
            self.today,
            self.options.show_padding_events,
        )
        .unwrap_or_else(|_| MonthGrid {
            year,
            month,
            cells: Vec::new(),
        })
    }

    pub fn week_grid(&self) -> WeekGrid<'_> {
        week::build_week_grid(self.selected_date, self.filtered_events(), self.today)
    }

    /// Events touching the selected month, grouped by the date they start on.
    pub fn date_groups(&self) -> Vec<DateGroup<'_>> {
        let first = self.selected_date.with_day(1).unwrap_or(self.selected_date);
        let days = dates::days_in_month(first.year(), first.month()).unwrap_or(31);
        let last = first + chrono::Duration::days(i64::from(days) - 1);
        let in_month = self
            .filtered_events()
            .into_iter()
            .filter(|e| e.start_date() <= last && e.end_date() >= first);
        list::group_by_date(in_month, None, self.options.group_order)
    }

    /// Lessons on the selected weekday plus timed events on the selected date.
    pub fn agenda_items(&self) -> Vec<AgendaItem<'_>> {
        let weekday = self.selected_date.weekday();
        let lessons = self
            .filters
            .apply(&self.schedule)
            .into_iter()
            .filter(|item| item.day_of_week == weekday)
            .map(AgendaItem::Lesson);
        let events = timeline::events_on_day(self.filtered_events(), self.selected_date)
            .into_iter()
            .map(AgendaItem::Event);
        lessons.chain(events).collect()
    }

    /// The time used for now/past status on the selected day.
    ///
    /// Other days are compared against the start or the end of the day so
    /// past days read as finished and future days as pending.
    pub fn now_for_selected(&self) -> ClockTime {
        match self.selected_date.cmp(&self.now.date) {
            std::cmp::Ordering::Equal => self.now.time,
            std::cmp::Ordering::Less => ClockTime::END_OF_DAY,
            std::cmp::Ordering::Greater => ClockTime::MIDNIGHT,
        }
    }

    /// The marker is only kept when the selected day is today.
    pub fn timeline<'a>(&self, items: &'a [AgendaItem<'a>]) -> Timeline<'a, AgendaItem<'a>> {
        let mut timeline = timeline::build_timeline(
            items,
            self.now_for_selected(),
            self.timeline_mode,
            &self.options.timeline,
        );
        if let Timeline::Grid(layout) = &mut timeline {
            if self.selected_date != self.now.date {
                layout.now_marker = None;
            }
        }
        timeline
    }

    // ── navigation ──

    pub fn next_day(&mut self) {
        self.selected_date = self.selected_date.succ_opt().unwrap_or(self.selected_date);
        self.on_date_changed();
    }

    pub fn prev_day(&mut self) {
        self.selected_date = self.selected_date.pred_opt().unwrap_or(self.selected_date);
        self.on_date_changed();
    }

    pub fn next_week(&mut self) {
        self.selected_date += chrono::Duration::weeks(1);
        self.on_date_changed();
    }

    pub fn prev_week(&mut self) {
        self.selected_date -= chrono::Duration::weeks(1);
        self.on_date_changed();
    }

    pub fn next_month(&mut self) {
        let (year, month) = match self.selected_date.month() {
            12 => (self.selected_date.year() + 1, 1),
            m => (self.selected_date.year(), m + 1),
        };
        self.jump_to_month(year, month);
    }

    pub fn prev_month(&mut self) {
        let (year, month) = match self.selected_date.month() {
            1 => (self.selected_date.year() - 1, 12),
            m => (self.selected_date.year(), m - 1),
        };
        self.jump_to_month(year, month);
    }

    fn jump_to_month(&mut self, year: i32, month: u32) {
        let Ok(len) = dates::days_in_month(year, month) else {
            return;
        };
        let day = self.selected_date.day().min(len);
        if let Some(date) = NaiveDate::from_ymd_opt(year, month, day) {
            self.selected_date = date;
        }
        self.on_date_changed();
    }

    pub fn go_to_today(&mut self) {
        self.today = self.clock.today();
        self.selected_date = self.today;
        self.on_date_changed();
    }

    pub fn scroll_down(&mut self) {
        self.list_scroll = self.list_scroll.saturating_add(1);
    }

    pub fn scroll_up(&mut self) {
        self.list_scroll = self.list_scroll.saturating_sub(1);
    }

    fn on_date_changed(&mut self) {
        let month = (self.selected_date.year(), self.selected_date.month());
        // Only refetch when the month changed
        if self.loaded_month != Some(month) {
            self.refresh_events();
            self.list_scroll = 0;
        }
    }

    // ── filters ──

    pub fn cycle_event_type(&mut self) {
        self.filters.event_type = EventType::cycle(self.filters.event_type);
        self.on_filters_changed();
    }

    pub fn cycle_subject(&mut self) {
        self.filters.subject_id = next_id(&self.filters.subject_id, self.directory.subjects());
        self.on_filters_changed();
    }

    pub fn cycle_teacher(&mut self) {
        self.filters.teacher_id = next_id(&self.filters.teacher_id, self.directory.teachers());
        self.on_filters_changed();
    }

    pub fn cycle_class(&mut self) {
        self.filters.class_id = next_id(&self.filters.class_id, self.directory.classes());
        self.on_filters_changed();
    }

    pub fn clear_filters(&mut self) {
        self.filters.clear();
        self.search_input.clear();
        self.on_filters_changed();
    }

    pub fn begin_search(&mut self) {
        self.input_mode = InputMode::Search;
        self.search_input = self.filters.search_text.clone().unwrap_or_default();
    }

    pub fn search_input_char(&mut self, c: char) {
        self.search_input.push(c);
        self.apply_search();
    }

    pub fn search_backspace(&mut self) {
        self.search_input.pop();
        self.apply_search();
    }

    pub fn end_search(&mut self) {
        self.input_mode = InputMode::Normal;
    }

    fn apply_search(&mut self) {
        let text = self.search_input.trim();
        self.filters.search_text = (!text.is_empty()).then(|| text.to_string());
        self.on_filters_changed();
    }

    fn on_filters_changed(&mut self) {
        self.list_scroll = 0;
        debug!(filters = ?self.filters, "filters changed");
    }

    /// Human-readable summary of the active filters.
    pub fn filter_summary(&self) -> Option<String> {
        if self.filters.is_empty() {
            return None;
        }
        let name_of = |id: &Option<String>, refs: &[NamedRef]| {
            id.as_ref().map(|id| {
                refs.iter()
                    .find(|r| &r.id == id)
                    .map(NamedRef::display_name)
                    .unwrap_or_else(|| id.clone())
            })
        };

        let parts: Vec<String> = [
            self.filters.event_type.map(|t| t.label().to_string()),
            name_of(&self.filters.subject_id, self.directory.subjects()),
            name_of(&self.filters.teacher_id, self.directory.teachers()),
            name_of(&self.filters.class_id, self.directory.classes()),
            self.filters.search_text.as_ref().map(|s| format!("\"{s}\"")),
        ]
        .into_iter()
        .flatten()
        .collect();

        Some(parts.join(", "))
    }
}

/// The id after `current` in `refs`; `None` once past the last one.
fn next_id(current: &Option<String>, refs: &[NamedRef]) -> Option<String> {
    match current {
        None => refs.first().map(|r| r.id.clone()),
        Some(id) => {
            let pos = refs.iter().position(|r| &r.id == id)?;
            refs.get(pos + 1).map(|r| r.id.clone())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::Store;
    use crate::layout::ManualClock;

    const DOC: &str = r#"{
        "events": [
            { "_id": "e1", "title": "Parent meeting", "eventType": "meeting",
              "startDate": "2024-02-29T16:00", "endDate": "2024-02-29T17:00" },
            { "_id": "e2", "title": "Finals", "eventType": "exam",
              "startDate": "2024-03-11", "endDate": "2024-03-13", "isAllDay": true }
        ],
        "schedule": [
            { "_id": "s1", "dayOfWeek": "Thursday", "startTime": "09:00", "endTime": "10:30",
              "subjectId": { "_id": "sub-math", "name": "Mathematics" }, "room": "101" },
            { "_id": "s2", "dayOfWeek": "Thursday", "startTime": "11:00", "endTime": "12:00",
              "subjectId": { "_id": "sub-art", "name": "Art" } }
        ],
        "subjects": [
            { "_id": "sub-math", "name": "Mathematics" },
            { "_id": "sub-art", "name": "Art" }
        ]
    }"#;

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> chrono::NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, 0)
            .unwrap()
    }

    fn app_with(doc: &str, clock: Arc<ManualClock>) -> App {
        App::new(
            Box::new(Store::from_json(doc).unwrap()),
            clock,
            LayoutOptions::default(),
        )
    }

    fn app() -> App {
        app_with(DOC, Arc::new(ManualClock::new(at(2024, 2, 29, 9, 45))))
    }

    #[test]
    fn month_grid_reflects_filters() {
        let mut app = app();
        let grid = app.month_grid();
        assert_eq!(grid.cells.len(), 42);
        let today = grid.cells.iter().find(|c| c.is_today).unwrap();
        assert_eq!(today.events.len(), 1);

        app.cycle_event_type(); // Holiday
        let grid = app.month_grid();
        assert!(grid.cells.iter().all(|c| c.events.is_empty()));
    }

    #[test]
    fn navigating_months_refetches_events() {
        let mut app = app();
        app.next_month();
        assert_eq!(app.selected_date, NaiveDate::from_ymd_opt(2024, 3, 29).unwrap());
        assert!(app.events.iter().any(|e| e.id == "e2"));

        let groups = app.date_groups();
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].events[0].id, "e2");
    }

    #[test]
    fn agenda_combines_lessons_and_events() {
        let app = app();
        let items = app.agenda_items();
        assert_eq!(items.len(), 3);

        let Timeline::Grid(layout) = app.timeline(&items) else {
            panic!("grid mode is the default");
        };
        assert_eq!(layout.window.start_hour, 8);
        assert_eq!(layout.window.end_hour, 18);
        assert!(layout.items[0].status.is_now);
        assert_eq!(layout.items[0].item.title(), "Mathematics");
    }

    #[test]
    fn subject_filter_cycles_through_directory() {
        let mut app = app();
        app.cycle_subject();
        assert_eq!(app.filters.subject_id.as_deref(), Some("sub-math"));
        assert_eq!(app.filter_summary().as_deref(), Some("Mathematics"));
        let lessons = app
            .agenda_items()
            .iter()
            .filter(|i| matches!(i, AgendaItem::Lesson(_)))
            .count();
        assert_eq!(lessons, 1);

        app.cycle_subject();
        app.cycle_subject();
        assert!(app.filters.subject_id.is_none());
    }

    #[test]
    fn search_input_updates_filters() {
        let mut app = app();
        app.begin_search();
        for c in "art".chars() {
            app.search_input_char(c);
        }
        assert_eq!(app.filters.search_text.as_deref(), Some("art"));
        app.end_search();
        assert_eq!(app.input_mode, InputMode::Normal);

        app.clear_filters();
        assert!(app.filters.is_empty());
    }

    #[test]
    fn other_days_read_as_finished_or_pending() {
        let mut app = app();
        app.prev_day();
        assert_eq!(app.now_for_selected(), ClockTime::END_OF_DAY);
        app.next_day();
        app.next_day();
        assert_eq!(app.now_for_selected(), ClockTime::MIDNIGHT);

        let items = app.agenda_items();
        let Timeline::Grid(layout) = app.timeline(&items) else {
            panic!("grid mode is the default");
        };
        assert_eq!(layout.now_marker, None);
    }

    #[tokio::test(start_paused = true)]
    async fn sampler_runs_only_in_timeline_view() {
        let mut app = app();
        assert!(!app.sampler_running());

        app.set_view_mode(ViewMode::Timeline);
        assert!(app.sampler_running());
        assert!(!app.tick());

        app.set_view_mode(ViewMode::Week);
        assert!(!app.sampler_running());
    }

    #[test]
    fn today_rolls_over_outside_the_timeline() {
        let clock = Arc::new(ManualClock::new(at(2024, 2, 14, 23, 59)));
        let mut app = app_with(DOC, clock.clone());
        assert!(!app.tick());

        clock.advance(chrono::Duration::minutes(2));
        assert!(app.tick());
        assert_eq!(app.today, NaiveDate::from_ymd_opt(2024, 2, 15).unwrap());

        let grid = app.month_grid();
        let today = grid.cells.iter().find(|c| c.is_today).unwrap();
        assert_eq!(today.date, NaiveDate::from_ymd_opt(2024, 2, 15).unwrap());
        assert!(!app.tick());
    }

    #[test]
    fn list_keeps_events_carried_over_from_last_month() {
        let doc = r#"{
            "events": [
                { "_id": "trip", "title": "Field trip", "startDate": "2024-02-28", "endDate": "2024-03-02",
                  "isAllDay": true },
                { "_id": "feb", "title": "Quiz", "startDate": "2024-02-26T10:00", "endDate": "2024-02-26T11:00" }
            ]
        }"#;
        let clock = Arc::new(ManualClock::new(at(2024, 3, 5, 9, 0)));
        let app = app_with(doc, clock);

        let groups = app.date_groups();
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].date, NaiveDate::from_ymd_opt(2024, 2, 28).unwrap());
        assert_eq!(groups[0].events[0].id, "trip");
    }
}
