//! Proportional placement of time-of-day items inside a fitted window.
//!
//! The window is recomputed from the items on every pass. Positions are
//! percentages of the window height so the presentation layer can map
//! them onto any number of rows or pixels.

use chrono::NaiveDate;
use serde::Deserialize;

use crate::calendar::{Event, ScheduleItem};
use crate::error::{LayoutError, LayoutResult};

use super::dates::ClockTime;

pub const DEFAULT_MIN_HEIGHT_PERCENT: f64 = 8.0;
pub const DEFAULT_START_HOUR: u32 = 7;
pub const DEFAULT_END_HOUR: u32 = 18;

/// A `[start, end]` time-of-day interval with `end >= start`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimeSpan {
    pub start: ClockTime,
    pub end: ClockTime,
}

impl TimeSpan {
    pub fn new(start: ClockTime, end: ClockTime) -> LayoutResult<Self> {
        if end < start {
            return Err(LayoutError::range(start, end));
        }
        Ok(Self { start, end })
    }

    pub fn parse(start: &str, end: &str) -> LayoutResult<Self> {
        Self::new(start.parse()?, end.parse()?)
    }

    pub fn duration_minutes(&self) -> u32 {
        self.end.minutes() - self.start.minutes()
    }

    pub fn status(&self, now: ClockTime) -> ItemStatus {
        ItemStatus {
            is_now: self.start <= now && now < self.end,
            is_past: now > self.end,
        }
    }
}

impl std::fmt::Display for TimeSpan {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} - {}", self.start, self.end)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ItemStatus {
    pub is_now: bool,
    pub is_past: bool,
}

/// Anything that occupies a time-of-day span on the timeline.
pub trait TimelineItem {
    fn span(&self) -> TimeSpan;
}

impl TimelineItem for ScheduleItem {
    fn span(&self) -> TimeSpan {
        self.span
    }
}

/// An event pinned to one civil day, carrying its clipped span.
#[derive(Debug, Clone, Copy)]
pub struct EventOnDay<'a> {
    pub event: &'a Event,
    pub span: TimeSpan,
}

impl TimelineItem for EventOnDay<'_> {
    fn span(&self) -> TimeSpan {
        self.span
    }
}

/// Timed events touching `day`. All-day events have no place on a timeline.
pub fn events_on_day<'a>(
    events: impl IntoIterator<Item = &'a Event>,
    day: NaiveDate,
) -> Vec<EventOnDay<'a>> {
    events
        .into_iter()
        .filter_map(|event| event.span_on(day).map(|span| EventOnDay { event, span }))
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct TimelineOptions {
    pub min_height_percent: f64,
    pub default_start_hour: u32,
    pub default_end_hour: u32,
}

impl Default for TimelineOptions {
    fn default() -> Self {
        Self {
            min_height_percent: DEFAULT_MIN_HEIGHT_PERCENT,
            default_start_hour: DEFAULT_START_HOUR,
            default_end_hour: DEFAULT_END_HOUR,
        }
    }
}

/// The `[start_hour, end_hour]` bound used to place items.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    pub start_hour: u32,
    pub end_hour: u32,
}

impl TimeWindow {
    /// Fit a window around `spans` with one hour of slack on each side.
    pub fn fit(spans: impl IntoIterator<Item = TimeSpan>, options: &TimelineOptions) -> Self {
        let mut bounds: Option<(u32, u32)> = None;
        for span in spans {
            let (lo, hi) = bounds.unwrap_or((span.start.minutes(), span.end.minutes()));
            bounds = Some((lo.min(span.start.minutes()), hi.max(span.end.minutes())));
        }

        let Some((min_start, max_end)) = bounds else {
            return Self {
                start_hour: options.default_start_hour,
                end_hour: options.default_end_hour,
            };
        };

        let start_hour = (min_start / 60).saturating_sub(1);
        let end_hour = (max_end.div_ceil(60) + 1).min(24);
        Self {
            start_hour,
            end_hour,
        }
    }

    pub fn total_minutes(&self) -> u32 {
        (self.end_hour - self.start_hour) * 60
    }

    pub fn start_minutes(&self) -> u32 {
        self.start_hour * 60
    }

    pub fn end_minutes(&self) -> u32 {
        self.end_hour * 60
    }

    pub fn contains(&self, t: ClockTime) -> bool {
        (self.start_minutes()..=self.end_minutes()).contains(&t.minutes())
    }

    /// Offset of `t` from the window start, as a percentage of its height.
    pub fn position_percent(&self, t: ClockTime) -> f64 {
        let offset = t.minutes() as f64 - self.start_minutes() as f64;
        offset / self.total_minutes() as f64 * 100.0
    }

    /// Where the "now" marker goes, or `None` when now is outside the window.
    pub fn marker_percent(&self, now: ClockTime) -> Option<f64> {
        self.contains(now).then(|| self.position_percent(now))
    }

    pub fn hours(&self) -> impl Iterator<Item = u32> {
        self.start_hour..=self.end_hour
    }
}

#[derive(Debug, Clone)]
pub struct PositionedItem<'a, T> {
    pub item: &'a T,
    pub span: TimeSpan,
    pub top_percent: f64,
    pub height_percent: f64,
    pub status: ItemStatus,
}

#[derive(Debug, Clone)]
pub struct TimelineLayout<'a, T> {
    pub window: TimeWindow,
    pub items: Vec<PositionedItem<'a, T>>,
    pub now_marker: Option<f64>,
}

/// Place `items` proportionally inside a window fitted around them.
pub fn layout_timeline<'a, T: TimelineItem>(
    items: impl IntoIterator<Item = &'a T>,
    now: ClockTime,
    options: &TimelineOptions,
) -> TimelineLayout<'a, T> {
    let mut items: Vec<&T> = items.into_iter().collect();
    items.sort_by_key(|item| item.span().start);

    let window = TimeWindow::fit(items.iter().map(|item| item.span()), options);

    let items = items
        .into_iter()
        .map(|item| {
            let span = item.span();
            let top = window.position_percent(span.start);
            let height = window.position_percent(span.end) - top;
            PositionedItem {
                item,
                span,
                top_percent: top,
                height_percent: height.max(options.min_height_percent),
                status: span.status(now),
            }
        })
        .collect();

    TimelineLayout {
        window,
        items,
        now_marker: window.marker_percent(now),
    }
}

#[derive(Debug, Clone)]
pub struct ListedItem<'a, T> {
    pub item: &'a T,
    pub span: TimeSpan,
    pub status: ItemStatus,
}

/// Items sorted by start time with their status, without positions.
pub fn chronological<'a, T: TimelineItem>(
    items: impl IntoIterator<Item = &'a T>,
    now: ClockTime,
) -> Vec<ListedItem<'a, T>> {
    let mut listed: Vec<ListedItem<'a, T>> = items
        .into_iter()
        .map(|item| {
            let span = item.span();
            ListedItem {
                item,
                span,
                status: span.status(now),
            }
        })
        .collect();
    listed.sort_by_key(|entry| entry.span.start);
    listed
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TimelineMode {
    #[default]
    Grid,
    List,
}

impl TimelineMode {
    pub fn toggle(self) -> Self {
        match self {
            TimelineMode::Grid => TimelineMode::List,
            TimelineMode::List => TimelineMode::Grid,
        }
    }
}

#[derive(Debug, Clone)]
pub enum Timeline<'a, T> {
    Grid(TimelineLayout<'a, T>),
    List(Vec<ListedItem<'a, T>>),
}

pub fn build_timeline<'a, T: TimelineItem>(
    items: impl IntoIterator<Item = &'a T>,
    now: ClockTime,
    mode: TimelineMode,
    options: &TimelineOptions,
) -> Timeline<'a, T> {
    match mode {
        TimelineMode::Grid => Timeline::Grid(layout_timeline(items, now, options)),
        TimelineMode::List => Timeline::List(chronological(items, now)),
    }
}
