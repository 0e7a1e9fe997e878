//! The temporal layout core.
//!
//! Flat event and schedule collections go through [`filter`] first, then
//! into one of the builders ([`month`], [`week`], [`list`], [`timeline`]).
//! Every builder is a pure function of its inputs and returns borrowed,
//! view-ready structures that are rebuilt on each change.

pub mod clock;
pub mod color;
pub mod dates;
pub mod filter;
pub mod list;
pub mod month;
pub mod timeline;
pub mod week;

use serde::Deserialize;

pub use clock::{Clock, ManualClock, NowSample, NowSampler, SamplerHandle, SystemClock};
pub use filter::{Filterable, Filters};
pub use list::{group_by_date, DateGroup, GroupOrder};
pub use month::{build_month_grid, CalendarCell, MonthGrid};
pub use timeline::{
    build_timeline, layout_timeline, TimeSpan, TimeWindow, Timeline, TimelineMode,
    TimelineOptions,
};
pub use week::{build_week_grid, group_schedule_by_day, DayColumn, ScheduleWeek, WeekGrid};

/// Tunables shared by the builders.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct LayoutOptions {
    pub max_cell_events: usize,
    pub show_padding_events: bool,
    pub group_order: GroupOrder,
    pub now_refresh_secs: u64,
    #[serde(flatten)]
    pub timeline: TimelineOptions,
}

impl Default for LayoutOptions {
    fn default() -> Self {
        Self {
            max_cell_events: month::DEFAULT_MAX_CELL_EVENTS,
            show_padding_events: false,
            group_order: GroupOrder::default(),
            now_refresh_secs: clock::DEFAULT_REFRESH.as_secs(),
            timeline: TimelineOptions::default(),
        }
    }
}
