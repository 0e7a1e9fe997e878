use chrono::{Datelike, NaiveDate};

use crate::calendar::Event;
use crate::error::LayoutResult;

use super::dates;

/// Six full weeks, whatever the month's shape.
pub const GRID_CELLS: usize = 42;
pub const DEFAULT_MAX_CELL_EVENTS: usize = 3;

#[derive(Debug, Clone)]
pub struct CalendarCell<'a> {
    pub date: NaiveDate,
    pub day_number: u32,
    pub is_current_month: bool,
    pub is_today: bool,
    pub events: Vec<&'a Event>,
}

impl<'a> CalendarCell<'a> {
    /// The events that fit in the cell, in input order.
    pub fn visible_events(&self, limit: usize) -> &[&'a Event] {
        &self.events[..self.events.len().min(limit)]
    }

    /// How many events were cut by `visible_events`.
    pub fn overflow(&self, limit: usize) -> usize {
        self.events.len().saturating_sub(limit)
    }
}

#[derive(Debug, Clone)]
pub struct MonthGrid<'a> {
    pub year: i32,
    pub month: u32,
    pub cells: Vec<CalendarCell<'a>>,
}

impl<'a> MonthGrid<'a> {
    pub fn weeks(&self) -> impl Iterator<Item = &[CalendarCell<'a>]> {
        self.cells.chunks(7)
    }

    pub fn cell(&self, date: NaiveDate) -> Option<&CalendarCell<'a>> {
        self.cells.iter().find(|c| c.date == date)
    }

    pub fn current_month_cells(&self) -> impl Iterator<Item = &CalendarCell<'a>> {
        self.cells.iter().filter(|c| c.is_current_month)
    }
}

/// Build the 42-cell grid for `year`/`month`.
///
/// Leading and trailing padding days come from the neighbouring months.
/// They carry events only when `populate_padding` is set.
pub fn build_month_grid<'a>(
    year: i32,
    month: u32,
    events: impl IntoIterator<Item = &'a Event>,
    today: NaiveDate,
    populate_padding: bool,
) -> LayoutResult<MonthGrid<'a>> {
    let events: Vec<&Event> = events.into_iter().collect();
    let first = dates::first_of_month(year, month)?;
    let leading = first.weekday().num_days_from_sunday() as i64;
    let days_in_month = dates::days_in_month(year, month)?;

    let grid_start = first - chrono::Duration::days(leading);

    let cells = (0..GRID_CELLS as i64)
        .map(|offset| {
            let date = grid_start + chrono::Duration::days(offset);
            let is_current_month = offset >= leading && offset < leading + days_in_month as i64;

            let events = if is_current_month || populate_padding {
                events.iter().copied().filter(|e| e.occurs_on(date)).collect()
            } else {
                Vec::new()
            };

            CalendarCell {
                date,
                day_number: date.day(),
                is_current_month,
                is_today: date == today,
                events,
            }
        })
        .collect();

    Ok(MonthGrid { year, month, cells })
}
