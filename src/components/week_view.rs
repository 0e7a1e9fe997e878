use chrono::NaiveDate;
use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use super::month_view::truncate;
use crate::layout::{DayColumn, WeekGrid};
use crate::theme;

pub struct WeekView;

impl WeekView {
    pub fn render(frame: &mut Frame, area: Rect, grid: &WeekGrid<'_>, selected_date: NaiveDate) {
        let theme = theme::current();

        let block = Block::default()
            .title(format!(
                " Week of {} ",
                grid.week_start.format("%b %-d, %Y")
            ))
            .title_style(theme.header)
            .borders(Borders::ALL)
            .border_style(theme.border);

        let inner = block.inner(area);
        frame.render_widget(block, area);

        if inner.width < 14 || inner.height < 2 {
            return;
        }

        let cols = Layout::horizontal([Constraint::Ratio(1, 7); 7]).split(inner);
        for (day, col) in grid.days.iter().zip(cols.iter()) {
            render_column(frame, *col, day, selected_date);
        }
    }
}

fn render_column(frame: &mut Frame, area: Rect, day: &DayColumn<'_>, selected_date: NaiveDate) {
    let theme = theme::current();
    let width = area.width.saturating_sub(1) as usize;

    let label = if width >= 10 {
        day.date.format("%a %-d").to_string()
    } else {
        day.date.format("%-d").to_string()
    };
    let header_style = match theme.day_style(day.is_today, day.date == selected_date) {
        s if s == Style::default() => theme.header,
        s => s,
    };

    let mut lines = vec![
        Line::from(Span::styled(format!("{label:^width$}"), header_style)),
    ];

    if day.events.is_empty() {
        lines.push(Line::from(Span::styled("\u{b7}", theme.dim)));
    }

    for event in &day.events {
        let color = Style::default().fg(theme::event_color(event.event_type));
        let when = if event.is_all_day {
            "all day".to_string()
        } else if event.start_date() == day.date {
            event.start.format("%H:%M").to_string()
        } else {
            "cont.".to_string()
        };
        lines.push(Line::from(Span::styled(
            truncate(&format!("{} {}", event.event_type.glyph(), event.title), width),
            color.add_modifier(Modifier::BOLD),
        )));
        lines.push(Line::from(Span::styled(truncate(&when, width), theme.dim)));
    }

    frame.render_widget(Paragraph::new(lines), area);
}
