use chrono::NaiveDate;
use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::layout::dates::month_name;
use crate::layout::{CalendarCell, MonthGrid};
use crate::theme;

const DAY_NAMES: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];

pub struct MonthView;

impl MonthView {
    pub fn render(
        frame: &mut Frame,
        area: Rect,
        grid: &MonthGrid<'_>,
        selected_date: NaiveDate,
        max_cell_events: usize,
    ) {
        let theme = theme::current();

        let block = Block::default()
            .title(format!(" {} {} ", month_name(grid.month), grid.year))
            .title_style(theme.header)
            .borders(Borders::ALL)
            .border_style(theme.border);

        let inner = block.inner(area);
        frame.render_widget(block, area);

        if inner.width < 14 || inner.height < 7 {
            return;
        }

        // Header + six week rows
        let mut row_constraints = vec![Constraint::Length(1)];
        row_constraints.extend(std::iter::repeat(Constraint::Ratio(1, 6)).take(6));
        let rows = Layout::vertical(row_constraints).split(inner);
        let col_constraints = [Constraint::Ratio(1, 7); 7];

        let header_cols = Layout::horizontal(col_constraints).split(rows[0]);
        for (name, col) in DAY_NAMES.iter().zip(header_cols.iter()) {
            let label = format!("{:^width$}", name, width = col.width as usize);
            frame.render_widget(Paragraph::new(Span::styled(label, theme.header)), *col);
        }

        for (week, row) in grid.weeks().zip(rows.iter().skip(1)) {
            let cols = Layout::horizontal(col_constraints).split(*row);
            for (cell, col) in week.iter().zip(cols.iter()) {
                render_cell(frame, *col, cell, selected_date, max_cell_events);
            }
        }
    }
}

fn render_cell(
    frame: &mut Frame,
    area: Rect,
    cell: &CalendarCell<'_>,
    selected_date: NaiveDate,
    max_cell_events: usize,
) {
    let theme = theme::current();
    let width = area.width as usize;

    let number_style = if cell.is_current_month {
        theme.day_style(cell.is_today, cell.date == selected_date)
    } else {
        theme.dim
    };

    let mut lines = vec![Line::from(Span::styled(
        format!("{:>2}", cell.day_number),
        number_style,
    ))];

    // Keep one row for the "+N" line when the cell is short
    let room = (area.height as usize).saturating_sub(1);
    let limit = max_cell_events.min(room);
    let overflow = cell.overflow(limit);
    let limit = if overflow > 0 && limit == room {
        limit.saturating_sub(1)
    } else {
        limit
    };

    for event in cell.visible_events(limit) {
        let style = if cell.is_current_month {
            Style::default().fg(theme::event_color(event.event_type))
        } else {
            theme.dim
        };
        let text = format!("{} {}", event.event_type.glyph(), event.title);
        lines.push(Line::from(Span::styled(truncate(&text, width), style)));
    }

    let hidden = cell.overflow(limit);
    if hidden > 0 {
        lines.push(Line::from(Span::styled(format!("+{hidden} more"), theme.dim)));
    }

    frame.render_widget(Paragraph::new(lines), area);
}

pub(crate) fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        return text.to_string();
    }
    if width == 0 {
        return String::new();
    }
    let mut out: String = text.chars().take(width - 1).collect();
    out.push('\u{2026}');
    out
}
