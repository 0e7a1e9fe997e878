use chrono::NaiveDate;
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph},
    Frame,
};

use super::month_view::truncate;
use crate::app::AgendaItem;
use crate::layout::dates::ClockTime;
use crate::layout::timeline::{ItemStatus, ListedItem, PositionedItem, TimelineLayout};
use crate::layout::Timeline;
use crate::theme;

const LABEL_WIDTH: u16 = 6;

pub struct TimelineView;

impl TimelineView {
    pub fn render(
        frame: &mut Frame,
        area: Rect,
        date: NaiveDate,
        now: ClockTime,
        timeline: &Timeline<'_, AgendaItem<'_>>,
    ) {
        let theme = theme::current();
        let mode = match timeline {
            Timeline::Grid(_) => "grid",
            Timeline::List(_) => "list",
        };

        let block = Block::default()
            .title(format!(" {} ", date.format("%A, %B %-d, %Y")))
            .title_style(theme.header)
            .title_bottom(Line::from(Span::styled(
                format!(" now {now} \u{b7} {mode} "),
                theme.dim,
            )))
            .borders(Borders::ALL)
            .border_style(theme.border);

        let inner = block.inner(area);
        frame.render_widget(block, area);

        match timeline {
            Timeline::Grid(layout) => render_grid(frame, inner, layout),
            Timeline::List(items) => render_list(frame, inner, items),
        }
    }
}

/// Row offset of `percent` inside a column `height` rows tall.
fn percent_to_row(percent: f64, height: u16) -> u16 {
    let row = (percent / 100.0 * height as f64).round();
    (row.max(0.0) as u16).min(height)
}

/// Greedy lane assignment so overlapping items sit side by side.
fn assign_lanes<T>(items: &[PositionedItem<'_, T>]) -> (Vec<usize>, usize) {
    let mut lane_ends: Vec<ClockTime> = Vec::new();
    let lanes = items
        .iter()
        .map(|item| {
            match lane_ends.iter().position(|end| *end <= item.span.start) {
                Some(lane) => {
                    lane_ends[lane] = item.span.end;
                    lane
                }
                None => {
                    lane_ends.push(item.span.end);
                    lane_ends.len() - 1
                }
            }
        })
        .collect();
    (lanes, lane_ends.len().max(1))
}

fn render_grid(frame: &mut Frame, area: Rect, layout: &TimelineLayout<'_, AgendaItem<'_>>) {
    let theme = theme::current();
    if area.width <= LABEL_WIDTH + 4 || area.height < 4 {
        return;
    }

    let height = area.height;
    let body = Rect {
        x: area.x + LABEL_WIDTH,
        width: area.width - LABEL_WIDTH,
        ..area
    };

    // Hour labels
    for hour in layout.window.hours() {
        let Some(t) = ClockTime::from_minutes(hour * 60) else {
            continue;
        };
        let row = percent_to_row(layout.window.position_percent(t), height);
        if row >= height {
            continue;
        }
        let label = Paragraph::new(Span::styled(format!("{hour:>2}:00"), theme.dim));
        frame.render_widget(label, Rect::new(area.x, area.y + row, LABEL_WIDTH, 1));
    }

    if layout.items.is_empty() {
        let msg = Paragraph::new("Nothing scheduled").style(theme.dim);
        frame.render_widget(msg, Rect::new(body.x + 1, body.y, body.width - 1, 1));
    }

    let (lanes, lane_count) = assign_lanes(&layout.items);
    let lane_width = (body.width / lane_count as u16).max(1);

    for (item, lane) in layout.items.iter().zip(lanes) {
        let top = percent_to_row(item.top_percent, height);
        if top >= height {
            continue;
        }
        let rows = percent_to_row(item.height_percent, height)
            .max(1)
            .min(height - top);
        let x = body.x + lane as u16 * lane_width;
        let rect = Rect::new(x, body.y + top, lane_width.saturating_sub(1).max(1), rows);
        render_block(frame, rect, item);
    }

    if let Some(percent) = layout.now_marker {
        let row = percent_to_row(percent, height).min(height - 1);
        let rule = "\u{2500}".repeat(body.width as usize);
        frame.render_widget(
            Paragraph::new(Span::styled("now \u{25b6}", theme.now_marker)),
            Rect::new(area.x, area.y + row, LABEL_WIDTH, 1),
        );
        frame.render_widget(
            Paragraph::new(Span::styled(rule, theme.now_marker)),
            Rect::new(body.x, body.y + row, body.width, 1),
        );
    }
}

fn render_block(frame: &mut Frame, rect: Rect, positioned: &PositionedItem<'_, AgendaItem<'_>>) {
    let item = positioned.item;
    let width = rect.width as usize;

    let style = item_style(item, positioned.status);
    let mut lines = vec![Line::from(Span::styled(
        truncate(item.title(), width),
        style.add_modifier(Modifier::BOLD),
    ))];
    if rect.height > 1 {
        lines.push(Line::from(truncate(&positioned.span.to_string(), width)));
    }
    if rect.height > 2 {
        if let Some(detail) = item.detail() {
            lines.push(Line::from(truncate(&detail, width)));
        }
    }

    frame.render_widget(Paragraph::new(lines).style(style), rect);
}

fn item_style(item: &AgendaItem<'_>, status: ItemStatus) -> Style {
    let theme = theme::current();
    if status.is_past {
        return theme.past;
    }
    let color = match item {
        AgendaItem::Lesson(_) => theme::accent(item.accent_key()),
        AgendaItem::Event(e) => theme::event_color(e.event.event_type),
    };
    let style = Style::default().fg(Color::Black).bg(color);
    if status.is_now {
        style.add_modifier(Modifier::BOLD)
    } else {
        style
    }
}

fn render_list(frame: &mut Frame, area: Rect, items: &[ListedItem<'_, AgendaItem<'_>>]) {
    let theme = theme::current();
    if items.is_empty() {
        frame.render_widget(Paragraph::new("Nothing scheduled").style(theme.dim), area);
        return;
    }

    let rows: Vec<ListItem> = items
        .iter()
        .map(|entry| {
            let marker = if entry.status.is_now { "\u{25b6} " } else { "  " };
            let text_style = if entry.status.is_past {
                theme.past
            } else {
                Style::default()
            };
            let mut spans = vec![
                Span::styled(marker, theme.now_marker),
                Span::styled(format!("{:<14}", entry.span.to_string()), theme.dim),
                Span::styled(entry.item.title().to_string(), text_style),
            ];
            if let Some(detail) = entry.item.detail() {
                spans.push(Span::styled(format!(" \u{b7} {detail}"), theme.dim));
            }
            ListItem::new(Line::from(spans))
        })
        .collect();

    frame.render_widget(List::new(rows), area);
}
