use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph},
    Frame,
};

use crate::calendar::Event;
use crate::layout::list::count_by_type;
use crate::layout::DateGroup;
use crate::theme;

pub struct ListView;

impl ListView {
    pub fn render(frame: &mut Frame, area: Rect, title: &str, groups: &[DateGroup<'_>], scroll: usize) {
        let theme = theme::current();

        let counts = count_by_type(groups.iter().flat_map(|g| g.events.iter().copied()));
        let count_str = if counts.is_empty() {
            String::new()
        } else {
            let parts: Vec<String> = counts
                .iter()
                .map(|(t, n)| format!("{} {}", n, t.label()))
                .collect();
            format!(" {} ", parts.join(", "))
        };

        let block = Block::default()
            .title(format!(" {title} "))
            .title_style(theme.header)
            .title_bottom(Line::from(Span::styled(count_str, theme.dim)))
            .borders(Borders::ALL)
            .border_style(theme.border);

        if groups.is_empty() {
            let inner = block.inner(area);
            frame.render_widget(block, area);
            let msg = Paragraph::new("No events").style(theme.dim);
            frame.render_widget(msg, inner);
            return;
        }

        let inner_w = area.width.saturating_sub(2) as usize;
        let mut items: Vec<ListItem> = Vec::new();

        for (i, group) in groups.iter().enumerate() {
            if i > 0 {
                items.push(ListItem::new(Line::from("")));
            }
            items.push(ListItem::new(Line::from(Span::styled(
                group.key(),
                Style::default().add_modifier(Modifier::BOLD | Modifier::UNDERLINED),
            ))));
            for event in &group.events {
                items.push(format_event(event, inner_w));
            }
        }

        let visible: Vec<ListItem> = items.into_iter().skip(scroll).collect();
        frame.render_widget(List::new(visible).block(block), area);
    }
}

fn format_event(event: &Event, max_width: usize) -> ListItem<'static> {
    let color = theme::event_color(event.event_type);
    let marker = Span::styled(
        format!("{} ", event.event_type.glyph()),
        Style::default().fg(color),
    );

    let when = format!("{:<14}", event.duration_display());
    let when_span = Span::styled(when.clone(), Style::default().add_modifier(Modifier::DIM));
    let title_span = Span::styled(event.title.clone(), Style::default());

    let mut spans = vec![marker, when_span, title_span];

    // Class only when there is room for it
    let used = 2 + when.len() + event.title.chars().count();
    if let Some(class) = &event.class {
        let name = class.display_name();
        if used + 3 + name.chars().count() <= max_width {
            spans.push(Span::styled(format!(" \u{b7} {name}"), theme::current().dim));
        }
    }

    ListItem::new(Line::from(spans))
}
