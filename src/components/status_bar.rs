use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use crate::app::{App, InputMode, ViewMode};
use crate::theme;

pub struct StatusBar;

impl StatusBar {
    pub fn render(frame: &mut Frame, area: Rect, app: &App) {
        let theme = theme::current();
        let w = area.width as usize;

        let mode_str = match app.view_mode {
            ViewMode::Month => "[1]Month",
            ViewMode::Week => "[2]Week",
            ViewMode::List => "[3]List",
            ViewMode::Timeline => "[4]Timeline",
        };

        let left = match app.input_mode {
            InputMode::Search => format!(" {mode_str}  /{}\u{2588} ", app.search_input),
            InputMode::Normal => match app.filter_summary() {
                Some(summary) => format!(" {mode_str}  filter: {summary} "),
                None => format!(" {mode_str} "),
            },
        };

        let right = if let Some(msg) = &app.status_message {
            format!(" {msg} ")
        } else if app.input_mode == InputMode::Search {
            " Enter/Esc:Done ".to_string()
        } else if w >= 90 {
            " hl:Day jk:Week [/]:Mon e/s/p/c:Filter /:Search x:Clear ?:Help q:Quit ".to_string()
        } else if w >= 50 {
            " [/]:Mon /:Search ?:Help q:Quit ".to_string()
        } else {
            " ?:Help q:Quit ".to_string()
        };

        let warnings = match app.warning_count() {
            0 => String::new(),
            1 => " 1 record skipped ".to_string(),
            n => format!(" {n} records skipped "),
        };

        let used = left.chars().count() + warnings.chars().count() + right.chars().count();
        let padding = " ".repeat(w.saturating_sub(used));

        let line = Line::from(vec![
            Span::styled(left, theme.status),
            Span::styled(warnings, theme.status.patch(theme.warning)),
            Span::styled(padding, theme.status),
            Span::styled(right, theme.status),
        ]);

        frame.render_widget(Paragraph::new(line).style(theme.status), area);
    }
}
