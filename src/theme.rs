use std::sync::OnceLock;

use ratatui::style::{Color, Modifier, Style};
use serde::Deserialize;
use tracing::warn;

use crate::calendar::EventType;
use crate::config;
use crate::layout::color::color_index;

static THEME: OnceLock<Theme> = OnceLock::new();

/// The active theme, loaded from `theme.toml` on first use.
pub fn current() -> &'static Theme {
    THEME.get_or_init(|| Theme::load().unwrap_or_default())
}

/// Accent colors handed out by identifier.
pub const ACCENTS: [Color; 8] = [
    Color::Rgb(229, 115, 115),
    Color::Rgb(186, 104, 200),
    Color::Rgb(121, 134, 203),
    Color::Rgb(79, 195, 247),
    Color::Rgb(77, 182, 172),
    Color::Rgb(174, 213, 129),
    Color::Rgb(255, 213, 79),
    Color::Rgb(255, 138, 101),
];

#[derive(Debug, Clone)]
pub struct Theme {
    pub name: String,
    pub today: Style,
    pub selected: Style,
    pub header: Style,
    pub dim: Style,
    pub border: Style,
    pub status: Style,
    pub now_marker: Style,
    pub past: Style,
    pub warning: Style,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            name: "default".to_string(),
            today: Style::default().fg(Color::Black).bg(Color::Yellow),
            selected: Style::default().fg(Color::Black).bg(Color::Cyan),
            header: Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
            dim: Style::default().fg(Color::DarkGray),
            border: Style::default().fg(Color::Gray),
            status: Style::default().fg(Color::White).bg(Color::DarkGray),
            now_marker: Style::default().fg(Color::LightRed).add_modifier(Modifier::BOLD),
            past: Style::default().fg(Color::DarkGray).add_modifier(Modifier::DIM),
            warning: Style::default().fg(Color::Yellow),
        }
    }
}

impl Theme {
    pub fn load() -> Option<Self> {
        let path = config::config_dir()?.join("theme.toml");
        if !path.exists() {
            return None;
        }
        let content = std::fs::read_to_string(&path).ok()?;
        match toml::from_str::<ThemeConfig>(&content) {
            Ok(cfg) => Some(cfg.into_theme()),
            Err(error) => {
                warn!(file = %path.display(), %error, "ignoring unreadable theme");
                None
            }
        }
    }

    pub fn preset(name: &str) -> Self {
        match name {
            "nord" => Self::nord(),
            _ => Self::default(),
        }
    }

    fn nord() -> Self {
        Self {
            name: "nord".to_string(),
            today: Style::default().fg(Color::Black).bg(Color::Rgb(235, 203, 139)),
            selected: Style::default().fg(Color::Black).bg(Color::Rgb(136, 192, 208)),
            header: Style::default()
                .fg(Color::Rgb(229, 233, 240))
                .add_modifier(Modifier::BOLD),
            dim: Style::default().fg(Color::Rgb(76, 86, 106)),
            border: Style::default().fg(Color::Rgb(67, 76, 94)),
            status: Style::default()
                .fg(Color::Rgb(229, 233, 240))
                .bg(Color::Rgb(67, 76, 94)),
            now_marker: Style::default()
                .fg(Color::Rgb(191, 97, 106))
                .add_modifier(Modifier::BOLD),
            past: Style::default().fg(Color::Rgb(76, 86, 106)),
            warning: Style::default().fg(Color::Rgb(208, 135, 112)),
        }
    }

    /// Style for the current day, combined with selection when both apply.
    pub fn day_style(&self, is_today: bool, is_selected: bool) -> Style {
        match (is_today, is_selected) {
            (true, true) => self.today.add_modifier(Modifier::BOLD | Modifier::UNDERLINED),
            (false, true) => self.selected,
            (true, false) => self.today,
            (false, false) => Style::default(),
        }
    }
}

pub fn event_color(event_type: EventType) -> Color {
    match event_type {
        EventType::Holiday => Color::Green,
        EventType::Exam => Color::Red,
        EventType::Meeting => Color::Blue,
        EventType::Class => Color::Cyan,
        EventType::AssignmentDeadline => Color::Magenta,
        EventType::FeeDue => Color::Yellow,
        EventType::SchoolEvent => Color::LightBlue,
    }
}

pub fn accent(id: &str) -> Color {
    ACCENTS[color_index(id, ACCENTS.len())]
}

#[derive(Debug, Deserialize, Default)]
struct ThemeConfig {
    preset: Option<String>,
    today_fg: Option<String>,
    today_bg: Option<String>,
    selected_bg: Option<String>,
    header_fg: Option<String>,
    dim_fg: Option<String>,
    status_bg: Option<String>,
    now_fg: Option<String>,
}

impl ThemeConfig {
    fn into_theme(self) -> Theme {
        let mut theme = self
            .preset
            .as_deref()
            .map(Theme::preset)
            .unwrap_or_default();

        if let Some(c) = self.today_fg.as_deref().and_then(parse_color) {
            theme.today = theme.today.fg(c);
        }
        if let Some(c) = self.today_bg.as_deref().and_then(parse_color) {
            theme.today = theme.today.bg(c);
        }
        if let Some(c) = self.selected_bg.as_deref().and_then(parse_color) {
            theme.selected = theme.selected.bg(c);
        }
        if let Some(c) = self.header_fg.as_deref().and_then(parse_color) {
            theme.header = theme.header.fg(c);
        }
        if let Some(c) = self.dim_fg.as_deref().and_then(parse_color) {
            theme.dim = theme.dim.fg(c);
        }
        if let Some(c) = self.status_bg.as_deref().and_then(parse_color) {
            theme.status = theme.status.bg(c);
        }
        if let Some(c) = self.now_fg.as_deref().and_then(parse_color) {
            theme.now_marker = theme.now_marker.fg(c);
        }

        theme
    }
}

/// Parse "#rrggbb" or a basic color name.
fn parse_color(s: &str) -> Option<Color> {
    let s = s.trim();
    if let Some(hex) = s.strip_prefix('#').filter(|h| h.len() == 6) {
        let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
        let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
        let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
        return Some(Color::Rgb(r, g, b));
    }
    match s.to_lowercase().as_str() {
        "black" => Some(Color::Black),
        "red" => Some(Color::Red),
        "green" => Some(Color::Green),
        "yellow" => Some(Color::Yellow),
        "blue" => Some(Color::Blue),
        "magenta" => Some(Color::Magenta),
        "cyan" => Some(Color::Cyan),
        "white" => Some(Color::White),
        "gray" | "grey" => Some(Color::Gray),
        "darkgray" | "darkgrey" => Some(Color::DarkGray),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overrides_apply_on_top_of_preset() {
        let cfg: ThemeConfig = toml::from_str(
            r##"
            preset = "nord"
            today_bg = "#102030"
            now_fg = "magenta"
            "##,
        )
        .unwrap();
        let theme = cfg.into_theme();

        assert_eq!(theme.name, "nord");
        assert_eq!(theme.today.bg, Some(Color::Rgb(16, 32, 48)));
        assert_eq!(theme.now_marker.fg, Some(Color::Magenta));
    }

    #[test]
    fn rejects_malformed_colors() {
        assert_eq!(parse_color("#12345"), None);
        assert_eq!(parse_color("#gg0000"), None);
        assert_eq!(parse_color("chartreuse"), None);
    }

    #[test]
    fn accents_are_stable() {
        assert_eq!(accent("sub-math"), accent("sub-math"));
    }
}
