use std::fs::{self, OpenOptions};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use academic_calendar::app::{App, ViewMode};
use academic_calendar::calendar::Store;
use academic_calendar::components::{ListView, MonthView, StatusBar, TimelineView, WeekView};
use academic_calendar::config::{self, Config};
use academic_calendar::event;
use academic_calendar::layout::dates::month_name;
use academic_calendar::layout::SystemClock;
use academic_calendar::{theme, tui};
use chrono::Datelike;
use clap::{ArgAction, Parser};
use color_eyre::eyre::{eyre, Result};
use crossterm::event::KeyCode;
use ratatui::layout::{Constraint, Layout, Rect};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "academic-calendar", version, about)]
struct Cli {
    /// JSON document with events, schedule and directory lists
    #[arg(long, value_name = "FILE")]
    data: Option<PathBuf>,

    /// Config file (defaults to the platform config directory)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// View to open with
    #[arg(long, value_enum)]
    view: Option<ViewMode>,

    /// More log output (repeatable)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    init_tracing(cli.verbose)?;

    let config = Config::load(cli.config.as_deref())?;
    let data_file = cli
        .data
        .or(config.data_file.clone())
        .ok_or_else(|| eyre!("no data file: pass --data or set data_file in the config"))?;
    let store = Store::open(&data_file)?;

    let mut app = App::new(Box::new(store), Arc::new(SystemClock), config.layout);
    if let Some(view) = cli.view {
        app.set_view_mode(view);
    }
    match app.warning_count() {
        0 => {}
        n => app.status_message = Some(format!("{n} invalid records skipped, see log")),
    }

    tui::install_panic_hook();
    let mut terminal = tui::init()?;
    let result = run(&mut terminal, &mut app).await;
    tui::restore()?;

    info!("exiting");
    result
}

fn init_tracing(verbose: u8) -> Result<()> {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_level))
        .map_err(|e| eyre!("invalid RUST_LOG / log filter: {e}"))?;

    // The terminal belongs to the UI; without a log file, logs are dropped
    let Some(path) = config::log_path() else {
        return Ok(());
    };
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir)?;
    }
    let file = OpenOptions::new().create(true).append(true).open(&path)?;

    let init_result = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(true)
        .with_level(true)
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .try_init();

    if let Err(err) = init_result {
        warn!(error = %err, "tracing subscriber already set, continuing");
    }
    Ok(())
}

async fn run(terminal: &mut tui::Tui, app: &mut App) -> Result<()> {
    while app.running {
        app.tick();
        terminal.draw(|frame| render(frame, app))?;

        if let Some(key) = event::next_key_event(Duration::from_millis(100))? {
            app.status_message = None;

            // Help overlay takes priority
            if app.show_help {
                if matches!(key.code, KeyCode::Esc | KeyCode::Char('?') | KeyCode::Char('q')) {
                    app.show_help = false;
                }
                continue;
            }

            if let Some(action) = event::map_key(key, app.input_mode) {
                app.apply(action);
            }
        }

        // Let the now sampler run between polls
        tokio::task::yield_now().await;
    }

    Ok(())
}

fn render(frame: &mut ratatui::Frame, app: &App) {
    let area = frame.area();
    let layout = Layout::vertical([Constraint::Min(1), Constraint::Length(1)]).split(area);
    let content = layout[0];

    match app.view_mode {
        ViewMode::Month => {
            let grid = app.month_grid();
            MonthView::render(
                frame,
                content,
                &grid,
                app.selected_date,
                app.options.max_cell_events,
            );
        }
        ViewMode::Week => {
            let grid = app.week_grid();
            WeekView::render(frame, content, &grid, app.selected_date);
        }
        ViewMode::List => {
            let groups = app.date_groups();
            let title = format!(
                "{} {}",
                month_name(app.selected_date.month()),
                app.selected_date.year()
            );
            ListView::render(frame, content, &title, &groups, app.list_scroll);
        }
        ViewMode::Timeline => {
            let items = app.agenda_items();
            let timeline = app.timeline(&items);
            TimelineView::render(
                frame,
                content,
                app.selected_date,
                app.now_for_selected(),
                &timeline,
            );
        }
    }

    if app.show_help {
        render_help(frame, area);
    }

    StatusBar::render(frame, layout[1], app);
}

fn render_help(frame: &mut ratatui::Frame, area: Rect) {
    use ratatui::style::{Color, Modifier, Style};
    use ratatui::text::{Line, Span};
    use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};

    let theme = theme::current();
    let popup_w = area.width.clamp(30, 54);
    let popup_h = area.height.clamp(12, 26);
    let x = area.x + (area.width.saturating_sub(popup_w)) / 2;
    let y = area.y + (area.height.saturating_sub(popup_h)) / 2;
    let popup_area = Rect::new(x, y, popup_w, popup_h).intersection(area);

    frame.render_widget(Clear, popup_area);

    let block = Block::default()
        .title(" Keybindings ")
        .title_style(Style::default().fg(Color::Green).add_modifier(Modifier::BOLD))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Green));

    let inner = block.inner(popup_area);
    frame.render_widget(block, popup_area);

    let key_style = Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD);
    let section_style = Style::default().add_modifier(Modifier::BOLD | Modifier::UNDERLINED);
    let entry = |keys: &'static str, desc: &'static str| {
        Line::from(vec![
            Span::styled(format!("  {keys:<10}"), key_style),
            Span::raw(desc),
        ])
    };

    let lines = vec![
        Line::from(Span::styled("Navigation", section_style)),
        entry("h/l", "Previous/next day"),
        entry("j/k", "Next/previous week"),
        entry("[/]", "Previous/next month"),
        entry("\u{2191}/\u{2193}", "Scroll list"),
        entry("t", "Jump to today"),
        Line::from(""),
        Line::from(Span::styled("Views", section_style)),
        entry("1/2/3/4", "Month / Week / List / Timeline"),
        entry("g", "Timeline grid or list"),
        Line::from(""),
        Line::from(Span::styled("Filters", section_style)),
        entry("e", "Cycle event type"),
        entry("s / p / c", "Cycle subject / teacher / class"),
        entry("/", "Search"),
        entry("x", "Clear filters"),
        Line::from(""),
        Line::from(vec![
            Span::styled("  q", key_style),
            Span::styled(" / ", theme.dim),
            Span::styled("Esc     ", key_style),
            Span::raw("Quit / close help"),
        ]),
    ];

    frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: false }), inner);
}
