use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::app::{InputMode, ViewMode};

/// What a key press asks the viewer to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Quit,
    SetView(ViewMode),
    PrevDay,
    NextDay,
    PrevWeek,
    NextWeek,
    PrevMonth,
    NextMonth,
    Today,
    CycleEventType,
    CycleSubject,
    CycleTeacher,
    CycleClass,
    BeginSearch,
    SearchChar(char),
    SearchBackspace,
    EndSearch,
    ClearFilters,
    ToggleTimelineMode,
    ToggleHelp,
    ScrollUp,
    ScrollDown,
}

pub fn poll_event(timeout: Duration) -> color_eyre::Result<Option<Event>> {
    if event::poll(timeout)? {
        Ok(Some(event::read()?))
    } else {
        Ok(None)
    }
}

/// Next key press within `timeout`; other terminal events are skipped.
pub fn next_key_event(timeout: Duration) -> color_eyre::Result<Option<KeyEvent>> {
    loop {
        match poll_event(timeout)? {
            Some(Event::Key(key)) if key.kind == KeyEventKind::Press => return Ok(Some(key)),
            Some(_) => continue,
            None => return Ok(None),
        }
    }
}

pub fn map_key(key: KeyEvent, mode: InputMode) -> Option<Action> {
    match mode {
        InputMode::Search => map_search_key(key),
        InputMode::Normal => map_normal_key(key),
    }
}

fn map_search_key(key: KeyEvent) -> Option<Action> {
    match key.code {
        KeyCode::Enter | KeyCode::Esc => Some(Action::EndSearch),
        KeyCode::Backspace => Some(Action::SearchBackspace),
        KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
            Some(Action::SearchChar(c))
        }
        _ => None,
    }
}

fn map_normal_key(key: KeyEvent) -> Option<Action> {
    let action = match (key.code, key.modifiers) {
        (KeyCode::Char('q'), _) | (KeyCode::Char('c'), KeyModifiers::CONTROL) => Action::Quit,
        (KeyCode::Char('1'), _) => Action::SetView(ViewMode::Month),
        (KeyCode::Char('2'), _) => Action::SetView(ViewMode::Week),
        (KeyCode::Char('3'), _) => Action::SetView(ViewMode::List),
        (KeyCode::Char('4'), _) => Action::SetView(ViewMode::Timeline),
        (KeyCode::Left, _) | (KeyCode::Char('h'), _) => Action::PrevDay,
        (KeyCode::Right, _) | (KeyCode::Char('l'), _) => Action::NextDay,
        (KeyCode::Up, _) => Action::ScrollUp,
        (KeyCode::Down, _) => Action::ScrollDown,
        (KeyCode::Char('k'), _) => Action::PrevWeek,
        (KeyCode::Char('j'), _) => Action::NextWeek,
        (KeyCode::Char('['), _) => Action::PrevMonth,
        (KeyCode::Char(']'), _) => Action::NextMonth,
        (KeyCode::Char('t'), _) => Action::Today,
        (KeyCode::Char('e'), _) => Action::CycleEventType,
        (KeyCode::Char('s'), _) => Action::CycleSubject,
        (KeyCode::Char('p'), _) => Action::CycleTeacher,
        (KeyCode::Char('c'), _) => Action::CycleClass,
        (KeyCode::Char('/'), _) => Action::BeginSearch,
        (KeyCode::Char('x'), _) => Action::ClearFilters,
        (KeyCode::Char('g'), _) => Action::ToggleTimelineMode,
        (KeyCode::Char('?'), _) => Action::ToggleHelp,
        _ => return None,
    };
    Some(action)
}
