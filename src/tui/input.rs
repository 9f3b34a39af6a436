use std::time::Duration;
use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use crate::shared::{InputEvent, Page, DRIVE_STEP, SCALE_STEP, TEMPO_STEP};
use super::mode::TuiState;

// poll for input from the terminal and resolve it into semantic input events
// for the middle layer, based on the page and whether a text box is open
pub fn poll_input(timeout: Duration, ts: &TuiState) -> anyhow::Result<Vec<InputEvent>> {
    if !event::poll(timeout)? {
        return Ok(vec![]);
    }

    match event::read()? {
        Event::Key(key) if key.kind == KeyEventKind::Press => Ok(handle_key(key.code, ts)),
        Event::Resize(width, height) => Ok(vec![InputEvent::Resize { width, height }]),
        _ => Ok(vec![]),
    }
}

fn handle_key(code: KeyCode, ts: &TuiState) -> Vec<InputEvent> {
    if ts.entry.is_some() {
        return resolve_text(code);
    }
    if code == KeyCode::Tab {
        return vec![InputEvent::TogglePage];
    }
    match ts.page {
        Page::Garden => resolve_garden(code),
        Page::Explore => resolve_explore(code),
    }
}

// text box open: everything printable is typed
fn resolve_text(code: KeyCode) -> Vec<InputEvent> {
    match code {
        KeyCode::Enter => vec![InputEvent::TextSubmit],
        KeyCode::Esc => vec![InputEvent::TextCancel],
        KeyCode::Backspace => vec![InputEvent::TextBackspace],
        KeyCode::Char(c) => vec![InputEvent::TextInput(c)],
        _ => vec![],
    }
}

fn resolve_garden(code: KeyCode) -> Vec<InputEvent> {
    match code {
        KeyCode::Esc => vec![InputEvent::Quit],
        KeyCode::Char(' ') => vec![InputEvent::TogglePlay],

        // lower tracks are lower notes, so Up moves toward track 0
        KeyCode::Up => vec![InputEvent::MoveCursor { tracks: -1, steps: 0 }],
        KeyCode::Down => vec![InputEvent::MoveCursor { tracks: 1, steps: 0 }],
        KeyCode::Left => vec![InputEvent::MoveCursor { tracks: 0, steps: -1 }],
        KeyCode::Right => vec![InputEvent::MoveCursor { tracks: 0, steps: 1 }],
        KeyCode::Enter => vec![InputEvent::ToggleCell],
        KeyCode::Char('r') => vec![InputEvent::RandomPlant],

        KeyCode::Char('[') => vec![InputEvent::AdjustTempo(-TEMPO_STEP)],
        KeyCode::Char(']') => vec![InputEvent::AdjustTempo(TEMPO_STEP)],

        // plant editor, acts on the plant under the cursor
        KeyCode::Char('-') => vec![InputEvent::AdjustScale(-SCALE_STEP)],
        KeyCode::Char('=') => vec![InputEvent::AdjustScale(SCALE_STEP)],
        KeyCode::Char(',') => vec![InputEvent::AdjustDrive(-DRIVE_STEP)],
        KeyCode::Char('.') => vec![InputEvent::AdjustDrive(DRIVE_STEP)],
        KeyCode::Char('b') => vec![InputEvent::ToggleCrush],

        KeyCode::Char('s') => vec![InputEvent::Save],
        KeyCode::Char('n') => vec![InputEvent::BeginRename],
        _ => vec![],
    }
}

fn resolve_explore(code: KeyCode) -> Vec<InputEvent> {
    match code {
        KeyCode::Esc => vec![InputEvent::Quit],
        KeyCode::Left => vec![InputEvent::ScrollCarousel(-1)],
        KeyCode::Right => vec![InputEvent::ScrollCarousel(1)],
        KeyCode::Char('/') => vec![InputEvent::BeginSearch],
        KeyCode::Enter => vec![InputEvent::OpenCentered],
        KeyCode::Char('R') => vec![InputEvent::ReloadExplore],
        _ => vec![],
    }
}
