use crossterm::event::{
    self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent,
    MouseEventKind,
};
use ratatui::prelude::*;
use std::io;

use super::actions::{Action, ApplyResult, apply_action, handle_edit_text};
use super::app::{App, Mode};
use super::ui;

/// Map a key press to an action for the current mode. Keys that only feed
/// the edit buffer map to `None`.
pub(crate) fn translate(mode: Mode, key: KeyEvent) -> Option<Action> {
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        return match key.code {
            KeyCode::Char('c') => Some(Action::Quit),
            _ => None,
        };
    }

    if mode == Mode::Edit {
        return match key.code {
            KeyCode::Enter => Some(Action::CommitEdit),
            KeyCode::Esc => Some(Action::Cancel),
            _ => None,
        };
    }

    let movement = match key.code {
        KeyCode::Left | KeyCode::Char('h') => Some(Action::Move(-1, 0)),
        KeyCode::Right | KeyCode::Char('l') => Some(Action::Move(1, 0)),
        KeyCode::Up | KeyCode::Char('k') => Some(Action::Move(0, -1)),
        KeyCode::Down | KeyCode::Char('j') => Some(Action::Move(0, 1)),
        KeyCode::PageUp => Some(Action::Page(-1)),
        KeyCode::PageDown => Some(Action::Page(1)),
        _ => None,
    };
    if movement.is_some() {
        return movement;
    }

    match (mode, key.code) {
        (_, KeyCode::Esc) => Some(Action::Cancel),
        (Mode::Select, KeyCode::Char('f')) => Some(Action::StartFill),
        (Mode::Fill, KeyCode::Enter) => Some(Action::CommitFill),
        (Mode::Select | Mode::Fill, _) => None,

        (_, KeyCode::Enter | KeyCode::F(2)) => Some(Action::EnterEdit),
        (_, KeyCode::Delete | KeyCode::Backspace) => Some(Action::ClearCell),
        (_, KeyCode::Char('q')) => Some(Action::Quit),
        (_, KeyCode::Char('v')) => Some(Action::EnterSelect),
        (_, KeyCode::Char('+')) => Some(Action::IncColWidth),
        (_, KeyCode::Char('-')) => Some(Action::DecColWidth),
        (_, KeyCode::Char(c)) => Some(Action::TypeChar(c)),
        _ => None,
    }
}

pub(crate) fn handle_key(app: &mut App, key: KeyEvent) -> ApplyResult {
    match translate(app.mode, key) {
        Some(action) => apply_action(app, action),
        None => {
            if app.mode == Mode::Edit {
                handle_edit_text(app, key);
            }
            ApplyResult::Continue
        }
    }
}

fn handle_mouse_event(app: &mut App, terminal_area: Rect, mouse: MouseEvent) {
    if mouse.kind != MouseEventKind::Down(MouseButton::Left) {
        return;
    }
    if app.mode != Mode::Normal {
        return;
    }

    let [_formula_area, grid_area, _status_area] = ui::split_main_chunks(terminal_area);
    if let Some((col, row)) = ui::grid_cell_at(app, grid_area, mouse.column, mouse.row) {
        app.goto(row, col);
    }
}

pub fn run_app<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> io::Result<()> {
    loop {
        terminal.draw(|f| ui::draw(f, app))?;

        match event::read()? {
            Event::Key(key) => {
                // Only process key press events (Windows reports Press + Release)
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                if handle_key(app, key) == ApplyResult::Quit {
                    return Ok(());
                }
            }
            Event::Mouse(mouse) => {
                let size = terminal.size()?;
                handle_mouse_event(app, Rect::new(0, 0, size.width, size.height), mouse);
            }
            _ => {}
        }
    }
}
