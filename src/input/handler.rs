use crate::app::App;
use crate::persistence::KeyValueStore;
use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// Handle keyboard input events. Returns true when the view should close.
///
/// Quitting leaves a running timer running; it resumes on the next launch.
pub fn handle_key<S: KeyValueStore>(app: &mut App<S>, key: KeyEvent) -> Result<bool> {
    app.status_message = None;

    match key.code {
        KeyCode::Up | KeyCode::Char('k') => {
            app.move_selection_up();
            Ok(false)
        }
        KeyCode::Down | KeyCode::Char('j') => {
            app.move_selection_down();
            Ok(false)
        }

        // Start/stop selected
        KeyCode::Enter | KeyCode::Char(' ') => {
            app.toggle_selected()?;
            Ok(false)
        }

        KeyCode::Char('s') => {
            app.stop()?;
            Ok(false)
        }

        KeyCode::Char('f') => {
            app.cycle_category_filter();
            Ok(false)
        }

        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => Ok(true),
        KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => Ok(true),

        _ => Ok(false),
    }
}
