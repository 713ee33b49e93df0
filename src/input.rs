//! Key bindings: arrows plus vim-style hjkl.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// Action from a key press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    MoveLeft,
    MoveRight,
    SoftDrop,
    Rotate,
    ToggleData,
    Quit,
    None,
}

/// Map key event to game action.
pub fn key_to_action(key: KeyEvent) -> Action {
    let KeyEvent {
        code, modifiers, ..
    } = key;
    if modifiers == KeyModifiers::CONTROL {
        return match code {
            KeyCode::Char('c') => Action::Quit,
            _ => Action::None,
        };
    }
    let no_mod = modifiers.is_empty() || modifiers == KeyModifiers::SHIFT;
    if !no_mod {
        return Action::None;
    }
    match code {
        KeyCode::Esc => Action::Quit,
        KeyCode::Char('q') | KeyCode::Char('Q') => Action::ToggleData,
        KeyCode::Left | KeyCode::Char('h') => Action::MoveLeft,
        KeyCode::Right | KeyCode::Char('l') => Action::MoveRight,
        KeyCode::Down | KeyCode::Char('j') => Action::SoftDrop,
        KeyCode::Up | KeyCode::Char('k') => Action::Rotate,
        _ => Action::None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(code: KeyCode, modifiers: KeyModifiers) -> Action {
        key_to_action(KeyEvent::new(code, modifiers))
    }

    #[test]
    fn arrows_and_vim_keys_agree() {
        let none = KeyModifiers::NONE;
        assert_eq!(press(KeyCode::Left, none), press(KeyCode::Char('h'), none));
        assert_eq!(press(KeyCode::Right, none), press(KeyCode::Char('l'), none));
        assert_eq!(press(KeyCode::Down, none), Action::SoftDrop);
        assert_eq!(press(KeyCode::Up, none), Action::Rotate);
        assert_eq!(press(KeyCode::Char('k'), none), Action::Rotate);
    }

    #[test]
    fn q_toggles_overlay_and_escape_quits() {
        assert_eq!(press(KeyCode::Char('q'), KeyModifiers::NONE), Action::ToggleData);
        assert_eq!(press(KeyCode::Esc, KeyModifiers::NONE), Action::Quit);
        assert_eq!(press(KeyCode::Char('c'), KeyModifiers::CONTROL), Action::Quit);
    }

    #[test]
    fn other_modifiers_are_ignored() {
        assert_eq!(press(KeyCode::Left, KeyModifiers::ALT), Action::None);
        assert_eq!(press(KeyCode::Char('q'), KeyModifiers::CONTROL), Action::None);
    }
}
