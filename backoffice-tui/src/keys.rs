//! Keybinding definitions for the TUI.
//!
//! [`map_key`] covers browsing. Editors, the filter prompt and modals read
//! raw key events because they take text input.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Quit,
    NextView,
    PrevView,
    SwitchView(usize),
    MoveUp,
    MoveDown,
    MoveLeft,
    MoveRight,
    ToggleExpand,
    NewItem,
    EditItem,
    DeleteItem,
    MarkDone,
    OpenHelp,
    OpenFilter,
    CycleStatus,
    ClearFilters,
    FirstPage,
    PrevPage,
    NextPage,
    LastPage,
    CyclePageSize,
    NarrowColumn,
    WidenColumn,
    Refresh,
    Confirm,
    Cancel,
}

pub fn map_key(event: KeyEvent) -> Option<Action> {
    let KeyEvent { code, modifiers, .. } = event;

    if modifiers.contains(KeyModifiers::CONTROL) {
        return match code {
            KeyCode::Char('c') => Some(Action::Cancel),
            KeyCode::Char('r') => Some(Action::Refresh),
            _ => None,
        };
    }

    match code {
        KeyCode::Char('q') => Some(Action::Quit),
        KeyCode::Char('?') => Some(Action::OpenHelp),
        KeyCode::Char('/') | KeyCode::Char('f') => Some(Action::OpenFilter),
        KeyCode::Char('s') => Some(Action::CycleStatus),
        KeyCode::Char('c') => Some(Action::ClearFilters),
        KeyCode::Char('n') => Some(Action::NewItem),
        KeyCode::Char('e') => Some(Action::EditItem),
        KeyCode::Char('d') => Some(Action::DeleteItem),
        KeyCode::Char('m') => Some(Action::MarkDone),
        KeyCode::Char('r') => Some(Action::Refresh),
        KeyCode::Char('g') | KeyCode::Home => Some(Action::FirstPage),
        KeyCode::Char('[') | KeyCode::PageUp => Some(Action::PrevPage),
        KeyCode::Char(']') | KeyCode::PageDown => Some(Action::NextPage),
        KeyCode::Char('G') | KeyCode::End => Some(Action::LastPage),
        KeyCode::Char('z') => Some(Action::CyclePageSize),
        KeyCode::Char('<') => Some(Action::NarrowColumn),
        KeyCode::Char('>') => Some(Action::WidenColumn),
        KeyCode::Enter => Some(Action::Confirm),
        KeyCode::Esc => Some(Action::Cancel),
        KeyCode::Tab => Some(Action::NextView),
        KeyCode::BackTab => Some(Action::PrevView),
        KeyCode::Up | KeyCode::Char('k') => Some(Action::MoveUp),
        KeyCode::Down | KeyCode::Char('j') => Some(Action::MoveDown),
        KeyCode::Left | KeyCode::Char('h') => Some(Action::MoveLeft),
        KeyCode::Right | KeyCode::Char('l') => Some(Action::MoveRight),
        KeyCode::Char(' ') | KeyCode::Char('x') => Some(Action::ToggleExpand),
        KeyCode::Char(c) if c.is_ascii_digit() => {
            let idx = match c {
                '0' => 9,
                d => d.to_digit(10)? as usize - 1,
            };
            Some(Action::SwitchView(idx))
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn test_paging_keys() {
        assert_eq!(map_key(key(KeyCode::Char('['))), Some(Action::PrevPage));
        assert_eq!(map_key(key(KeyCode::Char(']'))), Some(Action::NextPage));
        assert_eq!(map_key(key(KeyCode::Char('g'))), Some(Action::FirstPage));
        assert_eq!(map_key(key(KeyCode::Char('G'))), Some(Action::LastPage));
    }

    #[test]
    fn test_control_modifier() {
        let event = KeyEvent::new(KeyCode::Char('r'), KeyModifiers::CONTROL);
        assert_eq!(map_key(event), Some(Action::Refresh));
        let event = KeyEvent::new(KeyCode::Char('q'), KeyModifiers::CONTROL);
        assert_eq!(map_key(event), None);
    }

    #[test]
    fn test_digit_zero_is_tenth_view() {
        assert_eq!(map_key(key(KeyCode::Char('0'))), Some(Action::SwitchView(9)));
        assert_eq!(map_key(key(KeyCode::Char('1'))), Some(Action::SwitchView(0)));
    }
}
