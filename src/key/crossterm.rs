//! Conversion from crossterm terminal events

use super::{Key, KeyEvent, Modifiers};
use ::crossterm::event::{KeyCode, KeyModifiers};

impl From<::crossterm::event::KeyEvent> for KeyEvent {
    fn from(event: ::crossterm::event::KeyEvent) -> Self {
        let mut modifiers = Modifiers::NONE;
        if event.modifiers.contains(KeyModifiers::CONTROL) {
            modifiers = modifiers | Modifiers::CTRL;
        }
        if event.modifiers.contains(KeyModifiers::ALT) {
            modifiers = modifiers | Modifiers::ALT;
        }
        if event.modifiers.contains(KeyModifiers::META) || event.modifiers.contains(KeyModifiers::SUPER) {
            modifiers = modifiers | Modifiers::META;
        }
        if event.modifiers.contains(KeyModifiers::SHIFT) {
            modifiers = modifiers | Modifiers::SHIFT;
        }

        let key = match event.code {
            // Some terminals deliver Enter as a raw character
            KeyCode::Char('\r') | KeyCode::Char('\n') => Key::Enter,
            KeyCode::Char(c) => {
                // The character already carries the shift state
                modifiers = modifiers.without(Modifiers::SHIFT);
                Key::Char(c)
            }
            KeyCode::Backspace => Key::Backspace,
            KeyCode::Enter => Key::Enter,
            KeyCode::Esc => Key::Escape,
            KeyCode::Tab => Key::Tab,
            KeyCode::BackTab => {
                modifiers = modifiers | Modifiers::SHIFT;
                Key::Tab
            }
            KeyCode::Delete => Key::Delete,
            KeyCode::Insert => Key::Insert,
            KeyCode::Up => Key::Up,
            KeyCode::Down => Key::Down,
            KeyCode::Left => Key::Left,
            KeyCode::Right => Key::Right,
            KeyCode::Home => Key::Home,
            KeyCode::End => Key::End,
            KeyCode::PageUp => Key::PageUp,
            KeyCode::PageDown => Key::PageDown,
            KeyCode::F(n) if (1..=12).contains(&n) => Key::F(n),
            _ => Key::Nop,
        };

        KeyEvent::new(key, modifiers)
    }
}
