use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use log::{trace, warn};

use crate::core::keys::{Key, KeyEvent, Modifiers};

/// TUI-specific input events
#[derive(Debug, Clone, PartialEq)]
pub enum TuiEvent {
    /// A key press, already translated into the dispatcher's key model
    Key(KeyEvent),
    /// Bracketed paste - preserves newlines
    Paste(String),
    /// Terminal resized, only needs a redraw
    Resize,
}

/// Poll for an event without blocking (returns immediately)
pub fn poll_event_immediate() -> Option<TuiEvent> {
    poll_event_timeout(Duration::ZERO)
}

/// Poll for an event, blocking up to `timeout`
pub fn poll_event_timeout(timeout: Duration) -> Option<TuiEvent> {
    match event::poll(timeout) {
        Ok(true) => {}
        Ok(false) => return None,
        Err(e) => {
            warn!("Failed to poll terminal events: {}", e);
            return None;
        }
    }

    let event = match event::read() {
        Ok(event) => event,
        Err(e) => {
            warn!("Failed to read terminal event: {}", e);
            return None;
        }
    };

    match event {
        Event::Key(key_event) => {
            // Releases and repeats are reported by terminals with keyboard enhancement
            if key_event.kind != KeyEventKind::Press {
                return None;
            }
            trace!("Key event: {:?} with modifiers {:?}", key_event.code, key_event.modifiers);
            translate_key(key_event.code, key_event.modifiers).map(TuiEvent::Key)
        }
        Event::Paste(data) => Some(TuiEvent::Paste(data)),
        Event::Resize(_, _) => Some(TuiEvent::Resize),
        _ => None,
    }
}

/// Translate a crossterm key into a dispatcher `KeyEvent`.
///
/// Ctrl + letter becomes `Key::Ctrl`; an unmodified or shifted character is a
/// rune. Alt + character and Ctrl + non-letter are dropped so they never fire a
/// rune binding. Ctrl + Alt + character is kept as a rune (AltGr on Windows).
/// Returns `None` for keys docterm has no name for (media keys, lone modifiers).
pub fn translate_key(code: KeyCode, modifiers: KeyModifiers) -> Option<KeyEvent> {
    let mods = translate_modifiers(modifiers);
    let ctrl = modifiers.contains(KeyModifiers::CONTROL);
    let alt = modifiers.contains(KeyModifiers::ALT);

    let event = match code {
        KeyCode::Char(c) if ctrl && !alt && c.is_ascii_alphabetic() => KeyEvent::ctrl(c),
        KeyCode::Char(_) if ctrl != alt => return None,
        KeyCode::Char(c) => KeyEvent::rune(c),
        KeyCode::Enter => KeyEvent::key(Key::Enter),
        KeyCode::Tab => KeyEvent::key(Key::Tab),
        KeyCode::BackTab => KeyEvent::key(Key::BackTab),
        KeyCode::Esc => KeyEvent::key(Key::Esc),
        KeyCode::Backspace => KeyEvent::key(Key::Backspace),
        KeyCode::Delete => KeyEvent::key(Key::Delete),
        KeyCode::Insert => KeyEvent::key(Key::Insert),
        KeyCode::Up => KeyEvent::key(Key::Up),
        KeyCode::Down => KeyEvent::key(Key::Down),
        KeyCode::Left => KeyEvent::key(Key::Left),
        KeyCode::Right => KeyEvent::key(Key::Right),
        KeyCode::Home => KeyEvent::key(Key::Home),
        KeyCode::End => KeyEvent::key(Key::End),
        KeyCode::PageUp => KeyEvent::key(Key::PageUp),
        KeyCode::PageDown => KeyEvent::key(Key::PageDown),
        KeyCode::F(n) => KeyEvent::key(Key::F(n)),
        _ => return None,
    };

    Some(event.with_modifiers(mods))
}

fn translate_modifiers(modifiers: KeyModifiers) -> Modifiers {
    let mut mods = Modifiers::NONE;
    if modifiers.contains(KeyModifiers::SHIFT) {
        mods = mods | Modifiers::SHIFT;
    }
    if modifiers.contains(KeyModifiers::CONTROL) {
        mods = mods | Modifiers::CTRL;
    }
    if modifiers.contains(KeyModifiers::ALT) {
        mods = mods | Modifiers::ALT;
    }
    mods
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_char_is_rune() {
        let event = translate_key(KeyCode::Char('j'), KeyModifiers::NONE).unwrap();
        assert_eq!(event.key, Key::Rune);
        assert_eq!(event.rune, Some('j'));
        assert!(event.modifiers.is_empty());
    }

    #[test]
    fn test_shifted_char_keeps_case_and_modifier() {
        let event = translate_key(KeyCode::Char('E'), KeyModifiers::SHIFT).unwrap();
        assert_eq!(event.rune, Some('E'));
        assert!(event.modifiers.contains(Modifiers::SHIFT));
    }

    #[test]
    fn test_ctrl_letter_is_ctrl_key() {
        let event = translate_key(KeyCode::Char('S'), KeyModifiers::CONTROL).unwrap();
        assert_eq!(event.key, Key::Ctrl('s'));
        assert_eq!(event.rune, None);
        assert!(event.modifiers.contains(Modifiers::CTRL));
    }

    #[test]
    fn test_alt_is_carried() {
        let event = translate_key(KeyCode::Left, KeyModifiers::ALT).unwrap();
        assert_eq!(event.key, Key::Left);
        assert!(event.modifiers.contains(Modifiers::ALT));
    }

    #[test]
    fn test_alt_char_is_not_a_rune() {
        assert!(translate_key(KeyCode::Char('e'), KeyModifiers::ALT).is_none());
        assert!(translate_key(KeyCode::Char('/'), KeyModifiers::CONTROL).is_none());
        let altgr = translate_key(KeyCode::Char('@'), KeyModifiers::CONTROL | KeyModifiers::ALT);
        assert_eq!(altgr.unwrap().rune, Some('@'));
    }

    #[test]
    fn test_named_keys() {
        let key = |code| translate_key(code, KeyModifiers::NONE).unwrap().key;
        assert_eq!(key(KeyCode::BackTab), Key::BackTab);
        assert_eq!(key(KeyCode::F(5)), Key::F(5));
        assert_eq!(key(KeyCode::PageDown), Key::PageDown);
    }

    #[test]
    fn test_unnamed_keys_are_dropped() {
        assert!(translate_key(KeyCode::CapsLock, KeyModifiers::NONE).is_none());
        assert!(translate_key(KeyCode::Null, KeyModifiers::NONE).is_none());
    }
}
