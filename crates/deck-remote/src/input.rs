//! Input event forwarder — turns local input into session operations.
//!
//! Keyboard events map to the same logical operations the backend can drive
//! over the wire; raw controller events are never interpreted locally, they
//! are forwarded verbatim as byte triples.

use ratatui::crossterm::event::{KeyCode, KeyEvent, KeyEventKind};

use deck_proto::protocol::UiBackCommand;

/// Logical navigation events, shared by keyboard and remote replay.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UiEvent {
    Enter,
    Back,
    Scroll(i32),
    Quit,
}

/// Map a key press to a logical event.  Repeats and releases are ignored.
pub fn map_key(key: &KeyEvent) -> Option<UiEvent> {
    if key.kind != KeyEventKind::Press {
        return None;
    }
    match key.code {
        KeyCode::Up | KeyCode::Char('k') => Some(UiEvent::Scroll(-1)),
        KeyCode::Down | KeyCode::Char('j') => Some(UiEvent::Scroll(1)),
        KeyCode::PageUp => Some(UiEvent::Scroll(-5)),
        KeyCode::PageDown => Some(UiEvent::Scroll(5)),
        KeyCode::Enter => Some(UiEvent::Enter),
        KeyCode::Left | KeyCode::Backspace => Some(UiEvent::Back),
        KeyCode::Char('q') | KeyCode::Esc => Some(UiEvent::Quit),
        _ => None,
    }
}

/// Wrap one opaque controller event for the backend.
pub fn midi_command(device: &str, bytes: [u8; 3]) -> UiBackCommand {
    UiBackCommand::MIDI(device.to_string(), bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::crossterm::event::KeyModifiers;

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn test_navigation_keys() {
        assert_eq!(map_key(&press(KeyCode::Up)), Some(UiEvent::Scroll(-1)));
        assert_eq!(map_key(&press(KeyCode::Char('j'))), Some(UiEvent::Scroll(1)));
        assert_eq!(map_key(&press(KeyCode::Enter)), Some(UiEvent::Enter));
        assert_eq!(map_key(&press(KeyCode::Backspace)), Some(UiEvent::Back));
        assert_eq!(map_key(&press(KeyCode::Char('q'))), Some(UiEvent::Quit));
        assert_eq!(map_key(&press(KeyCode::Char('x'))), None);
    }

    #[test]
    fn test_release_is_ignored() {
        let mut key = press(KeyCode::Enter);
        key.kind = KeyEventKind::Release;
        assert_eq!(map_key(&key), None);
    }

    #[test]
    fn test_midi_bytes_pass_through_verbatim() {
        match midi_command("DN-SC2000", [176, 84, 65]) {
            UiBackCommand::MIDI(device, bytes) => {
                assert_eq!(device, "DN-SC2000");
                assert_eq!(bytes, [176, 84, 65]);
            }
            _ => panic!("Wrong command type"),
        }
    }
}
