//! A minimal input method for terminals.
//!
//! Terminals hand the application finished characters and never report
//! composition events, so the grid emulates one: Ctrl+Space opens a
//! composition, typed characters build the pre-edit string, and Enter
//! finishes it. The Enter is delivered to the editor before the composition
//! ends, as a platform input method does, and the editor is expected to
//! swallow it.

use crossterm::event::{KeyCode, KeyModifiers};

use crate::application::EditorEvent;

#[derive(Debug, Default)]
pub struct Composer {
    preedit: Option<String>,
}

impl Composer {
    pub fn is_active(&self) -> bool {
        self.preedit.is_some()
    }

    pub fn preedit(&self) -> Option<&str> {
        self.preedit.as_deref()
    }

    pub fn reset(&mut self) {
        self.preedit = None;
    }

    /// Translates one key press into the events the editor receives.
    pub fn translate(&mut self, key: KeyCode, modifiers: KeyModifiers) -> Vec<EditorEvent> {
        if is_toggle(key, modifiers) {
            return match self.preedit.take() {
                Some(text) => vec![EditorEvent::CompositionEnd(text)],
                None => {
                    self.preedit = Some(String::new());
                    vec![EditorEvent::CompositionStart]
                }
            };
        }

        let Some(preedit) = self.preedit.as_mut() else {
            return vec![EditorEvent::Key(key)];
        };

        match key {
            KeyCode::Char(c) => {
                preedit.push(c);
                vec![EditorEvent::CompositionUpdate(preedit.clone())]
            }
            KeyCode::Backspace => {
                preedit.pop();
                vec![EditorEvent::CompositionUpdate(preedit.clone())]
            }
            KeyCode::Enter => {
                let text = self.preedit.take().unwrap_or_default();
                vec![EditorEvent::Key(KeyCode::Enter), EditorEvent::CompositionEnd(text)]
            }
            KeyCode::Esc => {
                self.preedit = None;
                vec![EditorEvent::CompositionEnd(String::new())]
            }
            _ => Vec::new(),
        }
    }
}

fn is_toggle(key: KeyCode, modifiers: KeyModifiers) -> bool {
    match key {
        KeyCode::Char(' ') => modifiers.contains(KeyModifiers::CONTROL),
        // Many terminals report Ctrl+Space as NUL.
        KeyCode::Null => true,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_passthrough_when_inactive() {
        let mut composer = Composer::default();
        assert_eq!(
            composer.translate(KeyCode::Char('a'), KeyModifiers::NONE),
            vec![EditorEvent::Key(KeyCode::Char('a'))]
        );
        assert!(!composer.is_active());
    }

    #[test]
    fn test_composition_session() {
        let mut composer = Composer::default();
        assert_eq!(
            composer.translate(KeyCode::Char(' '), KeyModifiers::CONTROL),
            vec![EditorEvent::CompositionStart]
        );
        assert!(composer.is_active());

        composer.translate(KeyCode::Char('k'), KeyModifiers::NONE);
        assert_eq!(
            composer.translate(KeyCode::Char('a'), KeyModifiers::NONE),
            vec![EditorEvent::CompositionUpdate("ka".to_string())]
        );
        assert_eq!(
            composer.translate(KeyCode::Backspace, KeyModifiers::NONE),
            vec![EditorEvent::CompositionUpdate("k".to_string())]
        );
        assert_eq!(composer.preedit(), Some("k"));

        assert_eq!(
            composer.translate(KeyCode::Enter, KeyModifiers::NONE),
            vec![
                EditorEvent::Key(KeyCode::Enter),
                EditorEvent::CompositionEnd("k".to_string())
            ]
        );
        assert!(!composer.is_active());
    }

    #[test]
    fn test_escape_cancels_composition() {
        let mut composer = Composer::default();
        composer.translate(KeyCode::Null, KeyModifiers::NONE);
        composer.translate(KeyCode::Char('x'), KeyModifiers::NONE);
        assert_eq!(
            composer.translate(KeyCode::Esc, KeyModifiers::NONE),
            vec![EditorEvent::CompositionEnd(String::new())]
        );
        assert!(!composer.is_active());
    }

    #[test]
    fn test_toggle_commits_preedit() {
        let mut composer = Composer::default();
        composer.translate(KeyCode::Char(' '), KeyModifiers::CONTROL);
        composer.translate(KeyCode::Char('z'), KeyModifiers::NONE);
        assert_eq!(
            composer.translate(KeyCode::Char(' '), KeyModifiers::CONTROL),
            vec![EditorEvent::CompositionEnd("z".to_string())]
        );
    }

    #[test]
    fn test_other_keys_swallowed_while_composing() {
        let mut composer = Composer::default();
        composer.translate(KeyCode::Char(' '), KeyModifiers::CONTROL);
        assert!(composer.translate(KeyCode::Left, KeyModifiers::NONE).is_empty());
        assert!(composer.is_active());
    }
}
