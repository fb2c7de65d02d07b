//! In-place text editor for a single grid cell.
//!
//! The editor owns a copy of the row being edited and reports every change
//! back to the grid as an [`EditorOutcome`]. It also tracks whether an input
//! method composition is open so that the Enter which finishes a composed
//! character sequence is not taken as "commit the cell".

use crossterm::event::KeyCode;
use log::{debug, trace};

use crate::domain::{Row, TextField};

/// Input delivered to the editor while it has focus.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditorEvent {
    Key(KeyCode),
    CompositionStart,
    /// The input method's current pre-edit string.
    CompositionUpdate(String),
    /// The composition finished with the given text (empty when cancelled).
    CompositionEnd(String),
    Paste(String),
    Blur,
}

/// What the grid should do after the editor handled an event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditorOutcome {
    /// The text changed; the grid should swap in this row.
    Changed(Row),
    /// The editor closed itself.
    Close { commit: bool },
    /// The key is not the editor's business; the grid handles it.
    Propagate(KeyCode),
    /// The key was swallowed because a composition is in progress.
    Suppressed,
    /// Consumed with no visible effect on the row (cursor moves and such).
    Handled,
    /// The editor is already closed.
    Ignored,
}

/// Snapshot of the editor used for drawing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditorView {
    pub text: String,
    pub cursor: usize,
    pub selection: Option<(usize, usize)>,
    pub preedit: Option<String>,
    pub focused: bool,
}

#[derive(Debug, Clone)]
pub struct CellEditor {
    row: Row,
    field: TextField,
    text: String,
    /// Cursor position in chars.
    cursor: usize,
    /// Selected char range, start inclusive, end exclusive.
    selection: Option<(usize, usize)>,
    composing: bool,
    preedit: String,
    focused: bool,
    closed: bool,
}

impl CellEditor {
    /// Opens an editor on `field` of `row`.
    ///
    /// Mounting takes focus and selects the whole value. This happens once;
    /// nothing else in the editor reselects the text.
    pub fn mount(row: Row, field: TextField) -> Self {
        let text = row.text(field).to_string();
        let len = text.chars().count();
        debug!("editor mounted on row {} field {:?}", row.id, field);

        Self {
            row,
            field,
            text,
            cursor: len,
            selection: Some((0, len)),
            composing: false,
            preedit: String::new(),
            focused: true,
            closed: false,
        }
    }

    pub fn row(&self) -> &Row {
        &self.row
    }

    pub fn field(&self) -> TextField {
        self.field
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn is_composing(&self) -> bool {
        self.composing
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn render_state(&self) -> EditorView {
        EditorView {
            text: self.text.clone(),
            cursor: self.cursor,
            selection: self.selection,
            preedit: (self.composing && !self.preedit.is_empty()).then(|| self.preedit.clone()),
            focused: self.focused,
        }
    }

    pub fn handle_event(&mut self, event: EditorEvent) -> EditorOutcome {
        if self.closed {
            return EditorOutcome::Ignored;
        }

        match event {
            EditorEvent::Key(key) => self.handle_key(key),
            EditorEvent::CompositionStart => {
                trace!("composition start");
                self.composing = true;
                self.preedit.clear();
                EditorOutcome::Handled
            }
            EditorEvent::CompositionUpdate(preedit) => {
                self.composing = true;
                self.preedit = preedit;
                EditorOutcome::Handled
            }
            EditorEvent::CompositionEnd(text) => {
                trace!("composition end with {:?}", text);
                self.composing = false;
                self.preedit.clear();
                if text.is_empty() {
                    EditorOutcome::Handled
                } else {
                    self.insert_str(&text)
                }
            }
            EditorEvent::Paste(text) if text.is_empty() => EditorOutcome::Handled,
            EditorEvent::Paste(text) => self.insert_str(&text),
            EditorEvent::Blur => self.close(true),
        }
    }

    fn handle_key(&mut self, key: KeyCode) -> EditorOutcome {
        match key {
            KeyCode::Enter if self.composing => {
                debug!("enter suppressed during composition");
                EditorOutcome::Suppressed
            }
            KeyCode::Enter => EditorOutcome::Propagate(KeyCode::Enter),
            KeyCode::Esc if self.composing => EditorOutcome::Suppressed,
            KeyCode::Esc => self.close(false),
            KeyCode::Char(c) => {
                let mut buf = [0u8; 4];
                self.insert_str(c.encode_utf8(&mut buf))
            }
            KeyCode::Backspace => {
                if self.delete_selection() {
                    return self.changed();
                }
                if self.cursor == 0 {
                    return EditorOutcome::Handled;
                }
                self.cursor -= 1;
                let at = self.byte_index(self.cursor);
                self.text.remove(at);
                self.changed()
            }
            KeyCode::Delete => {
                if self.delete_selection() {
                    return self.changed();
                }
                if self.cursor >= self.char_len() {
                    return EditorOutcome::Handled;
                }
                let at = self.byte_index(self.cursor);
                self.text.remove(at);
                self.changed()
            }
            KeyCode::Left => {
                self.cursor = match self.selection.take() {
                    Some((start, _)) => start,
                    None => self.cursor.saturating_sub(1),
                };
                EditorOutcome::Handled
            }
            KeyCode::Right => {
                self.cursor = match self.selection.take() {
                    Some((_, end)) => end,
                    None => (self.cursor + 1).min(self.char_len()),
                };
                EditorOutcome::Handled
            }
            KeyCode::Home => {
                self.selection = None;
                self.cursor = 0;
                EditorOutcome::Handled
            }
            KeyCode::End => {
                self.selection = None;
                self.cursor = self.char_len();
                EditorOutcome::Handled
            }
            // Everything else stays inside the input; only Enter reaches the grid.
            _ => EditorOutcome::Handled,
        }
    }

    fn close(&mut self, commit: bool) -> EditorOutcome {
        debug!("editor on row {} closed (commit: {})", self.row.id, commit);
        self.closed = true;
        self.focused = false;
        self.composing = false;
        EditorOutcome::Close { commit }
    }

    fn insert_str(&mut self, s: &str) -> EditorOutcome {
        self.delete_selection();
        let at = self.byte_index(self.cursor);
        self.text.insert_str(at, s);
        self.cursor += s.chars().count();
        self.changed()
    }

    fn delete_selection(&mut self) -> bool {
        match self.selection.take() {
            Some((start, end)) if start < end => {
                let from = self.byte_index(start);
                let to = self.byte_index(end);
                self.text.replace_range(from..to, "");
                self.cursor = start;
                true
            }
            _ => false,
        }
    }

    fn changed(&mut self) -> EditorOutcome {
        self.row = self.row.with_field(self.field, self.text.clone());
        EditorOutcome::Changed(self.row.clone())
    }

    fn char_len(&self) -> usize {
        self.text.chars().count()
    }

    fn byte_index(&self, char_pos: usize) -> usize {
        self.text
            .char_indices()
            .nth(char_pos)
            .map(|(i, _)| i)
            .unwrap_or(self.text.len())
    }
}
