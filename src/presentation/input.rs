use crate::application::{App, AppMode, EditorEvent};
use crate::infrastructure::{CsvExporter, FileRepository};
use crossterm::event::{KeyCode, KeyModifiers};
use log::warn;

use super::ime::Composer;

#[derive(Debug, Default)]
pub struct InputHandler {
    composer: Composer,
}

impl InputHandler {
    pub fn composer(&self) -> &Composer {
        &self.composer
    }

    pub fn handle_key_event(&mut self, app: &mut App, key: KeyCode, modifiers: KeyModifiers) {
        if app.mode != AppMode::Editing {
            self.composer.reset();
        }

        match app.mode {
            AppMode::Normal => Self::handle_normal_mode(app, key, modifiers),
            AppMode::Editing => self.handle_editing_mode(app, key, modifiers),
            AppMode::Help => Self::handle_help_mode(app, key),
            AppMode::SaveAs | AppMode::LoadFile | AppMode::ExportCsv => {
                Self::handle_filename_input_mode(app, key)
            }
        }
    }

    /// Bracketed paste goes to the editor as a single change.
    pub fn handle_paste(&mut self, app: &mut App, text: String) {
        match app.mode {
            AppMode::Editing if !self.composer.is_active() => {
                app.handle_editor_event(EditorEvent::Paste(text));
            }
            AppMode::SaveAs | AppMode::LoadFile | AppMode::ExportCsv => {
                for c in text.chars().filter(|c| !c.is_control()) {
                    app.filename_insert(c);
                }
            }
            _ => {}
        }
    }

    /// The terminal window lost focus; an open editor commits and closes.
    pub fn handle_focus_lost(&mut self, app: &mut App) {
        self.composer.reset();
        app.blur_editor();
    }

    fn handle_normal_mode(app: &mut App, key: KeyCode, modifiers: KeyModifiers) {
        if modifiers.contains(KeyModifiers::CONTROL) {
            match key {
                KeyCode::Char('s') => {
                    app.start_save_as();
                    return;
                }
                KeyCode::Char('o') => {
                    app.start_load_file();
                    return;
                }
                KeyCode::Char('e') => {
                    app.start_csv_export();
                    return;
                }
                _ => {}
            }
        }

        app.status_message = None;

        match key {
            KeyCode::Up | KeyCode::Char('k') => app.move_cursor(-1, 0),
            KeyCode::Down | KeyCode::Char('j') => app.move_cursor(1, 0),
            KeyCode::Left | KeyCode::Char('h') => app.move_cursor(0, -1),
            KeyCode::Right | KeyCode::Char('l') | KeyCode::Tab => app.move_cursor(0, 1),
            KeyCode::BackTab => app.move_cursor(0, -1),
            KeyCode::Home => app.move_cursor(0, -(app.selected_col as isize)),
            KeyCode::End => app.move_cursor(0, app.column_count() as isize),
            KeyCode::PageUp => app.move_cursor(-(app.viewport_rows as isize), 0),
            KeyCode::PageDown => app.move_cursor(app.viewport_rows as isize, 0),
            KeyCode::Enter | KeyCode::F(2) => app.start_editing(),
            KeyCode::Char(' ') => app.toggle_selected_row(),
            KeyCode::Char('a') => app.toggle_all_rows(),
            KeyCode::Char('-') => app.shrink_column(),
            KeyCode::Char('_') => app.grow_column(),
            KeyCode::F(1) | KeyCode::Char('?') => app.open_help(),
            KeyCode::Char('q') => {
                // Will be handled by main loop
            }
            _ => {}
        }
    }

    fn handle_editing_mode(&mut self, app: &mut App, key: KeyCode, modifiers: KeyModifiers) {
        if is_chord(key, modifiers) {
            return;
        }
        for event in self.composer.translate(key, modifiers) {
            app.handle_editor_event(event);
        }
        if app.mode != AppMode::Editing {
            self.composer.reset();
        }
    }

    fn handle_help_mode(app: &mut App, key: KeyCode) {
        match key {
            KeyCode::Esc | KeyCode::F(1) | KeyCode::Char('?') | KeyCode::Char('q') => {
                app.mode = AppMode::Normal;
            }
            KeyCode::Up | KeyCode::Char('k') => {
                app.help_scroll = app.help_scroll.saturating_sub(1);
            }
            KeyCode::Down | KeyCode::Char('j') => {
                app.help_scroll += 1;
            }
            KeyCode::PageUp => {
                app.help_scroll = app.help_scroll.saturating_sub(5);
            }
            KeyCode::PageDown => {
                app.help_scroll += 5;
            }
            KeyCode::Home => {
                app.help_scroll = 0;
            }
            _ => {}
        }
    }

    fn handle_filename_input_mode(app: &mut App, key: KeyCode) {
        match key {
            KeyCode::Enter => Self::submit_filename(app),
            KeyCode::Esc => app.cancel_filename_input(),
            KeyCode::Backspace => app.filename_backspace(),
            KeyCode::Delete => app.filename_delete(),
            KeyCode::Left => {
                app.cursor_position = app.cursor_position.saturating_sub(1);
            }
            KeyCode::Right => {
                if app.cursor_position < app.filename_input.chars().count() {
                    app.cursor_position += 1;
                }
            }
            KeyCode::Home => {
                app.cursor_position = 0;
            }
            KeyCode::End => {
                app.cursor_position = app.filename_input.chars().count();
            }
            KeyCode::Char(c) => app.filename_insert(c),
            _ => {}
        }
    }

    fn submit_filename(app: &mut App) {
        let filename = app.prompt_filename();
        match app.mode {
            AppMode::SaveAs => {
                let result = FileRepository::save_rows(&app.rows, &filename)
                    .inspect_err(|e| warn!("save to {filename} failed: {e}"))
                    .map_err(|e| e.to_string());
                app.set_save_result(result);
            }
            AppMode::LoadFile => {
                let result = FileRepository::load_rows(&filename)
                    .inspect_err(|e| warn!("load from {filename} failed: {e}"))
                    .map_err(|e| e.to_string());
                app.set_load_result(result);
            }
            AppMode::ExportCsv => {
                let result =
                    CsvExporter::export_rows(&app.rows, &app.columns, &app.settings, &filename)
                        .inspect_err(|e| warn!("export to {filename} failed: {e}"))
                        .map_err(|e| e.to_string());
                app.set_csv_export_result(result);
            }
            _ => {}
        }
    }
}

/// Ctrl/Alt + character is a shortcut, never text. Ctrl+Space is left to
/// the composer.
fn is_chord(key: KeyCode, modifiers: KeyModifiers) -> bool {
    match key {
        KeyCode::Char(' ') => modifiers.contains(KeyModifiers::ALT),
        KeyCode::Char(_) => modifiers.intersects(KeyModifiers::CONTROL | KeyModifiers::ALT),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::{App, AppMode};
    use tempfile::tempdir;

    fn press(handler: &mut InputHandler, app: &mut App, key: KeyCode) {
        handler.handle_key_event(app, key, KeyModifiers::NONE);
    }

    #[test]
    fn test_navigation_and_edit_keys() {
        let mut app = App::default();
        let mut handler = InputHandler::default();

        press(&mut handler, &mut app, KeyCode::Char('j'));
        press(&mut handler, &mut app, KeyCode::Char('j'));
        for _ in 0..4 {
            press(&mut handler, &mut app, KeyCode::Right);
        }
        assert_eq!((app.selected_row, app.selected_col), (2, 4));

        press(&mut handler, &mut app, KeyCode::Enter);
        assert_eq!(app.mode, AppMode::Editing);
        for c in "5000".chars() {
            press(&mut handler, &mut app, KeyCode::Char(c));
        }
        press(&mut handler, &mut app, KeyCode::Enter);

        assert_eq!(app.mode, AppMode::Normal);
        assert_eq!(app.rows.get("3").unwrap().price, "5000");
    }

    #[test]
    fn test_ime_enter_does_not_commit() {
        let mut app = App::default();
        let mut handler = InputHandler::default();
        app.selected_col = 3;
        press(&mut handler, &mut app, KeyCode::Enter);

        handler.handle_key_event(&mut app, KeyCode::Char(' '), KeyModifiers::CONTROL);
        press(&mut handler, &mut app, KeyCode::Char('a'));
        assert!(app.editor.as_ref().unwrap().is_composing());

        // Enter finishes the composition but the cell stays open
        press(&mut handler, &mut app, KeyCode::Enter);
        assert_eq!(app.mode, AppMode::Editing);
        assert_eq!(app.rows.get("1").unwrap().name, "a");
        assert!(!handler.composer().is_active());

        press(&mut handler, &mut app, KeyCode::Enter);
        assert_eq!(app.mode, AppMode::Normal);
        assert_eq!(app.selected_row, 1);
    }

    #[test]
    fn test_ctrl_chord_does_not_edit_cell() {
        let mut app = App::default();
        let mut handler = InputHandler::default();
        app.selected_col = 2;
        press(&mut handler, &mut app, KeyCode::Enter);
        press(&mut handler, &mut app, KeyCode::End);

        for c in ['s', 'c', 'e'] {
            handler.handle_key_event(&mut app, KeyCode::Char(c), KeyModifiers::CONTROL);
        }
        handler.handle_key_event(&mut app, KeyCode::Char('x'), KeyModifiers::ALT);
        assert_eq!(app.mode, AppMode::Editing);
        assert_eq!(app.rows.get("1").unwrap().code, "Code1");

        // Shifted letters are still text, and Ctrl+Space still composes
        handler.handle_key_event(&mut app, KeyCode::Char('S'), KeyModifiers::SHIFT);
        assert_eq!(app.rows.get("1").unwrap().code, "Code1S");
        handler.handle_key_event(&mut app, KeyCode::Char(' '), KeyModifiers::CONTROL);
        assert!(handler.composer().is_active());
    }

    #[test]
    fn test_focus_lost_commits_editor() {
        let mut app = App::default();
        let mut handler = InputHandler::default();
        app.selected_col = 2;
        press(&mut handler, &mut app, KeyCode::F(2));
        press(&mut handler, &mut app, KeyCode::Char('Q'));

        handler.handle_focus_lost(&mut app);
        assert_eq!(app.mode, AppMode::Normal);
        assert_eq!(app.rows.get("1").unwrap().code, "Q");
    }

    #[test]
    fn test_paste_into_editor() {
        let mut app = App::default();
        let mut handler = InputHandler::default();
        app.selected_col = 2;
        press(&mut handler, &mut app, KeyCode::Enter);
        handler.handle_paste(&mut app, "pasted".to_string());
        assert_eq!(app.rows.get("1").unwrap().code, "pasted");
    }

    #[test]
    fn test_space_and_a_toggle_selection() {
        let mut app = App::default();
        let mut handler = InputHandler::default();
        press(&mut handler, &mut app, KeyCode::Char(' '));
        assert!(app.selection.contains("1"));
        press(&mut handler, &mut app, KeyCode::Char('a'));
        assert_eq!(app.selection.len(), 10);
    }

    #[test]
    fn test_save_key_binding() {
        let mut app = App::default();
        let mut handler = InputHandler::default();
        handler.handle_key_event(&mut app, KeyCode::Char('s'), KeyModifiers::CONTROL);
        assert_eq!(app.mode, AppMode::SaveAs);
        assert_eq!(app.filename_input, "rows.json");
    }

    #[test]
    fn test_save_then_load_through_prompts() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("grid.json").display().to_string();

        let mut app = App::default();
        let mut handler = InputHandler::default();
        app.start_save_as();
        app.filename_input = path.clone();
        press(&mut handler, &mut app, KeyCode::Enter);
        assert_eq!(app.status_message, Some(format!("Saved to {path}")));

        let mut other = App::new(crate::domain::RowCollection::sample(2), Default::default());
        other.start_load_file();
        other.filename_input = path.clone();
        press(&mut handler, &mut other, KeyCode::Enter);
        assert_eq!(other.rows.len(), 10);
        assert_eq!(other.mode, AppMode::Normal);
    }

    #[test]
    fn test_export_failure_reports_status() {
        let dir = tempdir().unwrap();
        let mut app = App::default();
        let mut handler = InputHandler::default();
        app.start_csv_export();
        app.filename_input = dir.path().join("missing").join("out.csv").display().to_string();
        press(&mut handler, &mut app, KeyCode::Enter);

        let status = app.status_message.unwrap();
        assert!(status.starts_with("Export failed"), "{status}");
    }

    #[test]
    fn test_filename_prompt_escape() {
        let mut app = App::default();
        let mut handler = InputHandler::default();
        app.start_csv_export();
        press(&mut handler, &mut app, KeyCode::Char('x'));
        assert_eq!(app.filename_input, "rows.csvx");
        press(&mut handler, &mut app, KeyCode::Esc);
        assert_eq!(app.mode, AppMode::Normal);
        assert!(app.filename_input.is_empty());
    }
}
