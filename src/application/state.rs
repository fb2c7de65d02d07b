//! Application state management for the row grid.
//!
//! This module contains the grid state, mode handling, and the glue between
//! the cell editor and the row collection.

use crossterm::event::KeyCode;
use log::{debug, info, warn};

use super::editor::{CellEditor, EditorEvent, EditorOutcome};
use crate::domain::{
    ColumnDef, DEFAULT_ROW_COUNT, DomainError, FormatSettings, Row, RowCollection, SelectionSet,
    default_columns,
};

pub const DEFAULT_SAVE_FILENAME: &str = "rows.json";
pub const DEFAULT_CSV_FILENAME: &str = "rows.csv";

/// Represents the current mode of the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppMode {
    /// Normal navigation mode - arrow keys move the cursor, shortcuts available
    Normal,
    /// A cell editor is open
    Editing,
    /// Help screen is displayed
    Help,
    /// Save dialog is open
    SaveAs,
    /// Load dialog is open
    LoadFile,
    /// CSV export dialog is open
    ExportCsv,
}

/// Main application state: the rows, the selection and all UI state.
///
/// Column index 0 is the selection checkbox column; data columns follow
/// from index 1 in the order of [`App::columns`].
///
/// # Examples
///
/// ```
/// use rowgrid::application::App;
///
/// let app = App::default();
/// assert_eq!(app.rows.len(), 10);
/// assert_eq!(app.selected_row, 0);
/// ```
#[derive(Debug)]
pub struct App {
    /// The row collection backing the grid
    pub rows: RowCollection,
    /// Ids of rows ticked in the checkbox column
    pub selection: SelectionSet,
    /// Data column definitions
    pub columns: Vec<ColumnDef>,
    /// Locale, currency and time zone for cell formatters
    pub settings: FormatSettings,
    /// Cursor row (zero-based index into `rows`)
    pub selected_row: usize,
    /// Cursor column (0 is the checkbox column)
    pub selected_col: usize,
    /// Top row visible in the viewport
    pub scroll_row: usize,
    /// Current application mode
    pub mode: AppMode,
    /// The open cell editor, if any
    pub editor: Option<CellEditor>,
    /// The edited row as it was before the editor opened
    edit_snapshot: Option<Row>,
    /// Current filename (if rows have been saved/loaded)
    pub filename: Option<String>,
    /// Scroll position in help text
    pub help_scroll: usize,
    /// Temporary status message to display
    pub status_message: Option<String>,
    /// Input buffer for filename entry
    pub filename_input: String,
    /// Cursor position within the filename input
    pub cursor_position: usize,
    /// Number of data rows that fit in the viewport
    pub viewport_rows: usize,
}

impl Default for App {
    fn default() -> Self {
        Self::new(RowCollection::sample(DEFAULT_ROW_COUNT), FormatSettings::default())
    }
}

impl App {
    pub fn new(rows: RowCollection, settings: FormatSettings) -> Self {
        Self {
            rows,
            selection: SelectionSet::default(),
            columns: default_columns(),
            settings,
            selected_row: 0,
            selected_col: 0,
            scroll_row: 0,
            mode: AppMode::Normal,
            editor: None,
            edit_snapshot: None,
            filename: None,
            help_scroll: 0,
            status_message: None,
            filename_input: String::new(),
            cursor_position: 0,
            viewport_rows: 20,
        }
    }

    /// Total number of columns including the checkbox column.
    pub fn column_count(&self) -> usize {
        self.columns.len() + 1
    }

    /// The data column under the cursor, or `None` on the checkbox column.
    pub fn current_column(&self) -> Option<&ColumnDef> {
        self.selected_col
            .checked_sub(1)
            .and_then(|index| self.columns.get(index))
    }

    pub fn current_row(&self) -> Option<&Row> {
        self.rows.get_index(self.selected_row)
    }

    /// Opens the editor on the cell under the cursor.
    ///
    /// On the checkbox column this toggles the row's selection instead, and
    /// read-only columns only report a status message.
    pub fn start_editing(&mut self) {
        let target = self
            .current_column()
            .map(|column| (column.key.text_field().filter(|_| column.editable), column.name));
        let Some((field, name)) = target else {
            self.toggle_selected_row();
            return;
        };
        let Some(field) = field else {
            self.status_message = Some(DomainError::ReadOnlyColumn(name).to_string());
            return;
        };
        let Some(row) = self.current_row().cloned() else {
            return;
        };

        self.edit_snapshot = Some(row.clone());
        self.editor = Some(CellEditor::mount(row, field));
        self.mode = AppMode::Editing;
        self.status_message = None;
    }

    /// Forwards an event to the open editor and applies what it returns.
    pub fn handle_editor_event(&mut self, event: EditorEvent) {
        let Some(editor) = self.editor.as_mut() else {
            return;
        };
        let outcome = editor.handle_event(event);
        self.apply_editor_outcome(outcome);
    }

    /// The terminal lost focus.
    pub fn blur_editor(&mut self) {
        self.handle_editor_event(EditorEvent::Blur);
    }

    pub fn apply_editor_outcome(&mut self, outcome: EditorOutcome) {
        match outcome {
            EditorOutcome::Changed(row) => match self.rows.with_replaced(row) {
                Ok(next) => self.rows = next,
                Err(e) => {
                    warn!("dropping edit: {e}");
                    self.status_message = Some(e.to_string());
                }
            },
            EditorOutcome::Close { commit } => self.finish_editing(commit),
            EditorOutcome::Propagate(KeyCode::Enter) => self.finish_editing(true),
            EditorOutcome::Propagate(_)
            | EditorOutcome::Suppressed
            | EditorOutcome::Handled
            | EditorOutcome::Ignored => {}
        }
    }

    /// Closes the editor. Without `commit` the row is restored to what it
    /// was when the editor opened.
    pub fn finish_editing(&mut self, commit: bool) {
        let Some(editor) = self.editor.take() else {
            return;
        };
        let snapshot = self.edit_snapshot.take();

        if commit {
            info!("committed row {} {:?} = {:?}", editor.row().id, editor.field(), editor.text());
            if self.selected_row + 1 < self.rows.len() {
                self.selected_row += 1;
                self.ensure_cursor_visible();
            }
        } else if let Some(original) = snapshot {
            debug!("reverting row {}", original.id);
            if let Err(e) = self.rows.replace(original) {
                warn!("could not revert edit: {e}");
            }
        }

        self.mode = AppMode::Normal;
    }

    pub fn move_cursor(&mut self, row_delta: isize, col_delta: isize) {
        let max_row = self.rows.len().saturating_sub(1);
        let max_col = self.column_count().saturating_sub(1);
        self.selected_row = self.selected_row.saturating_add_signed(row_delta).min(max_row);
        self.selected_col = self.selected_col.saturating_add_signed(col_delta).min(max_col);
        self.ensure_cursor_visible();
    }

    pub fn toggle_selected_row(&mut self) {
        let Some(id) = self.current_row().map(|row| row.id.clone()) else {
            return;
        };
        let selected = self.selection.toggle(&id);
        debug!("row {id} selected: {selected}");
    }

    pub fn toggle_all_rows(&mut self) {
        self.selection.toggle_all(&self.rows);
    }

    pub fn shrink_column(&mut self) {
        let Some(index) = self.selected_col.checked_sub(1) else {
            return;
        };
        if let Some(column) = self.columns.get_mut(index) {
            let width = column.width.saturating_sub(1);
            column.resize(width);
        }
    }

    pub fn grow_column(&mut self) {
        let Some(index) = self.selected_col.checked_sub(1) else {
            return;
        };
        if let Some(column) = self.columns.get_mut(index) {
            let width = column.width.saturating_add(1);
            column.resize(width);
        }
    }

    pub fn update_viewport_size(&mut self, rows: usize) {
        self.viewport_rows = rows.max(1);
        self.ensure_cursor_visible();
    }

    pub fn ensure_cursor_visible(&mut self) {
        if self.selected_row < self.scroll_row {
            self.scroll_row = self.selected_row;
        } else if self.selected_row >= self.scroll_row + self.viewport_rows {
            self.scroll_row = self.selected_row + 1 - self.viewport_rows;
        }
    }

    pub fn open_help(&mut self) {
        self.mode = AppMode::Help;
        self.help_scroll = 0;
    }

    /// Switches to save-as mode to prompt for a filename.
    pub fn start_save_as(&mut self) {
        self.start_filename_input(
            AppMode::SaveAs,
            self.filename.clone().unwrap_or_else(|| DEFAULT_SAVE_FILENAME.to_string()),
        );
    }

    /// Switches to load-file mode to prompt for a filename.
    pub fn start_load_file(&mut self) {
        self.start_filename_input(
            AppMode::LoadFile,
            self.filename.clone().unwrap_or_else(|| DEFAULT_SAVE_FILENAME.to_string()),
        );
    }

    /// Switches to CSV export mode, defaulting to the JSON filename with a
    /// `.csv` extension.
    pub fn start_csv_export(&mut self) {
        let filename = self
            .filename
            .as_ref()
            .map(|f| f.replace(".json", ".csv"))
            .unwrap_or_else(|| DEFAULT_CSV_FILENAME.to_string());
        self.start_filename_input(AppMode::ExportCsv, filename);
    }

    fn start_filename_input(&mut self, mode: AppMode, initial: String) {
        self.mode = mode;
        self.cursor_position = initial.chars().count();
        self.filename_input = initial;
        self.status_message = None;
    }

    /// Cancels filename input and returns to normal mode.
    pub fn cancel_filename_input(&mut self) {
        self.mode = AppMode::Normal;
        self.filename_input.clear();
        self.cursor_position = 0;
    }

    /// The filename typed into the prompt, or the default for the current mode.
    pub fn prompt_filename(&self) -> String {
        if !self.filename_input.trim().is_empty() {
            return self.filename_input.trim().to_string();
        }
        match self.mode {
            AppMode::ExportCsv => DEFAULT_CSV_FILENAME.to_string(),
            _ => DEFAULT_SAVE_FILENAME.to_string(),
        }
    }

    pub fn set_save_result(&mut self, result: Result<String, String>) {
        match result {
            Ok(filename) => {
                self.status_message = Some(format!("Saved to {}", filename));
                self.filename = Some(filename);
            }
            Err(error) => {
                self.status_message = Some(format!("Save failed: {}", error));
            }
        }
        self.cancel_filename_input();
    }

    pub fn set_load_result(&mut self, result: Result<(RowCollection, String), String>) {
        match result {
            Ok((rows, filename)) => {
                self.load_rows(rows);
                self.status_message = Some(format!("Loaded from {}", filename));
                self.filename = Some(filename);
            }
            Err(error) => {
                self.status_message = Some(format!("Load failed: {}", error));
            }
        }
        self.cancel_filename_input();
    }

    /// Replaces every row, resetting the view and dropping stale selections.
    pub fn load_rows(&mut self, rows: RowCollection) {
        self.rows = rows;
        self.selection.retain_existing(&self.rows);
        self.selected_row = 0;
        self.selected_col = 0;
        self.scroll_row = 0;
    }

    pub fn set_csv_export_result(&mut self, result: Result<String, String>) {
        self.status_message = Some(match result {
            Ok(filename) => format!("Exported to {}", filename),
            Err(error) => format!("Export failed: {}", error),
        });
        self.cancel_filename_input();
    }

    pub fn filename_insert(&mut self, c: char) {
        let at = byte_index(&self.filename_input, self.cursor_position);
        self.filename_input.insert(at, c);
        self.cursor_position += 1;
    }

    pub fn filename_backspace(&mut self) {
        if self.cursor_position > 0 {
            self.cursor_position -= 1;
            let at = byte_index(&self.filename_input, self.cursor_position);
            self.filename_input.remove(at);
        }
    }

    pub fn filename_delete(&mut self) {
        if self.cursor_position < self.filename_input.chars().count() {
            let at = byte_index(&self.filename_input, self.cursor_position);
            self.filename_input.remove(at);
        }
    }
}

fn byte_index(s: &str, char_pos: usize) -> usize {
    s.char_indices().nth(char_pos).map(|(i, _)| i).unwrap_or(s.len())
}
