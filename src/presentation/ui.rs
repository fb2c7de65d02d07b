use crate::application::{App, AppMode, EditorView};
use crate::domain::{CellFormat, SELECT_COLUMN_WIDTH};
use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Margin, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table},
};

/// Below this width the grid gets the small outer margin (760px at 8px per cell).
pub const NARROW_TERMINAL_WIDTH: u16 = 95;

/// Outer margin around the grid: tight on narrow terminals, roomy otherwise.
pub fn outer_margin(width: u16) -> Margin {
    if width < NARROW_TERMINAL_WIDTH {
        Margin::new(2, 0)
    } else {
        Margin::new(10, 1)
    }
}

/// Grid rows that fit in a frame of `height` lines.
pub fn visible_grid_rows(height: u16) -> usize {
    // header line, status bar, table borders and header row
    height.saturating_sub(1 + 3 + 2 + 1 + 2) as usize
}

pub fn render_ui(f: &mut Frame, app: &App) {
    let area = f.area().inner(outer_margin(f.area().width));
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(0),
            Constraint::Length(3),
        ])
        .split(area);

    render_header(f, app, chunks[0]);
    render_grid(f, app, chunks[1]);
    render_status_bar(f, app, chunks[2]);

    if app.mode == AppMode::Help {
        render_help_popup(f, app.help_scroll);
    }
}

fn render_header(f: &mut Frame, app: &App, area: Rect) {
    let column = app.current_column().map(|c| c.name).unwrap_or("Select");
    let row = app.current_row().map(|r| r.id.as_str()).unwrap_or("-");
    let header = Paragraph::new(format!(
        "rowgrid | Row: {} | Column: {} | Selected: {} | {}",
        row,
        column,
        app.selection.len(),
        app.settings.locale
    ))
    .style(Style::default().fg(Color::Cyan));
    f.render_widget(header, area);
}

fn render_grid(f: &mut Frame, app: &App, area: Rect) {
    let visible_rows = area.height.saturating_sub(3) as usize;

    let header_style = Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD);
    let all_selected = app.selection.all_selected(&app.rows);
    let mut headers = vec![Cell::from(checkbox(all_selected)).style(header_style)];
    for (index, column) in app.columns.iter().enumerate() {
        let style = if index + 1 == app.selected_col {
            Style::default().bg(Color::LightBlue).fg(Color::Black)
        } else {
            header_style
        };
        headers.push(Cell::from(column.name).style(style));
    }
    let header_row = Row::new(headers).height(1);

    let editor_view = app.editor.as_ref().map(|editor| editor.render_state());
    let end = (app.scroll_row + visible_rows).min(app.rows.len());
    let mut rows = Vec::with_capacity(end.saturating_sub(app.scroll_row));

    for position in app.scroll_row..end {
        let Some(record) = app.rows.get_index(position) else {
            break;
        };
        let selected = app.selection.contains(&record.id);
        let row_style = if selected {
            Style::default().bg(Color::DarkGray)
        } else {
            Style::default()
        };

        let mut cells = vec![Cell::from(checkbox(selected))];
        for column in &app.columns {
            let text = app.settings.format_cell(column.format, record, column.key);
            let line = match column.format {
                CellFormat::Currency => Line::from(text).alignment(Alignment::Right),
                _ => Line::from(text),
            };
            cells.push(Cell::from(line));
        }

        if position == app.selected_row {
            let cursor_style = Style::default().bg(Color::Blue).fg(Color::White);
            let target = app.selected_col;
            if let (Some(view), AppMode::Editing) = (&editor_view, app.mode) {
                let editor_style = Style::default().bg(Color::Black).fg(Color::White);
                cells[target] = Cell::from(editor_line(view)).style(editor_style);
            } else {
                cells[target] = cells[target].clone().style(cursor_style);
            }
        }

        rows.push(Row::new(cells).style(row_style).height(1));
    }

    let mut widths = vec![Constraint::Length(SELECT_COLUMN_WIDTH)];
    widths.extend(app.columns.iter().map(|c| Constraint::Length(c.width)));

    let table = Table::new(rows, widths)
        .header(header_row)
        .block(Block::default().borders(Borders::ALL).title("Rows"))
        .column_spacing(1);

    f.render_widget(table, area);
}

fn checkbox(checked: bool) -> &'static str {
    if checked { "[x]" } else { "[ ]" }
}

/// The edited cell: selected text reversed, the pre-edit string underlined
/// at the cursor, and a block cursor.
fn editor_line(view: &EditorView) -> Line<'static> {
    let chars: Vec<char> = view.text.chars().collect();
    let slice = |from: usize, to: usize| {
        chars[from.min(chars.len())..to.min(chars.len())]
            .iter()
            .collect::<String>()
    };
    let reversed = Style::default().add_modifier(Modifier::REVERSED);

    if let Some((start, end)) = view.selection {
        return Line::from(vec![
            Span::raw(slice(0, start)),
            Span::styled(slice(start, end), reversed),
            Span::raw(slice(end, chars.len())),
        ]);
    }

    let mut spans = vec![Span::raw(slice(0, view.cursor))];
    if let Some(preedit) = &view.preedit {
        spans.push(Span::styled(
            preedit.clone(),
            Style::default().add_modifier(Modifier::UNDERLINED),
        ));
    }
    let under_cursor = chars
        .get(view.cursor)
        .map(|c| c.to_string())
        .unwrap_or_else(|| " ".to_string());
    spans.push(Span::styled(under_cursor, reversed));
    spans.push(Span::raw(slice(view.cursor + 1, chars.len())));
    Line::from(spans)
}

fn render_status_bar(f: &mut Frame, app: &App, area: Rect) {
    let input_text = match app.mode {
        AppMode::Normal => {
            if let Some(ref status) = app.status_message {
                status.clone()
            } else {
                let filename = app.filename.as_deref().unwrap_or("unsaved");
                format!(
                    "File: {} | Enter: edit | Space: select | Ctrl+S: save | Ctrl+O: load | \
                     Ctrl+E: export CSV | F1/?: help | q: quit",
                    filename
                )
            }
        }
        AppMode::Editing => {
            let composing = app.editor.as_ref().is_some_and(|e| e.is_composing());
            if composing {
                "Composing (Enter to confirm, Esc to cancel)".to_string()
            } else {
                "Editing (Enter to save, Esc to cancel, Ctrl+Space: compose)".to_string()
            }
        }
        AppMode::Help => {
            "↑↓/jk: scroll | PgUp/PgDn: fast scroll | Home: top | Esc/q: close help".to_string()
        }
        AppMode::SaveAs => {
            format!("Save as: {} (Enter to save, Esc to cancel)", app.filename_input)
        }
        AppMode::LoadFile => {
            format!("Load file: {} (Enter to load, Esc to cancel)", app.filename_input)
        }
        AppMode::ExportCsv => {
            format!("Export CSV as: {} (Enter to export, Esc to cancel)", app.filename_input)
        }
    };

    let input = Paragraph::new(input_text)
        .block(Block::default().borders(Borders::ALL).title("Status"))
        .style(match app.mode {
            AppMode::Normal => Style::default(),
            AppMode::Editing => Style::default().fg(Color::Green),
            AppMode::Help => Style::default().fg(Color::Cyan),
            AppMode::SaveAs | AppMode::LoadFile => Style::default().fg(Color::Yellow),
            AppMode::ExportCsv => Style::default().fg(Color::Magenta),
        });
    f.render_widget(input, area);
}

fn render_help_popup(f: &mut Frame, scroll: usize) {
    let area = f.area();
    let popup_area = Rect {
        x: area.width / 10,
        y: area.height / 10,
        width: area.width * 4 / 5,
        height: area.height * 4 / 5,
    };

    f.render_widget(Clear, popup_area);

    let help_lines: Vec<&str> = HELP_TEXT.lines().collect();
    let visible_height = popup_area.height.saturating_sub(2) as usize;

    let start_line = scroll.min(help_lines.len().saturating_sub(visible_height));
    let end_line = (start_line + visible_height).min(help_lines.len());

    let visible_text = help_lines[start_line..end_line].join("\n");

    let help_widget = Paragraph::new(visible_text)
        .block(Block::default()
            .borders(Borders::ALL)
            .title(format!("rowgrid Help (Line {}/{})", start_line + 1, help_lines.len()))
            .style(Style::default().fg(Color::Cyan)))
        .style(Style::default().fg(Color::White));

    f.render_widget(help_widget, popup_area);
}

const HELP_TEXT: &str = r#"ROWGRID KEY REFERENCE

=== NAVIGATION ===
Arrow keys      Move the cursor (hjkl also work)
Tab/Shift+Tab   Next/previous column
Home/End        First/last column
PgUp/PgDn       Move a page of rows

=== SELECTION ===
Space           Tick/untick the row under the cursor
a               Tick all rows, or untick all when every row is ticked
Enter           On the checkbox column, same as Space

=== EDITING ===
Enter/F2        Edit the cell under the cursor
                Code, Name, Price and Date are editable
                ID and CreateDatetime are read-only
While editing:
  Typing        Replaces the selected text, then inserts
  ←/→ Home/End  Move within the cell
  Enter         Save and move down one row
  Esc           Discard changes to the row
  Focus loss    Saves, like Enter

=== COMPOSED INPUT ===
Ctrl+Space      Start composing (pre-edit text is underlined)
Enter           Confirm the composed text; the cell stays open
Esc             Cancel the composition
Ctrl+Space      Confirm the composed text

=== COLUMNS ===
- / _           Shrink/grow the current column

=== FILES ===
Ctrl+S          Save rows as JSON
Ctrl+O          Load rows from JSON
Ctrl+E          Export the grid as CSV (formatted values)

=== OTHER ===
F1 or ?         Show this help
q               Quit"#;
