//! rowgrid - editable data grid for the terminal
//!
//! Shows a table of sample rows with formatted prices and dates. Cells are
//! edited in place; composed input is confirmed with Enter without
//! committing the cell.

use std::io;

use clap::Parser;
use crossterm::{
    event::{
        self, DisableBracketedPaste, DisableFocusChange, EnableBracketedPaste, EnableFocusChange,
        Event, KeyCode, KeyEventKind,
    },
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use log::{error, info};
use ratatui::{
    Terminal,
    backend::{Backend, CrosstermBackend},
};

use rowgrid::application::{App, AppMode};
use rowgrid::domain::RowCollection;
use rowgrid::infrastructure::{AppConfig, Cli, FileRepository, init_logging};
use rowgrid::presentation::{InputHandler, render_ui, visible_grid_rows};

/// Entry point: parses the command line, prepares the rows, and runs the
/// grid until the user quits.
///
/// # Errors
///
/// Returns an error if the configuration is invalid, the rows file cannot
/// be loaded, or the terminal cannot be set up.
fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::try_from(Cli::parse())?;
    init_logging(&config.log_file, config.log_level)?;

    let mut app = App::new(RowCollection::sample(config.row_count), config.settings);
    if let Some(path) = &config.load {
        let (rows, filename) = FileRepository::load_rows(path)?;
        app.load_rows(rows);
        app.filename = Some(filename);
    }
    info!("starting with {} rows ({})", app.rows.len(), app.settings.locale);

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableBracketedPaste, EnableFocusChange)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_app(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableBracketedPaste,
        DisableFocusChange
    )?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        error!("terminal error: {err}");
        println!("{err:?}");
    }

    Ok(())
}

/// Main event loop: draw, wait for one event, dispatch it.
fn run_app<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> io::Result<()> {
    let mut input = InputHandler::default();
    loop {
        let size = terminal.size()?;
        app.update_viewport_size(visible_grid_rows(size.height));
        terminal.draw(|f| render_ui(f, app))?;

        match event::read()? {
            Event::Key(key) if key.kind == KeyEventKind::Press => match key.code {
                KeyCode::Char('q') if app.mode == AppMode::Normal => return Ok(()),
                _ => input.handle_key_event(app, key.code, key.modifiers),
            },
            Event::Paste(text) => input.handle_paste(app, text),
            Event::FocusLost => input.handle_focus_lost(app),
            _ => {}
        }
    }
}
