//! Interactive TUI board
//!
//! Renders the day-grid and feeds terminal mouse events into the drag
//! controller: click a bar to move it, grab an edge to resize, shift-click
//! to build a selection, sweep empty grid to rubber-band select.

mod app;
mod event;
mod ui;

use std::panic::{self, AssertUnwindSafe};
use std::path::Path;

use anyhow::{anyhow, Result};

use super::Output;
use app::App;
use event::EventHandler;

/// Launch the TUI over a board file
pub fn run(output: &Output, board_path: &Path) -> Result<()> {
    output.verbose_ctx("tui", "Initializing TUI application");

    // Initialize terminal
    let mut terminal = ui::init_terminal()?;

    // Handle app creation failure - restore terminal first
    let mut app = match App::new(board_path) {
        Ok(app) => app,
        Err(e) => {
            ui::restore_terminal()?;
            return Err(e);
        }
    };

    // Create event handler
    let event_handler = EventHandler::new(250);

    // Run the main loop with panic safety so the terminal is restored even
    // if the app panics
    let result = panic::catch_unwind(AssertUnwindSafe(|| {
        app.run(&mut terminal, event_handler)
    }));

    // Always restore terminal, even on panic
    let restore_result = ui::restore_terminal();

    match result {
        Ok(inner_result) => {
            restore_result?;
            inner_result
        }
        Err(panic_payload) => {
            let _ = restore_result;
            if let Some(s) = panic_payload.downcast_ref::<&str>() {
                Err(anyhow!("TUI panicked: {}", s))
            } else if let Some(s) = panic_payload.downcast_ref::<String>() {
                Err(anyhow!("TUI panicked: {}", s))
            } else {
                Err(anyhow!("TUI panicked with unknown error"))
            }
        }
    }
}
