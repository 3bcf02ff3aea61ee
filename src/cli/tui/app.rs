//! TUI application state and logic

use std::collections::HashSet;
use std::path::PathBuf;

use anyhow::Result;
use crossterm::event::{
    KeyCode, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};

use super::event::{Event, EventHandler};
use super::ui::{self, Terminal};
use crate::domain::{Board, RowUpdate};
use crate::interact::{DragController, DragIntent, Point};
use crate::storage;

/// Width of the task-label column in terminal cells
pub const LABEL_WIDTH: u16 = 16;

/// Rows above the grid (title + date header)
pub const HEADER_HEIGHT: u16 = 2;

/// Terminal columns per day cell
pub const DAY_WIDTH: u16 = 3;

/// Application state
pub struct App {
    /// The board under edit
    pub board: Board,

    /// Drag state machine over the board's rendered rows
    pub controller: DragController,

    /// Where the board was loaded from (and is saved to)
    pub path: PathBuf,

    /// Unsaved changes exist
    pub dirty: bool,

    /// Status message for the footer
    pub status: Option<String>,

    /// Whether to quit
    should_quit: bool,
}

impl App {
    /// Loads the board and wires the controller to the chart layout
    pub fn new(path: &std::path::Path) -> Result<Self> {
        let board = storage::load_board(path)?;

        let mut controller = DragController::new(f64::from(DAY_WIDTH), 1.0);
        controller.set_origin(Point::new(f64::from(LABEL_WIDTH), f64::from(HEADER_HEIGHT)));
        // Bars are DAY_WIDTH columns per day; one column on each end resizes
        controller.set_handle_width(1.0);

        Ok(Self {
            board,
            controller,
            path: path.to_path_buf(),
            dirty: false,
            status: None,
            should_quit: false,
        })
    }

    /// Main loop: draw, then handle one event at a time
    pub fn run(&mut self, terminal: &mut Terminal, events: EventHandler) -> Result<()> {
        loop {
            terminal.draw(|frame| ui::draw(frame, self))?;

            match events.next()? {
                Event::Key(key) => self.on_key(key.code),
                Event::Mouse(mouse) => self.on_mouse(mouse),
                Event::Resize(_, _) | Event::Tick => {}
            }

            if self.should_quit {
                return Ok(());
            }
        }
    }

    /// Source-task ids of currently invalid dependency placements
    pub fn conflicted_ids(&self) -> HashSet<&str> {
        self.board
            .invalid_placements()
            .into_iter()
            .map(|p| p.source.id())
            .collect()
    }

    fn on_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char('s') => self.save(),
            KeyCode::Esc => self.status = None,
            _ => {}
        }
    }

    fn on_mouse(&mut self, mouse: MouseEvent) {
        let point = Point::new(f64::from(mouse.column), f64::from(mouse.row));
        let shift = mouse.modifiers.contains(KeyModifiers::SHIFT);

        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                let target = self.controller.hit_test(&self.board, point);
                self.controller.pointer_down(&self.board, point, target, shift);
            }
            MouseEventKind::Drag(MouseButton::Left) => {
                self.controller.pointer_move(point);
            }
            MouseEventKind::Up(MouseButton::Left) => {
                let intents = self.controller.pointer_up(&self.board);
                self.commit(intents);
            }
            _ => {}
        }
    }

    /// Applies released drag proposals to the board
    fn commit(&mut self, intents: Vec<DragIntent>) {
        for intent in intents {
            let update = match intent {
                DragIntent::OffsetProposed {
                    task_id,
                    offset,
                    reference_date,
                } => RowUpdate {
                    id: task_id,
                    offset: Some(offset),
                    span: None,
                    reference_date,
                },
                DragIntent::SpanProposed {
                    task_id,
                    span,
                    reference_date,
                } => RowUpdate {
                    id: task_id,
                    offset: None,
                    span: Some(span),
                    reference_date,
                },
            };
            match self.board.update_row(update) {
                Ok(()) => self.dirty = true,
                Err(e) => self.status = Some(e.to_string()),
            }
        }
    }

    fn save(&mut self) {
        match storage::save_board(&self.path, &self.board) {
            Ok(()) => {
                self.dirty = false;
                self.status = Some(format!("Saved {}", self.path.display()));
            }
            Err(e) => self.status = Some(format!("Save failed: {:#}", e)),
        }
    }
}
