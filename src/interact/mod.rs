//! Pointer-driven drag interaction over board rows
//!
//! The controller turns abstract pointer events (down/move/up positions
//! plus a shift flag) into proposed offset/span values for one or more
//! tasks at a time. Proposals are purely derived state; nothing touches the
//! board until pointer release, when each operation whose final values
//! differ from the committed row produces a [`DragIntent`] for the host to
//! feed into `Board::update_row`.
//!
//! A rectangular multi-select gesture runs independently of drag
//! operations: pointer-down on empty grid anchors a rubber band, and tasks
//! whose on-screen bounds overlap it on release join the selection.

mod geometry;

pub use geometry::{Point, Rect};

use chrono::NaiveDate;

use crate::domain::{Board, Row};

/// What a drag gesture does to a task
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragKind {
    /// Shift the whole task, keeping its span
    Move,
    /// Drag the left edge: span shrinks/grows, offset follows
    ResizeLeft,
    /// Drag the right edge: span shrinks/grows
    ResizeRight,
}

/// What a pointer-down landed on
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HitTarget {
    Task { id: String, kind: DragKind },
    Grid,
}

/// A proposal to commit, emitted on pointer release.
///
/// `reference_date` is the board's min date at release time — the baseline
/// all offsets are relative to. Both intents may fire for one task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DragIntent {
    OffsetProposed {
        task_id: String,
        offset: i64,
        reference_date: NaiveDate,
    },
    SpanProposed {
        task_id: String,
        span: i64,
        reference_date: NaiveDate,
    },
}

/// Transient per-task drag state
#[derive(Debug, Clone, PartialEq)]
struct DragOperation {
    task_id: String,
    kind: DragKind,
    start_x: f64,
    baseline_offset: i64,
    baseline_span: i64,
    offset: i64,
    span: i64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct RubberBand {
    anchor: Point,
    current: Point,
}

impl RubberBand {
    fn rect(&self) -> Rect {
        Rect::from_corners(self.anchor, self.current)
    }
}

/// The drag-interaction state machine.
///
/// `cell_width`/`cell_height` are the host's on-screen cell metrics, which
/// need not match the board's configured cell sizes (a terminal host maps
/// one day to a few character cells).
#[derive(Debug)]
pub struct DragController {
    cell_width: f64,
    cell_height: f64,
    origin: Point,
    handle_width: f64,
    operations: Vec<DragOperation>,
    selected: Vec<String>,
    rubber_band: Option<RubberBand>,
}

impl DragController {
    pub fn new(cell_width: f64, cell_height: f64) -> Self {
        Self {
            cell_width,
            cell_height,
            origin: Point::default(),
            handle_width: 6.0,
            operations: Vec::new(),
            selected: Vec::new(),
            rubber_band: None,
        }
    }

    /// Sets the screen position of grid cell (0, 0)
    pub fn set_origin(&mut self, origin: Point) {
        self.origin = origin;
    }

    /// Sets the width of the resize handles at a bar's edges
    pub fn set_handle_width(&mut self, width: f64) {
        self.handle_width = width;
    }

    /// Ids currently in the selection set
    pub fn selected(&self) -> &[String] {
        &self.selected
    }

    /// The active selection rectangle, if a grid gesture is in flight
    pub fn selection_area(&self) -> Option<Rect> {
        self.rubber_band.map(|band| band.rect())
    }

    /// True while any resize operation is open (cursor styling)
    pub fn is_resizing(&self) -> bool {
        self.operations
            .iter()
            .any(|op| matches!(op.kind, DragKind::ResizeLeft | DragKind::ResizeRight))
    }

    /// True while any move operation is open
    pub fn is_moving(&self) -> bool {
        self.operations.iter().any(|op| op.kind == DragKind::Move)
    }

    /// Committed rows with in-flight proposals substituted in
    pub fn rendered_rows(&self, board: &Board) -> Vec<Row> {
        let mut rows = board.rows();
        for row in &mut rows {
            if let Some(op) = self.operations.iter().find(|op| op.task_id == row.id) {
                row.offset = op.offset;
                row.span = op.span;
            }
        }
        rows
    }

    /// On-screen bounds of the row at the given display index
    pub fn row_rect(&self, index: usize, row: &Row) -> Rect {
        Rect::new(
            self.origin.x + row.offset as f64 * self.cell_width,
            self.origin.y + index as f64 * self.cell_height,
            row.span as f64 * self.cell_width,
            self.cell_height,
        )
    }

    /// Resolves a pointer position against the rendered rows
    pub fn hit_test(&self, board: &Board, point: Point) -> HitTarget {
        for (index, row) in self.rendered_rows(board).iter().enumerate() {
            let rect = self.row_rect(index, row);
            if !rect.contains(point) {
                continue;
            }
            let kind = if point.x < rect.x + self.handle_width {
                DragKind::ResizeLeft
            } else if point.x >= rect.x + rect.width - self.handle_width {
                DragKind::ResizeRight
            } else {
                DragKind::Move
            };
            return HitTarget::Task {
                id: row.id.clone(),
                kind,
            };
        }
        HitTarget::Grid
    }

    /// Begins a gesture.
    ///
    /// On a task: a shift-click toggles selection membership without
    /// starting a drag; otherwise one operation opens per selected task
    /// (the selection resets to the clicked task first if it wasn't part
    /// of it). On empty grid: the selection clears (unless shift is held)
    /// and a rubber band anchors at the pointer.
    pub fn pointer_down(&mut self, board: &Board, point: Point, target: HitTarget, shift: bool) {
        match target {
            HitTarget::Task { id, kind } => {
                if shift {
                    match self.selected.iter().position(|s| *s == id) {
                        Some(pos) => {
                            self.selected.remove(pos);
                        }
                        None => self.selected.push(id),
                    }
                    return;
                }

                if !self.selected.contains(&id) {
                    self.selected = vec![id];
                }

                let rows = self.rendered_rows(board);
                for selected_id in self.selected.clone() {
                    let Some(row) = rows.iter().find(|row| row.id == selected_id) else {
                        continue;
                    };
                    self.operations.retain(|op| op.task_id != selected_id);
                    self.operations.push(DragOperation {
                        task_id: selected_id,
                        kind,
                        start_x: point.x,
                        baseline_offset: row.offset,
                        baseline_span: row.span,
                        offset: row.offset,
                        span: row.span,
                    });
                }
            }
            HitTarget::Grid => {
                if !shift {
                    self.selected.clear();
                }
                self.rubber_band = Some(RubberBand {
                    anchor: point,
                    current: point,
                });
            }
        }
    }

    /// Updates every open operation and the rubber band.
    ///
    /// Returns true when something actually changed and a redraw is due;
    /// pointer motion within the same cell reports false.
    pub fn pointer_move(&mut self, point: Point) -> bool {
        let mut redraw = false;

        if let Some(band) = &mut self.rubber_band {
            band.current = point;
            redraw = true;
        }

        for op in &mut self.operations {
            let dx = point.x - op.start_x;
            let delta = (dx / self.cell_width).round() as i64;
            let prev = (op.offset, op.span);

            match op.kind {
                DragKind::Move => {
                    op.offset = op.baseline_offset + delta;
                }
                DragKind::ResizeRight => {
                    op.span = (op.baseline_span + delta).max(1);
                }
                DragKind::ResizeLeft => {
                    // Span and offset clamp independently: the left edge may
                    // not cross past one cell before the right edge.
                    op.span = (op.baseline_span - delta).max(1);
                    op.offset =
                        (op.baseline_offset + delta).min(op.baseline_offset + op.baseline_span - 1);
                }
            }

            if (op.offset, op.span) != prev {
                redraw = true;
            }
        }

        redraw
    }

    /// Ends the gesture: merges rubber-band selection, emits one intent per
    /// changed value, and clears all operations regardless.
    pub fn pointer_up(&mut self, board: &Board) -> Vec<DragIntent> {
        if let Some(band) = self.rubber_band.take() {
            let area = band.rect();
            let rows = self.rendered_rows(board);
            for (index, row) in rows.iter().enumerate() {
                if self.selected.contains(&row.id) {
                    continue;
                }
                if area.intersects(&self.row_rect(index, row)) {
                    self.selected.push(row.id.clone());
                }
            }
        }

        let mut intents = Vec::new();
        if !self.operations.is_empty() {
            if let Some(reference) = board.min_date() {
                let committed = board.rows();
                for op in &self.operations {
                    let Some(row) = committed.iter().find(|row| row.id == op.task_id) else {
                        continue;
                    };
                    if op.offset != row.offset {
                        intents.push(DragIntent::OffsetProposed {
                            task_id: op.task_id.clone(),
                            offset: op.offset,
                            reference_date: reference,
                        });
                    }
                    if op.span != row.span {
                        intents.push(DragIntent::SpanProposed {
                            task_id: op.task_id.clone(),
                            span: op.span,
                            reference_date: reference,
                        });
                    }
                }
            }
            self.operations.clear();
        }
        intents
    }
}
