//! gantt-cli - A day-grid Gantt board engine with a terminal UI
//!
//! Tasks live on a day-granularity grid, connected by dependency edges and
//! editable by dragging (move, resize-left, resize-right) with live
//! detection of dependency violations. The `domain` module holds the
//! scheduling/state engine, `interact` the pointer-driven drag state
//! machine, and `cli`/`storage` the terminal front end around them.

pub mod cli;
pub mod domain;
pub mod interact;
pub mod storage;

pub use domain::{Board, BoardConfig, BoardError, BoardEvent, DependencyGraph, Task, TaskSpec};
pub use interact::{DragController, DragIntent, DragKind, HitTarget, Point};
