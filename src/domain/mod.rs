//! Domain models for the Gantt board
//!
//! Contains the scheduling and state engine without any I/O or rendering
//! concerns.

mod board;
mod date;
mod graph;
mod task;

pub use board::{
    Board, BoardConfig, BoardError, BoardEvent, InvalidPlacement, PlacementIssue, Row, RowUpdate,
    TaskSort,
};
pub use date::{day_start, floor_to_day, DateEvent, ManagedDate};
pub use graph::{DependencyGraph, GraphError};
pub use task::{parse_date, DateField, Task, TaskError, TaskEvent, TaskMeta, TaskSpec};
