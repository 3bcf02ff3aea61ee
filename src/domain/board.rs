//! Board aggregate
//!
//! The board owns the task collection and a [`DependencyGraph`] keyed by
//! task id, kept in lockstep through the board-level mutators. It derives
//! the day-grid geometry (rows, column count, min/max dates) from the
//! tasks' floored dates on every read, and reports dependency edges whose
//! placement is currently invalid.
//!
//! Task-level changes are re-broadcast with task identity attached over
//! mpsc channels handed out by [`Board::subscribe`].

use std::cmp::Ordering;
use std::fmt;
use std::sync::mpsc::{channel, Receiver, Sender};

use chrono::{Duration, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::date::day_start;
use super::graph::{DependencyGraph, GraphError};
use super::task::{DateField, Task, TaskError, TaskEvent, TaskMeta, TaskSpec};

const DEFAULT_CELL_WIDTH: u32 = 30;
const DEFAULT_CELL_HEIGHT: u32 = 20;

#[derive(Debug, Error, PartialEq)]
pub enum BoardError {
    #[error("can't add task with id \"{0}\" because that id is taken")]
    DuplicateId(String),

    #[error("task with id \"{0}\" does not exist")]
    UnknownTask(String),

    #[error(transparent)]
    Task(#[from] TaskError),

    #[error(transparent)]
    Graph(#[from] GraphError),
}

/// Board construction parameters (also the board-file wire form)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BoardConfig {
    pub tasks: Vec<TaskSpec>,

    /// Grid cell pixel width; opaque to the scheduling core
    pub cell_width: u32,

    /// Grid cell pixel height; opaque to the scheduling core
    pub cell_height: u32,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            tasks: Vec::new(),
            cell_width: DEFAULT_CELL_WIDTH,
            cell_height: DEFAULT_CELL_HEIGHT,
        }
    }
}

/// A task's committed grid placement
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Row {
    pub id: String,

    /// Days between the task's floored start and the board's min date
    pub offset: i64,

    /// Duration in whole-day cells, minimum 1
    pub span: i64,

    pub metadata: TaskMeta,
}

/// Why a dependency edge is currently invalid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PlacementIssue {
    /// The edge names a task that is not on the board
    DependencyMissing,
    /// The dependency ends after the task that depends on it
    DateConflict,
}

/// One record per violating dependency edge
#[derive(Debug, Clone, PartialEq)]
pub struct InvalidPlacement<'a> {
    pub reason: PlacementIssue,
    pub source: &'a Task,
    /// Absent under [`PlacementIssue::DependencyMissing`]
    pub dependency: Option<&'a Task>,
}

/// A grid-space update to apply to one task's dates.
///
/// `offset` and `span` are whole-day deltas anchored at `reference_date`;
/// which fields are present selects the semantics (see [`Board::update_row`]).
#[derive(Debug, Clone, PartialEq)]
pub struct RowUpdate {
    pub id: String,
    pub offset: Option<i64>,
    pub span: Option<i64>,
    pub reference_date: NaiveDate,
}

/// A board-level change, fanned out to subscribers
#[derive(Debug, Clone, PartialEq)]
pub enum BoardEvent {
    TaskAdded {
        task: Task,
    },
    TaskRemoved {
        task: Task,
    },
    TaskStartDateChanged {
        id: String,
        prev: Option<NaiveDateTime>,
        new: Option<NaiveDateTime>,
    },
    TaskEndDateChanged {
        id: String,
        prev: Option<NaiveDateTime>,
        new: Option<NaiveDateTime>,
    },
    TaskFlooredStartDateChanged {
        id: String,
        prev: Option<NaiveDate>,
        new: Option<NaiveDate>,
    },
    TaskFlooredEndDateChanged {
        id: String,
        prev: Option<NaiveDate>,
        new: Option<NaiveDate>,
    },
    TaskDependenciesChanged {
        id: String,
        prev: Vec<String>,
        new: Vec<String>,
    },
}

/// Comparator controlling `tasks()`/`rows()` iteration order
pub type TaskSort = Box<dyn Fn(&Task, &Task) -> Ordering>;

/// The unit-of-work root for a day-grid timeline
pub struct Board {
    /// Insertion-ordered task collection; ids unique
    tasks: Vec<Task>,
    graph: DependencyGraph,
    cell_width: u32,
    cell_height: u32,
    task_sort: Option<TaskSort>,
    subscribers: Vec<Sender<BoardEvent>>,
}

impl fmt::Debug for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Board")
            .field("tasks", &self.tasks)
            .field("graph", &self.graph)
            .field("cell_width", &self.cell_width)
            .field("cell_height", &self.cell_height)
            .finish_non_exhaustive()
    }
}

impl Board {
    /// Builds a board, adding each configured task in order
    pub fn new(config: BoardConfig) -> Result<Self, BoardError> {
        let mut board = Self {
            tasks: Vec::new(),
            graph: DependencyGraph::new(),
            cell_width: config.cell_width,
            cell_height: config.cell_height,
            task_sort: None,
            subscribers: Vec::new(),
        };
        for spec in config.tasks {
            board.add_task(spec)?;
        }
        Ok(board)
    }

    /// Installs a comparator for `tasks()`/`rows()` ordering
    pub fn set_task_sort(&mut self, sort: TaskSort) {
        self.task_sort = Some(sort);
    }

    /// Opens an event channel; dropping the receiver unsubscribes
    pub fn subscribe(&mut self) -> Receiver<BoardEvent> {
        let (tx, rx) = channel();
        self.subscribers.push(tx);
        rx
    }

    fn emit(&mut self, event: BoardEvent) {
        self.subscribers.retain(|tx| tx.send(event.clone()).is_ok());
    }

    fn forward_task_events(&mut self, id: &str, events: Vec<TaskEvent>) {
        for event in events {
            let board_event = match event {
                TaskEvent::DateChanged {
                    field: DateField::Start,
                    prev,
                    new,
                } => BoardEvent::TaskStartDateChanged {
                    id: id.to_string(),
                    prev,
                    new,
                },
                TaskEvent::DateChanged {
                    field: DateField::End,
                    prev,
                    new,
                } => BoardEvent::TaskEndDateChanged {
                    id: id.to_string(),
                    prev,
                    new,
                },
                TaskEvent::FlooredDateChanged {
                    field: DateField::Start,
                    prev,
                    new,
                } => BoardEvent::TaskFlooredStartDateChanged {
                    id: id.to_string(),
                    prev,
                    new,
                },
                TaskEvent::FlooredDateChanged {
                    field: DateField::End,
                    prev,
                    new,
                } => BoardEvent::TaskFlooredEndDateChanged {
                    id: id.to_string(),
                    prev,
                    new,
                },
                TaskEvent::DependenciesChanged { prev, new } => {
                    BoardEvent::TaskDependenciesChanged {
                        id: id.to_string(),
                        prev,
                        new,
                    }
                }
            };
            self.emit(board_event);
        }
    }

    pub fn cell_width(&self) -> u32 {
        self.cell_width
    }

    pub fn cell_height(&self) -> u32 {
        self.cell_height
    }

    /// Total grid width in cell-size units
    pub fn width(&self) -> i64 {
        i64::from(self.cell_width) * self.num_cols()
    }

    /// Total grid height in cell-size units
    pub fn height(&self) -> i64 {
        i64::from(self.cell_height) * self.num_rows() as i64
    }

    pub fn num_rows(&self) -> usize {
        self.tasks.len()
    }

    pub fn dependency_graph(&self) -> &DependencyGraph {
        &self.graph
    }

    pub fn get_task(&self, id: &str) -> Option<&Task> {
        self.tasks.iter().find(|task| task.id() == id)
    }

    fn get_task_mut(&mut self, id: &str) -> Option<&mut Task> {
        self.tasks.iter_mut().find(|task| task.id() == id)
    }

    /// Tasks in `task_sort` order, or insertion order without a comparator
    pub fn tasks(&self) -> Vec<&Task> {
        let mut tasks: Vec<&Task> = self.tasks.iter().collect();
        if let Some(sort) = &self.task_sort {
            tasks.sort_by(|a, b| sort(a, b));
        }
        tasks
    }

    /// Adds a task, registering its graph vertex and dependency edges
    pub fn add_task(&mut self, spec: TaskSpec) -> Result<(), BoardError> {
        if self.get_task(&spec.id).is_some() {
            return Err(BoardError::DuplicateId(spec.id));
        }

        let task = Task::new(spec)?;
        self.graph.add_vertex(task.id());
        for dep in task.dependencies() {
            self.graph.add_edge(task.id(), dep)?;
        }

        self.tasks.push(task.clone());
        self.emit(BoardEvent::TaskAdded { task });
        Ok(())
    }

    /// Removes a task; no-op if absent.
    ///
    /// Other tasks' edges to the removed id become dangling on purpose and
    /// surface through `invalid_placements`.
    pub fn remove_task(&mut self, id: &str) {
        if let Some(index) = self.tasks.iter().position(|task| task.id() == id) {
            self.graph.remove_vertex(id);
            let task = self.tasks.remove(index);
            self.emit(BoardEvent::TaskRemoved { task });
        }
    }

    /// Adds a dependency to a task, mirroring it into the graph
    pub fn add_dependency(&mut self, id: &str, dep: &str) -> Result<(), BoardError> {
        let task = self
            .get_task_mut(id)
            .ok_or_else(|| BoardError::UnknownTask(id.to_string()))?;
        let events = task.add_dependency(dep)?;
        self.graph.add_edge(id, dep)?;
        self.forward_task_events(id, events);
        Ok(())
    }

    /// Removes a dependency from a task and the matching graph edge
    pub fn remove_dependency(&mut self, id: &str, dep: &str) -> Result<(), BoardError> {
        let task = self
            .get_task_mut(id)
            .ok_or_else(|| BoardError::UnknownTask(id.to_string()))?;
        let events = task.remove_dependency(dep);
        self.graph.remove_edge(id, dep);
        self.forward_task_events(id, events);
        Ok(())
    }

    /// The task with the earliest start date; first encountered wins ties
    pub fn min_task(&self) -> Option<&Task> {
        self.tasks
            .iter()
            .filter(|task| task.start_date().is_some())
            .fold(None, |acc: Option<&Task>, task| match acc {
                Some(best) if task.start_date() >= best.start_date() => Some(best),
                _ => Some(task),
            })
    }

    /// The task with the latest end date; first encountered wins ties
    pub fn max_task(&self) -> Option<&Task> {
        self.tasks
            .iter()
            .filter(|task| task.end_date().is_some())
            .fold(None, |acc: Option<&Task>, task| match acc {
                Some(best) if task.end_date() <= best.end_date() => Some(best),
                _ => Some(task),
            })
    }

    /// Floored start of the earliest task
    pub fn min_date(&self) -> Option<NaiveDate> {
        self.min_task().and_then(Task::floored_start_date)
    }

    /// Floored end of the latest task
    pub fn max_date(&self) -> Option<NaiveDate> {
        self.max_task().and_then(Task::floored_end_date)
    }

    /// Day-span between min and max date, inclusive; 0 with no dated tasks
    pub fn num_cols(&self) -> i64 {
        match (self.min_date(), self.max_date()) {
            (Some(min), Some(max)) => (max + Duration::days(1) - min).num_days(),
            _ => 0,
        }
    }

    /// Grid placements, one per task with both dates set, in `tasks()` order
    pub fn rows(&self) -> Vec<Row> {
        let Some(min) = self.min_date() else {
            return Vec::new();
        };
        self.tasks()
            .into_iter()
            .filter_map(|task| {
                let start = task.floored_start_date()?;
                let end = task.floored_end_date()?;
                Some(Row {
                    id: task.id().to_string(),
                    offset: (start - min).num_days(),
                    span: span_days(start, end),
                    metadata: task.metadata().clone(),
                })
            })
            .collect()
    }

    /// Applies a grid-space update to one task's dates.
    ///
    /// - offset only: moves the task to `reference_date + offset`, keeping
    ///   its current span.
    /// - span only: moves the end to `start + span`, never before the start.
    /// - both: sets start and span outright.
    ///
    /// Every branch routes through the task's atomic dual-date setter, so
    /// ordering is validated exactly once per call.
    pub fn update_row(&mut self, update: RowUpdate) -> Result<(), BoardError> {
        let task = self
            .get_task(&update.id)
            .ok_or_else(|| BoardError::UnknownTask(update.id.clone()))?;

        let (new_start, new_end) = match (update.offset, update.span) {
            (Some(offset), None) => {
                let span = current_span(task);
                let start = day_start(update.reference_date + Duration::days(offset));
                (start, start + Duration::days(span))
            }
            (None, Some(span)) => {
                // A task without dates anchors at the reference date
                let start = task
                    .start_date()
                    .unwrap_or_else(|| day_start(update.reference_date));
                (start, (start + Duration::days(span)).max(start))
            }
            (Some(offset), Some(span)) => {
                let start = day_start(update.reference_date + Duration::days(offset));
                (start, (start + Duration::days(span)).max(start))
            }
            (None, None) => return Ok(()),
        };

        let events = self
            .get_task_mut(&update.id)
            .ok_or_else(|| BoardError::UnknownTask(update.id.clone()))?
            .set_start_and_end_dates(Some(new_start), Some(new_end))?;
        self.forward_task_events(&update.id, events);
        Ok(())
    }

    /// Dependency edges whose placement is currently invalid.
    ///
    /// An edge `source -> dependency` is reported when the dependency task
    /// is missing from the board, or when both end dates are set and the
    /// dependency ends after the source.
    pub fn invalid_placements(&self) -> Vec<InvalidPlacement<'_>> {
        let mut placements = Vec::new();
        for (tail, heads) in self.graph.edges() {
            let Some(source) = self.get_task(tail) else {
                continue;
            };
            for head in heads {
                match self.get_task(head) {
                    None => placements.push(InvalidPlacement {
                        reason: PlacementIssue::DependencyMissing,
                        source,
                        dependency: None,
                    }),
                    Some(dependency) => {
                        if let (Some(dep_end), Some(src_end)) =
                            (dependency.end_date(), source.end_date())
                        {
                            if dep_end > src_end {
                                placements.push(InvalidPlacement {
                                    reason: PlacementIssue::DateConflict,
                                    source,
                                    dependency: Some(dependency),
                                });
                            }
                        }
                    }
                }
            }
        }
        placements
    }
}

/// Whole-day span between two floored dates, minimum 1
fn span_days(start: NaiveDate, end: NaiveDate) -> i64 {
    (end - start).num_days().max(1)
}

/// A task's current span; 1 when either date is unset
fn current_span(task: &Task) -> i64 {
    match (task.floored_start_date(), task.floored_end_date()) {
        (Some(start), Some(end)) => span_days(start, end),
        _ => 1,
    }
}
