//! Task domain model
//!
//! A task is an identified unit of work with a start and end date (both
//! optional, both managed so day-floored values and change events come for
//! free) plus an ordered dependency list and an opaque metadata bag.
//!
//! Invariants enforced here: the id is non-empty, a task never lists itself
//! as a dependency, and whenever both dates are set the start is not after
//! the end.

use std::collections::HashMap;

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

use super::date::{day_start, DateEvent, ManagedDate};

#[derive(Debug, Error, PartialEq)]
pub enum TaskError {
    #[error("task id is required")]
    MissingId,

    #[error("task \"{0}\" included itself in its dependencies")]
    SelfDependency(String),

    #[error("task \"{id}\" was given start date {start}, which comes after end date {end}")]
    InvalidDateRange {
        id: String,
        start: NaiveDateTime,
        end: NaiveDateTime,
    },
}

/// Metadata for a task - extensible key-value pairs
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TaskMeta(HashMap<String, serde_json::Value>);

impl TaskMeta {
    /// Creates empty metadata
    pub fn new() -> Self {
        Self(HashMap::new())
    }

    /// Gets a value by key
    pub fn get(&self, key: &str) -> Option<&serde_json::Value> {
        self.0.get(key)
    }

    /// Sets a value
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) {
        self.0.insert(key.into(), value.into());
    }

    /// Returns true if empty
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates over all key-value pairs
    pub fn iter(&self) -> impl Iterator<Item = (&String, &serde_json::Value)> {
        self.0.iter()
    }
}

/// Wire/construction form of a task.
///
/// Dates are accepted either as `YYYY-MM-DD` (interpreted as local
/// midnight) or as a full naive datetime like `2024-03-01T09:30:00`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskSpec {
    pub id: String,

    #[serde(default, skip_serializing_if = "TaskMeta::is_empty")]
    pub metadata: TaskMeta,

    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "deserialize_flexible_date"
    )]
    pub start_date: Option<NaiveDateTime>,

    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "deserialize_flexible_date"
    )]
    pub end_date: Option<NaiveDateTime>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dependencies: Vec<String>,
}

/// Parses a date given either as a day or as a full naive datetime
pub fn parse_date(input: &str) -> Result<NaiveDateTime, chrono::ParseError> {
    input
        .parse::<NaiveDateTime>()
        .or_else(|_| input.parse::<NaiveDate>().map(day_start))
}

fn deserialize_flexible_date<'de, D>(deserializer: D) -> Result<Option<NaiveDateTime>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    match raw {
        None => Ok(None),
        Some(s) => parse_date(&s).map(Some).map_err(serde::de::Error::custom),
    }
}

/// Which of a task's two dates changed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateField {
    Start,
    End,
}

/// A change produced by a task mutator
#[derive(Debug, Clone, PartialEq)]
pub enum TaskEvent {
    DateChanged {
        field: DateField,
        prev: Option<NaiveDateTime>,
        new: Option<NaiveDateTime>,
    },
    FlooredDateChanged {
        field: DateField,
        prev: Option<NaiveDate>,
        new: Option<NaiveDate>,
    },
    DependenciesChanged {
        prev: Vec<String>,
        new: Vec<String>,
    },
}

/// A unit of work on the board
#[derive(Debug, Clone, PartialEq)]
pub struct Task {
    id: String,
    metadata: TaskMeta,
    start: ManagedDate,
    end: ManagedDate,
    dependencies: Vec<String>,
}

impl Task {
    /// Builds and validates a task from its spec
    pub fn new(spec: TaskSpec) -> Result<Self, TaskError> {
        if spec.id.is_empty() {
            return Err(TaskError::MissingId);
        }

        let task = Self {
            id: spec.id,
            metadata: spec.metadata,
            start: ManagedDate::new(spec.start_date),
            end: ManagedDate::new(spec.end_date),
            dependencies: spec.dependencies,
        };

        task.validate_dependencies()?;
        task.validate_dates()?;
        Ok(task)
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn metadata(&self) -> &TaskMeta {
        &self.metadata
    }

    pub fn dependencies(&self) -> &[String] {
        &self.dependencies
    }

    pub fn start_date(&self) -> Option<NaiveDateTime> {
        self.start.value()
    }

    pub fn end_date(&self) -> Option<NaiveDateTime> {
        self.end.value()
    }

    pub fn floored_start_date(&self) -> Option<NaiveDate> {
        self.start.floored()
    }

    pub fn floored_end_date(&self) -> Option<NaiveDate> {
        self.end.floored()
    }

    /// Converts back to the wire form
    pub fn to_spec(&self) -> TaskSpec {
        TaskSpec {
            id: self.id.clone(),
            metadata: self.metadata.clone(),
            start_date: self.start.value(),
            end_date: self.end.value(),
            dependencies: self.dependencies.clone(),
        }
    }

    fn validate_dependencies(&self) -> Result<(), TaskError> {
        if self.dependencies.iter().any(|dep| dep == &self.id) {
            return Err(TaskError::SelfDependency(self.id.clone()));
        }
        Ok(())
    }

    fn validate_dates(&self) -> Result<(), TaskError> {
        if let (Some(start), Some(end)) = (self.start.value(), self.end.value()) {
            if start > end {
                return Err(TaskError::InvalidDateRange {
                    id: self.id.clone(),
                    start,
                    end,
                });
            }
        }
        Ok(())
    }

    /// Sets the start date, validating ordering against the current end.
    ///
    /// On failure the field is rolled back and nothing is emitted. Moving a
    /// single bound across the other therefore fails; use
    /// [`set_start_and_end_dates`](Self::set_start_and_end_dates) to move
    /// both at once.
    pub fn set_start_date(
        &mut self,
        value: Option<NaiveDateTime>,
    ) -> Result<Vec<TaskEvent>, TaskError> {
        let prev = self.start.value();
        let events = self.start.set(value);
        if let Err(e) = self.validate_dates() {
            self.start.set(prev);
            return Err(e);
        }
        Ok(map_date_events(DateField::Start, events))
    }

    /// Sets the end date; same contract as [`set_start_date`](Self::set_start_date).
    pub fn set_end_date(
        &mut self,
        value: Option<NaiveDateTime>,
    ) -> Result<Vec<TaskEvent>, TaskError> {
        let prev = self.end.value();
        let events = self.end.set(value);
        if let Err(e) = self.validate_dates() {
            self.end.set(prev);
            return Err(e);
        }
        Ok(map_date_events(DateField::End, events))
    }

    /// Atomic dual update: sets both dates, then validates ordering once.
    ///
    /// Avoids the transient violation that single-field setters would raise
    /// when only one bound crosses the other. On failure both fields roll
    /// back and nothing is emitted.
    pub fn set_start_and_end_dates(
        &mut self,
        start: Option<NaiveDateTime>,
        end: Option<NaiveDateTime>,
    ) -> Result<Vec<TaskEvent>, TaskError> {
        let prev_start = self.start.value();
        let prev_end = self.end.value();

        let start_events = self.start.set(start);
        let end_events = self.end.set(end);

        if let Err(e) = self.validate_dates() {
            self.start.set(prev_start);
            self.end.set(prev_end);
            return Err(e);
        }

        let mut events = map_date_events(DateField::Start, start_events);
        events.extend(map_date_events(DateField::End, end_events));
        Ok(events)
    }

    /// Appends dependencies, suppressing ids already present.
    ///
    /// The whole batch is validated up front: if any id equals the task's
    /// own id nothing is applied. One `DependenciesChanged` event is
    /// produced per id actually appended.
    pub fn add_dependencies<I, S>(&mut self, ids: I) -> Result<Vec<TaskEvent>, TaskError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let ids: Vec<String> = ids.into_iter().map(Into::into).collect();
        if ids.iter().any(|id| id == &self.id) {
            return Err(TaskError::SelfDependency(self.id.clone()));
        }

        let mut events = Vec::new();
        for id in ids {
            if !self.dependencies.contains(&id) {
                let prev = self.dependencies.clone();
                self.dependencies.push(id);
                events.push(TaskEvent::DependenciesChanged {
                    prev,
                    new: self.dependencies.clone(),
                });
            }
        }
        Ok(events)
    }

    /// Adds a single dependency
    pub fn add_dependency(&mut self, id: impl Into<String>) -> Result<Vec<TaskEvent>, TaskError> {
        self.add_dependencies([id.into()])
    }

    /// Removes dependencies; absent ids are a no-op and emit nothing
    pub fn remove_dependencies<'a, I>(&mut self, ids: I) -> Vec<TaskEvent>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut events = Vec::new();
        for id in ids {
            if self.dependencies.iter().any(|dep| dep == id) {
                let prev = self.dependencies.clone();
                self.dependencies.retain(|dep| dep != id);
                events.push(TaskEvent::DependenciesChanged {
                    prev,
                    new: self.dependencies.clone(),
                });
            }
        }
        events
    }

    /// Removes a single dependency
    pub fn remove_dependency(&mut self, id: &str) -> Vec<TaskEvent> {
        self.remove_dependencies([id])
    }
}

fn map_date_events(field: DateField, events: Vec<DateEvent>) -> Vec<TaskEvent> {
    events
        .into_iter()
        .map(|event| match event {
            DateEvent::Changed { prev, new } => TaskEvent::DateChanged { field, prev, new },
            DateEvent::FlooredChanged { prev, new } => {
                TaskEvent::FlooredDateChanged { field, prev, new }
            }
        })
        .collect()
}
