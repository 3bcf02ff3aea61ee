//! Board inspection and mutation commands

use std::path::Path;

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;

use crate::domain::{PlacementIssue, RowUpdate};
use crate::storage;

use super::output::Output;

/// `gantt rows`: print each task's committed grid placement
pub fn rows(output: &Output, path: &Path) -> Result<()> {
    let board = storage::load_board(path)?;
    let rows = board.rows();

    if output.is_json() {
        output.data(&rows);
        return Ok(());
    }

    output.row(&["ID", "OFFSET", "SPAN", "START", "END"]);
    for row in &rows {
        let task = board.get_task(&row.id);
        let start = task
            .and_then(|t| t.floored_start_date())
            .map(|d| d.to_string())
            .unwrap_or_default();
        let end = task
            .and_then(|t| t.floored_end_date())
            .map(|d| d.to_string())
            .unwrap_or_default();
        output.row(&[
            &row.id,
            &row.offset.to_string(),
            &row.span.to_string(),
            &start,
            &end,
        ]);
    }
    output.blank();
    output.row(&[&format!(
        "{} task(s), {} column(s)",
        board.num_rows(),
        board.num_cols()
    )]);
    Ok(())
}

/// `gantt check`: report invalid dependency placements; non-zero exit if any
pub fn check(output: &Output, path: &Path) -> Result<()> {
    let board = storage::load_board(path)?;
    let placements = board.invalid_placements();

    if output.is_json() {
        let records: Vec<serde_json::Value> = placements
            .iter()
            .map(|p| {
                serde_json::json!({
                    "reason": p.reason,
                    "sourceId": p.source.id(),
                    "dependencyId": p.dependency.map(|d| d.id()),
                })
            })
            .collect();
        output.data(&records);
    } else if placements.is_empty() {
        output.success("All dependency placements are valid");
    } else {
        for p in &placements {
            match p.reason {
                PlacementIssue::DependencyMissing => {
                    output.row(&[&format!(
                        "{}: depends on a task that is not on the board",
                        p.source.id()
                    )]);
                }
                PlacementIssue::DateConflict => {
                    if let Some(dep) = p.dependency {
                        output.row(&[&format!(
                            "{}: dependency \"{}\" ends after it",
                            p.source.id(),
                            dep.id()
                        )]);
                    }
                }
            }
        }
    }

    if placements.is_empty() {
        Ok(())
    } else {
        bail!("{} invalid dependency placement(s)", placements.len());
    }
}

/// `gantt order`: print a dependency-respecting task order
pub fn order(output: &Output, path: &Path) -> Result<()> {
    let board = storage::load_board(path)?;
    let order = board
        .dependency_graph()
        .topological_order()
        .context("Can't order tasks")?;

    if output.is_json() {
        output.data(&order);
    } else {
        for id in &order {
            output.row(&[id]);
        }
    }
    Ok(())
}

/// `gantt shift`: apply a grid-space update to one task and save
pub fn shift(
    output: &Output,
    path: &Path,
    id: &str,
    offset: Option<i64>,
    span: Option<i64>,
    reference: Option<&str>,
) -> Result<()> {
    if offset.is_none() && span.is_none() {
        bail!("Nothing to do: pass --offset and/or --span");
    }

    let mut board = storage::load_board(path)?;

    let reference_date = match reference {
        Some(raw) => raw
            .parse::<NaiveDate>()
            .with_context(|| format!("Invalid reference date: {}", raw))?,
        None => board
            .min_date()
            .context("Board has no dated tasks; pass --reference")?,
    };

    output.verbose_ctx(
        "shift",
        &format!("reference date {}, offset {:?}, span {:?}", reference_date, offset, span),
    );

    board.update_row(RowUpdate {
        id: id.to_string(),
        offset,
        span,
        reference_date,
    })?;
    storage::save_board(path, &board)?;

    let task = board
        .get_task(id)
        .with_context(|| format!("task \"{}\" disappeared after update", id))?;
    output.success(&format!(
        "Updated \"{}\": {} -> {}",
        id,
        task.floored_start_date()
            .map(|d| d.to_string())
            .unwrap_or_default(),
        task.floored_end_date()
            .map(|d| d.to_string())
            .unwrap_or_default(),
    ));
    Ok(())
}
