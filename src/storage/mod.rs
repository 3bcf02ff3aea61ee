//! Board file storage
//!
//! A board lives in a single JSON or YAML file holding a [`BoardConfig`]:
//! the task specs plus the grid cell dimensions. The format is picked by
//! file extension (`.yaml`/`.yml` for YAML, anything else JSON).

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

use crate::domain::{Board, BoardConfig};

fn is_yaml(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|ext| ext.to_str()),
        Some("yaml") | Some("yml")
    )
}

/// Reads a board config from a file
pub fn load_config(path: &Path) -> Result<BoardConfig> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("Failed to read board file: {}", path.display()))?;

    let config = if is_yaml(path) {
        serde_yaml::from_str(&raw)
            .with_context(|| format!("Failed to parse YAML board file: {}", path.display()))?
    } else {
        serde_json::from_str(&raw)
            .with_context(|| format!("Failed to parse JSON board file: {}", path.display()))?
    };
    Ok(config)
}

/// Reads and constructs a board from a file
pub fn load_board(path: &Path) -> Result<Board> {
    let config = load_config(path)?;
    Board::new(config)
        .with_context(|| format!("Invalid board in file: {}", path.display()))
}

/// Writes a board back to a file in the format its extension implies
pub fn save_board(path: &Path, board: &Board) -> Result<()> {
    let config = BoardConfig {
        tasks: board.tasks().iter().map(|task| task.to_spec()).collect(),
        cell_width: board.cell_width(),
        cell_height: board.cell_height(),
    };

    let raw = if is_yaml(path) {
        serde_yaml::to_string(&config).context("Failed to serialize board to YAML")?
    } else {
        let mut json =
            serde_json::to_string_pretty(&config).context("Failed to serialize board to JSON")?;
        json.push('\n');
        json
    };

    fs::write(path, raw)
        .with_context(|| format!("Failed to write board file: {}", path.display()))
}
