//! # Command-Line Interface
//!
//! User-facing CLI commands and output formatting.
//!
//! | Command | Purpose |
//! |---------|---------|
//! | `rows` | Print each task's grid placement |
//! | `check` | Report invalid dependency placements |
//! | `order` | Dependency-respecting task order |
//! | `shift` | Move/resize one task from the command line |
//! | `tui` | Interactive board (mouse drag, resize, multi-select) |
//!
//! All commands support `--format text|json` and `--verbose`.
//!
//! Call [`run()`] to parse arguments and execute the appropriate command.

mod app;
mod board_cmd;
mod output;
mod tui;

pub use app::{run, Cli, Commands};
pub use output::{Output, OutputFormat};
