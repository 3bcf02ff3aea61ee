//! Terminal initialization, restoration and board drawing

use std::io::{self, stdout, Stdout};

use anyhow::Result;
use chrono::{Datelike, Duration};
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::prelude::*;

use super::app::{App, DAY_WIDTH, HEADER_HEIGHT, LABEL_WIDTH};

/// Terminal type alias
pub type Terminal = ratatui::Terminal<CrosstermBackend<Stdout>>;

/// Initialize the terminal for TUI mode (mouse reporting enabled)
pub fn init_terminal() -> Result<Terminal> {
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let terminal = ratatui::Terminal::new(backend)?;
    Ok(terminal)
}

/// Restore the terminal to normal mode
pub fn restore_terminal() -> Result<()> {
    execute!(io::stdout(), DisableMouseCapture, LeaveAlternateScreen)?;
    disable_raw_mode()?;
    Ok(())
}

/// Draws the whole board view
pub fn draw(frame: &mut Frame, app: &App) {
    let area = frame.area();
    let buf = frame.buffer_mut();

    draw_title(buf, app);

    let Some(min_date) = app.board.min_date() else {
        buf.set_string(
            0,
            HEADER_HEIGHT,
            "No dated tasks on this board",
            Style::default().fg(Color::DarkGray),
        );
        return;
    };

    // Day-of-month header above the grid
    let num_cols = app.board.num_cols();
    for col in 0..num_cols {
        let x = LABEL_WIDTH + (col * i64::from(DAY_WIDTH)) as u16;
        if x + DAY_WIDTH > area.width {
            break;
        }
        let day = min_date + Duration::days(col);
        let style = if day.day() == 1 || col == 0 {
            Style::default().fg(Color::Cyan)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        buf.set_string(x, 1, format!("{:>2}", day.day()), style);
    }

    let rows = app.controller.rendered_rows(&app.board);
    let conflicted = app.conflicted_ids();

    for (index, row) in rows.iter().enumerate() {
        let y = HEADER_HEIGHT + index as u16;
        if y >= area.height.saturating_sub(1) {
            break;
        }

        // Task label column
        let selected = app.controller.selected().contains(&row.id);
        let label_style = if selected {
            Style::default().fg(Color::Yellow)
        } else {
            Style::default()
        };
        let label: String = row.id.chars().take(LABEL_WIDTH as usize - 1).collect();
        buf.set_string(0, y, label, label_style);

        // Task bar
        let bar_x = LABEL_WIDTH as i64 + row.offset * i64::from(DAY_WIDTH);
        let bar_width = row.span * i64::from(DAY_WIDTH);
        let mut bar_style = Style::default().bg(if conflicted.contains(row.id.as_str()) {
            Color::Red
        } else if selected {
            Color::Yellow
        } else {
            Color::Blue
        });
        if app.controller.is_moving() || app.controller.is_resizing() {
            bar_style = bar_style.add_modifier(Modifier::DIM);
        }
        for dx in 0..bar_width {
            let x = bar_x + dx;
            if x < i64::from(LABEL_WIDTH) || x >= i64::from(area.width) {
                continue;
            }
            let glyph = if dx == 0 || dx == bar_width - 1 { "▐" } else { " " };
            buf.set_string(x as u16, y, glyph, bar_style);
        }
    }

    // Rubber-band selection overlay
    if let Some(rect) = app.controller.selection_area() {
        let x0 = rect.x.floor().max(0.0) as u16;
        let y0 = rect.y.floor().max(0.0) as u16;
        let x1 = ((rect.x + rect.width).ceil() as u16).min(area.width.saturating_sub(1));
        let y1 = ((rect.y + rect.height).ceil() as u16).min(area.height.saturating_sub(1));
        let style = Style::default().bg(Color::DarkGray);
        for y in y0..=y1 {
            for x in x0..=x1 {
                buf.set_style(Rect::new(x, y, 1, 1), style);
            }
        }
    }

    draw_footer(buf, area, app);
}

fn draw_title(buf: &mut Buffer, app: &App) {
    let dirty = if app.dirty { " [modified]" } else { "" };
    let title = format!(" {}{}", app.path.display(), dirty);
    buf.set_string(0, 0, title, Style::default().add_modifier(Modifier::BOLD));
}

fn draw_footer(buf: &mut Buffer, area: Rect, app: &App) {
    let y = area.height.saturating_sub(1);
    let text = match &app.status {
        Some(message) => message.clone(),
        None => "drag: move | edges: resize | shift-click: select | s: save | q: quit".to_string(),
    };
    buf.set_string(0, y, text, Style::default().fg(Color::DarkGray));
}
