// Table and summary rendering for roster views

use std::io::IsTerminal;

use serde::Serialize;

use crate::models::{Contestant, ToggleAxis};
use crate::utils::format_time;

// ANSI escape codes
const ANSI_BOLD: &str = "\x1b[1m";
const ANSI_STRIKE: &str = "\x1b[9m";
const ANSI_GLOW: &str = "\x1b[1;33m";
const ANSI_RESET: &str = "\x1b[0m";

/// Which schedule a table shows
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RosterView {
    /// Main stage schedule with main flags
    Main,
    /// Pre-judging schedule with pre-judging flags
    Prejudge,
    /// Main schedule with pre-judging slots, no flags
    All,
    /// Stage names and times only (regular users)
    Public,
    /// Stage names and pre-judging times only (regular users)
    PublicPrejudge,
}

/// Check if stdout is a terminal (TTY)
pub fn is_tty() -> bool {
    std::io::stdout().is_terminal()
}

/// Get terminal width dynamically
///
/// Uses the `terminal_size` crate, with fallback to COLUMNS and a default.
pub fn get_terminal_width() -> usize {
    if let Some((terminal_size::Width(w), _)) = terminal_size::terminal_size() {
        if w > 0 {
            return w as usize;
        }
    }

    if let Ok(cols) = std::env::var("COLUMNS") {
        if let Ok(width) = cols.parse::<usize>() {
            if width > 0 && width < 10000 {
                return width;
            }
        }
    }

    120
}

/// Row shape for the public (user) schedule in JSON output
#[derive(Debug, Serialize)]
pub struct PublicEntry<'a> {
    pub stage_name: &'a str,
    pub time: i64,
}

/// JSON for a roster view
pub fn format_roster_json(contestants: &[Contestant], view: RosterView) -> anyhow::Result<String> {
    let json = match view {
        RosterView::Public | RosterView::PublicPrejudge => serde_json::to_string_pretty(
            &contestants
                .iter()
                .map(|c| PublicEntry { stage_name: &c.stage_name, time: public_time(c, view) })
                .collect::<Vec<_>>(),
        )?,
        RosterView::Prejudge => serde_json::to_string_pretty(
            &contestants
                .iter()
                .map(|c| serde_json::json!({
                    "stage_name": c.stage_name,
                    "character": c.character,
                    "time": c.prejudge_ts,
                    "crossed_out": c.flags.crossed_out_prejudge,
                    "glowing": c.flags.glowing_prejudge,
                }))
                .collect::<Vec<_>>(),
        )?,
        RosterView::Main | RosterView::All => serde_json::to_string_pretty(contestants)?,
    };
    Ok(json)
}

/// Render a roster view as a table
pub fn format_roster_table(contestants: &[Contestant], view: RosterView, tty: bool) -> String {
    if contestants.is_empty() {
        return match view {
            RosterView::Prejudge | RosterView::PublicPrejudge => {
                "No contestants scheduled for pre-judging.".to_string()
            }
            _ => "No contestants found.".to_string(),
        };
    }

    let headers: Vec<&str> = match view {
        RosterView::Main => vec!["Time", "Stage Name", "Character", "State", "Comment"],
        RosterView::Prejudge => vec!["Time", "Stage Name", "Character", "State"],
        RosterView::All => vec!["Time", "Stage Name", "Character", "Prejudge", "Comment"],
        RosterView::Public | RosterView::PublicPrejudge => vec!["Time", "Stage Name"],
    };

    let mut rows: Vec<(Vec<String>, RowStyle)> = Vec::new();
    for c in contestants {
        let (crossed, glowing) = match view {
            RosterView::Main => (c.flags.crossed_out_main, c.flags.glowing_main),
            RosterView::Prejudge => (c.flags.crossed_out_prejudge, c.flags.glowing_prejudge),
            _ => (false, false),
        };
        let style = RowStyle { crossed, glowing };
        let comment = c.comment.clone().unwrap_or_default();

        let cells = match view {
            RosterView::Main => vec![
                format_time(c.cosplay_ts),
                c.stage_name.clone(),
                c.character.clone(),
                style.label(),
                comment,
            ],
            RosterView::Prejudge => vec![
                c.prejudge_ts.map(format_time).unwrap_or_default(),
                c.stage_name.clone(),
                c.character.clone(),
                style.label(),
            ],
            RosterView::All => vec![
                format_time(c.cosplay_ts),
                c.stage_name.clone(),
                c.character.clone(),
                c.prejudge_ts.map(format_time).unwrap_or_else(|| "-".to_string()),
                comment,
            ],
            RosterView::Public | RosterView::PublicPrejudge => {
                vec![format_time(public_time(c, view)), c.stage_name.clone()]
            }
        };
        rows.push((cells, style));
    }

    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for (cells, _) in &rows {
        for (i, cell) in cells.iter().enumerate() {
            widths[i] = widths[i].max(cell.chars().count());
        }
    }

    // Let the last column shrink to fit the terminal
    if tty {
        let fixed: usize = widths[..widths.len() - 1].iter().map(|w| w + 2).sum();
        let available = get_terminal_width().saturating_sub(fixed).max(10);
        if let Some(last) = widths.last_mut() {
            *last = (*last).min(available);
        }
    }

    let mut output = String::new();
    let header_line = join_cells(&headers.iter().map(|h| h.to_string()).collect::<Vec<_>>(), &widths);
    if tty {
        output.push_str(&format!("{}{}{}\n", ANSI_BOLD, header_line, ANSI_RESET));
    } else {
        output.push_str(&header_line);
        output.push('\n');
        output.push_str(&widths.iter().map(|w| "-".repeat(*w)).collect::<Vec<_>>().join("  "));
        output.push('\n');
    }

    for (cells, style) in &rows {
        let line = join_cells(cells, &widths);
        output.push_str(&style.paint(&line, tty));
        output.push('\n');
    }

    output.trim_end().to_string()
}

fn public_time(c: &Contestant, view: RosterView) -> i64 {
    match view {
        RosterView::PublicPrejudge => c.prejudge_ts.unwrap_or(c.cosplay_ts),
        _ => c.cosplay_ts,
    }
}

/// Render the full record of one contestant
pub fn format_contestant_summary(c: &Contestant) -> String {
    let mut lines = vec![
        format!("Stage Name:     {}", c.stage_name),
        format!("Character:      {}", c.character),
        format!("Time:           {}", format_time(c.cosplay_ts)),
        format!(
            "Pre-judging:    {}",
            c.prejudge_ts.map(format_time).unwrap_or_else(|| "no".to_string())
        ),
    ];
    if let Some(comment) = &c.comment {
        lines.push(format!("Comment:        {}", comment));
    }
    if let Some(audio) = &c.audio_url {
        lines.push(format!("Audio:          {}", audio));
    }
    if let Some(video) = &c.video_url {
        lines.push(format!("Video:          {}", video));
    }

    let flags: Vec<&str> = ToggleAxis::ALL
        .iter()
        .filter(|axis| c.flags.get(**axis))
        .map(|axis| axis.as_str())
        .collect();
    lines.push(format!(
        "Flags:          {}",
        if flags.is_empty() { "none".to_string() } else { flags.join(", ") }
    ));

    lines.join("\n")
}

#[derive(Debug, Clone, Copy)]
struct RowStyle {
    crossed: bool,
    glowing: bool,
}

impl RowStyle {
    fn label(&self) -> String {
        match (self.crossed, self.glowing) {
            (true, true) => "done, glow".to_string(),
            (true, false) => "done".to_string(),
            (false, true) => "glow".to_string(),
            (false, false) => String::new(),
        }
    }

    fn paint(&self, line: &str, tty: bool) -> String {
        if !tty || (!self.crossed && !self.glowing) {
            return line.to_string();
        }
        let mut prefix = String::new();
        if self.glowing {
            prefix.push_str(ANSI_GLOW);
        }
        if self.crossed {
            prefix.push_str(ANSI_STRIKE);
        }
        format!("{}{}{}", prefix, line, ANSI_RESET)
    }
}

fn join_cells(cells: &[String], widths: &[usize]) -> String {
    cells
        .iter()
        .zip(widths)
        .map(|(cell, width)| pad(&truncate(cell, *width), *width))
        .collect::<Vec<_>>()
        .join("  ")
        .trim_end()
        .to_string()
}

fn truncate(s: &str, width: usize) -> String {
    if s.chars().count() <= width {
        return s.to_string();
    }
    let mut out: String = s.chars().take(width.saturating_sub(3)).collect();
    out.push_str("...");
    out
}

fn pad(s: &str, width: usize) -> String {
    let len = s.chars().count();
    format!("{}{}", s, " ".repeat(width.saturating_sub(len)))
}
