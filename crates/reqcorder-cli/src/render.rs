//! Terminal presentation helpers: tables, previews, durations and timestamps.

use std::io::{self, Write};
use std::time::Duration;

use chrono::{DateTime, Utc};

/// Widest a table column may grow before its cells wrap.
pub const MAX_COLUMN_WIDTH: usize = 25;
pub const PREVIEW_LIMIT: usize = 80;
const PREVIEW_KEEP: usize = 76;

/// Response headers worth showing after an exchange.
pub const IMPORTANT_HEADERS: &[&str] = &[
    "Content-Type",
    "Location",
    "Cache-Control",
    "X-Ratelimit-Remaining",
    "X-Ratelimit-Limit",
    "X-Ratelimit-Reset",
];

/// Bodies longer than 80 characters are cut to 76 plus `...`.
pub fn preview(body: &str) -> String {
    if body.chars().count() > PREVIEW_LIMIT {
        let kept: String = body.chars().take(PREVIEW_KEEP).collect();
        format!("{kept}...")
    } else {
        body.to_string()
    }
}

pub fn format_duration(d: Duration) -> String {
    format!("{d:?}")
}

pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.format("%Y-%m-%d %H:%M:%S +0000 UTC").to_string()
}

/// JSON bodies re-indented; anything else unchanged.
pub fn pretty_body(body: &str) -> String {
    match serde_json::from_str::<serde_json::Value>(body) {
        Ok(value) if value.is_object() || value.is_array() => {
            serde_json::to_string_pretty(&value).unwrap_or_else(|_| body.to_string())
        }
        _ => body.to_string(),
    }
}

/// Draw a boxed table with a separator between every row.
pub fn table<W: Write>(w: &mut W, header: &[&str], rows: &[Vec<String>]) -> io::Result<()> {
    let columns = header.len();
    let mut widths: Vec<usize> = header.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (i, cell) in row.iter().take(columns).enumerate() {
            widths[i] = widths[i].max(cell.chars().count());
        }
    }
    for width in &mut widths {
        *width = (*width).clamp(1, MAX_COLUMN_WIDTH);
    }

    border(w, &widths, ('┌', '┬', '┐'))?;
    let header: Vec<String> = header.iter().map(|h| h.to_uppercase()).collect();
    cells(w, &widths, &header)?;
    for row in rows {
        border(w, &widths, ('├', '┼', '┤'))?;
        cells(w, &widths, row)?;
    }
    border(w, &widths, ('└', '┴', '┘'))
}

fn border<W: Write>(w: &mut W, widths: &[usize], (left, mid, right): (char, char, char)) -> io::Result<()> {
    let segments: Vec<String> = widths.iter().map(|n| "─".repeat(n + 2)).collect();
    writeln!(w, "{left}{}{right}", segments.join(&mid.to_string()))
}

fn cells<W: Write>(w: &mut W, widths: &[usize], row: &[String]) -> io::Result<()> {
    let wrapped: Vec<Vec<String>> = widths
        .iter()
        .enumerate()
        .map(|(i, width)| wrap(row.get(i).map(String::as_str).unwrap_or(""), *width))
        .collect();
    let height = wrapped.iter().map(Vec::len).max().unwrap_or(1);

    for line in 0..height {
        write!(w, "│")?;
        for (cell, width) in wrapped.iter().zip(widths) {
            let text = cell.get(line).map(String::as_str).unwrap_or("");
            let pad = width.saturating_sub(text.chars().count());
            write!(w, " {text}{} │", " ".repeat(pad))?;
        }
        writeln!(w)?;
    }
    Ok(())
}

/// Split `text` into lines of at most `width` characters, breaking on
/// whitespace where possible.
fn wrap(text: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();
    for word in text.split_whitespace() {
        let mut word: Vec<char> = word.chars().collect();
        loop {
            let used = current.chars().count();
            let gap = usize::from(used > 0);
            if used + gap + word.len() <= width {
                if gap == 1 {
                    current.push(' ');
                }
                current.extend(word.iter());
                break;
            }
            if used > 0 {
                lines.push(std::mem::take(&mut current));
                continue;
            }
            let rest = word.split_off(width);
            lines.push(word.into_iter().collect());
            word = rest;
        }
    }
    if !current.is_empty() || lines.is_empty() {
        lines.push(current);
    }
    lines
}
