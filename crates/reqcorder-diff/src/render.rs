//! Terminal rendering of text diffs.

use std::io::Write;

use colored::Colorize;
use tracing::debug;

use crate::error::{DiffError, DiffResult};
use crate::text_diff::{diff_inline, diff_lines, DiffLine, InlineSegment};

/// Output style of a rendered diff.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DiffMode {
    /// Git-style: `--- source` / `+++ target` headers, then every line
    /// prefixed with `-`, `+` or a space.
    #[default]
    Line,
    /// Word-level changes marked inside the combined text.
    Inline,
}

/// Render the difference between `source` and `target`.
///
/// With `color` off, inline deletions are written as `[-text-]` and
/// insertions as `{+text+}`; with it on they are shown in red and green.
pub fn render<W: Write>(
    w: &mut W,
    source: &str,
    target: &str,
    source_label: &str,
    target_label: &str,
    mode: DiffMode,
    color: bool,
) -> DiffResult<()> {
    let written = match mode {
        DiffMode::Line => render_lines(w, source, target, source_label, target_label, color),
        DiffMode::Inline => render_inline(w, source, target, source_label, target_label, color),
    };
    written.map_err(DiffError::Render)
}

fn render_lines<W: Write>(
    w: &mut W,
    source: &str,
    target: &str,
    source_label: &str,
    target_label: &str,
    color: bool,
) -> std::io::Result<()> {
    writeln!(w, "{}", paint(&format!("--- {source_label}"), Paint::Removed, color))?;
    writeln!(w, "{}", paint(&format!("+++ {target_label}"), Paint::Added, color))?;
    writeln!(w)?;

    let diff = diff_lines(source, target);
    debug!(
        identical = diff.is_empty(),
        additions = diff.additions(),
        deletions = diff.deletions(),
        "rendering line diff"
    );
    for line in diff.lines {
        match line {
            DiffLine::Removed(text) => {
                writeln!(w, "{}", paint(&format!("-{text}"), Paint::Removed, color))?
            }
            DiffLine::Added(text) => {
                writeln!(w, "{}", paint(&format!("+{text}"), Paint::Added, color))?
            }
            DiffLine::Context(text) => writeln!(w, " {text}")?,
        }
    }
    Ok(())
}

fn render_inline<W: Write>(
    w: &mut W,
    source: &str,
    target: &str,
    source_label: &str,
    target_label: &str,
    color: bool,
) -> std::io::Result<()> {
    writeln!(w, "{}", paint(target_label, Paint::Added, color))?;
    writeln!(w, "{}", paint(source_label, Paint::Removed, color))?;
    writeln!(w)?;

    for segment in diff_inline(source, target) {
        match segment {
            InlineSegment::Equal(text) => write!(w, "{text}")?,
            InlineSegment::Deleted(text) if color => write!(w, "{}", text.red())?,
            InlineSegment::Inserted(text) if color => write!(w, "{}", text.green())?,
            InlineSegment::Deleted(text) => write!(w, "[-{text}-]")?,
            InlineSegment::Inserted(text) => write!(w, "{{+{text}+}}")?,
        }
    }
    Ok(())
}

#[derive(Clone, Copy)]
enum Paint {
    Added,
    Removed,
}

fn paint(text: &str, paint: Paint, color: bool) -> String {
    match (paint, color) {
        (_, false) => text.to_string(),
        (Paint::Added, true) => text.green().to_string(),
        (Paint::Removed, true) => text.red().to_string(),
    }
}
