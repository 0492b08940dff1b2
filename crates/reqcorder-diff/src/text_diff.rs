//! Structured text differences: whole-document line diffs and word-level
//! inline diffs.
//!
//! Uses the `similar` crate (Myers diff algorithm).

use similar::{ChangeTag, TextDiff};

/// A line-by-line comparison of two documents.
///
/// Unlike a hunked patch, every line of both documents is kept so the full
/// artifact can be read in context.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LineDiff {
    pub lines: Vec<DiffLine>,
}

impl LineDiff {
    /// Returns `true` if the two documents are identical.
    pub fn is_empty(&self) -> bool {
        self.lines
            .iter()
            .all(|l| matches!(l, DiffLine::Context(_)))
    }

    pub fn additions(&self) -> usize {
        self.lines
            .iter()
            .filter(|l| matches!(l, DiffLine::Added(_)))
            .count()
    }

    pub fn deletions(&self) -> usize {
        self.lines
            .iter()
            .filter(|l| matches!(l, DiffLine::Removed(_)))
            .count()
    }
}

/// A single line in a diff.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DiffLine {
    /// A line present in both documents.
    Context(String),
    /// A line only in the target.
    Added(String),
    /// A line only in the source.
    Removed(String),
}

/// A run of text in an inline diff.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum InlineSegment {
    Equal(String),
    Inserted(String),
    Deleted(String),
}

/// Compute a line diff between `old` and `new`.
pub fn diff_lines(old: &str, new: &str) -> LineDiff {
    let text_diff = TextDiff::from_lines(old, new);
    let lines = text_diff
        .iter_all_changes()
        .map(|change| {
            let text = change.value().trim_end_matches(['\n', '\r']).to_string();
            match change.tag() {
                ChangeTag::Equal => DiffLine::Context(text),
                ChangeTag::Delete => DiffLine::Removed(text),
                ChangeTag::Insert => DiffLine::Added(text),
            }
        })
        .collect();
    LineDiff { lines }
}

/// Compute a word-level diff, merging adjacent changes of the same kind.
pub fn diff_inline(old: &str, new: &str) -> Vec<InlineSegment> {
    let text_diff = TextDiff::from_words(old, new);
    let mut segments: Vec<InlineSegment> = Vec::new();
    for change in text_diff.iter_all_changes() {
        let value = change.value();
        let extends_last = matches!(
            (segments.last(), change.tag()),
            (Some(InlineSegment::Equal(_)), ChangeTag::Equal)
                | (Some(InlineSegment::Inserted(_)), ChangeTag::Insert)
                | (Some(InlineSegment::Deleted(_)), ChangeTag::Delete)
        );
        if extends_last {
            if let Some(
                InlineSegment::Equal(s) | InlineSegment::Inserted(s) | InlineSegment::Deleted(s),
            ) = segments.last_mut()
            {
                s.push_str(value);
            }
            continue;
        }
        segments.push(match change.tag() {
            ChangeTag::Equal => InlineSegment::Equal(value.to_string()),
            ChangeTag::Insert => InlineSegment::Inserted(value.to_string()),
            ChangeTag::Delete => InlineSegment::Deleted(value.to_string()),
        });
    }
    segments
}
