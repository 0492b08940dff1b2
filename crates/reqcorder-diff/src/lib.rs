//! Diff and comparison for ReqCorder.
//!
//! Resolves two stored artifacts of the same kind (templates and requests by
//! hash, responses by ID) and renders the difference between their stored
//! YAML text.
//!
//! # Key Types
//!
//! - [`DiffMode`]: line-oriented or inline word-level output
//! - [`LineDiff`] / [`InlineSegment`]: structured diff results
//!
//! Colour is decided by the caller; with it off, inline changes are marked
//! with `[-..-]` and `{+..+}`.

pub mod compare;
pub mod error;
pub mod render;
pub mod text_diff;

pub use compare::{compare, diff_artifacts, resolve_text};
pub use error::{DiffError, DiffResult};
pub use render::{render, DiffMode};
pub use text_diff::{diff_inline, diff_lines, DiffLine, InlineSegment, LineDiff};
