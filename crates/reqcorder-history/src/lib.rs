//! History and listing views for ReqCorder.
//!
//! Wraps the record store's raw enumeration with what a user sees:
//!
//! - newest-first listings cut to a limit (`0` = unlimited) after sorting
//! - response rows re-read for status code and total time, with the creation
//!   time parsed back out of the response ID
//! - a success/failure glyph from `status >= 400`
//! - single-artifact display with template/request back-references

pub mod error;
pub mod listing;
pub mod show;

pub use error::{HistoryError, HistoryResult};
pub use listing::{
    apply_limit, status_glyph, History, RequestRow, ResponseFilter, ResponseRow, TemplateRow,
    FAILURE_GLYPH, SUCCESS_GLYPH,
};
