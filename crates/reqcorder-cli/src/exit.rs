//! Mapping failures to exit codes and user-facing messages.

use std::io;

use reqcorder_diff::DiffError;
use reqcorder_exec::{ExecError, ValidationError};
use reqcorder_history::HistoryError;
use reqcorder_store::StoreError;
use reqcorder_types::CodecError;

use crate::config::ConfigError;

/// Exit code groups.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Category {
    Io = 1,
    Usage = 2,
    Data = 3,
    Fetch = 4,
    Render = 5,
    Unknown = 125,
}

impl Category {
    pub fn code(self) -> u8 {
        self as u8
    }
}

/// Misuse the argument parser cannot catch.
#[derive(Debug, thiserror::Error)]
#[error("invalid usage, {0}")]
pub struct UsageError(pub String);

/// What to tell the user, and how to exit.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Failure {
    pub category: Category,
    pub message: String,
}

impl Failure {
    fn new(category: Category, message: impl Into<String>) -> Self {
        Self {
            category,
            message: message.into(),
        }
    }
}

/// Classify by the outermost recognised error in the chain.
pub fn classify(err: &anyhow::Error) -> Failure {
    for cause in err.chain() {
        if let Some(failure) = classify_cause(cause) {
            return failure;
        }
    }
    Failure::new(Category::Unknown, err.to_string())
}

fn classify_cause(cause: &(dyn std::error::Error + 'static)) -> Option<Failure> {
    if let Some(e) = cause.downcast_ref::<StoreError>() {
        return Some(store_failure(e));
    }
    if let Some(e) = cause.downcast_ref::<HistoryError>() {
        return Some(match e {
            HistoryError::Store(e) => store_failure(e),
            HistoryError::TimestampParse { .. } => {
                Failure::new(Category::Data, "failed to format timestamp")
            }
        });
    }
    if let Some(e) = cause.downcast_ref::<DiffError>() {
        return Some(match e {
            DiffError::Store(e) => store_failure(e),
            DiffError::Render(_) => Failure::new(Category::Render, "failed to render diff"),
        });
    }
    if let Some(e) = cause.downcast_ref::<ValidationError>() {
        return Some(match e {
            ValidationError::InvalidUrl { .. } => Failure::new(Category::Usage, "invalid URL passed"),
            ValidationError::InvalidMethod(_) => {
                Failure::new(Category::Usage, "invalid HTTP method passed")
            }
        });
    }
    if let Some(e) = cause.downcast_ref::<ExecError>() {
        return Some(match e {
            ExecError::CaCertRead { .. } | ExecError::CaCertParse { .. } => {
                Failure::new(Category::Data, "failed to read certificate path")
            }
            _ => Failure::new(Category::Data, "failed to process request"),
        });
    }
    if let Some(e) = cause.downcast_ref::<CodecError>() {
        return Some(codec_failure(e));
    }
    if let Some(e) = cause.downcast_ref::<ConfigError>() {
        return Some(match e {
            ConfigError::NoHomeDir => Failure::new(Category::Io, e.to_string()),
            ConfigError::Read { .. } => Failure::new(Category::Io, "failed to read config file"),
            ConfigError::Parse(_) => Failure::new(Category::Usage, "invalid configuration file"),
            ConfigError::InvalidLogLevel(_) => Failure::new(Category::Usage, e.to_string()),
        });
    }
    if let Some(e) = cause.downcast_ref::<UsageError>() {
        return Some(Failure::new(Category::Usage, e.to_string()));
    }
    if cause.downcast_ref::<io::Error>().is_some() {
        return Some(Failure::new(Category::Io, "failed to read file"));
    }
    None
}

fn store_failure(e: &StoreError) -> Failure {
    match e {
        StoreError::PathStat { .. } => Failure::new(Category::Io, "failed to read required path"),
        StoreError::NotADirectory { .. } => Failure::new(Category::Io, "expected directory"),
        StoreError::DirectoryRead { .. } => {
            Failure::new(Category::Io, "failed to read required directory")
        }
        StoreError::FileRead { .. } => Failure::new(Category::Io, "failed to read file"),
        StoreError::CreateDir { .. } => Failure::new(Category::Io, "failed to create directory"),
        StoreError::Write { .. } => Failure::new(Category::Io, "failed to write to store"),
        StoreError::NotFound { kind, .. } => {
            Failure::new(Category::Fetch, format!("failed to get {kind} details"))
        }
        StoreError::Codec(e) => codec_failure(e),
        StoreError::TaskPanicked(_) => Failure::new(Category::Unknown, "failed to record request"),
    }
}

fn codec_failure(e: &CodecError) -> Failure {
    match e {
        CodecError::Serialize { .. } => Failure::new(Category::Data, "failed to format output"),
        CodecError::Deserialize { .. } => Failure::new(Category::Data, "failed to read file contents"),
    }
}
