//! Error types

use thiserror::Error;

/// A command that could not be run.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error("invalid {type_name}: {reason}")]
    Invalid { type_name: String, reason: String },

    #[error("no executor registered for {0}")]
    NoExecutor(String),

    #[error("nothing to undo")]
    NothingToUndo,

    #[error("nothing to redo")]
    NothingToRedo,
}

/// A session that could not be saved or loaded.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("malformed session: {0}")]
    Json(#[from] serde_json::Error),

    #[error("session file error: {0}")]
    Io(#[from] std::io::Error),

    #[error("unsupported session version {0}")]
    UnsupportedVersion(u32),

    #[error("command {index} ({type_name}) is invalid: {reason}")]
    InvalidCommand {
        index: usize,
        type_name: String,
        reason: String,
    },

    #[error("current index {current} is beyond the {count} saved commands")]
    CurrentIndexOutOfRange { current: usize, count: usize },

    #[error(transparent)]
    Command(#[from] CommandError),
}
