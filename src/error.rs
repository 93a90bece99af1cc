use std::{io, path::PathBuf};

/// A failure inside a cleanup operation.
///
/// These never escape a deletion primitive or a task: they are collapsed
/// into [`crate::wipe::Freed`] at the primitive boundary and only counted.
#[derive(thiserror::Error, Debug)]
pub enum CleanError {
    /// File system I/O failure.
    #[error("I/O error while accessing {0}")]
    Io(PathBuf, #[source] io::Error),

    /// Directory traversal failure.
    #[error("walk error: {0}")]
    Walk(#[from] walkdir::Error),

    /// A configured file-name pattern does not compile.
    #[error("invalid pattern {pattern:?}")]
    Pattern {
        pattern: String,
        #[source]
        source: glob::PatternError,
    },

    /// The platform trash service could not be queried or emptied.
    #[error("trash service unavailable: {0}")]
    TrashUnavailable(String),

    /// A task panicked while running.
    #[error("task {0} panicked")]
    TaskPanicked(String),
}

impl CleanError {
    pub fn io(path: impl Into<PathBuf>, error: io::Error) -> Self {
        Self::Io(path.into(), error)
    }
}

/// Errors reported to the caller of the engine API.
///
/// None of these can happen while a run is in progress.
#[derive(thiserror::Error, Debug)]
pub enum EngineError {
    #[error("a cleanup run is already in progress")]
    AlreadyRunning,

    #[error("failed to start the cleanup worker")]
    Spawn(#[source] io::Error),

    #[error("duplicate task name: {0}")]
    DuplicateTask(String),

    #[error("duplicate browser family: {0}")]
    DuplicateFamily(String),

    #[error("unknown browser family: {0}")]
    UnknownFamily(String),

    #[error("could not determine the {0} directory")]
    MissingDirectory(&'static str),

    #[error("cannot read config {0}")]
    ConfigRead(PathBuf, #[source] io::Error),

    #[error("invalid config {0}")]
    ConfigParse(PathBuf, #[source] toml::de::Error),
}

pub type Result<T> = std::result::Result<T, EngineError>;
