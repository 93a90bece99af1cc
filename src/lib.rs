//! Desktop disk-space cleanup engine.
//!
//! Tasks come from a [`categories::Catalog`], get selected into a
//! [`categories::Selection`], and run on a background worker owned by a
//! [`runner::Orchestrator`] that streams [`runner::CleanEvent`]s back.

pub mod categories;
pub mod cleaner;
pub mod config;
pub mod disk_info;
pub mod error;
pub mod paths;
pub mod runner;
pub mod utils;
pub mod wipe;

pub use categories::{Catalog, Selection, Task};
pub use cleaner::Cleaner;
pub use config::Config;
pub use error::{CleanError, EngineError};
pub use paths::PlatformDirs;
pub use runner::{CleanEvent, Orchestrator, RunHandle, RunPhase};
pub use wipe::Freed;
