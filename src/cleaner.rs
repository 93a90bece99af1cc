use std::fmt;

use crate::wipe::Freed;

/// The trait every cleanup task implements.
///
/// A task does nothing until [`Cleaner::execute`] is called, and `execute`
/// never fails: whatever went wrong is already folded into the returned
/// [`Freed`].
pub trait Cleaner: Send + Sync {
    /// Human-readable name, unique within a catalog (e.g. "User Temp").
    fn name(&self) -> &str;

    /// Delete what this task targets and report the bytes reclaimed.
    fn execute(&self) -> Freed;

    /// Shallow hint that the task has anything to work on. Advisory only:
    /// a task is never skipped because of it.
    fn has_data(&self) -> bool {
        true
    }
}

impl fmt::Debug for dyn Cleaner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cleaner").field("name", &self.name()).finish()
    }
}
