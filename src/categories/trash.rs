use std::path::{Path, PathBuf};

use crate::cleaner::Cleaner;
use crate::error::CleanError;
use crate::paths::PlatformDirs;
use crate::utils;
use crate::wipe::{self, Freed, PathKind};

#[cfg(windows)]
pub const TASK_NAME: &str = "Recycle Bin";
#[cfg(not(windows))]
pub const TASK_NAME: &str = "Trash";

/// The platform's deferred-deletion store.
pub trait TrashStore: Send + Sync {
    /// Bytes currently held by the store.
    fn query_size(&self) -> Result<u64, CleanError>;

    /// Empty the store without any interaction.
    fn empty(&self) -> Result<(), CleanError>;
}

/// Empty `store` and report the size it held beforehand.
///
/// The size is not re-queried afterwards, so items the store failed to drop
/// are still counted.
pub fn empty_trash(store: &dyn TrashStore) -> Freed {
    let before = Freed::from(store.query_size());
    let emptied = match store.empty() {
        Ok(()) => Freed::NONE,
        Err(e) => Freed::suppressed(&e),
    };
    before + emptied
}

/// The store used on the current platform.
pub fn platform_store(dirs: &PlatformDirs) -> Box<dyn TrashStore> {
    #[cfg(windows)]
    {
        let _ = dirs;
        Box::new(RecycleBin)
    }
    #[cfg(target_os = "macos")]
    {
        Box::new(TrashDir::macos(&dirs.home))
    }
    #[cfg(all(unix, not(target_os = "macos")))]
    {
        Box::new(TrashDir::freedesktop(&dirs.local))
    }
    #[cfg(not(any(windows, unix)))]
    {
        let _ = dirs;
        Box::new(NoTrash)
    }
}

/// The "empty trash" task.
pub struct EmptyTrash {
    store: Box<dyn TrashStore>,
}

impl EmptyTrash {
    pub fn new(store: Box<dyn TrashStore>) -> Self {
        Self { store }
    }
}

impl Cleaner for EmptyTrash {
    fn name(&self) -> &str {
        TASK_NAME
    }

    fn execute(&self) -> Freed {
        empty_trash(self.store.as_ref())
    }

    fn has_data(&self) -> bool {
        self.store.query_size().map(|n| n > 0).unwrap_or(false)
    }
}

/// Windows Recycle Bin, through the shell.
#[cfg(windows)]
pub struct RecycleBin;

#[cfg(windows)]
impl TrashStore for RecycleBin {
    fn query_size(&self) -> Result<u64, CleanError> {
        use windows_sys::Win32::UI::Shell::{SHQueryRecycleBinW, SHQUERYRBINFO};

        let mut info = SHQUERYRBINFO {
            cbSize: std::mem::size_of::<SHQUERYRBINFO>() as u32,
            i64Size: 0,
            i64NumItems: 0,
        };
        // A null root queries the bins of every drive.
        let hr = unsafe { SHQueryRecycleBinW(std::ptr::null(), &mut info) };
        if hr != 0 {
            return Err(CleanError::TrashUnavailable(format!(
                "SHQueryRecycleBinW failed: {hr:#x}"
            )));
        }
        Ok(u64::try_from(info.i64Size).unwrap_or(0))
    }

    fn empty(&self) -> Result<(), CleanError> {
        use windows_sys::Win32::UI::Shell::{
            SHEmptyRecycleBinW, SHERB_NOCONFIRMATION, SHERB_NOPROGRESSUI, SHERB_NOSOUND,
        };

        let hr = unsafe {
            SHEmptyRecycleBinW(
                std::ptr::null_mut(),
                std::ptr::null(),
                SHERB_NOCONFIRMATION | SHERB_NOPROGRESSUI | SHERB_NOSOUND,
            )
        };
        if hr != 0 {
            return Err(CleanError::TrashUnavailable(format!(
                "SHEmptyRecycleBinW failed: {hr:#x}"
            )));
        }
        Ok(())
    }
}

/// A trash kept as plain directories (`~/.Trash`, the freedesktop trash).
#[derive(Debug, Clone)]
pub struct TrashDir {
    targets: Vec<PathBuf>,
}

impl TrashDir {
    /// `$XDG_DATA_HOME/Trash`: trashed files, their `.trashinfo` records and
    /// the half-deleted `expunged` area.
    pub fn freedesktop(data_home: &Path) -> Self {
        let root = data_home.join("Trash");
        Self {
            targets: ["files", "info", "expunged"]
                .iter()
                .map(|part| root.join(part))
                .collect(),
        }
    }

    pub fn macos(home: &Path) -> Self {
        Self {
            targets: vec![home.join(".Trash")],
        }
    }
}

impl TrashStore for TrashDir {
    fn query_size(&self) -> Result<u64, CleanError> {
        let mut total = 0u64;
        for target in &self.targets {
            if wipe::classify(target)? == PathKind::Directory {
                total = total.saturating_add(utils::dir_size(target));
            }
        }
        Ok(total)
    }

    fn empty(&self) -> Result<(), CleanError> {
        let freed: Freed = self
            .targets
            .iter()
            .map(|t| wipe::wipe_directory_contents(t))
            .sum();
        if freed.suppressed > 0 {
            return Err(CleanError::TrashUnavailable(format!(
                "{} trashed items could not be removed",
                freed.suppressed
            )));
        }
        Ok(())
    }
}

/// Platforms without a trash concept.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoTrash;

impl TrashStore for NoTrash {
    fn query_size(&self) -> Result<u64, CleanError> {
        Err(CleanError::TrashUnavailable(
            "no trash service on this platform".to_string(),
        ))
    }

    fn empty(&self) -> Result<(), CleanError> {
        Err(CleanError::TrashUnavailable(
            "no trash service on this platform".to_string(),
        ))
    }
}
