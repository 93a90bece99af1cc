use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::categories::trash::{self, EmptyTrash};
use crate::categories::Task;
use crate::cleaner::Cleaner;
use crate::paths::PlatformDirs;
#[cfg(not(target_os = "macos"))]
use crate::paths::nested;
use crate::wipe::{self, Freed};

/// Wipe everything inside one directory.
#[derive(Debug, Clone)]
pub struct DirectoryContents {
    name: &'static str,
    dir: PathBuf,
}

impl DirectoryContents {
    pub fn new(name: &'static str, dir: impl Into<PathBuf>) -> Self {
        Self {
            name,
            dir: dir.into(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl Cleaner for DirectoryContents {
    fn name(&self) -> &str {
        self.name
    }

    fn execute(&self) -> Freed {
        wipe::wipe_directory_contents(&self.dir)
    }
}

/// Delete the files directly inside one directory whose names match.
#[derive(Debug, Clone)]
pub struct MatchingFiles {
    name: &'static str,
    dir: PathBuf,
    patterns: &'static [&'static str],
}

impl MatchingFiles {
    pub fn new(
        name: &'static str,
        dir: impl Into<PathBuf>,
        patterns: &'static [&'static str],
    ) -> Self {
        Self {
            name,
            dir: dir.into(),
            patterns,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl Cleaner for MatchingFiles {
    fn name(&self) -> &str {
        self.name
    }

    fn execute(&self) -> Freed {
        wipe::delete_matching(&self.dir, self.patterns)
    }
}

pub const USER_TEMP: &str = "User Temp";
pub const RECENT_ITEMS: &str = "Recent Items";
pub const THUMBNAILS: &str = "Thumbnail Cache";

/// The always-run tasks, in display order.
pub fn base_tasks(dirs: &PlatformDirs) -> Vec<Task> {
    vec![
        Arc::new(EmptyTrash::new(trash::platform_store(dirs))),
        Arc::new(DirectoryContents::new(USER_TEMP, &dirs.temp)),
        recent_items(dirs),
        thumbnails(dirs),
    ]
}

#[cfg(windows)]
fn recent_items(dirs: &PlatformDirs) -> Task {
    Arc::new(DirectoryContents::new(
        RECENT_ITEMS,
        nested(&dirs.roaming, "Microsoft/Windows/Recent"),
    ))
}

#[cfg(windows)]
fn thumbnails(dirs: &PlatformDirs) -> Task {
    // Explorer rotates the numeric suffixes, so match by prefix.
    Arc::new(MatchingFiles::new(
        THUMBNAILS,
        nested(&dirs.local, "Microsoft/Windows/Explorer"),
        &["thumbcache*.db", "iconcache*.db"],
    ))
}

#[cfg(target_os = "macos")]
fn recent_items(dirs: &PlatformDirs) -> Task {
    Arc::new(MatchingFiles::new(
        RECENT_ITEMS,
        dirs.roaming.join("com.apple.sharedfilelist"),
        &["*.sfl*"],
    ))
}

#[cfg(target_os = "macos")]
fn thumbnails(dirs: &PlatformDirs) -> Task {
    Arc::new(DirectoryContents::new(
        THUMBNAILS,
        dirs.cache.join("com.apple.QuickLook.thumbnailcache"),
    ))
}

#[cfg(not(any(windows, target_os = "macos")))]
fn recent_items(dirs: &PlatformDirs) -> Task {
    Arc::new(MatchingFiles::new(
        RECENT_ITEMS,
        &dirs.local,
        &["recently-used.xbel*"],
    ))
}

#[cfg(not(any(windows, target_os = "macos")))]
fn thumbnails(dirs: &PlatformDirs) -> Task {
    Arc::new(DirectoryContents::new(
        THUMBNAILS,
        nested(&dirs.cache, "thumbnails"),
    ))
}
