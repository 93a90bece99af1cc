//! Best-effort deletion primitives.
//!
//! Every function here is total: failures are collapsed into [`Freed`]
//! (zero bytes plus a suppressed-failure count) and the walk continues with
//! the next item. Symbolic links are never followed, never deleted and never
//! counted.

use std::fs;
use std::io;
use std::iter::Sum;
use std::ops::{Add, AddAssign};
use std::path::{Path, PathBuf};

use glob::{MatchOptions, Pattern};
use walkdir::WalkDir;

use crate::error::CleanError;

/// Shell-style matching follows the platform's file-name case rules.
const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: !cfg!(windows),
    require_literal_separator: false,
    require_literal_leading_dot: false,
};

/// Bytes reclaimed by a best-effort operation.
///
/// `suppressed` counts the failures that were swallowed on the way, so a
/// genuine zero (`suppressed == 0`) can be told apart from a zero caused by
/// locked or unreadable files.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Freed {
    pub bytes: u64,
    pub suppressed: u64,
}

impl Freed {
    pub const NONE: Freed = Freed {
        bytes: 0,
        suppressed: 0,
    };

    pub fn of(bytes: u64) -> Self {
        Self {
            bytes,
            suppressed: 0,
        }
    }

    /// Swallow a failure: zero bytes, one suppressed item.
    pub fn suppressed(err: &CleanError) -> Self {
        tracing::trace!(error = %err, "suppressed cleanup failure");
        Self {
            bytes: 0,
            suppressed: 1,
        }
    }
}

impl From<Result<u64, CleanError>> for Freed {
    fn from(result: Result<u64, CleanError>) -> Self {
        match result {
            Ok(bytes) => Freed::of(bytes),
            Err(err) => Freed::suppressed(&err),
        }
    }
}

impl Add for Freed {
    type Output = Freed;

    fn add(self, rhs: Freed) -> Freed {
        Freed {
            bytes: self.bytes.saturating_add(rhs.bytes),
            suppressed: self.suppressed.saturating_add(rhs.suppressed),
        }
    }
}

impl AddAssign for Freed {
    fn add_assign(&mut self, rhs: Freed) {
        *self = *self + rhs;
    }
}

impl Sum for Freed {
    fn sum<I: Iterator<Item = Freed>>(iter: I) -> Freed {
        iter.fold(Freed::NONE, Add::add)
    }
}

/// What a path is, looked at without following links.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathKind {
    Missing,
    /// Symbolic links, and on Windows any reparse point (junctions included).
    Symlink,
    Directory,
    File,
    /// Sockets, FIFOs, device nodes.
    Other,
}

/// The single place deciding how a path is treated by the primitives.
pub fn classify(path: &Path) -> Result<PathKind, CleanError> {
    match fs::symlink_metadata(path) {
        Ok(meta) => {
            let file_type = meta.file_type();
            let kind = if file_type.is_symlink() || is_reparse_point(&meta) {
                PathKind::Symlink
            } else if file_type.is_dir() {
                PathKind::Directory
            } else if file_type.is_file() {
                PathKind::File
            } else {
                PathKind::Other
            };
            Ok(kind)
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(PathKind::Missing),
        Err(e) => Err(CleanError::io(path, e)),
    }
}

/// Remove a single non-link, non-directory entry and return its size.
pub fn remove_file(path: &Path) -> Freed {
    match classify(path) {
        Ok(PathKind::File | PathKind::Other) => unlink(path).into(),
        Ok(_) => Freed::NONE,
        Err(e) => Freed::suppressed(&e),
    }
}

/// Delete everything inside `dir`, keeping `dir` itself.
pub fn wipe_directory_contents(dir: &Path) -> Freed {
    match classify(dir) {
        Ok(PathKind::Directory) => {}
        Ok(_) => return Freed::NONE,
        Err(e) => return Freed::suppressed(&e),
    }

    let read_dir = match fs::read_dir(dir) {
        Ok(read_dir) => read_dir,
        Err(e) => return Freed::suppressed(&CleanError::io(dir, e)),
    };

    let mut freed = Freed::NONE;
    for entry in read_dir {
        let path = match entry {
            Ok(entry) => entry.path(),
            Err(e) => {
                freed += Freed::suppressed(&CleanError::io(dir, e));
                continue;
            }
        };
        freed += match classify(&path) {
            Ok(PathKind::Directory) => wipe_tree(&path),
            Ok(PathKind::File | PathKind::Other) => remove_file(&path),
            Ok(PathKind::Symlink | PathKind::Missing) => Freed::NONE,
            Err(e) => Freed::suppressed(&e),
        };
    }
    freed
}

/// Delete `dir` and everything below it, children before parents.
///
/// Directories that cannot be removed (a locked file or a surviving link
/// inside) stay in place.
pub fn wipe_tree(dir: &Path) -> Freed {
    match classify(dir) {
        Ok(PathKind::Directory) => {}
        Ok(_) => return Freed::NONE,
        Err(e) => return Freed::suppressed(&e),
    }

    let mut freed = Freed::NONE;
    let walker = WalkDir::new(dir)
        .follow_links(false)
        .contents_first(true)
        .into_iter()
        .filter_entry(|e| !matches!(classify(e.path()), Ok(PathKind::Symlink)));

    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                freed += Freed::suppressed(&CleanError::from(e));
                continue;
            }
        };
        if entry.file_type().is_dir() {
            freed += remove_empty_dir(entry.path());
        } else {
            freed += remove_file(entry.path());
        }
    }
    freed
}

/// Delete the direct-child files of `dir` whose name matches any pattern.
///
/// Subdirectories are never entered.
pub fn delete_matching(dir: &Path, patterns: &[&str]) -> Freed {
    let mut freed = Freed::NONE;

    let mut compiled = Vec::with_capacity(patterns.len());
    for pattern in patterns {
        match Pattern::new(pattern) {
            Ok(p) => compiled.push(p),
            Err(source) => {
                freed += Freed::suppressed(&CleanError::Pattern {
                    pattern: (*pattern).to_string(),
                    source,
                });
            }
        }
    }
    if compiled.is_empty() {
        return freed;
    }

    match classify(dir) {
        Ok(PathKind::Directory) => {}
        Ok(_) => return freed,
        Err(e) => return freed + Freed::suppressed(&e),
    }

    let read_dir = match fs::read_dir(dir) {
        Ok(read_dir) => read_dir,
        Err(e) => return freed + Freed::suppressed(&CleanError::io(dir, e)),
    };

    for entry in read_dir {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                freed += Freed::suppressed(&CleanError::io(dir, e));
                continue;
            }
        };
        let path = entry.path();
        if !matches!(classify(&path), Ok(PathKind::File)) {
            continue;
        }
        let name = entry.file_name();
        let name = name.to_string_lossy();
        if compiled.iter().any(|p| p.matches_with(&name, MATCH_OPTIONS)) {
            freed += remove_file(&path);
        }
    }
    freed
}

/// Join a `/`-separated `rel` onto `base` one component at a time.
///
/// Every step below `base` must be a real directory: a link, a missing
/// entry or anything else ends the descent with `None`. `base` itself is
/// taken as given.
pub fn descend(base: &Path, rel: &str) -> Option<PathBuf> {
    let mut path = base.to_path_buf();
    for part in rel.split('/').filter(|part| !part.is_empty()) {
        path.push(part);
        if !matches!(classify(&path), Ok(PathKind::Directory)) {
            return None;
        }
    }
    Some(path)
}

/// Remove an already-emptied directory. One that is gone already is not a failure.
fn remove_empty_dir(path: &Path) -> Freed {
    match fs::remove_dir(path) {
        Ok(()) => Freed::NONE,
        Err(e) if e.kind() == io::ErrorKind::NotFound => Freed::NONE,
        Err(e) => Freed::suppressed(&CleanError::io(path, e)),
    }
}

fn unlink(path: &Path) -> Result<u64, CleanError> {
    // Size is advisory: a failed stat still lets the deletion go ahead.
    let size = fs::symlink_metadata(path).map(|m| m.len()).unwrap_or(0);
    clear_readonly(path);
    match fs::remove_file(path) {
        Ok(()) => Ok(size),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(0),
        Err(e) => Err(CleanError::io(path, e)),
    }
}

/// One best-effort attempt at making a file deletable.
fn clear_readonly(path: &Path) {
    let Ok(meta) = fs::symlink_metadata(path) else {
        return;
    };
    clear_immutable(path, &meta);

    let mut perms = meta.permissions();
    if !perms.readonly() {
        return;
    }
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        perms.set_mode(perms.mode() | 0o200);
    }
    #[cfg(not(unix))]
    perms.set_readonly(false);

    let _ = fs::set_permissions(path, perms);
}

#[cfg(target_os = "macos")]
fn clear_immutable(path: &Path, meta: &fs::Metadata) {
    use std::ffi::CString;
    use std::os::macos::fs::MetadataExt;
    use std::os::unix::ffi::OsStrExt;

    let immutable = libc::UF_IMMUTABLE as u32;
    let flags = meta.st_flags();
    if flags & immutable == 0 {
        return;
    }
    let Ok(c_path) = CString::new(path.as_os_str().as_bytes()) else {
        return;
    };
    let _ = unsafe { libc::chflags(c_path.as_ptr(), (flags & !immutable) as _) };
}

#[cfg(not(target_os = "macos"))]
fn clear_immutable(_path: &Path, _meta: &fs::Metadata) {}

#[cfg(windows)]
fn is_reparse_point(meta: &fs::Metadata) -> bool {
    use std::os::windows::fs::MetadataExt;
    // FILE_ATTRIBUTE_REPARSE_POINT
    (meta.file_attributes() & 0x0400) != 0
}

#[cfg(not(windows))]
fn is_reparse_point(_meta: &fs::Metadata) -> bool {
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn write_bytes(path: &Path, len: usize) {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, vec![b'x'; len]).unwrap();
    }

    #[test]
    fn test_remove_file_returns_size() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("a.tmp");
        write_bytes(&file, 321);

        assert_eq!(remove_file(&file), Freed::of(321));
        assert!(!file.exists());
    }

    #[test]
    fn test_remove_file_missing_is_genuine_zero() {
        let dir = tempdir().unwrap();
        let freed = remove_file(&dir.path().join("nope"));
        assert_eq!(freed, Freed::NONE);
    }

    #[test]
    fn test_remove_file_ignores_directories() {
        let dir = tempdir().unwrap();
        let sub = dir.path().join("sub");
        fs::create_dir(&sub).unwrap();

        assert_eq!(remove_file(&sub), Freed::NONE);
        assert!(sub.is_dir());
    }

    #[test]
    fn test_remove_readonly_file() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("locked.db");
        write_bytes(&file, 64);
        let mut perms = fs::metadata(&file).unwrap().permissions();
        perms.set_readonly(true);
        fs::set_permissions(&file, perms).unwrap();

        assert_eq!(remove_file(&file).bytes, 64);
        assert!(!file.exists());
    }

    #[test]
    fn test_wipe_directory_contents_keeps_root() {
        let dir = tempdir().unwrap();
        let root = dir.path().join("Temp");
        write_bytes(&root.join("one.tmp"), 100);
        write_bytes(&root.join("nested/deeper/two.tmp"), 200);
        write_bytes(&root.join("nested/three.tmp"), 300);
        fs::create_dir_all(root.join("empty")).unwrap();

        let freed = wipe_directory_contents(&root);

        assert_eq!(freed, Freed::of(600));
        assert!(root.is_dir());
        assert_eq!(fs::read_dir(&root).unwrap().count(), 0);
    }

    #[test]
    fn test_wipe_directory_contents_non_directory_inputs() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("plain.txt");
        write_bytes(&file, 10);

        assert_eq!(wipe_directory_contents(&dir.path().join("missing")), Freed::NONE);
        assert_eq!(wipe_directory_contents(&file), Freed::NONE);
        assert!(file.exists());
    }

    #[test]
    fn test_wipe_tree_removes_root() {
        let dir = tempdir().unwrap();
        let root = dir.path().join("Cache");
        write_bytes(&root.join("index"), 50);
        write_bytes(&root.join("data/f_000001"), 1000);

        let freed = wipe_tree(&root);

        assert_eq!(freed.bytes, 1050);
        assert!(!root.exists());
    }

    #[test]
    fn test_wipe_is_idempotent() {
        let dir = tempdir().unwrap();
        let root = dir.path().join("Temp");
        write_bytes(&root.join("x/y.tmp"), 10);

        assert_eq!(wipe_directory_contents(&root).bytes, 10);
        assert_eq!(wipe_directory_contents(&root), Freed::NONE);
    }

    #[test]
    fn test_delete_matching_only_touches_matches() {
        let dir = tempdir().unwrap();
        let explorer = dir.path().join("Explorer");
        write_bytes(&explorer.join("thumbcache_256.db"), 40);
        write_bytes(&explorer.join("thumbcache_idx.db"), 2);
        write_bytes(&explorer.join("iconcache_16.db"), 8);
        write_bytes(&explorer.join("thumbcacheX.dat"), 7);
        write_bytes(&explorer.join("notes.txt"), 5);
        write_bytes(&explorer.join("thumbcache_sub.db/inner.db"), 9);

        let freed = delete_matching(&explorer, &["thumbcache*.db"]);

        assert_eq!(freed, Freed::of(42));
        assert!(!explorer.join("thumbcache_256.db").exists());
        assert!(explorer.join("iconcache_16.db").exists());
        assert!(explorer.join("thumbcacheX.dat").exists());
        assert!(explorer.join("notes.txt").exists());
        assert!(explorer.join("thumbcache_sub.db/inner.db").exists());
    }

    #[test]
    fn test_delete_matching_multiple_patterns() {
        let dir = tempdir().unwrap();
        write_bytes(&dir.path().join("thumbcache_32.db"), 3);
        write_bytes(&dir.path().join("iconcache_32.db"), 4);

        let freed = delete_matching(dir.path(), &["thumbcache*.db", "iconcache*.db"]);
        assert_eq!(freed.bytes, 7);
    }

    #[test]
    fn test_delete_matching_bad_pattern_is_suppressed() {
        let dir = tempdir().unwrap();
        write_bytes(&dir.path().join("keep.db"), 3);

        let freed = delete_matching(dir.path(), &["[unclosed"]);

        assert_eq!(freed.bytes, 0);
        assert_eq!(freed.suppressed, 1);
        assert!(dir.path().join("keep.db").exists());
    }

    #[test]
    fn test_freed_sum_and_result_collapse() {
        let ok: Freed = Ok::<u64, CleanError>(5).into();
        let err: Freed = Err::<u64, CleanError>(CleanError::TrashUnavailable("x".into())).into();
        let total: Freed = [ok, err, Freed::of(u64::MAX)].into_iter().sum();

        assert_eq!(ok, Freed::of(5));
        assert_eq!(
            err,
            Freed {
                bytes: 0,
                suppressed: 1
            }
        );
        assert_eq!(total.bytes, u64::MAX);
        assert_eq!(total.suppressed, 1);
    }

    #[test]
    fn test_vanished_directory_is_not_a_failure() {
        let dir = tempdir().unwrap();
        let gone = dir.path().join("already-removed");

        assert_eq!(remove_empty_dir(&gone), Freed::NONE);

        let full = dir.path().join("full");
        write_bytes(&full.join("f"), 1);
        assert_eq!(remove_empty_dir(&full).suppressed, 1);
    }

    #[test]
    fn test_descend_requires_real_directories() {
        let dir = tempdir().unwrap();
        let profile = dir.path().join("Default");
        fs::create_dir_all(profile.join("Service Worker/CacheStorage")).unwrap();
        write_bytes(&profile.join("Preferences"), 2);

        assert_eq!(
            descend(&profile, "Service Worker/CacheStorage"),
            Some(profile.join("Service Worker").join("CacheStorage"))
        );
        assert_eq!(descend(&profile, ""), Some(profile.clone()));
        assert_eq!(descend(&profile, "GPUCache"), None);
        assert_eq!(descend(&profile, "Preferences/inner"), None);
    }

    #[cfg(unix)]
    #[test]
    fn test_classify_reports_unlistable_paths_as_errors() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("plain.txt");
        write_bytes(&file, 4);

        // A path through a regular file is neither missing nor anything we can act on.
        let below = file.join("child");
        assert!(matches!(classify(&below), Err(CleanError::Io(..))));
        assert_eq!(remove_file(&below).suppressed, 1);
    }

    #[cfg(unix)]
    mod links {
        use super::*;
        use std::os::unix::fs::symlink;

        fn outside_target(dir: &Path) -> PathBuf {
            let outside = dir.join("outside");
            write_bytes(&outside.join("precious.txt"), 4096);
            outside
        }

        #[test]
        fn test_classify_does_not_follow_links() {
            let dir = tempdir().unwrap();
            let outside = outside_target(dir.path());
            let link = dir.path().join("link");
            symlink(&outside, &link).unwrap();

            assert_eq!(classify(&link).unwrap(), PathKind::Symlink);
            assert_eq!(classify(&outside).unwrap(), PathKind::Directory);
            assert_eq!(classify(&dir.path().join("gone")).unwrap(), PathKind::Missing);
        }

        #[test]
        fn test_remove_file_skips_symlink() {
            let dir = tempdir().unwrap();
            let outside = outside_target(dir.path());
            let target = outside.join("precious.txt");
            let link = dir.path().join("link.txt");
            symlink(&target, &link).unwrap();

            assert_eq!(remove_file(&link), Freed::NONE);
            assert!(fs::symlink_metadata(&link).is_ok());
            assert!(target.exists());
        }

        #[test]
        fn test_wipe_contents_never_follows_links() {
            let dir = tempdir().unwrap();
            let outside = outside_target(dir.path());
            let root = dir.path().join("Temp");
            write_bytes(&root.join("junk.tmp"), 10);
            write_bytes(&root.join("nested/more.tmp"), 20);
            symlink(&outside, root.join("dir-link")).unwrap();
            symlink(outside.join("precious.txt"), root.join("nested/file-link")).unwrap();

            let freed = wipe_directory_contents(&root);

            assert_eq!(freed.bytes, 30);
            assert!(fs::symlink_metadata(root.join("dir-link")).is_ok());
            assert!(fs::symlink_metadata(root.join("nested/file-link")).is_ok());
            assert_eq!(fs::read(outside.join("precious.txt")).unwrap().len(), 4096);
        }

        #[test]
        fn test_wipe_tree_on_link_root_is_noop() {
            let dir = tempdir().unwrap();
            let outside = outside_target(dir.path());
            let link = dir.path().join("Cache");
            symlink(&outside, &link).unwrap();

            assert_eq!(wipe_tree(&link), Freed::NONE);
            assert_eq!(wipe_directory_contents(&link), Freed::NONE);
            assert!(outside.join("precious.txt").exists());
        }

        #[test]
        fn test_wipe_tree_leaves_dir_holding_link() {
            let dir = tempdir().unwrap();
            let outside = outside_target(dir.path());
            let root = dir.path().join("Cache");
            write_bytes(&root.join("a.bin"), 8);
            symlink(&outside, root.join("escape")).unwrap();

            let freed = wipe_tree(&root);

            assert_eq!(freed.bytes, 8);
            // The surviving link keeps the root non-empty.
            assert!(root.is_dir());
            assert!(freed.suppressed >= 1);
            assert!(outside.join("precious.txt").exists());
        }

        #[test]
        fn test_delete_matching_skips_links() {
            let dir = tempdir().unwrap();
            let outside = outside_target(dir.path());
            let explorer = dir.path().join("Explorer");
            fs::create_dir_all(&explorer).unwrap();
            symlink(outside.join("precious.txt"), explorer.join("thumbcache_1.db")).unwrap();

            assert_eq!(delete_matching(&explorer, &["thumbcache*.db"]), Freed::NONE);
            assert!(outside.join("precious.txt").exists());
        }

        #[test]
        fn test_unwritable_directory_never_panics() {
            use std::os::unix::fs::PermissionsExt;

            let dir = tempdir().unwrap();
            let root = dir.path().join("Temp");
            write_bytes(&root.join("sealed/file.tmp"), 10);
            let sealed = root.join("sealed");
            fs::set_permissions(&sealed, fs::Permissions::from_mode(0o500)).unwrap();

            // Root may bypass the permission bits, so only totality is checked.
            let freed = wipe_directory_contents(&root);
            assert!(freed.bytes <= 10);

            if sealed.exists() {
                fs::set_permissions(&sealed, fs::Permissions::from_mode(0o700)).unwrap();
            }
        }
    }
}
