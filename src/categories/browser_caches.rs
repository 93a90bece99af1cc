use std::fs;
use std::path::{Path, PathBuf};

use crate::cleaner::Cleaner;
use crate::paths::{nested, PlatformDirs};
use crate::wipe::{self, Freed, PathKind};

/// Cache kinds inside a Chromium profile.
pub const CHROMIUM_CACHE_DIRS: &[&str] = &[
    "Cache",
    "Code Cache",
    "GPUCache",
    "ShaderCache",
    "DawnCache",
    "Media Cache",
    "Service Worker/CacheStorage",
];

/// Cache kinds inside a Firefox profile.
pub const FIREFOX_CACHE_DIRS: &[&str] = &["cache2", "startupCache"];

/// Which directories under a family root count as profiles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfileLayout {
    /// The root is the default profile and its subdirectories are named
    /// profiles (Chromium "User Data").
    RootAndChildren,
    /// The root is the only profile.
    RootOnly,
    /// Only subdirectories are profiles (Firefox "Profiles").
    ChildrenOnly,
}

/// A multi-profile application family whose caches can be wiped.
#[derive(Debug, Clone)]
pub struct BrowserFamily {
    /// Stable identifier used by configuration and the command line.
    pub key: &'static str,
    pub label: &'static str,
    pub task_name: &'static str,
    pub roots: Vec<PathBuf>,
    pub layout: ProfileLayout,
    pub cache_dirs: &'static [&'static str],
}

impl BrowserFamily {
    pub fn wipe(&self) -> Freed {
        self.roots
            .iter()
            .map(|root| wipe_profiles(root, self.layout, self.cache_dirs))
            .sum()
    }

    /// True when any root exists and is non-empty.
    pub fn has_content(&self) -> bool {
        self.roots.iter().any(|root| has_content(root))
    }
}

/// Candidate profile directories under `root`. Linked profiles are skipped.
pub fn profiles(root: &Path, layout: ProfileLayout) -> Vec<PathBuf> {
    if !matches!(wipe::classify(root), Ok(PathKind::Directory)) {
        return Vec::new();
    }

    let mut out = Vec::new();
    if layout != ProfileLayout::ChildrenOnly {
        out.push(root.to_path_buf());
    }
    if layout != ProfileLayout::RootOnly {
        match fs::read_dir(root) {
            Ok(read_dir) => {
                for entry in read_dir.flatten() {
                    let path = entry.path();
                    if matches!(wipe::classify(&path), Ok(PathKind::Directory)) {
                        out.push(path);
                    }
                }
            }
            Err(e) => {
                tracing::trace!(root = %root.display(), error = %e, "cannot list profiles");
            }
        }
    }
    out
}

/// Wipe the contents of every cache kind in every profile under `root`.
///
/// Profile directories and the cache directories themselves stay in place.
/// A cache path that passes through a link anywhere below the profile is
/// skipped.
pub fn wipe_profiles(root: &Path, layout: ProfileLayout, cache_dirs: &[&str]) -> Freed {
    profiles(root, layout)
        .iter()
        .flat_map(|profile| {
            cache_dirs
                .iter()
                .filter_map(move |rel| wipe::descend(profile, rel))
        })
        .map(|dir| wipe::wipe_directory_contents(&dir))
        .sum()
}

/// Shallow presence check: `path` exists and has at least one entry.
pub fn has_content(path: &Path) -> bool {
    fs::read_dir(path)
        .map(|mut read_dir| read_dir.next().is_some())
        .unwrap_or(false)
}

/// The browser families known on this platform, in display order.
pub fn families(dirs: &PlatformDirs) -> Vec<BrowserFamily> {
    let family = |key: &'static str,
                  label: &'static str,
                  task_name: &'static str,
                  layout: ProfileLayout,
                  cache_dirs: &'static [&'static str]| BrowserFamily {
        key,
        label,
        task_name,
        roots: roots(key, dirs),
        layout,
        cache_dirs,
    };

    vec![
        family(
            "chrome",
            "Google Chrome",
            "Google Chrome Cache",
            ProfileLayout::RootAndChildren,
            CHROMIUM_CACHE_DIRS,
        ),
        family(
            "edge",
            "Microsoft Edge",
            "Microsoft Edge Cache",
            ProfileLayout::RootAndChildren,
            CHROMIUM_CACHE_DIRS,
        ),
        family(
            "brave",
            "Brave",
            "Brave Cache",
            ProfileLayout::RootAndChildren,
            CHROMIUM_CACHE_DIRS,
        ),
        family(
            "vivaldi",
            "Vivaldi",
            "Vivaldi Cache",
            ProfileLayout::RootAndChildren,
            CHROMIUM_CACHE_DIRS,
        ),
        family(
            "opera",
            "Opera",
            "Opera Cache",
            ProfileLayout::RootOnly,
            CHROMIUM_CACHE_DIRS,
        ),
        family(
            "firefox",
            "Firefox",
            "Firefox Cache",
            ProfileLayout::ChildrenOnly,
            FIREFOX_CACHE_DIRS,
        ),
    ]
}

#[cfg(windows)]
fn roots(key: &str, d: &PlatformDirs) -> Vec<PathBuf> {
    match key {
        "chrome" => vec![nested(&d.local, "Google/Chrome/User Data")],
        "edge" => vec![nested(&d.local, "Microsoft/Edge/User Data")],
        "brave" => vec![nested(&d.local, "BraveSoftware/Brave-Browser/User Data")],
        "vivaldi" => vec![nested(&d.local, "Vivaldi/User Data")],
        "opera" => vec![nested(&d.local, "Opera Software/Opera Stable")],
        "firefox" => vec![
            nested(&d.local, "Mozilla/Firefox/Profiles"),
            nested(&d.roaming, "Mozilla/Firefox/Profiles"),
        ],
        _ => Vec::new(),
    }
}

// Chromium keeps profile data under Application Support and the bulk of
// its caches under Caches, mirrored by profile name.
#[cfg(target_os = "macos")]
fn roots(key: &str, d: &PlatformDirs) -> Vec<PathBuf> {
    let both = |rel: &str| vec![nested(&d.roaming, rel), nested(&d.cache, rel)];
    match key {
        "chrome" => both("Google/Chrome"),
        "edge" => both("Microsoft Edge"),
        "brave" => both("BraveSoftware/Brave-Browser"),
        "vivaldi" => both("Vivaldi"),
        "opera" => both("com.operasoftware.Opera"),
        "firefox" => both("Firefox/Profiles"),
        _ => Vec::new(),
    }
}

#[cfg(not(any(windows, target_os = "macos")))]
fn roots(key: &str, d: &PlatformDirs) -> Vec<PathBuf> {
    let both = |rel: &str| vec![nested(&d.roaming, rel), nested(&d.cache, rel)];
    match key {
        "chrome" => both("google-chrome"),
        "edge" => both("microsoft-edge"),
        "brave" => both("BraveSoftware/Brave-Browser"),
        "vivaldi" => both("vivaldi"),
        "opera" => both("opera"),
        "firefox" => vec![
            nested(&d.home, ".mozilla/firefox"),
            nested(&d.cache, "mozilla/firefox"),
        ],
        _ => Vec::new(),
    }
}

/// Optional per-family task.
pub struct BrowserCache {
    family: BrowserFamily,
}

impl BrowserCache {
    pub fn new(family: BrowserFamily) -> Self {
        Self { family }
    }

    pub fn family(&self) -> &BrowserFamily {
        &self.family
    }
}

impl Cleaner for BrowserCache {
    fn name(&self) -> &str {
        self.family.task_name
    }

    fn execute(&self) -> Freed {
        self.family.wipe()
    }

    fn has_data(&self) -> bool {
        self.family.has_content()
    }
}
