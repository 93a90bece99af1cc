//! The task catalog: base tasks that always run, plus optional tasks keyed
//! by browser family.

pub mod browser_caches;
pub mod system;
pub mod trash;

use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

use crate::cleaner::Cleaner;
use crate::error::{EngineError, Result};
use crate::paths::PlatformDirs;

use self::browser_caches::BrowserCache;

/// A shared, runnable cleanup task.
pub type Task = Arc<dyn Cleaner>;

/// An optional task and the family key that enables it.
#[derive(Debug, Clone)]
pub struct FamilyTask {
    pub key: String,
    pub label: String,
    pub task: Task,
}

impl FamilyTask {
    pub fn new(key: impl Into<String>, label: impl Into<String>, task: Task) -> Self {
        Self {
            key: key.into(),
            label: label.into(),
            task,
        }
    }
}

/// One row of [`Catalog::entries`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CatalogEntry<'a> {
    pub name: &'a str,
    /// `None` for base tasks.
    pub family: Option<&'a str>,
}

#[derive(Debug)]
pub struct Catalog {
    base: Vec<Task>,
    optional: Vec<FamilyTask>,
}

impl Catalog {
    /// Build a catalog, rejecting duplicate task names and family keys.
    pub fn new(base: Vec<Task>, optional: Vec<FamilyTask>) -> Result<Self> {
        let mut names = HashSet::new();
        let all = base.iter().chain(optional.iter().map(|f| &f.task));
        for task in all {
            if !names.insert(task.name()) {
                return Err(EngineError::DuplicateTask(task.name().to_string()));
            }
        }

        let mut keys = HashSet::new();
        for family in &optional {
            if !keys.insert(family.key.as_str()) {
                return Err(EngineError::DuplicateFamily(family.key.clone()));
            }
        }

        Ok(Self { base, optional })
    }

    /// The built-in catalog for this platform.
    pub fn standard(dirs: &PlatformDirs) -> Result<Self> {
        let optional = browser_caches::families(dirs)
            .into_iter()
            .map(|family| {
                let (key, label) = (family.key, family.label);
                FamilyTask::new(key, label, Arc::new(BrowserCache::new(family)))
            })
            .collect();
        Self::new(system::base_tasks(dirs), optional)
    }

    /// Every task in run order, base tasks first.
    pub fn entries(&self) -> Vec<CatalogEntry<'_>> {
        let base = self.base.iter().map(|t| CatalogEntry {
            name: t.name(),
            family: None,
        });
        let optional = self.optional.iter().map(|f| CatalogEntry {
            name: f.task.name(),
            family: Some(f.key.as_str()),
        });
        base.chain(optional).collect()
    }

    /// `(key, label)` for each optional family, in catalog order.
    pub fn families(&self) -> impl Iterator<Item = (&str, &str)> + '_ {
        self.optional
            .iter()
            .map(|f| (f.key.as_str(), f.label.as_str()))
    }

    /// Whether each family looks like it has anything to clean.
    pub fn presence(&self) -> BTreeMap<String, bool> {
        self.optional
            .iter()
            .map(|f| (f.key.clone(), f.task.has_data()))
            .collect()
    }

    /// Base tasks followed by the named families, in catalog order.
    ///
    /// Keys are validated before anything is selected.
    pub fn select<'k>(&self, enabled: impl IntoIterator<Item = &'k str>) -> Result<Selection> {
        let enabled: HashSet<&str> = enabled.into_iter().collect();
        if let Some(unknown) = enabled
            .iter()
            .find(|key| !self.optional.iter().any(|f| f.key == **key))
        {
            return Err(EngineError::UnknownFamily(unknown.to_string()));
        }
        Ok(self.select_where(|key| enabled.contains(key)))
    }

    /// Base tasks followed by every family the predicate accepts.
    pub fn select_where(&self, mut enabled: impl FnMut(&str) -> bool) -> Selection {
        let tasks = self
            .base
            .iter()
            .cloned()
            .chain(
                self.optional
                    .iter()
                    .filter(|f| enabled(&f.key))
                    .map(|f| Arc::clone(&f.task)),
            )
            .collect();
        Selection { tasks }
    }
}

/// An ordered list of tasks for one run.
#[derive(Debug, Clone)]
pub struct Selection {
    tasks: Vec<Task>,
}

impl Selection {
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn names(&self) -> Vec<&str> {
        self.tasks.iter().map(|t| t.name()).collect()
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn into_tasks(self) -> Vec<Task> {
        self.tasks
    }
}
