// src/model.rs

use std::collections::{BTreeMap, HashMap};
use std::fmt;

/// The kind of declaration an entity was extracted from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Function,
    Class,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityKind::Function => f.write_str("Function"),
            EntityKind::Class => f.write_str("Class"),
        }
    }
}

/// One function or class declaration found in a single parse of one text blob
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityDescriptor {
    pub kind: EntityKind,
    pub name: String,
    /// 1-based, inclusive
    pub start_line: usize,
    /// 1-based, inclusive
    pub end_line: usize,
}

impl EntityDescriptor {
    pub fn new(kind: EntityKind, name: impl Into<String>, start_line: usize, end_line: usize) -> Self {
        Self { kind, name: name.into(), start_line, end_line }
    }
}

/// Entities of one (file, version) pair, keyed by bare name.
///
/// Two declarations sharing a name are indistinguishable: the one inserted
/// last replaces the earlier one. All keying goes through this type, so moving
/// to a qualified key only touches `key_of`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ObjectTable {
    entries: HashMap<String, EntityDescriptor>,
}

/// Name-level differences between two tables of the same file
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ObjectDelta {
    pub added: Vec<EntityDescriptor>,
    pub removed: Vec<EntityDescriptor>,
    pub modified: Vec<EntityDescriptor>,
}

impl ObjectTable {
    pub fn new() -> Self {
        Self::default()
    }

    fn key_of(entity: &EntityDescriptor) -> String {
        entity.name.clone()
    }

    pub fn insert(&mut self, entity: EntityDescriptor) {
        self.entries.insert(Self::key_of(&entity), entity);
    }

    pub fn get(&self, name: &str) -> Option<&EntityDescriptor> {
        self.entries.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entities ordered by start line, then name
    pub fn iter(&self) -> impl Iterator<Item = &EntityDescriptor> {
        let mut items: Vec<&EntityDescriptor> = self.entries.values().collect();
        items.sort_by(|a, b| a.start_line.cmp(&b.start_line).then_with(|| a.name.cmp(&b.name)));
        items.into_iter()
    }

    /// Compares `old` against `new` by key.
    ///
    /// An entity present in both tables counts as modified when any descriptor
    /// field differs. The body is not part of the descriptor, so an edit that
    /// leaves kind and line span untouched is not reported.
    pub fn diff(old: &ObjectTable, new: &ObjectTable) -> ObjectDelta {
        let added = new.iter().filter(|e| !old.contains(&Self::key_of(e))).cloned().collect();
        let removed = old.iter().filter(|e| !new.contains(&Self::key_of(e))).cloned().collect();
        let modified = new
            .iter()
            .filter(|e| old.get(&Self::key_of(e)).is_some_and(|before| before != *e))
            .cloned()
            .collect();

        ObjectDelta { added, removed, modified }
    }
}

impl FromIterator<EntityDescriptor> for ObjectTable {
    fn from_iter<I: IntoIterator<Item = EntityDescriptor>>(iter: I) -> Self {
        let mut table = ObjectTable::new();
        for entity in iter {
            table.insert(entity);
        }
        table
    }
}

/// File-level change type relative to the last commit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileStatus {
    Added,
    Modified,
    Deleted,
}

impl FileStatus {
    pub fn code(self) -> char {
        match self {
            FileStatus::Added => 'A',
            FileStatus::Modified => 'M',
            FileStatus::Deleted => 'D',
        }
    }

    /// Status relative to the last commit when `self` is followed by `later`
    pub fn then(self, later: FileStatus) -> FileStatus {
        match (self, later) {
            (_, FileStatus::Deleted) => FileStatus::Deleted,
            (FileStatus::Added, _) => FileStatus::Added,
            _ => FileStatus::Modified,
        }
    }
}

/// Object-level changes recorded for one changed file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileChange {
    pub path: String,
    pub status: FileStatus,
    pub added: Vec<EntityDescriptor>,
    pub removed: Vec<EntityDescriptor>,
    pub modified: Vec<EntityDescriptor>,
}

impl FileChange {
    pub fn from_delta(path: impl Into<String>, status: FileStatus, delta: ObjectDelta) -> Self {
        Self {
            path: path.into(),
            status,
            added: delta.added,
            removed: delta.removed,
            modified: delta.modified,
        }
    }
}

/// Maps a file path to its recorded changes, ordered by path
pub type AnalysisResult = BTreeMap<String, FileChange>;
