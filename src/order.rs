//! Ordered file list with selection tracking
//!
//! The list order is the concatenation order. The model never validates paths;
//! it only keeps the sequence and the selection consistent with each other.

use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::config::DEFAULT_EXTENSION;

/// A single source file in the list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    path: PathBuf,
}

impl FileEntry {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn into_path(self) -> PathBuf {
        self.path
    }
}

impl fmt::Display for FileEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.path.display())
    }
}

/// Direction for a single-slot move
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
}

/// Which list actions are currently available
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ActionState {
    pub remove: bool,
    pub move_up: bool,
    pub move_down: bool,
    pub concatenate: bool,
}

/// The ordered list of source files plus the highlighted entry
#[derive(Debug, Clone, Default)]
pub struct FileOrderModel {
    entries: Vec<FileEntry>,
    selection: Option<usize>,
}

impl FileOrderModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> &[FileEntry] {
        &self.entries
    }

    /// Paths in concatenation order
    pub fn paths(&self) -> Vec<PathBuf> {
        self.entries.iter().cloned().map(FileEntry::into_path).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn selection(&self) -> Option<usize> {
        self.selection
    }

    /// Append a path at the end of the list
    pub fn add(&mut self, path: impl Into<PathBuf>) {
        let entry = FileEntry::new(path);
        debug!(path = %entry, "append");
        self.entries.push(entry);
    }

    /// Insert a path at `index`, clamped to the end of the list
    ///
    /// A selection at or after `index` is shifted so it keeps pointing at the
    /// same entry.
    pub fn insert(&mut self, index: usize, path: impl Into<PathBuf>) {
        let index = index.min(self.entries.len());
        let entry = FileEntry::new(path);
        debug!(path = %entry, index, "insert");
        self.entries.insert(index, entry);

        if let Some(sel) = self.selection {
            if index <= sel {
                self.selection = Some(sel + 1);
            }
        }
    }

    /// Insert right after the selected entry, or append when nothing is selected
    pub fn add_after_selection(&mut self, path: impl Into<PathBuf>) {
        match self.selection {
            Some(sel) => self.insert(sel + 1, path),
            None => self.add(path),
        }
    }

    /// Append a batch of paths picked together, sorted by path
    pub fn add_many<I, P>(&mut self, paths: I)
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        let mut batch: Vec<PathBuf> = paths.into_iter().map(Into::into).collect();
        batch.sort();
        for path in batch {
            self.add(path);
        }
    }

    /// Whether a dropped path is accepted into the list
    pub fn accepts_drop(path: &Path) -> bool {
        let wanted = DEFAULT_EXTENSION.trim_start_matches('.');
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case(wanted))
    }

    /// Append dropped paths, ignoring anything that is not a PDF
    ///
    /// Returns the number of accepted paths.
    pub fn add_dropped<I, P>(&mut self, paths: I) -> usize
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        let mut accepted = 0;
        for path in paths {
            let path = path.into();
            if Self::accepts_drop(&path) {
                self.add(path);
                accepted += 1;
            } else {
                warn!(path = %path.display(), "ignoring dropped non-PDF file");
            }
        }
        accepted
    }

    /// Remove and return the entry at `index`
    ///
    /// Returns `None` when `index` is out of range.
    pub fn remove(&mut self, index: usize) -> Option<FileEntry> {
        if index >= self.entries.len() {
            return None;
        }
        let removed = self.entries.remove(index);
        debug!(path = %removed, index, "remove");

        self.selection = match self.selection {
            Some(sel) if sel == index => None,
            Some(sel) if sel > index => Some(sel - 1),
            other => other,
        };

        Some(removed)
    }

    /// Swap the entry at `index` with its neighbour
    ///
    /// Returns `false` when the move would leave the list bounds.
    pub fn move_entry(&mut self, index: usize, direction: Direction) -> bool {
        let Some(target) = self.neighbour(index, direction) else {
            return false;
        };
        self.entries.swap(index, target);
        debug!(from = index, to = target, "swap");

        self.selection = match self.selection {
            Some(sel) if sel == index => Some(target),
            Some(sel) if sel == target => Some(index),
            other => other,
        };
        true
    }

    /// Move the entry at `from` so that it ends up at `to`
    ///
    /// This is the drag-and-drop reorder; every entry between the two
    /// positions shifts by one.
    pub fn relocate(&mut self, from: usize, to: usize) -> bool {
        let len = self.entries.len();
        if from >= len || to >= len {
            return false;
        }
        if from == to {
            return true;
        }
        let entry = self.entries.remove(from);
        self.entries.insert(to, entry);
        debug!(from, to, "relocate");

        self.selection = self.selection.map(|sel| {
            if sel == from {
                to
            } else if from < sel && sel <= to {
                sel - 1
            } else if to <= sel && sel < from {
                sel + 1
            } else {
                sel
            }
        });
        true
    }

    /// Highlight the entry at `index`
    pub fn select(&mut self, index: usize) -> bool {
        if index < self.entries.len() {
            self.selection = Some(index);
            true
        } else {
            false
        }
    }

    pub fn clear_selection(&mut self) {
        self.selection = None;
    }

    pub fn remove_selected(&mut self) -> Option<FileEntry> {
        self.selection.and_then(|sel| self.remove(sel))
    }

    pub fn move_selected(&mut self, direction: Direction) -> bool {
        match self.selection {
            Some(sel) => self.move_entry(sel, direction),
            None => false,
        }
    }

    /// Actions the shell should enable for the current state
    pub fn actions(&self) -> ActionState {
        let len = self.entries.len();
        match self.selection {
            Some(sel) => ActionState {
                remove: true,
                move_up: sel > 0,
                move_down: sel + 1 < len,
                concatenate: len > 0,
            },
            None => ActionState {
                concatenate: len > 0,
                ..ActionState::default()
            },
        }
    }

    fn neighbour(&self, index: usize, direction: Direction) -> Option<usize> {
        if index >= self.entries.len() {
            return None;
        }
        match direction {
            Direction::Up => index.checked_sub(1),
            Direction::Down => Some(index + 1).filter(|&next| next < self.entries.len()),
        }
    }
}
