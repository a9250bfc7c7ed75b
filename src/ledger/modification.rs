//! Modification records and the append-only ledger that holds them.

use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};

/// Modification records one rewritten image reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Modification {
    /// The manifest file that holds the reference.
    pub path: PathBuf,
    pub repository: String,
    /// The tag before the rewrite, `""` if there was none.
    pub previous_tag: String,
    pub new_tag: String,
}

impl Modification {
    /// Creates a new modification.
    pub fn new(
        path: impl Into<PathBuf>,
        repository: impl Into<String>,
        previous_tag: impl Into<String>,
        new_tag: impl Into<String>,
    ) -> Self {
        Modification {
            path: path.into(),
            repository: repository.into(),
            previous_tag: previous_tag.into(),
            new_tag: new_tag.into(),
        }
    }

    /// Returns true if the tag actually changed.
    pub fn updated(&self) -> bool {
        self.previous_tag != self.new_tag
    }

    /// Returns the manifest path.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl fmt::Display for Modification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let previous = if self.previous_tag.is_empty() {
            "(none)"
        } else {
            self.previous_tag.as_str()
        };
        write!(
            f,
            "{}: {} {} -> {}",
            self.path.display(),
            self.repository,
            previous,
            self.new_tag
        )?;
        if !self.updated() {
            write!(f, " (unchanged)")?;
        }
        Ok(())
    }
}

/// Ledger is an append-only list of modifications, in the order they were made.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Ledger {
    modifications: Vec<Modification>,
}

impl Ledger {
    /// Creates a new empty ledger.
    pub fn new() -> Self {
        Ledger {
            modifications: Vec::new(),
        }
    }

    /// Appends a modification.
    pub fn push(&mut self, modification: Modification) {
        self.modifications.push(modification);
    }

    /// Returns true if nothing has been recorded.
    pub fn is_empty(&self) -> bool {
        self.modifications.is_empty()
    }

    /// Returns the number of recorded modifications.
    pub fn len(&self) -> usize {
        self.modifications.len()
    }

    /// Returns an iterator over the modifications.
    pub fn iter(&self) -> impl Iterator<Item = &Modification> {
        self.modifications.iter()
    }

    /// Returns the modifications that changed a tag.
    pub fn updated(&self) -> impl Iterator<Item = &Modification> {
        self.modifications.iter().filter(|m| m.updated())
    }

    /// Returns the modifications recorded for one manifest.
    pub fn for_path<'a>(&'a self, path: &'a Path) -> impl Iterator<Item = &'a Modification> {
        self.modifications.iter().filter(move |m| m.path.as_path() == path)
    }
}

impl Extend<Modification> for Ledger {
    fn extend<T: IntoIterator<Item = Modification>>(&mut self, iter: T) {
        self.modifications.extend(iter);
    }
}

impl IntoIterator for Ledger {
    type Item = Modification;
    type IntoIter = std::vec::IntoIter<Modification>;

    fn into_iter(self) -> Self::IntoIter {
        self.modifications.into_iter()
    }
}

impl<'a> IntoIterator for &'a Ledger {
    type Item = &'a Modification;
    type IntoIter = std::slice::Iter<'a, Modification>;

    fn into_iter(self) -> Self::IntoIter {
        self.modifications.iter()
    }
}

impl fmt::Display for Ledger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, modification) in self.modifications.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{}", modification)?;
        }
        Ok(())
    }
}
