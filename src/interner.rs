//! Bidirectional map between names and small integer indexes.
//!
//! Entities store a [`NameId`] instead of a path string so graph keys stay
//! cheap to hash and compare.

use indexmap::IndexSet;

/// Index of a name inside a [`NameInterner`].
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, PartialOrd, Ord)]
pub struct NameId(usize);

impl NameId {
    /// Position of the name in insertion order.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }
}

/// Append-only table of unique names.
#[derive(Debug, Default)]
pub struct NameInterner {
    names: IndexSet<String>,
}

impl NameInterner {
    /// Create an empty interner.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the index of `name`, assigning the next free index when unseen.
    pub fn insert(&mut self, name: &str) -> NameId {
        if let Some(index) = self.names.get_index_of(name) {
            return NameId(index);
        }
        let (index, _) = self.names.insert_full(name.to_owned());
        NameId(index)
    }

    /// Look up the name stored at `id`.
    ///
    /// Returns `None` for an index this interner never handed out.
    #[must_use]
    pub fn lookup(&self, id: NameId) -> Option<&str> {
        self.names.get_index(id.0).map(String::as_str)
    }

    /// Number of distinct names.
    #[must_use]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Whether no name has been interned yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}
