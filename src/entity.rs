//! Flyweight identifiers for the files and directories named in a Makefile.
//!
//! An [`Entity`] pairs an interned name with a [`FileKind`]. The name carries
//! no extension: `src/util.cpp` and `src/util.hpp` share the name `src/util`,
//! so reinterpreting one as the other (or as the object `src/util.o`) is a
//! matter of swapping the kind. All entities of a run come from one
//! [`EntityContext`]; entities from different contexts must never be mixed.

use crate::error::MkmkError;
use crate::interner::{NameId, NameInterner};

/// Kinds of files appearing in generated rules.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, PartialOrd, Ord)]
pub enum FileKind {
    /// Source body file, e.g. `foo.cpp`.
    Corpus,
    /// Source interface file, e.g. `foo.hpp`.
    Header,
    /// Directory holding build outputs.
    Folder,
    /// Executable program.
    Linked,
    /// Compiled object file, e.g. `foo.o`.
    Object,
}

/// An interned `(name, kind)` pair.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, PartialOrd, Ord)]
pub struct Entity {
    name: NameId,
    kind: FileKind,
}

impl Entity {
    /// The kind of file this entity denotes.
    #[must_use]
    pub const fn kind(self) -> FileKind {
        self.kind
    }

    /// The interned name index.
    #[must_use]
    pub const fn name_id(self) -> NameId {
        self.name
    }

    /// The same name viewed as another kind of file.
    #[must_use]
    pub const fn to(self, kind: FileKind) -> Self {
        Self {
            name: self.name,
            kind,
        }
    }
}

/// Factory and name store for [`Entity`] values.
#[derive(Debug)]
pub struct EntityContext {
    names: NameInterner,
    separator: char,
}

impl EntityContext {
    /// Create a context splitting parent folders at `separator`.
    #[must_use]
    pub fn new(separator: char) -> Self {
        Self {
            names: NameInterner::new(),
            separator,
        }
    }

    /// Mint the entity for `name` viewed as `kind`.
    pub fn get(&mut self, name: &str, kind: FileKind) -> Entity {
        Entity {
            name: self.names.insert(name),
            kind,
        }
    }

    /// The name of `entity`, without any extension.
    ///
    /// # Errors
    ///
    /// Returns [`MkmkError::Internal`] when `entity` was minted elsewhere.
    pub fn name(&self, entity: Entity) -> Result<&str, MkmkError> {
        self.names.lookup(entity.name).ok_or_else(|| {
            MkmkError::internal(format!(
                "name index {} out of range ({} names interned)",
                entity.name.index(),
                self.names.len()
            ))
        })
    }

    /// The folder containing `entity`.
    ///
    /// Everything before the last separator names the folder; a bare file
    /// name lives in the folder with the empty name.
    ///
    /// # Errors
    ///
    /// Returns [`MkmkError::Internal`] when `entity` was minted elsewhere.
    pub fn parent(&mut self, entity: Entity) -> Result<Entity, MkmkError> {
        let name = self.name(entity)?;
        let folder = name
            .rsplit_once(self.separator)
            .map_or("", |(dir, _)| dir)
            .to_owned();
        Ok(self.get(&folder, FileKind::Folder))
    }

    /// Number of distinct names minted so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Whether nothing has been minted yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}
