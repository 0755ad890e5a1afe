//! Dependency graphs keyed on [`Entity`].
//!
//! A [`DependencyGraph`] maps each entity to the set of entities it depends on
//! directly. Keys only enter a graph through [`DependencyGraph::entry`], so a
//! key with an empty set ("depends on nothing") is distinct from a missing key
//! ("never visited"). [`DependencyGraph::extrapolate`] replaces direct edges
//! with everything reachable, failing on cycles.

mod preorder;

pub use preorder::{Cycle, PreorderError, preorder};

use crate::entity::Entity;
use indexmap::{IndexMap, IndexSet, map};
use thiserror::Error;
use tracing::debug;

/// Failures while closing a graph.
#[derive(Debug, Error, Eq, PartialEq)]
pub enum GraphError {
    /// An entity depends on itself, directly or transitively.
    #[error("circular dependency")]
    Circular {
        /// The offending walk.
        cycle: Cycle,
    },
    /// A dependency was never added as a key.
    #[error("dependency is not a key of the graph")]
    MissingKey {
        /// The dangling dependency.
        entity: Entity,
    },
}

/// Maps entities to their direct dependencies.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct DependencyGraph {
    map: IndexMap<Entity, IndexSet<Entity>>,
}

impl DependencyGraph {
    /// Create an empty graph.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether `key` has been visited.
    #[must_use]
    pub fn contains(&self, key: Entity) -> bool {
        self.map.contains_key(&key)
    }

    /// Dependencies of `key`, if it is present.
    #[must_use]
    pub fn get(&self, key: Entity) -> Option<&IndexSet<Entity>> {
        self.map.get(&key)
    }

    /// Iterate keys with their dependency sets in insertion order.
    pub fn iter(&self) -> map::Iter<'_, Entity, IndexSet<Entity>> {
        self.map.iter()
    }

    /// Iterate keys in insertion order.
    pub fn keys(&self) -> map::Keys<'_, Entity, IndexSet<Entity>> {
        self.map.keys()
    }

    /// Number of keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Whether the graph has no keys.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Dependency set of `key`, inserting an empty one when absent.
    pub fn entry(&mut self, key: Entity) -> &mut IndexSet<Entity> {
        self.map.entry(key).or_default()
    }

    /// Write the transitive closure of this graph into `result`.
    ///
    /// Each key of `self` gains, in `result`, every entity reachable from it.
    /// A key never appears in its own set; reaching it again is a cycle.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::Circular`] on a cycle and
    /// [`GraphError::MissingKey`] when a dependency is not itself a key.
    pub fn extrapolated(&self, result: &mut Self) -> Result<(), GraphError> {
        for &root in self.map.keys() {
            let seen = result.entry(root);
            preorder(root, |node| {
                if node != root && !seen.insert(node) {
                    return Ok(None);
                }
                self.map
                    .get(&node)
                    .map(|deps| Some(deps.iter().copied().collect()))
                    .ok_or(GraphError::MissingKey { entity: node })
            })
            .map_err(|err| match err {
                PreorderError::Cycle(cycle) => GraphError::Circular { cycle },
                PreorderError::Visit(inner) => inner,
            })?;
        }
        Ok(())
    }

    /// Replace every dependency set with its transitive closure.
    ///
    /// # Errors
    ///
    /// See [`DependencyGraph::extrapolated`]. On failure the graph is left
    /// unchanged.
    pub fn extrapolate(&mut self) -> Result<(), GraphError> {
        let mut result = Self::new();
        self.extrapolated(&mut result)?;
        debug!(
            keys = result.len(),
            edges = result.map.values().map(IndexSet::len).sum::<usize>(),
            "closed dependency graph"
        );
        self.map = result.map;
        Ok(())
    }
}

impl<'a> IntoIterator for &'a DependencyGraph {
    type Item = (&'a Entity, &'a IndexSet<Entity>);
    type IntoIter = map::Iter<'a, Entity, IndexSet<Entity>>;

    fn into_iter(self) -> Self::IntoIter {
        self.map.iter()
    }
}
