//! Explicit-stack depth-first traversal with cycle detection.

use crate::entity::Entity;

/// A dependency path that leads back to one of its own members.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Cycle {
    /// The entity reached a second time.
    pub entity: Entity,
    /// The walk from the traversal root down to the last node expanded
    /// before `entity` was met again.
    pub path: Vec<Entity>,
}

/// Why a traversal stopped early.
#[derive(Debug)]
pub enum PreorderError<E> {
    /// A node was met while still on the current path.
    Cycle(Cycle),
    /// The expansion callback failed.
    Visit(E),
}

/// Walk the graph below `root` in depth-first preorder.
///
/// `expand` is called once per node reached. Returning `Some(children)`
/// descends into the children in order; `None` leaves the node unexpanded,
/// which is how callers skip nodes they have already seen. Pending siblings
/// are kept in a stack of frames and the chain of expanded ancestors in a
/// separate path, so meeting an ancestor again is reported as a [`Cycle`]
/// instead of looping.
///
/// # Errors
///
/// Returns [`PreorderError::Cycle`] when a node is reachable from itself and
/// [`PreorderError::Visit`] when `expand` fails.
pub fn preorder<E, F>(root: Entity, mut expand: F) -> Result<(), PreorderError<E>>
where
    F: FnMut(Entity) -> Result<Option<Vec<Entity>>, E>,
{
    let mut path: Vec<Entity> = Vec::new();
    let mut frames: Vec<Vec<Entity>> = vec![vec![root]];
    while let Some(frame) = frames.last_mut() {
        let Some(node) = frame.pop() else {
            // Every frame but the root's was pushed alongside a path entry.
            frames.pop();
            path.pop();
            continue;
        };
        if path.contains(&node) {
            return Err(PreorderError::Cycle(Cycle { entity: node, path }));
        }
        if let Some(mut children) = expand(node).map_err(PreorderError::Visit)? {
            children.reverse();
            path.push(node);
            frames.push(children);
        }
    }
    Ok(())
}
