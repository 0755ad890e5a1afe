//! Backend-neutral description of the rules to emit.
//!
//! The generator fills a [`BuildPlan`] once every graph is closed; the
//! Makefile writer in [`crate::make_gen`] only formats it. Sets keep
//! first-seen order, and the writer sorts when rendering.

use crate::entity::Entity;
use indexmap::IndexSet;

/// Compile one translation unit into an object.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CompileRule {
    /// The object produced.
    pub object: Entity,
    /// The body file compiled.
    pub source: Entity,
    /// Every header the body includes, directly or not.
    pub headers: IndexSet<Entity>,
    /// Folder that must exist before the object is written.
    pub folder: Entity,
}

/// Link one executable from its objects.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct LinkRule {
    /// The executable produced.
    pub target: Entity,
    /// Objects linked into it, including its own.
    pub objects: IndexSet<Entity>,
}

/// Everything the Makefile must describe.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct BuildPlan {
    /// Final targets listed by the `all` rule.
    pub targets: IndexSet<Entity>,
    /// One rule per translation unit.
    pub compiles: Vec<CompileRule>,
    /// One rule per executable.
    pub links: Vec<LinkRule>,
    /// Distinct folders holding compile or link targets.
    pub folders: IndexSet<Entity>,
}
