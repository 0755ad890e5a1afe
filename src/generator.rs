//! Source reading and dependency evaluation.
//!
//! A [`Generator`] is driven in three steps:
//!
//! 1. [`Generator::read_files`] follows local includes from each root file,
//!    recording direct includes in the include graph and noting which body
//!    files define `main`.
//! 2. [`Generator::evaluate`] derives which objects each program must link,
//!    closes the include graph, and assembles a [`BuildPlan`].
//! 3. [`Generator::print`] writes the plan as a Makefile.
//!
//! Object dependencies follow from includes: if `a.cpp` includes `b.hpp`, the
//! object `a.o` needs `b.o`, which exists only when `b.cpp` was read too.
//!
//! ```no_run
//! use mkmk::{config::Configuration, generator::Generator};
//!
//! # fn main() -> Result<(), mkmk::error::MkmkError> {
//! let config = Configuration::default();
//! let mut generator = Generator::new(&config)?;
//! generator.read_files(["./app/main.cpp"])?;
//! generator.evaluate()?;
//! generator.print(&mut std::io::stdout())?;
//! # Ok(()) }
//! ```

use crate::config::Configuration;
use crate::entity::{Entity, EntityContext, FileKind};
use crate::error::MkmkError;
use crate::graph::{Cycle, DependencyGraph, GraphError, PreorderError, preorder};
use crate::make_gen;
use crate::plan::{BuildPlan, CompileRule, LinkRule};
use crate::scanner::{self, Line};
use camino::{Utf8Path, Utf8PathBuf};
use indexmap::IndexSet;
use std::borrow::Cow;
use std::fs::File;
use std::io::{BufRead, BufReader, Write};
use tracing::{debug, info};

/// Builds Makefile rules from a set of root source files.
#[derive(Debug)]
pub struct Generator<'a> {
    config: &'a Configuration,
    source_root: Option<Utf8PathBuf>,
    entities: EntityContext,
    /// Source file to the sources it includes.
    includes: DependencyGraph,
    /// Executable to the objects it links.
    linkages: DependencyGraph,
    /// Body files defining `main`.
    entry_points: IndexSet<Entity>,
    plan: Option<BuildPlan>,
}

impl<'a> Generator<'a> {
    /// Create a generator for `config`.
    ///
    /// # Errors
    ///
    /// Returns [`MkmkError::Config`] when `config` cannot tell body files
    /// from headers.
    pub fn new(config: &'a Configuration) -> Result<Self, MkmkError> {
        config.validate()?;
        Ok(Self {
            config,
            source_root: None,
            entities: EntityContext::new(config.path_separator),
            includes: DependencyGraph::new(),
            linkages: DependencyGraph::new(),
            entry_points: IndexSet::new(),
            plan: None,
        })
    }

    /// Resolve source files relative to `dir` instead of the working directory.
    #[must_use]
    pub fn with_source_root(mut self, dir: impl Into<Utf8PathBuf>) -> Self {
        self.source_root = Some(dir.into());
        self
    }

    /// The context owning every entity this generator mints.
    #[must_use]
    pub const fn entities(&self) -> &EntityContext {
        &self.entities
    }

    /// Includes per source file; transitively closed after [`Self::evaluate`].
    #[must_use]
    pub const fn includes(&self) -> &DependencyGraph {
        &self.includes
    }

    /// Objects linked per executable, filled by [`Self::evaluate`].
    #[must_use]
    pub const fn linkages(&self) -> &DependencyGraph {
        &self.linkages
    }

    /// Body files found to define `main`.
    #[must_use]
    pub const fn entry_points(&self) -> &IndexSet<Entity> {
        &self.entry_points
    }

    /// The evaluated rules, once [`Self::evaluate`] has run.
    #[must_use]
    pub const fn plan(&self) -> Option<&BuildPlan> {
        self.plan.as_ref()
    }

    /// Read each root and every file it includes, directly or not.
    ///
    /// A leading `./` is ignored. Files already read are not read again.
    ///
    /// # Errors
    ///
    /// Fails on a path with an unknown extension, an unreadable file, a
    /// malformed include directive, or an include cycle.
    pub fn read_files<I>(&mut self, roots: I) -> Result<(), MkmkError>
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        let marker = format!(".{}", self.config.path_separator);
        for root in roots {
            let given = root.as_ref();
            let path = given.strip_prefix(marker.as_str()).unwrap_or(given);
            let source = self.source_to_entity(path)?;
            self.read(source)?;
        }
        info!(
            files = self.includes.len(),
            entry_points = self.entry_points.len(),
            "read sources"
        );
        Ok(())
    }

    /// Derive link sets, close the include graph, and build the plan.
    ///
    /// # Errors
    ///
    /// Fails when a derived graph contains a cycle.
    pub fn evaluate(&mut self) -> Result<(), MkmkError> {
        let mut objects = DependencyGraph::new();
        for (source, included) in &self.includes {
            let key = source.to(FileKind::Object);
            let deps = objects.entry(key);
            for dep in included.iter().map(|inc| inc.to(FileKind::Object)) {
                if dep != key {
                    deps.insert(dep);
                }
            }
        }
        objects
            .extrapolate()
            .map_err(|err| self.graph_error(err))?;

        for &main in &self.entry_points {
            let object = main.to(FileKind::Object);
            let reachable = objects.get(object).ok_or_else(|| {
                MkmkError::internal("entry point has no object dependencies")
            })?;
            let mut linkage = IndexSet::from([object]);
            linkage.extend(
                reachable
                    .iter()
                    .copied()
                    .filter(|dep| self.includes.contains(dep.to(FileKind::Corpus))),
            );
            debug!(objects = linkage.len(), "resolved linkage");
            *self.linkages.entry(main.to(FileKind::Linked)) = linkage;
        }

        let mut closed = DependencyGraph::new();
        self.includes
            .extrapolated(&mut closed)
            .map_err(|err| self.graph_error(err))?;
        self.includes = closed;

        self.plan = Some(self.build_plan()?);
        Ok(())
    }

    /// Render the evaluated rules as Makefile text.
    ///
    /// # Errors
    ///
    /// Returns [`MkmkError::Internal`] when called before [`Self::evaluate`].
    pub fn render(&self) -> Result<String, MkmkError> {
        let plan = self
            .plan
            .as_ref()
            .ok_or_else(|| MkmkError::internal("rules rendered before evaluation"))?;
        make_gen::generate(plan, &self.entities, self.config)
    }

    /// Write the Makefile to `out`.
    ///
    /// Nothing is written unless the whole file renders.
    ///
    /// # Errors
    ///
    /// As [`Self::render`], plus [`MkmkError::Output`] when writing fails.
    pub fn print<W: Write>(&self, out: &mut W) -> Result<(), MkmkError> {
        let text = self.render()?;
        out.write_all(text.as_bytes())
            .and_then(|()| out.flush())
            .map_err(|source| MkmkError::Output { source })
    }

    fn read(&mut self, source: Entity) -> Result<(), MkmkError> {
        match preorder(source, |node| self.scan(node)) {
            Ok(()) => Ok(()),
            Err(PreorderError::Visit(err)) => Err(err),
            Err(PreorderError::Cycle(cycle)) => Err(self.cyclic_include(&cycle)?),
        }
    }

    /// Record the includes and entry point of `node` on its first visit.
    fn scan(&mut self, node: Entity) -> Result<Option<Vec<Entity>>, MkmkError> {
        if self.includes.contains(node) {
            return Ok(None);
        }
        self.includes.entry(node);
        let file = self.source_file(node)?;
        let path = self
            .source_root
            .as_deref()
            .map_or_else(|| Utf8PathBuf::from(file.as_str()), |root| root.join(&file));
        debug!(file = %path, "scanning");

        let reader = File::open(&path)
            .map(BufReader::new)
            .map_err(|source| read_error(&path, source))?;
        let mut included = IndexSet::new();
        // Sources need not be UTF-8; only the ASCII prefixes matter.
        for chunk in reader.split(b'\n') {
            let raw = chunk.map_err(|source| read_error(&path, source))?;
            let bytes = raw.strip_suffix(b"\r").unwrap_or(&raw);
            let text = String::from_utf8_lossy(bytes);
            let lossy = matches!(text, Cow::Owned(_));
            match scanner::classify(&text) {
                Ok(Line::Include(target))
                    if lossy && target.contains(char::REPLACEMENT_CHARACTER) =>
                {
                    return Err(MkmkError::MalformedInclude {
                        file,
                        line: text.to_string(),
                    });
                }
                Ok(Line::Include(target)) => {
                    included.insert(self.source_to_entity(target)?);
                }
                Ok(Line::EntryPoint) => self.mark_entry_point(node, &file),
                Ok(Line::Other) => {}
                Err(err) => {
                    return Err(MkmkError::MalformedInclude {
                        file,
                        line: err.line,
                    });
                }
            }
        }
        self.includes.entry(node).extend(included.iter().copied());
        Ok(Some(included.into_iter().collect()))
    }

    fn mark_entry_point(&mut self, node: Entity, file: &str) {
        if node.kind() == FileKind::Corpus {
            debug!(file, "found entry point");
            self.entry_points.insert(node);
        } else {
            debug!(file, "ignoring entry point outside a body file");
        }
    }

    /// Map a path to a body or header entity by its extension.
    fn source_to_entity(&mut self, path: &str) -> Result<Entity, MkmkError> {
        let config = self.config;
        if let Some(name) = path.strip_suffix(config.corpus_ext.as_str()) {
            return Ok(self.entities.get(name, FileKind::Corpus));
        }
        if let Some(name) = path.strip_suffix(config.header_ext.as_str()) {
            return Ok(self.entities.get(name, FileKind::Header));
        }
        Err(MkmkError::UnrecognizedSource {
            path: path.to_owned(),
        })
    }

    /// The file name of a body or header entity.
    fn source_file(&self, entity: Entity) -> Result<String, MkmkError> {
        let name = self.entities.name(entity)?;
        match entity.kind() {
            FileKind::Corpus => Ok(format!("{name}{}", self.config.corpus_ext)),
            FileKind::Header => Ok(format!("{name}{}", self.config.header_ext)),
            FileKind::Folder | FileKind::Linked | FileKind::Object => Err(MkmkError::internal(
                format!("{name}: entity is not of source type"),
            )),
        }
    }

    /// The file name of any entity, as its rules would name it.
    fn file_name(&self, entity: Entity) -> Result<String, MkmkError> {
        let name = self.entities.name(entity)?;
        let ext = match entity.kind() {
            FileKind::Corpus => self.config.corpus_ext.as_str(),
            FileKind::Header => self.config.header_ext.as_str(),
            FileKind::Object => self.config.object_ext.as_str(),
            FileKind::Linked => self.config.linked_ext.as_str(),
            FileKind::Folder => "",
        };
        Ok(format!("{name}{ext}"))
    }

    /// Describe an include cycle, innermost includer first.
    fn cyclic_include(&self, cycle: &Cycle) -> Result<MkmkError, MkmkError> {
        let mut included_by = Vec::new();
        for &includer in cycle.path.iter().rev() {
            included_by.push(self.source_file(includer)?);
            if includer == cycle.entity {
                break;
            }
        }
        Ok(MkmkError::CyclicInclude {
            file: self.source_file(cycle.entity)?,
            included_by,
        })
    }

    fn graph_error(&self, err: GraphError) -> MkmkError {
        match err {
            GraphError::Circular { cycle } => match self.file_name(cycle.entity) {
                Ok(entity) => MkmkError::CircularDependency { entity },
                Err(internal) => internal,
            },
            GraphError::MissingKey { entity } => MkmkError::internal(format!(
                "dependency {entity:?} is missing from the graph"
            )),
        }
    }

    fn build_plan(&mut self) -> Result<BuildPlan, MkmkError> {
        let mut plan = BuildPlan::default();
        plan.targets
            .extend(self.entry_points.iter().map(|main| main.to(FileKind::Linked)));
        for (&source, headers) in &self.includes {
            if source.kind() != FileKind::Corpus {
                continue;
            }
            let object = source.to(FileKind::Object);
            let folder = self.entities.parent(object)?;
            plan.targets.insert(object);
            plan.folders.insert(folder);
            plan.compiles.push(CompileRule {
                object,
                source,
                headers: headers.clone(),
                folder,
            });
        }
        for (&target, objects) in &self.linkages {
            let folder = self.entities.parent(target)?;
            plan.folders.insert(folder);
            plan.links.push(LinkRule {
                target,
                objects: objects.clone(),
            });
        }
        debug!(
            targets = plan.targets.len(),
            compiles = plan.compiles.len(),
            links = plan.links.len(),
            folders = plan.folders.len(),
            "assembled build plan"
        );
        Ok(plan)
    }
}

fn read_error(path: &Utf8Path, source: std::io::Error) -> MkmkError {
    MkmkError::Read {
        path: path.to_owned(),
        source,
    }
}
