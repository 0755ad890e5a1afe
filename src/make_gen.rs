//! Makefile generator.
//!
//! This module converts a [`BuildPlan`] into Makefile text. Entries within
//! each section are sorted by path so the output is deterministic, and the
//! whole file is assembled in memory before anything is written.

use crate::config::Configuration;
use crate::entity::{Entity, EntityContext, FileKind};
use crate::error::MkmkError;
use crate::plan::{BuildPlan, CompileRule, LinkRule};
use indexmap::IndexSet;
use itertools::Itertools;

/// Generate a Makefile as a string.
///
/// # Errors
///
/// Returns [`MkmkError::Internal`] if the plan references an entity unknown
/// to `ctx`.
pub fn generate(
    plan: &BuildPlan,
    ctx: &EntityContext,
    config: &Configuration,
) -> Result<String, MkmkError> {
    let mut printer = RulePrinter::new(ctx, config);
    printer.preamble();
    printer.all(&plan.targets)?;
    printer.clean();

    let mut compiles = plan
        .compiles
        .iter()
        .map(|rule| Ok((printer.path(rule.object)?, rule)))
        .collect::<Result<Vec<_>, MkmkError>>()?;
    compiles.sort_by(|(a, _), (b, _)| a.cmp(b));
    for (_, rule) in compiles {
        printer.compile(rule)?;
    }

    let mut links = plan
        .links
        .iter()
        .map(|rule| Ok((printer.path(rule.target)?, rule)))
        .collect::<Result<Vec<_>, MkmkError>>()?;
    links.sort_by(|(a, _), (b, _)| a.cmp(b));
    for (_, rule) in links {
        printer.link(rule)?;
    }

    for folder in printer.sorted_paths(&plan.folders)? {
        printer.mkdir(&folder);
    }
    Ok(printer.out)
}

/// Accumulates rule text for one Makefile.
struct RulePrinter<'a> {
    ctx: &'a EntityContext,
    config: &'a Configuration,
    indent: String,
    out: String,
}

impl<'a> RulePrinter<'a> {
    fn new(ctx: &'a EntityContext, config: &'a Configuration) -> Self {
        Self {
            ctx,
            config,
            indent: config.indent(),
            out: String::new(),
        }
    }

    /// Render the path make uses for `entity`.
    fn path(&self, entity: Entity) -> Result<String, MkmkError> {
        let name = self.ctx.name(entity)?;
        let config = self.config;
        let (prefix, ext) = match entity.kind() {
            FileKind::Corpus => (&config.source_prefix, config.corpus_ext.as_str()),
            FileKind::Header => (&config.source_prefix, config.header_ext.as_str()),
            FileKind::Folder => (&config.target_prefix, ""),
            FileKind::Linked => (&config.target_prefix, config.linked_ext.as_str()),
            FileKind::Object => (&config.target_prefix, config.object_ext.as_str()),
        };
        Ok(format!("{prefix}{name}{ext}"))
    }

    fn sorted_paths<'e>(
        &self,
        entities: impl IntoIterator<Item = &'e Entity>,
    ) -> Result<Vec<String>, MkmkError> {
        let paths = entities
            .into_iter()
            .map(|&entity| self.path(entity))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(paths.into_iter().sorted().dedup().collect())
    }

    /// One backslash-continued line per path.
    fn continuation(&self, paths: &[String]) -> String {
        paths
            .iter()
            .map(|path| format!(" \\\n{}{path}", self.indent))
            .join("")
    }

    fn preamble(&mut self) {
        self.out.push_str(&self.config.preamble);
        self.out.push('\n');
    }

    fn all(&mut self, targets: &IndexSet<Entity>) -> Result<(), MkmkError> {
        let deps = self.continuation(&self.sorted_paths(targets)?);
        self.out.push_str(".PHONY: all\nall:");
        self.out.push_str(&deps);
        self.out.push('\n');
        Ok(())
    }

    fn clean(&mut self) {
        self.out
            .push_str("\n.PHONY: clean\nclean:\n\t$(RMDIR) $(OBJDIR)\n");
    }

    fn compile(&mut self, rule: &CompileRule) -> Result<(), MkmkError> {
        let object = self.path(rule.object)?;
        let source = self.path(rule.source)?;
        let headers = self.continuation(&self.sorted_paths(&rule.headers)?);
        let folder = self.path(rule.folder)?;
        // `|` marks the folder as an order-only prerequisite.
        self.out.push_str(&format!(
            "\n{object}: \\\n{indent}{source}{headers}  \\\n{indent}| {folder}\n\t{command}\n",
            indent = self.indent,
            command = self.config.compile_command,
        ));
        Ok(())
    }

    fn link(&mut self, rule: &LinkRule) -> Result<(), MkmkError> {
        let target = self.path(rule.target)?;
        let objects = self.continuation(&self.sorted_paths(&rule.objects)?);
        self.out.push_str(&format!(
            "\n{target}:{objects}\n\t{command}\n",
            command = self.config.link_command,
        ));
        Ok(())
    }

    fn mkdir(&mut self, folder: &str) {
        self.out.push_str(&format!("\n{folder}:\n\t$(MKDIR) $@\n"));
    }
}
