//! End-to-end tests for reading sources and evaluating dependencies.

use anyhow::Result;
use mkmk::config::Configuration;
use mkmk::entity::{Entity, FileKind};
use mkmk::error::MkmkError;
use mkmk::generator::Generator;
use rstest::{fixture, rstest};
use test_support::SourceTree;

#[fixture]
fn config() -> Configuration {
    Configuration {
        preamble: "# generated".into(),
        source_prefix: "src/".into(),
        target_prefix: "obj/".into(),
        ..Configuration::default()
    }
}

fn evaluated<'a>(
    config: &'a Configuration,
    tree: &SourceTree,
    roots: &[&str],
) -> Result<Generator<'a>, MkmkError> {
    let mut generator = Generator::new(config)?.with_source_root(tree.root());
    generator.read_files(roots)?;
    generator.evaluate()?;
    Ok(generator)
}

fn names(generator: &Generator<'_>, entities: impl IntoIterator<Item = Entity>) -> Vec<String> {
    let mut names: Vec<String> = entities
        .into_iter()
        .map(|e| {
            let name = generator.entities().name(e).expect("known entity");
            match e.kind() {
                FileKind::Object => format!("{name}.o"),
                FileKind::Header => format!("{name}.hpp"),
                FileKind::Corpus => format!("{name}.cpp"),
                FileKind::Folder | FileKind::Linked => name.to_owned(),
            }
        })
        .collect();
    names.sort();
    names
}

fn linkage(generator: &Generator<'_>, program: &str) -> Vec<String> {
    let target = generator
        .linkages()
        .keys()
        .copied()
        .find(|&e| generator.entities().name(e).ok() == Some(program))
        .expect("program is linked");
    let objects = generator.linkages().get(target).expect("linkage");
    names(generator, objects.iter().copied())
}

#[rstest]
fn lone_body_compiles_without_linking(config: Configuration) -> Result<()> {
    let tree = SourceTree::with_files(&[("a.cpp", "int x;\n")])?;
    let generator = evaluated(&config, &tree, &["a.cpp"])?;
    assert!(generator.linkages().is_empty());
    let expected = concat!(
        "# generated\n",
        ".PHONY: all\n",
        "all: \\\n",
        "    obj/a.o\n",
        "\n.PHONY: clean\n",
        "clean:\n",
        "\t$(RMDIR) $(OBJDIR)\n",
        "\nobj/a.o: \\\n",
        "    src/a.cpp  \\\n",
        "    | obj/\n",
        "\t$(CXX) -o $@ $(CPPFLAGS) $(CXXFLAGS) -c $<\n",
        "\nobj/:\n",
        "\t$(MKDIR) $@\n",
    );
    assert_eq!(generator.render()?, expected);
    Ok(())
}

#[rstest]
fn compile_rule_lists_transitive_headers(config: Configuration) -> Result<()> {
    let tree = SourceTree::with_files(&[
        ("a.cpp", "#include \"b.hpp\"\nint main() { return 0; }\n"),
        ("b.hpp", "#include \"c.hpp\"\n"),
        ("c.hpp", "// leaf\n"),
    ])?;
    let generator = evaluated(&config, &tree, &["a.cpp"])?;

    assert_eq!(linkage(&generator, "a"), ["a.o"]);
    let text = generator.render()?;
    assert!(text.contains(concat!(
        "\nobj/a.o: \\\n",
        "    src/a.cpp \\\n",
        "    src/b.hpp \\\n",
        "    src/c.hpp  \\\n",
        "    | obj/\n",
    )));
    assert!(text.contains("\nobj/a: \\\n    obj/a.o\n\t$(CXX) -o $@ $^ $(LDFLAGS)\n"));
    assert!(text.contains("all: \\\n    obj/a \\\n    obj/a.o\n"));
    Ok(())
}

#[rstest]
fn include_cycle_names_both_files(config: Configuration) -> Result<()> {
    let tree = SourceTree::with_files(&[
        ("a.hpp", "#include \"b.hpp\"\n"),
        ("b.hpp", "#include \"a.hpp\"\n"),
    ])?;
    let err = evaluated(&config, &tree, &["a.hpp"]).expect_err("cycle");
    match &err {
        MkmkError::CyclicInclude { file, included_by } => {
            assert_eq!(file, "a.hpp");
            assert_eq!(included_by, &["b.hpp", "a.hpp"]);
        }
        other => panic!("expected cyclic include, got {other:?}"),
    }
    assert!(!err.is_internal());
    Ok(())
}

#[rstest]
fn self_include_is_a_cycle(config: Configuration) -> Result<()> {
    let tree = SourceTree::with_files(&[("a.cpp", "#include \"a.cpp\"\n")])?;
    let err = evaluated(&config, &tree, &["a.cpp"]).expect_err("cycle");
    assert_eq!(
        err.to_string(),
        "cyclic include in a.cpp\n    included by a.cpp"
    );
    Ok(())
}

#[rstest]
fn shared_implementation_is_linked_into_every_program(config: Configuration) -> Result<()> {
    let tree = SourceTree::with_files(&[
        ("a.cpp", "#include \"util.hpp\"\nint main() {}\n"),
        ("b.cpp", "#include \"util.hpp\"\nint main() {}\n"),
        ("util.cpp", "#include \"util.hpp\"\n"),
        ("util.hpp", "void util();\n"),
    ])?;
    let generator = evaluated(&config, &tree, &["a.cpp", "b.cpp", "util.cpp"])?;

    assert_eq!(linkage(&generator, "a"), ["a.o", "util.o"]);
    assert_eq!(linkage(&generator, "b"), ["b.o", "util.o"]);
    let text = generator.render()?;
    let all_rule = text.split("\n\n").next().expect("aggregate rule");
    assert_eq!(all_rule.matches("obj/util.o").count(), 1);
    let plan = generator.plan().expect("evaluated");
    let util_objects = plan
        .targets
        .iter()
        .filter(|&&e| names(&generator, [e]) == ["util.o"])
        .count();
    assert_eq!(util_objects, 1);
    Ok(())
}

#[rstest]
fn headers_without_bodies_are_not_linked(config: Configuration) -> Result<()> {
    let tree = SourceTree::with_files(&[
        ("main.cpp", "#include \"util.hpp\"\nint main() {}\n"),
        ("util.hpp", "inline void util() {}\n"),
        ("util.cpp", "#include \"util.hpp\"\n"),
    ])?;
    // util.cpp exists on disk but is never named, so util.o is unknown.
    let generator = evaluated(&config, &tree, &["main.cpp"])?;
    assert_eq!(linkage(&generator, "main"), ["main.o"]);
    Ok(())
}

#[rstest]
fn linkage_follows_implementation_dependencies(config: Configuration) -> Result<()> {
    let tree = SourceTree::with_files(&[
        ("app/main.cpp", "#include \"lib/x.hpp\"\nint main(int, char**) {}\n"),
        ("lib/x.hpp", ""),
        ("lib/x.cpp", "#include \"lib/x.hpp\"\n#include \"lib/y.hpp\"\n"),
        ("lib/y.hpp", ""),
        ("lib/y.cpp", "#include \"lib/y.hpp\"\n"),
    ])?;
    let generator = evaluated(
        &config,
        &tree,
        &["./app/main.cpp", "./lib/x.cpp", "./lib/y.cpp"],
    )?;
    assert_eq!(
        linkage(&generator, "app/main"),
        ["app/main.o", "lib/x.o", "lib/y.o"]
    );

    let text = generator.render()?;
    assert!(text.contains("\nobj/app:\n"));
    assert!(text.contains("\nobj/lib:\n"));
    assert_eq!(text.matches("$(MKDIR) $@").count(), 2);
    Ok(())
}

#[rstest]
fn include_graph_is_closed_after_evaluation(config: Configuration) -> Result<()> {
    let tree = SourceTree::with_files(&[
        ("a.cpp", "#include \"b.hpp\"\n"),
        ("b.hpp", "#include \"c.hpp\"\n#include \"d.hpp\"\n"),
        ("c.hpp", "#include \"d.hpp\"\n"),
        ("d.hpp", ""),
    ])?;
    let mut generator = Generator::new(&config)?.with_source_root(tree.root());
    generator.read_files(["a.cpp"])?;
    let direct: usize = generator.includes().iter().map(|(_, deps)| deps.len()).sum();
    assert_eq!(direct, 4);
    assert_eq!(generator.includes().len(), 4);

    generator.evaluate()?;
    let closed: Vec<_> = generator
        .includes()
        .iter()
        .map(|(&key, deps)| (names(&generator, [key]), names(&generator, deps.iter().copied())))
        .collect();
    assert!(closed.contains(&(
        vec!["a.cpp".to_owned()],
        vec!["b.hpp".to_owned(), "c.hpp".to_owned(), "d.hpp".to_owned()]
    )));
    assert!(closed.contains(&(vec!["d.hpp".to_owned()], Vec::new())));
    Ok(())
}

#[rstest]
fn entry_points_in_headers_are_ignored(config: Configuration) -> Result<()> {
    let tree = SourceTree::with_files(&[("odd.hpp", "int main() {}\n")])?;
    let generator = evaluated(&config, &tree, &["odd.hpp"])?;
    assert!(generator.entry_points().is_empty());
    assert!(generator.linkages().is_empty());
    assert!(generator.plan().expect("evaluated").compiles.is_empty());
    Ok(())
}

#[rstest]
fn missing_include_names_the_file(config: Configuration) -> Result<()> {
    let tree = SourceTree::with_files(&[("a.cpp", "#include \"gone.hpp\"\n")])?;
    let err = evaluated(&config, &tree, &["a.cpp"]).expect_err("missing");
    match err {
        MkmkError::Read { path, .. } => assert!(path.as_str().ends_with("gone.hpp")),
        other => panic!("expected read error, got {other:?}"),
    }
    Ok(())
}

#[rstest]
fn malformed_include_is_reported(config: Configuration) -> Result<()> {
    let tree = SourceTree::with_files(&[("a.cpp", "#include \"broken.hpp\n")])?;
    let err = evaluated(&config, &tree, &["a.cpp"]).expect_err("malformed");
    assert!(matches!(
        err,
        MkmkError::MalformedInclude { ref file, .. } if file == "a.cpp"
    ));
    Ok(())
}

#[rstest]
#[case::text_root("notes.txt")]
#[case::no_extension("Makefile")]
fn unrecognised_roots_are_rejected(config: Configuration, #[case] root: &str) -> Result<()> {
    let tree = SourceTree::new()?;
    let err = evaluated(&config, &tree, &[root]).expect_err("unrecognised");
    assert!(matches!(err, MkmkError::UnrecognizedSource { .. }));
    Ok(())
}

#[rstest]
fn shared_headers_are_read_once(config: Configuration) -> Result<()> {
    let tree = SourceTree::with_files(&[
        ("a.cpp", "#include \"common.hpp\"\n"),
        ("b.cpp", "#include \"common.hpp\"\n"),
        ("common.hpp", ""),
    ])?;
    let generator = evaluated(&config, &tree, &["a.cpp", "b.cpp", "./a.cpp"])?;
    assert_eq!(generator.includes().len(), 3);
    assert_eq!(generator.plan().expect("evaluated").compiles.len(), 2);
    Ok(())
}

#[rstest]
fn non_utf8_bytes_outside_includes_are_tolerated(config: Configuration) -> Result<()> {
    let tree = SourceTree::with_files(&[("b.hpp", "")])?;
    tree.write("a.cpp", b"// caf\xe9\r\n#include \"b.hpp\"\r\nint main() {}\r\n")?;
    let generator = evaluated(&config, &tree, &["a.cpp"])?;
    assert_eq!(generator.entry_points().len(), 1);
    assert!(generator.render()?.contains("    src/b.hpp  \\\n"));
    Ok(())
}

#[rstest]
fn non_utf8_include_target_is_malformed(config: Configuration) -> Result<()> {
    let tree = SourceTree::new()?;
    tree.write("a.cpp", b"#include \"caf\xe9.hpp\"\n")?;
    let err = evaluated(&config, &tree, &["a.cpp"]).expect_err("malformed");
    assert!(matches!(
        err,
        MkmkError::MalformedInclude { ref file, .. } if file == "a.cpp"
    ));
    Ok(())
}

#[rstest]
fn mutually_dependent_bodies_name_an_object(config: Configuration) -> Result<()> {
    let tree = SourceTree::with_files(&[
        ("a.cpp", "#include \"b.hpp\"\n"),
        ("a.hpp", ""),
        ("b.cpp", "#include \"a.hpp\"\n"),
        ("b.hpp", ""),
    ])?;
    let err = evaluated(&config, &tree, &["a.cpp", "b.cpp"]).expect_err("cycle");
    match &err {
        MkmkError::CircularDependency { entity } => {
            assert!(entity == "a.o" || entity == "b.o", "unexpected entity {entity}");
        }
        other => panic!("expected circular dependency, got {other:?}"),
    }
    assert!(!err.is_internal());
    Ok(())
}
