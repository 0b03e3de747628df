#![allow(clippy::unwrap_used)]

use pretty_assertions::assert_eq;

use super::*;
use crate::{MemorySource, ParseError};

struct Fixture {
    cache: ParseCache<MemorySource>,
    resolver: IncludeResolver,
    diagnostics: Vec<Diagnostic>,
    options: EvalOptions,
}

impl Fixture {
    fn new(files: &[(&str, &str)]) -> Self {
        let mut source = MemorySource::new();
        for (path, text) in files {
            source.insert(*path, *text);
        }
        Fixture {
            cache: ParseCache::new(source),
            resolver: IncludeResolver::new(["/inc"]),
            diagnostics: Vec::new(),
            options: EvalOptions::default(),
        }
    }

    fn evaluate(&mut self, path: &str, env: &mut MacroEnv) -> Result<ActiveTokenSequence, EvalError> {
        ConditionalEvaluator::new(&mut self.cache, &self.resolver, &mut self.diagnostics)
            .with_options(self.options)
            .evaluate(Path::new(path), env)
    }

    fn kinds(&self) -> Vec<DiagnosticKind> {
        self.diagnostics.iter().map(|d| d.kind).collect()
    }
}

fn active(files: &[(&str, &str)], env: &mut MacroEnv) -> Vec<String> {
    let mut fixture = Fixture::new(files);
    let out = fixture.evaluate(files[0].0, env).unwrap();
    out.significant_texts().into_iter().map(str::to_owned).collect()
}

#[test]
fn undefined_macro_selects_else_branch() {
    let mut env = MacroEnv::new();
    let texts = active(
        &[("/src/a.cpp", "#if defined(DEBUG)\nA\n#else\nB\n#endif")],
        &mut env,
    );
    assert_eq!(texts, vec!["B"]);
}

#[test]
fn skipped_branch_has_no_side_effects() {
    let mut env = MacroEnv::new();
    let texts = active(
        &[(
            "/src/a.cpp",
            "#if 0\n#define X 1\n#if 1\n#define Y 1\n#endif\n#include \"missing.h\"\n#endif\n",
        )],
        &mut env,
    );
    assert!(texts.is_empty());
    assert!(env.get("X").is_none());
    assert!(!env.is_defined("Y"));
}

#[test]
fn defines_apply_in_file_order() {
    let mut env = MacroEnv::new();
    let texts = active(
        &[(
            "/src/a.cpp",
            "#ifdef FEATURE\nearly\n#endif\n#define FEATURE\n#ifdef FEATURE\nlate\n#endif\n#undef FEATURE\n#ifndef FEATURE\ngone\n#endif\n",
        )],
        &mut env,
    );
    assert_eq!(texts, vec!["late", "gone"]);
    assert!(!env.is_defined("FEATURE"));
}

#[test]
fn elif_chain_takes_first_true_branch() {
    let mut env = MacroEnv::new();
    env.define_object("LEVEL", "2");
    let texts = active(
        &[(
            "/src/a.cpp",
            "#if LEVEL == 1\none\n#elif LEVEL == 2\ntwo\n#elif LEVEL >= 2\nmore\n#else\nnone\n#endif\n",
        )],
        &mut env,
    );
    assert_eq!(texts, vec!["two"]);
}

#[test]
fn no_branch_selected_without_else() {
    let mut env = MacroEnv::new();
    let texts = active(&[("/src/a.cpp", "a\n#if 0\nb\n#elif 0\nc\n#endif\nd\n")], &mut env);
    assert_eq!(texts, vec!["a", "d"]);
}

#[test]
fn includes_share_the_environment() {
    let mut env = MacroEnv::new();
    let texts = active(
        &[
            ("/src/a.cpp", "#define MODE 2\n#include \"config.h\"\n#if HAVE_WIDGETS\nwidgets\n#endif\n"),
            ("/src/config.h", "#if MODE > 1\n#define HAVE_WIDGETS 1\n#endif\nconfig\n"),
        ],
        &mut env,
    );
    assert_eq!(texts, vec!["config", "widgets"]);
    assert!(env.is_defined("HAVE_WIDGETS"));
}

#[test]
fn angled_includes_search_paths_and_record_provenance() {
    let mut fixture = Fixture::new(&[
        ("/src/a.cpp", "before\n#include <lib.h>\nafter\n"),
        ("/inc/lib.h", "lib\n"),
    ]);
    let out = fixture.evaluate("/src/a.cpp", &mut MacroEnv::new()).unwrap();

    assert_eq!(out.significant_texts(), vec!["before", "lib", "after"]);
    assert_eq!(out.included_files(), &[PathBuf::from("/inc/lib.h")]);
    let paths: Vec<&Path> = out.files().iter().map(|f| f.path()).collect();
    assert_eq!(paths, vec![Path::new("/src/a.cpp"), Path::new("/inc/lib.h")]);
    assert_eq!(out.text(), "before\nlib\nafter\n");

    let lib_tokens: Vec<ActiveToken> = out.tokens().iter().filter(|t| t.file == 1).copied().collect();
    assert_eq!(lib_tokens, vec![
        ActiveToken { file: 1, index: 0 },
        ActiveToken { file: 1, index: 1 },
    ]);
}

#[test]
fn unresolved_include_is_empty_and_reported() {
    let mut fixture = Fixture::new(&[("/src/a.cpp", "a\n#include <nowhere.h>\nb\n")]);
    let out = fixture.evaluate("/src/a.cpp", &mut MacroEnv::new()).unwrap();
    assert_eq!(out.significant_texts(), vec!["a", "b"]);
    assert_eq!(fixture.kinds(), vec![DiagnosticKind::UnresolvedInclude]);
    assert_eq!(fixture.diagnostics[0].line, Some(2));
    assert_eq!(fixture.diagnostics[0].path.as_deref(), Some(Path::new("/src/a.cpp")));
}

#[test]
fn include_guards_and_pragma_once() {
    let mut fixture = Fixture::new(&[
        (
            "/src/a.cpp",
            "#include \"g.h\"\n#include \"g.h\"\n#include \"o.h\"\n#include \"o.h\"\n",
        ),
        ("/src/g.h", "#ifndef G_H\n#define G_H\nguarded\n#endif\n"),
        ("/src/o.h", "#pragma once\nonce\n"),
    ]);
    let out = fixture.evaluate("/src/a.cpp", &mut MacroEnv::new()).unwrap();
    assert_eq!(out.significant_texts(), vec!["guarded", "once"]);
    // Each header is read once no matter how often it is included.
    assert_eq!(fixture.cache.source().read_count("/src/g.h"), 1);
    assert_eq!(fixture.cache.source().read_count("/src/o.h"), 1);
}

#[test]
fn cached_tree_is_evaluated_differently_per_environment() {
    let mut fixture = Fixture::new(&[("/src/a.h", "#ifdef WIDE\nwide\n#else\nnarrow\n#endif\n")]);

    let mut wide = MacroEnv::new();
    wide.define_object("WIDE", "");
    let first = fixture.evaluate("/src/a.h", &mut wide).unwrap();
    let second = fixture.evaluate("/src/a.h", &mut MacroEnv::new()).unwrap();

    assert_eq!(first.significant_texts(), vec!["wide"]);
    assert_eq!(second.significant_texts(), vec!["narrow"]);
    assert!(Arc::ptr_eq(&first.files()[0], &second.files()[0]));
    assert_eq!(fixture.cache.source().read_count("/src/a.h"), 1);
}

#[test]
fn include_cycle_is_reported_and_skipped() {
    let mut fixture = Fixture::new(&[
        ("/src/a.h", "a\n#include \"b.h\"\n"),
        ("/src/b.h", "b\n#include \"a.h\"\nb2\n"),
    ]);
    let out = fixture.evaluate("/src/a.h", &mut MacroEnv::new()).unwrap();
    assert_eq!(out.significant_texts(), vec!["a", "b", "b2"]);
    assert_eq!(fixture.kinds(), vec![DiagnosticKind::IncludeCycle]);
    assert_eq!(fixture.diagnostics[0].severity, Severity::Warning);
    assert_eq!(fixture.diagnostics[0].path.as_deref(), Some(Path::new("/src/b.h")));
}

#[test]
fn include_cycle_aborts_when_configured() {
    let mut fixture = Fixture::new(&[
        ("/src/a.h", "#include \"b.h\"\n"),
        ("/src/b.h", "#include \"a.h\"\n"),
    ]);
    fixture.options.abort_on_include_cycle = true;
    let err = fixture.evaluate("/src/a.h", &mut MacroEnv::new()).unwrap_err();
    assert_eq!(
        err,
        EvalError::IncludeCycle {
            chain: vec![
                PathBuf::from("/src/a.h"),
                PathBuf::from("/src/b.h"),
                PathBuf::from("/src/a.h"),
            ],
        }
    );
}

#[test]
fn broken_root_file_is_an_error() {
    let mut fixture = Fixture::new(&[("/src/a.cpp", "#if 1\n")]);
    let err = fixture.evaluate("/src/a.cpp", &mut MacroEnv::new()).unwrap_err();
    assert!(matches!(
        err,
        EvalError::Source(SourceError::Parse(ParseError::Unterminated { .. }))
    ));

    let err = fixture.evaluate("/src/missing.cpp", &mut MacroEnv::new()).unwrap_err();
    assert!(matches!(err, EvalError::Source(SourceError::Load(_))));
}

#[test]
fn broken_included_file_is_skipped() {
    let mut fixture = Fixture::new(&[
        ("/src/a.cpp", "a\n#include \"bad.h\"\nb\n"),
        ("/src/bad.h", "bad\n#endif\n"),
    ]);
    let out = fixture.evaluate("/src/a.cpp", &mut MacroEnv::new()).unwrap();
    assert_eq!(out.significant_texts(), vec!["a", "b"]);
    assert_eq!(fixture.kinds(), vec![DiagnosticKind::UnbalancedConditional]);
}

#[test]
fn invalid_condition_is_false_and_reported() {
    let mut fixture = Fixture::new(&[("/src/a.cpp", "#if 1 +\nx\n#else\ny\n#endif\n")]);
    let out = fixture.evaluate("/src/a.cpp", &mut MacroEnv::new()).unwrap();
    assert_eq!(out.significant_texts(), vec!["y"]);
    assert_eq!(fixture.kinds(), vec![DiagnosticKind::InvalidCondition]);
    assert_eq!(fixture.diagnostics[0].line, Some(1));
}

#[test]
fn pasting_macro_defined_but_flagged() {
    let mut fixture = Fixture::new(&[(
        "/src/a.cpp",
        "#define CAT(a, b) a ## b\n#ifdef CAT\nyes\n#endif\n",
    )]);
    let mut env = MacroEnv::new();
    let out = fixture.evaluate("/src/a.cpp", &mut env).unwrap();
    assert_eq!(out.significant_texts(), vec!["yes"]);
    assert!(env.is_defined("CAT"));
    assert_eq!(fixture.kinds(), vec![DiagnosticKind::UnsupportedMacroOperator]);
}

#[test]
fn error_directive_only_in_active_branch() {
    let mut fixture = Fixture::new(&[(
        "/src/a.cpp",
        "#ifndef CONFIG\n#error CONFIG must be set\n#endif\n#if 0\n#error never\n#endif\n",
    )]);
    fixture.evaluate("/src/a.cpp", &mut MacroEnv::new()).unwrap();
    assert_eq!(fixture.kinds(), vec![DiagnosticKind::ErrorDirective]);
    assert_eq!(fixture.diagnostics[0].message, "#error CONFIG must be set");
}

#[test]
fn malformed_directives_are_reported() {
    let mut fixture = Fixture::new(&[(
        "/src/a.cpp",
        "#include FOO\n#define\n#undef\n#ifdef\n#endif\n",
    )]);
    fixture.evaluate("/src/a.cpp", &mut MacroEnv::new()).unwrap();
    assert_eq!(fixture.kinds(), vec![DiagnosticKind::MalformedDirective; 4]);
}

#[test]
fn active_indices_and_directive_lines() {
    let text = "#if 0\nold\n#else\nnew\n#endif\n";
    let mut fixture = Fixture::new(&[("/src/a.cpp", text)]);
    let out = fixture.evaluate("/src/a.cpp", &mut MacroEnv::new()).unwrap();
    let stream = &out.files()[0];

    let active: Vec<&str> = out
        .token_indices(Path::new("/src/a.cpp"))
        .map(|i| stream.text_at(i))
        .collect();
    assert_eq!(active, vec!["new", "\n"]);
    assert_eq!(out.directive_lines(Path::new("/src/a.cpp")).count(), 3);
    assert_eq!(out.token_indices(Path::new("/src/other.h")).count(), 0);
}
