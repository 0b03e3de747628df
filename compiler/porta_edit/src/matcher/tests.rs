use pretty_assertions::assert_eq;

use super::*;
use crate::{RenameToken, ScopedRename};
use porta_lexer::lex;

fn table() -> RuleTable {
    let mut rules = RuleTable::new();
    rules.add(ScopedRename::new("Qt", "WFlags", "Qt::WindowFlags"));
    rules.add(RenameToken::new("OldWidget", "NewWidget"));
    rules.add(RenameToken::new("OLD_MACRO", "NEW_MACRO").with_directives(true));
    rules
}

fn port(text: &str) -> String {
    let stream = lex("x.cpp", text);
    match_tokens(&stream, &table()).apply(text)
}

#[test]
fn renames_code_identifiers() {
    assert_eq!(
        port("OldWidget *w = new OldWidget(parent);\n"),
        "NewWidget *w = new NewWidget(parent);\n"
    );
}

#[test]
fn ignores_strings_comments_and_partial_names() {
    let text = "// OldWidget\nconst char *s = \"OldWidget\"; OldWidgetFactory f; my_OldWidget g;\n";
    assert_eq!(port(text), text);
}

#[test]
fn directive_lines_need_opt_in() {
    let text = "#define MAKE OldWidget(OLD_MACRO)\nOldWidget x = OLD_MACRO;\n";
    assert_eq!(
        port(text),
        "#define MAKE OldWidget(NEW_MACRO)\nNewWidget x = NEW_MACRO;\n"
    );
}

#[test]
fn include_lines_are_left_alone() {
    let text = "#include <OLD_MACRO/OldWidget.h>\n";
    assert_eq!(port(text), text);
}

#[test]
fn scoped_rename_then_no_double_edit() {
    assert_eq!(port("Qt::WFlags f = Qt::Other;\n"), "Qt::WindowFlags f = Qt::Other;\n");
}

#[test]
fn first_applicable_rule_wins() {
    let mut rules = RuleTable::new();
    rules.add(ScopedRename::new("Qt", "WFlags", "Qt::WindowFlags"));
    rules.add(RenameToken::new("Qt", "Qt5"));
    let text = "Qt::WFlags a; Qt::Key b;";
    let stream = lex("x.cpp", text);
    assert_eq!(
        match_tokens(&stream, &rules).apply(text),
        "Qt::WindowFlags a; Qt5::Key b;"
    );
}

#[test]
fn covered_tokens_are_not_offered_again() {
    let mut rules = RuleTable::new();
    rules.add(ScopedRename::new("Qt", "WFlags", "Qt::WindowFlags"));
    rules.add(RenameToken::new("WFlags", "Never"));
    let text = "Qt::WFlags a; WFlags b;";
    let stream = lex("x.cpp", text);
    let edits = match_tokens(&stream, &rules);
    assert_eq!(edits.len(), 2);
    assert_eq!(edits.apply(text), "Qt::WindowFlags a; Never b;");
}

#[test]
fn filter_restricts_matched_tokens() {
    let text = "OldWidget a; OldWidget b;";
    let stream = lex("x.cpp", text);
    let rules = table();
    let first = stream
        .tokens()
        .iter()
        .position(|t| stream.text_of(t) == "OldWidget");
    let edits = ReplacementMatcher::new(&rules).match_where(&stream, |i| Some(i) == first);
    assert_eq!(edits.apply(text), "NewWidget a; OldWidget b;");
}

#[test]
fn porting_is_idempotent() {
    let once = port("Qt::WFlags f; OldWidget w;\n#if OLD_MACRO\n#endif\n");
    assert_eq!(port(&once), once);
}

#[test]
fn empty_table_matches_nothing() {
    let stream = lex("x.cpp", "OldWidget");
    assert!(match_tokens(&stream, &RuleTable::new()).is_empty());
}
