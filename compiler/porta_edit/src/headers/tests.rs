use pretty_assertions::assert_eq;

use super::*;
use crate::TextReplacement;
use porta_lexer::lex;

fn rules() -> HeaderRules {
    [("old.h", "new.h"), ("qwidget.h", "QtWidgets/QWidget"), ("same.h", "same.h")]
        .into_iter()
        .collect()
}

#[test]
fn replaces_only_the_header_name() {
    let text = "#include <old.h>\nOldWidget w;\n";
    let stream = lex("x.cpp", text);
    let edits = rewrite_includes(&stream, &rules());
    assert_eq!(edits.into_vec(), vec![TextReplacement::new("new.h", 10, 5)]);
}

#[test]
fn keeps_delimiter_style_and_spacing() {
    let text = "#  include   \"qwidget.h\" // ui\n#include<old.h>\n";
    let stream = lex("x.cpp", text);
    assert_eq!(
        rewrite_includes(&stream, &rules()).apply(text),
        "#  include   \"QtWidgets/QWidget\" // ui\n#include<new.h>\n"
    );
}

#[test]
fn unknown_and_identity_headers_are_untouched() {
    let text = "#include <vector>\n#include \"same.h\"\n";
    let stream = lex("x.cpp", text);
    assert!(rewrite_includes(&stream, &rules()).is_empty());
}

#[test]
fn malformed_and_non_directive_includes_are_skipped() {
    let text = "#include\n#include <old.h\nint include = 0; // #include <old.h>\n";
    let stream = lex("x.cpp", text);
    assert!(rewrite_includes(&stream, &rules()).is_empty());
}

#[test]
fn rules_table_basics() {
    let mut table = HeaderRules::new();
    assert!(table.is_empty());
    assert_eq!(table.insert("a.h", "b.h"), None);
    assert_eq!(table.insert("a.h", "c.h"), Some("b.h".to_owned()));
    assert_eq!(table.get("a.h"), Some("c.h"));
    assert_eq!(table.len(), 1);
}
