use pretty_assertions::assert_eq;

use super::*;
use porta_lexer::lex;

fn apply_at(rule: &dyn TokenRule, text: &str, trigger_index: usize) -> Option<TextReplacement> {
    let stream = lex("x.cpp", text);
    let index = stream
        .tokens()
        .iter()
        .enumerate()
        .filter(|(_, t)| stream.text_of(t) == rule.trigger())
        .map(|(i, _)| i)
        .nth(trigger_index)?;
    rule.apply(&MatchContext::new(&stream, index))
}

#[test]
fn rename_replaces_the_token() {
    let rule = RenameToken::new("OldWidget", "NewWidget");
    assert_eq!(
        apply_at(&rule, "  OldWidget w;", 0),
        Some(TextReplacement::new("NewWidget", 2, 9))
    );
    assert!(!rule.in_directives());
    assert!(RenameToken::new("A", "B").with_directives(true).in_directives());
}

#[test]
fn rename_to_itself_is_no_edit() {
    let rule = RenameToken::new("Same", "Same");
    assert_eq!(apply_at(&rule, "Same x;", 0), None);
}

#[test]
fn scoped_rename_spans_qualified_name() {
    let rule = ScopedRename::new("Qt", "WFlags", "Qt::WindowFlags");
    assert_eq!(
        apply_at(&rule, "Qt::WFlags f;", 0),
        Some(TextReplacement::new("Qt::WindowFlags", 0, 10))
    );
    assert_eq!(
        apply_at(&rule, "x = Qt :: /* c */ WFlags;", 0),
        Some(TextReplacement::new("Qt::WindowFlags", 4, 20))
    );
}

#[test]
fn scoped_rename_needs_matching_context() {
    let rule = ScopedRename::new("Qt", "WFlags", "Qt::WindowFlags");
    assert_eq!(apply_at(&rule, "Qt::Other f;", 0), None);
    assert_eq!(apply_at(&rule, "Qt WFlags", 0), None);
    assert_eq!(apply_at(&rule, "Qt:WFlags", 0), None);
    assert_eq!(apply_at(&rule, "Qt::", 0), None);
    assert_eq!(apply_at(&rule, "Qt::\"WFlags\"", 0), None);
}

#[test]
fn context_navigation() {
    let stream = lex("x.cpp", "a ->  b /* c */ ::c");
    let ctx = MatchContext::new(&stream, 0);
    let arrow = ctx.next_significant(0);
    assert_eq!(arrow.and_then(|i| ctx.punct_at(i)), Some(Punct::Arrow));
    let b = arrow.and_then(|i| ctx.next_significant(i));
    assert_eq!(b.map(|i| stream.text_at(i)), Some("b"));
    let colons = b.and_then(|i| ctx.next_significant(i));
    assert_eq!(colons.and_then(|i| ctx.punct_at(i)), Some(Punct::ColonColon));
    assert_eq!(colons.and_then(|i| ctx.prev_significant(i)), b);
    assert_eq!(ctx.prev_significant(0), None);
    assert_eq!(ctx.text(), "a");
}

#[test]
fn table_groups_by_trigger_in_order() {
    let mut table = RuleTable::new();
    table.add(ScopedRename::new("Qt", "WFlags", "Qt::WindowFlags"));
    table.add(RenameToken::new("Qt", "Qt5"));
    table.add(RenameToken::new("QString", "String"));

    assert_eq!(table.len(), 3);
    let triggers: Vec<&str> = table.candidates("Qt").iter().map(|r| r.trigger()).collect();
    assert_eq!(triggers, vec!["Qt", "Qt"]);
    assert!(table.candidates("Nothing").is_empty());
}
