use pretty_assertions::assert_eq;

use super::*;

fn texts(tokens: &[MacroToken]) -> Vec<&str> {
    tokens.iter().map(|t| t.text.as_str()).collect()
}

#[test]
fn object_definition_is_lexed() {
    let mut env = MacroEnv::new();
    env.define_object("LIMIT", "(1 << 4) /* c */ + x->y");
    let def = env.get("LIMIT");
    assert_eq!(
        def.map(|d| texts(d.body())),
        Some(vec!["(", "1", "<<", "4", ")", "+", "x", "->", "y"])
    );
    assert_eq!(
        def.map(|d| d.body()[2].kind),
        Some(TokenKind::Punct(Punct::Shl))
    );
}

#[test]
fn define_replaces_and_undef_removes() {
    let mut env = MacroEnv::new();
    assert!(env.define_object("A", "1").is_none());
    assert!(env.define_object("A", "2").is_some());
    assert_eq!(env.len(), 1);
    assert_eq!(env.get("A").map(|d| texts(d.body())), Some(vec!["2"]));

    assert!(env.undef("A").is_some());
    assert!(!env.is_defined("A"));
    assert!(env.undef("A").is_none());
    assert!(env.is_empty());
}

#[test]
fn define_from_source_heads() {
    let mut env = MacroEnv::new();
    assert_eq!(env.define_from_source("DEBUG", ""), Some("DEBUG".to_owned()));
    assert_eq!(
        env.define_from_source("MAX(a, b)", "((a) > (b) ? (a) : (b))"),
        Some("MAX".to_owned())
    );
    assert_eq!(
        env.define_from_source("LOG(fmt, ...)", "0"),
        Some("LOG".to_owned())
    );
    assert_eq!(env.define_from_source("NOARGS()", "1"), Some("NOARGS".to_owned()));

    assert_eq!(
        env.get("MAX").map(|d| match d {
            MacroDef::Function { params, variadic, .. } => (params.clone(), *variadic),
            MacroDef::Object { .. } => (Vec::new(), false),
        }),
        Some((vec!["a".to_owned(), "b".to_owned()], false))
    );
    assert!(matches!(
        env.get("LOG"),
        Some(MacroDef::Function { variadic: true, params, .. }) if params.len() == 1
    ));
    assert_eq!(env.names(), vec!["DEBUG", "LOG", "MAX", "NOARGS"]);
}

#[test]
fn define_from_source_rejects_bad_heads() {
    let mut env = MacroEnv::new();
    assert_eq!(env.define_from_source("1X", "1"), None);
    assert_eq!(env.define_from_source("F(a", "1"), None);
    assert_eq!(env.define_from_source("F(a, 2)", "1"), None);
    assert_eq!(env.define_from_source("F(..., a)", "1"), None);
    assert_eq!(env.define_from_source("", "1"), None);
    assert!(env.is_empty());
}

#[test]
fn unsupported_operators_detected() {
    let mut env = MacroEnv::new();
    env.define_function("CAT", ["a", "b"], "a ## b");
    env.define_function("STR", ["a"], "# a");
    env.define_object("PLAIN", "a + b");
    assert_eq!(env.get("CAT").map(MacroDef::uses_unsupported_operators), Some(true));
    assert_eq!(env.get("STR").map(MacroDef::uses_unsupported_operators), Some(true));
    assert_eq!(env.get("PLAIN").map(MacroDef::uses_unsupported_operators), Some(false));
}
