use pretty_assertions::assert_eq;

use super::*;

fn kinds(stream: &TokenStream) -> Vec<TokenKind> {
    stream.tokens().iter().map(|t| t.kind).collect()
}

#[test]
fn tokens_cover_text() {
    let text = "#include <a.h>\nint x = 1; // c\n";
    let stream = tokenize("a.cpp", text);
    let mut expected_offset = 0;
    for token in stream.tokens() {
        assert_eq!(token.offset, expected_offset);
        assert!(token.len > 0);
        expected_offset = token.end();
    }
    assert_eq!(expected_offset as usize, text.len());
}

#[test]
fn hash_at_line_start_is_directive_start() {
    let stream = tokenize("x.h", "  # define A\nB # C\n/* c */ #if 1\n");
    let hashes: Vec<TokenKind> = stream
        .tokens()
        .iter()
        .filter(|t| stream.text_of(t) == "#")
        .map(|t| t.kind)
        .collect();
    assert_eq!(
        hashes,
        vec![
            TokenKind::DirectiveStart,
            TokenKind::Punct(Punct::Hash),
            TokenKind::DirectiveStart,
        ]
    );
}

#[test]
fn punctuation_and_other() {
    let stream = tokenize("x.h", "a;@");
    assert_eq!(
        kinds(&stream),
        vec![
            TokenKind::Identifier,
            TokenKind::Punct(Punct::Semi),
            TokenKind::Other,
        ]
    );
}

#[test]
fn line_numbers() {
    let stream = tokenize("x.h", "a\n/* b\nc */ d\r\ne");
    assert_eq!(stream.line_of(0), 1);
    let d = stream.tokens().iter().find(|t| stream.text_of(t) == "d");
    assert_eq!(d.map(|t| stream.line_of(t.offset)), Some(3));
    let e = stream.tokens().iter().find(|t| stream.text_of(t) == "e");
    assert_eq!(e.map(|t| stream.line_of(t.offset)), Some(4));
}

#[test]
fn index_at_offset() {
    let stream = tokenize("x.h", "ab cd");
    assert_eq!(stream.index_at(0), 0);
    assert_eq!(stream.index_at(2), 1);
    assert_eq!(stream.index_at(3), 2);
    assert_eq!(stream.index_at(99), 3);
}

#[test]
fn text_at_out_of_range_is_empty() {
    let stream = tokenize("x.h", "a");
    assert_eq!(stream.text_at(0), "a");
    assert_eq!(stream.text_at(5), "");
}
