//! Directive classification pass.
//!
//! Re-labels the primitive kinds produced by [`tokenize`](crate::tokenize)
//! in place:
//!
//! - the identifier following a line-start `#` (modulo trivia) becomes a
//!   [`TokenKind::Directive`] when it names a known directive;
//! - `defined` becomes a directive keyword anywhere on an `#if`/`#elif` line;
//! - runs of adjacent punctuation spelling a multi-character operator get the
//!   operator on the first token and [`TokenKind::Joint`] on the rest.
//!
//! Boundaries never move.

use crate::{lookup_directive, DirectiveKeyword, Punct, TokenKind, TokenStream};

#[derive(Copy, Clone, Eq, PartialEq, Debug)]
enum LineState {
    /// Nothing significant seen on this line yet.
    Start,
    /// Directive `#` seen, waiting for its name.
    AfterHash,
    /// Inside a directive line; `None` when the name was unknown or absent.
    InDirective(Option<DirectiveKeyword>),
    /// Ordinary source line.
    Normal,
}

/// Classify `stream` in place.
pub fn classify(stream: &mut TokenStream) {
    let kinds = relabel_directives(stream);
    let kinds = merge_operators(stream, kinds);
    for (token, kind) in stream.tokens_mut().iter_mut().zip(kinds) {
        token.kind = kind;
    }
}

fn relabel_directives(stream: &TokenStream) -> Vec<TokenKind> {
    let mut kinds = Vec::with_capacity(stream.len());
    let mut state = LineState::Start;

    for token in stream.tokens() {
        let mut kind = token.kind;
        match kind {
            TokenKind::Newline => state = LineState::Start,
            k if k.is_trivia() => {}
            TokenKind::DirectiveStart => state = LineState::AfterHash,
            TokenKind::Identifier => match state {
                LineState::AfterHash => {
                    let keyword = lookup_directive(stream.text_of(token));
                    if let Some(keyword) = keyword {
                        kind = TokenKind::Directive(keyword);
                    }
                    state = LineState::InDirective(keyword);
                }
                LineState::InDirective(Some(keyword))
                    if keyword.takes_expression() && stream.text_of(token) == "defined" =>
                {
                    kind = TokenKind::Directive(DirectiveKeyword::Defined);
                }
                LineState::Start => state = LineState::Normal,
                LineState::InDirective(_) | LineState::Normal => {}
            },
            _ => match state {
                LineState::AfterHash => state = LineState::InDirective(None),
                LineState::Start => state = LineState::Normal,
                LineState::InDirective(_) | LineState::Normal => {}
            },
        }
        kinds.push(kind);
    }

    kinds
}

fn merge_operators(stream: &TokenStream, mut kinds: Vec<TokenKind>) -> Vec<TokenKind> {
    let text = stream.text().as_bytes();
    let tokens = stream.tokens();

    // Single-character punctuation only; a `DirectiveStart` never joins.
    let is_single = |kinds: &[TokenKind], i: usize| {
        matches!(kinds.get(i), Some(TokenKind::Punct(p)) if p.width() == 1)
            && tokens.get(i).is_some_and(|t| t.len == 1)
    };

    let mut i = 0;
    while i < tokens.len() {
        if !is_single(&kinds, i) {
            i += 1;
            continue;
        }

        let mut run = 1;
        while run < 3 && is_single(&kinds, i + run) {
            run += 1;
        }

        let start = tokens[i].offset as usize;
        let merged = (2..=run).rev().find_map(|width| {
            Punct::compound(&text[start..start + width]).map(|punct| (punct, width))
        });

        match merged {
            Some((punct, width)) => {
                kinds[i] = TokenKind::Punct(punct);
                for kind in &mut kinds[i + 1..i + width] {
                    *kind = TokenKind::Joint;
                }
                i += width;
            }
            None => i += 1,
        }
    }

    kinds
}
