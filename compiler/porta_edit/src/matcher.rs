//! Walks a classified token stream and asks the rule table about each
//! identifier.

use porta_lexer::{DirectiveKeyword, TokenKind, TokenStream};
use tracing::trace;

use crate::{EditSet, MatchContext, RuleTable};

#[derive(Copy, Clone, Eq, PartialEq, Debug)]
enum Line {
    Code,
    Directive,
    /// Header names are handled by `rewrite_includes`; nothing here
    /// touches an include line.
    Include,
}

/// Token-rule matcher over one stream.
#[derive(Copy, Clone, Debug)]
pub struct ReplacementMatcher<'r> {
    rules: &'r RuleTable,
}

impl<'r> ReplacementMatcher<'r> {
    pub fn new(rules: &'r RuleTable) -> Self {
        ReplacementMatcher { rules }
    }

    /// Match every identifier in the stream.
    pub fn match_stream(&self, stream: &TokenStream) -> EditSet {
        self.match_where(stream, |_| true)
    }

    /// Match only identifiers whose token index passes `allow`.
    ///
    /// The first candidate rule that produces an edit wins; tokens covered
    /// by that edit are not offered to any rule.
    pub fn match_where(&self, stream: &TokenStream, mut allow: impl FnMut(usize) -> bool) -> EditSet {
        let mut edits = EditSet::new();
        if self.rules.is_empty() {
            return edits;
        }

        let mut line = Line::Code;
        let mut covered_until = 0u32;
        for (index, token) in stream.tokens().iter().enumerate() {
            match token.kind {
                TokenKind::Newline => {
                    line = Line::Code;
                    continue;
                }
                TokenKind::DirectiveStart => {
                    line = Line::Directive;
                    continue;
                }
                TokenKind::Directive(DirectiveKeyword::Include) if line == Line::Directive => {
                    line = Line::Include;
                    continue;
                }
                TokenKind::Identifier => {}
                _ => continue,
            }
            if line == Line::Include || token.offset < covered_until || !allow(index) {
                continue;
            }

            let candidates = self.rules.candidates(stream.text_of(token));
            if candidates.is_empty() {
                continue;
            }
            let ctx = MatchContext::new(stream, index);
            let in_directive = line == Line::Directive;
            let Some(replacement) = candidates
                .iter()
                .filter(|rule| !in_directive || rule.in_directives())
                .find_map(|rule| rule.apply(&ctx))
            else {
                continue;
            };

            trace!(
                offset = replacement.position,
                len = replacement.current_length,
                new_text = %replacement.new_text,
                "token rule matched"
            );
            covered_until = replacement.end();
            edits.insert_replacement(replacement);
        }
        edits
    }
}

/// Match all identifiers in `stream` against `rules`.
pub fn match_tokens(stream: &TokenStream, rules: &RuleTable) -> EditSet {
    ReplacementMatcher::new(rules).match_stream(stream)
}

#[cfg(test)]
mod tests;
