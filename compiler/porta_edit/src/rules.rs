//! Token-triggered replacement rules.

use porta_lexer::{Punct, Token, TokenKind, TokenStream};
use rustc_hash::FxHashMap;

use crate::TextReplacement;

/// The token a rule is asked about, with access to its neighbours.
#[derive(Copy, Clone, Debug)]
pub struct MatchContext<'s> {
    stream: &'s TokenStream,
    index: usize,
}

impl<'s> MatchContext<'s> {
    pub fn new(stream: &'s TokenStream, index: usize) -> Self {
        MatchContext { stream, index }
    }

    pub fn stream(&self) -> &'s TokenStream {
        self.stream
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn token(&self) -> Option<&'s Token> {
        self.stream.get(self.index)
    }

    pub fn text(&self) -> &'s str {
        self.stream.text_at(self.index)
    }

    /// Next token after `from` that is not trivia, a newline, or the tail
    /// of an operator.
    pub fn next_significant(&self, from: usize) -> Option<usize> {
        let tokens = self.stream.tokens();
        (from + 1..tokens.len()).find(|&i| is_significant(tokens[i].kind))
    }

    /// Previous significant token before `from`.
    pub fn prev_significant(&self, from: usize) -> Option<usize> {
        let tokens = self.stream.tokens();
        (0..from.min(tokens.len()))
            .rev()
            .find(|&i| is_significant(tokens[i].kind))
    }

    pub fn punct_at(&self, index: usize) -> Option<Punct> {
        match self.stream.get(index)?.kind {
            TokenKind::Punct(punct) => Some(punct),
            _ => None,
        }
    }
}

fn is_significant(kind: TokenKind) -> bool {
    !kind.is_trivia() && !matches!(kind, TokenKind::Newline | TokenKind::Joint)
}

/// A rule triggered by an identifier's exact text.
pub trait TokenRule {
    /// Identifier text that makes this rule a candidate.
    fn trigger(&self) -> &str;

    /// Whether the rule also applies on preprocessor directive lines.
    fn in_directives(&self) -> bool {
        false
    }

    /// The edit to make at `ctx`, or `None` when the context does not fit.
    fn apply(&self, ctx: &MatchContext<'_>) -> Option<TextReplacement>;
}

/// Rename an identifier.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RenameToken {
    from: String,
    to: String,
    in_directives: bool,
}

impl RenameToken {
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        RenameToken {
            from: from.into(),
            to: to.into(),
            in_directives: false,
        }
    }

    #[must_use]
    pub fn with_directives(mut self, enabled: bool) -> Self {
        self.in_directives = enabled;
        self
    }
}

impl TokenRule for RenameToken {
    fn trigger(&self) -> &str {
        &self.from
    }

    fn in_directives(&self) -> bool {
        self.in_directives
    }

    fn apply(&self, ctx: &MatchContext<'_>) -> Option<TextReplacement> {
        if self.from == self.to {
            return None;
        }
        let token = ctx.token()?;
        Some(TextReplacement::new(self.to.clone(), token.offset, token.len))
    }
}

/// Rewrite `scope::name` (any spacing around `::`) to `to`, replacing the
/// whole qualified span.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScopedRename {
    scope: String,
    name: String,
    to: String,
    in_directives: bool,
}

impl ScopedRename {
    pub fn new(scope: impl Into<String>, name: impl Into<String>, to: impl Into<String>) -> Self {
        ScopedRename {
            scope: scope.into(),
            name: name.into(),
            to: to.into(),
            in_directives: false,
        }
    }

    #[must_use]
    pub fn with_directives(mut self, enabled: bool) -> Self {
        self.in_directives = enabled;
        self
    }
}

impl TokenRule for ScopedRename {
    fn trigger(&self) -> &str {
        &self.scope
    }

    fn in_directives(&self) -> bool {
        self.in_directives
    }

    fn apply(&self, ctx: &MatchContext<'_>) -> Option<TextReplacement> {
        let scope = ctx.token()?;
        let colons = ctx.next_significant(ctx.index())?;
        if ctx.punct_at(colons)? != Punct::ColonColon {
            return None;
        }
        let name_index = ctx.next_significant(colons)?;
        let name = ctx.stream().get(name_index)?;
        if name.kind != TokenKind::Identifier || ctx.stream().text_of(name) != self.name {
            return None;
        }
        Some(TextReplacement::new(
            self.to.clone(),
            scope.offset,
            name.end() - scope.offset,
        ))
    }
}

/// Rules indexed by trigger text. Several rules may share a trigger; they
/// are consulted in insertion order.
#[derive(Default)]
pub struct RuleTable {
    by_trigger: FxHashMap<String, Vec<Box<dyn TokenRule>>>,
    len: usize,
}

impl RuleTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, rule: impl TokenRule + 'static) {
        self.add_boxed(Box::new(rule));
    }

    pub fn add_boxed(&mut self, rule: Box<dyn TokenRule>) {
        self.by_trigger
            .entry(rule.trigger().to_owned())
            .or_default()
            .push(rule);
        self.len += 1;
    }

    /// Rules triggered by `text`, in insertion order.
    pub fn candidates(&self, text: &str) -> &[Box<dyn TokenRule>] {
        self.by_trigger.get(text).map_or(&[], Vec::as_slice)
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

impl std::fmt::Debug for RuleTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut triggers: Vec<&str> = self.by_trigger.keys().map(String::as_str).collect();
        triggers.sort_unstable();
        f.debug_struct("RuleTable")
            .field("triggers", &triggers)
            .field("len", &self.len)
            .finish()
    }
}

#[cfg(test)]
mod tests;
