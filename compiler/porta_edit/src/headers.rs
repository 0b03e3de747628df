//! Include-directive header renaming.

use porta_lexer::{DirectiveKeyword, TokenKind, TokenStream};
use porta_pp::include_operand;
use rustc_hash::FxHashMap;
use tracing::trace;

use crate::EditSet;

/// Legacy header name to replacement header name.
///
/// Names are compared exactly as written between the delimiters, so
/// `"QtGui/qwidget.h"` and `"qwidget.h"` are distinct keys.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct HeaderRules {
    map: FxHashMap<String, String>,
}

impl HeaderRules {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the previous replacement for `legacy`, if any.
    pub fn insert(&mut self, legacy: impl Into<String>, replacement: impl Into<String>) -> Option<String> {
        self.map.insert(legacy.into(), replacement.into())
    }

    pub fn get(&self, legacy: &str) -> Option<&str> {
        self.map.get(legacy).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for HeaderRules {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut rules = HeaderRules::new();
        for (legacy, replacement) in iter {
            rules.insert(legacy, replacement);
        }
        rules
    }
}

/// One edit per `#include` whose header name has a replacement. Only the
/// name between the delimiters is replaced; the delimiter style is kept.
pub fn rewrite_includes(stream: &TokenStream, rules: &HeaderRules) -> EditSet {
    let mut edits = EditSet::new();
    if rules.is_empty() {
        return edits;
    }
    for (index, token) in stream.tokens().iter().enumerate() {
        if token.kind != TokenKind::Directive(DirectiveKeyword::Include) {
            continue;
        }
        let Some(operand) = include_operand(stream, index) else {
            continue;
        };
        match rules.get(&operand.name) {
            Some(replacement) if replacement != operand.name => {
                trace!(from = %operand.name, to = replacement, "header renamed");
                edits.insert(replacement, operand.name_offset, operand.name_len);
            }
            _ => {}
        }
    }
    edits
}

#[cfg(test)]
mod tests;
