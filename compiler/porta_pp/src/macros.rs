//! Macro definitions and the environment they live in.

use porta_lexer::{lex, Punct, TokenKind, TokenStream};
use rustc_hash::FxHashMap;

use crate::TokenRange;

/// A significant token detached from its source buffer.
///
/// Multi-character operators are folded into one token (`kind` is the
/// operator, `text` its full spelling), trivia and newlines are dropped.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct MacroToken {
    pub kind: TokenKind,
    pub text: String,
}

impl MacroToken {
    pub fn new(kind: TokenKind, text: impl Into<String>) -> Self {
        MacroToken {
            kind,
            text: text.into(),
        }
    }

    pub fn is_punct(&self, punct: Punct) -> bool {
        self.kind == TokenKind::Punct(punct)
    }

    pub fn is_identifier(&self) -> bool {
        self.kind == TokenKind::Identifier
    }
}

/// Significant tokens of `range` in `stream`, with operators folded.
pub fn significant_tokens(stream: &TokenStream, range: TokenRange) -> Vec<MacroToken> {
    let mut out: Vec<MacroToken> = Vec::new();
    for index in range.indices() {
        let Some(token) = stream.get(index) else {
            break;
        };
        match token.kind {
            TokenKind::Newline => {}
            kind if kind.is_trivia() => {}
            TokenKind::Joint => {
                if let Some(last) = out.last_mut() {
                    last.text.push_str(stream.text_of(token));
                }
            }
            kind => out.push(MacroToken::new(kind, stream.text_of(token))),
        }
    }
    out
}

/// One macro definition.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub enum MacroDef {
    /// `#define NAME body`
    Object { body: Vec<MacroToken> },
    /// `#define NAME(params) body`
    Function {
        params: Vec<String>,
        variadic: bool,
        body: Vec<MacroToken>,
    },
}

impl MacroDef {
    pub fn body(&self) -> &[MacroToken] {
        match self {
            MacroDef::Object { body } | MacroDef::Function { body, .. } => body,
        }
    }

    /// Body uses stringizing `#` or token pasting `##`; such macros are
    /// never expanded.
    pub fn uses_unsupported_operators(&self) -> bool {
        self.body()
            .iter()
            .any(|t| t.is_punct(Punct::Hash) || t.is_punct(Punct::HashHash))
    }
}

/// Mapping from macro name to its live definition.
///
/// Redefinition replaces, `undef` removes; a name has at most one
/// definition at a time.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MacroEnv {
    defs: FxHashMap<String, MacroDef>,
}

impl MacroEnv {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn define(&mut self, name: impl Into<String>, def: MacroDef) -> Option<MacroDef> {
        self.defs.insert(name.into(), def)
    }

    /// Define an object-like macro whose body is lexed from `body`.
    pub fn define_object(&mut self, name: impl Into<String>, body: &str) -> Option<MacroDef> {
        let body = lex_body(body);
        self.define(name, MacroDef::Object { body })
    }

    /// Define a function-like macro whose body is lexed from `body`.
    /// A trailing `...` parameter makes it variadic.
    pub fn define_function<P>(
        &mut self,
        name: impl Into<String>,
        params: impl IntoIterator<Item = P>,
        body: &str,
    ) -> Option<MacroDef>
    where
        P: Into<String>,
    {
        let mut params: Vec<String> = params.into_iter().map(Into::into).collect();
        let variadic = params.last().is_some_and(|p| p == "...");
        if variadic {
            params.pop();
        }
        let body = lex_body(body);
        self.define(
            name,
            MacroDef::Function {
                params,
                variadic,
                body,
            },
        )
    }

    /// Define from a command-line style head: `NAME` or `NAME(a, b)`.
    ///
    /// Returns the defined name, or `None` when `head` is not a valid
    /// macro head.
    pub fn define_from_source(&mut self, head: &str, body: &str) -> Option<String> {
        let head = head.trim();
        match head.split_once('(') {
            None => {
                if !is_identifier(head) {
                    return None;
                }
                self.define_object(head, body);
                Some(head.to_owned())
            }
            Some((name, rest)) => {
                let params = rest.strip_suffix(')')?;
                if !is_identifier(name) {
                    return None;
                }
                let params: Vec<&str> = if params.trim().is_empty() {
                    Vec::new()
                } else {
                    params.split(',').map(str::trim).collect()
                };
                let all_valid = params.iter().enumerate().all(|(i, p)| {
                    is_identifier(p) || (*p == "..." && i + 1 == params.len())
                });
                if !all_valid {
                    return None;
                }
                self.define_function(name, params, body);
                Some(name.to_owned())
            }
        }
    }

    pub fn undef(&mut self, name: &str) -> Option<MacroDef> {
        self.defs.remove(name)
    }

    pub fn get(&self, name: &str) -> Option<&MacroDef> {
        self.defs.get(name)
    }

    pub fn is_defined(&self, name: &str) -> bool {
        self.defs.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.defs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.defs.is_empty()
    }

    /// Defined names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.defs.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

/// Lex a body given outside any source file. A leading `#` would otherwise
/// read as a directive start.
fn lex_body(body: &str) -> Vec<MacroToken> {
    let stream = lex("<macro>", body);
    let mut tokens = significant_tokens(&stream, TokenRange::all(&stream));
    for token in &mut tokens {
        token.kind = match token.kind {
            TokenKind::DirectiveStart => TokenKind::Punct(Punct::Hash),
            TokenKind::Directive(_) => TokenKind::Identifier,
            kind => kind,
        };
    }
    tokens
}

fn is_identifier(text: &str) -> bool {
    let mut chars = text.chars();
    chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

#[cfg(test)]
mod tests;
