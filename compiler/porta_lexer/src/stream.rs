//! Position-addressed token stream for one file.

use std::ops::Range;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use porta_lexer_core::RawTag;

use crate::{Punct, TokenKind};

/// One lexical unit: a kind tag over `offset..offset + len` of the owning
/// stream's text.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct Token {
    pub kind: TokenKind,
    pub offset: u32,
    pub len: u32,
}

impl Token {
    #[inline]
    pub fn end(&self) -> u32 {
        self.offset + self.len
    }

    #[inline]
    pub fn range(&self) -> Range<usize> {
        self.offset as usize..self.end() as usize
    }
}

/// The tokens of one immutable source text.
///
/// Tokens are strictly increasing, non-overlapping, and cover the whole
/// text. The text is shared (`Arc<str>`) so active-token sequences can
/// keep it alive after the cache that produced it is gone.
#[derive(Clone, Debug)]
pub struct TokenStream {
    path: PathBuf,
    text: Arc<str>,
    tokens: Vec<Token>,
    /// Byte offset at which each line starts; `line_starts[0] == 0`.
    line_starts: Vec<u32>,
}

impl TokenStream {
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn shared_text(&self) -> Arc<str> {
        Arc::clone(&self.text)
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    pub(crate) fn tokens_mut(&mut self) -> &mut [Token] {
        &mut self.tokens
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Token> {
        self.tokens.get(index)
    }

    /// Source text covered by `token`.
    pub fn text_of(&self, token: &Token) -> &str {
        self.text.get(token.range()).unwrap_or("")
    }

    /// Source text covered by the token at `index` (empty when out of range).
    pub fn text_at(&self, index: usize) -> &str {
        self.tokens.get(index).map_or("", |t| self.text_of(t))
    }

    /// 1-based line number containing byte `offset`.
    pub fn line_of(&self, offset: u32) -> u32 {
        let line = match self.line_starts.binary_search(&offset) {
            Ok(exact) => exact,
            Err(insert) => insert - 1,
        };
        u32::try_from(line + 1).unwrap_or(u32::MAX)
    }

    /// Index of the first token starting at or after `offset`.
    pub fn index_at(&self, offset: u32) -> usize {
        self.tokens.partition_point(|t| t.offset < offset)
    }
}

/// Split `text` into primitive tokens.
///
/// Kinds at this stage are the primitive categories only. `#` becomes
/// [`TokenKind::DirectiveStart`] when it is the first non-trivia token of
/// its line and [`Punct::Hash`] otherwise. Single ASCII punctuation becomes
/// [`TokenKind::Punct`]; operator merging is left to
/// [`classify`](crate::classify).
pub fn tokenize(path: impl Into<PathBuf>, text: &str) -> TokenStream {
    let raw = porta_lexer_core::tokenize(text);
    let bytes = text.as_bytes();

    let mut tokens = Vec::with_capacity(raw.len());
    let mut line_starts = vec![0];
    let mut offset = 0u32;
    let mut at_line_start = true;

    for raw_token in raw {
        let kind = match raw_token.tag {
            RawTag::Ident => TokenKind::Identifier,
            RawTag::Number => TokenKind::Number,
            RawTag::String => TokenKind::StringLiteral,
            RawTag::Char => TokenKind::CharLiteral,
            RawTag::LineComment => TokenKind::LineComment,
            RawTag::BlockComment => TokenKind::BlockComment,
            RawTag::Whitespace => TokenKind::Whitespace,
            RawTag::LineContinuation => TokenKind::LineContinuation,
            RawTag::Newline => TokenKind::Newline,
            RawTag::Hash if at_line_start => TokenKind::DirectiveStart,
            RawTag::Hash => TokenKind::Punct(Punct::Hash),
            RawTag::Other if raw_token.len == 1 => Punct::from_byte(bytes[offset as usize])
                .map_or(TokenKind::Other, TokenKind::Punct),
            RawTag::Other | RawTag::Eof => TokenKind::Other,
        };

        if kind == TokenKind::Newline {
            at_line_start = true;
        } else if !kind.is_trivia() {
            at_line_start = false;
        }

        tokens.push(Token {
            kind,
            offset,
            len: raw_token.len,
        });
        offset += raw_token.len;

        // Newlines inside block comments and continued literals also start lines.
        let covered = &bytes[(offset - raw_token.len) as usize..offset as usize];
        for (i, &b) in covered.iter().enumerate() {
            if b == b'\n' {
                line_starts.push(offset - raw_token.len + i as u32 + 1);
            }
        }
    }

    TokenStream {
        path: path.into(),
        text: Arc::from(text),
        tokens,
        line_starts,
    }
}

#[cfg(test)]
mod tests;
