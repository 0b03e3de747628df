//! Hand-written raw scanner producing `(RawTag, len)` pairs.
//!
//! # Design
//!
//! Every byte value maps to a [`ByteClass`] through the 256-entry
//! [`BYTE_CLASS`] table. [`RawScanner::next_token`] dispatches on the class
//! of the current byte; each arm consumes one maximal run of a primitive
//! kind and returns its length. The sentinel byte naturally lands in
//! [`ByteClass::Nul`], which becomes `Eof` at the end of input.
//!
//! The single correctness property that matters most here is literal
//! handling: a backslash inside a quoted literal always escapes the next
//! byte, so `"a\"b"` is one token and the quote in the middle never ends it.

use crate::cursor::Cursor;
use crate::tag::{RawTag, RawToken};
use crate::SourceBuffer;

/// Dispatch category of a single byte.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum ByteClass {
    /// Space, tab, vertical tab, form feed.
    Space,
    /// `\r` (newline when followed by `\n`, whitespace otherwise).
    CarriageReturn,
    /// `\n`.
    LineFeed,
    /// `A-Z`, `a-z`, `_`, `$`.
    IdentStart,
    /// `0-9`.
    Digit,
    /// `"`.
    DoubleQuote,
    /// `'`.
    SingleQuote,
    /// `/` (comment or division).
    Slash,
    /// `#`.
    Hash,
    /// `\\` (line continuation or stray).
    Backslash,
    /// Leading byte of a multi-byte UTF-8 sequence.
    Utf8Lead,
    /// `0x00` (sentinel at EOF, interior NUL otherwise).
    Nul,
    /// Everything else: punctuation, control bytes, stray continuation bytes.
    Other,
}

const fn classify_byte(b: u8) -> ByteClass {
    match b {
        0 => ByteClass::Nul,
        b' ' | b'\t' | 0x0b | 0x0c => ByteClass::Space,
        b'\r' => ByteClass::CarriageReturn,
        b'\n' => ByteClass::LineFeed,
        b'a'..=b'z' | b'A'..=b'Z' | b'_' | b'$' => ByteClass::IdentStart,
        b'0'..=b'9' => ByteClass::Digit,
        b'"' => ByteClass::DoubleQuote,
        b'\'' => ByteClass::SingleQuote,
        b'/' => ByteClass::Slash,
        b'#' => ByteClass::Hash,
        b'\\' => ByteClass::Backslash,
        0xc0..=0xff => ByteClass::Utf8Lead,
        _ => ByteClass::Other,
    }
}

const fn build_byte_class_table() -> [ByteClass; 256] {
    let mut table = [ByteClass::Other; 256];
    let mut i = 0;
    while i < 256 {
        table[i] = classify_byte(i as u8);
        i += 1;
    }
    table
}

/// Byte → dispatch class, indexed by byte value.
pub static BYTE_CLASS: [ByteClass; 256] = build_byte_class_table();

#[inline]
fn is_ident_continue(b: u8) -> bool {
    matches!(BYTE_CLASS[b as usize], ByteClass::IdentStart | ByteClass::Digit)
}

/// Allocation-free scanner over one source buffer.
///
/// Produces one token per call. There is no error channel: malformed input
/// still yields tokens that cover it exactly.
pub struct RawScanner<'a> {
    cursor: Cursor<'a>,
}

impl<'a> RawScanner<'a> {
    pub fn new(cursor: Cursor<'a>) -> Self {
        Self { cursor }
    }

    /// Produce the next raw token.
    ///
    /// Returns `RawTag::Eof` with `len == 0` once the source is exhausted,
    /// and keeps returning it on further calls.
    #[inline]
    pub fn next_token(&mut self) -> RawToken {
        let start = self.cursor.pos();
        match BYTE_CLASS[self.cursor.current() as usize] {
            ByteClass::Nul => self.nul(start),
            ByteClass::Space => self.whitespace(start),
            ByteClass::CarriageReturn => self.carriage_return(start),
            ByteClass::LineFeed => self.single(start, RawTag::Newline),
            ByteClass::IdentStart => self.identifier(start),
            ByteClass::Digit => self.number(start),
            ByteClass::DoubleQuote => self.literal(start, b'"', RawTag::String),
            ByteClass::SingleQuote => self.literal(start, b'\'', RawTag::Char),
            ByteClass::Slash => self.slash_or_comment(start),
            ByteClass::Hash => self.single(start, RawTag::Hash),
            ByteClass::Backslash => self.backslash(start),
            ByteClass::Utf8Lead => self.utf8_scalar(start),
            ByteClass::Other => self.single(start, RawTag::Other),
        }
    }

    #[inline]
    fn token(&self, tag: RawTag, start: u32) -> RawToken {
        RawToken {
            tag,
            len: self.cursor.pos() - start,
        }
    }

    fn single(&mut self, start: u32, tag: RawTag) -> RawToken {
        self.cursor.advance();
        self.token(tag, start)
    }

    // ─── EOF & stray bytes ─────────────────────────────────────────

    fn nul(&mut self, start: u32) -> RawToken {
        if self.cursor.is_eof() {
            RawToken {
                tag: RawTag::Eof,
                len: 0,
            }
        } else {
            self.single(start, RawTag::Other)
        }
    }

    /// One whole UTF-8 scalar value, so that token boundaries always fall
    /// on character boundaries of the original `&str`.
    fn utf8_scalar(&mut self, start: u32) -> RawToken {
        self.cursor.advance();
        self.cursor.eat_while(|b| (0x80..0xc0).contains(&b));
        self.token(RawTag::Other, start)
    }

    // ─── Whitespace & line structure ───────────────────────────────

    fn whitespace(&mut self, start: u32) -> RawToken {
        self.cursor.eat_while(|b| {
            matches!(b, b' ' | b'\t' | 0x0b | 0x0c)
        });
        self.token(RawTag::Whitespace, start)
    }

    fn carriage_return(&mut self, start: u32) -> RawToken {
        self.cursor.advance();
        if self.cursor.current() == b'\n' && !self.cursor.is_eof() {
            self.cursor.advance();
            self.token(RawTag::Newline, start)
        } else {
            self.token(RawTag::Whitespace, start)
        }
    }

    fn backslash(&mut self, start: u32) -> RawToken {
        self.cursor.advance();
        match (self.cursor.current(), self.cursor.peek()) {
            (b'\n', _) => {
                self.cursor.advance();
                self.token(RawTag::LineContinuation, start)
            }
            (b'\r', b'\n') => {
                self.cursor.advance_n(2);
                self.token(RawTag::LineContinuation, start)
            }
            _ => self.token(RawTag::Other, start),
        }
    }

    // ─── Comments ──────────────────────────────────────────────────

    fn slash_or_comment(&mut self, start: u32) -> RawToken {
        self.cursor.advance();
        match self.cursor.current() {
            b'/' => {
                self.cursor.eat_until_newline_or_eof();
                self.token(RawTag::LineComment, start)
            }
            b'*' => {
                self.cursor.advance();
                self.cursor.eat_block_comment_body();
                self.token(RawTag::BlockComment, start)
            }
            _ => self.token(RawTag::Other, start),
        }
    }

    // ─── Identifiers & numbers ─────────────────────────────────────

    fn identifier(&mut self, start: u32) -> RawToken {
        self.cursor.advance();
        self.cursor.eat_while(is_ident_continue);
        self.token(RawTag::Ident, start)
    }

    /// Preprocessing number: `digit (digit | letter | _ | . | [eEpP][+-])*`.
    fn number(&mut self, start: u32) -> RawToken {
        self.cursor.advance();
        loop {
            let b = self.cursor.current();
            if self.cursor.is_eof() {
                break;
            }
            if matches!(b, b'e' | b'E' | b'p' | b'P') && matches!(self.cursor.peek(), b'+' | b'-')
            {
                self.cursor.advance_n(2);
            } else if is_ident_continue(b) || b == b'.' {
                self.cursor.advance();
            } else {
                break;
            }
        }
        self.token(RawTag::Number, start)
    }

    // ─── Literals ──────────────────────────────────────────────────

    /// Quoted literal. Ends after the matching quote, before an unescaped
    /// line break, or at EOF.
    fn literal(&mut self, start: u32, quote: u8, tag: RawTag) -> RawToken {
        self.cursor.advance(); // opening quote
        loop {
            match self.cursor.skip_to_literal_delim(quote) {
                0 => return self.token(tag, start),
                b'\\' => {
                    self.cursor.advance();
                    if self.cursor.is_eof() {
                        return self.token(tag, start);
                    }
                    // An escaped CRLF is one line break.
                    if self.cursor.current() == b'\r' && self.cursor.peek() == b'\n' {
                        self.cursor.advance();
                    }
                    self.cursor.advance();
                }
                b'\n' => {
                    // A '\r' right before the break belongs to the newline token.
                    let end = self.cursor.pos();
                    if end > start + 1 && self.cursor.slice(end - 1, end) == b"\r" {
                        self.cursor.retreat(1);
                    }
                    return self.token(tag, start);
                }
                _ => {
                    self.cursor.advance(); // closing quote
                    return self.token(tag, start);
                }
            }
        }
    }
}

/// Scan all of `source` into raw tokens, excluding the trailing `Eof`.
pub fn tokenize(source: &str) -> Vec<RawToken> {
    let buf = SourceBuffer::new(source);
    let mut scanner = RawScanner::new(buf.cursor());
    let mut tokens = Vec::with_capacity(source.len() / 3 + 1);
    loop {
        let token = scanner.next_token();
        if token.tag == RawTag::Eof {
            break;
        }
        tokens.push(token);
    }
    tokens
}
