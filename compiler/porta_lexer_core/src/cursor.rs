//! Cursor over a sentinel-terminated buffer.
//!
//! EOF is the sentinel byte (`0x00`) at or past the source length. A NUL at
//! `pos < source_len` is an ordinary (if odd) source byte.

/// Byte cursor created by [`SourceBuffer::cursor()`](crate::SourceBuffer::cursor).
///
/// The cursor is [`Copy`], so callers can snapshot it for lookahead.
///
/// # Invariant
///
/// `buf[source_len] == 0` and every byte after it is `0`. Guaranteed by
/// [`SourceBuffer`](crate::SourceBuffer).
#[derive(Clone, Copy, Debug)]
pub struct Cursor<'a> {
    buf: &'a [u8],
    pos: u32,
    source_len: u32,
}

impl<'a> Cursor<'a> {
    pub(crate) fn new(buf: &'a [u8], source_len: u32) -> Self {
        debug_assert!(
            (source_len as usize) < buf.len(),
            "sentinel must be within buffer bounds"
        );
        debug_assert!(buf[source_len as usize] == 0, "sentinel byte must be 0x00");
        Self {
            buf,
            pos: 0,
            source_len,
        }
    }

    /// Byte at the current position (`0x00` at EOF).
    #[inline]
    pub fn current(&self) -> u8 {
        self.buf[self.pos as usize]
    }

    /// Byte one past the current position.
    #[inline]
    pub fn peek(&self) -> u8 {
        self.buf.get(self.pos as usize + 1).copied().unwrap_or(0)
    }

    /// Byte two past the current position.
    #[inline]
    pub fn peek2(&self) -> u8 {
        self.buf.get(self.pos as usize + 2).copied().unwrap_or(0)
    }

    #[inline]
    pub fn advance(&mut self) {
        self.pos += 1;
    }

    #[inline]
    pub fn advance_n(&mut self, n: u32) {
        self.pos += n;
    }

    /// Step back over `n` already-consumed bytes.
    #[inline]
    pub fn retreat(&mut self, n: u32) {
        debug_assert!(n <= self.pos, "cannot retreat before the start");
        self.pos -= n;
    }

    /// `true` once the cursor sits on the sentinel.
    #[inline]
    pub fn is_eof(&self) -> bool {
        self.pos >= self.source_len
    }

    #[inline]
    pub fn pos(&self) -> u32 {
        self.pos
    }

    #[inline]
    pub fn source_len(&self) -> u32 {
        self.source_len
    }

    /// Advance while `pred` holds for the current byte, never past EOF.
    #[inline]
    pub fn eat_while(&mut self, pred: impl Fn(u8) -> bool) {
        while !self.is_eof() && pred(self.current()) {
            self.pos += 1;
        }
    }

    /// Advance to the next `\n` (not consumed) or to EOF.
    ///
    /// A `\r` directly before the `\n` is left unconsumed as well, so CRLF
    /// line endings stay intact for the newline token.
    pub fn eat_until_newline_or_eof(&mut self) {
        let remaining = &self.buf[self.pos as usize..self.source_len as usize];
        match memchr::memchr(b'\n', remaining) {
            Some(offset) => {
                let mut end = offset;
                if end > 0 && remaining[end - 1] == b'\r' {
                    end -= 1;
                }
                self.pos += end as u32;
            }
            None => self.pos = self.source_len,
        }
    }

    /// Advance to the next occurrence of `quote`, `\\`, or `\n`, returning it.
    ///
    /// Returns `0` and leaves the cursor at EOF when none is found.
    pub fn skip_to_literal_delim(&mut self, quote: u8) -> u8 {
        let remaining = &self.buf[self.pos as usize..self.source_len as usize];
        match memchr::memchr3(quote, b'\\', b'\n', remaining) {
            Some(offset) => {
                self.pos += offset as u32;
                self.current()
            }
            None => {
                self.pos = self.source_len;
                0
            }
        }
    }

    /// Advance past the next `*/`, or to EOF when the comment never closes.
    ///
    /// Returns `true` when the terminator was found.
    pub fn eat_block_comment_body(&mut self) -> bool {
        let remaining = &self.buf[self.pos as usize..self.source_len as usize];
        match memchr::memmem::find(remaining, b"*/") {
            Some(offset) => {
                self.pos += offset as u32 + 2;
                true
            }
            None => {
                self.pos = self.source_len;
                false
            }
        }
    }

    /// Source bytes in `start..end`.
    pub fn slice(&self, start: u32, end: u32) -> &'a [u8] {
        &self.buf[start as usize..end.min(self.source_len) as usize]
    }
}
