/// Primitive token category produced by the [`RawScanner`](crate::RawScanner).
///
/// The scanner decides token *boundaries*; everything finer (operators,
/// directive keywords) is a re-labeling done later over the same offsets.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
#[repr(u8)]
pub enum RawTag {
    /// `[A-Za-z_$][A-Za-z0-9_$]*`
    Ident = 0,
    /// Preprocessing number: a digit followed by digits, letters, `_`, `.`,
    /// and signed exponents (`1e+5`, `0x1p-3`, `10UL`).
    Number = 1,
    /// Double-quoted literal, escapes honored.
    String = 2,
    /// Single-quoted literal, escapes honored.
    Char = 3,

    /// `//` up to (not including) the line break.
    LineComment = 16,
    /// `/* ... */`, possibly spanning lines.
    BlockComment = 17,

    /// Horizontal whitespace run (space, tab, vertical tab, form feed, lone `\r`).
    Whitespace = 32,
    /// `\n` or `\r\n`.
    Newline = 33,
    /// Backslash immediately followed by a line break.
    LineContinuation = 34,

    /// `#`. Whether it starts a directive is decided by the caller.
    Hash = 48,
    /// Any other single character (punctuation, stray bytes, one UTF-8 scalar).
    Other = 49,

    /// End of input. Always `len == 0`.
    Eof = 255,
}

impl RawTag {
    /// Returns `true` for whitespace-like tokens that never carry meaning.
    #[inline]
    pub fn is_trivia(self) -> bool {
        matches!(
            self,
            RawTag::Whitespace | RawTag::LineContinuation | RawTag::LineComment | RawTag::BlockComment
        )
    }

    /// Human-readable name, used in debug output.
    pub fn name(self) -> &'static str {
        match self {
            RawTag::Ident => "identifier",
            RawTag::Number => "number",
            RawTag::String => "string literal",
            RawTag::Char => "char literal",
            RawTag::LineComment => "line comment",
            RawTag::BlockComment => "block comment",
            RawTag::Whitespace => "whitespace",
            RawTag::Newline => "newline",
            RawTag::LineContinuation => "line continuation",
            RawTag::Hash => "#",
            RawTag::Other => "character",
            RawTag::Eof => "end of file",
        }
    }
}

/// One scanned token: its tag and byte length.
///
/// Positions are implicit; callers accumulate lengths to recover offsets.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct RawToken {
    pub tag: RawTag,
    pub len: u32,
}

const _: () = assert!(std::mem::size_of::<RawTag>() == 1);
