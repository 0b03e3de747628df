use std::fmt;

/// Kind tag of a [`Token`](crate::Token).
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum TokenKind {
    Identifier,
    /// A directive keyword: the identifier after a line-start `#`, or
    /// `defined` on an `#if`/`#elif` line.
    Directive(DirectiveKeyword),
    Number,
    StringLiteral,
    CharLiteral,
    LineComment,
    BlockComment,
    Whitespace,
    LineContinuation,
    Newline,
    /// `#` as the first significant token of a line.
    DirectiveStart,
    /// Punctuation. For multi-character operators this tags the first
    /// constituent token; see [`TokenKind::Joint`].
    Punct(Punct),
    /// Second or third character of a multi-character operator.
    Joint,
    /// Anything else: stray bytes, non-ASCII characters.
    Other,
}

impl TokenKind {
    /// Whitespace, comments and line continuations: tokens that never
    /// affect meaning and never end a directive line.
    #[inline]
    pub fn is_trivia(self) -> bool {
        matches!(
            self,
            TokenKind::Whitespace
                | TokenKind::LineContinuation
                | TokenKind::LineComment
                | TokenKind::BlockComment
        )
    }

    #[inline]
    pub fn is_literal(self) -> bool {
        matches!(self, TokenKind::StringLiteral | TokenKind::CharLiteral)
    }

    #[inline]
    pub fn is_comment(self) -> bool {
        matches!(self, TokenKind::LineComment | TokenKind::BlockComment)
    }
}

/// Preprocessor directive keywords.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum DirectiveKeyword {
    If,
    Ifdef,
    Ifndef,
    Elif,
    Else,
    Endif,
    Define,
    Undef,
    Include,
    Pragma,
    Error,
    Warning,
    Line,
    /// The `defined` operator inside a condition.
    Defined,
}

impl DirectiveKeyword {
    pub fn as_str(self) -> &'static str {
        match self {
            DirectiveKeyword::If => "if",
            DirectiveKeyword::Ifdef => "ifdef",
            DirectiveKeyword::Ifndef => "ifndef",
            DirectiveKeyword::Elif => "elif",
            DirectiveKeyword::Else => "else",
            DirectiveKeyword::Endif => "endif",
            DirectiveKeyword::Define => "define",
            DirectiveKeyword::Undef => "undef",
            DirectiveKeyword::Include => "include",
            DirectiveKeyword::Pragma => "pragma",
            DirectiveKeyword::Error => "error",
            DirectiveKeyword::Warning => "warning",
            DirectiveKeyword::Line => "line",
            DirectiveKeyword::Defined => "defined",
        }
    }

    /// `if`, `ifdef`, `ifndef`: directives that open a conditional group.
    #[inline]
    pub fn opens_group(self) -> bool {
        matches!(
            self,
            DirectiveKeyword::If | DirectiveKeyword::Ifdef | DirectiveKeyword::Ifndef
        )
    }

    /// `if` and `elif` carry an expression in which `defined` is an operator.
    #[inline]
    pub fn takes_expression(self) -> bool {
        matches!(self, DirectiveKeyword::If | DirectiveKeyword::Elif)
    }
}

impl fmt::Display for DirectiveKeyword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Punctuators and operators.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum Punct {
    // Single character
    LParen,
    RParen,
    LBracket,
    RBracket,
    LBrace,
    RBrace,
    Semi,
    Comma,
    Dot,
    Colon,
    Question,
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    Caret,
    Amp,
    Pipe,
    Tilde,
    Bang,
    Eq,
    Lt,
    Gt,
    Hash,
    Backslash,

    // Two characters
    ColonColon,
    EqEq,
    NotEq,
    AmpAmp,
    PipePipe,
    Shl,
    Shr,
    Arrow,
    LtEq,
    GtEq,
    PlusPlus,
    MinusMinus,
    PlusEq,
    MinusEq,
    StarEq,
    SlashEq,
    PercentEq,
    AmpEq,
    PipeEq,
    CaretEq,
    DotStar,
    HashHash,

    // Three characters
    Ellipsis,
    ShlEq,
    ShrEq,
    ArrowStar,
}

impl Punct {
    /// Single-character punctuator for `b`, if any.
    pub fn from_byte(b: u8) -> Option<Punct> {
        Some(match b {
            b'(' => Punct::LParen,
            b')' => Punct::RParen,
            b'[' => Punct::LBracket,
            b']' => Punct::RBracket,
            b'{' => Punct::LBrace,
            b'}' => Punct::RBrace,
            b';' => Punct::Semi,
            b',' => Punct::Comma,
            b'.' => Punct::Dot,
            b':' => Punct::Colon,
            b'?' => Punct::Question,
            b'+' => Punct::Plus,
            b'-' => Punct::Minus,
            b'*' => Punct::Star,
            b'/' => Punct::Slash,
            b'%' => Punct::Percent,
            b'^' => Punct::Caret,
            b'&' => Punct::Amp,
            b'|' => Punct::Pipe,
            b'~' => Punct::Tilde,
            b'!' => Punct::Bang,
            b'=' => Punct::Eq,
            b'<' => Punct::Lt,
            b'>' => Punct::Gt,
            b'#' => Punct::Hash,
            b'\\' => Punct::Backslash,
            _ => return None,
        })
    }

    /// Multi-character operator spelled exactly by `bytes` (2 or 3 bytes).
    pub fn compound(bytes: &[u8]) -> Option<Punct> {
        Some(match bytes {
            b"..." => Punct::Ellipsis,
            b"<<=" => Punct::ShlEq,
            b">>=" => Punct::ShrEq,
            b"->*" => Punct::ArrowStar,
            b"::" => Punct::ColonColon,
            b"==" => Punct::EqEq,
            b"!=" => Punct::NotEq,
            b"&&" => Punct::AmpAmp,
            b"||" => Punct::PipePipe,
            b"<<" => Punct::Shl,
            b">>" => Punct::Shr,
            b"->" => Punct::Arrow,
            b"<=" => Punct::LtEq,
            b">=" => Punct::GtEq,
            b"++" => Punct::PlusPlus,
            b"--" => Punct::MinusMinus,
            b"+=" => Punct::PlusEq,
            b"-=" => Punct::MinusEq,
            b"*=" => Punct::StarEq,
            b"/=" => Punct::SlashEq,
            b"%=" => Punct::PercentEq,
            b"&=" => Punct::AmpEq,
            b"|=" => Punct::PipeEq,
            b"^=" => Punct::CaretEq,
            b".*" => Punct::DotStar,
            b"##" => Punct::HashHash,
            _ => return None,
        })
    }

    /// Width of the operator in characters (and tokens).
    pub fn width(self) -> u32 {
        match self {
            Punct::Ellipsis | Punct::ShlEq | Punct::ShrEq | Punct::ArrowStar => 3,
            Punct::ColonColon
            | Punct::EqEq
            | Punct::NotEq
            | Punct::AmpAmp
            | Punct::PipePipe
            | Punct::Shl
            | Punct::Shr
            | Punct::Arrow
            | Punct::LtEq
            | Punct::GtEq
            | Punct::PlusPlus
            | Punct::MinusMinus
            | Punct::PlusEq
            | Punct::MinusEq
            | Punct::StarEq
            | Punct::SlashEq
            | Punct::PercentEq
            | Punct::AmpEq
            | Punct::PipeEq
            | Punct::CaretEq
            | Punct::DotStar
            | Punct::HashHash => 2,
            _ => 1,
        }
    }
}
