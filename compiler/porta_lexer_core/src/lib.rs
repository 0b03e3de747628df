//! Low-level tokenizer for C-family source text.
//!
//! This crate splits raw source text into a flat stream of `(RawTag, len)`
//! pairs. It performs character classification only: no keyword lookup,
//! no operator merging, no directive recognition. Those belong to the
//! classification layer in `porta_lexer`.
//!
//! ```text
//! &str → SourceBuffer → Cursor → RawScanner → RawToken { tag, len }
//! ```
//!
//! # Guarantees
//!
//! - Every non-EOF token has `len > 0`.
//! - The token lengths sum to the source length: no gaps, no overlaps.
//! - Unterminated literals and comments never fail; they simply end at
//!   the line break (literals) or at end of input (block comments).

mod cursor;
mod raw_scanner;
mod source_buffer;
mod tag;

pub use cursor::Cursor;
pub use raw_scanner::{tokenize, ByteClass, RawScanner, BYTE_CLASS};
pub use source_buffer::SourceBuffer;
pub use tag::{RawTag, RawToken};
