//! Token stream and directive classification.
//!
//! Two passes over one file's text:
//!
//! ```text
//! text ──tokenize()──► TokenStream (primitive kinds)
//!      ──classify()──► TokenStream (operators, directive keywords)
//! ```
//!
//! [`classify`] never moves a token boundary. It only rewrites kind tags,
//! so every offset produced by [`tokenize`] stays valid afterwards.

mod classify;
mod keywords;
mod kind;
mod stream;

pub use classify::classify;
pub use keywords::lookup_directive;
pub use kind::{DirectiveKeyword, Punct, TokenKind};
pub use stream::{tokenize, Token, TokenStream};

use std::path::PathBuf;

/// Tokenize and classify `text` in one call.
pub fn lex(path: impl Into<PathBuf>, text: &str) -> TokenStream {
    let mut stream = tokenize(path, text);
    classify(&mut stream);
    stream
}
