//! Text rewriting.
//!
//! Rules and header tables propose [`TextReplacement`]s against the original
//! buffer; an [`EditSet`] keeps them sorted and non-overlapping and applies
//! them in one left-to-right pass.
//!
//! ```text
//! TokenStream ──match_tokens(RuleTable)──► EditSet ─┐
//! TokenStream ──rewrite_includes(HeaderRules)──► EditSet ─┴─merge──► apply(original)
//! ```

mod edit_set;
mod headers;
mod matcher;
mod rules;

pub use edit_set::{EditSet, TextReplacement};
pub use headers::{rewrite_includes, HeaderRules};
pub use matcher::{match_tokens, ReplacementMatcher};
pub use rules::{MatchContext, RenameToken, RuleTable, ScopedRename, TokenRule};
