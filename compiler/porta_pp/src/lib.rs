//! Conditional preprocessing.
//!
//! # Architecture
//!
//! ```text
//! path ──SourceProvider──► text ──lex──► TokenStream ──build_tree──► DirectiveTree
//!                                           └────────── ParseCache ──────┘
//!
//! DirectiveTree + MacroEnv ──ConditionalEvaluator──► ActiveTokenSequence
//!                  ▲
//!                  └── IncludeResolver (nested includes, same MacroEnv)
//! ```
//!
//! The tree is a purely structural parse of one file: it finds directive
//! boundaries and never looks at a condition's value, so it is cached per
//! path and shared by every inclusion context. Everything that depends on
//! macro definitions happens in the evaluator, which is never cached.

mod cache;
mod cond;
mod error;
mod eval;
mod macros;
mod resolve;
mod source;
mod stack;
mod tree;

pub use cache::ParseCache;
pub use cond::{evaluate_condition, ConditionError};
pub use error::{EvalError, LoadError, ParseError, SourceError};
pub use eval::{ActiveToken, ActiveTokenSequence, ConditionalEvaluator, EvalOptions};
pub use macros::{significant_tokens, MacroDef, MacroEnv, MacroToken};
pub use resolve::{include_operand, normalize_path, IncludeOperand, IncludeResolver, IncludeStyle};
pub use source::{DiskSource, MemorySource, SourceProvider};
pub use stack::ensure_sufficient_stack;
pub use tree::{
    build_tree, Branch, BranchKind, ConditionalGroup, DefineDirective, DirectiveNode,
    DirectiveTree, IncludeDirective, OtherDirective, TokenRange, UndefDirective,
};
