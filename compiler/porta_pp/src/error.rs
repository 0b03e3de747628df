//! Fatal errors.
//!
//! Everything expected (unresolved includes, bad conditions) is a
//! diagnostic; these types cover what ends processing of a file or run.

use std::io;
use std::path::PathBuf;

use porta_lexer::DirectiveKeyword;

/// A source file could not be read.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("{}: {message}", .path.display())]
pub struct LoadError {
    pub path: PathBuf,
    pub kind: io::ErrorKind,
    pub message: String,
}

impl LoadError {
    pub fn from_io(path: impl Into<PathBuf>, err: &io::Error) -> Self {
        LoadError {
            path: path.into(),
            kind: err.kind(),
            message: err.to_string(),
        }
    }
}

/// Unbalanced conditional nesting. Fatal for the file being parsed.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("{}:{line}: `#{keyword}` without a matching `#if`", .path.display())]
    Stray {
        path: PathBuf,
        line: u32,
        keyword: DirectiveKeyword,
    },
    #[error("{}:{line}: `#{keyword}` is never closed by `#endif`", .path.display())]
    Unterminated {
        path: PathBuf,
        line: u32,
        keyword: DirectiveKeyword,
    },
    #[error("{}:{line}: `#{keyword}` follows `#else` in the same group", .path.display())]
    AfterElse {
        path: PathBuf,
        line: u32,
        keyword: DirectiveKeyword,
    },
}

impl ParseError {
    pub fn line(&self) -> u32 {
        match self {
            ParseError::Stray { line, .. }
            | ParseError::Unterminated { line, .. }
            | ParseError::AfterElse { line, .. } => *line,
        }
    }
}

/// Failure to produce the tokens or tree of one file.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum SourceError {
    #[error(transparent)]
    Load(#[from] LoadError),
    #[error(transparent)]
    Parse(#[from] ParseError),
}

/// Failure of a whole evaluation run.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum EvalError {
    #[error(transparent)]
    Source(#[from] SourceError),
    #[error("include cycle: {}", format_chain(.chain))]
    IncludeCycle { chain: Vec<PathBuf> },
}

pub(crate) fn format_chain(chain: &[PathBuf]) -> String {
    chain
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(" -> ")
}
