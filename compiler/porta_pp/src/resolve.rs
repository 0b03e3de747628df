//! Include operand parsing and resolution.

use std::path::{Component, Path, PathBuf};

use porta_lexer::{DirectiveKeyword, TokenKind, TokenStream};

use crate::SourceProvider;

/// `"quoted"` or `<angled>` include.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum IncludeStyle {
    Quoted,
    Angled,
}

/// The header named by an `#include` line.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct IncludeOperand {
    pub name: String,
    pub style: IncludeStyle,
    /// Byte offset of the name itself, inside the delimiters.
    pub name_offset: u32,
    pub name_len: u32,
}

/// Parse the operand of the `#include` whose keyword token is at
/// `keyword_index`.
///
/// Returns `None` for anything other than a delimited, non-empty header
/// name on the same logical line (a macro-computed include, a missing
/// operand, a missing closing `>` or `"`).
pub fn include_operand(stream: &TokenStream, keyword_index: usize) -> Option<IncludeOperand> {
    let tokens = stream.tokens();
    if tokens.get(keyword_index)?.kind != TokenKind::Directive(DirectiveKeyword::Include) {
        return None;
    }

    let first = tokens[keyword_index + 1..]
        .iter()
        .find(|t| !t.kind.is_trivia())?;

    let text = stream.text();
    match first.kind {
        TokenKind::StringLiteral => {
            let literal = stream.text_of(first);
            let inner = literal.strip_prefix('"')?.strip_suffix('"')?;
            (!inner.is_empty()).then(|| IncludeOperand {
                name: inner.to_owned(),
                style: IncludeStyle::Quoted,
                name_offset: first.offset + 1,
                name_len: u32::try_from(inner.len()).unwrap_or(u32::MAX),
            })
        }
        TokenKind::Punct(_) if text.as_bytes()[first.offset as usize] == b'<' => {
            let start = first.offset as usize + 1;
            let line_end = tokens[keyword_index..]
                .iter()
                .find(|t| t.kind == TokenKind::Newline)
                .map_or(text.len(), |t| t.offset as usize);
            let close = text[start..line_end].find('>')?;
            let name = &text[start..start + close];
            (!name.is_empty()).then(|| IncludeOperand {
                name: name.to_owned(),
                style: IncludeStyle::Angled,
                name_offset: first.offset + 1,
                name_len: u32::try_from(name.len()).unwrap_or(u32::MAX),
            })
        }
        _ => None,
    }
}

/// Lexically normalize a path: drop `.` components and fold `..` into the
/// preceding normal component. Leading `..` on a relative path is kept.
pub fn normalize_path(path: &Path) -> PathBuf {
    let mut result = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if matches!(result.components().next_back(), Some(Component::Normal(_))) {
                    result.pop();
                } else if !result.has_root() {
                    result.push("..");
                }
            }
            other => result.push(other),
        }
    }
    result
}

/// Maps an include operand to a file.
#[derive(Clone, Debug, Default)]
pub struct IncludeResolver {
    search_paths: Vec<PathBuf>,
}

impl IncludeResolver {
    pub fn new(search_paths: impl IntoIterator<Item = impl Into<PathBuf>>) -> Self {
        IncludeResolver {
            search_paths: search_paths.into_iter().map(Into::into).collect(),
        }
    }

    pub fn search_paths(&self) -> &[PathBuf] {
        &self.search_paths
    }

    /// Resolve `operand` as written in `including_file`.
    ///
    /// Absolute names are checked as-is. A quoted name is looked up next to
    /// the including file first; then, for both styles, the search paths are
    /// tried in order. The result is normalized. `None` is the ordinary
    /// "not found" outcome.
    pub fn resolve(
        &self,
        source: &dyn SourceProvider,
        including_file: &Path,
        operand: &IncludeOperand,
    ) -> Option<PathBuf> {
        let name = Path::new(&operand.name);
        if name.is_absolute() {
            let candidate = normalize_path(name);
            return source.exists(&candidate).then_some(candidate);
        }

        let local = match operand.style {
            IncludeStyle::Quoted => including_file.parent().map(|dir| dir.join(name)),
            IncludeStyle::Angled => None,
        };

        local
            .into_iter()
            .chain(self.search_paths.iter().map(|dir| dir.join(name)))
            .map(|candidate| normalize_path(&candidate))
            .find(|candidate| source.exists(candidate))
    }
}
