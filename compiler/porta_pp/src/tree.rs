//! Directive tree: the structural parse of one file.
//!
//! A recursive-descent pass over directive lines. `#if`/`#ifdef`/`#ifndef`
//! open a [`ConditionalGroup`] whose branches run to the next
//! `#elif`/`#else`/`#endif` at the same depth; everything between directive
//! lines becomes a [`DirectiveNode::TextRun`]. No condition is evaluated
//! here, so the result depends only on the file's text.

use std::ops::Range;
use std::path::Path;
use std::sync::Arc;

use porta_lexer::{DirectiveKeyword, Punct, TokenKind, TokenStream};

use crate::{ensure_sufficient_stack, include_operand, IncludeOperand, ParseError};

/// Half-open range of token indices into one [`TokenStream`].
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
pub struct TokenRange {
    pub start: u32,
    pub end: u32,
}

impl TokenRange {
    pub fn new(start: usize, end: usize) -> Self {
        TokenRange {
            start: u32::try_from(start).unwrap_or(u32::MAX),
            end: u32::try_from(end).unwrap_or(u32::MAX),
        }
    }

    pub fn all(stream: &TokenStream) -> Self {
        TokenRange::new(0, stream.len())
    }

    pub fn indices(self) -> Range<usize> {
        self.start as usize..self.end as usize
    }

    pub fn len(self) -> usize {
        self.end.saturating_sub(self.start) as usize
    }

    pub fn is_empty(self) -> bool {
        self.end <= self.start
    }
}

#[derive(Clone, Eq, PartialEq, Debug)]
pub enum DirectiveNode {
    /// Ordinary tokens between directive lines.
    TextRun(TokenRange),
    Include(IncludeDirective),
    Conditional(ConditionalGroup),
    Define(DefineDirective),
    Undef(UndefDirective),
    /// `#pragma`, `#error`, `#warning`, `#line`, the null directive and
    /// unknown directives.
    Other(OtherDirective),
}

#[derive(Clone, Eq, PartialEq, Debug)]
pub struct IncludeDirective {
    pub line: u32,
    /// The whole directive line, trailing newline included.
    pub tokens: TokenRange,
    /// `None` when the operand is missing or not a delimited header name.
    pub operand: Option<IncludeOperand>,
}

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum BranchKind {
    If,
    Ifdef,
    Ifndef,
    Elif,
    Else,
}

impl BranchKind {
    fn from_keyword(keyword: Option<DirectiveKeyword>) -> BranchKind {
        match keyword {
            Some(DirectiveKeyword::Ifdef) => BranchKind::Ifdef,
            Some(DirectiveKeyword::Ifndef) => BranchKind::Ifndef,
            Some(DirectiveKeyword::Elif) => BranchKind::Elif,
            Some(DirectiveKeyword::Else) => BranchKind::Else,
            _ => BranchKind::If,
        }
    }
}

#[derive(Clone, Eq, PartialEq, Debug)]
pub struct Branch {
    pub kind: BranchKind,
    pub line: u32,
    /// The branch's directive line.
    pub directive: TokenRange,
    /// Tokens after the keyword, newline excluded. Empty for `#else`.
    pub condition: TokenRange,
    pub body: Vec<DirectiveNode>,
}

/// `#if ... [#elif ...]* [#else] #endif`. Always has at least one branch.
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct ConditionalGroup {
    pub branches: Vec<Branch>,
    /// The `#endif` line.
    pub end: TokenRange,
    pub end_line: u32,
}

#[derive(Clone, Eq, PartialEq, Debug)]
pub struct DefineDirective {
    pub line: u32,
    pub tokens: TokenRange,
    /// `None` when the name is missing or the parameter list is malformed.
    pub name: Option<String>,
    /// `Some` for function-like macros (`(` directly after the name).
    pub params: Option<Vec<String>>,
    pub variadic: bool,
    pub body: TokenRange,
}

#[derive(Clone, Eq, PartialEq, Debug)]
pub struct UndefDirective {
    pub line: u32,
    pub tokens: TokenRange,
    pub name: Option<String>,
}

#[derive(Clone, Eq, PartialEq, Debug)]
pub struct OtherDirective {
    pub line: u32,
    pub tokens: TokenRange,
    pub keyword: Option<DirectiveKeyword>,
    /// Tokens after the keyword, newline excluded.
    pub rest: TokenRange,
}

/// Structural parse of one file, sharing the file's token stream.
#[derive(Clone, Debug)]
pub struct DirectiveTree {
    stream: Arc<TokenStream>,
    nodes: Vec<DirectiveNode>,
    max_depth: u32,
}

impl DirectiveTree {
    pub fn path(&self) -> &Path {
        self.stream.path()
    }

    pub fn stream(&self) -> &Arc<TokenStream> {
        &self.stream
    }

    pub fn nodes(&self) -> &[DirectiveNode] {
        &self.nodes
    }

    /// Deepest conditional nesting in the file.
    pub fn max_depth(&self) -> u32 {
        self.max_depth
    }
}

/// Build the directive tree of a classified stream.
///
/// Unbalanced nesting (an unclosed group, a stray `#elif`/`#else`/`#endif`,
/// a branch after `#else`) is a [`ParseError`] for the whole file.
pub fn build_tree(stream: Arc<TokenStream>) -> Result<DirectiveTree, ParseError> {
    let (nodes, max_depth) = {
        let mut builder = TreeBuilder {
            stream: &stream,
            pos: 0,
            depth: 0,
            max_depth: 0,
        };
        let nodes = builder.parse_file()?;
        (nodes, builder.max_depth)
    };
    Ok(DirectiveTree {
        stream,
        nodes,
        max_depth,
    })
}

/// One directive line, located by token index.
#[derive(Copy, Clone, Debug)]
struct DirectiveLine {
    start: usize,
    keyword_index: Option<usize>,
    keyword: Option<DirectiveKeyword>,
    /// End of the content, before the newline.
    content_end: usize,
    /// End of the line, after the newline.
    end: usize,
    line: u32,
}

impl DirectiveLine {
    fn tokens(&self) -> TokenRange {
        TokenRange::new(self.start, self.end)
    }

    fn operand(&self) -> TokenRange {
        let from = self.keyword_index.unwrap_or(self.start) + 1;
        TokenRange::new(from.min(self.content_end), self.content_end)
    }
}

enum Stop {
    Eof,
    /// An `#elif`, `#else` or `#endif` line, already consumed.
    Branch(DirectiveLine),
}

struct TreeBuilder<'a> {
    stream: &'a TokenStream,
    pos: usize,
    depth: u32,
    max_depth: u32,
}

impl TreeBuilder<'_> {
    fn parse_file(&mut self) -> Result<Vec<DirectiveNode>, ParseError> {
        let (nodes, stop) = self.parse_nodes()?;
        match stop {
            Stop::Eof => Ok(nodes),
            Stop::Branch(line) => Err(ParseError::Stray {
                path: self.stream.path().to_path_buf(),
                line: line.line,
                keyword: line.keyword.unwrap_or(DirectiveKeyword::Endif),
            }),
        }
    }

    fn parse_nodes(&mut self) -> Result<(Vec<DirectiveNode>, Stop), ParseError> {
        let stream = self.stream;
        let tokens = stream.tokens();
        let mut nodes = Vec::new();

        loop {
            let text_start = self.pos;
            while self.pos < tokens.len() && tokens[self.pos].kind != TokenKind::DirectiveStart {
                self.pos += 1;
            }
            if self.pos > text_start {
                nodes.push(DirectiveNode::TextRun(TokenRange::new(text_start, self.pos)));
            }
            if self.pos >= tokens.len() {
                return Ok((nodes, Stop::Eof));
            }

            let line = self.directive_line(self.pos);
            self.pos = line.end;

            let node = match line.keyword {
                Some(keyword) if keyword.opens_group() => {
                    DirectiveNode::Conditional(ensure_sufficient_stack(|| self.parse_group(line))?)
                }
                Some(DirectiveKeyword::Elif | DirectiveKeyword::Else | DirectiveKeyword::Endif) => {
                    return Ok((nodes, Stop::Branch(line)));
                }
                Some(DirectiveKeyword::Include) => DirectiveNode::Include(IncludeDirective {
                    line: line.line,
                    tokens: line.tokens(),
                    operand: line
                        .keyword_index
                        .and_then(|index| include_operand(stream, index)),
                }),
                Some(DirectiveKeyword::Define) => DirectiveNode::Define(self.define(line)),
                Some(DirectiveKeyword::Undef) => DirectiveNode::Undef(UndefDirective {
                    line: line.line,
                    tokens: line.tokens(),
                    name: self.sole_identifier(line.operand()),
                }),
                keyword => DirectiveNode::Other(OtherDirective {
                    line: line.line,
                    tokens: line.tokens(),
                    keyword,
                    rest: line.operand(),
                }),
            };
            nodes.push(node);
        }
    }

    fn parse_group(&mut self, opening: DirectiveLine) -> Result<ConditionalGroup, ParseError> {
        self.depth += 1;
        self.max_depth = self.max_depth.max(self.depth);

        let mut branches: Vec<Branch> = Vec::new();
        let mut header = opening;
        loop {
            let (body, stop) = self.parse_nodes()?;
            let kind = BranchKind::from_keyword(header.keyword);
            branches.push(Branch {
                kind,
                line: header.line,
                directive: header.tokens(),
                condition: header.operand(),
                body,
            });

            let next = match stop {
                Stop::Eof => {
                    return Err(ParseError::Unterminated {
                        path: self.stream.path().to_path_buf(),
                        line: opening.line,
                        keyword: opening.keyword.unwrap_or(DirectiveKeyword::If),
                    });
                }
                Stop::Branch(next) => next,
            };

            match next.keyword {
                Some(DirectiveKeyword::Endif) => {
                    self.depth -= 1;
                    return Ok(ConditionalGroup {
                        branches,
                        end: next.tokens(),
                        end_line: next.line,
                    });
                }
                keyword if kind == BranchKind::Else => {
                    return Err(ParseError::AfterElse {
                        path: self.stream.path().to_path_buf(),
                        line: next.line,
                        keyword: keyword.unwrap_or(DirectiveKeyword::Else),
                    });
                }
                _ => header = next,
            }
        }
    }

    fn directive_line(&self, start: usize) -> DirectiveLine {
        let tokens = self.stream.tokens();

        let content_end = tokens[start..]
            .iter()
            .position(|t| t.kind == TokenKind::Newline)
            .map_or(tokens.len(), |offset| start + offset);
        let end = (content_end + 1).min(tokens.len());

        let keyword_index = (start + 1..content_end).find(|&i| !tokens[i].kind.is_trivia());
        let keyword = keyword_index.and_then(|i| match tokens[i].kind {
            TokenKind::Directive(keyword) => Some(keyword),
            _ => None,
        });
        // Only a recognized keyword counts as the directive name; for an
        // unknown directive the operand starts right after `#`.
        let keyword_index = keyword.and(keyword_index);

        DirectiveLine {
            start,
            keyword_index,
            keyword,
            content_end,
            end,
            line: self.stream.line_of(tokens[start].offset),
        }
    }

    fn define(&self, line: DirectiveLine) -> DefineDirective {
        let tokens = self.stream.tokens();
        let operand = line.operand();
        let mut directive = DefineDirective {
            line: line.line,
            tokens: line.tokens(),
            name: None,
            params: None,
            variadic: false,
            body: TokenRange::new(operand.end as usize, operand.end as usize),
        };

        let Some(name_index) = operand.indices().find(|&i| !tokens[i].kind.is_trivia()) else {
            return directive;
        };
        if tokens[name_index].kind != TokenKind::Identifier {
            return directive;
        }
        let name = self.stream.text_of(&tokens[name_index]).to_owned();

        let after_name = name_index + 1;
        let function_like = after_name < line.content_end
            && tokens[after_name].kind == TokenKind::Punct(Punct::LParen);
        if !function_like {
            directive.name = Some(name);
            directive.body = TokenRange::new(after_name, line.content_end);
            return directive;
        }

        if let Some((params, variadic, body_start)) = self.params(after_name + 1, line.content_end)
        {
            directive.name = Some(name);
            directive.params = Some(params);
            directive.variadic = variadic;
            directive.body = TokenRange::new(body_start, line.content_end);
        }
        directive
    }

    /// Parse `a, b, ...)` starting after the `(`. Returns the parameters,
    /// whether the list ends in `...`, and the index after `)`.
    fn params(&self, mut i: usize, end: usize) -> Option<(Vec<String>, bool, usize)> {
        let tokens = self.stream.tokens();
        let mut params = Vec::new();
        let mut variadic = false;
        let mut expect_param = true;

        while i < end {
            let token = tokens[i];
            match token.kind {
                kind if kind.is_trivia() => {}
                TokenKind::Punct(Punct::RParen) if !expect_param || params.is_empty() => {
                    return Some((params, variadic, i + 1));
                }
                TokenKind::Identifier if expect_param && !variadic => {
                    params.push(self.stream.text_of(&token).to_owned());
                    expect_param = false;
                }
                TokenKind::Punct(Punct::Ellipsis) if expect_param && !variadic => {
                    variadic = true;
                    expect_param = false;
                    i += 2;
                }
                TokenKind::Punct(Punct::Comma) if !expect_param && !variadic => {
                    expect_param = true;
                }
                _ => return None,
            }
            i += 1;
        }
        None
    }

    fn sole_identifier(&self, range: TokenRange) -> Option<String> {
        let token = range
            .indices()
            .map(|i| self.stream.tokens()[i])
            .find(|t| !t.kind.is_trivia())?;
        (token.kind == TokenKind::Identifier).then(|| self.stream.text_of(&token).to_owned())
    }
}
