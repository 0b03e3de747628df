//! Conditional evaluation.
//!
//! Walks a cached [`DirectiveTree`] under a caller-owned [`MacroEnv`]:
//!
//! - text runs are appended to the output as they are;
//! - a conditional group selects its first branch whose condition holds
//!   (`#else` always holds) and walks only that branch, so directives in
//!   unselected branches never run;
//! - `#define`/`#undef` mutate the environment in file order;
//! - `#include` resolves the target and evaluates it recursively with the
//!   same environment, splicing its output in place.
//!
//! Expected problems (unresolved include, bad condition) are diagnostics.
//! The only errors are a root file that cannot be read or parsed, and an
//! include cycle when [`EvalOptions::abort_on_include_cycle`] is set.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use porta_diagnostic::{Diagnostic, DiagnosticKind, DiagnosticSink, Severity};
use porta_lexer::{DirectiveKeyword, Token, TokenKind, TokenStream};
use rustc_hash::{FxHashMap, FxHashSet};
use tracing::{debug, trace};

use crate::error::format_chain;
use crate::{
    ensure_sufficient_stack, evaluate_condition, significant_tokens, Branch, BranchKind,
    ConditionalGroup, DefineDirective, DirectiveNode, DirectiveTree, EvalError, IncludeDirective,
    IncludeResolver, MacroDef, MacroEnv, OtherDirective, ParseCache, SourceError, SourceProvider,
    TokenRange,
};

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct EvalOptions {
    /// Turn an include cycle into [`EvalError::IncludeCycle`] instead of a
    /// diagnostic that skips the offending include.
    pub abort_on_include_cycle: bool,
}

/// Provenance of one active token: which file, which token of that file.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct ActiveToken {
    /// Index into [`ActiveTokenSequence::files`].
    pub file: u32,
    /// Index into that file's token stream.
    pub index: u32,
}

/// Flattened result of one evaluation.
///
/// Holds only tokens of selected branches, in output order. Also records
/// which directive lines were executed and which files were pulled in.
#[derive(Clone, Debug, Default)]
pub struct ActiveTokenSequence {
    files: Vec<Arc<TokenStream>>,
    file_ids: FxHashMap<PathBuf, u32>,
    tokens: Vec<ActiveToken>,
    directives: Vec<(u32, TokenRange)>,
    included: Vec<PathBuf>,
}

impl ActiveTokenSequence {
    /// Files that contributed, the evaluated root first.
    pub fn files(&self) -> &[Arc<TokenStream>] {
        &self.files
    }

    pub fn tokens(&self) -> &[ActiveToken] {
        &self.tokens
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Resolved include targets, in the order they were evaluated.
    pub fn included_files(&self) -> &[PathBuf] {
        &self.included
    }

    pub fn iter(&self) -> impl Iterator<Item = (&TokenStream, &Token)> + '_ {
        self.tokens.iter().filter_map(|active| {
            let stream = self.files.get(active.file as usize)?;
            Some((&**stream, stream.get(active.index as usize)?))
        })
    }

    /// Text of every active token, trivia included.
    pub fn text(&self) -> String {
        self.iter()
            .map(|(stream, token)| stream.text_of(token))
            .collect()
    }

    /// Texts of the active tokens that are not trivia or newlines.
    pub fn significant_texts(&self) -> Vec<&str> {
        self.iter()
            .filter(|(_, t)| !t.kind.is_trivia() && t.kind != TokenKind::Newline)
            .map(|(stream, token)| stream.text_of(token))
            .collect()
    }

    /// Indices of active tokens that belong to `path`.
    pub fn token_indices<'s>(&'s self, path: &Path) -> impl Iterator<Item = usize> + 's {
        let file = self.file_ids.get(path).copied();
        self.tokens
            .iter()
            .filter(move |t| Some(t.file) == file)
            .map(|t| t.index as usize)
    }

    /// Executed directive lines of `path`.
    pub fn directive_lines<'s>(&'s self, path: &Path) -> impl Iterator<Item = TokenRange> + 's {
        let file = self.file_ids.get(path).copied();
        self.directives
            .iter()
            .filter(move |(f, _)| Some(*f) == file)
            .map(|(_, range)| *range)
    }

    fn register(&mut self, stream: &Arc<TokenStream>) -> u32 {
        if let Some(&id) = self.file_ids.get(stream.path()) {
            return id;
        }
        let id = u32::try_from(self.files.len()).unwrap_or(u32::MAX);
        self.files.push(Arc::clone(stream));
        self.file_ids.insert(stream.path().to_path_buf(), id);
        id
    }

    fn push_range(&mut self, file: u32, range: TokenRange) {
        self.tokens.extend(range.indices().map(|index| ActiveToken {
            file,
            index: u32::try_from(index).unwrap_or(u32::MAX),
        }));
    }
}

/// Evaluates directive trees against a macro environment.
///
/// Borrows the run's cache and resolver; all diagnostics go to `sink`.
pub struct ConditionalEvaluator<'a, S> {
    cache: &'a mut ParseCache<S>,
    resolver: &'a IncludeResolver,
    sink: &'a mut dyn DiagnosticSink,
    options: EvalOptions,
    /// Files currently being evaluated, outermost first.
    in_progress: Vec<PathBuf>,
    /// Files that executed `#pragma once`.
    once: FxHashSet<PathBuf>,
}

impl<'a, S: SourceProvider> ConditionalEvaluator<'a, S> {
    pub fn new(
        cache: &'a mut ParseCache<S>,
        resolver: &'a IncludeResolver,
        sink: &'a mut dyn DiagnosticSink,
    ) -> Self {
        ConditionalEvaluator {
            cache,
            resolver,
            sink,
            options: EvalOptions::default(),
            in_progress: Vec::new(),
            once: FxHashSet::default(),
        }
    }

    #[must_use]
    pub fn with_options(mut self, options: EvalOptions) -> Self {
        self.options = options;
        self
    }

    /// Evaluate `path` under `env`, which is updated by every executed
    /// `#define`/`#undef`, including those in included files.
    #[tracing::instrument(level = "debug", skip_all, fields(path = %path.display()))]
    pub fn evaluate(
        &mut self,
        path: &Path,
        env: &mut MacroEnv,
    ) -> Result<ActiveTokenSequence, EvalError> {
        let tree = self.cache.tree(path)?;
        self.in_progress.clear();
        self.once.clear();

        let mut out = ActiveTokenSequence::default();
        self.evaluate_tree(&tree, env, &mut out)?;
        debug!(
            tokens = out.len(),
            files = out.files().len(),
            macros = env.len(),
            "evaluated"
        );
        Ok(out)
    }

    fn evaluate_tree(
        &mut self,
        tree: &Arc<DirectiveTree>,
        env: &mut MacroEnv,
        out: &mut ActiveTokenSequence,
    ) -> Result<(), EvalError> {
        self.in_progress.push(tree.path().to_path_buf());
        let file = out.register(tree.stream());
        let result = self.walk(tree, file, tree.nodes(), env, out);
        self.in_progress.pop();
        result
    }

    fn walk(
        &mut self,
        tree: &DirectiveTree,
        file: u32,
        nodes: &[DirectiveNode],
        env: &mut MacroEnv,
        out: &mut ActiveTokenSequence,
    ) -> Result<(), EvalError> {
        for node in nodes {
            match node {
                DirectiveNode::TextRun(range) => out.push_range(file, *range),
                DirectiveNode::Include(include) => {
                    out.directives.push((file, include.tokens));
                    self.include(tree, include, env, out)?;
                }
                DirectiveNode::Conditional(group) => {
                    for branch in &group.branches {
                        out.directives.push((file, branch.directive));
                    }
                    out.directives.push((file, group.end));
                    if let Some(branch) = self.select(tree, group, env) {
                        ensure_sufficient_stack(|| {
                            self.walk(tree, file, &branch.body, env, out)
                        })?;
                    }
                }
                DirectiveNode::Define(define) => {
                    out.directives.push((file, define.tokens));
                    self.define(tree, define, env);
                }
                DirectiveNode::Undef(undef) => {
                    out.directives.push((file, undef.tokens));
                    match &undef.name {
                        Some(name) => {
                            env.undef(name);
                        }
                        None => self.report(
                            tree,
                            undef.line,
                            DiagnosticKind::MalformedDirective,
                            "`#undef` expects a macro name".to_owned(),
                        ),
                    }
                }
                DirectiveNode::Other(other) => {
                    out.directives.push((file, other.tokens));
                    self.other(tree, other);
                }
            }
        }
        Ok(())
    }

    /// First branch whose condition holds.
    fn select<'g>(
        &mut self,
        tree: &DirectiveTree,
        group: &'g ConditionalGroup,
        env: &MacroEnv,
    ) -> Option<&'g Branch> {
        group
            .branches
            .iter()
            .find(|branch| self.branch_taken(tree, branch, env))
    }

    fn branch_taken(&mut self, tree: &DirectiveTree, branch: &Branch, env: &MacroEnv) -> bool {
        let tokens = significant_tokens(tree.stream(), branch.condition);
        match branch.kind {
            BranchKind::Else => true,
            BranchKind::Ifdef | BranchKind::Ifndef => {
                let Some(name) = tokens.first().filter(|t| t.is_identifier()) else {
                    self.report(
                        tree,
                        branch.line,
                        DiagnosticKind::MalformedDirective,
                        "`#ifdef`/`#ifndef` expects a macro name".to_owned(),
                    );
                    return false;
                };
                env.is_defined(&name.text) == (branch.kind == BranchKind::Ifdef)
            }
            BranchKind::If | BranchKind::Elif => match evaluate_condition(&tokens, env) {
                Ok(taken) => taken,
                Err(err) => {
                    self.report(
                        tree,
                        branch.line,
                        DiagnosticKind::InvalidCondition,
                        format!("invalid condition, branch not taken: {err}"),
                    );
                    false
                }
            },
        }
    }

    fn include(
        &mut self,
        tree: &DirectiveTree,
        include: &IncludeDirective,
        env: &mut MacroEnv,
        out: &mut ActiveTokenSequence,
    ) -> Result<(), EvalError> {
        let Some(operand) = &include.operand else {
            self.report(
                tree,
                include.line,
                DiagnosticKind::MalformedDirective,
                "`#include` expects \"FILE\" or <FILE>".to_owned(),
            );
            return Ok(());
        };

        let Some(target) = self
            .resolver
            .resolve(self.cache.source(), tree.path(), operand)
        else {
            self.report(
                tree,
                include.line,
                DiagnosticKind::UnresolvedInclude,
                format!("cannot find include file `{}`", operand.name),
            );
            return Ok(());
        };

        if self.once.contains(&target) {
            trace!(target = %target.display(), "skipping `#pragma once` file");
            return Ok(());
        }

        if self.in_progress.contains(&target) {
            let chain: Vec<PathBuf> = self
                .in_progress
                .iter()
                .cloned()
                .chain(std::iter::once(target))
                .collect();
            if self.options.abort_on_include_cycle {
                return Err(EvalError::IncludeCycle { chain });
            }
            let message = format!("include cycle, include skipped: {}", format_chain(&chain));
            self.sink.report(
                Diagnostic::new(DiagnosticKind::IncludeCycle, message)
                    .with_severity(Severity::Warning)
                    .at(tree.path(), include.line),
            );
            return Ok(());
        }

        debug!(target = %target.display(), "include");
        match self.cache.tree(&target) {
            Ok(child) => {
                out.included.push(target);
                ensure_sufficient_stack(|| self.evaluate_tree(&child, env, out))
            }
            Err(SourceError::Load(err)) => {
                self.report(
                    tree,
                    include.line,
                    DiagnosticKind::ReadFailure,
                    format!("cannot read include file: {err}"),
                );
                Ok(())
            }
            Err(SourceError::Parse(err)) => {
                self.sink.report(
                    Diagnostic::new(
                        DiagnosticKind::UnbalancedConditional,
                        format!("included file skipped: {err}"),
                    )
                    .at(tree.path(), include.line),
                );
                Ok(())
            }
        }
    }

    fn define(&mut self, tree: &DirectiveTree, define: &DefineDirective, env: &mut MacroEnv) {
        let Some(name) = &define.name else {
            self.report(
                tree,
                define.line,
                DiagnosticKind::MalformedDirective,
                "`#define` expects a macro name and an optional parameter list".to_owned(),
            );
            return;
        };

        let body = significant_tokens(tree.stream(), define.body);
        let def = match &define.params {
            None => MacroDef::Object { body },
            Some(params) => MacroDef::Function {
                params: params.clone(),
                variadic: define.variadic,
                body,
            },
        };
        if def.uses_unsupported_operators() {
            self.report(
                tree,
                define.line,
                DiagnosticKind::UnsupportedMacroOperator,
                format!("macro `{name}` uses `#` or `##` and will not be expanded"),
            );
        }
        env.define(name.clone(), def);
    }

    fn other(&mut self, tree: &DirectiveTree, other: &OtherDirective) {
        match other.keyword {
            Some(DirectiveKeyword::Error) => {
                let stream = tree.stream();
                let message = stream.text()[token_span(stream, other.rest)].trim().to_owned();
                self.report(
                    tree,
                    other.line,
                    DiagnosticKind::ErrorDirective,
                    format!("#error {message}"),
                );
            }
            Some(DirectiveKeyword::Pragma) => {
                let rest = significant_tokens(tree.stream(), other.rest);
                if matches!(rest.as_slice(), [only] if only.text == "once") {
                    self.once.insert(tree.path().to_path_buf());
                }
            }
            _ => {}
        }
    }

    fn report(&mut self, tree: &DirectiveTree, line: u32, kind: DiagnosticKind, message: String) {
        self.sink
            .report(Diagnostic::new(kind, message).at(tree.path(), line));
    }
}

/// Byte range covered by a token range.
fn token_span(stream: &TokenStream, range: TokenRange) -> std::ops::Range<usize> {
    let tokens = &stream.tokens()[range.indices()];
    match (tokens.first(), tokens.last()) {
        (Some(first), Some(last)) => first.offset as usize..last.end() as usize,
        _ => 0..0,
    }
}

#[cfg(test)]
mod tests;
