//! Per-file porting pipeline.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use porta_diagnostic::{Diagnostic, DiagnosticSink};
use porta_edit::{match_tokens, rewrite_includes, EditSet, HeaderRules, ReplacementMatcher, RuleTable};
use porta_lexer::TokenStream;
use porta_pp::{
    ActiveTokenSequence, ConditionalEvaluator, DiskSource, EvalOptions, IncludeResolver, MacroEnv,
    ParseCache, SourceProvider,
};
use rustc_hash::FxHashSet;
use tracing::debug;

use crate::{ConfigError, PortConfig, PortError};

/// Result of porting one file.
#[derive(Clone, Debug)]
pub struct PortOutcome {
    pub path: PathBuf,
    /// Merged header and token edits, in original-buffer coordinates.
    pub edits: EditSet,
    pub output: String,
    /// Include targets pulled in while evaluating the file.
    pub included_files: Vec<PathBuf>,
    /// Token edits discarded because a header edit already covered them.
    pub dropped_edits: usize,
    pub diagnostics: usize,
    /// Diagnostics of error severity.
    pub errors: usize,
}

impl PortOutcome {
    pub fn is_changed(&self) -> bool {
        !self.edits.is_empty()
    }

    /// Write `output` back to `path`, skipping unchanged files.
    pub fn write(&self) -> Result<(), PortError> {
        if !self.is_changed() {
            return Ok(());
        }
        std::fs::write(&self.path, &self.output).map_err(|source| PortError::Write {
            path: self.path.clone(),
            source,
        })
    }
}

/// Runs files through evaluation and rewriting.
///
/// The parse cache lives as long as the porter, so a header included by
/// many files is read and parsed once per run.
pub struct FilePorter<S = DiskSource> {
    cache: ParseCache<S>,
    resolver: IncludeResolver,
    rules: RuleTable,
    headers: HeaderRules,
    env: MacroEnv,
    eval_options: EvalOptions,
    port_inactive_branches: bool,
}

impl FilePorter<DiskSource> {
    pub fn from_config(config: &PortConfig) -> Result<Self, ConfigError> {
        Self::with_source(config, DiskSource)
    }
}

impl<S: SourceProvider> FilePorter<S> {
    pub fn with_source(config: &PortConfig, source: S) -> Result<Self, ConfigError> {
        Ok(FilePorter {
            cache: ParseCache::new(source),
            resolver: IncludeResolver::new(config.include_paths.iter().cloned()),
            rules: config.rule_table(),
            headers: config.header_rules(),
            env: config.macro_env()?,
            eval_options: config.eval_options(),
            port_inactive_branches: config.port_inactive_branches,
        })
    }

    pub fn cache(&self) -> &ParseCache<S> {
        &self.cache
    }

    /// Macro environment each file starts from.
    pub fn env(&self) -> &MacroEnv {
        &self.env
    }

    /// Port `text` as the contents of `path`. The cache entry for `path` is
    /// replaced, so later includes of `path` see `text`.
    #[tracing::instrument(level = "debug", skip_all, fields(path = %path.display()))]
    pub fn port_source(
        &mut self,
        path: &Path,
        text: &str,
        sink: &mut dyn DiagnosticSink,
    ) -> Result<PortOutcome, PortError> {
        let stream = self.cache.insert_source(path, text);
        self.port_stream(&stream, sink)
    }

    /// Read `path` through the cache and port it.
    #[tracing::instrument(level = "debug", skip_all, fields(path = %path.display()))]
    pub fn port_file(
        &mut self,
        path: &Path,
        sink: &mut dyn DiagnosticSink,
    ) -> Result<PortOutcome, PortError> {
        let stream = self.cache.tokens(path)?;
        self.port_stream(&stream, sink)
    }

    fn port_stream(
        &mut self,
        stream: &Arc<TokenStream>,
        sink: &mut dyn DiagnosticSink,
    ) -> Result<PortOutcome, PortError> {
        let mut counting = CountingSink::new(sink);
        let mut env = self.env.clone();
        let active = ConditionalEvaluator::new(&mut self.cache, &self.resolver, &mut counting)
            .with_options(self.eval_options)
            .evaluate(stream.path(), &mut env)?;

        let (mut edits, token_edits) = if self.port_inactive_branches {
            (
                rewrite_includes(stream, &self.headers),
                match_tokens(stream, &self.rules),
            )
        } else {
            let allowed = allowed_indices(&active, stream.path());
            let headers = rewrite_includes(stream, &self.headers)
                .into_vec()
                .into_iter()
                .filter(|edit| allowed.contains(&containing_token(stream, edit.position)))
                .fold(EditSet::new(), |mut set, edit| {
                    set.insert_replacement(edit);
                    set
                });
            let tokens = ReplacementMatcher::new(&self.rules)
                .match_where(stream, |index| allowed.contains(&index));
            (headers, tokens)
        };
        let dropped_edits = edits.merge(token_edits);
        let output = edits.apply(stream.text());

        debug!(
            edits = edits.len(),
            dropped = dropped_edits,
            included = active.included_files().len(),
            diagnostics = counting.reported,
            "ported"
        );
        Ok(PortOutcome {
            path: stream.path().to_path_buf(),
            edits,
            output,
            included_files: active.included_files().to_vec(),
            dropped_edits,
            diagnostics: counting.reported,
            errors: counting.errors,
        })
    }
}

/// Token indices of `path` that were active or part of an executed
/// directive line.
fn allowed_indices(active: &ActiveTokenSequence, path: &Path) -> FxHashSet<usize> {
    let mut allowed: FxHashSet<usize> = active.token_indices(path).collect();
    for range in active.directive_lines(path) {
        allowed.extend(range.indices());
    }
    allowed
}

/// Index of the token whose span contains `offset`.
fn containing_token(stream: &TokenStream, offset: u32) -> usize {
    stream.index_at(offset.saturating_add(1)).saturating_sub(1)
}

struct CountingSink<'a> {
    inner: &'a mut dyn DiagnosticSink,
    reported: usize,
    errors: usize,
}

impl<'a> CountingSink<'a> {
    fn new(inner: &'a mut dyn DiagnosticSink) -> Self {
        CountingSink {
            inner,
            reported: 0,
            errors: 0,
        }
    }
}

impl DiagnosticSink for CountingSink<'_> {
    fn report(&mut self, diagnostic: Diagnostic) {
        self.reported += 1;
        if diagnostic.is_error() {
            self.errors += 1;
        }
        self.inner.report(diagnostic);
    }
}
