//! Per-run parse cache.
//!
//! Memoizes, per normalized path, the file's token stream and directive
//! tree. Both are environment-independent, so one entry serves every
//! inclusion context. Failures are cached as well: a path is read at most
//! once per cache instance, whatever the outcome.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use porta_lexer::{lex, TokenStream};
use rustc_hash::FxHashMap;
use tracing::{debug, trace};

use crate::{
    build_tree, normalize_path, DirectiveTree, DiskSource, LoadError, SourceError, SourceProvider,
};

/// Owned by one porting run; not shared across threads.
pub struct ParseCache<S = DiskSource> {
    source: S,
    tokens: FxHashMap<PathBuf, Result<Arc<TokenStream>, LoadError>>,
    trees: FxHashMap<PathBuf, Result<Arc<DirectiveTree>, SourceError>>,
}

impl Default for ParseCache<DiskSource> {
    fn default() -> Self {
        ParseCache::new(DiskSource)
    }
}

impl<S: SourceProvider> ParseCache<S> {
    pub fn new(source: S) -> Self {
        ParseCache {
            source,
            tokens: FxHashMap::default(),
            trees: FxHashMap::default(),
        }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Token stream of `path`, read and lexed on first request.
    ///
    /// Every later request for the same path returns the same `Arc`.
    #[tracing::instrument(level = "debug", skip_all, fields(path = %path.display()))]
    pub fn tokens(&mut self, path: &Path) -> Result<Arc<TokenStream>, LoadError> {
        let key = normalize_path(path);
        if let Some(cached) = self.tokens.get(&key) {
            trace!("token cache hit");
            return cached.clone();
        }

        let result = match self.source.read(&key) {
            Ok(text) => {
                let stream = lex(key.clone(), &text);
                debug!(tokens = stream.len(), "lexed");
                Ok(Arc::new(stream))
            }
            Err(err) => {
                debug!(error = %err, "read failed");
                Err(LoadError::from_io(key.clone(), &err))
            }
        };
        self.tokens.insert(key, result.clone());
        result
    }

    /// Directive tree of `path`, built on first request from the cached
    /// token stream.
    #[tracing::instrument(level = "debug", skip_all, fields(path = %path.display()))]
    pub fn tree(&mut self, path: &Path) -> Result<Arc<DirectiveTree>, SourceError> {
        let key = normalize_path(path);
        if let Some(cached) = self.trees.get(&key) {
            trace!("tree cache hit");
            return cached.clone();
        }

        let result = self
            .tokens(&key)
            .map_err(SourceError::from)
            .and_then(|stream| build_tree(stream).map_err(SourceError::from))
            .map(Arc::new);
        if let Ok(tree) = &result {
            debug!(nodes = tree.nodes().len(), depth = tree.max_depth(), "built tree");
        }
        self.trees.insert(key, result.clone());
        result
    }

    /// Install `text` as the contents of `path` without reading it.
    ///
    /// Replaces any cached entry, tree included.
    pub fn insert_source(&mut self, path: &Path, text: &str) -> Arc<TokenStream> {
        let key = normalize_path(path);
        let stream = Arc::new(lex(key.clone(), text));
        self.trees.remove(&key);
        self.tokens.insert(key, Ok(Arc::clone(&stream)));
        stream
    }

    pub fn contains_tokens(&self, path: &Path) -> bool {
        self.tokens.contains_key(&normalize_path(path))
    }

    pub fn contains_tree(&self, path: &Path) -> bool {
        self.trees.contains_key(&normalize_path(path))
    }

    /// Number of paths with a cached token stream (or read failure).
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn clear(&mut self) {
        self.tokens.clear();
        self.trees.clear();
    }
}
