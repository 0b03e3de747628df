//! Diagnostic queue for collecting, deduplicating, and sorting diagnostics.
//!
//! A header included from many files reports the same unresolved include
//! once per inclusion; the queue keeps the first report for each
//! `(kind, path, line)` and drops the rest.

use std::path::PathBuf;

use rustc_hash::FxHashSet;

use crate::{Diagnostic, DiagnosticKind, DiagnosticSink};

type DedupKey = (DiagnosticKind, Option<PathBuf>, Option<u32>);

/// Queue for collecting, deduplicating, and sorting diagnostics.
#[derive(Clone, Debug, Default)]
pub struct DiagnosticQueue {
    diagnostics: Vec<Diagnostic>,
    seen: FxHashSet<DedupKey>,
    error_count: usize,
    /// Diagnostics dropped as duplicates since the last flush.
    suppressed: usize,
}

impl DiagnosticQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a diagnostic.
    ///
    /// Returns `true` if it was queued, `false` if an identical
    /// `(kind, path, line)` entry is already present.
    pub fn add(&mut self, diagnostic: Diagnostic) -> bool {
        let key = (
            diagnostic.kind,
            diagnostic.path.clone(),
            diagnostic.line,
        );
        if !self.seen.insert(key) {
            self.suppressed += 1;
            return false;
        }
        if diagnostic.is_error() {
            self.error_count += 1;
        }
        self.diagnostics.push(diagnostic);
        true
    }

    pub fn error_count(&self) -> usize {
        self.error_count
    }

    pub fn has_errors(&self) -> bool {
        self.error_count > 0
    }

    pub fn suppressed(&self) -> usize {
        self.suppressed
    }

    pub fn len(&self) -> usize {
        self.diagnostics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter()
    }

    /// Sort diagnostics by location and return them.
    ///
    /// Diagnostics without a path sort first; the sort is stable, so
    /// reports at the same location keep their arrival order. Clears the
    /// queue.
    pub fn flush(&mut self) -> Vec<Diagnostic> {
        let already_sorted = self
            .diagnostics
            .windows(2)
            .all(|w| sort_key(&w[0]) <= sort_key(&w[1]));
        if !already_sorted {
            self.diagnostics.sort_by(|a, b| sort_key(a).cmp(&sort_key(b)));
        }

        self.seen.clear();
        self.error_count = 0;
        self.suppressed = 0;
        std::mem::take(&mut self.diagnostics)
    }
}

fn sort_key(diagnostic: &Diagnostic) -> (Option<&PathBuf>, Option<u32>) {
    (diagnostic.path.as_ref(), diagnostic.line)
}

impl DiagnosticSink for DiagnosticQueue {
    fn report(&mut self, diagnostic: Diagnostic) {
        self.add(diagnostic);
    }
}
