//! Load and Search Configuration

use crate::format::LoadKind;

/// Options controlling how a model file is loaded
#[derive(Debug, Clone, Default)]
pub struct LoadOptions {
    /// Requested kind (`Auto` infers from the file extension)
    pub kind: LoadKind,

    /// Keep vectors decoded by a memory-mapped store (ignored for eager loads)
    pub cache_vectors: bool,
}

impl LoadOptions {
    /// Set the load kind
    pub fn with_kind(mut self, kind: LoadKind) -> Self {
        self.kind = kind;
        self
    }

    /// Enable or disable the decode cache of lazy stores
    pub fn with_cache(mut self, cache: bool) -> Self {
        self.cache_vectors = cache;
        self
    }
}

/// Similarity search configuration
#[derive(Debug, Clone)]
pub struct SearchConfig {
    /// Number of scan threads (0 = auto-detect)
    pub threads: usize,

    /// Vocabularies smaller than this are scanned on the calling thread
    pub parallel_threshold: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            threads: 0,
            parallel_threshold: 50_000,
        }
    }
}

impl SearchConfig {
    /// Set the number of scan threads
    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = threads;
        self
    }

    /// Set the minimum vocabulary size for a parallel scan
    pub fn with_parallel_threshold(mut self, threshold: usize) -> Self {
        self.parallel_threshold = threshold;
        self
    }

    /// Resolved thread count, never zero
    pub fn effective_threads(&self) -> usize {
        if self.threads == 0 {
            num_cpus::get().max(1)
        } else {
            self.threads
        }
    }
}
