//! Similarity Engine
//!
//! Exhaustive cosine scans over a `VectorSource`, split across scoped
//! worker threads for large vocabularies.

use std::ops::Range;
use std::sync::Arc;
use std::time::Instant;

use hashbrown::HashSet;
use tracing::debug;

use crate::config::SearchConfig;
use crate::error::{Error, Result};
use crate::metrics::Metrics;
use crate::model::VectorSource;

use super::math::{add_assign, cosine_with_norms, magnitude, sub_assign};
use super::topk::{Candidate, TopK};

/// One ranked result
#[derive(Debug, Clone, PartialEq)]
pub struct Neighbor {
    pub word: String,
    /// Vocabulary position
    pub index: usize,
    /// Cosine similarity to the query
    pub score: f32,
}

/// Nearest-neighbor queries over any vector source
///
/// Holds no per-query state, so one engine can serve many threads.
#[derive(Debug, Clone, Default)]
pub struct SimilarityEngine {
    config: SearchConfig,
    metrics: Option<Arc<Metrics>>,
}

impl SimilarityEngine {
    pub fn new(config: SearchConfig) -> Self {
        Self {
            config,
            metrics: None,
        }
    }

    /// Record query latencies into `metrics`
    pub fn with_metrics(mut self, metrics: Arc<Metrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// Up to `k` words ranked by descending cosine similarity to `query`.
    ///
    /// Ties keep vocabulary order. A vector with infinite components scores NaN
    /// and ranks after every other word. Words in `exclude` are skipped; ones
    /// not in the vocabulary are ignored.
    pub fn nearest<S>(&self, source: &S, query: &[f32], k: usize, exclude: &[&str]) -> Result<Vec<Neighbor>>
    where
        S: VectorSource + ?Sized,
    {
        let excluded: HashSet<usize> = exclude
            .iter()
            .filter_map(|w| source.vocabulary().get(w))
            .collect();
        self.timed("nearest", || self.search(source, query, k, &excluded))
    }

    /// Up to `k` words closest to `word`, never including `word`
    pub fn nearest_to_word<S>(&self, source: &S, word: &str, k: usize) -> Result<Vec<Neighbor>>
    where
        S: VectorSource + ?Sized,
    {
        let index = lookup(source, word)?;
        let query = source
            .vector_at(index)
            .ok_or_else(|| Error::WordNotFound(word.to_string()))?;
        let excluded = HashSet::from_iter([index]);
        self.timed("nearest", || self.search(source, &query, k, &excluded))
    }

    /// Up to `k` words closest to `sum(positive) - sum(negative)`.
    ///
    /// All input words are excluded from the result.
    pub fn analogy<S>(
        &self,
        source: &S,
        positive: &[&str],
        negative: &[&str],
        k: usize,
    ) -> Result<Vec<Neighbor>>
    where
        S: VectorSource + ?Sized,
    {
        if positive.is_empty() && negative.is_empty() {
            return Err(Error::invalid("analogy needs at least one word"));
        }

        let mut query = vec![0.0f32; source.dimensions()];
        let mut excluded = HashSet::with_capacity(positive.len() + negative.len());
        for &word in positive {
            let index = lookup(source, word)?;
            add_assign(&mut query, &word_vector(source, word, index)?);
            excluded.insert(index);
        }
        for &word in negative {
            let index = lookup(source, word)?;
            sub_assign(&mut query, &word_vector(source, word, index)?);
            excluded.insert(index);
        }

        self.timed("analogy", || self.search(source, &query, k, &excluded))
    }

    fn timed<F>(&self, op: &'static str, f: F) -> Result<Vec<Neighbor>>
    where
        F: FnOnce() -> Result<Vec<Neighbor>>,
    {
        let start = Instant::now();
        let result = f();
        let elapsed = start.elapsed();

        if let Some(metrics) = &self.metrics {
            metrics.record(op, elapsed);
        }
        debug!(op, latency = ?elapsed, ok = result.is_ok(), "Similarity query");
        result
    }

    fn search<S>(&self, source: &S, query: &[f32], k: usize, excluded: &HashSet<usize>) -> Result<Vec<Neighbor>>
    where
        S: VectorSource + ?Sized,
    {
        let dims = source.dimensions();
        if query.len() != dims {
            return Err(Error::DimensionMismatch {
                expected: dims,
                actual: query.len(),
            });
        }

        let n = source.len();
        if k == 0 || n == 0 {
            return Ok(Vec::new());
        }

        let query_norm = magnitude(query);
        let threads = self.config.effective_threads().min(n);

        let top = if threads <= 1 || n < self.config.parallel_threshold {
            scan(source, query, query_norm, 0..n, k, excluded)
        } else {
            let chunk = n.div_ceil(threads);
            let partials = crossbeam::thread::scope(|scope| {
                let handles: Vec<_> = (0..threads)
                    .map(|t| {
                        let range = (t * chunk).min(n)..((t + 1) * chunk).min(n);
                        scope.spawn(move |_| scan(source, query, query_norm, range, k, excluded))
                    })
                    .collect();
                handles
                    .into_iter()
                    .map(|h| h.join().unwrap_or_else(|panic| std::panic::resume_unwind(panic)))
                    .collect::<Vec<_>>()
            })
            .unwrap_or_else(|panic| std::panic::resume_unwind(panic));

            let mut top = TopK::new(k);
            for partial in partials {
                top.merge(partial);
            }
            top
        };

        let vocab = source.vocabulary();
        Ok(top
            .into_sorted()
            .into_iter()
            .filter_map(|c| {
                vocab.word(c.index).map(|word| Neighbor {
                    word: word.to_string(),
                    index: c.index,
                    score: c.score,
                })
            })
            .collect())
    }
}

fn scan<S>(
    source: &S,
    query: &[f32],
    query_norm: f32,
    range: Range<usize>,
    k: usize,
    excluded: &HashSet<usize>,
) -> TopK
where
    S: VectorSource + ?Sized,
{
    let mut top = TopK::new(k);
    for index in range {
        if excluded.contains(&index) {
            continue;
        }
        let Some(vector) = source.vector_at(index) else {
            continue;
        };
        let norm = source
            .precomputed_norm(index)
            .unwrap_or_else(|| magnitude(&vector));
        top.push(Candidate::new(cosine_with_norms(query, &vector, query_norm, norm), index));
    }
    top
}

fn lookup<S: VectorSource + ?Sized>(source: &S, word: &str) -> Result<usize> {
    source
        .vocabulary()
        .get(word)
        .ok_or_else(|| Error::WordNotFound(word.to_string()))
}

fn word_vector<'a, S: VectorSource + ?Sized>(
    source: &'a S,
    word: &str,
    index: usize,
) -> Result<std::borrow::Cow<'a, [f32]>> {
    source
        .vector_at(index)
        .ok_or_else(|| Error::WordNotFound(word.to_string()))
}
