//! Relevance ranking over a TF-IDF vector space.
//!
//! The space is fitted per query over `{query} ∪ {chunk texts}`, so nothing
//! is persisted between requests. Term weights follow the usual smoothed
//! formulation:
//!
//! - terms are lowercase runs of two or more word characters
//! - `idf(t) = ln((1 + n) / (1 + df(t))) + 1`
//! - each vector is `count(t) * idf(t)`, L2-normalised

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use crate::document::{Chunk, RankedChunk};

static TERM_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b\w\w+\b").expect("unreachable error: failed to compile term pattern")
});

/// Scores chunks against a query and keeps the best ones.
pub trait Ranker: Send + Sync {
    /// Return at most `k` chunks ordered by descending relevance.
    ///
    /// When `chunks.len() <= k` the whole input is returned in its original
    /// order without scores.
    fn rank(&self, chunks: &[Chunk], query: &str, k: usize) -> Vec<RankedChunk>;
}

/// Cosine similarity ranking in a per-query TF-IDF space.
///
/// Ties keep the order in which chunks were supplied, so identical input
/// always yields identical output.
#[derive(Debug, Clone, Copy, Default)]
pub struct TfIdfRanker;

impl TfIdfRanker {
    /// Create a new ranker.
    pub fn new() -> Self {
        Self
    }
}

impl Ranker for TfIdfRanker {
    fn rank(&self, chunks: &[Chunk], query: &str, k: usize) -> Vec<RankedChunk> {
        if chunks.is_empty() || k == 0 {
            return Vec::new();
        }
        if chunks.len() <= k {
            debug!(chunk_count = chunks.len(), k, "corpus within cap, skipping vectorization");
            return chunks.iter().cloned().map(RankedChunk::unscored).collect();
        }

        let mut texts = Vec::with_capacity(chunks.len() + 1);
        texts.push(query);
        texts.extend(chunks.iter().map(|c| c.text.as_str()));

        let mut vectors = TfIdfSpace::fit(&texts).into_vectors();
        let query_vector = vectors.remove(0);

        let mut scored: Vec<(usize, f32)> = vectors
            .iter()
            .enumerate()
            .map(|(i, vector)| (i, query_vector.dot(vector) as f32))
            .collect();

        // `sort_by` is stable, which gives first-seen tie breaking.
        scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));
        scored.truncate(k);

        debug!(
            chunk_count = chunks.len(),
            k,
            best = scored.first().map(|(_, s)| *s),
            "ranked chunks"
        );

        scored
            .into_iter()
            .map(|(i, score)| RankedChunk { chunk: chunks[i].clone(), score: Some(score) })
            .collect()
    }
}

/// Lowercased terms of `text`, in order of appearance.
pub(crate) fn terms(text: &str) -> Vec<String> {
    let lower = text.to_lowercase();
    TERM_PATTERN.find_iter(&lower).map(|m| m.as_str().to_string()).collect()
}

/// An L2-normalised sparse vector keyed by term.
#[derive(Debug, Default)]
struct SparseVector {
    weights: BTreeMap<String, f64>,
}

impl SparseVector {
    fn dot(&self, other: &SparseVector) -> f64 {
        let (small, large) = if self.weights.len() <= other.weights.len() {
            (&self.weights, &other.weights)
        } else {
            (&other.weights, &self.weights)
        };
        small.iter().filter_map(|(term, w)| large.get(term).map(|v| w * v)).sum()
    }
}

/// Term counts per text plus document frequencies across all texts.
struct TfIdfSpace {
    counts: Vec<BTreeMap<String, usize>>,
    document_frequency: BTreeMap<String, usize>,
}

impl TfIdfSpace {
    fn fit(texts: &[&str]) -> Self {
        let mut counts = Vec::with_capacity(texts.len());
        let mut document_frequency: BTreeMap<String, usize> = BTreeMap::new();

        for text in texts {
            let mut tf: BTreeMap<String, usize> = BTreeMap::new();
            for term in terms(text) {
                *tf.entry(term).or_insert(0) += 1;
            }
            for term in tf.keys() {
                *document_frequency.entry(term.clone()).or_insert(0) += 1;
            }
            counts.push(tf);
        }

        Self { counts, document_frequency }
    }

    fn idf(&self, term: &str) -> f64 {
        let n = self.counts.len() as f64;
        let df = self.document_frequency.get(term).copied().unwrap_or(0) as f64;
        ((1.0 + n) / (1.0 + df)).ln() + 1.0
    }

    fn into_vectors(self) -> Vec<SparseVector> {
        self.counts
            .iter()
            .map(|tf| {
                let mut weights: BTreeMap<String, f64> = tf
                    .iter()
                    .map(|(term, count)| (term.clone(), *count as f64 * self.idf(term)))
                    .collect();

                let norm = weights.values().map(|w| w * w).sum::<f64>().sqrt();
                if norm > 0.0 {
                    for w in weights.values_mut() {
                        *w /= norm;
                    }
                }
                SparseVector { weights }
            })
            .collect()
    }
}
