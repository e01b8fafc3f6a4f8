//! Pairwise similarity computation and duplicate aggregation
//!
//! Computes cosine similarity between every pair of paragraph vectors in a
//! batch. This O(n²) pass is the system's dominant cost and runs exactly
//! once per batch, over the full corpus, never per URL: TF-IDF weights are
//! only comparable within one fit. The resulting matrix is a read-only
//! artifact shared with the aggregation step.

use crate::config::AnalysisConfig;
use crate::types::{Corpus, DuplicatePair, DuplicateReport, PageUrl};
use crate::vectorize::{TfidfMatrix, TfidfVectorizer};
use std::collections::HashMap;
use tracing::debug;

/// Square, symmetric cosine-similarity matrix indexed by corpus position.
///
/// Values are in [0, 1] with the diagonal fixed at 1. Immutable after
/// construction.
#[derive(Debug, Clone)]
pub struct SimilarityMatrix {
    n: usize,
    values: Vec<f32>,
}

impl SimilarityMatrix {
    /// Compute the full pairwise matrix from a term-weight matrix.
    /// Rows are unit-length, so cosine reduces to a sparse dot product.
    pub fn compute(matrix: &TfidfMatrix) -> Self {
        let n = matrix.len();
        let mut values = vec![0.0f32; n * n];

        for i in 0..n {
            values[i * n + i] = 1.0;
            for j in (i + 1)..n {
                let raw = sparse_dot(matrix.row(i), matrix.row(j));
                // Snap near-unit products to 1: identical paragraphs must
                // compare as exactly 1.0 despite normalization rounding
                let sim = if raw > 1.0 - 1e-6 {
                    1.0
                } else {
                    raw.clamp(0.0, 1.0)
                };
                values[i * n + j] = sim;
                values[j * n + i] = sim;
            }
        }

        Self { n, values }
    }

    /// Similarity between corpus positions `i` and `j`
    pub fn get(&self, i: usize, j: usize) -> f32 {
        self.values[i * self.n + j]
    }

    /// Number of paragraphs the matrix covers
    pub fn len(&self) -> usize {
        self.n
    }

    pub fn is_empty(&self) -> bool {
        self.n == 0
    }
}

/// Dot product of two sparse rows sorted by term id
fn sparse_dot(a: &[(u32, f32)], b: &[(u32, f32)]) -> f32 {
    let mut sum = 0.0;
    let (mut i, mut j) = (0, 0);
    while i < a.len() && j < b.len() {
        match a[i].0.cmp(&b[j].0) {
            std::cmp::Ordering::Less => i += 1,
            std::cmp::Ordering::Greater => j += 1,
            std::cmp::Ordering::Equal => {
                sum += a[i].1 * b[j].1;
                i += 1;
                j += 1;
            }
        }
    }
    sum
}

/// Classify paragraph pairs as duplicates.
///
/// A pair qualifies when its similarity reaches `similarity_threshold`
/// (inclusive) and, unless `count_intra_url` is set, the two paragraphs come
/// from different URLs. Pairs are returned with `a < b`.
pub fn classify(
    similarity: &SimilarityMatrix,
    corpus: &Corpus,
    config: &AnalysisConfig,
) -> Vec<DuplicatePair> {
    let paragraphs = corpus.paragraphs();
    debug_assert_eq!(similarity.len(), paragraphs.len());

    let mut pairs = Vec::new();
    for i in 0..similarity.len() {
        for j in (i + 1)..similarity.len() {
            let sim = similarity.get(i, j);
            if sim < config.similarity_threshold {
                continue;
            }
            if !config.count_intra_url && paragraphs[i].url == paragraphs[j].url {
                continue;
            }
            pairs.push(DuplicatePair {
                a: i,
                b: j,
                similarity: sim,
            });
        }
    }

    debug!(
        "Classified {} duplicate pairs among {} paragraphs (threshold {})",
        pairs.len(),
        similarity.len(),
        config.similarity_threshold
    );
    pairs
}

/// Roll qualifying pairs up into one report per URL.
///
/// Both endpoints of every pair are flagged for their owning page. Every URL
/// known to the corpus receives a report, including pages that contributed
/// zero paragraphs (rate 0).
pub fn aggregate(pairs: &[DuplicatePair], corpus: &Corpus) -> HashMap<PageUrl, DuplicateReport> {
    let paragraphs = corpus.paragraphs();
    let mut flagged: HashMap<&str, Vec<usize>> = HashMap::new();

    for pair in pairs {
        for &pos in &[pair.a, pair.b] {
            let paragraph = &paragraphs[pos];
            flagged
                .entry(paragraph.url.as_str())
                .or_default()
                .push(paragraph.index);
        }
    }

    corpus
        .urls()
        .iter()
        .map(|url| {
            let indexes = flagged.remove(url.as_str()).unwrap_or_default();
            let report = DuplicateReport::new(url.clone(), corpus.paragraph_count(url), indexes);
            (url.clone(), report)
        })
        .collect()
}

/// Compute per-URL duplicate reports for a tokenized corpus.
///
/// Pure given its inputs: vectorize, compute pairwise similarity, classify,
/// aggregate. An empty corpus short-circuits to zero-rate reports for every
/// known URL.
pub fn compute_duplicates(
    corpus: &Corpus,
    config: &AnalysisConfig,
) -> HashMap<PageUrl, DuplicateReport> {
    if corpus.is_empty() {
        return corpus
            .urls()
            .iter()
            .map(|url| (url.clone(), DuplicateReport::empty(url.clone(), 0)))
            .collect();
    }

    let token_rows: Vec<Vec<String>> = corpus
        .paragraphs()
        .iter()
        .map(|p| p.tokens.clone())
        .collect();

    let matrix = TfidfVectorizer::new().fit_transform(&token_rows);
    let similarity = SimilarityMatrix::compute(&matrix);
    let pairs = classify(&similarity, corpus, config);
    aggregate(&pairs, corpus)
}
