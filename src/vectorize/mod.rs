//! Batch-scoped TF-IDF vectorization
//!
//! Builds a term-weight representation over the full corpus of one batch.
//! Each batch is a fresh fit: no vocabulary persists across runs, so
//! duplicate detection always compares weights scoped to the same corpus.
//! IDF is smoothed and rows are L2-normalized, so cosine similarity between
//! two rows reduces to a sparse dot product.

use std::collections::HashMap;

/// Sparse term-weight matrix, one row per paragraph.
///
/// Row entries are `(term_id, weight)` pairs sorted by term id; rows are
/// unit-length (L2). Read-only after construction.
#[derive(Debug, Clone)]
pub struct TfidfMatrix {
    rows: Vec<Vec<(u32, f32)>>,
    vocabulary_size: usize,
}

impl TfidfMatrix {
    pub fn rows(&self) -> &[Vec<(u32, f32)>] {
        &self.rows
    }

    pub fn row(&self, i: usize) -> &[(u32, f32)] {
        &self.rows[i]
    }

    /// Number of paragraphs (rows)
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Number of distinct terms across the corpus
    pub fn vocabulary_size(&self) -> usize {
        self.vocabulary_size
    }
}

/// TF-IDF vectorizer fitted per batch
#[derive(Debug, Clone, Default)]
pub struct TfidfVectorizer;

impl TfidfVectorizer {
    pub fn new() -> Self {
        Self
    }

    /// Fit a vocabulary over the corpus and transform every paragraph into
    /// a weighted term vector in one pass.
    ///
    /// Weight = raw term frequency × smoothed IDF
    /// (`ln((1 + n) / (1 + df)) + 1`), then L2-normalized per row.
    /// An empty corpus yields an empty matrix; a single-paragraph corpus
    /// yields a 1-row matrix.
    pub fn fit_transform(&self, corpus: &[Vec<String>]) -> TfidfMatrix {
        if corpus.is_empty() {
            return TfidfMatrix {
                rows: Vec::new(),
                vocabulary_size: 0,
            };
        }

        // Vocabulary ids assigned in first-appearance order for determinism
        let mut vocabulary: HashMap<&str, u32> = HashMap::new();
        let mut document_frequency: Vec<u32> = Vec::new();

        let mut counted_rows: Vec<Vec<(u32, u32)>> = Vec::with_capacity(corpus.len());

        for tokens in corpus {
            let mut counts: HashMap<u32, u32> = HashMap::new();
            for token in tokens {
                let next_id = vocabulary.len() as u32;
                let id = *vocabulary.entry(token.as_str()).or_insert_with(|| {
                    document_frequency.push(0);
                    next_id
                });
                *counts.entry(id).or_insert(0) += 1;
            }
            for &id in counts.keys() {
                document_frequency[id as usize] += 1;
            }
            let mut row: Vec<(u32, u32)> = counts.into_iter().collect();
            row.sort_unstable_by_key(|&(id, _)| id);
            counted_rows.push(row);
        }

        let n_docs = corpus.len() as f32;
        let idf: Vec<f32> = document_frequency
            .iter()
            .map(|&df| ((1.0 + n_docs) / (1.0 + df as f32)).ln() + 1.0)
            .collect();

        let rows: Vec<Vec<(u32, f32)>> = counted_rows
            .into_iter()
            .map(|counts| {
                let mut row: Vec<(u32, f32)> = counts
                    .into_iter()
                    .map(|(id, tf)| (id, tf as f32 * idf[id as usize]))
                    .collect();
                let norm: f32 = row.iter().map(|&(_, w)| w * w).sum::<f32>().sqrt();
                if norm > 0.0 {
                    for (_, w) in row.iter_mut() {
                        *w /= norm;
                    }
                }
                row
            })
            .collect();

        TfidfMatrix {
            rows,
            vocabulary_size: vocabulary.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(words: &[&str]) -> Vec<String> {
        words.iter().map(|w| w.to_string()).collect()
    }

    fn dot(a: &[(u32, f32)], b: &[(u32, f32)]) -> f32 {
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

    #[test]
    fn test_empty_corpus_yields_empty_matrix() {
        let matrix = TfidfVectorizer::new().fit_transform(&[]);
        assert!(matrix.is_empty());
        assert_eq!(matrix.vocabulary_size(), 0);
    }

    #[test]
    fn test_single_paragraph_corpus() {
        let corpus = vec![tokens(&["accounting", "course", "accounting"])];
        let matrix = TfidfVectorizer::new().fit_transform(&corpus);
        assert_eq!(matrix.len(), 1);
        assert_eq!(matrix.vocabulary_size(), 2);
    }

    #[test]
    fn test_rows_are_unit_length() {
        let corpus = vec![
            tokens(&["alpha", "beta", "gamma"]),
            tokens(&["alpha", "alpha", "delta"]),
        ];
        let matrix = TfidfVectorizer::new().fit_transform(&corpus);
        for row in matrix.rows() {
            let norm: f32 = row.iter().map(|&(_, w)| w * w).sum::<f32>().sqrt();
            assert!((norm - 1.0).abs() < 1e-5, "row norm {} != 1", norm);
        }
    }

    #[test]
    fn test_identical_rows_have_unit_cosine() {
        let corpus = vec![
            tokens(&["duplicate", "paragraph", "text"]),
            tokens(&["duplicate", "paragraph", "text"]),
        ];
        let matrix = TfidfVectorizer::new().fit_transform(&corpus);
        let sim = dot(matrix.row(0), matrix.row(1));
        assert!((sim - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_disjoint_rows_have_zero_cosine() {
        let corpus = vec![
            tokens(&["alpha", "beta"]),
            tokens(&["gamma", "delta"]),
        ];
        let matrix = TfidfVectorizer::new().fit_transform(&corpus);
        assert_eq!(dot(matrix.row(0), matrix.row(1)), 0.0);
    }

    #[test]
    fn test_idf_downweights_common_terms() {
        // "shared" appears in every paragraph, "rare" only in one; the rare
        // term must dominate its row's weight
        let corpus = vec![
            tokens(&["shared", "rare"]),
            tokens(&["shared", "filler"]),
            tokens(&["shared", "other"]),
        ];
        let matrix = TfidfVectorizer::new().fit_transform(&corpus);

        let row = matrix.row(0);
        let shared_weight = row[0].1;
        let rare_weight = row[1].1;
        assert!(
            rare_weight > shared_weight,
            "rare {} should outweigh shared {}",
            rare_weight,
            shared_weight
        );
    }

    #[test]
    fn test_paragraph_with_no_tokens_yields_empty_row() {
        let corpus = vec![tokens(&[]), tokens(&["word", "text"])];
        let matrix = TfidfVectorizer::new().fit_transform(&corpus);
        assert_eq!(matrix.len(), 2);
        assert!(matrix.row(0).is_empty());
        assert!(!matrix.row(1).is_empty());
    }

    #[test]
    fn test_fit_is_deterministic() {
        let corpus = vec![
            tokens(&["one", "two", "three"]),
            tokens(&["two", "three", "four"]),
        ];
        let v = TfidfVectorizer::new();
        let a = v.fit_transform(&corpus);
        let b = v.fit_transform(&corpus);
        assert_eq!(a.rows(), b.rows());
    }
}
