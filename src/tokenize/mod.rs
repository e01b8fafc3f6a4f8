//! Paragraph tokenization and normalization
//!
//! Turns raw paragraph text into the token sequence the vectorizer consumes.
//! Latin-script text is segmented on Unicode word boundaries; runs of Han
//! characters go through dictionary + statistical segmentation (jieba),
//! since character-splitting CJK text destroys TF-IDF's discriminative
//! power. Tokenization is pure and deterministic: no I/O, no shared state.

mod stopwords;

pub use stopwords::Stopwords;

use jieba_rs::Jieba;
use unicode_segmentation::UnicodeSegmentation;

/// Minimum token length in characters. Drops stray single characters left
/// over from punctuation stripping and single-char CJK fragments.
const MIN_TOKEN_CHARS: usize = 2;

/// Tokenizer shared across a batch.
///
/// Holds the segmentation dictionary, which is expensive to build; create
/// once and reuse. `tokenize` itself takes `&self` and is thread-safe.
pub struct Tokenizer {
    jieba: Jieba,
    stopwords: Stopwords,
}

impl std::fmt::Debug for Tokenizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Tokenizer").finish_non_exhaustive()
    }
}

impl Tokenizer {
    /// Create a tokenizer with the embedded segmentation dictionary and the
    /// default stopword set
    pub fn new() -> Self {
        Self {
            jieba: Jieba::new(),
            stopwords: Stopwords::new(),
        }
    }

    /// Tokenize one paragraph. Empty or whitespace-only input yields an
    /// empty sequence, not an error.
    pub fn tokenize(&self, text: &str) -> Vec<String> {
        let mut tokens = Vec::new();

        for (is_han, run) in script_runs(text) {
            if is_han {
                for word in self.jieba.cut(&run, true) {
                    self.push_token(word, &mut tokens);
                }
            } else {
                for word in run.unicode_words() {
                    self.push_token(word, &mut tokens);
                }
            }
        }

        tokens
    }

    fn push_token(&self, word: &str, tokens: &mut Vec<String>) {
        let token = word.trim().to_lowercase();
        if token.chars().count() < MIN_TOKEN_CHARS {
            return;
        }
        if !token.chars().any(char::is_alphanumeric) {
            return;
        }
        if self.stopwords.contains(&token) {
            return;
        }
        tokens.push(token);
    }
}

impl Default for Tokenizer {
    fn default() -> Self {
        Self::new()
    }
}

/// Split text into maximal runs of Han vs. non-Han characters, so each run
/// can be handed to the segmenter suited to its script
fn script_runs(text: &str) -> Vec<(bool, String)> {
    let mut runs: Vec<(bool, String)> = Vec::new();

    for c in text.chars() {
        let han = is_han(c);
        match runs.last_mut() {
            Some((last_han, run)) if *last_han == han => run.push(c),
            _ => runs.push((han, c.to_string())),
        }
    }

    runs
}

/// CJK Unified Ideograph ranges (base, extension A, compatibility)
fn is_han(c: char) -> bool {
    matches!(c,
        '\u{4E00}'..='\u{9FFF}'
        | '\u{3400}'..='\u{4DBF}'
        | '\u{F900}'..='\u{FAFF}'
    )
}
