//! Embedding and entity extraction capabilities
//!
//! [`Embedder`] and [`EntityExtractor`] isolate the matcher from any model
//! runtime. The bundled implementations are deterministic and model free:
//! [`HashEmbedder`] hashes token counts into a fixed-width vector and
//! [`KeywordEntityExtractor`] keeps salient keywords.

use std::collections::hash_map::DefaultHasher;
use std::collections::HashSet;
use std::hash::{Hash, Hasher};

#[cfg(test)]
use mockall::automock;

use crate::error::Result;

/// Common words carrying no matching signal
const STOPWORDS: &[&str] = &[
    "the", "a", "an", "and", "or", "but", "if", "then", "than", "that", "this", "these", "those",
    "is", "are", "was", "were", "be", "been", "being", "am", "will", "would", "can", "could",
    "should", "shall", "may", "might", "must", "have", "has", "had", "do", "does", "did", "not",
    "no", "nor", "of", "in", "on", "at", "to", "for", "from", "by", "with", "about", "into",
    "over", "after", "before", "between", "out", "up", "down", "off", "above", "below", "it",
    "its", "they", "them", "their", "we", "our", "you", "your", "i", "my", "he", "she", "his",
    "her", "what", "which", "who", "whom", "how", "when", "where", "why", "all", "any", "both",
    "each", "few", "more", "most", "some", "such", "only", "own", "same", "so", "too", "very",
    "just", "as", "there",
];

fn is_stopword(token: &str) -> bool {
    STOPWORDS.contains(&token)
}

/// Lowercase alphanumeric tokens in text order
fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(|t| t.to_string())
        .collect()
}

/// Text embedding capability.
///
/// `embed_batch` must return one vector per input, in input order, and every
/// vector from one implementation must share a dimension.
#[cfg_attr(test, automock)]
pub trait Embedder: Send + Sync {
    fn embed(&self, text: &str) -> Result<Vec<f32>>;

    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        texts.iter().map(|t| self.embed(t)).collect()
    }
}

/// Entity extraction capability.
///
/// Infallible: implementations return an empty set when nothing can be
/// extracted.
pub trait EntityExtractor: Send + Sync {
    fn extract_entities(&self, text: &str) -> HashSet<String>;
}

/// Feature-hashed bag of tokens, l2-normalized.
///
/// Stable across processes, so match scores are reproducible between runs.
/// Texts sharing vocabulary land close together; paraphrase similarity needs
/// a model-backed [`Embedder`].
pub struct HashEmbedder {
    dimension: usize,
}

impl HashEmbedder {
    pub const DEFAULT_DIMENSION: usize = 256;

    pub fn new(dimension: usize) -> Self {
        Self {
            dimension: dimension.max(1),
        }
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    fn token_index(&self, token: &str) -> usize {
        // DefaultHasher::new() uses fixed keys, unlike RandomState
        let mut hasher = DefaultHasher::new();
        token.hash(&mut hasher);
        (hasher.finish() % self.dimension as u64) as usize
    }
}

impl Default for HashEmbedder {
    fn default() -> Self {
        Self::new(Self::DEFAULT_DIMENSION)
    }
}

impl Embedder for HashEmbedder {
    fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let mut vector = vec![0.0f32; self.dimension];
        for token in tokenize(text) {
            if token.len() < 2 || is_stopword(&token) {
                continue;
            }
            vector[self.token_index(&token)] += 1.0;
        }

        let norm = vector.iter().map(|v| v * v).sum::<f32>().sqrt();
        if norm > 0.0 {
            for v in &mut vector {
                *v /= norm;
            }
        }
        Ok(vector)
    }
}

/// Keeps lowercase tokens of three or more characters that are not stopwords
pub struct KeywordEntityExtractor {
    min_token_len: usize,
}

impl KeywordEntityExtractor {
    pub fn new() -> Self {
        Self { min_token_len: 3 }
    }
}

impl Default for KeywordEntityExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl EntityExtractor for KeywordEntityExtractor {
    fn extract_entities(&self, text: &str) -> HashSet<String> {
        tokenize(text)
            .into_iter()
            .filter(|t| t.len() >= self.min_token_len && !is_stopword(t))
            .collect()
    }
}

/// Cosine similarity between two vectors, in [-1, 1].
///
/// Returns 0.0 when either vector has zero magnitude or the lengths differ.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return 0.0;
    }

    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|y| y * y).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}
