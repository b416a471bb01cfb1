//! Text sentiment classification
//!
//! [`Classifier`] is the boundary the scorer talks to; swap in a model-backed
//! implementation without touching aggregation. [`LexiconClassifier`] is the
//! bundled keyword implementation that needs no model runtime.

use std::collections::HashMap;

#[cfg(test)]
use mockall::automock;

use crate::error::Result;

use super::SentimentLabel;

/// Raw classifier output for one input text
#[derive(Debug, Clone, PartialEq)]
pub struct Classification {
    pub label: SentimentLabel,
    /// Confidence in the label, in [0, 1]
    pub confidence: f64,
}

/// Batch text classifier.
///
/// Implementations must return exactly one result per input, in input order.
#[cfg_attr(test, automock)]
pub trait Classifier: Send + Sync {
    fn classify(&self, texts: &[String]) -> Result<Vec<Classification>>;
}

/// Squashing constant for the compound score
const NORM_ALPHA: f64 = 2.0;

/// Compound scores inside this band are treated as neutral
const NEUTRAL_BAND: f64 = 0.05;

/// Keyword-based sentiment classifier.
///
/// Sums lexicon scores over the words of a text, adjusts each hit for
/// boosters and negations in the preceding three words, then squashes the
/// total into [-1, 1] to derive a label and confidence.
pub struct LexiconClassifier {
    lexicon: HashMap<String, f64>,
    emojis: HashMap<char, f64>,
    boosters: HashMap<String, f64>,
    negations: Vec<String>,
}

impl LexiconClassifier {
    pub fn new() -> Self {
        let mut classifier = Self {
            lexicon: HashMap::new(),
            emojis: HashMap::new(),
            boosters: HashMap::new(),
            negations: Vec::new(),
        };
        classifier.init_lexicons();
        classifier
    }

    fn init_lexicons(&mut self) {
        let positive_words = [
            ("good", 0.5),
            ("great", 0.7),
            ("excellent", 0.8),
            ("amazing", 0.8),
            ("best", 0.6),
            ("strong", 0.5),
            ("positive", 0.5),
            ("confident", 0.5),
            ("optimistic", 0.5),
            ("promising", 0.5),
            ("win", 0.6),
            ("winning", 0.6),
            ("surge", 0.6),
            ("soar", 0.7),
            ("gain", 0.5),
            ("rally", 0.6),
            ("breakthrough", 0.7),
            ("success", 0.6),
            ("approved", 0.6),
            ("bullish", 0.7),
            ("moon", 0.8),
            ("mooning", 0.8),
            ("pump", 0.5),
            ("ath", 0.7),
            ("undervalued", 0.4),
            ("adoption", 0.4),
        ];

        let negative_words = [
            ("bad", -0.5),
            ("terrible", -0.8),
            ("awful", -0.8),
            ("weak", -0.4),
            ("negative", -0.5),
            ("worried", -0.5),
            ("concerned", -0.4),
            ("concerns", -0.4),
            ("disappointing", -0.6),
            ("disappointed", -0.6),
            ("lose", -0.5),
            ("losing", -0.5),
            ("decline", -0.5),
            ("drop", -0.4),
            ("crash", -0.8),
            ("fail", -0.6),
            ("failing", -0.6),
            ("failed", -0.6),
            ("doubt", -0.4),
            ("risky", -0.4),
            ("issues", -0.4),
            ("problem", -0.4),
            ("problems", -0.4),
            ("delayed", -0.4),
            ("bearish", -0.7),
            ("dump", -0.6),
            ("rekt", -0.8),
            ("scam", -0.9),
            ("fud", -0.5),
            ("overvalued", -0.4),
            ("bubble", -0.5),
        ];

        let emoji_scores = [
            ('\u{1F680}', 0.8),  // rocket
            ('\u{1F4C8}', 0.6),  // chart up
            ('\u{1F48E}', 0.5),  // gem
            ('\u{1F525}', 0.5),  // fire
            ('\u{1F4C9}', -0.6), // chart down
            ('\u{1F480}', -0.7), // skull
            ('\u{1F921}', -0.5), // clown
        ];

        let booster_words = [
            ("very", 1.3),
            ("extremely", 1.5),
            ("really", 1.2),
            ("highly", 1.3),
            ("incredibly", 1.5),
            ("massively", 1.5),
            ("super", 1.3),
            ("slightly", 0.7),
            ("somewhat", 0.8),
            ("barely", 0.6),
        ];

        let negation_words = [
            "not", "no", "never", "isnt", "wasnt", "dont", "doesnt", "didnt", "wont", "cant",
            "couldnt", "shouldnt", "without", "neither", "nor",
        ];

        for (word, score) in positive_words {
            self.lexicon.insert(word.to_string(), score);
        }
        for (word, score) in negative_words {
            self.lexicon.insert(word.to_string(), score);
        }
        for (emoji, score) in emoji_scores {
            self.emojis.insert(emoji, score);
        }
        for (word, factor) in booster_words {
            self.boosters.insert(word.to_string(), factor);
        }
        for word in negation_words {
            self.negations.push(word.to_string());
        }
    }

    /// Lowercase a token and strip everything except letters and digits
    fn clean_word(word: &str) -> String {
        word.chars()
            .filter(|c| c.is_alphanumeric())
            .collect::<String>()
            .to_lowercase()
    }

    /// Apply boosters and negations from the three preceding words
    fn apply_modifiers(&self, base: f64, index: usize, words: &[String]) -> f64 {
        let mut score = base;
        let start = index.saturating_sub(3);
        for prior in &words[start..index] {
            if let Some(factor) = self.boosters.get(prior) {
                score *= factor;
            }
            if self.negations.iter().any(|n| n == prior) {
                score *= -0.5;
            }
        }
        score.clamp(-1.0, 1.0)
    }

    fn score_text(&self, text: &str) -> f64 {
        let words: Vec<String> = text.split_whitespace().map(Self::clean_word).collect();

        let mut total = 0.0;
        for (index, word) in words.iter().enumerate() {
            if word.is_empty() {
                continue;
            }
            if let Some(score) = self.lexicon.get(word) {
                total += self.apply_modifiers(*score, index, &words);
            }
        }
        for c in text.chars() {
            if let Some(score) = self.emojis.get(&c) {
                total += score;
            }
        }
        total
    }

    fn classify_one(&self, text: &str) -> Classification {
        let total = self.score_text(text);
        if total == 0.0 {
            return Classification {
                label: SentimentLabel::Neutral,
                confidence: 1.0,
            };
        }

        let compound = total / (total * total + NORM_ALPHA).sqrt();
        if compound >= NEUTRAL_BAND {
            Classification {
                label: SentimentLabel::Positive,
                confidence: compound.min(1.0),
            }
        } else if compound <= -NEUTRAL_BAND {
            Classification {
                label: SentimentLabel::Negative,
                confidence: (-compound).min(1.0),
            }
        } else {
            Classification {
                label: SentimentLabel::Neutral,
                confidence: 1.0 - compound.abs(),
            }
        }
    }
}

impl Default for LexiconClassifier {
    fn default() -> Self {
        Self::new()
    }
}

impl Classifier for LexiconClassifier {
    fn classify(&self, texts: &[String]) -> Result<Vec<Classification>> {
        Ok(texts.iter().map(|t| self.classify_one(t)).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classify_single(text: &str) -> Classification {
        let classifier = LexiconClassifier::new();
        let results = classifier.classify(&[text.to_string()]).unwrap();
        results.into_iter().next().unwrap()
    }

    #[test]
    fn test_positive_text() {
        let result = classify_single("Bullish on this, the rally looks strong");
        assert_eq!(result.label, SentimentLabel::Positive);
        assert!(result.confidence > 0.3);
    }

    #[test]
    fn test_negative_text() {
        let result = classify_single("This is a scam and the price will crash");
        assert_eq!(result.label, SentimentLabel::Negative);
        assert!(result.confidence > 0.3);
    }

    #[test]
    fn test_neutral_text() {
        let result = classify_single("The committee meets on Thursday afternoon");
        assert_eq!(result.label, SentimentLabel::Neutral);
        assert!((result.confidence - 1.0).abs() < 0.001);
    }

    #[test]
    fn test_empty_text() {
        let result = classify_single("");
        assert_eq!(result.label, SentimentLabel::Neutral);
    }

    #[test]
    fn test_negation_flips_sentiment() {
        let result = classify_single("not good at all");
        assert_eq!(result.label, SentimentLabel::Negative);
    }

    #[test]
    fn test_booster_raises_confidence() {
        let plain = classify_single("bullish");
        let boosted = classify_single("extremely bullish");
        assert_eq!(boosted.label, SentimentLabel::Positive);
        assert!(boosted.confidence > plain.confidence);
    }

    #[test]
    fn test_punctuation_stripped() {
        let result = classify_single("Bullish!!!");
        assert_eq!(result.label, SentimentLabel::Positive);
    }

    #[test]
    fn test_emoji_scored() {
        let result = classify_single("\u{1F680}\u{1F680}");
        assert_eq!(result.label, SentimentLabel::Positive);
    }

    #[test]
    fn test_batch_preserves_order_and_length() {
        let classifier = LexiconClassifier::new();
        let texts = vec![
            "amazing breakthrough".to_string(),
            "terrible crash incoming".to_string(),
            "scheduled maintenance window".to_string(),
        ];
        let results = classifier.classify(&texts).unwrap();
        assert_eq!(results.len(), 3);
        assert_eq!(results[0].label, SentimentLabel::Positive);
        assert_eq!(results[1].label, SentimentLabel::Negative);
        assert_eq!(results[2].label, SentimentLabel::Neutral);
    }

    #[test]
    fn test_default_matches_new() {
        let result = LexiconClassifier::default()
            .classify(&["great".to_string()])
            .unwrap();
        assert_eq!(result[0].label, SentimentLabel::Positive);
    }
}
