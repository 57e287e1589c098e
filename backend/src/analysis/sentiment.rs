use std::cmp::Ordering;
use std::collections::HashSet;
use std::sync::OnceLock;

use serde::Serialize;

use crate::models::journal::Sentiment;

const POSITIVE_WORDS: &[&str] = &[
    "happy",
    "joy",
    "excited",
    "grateful",
    "love",
    "amazing",
    "wonderful",
    "great",
    "fantastic",
    "blessed",
];

const NEGATIVE_WORDS: &[&str] = &[
    "sad",
    "angry",
    "frustrated",
    "terrible",
    "awful",
    "hate",
    "depressed",
    "anxious",
    "worried",
    "scared",
];

/// Keyword hit counts for a piece of text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SentimentScore {
    pub positive: usize,
    pub negative: usize,
}

impl SentimentScore {
    pub fn sentiment(&self) -> Sentiment {
        match self.positive.cmp(&self.negative) {
            Ordering::Greater => Sentiment::Positive,
            Ordering::Less => Sentiment::Negative,
            Ordering::Equal => Sentiment::Neutral,
        }
    }
}

/// Positive and negative word sets, stored lower-cased.
///
/// Matching is exact per whitespace-separated token: no stemming, no substring
/// matches, and punctuation stays attached to the word (`"happy!"` is not a hit).
#[derive(Debug, Clone)]
pub struct Lexicon {
    positive: HashSet<String>,
    negative: HashSet<String>,
}

impl Lexicon {
    pub fn new<P, N>(positive: P, negative: N) -> Self
    where
        P: IntoIterator,
        P::Item: AsRef<str>,
        N: IntoIterator,
        N::Item: AsRef<str>,
    {
        Self {
            positive: positive
                .into_iter()
                .map(|w| w.as_ref().to_lowercase())
                .collect(),
            negative: negative
                .into_iter()
                .map(|w| w.as_ref().to_lowercase())
                .collect(),
        }
    }

    pub fn score(&self, text: &str) -> SentimentScore {
        let mut score = SentimentScore::default();
        for token in text.split_whitespace() {
            let token = token.to_lowercase();
            // A word listed in both sets counts toward both sides.
            if self.positive.contains(&token) {
                score.positive += 1;
            }
            if self.negative.contains(&token) {
                score.negative += 1;
            }
        }
        score
    }

    pub fn classify(&self, text: &str) -> Sentiment {
        self.score(text).sentiment()
    }
}

impl Default for Lexicon {
    fn default() -> Self {
        Self::new(POSITIVE_WORDS, NEGATIVE_WORDS)
    }
}

pub fn default_lexicon() -> &'static Lexicon {
    static LEXICON: OnceLock<Lexicon> = OnceLock::new();
    LEXICON.get_or_init(Lexicon::default)
}

/// Classify journal text against the built-in lexicon.
pub fn classify(text: &str) -> Sentiment {
    default_lexicon().classify(text)
}
