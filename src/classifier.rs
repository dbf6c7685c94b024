//! Per-item labelling: sentiment, category and urgency.
//!
//! Sentiment is delegated to a [`SentimentScorer`] chosen once when the
//! classifier is built. Category and urgency are fixed regex rules.

use anyhow::Result;
use regex::Regex;

use crate::config::AnalysisConfig;
use crate::models::{Category, ClassifiedItem, FeedbackItem, Sentiment, Urgency};

/// Weighted positive lexicon
const POSITIVE_WORDS: &[(&str, f32)] = &[
    ("good", 1.0),
    ("great", 1.5),
    ("excellent", 2.0),
    ("amazing", 2.0),
    ("wonderful", 1.8),
    ("fantastic", 1.8),
    ("happy", 1.2),
    ("love", 2.0),
    ("like", 1.0),
    ("best", 1.5),
    ("better", 1.2),
    ("awesome", 1.8),
    ("perfect", 2.0),
    ("brilliant", 1.8),
    ("outstanding", 1.8),
    ("superb", 1.8),
    ("delightful", 1.5),
    ("pleased", 1.2),
    ("satisfied", 1.0),
    ("excited", 1.5),
    ("grateful", 1.5),
    ("recommend", 1.2),
    ("helpful", 1.2),
    ("easy", 1.0),
    ("fast", 1.0),
    ("smooth", 1.0),
];

/// Weighted negative lexicon
const NEGATIVE_WORDS: &[(&str, f32)] = &[
    ("bad", -1.0),
    ("terrible", -2.0),
    ("awful", -2.0),
    ("horrible", -2.0),
    ("worst", -2.0),
    ("hate", -2.0),
    ("dislike", -1.0),
    ("poor", -1.2),
    ("disappointing", -1.5),
    ("disappointed", -1.5),
    ("sad", -1.2),
    ("angry", -1.5),
    ("upset", -1.2),
    ("frustrated", -1.5),
    ("frustrating", -1.5),
    ("annoyed", -1.2),
    ("annoying", -1.2),
    ("useless", -1.5),
    ("worthless", -1.8),
    ("broken", -1.5),
    ("slow", -1.0),
    ("confusing", -1.2),
    ("unusable", -1.8),
    ("crash", -1.5),
    ("crashes", -1.5),
    ("fails", -1.2),
];

/// Words that scale the sentiment of the following word
const INTENSIFIERS: &[(&str, f32)] = &[
    ("very", 1.5),
    ("extremely", 2.0),
    ("incredibly", 2.0),
    ("absolutely", 2.0),
    ("completely", 1.8),
    ("totally", 1.8),
    ("really", 1.3),
    ("so", 1.2),
    ("quite", 1.2),
    ("rather", 1.1),
    ("somewhat", 0.8),
    ("slightly", 0.7),
    ("barely", 0.5),
    ("hardly", 0.5),
];

/// Words that flip the sentiment of a word up to two positions later
const NEGATIONS: &[&str] = &[
    "not", "no", "never", "none", "nothing", "nobody", "nowhere", "neither", "nor", "don't",
    "doesn't", "isn't", "wasn't", "can't", "won't",
];

/// Fixed positive terms for the word-list fallback
const FALLBACK_POSITIVE: [&str; 6] = ["good", "great", "excellent", "amazing", "love", "like"];
/// Fixed negative terms for the word-list fallback
const FALLBACK_NEGATIVE: [&str; 6] = ["bad", "poor", "terrible", "awful", "hate", "dislike"];

const BUG_PATTERN: &str = r"(?i)(bug|error|crash|issue|not working|broken|fails|failure)";
const FEATURE_PATTERN: &str =
    r"(?i)(feature|add|can you make|wishlist|would be nice|please include)";
const UX_PATTERN: &str = r"(?i)(slow|bad ux|confusing|difficult|hard to use|complicated)";
const POSITIVE_PATTERN: &str = r"(?i)(great|love|awesome|happy|excellent|amazing|good)";
const URGENT_PATTERN: &str = r"(?i)(crash|urgent|critical|emergency|severe|blocked)";

/// Assigns a sentiment label to a piece of text
///
/// Implementations never fail; anything they cannot judge is neutral.
#[cfg_attr(test, mockall::automock)]
pub trait SentimentScorer: Send + Sync {
    /// Short identifier used in logs
    fn name(&self) -> &'static str;

    /// Sentiment label for `text`
    fn sentiment(&self, text: &str) -> Sentiment;
}

/// Weighted lexicon scorer with intensifier and negation handling
#[derive(Debug, Clone)]
pub struct LexiconScorer {
    positive_threshold: f32,
    negative_threshold: f32,
}

impl Default for LexiconScorer {
    fn default() -> Self {
        Self::new(0.1, -0.1)
    }
}

impl LexiconScorer {
    /// Scorer mapping polarity above `positive_threshold` to positive and
    /// below `negative_threshold` to negative
    #[must_use]
    pub const fn new(positive_threshold: f32, negative_threshold: f32) -> Self {
        Self {
            positive_threshold,
            negative_threshold,
        }
    }

    /// Polarity of `text` in `[-1.0, 1.0]`; 0.0 when no lexicon word occurs
    #[must_use]
    pub fn polarity(&self, text: &str) -> f32 {
        let words: Vec<String> = text
            .split_whitespace()
            .map(|w| {
                w.trim_matches(|c: char| !c.is_alphanumeric() && c != '\'')
                    .to_lowercase()
            })
            .filter(|w| !w.is_empty())
            .collect();

        let mut total_sentiment = 0.0_f32;
        let mut word_count = 0.0_f32;

        for (i, word) in words.iter().enumerate() {
            let weight = POSITIVE_WORDS
                .iter()
                .chain(NEGATIVE_WORDS)
                .find(|(w, _)| *w == word.as_str())
                .map(|(_, weight)| *weight);

            let Some(mut sentiment) = weight else {
                continue;
            };

            // Check for intensifiers before this word
            if i > 0 {
                if let Some((_, intensity)) =
                    INTENSIFIERS.iter().find(|(w, _)| *w == words[i - 1].as_str())
                {
                    sentiment *= *intensity;
                }
            }

            // Check for negations before this word
            let has_negation = (i >= 1 && NEGATIONS.contains(&words[i - 1].as_str()))
                || (i >= 2 && NEGATIONS.contains(&words[i - 2].as_str()));

            if has_negation {
                sentiment = -sentiment * 0.8; // Flip and reduce intensity
            }

            total_sentiment += sentiment;
            word_count += 1.0;
        }

        if word_count == 0.0 {
            0.0
        } else {
            (total_sentiment / word_count).clamp(-1.0, 1.0)
        }
    }
}

impl SentimentScorer for LexiconScorer {
    fn name(&self) -> &'static str {
        "lexicon"
    }

    fn sentiment(&self, text: &str) -> Sentiment {
        let score = self.polarity(text);
        if score > self.positive_threshold {
            Sentiment::Positive
        } else if score < self.negative_threshold {
            Sentiment::Negative
        } else {
            Sentiment::Neutral
        }
    }
}

/// Counts fixed positive and negative terms; the larger count wins
///
/// Terms match as case-insensitive substrings, so "dislike" also counts as
/// "like".
#[derive(Debug, Clone, Copy, Default)]
pub struct WordListScorer;

impl SentimentScorer for WordListScorer {
    fn name(&self) -> &'static str {
        "wordlist"
    }

    fn sentiment(&self, text: &str) -> Sentiment {
        let text = text.to_lowercase();
        let positive = FALLBACK_POSITIVE.iter().filter(|w| text.contains(*w)).count();
        let negative = FALLBACK_NEGATIVE.iter().filter(|w| text.contains(*w)).count();

        match positive.cmp(&negative) {
            std::cmp::Ordering::Greater => Sentiment::Positive,
            std::cmp::Ordering::Less => Sentiment::Negative,
            std::cmp::Ordering::Equal => Sentiment::Neutral,
        }
    }
}

/// Build the scorer named by `analysis.sentiment_scorer`
pub fn scorer_from_config(config: &AnalysisConfig) -> Result<Box<dyn SentimentScorer>> {
    match config.sentiment_scorer.as_str() {
        "lexicon" => Ok(Box::new(LexiconScorer::new(
            config.positive_threshold,
            config.negative_threshold,
        ))),
        "wordlist" => Ok(Box::new(WordListScorer)),
        other => Err(anyhow::anyhow!("Unknown sentiment scorer: {other}")),
    }
}

/// Labels feedback items with sentiment, category and urgency
pub struct TextClassifier {
    scorer: Box<dyn SentimentScorer>,
    category_rules: Vec<(Category, Regex)>,
    urgent_terms: Regex,
}

impl TextClassifier {
    /// Create a classifier around `scorer`
    pub fn new(scorer: Box<dyn SentimentScorer>) -> Result<Self> {
        // Priority order: the first matching rule wins
        let category_rules = vec![
            (Category::Bug, Regex::new(BUG_PATTERN)?),
            (Category::FeatureRequest, Regex::new(FEATURE_PATTERN)?),
            (Category::UxIssue, Regex::new(UX_PATTERN)?),
            (Category::PositiveFeedback, Regex::new(POSITIVE_PATTERN)?),
        ];
        let urgent_terms = Regex::new(URGENT_PATTERN)?;

        Ok(Self {
            scorer,
            category_rules,
            urgent_terms,
        })
    }

    /// Name of the injected sentiment scorer
    #[must_use]
    pub fn scorer_name(&self) -> &'static str {
        self.scorer.name()
    }

    /// Sentiment of `text`
    #[must_use]
    pub fn sentiment(&self, text: &str) -> Sentiment {
        self.scorer.sentiment(text)
    }

    /// Category of `text`
    #[must_use]
    pub fn categorize(&self, text: &str) -> Category {
        self.category_rules
            .iter()
            .find(|(_, pattern)| pattern.is_match(text))
            .map_or(Category::Other, |(category, _)| *category)
    }

    /// Urgency from the already derived labels and the text
    #[must_use]
    pub fn urgency(&self, category: Category, sentiment: Sentiment, text: &str) -> Urgency {
        let negative = sentiment == Sentiment::Negative;
        match category {
            Category::Bug if negative || self.urgent_terms.is_match(text) => Urgency::High,
            Category::Bug | Category::UxIssue if negative => Urgency::Medium,
            _ => Urgency::Low,
        }
    }

    /// Derive all labels for one item
    #[must_use]
    pub fn classify(&self, item: FeedbackItem) -> ClassifiedItem {
        let sentiment = self.sentiment(&item.text);
        let category = self.categorize(&item.text);
        let urgency = self.urgency(category, sentiment, &item.text);

        ClassifiedItem {
            item,
            sentiment,
            category,
            urgency,
        }
    }
}

impl std::fmt::Debug for TextClassifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TextClassifier")
            .field("scorer", &self.scorer.name())
            .finish_non_exhaustive()
    }
}
