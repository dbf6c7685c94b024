//! Keyword extraction for a batch of feedback texts.
//!
//! Small batches use plain word frequency; larger ones use a TF-IDF
//! vectorizer whose vocabulary is capped at `top_n` terms.

use regex::Regex;
use std::collections::{HashMap, HashSet};
use stop_words::{get, LANGUAGE};

use crate::error::{FeedbackError, Result};

/// Words dropped by the frequency fallback
const COMMON_WORDS: [&str; 10] = ["the", "a", "an", "and", "or", "but", "is", "are", "was", "were"];

/// Which extraction path a batch takes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeywordMethod {
    /// Most frequent words, for batches below the TF-IDF minimum
    Frequency,
    /// TF-IDF vocabulary
    TfIdf,
}

/// Extracts representative keywords from a batch of texts
#[derive(Debug, Clone)]
pub struct KeywordExtractor {
    top_n: usize,
    min_batch: usize,
    word_regex: Regex,
    vectorizer: TfIdfVectorizer,
}

impl KeywordExtractor {
    /// Create an extractor returning at most `top_n` keywords; batches with
    /// fewer than `min_batch` texts use the frequency fallback
    pub fn new(top_n: usize, min_batch: usize) -> Result<Self> {
        Ok(Self {
            top_n,
            min_batch,
            word_regex: Regex::new(r"\b\w+\b")?,
            vectorizer: TfIdfVectorizer::english(top_n)?,
        })
    }

    /// Path a batch of `batch_size` texts takes
    #[must_use]
    pub const fn method_for(&self, batch_size: usize) -> KeywordMethod {
        if batch_size < self.min_batch {
            KeywordMethod::Frequency
        } else {
            KeywordMethod::TfIdf
        }
    }

    /// Keywords for `texts`
    pub fn extract<S: AsRef<str>>(&self, texts: &[S]) -> Result<Vec<String>> {
        match self.method_for(texts.len()) {
            KeywordMethod::Frequency => Ok(self.frequency_keywords(texts)),
            KeywordMethod::TfIdf => Ok(self.vectorizer.fit(texts)?.terms),
        }
    }

    /// Most frequent words across `texts`, ties in first-seen order
    #[must_use]
    pub fn frequency_keywords<S: AsRef<str>>(&self, texts: &[S]) -> Vec<String> {
        // word -> (count, first position)
        let mut counts: HashMap<String, (usize, usize)> = HashMap::new();
        let mut position = 0;

        for text in texts {
            let lowered = text.as_ref().to_lowercase();
            for word in self.word_regex.find_iter(&lowered).map(|m| m.as_str()) {
                if word.chars().count() <= 2 || COMMON_WORDS.contains(&word) {
                    continue;
                }
                counts
                    .entry(word.to_string())
                    .or_insert((0, position))
                    .0 += 1;
                position += 1;
            }
        }

        let mut ranked: Vec<(String, (usize, usize))> = counts.into_iter().collect();
        ranked.sort_by(|a, b| b.1 .0.cmp(&a.1 .0).then(a.1 .1.cmp(&b.1 .1)));
        ranked
            .into_iter()
            .take(self.top_n)
            .map(|(word, _)| word)
            .collect()
    }
}

/// TF-IDF vectorizer with English stop word removal and a feature cap
#[derive(Debug, Clone)]
pub struct TfIdfVectorizer {
    max_features: usize,
    token_regex: Regex,
    stopwords: HashSet<String>,
}

/// Vocabulary learned by [`TfIdfVectorizer::fit`]
#[derive(Debug, Clone, PartialEq)]
pub struct Vocabulary {
    /// Selected terms, alphabetical
    pub terms: Vec<String>,
    /// Smoothed IDF weight for each entry of `terms`
    pub idf: Vec<f64>,
}

impl TfIdfVectorizer {
    /// Vectorizer keeping at most `max_features` terms
    pub fn english(max_features: usize) -> Result<Self> {
        let stopwords: HashSet<String> = get(LANGUAGE::English)
            .iter()
            .map(ToString::to_string)
            .collect();

        Ok(Self {
            max_features,
            token_regex: Regex::new(r"\b\w\w+\b")?,
            stopwords,
        })
    }

    /// Lowercased tokens of two or more word characters, stop words removed
    #[must_use]
    pub fn tokenize(&self, text: &str) -> Vec<String> {
        let lowered = text.to_lowercase();
        self.token_regex
            .find_iter(&lowered)
            .map(|m| m.as_str().to_string())
            .filter(|t| !self.stopwords.contains(t))
            .collect()
    }

    /// Learn the vocabulary and IDF weights from `documents`
    ///
    /// The `max_features` terms with the highest corpus-wide frequency are
    /// kept (ties by term order) and then stored alphabetically.
    pub fn fit<S: AsRef<str>>(&self, documents: &[S]) -> Result<Vocabulary> {
        let tokenized: Vec<Vec<String>> = documents
            .iter()
            .map(|d| self.tokenize(d.as_ref()))
            .collect();

        let mut term_freq: HashMap<&str, usize> = HashMap::new();
        let mut doc_freq: HashMap<&str, usize> = HashMap::new();

        for doc in &tokenized {
            let unique: HashSet<&str> = doc.iter().map(String::as_str).collect();
            for term in doc {
                *term_freq.entry(term.as_str()).or_insert(0) += 1;
            }
            for term in unique {
                *doc_freq.entry(term).or_insert(0) += 1;
            }
        }

        if term_freq.is_empty() {
            return Err(FeedbackError::EmptyVocabulary);
        }

        let mut ranked: Vec<(&str, usize)> = term_freq.into_iter().collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(b.0)));
        ranked.truncate(self.max_features);

        let mut terms: Vec<String> = ranked.into_iter().map(|(t, _)| t.to_string()).collect();
        terms.sort();

        let n_docs = tokenized.len() as f64;
        let idf = terms
            .iter()
            .map(|term| {
                let df = doc_freq.get(term.as_str()).copied().unwrap_or(0) as f64;
                ((1.0 + n_docs) / (1.0 + df)).ln() + 1.0
            })
            .collect();

        Ok(Vocabulary { terms, idf })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extractor(top_n: usize) -> KeywordExtractor {
        KeywordExtractor::new(top_n, 3).expect("Failed to create keyword extractor")
    }

    #[test]
    fn test_branch_selection_boundary() {
        let extractor = extractor(10);
        assert_eq!(extractor.method_for(0), KeywordMethod::Frequency);
        assert_eq!(extractor.method_for(2), KeywordMethod::Frequency);
        assert_eq!(extractor.method_for(3), KeywordMethod::TfIdf);
        assert_eq!(extractor.method_for(5), KeywordMethod::TfIdf);
    }

    #[test]
    fn test_frequency_ranking_and_ties() {
        let extractor = extractor(3);
        let texts = ["Refund refund checkout", "The invoice was late, checkout"];
        let keywords = extractor.frequency_keywords(&texts);
        // refund x2 and checkout x2 tie; refund was seen first
        assert_eq!(keywords, vec!["refund", "checkout", "invoice"]);
    }

    #[test]
    fn test_frequency_drops_short_and_common_words() {
        let extractor = extractor(10);
        let keywords = extractor.frequency_keywords(&["it is an ok app and the UI"]);
        assert_eq!(keywords, vec!["app"]);
    }

    #[test]
    fn test_tfidf_vocabulary_is_alphabetical() {
        let vectorizer = TfIdfVectorizer::english(10).expect("vectorizer");
        let vocabulary = vectorizer
            .fit(&["refund payment", "checkout payment", "invoice refund payment"])
            .expect("fit");

        assert_eq!(vocabulary.terms, vec!["checkout", "invoice", "payment", "refund"]);
        // "payment" occurs in every document, so it carries the lowest weight
        let idf = &vocabulary.idf;
        assert!(idf[2] < idf[0]);
        assert!((idf[2] - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_tfidf_caps_by_corpus_frequency() {
        let vectorizer = TfIdfVectorizer::english(2).expect("vectorizer");
        let vocabulary = vectorizer
            .fit(&["zebra checkout checkout", "zebra refund", "checkout invoice"])
            .expect("fit");
        assert_eq!(vocabulary.terms, vec!["checkout", "zebra"]);
    }

    #[test]
    fn test_tfidf_empty_vocabulary() {
        let vectorizer = TfIdfVectorizer::english(10).expect("vectorizer");
        let result = vectorizer.fit(&["the", "and the", "a"]);
        assert!(matches!(result, Err(FeedbackError::EmptyVocabulary)));
    }

    #[test]
    fn test_extract_uses_vectorizer_for_larger_batches() {
        let extractor = extractor(10);
        let keywords = extractor
            .extract(&["Refund refund refund", "checkout", "invoice"])
            .expect("extract");
        // Alphabetical, not frequency ranked
        assert_eq!(keywords, vec!["checkout", "invoice", "refund"]);
    }

    #[test]
    fn test_extract_empty_batch() {
        let extractor = extractor(10);
        let texts: [&str; 0] = [];
        assert!(extractor.extract(&texts).expect("extract").is_empty());
    }
}
