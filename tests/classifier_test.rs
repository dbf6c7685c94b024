use feedback_insights::classifier::{
    scorer_from_config, LexiconScorer, SentimentScorer, TextClassifier, WordListScorer,
};
use feedback_insights::config::AnalysisConfig;
use feedback_insights::{Category, Sentiment, Urgency};

fn lexicon_classifier() -> TextClassifier {
    TextClassifier::new(Box::new(LexiconScorer::default())).expect("Failed to create classifier")
}

#[test]
fn test_lexicon_polarity() {
    let scorer = LexiconScorer::default();

    assert!(scorer.polarity("This is great and amazing!") > 0.0);
    assert!(scorer.polarity("This is terrible and awful!") < 0.0);
    assert!(scorer.polarity("The meeting is at noon").abs() < f32::EPSILON);
}

#[test]
fn test_lexicon_negation_and_intensifiers() {
    let scorer = LexiconScorer::default();

    assert_eq!(scorer.sentiment("not good at all"), Sentiment::Negative);
    assert_eq!(scorer.sentiment("I don't hate it"), Sentiment::Positive);
    assert!(scorer.polarity("very good") >= scorer.polarity("good"));
}

#[test]
fn test_lexicon_thresholds_are_configurable() {
    // "slightly good" scores 0.7; a 0.8 threshold keeps it neutral
    let strict = LexiconScorer::new(0.8, -0.8);
    assert_eq!(strict.sentiment("slightly good"), Sentiment::Neutral);
    assert_eq!(LexiconScorer::default().sentiment("slightly good"), Sentiment::Positive);
}

#[test]
fn test_wordlist_majority_and_ties() {
    let scorer = WordListScorer;

    assert_eq!(scorer.sentiment("Great app, love it"), Sentiment::Positive);
    assert_eq!(scorer.sentiment("Awful and terrible"), Sentiment::Negative);
    assert_eq!(scorer.sentiment("good but bad"), Sentiment::Neutral);
    assert_eq!(scorer.sentiment("nothing to report"), Sentiment::Neutral);
    // "dislike" contains "like": one positive, one negative
    assert_eq!(scorer.sentiment("I dislike it"), Sentiment::Neutral);
}

#[test]
fn test_scorer_from_config() {
    let mut config = AnalysisConfig::default();
    assert_eq!(scorer_from_config(&config).expect("scorer").name(), "lexicon");

    config.sentiment_scorer = "wordlist".to_string();
    assert_eq!(scorer_from_config(&config).expect("scorer").name(), "wordlist");

    config.sentiment_scorer = "vader".to_string();
    assert!(scorer_from_config(&config).is_err());
}

#[test]
fn test_category_priority_order() {
    let classifier = lexicon_classifier();

    // bug wins over positive feedback
    assert_eq!(classifier.categorize("I love it but found a bug"), Category::Bug);
    // feature request wins over ux issue
    assert_eq!(
        classifier.categorize("Would be nice if it were less confusing"),
        Category::FeatureRequest
    );
    assert_eq!(classifier.categorize("Search is SLOW"), Category::UxIssue);
    assert_eq!(classifier.categorize("Awesome work"), Category::PositiveFeedback);
    assert_eq!(classifier.categorize("Shipped on Tuesday"), Category::Other);
}

#[test]
fn test_category_multiword_patterns() {
    let classifier = lexicon_classifier();

    assert_eq!(classifier.categorize("Login is not working"), Category::Bug);
    assert_eq!(classifier.categorize("can you make it blue"), Category::FeatureRequest);
    assert_eq!(classifier.categorize("the menu is hard to use"), Category::UxIssue);
}

#[test]
fn test_urgency_rules() {
    let classifier = lexicon_classifier();

    assert_eq!(
        classifier.urgency(Category::Bug, Sentiment::Negative, "app crashes on login"),
        Urgency::High
    );
    assert_eq!(
        classifier.urgency(Category::Bug, Sentiment::Negative, "minor typo"),
        Urgency::High
    );
    assert_eq!(
        classifier.urgency(Category::Bug, Sentiment::Neutral, "blocked on export"),
        Urgency::High
    );
    assert_eq!(
        classifier.urgency(Category::Bug, Sentiment::Neutral, "small glitch"),
        Urgency::Low
    );
    assert_eq!(
        classifier.urgency(Category::UxIssue, Sentiment::Negative, "slow"),
        Urgency::Medium
    );
    assert_eq!(
        classifier.urgency(Category::UxIssue, Sentiment::Neutral, "critical"),
        Urgency::Low
    );
    assert_eq!(
        classifier.urgency(Category::FeatureRequest, Sentiment::Negative, "urgent"),
        Urgency::Low
    );
}

#[test]
fn test_urgency_is_deterministic() {
    let classifier = lexicon_classifier();
    let text = "Critical error when saving";
    let first = classifier.urgency(Category::Bug, Sentiment::Neutral, text);
    for _ in 0..10 {
        assert_eq!(classifier.urgency(Category::Bug, Sentiment::Neutral, text), first);
    }
}
