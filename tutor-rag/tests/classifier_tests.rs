//! Tests for rule-based question classification.

use tutor_rag::classifier::{ClassificationLabel, QuestionClassifier};
use tutor_rag::config::ClassifierConfig;

#[test]
fn sports_question_is_irrelevant() {
    let classifier = QuestionClassifier::new();
    assert_eq!(classifier.classify("who won the match, any goals?"), ClassificationLabel::Irrelevant);
    assert_eq!(classifier.classify("Any CELEBRITY gossip today?"), ClassificationLabel::Irrelevant);
}

#[test]
fn literal_date_questions_take_the_date_case() {
    let classifier = QuestionClassifier::new();
    for question in [
        "what is today's date",
        "What is today\u{2019}s date?",
        "what's the date today?",
        "What day is it today",
        "todays date",
    ] {
        assert_eq!(
            classifier.classify(question),
            ClassificationLabel::GeneralKnowledge { date_query: true },
            "{question}"
        );
    }
}

#[test]
fn general_patterns_and_trigger_words() {
    let classifier = QuestionClassifier::new();
    let general = ClassificationLabel::GeneralKnowledge { date_query: false };

    assert_eq!(classifier.classify("What time is it in Bogotá?"), general);
    assert_eq!(classifier.classify("What is the capital of Colombia?"), general);
    assert_eq!(classifier.classify("Define entropy"), general);
    assert_eq!(classifier.classify("What does UML stand for?"), general);
    assert_eq!(classifier.classify("How is the weather?"), general);
}

#[test]
fn date_questions_inside_longer_sentences_are_general() {
    let classifier = QuestionClassifier::new();
    for question in [
        "Can you tell me today's date?",
        "Hey, what is today's date?",
        "what is today's date, please",
        "What is the date today, please?",
        "Do you know what date is it?",
    ] {
        assert_eq!(
            classifier.classify(question),
            ClassificationLabel::GeneralKnowledge { date_query: false },
            "{question}"
        );
    }
}

#[test]
fn course_vocabulary_is_not_mistaken_for_off_topic_words() {
    let classifier = QuestionClassifier::new();
    assert_eq!(
        classifier.classify("What are the goals of requirements engineering?"),
        ClassificationLabel::DocumentGrounded
    );
    assert_eq!(
        classifier.classify("How does the MMU translate virtual addresses?"),
        ClassificationLabel::DocumentGrounded
    );
    assert_eq!(classifier.classify("Who scored in the final?"), ClassificationLabel::Irrelevant);
    assert_eq!(
        classifier.classify("Translate to French: good morning"),
        ClassificationLabel::GeneralKnowledge { date_query: false }
    );
}

#[test]
fn course_questions_are_document_grounded() {
    let classifier = QuestionClassifier::new();
    for question in [
        "What is a system?",
        "Explain the phases of the software life cycle",
        "Which chapters cover requirements engineering?",
        "",
    ] {
        assert_eq!(
            classifier.classify(question),
            ClassificationLabel::DocumentGrounded,
            "{question}"
        );
    }
}

#[test]
fn irrelevant_takes_precedence_over_general() {
    let classifier = QuestionClassifier::new();
    assert_eq!(
        classifier.classify("What is the capital of the country that won the world cup?"),
        ClassificationLabel::Irrelevant
    );
}

#[test]
fn configured_keywords_extend_the_table() {
    let config = ClassifierConfig {
        extra_irrelevant_keywords: vec!["Video Games".to_string(), "  ".to_string()],
        extra_general_keywords: vec!["recipe".to_string()],
    };
    let classifier = QuestionClassifier::with_config(&config);

    assert_eq!(classifier.rule_count(), QuestionClassifier::new().rule_count() + 2);
    assert_eq!(
        classifier.classify("best video games of the year"),
        ClassificationLabel::Irrelevant
    );
    assert_eq!(
        classifier.classify("give me a pancake recipe"),
        ClassificationLabel::GeneralKnowledge { date_query: false }
    );
}

#[test]
fn labels_have_stable_names() {
    assert_eq!(ClassificationLabel::Irrelevant.as_str(), "irrelevant");
    assert_eq!(ClassificationLabel::DocumentGrounded.as_str(), "document_grounded");
    assert_eq!(
        ClassificationLabel::GeneralKnowledge { date_query: true }.as_str(),
        "general_knowledge_date"
    );
}
