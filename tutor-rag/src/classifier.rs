//! Heuristic question classification.
//!
//! Questions are routed with an ordered table of keyword and pattern rules.
//! The first matching rule decides; when nothing matches the question is
//! treated as document-grounded.
//!
//! Evaluation order:
//!
//! 1. off-topic keywords → [`ClassificationLabel::Irrelevant`]
//! 2. literal "what is today's date" phrasings → general knowledge, date case
//! 3. general-knowledge patterns (date/time, civic, definitional)
//! 4. general-knowledge trigger words
//! 5. otherwise → [`ClassificationLabel::DocumentGrounded`]

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::ClassifierConfig;

const IRRELEVANT_KEYWORDS: &[&str] = &[
    "football",
    "soccer",
    "basketball",
    "who won",
    "the match",
    "any goals",
    "scored",
    "world cup",
    "champions league",
    "celebrity",
    "gossip",
    "horoscope",
    "lottery",
    "reality show",
    "red carpet",
];

const GENERAL_KEYWORDS: &[&str] = &[
    "weather",
    "holiday",
    "time zone",
    "timezone",
    "exchange rate",
    "translate to",
    "translate into",
];

const DATE_PATTERNS: &[&str] = &[
    r"^(what is|what's|whats) (today's|todays) date$",
    r"^(what is|what's|whats) the date( today)?$",
    r"^what day is (it )?today$",
    r"^(today's|todays) date$",
];

const GENERAL_PATTERNS: &[&str] = &[
    r"\b(today'?s date|the date today|what date is it)\b",
    r"\bwhat time is it\b",
    r"\b(what|which) (day|month|year) is (it|today)\b",
    r"\bcurrent (date|time|year)\b",
    r"\b(capital|president|population|currency) of\b",
    r"\bwho (is|was) the (president|prime minister|king|queen)\b",
    r"^(define|definition of)\b",
    r"\bwhat does [\w.-]+ stand for\b",
];

static DATE_REGEXES: LazyLock<Vec<Regex>> = LazyLock::new(|| compile(DATE_PATTERNS));
static GENERAL_REGEXES: LazyLock<Vec<Regex>> = LazyLock::new(|| compile(GENERAL_PATTERNS));

fn compile(patterns: &[&str]) -> Vec<Regex> {
    patterns
        .iter()
        .map(|p| Regex::new(p).expect("unreachable error: failed to compile classifier rule"))
        .collect()
}

/// How a question should be answered.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ClassificationLabel {
    /// Off-topic; answered with the fixed refusal.
    Irrelevant,
    /// Answerable without course material.
    GeneralKnowledge {
        /// The question literally asks for today's date, which is answered
        /// locally without the model.
        date_query: bool,
    },
    /// Needs retrieval from the loaded documents.
    DocumentGrounded,
}

impl ClassificationLabel {
    /// Short name used in logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            ClassificationLabel::Irrelevant => "irrelevant",
            ClassificationLabel::GeneralKnowledge { date_query: true } => "general_knowledge_date",
            ClassificationLabel::GeneralKnowledge { date_query: false } => "general_knowledge",
            ClassificationLabel::DocumentGrounded => "document_grounded",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RuleTag {
    Irrelevant,
    DateQuery,
    General,
}

impl RuleTag {
    fn label(self) -> ClassificationLabel {
        match self {
            RuleTag::Irrelevant => ClassificationLabel::Irrelevant,
            RuleTag::DateQuery => ClassificationLabel::GeneralKnowledge { date_query: true },
            RuleTag::General => ClassificationLabel::GeneralKnowledge { date_query: false },
        }
    }
}

#[derive(Debug, Clone)]
enum Matcher {
    Keyword(String),
    Pattern(Regex),
}

impl Matcher {
    fn matches(&self, normalized: &str) -> bool {
        match self {
            Matcher::Keyword(keyword) => normalized.contains(keyword.as_str()),
            Matcher::Pattern(regex) => regex.is_match(normalized),
        }
    }
}

#[derive(Debug, Clone)]
struct Rule {
    tag: RuleTag,
    matcher: Matcher,
}

/// Ordered rule-table classifier.
///
/// # Example
///
/// ```rust
/// use tutor_rag::{ClassificationLabel, QuestionClassifier};
///
/// let classifier = QuestionClassifier::new();
/// assert_eq!(classifier.classify("Who won the match?"), ClassificationLabel::Irrelevant);
/// assert_eq!(
///     classifier.classify("Explain the waterfall model"),
///     ClassificationLabel::DocumentGrounded
/// );
/// ```
#[derive(Debug, Clone)]
pub struct QuestionClassifier {
    rules: Vec<Rule>,
}

impl Default for QuestionClassifier {
    fn default() -> Self {
        Self::new()
    }
}

impl QuestionClassifier {
    /// Create a classifier with the built-in rules.
    pub fn new() -> Self {
        Self::with_config(&ClassifierConfig::default())
    }

    /// Create a classifier with the built-in rules plus configured keywords.
    ///
    /// Extra keywords are appended after the built-ins of the same kind, so
    /// they never change the precedence between rule kinds.
    pub fn with_config(config: &ClassifierConfig) -> Self {
        let keyword = |tag: RuleTag, word: &str| Rule {
            tag,
            matcher: Matcher::Keyword(word.trim().to_lowercase()),
        };

        let mut rules = Vec::new();
        rules.extend(IRRELEVANT_KEYWORDS.iter().map(|w| keyword(RuleTag::Irrelevant, w)));
        rules.extend(
            config
                .extra_irrelevant_keywords
                .iter()
                .filter(|w| !w.trim().is_empty())
                .map(|w| keyword(RuleTag::Irrelevant, w)),
        );
        rules.extend(
            DATE_REGEXES
                .iter()
                .map(|r| Rule { tag: RuleTag::DateQuery, matcher: Matcher::Pattern(r.clone()) }),
        );
        rules.extend(
            GENERAL_REGEXES
                .iter()
                .map(|r| Rule { tag: RuleTag::General, matcher: Matcher::Pattern(r.clone()) }),
        );
        rules.extend(GENERAL_KEYWORDS.iter().map(|w| keyword(RuleTag::General, w)));
        rules.extend(
            config
                .extra_general_keywords
                .iter()
                .filter(|w| !w.trim().is_empty())
                .map(|w| keyword(RuleTag::General, w)),
        );

        Self { rules }
    }

    /// Classify a question. Pure function of the text.
    pub fn classify(&self, query: &str) -> ClassificationLabel {
        let normalized = normalize(query);
        let label = self
            .rules
            .iter()
            .find(|rule| rule.matcher.matches(&normalized))
            .map(|rule| rule.tag.label())
            .unwrap_or(ClassificationLabel::DocumentGrounded);

        debug!(label = label.as_str(), "classified question");
        label
    }

    /// Number of rules in the table.
    pub fn rule_count(&self) -> usize {
        self.rules.len()
    }
}

/// Lowercase, unify apostrophes, collapse whitespace and drop surrounding
/// punctuation so that rules only need to handle one spelling.
fn normalize(query: &str) -> String {
    let lower = query.to_lowercase().replace(['\u{2019}', '\u{2018}', '`'], "'");
    let collapsed = lower.split_whitespace().collect::<Vec<_>>().join(" ");
    collapsed
        .trim_matches(|c: char| matches!(c, '?' | '¿' | '!' | '¡' | '.' | ',' | ';' | ':' | ' '))
        .to_string()
}
