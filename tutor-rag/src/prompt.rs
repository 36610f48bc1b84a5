//! Instruction templates.
//!
//! Every path out of the context builder ends in one of these strings, so
//! downstream code never sees an empty instruction. Placeholders are
//! `{subject}`, `{refusal}`, `{context}` and `{date}`.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Which answering policy an instruction encodes.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum InstructionPolicy {
    /// Answer from the embedded course fragments and cite them.
    Grounded,
    /// Answer from general knowledge; the question does not need the material.
    General,
    /// Retrieval produced nothing usable; answer from general knowledge with a caveat.
    Fallback,
}

/// The set of templates used to phrase instructions and local replies.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PromptTemplates {
    /// Document-grounded instruction. Must contain `{context}`.
    pub grounded: String,
    /// General-knowledge instruction.
    pub general: String,
    /// Instruction used when no course fragment fits.
    pub fallback: String,
    /// Fixed reply for off-topic questions.
    pub refusal: String,
    /// Locally computed reply for "what is today's date".
    pub date_answer: String,
}

impl Default for PromptTemplates {
    fn default() -> Self {
        Self {
            grounded: concat!(
                "\nYou are an expert professor of {subject}. Rules:\n\n",
                "1. If the question is NOT about {subject}, software, IT or technical topics →\n",
                "   Answer EXACTLY: \"{refusal}\"\n\n",
                "2. For valid questions:\n",
                "   - Analyse the relevant fragments\n",
                "   - Answer concisely (1-3 sentences)\n",
                "   - Cite the document: [Name.pdf]\n",
                "   - Without information: \"🔍 I could not find specific information\"\n\n",
                "Fragments:\n",
                "{context}\n",
            )
            .to_string(),
            general: concat!(
                "\nYou are an expert professor of {subject}. ",
                "This question does not need the course material. ",
                "Answer from general knowledge, concisely (1-3 sentences).\n",
            )
            .to_string(),
            fallback: concat!(
                "\nYou are an expert professor of {subject}. ",
                "No fragment of the course material is available for this question. ",
                "Answer from general knowledge, concisely (1-3 sentences), and start with a short ",
                "caveat stating that the answer is not based on the course documents.\n",
            )
            .to_string(),
            refusal: "Sorry, I can only answer questions about {subject}".to_string(),
            date_answer: "📅 Today is {date}.".to_string(),
        }
    }
}

impl PromptTemplates {
    /// The refusal sent for off-topic questions.
    pub fn render_refusal(&self, subject: &str) -> String {
        self.refusal.replace("{subject}", subject)
    }

    /// The grounded instruction with `context` embedded.
    pub fn render_grounded(&self, subject: &str, context: &str) -> String {
        self.grounded
            .replace("{subject}", subject)
            .replace("{refusal}", &self.render_refusal(subject))
            .replace("{context}", context)
    }

    /// The general-knowledge or fallback instruction.
    pub fn render_policy(&self, policy: InstructionPolicy, subject: &str) -> String {
        let template = match policy {
            InstructionPolicy::Grounded => return self.render_grounded(subject, ""),
            InstructionPolicy::General => &self.general,
            InstructionPolicy::Fallback => &self.fallback,
        };
        template.replace("{subject}", subject).replace("{refusal}", &self.render_refusal(subject))
    }

    /// The local reply to a date question, e.g. `📅 Today is Monday, October 19, 2026.`
    pub fn render_date_answer(&self, today: NaiveDate) -> String {
        self.date_answer.replace("{date}", &today.format("%A, %B %-d, %Y").to_string())
    }
}

/// Format one ranked chunk the way it appears in the grounded instruction.
pub fn format_fragment(document_id: &str, text: &str) -> String {
    format!("[DOC: {document_id}]\n{text}\n---\n\n")
}
