//! Token-budgeted context assembly.
//!
//! Ranked chunks are formatted as `[DOC: <id>]` fragments and appended in
//! rank order while they fit. The budget left for fragments is
//!
//! ```text
//! max_total_tokens - tokens(question) - reserved_for_completion - tokens(template)
//! ```
//!
//! and a fragment is only appended while the remaining budget stays
//! strictly positive. The rendered instruction is counted once more at the
//! end, since BPE counts are not additive across concatenation, and trailing
//! fragments are dropped until it fits.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::config::{MAX_CHUNKS, OverflowPolicy};
use crate::document::RankedChunk;
use crate::prompt::{InstructionPolicy, PromptTemplates, format_fragment};
use crate::tokenizer::TokenCounter;

/// Token limits for one prompt.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct ContextBudget {
    /// Total tokens allowed for instruction plus question.
    pub max_total_tokens: usize,
    /// Tokens taken by the question itself.
    pub reserved_for_question: usize,
    /// Tokens kept free for the answer.
    pub reserved_for_completion: usize,
}

impl ContextBudget {
    /// Create a budget with no question reservation yet.
    pub fn new(max_total_tokens: usize, reserved_for_completion: usize) -> Self {
        Self { max_total_tokens, reserved_for_question: 0, reserved_for_completion }
    }

    /// Return a copy reserving `tokens` for the question.
    pub fn with_question_tokens(mut self, tokens: usize) -> Self {
        self.reserved_for_question = tokens;
        self
    }

    /// Tokens left for the instruction; never negative.
    pub fn available(&self) -> usize {
        self.max_total_tokens
            .saturating_sub(self.reserved_for_question)
            .saturating_sub(self.reserved_for_completion)
    }
}

/// The instruction produced for a document-grounded question.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AssembledContext {
    /// The system instruction to send ahead of the chat turns.
    pub instruction: String,
    /// Which answering policy the instruction encodes.
    pub policy: InstructionPolicy,
    /// The chunks embedded in the instruction, in rank order.
    pub included: Vec<RankedChunk>,
    /// Token count of `instruction`.
    pub instruction_tokens: usize,
    /// The budget the instruction was assembled against.
    pub budget: ContextBudget,
}

impl AssembledContext {
    /// Distinct document IDs cited by the embedded fragments, in first-seen order.
    pub fn cited_documents(&self) -> Vec<&str> {
        let mut seen: Vec<&str> = Vec::new();
        for ranked in &self.included {
            let id = ranked.chunk.document_id.as_str();
            if !seen.contains(&id) {
                seen.push(id);
            }
        }
        seen
    }
}

/// Greedily fills a token budget with ranked chunks.
pub struct ContextAssembler {
    counter: Arc<dyn TokenCounter>,
    templates: PromptTemplates,
    subject: String,
    overflow: OverflowPolicy,
    max_chunks: usize,
}

impl ContextAssembler {
    /// Create an assembler with default templates, the `Stop` overflow
    /// policy and the default chunk cap.
    pub fn new(counter: Arc<dyn TokenCounter>, subject: impl Into<String>) -> Self {
        Self {
            counter,
            templates: PromptTemplates::default(),
            subject: subject.into(),
            overflow: OverflowPolicy::default(),
            max_chunks: MAX_CHUNKS,
        }
    }

    /// Use custom templates.
    pub fn with_templates(mut self, templates: PromptTemplates) -> Self {
        self.templates = templates;
        self
    }

    /// Choose what happens when a chunk does not fit.
    pub fn with_overflow_policy(mut self, overflow: OverflowPolicy) -> Self {
        self.overflow = overflow;
        self
    }

    /// Cap the number of fragments embedded in one instruction.
    pub fn with_max_chunks(mut self, max_chunks: usize) -> Self {
        self.max_chunks = max_chunks;
        self
    }

    /// The templates in use.
    pub fn templates(&self) -> &PromptTemplates {
        &self.templates
    }

    /// The tutoring subject named in instructions.
    pub fn subject(&self) -> &str {
        &self.subject
    }

    /// The token counter in use.
    pub fn counter(&self) -> &Arc<dyn TokenCounter> {
        &self.counter
    }

    /// Tokens of the largest instruction that carries no fragment.
    ///
    /// A budget must leave at least this much room after the completion
    /// reserve, otherwise even the fallback instruction cannot fit.
    pub fn minimum_instruction_tokens(&self) -> usize {
        [InstructionPolicy::Grounded, InstructionPolicy::General, InstructionPolicy::Fallback]
            .into_iter()
            .map(|policy| self.counter.count(&self.templates.render_policy(policy, &self.subject)))
            .max()
            .unwrap_or(0)
    }

    /// Build the instruction for `query` from `ranked` chunks.
    ///
    /// Falls back to [`InstructionPolicy::Fallback`] when no chunk fits,
    /// including the empty-corpus case.
    pub fn assemble(
        &self,
        ranked: &[RankedChunk],
        query: &str,
        budget: &ContextBudget,
    ) -> AssembledContext {
        let budget = budget.with_question_tokens(self.counter.count(query));
        let limit = budget.available();
        let template_tokens = self.counter.count(&self.templates.render_grounded(&self.subject, ""));
        let mut available = limit.saturating_sub(template_tokens);

        let mut included: Vec<(RankedChunk, String)> = Vec::new();
        for candidate in ranked.iter().take(self.max_chunks) {
            let fragment = format_fragment(&candidate.chunk.document_id, &candidate.chunk.text);
            let fragment_tokens = self.counter.count(&fragment);

            if fragment_tokens < available {
                available -= fragment_tokens;
                debug!(
                    document.id = %candidate.chunk.document_id,
                    ordinal = candidate.chunk.ordinal,
                    fragment_tokens,
                    remaining = available,
                    "fragment included"
                );
                included.push((candidate.clone(), fragment));
                continue;
            }

            debug!(
                document.id = %candidate.chunk.document_id,
                ordinal = candidate.chunk.ordinal,
                fragment_tokens,
                remaining = available,
                "fragment does not fit"
            );
            match self.overflow {
                OverflowPolicy::Stop => break,
                OverflowPolicy::Skip => continue,
            }
        }

        loop {
            if included.is_empty() {
                return self.fallback(budget);
            }
            let context: String = included.iter().map(|(_, fragment)| fragment.as_str()).collect();
            let instruction = self.templates.render_grounded(&self.subject, &context);
            let instruction_tokens = self.counter.count(&instruction);
            if instruction_tokens <= limit {
                info!(
                    chunk_count = included.len(),
                    instruction_tokens,
                    limit,
                    "assembled grounded context"
                );
                return AssembledContext {
                    instruction,
                    policy: InstructionPolicy::Grounded,
                    included: included.into_iter().map(|(ranked, _)| ranked).collect(),
                    instruction_tokens,
                    budget,
                };
            }
            debug!(instruction_tokens, limit, "rendered context over budget, dropping last fragment");
            included.pop();
        }
    }

    /// The general-knowledge instruction used when the question needs no
    /// course material.
    pub fn general(&self, budget: ContextBudget) -> AssembledContext {
        self.policy_only(InstructionPolicy::General, budget)
    }

    fn fallback(&self, budget: ContextBudget) -> AssembledContext {
        warn!(limit = budget.available(), "no course fragment fits, using general-knowledge fallback");
        self.policy_only(InstructionPolicy::Fallback, budget)
    }

    fn policy_only(&self, policy: InstructionPolicy, budget: ContextBudget) -> AssembledContext {
        let instruction = self.templates.render_policy(policy, &self.subject);
        let instruction_tokens = self.counter.count(&instruction);
        AssembledContext { instruction, policy, included: Vec::new(), instruction_tokens, budget }
    }
}
