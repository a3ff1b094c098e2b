//! RAG Context Builder.
//!
//! Builds the context string handed to the prompt by:
//! 1. Walking sections in descending-similarity order
//! 2. Counting each section's tokens against a fixed budget
//! 3. Appending trimmed section contents separated by a delimiter line

use std::path::Path;

use anyhow::Context;
use tokenizers::pre_tokenizers::byte_level::ByteLevel;
use tokenizers::{OffsetReferential, OffsetType, PreTokenizedString, PreTokenizer, Tokenizer};

use super::ranking::RankedSection;

/// Written after every included section.
pub const SECTION_SEPARATOR: &str = "\n---\n";

/// Deterministic token counting.
pub trait TokenCounter: Send + Sync {
    fn count(&self, text: &str) -> usize;
}

/// GPT-2 style byte-level pre-tokenization; one split is one token.
///
/// Needs no vocabulary file. Words, runs of punctuation and runs of
/// whitespace each count once, which tracks BPE counts closely for prose.
#[derive(Debug, Clone)]
pub struct ByteLevelCounter {
    pre_tokenizer: ByteLevel,
}

impl ByteLevelCounter {
    pub fn new() -> Self {
        Self {
            pre_tokenizer: ByteLevel::default().add_prefix_space(false),
        }
    }
}

impl Default for ByteLevelCounter {
    fn default() -> Self {
        Self::new()
    }
}

impl TokenCounter for ByteLevelCounter {
    fn count(&self, text: &str) -> usize {
        if text.is_empty() {
            return 0;
        }
        let mut pretokenized = PreTokenizedString::from(text);
        match self.pre_tokenizer.pre_tokenize(&mut pretokenized) {
            Ok(()) => pretokenized
                .get_splits(OffsetReferential::Original, OffsetType::Byte)
                .len(),
            Err(err) => {
                tracing::warn!("Byte-level pre-tokenization failed: {}", err);
                text.split_whitespace().count()
            }
        }
    }
}

/// Counts with a full `tokenizer.json` vocabulary.
pub struct HfTokenizerCounter {
    tokenizer: Tokenizer,
    fallback: ByteLevelCounter,
}

impl HfTokenizerCounter {
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let tokenizer = Tokenizer::from_file(path)
            .map_err(|err| anyhow::anyhow!(err))
            .with_context(|| format!("Failed to load tokenizer from {}", path.display()))?;
        Ok(Self {
            tokenizer,
            fallback: ByteLevelCounter::new(),
        })
    }
}

impl TokenCounter for HfTokenizerCounter {
    fn count(&self, text: &str) -> usize {
        match self.tokenizer.encode(text, false) {
            Ok(encoding) => encoding.len(),
            Err(err) => {
                tracing::warn!("Tokenizer encode failed, using byte-level count: {}", err);
                self.fallback.count(text)
            }
        }
    }
}

/// Result of budgeted assembly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssembledContext {
    pub text: String,
    /// Number of leading ranked sections that made it in.
    pub included: usize,
    /// Tokens used by the included sections.
    pub token_count: usize,
}

/// Greedy, order-preserving context assembly under a token budget.
pub struct ContextBuilder {
    token_budget: usize,
}

impl ContextBuilder {
    pub fn new(token_budget: usize) -> Self {
        Self { token_budget }
    }

    pub fn token_budget(&self) -> usize {
        self.token_budget
    }

    /// Adds each section's token count to a running total; as soon as the
    /// total reaches or exceeds the budget, that section is dropped and
    /// assembly stops.
    pub fn assemble(
        &self,
        ranked: &[RankedSection],
        counter: &dyn TokenCounter,
    ) -> AssembledContext {
        let mut text = String::new();
        let mut running = 0usize;
        let mut used = 0usize;
        let mut included = 0usize;

        for entry in ranked {
            let content = &entry.section.content;
            running += counter.count(content);
            if running >= self.token_budget {
                break;
            }

            text.push_str(content.trim());
            text.push_str(SECTION_SEPARATOR);
            used = running;
            included += 1;
        }

        AssembledContext {
            text,
            included,
            token_count: used,
        }
    }
}
