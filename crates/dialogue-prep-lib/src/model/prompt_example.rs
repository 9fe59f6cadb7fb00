use serde::{Deserialize, Serialize};

/// Training example derived from one `DialogueRecord`.
///
/// Serialises to exactly `conversation`, `summary` and `text`; none of the raw
/// corpus columns survive processing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptExample {
    /// Flattened, cleaned transcript (`user: ...` / `agent: ...` lines).
    pub conversation: String,
    /// Reference summary; empty for placeholders.
    pub summary: String,
    /// Final instruction prompt with the summary as the response.
    pub text: String,
}

impl PromptExample {
    /// Placeholder substituted for a record whose metadata could not be parsed.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.conversation.is_empty() && self.summary.is_empty() && self.text.is_empty()
    }
}

/// Inference-side example: the prompt leaves the response open for a model to fill.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvaluationExample {
    pub summary: String,
    pub conversation: String,
    pub prompt: String,
}
