/*
Instruction prompt templates.

Both builders share one layout:

    ### Instruction: <system prompt>

    ### Input:
    <conversation, trimmed>

    ### Response:
    <summary, or nothing for inference>

The system prompt is always passed in through `PromptConfig`; the default is
applied by whoever constructs the config, not read from shared state.
*/

use serde::{Deserialize, Serialize};

/// Instruction used when no override is supplied.
pub const DEFAULT_SYSTEM_PROMPT: &str =
    "Below is a conversation between a human and an AI agent. Write a summary of the conversation.";

/// Prompt construction settings.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptConfig {
    /// Text placed after `### Instruction:`.
    pub system_prompt: String,
}

impl Default for PromptConfig {
    fn default() -> Self {
        Self {
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
        }
    }
}

impl PromptConfig {
    /// Config with `system_prompt` overridden when `Some`, the default otherwise.
    pub fn with_system_prompt(system_prompt: Option<String>) -> Self {
        match system_prompt {
            Some(system_prompt) => Self { system_prompt },
            None => Self::default(),
        }
    }
}

fn render(conversation: &str, response: &str, config: &PromptConfig) -> String {
    format!(
        "### Instruction: {}\n\n### Input:\n{}\n\n### Response:\n{}",
        config.system_prompt,
        conversation.trim(),
        response
    )
    .trim()
    .to_string()
}

/// Prompt for supervised fine-tuning: the summary is the target response.
pub fn build_training_prompt(conversation: &str, summary: &str, config: &PromptConfig) -> String {
    render(conversation, summary, config)
}

/// Prompt for generation: the response section is left empty for the model.
pub fn build_inference_prompt(conversation: &str, config: &PromptConfig) -> String {
    render(conversation, "", config)
}
