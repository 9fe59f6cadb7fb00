//! Seam to an external text-generation model.
//!
//! Model loading, quantisation, tokenisation and decoding live outside this
//! crate. A `TextGenerator` receives a fully formatted prompt and returns only
//! the continuation; `Summarizer` wraps one with the inference template and the
//! fixed decoding parameters. A `ModelLoader` turns a `ModelLoadConfig` into a
//! generator.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::prompt::{build_inference_prompt, PromptConfig};

/// Default cap on generated tokens.
pub const DEFAULT_MAX_NEW_TOKENS: usize = 256;
/// Near-zero temperature: effectively greedy decoding.
pub const DEFAULT_TEMPERATURE: f32 = 0.0001;

/// Decoding parameters handed to the generator.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GenerationParams {
    pub max_new_tokens: usize,
    pub temperature: f32,
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self {
            max_new_tokens: DEFAULT_MAX_NEW_TOKENS,
            temperature: DEFAULT_TEMPERATURE,
        }
    }
}

/// Weight quantisation type requested from the model loader.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuantType {
    Nf4,
    Fp4,
}

/// Which side of a batch receives pad tokens.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaddingSide {
    Left,
    Right,
}

/// Loading options handed to a `ModelLoader`.
///
/// Nothing in this crate loads weights; the loader behind the seam does.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelLoadConfig {
    pub model_name: String,
    pub load_in_4bit: bool,
    pub quant_type: QuantType,
    /// Compute dtype name, e.g. `float16`.
    pub compute_dtype: String,
    pub use_safetensors: bool,
    /// Reuse the EOS token as the pad token.
    pub pad_with_eos: bool,
    pub padding_side: PaddingSide,
}

impl ModelLoadConfig {
    pub fn new(model_name: impl Into<String>) -> Self {
        Self {
            model_name: model_name.into(),
            load_in_4bit: true,
            quant_type: QuantType::Nf4,
            compute_dtype: "float16".to_string(),
            use_safetensors: true,
            pad_with_eos: true,
            padding_side: PaddingSide::Right,
        }
    }
}

/// External text-generation collaborator.
pub trait TextGenerator {
    /// Generate a continuation of `prompt`. The returned text excludes the prompt.
    fn generate(&self, prompt: &str, params: &GenerationParams) -> Result<String>;
}

/// Builds a `TextGenerator` from loading options.
pub trait ModelLoader {
    type Generator: TextGenerator;

    fn load(&self, config: &ModelLoadConfig) -> Result<Self::Generator>;
}

/// Produces summaries for transcripts through a `TextGenerator`.
pub struct Summarizer<G> {
    generator: G,
    prompt: PromptConfig,
    params: GenerationParams,
}

impl<G: TextGenerator> Summarizer<G> {
    /// Summarizer with the default prompt and decoding parameters.
    pub fn new(generator: G) -> Self {
        Self {
            generator,
            prompt: PromptConfig::default(),
            params: GenerationParams::default(),
        }
    }

    /// Load a generator through `loader` and wrap it with default settings.
    pub fn load<L>(loader: &L, config: &ModelLoadConfig) -> Result<Self>
    where
        L: ModelLoader<Generator = G>,
    {
        info!(model = %config.model_name, quant = ?config.quant_type, "loading generator");
        let generator = loader
            .load(config)
            .with_context(|| format!("loading model {}", config.model_name))?;
        Ok(Self::new(generator))
    }

    pub fn with_prompt(mut self, prompt: PromptConfig) -> Self {
        self.prompt = prompt;
        self
    }

    pub fn with_params(mut self, params: GenerationParams) -> Self {
        self.params = params;
        self
    }

    pub fn params(&self) -> &GenerationParams {
        &self.params
    }

    /// Summarise a flattened transcript.
    pub fn summarize(&self, conversation: &str) -> Result<String> {
        let prompt = build_inference_prompt(conversation, &self.prompt);
        debug!(prompt_chars = prompt.len(), "requesting summary");
        let continuation = self
            .generator
            .generate(&prompt, &self.params)
            .context("text generation failed")?;
        Ok(continuation.trim().to_string())
    }
}
