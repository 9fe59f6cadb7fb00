// Rust guideline compliant 2026-10-17
use anyhow::Result;
use dialogue_prep::{FailurePolicy, PipelineConfig, PromptConfig};

use super::PrepareArgs;

pub(crate) fn parse_policy(raw: &str) -> Result<FailurePolicy> {
    match raw.to_lowercase().as_str() {
        "isolate" => Ok(FailurePolicy::Isolate),
        "abort" => Ok(FailurePolicy::Abort),
        other => Err(anyhow::anyhow!(
            "unsupported --policy '{}'; supported: isolate|abort",
            other
        )),
    }
}

pub(crate) fn prompt_config(system_prompt: Option<&String>) -> Result<PromptConfig> {
    if let Some(sp) = system_prompt {
        if sp.trim().is_empty() {
            return Err(anyhow::anyhow!("--system-prompt must not be empty"));
        }
    }
    Ok(PromptConfig::with_system_prompt(system_prompt.cloned()))
}

pub(crate) fn pipeline_config_from_prepare_args(args: &PrepareArgs) -> Result<PipelineConfig> {
    Ok(PipelineConfig {
        seed: args.seed,
        policy: parse_policy(&args.policy)?,
        prompt: prompt_config(args.system_prompt.as_ref())?,
    })
}
