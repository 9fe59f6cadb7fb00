//! Per-record transforms: transcript flattening, summary extraction and the
//! three-field `PromptExample` mapping. All functions are pure.

use tracing::warn;

use crate::error::ParseError;
use crate::model::dialogue_record::DialogueRecord;
use crate::model::prompt_example::{EvaluationExample, PromptExample};
use crate::normalize::clean_text;
use crate::prompt::{build_inference_prompt, build_training_prompt, PromptConfig};

/// Flatten the dialogue log into `user:` / `agent:` lines, one pair per turn.
///
/// Each utterance is cleaned on its own and trimmed before it is appended; the
/// joined transcript is never re-cleaned. Line order equals log order and every
/// line ends with `\n`.
pub fn flatten_transcript(record: &DialogueRecord) -> String {
    let mut text = String::new();
    for turn in &record.log {
        text.push_str("user: ");
        text.push_str(clean_text(&turn.user_utterance).trim());
        text.push('\n');

        text.push_str("agent: ");
        text.push_str(clean_text(&turn.system_response).trim());
        text.push('\n');
    }
    text
}

/// Read `summaries.abstractive_summaries[0]` from the metadata blob and join its
/// fragments with single spaces.
///
/// # Errors
///
/// `ParseError::Metadata` when the blob is not JSON or lacks the expected keys,
/// `ParseError::NoAbstractiveSummary` when the summary list is empty.
pub fn extract_reference_summary(record: &DialogueRecord) -> Result<String, ParseError> {
    let info = record.dialog_info()?;
    let fragments = info
        .summaries
        .abstractive_summaries
        .into_iter()
        .next()
        .ok_or(ParseError::NoAbstractiveSummary)?;
    Ok(fragments.join(" "))
}

/// Map a record to its training example. Metadata failures propagate.
pub fn process_record(
    record: &DialogueRecord,
    config: &PromptConfig,
) -> Result<PromptExample, ParseError> {
    let summary = extract_reference_summary(record)?;
    let conversation = flatten_transcript(record);
    let text = build_training_prompt(&conversation, &summary, config);
    Ok(PromptExample {
        conversation,
        summary,
        text,
    })
}

/// Map a record to its training example, substituting the empty placeholder
/// when the metadata cannot be read.
pub fn process_record_isolated(record: &DialogueRecord, config: &PromptConfig) -> PromptExample {
    process_record(record, config).unwrap_or_else(|err| isolate(record, &err))
}

pub(crate) fn isolate(record: &DialogueRecord, err: &ParseError) -> PromptExample {
    warn!(
        dialog_id = %record.new_dialog_id,
        dialog_index = record.dialog_index,
        error = %err,
        "replacing record with empty example"
    );
    PromptExample::empty()
}

/// Build an inference-side example: reference summary plus an open-ended prompt.
pub fn build_evaluation_example(
    record: &DialogueRecord,
    config: &PromptConfig,
) -> Result<EvaluationExample, ParseError> {
    let summary = extract_reference_summary(record)?;
    let conversation = flatten_transcript(record);
    let prompt = build_inference_prompt(&conversation, config);
    Ok(EvaluationExample {
        summary,
        conversation,
        prompt,
    })
}

/// Evaluation examples for the first `limit` records, in input order.
pub fn prepare_evaluation_examples(
    records: &[DialogueRecord],
    limit: usize,
    config: &PromptConfig,
) -> Result<Vec<EvaluationExample>, ParseError> {
    records
        .iter()
        .take(limit)
        .map(|record| build_evaluation_example(record, config))
        .collect()
}
