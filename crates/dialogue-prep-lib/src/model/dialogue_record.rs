// Field names follow the raw corpus columns (with spaces), mapped through serde renames.
// Turns carry many more keys in the source corpus; serde ignores the ones we do not name.
use serde::{Deserialize, Serialize};

use crate::error::ParseError;

/// One exchange in a dialogue log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    #[serde(rename = "user utterance")]
    pub user_utterance: String,
    #[serde(rename = "system response")]
    pub system_response: String,
}

impl Turn {
    pub fn new(user_utterance: impl Into<String>, system_response: impl Into<String>) -> Self {
        Self {
            user_utterance: user_utterance.into(),
            system_response: system_response.into(),
        }
    }
}

/// Raw input unit read from the dialogue corpus.
///
/// `log` and `original_dialog_info` are required. The identifier columns are
/// carried only so they can be dropped after processing, and default when absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DialogueRecord {
    #[serde(rename = "original dialog id", default)]
    pub original_dialog_id: String,
    #[serde(rename = "new dialog id", default)]
    pub new_dialog_id: String,
    #[serde(rename = "dialog index", default)]
    pub dialog_index: u64,
    /// JSON-encoded metadata blob holding the summary variants.
    #[serde(rename = "original dialog info")]
    pub original_dialog_info: String,
    pub log: Vec<Turn>,
    #[serde(default)]
    pub prompt: Vec<String>,
}

/// Typed view over `original dialog info`. Only the summaries are read.
#[derive(Debug, Clone, Deserialize)]
pub struct DialogInfo {
    pub summaries: Summaries,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Summaries {
    pub abstractive_summaries: Vec<Vec<String>>,
}

impl DialogueRecord {
    /// Build a record with empty identifier columns.
    pub fn new(log: Vec<Turn>, original_dialog_info: impl Into<String>) -> Self {
        Self {
            original_dialog_id: String::new(),
            new_dialog_id: String::new(),
            dialog_index: 0,
            original_dialog_info: original_dialog_info.into(),
            log,
            prompt: Vec::new(),
        }
    }

    /// Parse the metadata blob.
    pub fn dialog_info(&self) -> Result<DialogInfo, ParseError> {
        Ok(serde_json::from_str(&self.original_dialog_info)?)
    }
}
