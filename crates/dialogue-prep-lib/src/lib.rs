//! Library entry point for dialogue-prep.
//!
//! This file re-exports the core types and provides helpers to read a dialogue
//! corpus dump and write prepared examples as JSON Lines. Records are decoded
//! into the typed `DialogueRecord` schema at this boundary, so malformed rows
//! are rejected (or skipped) here rather than deep inside the pipeline.
//
// Public modules
pub mod error;
pub mod generate;
pub mod model;
pub mod normalize;
pub mod pipeline;
pub mod prompt;
pub mod utils;

// Re-export primary types for ergonomic use.
pub use error::ParseError;
pub use model::{
    dialogue_record::{DialogueRecord, Turn},
    prompt_example::{EvaluationExample, PromptExample},
};
pub use normalize::clean_text;
pub use pipeline::{process_dataset, DatasetPipeline, FailurePolicy, PipelineConfig};
pub use prompt::{build_inference_prompt, build_training_prompt, PromptConfig};

use anyhow::{Context, Result};
use serde::Serialize;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, ErrorKind, Write};
use std::path::Path;
use tracing::warn;

/// Records read from a JSONL file plus the lines that could not be decoded.
#[derive(Debug, Default)]
pub struct LoadedRecords {
    pub records: Vec<DialogueRecord>,
    /// 1-based line numbers skipped under `FailurePolicy::Isolate`.
    pub skipped_lines: Vec<usize>,
}

/// Load dialogue records from a JSON Lines file.
///
/// # Arguments
///
/// * `path` - file with one JSON object per line; blank lines are ignored
/// * `policy` - `Abort` fails on the first undecodable line, `Isolate` logs and skips it
///
/// # Returns
///
/// The decoded records in file order, or an `anyhow::Error` for I/O failures
/// and (under `Abort`) schema violations or lines that are not valid UTF-8.
pub fn load_records_jsonl(path: &Path, policy: FailurePolicy) -> Result<LoadedRecords> {
    let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
    let reader = BufReader::new(file);

    let mut loaded = LoadedRecords::default();
    for (idx, line) in reader.lines().enumerate() {
        let line_no = idx + 1;
        let line = match line {
            Ok(line) => line,
            // Bytes of an undecodable line are already consumed, so reading can continue.
            Err(err)
                if err.kind() == ErrorKind::InvalidData && policy == FailurePolicy::Isolate =>
            {
                warn!(line = line_no, error = %err, "skipping line that is not valid UTF-8");
                loaded.skipped_lines.push(line_no);
                continue;
            }
            Err(err) => {
                return Err(err)
                    .with_context(|| format!("reading {}:{}", path.display(), line_no));
            }
        };
        if line.trim().is_empty() {
            continue;
        }
        match serde_json::from_str::<DialogueRecord>(&line) {
            Ok(record) => loaded.records.push(record),
            Err(err) => match policy {
                FailurePolicy::Abort => {
                    return Err(err).with_context(|| {
                        format!("invalid dialogue record at {}:{}", path.display(), line_no)
                    });
                }
                FailurePolicy::Isolate => {
                    warn!(line = line_no, error = %err, "skipping undecodable record");
                    loaded.skipped_lines.push(line_no);
                }
            },
        }
    }
    Ok(loaded)
}

/// Write `items` to `path` as JSON Lines, replacing any existing file.
pub fn save_examples_jsonl<T: Serialize>(items: &[T], path: &Path) -> Result<()> {
    let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    for item in items {
        serde_json::to_writer(&mut writer, item)?;
        writer.write_all(b"\n")?;
    }
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write as _;

    const GOOD: &str = r#"{"original dialog info": "{\"summaries\": {\"abstractive_summaries\": [[\"x\"]]}}", "log": [{"user utterance": "hi", "system response": "hey"}]}"#;

    fn write_lines(lines: &[&str]) -> tempfile::NamedTempFile {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        for l in lines {
            writeln!(f, "{}", l).unwrap();
        }
        f
    }

    #[test]
    fn isolate_skips_bad_lines_and_blank_lines() {
        let f = write_lines(&[GOOD, "", "{\"log\": 3}", GOOD]);
        let loaded = load_records_jsonl(f.path(), FailurePolicy::Isolate).unwrap();
        assert_eq!(loaded.records.len(), 2);
        assert_eq!(loaded.skipped_lines, vec![3]);
    }

    #[test]
    fn isolate_skips_line_with_invalid_utf8() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        writeln!(f, "{}", GOOD).unwrap();
        f.write_all(b"{\"log\": \"\xff\xfe\"}\n").unwrap();
        writeln!(f, "{}", GOOD).unwrap();
        f.flush().unwrap();

        let loaded = load_records_jsonl(f.path(), FailurePolicy::Isolate).unwrap();
        assert_eq!(loaded.records.len(), 2);
        assert_eq!(loaded.skipped_lines, vec![2]);

        let err = load_records_jsonl(f.path(), FailurePolicy::Abort).unwrap_err();
        assert!(format!("{err}").contains(":2"));
    }

    #[test]
    fn abort_names_the_bad_line() {
        let f = write_lines(&[GOOD, "garbage"]);
        let err = load_records_jsonl(f.path(), FailurePolicy::Abort).unwrap_err();
        assert!(format!("{err}").contains(":2"));
    }

    #[test]
    fn save_writes_one_object_per_line() {
        let f = tempfile::NamedTempFile::new().unwrap();
        let items = vec![PromptExample::empty(), PromptExample::empty()];
        save_examples_jsonl(&items, f.path()).unwrap();
        let text = std::fs::read_to_string(f.path()).unwrap();
        assert_eq!(text.lines().count(), 2);
        assert_eq!(
            text.lines().next().unwrap(),
            r#"{"conversation":"","summary":"","text":""}"#
        );
    }
}
