//! Dataset-level transform: seeded shuffle, per-record mapping and column pruning.
//!
//! Output rows are `PromptExample`s, so the raw corpus columns are dropped by
//! construction. The per-record map runs on the rayon pool; collection keeps the
//! shuffled order, so results do not depend on scheduling.
//
// Rust guideline compliant 2026-10-17

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::ParseError;
use crate::model::dialogue_record::DialogueRecord;
use crate::model::prompt_example::PromptExample;
use crate::prompt::PromptConfig;

/// Submodules
pub mod record;

pub use record::{
    build_evaluation_example, extract_reference_summary, flatten_transcript,
    prepare_evaluation_examples, process_record, process_record_isolated,
};

/// Progress callback type for long-running operations.
/// The callback receives a message describing the current step and a progress fraction (0.0..1.0).
pub type ProgressCallback = Arc<dyn Fn(String, f32) + Send + Sync>;

/// Seed used for the dataset shuffle unless overridden.
pub const DEFAULT_SHUFFLE_SEED: u64 = 42;

/// What to do with a record whose metadata cannot be parsed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FailurePolicy {
    /// Replace the record with an empty example and keep going.
    #[default]
    Isolate,
    /// Stop and return the first error (in shuffled order).
    Abort,
}

impl FailurePolicy {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Isolate => "isolate",
            Self::Abort => "abort",
        }
    }
}

/// Dataset pipeline configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Shuffle seed. Default: DEFAULT_SHUFFLE_SEED.
    pub seed: u64,
    /// Failure handling. Default: Isolate.
    pub policy: FailurePolicy,
    /// Template settings passed to every record.
    pub prompt: PromptConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            seed: DEFAULT_SHUFFLE_SEED,
            policy: FailurePolicy::Isolate,
            prompt: PromptConfig::default(),
        }
    }
}

/// Counters reported after a run.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct PipelineStats {
    pub records_seen: usize,
    pub records_processed: usize,
    pub records_isolated: usize,
}

#[derive(Clone, Debug)]
pub struct PipelineOutput {
    /// Examples in shuffled order.
    pub examples: Vec<PromptExample>,
    pub stats: PipelineStats,
}

/// Deterministic permutation of `0..len` for `seed`.
pub fn shuffle_indices(len: usize, seed: u64) -> Vec<usize> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut indices: Vec<usize> = (0..len).collect();
    indices.shuffle(&mut rng);
    indices
}

/// Records reordered by `shuffle_indices(records.len(), seed)`.
pub fn shuffle_records(records: &[DialogueRecord], seed: u64) -> Vec<&DialogueRecord> {
    shuffle_indices(records.len(), seed)
        .into_iter()
        .map(|idx| &records[idx])
        .collect()
}

/// Shuffle and map a whole dataset with `config`.
///
/// Under `FailurePolicy::Isolate` the output has exactly one example per input
/// record; under `Abort` the first unreadable record fails the call.
pub fn process_dataset(
    records: &[DialogueRecord],
    config: &PipelineConfig,
) -> Result<Vec<PromptExample>, ParseError> {
    DatasetPipeline::new(config.clone())
        .run(records)
        .map(|out| out.examples)
}

/// Dataset runner with optional progress reporting and run statistics.
pub struct DatasetPipeline {
    config: PipelineConfig,
    progress: Option<ProgressCallback>,
}

impl DatasetPipeline {
    pub fn new(config: PipelineConfig) -> Self {
        Self {
            config,
            progress: None,
        }
    }

    pub fn with_progress(mut self, progress: ProgressCallback) -> Self {
        self.progress = Some(progress);
        self
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Run the pipeline over `records`.
    ///
    /// # Errors
    ///
    /// Only under `FailurePolicy::Abort`: the first `ParseError` in shuffled order.
    pub fn run(&self, records: &[DialogueRecord]) -> Result<PipelineOutput, ParseError> {
        info!(
            records = records.len(),
            seed = self.config.seed,
            policy = self.config.policy.as_str(),
            "Processing dataset..."
        );

        let shuffled = shuffle_records(records, self.config.seed);
        let total = shuffled.len();
        let completed = AtomicUsize::new(0);
        let step = (total / 100).max(1);

        let results: Vec<Result<PromptExample, ParseError>> = shuffled
            .par_iter()
            .map(|record| {
                let result = process_record(record, &self.config.prompt);
                if let Some(cb) = self.progress.as_ref() {
                    let done = completed.fetch_add(1, Ordering::Relaxed) + 1;
                    if done % step == 0 || done == total {
                        cb(
                            format!("Processed {}/{}", done, total),
                            done as f32 / total as f32,
                        );
                    }
                }
                result
            })
            .collect();

        let mut stats = PipelineStats {
            records_seen: total,
            ..PipelineStats::default()
        };
        let mut examples = Vec::with_capacity(total);
        for (source, result) in shuffled.iter().zip(results) {
            match result {
                Ok(example) => {
                    stats.records_processed += 1;
                    examples.push(example);
                }
                Err(err) => match self.config.policy {
                    FailurePolicy::Abort => return Err(err),
                    FailurePolicy::Isolate => {
                        stats.records_isolated += 1;
                        examples.push(record::isolate(source, &err));
                    }
                },
            }
        }

        info!(
            processed = stats.records_processed,
            isolated = stats.records_isolated,
            "Dataset processed"
        );
        Ok(PipelineOutput { examples, stats })
    }
}
