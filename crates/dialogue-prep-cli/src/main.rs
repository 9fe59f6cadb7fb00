//! CLI for dialogue-prep.
//!
//! Subcommands:
//!  - `prepare` : shuffle and map a JSONL corpus dump into training examples.
//!  - `eval`    : build inference prompts (summary left open) for the first records.
//!  - `inspect` : show the transcript, summary and prompts for a single record.
//!
//! Input files hold one raw corpus row per line, keyed by the original column
//! names (`log`, `original dialog info`, ...). Output files hold one example per
//! line.
//!
//! Usage examples:
//!  cargo run -p dialogue-prep -- prepare --input train.jsonl --out train.prepared.jsonl
//!  cargo run -p dialogue-prep -- eval --input test.jsonl --limit 5

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use serde_json::json;
use tracing::info;

use dialogue_prep::pipeline::{
    extract_reference_summary, flatten_transcript, prepare_evaluation_examples,
    DEFAULT_SHUFFLE_SEED,
};
use dialogue_prep::{
    build_inference_prompt, build_training_prompt, load_records_jsonl, save_examples_jsonl,
    utils::logging, DatasetPipeline, FailurePolicy,
};

mod run_config;

use crate::run_config::{pipeline_config_from_prepare_args, prompt_config};

/// CLI entrypoint.
#[derive(Parser)]
#[command(
    name = "dialogue-prep",
    about = "Turn dialogue corpus dumps into instruction-tuning prompts",
    version
)]
struct Cli {
    /// Subcommands
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Shuffle, clean and format a corpus into training examples.
    Prepare(PrepareArgs),

    /// Build inference-side examples for the first records of a corpus.
    Eval(EvalArgs),

    /// Show how a single record is transformed.
    Inspect(InspectArgs),
}

/// Arguments for the `prepare` subcommand.
#[derive(Args, Debug)]
struct PrepareArgs {
    /// JSONL file with raw dialogue records.
    #[arg(short, long, value_name = "PATH")]
    input: PathBuf,

    /// Path to write prepared examples (JSONL).
    #[arg(long, short = 'o', value_name = "PATH")]
    out: PathBuf,

    /// Shuffle seed.
    #[arg(long, default_value_t = DEFAULT_SHUFFLE_SEED)]
    seed: u64,

    /// Handling of records with unreadable metadata: isolate|abort.
    #[arg(long, default_value = "isolate")]
    policy: String,

    /// Override the instruction placed in every prompt.
    #[arg(long, value_name = "TEXT")]
    system_prompt: Option<String>,

    /// Print the run summary as JSON to stdout.
    #[arg(long)]
    json: bool,
}

/// Arguments for the `eval` subcommand.
#[derive(Args, Debug)]
struct EvalArgs {
    /// JSONL file with raw dialogue records.
    #[arg(short, long, value_name = "PATH")]
    input: PathBuf,

    /// Number of leading records to convert.
    #[arg(long, default_value_t = 5)]
    limit: usize,

    /// Write examples to this JSONL file instead of stdout.
    #[arg(long, short = 'o', value_name = "PATH")]
    out: Option<PathBuf>,

    /// Override the instruction placed in every prompt.
    #[arg(long, value_name = "TEXT")]
    system_prompt: Option<String>,
}

/// Arguments for the `inspect` subcommand.
#[derive(Args, Debug)]
struct InspectArgs {
    /// JSONL file with raw dialogue records.
    #[arg(short, long, value_name = "PATH")]
    input: PathBuf,

    /// Zero-based record position in the file (before shuffling).
    #[arg(long)]
    index: usize,

    /// Override the instruction placed in every prompt.
    #[arg(long, value_name = "TEXT")]
    system_prompt: Option<String>,

    /// Output as JSON.
    #[arg(long)]
    json: bool,
}

/// Application entry point.
fn main() -> Result<()> {
    logging::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Prepare(args) => run_prepare(args),
        Commands::Eval(args) => run_eval(args),
        Commands::Inspect(args) => run_inspect(args),
    }
}

/// Run the `prepare` subcommand.
///
/// This function:
/// 1. Loads records from the input JSONL (bad lines follow `--policy`).
/// 2. Runs the dataset pipeline (seeded shuffle + per-record mapping).
/// 3. Writes the three-field examples to `--out`.
/// 4. Prints a summary.
fn run_prepare(args: PrepareArgs) -> Result<()> {
    let config = pipeline_config_from_prepare_args(&args)?;

    let loaded = load_records_jsonl(&args.input, config.policy)
        .with_context(|| format!("loading records from {}", args.input.display()))?;
    info!(
        records = loaded.records.len(),
        skipped_lines = loaded.skipped_lines.len(),
        "loaded {}",
        args.input.display()
    );

    let pipeline = DatasetPipeline::new(config);

    #[cfg(feature = "progress")]
    let (pipeline, bar) = {
        use indicatif::{ProgressBar, ProgressStyle};
        use std::sync::Arc;

        let total = loaded.records.len();
        let bar = ProgressBar::new(total as u64);
        bar.set_style(
            ProgressStyle::default_bar()
                .template("[{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
                .context("building progress bar template")?
                .progress_chars("##-"),
        );
        bar.set_message("Processing records...");
        let progress_cb = Arc::new({
            let bar = bar.clone();
            move |msg: String, fraction: f32| {
                bar.set_message(msg);
                bar.set_position((fraction * total as f32).floor() as u64);
            }
        });
        (pipeline.with_progress(progress_cb), bar)
    };

    let output = pipeline
        .run(&loaded.records)
        .context("processing dataset")?;

    #[cfg(feature = "progress")]
    bar.finish_with_message(format!("Prepared {} examples.", output.examples.len()));

    save_examples_jsonl(&output.examples, &args.out)
        .with_context(|| format!("saving examples to {}", args.out.display()))?;

    if args.json {
        let out = json!({
            "input": args.input.to_string_lossy().to_string(),
            "out": args.out.to_string_lossy().to_string(),
            "config": pipeline.config(),
            "skipped_lines": loaded.skipped_lines,
            "stats": output.stats,
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        println!("Saved {} examples to {}", output.examples.len(), args.out.display());
        println!(
            "Prepare summary: seed={} policy={} records_seen={} processed={} isolated={} skipped_lines={}",
            pipeline.config().seed,
            pipeline.config().policy.as_str(),
            output.stats.records_seen,
            output.stats.records_processed,
            output.stats.records_isolated,
            loaded.skipped_lines.len()
        );
    }

    Ok(())
}

/// Run the `eval` subcommand. Any unreadable record aborts the command.
fn run_eval(args: EvalArgs) -> Result<()> {
    let prompt = prompt_config(args.system_prompt.as_ref())?;
    let loaded = load_records_jsonl(&args.input, FailurePolicy::Abort)
        .with_context(|| format!("loading records from {}", args.input.display()))?;

    let examples = prepare_evaluation_examples(&loaded.records, args.limit, &prompt)
        .context("building evaluation examples")?;

    match args.out {
        Some(outp) => {
            save_examples_jsonl(&examples, &outp)
                .with_context(|| format!("saving examples to {}", outp.display()))?;
            println!("Saved {} evaluation examples to {}", examples.len(), outp.display());
        }
        None => println!("{}", serde_json::to_string_pretty(&examples)?),
    }
    Ok(())
}

/// Run the `inspect` subcommand.
fn run_inspect(args: InspectArgs) -> Result<()> {
    let prompt = prompt_config(args.system_prompt.as_ref())?;
    let loaded = load_records_jsonl(&args.input, FailurePolicy::Abort)
        .with_context(|| format!("loading records from {}", args.input.display()))?;

    let record = loaded.records.get(args.index).ok_or_else(|| {
        anyhow::anyhow!(
            "index {} out of range (file contains {} records)",
            args.index,
            loaded.records.len()
        )
    })?;

    let conversation = flatten_transcript(record);
    let summary = extract_reference_summary(record);
    let inference_prompt = build_inference_prompt(&conversation, &prompt);
    let training_prompt = summary
        .as_ref()
        .ok()
        .map(|s| build_training_prompt(&conversation, s, &prompt));

    if args.json {
        let out = json!({
            "input": args.input.to_string_lossy().to_string(),
            "index": args.index,
            "new_dialog_id": record.new_dialog_id,
            "turns": record.log.len(),
            "conversation": conversation,
            "summary": summary.as_ref().ok(),
            "summary_error": summary.as_ref().err().map(|e| e.to_string()),
            "training_prompt": training_prompt,
            "inference_prompt": inference_prompt,
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        println!("index={} new_dialog_id={}", args.index, record.new_dialog_id);
        println!("turns={}", record.log.len());
        println!("\nconversation:\n{}", conversation);
        match &summary {
            Ok(s) => println!("summary: {}", s),
            Err(e) => println!("summary: <unavailable: {}>", e),
        }
        if let Some(tp) = training_prompt {
            println!("\ntraining prompt:\n{}", tp);
        }
        println!("\ninference prompt:\n{}", inference_prompt);
    }

    Ok(())
}
