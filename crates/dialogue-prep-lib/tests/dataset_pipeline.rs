use anyhow::Result;
use dialogue_prep::pipeline::{
    extract_reference_summary, flatten_transcript, shuffle_indices, DEFAULT_SHUFFLE_SEED,
};
use dialogue_prep::{
    load_records_jsonl, process_dataset, save_examples_jsonl, DatasetPipeline, DialogueRecord,
    FailurePolicy, PipelineConfig, PromptExample, Turn,
};
use proptest::prelude::*;
use serde_json::json;

const RAW_COLUMNS: [&str; 6] = [
    "original dialog id",
    "new dialog id",
    "dialog index",
    "original dialog info",
    "log",
    "prompt",
];

fn raw_row(i: usize, info: &str) -> serde_json::Value {
    json!({
        "original dialog id": format!("orig-{i}"),
        "new dialog id": format!("TweetSumm--train--{i}"),
        "dialog index": i,
        "original dialog info": info,
        "log": [
            {"user utterance": format!("@Support my order {i} is late https://t.co/q{i}"), "system response": "Sorry to hear that ^MK"},
            {"user utterance": "thanks", "system response": "You're welcome!"}
        ],
        "prompt": ["Summarize the dialog."]
    })
}

fn summary_info(i: usize) -> String {
    json!({
        "summaries": {
            "extractive_summaries": [],
            "abstractive_summaries": [[format!("Customer {i} reports a late order."), "Agent apologises."]]
        }
    })
    .to_string()
}

#[test]
fn metadata_example_joins_fragments() {
    let rec = DialogueRecord::new(
        vec![],
        r#"{"summaries": {"abstractive_summaries": [["Part one.", "Part two."]]}}"#,
    );
    assert_eq!(extract_reference_summary(&rec).unwrap(), "Part one. Part two.");
}

#[test]
fn malformed_blob_through_robust_path_yields_placeholder() {
    let rec = DialogueRecord::new(vec![Turn::new("hi", "hello")], "{oops");
    let out = process_dataset(&[rec], &PipelineConfig::default()).unwrap();
    assert_eq!(out, vec![PromptExample::empty()]);
    assert_eq!(
        serde_json::to_value(&out[0]).unwrap(),
        json!({"conversation": "", "summary": "", "text": ""})
    );
}

/// End to end: raw JSONL rows -> load -> process -> save -> reload.
#[test]
fn jsonl_roundtrip_drops_raw_columns() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let input = dir.path().join("train.jsonl");
    let output = dir.path().join("prepared.jsonl");

    let mut lines = Vec::new();
    for i in 0..12 {
        let info = if i == 5 {
            "not json".to_string()
        } else {
            summary_info(i)
        };
        lines.push(raw_row(i, &info).to_string());
    }
    std::fs::write(&input, lines.join("\n"))?;

    let loaded = load_records_jsonl(&input, FailurePolicy::Isolate)?;
    assert_eq!(loaded.records.len(), 12);
    assert!(loaded.skipped_lines.is_empty());

    let first = flatten_transcript(&loaded.records[0]);
    assert_eq!(
        first,
        "user: my order 0 is late\nagent: Sorry to hear that\nuser: thanks\nagent: You're welcome!\n"
    );

    let out = DatasetPipeline::new(PipelineConfig::default()).run(&loaded.records)?;
    assert_eq!(out.examples.len(), 12);
    assert_eq!(out.stats.records_isolated, 1);
    save_examples_jsonl(&out.examples, &output)?;

    let text = std::fs::read_to_string(&output)?;
    let order = shuffle_indices(12, DEFAULT_SHUFFLE_SEED);
    for (line, idx) in text.lines().zip(order) {
        let value: serde_json::Value = serde_json::from_str(line)?;
        let obj = value.as_object().expect("object per line");
        assert_eq!(obj.len(), 3);
        for col in RAW_COLUMNS {
            assert!(!obj.contains_key(col), "raw column {col} survived");
        }
        if idx == 5 {
            assert_eq!(obj["text"], "");
        } else {
            assert_eq!(
                obj["summary"],
                format!("Customer {idx} reports a late order. Agent apologises.")
            );
        }
    }
    Ok(())
}

fn arb_record() -> impl Strategy<Value = DialogueRecord> {
    (
        prop::collection::vec(("[a-z @^]{0,12}", "[a-z ]{0,12}"), 0..4),
        prop::bool::ANY,
        "[a-z]{1,8}",
    )
        .prop_map(|(turns, good, summary)| {
            let info = if good {
                json!({"summaries": {"abstractive_summaries": [[summary]]}}).to_string()
            } else {
                "{".to_string()
            };
            DialogueRecord::new(
                turns.into_iter().map(|(u, a)| Turn::new(u, a)).collect(),
                info,
            )
        })
}

proptest! {
    #[test]
    fn isolate_policy_preserves_length(records in prop::collection::vec(arb_record(), 0..24)) {
        let out = process_dataset(&records, &PipelineConfig::default()).unwrap();
        prop_assert_eq!(out.len(), records.len());
    }

    #[test]
    fn same_seed_same_output(records in prop::collection::vec(arb_record(), 0..24), seed in any::<u64>()) {
        let cfg = PipelineConfig { seed, ..PipelineConfig::default() };
        let a = process_dataset(&records, &cfg).unwrap();
        let b = process_dataset(&records, &cfg).unwrap();
        prop_assert_eq!(a, b);
    }

    #[test]
    fn transcript_has_two_lines_per_turn(record in arb_record()) {
        let text = flatten_transcript(&record);
        prop_assert_eq!(text.lines().count(), record.log.len() * 2);
        prop_assert!(text.is_empty() || text.ends_with('\n'));
    }
}
