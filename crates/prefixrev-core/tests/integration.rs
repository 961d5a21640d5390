//! Integration tests for prefixrev-core.
//!
//! These tests exercise the full pipeline:
//! texts → incremental tracing → revision classification → wide revision
//! table → merge with a human table → long-format output.

use std::collections::HashMap;

use prefixrev_core::{
    classify_trace, labels_frame, merge_corpus, read_traces, run_incremental, trace_and_classify,
    write_traces, ClassifierConfig, CorpusSpec, Frame, LabellerInfo, Result, RevisionKind,
    RunConfig, RunWriter, SequenceLabeller, Task, Text, REVISION_COLUMN, TOKEN_COLUMN,
};

/// A labeller with scripted per-prefix outputs, keyed by prefix string.
struct ScriptedLabeller {
    info: LabellerInfo,
    outputs: HashMap<String, Vec<String>>,
}

impl ScriptedLabeller {
    fn new(name: &str, script: &[(&str, &[&str])]) -> Self {
        Self {
            info: LabellerInfo {
                name: name.into(),
                tasks: vec![Task::Pos],
            },
            outputs: script
                .iter()
                .map(|(prefix, labels)| {
                    (
                        prefix.to_string(),
                        labels.iter().map(|l| l.to_string()).collect(),
                    )
                })
                .collect(),
        }
    }
}

impl SequenceLabeller for ScriptedLabeller {
    fn info(&self) -> &LabellerInfo {
        &self.info
    }

    fn label(&self, text: &str, _task: Task) -> Result<Vec<String>> {
        Ok(self
            .outputs
            .get(text)
            .cloned()
            .unwrap_or_else(|| vec!["UNK".into()]))
    }
}

/// "The cat sat": the model first calls "cat" a VERB, then revises it to
/// NOUN once "sat" arrives. That revision agrees with the final output.
fn revising_labeller() -> ScriptedLabeller {
    ScriptedLabeller::new(
        "spacy_sm",
        &[
            ("The", &["DET"]),
            ("The cat", &["DET", "VERB"]),
            ("The cat sat", &["DET", "NOUN", "VERB"]),
        ],
    )
}

#[test]
fn pipeline_detects_effective_revision() {
    let text = Text::new("1", vec!["The".into(), "cat".into(), "sat".into()]);
    let labeller = revising_labeller();
    let cfg = ClassifierConfig::default();

    let trace = run_incremental(&labeller, &text, Task::Pos).unwrap();
    assert_eq!(trace.len(), 3);

    let labels = classify_trace(&trace, cfg).unwrap();
    // Position 0 never revises.
    assert_eq!(labels[0].revised, 0);
    assert_eq!(labels[0].convenient, cfg.na_label);
    // Position 1: DET stayed DET — no revision yet.
    assert_eq!(labels[1].revised, 0);
    // Position 2: VERB -> NOUN over the seen window, matching the final
    // output: a convenient and effective revision.
    assert_eq!(labels[2].revised, 1);
    assert_eq!(labels[2].convenient, 1);
    assert_eq!(labels[2].effective, 1);
}

#[test]
fn trace_files_roundtrip_through_json() {
    let text = Text::new("1", vec!["The".into(), "cat".into(), "sat".into()]);
    let trace = run_incremental(&revising_labeller(), &text, Task::Pos).unwrap();

    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join("trace_pos.json");
    write_traces(&path, std::slice::from_ref(&trace)).unwrap();
    let loaded = read_traces(&path).unwrap();
    assert_eq!(loaded, vec![trace]);
}

#[test]
fn full_run_produces_mergeable_tables() {
    let text = Text::new("1", vec!["The".into(), "cat".into(), "sat".into()]);
    let texts = vec![text];
    let tmp = tempfile::tempdir().unwrap();

    // Stage one: trace + classify into a run directory.
    let mut writer = RunWriter::new(RunConfig {
        corpus: "meco".into(),
        output_dir: tmp.path().to_path_buf(),
        ..Default::default()
    })
    .unwrap();
    trace_and_classify(&revising_labeller(), &texts, &[Task::Pos], &mut writer).unwrap();
    let run_dir = writer.run_dir().to_path_buf();

    let model_table = Frame::read_tsv(&run_dir.join("meco/spacy_sm/revisions.tsv")).unwrap();
    assert_eq!(
        model_table.column("revision:pos").unwrap().values,
        vec!["0", "0", "1"]
    );

    // Stage two: merge against a human regression table.
    let mut human = Frame::with_index("id", model_table.index.clone());
    human
        .push_column(
            TOKEN_COLUMN,
            model_table.column(TOKEN_COLUMN).unwrap().values.clone(),
        )
        .unwrap();
    human
        .push_column("Subj:001", vec!["0".into(), "1".into(), "0".into()])
        .unwrap();
    human
        .push_column("Subj:002", vec!["1".into(), "0".into(), "1".into()])
        .unwrap();

    let corpus = CorpusSpec {
        name: "meco".into(),
        language: "en".into(),
        token_mismatch_tolerance: 0,
    };
    let outputs = merge_corpus(
        &corpus,
        "fprt",
        &human,
        &[("spacy_sm".to_string(), model_table)],
        RevisionKind::Plain,
        0,
    )
    .unwrap();

    assert_eq!(outputs.len(), 1);
    let merged = &outputs[0];
    assert_eq!(merged.model, "spacy_sm");
    assert_eq!(merged.task, "pos");
    // 3 tokens x 2 subjects.
    assert_eq!(merged.frame.n_rows(), 6);
    assert_eq!(
        merged.frame.column("subjectid").unwrap().values,
        vec!["001", "001", "001", "002", "002", "002"]
    );
    assert_eq!(
        merged.frame.column(REVISION_COLUMN).unwrap().values,
        vec!["0", "0", "1", "0", "0", "1"]
    );
    assert_eq!(
        merged.frame.column("regression").unwrap().values,
        vec!["0", "1", "0", "1", "0", "1"]
    );
    assert_eq!(
        merged.frame.column("token_position").unwrap().values,
        vec!["0", "1", "2", "0", "1", "2"]
    );

    // And the merged table lands in the run layout.
    let path = writer
        .write_merged(&merged.model, &merged.task, &merged.frame)
        .unwrap();
    assert!(path.ends_with("merged/meco_spacy_sm_pos.tsv"));
    writer.finish().unwrap();
}

#[test]
fn labels_frame_matches_classifier_output() {
    let text = Text::new("9", vec!["a".into(), "b".into()]);
    let labeller = ScriptedLabeller::new(
        "m",
        &[("a", &["X"]), ("a b", &["Y", "Z"])],
    );
    let trace = run_incremental(&labeller, &text, Task::Pos).unwrap();
    let labels = classify_trace(&trace, ClassifierConfig::default()).unwrap();
    let frame = labels_frame(Task::Pos, &[(&text, labels)]).unwrap();
    // X -> Y is a revision; Y matches the final output, so it is both
    // convenient and effective.
    assert_eq!(frame.column("revision:pos").unwrap().values, vec!["0", "1"]);
    assert_eq!(
        frame.column("convenient_revision:pos").unwrap().values,
        vec!["0", "1"]
    );
    assert_eq!(
        frame.column("effective_revision:pos").unwrap().values,
        vec!["0", "1"]
    );
}
