//! Output traces: per-prefix labeller outputs and their JSON persistence.
//!
//! For one text and one task, the trace holds the labeller's full output
//! after each additional token, in position order. Retaining every prefix
//! output is quadratic in text length; corpus texts run tens to low
//! hundreds of tokens, so this stays small.
//!
//! # Storage format
//!
//! One JSON file per (corpus, model, task): an object mapping text id to
//! the ordered list of per-step label lists. Reloading reproduces the
//! per-text step sequence exactly.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::labeller::{SequenceLabeller, Task};
use crate::text::Text;

/// Ordered per-prefix outputs for one text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputTrace {
    pub text_id: String,
    /// `steps[i]` is the labeller's full output for the prefix ending at
    /// position `i`. Step lengths follow the model's own tokenization and
    /// need not equal `i + 1`.
    pub steps: Vec<Vec<String>>,
}

impl OutputTrace {
    /// Number of recorded prefix steps (= number of token positions).
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// The full-context output: the last recorded step.
    pub fn final_output(&self) -> Option<&[String]> {
        self.steps.last().map(|s| s.as_slice())
    }
}

/// Run the labeller over every prefix of `text`, collecting the trace.
///
/// Each invocation is independent: the model re-processes the whole prefix
/// with no caching or incremental state. A labeller failure aborts the
/// text.
pub fn run_incremental(
    labeller: &dyn SequenceLabeller,
    text: &Text,
    task: Task,
) -> Result<OutputTrace> {
    let mut steps = Vec::with_capacity(text.len());
    for i in 0..text.len() {
        let prefix = text.prefix(i);
        let labels = labeller.label(&prefix, task)?;
        steps.push(labels);
    }
    log::debug!(
        "traced text '{}' ({} positions) with '{}' for {}",
        text.id,
        text.len(),
        labeller.name(),
        task
    );
    Ok(OutputTrace {
        text_id: text.id.clone(),
        steps,
    })
}

/// Write traces as the JSON trace-file format (text id → step lists).
pub fn write_traces(path: &Path, traces: &[OutputTrace]) -> Result<()> {
    let map: BTreeMap<&str, &Vec<Vec<String>>> = traces
        .iter()
        .map(|t| (t.text_id.as_str(), &t.steps))
        .collect();
    let writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(writer, &map)?;
    Ok(())
}

/// Read a JSON trace file back into traces, sorted by text id
/// (numerically where ids parse as integers).
pub fn read_traces(path: &Path) -> Result<Vec<OutputTrace>> {
    let reader = BufReader::new(File::open(path)?);
    let map: BTreeMap<String, Vec<Vec<String>>> = serde_json::from_reader(reader)?;
    let mut traces: Vec<OutputTrace> = map
        .into_iter()
        .map(|(text_id, steps)| OutputTrace { text_id, steps })
        .collect();
    traces.sort_by(|a, b| match (a.text_id.parse::<u64>(), b.text_id.parse::<u64>()) {
        (Ok(x), Ok(y)) => x.cmp(&y),
        _ => a.text_id.cmp(&b.text_id),
    });
    Ok(traces)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::labeller::LabellerInfo;

    /// Scripted labeller: uppercases each space-separated token.
    struct UppercaseLabeller {
        info: LabellerInfo,
    }

    impl UppercaseLabeller {
        fn new() -> Self {
            Self {
                info: LabellerInfo {
                    name: "upper".into(),
                    tasks: vec![Task::Pos],
                },
            }
        }
    }

    impl SequenceLabeller for UppercaseLabeller {
        fn info(&self) -> &LabellerInfo {
            &self.info
        }

        fn label(&self, text: &str, _task: Task) -> Result<Vec<String>> {
            Ok(text.split(' ').map(|t| t.to_uppercase()).collect())
        }
    }

    #[test]
    fn test_run_incremental_one_step_per_position() {
        let text = Text::new("1", vec!["a".into(), "b".into(), "c".into()]);
        let trace = run_incremental(&UppercaseLabeller::new(), &text, Task::Pos).unwrap();
        assert_eq!(trace.len(), 3);
        assert_eq!(trace.steps[0], vec!["A"]);
        assert_eq!(trace.steps[1], vec!["A", "B"]);
        assert_eq!(trace.steps[2], vec!["A", "B", "C"]);
        assert_eq!(trace.final_output().unwrap(), ["A", "B", "C"]);
    }

    #[test]
    fn test_run_incremental_empty_text() {
        let text = Text::new("1", Vec::new());
        let trace = run_incremental(&UppercaseLabeller::new(), &text, Task::Pos).unwrap();
        assert!(trace.is_empty());
        assert!(trace.final_output().is_none());
    }

    #[test]
    fn test_trace_json_roundtrip() {
        let traces = vec![
            OutputTrace {
                text_id: "2".into(),
                steps: vec![vec!["X".into()], vec!["X".into(), "Y".into()]],
            },
            OutputTrace {
                text_id: "10".into(),
                steps: vec![vec!["N".into()]],
            },
        ];
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("trace_pos.json");
        write_traces(&path, &traces).unwrap();

        let loaded = read_traces(&path).unwrap();
        assert_eq!(loaded.len(), 2);
        // Numeric ordering: 2 before 10.
        assert_eq!(loaded[0].text_id, "2");
        assert_eq!(loaded[1].text_id, "10");
        // Step sequences reproduced exactly, in order.
        assert_eq!(loaded[0].steps, traces[0].steps);
        assert_eq!(loaded[1].steps, traces[1].steps);
    }
}
