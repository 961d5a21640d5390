use std::collections::HashMap;
use std::path::Path;

use prefixrev_core::{
    classify_trace, labels_frame, load_texts, read_traces, ClassifierConfig, Task, Text,
};

pub fn run(trace_path: &str, texts_path: &str, task: &str, na_label: i8, output: &str) {
    let Some(task) = Task::parse(task) else {
        super::fail(format!("unknown task '{task}'"));
    };
    let cfg = ClassifierConfig { na_label };

    let traces = match read_traces(Path::new(trace_path)) {
        Ok(traces) => traces,
        Err(e) => super::fail(e),
    };
    let texts = match load_texts(Path::new(texts_path)) {
        Ok(texts) => texts,
        Err(e) => super::fail(e),
    };
    let by_id: HashMap<&str, &Text> = texts.iter().map(|t| (t.id.as_str(), t)).collect();

    let mut items = Vec::with_capacity(traces.len());
    for trace in &traces {
        let Some(text) = by_id.get(trace.text_id.as_str()) else {
            super::fail(format!(
                "trace text '{}' not present in {}",
                trace.text_id, texts_path
            ));
        };
        match classify_trace(trace, cfg) {
            Ok(labels) => items.push((*text, labels)),
            Err(e) => super::fail(e),
        }
    }

    let frame = match labels_frame(task, &items) {
        Ok(frame) => frame,
        Err(e) => super::fail(e),
    };
    if let Err(e) = frame.write_tsv(Path::new(output)) {
        super::fail(e);
    }
    println!(
        "Classified {} text(s), {} token position(s) -> {}",
        items.len(),
        frame.n_rows(),
        output
    );
}
