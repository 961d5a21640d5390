use std::fs;
use std::path::Path;

use prefixrev_core::{merge_corpus, Frame};

pub fn run(
    corpus: &str,
    human_path: &str,
    model_specs: &[String],
    kind: &str,
    na_label: i8,
    output_dir: &str,
) {
    if model_specs.is_empty() {
        super::fail("no model tables given (use --model name=path)");
    }
    let spec = super::resolve_corpus(corpus);
    let kind = super::parse_kind(kind);

    let human = match Frame::read_tsv(Path::new(human_path)) {
        Ok(frame) => frame,
        Err(e) => super::fail(e),
    };
    let mut models = Vec::with_capacity(model_specs.len());
    for raw in model_specs {
        let (name, path) = super::parse_model_spec(raw);
        match Frame::read_tsv(&path) {
            Ok(frame) => models.push((name, frame)),
            Err(e) => super::fail(e),
        }
    }

    let outputs = match merge_corpus(&spec, human_path, &human, &models, kind, na_label) {
        Ok(outputs) => outputs,
        Err(e) => super::fail(e),
    };

    if let Err(e) = fs::create_dir_all(output_dir) {
        super::fail(e);
    }
    for output in &outputs {
        let path = Path::new(output_dir).join(format!(
            "{}_{}_{}.tsv",
            spec.name, output.model, output.task
        ));
        if let Err(e) = output.frame.write_tsv(&path) {
            super::fail(e);
        }
        println!(
            "  {} ({} rows)",
            path.display(),
            output.frame.n_rows()
        );
    }
    println!(
        "Merged {} model/task table(s) for corpus '{}'",
        outputs.len(),
        spec.name
    );
}
