use std::path::Path;

use prefixrev_core::{validate_tables, Frame};

pub fn run(corpus: &str, human_path: &str, model_specs: &[String]) {
    let spec = super::resolve_corpus(corpus);

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
    let others: Vec<(&str, &Frame)> = models
        .iter()
        .map(|(name, frame)| (name.as_str(), frame))
        .collect();

    match validate_tables(&spec, human_path, &human, &others) {
        Ok(()) => println!(
            "OK: {} row(s), {} model table(s), tolerance {}",
            human.n_rows(),
            others.len(),
            spec.token_mismatch_tolerance
        ),
        Err(e) => super::fail(e),
    }
}
