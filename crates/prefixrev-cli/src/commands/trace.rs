use std::path::{Path, PathBuf};
use std::time::Instant;

use prefixrev_core::{
    load_texts, trace_and_classify, ClassifierConfig, CommandLabeller, RunConfig, RunWriter,
};

pub struct TraceCommandConfig<'a> {
    pub corpus: &'a str,
    pub texts_path: &'a str,
    pub model: &'a str,
    pub cmd: &'a str,
    pub tasks: &'a str,
    pub output_dir: Option<&'a str>,
    pub na_label: i8,
    pub note: Option<&'a str>,
}

pub fn run(cfg: TraceCommandConfig<'_>) {
    let tasks = super::parse_tasks(cfg.tasks);
    let texts = match load_texts(Path::new(cfg.texts_path)) {
        Ok(texts) => texts,
        Err(e) => super::fail(e),
    };
    if texts.is_empty() {
        super::fail(format!("no texts in {}", cfg.texts_path));
    }

    let mut parts = cfg.cmd.split_whitespace().map(|p| p.to_string());
    let Some(program) = parts.next() else {
        super::fail("empty labeller command");
    };
    let labeller = CommandLabeller::new(cfg.model, program, parts.collect(), tasks.clone());

    let mut writer = match RunWriter::new(RunConfig {
        corpus: cfg.corpus.to_string(),
        output_dir: cfg
            .output_dir
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("runs")),
        classifier: ClassifierConfig {
            na_label: cfg.na_label,
        },
        note: cfg.note.map(|n| n.to_string()),
    }) {
        Ok(writer) => writer,
        Err(e) => super::fail(e),
    };

    println!(
        "Tracing {} text(s) with '{}' for {} task(s)...",
        texts.len(),
        cfg.model,
        tasks.len()
    );
    let t0 = Instant::now();
    if let Err(e) = trace_and_classify(&labeller, &texts, &tasks, &mut writer) {
        super::fail(e);
    }
    let files = writer.files_written();
    match writer.finish() {
        Ok(dir) => println!(
            "Done in {:.1}s: {} file(s) in {}",
            t0.elapsed().as_secs_f64(),
            files,
            dir.display()
        ),
        Err(e) => super::fail(e),
    }
}
