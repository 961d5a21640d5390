pub mod classify;
pub mod merge;
pub mod trace;
pub mod validate;

use std::path::PathBuf;

use prefixrev_core::{corpus_spec, CorpusSpec, RevisionKind, Task};

/// Exit with an error message. Commands never unwind past main.
pub fn fail(message: impl std::fmt::Display) -> ! {
    eprintln!("error: {message}");
    std::process::exit(1);
}

/// Parse a comma-separated task list (`"pos,dep"`).
pub fn parse_tasks(s: &str) -> Vec<Task> {
    let mut tasks = Vec::new();
    for part in s.split(',').map(|p| p.trim()).filter(|p| !p.is_empty()) {
        match Task::parse(part) {
            Some(task) => tasks.push(task),
            None => fail(format!(
                "unknown task '{part}' (expected pos, dep, head, or ner)"
            )),
        }
    }
    if tasks.is_empty() {
        fail("no tasks given");
    }
    tasks
}

/// Parse a `name=path` model table spec.
pub fn parse_model_spec(s: &str) -> (String, PathBuf) {
    match s.split_once('=') {
        Some((name, path)) if !name.is_empty() && !path.is_empty() => {
            (name.to_string(), PathBuf::from(path))
        }
        _ => fail(format!("bad model spec '{s}' (expected name=path)")),
    }
}

/// Map the CLI kind flag onto the typed revision kind.
pub fn parse_kind(s: &str) -> RevisionKind {
    match s {
        "revision" => RevisionKind::Plain,
        "convenient" => RevisionKind::Convenient,
        "effective" => RevisionKind::Effective,
        _ => fail(format!("unknown revision kind '{s}'")),
    }
}

/// Resolve a corpus name, accepting unknown corpora with zero tolerance.
pub fn resolve_corpus(name: &str) -> CorpusSpec {
    match corpus_spec(name) {
        Some(spec) => spec.clone(),
        None => {
            log::warn!("unknown corpus '{name}': using token mismatch tolerance 0");
            CorpusSpec::custom(name)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // -----------------------------------------------------------------------
    // parse_tasks tests
    // -----------------------------------------------------------------------

    #[test]
    fn test_parse_tasks_list() {
        assert_eq!(
            parse_tasks("pos,dep,head"),
            vec![Task::Pos, Task::Dependency, Task::Head]
        );
    }

    #[test]
    fn test_parse_tasks_trims_whitespace() {
        assert_eq!(parse_tasks(" pos , ner "), vec![Task::Pos, Task::Ner]);
    }

    // -----------------------------------------------------------------------
    // parse_model_spec tests
    // -----------------------------------------------------------------------

    #[test]
    fn test_parse_model_spec() {
        let (name, path) = parse_model_spec("spacy_sm=tables/spacy.tsv");
        assert_eq!(name, "spacy_sm");
        assert_eq!(path, PathBuf::from("tables/spacy.tsv"));
    }

    // -----------------------------------------------------------------------
    // parse_kind / resolve_corpus tests
    // -----------------------------------------------------------------------

    #[test]
    fn test_parse_kind() {
        assert_eq!(parse_kind("revision"), RevisionKind::Plain);
        assert_eq!(parse_kind("convenient"), RevisionKind::Convenient);
        assert_eq!(parse_kind("effective"), RevisionKind::Effective);
    }

    #[test]
    fn test_resolve_known_corpus() {
        assert_eq!(resolve_corpus("provo").token_mismatch_tolerance, 3);
    }

    #[test]
    fn test_resolve_unknown_corpus_zero_tolerance() {
        let spec = resolve_corpus("celer");
        assert_eq!(spec.name, "celer");
        assert_eq!(spec.token_mismatch_tolerance, 0);
    }
}
