//! Tabular merge stage: align human and model tables, reshape to long form.
//!
//! For one corpus, the human table for a designated measure is the base.
//! Model revision columns are joined onto it by the shared token-identifier
//! index, then each selected model/task column is melted into one row per
//! (token, subject) with the human signal as the value column.
//!
//! Validation runs before any merge: identical indices across all tables,
//! token text equal up to the corpus's documented encoding-normalization
//! tolerance, and no empty token text anywhere. Violations abort the
//! corpus.

use std::collections::HashSet;

use crate::corpus::{CorpusSpec, TokenId};
use crate::error::{PipelineError, Result};
use crate::revision::RevisionKind;
use crate::table::Frame;

/// Column name every melted task column is renamed to.
pub const REVISION_COLUMN: &str = "revision";
/// Name of the token-text column shared by all tables.
pub const TOKEN_COLUMN: &str = "Token";

/// A model revision column after joining, with typed identity instead of
/// name matching.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelColumn {
    pub model: String,
    pub task: String,
    pub kind: RevisionKind,
    /// Column name inside the joined frame (suffixed on collision).
    pub name: String,
}

/// One long-format output table for a (model, task) pair.
#[derive(Debug, Clone)]
pub struct MergeOutput {
    pub model: String,
    /// Base task name, chunk qualifiers stripped.
    pub task: String,
    pub frame: Frame,
}

/// Strip a size/chunk qualifier from a task label: `pos_c512` → `pos`.
pub fn base_task_name(task: &str) -> &str {
    task.split('_').next().unwrap_or(task)
}

fn token_column<'a>(name: &str, frame: &'a Frame) -> Result<&'a [String]> {
    frame
        .column(TOKEN_COLUMN)
        .map(|c| c.values.as_slice())
        .ok_or_else(|| PipelineError::MissingColumn {
            table: name.to_string(),
            column: TOKEN_COLUMN.to_string(),
        })
}

fn check_no_missing_tokens(name: &str, frame: &Frame) -> Result<()> {
    let tokens = token_column(name, frame)?;
    for (id, token) in frame.index.iter().zip(tokens) {
        if token.is_empty() {
            return Err(PipelineError::MissingToken {
                table: name.to_string(),
                id: id.clone(),
            });
        }
    }
    Ok(())
}

/// Enforce the pre-merge invariants for one corpus: identical ordered
/// indices, token text within tolerance, no missing token text.
pub fn validate_tables(
    corpus: &CorpusSpec,
    base_name: &str,
    base: &Frame,
    others: &[(&str, &Frame)],
) -> Result<()> {
    check_no_missing_tokens(base_name, base)?;
    let base_tokens = token_column(base_name, base)?;

    for (name, frame) in others {
        if frame.index != base.index {
            let reason = if frame.n_rows() != base.n_rows() {
                format!("{} rows vs {}", frame.n_rows(), base.n_rows())
            } else {
                let row = frame
                    .index
                    .iter()
                    .zip(&base.index)
                    .position(|(a, b)| a != b)
                    .unwrap_or(0);
                format!("first divergence at row {row}")
            };
            return Err(PipelineError::IndexMismatch {
                base: base_name.to_string(),
                other: name.to_string(),
                reason,
            });
        }

        check_no_missing_tokens(name, frame)?;
        let tokens = token_column(name, frame)?;
        let mismatches = base_tokens
            .iter()
            .zip(tokens)
            .filter(|(a, b)| a != b)
            .count();
        if mismatches > corpus.token_mismatch_tolerance {
            return Err(PipelineError::TokenMismatch {
                corpus: corpus.name.to_string(),
                count: mismatches,
                tolerance: corpus.token_mismatch_tolerance,
            });
        }
        if mismatches > 0 {
            log::info!(
                "corpus '{}': {} token mismatches between '{}' and '{}' (within tolerance {})",
                corpus.name,
                mismatches,
                base_name,
                name,
                corpus.token_mismatch_tolerance
            );
        }
    }
    Ok(())
}

/// Join every model's revision columns onto the base human frame,
/// suffixing `_<model>` on column-name collisions. Returns the joined
/// frame plus the typed identity of every column added.
pub fn join_model_columns(
    base: &Frame,
    models: &[(String, Frame)],
) -> Result<(Frame, Vec<ModelColumn>)> {
    let mut joined = base.clone();
    let mut added = Vec::new();

    for (model, frame) in models {
        for column in &frame.columns {
            let Some((kind, task)) = RevisionKind::parse_column(&column.name) else {
                continue;
            };
            let name = if joined.has_column(&column.name) {
                format!("{}_{}", column.name, model)
            } else {
                column.name.clone()
            };
            joined.push_column(name.clone(), column.values.clone())?;
            added.push(ModelColumn {
                model: model.clone(),
                task: task.to_string(),
                kind,
                name,
            });
        }
    }
    Ok((joined, added))
}

/// Melt one model/task column against the human subject columns.
///
/// Subject columns are the human columns embedding a subject id after a
/// colon. Output rows are subject-major: for each subject, one row per
/// token, with columns identifier, `Token`, `revision`, `subjectid`,
/// `regression`, `textid`, `token_position`. Empty cells in either signal
/// column are filled with `na_label`, the same sentinel the classifier
/// uses, so the merged output carries exactly one non-applicable encoding.
pub fn melt_long(human: &Frame, revision_values: &[String], na_label: i8) -> Result<Frame> {
    if revision_values.len() != human.n_rows() {
        return Err(PipelineError::LengthMismatch {
            what: "revision column vs human table",
            expected: human.n_rows(),
            got: revision_values.len(),
        });
    }
    let tokens = token_column("human", human)?;
    let na = na_label.to_string();
    let fill = |cell: &str| {
        if cell.is_empty() {
            na.clone()
        } else {
            cell.to_string()
        }
    };

    let subjects: Vec<(&str, &[String])> = human
        .columns
        .iter()
        .filter_map(|c| {
            c.name
                .split_once(':')
                .map(|(_, subject)| (subject, c.values.as_slice()))
        })
        .collect();

    let n = human.n_rows() * subjects.len();
    let mut index = Vec::with_capacity(n);
    let mut token_out = Vec::with_capacity(n);
    let mut revision_out = Vec::with_capacity(n);
    let mut subject_out = Vec::with_capacity(n);
    let mut regression_out = Vec::with_capacity(n);
    let mut textid_out = Vec::with_capacity(n);
    let mut position_out = Vec::with_capacity(n);

    for (subject, values) in &subjects {
        for (row, id) in human.index.iter().enumerate() {
            let parsed = TokenId::parse(id)?;
            index.push(id.clone());
            token_out.push(tokens[row].clone());
            revision_out.push(fill(&revision_values[row]));
            subject_out.push(subject.to_string());
            regression_out.push(fill(&values[row]));
            textid_out.push(parsed.text_id);
            position_out.push(parsed.position.to_string());
        }
    }

    let mut frame = Frame::with_index(human.index_name.clone(), index);
    frame.push_column(TOKEN_COLUMN, token_out)?;
    frame.push_column(REVISION_COLUMN, revision_out)?;
    frame.push_column("subjectid", subject_out)?;
    frame.push_column("regression", regression_out)?;
    frame.push_column("textid", textid_out)?;
    frame.push_column("token_position", position_out)?;
    Ok(frame)
}

/// Full merge for one corpus: validate, join, and melt every column of the
/// selected revision kind into one long-format output per (model, task).
///
/// Task names collapse to their base form, so a model table carrying both
/// a base column and a chunk-qualified variant of the same task would map
/// two different data columns onto one output filename. That is rejected
/// rather than letting the second table clobber the first.
pub fn merge_corpus(
    corpus: &CorpusSpec,
    base_name: &str,
    human: &Frame,
    models: &[(String, Frame)],
    kind: RevisionKind,
    na_label: i8,
) -> Result<Vec<MergeOutput>> {
    let others: Vec<(&str, &Frame)> = models
        .iter()
        .map(|(name, frame)| (name.as_str(), frame))
        .collect();
    validate_tables(corpus, base_name, human, &others)?;

    let (joined, columns) = join_model_columns(human, models)?;

    let mut outputs = Vec::new();
    let mut seen = HashSet::new();
    for column in columns.iter().filter(|c| c.kind == kind) {
        let task = base_task_name(&column.task).to_string();
        if !seen.insert((column.model.clone(), task.clone())) {
            return Err(PipelineError::DuplicateTask {
                model: column.model.clone(),
                task,
            });
        }
        let values = &joined
            .column(&column.name)
            .expect("joined column present")
            .values;
        let frame = melt_long(human, values, na_label)?;
        outputs.push(MergeOutput {
            model: column.model.clone(),
            task,
            frame,
        });
    }
    log::info!(
        "corpus '{}': merged {} model/task columns into long format",
        corpus.name,
        outputs.len()
    );
    Ok(outputs)
}
