//! Pipeline error taxonomy.
//!
//! Every failure here is terminal for the batch unit that hit it: there is
//! no retry or partial-result recovery in an offline analysis run. Schema
//! violations and length mismatches in particular must fail loudly rather
//! than silently truncate.

use std::path::PathBuf;

use thiserror::Error;

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, PipelineError>;

/// Errors raised by the labelling, classification, and merge stages.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("labeller '{name}' failed: {reason}")]
    Labeller { name: String, reason: String },

    #[error("length mismatch comparing {what}: expected {expected} labels, got {got}")]
    LengthMismatch {
        what: &'static str,
        expected: usize,
        got: usize,
    },

    #[error("bad token identifier '{0}' (expected text_<id>_token_<position>)")]
    BadTokenId(String),

    #[error("malformed table {path}: {reason}")]
    Table { path: PathBuf, reason: String },

    #[error("index mismatch between '{base}' and '{other}': {reason}")]
    IndexMismatch {
        base: String,
        other: String,
        reason: String,
    },

    #[error(
        "token text mismatch in corpus '{corpus}': {count} differing entries \
         exceed the documented tolerance of {tolerance}"
    )]
    TokenMismatch {
        corpus: String,
        count: usize,
        tolerance: usize,
    },

    #[error("missing token text at '{id}' in table '{table}'")]
    MissingToken { table: String, id: String },

    #[error("table '{table}' has no '{column}' column")]
    MissingColumn { table: String, column: String },

    #[error(
        "model '{model}' has multiple revision columns collapsing to base task '{task}'; \
         merge one variant at a time"
    )]
    DuplicateTask { model: String, task: String },

    #[error("unknown corpus '{0}'")]
    UnknownCorpus(String),

    #[error("text '{text_id}': token positions must be contiguous from 0, missing position {position}")]
    NonContiguousText { text_id: String, position: usize },

    #[error("text '{text_id}': token position key '{key}' is not a non-negative integer")]
    BadPosition { text_id: String, key: String },
}
