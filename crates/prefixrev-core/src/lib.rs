//! # prefixrev-core
//!
//! **Do sequence labellers change their minds the way readers move their
//! eyes back?**
//!
//! `prefixrev-core` is the analysis library behind a psycholinguistics
//! pipeline comparing human reading regressions with the incremental
//! predictions of sequence-labelling models (POS tagging, dependency
//! parsing, head indices, NER) as they see a text one token at a time.
//!
//! ## Quick Start
//!
//! ```no_run
//! use prefixrev_core::{classify_trace, run_incremental, ClassifierConfig, Task};
//! # fn demo(labeller: &dyn prefixrev_core::SequenceLabeller,
//! #         text: &prefixrev_core::Text) -> prefixrev_core::Result<()> {
//! // Trace the model over every prefix of a text...
//! let trace = run_incremental(labeller, text, Task::Pos)?;
//!
//! // ...then label every position with the three revision signals.
//! let labels = classify_trace(&trace, ClassifierConfig::default())?;
//! assert_eq!(labels.len(), text.len());
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! Texts → Incremental driver → Output traces → Revision classifier →
//! wide revision tables → Merge stage → long-format tables
//!
//! Every labelling model sits behind the [`SequenceLabeller`] trait; the
//! pipeline never assumes an incremental API and simply re-runs the model
//! on each growing prefix. The merge stage aligns model revision tables
//! with human regression tables by a shared token identifier and melts
//! them into one row per (token, subject).

pub mod corpus;
pub mod error;
pub mod labeller;
pub mod merge;
pub mod revision;
pub mod run;
pub mod table;
pub mod text;
pub mod trace;

pub use corpus::{corpus_spec, require_corpus, CorpusSpec, TokenId, KNOWN_CORPORA};
pub use error::{PipelineError, Result};
pub use labeller::{CommandLabeller, LabellerInfo, SequenceLabeller, Task};
pub use merge::{
    base_task_name, join_model_columns, melt_long, merge_corpus, validate_tables, MergeOutput,
    ModelColumn, REVISION_COLUMN, TOKEN_COLUMN,
};
pub use revision::{
    classify_step, classify_trace, is_convenient_revision, is_effective_revision, is_revision,
    labels_frame, ClassifierConfig, RevisionKind, RevisionLabels, DEFAULT_NA_LABEL,
};
pub use run::{trace_and_classify, RunConfig, RunMeta, RunWriter};
pub use table::{Column, Frame};
pub use text::{load_texts, Text};
pub use trace::{read_traces, run_incremental, write_traces, OutputTrace};

/// Library version (from Cargo.toml).
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
