//! Revision classification over prefix-wise labeller outputs.
//!
//! A *revision* is a change between two successive prefix outputs over the
//! span both have seen. The previously-seen length anchors the comparison
//! window: labels appended by tokenizer splits in the current step are part
//! of one revision event, never counted separately. Two further labels
//! grade a revision against the full-context (final) output:
//!
//! - *convenient*: 0 if the revision abandoned a prediction that already
//!   matched the final output, 1 otherwise;
//! - *effective*: 1 if the revision strictly increased elementwise
//!   agreement with the final output.
//!
//! Positions without a revision carry the configured `NA_LABEL` sentinel in
//! both graded fields, so every triple is fully populated and downstream
//! aggregation never sees a missing value. Length mismatches between the
//! compared spans are hard errors; the comparison is meaningless on
//! unaligned spans.

use crate::error::{PipelineError, Result};
use crate::labeller::Task;
use crate::table::Frame;
use crate::text::Text;
use crate::trace::OutputTrace;

/// Default "not applicable" sentinel.
pub const DEFAULT_NA_LABEL: i8 = 0;

/// Which of the three revision labels a column carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RevisionKind {
    Plain,
    Convenient,
    Effective,
}

impl RevisionKind {
    pub const ALL: [RevisionKind; 3] = [Self::Plain, Self::Convenient, Self::Effective];

    /// Column-name prefix before the `:<task>` part.
    pub fn prefix(&self) -> &'static str {
        match self {
            Self::Plain => "revision",
            Self::Convenient => "convenient_revision",
            Self::Effective => "effective_revision",
        }
    }

    /// Full column name for a task, e.g. `revision:pos`.
    pub fn column_name(&self, task: &str) -> String {
        format!("{}:{task}", self.prefix())
    }

    /// Parse a column name into its kind and task part. Exact prefix
    /// match, not substring dispatch.
    pub fn parse_column(name: &str) -> Option<(RevisionKind, &str)> {
        let (head, task) = name.split_once(':')?;
        let kind = match head {
            "revision" => Self::Plain,
            "convenient_revision" => Self::Convenient,
            "effective_revision" => Self::Effective,
            _ => return None,
        };
        Some((kind, task))
    }
}

impl std::fmt::Display for RevisionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.prefix())
    }
}

/// Classifier configuration.
#[derive(Debug, Clone, Copy)]
pub struct ClassifierConfig {
    /// Sentinel for "not applicable because no revision occurred".
    pub na_label: i8,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            na_label: DEFAULT_NA_LABEL,
        }
    }
}

/// The three labels for one (text, position, task) triple.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RevisionLabels {
    pub revised: i8,
    pub convenient: i8,
    pub effective: i8,
}

impl RevisionLabels {
    /// Labels for a position where no comparison is possible (position 0).
    pub fn not_applicable(cfg: ClassifierConfig) -> Self {
        Self {
            revised: 0,
            convenient: cfg.na_label,
            effective: cfg.na_label,
        }
    }
}

fn check_len(what: &'static str, expected: usize, got: usize) -> Result<()> {
    if expected != got {
        return Err(PipelineError::LengthMismatch {
            what,
            expected,
            got,
        });
    }
    Ok(())
}

/// 1 iff `previous` and `current` differ elementwise anywhere.
pub fn is_revision(previous: &[String], current: &[String]) -> Result<i8> {
    check_len("previous vs current outputs", previous.len(), current.len())?;
    Ok(if previous != current { 1 } else { 0 })
}

/// `NA_LABEL` without a revision; else 0 if the revision abandoned a
/// prediction that already matched `final_output`, 1 otherwise.
pub fn is_convenient_revision(
    previous: &[String],
    current: &[String],
    final_output: &[String],
    cfg: ClassifierConfig,
) -> Result<i8> {
    check_len(
        "previous vs final outputs",
        previous.len(),
        final_output.len(),
    )?;
    if is_revision(previous, current)? == 0 {
        return Ok(cfg.na_label);
    }
    Ok(if previous == final_output { 0 } else { 1 })
}

/// `NA_LABEL` without a revision; else 1 iff the revision strictly
/// increased elementwise agreement with `final_output`.
pub fn is_effective_revision(
    previous: &[String],
    current: &[String],
    final_output: &[String],
    cfg: ClassifierConfig,
) -> Result<i8> {
    check_len(
        "previous vs final outputs",
        previous.len(),
        final_output.len(),
    )?;
    if is_revision(previous, current)? == 0 {
        return Ok(cfg.na_label);
    }
    let matches = |xs: &[String]| {
        xs.iter()
            .zip(final_output)
            .filter(|(a, b)| a == b)
            .count()
    };
    let n_correct_before = matches(previous);
    let n_correct_after = matches(current);
    Ok(if n_correct_after > n_correct_before { 1 } else { 0 })
}

/// Classify one step: the previous output against the current and final
/// outputs truncated to the previously-seen window.
///
/// `current_full` and `final_full` must be at least as long as `previous`;
/// a shorter sequence means the spans are unaligned and the run aborts.
pub fn classify_step(
    previous: &[String],
    current_full: &[String],
    final_full: &[String],
    cfg: ClassifierConfig,
) -> Result<RevisionLabels> {
    let window = previous.len();
    if current_full.len() < window {
        return Err(PipelineError::LengthMismatch {
            what: "current output within previous window",
            expected: window,
            got: current_full.len(),
        });
    }
    if final_full.len() < window {
        return Err(PipelineError::LengthMismatch {
            what: "final output within previous window",
            expected: window,
            got: final_full.len(),
        });
    }
    let current = &current_full[..window];
    let final_output = &final_full[..window];

    Ok(RevisionLabels {
        revised: is_revision(previous, current)?,
        convenient: is_convenient_revision(previous, current, final_output, cfg)?,
        effective: is_effective_revision(previous, current, final_output, cfg)?,
    })
}

/// Classify every position of a trace. Position 0 never revises; positions
/// 1.. compare against the predecessor with the trace's last step as the
/// final output. Exactly one fully-populated triple per position.
pub fn classify_trace(trace: &OutputTrace, cfg: ClassifierConfig) -> Result<Vec<RevisionLabels>> {
    let Some(final_full) = trace.final_output() else {
        return Ok(Vec::new());
    };
    let mut labels = Vec::with_capacity(trace.len());
    labels.push(RevisionLabels::not_applicable(cfg));
    for i in 1..trace.len() {
        labels.push(classify_step(
            &trace.steps[i - 1],
            &trace.steps[i],
            final_full,
            cfg,
        )?);
    }
    Ok(labels)
}

/// Build the wide revision table for one task: token-id index, `Token`
/// column, and the three label columns.
pub fn labels_frame(task: Task, items: &[(&Text, Vec<RevisionLabels>)]) -> Result<Frame> {
    let mut index = Vec::new();
    let mut tokens = Vec::new();
    let mut revised = Vec::new();
    let mut convenient = Vec::new();
    let mut effective = Vec::new();

    for (text, labels) in items {
        check_len("labels vs text tokens", text.len(), labels.len())?;
        for (position, triple) in labels.iter().enumerate() {
            index.push(text.token_id(position).to_string());
            tokens.push(text.tokens[position].clone());
            revised.push(triple.revised.to_string());
            convenient.push(triple.convenient.to_string());
            effective.push(triple.effective.to_string());
        }
    }

    let mut frame = Frame::with_index("id", index);
    frame.push_column("Token", tokens)?;
    frame.push_column(RevisionKind::Plain.column_name(task.as_str()), revised)?;
    frame.push_column(
        RevisionKind::Convenient.column_name(task.as_str()),
        convenient,
    )?;
    frame.push_column(
        RevisionKind::Effective.column_name(task.as_str()),
        effective,
    )?;
    Ok(frame)
}
