//! Abstract sequence-labeller seam.
//!
//! The pipeline treats labelling models as black boxes: given a text span,
//! return one string label per model token for the requested task. Head
//! indices are stringified so that a single code path serves every task.
//! The one production implementation, [`CommandLabeller`], shells out to
//! an external tagger process per prefix; tests use scripted in-memory
//! labellers.

use std::io::Write;
use std::process::{Command, Stdio};

use crate::error::{PipelineError, Result};

/// A labelling objective.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Task {
    /// Part-of-speech tags.
    Pos,
    /// Dependency relation labels.
    Dependency,
    /// Dependency head indices, encoded as strings.
    Head,
    /// Named-entity labels.
    Ner,
}

impl Task {
    /// Stable lowercase form used in filenames and column names.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pos => "pos",
            Self::Dependency => "dep",
            Self::Head => "head",
            Self::Ner => "ner",
        }
    }

    /// Parse the stable form back into a task.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pos" => Some(Self::Pos),
            "dep" | "dependency" => Some(Self::Dependency),
            "head" => Some(Self::Head),
            "ner" => Some(Self::Ner),
            _ => None,
        }
    }
}

impl std::fmt::Display for Task {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Metadata about a labelling model.
#[derive(Debug, Clone)]
pub struct LabellerInfo {
    /// Model identifier used in filenames and merged column names.
    pub name: String,
    /// Tasks this model can produce labels for.
    pub tasks: Vec<Task>,
}

/// Trait every labelling model adapter implements.
pub trait SequenceLabeller {
    /// Model metadata.
    fn info(&self) -> &LabellerInfo;

    /// Label `text` for `task`, returning one label per model token.
    ///
    /// The returned length is the model's own tokenization length, which
    /// may exceed the number of space-separated source tokens.
    fn label(&self, text: &str, task: Task) -> Result<Vec<String>>;

    /// Convenience: name from info.
    fn name(&self) -> &str {
        &self.info().name
    }
}

/// Labeller adapter that runs an external command per invocation.
///
/// Contract: the command receives the task's stable name as its final
/// argument and the text span on stdin, and prints one label per line on
/// stdout. Any non-zero exit or empty output is a labeller failure.
pub struct CommandLabeller {
    info: LabellerInfo,
    program: String,
    args: Vec<String>,
}

impl CommandLabeller {
    pub fn new(
        name: impl Into<String>,
        program: impl Into<String>,
        args: Vec<String>,
        tasks: Vec<Task>,
    ) -> Self {
        Self {
            info: LabellerInfo {
                name: name.into(),
                tasks,
            },
            program: program.into(),
            args,
        }
    }

    fn failure(&self, reason: impl Into<String>) -> PipelineError {
        PipelineError::Labeller {
            name: self.info.name.clone(),
            reason: reason.into(),
        }
    }
}

impl SequenceLabeller for CommandLabeller {
    fn info(&self) -> &LabellerInfo {
        &self.info
    }

    fn label(&self, text: &str, task: Task) -> Result<Vec<String>> {
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .arg(task.as_str())
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| self.failure(format!("failed to spawn '{}': {e}", self.program)))?;

        // stdin handle is dropped after writing so the child sees EOF.
        child
            .stdin
            .take()
            .ok_or_else(|| self.failure("child stdin unavailable"))?
            .write_all(text.as_bytes())
            .map_err(|e| self.failure(format!("failed to write prefix: {e}")))?;

        let output = child
            .wait_with_output()
            .map_err(|e| self.failure(format!("failed to read output: {e}")))?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(self.failure(format!(
                "exit status {}: {}",
                output.status,
                stderr.trim()
            )));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let labels: Vec<String> = stdout.lines().map(|l| l.to_string()).collect();
        if labels.is_empty() {
            return Err(self.failure("no labels on stdout"));
        }
        Ok(labels)
    }
}
