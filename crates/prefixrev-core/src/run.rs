//! Run recording for pipeline outputs.
//!
//! One run covers one corpus. All artifacts land in a timestamped run
//! directory so repeated runs never clobber each other.
//!
//! # Storage format
//!
//! - `run.json` — metadata (corpus, models, tasks, timing, file count)
//! - `<corpus>/<model>/trace_<task>.json` — raw label-sequence traces
//! - `<corpus>/<model>/revisions.tsv` — wide revision-label table
//! - `merged/<corpus>_<model>_<task>.tsv` — long-format merged tables

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::Result;
use crate::labeller::{SequenceLabeller, Task};
use crate::revision::{classify_trace, labels_frame, ClassifierConfig};
use crate::table::Frame;
use crate::text::Text;
use crate::trace::{run_incremental, write_traces, OutputTrace};

/// Configuration for one pipeline run.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub corpus: String,
    pub output_dir: PathBuf,
    pub classifier: ClassifierConfig,
    pub note: Option<String>,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            corpus: String::new(),
            output_dir: PathBuf::from("runs"),
            classifier: ClassifierConfig::default(),
            note: None,
        }
    }
}

/// Run metadata written to run.json at the end of a run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunMeta {
    pub version: u32,
    pub id: String,
    pub started_at: String,
    pub ended_at: String,
    pub duration_ms: u64,
    pub corpus: String,
    pub models: Vec<String>,
    pub tasks: Vec<String>,
    pub na_label: i8,
    pub files_written: u64,
    pub note: Option<String>,
    pub prefixrev_version: String,
}

/// Handles the file layout for one run.
pub struct RunWriter {
    run_dir: PathBuf,
    run_id: String,
    config: RunConfig,
    started_at: SystemTime,
    started_instant: Instant,
    models: BTreeSet<String>,
    tasks: BTreeSet<String>,
    files_written: u64,
}

impl RunWriter {
    /// Create the run directory: `{compact timestamp}-{corpus}`.
    pub fn new(config: RunConfig) -> Result<Self> {
        let started_at = SystemTime::now();
        let ts = started_at.duration_since(UNIX_EPOCH).unwrap_or_default();
        let dir_name = format!("{}-{}", format_iso8601_compact(ts), config.corpus);
        let run_dir = config.output_dir.join(dir_name);
        fs::create_dir_all(&run_dir)?;

        Ok(Self {
            run_dir,
            run_id: Uuid::new_v4().to_string(),
            config,
            started_at,
            started_instant: Instant::now(),
            models: BTreeSet::new(),
            tasks: BTreeSet::new(),
            files_written: 0,
        })
    }

    pub fn run_dir(&self) -> &Path {
        &self.run_dir
    }

    pub fn files_written(&self) -> u64 {
        self.files_written
    }

    fn model_dir(&self, model: &str) -> Result<PathBuf> {
        let dir = self.run_dir.join(&self.config.corpus).join(model);
        fs::create_dir_all(&dir)?;
        Ok(dir)
    }

    /// Write the raw trace JSON for one (model, task).
    pub fn write_trace_json(
        &mut self,
        model: &str,
        task: Task,
        traces: &[OutputTrace],
    ) -> Result<PathBuf> {
        let path = self.model_dir(model)?.join(format!("trace_{task}.json"));
        write_traces(&path, traces)?;
        self.note_file(model, Some(task));
        Ok(path)
    }

    /// Write the wide revision-label table for one model.
    pub fn write_revision_table(&mut self, model: &str, frame: &Frame) -> Result<PathBuf> {
        let path = self.model_dir(model)?.join("revisions.tsv");
        frame.write_tsv(&path)?;
        self.note_file(model, None);
        Ok(path)
    }

    /// Write one merged long-format table.
    pub fn write_merged(&mut self, model: &str, task: &str, frame: &Frame) -> Result<PathBuf> {
        let dir = self.run_dir.join("merged");
        fs::create_dir_all(&dir)?;
        let path = dir.join(format!("{}_{}_{}.tsv", self.config.corpus, model, task));
        frame.write_tsv(&path)?;
        self.models.insert(model.to_string());
        self.tasks.insert(task.to_string());
        self.files_written += 1;
        Ok(path)
    }

    fn note_file(&mut self, model: &str, task: Option<Task>) {
        self.models.insert(model.to_string());
        if let Some(task) = task {
            self.tasks.insert(task.as_str().to_string());
        }
        self.files_written += 1;
    }

    /// Finalize the run, writing run.json.
    pub fn finish(self) -> Result<PathBuf> {
        let ended_at = SystemTime::now();
        let meta = RunMeta {
            version: 1,
            id: self.run_id,
            started_at: format_iso8601(
                self.started_at.duration_since(UNIX_EPOCH).unwrap_or_default(),
            ),
            ended_at: format_iso8601(ended_at.duration_since(UNIX_EPOCH).unwrap_or_default()),
            duration_ms: self.started_instant.elapsed().as_millis() as u64,
            corpus: self.config.corpus.clone(),
            models: self.models.into_iter().collect(),
            tasks: self.tasks.into_iter().collect(),
            na_label: self.config.classifier.na_label,
            files_written: self.files_written,
            note: self.config.note.clone(),
            prefixrev_version: crate::VERSION.to_string(),
        };

        let json = serde_json::to_string_pretty(&meta)?;
        fs::write(self.run_dir.join("run.json"), json)?;
        Ok(self.run_dir)
    }
}

/// Run the full labelling + classification stage for one model over a
/// corpus: per task, trace every text, classify, and write the trace JSON
/// plus one combined revision table for the model.
pub fn trace_and_classify(
    labeller: &dyn SequenceLabeller,
    texts: &[Text],
    tasks: &[Task],
    writer: &mut RunWriter,
) -> Result<()> {
    let cfg = writer.config.classifier;
    let model = labeller.name().to_string();
    let mut combined: Option<Frame> = None;

    for &task in tasks {
        log::info!("model '{model}': tracing {} texts for {task}", texts.len());
        let mut traces = Vec::with_capacity(texts.len());
        for text in texts {
            traces.push(run_incremental(labeller, text, task)?);
        }
        writer.write_trace_json(&model, task, &traces)?;

        let mut items = Vec::with_capacity(texts.len());
        for (text, trace) in texts.iter().zip(&traces) {
            items.push((text, classify_trace(trace, cfg)?));
        }
        let frame = labels_frame(task, &items)?;

        if let Some(table) = combined.as_mut() {
            // Same texts in the same order, so indices agree; only the
            // three per-task label columns are new.
            for column in frame.columns {
                if column.name != crate::merge::TOKEN_COLUMN {
                    table.push_column(column.name, column.values)?;
                }
            }
        } else {
            combined = Some(frame);
        }
    }

    if let Some(frame) = combined {
        writer.write_revision_table(&model, &frame)?;
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Timestamp helpers
// ---------------------------------------------------------------------------

/// Compact ISO-8601 for directory names, e.g. `2026-02-15T013000Z`.
fn format_iso8601_compact(since_epoch: Duration) -> String {
    let (y, mo, d, h, mi, s) = secs_to_utc(since_epoch.as_secs());
    format!("{y:04}-{mo:02}-{d:02}T{h:02}{mi:02}{s:02}Z")
}

/// Full ISO-8601, e.g. `2026-02-15T01:30:00Z`.
fn format_iso8601(since_epoch: Duration) -> String {
    let (y, mo, d, h, mi, s) = secs_to_utc(since_epoch.as_secs());
    format!("{y:04}-{mo:02}-{d:02}T{h:02}:{mi:02}:{s:02}Z")
}

/// Seconds since Unix epoch to UTC fields. No leap-second handling.
fn secs_to_utc(secs: u64) -> (u64, u64, u64, u64, u64, u64) {
    let sec = secs % 60;
    let min = (secs / 60) % 60;
    let hour = (secs / 3600) % 24;

    let mut days = secs / 86400;
    let mut year = 1970u64;
    loop {
        let in_year = if is_leap(year) { 366 } else { 365 };
        if days < in_year {
            break;
        }
        days -= in_year;
        year += 1;
    }

    let month_days: [u64; 12] = if is_leap(year) {
        [31, 29, 31, 30, 31, 30, 31, 31, 30, 31, 30, 31]
    } else {
        [31, 28, 31, 30, 31, 30, 31, 31, 30, 31, 30, 31]
    };
    let mut month = 0u64;
    for (i, &md) in month_days.iter().enumerate() {
        if days < md {
            month = i as u64 + 1;
            break;
        }
        days -= md;
    }
    (year, month, days + 1, hour, min, sec)
}

fn is_leap(year: u64) -> bool {
    (year % 4 == 0 && year % 100 != 0) || (year % 400 == 0)
}
