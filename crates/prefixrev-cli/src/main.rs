//! CLI for prefixrev — incremental labelling revision analysis.

mod commands;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "prefixrev")]
#[command(about = "prefixrev — compare model revisions with human reading regressions")]
#[command(version = prefixrev_core::VERSION)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Trace a labeller over every text prefix and classify revisions
    Trace {
        /// Corpus name (provo, geco, meco, zuco, or custom)
        #[arg(long)]
        corpus: String,

        /// Path to the corpus texts JSON (text id -> position -> token)
        #[arg(long)]
        texts: String,

        /// Model name used in filenames and column names
        #[arg(long)]
        model: String,

        /// External labeller command; gets the task name as final argument
        /// and the prefix on stdin, prints one label per line
        #[arg(long)]
        cmd: String,

        /// Comma-separated tasks: pos, dep, head, ner
        #[arg(long, default_value = "pos")]
        tasks: String,

        /// Output directory for run artifacts (default: ./runs/)
        #[arg(long)]
        output: Option<String>,

        /// Sentinel for "no revision, not applicable"
        #[arg(long, default_value = "0")]
        na_label: i8,

        /// Run note stored in run.json
        #[arg(long)]
        note: Option<String>,
    },

    /// Re-classify an existing trace JSON into a revision table
    Classify {
        /// Path to a trace JSON written by the trace command
        #[arg(long)]
        trace: String,

        /// Path to the corpus texts JSON the trace was built from
        #[arg(long)]
        texts: String,

        /// Task the trace belongs to: pos, dep, head, ner
        #[arg(long)]
        task: String,

        /// Sentinel for "no revision, not applicable"
        #[arg(long, default_value = "0")]
        na_label: i8,

        /// Output TSV path
        #[arg(long)]
        output: String,
    },

    /// Merge human regression tables with model revision tables
    Merge {
        /// Corpus name (provo, geco, meco, zuco, or custom)
        #[arg(long)]
        corpus: String,

        /// Path to the human measure TSV (base table)
        #[arg(long)]
        human: String,

        /// Model tables as name=path, repeatable
        #[arg(long = "model")]
        models: Vec<String>,

        /// Revision kind to melt: revision, convenient, effective
        #[arg(long, default_value = "revision", value_parser = ["revision", "convenient", "effective"])]
        kind: String,

        /// Sentinel filled into empty signal cells
        #[arg(long, default_value = "0")]
        na_label: i8,

        /// Output directory for merged TSVs
        #[arg(long, default_value = "merged")]
        output: String,
    },

    /// Check table alignment invariants without writing anything
    Validate {
        /// Corpus name (determines the token mismatch tolerance)
        #[arg(long)]
        corpus: String,

        /// Path to the human measure TSV (base table)
        #[arg(long)]
        human: String,

        /// Model tables as name=path, repeatable
        #[arg(long = "model")]
        models: Vec<String>,
    },
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Trace {
            corpus,
            texts,
            model,
            cmd,
            tasks,
            output,
            na_label,
            note,
        } => commands::trace::run(commands::trace::TraceCommandConfig {
            corpus: &corpus,
            texts_path: &texts,
            model: &model,
            cmd: &cmd,
            tasks: &tasks,
            output_dir: output.as_deref(),
            na_label,
            note: note.as_deref(),
        }),
        Commands::Classify {
            trace,
            texts,
            task,
            na_label,
            output,
        } => commands::classify::run(&trace, &texts, &task, na_label, &output),
        Commands::Merge {
            corpus,
            human,
            models,
            kind,
            na_label,
            output,
        } => commands::merge::run(&corpus, &human, &models, &kind, na_label, &output),
        Commands::Validate {
            corpus,
            human,
            models,
        } => commands::validate::run(&corpus, &human, &models),
    }
}
