//! survey-embed CLI
//!
//! Single command: read the candidates and mapping tables, write the
//! per-question embeddings and the manifest.

use clap::Parser;
use colored::*;
use std::path::PathBuf;
use std::time::Instant;

use crate::config::PipelineConfig;
use crate::pipeline::EmbeddingPipeline;

// ─── Styling helpers ───────────────────────────────────────────────────────────

fn dim(s: &str) -> ColoredString   { s.truecolor(100, 100, 100) }
fn accent(s: &str) -> ColoredString { s.truecolor(120, 170, 255) }
fn muted(s: &str) -> ColoredString  { s.truecolor(140, 140, 140) }
fn ok(s: &str) -> ColoredString     { s.truecolor(100, 210, 120) }

fn kv(key: &str, val: &str) -> String {
    format!("{} {}", muted(key), val.white())
}

fn step_run(msg: &str) {
    eprint!("  {} {}... ", accent("›"), msg);
}

fn step_done(detail: &str) {
    eprintln!("{} {}", ok("done"), dim(detail));
}

fn section(title: &str) {
    eprintln!();
    eprintln!("  {}", title.white().bold());
    eprintln!("  {}", dim(&"─".repeat(56)));
}

// ─── CLI definition ────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "survey-embed")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Per-question 3D embeddings of candidate survey responses")]
#[command(long_about = None)]
pub struct Cli {
    /// Candidate responses CSV
    #[arg(long, default_value = "_all_candidates.csv")]
    pub candidates: PathBuf,

    /// Question mapping CSV (column, question_full, options_text)
    #[arg(long, default_value = "question_mapping.csv")]
    pub mapping: PathBuf,

    /// Output directory
    #[arg(long, default_value = "out")]
    pub outdir: PathBuf,

    /// auto | umap | pca | umap,pca
    #[arg(long, default_value = "auto")]
    pub methods: String,

    /// Respondent name column
    #[arg(long, default_value = "氏名")]
    pub name_col: String,

    /// Respondent party column
    #[arg(long, default_value = "政党")]
    pub party_col: String,

    /// Respondent group column
    #[arg(long, default_value = "グループ")]
    pub group_col: String,

    /// RNG seed for jitter and fabricated axes
    #[arg(long, default_value = "42")]
    pub seed: u64,
}

impl Cli {
    pub fn into_config(self) -> PipelineConfig {
        PipelineConfig {
            candidates: self.candidates,
            mapping: self.mapping,
            outdir: self.outdir,
            methods: self.methods,
            name_col: self.name_col,
            party_col: self.party_col,
            group_col: self.group_col,
            seed: self.seed,
            ..PipelineConfig::default()
        }
    }
}

/// Run the full build and print the summary line to stdout.
pub fn cmd_build(cli: Cli) -> anyhow::Result<()> {
    let pipeline = EmbeddingPipeline::new(cli.into_config())?;
    let config = pipeline.config();

    section("Embed");
    eprintln!("  {}", kv("candidates", &config.candidates.display().to_string()));
    eprintln!("  {}", kv("mapping   ", &config.mapping.display().to_string()));
    let methods: Vec<&str> = pipeline.methods().iter().map(|m| m.as_str()).collect();
    eprintln!("  {}", kv("methods   ", &methods.join(",")));
    eprintln!();

    step_run("Building embeddings");
    let start = Instant::now();
    let summary = pipeline.run()?;
    step_done(&format!(
        "{} questions, {} files in {:?}",
        summary.questions.len(),
        summary.files.len(),
        start.elapsed()
    ));

    println!("{}", summary.summary_line());
    Ok(())
}
