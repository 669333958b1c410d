//! End-to-end run: load → per-question scale → embed → write

use crate::config::PipelineConfig;
use crate::error::Result;
use crate::export::{
    render_value, write_json, write_json_pretty, EmbedFile, Manifest, QuestionEntry,
    RespondentRecord, MANIFEST_FILE,
};
use crate::mapping::{QuestionMapping, QuestionMeta};
use crate::preprocessing::QuestionPreprocessor;
use crate::utils::data_loader::{has_column, numeric_column, string_column, DataLoader};
use crate::visualization::{Capabilities, Embedder, Method, MethodRequest};
use polars::prelude::DataFrame;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::path::PathBuf;
use std::time::Instant;
use tracing::{debug, info, warn};

/// What a completed run produced
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub outdir: PathBuf,
    pub methods: Vec<Method>,
    /// Base ids written to the manifest, in order
    pub questions: Vec<String>,
    /// Base ids with no mapped column in the candidates table
    pub skipped: Vec<String>,
    /// Every file written, manifest last
    pub files: Vec<PathBuf>,
}

impl RunSummary {
    /// One-line completion message
    pub fn summary_line(&self) -> String {
        let methods: Vec<&str> = self.methods.iter().map(Method::as_str).collect();
        format!("written: {} (methods={:?})", self.outdir.display(), methods)
    }
}

/// Name/party/group of every respondent, in row order
struct Respondents {
    names: Vec<Option<String>>,
    parties: Vec<Option<String>>,
    groups: Vec<Option<String>>,
}

impl Respondents {
    fn load(df: &DataFrame, config: &PipelineConfig) -> Result<Self> {
        Ok(Self {
            names: string_column(df, &config.name_col)?,
            parties: string_column(df, &config.party_col)?,
            groups: string_column(df, &config.group_col)?,
        })
    }

    fn records(&self, columns: &[&str], raw: &[Vec<Option<f64>>]) -> Vec<RespondentRecord> {
        (0..self.names.len())
            .map(|i| RespondentRecord {
                id: i,
                name: self.names[i].clone(),
                party: self.parties[i].clone(),
                group: self.groups[i].clone(),
                answers: columns
                    .iter()
                    .zip(raw)
                    .map(|(c, values)| (c.to_string(), render_value(values[i])))
                    .collect(),
            })
            .collect()
    }
}

/// The embedding run with its methods already resolved
pub struct EmbeddingPipeline {
    config: PipelineConfig,
    methods: Vec<Method>,
}

impl EmbeddingPipeline {
    /// Parse `--methods` and resolve it against this build.
    ///
    /// Fails before anything is read or written when the request is invalid
    /// or asks for an unavailable method.
    pub fn new(config: PipelineConfig) -> Result<Self> {
        Self::with_capabilities(config, Capabilities::probe())
    }

    pub fn with_capabilities(config: PipelineConfig, capabilities: Capabilities) -> Result<Self> {
        let request: MethodRequest = config.methods.parse()?;
        let methods = request.resolve(&capabilities)?;
        info!(
            requested = %config.methods,
            resolved = ?methods,
            "Resolved embedding methods"
        );
        Ok(Self { config, methods })
    }

    pub fn methods(&self) -> &[Method] {
        &self.methods
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Read both input files and run every question.
    pub fn run(&self) -> Result<RunSummary> {
        let loader = DataLoader::new();
        let candidates = loader.load_csv(&self.config.candidates)?;
        let mapping = QuestionMapping::load(&self.config.mapping)?;
        self.run_with(&candidates, &mapping)
    }

    /// Run every question of `mapping` over an already loaded candidates table.
    pub fn run_with(&self, candidates: &DataFrame, mapping: &QuestionMapping) -> Result<RunSummary> {
        let start = Instant::now();
        let respondents = Respondents::load(candidates, &self.config)?;

        let outdir = &self.config.outdir;
        std::fs::create_dir_all(outdir)?;

        let preprocessor = QuestionPreprocessor::with_config(self.config.preprocessing.clone());
        let embedder = Embedder::new(self.config.embedding.clone());
        let mut rng = ChaCha8Rng::seed_from_u64(self.config.seed);

        let mut manifest = Manifest::new();
        let mut summary = RunSummary {
            outdir: outdir.clone(),
            methods: self.methods.clone(),
            questions: Vec::new(),
            skipped: Vec::new(),
            files: Vec::new(),
        };

        for question in mapping.questions() {
            let columns: Vec<&str> = question
                .columns
                .iter()
                .map(String::as_str)
                .filter(|c| has_column(candidates, c))
                .collect();
            if columns.is_empty() {
                warn!(base = %question.base, "No mapped columns in candidates table, skipping");
                summary.skipped.push(question.base.clone());
                continue;
            }

            let written = self.run_question(
                question,
                &columns,
                candidates,
                &respondents,
                &preprocessor,
                &embedder,
                &mut rng,
                &mut summary,
            )?;

            if let Some(entry) = QuestionEntry::new(question, &written) {
                manifest.push(entry);
                summary.questions.push(question.base.clone());
            }
        }

        let manifest_path = outdir.join(MANIFEST_FILE);
        write_json_pretty(&manifest_path, &manifest)?;
        summary.files.push(manifest_path);

        info!(
            questions = summary.questions.len(),
            skipped = summary.skipped.len(),
            files = summary.files.len(),
            elapsed = ?start.elapsed(),
            "Run complete"
        );
        Ok(summary)
    }

    #[allow(clippy::too_many_arguments)]
    fn run_question(
        &self,
        question: &QuestionMeta,
        columns: &[&str],
        candidates: &DataFrame,
        respondents: &Respondents,
        preprocessor: &QuestionPreprocessor,
        embedder: &Embedder,
        rng: &mut ChaCha8Rng,
        summary: &mut RunSummary,
    ) -> Result<Vec<(Method, String)>> {
        let raw: Vec<Vec<Option<f64>>> = columns
            .iter()
            .map(|c| numeric_column(candidates, c))
            .collect::<Result<_>>()?;

        let scaled = preprocessor.scale_with_jitter(&question.base, &raw, rng)?;
        debug!(
            base = %question.base,
            fill_values = ?scaled.fill_values,
            "Scaled question columns"
        );

        let records = respondents.records(columns, &raw);
        let noise_sd = preprocessor.config().noise_sd;

        let mut written = Vec::with_capacity(self.methods.len());
        for &method in &self.methods {
            let embedding = embedder.embed(scaled.data.view(), method, rng)?;
            let file_name = method.file_name(&question.base);
            let path = self.config.outdir.join(&file_name);

            write_json(&path, &EmbedFile::new(&question.base, noise_sd, &records, &embedding))?;
            info!(
                base = %question.base,
                rows = scaled.n_samples(),
                cols = scaled.n_features(),
                method = %method,
                file = %file_name,
                "Wrote embedding"
            );

            summary.files.push(path);
            written.push((method, file_name));
        }
        Ok(written)
    }
}
