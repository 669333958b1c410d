//! `question_manifest.json`

use crate::mapping::{OptionLabels, QuestionMeta};
use crate::visualization::Method;
use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;

/// File name of the manifest inside the output directory
pub const MANIFEST_FILE: &str = "question_manifest.json";

/// Display labels of the candidate-preference question (Q25), one per
/// party leader.
pub const Q25_LABELS: [(&str, &str); 10] = [
    ("Q25-1", "高市早苗（自民）"),
    ("Q25-2", "吉村洋文（維新）"),
    ("Q25-3", "野田佳彦（中道改革）"),
    ("Q25-4", "玉木雄一郎（国民）"),
    ("Q25-5", "田村智子（共産）"),
    ("Q25-6", "山本太郎（れいわ）"),
    ("Q25-7", "神谷宗幣（参政）"),
    ("Q25-8", "百田尚樹（保守）"),
    ("Q25-9", "福島瑞穂（社民）"),
    ("Q25-10", "安野貴博（みらい）"),
];

/// Fixed code → label table, serialized as an ordered JSON object
#[derive(Debug, Clone, Copy)]
pub struct LabelTable(pub &'static [(&'static str, &'static str)]);

impl Serialize for LabelTable {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (code, label) in self.0 {
            map.serialize_entry(code, label)?;
        }
        map.end()
    }
}

/// One question in the manifest
#[derive(Debug, Clone, Serialize)]
pub struct QuestionEntry {
    pub base: String,
    pub question_full: Option<String>,
    pub options_text: Option<String>,
    pub options: OptionLabels,
    pub columns: Vec<String>,
    /// Single-file reference kept for older viewers
    pub embed_file: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub embed_file_pca: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub embed_file_umap: Option<String>,
}

impl QuestionEntry {
    /// Build an entry from the files written for a question, in write order.
    ///
    /// `embed_file` is the PCA file when one was written, otherwise the
    /// first file. Returns `None` when no file was written.
    pub fn new(meta: &QuestionMeta, written: &[(Method, String)]) -> Option<Self> {
        let file_for = |method: Method| {
            written
                .iter()
                .find(|(m, _)| *m == method)
                .map(|(_, f)| f.clone())
        };
        let embed_file_pca = file_for(Method::Pca);
        let embed_file_umap = file_for(Method::Umap);
        let embed_file = embed_file_pca
            .clone()
            .or_else(|| written.first().map(|(_, f)| f.clone()))?;

        Some(Self {
            base: meta.base.clone(),
            question_full: meta.question_full.clone(),
            options_text: meta.options_text.clone(),
            options: meta.options.clone(),
            columns: meta.columns.clone(),
            embed_file,
            embed_file_pca,
            embed_file_umap,
        })
    }

    /// Every embedding file this entry references
    pub fn files(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.embed_file.as_str())
            .chain(self.embed_file_pca.as_deref())
            .chain(self.embed_file_umap.as_deref())
    }
}

/// Top-level catalogue of a run
#[derive(Debug, Clone, Serialize)]
pub struct Manifest {
    pub questions: Vec<QuestionEntry>,
    pub q25_labels: LabelTable,
}

impl Default for Manifest {
    fn default() -> Self {
        Self {
            questions: Vec::new(),
            q25_labels: LabelTable(&Q25_LABELS),
        }
    }
}

impl Manifest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, entry: QuestionEntry) {
        self.questions.push(entry);
    }
}
