//! Question mapping
//!
//! Reads the question-mapping table (`column`, `question_full`, `options_text`)
//! and groups its rows into one [`QuestionMeta`] per base question id.

use crate::error::Result;
use crate::utils::data_loader::{string_column, DataLoader};
use polars::prelude::DataFrame;
use regex::Regex;
use serde::ser::{Serialize, SerializeMap, Serializer};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::debug;

/// Separator between a base id and its sub-column index (`Q7-3`)
pub const SUBCOLUMN_SEPARATOR: char = '-';

/// Sort key for base ids whose tail is not an integer
const UNNUMBERED_QUESTION_KEY: u64 = 999;

/// Decoded option-code → label pairs, in the order they were written.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OptionLabels(Vec<(String, String)>);

impl OptionLabels {
    /// Insert a label, replacing any earlier label for the same code.
    pub fn insert(&mut self, code: String, label: String) {
        match self.0.iter_mut().find(|(c, _)| *c == code) {
            Some(entry) => entry.1 = label,
            None => self.0.push((code, label)),
        }
    }

    pub fn get(&self, code: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(c, _)| c == code)
            .map(|(_, label)| label.as_str())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(c, l)| (c.as_str(), l.as_str()))
    }
}

impl Serialize for OptionLabels {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (code, label) in &self.0 {
            map.serialize_entry(code, label)?;
        }
        map.end()
    }
}

/// Parse an option-definition string such as `1: 賛成 | 2: 反対`.
///
/// Parts without a `:` are skipped; a missing string yields an empty map.
pub fn parse_options(options_text: Option<&str>) -> OptionLabels {
    let mut labels = OptionLabels::default();
    let Some(text) = options_text else {
        return labels;
    };

    for part in text.split('|') {
        if let Some((code, label)) = part.trim().split_once(':') {
            labels.insert(code.trim().to_string(), label.trim().to_string());
        }
    }
    labels
}

/// Base question id of a response column (`Q7-3` → `Q7`).
pub fn base_of(column: &str) -> &str {
    column.split(SUBCOLUMN_SEPARATOR).next().unwrap_or(column)
}

/// Ordering key of a base id: the integer after its first character.
pub fn question_order_key(base: &str) -> u64 {
    let tail: String = base.chars().skip(1).collect();
    if !tail.is_empty() && tail.chars().all(|c| c.is_ascii_digit()) {
        tail.parse().unwrap_or(UNNUMBERED_QUESTION_KEY)
    } else {
        UNNUMBERED_QUESTION_KEY
    }
}

/// One survey question and its response columns
#[derive(Debug, Clone)]
pub struct QuestionMeta {
    /// Base identifier, e.g. `Q7`
    pub base: String,
    /// Sub-columns ordered by numeric suffix
    pub columns: Vec<String>,
    /// Full question text
    pub question_full: Option<String>,
    /// Raw option definition string
    pub options_text: Option<String>,
    /// Decoded option labels
    pub options: OptionLabels,
}

/// Every question described by the mapping table, in question order
#[derive(Debug, Clone, Default)]
pub struct QuestionMapping {
    questions: Vec<QuestionMeta>,
}

impl QuestionMapping {
    /// Load and group a mapping CSV.
    pub fn load(path: &Path) -> Result<Self> {
        let df = DataLoader::new().load_csv(path)?;
        Self::from_dataframe(&df)
    }

    /// Group mapping rows by base id.
    pub fn from_dataframe(df: &DataFrame) -> Result<Self> {
        let columns = string_column(df, "column")?;
        let question_full = string_column(df, "question_full")?;
        let options_text = string_column(df, "options_text")?;

        let mut groups: BTreeMap<String, Vec<usize>> = BTreeMap::new();
        for (row, column) in columns.iter().enumerate() {
            if let Some(column) = column {
                groups.entry(base_of(column).to_string()).or_default().push(row);
            }
        }

        let mut questions: Vec<QuestionMeta> = groups
            .into_iter()
            .map(|(base, rows)| {
                let mut cols: Vec<String> = rows
                    .iter()
                    .filter_map(|&r| columns[r].clone())
                    .collect();
                sort_subcolumns(&base, &mut cols);

                let first = rows[0];
                let options_text = options_text[first].clone();
                QuestionMeta {
                    options: parse_options(options_text.as_deref()),
                    question_full: question_full[first].clone(),
                    options_text,
                    columns: cols,
                    base,
                }
            })
            .collect();

        questions.sort_by_key(|q| question_order_key(&q.base));

        debug!(questions = questions.len(), "Grouped question mapping");
        Ok(Self { questions })
    }

    pub fn questions(&self) -> &[QuestionMeta] {
        &self.questions
    }

    pub fn get(&self, base: &str) -> Option<&QuestionMeta> {
        self.questions.iter().find(|q| q.base == base)
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }
}

/// Stable sort of a question's columns by their `<base>-<n>` suffix.
/// Columns without a numeric suffix get key 0.
pub fn sort_subcolumns(base: &str, columns: &mut [String]) {
    let pattern = format!(r"^{}-(\d+)$", regex::escape(base));
    let Ok(re) = Regex::new(&pattern) else {
        return;
    };

    columns.sort_by_key(|c| {
        re.captures(c)
            .and_then(|caps| caps[1].parse::<u64>().ok())
            .unwrap_or(0)
    });
}
