//! JSON output
//!
//! - [`records`]: one `embed_<method>_<base>.json` per question and method
//! - [`manifest`]: the `question_manifest.json` catalogue
//!
//! All files are UTF-8 with non-ASCII text written as-is.

pub mod manifest;
pub mod records;

pub use manifest::{LabelTable, Manifest, QuestionEntry, MANIFEST_FILE, Q25_LABELS};
pub use records::{
    render_value, EmbedFile, FileMeta, PlacedRecord, RespondentRecord, MISSING_PLACEHOLDER,
};

use crate::error::Result;
use serde::Serialize;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Write `value` as compact JSON.
pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer(&mut writer, value)?;
    writer.flush()?;
    Ok(())
}

/// Write `value` as JSON indented by two spaces.
pub fn write_json_pretty<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(&mut writer, value)?;
    writer.flush()?;
    Ok(())
}
