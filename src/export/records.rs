//! Per-question embedding files (`embed_<method>_<base>.json`)

use crate::preprocessing::SCALED_TO_LABEL;
use crate::visualization::{Embedding, MethodMeta};
use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;

/// Rendered in place of a missing response
pub const MISSING_PLACEHOLDER: &str = "-";

/// Render an original response value for display.
///
/// Whole numbers print without a decimal point, other values keep their
/// fractional part, and missing values become [`MISSING_PLACEHOLDER`].
pub fn render_value(value: Option<f64>) -> String {
    match value {
        None => MISSING_PLACEHOLDER.to_string(),
        Some(v) if (v - v.round()).abs() < 1e-6 => format!("{:.0}", v.round() + 0.0),
        Some(v) => format!("{}", v),
    }
}

/// One respondent's identity and rendered answers, shared across methods
#[derive(Debug, Clone, PartialEq)]
pub struct RespondentRecord {
    /// Row index in the candidates table
    pub id: usize,
    pub name: Option<String>,
    pub party: Option<String>,
    pub group: Option<String>,
    /// (column, rendered value) in question column order
    pub answers: Vec<(String, String)>,
}

/// A respondent record with its coordinates for one method
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedRecord<'a> {
    pub record: &'a RespondentRecord,
    pub xyz: [f64; 3],
}

impl Serialize for PlacedRecord<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let r = self.record;
        let mut map = serializer.serialize_map(Some(7 + r.answers.len()))?;
        map.serialize_entry("id", &r.id)?;
        map.serialize_entry("name", &r.name)?;
        map.serialize_entry("party", &r.party)?;
        map.serialize_entry("group", &r.group)?;
        for (column, value) in &r.answers {
            map.serialize_entry(column, value)?;
        }
        map.serialize_entry("x", &self.xyz[0])?;
        map.serialize_entry("y", &self.xyz[1])?;
        map.serialize_entry("z", &self.xyz[2])?;
        map.end()
    }
}

/// Generation metadata of one embedding file
#[derive(Debug, Clone, Serialize)]
pub struct FileMeta {
    #[serde(flatten)]
    pub method: MethodMeta,
    pub base: String,
    pub noise_sd: f64,
    pub scaled_to: &'static str,
}

/// Full contents of an `embed_<method>_<base>.json` file
#[derive(Debug, Clone, Serialize)]
pub struct EmbedFile<'a> {
    pub meta: FileMeta,
    pub data: Vec<PlacedRecord<'a>>,
}

impl<'a> EmbedFile<'a> {
    /// Pair each record with its row of `embedding.coords`.
    pub fn new(
        base: &str,
        noise_sd: f64,
        records: &'a [RespondentRecord],
        embedding: &Embedding,
    ) -> Self {
        let data = records
            .iter()
            .zip(embedding.coords.rows())
            .map(|(record, row)| PlacedRecord {
                record,
                xyz: [row[0], row[1], row[2]],
            })
            .collect();

        Self {
            meta: FileMeta {
                method: embedding.meta.clone(),
                base: base.to_string(),
                noise_sd,
                scaled_to: SCALED_TO_LABEL,
            },
            data,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_render_value() {
        assert_eq!(render_value(None), "-");
        assert_eq!(render_value(Some(3.0)), "3");
        assert_eq!(render_value(Some(-1.0)), "-1");
        assert_eq!(render_value(Some(2.5)), "2.5");
        assert_eq!(render_value(Some(4.0000001)), "4");
        assert_eq!(render_value(Some(-0.0000001)), "0");
        assert_eq!(render_value(Some(1e20)), "100000000000000000000");
    }

    fn record() -> RespondentRecord {
        RespondentRecord {
            id: 0,
            name: Some("山田太郎".to_string()),
            party: Some("無所属".to_string()),
            group: None,
            answers: vec![
                ("Q7-1".to_string(), "3".to_string()),
                ("Q7-2".to_string(), "-".to_string()),
            ],
        }
    }

    #[test]
    fn test_record_key_order_and_utf8() {
        let r = record();
        let placed = PlacedRecord { record: &r, xyz: [1.0, -2.5, 0.0] };
        let json = serde_json::to_string(&placed).unwrap();
        assert_eq!(
            json,
            r#"{"id":0,"name":"山田太郎","party":"無所属","group":null,"Q7-1":"3","Q7-2":"-","x":1.0,"y":-2.5,"z":0.0}"#
        );
    }

    #[test]
    fn test_embed_file_meta() {
        let records = vec![record()];
        let embedding = Embedding {
            coords: array![[1.0, 2.0, 3.0]],
            meta: MethodMeta::Pca { n_components: 3, random_state: 42 },
        };
        let file = EmbedFile::new("Q7", 0.05, &records, &embedding);
        let value = serde_json::to_value(&file).unwrap();

        assert_eq!(value["meta"]["method"], "PCA_fallback");
        assert_eq!(value["meta"]["base"], "Q7");
        assert_eq!(value["meta"]["noise_sd"], 0.05);
        assert_eq!(value["meta"]["scaled_to"], "[-1,1] per column");
        assert_eq!(value["data"][0]["z"], 3.0);
    }
}
