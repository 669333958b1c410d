//! Integration test: Full pipeline (CSV files → embeddings → manifest)

use std::fs;
use std::path::Path;

use serde_json::Value;
use survey_embed::prelude::*;

const CANDIDATES: &str = "\
氏名,政党,グループ,Q1-1,Q2-2,Q2-1,Q25-1,Q25-2,Q25-3
山田太郎,自民,A,1,3,2,5,1,
佐藤花子,立憲,B,2,4,,4,2,3
鈴木一郎,維新,A,3,5,1,3,3,2
高橋次郎,国民,B,4,1,5,2,4,1
田中三郎,共産,A,5,2,4,1,5,5
伊藤四郎,れいわ,B,1,3,3,5,1,4
渡辺五郎,参政,A,2,4,2,4,2,3
中村六郎,保守,B,3,5,1,3,3,2
小林七郎,社民,A,4,1,5,2,4,1
加藤八郎,みらい,B,5,2,4,1,5,x
";

const MAPPING: &str = "\
column,question_full,options_text
Q25-1,候補者への好感度,0: 嫌い | 5: 好き
Q25-2,候補者への好感度,0: 嫌い | 5: 好き
Q25-3,候補者への好感度,0: 嫌い | 5: 好き
Q2-1,政策の賛否,1: 賛成 | 5: 反対
Q2-2,政策の賛否,1: 賛成 | 5: 反対
Q1-1,支持度,
Q9-1,欠番,
";

fn write_inputs(dir: &Path) -> PipelineConfig {
    let candidates = dir.join("candidates.csv");
    let mapping = dir.join("mapping.csv");
    fs::write(&candidates, CANDIDATES).unwrap();
    fs::write(&mapping, MAPPING).unwrap();
    PipelineConfig::default()
        .with_inputs(candidates, mapping)
        .with_outdir(dir.join("out"))
}

fn read_json(path: &Path) -> Value {
    serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap()
}

#[test]
fn test_full_pca_pipeline() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_inputs(dir.path()).with_methods("pca");

    let pipeline = EmbeddingPipeline::new(config).unwrap();
    let summary = pipeline.run().unwrap();

    assert_eq!(summary.questions, vec!["Q1", "Q2", "Q25"]);
    assert_eq!(summary.skipped, vec!["Q9"]);
    assert_eq!(summary.summary_line(), format!(
        "written: {} (methods=[\"pca\"])",
        dir.path().join("out").display()
    ));

    let outdir = dir.path().join("out");
    let manifest = read_json(&outdir.join(MANIFEST_FILE));
    let questions = manifest["questions"].as_array().unwrap();
    assert_eq!(questions.len(), 3);

    // Every referenced file exists and holds one record per respondent
    for question in questions {
        let file = question["embed_file"].as_str().unwrap();
        let embed = read_json(&outdir.join(file));
        assert_eq!(embed["data"].as_array().unwrap().len(), 10);
        assert_eq!(embed["meta"]["method"], "PCA_fallback");
        assert_eq!(embed["meta"]["base"], question["base"]);
        assert_eq!(question["embed_file_pca"], question["embed_file"]);
        assert!(question.get("embed_file_umap").is_none());
    }

    assert_eq!(manifest["q25_labels"]["Q25-1"], "高市早苗（自民）");
    assert_eq!(manifest["q25_labels"].as_object().unwrap().len(), 10);
}

#[test]
fn test_manifest_question_fields() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_inputs(dir.path()).with_methods("pca");
    EmbeddingPipeline::new(config).unwrap().run().unwrap();

    let manifest = read_json(&dir.path().join("out").join(MANIFEST_FILE));
    let q2 = &manifest["questions"][1];
    assert_eq!(q2["base"], "Q2");
    assert_eq!(q2["question_full"], "政策の賛否");
    assert_eq!(q2["columns"], serde_json::json!(["Q2-1", "Q2-2"]));
    assert_eq!(q2["options"]["1"], "賛成");
    assert_eq!(q2["options"]["5"], "反対");

    let q1 = &manifest["questions"][0];
    assert_eq!(q1["options_text"], Value::Null);
    assert!(q1["options"].as_object().unwrap().is_empty());
}

#[test]
fn test_records_keep_identity_and_missing_marker() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_inputs(dir.path()).with_methods("pca");
    EmbeddingPipeline::new(config).unwrap().run().unwrap();

    let embed = read_json(&dir.path().join("out/embed_pca_Q25.json"));
    let data = embed["data"].as_array().unwrap();

    assert_eq!(data[0]["id"], 0);
    assert_eq!(data[0]["name"], "山田太郎");
    assert_eq!(data[0]["party"], "自民");
    assert_eq!(data[0]["Q25-1"], "5");
    assert_eq!(data[0]["Q25-3"], "-");
    assert_eq!(data[9]["Q25-3"], "-");

    let keys: Vec<&str> = data[0].as_object().unwrap().keys().map(String::as_str).collect();
    assert_eq!(
        keys,
        vec!["id", "name", "party", "group", "Q25-1", "Q25-2", "Q25-3", "x", "y", "z"]
    );
}

#[test]
fn test_two_column_question_has_spread_z() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_inputs(dir.path()).with_methods("pca");
    EmbeddingPipeline::new(config).unwrap().run().unwrap();

    let embed = read_json(&dir.path().join("out/embed_pca_Q2.json"));
    let z: Vec<f64> = embed["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["z"].as_f64().unwrap())
        .collect();

    assert_eq!(z.len(), 10);
    assert!(z.iter().any(|&v| (v - z[0]).abs() > 1e-6));
}

#[test]
fn test_axes_rescaled_to_target_std() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_inputs(dir.path()).with_methods("pca");
    EmbeddingPipeline::new(config).unwrap().run().unwrap();

    let embed = read_json(&dir.path().join("out/embed_pca_Q25.json"));
    let data = embed["data"].as_array().unwrap();
    for axis in ["x", "y", "z"] {
        let values: Vec<f64> = data.iter().map(|r| r[axis].as_f64().unwrap()).collect();
        let n = values.len() as f64;
        let mean = values.iter().sum::<f64>() / n;
        let std = (values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n).sqrt();
        assert!((std - 30.0).abs() < 1e-3, "{axis} std = {std}");
    }
}

#[test]
fn test_infinite_cells_are_imputed() {
    let dir = tempfile::tempdir().unwrap();
    let candidates = dir.path().join("candidates.csv");
    let mapping = dir.path().join("mapping.csv");
    fs::write(
        &candidates,
        "氏名,政党,グループ,Q2-1,Q2-2\n\
         A,P,g,inf,1\n\
         B,P,g,1,2\n\
         C,P,g,2,-infinity\n\
         D,P,g,3,4\n\
         E,P,g,4,5\n\
         F,P,g,5,1\n",
    )
    .unwrap();
    fs::write(&mapping, "column,question_full,options_text\nQ2-1,二,\nQ2-2,二,\n").unwrap();

    let config = PipelineConfig::default()
        .with_inputs(candidates, mapping)
        .with_outdir(dir.path().join("out"))
        .with_methods("pca");
    EmbeddingPipeline::new(config).unwrap().run().unwrap();

    let embed = read_json(&dir.path().join("out/embed_pca_Q2.json"));
    let data = embed["data"].as_array().unwrap();
    assert_eq!(data.len(), 6);
    assert_eq!(data[0]["Q2-1"], "-");
    assert_eq!(data[2]["Q2-2"], "-");
    for record in data {
        for axis in ["x", "y", "z"] {
            let v = record[axis].as_f64();
            assert!(v.is_some_and(f64::is_finite), "{axis} = {}", record[axis]);
        }
    }
}

#[test]
fn test_auto_writes_one_method() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_inputs(dir.path());
    let summary = EmbeddingPipeline::new(config).unwrap().run().unwrap();

    assert_eq!(summary.methods.len(), 1);
    let expected = if cfg!(feature = "umap") { Method::Umap } else { Method::Pca };
    assert_eq!(summary.methods[0], expected);

    let outdir = dir.path().join("out");
    let other = match expected {
        Method::Umap => Method::Pca,
        Method::Pca => Method::Umap,
    };
    assert!(outdir.join(expected.file_name("Q2")).exists());
    assert!(!outdir.join(other.file_name("Q2")).exists());
}

#[cfg(feature = "umap")]
#[test]
fn test_both_methods() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_inputs(dir.path()).with_methods("umap,pca");
    EmbeddingPipeline::new(config).unwrap().run().unwrap();

    let outdir = dir.path().join("out");
    let manifest = read_json(&outdir.join(MANIFEST_FILE));
    for question in manifest["questions"].as_array().unwrap() {
        let base = question["base"].as_str().unwrap();
        assert_eq!(question["embed_file"], format!("embed_pca_{base}.json"));
        assert_eq!(question["embed_file_umap"], format!("embed_umap_{base}.json"));

        let umap = read_json(&outdir.join(format!("embed_umap_{base}.json")));
        assert_eq!(umap["meta"]["method"], "UMAP");
        assert_eq!(umap["meta"]["n_neighbors"], 30);
        assert_eq!(umap["meta"]["metric"], "euclidean");
    }
}

#[cfg(not(feature = "umap"))]
#[test]
fn test_explicit_umap_without_feature() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_inputs(dir.path()).with_methods("umap");
    let result = EmbeddingPipeline::new(config);
    assert!(matches!(result, Err(EmbedError::UmapUnavailable)));
    assert!(!dir.path().join("out").exists());
}

#[test]
fn test_unknown_method_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_inputs(dir.path()).with_methods("pca,tsne");
    let result = EmbeddingPipeline::new(config);

    match result {
        Err(EmbedError::ConfigError(msg)) => assert_eq!(msg, "Unknown method: tsne"),
        other => panic!("expected config error, got {:?}", other.map(|p| p.methods().to_vec())),
    }
    assert!(!dir.path().join("out").exists());
}

#[test]
fn test_missing_candidates_file() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_inputs(dir.path())
        .with_inputs(dir.path().join("nope.csv"), dir.path().join("mapping.csv"))
        .with_methods("pca");
    let result = EmbeddingPipeline::new(config).unwrap().run();
    assert!(result.is_err());
}
