//! Tests for report export

use clfbench::pipeline::{CvResult, EvalConfig};
use clfbench::report::{write_report, Report, ReportMetadata};
use polars::prelude::*;
use tempfile::TempDir;

fn sample_report() -> Report {
    let results = vec![
        CvResult::new(
            "Dummy Classifier",
            vec![
                ("fit_time".to_string(), vec![0.001, 0.003]),
                ("test_f1".to_string(), vec![0.3, 0.5]),
                ("train_f1".to_string(), vec![0.4, 0.4]),
            ],
        ),
        CvResult::new(
            "Decision Tree",
            vec![
                ("fit_time".to_string(), vec![0.02, 0.04]),
                ("test_f1".to_string(), vec![0.7, 0.9]),
                ("train_f1".to_string(), vec![1.0, 1.0]),
            ],
        ),
    ];
    Report::from_results(&results)
}

fn metadata(dir: &TempDir) -> ReportMetadata {
    ReportMetadata::from_config(&EvalConfig::new(dir.path().join("train.csv"), dir.path().join("report")))
}

#[test]
fn test_write_csv_report() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("report.csv");
    write_report(&sample_report(), &path, &metadata(&dir)).unwrap();

    let df = CsvReadOptions::default()
        .with_has_header(true)
        .try_into_reader_with_file_path(Some(path))
        .unwrap()
        .finish()
        .unwrap();

    assert_eq!(df.shape(), (2, 4));
    let names: Vec<String> = df
        .column("classifier_name")
        .unwrap()
        .str()
        .unwrap()
        .into_iter()
        .map(|v| v.unwrap().to_string())
        .collect();
    assert_eq!(names, vec!["Dummy Classifier", "Decision Tree"]);

    let f1: Vec<f64> = df
        .column("validation_f1")
        .unwrap()
        .f64()
        .unwrap()
        .into_iter()
        .map(|v| v.unwrap())
        .collect();
    assert!((f1[0] - 0.4).abs() < 1e-9);
    assert!((f1[1] - 0.8).abs() < 1e-9);
}

#[test]
fn test_write_parquet_report() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("report.parquet");
    write_report(&sample_report(), &path, &metadata(&dir)).unwrap();

    let file = std::fs::File::open(&path).unwrap();
    let df = ParquetReader::new(file).finish().unwrap();
    let names: Vec<&str> = df.get_column_names().into_iter().map(|n| n.as_str()).collect();
    assert_eq!(names, vec!["classifier_name", "fit_time", "validation_f1", "train_f1"]);
}

#[test]
fn test_write_json_report() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("report.json");
    write_report(&sample_report(), &path, &metadata(&dir)).unwrap();

    let json: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(json["metadata"]["n_cv_folds"], 5);
    assert_eq!(json["metadata"]["chosen_seed"], 1);
    assert!(json["metadata"]["timestamp"].as_str().is_some());

    let rows = json["results"].as_array().unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0]["classifier_name"], "Dummy Classifier");
    assert_eq!(rows[1]["train_f1"], 1.0);
}
