//! Tests for score aggregation and report assembly

use clfbench::pipeline::CvResult;
use clfbench::report::{summarize, Report};

fn toy_result() -> CvResult {
    CvResult::new(
        "toy",
        vec![
            ("fit_time".to_string(), vec![0.1, 0.2, 0.3, 0.2, 0.2]),
            ("score_time".to_string(), vec![0.01; 5]),
            ("test_f1".to_string(), vec![0.0; 5]),
            ("train_f1".to_string(), vec![0.0; 5]),
            ("test_accuracy".to_string(), vec![0.5; 5]),
            ("train_accuracy".to_string(), vec![0.5; 5]),
        ],
    )
}

#[test]
fn test_toy_example() {
    let row = summarize(&toy_result(), "toy_test");

    assert_eq!(row.classifier_name, "toy_test");
    assert_eq!(row.get("validation_accuracy"), Some(0.5));
    assert_eq!(row.get("train_accuracy"), Some(0.5));
    assert_eq!(row.get("validation_f1"), Some(0.0));
    assert_eq!(row.get("train_f1"), Some(0.0));
    assert!((row.get("fit_time").unwrap() - 0.2).abs() < 1e-12);
}

#[test]
fn test_held_out_columns_renamed() {
    let row = summarize(&toy_result(), "toy_test");
    assert_eq!(
        row.column_names(),
        vec![
            "fit_time",
            "score_time",
            "validation_f1",
            "train_f1",
            "validation_accuracy",
            "train_accuracy",
        ]
    );
    assert!(row.get("test_f1").is_none());
}

#[test]
fn test_values_are_fold_means() {
    let result = CvResult::new(
        "m",
        vec![
            ("test_precision".to_string(), vec![0.2, 0.4, 0.9]),
            ("train_precision".to_string(), vec![1.0, 0.5, 0.0]),
        ],
    );
    let row = summarize(&result, "m");
    assert!((row.get("validation_precision").unwrap() - 0.5).abs() < 1e-12);
    assert!((row.get("train_precision").unwrap() - 0.5).abs() < 1e-12);
}

#[test]
fn test_report_appends_in_order() {
    let mut report = Report::new();
    for name in ["Dummy Classifier", "A", "B"] {
        report.push(summarize(&toy_result(), name));
    }

    let names: Vec<&str> = report.rows().iter().map(|r| r.classifier_name.as_str()).collect();
    assert_eq!(names, vec!["Dummy Classifier", "A", "B"]);
}
