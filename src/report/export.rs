//! Writing the comparison report to disk
//!
//! The format follows the file extension: `csv` and `parquet` hold the bare
//! table, `json` wraps the rows with run metadata.

use std::path::Path;

use anyhow::{Context, Result};
use chrono::Utc;
use polars::prelude::*;
use serde::Serialize;

use super::assembler::Report;
use super::summary::{SummaryRow, NAME_COLUMN};
use crate::pipeline::config::EvalConfig;

/// Run metadata stored alongside the rows of a JSON report
#[derive(Debug, Clone, Serialize)]
pub struct ReportMetadata {
    pub timestamp: String,
    pub clfbench_version: String,
    pub train_data: String,
    pub target: String,
    pub n_cv_folds: usize,
    pub chosen_seed: u64,
}

impl ReportMetadata {
    pub fn from_config(config: &EvalConfig) -> Self {
        Self {
            timestamp: Utc::now().to_rfc3339(),
            clfbench_version: env!("CARGO_PKG_VERSION").to_string(),
            train_data: config.train_data.display().to_string(),
            target: config.target.clone(),
            n_cv_folds: config.n_folds,
            chosen_seed: config.seed,
        }
    }
}

#[derive(Serialize)]
struct JsonReport<'a> {
    metadata: &'a ReportMetadata,
    results: &'a [SummaryRow],
}

/// Build the report table: `classifier_name` followed by every metric column
pub fn report_to_dataframe(report: &Report) -> Result<DataFrame> {
    let names: Vec<&str> = report
        .rows()
        .iter()
        .map(|row| row.classifier_name.as_str())
        .collect();

    let mut columns: Vec<Column> = vec![Column::new(NAME_COLUMN.into(), names)];
    for key in report.column_names() {
        let values: Vec<Option<f64>> = report.rows().iter().map(|row| row.get(key)).collect();
        columns.push(Column::new(key.into(), values));
    }

    DataFrame::new(columns).context("Failed to build report table")
}

/// Write `report` to `path`, choosing the format from the extension
pub fn write_report(report: &Report, path: &Path, metadata: &ReportMetadata) -> Result<()> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();

    match extension.as_str() {
        "csv" => {
            let mut df = report_to_dataframe(report)?;
            let mut file = std::fs::File::create(path)
                .with_context(|| format!("Failed to create report file: {}", path.display()))?;
            CsvWriter::new(&mut file)
                .finish(&mut df)
                .with_context(|| format!("Failed to write CSV report: {}", path.display()))?;
        }
        "parquet" => {
            let mut df = report_to_dataframe(report)?;
            let file = std::fs::File::create(path)
                .with_context(|| format!("Failed to create report file: {}", path.display()))?;
            ParquetWriter::new(file)
                .finish(&mut df)
                .with_context(|| format!("Failed to write Parquet report: {}", path.display()))?;
        }
        "json" => {
            let document = JsonReport {
                metadata,
                results: report.rows(),
            };
            let json = serde_json::to_string_pretty(&document)
                .context("Failed to serialize report to JSON")?;
            std::fs::write(path, json)
                .with_context(|| format!("Failed to write JSON report: {}", path.display()))?;
        }
        _ => anyhow::bail!(
            "Unsupported report format: {}. Supported formats: csv, parquet, json",
            extension
        ),
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::summary::SummaryRow;

    fn sample_report() -> Report {
        let mut report = Report::new();
        for (name, acc) in [("Dummy Classifier", 0.5), ("Decision Tree", 0.8)] {
            report.push(SummaryRow {
                classifier_name: name.to_string(),
                columns: vec![
                    ("fit_time".to_string(), 0.01),
                    ("validation_accuracy".to_string(), acc),
                    ("train_accuracy".to_string(), acc + 0.1),
                ],
            });
        }
        report
    }

    #[test]
    fn test_report_to_dataframe_layout() {
        let df = report_to_dataframe(&sample_report()).unwrap();
        assert_eq!(df.shape(), (2, 4));
        let names: Vec<&str> = df.get_column_names().into_iter().map(|n| n.as_str()).collect();
        assert_eq!(
            names,
            vec!["classifier_name", "fit_time", "validation_accuracy", "train_accuracy"]
        );
    }

    #[test]
    fn test_unsupported_extension() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("report.xlsx");
        let config = EvalConfig::new("train.csv", &path);
        let err = write_report(&sample_report(), &path, &ReportMetadata::from_config(&config)).unwrap_err();
        assert!(err.to_string().contains("Unsupported report format"));
    }
}
