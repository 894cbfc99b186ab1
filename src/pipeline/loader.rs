//! Dataset loader for CSV and Parquet files

use anyhow::{Context, Result};
use polars::prelude::*;
use std::path::Path;

use super::frame::{Column as FeatureColumn, FeatureFrame};
use super::target::extract_labels;

/// CSV cells read as missing, matching the usual pandas defaults
pub const MISSING_TOKENS: &[&str] = &[
    "", "NA", "N/A", "n/a", "NULL", "null", "NaN", "nan", "-NaN", "-nan", "<NA>", "#N/A", "#NA",
    "None",
];

/// Load a dataset from a file (CSV or Parquet based on extension).
///
/// `infer_schema_length` bounds the rows scanned for CSV type inference;
/// 0 scans the whole file.
pub fn load_dataset(path: &Path, infer_schema_length: usize) -> Result<DataFrame> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();

    let lf = match extension.as_str() {
        "csv" => LazyCsvReader::new(path)
            .with_has_header(true)
            .with_infer_schema_length(if infer_schema_length == 0 {
                None
            } else {
                Some(infer_schema_length)
            })
            .with_null_values(Some(NullValues::AllColumns(
                MISSING_TOKENS.iter().map(|t| PlSmallStr::from(*t)).collect(),
            )))
            .finish()
            .with_context(|| format!("Failed to load CSV file: {}", path.display()))?,
        "parquet" => LazyFrame::scan_parquet(path, Default::default())
            .with_context(|| format!("Failed to load Parquet file: {}", path.display()))?,
        _ => anyhow::bail!(
            "Unsupported file format: {}. Supported formats: csv, parquet",
            extension
        ),
    };

    lf.collect()
        .with_context(|| format!("Failed to read dataset: {}", path.display()))
}

/// Convert one polars column into a feature column.
///
/// Numbers and booleans become numeric; everything else is read as text.
/// `NaN` cells become missing.
fn convert_column(col: &Column) -> PolarsResult<FeatureColumn> {
    let dtype = col.dtype();
    if dtype.is_primitive_numeric() || matches!(dtype, DataType::Boolean) {
        let cast = col.cast(&DataType::Float64)?;
        Ok(FeatureColumn::Numeric(
            cast.f64()?
                .into_iter()
                .map(|v| v.filter(|x| !x.is_nan()))
                .collect(),
        ))
    } else {
        let cast = col.cast(&DataType::String)?;
        Ok(FeatureColumn::Categorical(
            cast.str()?
                .into_iter()
                .map(|v| v.map(|s| s.to_string()))
                .collect(),
        ))
    }
}

/// Every column of `df` except `exclude`, in dataset order
pub fn dataframe_to_frame(df: &DataFrame, exclude: &str) -> Result<FeatureFrame> {
    let columns = df
        .get_columns()
        .iter()
        .filter(|col| col.name().as_str() != exclude)
        .map(|col| {
            convert_column(col)
                .map(|converted| (col.name().to_string(), converted))
                .with_context(|| format!("Failed to convert column '{}'", col.name()))
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(FeatureFrame::new(columns)?)
}

/// Split a dataset into its feature frame and 0/1 label vector
pub fn split_label(df: &DataFrame, target: &str) -> Result<(FeatureFrame, Vec<u8>)> {
    let labels = extract_labels(df, target)?;
    let frame = dataframe_to_frame(df, target)?;
    Ok((frame, labels))
}

/// Column names of the dataset, label included
pub fn column_names(df: &DataFrame) -> Vec<&str> {
    df.get_column_names().into_iter().map(|n| n.as_str()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_label_types() {
        let df = df! {
            "is_canceled" => [0i64, 1, 0],
            "lead_time" => [Some(10i64), None, Some(3)],
            "hotel" => [Some("City Hotel"), Some("Resort Hotel"), None],
            "is_repeated_guest" => [true, false, false],
        }
        .unwrap();

        let (frame, labels) = split_label(&df, "is_canceled").unwrap();
        assert_eq!(labels, vec![0, 1, 0]);
        assert_eq!(frame.column_names(), vec!["lead_time", "hotel", "is_repeated_guest"]);
        assert_eq!(
            frame.column("lead_time"),
            Some(&FeatureColumn::Numeric(vec![Some(10.0), None, Some(3.0)]))
        );
        assert_eq!(
            frame.column("hotel"),
            Some(&FeatureColumn::Categorical(vec![
                Some("City Hotel".to_string()),
                Some("Resort Hotel".to_string()),
                None
            ]))
        );
        assert_eq!(
            frame.column("is_repeated_guest"),
            Some(&FeatureColumn::Numeric(vec![Some(1.0), Some(0.0), Some(0.0)]))
        );
    }

    #[test]
    fn test_unsupported_extension() {
        let err = load_dataset(Path::new("bookings.xlsx"), 100).unwrap_err();
        assert!(err.to_string().contains("Unsupported file format"));
    }
}
