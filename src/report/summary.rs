//! Per-model score aggregation

use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::pipeline::cross_validation::{CvResult, TEST_PREFIX};

/// Column holding the model name in every report row
pub const NAME_COLUMN: &str = "classifier_name";
/// Prefix held-out metrics are reported under
pub const VALIDATION_PREFIX: &str = "validation_";

/// Fold means for one model
#[derive(Debug, Clone, PartialEq)]
pub struct SummaryRow {
    pub classifier_name: String,
    pub columns: Vec<(String, f64)>,
}

impl SummaryRow {
    pub fn get(&self, key: &str) -> Option<f64> {
        self.columns
            .iter()
            .find(|(name, _)| name == key)
            .map(|(_, value)| *value)
    }

    /// Column names after `classifier_name`, in row order
    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|(name, _)| name.as_str()).collect()
    }
}

impl Serialize for SummaryRow {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.columns.len() + 1))?;
        map.serialize_entry(NAME_COLUMN, &self.classifier_name)?;
        for (name, value) in &self.columns {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

/// `test_x` becomes `validation_x`; anything else is kept
pub fn report_column_name(name: &str) -> String {
    match name.strip_prefix(TEST_PREFIX) {
        Some(metric) => format!("{}{}", VALIDATION_PREFIX, metric),
        None => name.to_string(),
    }
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Reduce a model's per-fold arrays to one row of means
pub fn summarize(result: &CvResult, classifier_name: &str) -> SummaryRow {
    SummaryRow {
        classifier_name: classifier_name.to_string(),
        columns: result
            .columns
            .iter()
            .map(|(name, values)| (report_column_name(name), mean(values)))
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rename_only_touches_test_prefix() {
        assert_eq!(report_column_name("test_f1"), "validation_f1");
        assert_eq!(report_column_name("train_f1"), "train_f1");
        assert_eq!(report_column_name("fit_time"), "fit_time");
        assert_eq!(report_column_name("my_test_f1"), "my_test_f1");
    }

    #[test]
    fn test_summarize_keeps_column_order() {
        let result = CvResult::new(
            "m",
            vec![
                ("fit_time".to_string(), vec![1.0, 3.0]),
                ("test_f1".to_string(), vec![0.2, 0.4]),
                ("train_f1".to_string(), vec![0.5, 0.7]),
            ],
        );
        let row = summarize(&result, "model");
        assert_eq!(row.column_names(), vec!["fit_time", "validation_f1", "train_f1"]);
        assert_eq!(row.get("fit_time"), Some(2.0));
        assert!((row.get("validation_f1").unwrap() - 0.3).abs() < 1e-12);
        assert!((row.get("train_f1").unwrap() - 0.6).abs() < 1e-12);
        assert_eq!(result.columns[1].0, "test_f1", "input left untouched");
    }

    #[test]
    fn test_serialize_name_first() {
        let row = SummaryRow {
            classifier_name: "toy".to_string(),
            columns: vec![("train_f1".to_string(), 0.5)],
        };
        let json = serde_json::to_string(&row).unwrap();
        assert_eq!(json, r#"{"classifier_name":"toy","train_f1":0.5}"#);
    }
}
