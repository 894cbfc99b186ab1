//! Final comparison table

use serde::Serialize;

use super::summary::{summarize, SummaryRow};
use crate::pipeline::cross_validation::CvResult;

/// Summary rows in evaluation order. Rows are never reordered or merged.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Report {
    rows: Vec<SummaryRow>,
}

impl Report {
    pub fn new() -> Self {
        Self::default()
    }

    /// Summarize each result under its model name, keeping input order
    pub fn from_results<'a>(results: impl IntoIterator<Item = &'a CvResult>) -> Self {
        let mut report = Self::new();
        for result in results {
            report.push(summarize(result, &result.model));
        }
        report
    }

    pub fn push(&mut self, row: SummaryRow) {
        self.rows.push(row);
    }

    pub fn rows(&self) -> &[SummaryRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Metric columns of the first row; every row shares them
    pub fn column_names(&self) -> Vec<&str> {
        self.rows
            .first()
            .map(|row| row.column_names())
            .unwrap_or_default()
    }
}
