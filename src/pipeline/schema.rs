//! Static partition of dataset columns into preprocessing groups
//!
//! The schema is a fixed declaration: nothing here is inferred from data.
//! [`FeatureSchema::validate`] checks the declaration against a concrete
//! dataset so that a column nobody accounted for fails loudly instead of being
//! silently ignored.

use std::fmt;

use crate::error::SchemaError;

/// Treatment group of a feature column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FeatureGroup {
    /// Median imputation, then standard scaling
    NumericGeneral,
    /// Constant-zero imputation, then standard scaling
    NumericSpecial,
    /// Most-frequent imputation, then one-hot encoding
    CategoricalGeneral,
    /// Literal "missing" imputation, then one-hot encoding
    CategoricalSpecial,
    /// Excluded from modelling
    Drop,
    /// Most-frequent imputation, no further transform
    Binary,
}

impl FeatureGroup {
    /// All groups in declaration order
    pub const ALL: [FeatureGroup; 6] = [
        FeatureGroup::NumericGeneral,
        FeatureGroup::NumericSpecial,
        FeatureGroup::CategoricalGeneral,
        FeatureGroup::CategoricalSpecial,
        FeatureGroup::Drop,
        FeatureGroup::Binary,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            FeatureGroup::NumericGeneral => "numeric_general",
            FeatureGroup::NumericSpecial => "numeric_special",
            FeatureGroup::CategoricalGeneral => "categorical_general",
            FeatureGroup::CategoricalSpecial => "categorical_special",
            FeatureGroup::Drop => "drop",
            FeatureGroup::Binary => "binary",
        }
    }

    /// Whether columns in this group reach the model
    pub fn is_modelled(&self) -> bool {
        !matches!(self, FeatureGroup::Drop)
    }
}

impl fmt::Display for FeatureGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Immutable assignment of column names to the six feature groups
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureSchema {
    numeric_general: Vec<String>,
    numeric_special: Vec<String>,
    categorical_general: Vec<String>,
    categorical_special: Vec<String>,
    drop: Vec<String>,
    binary: Vec<String>,
}

fn owned(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| s.to_string()).collect()
}

impl FeatureSchema {
    pub fn new(
        numeric_general: &[&str],
        numeric_special: &[&str],
        categorical_general: &[&str],
        categorical_special: &[&str],
        drop: &[&str],
        binary: &[&str],
    ) -> Self {
        Self {
            numeric_general: owned(numeric_general),
            numeric_special: owned(numeric_special),
            categorical_general: owned(categorical_general),
            categorical_special: owned(categorical_special),
            drop: owned(drop),
            binary: owned(binary),
        }
    }

    /// Column layout of the hotel bookings dataset
    pub fn hotel_bookings() -> Self {
        Self::new(
            &[
                "lead_time",
                "stays_in_weekend_nights",
                "stays_in_week_nights",
                "adults",
                "previous_cancellations",
                "previous_bookings_not_canceled",
                "booking_changes",
                "days_in_waiting_list",
                "adr",
                "required_car_parking_spaces",
                "total_of_special_requests",
                "arrival_date_year",
                "arrival_date_week_number",
                "arrival_date_day_of_month",
            ],
            &["children", "babies"],
            &[
                "hotel",
                "arrival_date_month",
                "meal",
                "market_segment",
                "distribution_channel",
                "reserved_room_type",
                "deposit_type",
                "customer_type",
            ],
            &["country"],
            &[
                "company",
                "reservation_status",
                "reservation_status_date",
                "agent",
            ],
            &["is_repeated_guest"],
        )
    }

    /// Columns declared for `group`
    pub fn columns(&self, group: FeatureGroup) -> &[String] {
        match group {
            FeatureGroup::NumericGeneral => &self.numeric_general,
            FeatureGroup::NumericSpecial => &self.numeric_special,
            FeatureGroup::CategoricalGeneral => &self.categorical_general,
            FeatureGroup::CategoricalSpecial => &self.categorical_special,
            FeatureGroup::Drop => &self.drop,
            FeatureGroup::Binary => &self.binary,
        }
    }

    /// Every group with its columns, in declaration order
    pub fn groups(&self) -> impl Iterator<Item = (FeatureGroup, &[String])> + '_ {
        FeatureGroup::ALL
            .into_iter()
            .map(move |group| (group, self.columns(group)))
    }

    /// Group a column is declared in, if any
    pub fn group_of(&self, column: &str) -> Option<FeatureGroup> {
        self.groups()
            .find(|(_, columns)| columns.iter().any(|c| c == column))
            .map(|(group, _)| group)
    }

    /// Non-drop columns, in the order the composed transform emits them
    pub fn modelled_columns(&self) -> Vec<&str> {
        self.groups()
            .filter(|(group, _)| group.is_modelled())
            .flat_map(|(_, columns)| columns.iter().map(|c| c.as_str()))
            .collect()
    }

    /// Check the declaration against the columns of a dataset.
    ///
    /// Every dataset column except `label` must be declared in exactly one
    /// group, and every declared column must exist in the dataset.
    pub fn validate(&self, dataset_columns: &[&str], label: &str) -> Result<(), SchemaError> {
        let mut seen: Vec<(&str, FeatureGroup)> = Vec::new();
        for (group, columns) in self.groups() {
            for column in columns {
                if column == label {
                    return Err(SchemaError::LabelDeclared(label.to_string()));
                }
                if let Some((_, first)) = seen.iter().find(|(c, _)| *c == column.as_str()) {
                    return Err(SchemaError::Duplicate {
                        column: column.clone(),
                        first: first.to_string(),
                        second: group.to_string(),
                    });
                }
                seen.push((column.as_str(), group));
            }
        }

        for (column, group) in &seen {
            if !dataset_columns.contains(column) {
                return Err(SchemaError::MissingColumn {
                    group: group.to_string(),
                    column: column.to_string(),
                });
            }
        }

        for column in dataset_columns {
            if *column != label && !seen.iter().any(|(c, _)| c == column) {
                return Err(SchemaError::Unassigned(column.to_string()));
            }
        }

        Ok(())
    }
}

impl Default for FeatureSchema {
    fn default() -> Self {
        Self::hotel_bookings()
    }
}
