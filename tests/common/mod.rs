//! Shared test utilities and fixture generators

#![allow(dead_code)]

use polars::prelude::*;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::path::PathBuf;
use tempfile::TempDir;

use clfbench::pipeline::{Column as FeatureColumn, FeatureFrame, FeatureSchema};

const MONTHS: [&str; 12] = [
    "January", "February", "March", "April", "May", "June", "July", "August", "September",
    "October", "November", "December",
];

fn pick<'a>(rng: &mut ChaCha8Rng, values: &[&'a str]) -> &'a str {
    values[rng.gen_range(0..values.len())]
}

/// Synthetic hotel-bookings table with every schema column plus `is_canceled`.
///
/// Cancellation is driven by `lead_time` and `deposit_type` with some noise,
/// so real classifiers beat the baseline. `children`, `country`, `agent` and
/// `company` carry missing values.
pub fn create_hotel_dataframe(rows: usize, seed: u64) -> DataFrame {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);

    let mut lead_time = Vec::with_capacity(rows);
    let mut deposit_type = Vec::with_capacity(rows);
    let mut is_canceled = Vec::with_capacity(rows);
    for _ in 0..rows {
        let lead: i64 = rng.gen_range(0..365);
        let deposit = pick(&mut rng, &["No Deposit", "No Deposit", "Non Refund", "Refundable"]);
        let risk = lead as f64 / 365.0 + if deposit == "Non Refund" { 0.6 } else { 0.0 };
        let noise: f64 = rng.gen_range(-0.2..0.2);
        lead_time.push(lead);
        deposit_type.push(deposit.to_string());
        is_canceled.push(i64::from(risk + noise > 0.6));
    }

    let ints = |rng: &mut ChaCha8Rng, lo: i64, hi: i64| -> Vec<i64> {
        (0..rows).map(|_| rng.gen_range(lo..hi)).collect()
    };
    let texts = |rng: &mut ChaCha8Rng, values: &[&str]| -> Vec<String> {
        (0..rows).map(|_| pick(rng, values).to_string()).collect()
    };

    let columns = vec![
        Column::new("hotel".into(), texts(&mut rng, &["City Hotel", "Resort Hotel"])),
        Column::new("is_canceled".into(), is_canceled),
        Column::new("lead_time".into(), lead_time),
        Column::new("arrival_date_year".into(), ints(&mut rng, 2015, 2018)),
        Column::new("arrival_date_month".into(), texts(&mut rng, &MONTHS)),
        Column::new("arrival_date_week_number".into(), ints(&mut rng, 1, 54)),
        Column::new("arrival_date_day_of_month".into(), ints(&mut rng, 1, 32)),
        Column::new("stays_in_weekend_nights".into(), ints(&mut rng, 0, 4)),
        Column::new("stays_in_week_nights".into(), ints(&mut rng, 0, 8)),
        Column::new("adults".into(), ints(&mut rng, 1, 4)),
        Column::new(
            "children".into(),
            (0..rows)
                .map(|_| (rng.gen_range(0..10) > 0).then(|| rng.gen_range(0..3) as f64))
                .collect::<Vec<Option<f64>>>(),
        ),
        Column::new("babies".into(), ints(&mut rng, 0, 2)),
        Column::new("meal".into(), texts(&mut rng, &["BB", "HB", "FB", "SC"])),
        Column::new(
            "country".into(),
            (0..rows)
                .map(|_| (rng.gen_range(0..8) > 0).then(|| pick(&mut rng, &["PRT", "GBR", "FRA", "ESP", "DEU"]).to_string()))
                .collect::<Vec<Option<String>>>(),
        ),
        Column::new("market_segment".into(), texts(&mut rng, &["Online TA", "Offline TA/TO", "Direct", "Groups"])),
        Column::new("distribution_channel".into(), texts(&mut rng, &["TA/TO", "Direct", "Corporate"])),
        Column::new("is_repeated_guest".into(), ints(&mut rng, 0, 2)),
        Column::new("previous_cancellations".into(), ints(&mut rng, 0, 3)),
        Column::new("previous_bookings_not_canceled".into(), ints(&mut rng, 0, 5)),
        Column::new("reserved_room_type".into(), texts(&mut rng, &["A", "D", "E"])),
        Column::new("booking_changes".into(), ints(&mut rng, 0, 4)),
        Column::new("deposit_type".into(), deposit_type),
        Column::new(
            "agent".into(),
            (0..rows)
                .map(|_| (rng.gen_range(0..5) > 0).then(|| rng.gen_range(1..300) as f64))
                .collect::<Vec<Option<f64>>>(),
        ),
        Column::new(
            "company".into(),
            (0..rows)
                .map(|_| (rng.gen_range(0..10) == 0).then(|| rng.gen_range(1..500) as f64))
                .collect::<Vec<Option<f64>>>(),
        ),
        Column::new("days_in_waiting_list".into(), ints(&mut rng, 0, 30)),
        Column::new("customer_type".into(), texts(&mut rng, &["Transient", "Contract", "Group"])),
        Column::new(
            "adr".into(),
            (0..rows).map(|_| rng.gen_range(40.0..250.0)).collect::<Vec<f64>>(),
        ),
        Column::new("required_car_parking_spaces".into(), ints(&mut rng, 0, 2)),
        Column::new("total_of_special_requests".into(), ints(&mut rng, 0, 4)),
        Column::new("reservation_status".into(), texts(&mut rng, &["Check-Out", "Canceled"])),
        Column::new("reservation_status_date".into(), texts(&mut rng, &["2016-07-01", "2017-03-15"])),
    ];

    DataFrame::new(columns).unwrap()
}

/// Small two-feature frame with a clean numeric separation
pub fn create_toy_frame(rows: usize) -> (FeatureSchema, FeatureFrame, Vec<u8>) {
    let labels: Vec<u8> = (0..rows).map(|i| u8::from(i % 3 == 0)).collect();
    let frame = FeatureFrame::new(vec![
        (
            "score".to_string(),
            FeatureColumn::Numeric(
                labels
                    .iter()
                    .enumerate()
                    .map(|(i, &l)| Some(f64::from(l) * 10.0 + (i % 5) as f64))
                    .collect(),
            ),
        ),
        (
            "segment".to_string(),
            FeatureColumn::Categorical((0..rows).map(|i| Some(["a", "b", "c"][i % 3].to_string())).collect()),
        ),
    ])
    .unwrap();
    let schema = FeatureSchema::new(&["score"], &[], &["segment"], &[], &[], &[]);
    (schema, frame, labels)
}

/// Overwrite every `every`-th cell of `column` (row 0 included) with a raw
/// text token. The column becomes text.
pub fn replace_cells(df: &mut DataFrame, column: &str, every: usize, token: &str) {
    let cast = df.column(column).unwrap().cast(&DataType::String).unwrap();
    let values: Vec<Option<String>> = cast
        .str()
        .unwrap()
        .into_iter()
        .enumerate()
        .map(|(i, v)| {
            if i % every == 0 {
                Some(token.to_string())
            } else {
                v.map(str::to_string)
            }
        })
        .collect();
    df.with_column(Column::new(column.into(), values)).unwrap();
}

/// Create a temporary directory with a test CSV file
pub fn create_temp_csv(df: &mut DataFrame) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let csv_path = temp_dir.path().join("hotel_bookings.csv");

    let mut file = std::fs::File::create(&csv_path).unwrap();
    CsvWriter::new(&mut file).finish(df).unwrap();

    (temp_dir, csv_path)
}

/// Create a temporary directory with a test Parquet file
pub fn create_temp_parquet(df: &mut DataFrame) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let parquet_path = temp_dir.path().join("hotel_bookings.parquet");

    let file = std::fs::File::create(&parquet_path).unwrap();
    ParquetWriter::new(file).finish(df).unwrap();

    (temp_dir, parquet_path)
}

/// Assert that a DataFrame has expected shape
pub fn assert_shape(df: &DataFrame, expected_rows: usize, expected_cols: usize) {
    let (rows, cols) = df.shape();
    assert_eq!(rows, expected_rows, "Row count mismatch: expected {}, got {}", expected_rows, rows);
    assert_eq!(cols, expected_cols, "Column count mismatch: expected {}, got {}", expected_cols, cols);
}
