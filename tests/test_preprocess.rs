//! Tests for the composed preprocessing transform

#[path = "common/mod.rs"]
mod common;

use clfbench::pipeline::{compose, split_label, Column, Estimator, FeatureFrame, FeatureSchema};
use common::create_hotel_dataframe;

fn frame(hotel: &[&str], country: &[Option<&str>], adr: &[Option<f64>]) -> FeatureFrame {
    FeatureFrame::new(vec![
        (
            "hotel".to_string(),
            Column::Categorical(hotel.iter().map(|s| Some(s.to_string())).collect()),
        ),
        (
            "country".to_string(),
            Column::Categorical(country.iter().map(|s| s.map(str::to_string)).collect()),
        ),
        ("adr".to_string(), Column::Numeric(adr.to_vec())),
    ])
    .unwrap()
}

fn schema() -> FeatureSchema {
    FeatureSchema::new(&["adr"], &[], &["hotel"], &["country"], &[], &[])
}

#[test]
fn test_unseen_category_encodes_to_zero_block() {
    let train = frame(
        &["City Hotel", "Resort Hotel", "City Hotel"],
        &[Some("PRT"), None, Some("GBR")],
        &[Some(100.0), Some(80.0), None],
    );
    let mut transformer = compose(&schema());
    transformer.fit(&train, &[0, 1, 0]).unwrap();
    assert_eq!(
        transformer.output_names(),
        vec![
            "adr",
            "hotel_City Hotel",
            "hotel_Resort Hotel",
            "country_GBR",
            "country_PRT",
            "country_missing",
        ]
    );

    let test = frame(&["Boutique"], &[Some("ZZZ")], &[Some(90.0)]);
    let x = transformer.apply(&test).unwrap();
    assert_eq!(x.nrows(), 1);
    assert_eq!(x.ncols(), 6);
    for j in 1..6 {
        assert_eq!(x[(0, j)], 0.0, "column {} should be zero", j);
    }
}

#[test]
fn test_missing_country_maps_to_missing_category() {
    let train = frame(
        &["City Hotel", "City Hotel"],
        &[Some("PRT"), Some("PRT")],
        &[Some(1.0), Some(2.0)],
    );
    let mut transformer = compose(&schema());
    transformer.fit(&train, &[0, 1]).unwrap();

    // "missing" never occurred in training, so a missing country is unseen
    let test = frame(&["City Hotel"], &[None], &[Some(1.5)]);
    let x = transformer.apply(&test).unwrap();
    let names = transformer.output_names();
    let prt = names.iter().position(|n| n == "country_PRT").unwrap();
    assert_eq!(x[(0, prt)], 0.0);
}

#[test]
fn test_scaling_learns_from_training_rows_only() {
    let train = frame(&["a", "a"], &[Some("x"), Some("x")], &[Some(0.0), Some(2.0)]);
    let mut transformer = compose(&schema());
    transformer.fit(&train, &[0, 1]).unwrap();

    // mean 1, population std 1
    let test = frame(&["a"], &[Some("x")], &[Some(100.0)]);
    let x = transformer.apply(&test).unwrap();
    assert!((x[(0, 0)] - 99.0).abs() < 1e-12);
}

#[test]
fn test_hotel_frame_transforms_without_missing_values() {
    let df = create_hotel_dataframe(60, 9);
    let (frame, labels) = split_label(&df, "is_canceled").unwrap();

    let mut transformer = compose(&FeatureSchema::hotel_bookings());
    let x = transformer.fit_apply(&frame, &labels).unwrap();

    assert_eq!(x.nrows(), 60);
    assert_eq!(Some(x.ncols()), transformer.n_outputs());
    for i in 0..x.nrows() {
        for j in 0..x.ncols() {
            assert!(x[(i, j)].is_finite());
        }
    }
}
