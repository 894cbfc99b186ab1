//! clfbench: cross-validated classifier comparison CLI
//!
//! Loads a labeled dataset, cross-validates the baseline and every registered
//! classifier, and writes one summary row per model to the report file.

use std::process::ExitCode;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use console::style;

use clfbench::cli::Cli;
use clfbench::error::{ConfigError, EvalError, EXIT_UNEXPECTED};
use clfbench::pipeline::{
    column_names, evaluate_all, load_dataset, positive_rate, sparse_class, split_label, CvSettings,
    EvalConfig, FeatureSchema, ModelRegistry,
};
use clfbench::report::{display_report, write_report, Report, ReportMetadata};
use clfbench::utils::{
    abandon, create_progress_bar, create_spinner, finish_with_success, print_banner,
    print_completion, print_config, print_info, print_step_header, print_step_time, print_success,
    print_warning,
};

fn main() -> ExitCode {
    match try_main() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{} {:#}", style("error:").red().bold(), err);
            ExitCode::from(exit_code(&err))
        }
    }
}

fn try_main() -> Result<()> {
    let config = Cli::parse().into_config().map_err(EvalError::from)?;
    run(&config)
}

/// Exit code of the first harness error in the chain
fn exit_code(err: &anyhow::Error) -> u8 {
    err.chain()
        .find_map(|cause| cause.downcast_ref::<EvalError>())
        .map(EvalError::exit_code)
        .unwrap_or(EXIT_UNEXPECTED)
}

fn run(config: &EvalConfig) -> Result<()> {
    let verbose = config.verbose;
    let total_start = Instant::now();

    if verbose {
        print_banner(env!("CARGO_PKG_VERSION"));
        print_config(
            &config.train_data,
            &config.target,
            &config.report,
            config.n_folds,
            config.seed,
        );
    }

    // Step 1: Load dataset
    let step_start = Instant::now();
    if verbose {
        print_step_header(1, "Loading Dataset");
    }
    let spinner = verbose.then(|| create_spinner("Reading training data..."));
    let df = load_dataset(&config.train_data, config.infer_schema_length);
    if let Some(pb) = &spinner {
        match &df {
            Ok(_) => finish_with_success(pb, "Dataset loaded"),
            Err(_) => abandon(pb),
        }
    }
    let df = df?;
    if verbose {
        let (rows, cols) = df.shape();
        print_info(&format!("Rows: {}, Columns: {}", rows, cols));
        print_step_time(step_start.elapsed());
    }

    // Step 2: Validate the feature schema
    let step_start = Instant::now();
    if verbose {
        print_step_header(2, "Validating Feature Schema");
    }
    let schema = FeatureSchema::hotel_bookings();
    schema
        .validate(&column_names(&df), &config.target)
        .map_err(EvalError::from)?;
    let (frame, labels) = split_label(&df, &config.target)?;
    if config.n_folds > labels.len() {
        return Err(EvalError::from(ConfigError::TooManyFolds {
            folds: config.n_folds,
            rows: labels.len(),
        })
        .into());
    }
    if verbose {
        print_success(&format!(
            "{} feature columns accounted for, {} modelled",
            frame.width(),
            schema.modelled_columns().len()
        ));
        print_info(&format!(
            "Positive rate of '{}': {:.2}%",
            config.target,
            positive_rate(&labels) * 100.0
        ));
        if let Some((class, count)) = sparse_class(&labels, config.n_folds) {
            print_warning(&format!(
                "Class {} has {} rows for {} folds; some folds hold none of it",
                class, count, config.n_folds
            ));
        }
        print_step_time(step_start.elapsed());
    }

    // Step 3: Cross-validate every model
    let step_start = Instant::now();
    let registry = ModelRegistry::standard(config.seed).with_n_jobs(config.n_jobs);
    let settings = CvSettings::new(config.n_folds, config.seed).with_n_jobs(config.n_jobs);
    if verbose {
        print_step_header(3, "Cross-Validating Models");
        print_info(&format!(
            "{} models x {} folds: {}",
            registry.len(),
            config.n_folds,
            registry.names().join(", ")
        ));
    }
    let progress = verbose.then(|| {
        create_progress_bar(
            (registry.len() * config.n_folds) as u64,
            "   Evaluating",
        )
    });
    let results = evaluate_all(
        &registry,
        &schema,
        &frame,
        &labels,
        &settings,
        progress.as_ref(),
    );
    if let Some(pb) = &progress {
        match &results {
            Ok(_) => finish_with_success(pb, "All folds scored"),
            Err(_) => abandon(pb),
        }
    }
    let results = results?;
    if verbose {
        print_step_time(step_start.elapsed());
    }

    // Step 4: Assemble and save the report
    if verbose {
        print_step_header(4, "Saving Report");
    }
    let report = Report::from_results(&results);
    let metadata = ReportMetadata::from_config(config);
    write_report(&report, &config.report, &metadata)
        .with_context(|| format!("Failed to save report to {}", config.report.display()))?;

    if verbose {
        display_report(&report);
        print_info(&format!(
            "Total time: {}",
            clfbench::utils::format_duration(total_start.elapsed())
        ));
        print_completion();
    }

    println!("Report generated and saved...");
    Ok(())
}
