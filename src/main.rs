//! Liftfit: accelerometer exercise-quality study CLI
//!
//! Prunes an accelerometer dataset, trains a decision tree, a random forest
//! and an importance-reduced random forest, and prints how they compare.

use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use console::style;
use indicatif::ProgressBar;

use liftfit::cli::Cli;
use liftfit::pipeline::{column_names, load_dataset, run_study_on, DatasetStats, StudyStage};
use liftfit::report::{
    display_excluded_statistics, display_heatmap, display_importance, display_model_comparison,
    export_study_report, PruneSummary, StudyReport, TimingInfo,
};
use liftfit::utils::{
    create_spinner, finish_with_success, finish_with_warning, print_banner, print_completion,
    print_config, print_count, print_info, print_step_header, print_success,
};

/// Rows shown in the importance table.
const IMPORTANCE_ROWS: usize = 20;

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    let total_start = Instant::now();

    if let Some(threads) = cli.threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()
            .context("Failed to configure the worker thread pool")?;
    }

    let config = cli.to_config().context("Invalid configuration")?;
    let report_path = cli.report_path();

    print_banner(env!("CARGO_PKG_VERSION"));
    print_config(cli.input(), report_path.as_deref(), &config);

    // Verify the label column exists before reading the whole file
    let columns = column_names(cli.input())
        .with_context(|| format!("Failed to read header of {}", cli.input().display()))?;
    if !columns.contains(&config.label_column) {
        anyhow::bail!(
            "Label column '{}' not found in dataset. Available columns: {:?}",
            config.label_column,
            columns
        );
    }

    // Step 1: Load dataset
    print_step_header(1, "Load Dataset");
    let step_start = Instant::now();
    let spinner = create_spinner("Reading dataset...");
    let dataset = load_dataset(cli.input(), &config)
        .inspect_err(|_| finish_with_warning(&spinner, "Loading failed"))
        .with_context(|| format!("Failed to load {}", cli.input().display()))?;
    finish_with_success(&spinner, "Dataset loaded");
    let load_elapsed = step_start.elapsed();

    let stats = DatasetStats::of(&dataset);
    println!("\n    {} Dataset Statistics:", style("✧").cyan());
    println!("      Rows: {}", stats.rows);
    println!("      Columns: {}", stats.columns);
    println!("      Classes: {}", dataset.domain().classes().join(", "));
    println!("      Estimated memory: {:.2} MB", stats.memory_mb);

    // Steps 2+: one per study stage
    let study_start = Instant::now();
    let mut step = 1u8;
    let mut current: Option<(ProgressBar, StudyStage)> = None;
    let result = run_study_on(&dataset, &config, |stage| {
        if let Some((pb, previous)) = current.take() {
            finish_with_success(&pb, &format!("{} complete", previous));
        }
        step += 1;
        print_step_header(step, &stage.to_string());
        current = Some((create_spinner(&format!("{}...", stage)), stage));
    });
    if let Some((pb, previous)) = current.take() {
        if result.is_ok() {
            finish_with_success(&pb, &format!("{} complete", previous));
        } else {
            finish_with_warning(&pb, &format!("{} failed", previous));
        }
    }
    let outcome = result.context("Study failed")?;
    let study_elapsed = study_start.elapsed();

    // Results
    PruneSummary::from_outcome(&outcome.prune).display();
    display_excluded_statistics(&outcome.prune);

    println!();
    print_info(&format!(
        "Partition: {} train / {} test rows",
        outcome.partition.train.len(),
        outcome.partition.test.len()
    ));
    print_count(
        "feature(s) above the importance threshold",
        outcome.ranking.above(config.importance_threshold).len(),
        Some(&format!("(>{:.1})", config.importance_threshold)),
    );
    if outcome.reduction_fallback {
        print_info(&format!(
            "'{}' reduction left no features; reduced forest trained on all features",
            config.reduction_mode
        ));
    }

    display_model_comparison(&outcome);
    display_importance(&outcome.ranking, config.importance_threshold, IMPORTANCE_ROWS);
    for run in outcome.runs() {
        display_heatmap(&run.kind.to_string(), &run.evaluation.confusion);
    }

    if let Some(path) = report_path {
        let timing = TimingInfo {
            load_ms: load_elapsed.as_millis() as u64,
            study_ms: study_elapsed.as_millis() as u64,
            total_ms: total_start.elapsed().as_millis() as u64,
        };
        let report = StudyReport::build(cli.input(), &outcome, timing);
        export_study_report(&report, &path)?;
        println!();
        print_success(&format!("Study report saved to {}", path.display()));
    }

    print_completion();

    Ok(())
}
