//! Top-level application orchestration.
//!
//! `src/main.rs` is tiny; this module is the "real main" that:
//! - loads `.env` and sets up logging
//! - parses CLI arguments
//! - runs the cleaning/analysis pipeline
//! - prints reports/plots
//! - writes exports

use clap::Parser;
use tracing::info;

use crate::cli::{
    AnalyzeArgs, CleanArgs, CleaningArgs, Command, DEFAULT_MULTI_REGRESSORS, DEFAULT_REGRESSOR, InputArgs,
    SampleArgs,
};
use crate::clean::window::MAX_WINDOW_RADIUS;
use crate::data::SampleConfig;
use crate::domain::{CleanConfig, Field, ImputePolicy, RunConfig};
use crate::error::AppError;

pub mod pipeline;

/// Entry point for the `energy` binary.
pub fn run() -> Result<(), AppError> {
    // A missing .env is fine; variables may come from the shell.
    dotenvy::dotenv().ok();
    crate::logging::init();

    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);

    match cli.command {
        Command::Analyze(args) => handle_analyze(&args),
        Command::Clean(args) => handle_clean(&args),
        Command::Sample(args) => handle_sample(&args),
    }
}

fn handle_analyze(args: &AnalyzeArgs) -> Result<(), AppError> {
    let config = run_config_from_args(args)?;
    let output = pipeline::run_analysis(&config)?;

    if config.report {
        println!("{}", crate::report::format_run_report(&output, &config));
    }

    if config.plot {
        let plot = crate::plot::render_consumption_plot(
            output.run.series.records(),
            &output.run.replacements,
            config.plot_width,
            config.plot_height,
        );
        println!("{plot}");
    }

    if let Some(path) = &config.export {
        crate::io::export::write_results_csv(path, &output.run.series, output.forecast.simple())?;
        println!("Results exported to {}", path.display());
    }
    if let Some(path) = &config.summary {
        crate::io::summary::write_summary_json(path, &output, &config)?;
        println!("Summary written to {}", path.display());
    }

    Ok(())
}

fn handle_clean(args: &CleanArgs) -> Result<(), AppError> {
    let config = RunConfig {
        export: Some(args.export.clone()),
        report: false,
        ..base_config(&args.input, &args.cleaning)?
    };
    let output = pipeline::run_analysis(&config)?;

    crate::io::export::write_results_csv(&args.export, &output.run.series, output.forecast.simple())?;
    info!(path = %args.export.display(), "cleaned series exported");
    println!(
        "{} days cleaned ({} repaired, {} outliers replaced) -> {}",
        output.run.series.len(),
        output.run.imputations.repairs.len(),
        output.run.replacements.iter().filter(|r| !r.fallback).count(),
        args.export.display()
    );
    Ok(())
}

fn handle_sample(args: &SampleArgs) -> Result<(), AppError> {
    let config = SampleConfig {
        days: args.days,
        seed: args.seed,
        start: args.start,
        negative_rate: args.negative_rate,
        missing_rate: args.missing_rate,
        spike_rate: args.spike_rate,
    };
    let records = crate::data::generate_sample(&config)?;
    crate::io::export::write_input_csv(&args.out, &records)?;
    println!("Wrote {} days to {}", records.len(), args.out.display());
    Ok(())
}

pub fn clean_config_from_args(args: &CleaningArgs) -> Result<CleanConfig, AppError> {
    if !(args.z_threshold.is_finite() && args.z_threshold > 0.0) {
        return Err(AppError::input("--z-threshold must be a positive number."));
    }
    if !(args.epsilon.is_finite() && args.epsilon >= 0.0) {
        return Err(AppError::input("--epsilon must be a non-negative number."));
    }
    if args.window_radius > MAX_WINDOW_RADIUS {
        return Err(AppError::input(format!(
            "--window-radius must be at most {MAX_WINDOW_RADIUS} days."
        )));
    }
    Ok(CleanConfig {
        impute: ImputePolicy {
            zero_is_missing: args.zero_is_missing,
            epsilon: args.epsilon,
        },
        z_threshold: args.z_threshold,
        window_radius: args.window_radius,
        aggregate: args.aggregate,
    })
}

fn base_config(input: &InputArgs, cleaning: &CleaningArgs) -> Result<RunConfig, AppError> {
    Ok(RunConfig {
        input: input.input.clone(),
        delimiter: input.delimiter,
        decimal: input.decimal,
        clean: clean_config_from_args(cleaning)?,
        correlates: Field::DEFAULT_CORRELATES.to_vec(),
        regressor: DEFAULT_REGRESSOR,
        multi_regressors: DEFAULT_MULTI_REGRESSORS.to_vec(),
        report: true,
        plot: false,
        plot_width: 0,
        plot_height: 0,
        export: None,
        summary: None,
    })
}

pub fn run_config_from_args(args: &AnalyzeArgs) -> Result<RunConfig, AppError> {
    Ok(RunConfig {
        correlates: args.correlates.clone(),
        regressor: args.regressor,
        multi_regressors: args.multi_regressors.clone(),
        report: true,
        plot: args.plot,
        plot_width: args.width,
        plot_height: args.height,
        export: (!args.no_export).then(|| args.export.clone()),
        summary: args.summary.clone(),
        ..base_config(&args.input, &args.cleaning)?
    })
}

/// Rewrite argv so `energy` defaults to `energy analyze`.
///
/// Rules:
/// - `energy`                          -> `energy analyze`
/// - `energy --input x.csv ...`        -> `energy analyze --input x.csv ...`
/// - `energy --help/--version/-h`      -> unchanged (show top-level help/version)
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let Some(arg1) = argv.get(1).cloned() else {
        argv.push("analyze".to_string());
        return argv;
    };

    let is_top_level_help_or_version = matches!(
        arg1.as_str(),
        "-h" | "--help" | "-V" | "--version" | "help"
    );
    if is_top_level_help_or_version {
        return argv;
    }

    let is_subcommand = matches!(arg1.as_str(), "analyze" | "clean" | "sample");
    if is_subcommand {
        return argv;
    }

    // If the first token is a flag, treat it as "analyze flags".
    if arg1.starts_with('-') {
        argv.insert(1, "analyze".to_string());
        return argv;
    }

    // Otherwise, leave as-is.
    argv
}
