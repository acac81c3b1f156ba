//! Shared run logic for the `analyze` and `clean` commands.
//!
//! ingest -> clean (impute, detect, replace) -> analysis -> forecast
//!
//! The commands then only differ in what they print and write.

use std::io::Read;

use tracing::info;

use crate::analysis::{Analysis, analyze};
use crate::clean::{CleanOutcome, CleanRun, clean};
use crate::domain::RunConfig;
use crate::error::AppError;
use crate::forecast::{Forecast, forecast};
use crate::io::ingest::{IngestedData, InputFormat, RowError, load_series, parse_series};

/// What ingest found, minus the series (which moves into cleaning).
#[derive(Debug, Clone)]
pub struct IngestInfo {
    pub format: InputFormat,
    pub row_errors: Vec<RowError>,
    pub rows_read: usize,
    pub rows_used: usize,
}

/// All computed outputs of one run.
#[derive(Debug, Clone)]
pub struct RunOutput {
    pub ingest: IngestInfo,
    pub run: CleanRun,
    pub analysis: Analysis,
    pub forecast: Forecast,
}

/// Execute the full pipeline on the configured input file.
pub fn run_analysis(config: &RunConfig) -> Result<RunOutput, AppError> {
    let data = load_series(&config.input, config.delimiter, config.decimal)?;
    run_ingested(config, data)
}

/// Execute the pipeline on an in-memory reader instead of `config.input`.
pub fn run_analysis_from_reader<R: Read>(config: &RunConfig, reader: R) -> Result<RunOutput, AppError> {
    let data = parse_series(reader, config.delimiter, config.decimal)?;
    run_ingested(config, data)
}

fn run_ingested(config: &RunConfig, data: IngestedData) -> Result<RunOutput, AppError> {
    let IngestedData {
        series,
        format,
        row_errors,
        rows_read,
        rows_used,
    } = data;

    let run = match clean(series, &config.clean) {
        CleanOutcome::Cleaned(run) => run,
        CleanOutcome::Empty => {
            return Err(AppError::no_data(format!(
                "No usable rows in '{}'.",
                config.input.display()
            )));
        }
    };

    let analysis = analyze(&run.series, &config.correlates);
    let forecast = forecast(&run.series, config.regressor, &config.multi_regressors);

    info!(
        rows_used,
        rejected = row_errors.len(),
        outliers = run.distribution.outliers,
        "run complete"
    );

    Ok(RunOutput {
        ingest: IngestInfo {
            format,
            row_errors,
            rows_read,
            rows_used,
        },
        run,
        analysis,
        forecast,
    })
}
