//! JSON run summary.
//!
//! A machine-readable companion to the text report. The schema is the
//! `RunSummary` struct below; nested types serialize through their own derives.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use serde::Serialize;

use crate::analysis::Analysis;
use crate::app::pipeline::RunOutput;
use crate::clean::{Distribution, ImputeReport, Replacement};
use crate::domain::{RunConfig, WindowAggregate};
use crate::error::AppError;
use crate::forecast::Forecast;
use crate::io::ingest::{InputFormat, RowError};

#[derive(Debug, Serialize)]
pub struct RunSummary<'a> {
    pub tool: &'static str,
    pub input: String,
    pub format: InputFormat,
    pub rows_read: usize,
    pub rows_used: usize,
    pub rejected_rows: &'a [RowError],
    pub settings: Settings,
    pub imputations: &'a ImputeReport,
    pub distribution: &'a Distribution,
    pub replacements: &'a [Replacement],
    pub analysis: &'a Analysis,
    pub forecast: &'a Forecast,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct Settings {
    pub z_threshold: f64,
    pub window_radius: usize,
    pub aggregate: WindowAggregate,
    pub zero_is_missing: bool,
}

impl<'a> RunSummary<'a> {
    pub fn new(output: &'a RunOutput, config: &RunConfig) -> Self {
        Self {
            tool: "energy",
            input: config.input.display().to_string(),
            format: output.ingest.format,
            rows_read: output.ingest.rows_read,
            rows_used: output.ingest.rows_used,
            rejected_rows: &output.ingest.row_errors,
            settings: Settings {
                z_threshold: config.clean.z_threshold,
                window_radius: config.clean.window_radius,
                aggregate: config.clean.aggregate,
                zero_is_missing: config.clean.impute.zero_is_missing,
            },
            imputations: &output.run.imputations,
            distribution: &output.run.distribution,
            replacements: &output.run.replacements,
            analysis: &output.analysis,
            forecast: &output.forecast,
        }
    }
}

/// Write the run summary to a JSON file.
pub fn write_summary_json(path: &Path, output: &RunOutput, config: &RunConfig) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::output(format!("Failed to create summary JSON '{}': {e}", path.display())))?;
    write_summary(file, &RunSummary::new(output, config))
}

pub fn write_summary<W: Write>(writer: W, summary: &RunSummary<'_>) -> Result<(), AppError> {
    serde_json::to_writer_pretty(writer, summary)
        .map_err(|e| AppError::output(format!("Failed to write summary JSON: {e}")))
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;
    use crate::app::pipeline::run_analysis_from_reader;
    use crate::domain::{CleanConfig, DecimalSeparator, Delimiter, Field};

    fn config() -> RunConfig {
        RunConfig {
            input: PathBuf::from("consumo.csv"),
            delimiter: Delimiter::Comma,
            decimal: DecimalSeparator::Dot,
            clean: CleanConfig::default(),
            correlates: vec![Field::Temperature],
            regressor: Field::Temperature,
            multi_regressors: Vec::new(),
            report: false,
            plot: false,
            plot_width: 60,
            plot_height: 12,
            export: None,
            summary: None,
        }
    }

    fn summary_json(text: &str) -> serde_json::Value {
        let cfg = config();
        let out = run_analysis_from_reader(&cfg, text.as_bytes()).unwrap();
        let mut buf = Vec::new();
        write_summary(&mut buf, &RunSummary::new(&out, &cfg)).unwrap();
        serde_json::from_slice(&buf).unwrap()
    }

    const HEADER: &str = "day,date,t,h,i,w,o,wd,hd,pt,c,s,ev,g\n";

    #[test]
    fn summary_carries_counts_and_forecast_status() {
        let text = format!(
            "{HEADER}1,d1,20,50,1,2,1,1,0,0.2,10,2,0,8\n\
             2,d2,21,50,1,2,1,1,0,0.2,-1,2,0,8\n\
             bad row\n\
             3,d3,22,50,1,2,1,0,0,0.2,12,2,0,8\n"
        );
        let json = summary_json(&text);

        assert_eq!(json["tool"], "energy");
        assert_eq!(json["input"], "consumo.csv");
        assert_eq!(json["rows_read"], 4);
        assert_eq!(json["rows_used"], 3);
        assert_eq!(json["rejected_rows"][0]["line"], 4);
        assert_eq!(json["settings"]["aggregate"], "mean");
        assert_eq!(json["imputations"]["repairs"][0]["kind"], "negative");
        assert_eq!(json["imputations"]["repairs"][0]["after"], 10.0);
        assert_eq!(json["forecast"]["status"], "ready");
        assert_eq!(json["forecast"]["next_day"], 4);
    }

    #[test]
    fn short_series_reports_insufficient_forecast() {
        let text = format!("{HEADER}1,d1,20,50,1,2,1,1,0,0.2,10,2,0,8\n");
        let json = summary_json(&text);
        assert_eq!(json["forecast"]["status"], "insufficient");
        assert_eq!(json["forecast"]["needed"], 3);
        assert_eq!(json["distribution"]["outliers"], 0);
    }
}
