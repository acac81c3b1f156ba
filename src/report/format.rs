//! Formatted terminal output.
//!
//! All report text is built here so the cleaning and analysis code stays free
//! of presentation, and output changes stay localized.

use crate::analysis::{Analysis, GroupMean};
use crate::app::pipeline::{IngestInfo, RunOutput};
use crate::clean::{CleanRun, Replacement};
use crate::domain::{DecimalSeparator, Field, RunConfig, WindowAggregate};
use crate::forecast::{Forecast, ForecastSet, MA_WINDOW};
use crate::report::{RepairCounts, correlation_strength};

/// Rejected rows listed individually before the list is cut short.
const MAX_LISTED_ROW_ERRORS: usize = 10;

/// Format the full report of an `analyze` run.
pub fn format_run_report(output: &RunOutput, config: &RunConfig) -> String {
    let mut out = String::new();
    out.push_str(&format_header(&output.ingest, config));
    out.push_str(&format_cleaning(&output.run, config));
    out.push_str(&format_analysis(&output.analysis));
    out.push_str(&format_forecast(&output.forecast));
    out
}

/// Run header: input file, detected format and row counts.
pub fn format_header(ingest: &IngestInfo, config: &RunConfig) -> String {
    let mut out = String::new();

    out.push_str("=== energy - daily consumption cleaning ===\n");
    out.push_str(&format!("Input: {}\n", config.input.display()));
    out.push_str(&format!(
        "Format: delimiter {} | decimals {}\n",
        delimiter_label(ingest.format.delimiter),
        decimal_label(ingest.format.decimal)
    ));
    out.push_str(&format!(
        "Rows: read={} used={} rejected={}\n",
        ingest.rows_read,
        ingest.rows_used,
        ingest.row_errors.len()
    ));
    for e in ingest.row_errors.iter().take(MAX_LISTED_ROW_ERRORS) {
        out.push_str(&format!("  line {}: {}\n", e.line, e.message));
    }
    if ingest.row_errors.len() > MAX_LISTED_ROW_ERRORS {
        out.push_str(&format!(
            "  ... {} more\n",
            ingest.row_errors.len() - MAX_LISTED_ROW_ERRORS
        ));
    }

    out
}

/// Imputation counts, the outlier distribution and the replacement table.
pub fn format_cleaning(run: &CleanRun, config: &RunConfig) -> String {
    let mut out = String::new();

    out.push_str("\nImputation:\n");
    let cons = RepairCounts::of(&run.imputations, Field::Consumption);
    let solar = RepairCounts::of(&run.imputations, Field::SolarGeneration);
    if config.clean.impute.zero_is_missing {
        out.push_str(&format!(
            "  {:<18} negative={} near-zero={} missing={}\n",
            "Consumption", cons.negative, cons.near_zero, cons.missing
        ));
    } else {
        out.push_str(&format!(
            "  {:<18} negative={} missing={}\n",
            "Consumption", cons.negative, cons.missing
        ));
    }
    out.push_str(&format!(
        "  {:<18} negative={} missing={}\n",
        "Solar generation", solar.negative, solar.missing
    ));

    let d = &run.distribution;
    out.push_str(&format!("\nOutliers (|z| > {:.2}):\n", d.threshold));
    out.push_str(&format!(
        "  n={} mean={:.2} std={:.2} flagged={}\n",
        d.n, d.mean, d.std_dev, d.outliers
    ));
    if d.degenerate {
        out.push_str("  zero spread: every z-score is 0, nothing flagged\n");
    }

    if !run.replacements.is_empty() {
        out.push_str(&format!(
            "  Replaced with the {} of unflagged values within ±{} days:\n",
            aggregate_label(config.clean.aggregate),
            config.clean.window_radius
        ));
        out.push_str(&format_replacements(&run.replacements));
    }

    out
}

fn format_replacements(rows: &[Replacement]) -> String {
    let mut out = String::new();
    out.push_str(format!("  {:>5} {:>10} {:>10} {:>8} {:>6}", "day", "before", "after", "z", "used").trim_end());
    out.push('\n');
    out.push_str(format!("  {:-<5} {:-<10} {:-<10} {:-<8} {:-<6}", "", "", "", "", "").trim_end());
    out.push('\n');

    for r in rows {
        let mut line = format!(
            "  {:>5} {:>10.2} {:>10.2} {:>8.2} {:>6}",
            r.day, r.before, r.after, r.z_score, r.admitted
        );
        if r.fallback {
            line.push_str("  (no unflagged neighbours, kept)");
        }
        out.push_str(&line);
        out.push('\n');
    }

    out
}

/// Descriptive statistics, correlations and the workday split.
pub fn format_analysis(analysis: &Analysis) -> String {
    let mut out = String::new();

    if let Some(n) = analysis.descriptive.first().map(|s| s.n) {
        out.push_str(&format!("\nDescriptive statistics (n={n} days, kWh):\n"));
        out.push_str(format!("  {:<18} {:>10} {:>10} {:>10} {:>10}", "field", "mean", "min", "max", "std").trim_end());
        out.push('\n');
        for s in &analysis.descriptive {
            out.push_str(&format!(
                "  {:<18} {:>10.2} {:>10.2} {:>10.2} {:>10.2}\n",
                s.field.display_name(),
                s.mean,
                s.min,
                s.max,
                s.std_dev
            ));
        }
    }

    if !analysis.correlations.is_empty() {
        out.push_str("\nPearson correlation with consumption:\n");
        for c in &analysis.correlations {
            out.push_str(&format!(
                "  {:<18} {:>+8.4}  {}\n",
                c.y.display_name(),
                c.r,
                correlation_strength(c.r)
            ));
        }
    }

    out.push_str("\nMean consumption by day type:\n");
    out.push_str(&format_group("Business days", &analysis.day_types.business));
    out.push_str(&format_group("Weekends/holidays", &analysis.day_types.other));

    out
}

fn format_group(label: &str, g: &GroupMean) -> String {
    if g.n == 0 {
        return format!("  {label:<18} n=0\n");
    }
    format!("  {label:<18} n={:<4} {:.2} kWh\n", g.n, g.mean)
}

/// Next-day forecast and fitted regression models.
pub fn format_forecast(forecast: &Forecast) -> String {
    match forecast {
        Forecast::Insufficient { n, needed } => {
            format!("\nForecast:\n  insufficient data ({n} days, need at least {needed})\n")
        }
        Forecast::Ready(set) => format_forecast_set(set),
    }
}

fn format_forecast_set(set: &ForecastSet) -> String {
    let mut out = String::new();

    out.push_str(&format!("\nForecast (day {}):\n", set.next_day));
    out.push_str(&format!(
        "  Moving average ({MA_WINDOW} days): {:.2} kWh\n",
        set.moving_average
    ));

    let m = &set.simple;
    out.push_str(&format!(
        "\nSimple regression (consumption ~ {}):\n",
        m.x.name()
    ));
    out.push_str(&format!(
        "  consumption = {:.2} {} {:.2} * {}\n",
        m.intercept,
        sign(m.slope),
        m.slope.abs(),
        m.x.name()
    ));
    out.push_str(&format!("  R² = {:.4} (n={})\n", m.r_squared, m.n));

    if let Some(mm) = &set.multiple {
        let names: Vec<&str> = mm.regressors.iter().map(|f| f.name()).collect();
        out.push_str(&format!(
            "\nMultiple regression (consumption ~ {}):\n",
            names.join(" + ")
        ));
        let mut eq = format!("  consumption = {:.2}", mm.coefficients[0]);
        for (f, b) in mm.regressors.iter().zip(&mm.coefficients[1..]) {
            eq.push_str(&format!(" {} {:.4} * {}", sign(*b), b.abs(), f.name()));
        }
        out.push_str(&eq);
        out.push('\n');
        out.push_str(&format!("  R² = {:.4} (n={})\n", mm.r_squared, mm.n));
    }

    out
}

fn sign(v: f64) -> char {
    if v < 0.0 { '-' } else { '+' }
}

fn delimiter_label(c: char) -> String {
    match c {
        '\t' => "tab".to_string(),
        other => format!("'{other}'"),
    }
}

fn decimal_label(d: DecimalSeparator) -> &'static str {
    match d {
        DecimalSeparator::Auto => "auto",
        DecimalSeparator::Dot => "dot",
        DecimalSeparator::Comma => "comma",
    }
}

fn aggregate_label(a: WindowAggregate) -> &'static str {
    match a {
        WindowAggregate::Mean => "mean",
        WindowAggregate::Median => "median",
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;
    use crate::app::pipeline::run_analysis_from_reader;
    use crate::domain::{CleanConfig, Delimiter};
    use crate::forecast::LinearModel;

    fn config() -> RunConfig {
        RunConfig {
            input: PathBuf::from("consumo.csv"),
            delimiter: Delimiter::Auto,
            decimal: DecimalSeparator::Auto,
            clean: CleanConfig {
                z_threshold: 2.0,
                ..CleanConfig::default()
            },
            correlates: vec![Field::Temperature, Field::Workday],
            regressor: Field::Irradiance,
            multi_regressors: Vec::new(),
            report: true,
            plot: false,
            plot_width: 60,
            plot_height: 12,
            export: None,
            summary: None,
        }
    }

    fn seven_day_run() -> RunOutput {
        let mut text = String::from("day;date;t;h;i;w;o;wd;hd;pt;c;s;ev;g\n");
        for (day, c) in [10, 10, 10, 10, 100, 10, 10].iter().enumerate() {
            let day = day + 1;
            text.push_str(&format!("{day};2024-01-0{day};20;50;{day};2;1;1;0;0,1;{c};1;0;5\n"));
        }
        text.push_str("8;2024-01-08;x\n");
        run_analysis_from_reader(&config(), text.as_bytes()).unwrap()
    }

    #[test]
    fn report_covers_every_section() {
        let out = seven_day_run();
        let report = format_run_report(&out, &config());

        assert!(report.contains("Input: consumo.csv"));
        assert!(report.contains("Format: delimiter ';' | decimals auto"));
        assert!(report.contains("Rows: read=8 used=7 rejected=1"));
        assert!(report.contains("  line 9: "));
        assert!(report.contains("Outliers (|z| > 2.00):"));
        assert!(report.contains("flagged=1"));
        assert!(report.contains("Replaced with the mean of unflagged values within ±2 days:"));
        assert!(report.contains("Descriptive statistics (n=7 days, kWh):"));
        assert!(report.contains("Pearson correlation with consumption:"));
        assert!(report.contains("Business days"));
        assert!(report.contains("Forecast (day 8):"));
        assert!(report.contains("Moving average (3 days): 10.00 kWh"));
        assert!(report.contains("Simple regression (consumption ~ irradiance):"));
        assert!(!report.contains("Multiple regression"));
    }

    #[test]
    fn replacement_row_shows_before_and_after() {
        let out = seven_day_run();
        let text = format_replacements(&out.run.replacements);
        let row = text.lines().nth(2).unwrap();
        assert_eq!(row, "      5     100.00      10.00     2.45      4");
    }

    #[test]
    fn insufficient_forecast_is_reported_not_failed() {
        let text = format_forecast(&Forecast::Insufficient { n: 2, needed: 3 });
        assert!(text.contains("insufficient data (2 days, need at least 3)"));
    }

    #[test]
    fn regression_equation_keeps_sign_readable() {
        let set = ForecastSet {
            next_day: 10,
            moving_average: 5.0,
            simple: LinearModel {
                x: Field::Irradiance,
                intercept: 40.0,
                slope: -2.5,
                r_squared: 0.9,
                n: 9,
            },
            multiple: None,
        };
        let text = format_forecast(&Forecast::Ready(set));
        assert!(text.contains("consumption = 40.00 - 2.50 * irradiance"));
    }
}
