//! Export cleaned per-day results to CSV.
//!
//! The export is meant to be easy to consume in spreadsheets: `;`-delimited,
//! dot decimals, one row per input day, values from the cleaned state.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::domain::{Cleaned, DayRecord, RecordSeries};
use crate::error::AppError;
use crate::forecast::{LinearModel, MA_WINDOW, trailing_average};
use crate::io::ingest::COLUMNS;

pub const EXPORT_COLUMNS: [&str; 10] = [
    "day",
    "date",
    "raw_consumption",
    "consumption",
    "net_consumption",
    "solar_generation",
    "z_score",
    "is_outlier",
    "forecast_ma3",
    "forecast_linear",
];

/// Write per-day results to a CSV file.
pub fn write_results_csv(
    path: &Path,
    series: &RecordSeries<Cleaned>,
    linear: Option<&LinearModel>,
) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::output(format!("Failed to create export CSV '{}': {e}", path.display())))?;
    write_results(file, series, linear)
}

/// Write per-day results to any writer.
///
/// `forecast_ma3` is empty for the first three days and `forecast_linear` is
/// empty when no regression was fitted.
pub fn write_results<W: Write>(
    writer: W,
    series: &RecordSeries<Cleaned>,
    linear: Option<&LinearModel>,
) -> Result<(), AppError> {
    let mut wtr = csv::WriterBuilder::new().delimiter(b';').from_writer(writer);
    wtr.write_record(EXPORT_COLUMNS)
        .map_err(|e| AppError::output(format!("Failed to write export CSV header: {e}")))?;

    let records = series.records();
    for (i, r) in records.iter().enumerate() {
        let ma3 = trailing_average(records, i, MA_WINDOW);
        let row = [
            r.day.to_string(),
            r.date.clone(),
            r.observed.consumption.map(|v| format!("{v:.2}")).unwrap_or_default(),
            format!("{:.2}", r.consumption),
            format!("{:.2}", r.net_consumption),
            format!("{:.2}", r.solar_generation),
            format!("{:.4}", r.z_score),
            u8::from(r.is_outlier).to_string(),
            ma3.map(|v| format!("{v:.2}")).unwrap_or_default(),
            linear.map(|m| format!("{:.2}", m.predict(r))).unwrap_or_default(),
        ];
        wtr.write_record(&row)
            .map_err(|e| AppError::output(format!("Failed to write export CSV row: {e}")))?;
    }

    wtr.flush()
        .map_err(|e| AppError::output(format!("Failed to flush export CSV: {e}")))?;
    Ok(())
}

/// Write records in the input layout to a CSV file.
pub fn write_input_csv(path: &Path, records: &[DayRecord]) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::output(format!("Failed to create input CSV '{}': {e}", path.display())))?;
    write_input_records(file, records)
}

/// Write records in the input layout (so the file can be read back by `ingest`).
///
/// Missing readings are written as empty cells.
pub fn write_input_records<W: Write>(writer: W, records: &[DayRecord]) -> Result<(), AppError> {
    let mut wtr = csv::WriterBuilder::new().delimiter(b';').from_writer(writer);
    wtr.write_record(COLUMNS)
        .map_err(|e| AppError::output(format!("Failed to write input CSV header: {e}")))?;

    for r in records {
        let opt = |v: Option<f64>| v.map(|x| format!("{x:.2}")).unwrap_or_default();
        let row = [
            r.day.to_string(),
            r.date.clone(),
            format!("{:.1}", r.weather.temperature),
            format!("{:.1}", r.weather.humidity),
            format!("{:.2}", r.weather.irradiance),
            format!("{:.1}", r.weather.wind),
            format!("{:.2}", r.occupancy),
            u8::from(r.is_workday).to_string(),
            u8::from(r.is_holiday).to_string(),
            format!("{:.2}", r.peak_tariff),
            opt(r.observed.consumption),
            opt(r.observed.solar_generation),
            format!("{:.2}", r.ev_load),
            format!("{:.2}", r.grid_import),
        ];
        wtr.write_record(&row)
            .map_err(|e| AppError::output(format!("Failed to write input CSV row: {e}")))?;
    }

    wtr.flush()
        .map_err(|e| AppError::output(format!("Failed to flush input CSV: {e}")))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clean::{clean, CleanRun};
    use crate::domain::{CleanConfig, DecimalSeparator, Delimiter, Field};
    use crate::forecast::fit_simple;
    use crate::io::ingest::parse_series;

    fn cleaned_run(values: &[f64]) -> CleanRun {
        let records = values
            .iter()
            .enumerate()
            .map(|(i, &v)| DayRecord::with_consumption(i as u32 + 1, v))
            .collect();
        clean(RecordSeries::new(records).unwrap(), &CleanConfig::default())
            .into_run()
            .unwrap()
    }

    fn wavy_with_spike() -> Vec<f64> {
        let mut values: Vec<f64> = (0..30).map(|i| 50.0 + (i % 5) as f64).collect();
        values[9] = 300.0;
        values
    }

    fn export_rows(run: &CleanRun) -> Vec<csv::StringRecord> {
        let linear = fit_simple(run.series.records(), Field::Irradiance);
        let mut buf = Vec::new();
        write_results(&mut buf, &run.series, linear.as_ref()).unwrap();
        csv::ReaderBuilder::new()
            .delimiter(b';')
            .from_reader(buf.as_slice())
            .records()
            .map(Result::unwrap)
            .collect()
    }

    #[test]
    fn export_has_one_row_per_day() {
        let run = cleaned_run(&wavy_with_spike());
        let rows = export_rows(&run);
        assert_eq!(rows.len(), 30);

        let spike = &rows[9];
        assert_eq!(&spike[0], "10");
        assert_eq!(&spike[2], "300.00");
        assert_eq!(&spike[7], "1");
        assert_ne!(&spike[3], "300.00");

        // moving average is undefined for the first three days
        assert_eq!(&rows[2][8], "");
        assert_eq!(&rows[3][8], "51.00");
        assert!(!rows[0][9].is_empty());
    }

    #[test]
    fn re_imported_treated_consumption_has_no_outliers() {
        let run = cleaned_run(&wavy_with_spike());
        assert_eq!(run.distribution.outliers, 1);

        let rows = export_rows(&run);
        let records: Vec<DayRecord> = rows
            .iter()
            .map(|row| DayRecord::with_consumption(row[0].parse().unwrap(), row[3].parse().unwrap()))
            .collect();
        let second = clean(RecordSeries::new(records).unwrap(), &CleanConfig::default())
            .into_run()
            .unwrap();
        assert_eq!(second.distribution.outliers, 0);
        assert!(second.replacements.is_empty());
    }

    #[test]
    fn input_layout_round_trips_through_ingest() {
        let mut records: Vec<DayRecord> = (1..=4).map(|i| DayRecord::with_consumption(i, 10.0 * i as f64)).collect();
        records[1].observed.consumption = None;
        records[2].weather.temperature = 21.5;
        records[3].is_workday = true;

        let mut buf = Vec::new();
        write_input_records(&mut buf, &records).unwrap();
        let data = parse_series(buf.as_slice(), Delimiter::Auto, DecimalSeparator::Auto).unwrap();

        assert_eq!(data.rows_used, 4);
        let back = data.series.records();
        assert_eq!(back[1].observed.consumption, None);
        assert!((back[2].weather.temperature - 21.5).abs() < 1e-12);
        assert!(back[3].is_workday);
        assert_eq!(back[0].consumption, 10.0);
    }
}
