//! Delimited-text ingest.
//!
//! This module turns a daily energy file into a raw `RecordSeries`:
//!
//! - **Positional schema**: 14 columns in a fixed order, header row skipped
//! - **Locale tolerant**: `;`/`,`/tab delimiters and comma or dot decimals
//! - **Row-level validation**: bad rows are skipped and reported, never fatal
//! - **No cleaning here**: negative/missing values are passed through as read
//!
//! An empty `consumption` or `solar_generation` cell is kept as *missing*
//! (`Observed` is `None`) so the imputer can fill it; any other empty or
//! non-numeric cell rejects the row.

use std::borrow::Cow;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::StringRecord;
use serde::Serialize;
use tracing::{info, warn};

use crate::domain::{DayRecord, DecimalSeparator, Delimiter, Observed, Raw, RecordSeries, Weather};
use crate::error::AppError;

/// Column order of the input file.
pub const COLUMNS: [&str; 14] = [
    "day",
    "date",
    "temperature",
    "humidity",
    "irradiance",
    "wind",
    "occupancy",
    "workday",
    "holiday",
    "peak_tariff",
    "consumption",
    "solar_generation",
    "ev_load",
    "grid_import",
];

/// Conventions resolved for this file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct InputFormat {
    pub delimiter: char,
    pub decimal: DecimalSeparator,
}

/// A row-level error encountered during ingest.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RowError {
    pub line: usize,
    pub message: String,
}

/// Ingest output: raw series + resolved format + row errors.
#[derive(Debug, Clone)]
pub struct IngestedData {
    pub series: RecordSeries<Raw>,
    pub format: InputFormat,
    pub row_errors: Vec<RowError>,
    pub rows_read: usize,
    pub rows_used: usize,
}

/// Load a file from disk.
pub fn load_series(path: &Path, delimiter: Delimiter, decimal: DecimalSeparator) -> Result<IngestedData, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::input(format!("Failed to open input '{}': {e}", path.display())))?;
    let data = parse_series(file, delimiter, decimal)?;
    info!(
        path = %path.display(),
        rows_read = data.rows_read,
        rows_used = data.rows_used,
        rejected = data.row_errors.len(),
        "input loaded"
    );
    Ok(data)
}

/// Parse from any reader (the whole input is buffered; files are small).
pub fn parse_series<R: Read>(
    mut reader: R,
    delimiter: Delimiter,
    decimal: DecimalSeparator,
) -> Result<IngestedData, AppError> {
    let mut text = String::new();
    reader
        .read_to_string(&mut text)
        .map_err(|e| AppError::input(format!("Failed to read input: {e}")))?;

    // Spreadsheet exports often start with a UTF-8 BOM.
    let text = text.trim_start_matches('\u{feff}');
    if text.trim().is_empty() {
        return Err(AppError::no_data("Input is empty (no header row)."));
    }

    let delim = delimiter.byte().unwrap_or_else(|| detect_delimiter(text));
    let format = InputFormat {
        delimiter: char::from(delim),
        decimal,
    };

    let mut csv_reader = csv::ReaderBuilder::new()
        .delimiter(delim)
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes());

    let mut records = Vec::new();
    let mut row_errors = Vec::new();
    let mut rows_read = 0usize;
    let mut last_day: Option<u32> = None;

    for (idx, result) in csv_reader.records().enumerate() {
        // Fallback when the reader reports no position: header is line 1.
        let fallback_line = idx + 2;

        let record = match result {
            Ok(r) => r,
            Err(e) => {
                rows_read += 1;
                let line = e.position().map_or(fallback_line, |p| p.line() as usize);
                reject(&mut row_errors, line, format!("CSV parse error: {e}"));
                continue;
            }
        };
        let line = record.position().map_or(fallback_line, |p| p.line() as usize);
        if record.iter().all(str::is_empty) {
            continue;
        }
        rows_read += 1;

        let parsed = parse_row(&record, decimal).and_then(|r| match last_day {
            Some(prev) if r.day <= prev => Err(format!("Day {} does not follow day {prev}.", r.day)),
            _ => Ok(r),
        });
        match parsed {
            Ok(r) => {
                last_day = Some(r.day);
                records.push(r);
            }
            Err(message) => reject(&mut row_errors, line, message),
        }
    }

    let rows_used = records.len();
    if rows_used == 0 {
        return Err(AppError::no_data(format!(
            "No valid rows in input ({rows_read} read, {} rejected).",
            row_errors.len()
        )));
    }

    Ok(IngestedData {
        series: RecordSeries::new(records)?,
        format,
        row_errors,
        rows_read,
        rows_used,
    })
}

fn reject(errors: &mut Vec<RowError>, line: usize, message: String) {
    warn!(line, %message, "row skipped");
    errors.push(RowError { line, message });
}

/// Pick the delimiter that occurs most often in the header line.
///
/// Ties go to `;`, the usual choice when decimals are written with a comma.
fn detect_delimiter(text: &str) -> u8 {
    let header = text.lines().next().unwrap_or_default();
    let mut best = (b';', 0usize);
    for cand in [b';', b'\t', b','] {
        let count = header.bytes().filter(|&b| b == cand).count();
        if count > best.1 {
            best = (cand, count);
        }
    }
    best.0
}

fn parse_row(record: &StringRecord, decimal: DecimalSeparator) -> Result<DayRecord, String> {
    if record.len() != COLUMNS.len() {
        return Err(format!(
            "Expected {} fields, found {}.",
            COLUMNS.len(),
            record.len()
        ));
    }
    let cell = |i: usize| record.get(i).unwrap_or_default();
    let number = |i: usize| parse_required(cell(i), COLUMNS[i], decimal);

    let day_cell = cell(0);
    let day = day_cell
        .parse::<u32>()
        .map_err(|_| format!("Invalid `day` value '{day_cell}'."))?;

    let consumption = parse_optional(cell(10), COLUMNS[10], decimal)?;
    let solar_generation = parse_optional(cell(11), COLUMNS[11], decimal)?;

    Ok(DayRecord {
        day,
        date: cell(1).to_string(),
        weather: Weather {
            temperature: number(2)?,
            humidity: number(3)?,
            irradiance: number(4)?,
            wind: number(5)?,
        },
        occupancy: number(6)?,
        is_workday: parse_flag(cell(7), COLUMNS[7], decimal)?,
        is_holiday: parse_flag(cell(8), COLUMNS[8], decimal)?,
        peak_tariff: number(9)?,
        // Missing readings hold 0.0 until the imputer fills them.
        consumption: consumption.unwrap_or(0.0),
        solar_generation: solar_generation.unwrap_or(0.0),
        ev_load: number(12)?,
        grid_import: number(13)?,
        observed: Observed {
            consumption,
            solar_generation,
        },
        ..DayRecord::default()
    })
}

fn parse_required(s: &str, name: &str, decimal: DecimalSeparator) -> Result<f64, String> {
    if s.is_empty() {
        return Err(format!("Missing required value: `{name}`."));
    }
    parse_number(s, decimal).ok_or_else(|| format!("Invalid `{name}` value '{s}'."))
}

fn parse_optional(s: &str, name: &str, decimal: DecimalSeparator) -> Result<Option<f64>, String> {
    if s.is_empty() {
        return Ok(None);
    }
    parse_required(s, name, decimal).map(Some)
}

fn parse_flag(s: &str, name: &str, decimal: DecimalSeparator) -> Result<bool, String> {
    match s.to_ascii_lowercase().as_str() {
        "true" | "yes" => Ok(true),
        "false" | "no" => Ok(false),
        _ => parse_required(s, name, decimal).map(|v| v != 0.0),
    }
}

/// Parse a decimal number under the given convention. Non-finite values are rejected.
pub fn parse_number(s: &str, decimal: DecimalSeparator) -> Option<f64> {
    let s = s.trim();
    let normalized: Cow<'_, str> = match decimal {
        DecimalSeparator::Dot => Cow::Borrowed(s),
        DecimalSeparator::Comma => Cow::Owned(s.replace('.', "").replace(',', ".")),
        DecimalSeparator::Auto if s.contains(',') && !s.contains('.') => Cow::Owned(s.replace(',', ".")),
        DecimalSeparator::Auto => Cow::Borrowed(s),
    };
    normalized.parse::<f64>().ok().filter(|v| v.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER_SEMI: &str = "Dia;Data;Temp;Umid;Irr;Vento;Ocup;Util;Feriado;Tarifa;Consumo;FV;VE;Rede\n";

    fn parse(text: &str) -> Result<IngestedData, AppError> {
        parse_series(text.as_bytes(), Delimiter::Auto, DecimalSeparator::Auto)
    }

    #[test]
    fn semicolon_file_with_comma_decimals() {
        let text = format!(
            "{HEADER_SEMI}1;2024-01-01;17,5;80;4,2;3,1;0,9;1;0;0,85;120,5;30,25;5;95\n\
             2;2024-01-02;18;81;4;3;0,8;0;1;0,85;110;28;0;82\n"
        );
        let data = parse(&text).unwrap();
        assert_eq!(data.format.delimiter, ';');
        assert_eq!(data.rows_used, 2);
        let r = &data.series.records()[0];
        assert_eq!(r.day, 1);
        assert_eq!(r.date, "2024-01-01");
        assert!((r.weather.temperature - 17.5).abs() < 1e-12);
        assert!((r.consumption - 120.5).abs() < 1e-12);
        assert!((r.solar_generation - 30.25).abs() < 1e-12);
        assert!(r.is_workday && !r.is_holiday);
        assert!(data.series.records()[1].is_holiday);
    }

    #[test]
    fn comma_file_with_dot_decimals() {
        let text = "day,date,t,h,i,w,o,wd,hd,pt,c,s,ev,g\n\
                    1,2024-01-01,17.5,80,4.2,3.1,0.9,1,0,0.85,120.5,30.25,5,95\n";
        let data = parse(text).unwrap();
        assert_eq!(data.format.delimiter, ',');
        assert!((data.series.records()[0].weather.irradiance - 4.2).abs() < 1e-12);
    }

    #[test]
    fn wrong_field_count_is_skipped() {
        let text = format!(
            "{HEADER_SEMI}1;2024-01-01;17;80;4;3;0,9;1;0;0,85;120;30;5;95\n\
             2;2024-01-02;17;80;4;3\n\
             3;2024-01-03;17;80;4;3;0,9;1;0;0,85;125;30;5;95\n"
        );
        let data = parse(&text).unwrap();
        assert_eq!(data.rows_read, 3);
        assert_eq!(data.rows_used, 2);
        assert_eq!(data.row_errors.len(), 1);
        assert_eq!(data.row_errors[0].line, 3);
        assert!(data.row_errors[0].message.contains("Expected 14 fields"));
    }

    #[test]
    fn empty_consumption_is_missing_not_zero() {
        let text = format!(
            "{HEADER_SEMI}1;2024-01-01;17;80;4;3;0,9;1;0;0,85;;;5;95\n"
        );
        let data = parse(&text).unwrap();
        let r = &data.series.records()[0];
        assert_eq!(r.observed.consumption, None);
        assert_eq!(r.observed.solar_generation, None);
    }

    #[test]
    fn empty_weather_cell_rejects_row() {
        let text = format!(
            "{HEADER_SEMI}1;2024-01-01;;80;4;3;0,9;1;0;0,85;120;30;5;95\n\
             2;2024-01-02;17;80;4;3;0,9;1;0;0,85;120;30;5;95\n"
        );
        let data = parse(&text).unwrap();
        assert_eq!(data.rows_used, 1);
        assert!(data.row_errors[0].message.contains("temperature"));
    }

    #[test]
    fn out_of_order_day_is_skipped() {
        let text = format!(
            "{HEADER_SEMI}2;a;17;80;4;3;0,9;1;0;0,85;120;30;5;95\n\
             2;b;17;80;4;3;0,9;1;0;0,85;120;30;5;95\n\
             1;c;17;80;4;3;0,9;1;0;0,85;120;30;5;95\n"
        );
        let data = parse(&text).unwrap();
        assert_eq!(data.rows_used, 1);
        assert_eq!(data.row_errors.len(), 2);
    }

    #[test]
    fn header_only_input_has_no_data() {
        let err = parse(HEADER_SEMI).unwrap_err();
        assert_eq!(err.exit_code(), 3);
        let err = parse("").unwrap_err();
        assert_eq!(err.exit_code(), 3);
    }

    #[test]
    fn bom_and_forced_delimiter() {
        let text = "\u{feff}day\tdate\tt\th\ti\tw\to\twd\thd\tpt\tc\ts\tev\tg\n\
                    1\t2024-01-01\t17\t80\t4\t3\t1\ttrue\tno\t1\t100\t20\t0\t80\n";
        let data = parse_series(text.as_bytes(), Delimiter::Tab, DecimalSeparator::Dot).unwrap();
        assert_eq!(data.format.delimiter, '\t');
        assert!(data.series.records()[0].is_workday);
        assert!(!data.series.records()[0].is_holiday);
    }

    #[test]
    fn negative_values_pass_through_unrepaired() {
        let text = format!("{HEADER_SEMI}1;x;17;80;4;3;0,9;1;0;0,85;-12,5;-1;5;95\n");
        let data = parse(&text).unwrap();
        let r = &data.series.records()[0];
        assert_eq!(r.consumption, -12.5);
        assert_eq!(r.observed.consumption, Some(-12.5));
    }

    #[test]
    fn number_conventions() {
        assert_eq!(parse_number("17,5", DecimalSeparator::Auto), Some(17.5));
        assert_eq!(parse_number("17.5", DecimalSeparator::Auto), Some(17.5));
        assert_eq!(parse_number("1.234,5", DecimalSeparator::Comma), Some(1234.5));
        assert_eq!(parse_number("17,5", DecimalSeparator::Dot), None);
        assert_eq!(parse_number("NaN", DecimalSeparator::Dot), None);
        assert_eq!(parse_number("abc", DecimalSeparator::Auto), None);
    }
}
