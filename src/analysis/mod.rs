//! Statistics over a cleaned series.
//!
//! Everything here reads the records; nothing mutates them.

pub mod stats;

pub use stats::*;

use serde::Serialize;

use crate::domain::{Cleaned, Field, RecordSeries};

/// Fields summarized in the descriptive section.
pub const DESCRIBED_FIELDS: [Field; 4] = [
    Field::Consumption,
    Field::SolarGeneration,
    Field::GridImport,
    Field::EvLoad,
];

/// Full analysis of one cleaned series.
#[derive(Debug, Clone, Serialize)]
pub struct Analysis {
    pub descriptive: Vec<FieldSummary>,
    pub correlations: Vec<Correlation>,
    pub day_types: DayTypeSplit,
}

pub fn analyze(series: &RecordSeries<Cleaned>, correlates: &[Field]) -> Analysis {
    let records = series.records();
    Analysis {
        descriptive: DESCRIBED_FIELDS
            .iter()
            .filter_map(|&f| describe(records, f))
            .collect(),
        correlations: correlations(records, Field::Consumption, correlates),
        day_types: split_by_day_type(records),
    }
}
