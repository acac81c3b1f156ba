//! Stage-tagged record series.
//!
//! A `RecordSeries<S>` owns the day records for one run. The marker `S` says
//! which cleaning stage the data has been through:
//!
//! `Raw -> Imputed -> Flagged -> Cleaned`
//!
//! Each stage takes the series by value and hands back the next marker, so the
//! stages cannot be skipped or reordered. Records are never added or removed
//! after construction.

use std::marker::PhantomData;

use crate::domain::DayRecord;
use crate::error::AppError;

/// As loaded from input, nothing repaired yet.
#[derive(Debug, Clone, Copy)]
pub struct Raw;
/// Negative/missing values repaired.
#[derive(Debug, Clone, Copy)]
pub struct Imputed;
/// z-scores and outlier flags set; consumption not yet replaced.
#[derive(Debug, Clone, Copy)]
pub struct Flagged;
/// Outliers replaced and net consumption computed.
#[derive(Debug, Clone, Copy)]
pub struct Cleaned;

#[derive(Debug, Clone)]
pub struct RecordSeries<S> {
    records: Vec<DayRecord>,
    _stage: PhantomData<S>,
}

impl RecordSeries<Raw> {
    /// Build a raw series, checking that `day` is strictly increasing.
    pub fn new(records: Vec<DayRecord>) -> Result<Self, AppError> {
        for w in records.windows(2) {
            if w[1].day <= w[0].day {
                return Err(AppError::new(
                    2,
                    format!(
                        "Days must be strictly increasing: day {} follows day {}.",
                        w[1].day, w[0].day
                    ),
                ));
            }
        }
        Ok(Self::from_records(records))
    }
}

impl<S> RecordSeries<S> {
    fn from_records(records: Vec<DayRecord>) -> Self {
        Self {
            records,
            _stage: PhantomData,
        }
    }

    pub fn records(&self) -> &[DayRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Consumption values in series order.
    pub fn consumption(&self) -> Vec<f64> {
        self.records.iter().map(|r| r.consumption).collect()
    }

    pub fn into_records(self) -> Vec<DayRecord> {
        self.records
    }

    /// Mutable access for the cleaning stages of this crate.
    pub(crate) fn records_mut(&mut self) -> &mut [DayRecord] {
        &mut self.records
    }

    /// Move to another stage marker without touching the data.
    pub(crate) fn retag<T>(self) -> RecordSeries<T> {
        RecordSeries::from_records(self.records)
    }
}
