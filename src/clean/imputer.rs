//! Negative and missing value repair.
//!
//! Only `consumption` and `solar_generation` are repaired. Records are visited in
//! ascending order and every rule reads *earlier* records, which are already
//! final by the time they are read:
//!
//! - missing (empty cell): mean of the three previous values when `i >= 3`,
//!   otherwise the previous value, or `0.0` on the first day
//! - negative (or near zero for consumption in strict mode): the previous value,
//!   or `0.0` on the first day

use serde::Serialize;
use tracing::debug;

use crate::domain::{DayRecord, Field, ImputePolicy, Imputed, Raw, RecordSeries};

/// Number of prior days averaged when filling a missing value.
pub const MOVING_AVERAGE_DAYS: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RepairKind {
    Negative,
    NearZero,
    Missing,
}

/// One repaired value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Repair {
    pub day: u32,
    pub field: Field,
    pub kind: RepairKind,
    /// The invalid reading (`None` when the cell was empty).
    pub before: Option<f64>,
    pub after: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ImputeReport {
    pub repairs: Vec<Repair>,
}

impl ImputeReport {
    pub fn count(&self, field: Field, kind: RepairKind) -> usize {
        self.repairs
            .iter()
            .filter(|r| r.field == field && r.kind == kind)
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.repairs.is_empty()
    }
}

/// Repair a raw series and advance it to the `Imputed` stage.
pub fn repair(mut series: RecordSeries<Raw>, policy: &ImputePolicy) -> (RecordSeries<Imputed>, ImputeReport) {
    let repairs = repair_records(series.records_mut(), policy);
    (series.retag(), ImputeReport { repairs })
}

/// Repair records in place, in ascending order. Empty input is a no-op.
pub fn repair_records(records: &mut [DayRecord], policy: &ImputePolicy) -> Vec<Repair> {
    let mut repairs = Vec::new();
    let near_zero = policy.zero_is_missing.then_some(policy.epsilon);

    for i in 0..records.len() {
        let observed = records[i].observed;
        if let Some(r) = repair_at(records, i, Field::Consumption, observed.consumption, near_zero) {
            repairs.push(r);
        }
        if let Some(r) = repair_at(records, i, Field::SolarGeneration, observed.solar_generation, None) {
            repairs.push(r);
        }
    }

    repairs
}

fn repair_at(
    records: &mut [DayRecord],
    i: usize,
    field: Field,
    observed: Option<f64>,
    near_zero: Option<f64>,
) -> Option<Repair> {
    let (kind, before, after) = match observed {
        None => (RepairKind::Missing, None, moving_average_prior(records, i, field)),
        Some(_) => {
            let value = field.value(&records[i]);
            let kind = if value < 0.0 {
                RepairKind::Negative
            } else if near_zero.is_some_and(|eps| value <= eps) {
                RepairKind::NearZero
            } else {
                return None;
            };
            (kind, Some(value), previous(records, i, field))
        }
    };

    set_value(&mut records[i], field, after);
    debug!(
        day = records[i].day,
        field = field.name(),
        ?kind,
        ?before,
        after,
        "repaired value"
    );

    Some(Repair {
        day: records[i].day,
        field,
        kind,
        before,
        after,
    })
}

fn previous(records: &[DayRecord], i: usize, field: Field) -> f64 {
    if i > 0 { field.value(&records[i - 1]) } else { 0.0 }
}

fn moving_average_prior(records: &[DayRecord], i: usize, field: Field) -> f64 {
    if i >= MOVING_AVERAGE_DAYS {
        let sum: f64 = records[i - MOVING_AVERAGE_DAYS..i]
            .iter()
            .map(|r| field.value(r))
            .sum();
        sum / MOVING_AVERAGE_DAYS as f64
    } else {
        previous(records, i, field)
    }
}

fn set_value(record: &mut DayRecord, field: Field, value: f64) {
    match field {
        Field::Consumption => record.consumption = value,
        Field::SolarGeneration => record.solar_generation = value,
        // Only the two fields above are ever repaired.
        _ => {}
    }
}
