//! Windowed replacement of flagged consumption values.
//!
//! For each flagged day `i`, the window is `i - radius ..= i + radius` clipped to
//! the series. Only unflagged days are admitted. The default aggregate is the
//! *mean* of the admitted values; `WindowAggregate::Median` switches to a true
//! order-statistic median.
//!
//! All replacements are computed from a single snapshot (the flags and values
//! as they stood after detection) and applied afterwards. Flags are not
//! recomputed. When the window admits nothing, the day keeps its own value.

use serde::Serialize;
use tracing::{info, warn};

use crate::domain::{Cleaned, DayRecord, Flagged, RecordSeries, WindowAggregate};

/// Default window half-width (days on each side).
pub const WINDOW_RADIUS: usize = 2;
/// Largest accepted half-width: a full year on each side.
pub const MAX_WINDOW_RADIUS: usize = 366;

/// One replaced outlier.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Replacement {
    pub day: u32,
    pub before: f64,
    pub after: f64,
    pub z_score: f64,
    /// Number of unflagged window values used.
    pub admitted: usize,
    /// True when nothing was admitted and the value was kept.
    pub fallback: bool,
}

/// Replace flagged values and advance the series to the `Cleaned` stage.
///
/// Net consumption is filled in here as well, since it must reflect the final
/// consumption values.
pub fn replace(
    mut series: RecordSeries<Flagged>,
    radius: usize,
    aggregate: WindowAggregate,
) -> (RecordSeries<Cleaned>, Vec<Replacement>) {
    let replacements = replace_records(series.records_mut(), radius, aggregate);
    for r in series.records_mut() {
        r.net_consumption = r.consumption - r.solar_generation;
    }
    (series.retag(), replacements)
}

/// Replace flagged consumption values in place.
pub fn replace_records(records: &mut [DayRecord], radius: usize, aggregate: WindowAggregate) -> Vec<Replacement> {
    let planned: Vec<Replacement> = records
        .iter()
        .enumerate()
        .filter(|(_, r)| r.is_outlier)
        .map(|(i, r)| {
            let admitted = admitted_values(records, i, radius);
            let (after, fallback) = match aggregate_values(&admitted, aggregate) {
                Some(v) => (v, false),
                None => (r.consumption, true),
            };
            Replacement {
                day: r.day,
                before: r.consumption,
                after,
                z_score: r.z_score,
                admitted: admitted.len(),
                fallback,
            }
        })
        .collect();

    let mut plan = planned.iter().peekable();
    for r in records.iter_mut() {
        let Some(rep) = plan.next_if(|p| p.day == r.day) else {
            continue;
        };
        r.consumption = rep.after;
        if rep.fallback {
            warn!(day = rep.day, value = rep.after, "no unflagged neighbours; value kept");
        } else {
            info!(
                day = rep.day,
                before = rep.before,
                after = rep.after,
                z = rep.z_score,
                admitted = rep.admitted,
                "outlier replaced"
            );
        }
    }

    planned
}

fn admitted_values(records: &[DayRecord], i: usize, radius: usize) -> Vec<f64> {
    let lo = i.saturating_sub(radius);
    let hi = i.saturating_add(radius).min(records.len().saturating_sub(1));
    records[lo..=hi]
        .iter()
        .filter(|r| !r.is_outlier)
        .map(|r| r.consumption)
        .collect()
}

/// Aggregate the admitted values; `None` when there are none.
pub fn aggregate_values(values: &[f64], aggregate: WindowAggregate) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    match aggregate {
        WindowAggregate::Mean => Some(values.iter().sum::<f64>() / values.len() as f64),
        WindowAggregate::Median => {
            let mut sorted = values.to_vec();
            sorted.sort_by(f64::total_cmp);
            let mid = sorted.len() / 2;
            if sorted.len() % 2 == 0 {
                Some((sorted[mid - 1] + sorted[mid]) / 2.0)
            } else {
                Some(sorted[mid])
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flagged(values: &[f64], flags: &[usize]) -> Vec<DayRecord> {
        values
            .iter()
            .enumerate()
            .map(|(i, &v)| {
                let mut r = DayRecord::with_consumption(i as u32 + 1, v);
                r.is_outlier = flags.contains(&i);
                r
            })
            .collect()
    }

    #[test]
    fn spike_is_replaced_by_mean_of_window() {
        let mut r = flagged(&[10.0, 10.0, 10.0, 10.0, 100.0, 10.0, 10.0], &[4]);
        let reps = replace_records(&mut r, WINDOW_RADIUS, WindowAggregate::Mean);
        assert_eq!(reps.len(), 1);
        assert_eq!(reps[0].admitted, 4);
        assert!(!reps[0].fallback);
        assert!((r[4].consumption - 10.0).abs() < 1e-12);
    }

    #[test]
    fn window_is_clipped_at_series_start() {
        let mut r = flagged(&[90.0, 2.0, 4.0, 100.0], &[0]);
        let reps = replace_records(&mut r, WINDOW_RADIUS, WindowAggregate::Mean);
        assert_eq!(reps[0].admitted, 2);
        assert!((r[0].consumption - 3.0).abs() < 1e-12);
    }

    #[test]
    fn flagged_neighbours_are_excluded() {
        let mut r = flagged(&[1.0, 50.0, 60.0, 3.0, 5.0], &[1, 2]);
        replace_records(&mut r, WINDOW_RADIUS, WindowAggregate::Mean);
        // day 2 window: days 1,4 (day 3 flagged) -> (1 + 3) / 2
        assert!((r[1].consumption - 2.0).abs() < 1e-12);
        // day 3 window: days 1,4,5 -> (1 + 3 + 5) / 3; day 2's new value is not used
        assert!((r[2].consumption - 3.0).abs() < 1e-12);
    }

    #[test]
    fn boundary_with_all_neighbours_flagged_keeps_own_value() {
        let mut r = flagged(&[70.0, 80.0, 90.0, 5.0, 5.0, 5.0], &[0, 1, 2]);
        let reps = replace_records(&mut r, WINDOW_RADIUS, WindowAggregate::Mean);
        assert!(reps[0].fallback);
        assert_eq!(r[0].consumption, 70.0);

        let mut r = flagged(&[5.0, 5.0, 5.0, 70.0, 80.0, 90.0], &[3, 4, 5]);
        let reps = replace_records(&mut r, WINDOW_RADIUS, WindowAggregate::Mean);
        let last = reps.last().unwrap();
        assert_eq!(last.day, 6);
        assert!(last.fallback);
        assert_eq!(r[5].consumption, 90.0);
        assert!(r.iter().all(|x| x.consumption.is_finite()));
    }

    #[test]
    fn single_flagged_record_falls_back_to_itself() {
        let mut r = flagged(&[12.0], &[0]);
        let reps = replace_records(&mut r, WINDOW_RADIUS, WindowAggregate::Median);
        assert!(reps[0].fallback);
        assert_eq!(r[0].consumption, 12.0);
    }

    #[test]
    fn huge_radius_spans_whole_series() {
        let mut r = flagged(&[1.0, 2.0, 3.0, 400.0, 5.0], &[3]);
        let reps = replace_records(&mut r, usize::MAX, WindowAggregate::Mean);
        assert_eq!(reps[0].admitted, 4);
        assert!((r[3].consumption - 2.75).abs() < 1e-12);
    }

    #[test]
    fn median_aggregate_uses_order_statistic() {
        let mut r = flagged(&[1.0, 2.0, 500.0, 9.0, 30.0], &[2]);
        replace_records(&mut r, WINDOW_RADIUS, WindowAggregate::Median);
        // admitted [1, 2, 9, 30] -> (2 + 9) / 2
        assert!((r[2].consumption - 5.5).abs() < 1e-12);
    }

    #[test]
    fn aggregate_of_nothing_is_none() {
        assert_eq!(aggregate_values(&[], WindowAggregate::Mean), None);
        assert_eq!(aggregate_values(&[3.0, 1.0, 2.0], WindowAggregate::Median), Some(2.0));
    }
}
