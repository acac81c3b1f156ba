//! The cleaning pipeline: impute -> detect -> replace.
//!
//! The order is fixed. Each stage consumes the series and returns it under the
//! next stage marker, so a `RecordSeries<Cleaned>` can only come out of this
//! sequence.

use tracing::info;

use crate::clean::imputer::{self, ImputeReport};
use crate::clean::outlier::{self, Distribution};
use crate::clean::window::{self, Replacement};
use crate::domain::{CleanConfig, Cleaned, Raw, RecordSeries};

/// Everything one cleaning run produced.
#[derive(Debug, Clone)]
pub struct CleanRun {
    pub series: RecordSeries<Cleaned>,
    pub imputations: ImputeReport,
    pub distribution: Distribution,
    pub replacements: Vec<Replacement>,
}

#[derive(Debug, Clone)]
pub enum CleanOutcome {
    /// The series had no records; no stage ran.
    Empty,
    Cleaned(CleanRun),
}

impl CleanOutcome {
    pub fn into_run(self) -> Option<CleanRun> {
        match self {
            CleanOutcome::Empty => None,
            CleanOutcome::Cleaned(run) => Some(run),
        }
    }
}

/// Run the three cleaning stages on a raw series.
pub fn clean(series: RecordSeries<Raw>, config: &CleanConfig) -> CleanOutcome {
    if series.is_empty() {
        info!("empty series; cleaning skipped");
        return CleanOutcome::Empty;
    }

    let (series, imputations) = imputer::repair(series, &config.impute);
    let (series, distribution) = outlier::detect(series, config.z_threshold);
    let (series, replacements) = window::replace(series, config.window_radius, config.aggregate);

    info!(
        n = series.len(),
        repaired = imputations.repairs.len(),
        mean = distribution.mean,
        std_dev = distribution.std_dev,
        outliers = distribution.outliers,
        "series cleaned"
    );

    CleanOutcome::Cleaned(CleanRun {
        series,
        imputations,
        distribution,
        replacements,
    })
}
