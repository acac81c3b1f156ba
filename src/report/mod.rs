//! Terminal reporting for a run.
//!
//! `format` renders; this module holds small derived views the renderer needs.

pub mod format;

pub use format::*;

use crate::clean::{ImputeReport, RepairKind};
use crate::domain::Field;

/// Per-field repair counts, in report order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RepairCounts {
    pub negative: usize,
    pub near_zero: usize,
    pub missing: usize,
}

impl RepairCounts {
    pub fn of(report: &ImputeReport, field: Field) -> Self {
        Self {
            negative: report.count(field, RepairKind::Negative),
            near_zero: report.count(field, RepairKind::NearZero),
            missing: report.count(field, RepairKind::Missing),
        }
    }

    pub fn total(&self) -> usize {
        self.negative + self.near_zero + self.missing
    }
}

/// Rough verbal strength of a Pearson coefficient.
pub fn correlation_strength(r: f64) -> &'static str {
    match r.abs() {
        a if a >= 0.7 => "strong",
        a if a >= 0.4 => "moderate",
        a if a >= 0.2 => "weak",
        _ => "negligible",
    }
}
