//! Data cleaning.
//!
//! Responsibilities:
//!
//! - repair negative and missing readings (`imputer`)
//! - flag consumption outliers by global z-score (`outlier`)
//! - rebuild flagged values from their unflagged neighbours (`window`)
//! - run the three in order (`pipeline`)

pub mod imputer;
pub mod outlier;
pub mod pipeline;
pub mod window;

pub use imputer::{ImputeReport, Repair, RepairKind};
pub use outlier::Distribution;
pub use pipeline::{clean, CleanOutcome, CleanRun};
pub use window::Replacement;
