//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - day records and the typed field selector (`DayRecord`, `Field`)
//! - the stage-tagged series (`RecordSeries<Raw|Imputed|Flagged|Cleaned>`)
//! - run configuration (`CleanConfig`, `RunConfig`, input conventions)

pub mod series;
pub mod types;

pub use series::*;
pub use types::*;
