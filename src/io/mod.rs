//! Input/output helpers.
//!
//! - CSV ingest + validation (`ingest`)
//! - per-day result export and input-layout writer (`export`)
//! - JSON run summary (`summary`)

pub mod export;
pub mod ingest;
pub mod summary;

pub use export::*;
pub use ingest::*;
pub use summary::*;
