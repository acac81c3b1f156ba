//! `energy-series` library crate.
//!
//! The binary (`energy`) is a thin wrapper around this library so that:
//!
//! - the cleaning stages are testable without spawning processes
//! - the typed series and stages are reusable outside the CLI
//!
//! Cleaning order is impute -> detect -> replace (see `clean::pipeline`).

pub mod analysis;
pub mod app;
pub mod clean;
pub mod cli;
pub mod data;
pub mod domain;
pub mod error;
pub mod forecast;
pub mod io;
pub mod logging;
pub mod math;
pub mod plot;
pub mod report;
