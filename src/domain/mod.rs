//! Core domain types and logic.

pub mod bar;
pub mod engine_config;
pub mod error;
pub mod fleet;
pub mod market_summary;
pub mod metric;
pub mod options;
pub mod portfolio;
pub mod signal;
pub mod stats;
pub mod telemetry;
pub mod visual;
