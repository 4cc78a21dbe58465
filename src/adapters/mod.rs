//! Concrete adapter implementations for ports.

pub mod column_alias;
pub mod csv_adapter;
pub mod file_config_adapter;
pub mod json_chart_adapter;
pub mod json_sink;
pub mod options_file;
pub mod ticker;
