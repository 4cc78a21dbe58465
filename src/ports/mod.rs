//! Port traits at the edges of the domain.

pub mod bar_source;
pub mod config_port;
pub mod telemetry_sink;
