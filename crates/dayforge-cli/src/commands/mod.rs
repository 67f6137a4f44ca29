pub mod config;
pub mod plan;
pub mod session;
pub mod stats;

/// Errors surfaced to `main`, printed as `error: …`.
pub type CliResult<T = ()> = Result<T, Box<dyn std::error::Error>>;
