//! Scout Runner
//!
//! Command-line front end for the scout simulation:
//!
//! - **Config**: JSON configuration with embedded defaults
//! - **Reports**: single run, policy comparison and choice-probability curves
//! - **CLI**: argument parsing for the `scout` binary

pub mod cli;
pub mod config;
pub mod report;

pub use cli::{Args, Command};
pub use config::{ConfigError, load_config, load_config_from_str, load_default_config};
pub use report::{ComparisonReport, CurvesReport, PolicyCurves, RunReport};
