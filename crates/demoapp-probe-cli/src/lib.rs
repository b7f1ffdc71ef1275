//! demoapp-probe CLI library
//!
//! Command-line front end for the My Demo App scenarios: host checks,
//! Appium endpoint discovery, capability preview and the Gherkin runner.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]

mod commands;
mod config;
mod error;
pub mod handlers;
mod output;

pub use commands::{
    CapabilitiesArgs, Cli, ColorArg, Commands, DetectEndpointArgs, EnvCheckArgs, RunArgs,
};
pub use config::{CliConfig, ColorChoice, Verbosity};
pub use error::{CliError, CliResult};
pub use output::Reporter;
