//! demoapp-probe CLI
//!
//! ## Usage
//!
//! ```bash
//! demoapp-probe env-check --json              # Android SDK and adb report
//! demoapp-probe detect-endpoint -s URL        # Appium 1 or 2 command path
//! demoapp-probe capabilities --device pixel   # Session capabilities
//! demoapp-probe run features/                 # Run the Gherkin scenarios
//! ```

use clap::Parser;
use demoapp_probe::{logging, SessionConfig};
use demoapp_probe_cli::{handlers, Cli, CliConfig, CliResult, Commands, Reporter};
use std::process::ExitCode;

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> CliResult<()> {
    let cli = Cli::parse();

    let config = CliConfig::new()
        .with_flags(cli.verbose, cli.quiet)
        .with_color(cli.color.clone().into());
    let _ = logging::init(config.log_filter());
    let reporter = Reporter::new(config.color.should_color(), config.verbosity.is_quiet());

    match cli.command {
        Commands::EnvCheck(args) => handlers::env_check(&args, &reporter),
        Commands::DetectEndpoint(args) => {
            let session = SessionConfig::load(cli.config.as_deref())?;
            handlers::detect_endpoint(&session, &args, &reporter)
        }
        Commands::Capabilities(args) => {
            let session = SessionConfig::load(cli.config.as_deref())?;
            handlers::capabilities(session, &args)
        }
        Commands::Run(args) => {
            let session = SessionConfig::load(cli.config.as_deref())?;
            handlers::run_features(session, &args, &reporter)
        }
    }
}
