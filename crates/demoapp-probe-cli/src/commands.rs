//! CLI command definitions using clap

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// demoapp-probe: Appium scenarios for the My Demo App Android catalog
#[derive(Parser, Debug)]
#[command(name = "demoapp-probe")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode (suppress non-error output)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Color output (auto, always, never)
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorArg,

    /// YAML session config; environment variables override it
    #[arg(short, long, global = true, env = "DEMOAPP_PROBE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Subcommand to run
    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Check the Android SDK and adb
    EnvCheck(EnvCheckArgs),

    /// Find the Appium command endpoint
    DetectEndpoint(DetectEndpointArgs),

    /// Print the session capabilities
    Capabilities(CapabilitiesArgs),

    /// Run the Gherkin scenarios against a device
    Run(RunArgs),
}

/// Arguments for the env-check command
#[derive(Parser, Debug)]
pub struct EnvCheckArgs {
    /// Print the report as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the detect-endpoint command
#[derive(Parser, Debug)]
pub struct DetectEndpointArgs {
    /// Appium server base URL (defaults to the configured server)
    #[arg(short, long)]
    pub server: Option<String>,

    /// Per-probe timeout in milliseconds
    #[arg(long)]
    pub timeout_ms: Option<u64>,
}

/// Arguments for the capabilities command
#[derive(Parser, Debug)]
pub struct CapabilitiesArgs {
    /// Device name override
    #[arg(long)]
    pub device: Option<String>,

    /// APK path override
    #[arg(long)]
    pub app: Option<String>,
}

/// Arguments for the run command
#[derive(Parser, Debug)]
pub struct RunArgs {
    /// Directory containing .feature files
    #[arg(default_value = "features")]
    pub features: PathBuf,

    /// Appium server base URL override
    #[arg(short, long)]
    pub server: Option<String>,
}

/// Color argument
#[derive(ValueEnum, Clone, Debug, Default)]
pub enum ColorArg {
    /// Detect terminal
    #[default]
    Auto,
    /// Always color
    Always,
    /// Never color
    Never,
}

impl From<ColorArg> for crate::config::ColorChoice {
    fn from(arg: ColorArg) -> Self {
        match arg {
            ColorArg::Auto => Self::Auto,
            ColorArg::Always => Self::Always,
            ColorArg::Never => Self::Never,
        }
    }
}
