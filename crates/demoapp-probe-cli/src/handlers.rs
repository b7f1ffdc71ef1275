//! Subcommand implementations

use crate::commands::{CapabilitiesArgs, DetectEndpointArgs, EnvCheckArgs, RunArgs};
use crate::error::{CliError, CliResult};
use crate::output::Reporter;
use demoapp_probe::{endpoint, EnvironmentReport, ProbeError, SessionConfig};
use serde_json::Value;
use std::fmt::Write as _;
use std::time::Duration;

/// `env-check`: print the Android toolchain report; fails when not ready
pub fn env_check(args: &EnvCheckArgs, reporter: &Reporter) -> CliResult<()> {
    let report = demoapp_probe::check_android_environment();
    println!("{}", render_env_report(&report, args.json)?);
    if report.ok {
        reporter.success("Android environment ready");
        Ok(())
    } else {
        reporter.failure("Android environment not ready");
        Err(ProbeError::EnvironmentNotReady {
            notes: report.notes,
        }
        .into())
    }
}

/// Text or JSON rendering of an environment report
pub fn render_env_report(report: &EnvironmentReport, json: bool) -> CliResult<String> {
    if json {
        return Ok(serde_json::to_string_pretty(report)?);
    }
    let or_dash = |s: &str| if s.is_empty() { "-".to_string() } else { s.to_string() };
    let mut out = String::new();
    let _ = writeln!(out, "ready:       {}", report.ok);
    let _ = writeln!(out, "sdk root:    {}", or_dash(report.sdk_root()));
    let _ = writeln!(out, "adb:         {}", or_dash(&report.adb_path));
    let _ = writeln!(out, "adb version: {}", or_dash(&report.adb_version));
    let _ = write!(out, "notes:       {}", report.notes.trim_end());
    Ok(out)
}

/// `detect-endpoint`: print the command endpoint that answered `/status`
pub fn detect_endpoint(
    session: &SessionConfig,
    args: &DetectEndpointArgs,
    reporter: &Reporter,
) -> CliResult<()> {
    let base = args
        .server
        .clone()
        .unwrap_or_else(|| session.appium_server.clone());
    let timeout = args
        .timeout_ms
        .map_or_else(|| session.probe_timeout(), Duration::from_millis);

    let rt = tokio::runtime::Runtime::new()?;
    let spinner = reporter.spinner(&format!("Probing {base}"));
    let found = rt.block_on(endpoint::detect_appium_endpoint(&base, timeout));
    if let Some(pb) = spinner {
        pb.finish_and_clear();
    }
    println!("{found}");
    Ok(())
}

/// `capabilities`: print the capabilities a session would be opened with
pub fn capabilities(session: SessionConfig, args: &CapabilitiesArgs) -> CliResult<()> {
    println!("{}", render_capabilities(session, args)?);
    Ok(())
}

/// Pretty JSON of the capabilities after command-line overrides
pub fn render_capabilities(
    mut session: SessionConfig,
    args: &CapabilitiesArgs,
) -> CliResult<String> {
    if let Some(device) = &args.device {
        session.device_name.clone_from(device);
    }
    if let Some(app) = &args.app {
        session.app_path.clone_from(app);
    }
    Ok(serde_json::to_string_pretty(&Value::Object(
        session.capabilities(),
    ))?)
}

/// `run`: execute every scenario under the features directory
#[cfg(feature = "bdd")]
pub fn run_features(
    mut session: SessionConfig,
    args: &RunArgs,
    reporter: &Reporter,
) -> CliResult<()> {
    if !args.features.is_dir() {
        return Err(CliError::invalid_argument(format!(
            "features directory '{}' does not exist",
            args.features.display()
        )));
    }
    if let Some(server) = &args.server {
        session.appium_server.clone_from(server);
    }

    let rt = tokio::runtime::Runtime::new()?;
    let passed = rt.block_on(demoapp_probe::bdd::run(&args.features, session));
    if passed {
        reporter.success("All scenarios passed");
        Ok(())
    } else {
        reporter.failure("Some scenarios failed");
        Err(CliError::test_execution("one or more scenarios failed"))
    }
}

/// `run` without the Gherkin runner compiled in
#[cfg(not(feature = "bdd"))]
pub fn run_features(
    _session: SessionConfig,
    _args: &RunArgs,
    _reporter: &Reporter,
) -> CliResult<()> {
    Err(CliError::FeatureDisabled {
        command: "run",
        feature: "bdd",
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    mod env_tests {
        use super::*;

        fn report(ok: bool) -> EnvironmentReport {
            EnvironmentReport {
                ok,
                android_home: "/opt/android".to_string(),
                adb_path: if ok { "/opt/android/platform-tools/adb".to_string() } else { String::new() },
                notes: "Android SDK found at /opt/android. adb not found on PATH. ".to_string(),
                ..EnvironmentReport::default()
            }
        }

        #[test]
        fn test_text_report() {
            let text = render_env_report(&report(false), false).unwrap();
            assert!(text.contains("ready:       false"));
            assert!(text.contains("sdk root:    /opt/android"));
            assert!(text.contains("adb:         -"));
            assert!(text.ends_with("adb not found on PATH."));
        }

        #[test]
        fn test_json_report() {
            let json = render_env_report(&report(true), true).unwrap();
            let value: Value = serde_json::from_str(&json).unwrap();
            assert_eq!(value["ok"], true);
            assert_eq!(value["android_home"], "/opt/android");
        }
    }

    mod capability_tests {
        use super::*;

        #[test]
        fn test_overrides_applied() {
            let args = CapabilitiesArgs {
                device: Some("pixel-7".to_string()),
                app: Some("/tmp/mda.apk".to_string()),
            };
            let json = render_capabilities(SessionConfig::default(), &args).unwrap();
            let value: Value = serde_json::from_str(&json).unwrap();
            assert_eq!(value["appium:deviceName"], "pixel-7");
            assert_eq!(value["appium:app"], "/tmp/mda.apk");
            assert_eq!(value["appium:automationName"], "UiAutomator2");
        }

        #[test]
        fn test_defaults_without_overrides() {
            let args = CapabilitiesArgs {
                device: None,
                app: None,
            };
            let json = render_capabilities(SessionConfig::default(), &args).unwrap();
            assert!(json.contains(demoapp_probe::DEFAULT_DEVICE_NAME));
        }
    }

    #[cfg(feature = "bdd")]
    #[test]
    fn test_run_rejects_missing_features_dir() {
        let args = RunArgs {
            features: std::path::PathBuf::from("/definitely/not/here"),
            server: None,
        };
        let err = run_features(SessionConfig::default(), &args, &Reporter::new(false, true))
            .unwrap_err();
        assert!(matches!(err, CliError::InvalidArgument { .. }));
    }
}
