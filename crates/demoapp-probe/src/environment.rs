//! Android toolchain check.
//!
//! Appium's UiAutomator2 driver needs the Android SDK and `adb`. Checking them
//! up front turns an opaque session-creation failure into a readable note.

use serde::Serialize;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::time::{Duration, Instant};

/// Upper bound for `adb version`; a wedged adb server must not hang the check
pub const ADB_VERSION_TIMEOUT: Duration = Duration::from_secs(5);

const CHILD_POLL_INTERVAL: Duration = Duration::from_millis(20);

/// Result of the Android environment check
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct EnvironmentReport {
    /// SDK root exists and adb is resolvable
    pub ok: bool,
    /// `ANDROID_SDK_ROOT` value (empty when unset)
    pub android_sdk_root: String,
    /// `ANDROID_HOME` value (empty when unset)
    pub android_home: String,
    /// Resolved adb path (empty when not found)
    pub adb_path: String,
    /// First line of `adb version`
    pub adb_version: String,
    /// Human readable findings
    pub notes: String,
}

impl EnvironmentReport {
    /// SDK root in use: `ANDROID_SDK_ROOT`, else `ANDROID_HOME`
    #[must_use]
    pub fn sdk_root(&self) -> &str {
        if self.android_sdk_root.is_empty() {
            &self.android_home
        } else {
            &self.android_sdk_root
        }
    }
}

/// Check the process environment and `PATH`
#[must_use]
pub fn check_android_environment() -> EnvironmentReport {
    check_android_environment_with(
        |name| std::env::var(name).ok(),
        || which::which("adb").ok(),
        adb_version,
    )
}

/// Environment check with injectable lookups.
///
/// `var` reads environment variables, `find_adb` resolves the adb binary and
/// `version` runs it.
pub fn check_android_environment_with(
    var: impl Fn(&str) -> Option<String>,
    find_adb: impl FnOnce() -> Option<PathBuf>,
    version: impl FnOnce(&Path) -> Result<String, String>,
) -> EnvironmentReport {
    let mut report = EnvironmentReport {
        android_sdk_root: var("ANDROID_SDK_ROOT").unwrap_or_default(),
        android_home: var("ANDROID_HOME").unwrap_or_default(),
        ..EnvironmentReport::default()
    };

    let sdk_root = report.sdk_root().to_string();
    let sdk_exists = !sdk_root.is_empty() && Path::new(&sdk_root).is_dir();
    if sdk_root.is_empty() {
        report
            .notes
            .push_str("Neither ANDROID_SDK_ROOT nor ANDROID_HOME is set. ");
    } else if sdk_exists {
        report
            .notes
            .push_str(&format!("Android SDK found at {sdk_root}. "));
    } else {
        report
            .notes
            .push_str(&format!("Android SDK path '{sdk_root}' does not exist. "));
    }

    let adb = find_adb();
    match &adb {
        Some(path) => {
            report.adb_path = path.display().to_string();
            match version(path) {
                Ok(v) => {
                    report.adb_version = v;
                    report.notes.push_str("adb found. ");
                }
                Err(e) => report
                    .notes
                    .push_str(&format!("Error running 'adb version': {e}. ")),
            }
        }
        None => report.notes.push_str("adb not found on PATH. "),
    }

    report.ok = sdk_exists && adb.is_some();
    tracing::debug!(ok = report.ok, notes = %report.notes, "android environment checked");
    report
}

/// First stdout line of `adb version`
fn adb_version(adb: &Path) -> Result<String, String> {
    let mut cmd = Command::new(adb);
    let _ = cmd.arg("version");
    first_line_within(cmd, ADB_VERSION_TIMEOUT)
}

/// Run `cmd` and return its first stdout line, killing it after `timeout`
fn first_line_within(mut cmd: Command, timeout: Duration) -> Result<String, String> {
    let mut child = cmd
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .map_err(|e| e.to_string())?;

    let started = Instant::now();
    while child.try_wait().map_err(|e| e.to_string())?.is_none() {
        if started.elapsed() >= timeout {
            let _ = child.kill();
            let _ = child.wait();
            tracing::warn!(timeout_ms = timeout.as_millis(), "child process killed after timeout");
            return Err(format!("timed out after {}ms", timeout.as_millis()));
        }
        std::thread::sleep(CHILD_POLL_INTERVAL);
    }

    let output = child.wait_with_output().map_err(|e| e.to_string())?;
    Ok(String::from_utf8_lossy(&output.stdout)
        .lines()
        .next()
        .unwrap_or_default()
        .trim()
        .to_string())
}
