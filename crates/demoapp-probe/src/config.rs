//! Session configuration.
//!
//! Values come from built-in defaults, then an optional YAML file, then
//! environment variables (`APPIUM_SERVER`, `DEVICE_NAME`, `APP_PATH`,
//! `LAUNCH_PACKAGE`, `LAUNCH_ACTIVITY`, `HOME_WAIT_SECONDS`, `ARTIFACTS_DIR`,
//! `PROBE_TIMEOUT_MS`). Later sources win.

use crate::artifacts::DEFAULT_ARTIFACTS_DIR;
use crate::result::{ProbeError, ProbeResult};
use crate::wait::WaitOptions;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default Appium server URL
pub const DEFAULT_APPIUM_SERVER: &str = "http://localhost:4723";

/// Default device name
pub const DEFAULT_DEVICE_NAME: &str = "emulator-5554";

/// Default APK path
pub const DEFAULT_APP_PATH: &str = "resources/mda-2.2.0-25.apk";

/// Settings for opening a session and running scenarios
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Appium server base URL
    pub appium_server: String,
    /// Emulator or device name
    pub device_name: String,
    /// APK path passed as the `app` capability
    pub app_path: String,
    /// Explicit package to launch
    pub launch_package: Option<String>,
    /// Explicit activity to launch
    pub launch_activity: Option<String>,
    /// Seconds to wait for the home screen after login
    pub home_wait_seconds: u64,
    /// Directory for screenshots and page dumps
    pub artifacts_dir: PathBuf,
    /// Timeout of each endpoint status probe
    pub probe_timeout_ms: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            appium_server: DEFAULT_APPIUM_SERVER.to_string(),
            device_name: DEFAULT_DEVICE_NAME.to_string(),
            app_path: DEFAULT_APP_PATH.to_string(),
            launch_package: None,
            launch_activity: None,
            home_wait_seconds: 10,
            artifacts_dir: PathBuf::from(DEFAULT_ARTIFACTS_DIR),
            probe_timeout_ms: 2000,
        }
    }
}

impl SessionConfig {
    /// Create new config with defaults
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Defaults overridden by the process environment
    pub fn from_env() -> ProbeResult<Self> {
        Self::default().with_env(|name| std::env::var(name).ok())
    }

    /// Defaults, then `path` (if any), then the process environment
    pub fn load(path: Option<&Path>) -> ProbeResult<Self> {
        let base = match path {
            Some(path) => Self::from_yaml_file(path)?,
            None => Self::default(),
        };
        base.with_env(|name| std::env::var(name).ok())
    }

    /// Read a YAML file; missing keys keep their defaults
    pub fn from_yaml_file(path: &Path) -> ProbeResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_yaml(&text)
    }

    /// Parse YAML text; missing keys keep their defaults
    pub fn from_yaml(text: &str) -> ProbeResult<Self> {
        Ok(serde_yaml_ng::from_str(text)?)
    }

    /// Apply overrides from a variable lookup. Empty values count as unset.
    pub fn with_env(mut self, var: impl Fn(&str) -> Option<String>) -> ProbeResult<Self> {
        let get = |name: &str| var(name).filter(|v| !v.trim().is_empty());
        if let Some(v) = get("APPIUM_SERVER") {
            self.appium_server = v;
        }
        if let Some(v) = get("DEVICE_NAME") {
            self.device_name = v;
        }
        if let Some(v) = get("APP_PATH") {
            self.app_path = v;
        }
        if let Some(v) = get("LAUNCH_PACKAGE") {
            self.launch_package = Some(v);
        }
        if let Some(v) = get("LAUNCH_ACTIVITY") {
            self.launch_activity = Some(v);
        }
        if let Some(v) = get("HOME_WAIT_SECONDS") {
            self.home_wait_seconds = parse_number("HOME_WAIT_SECONDS", &v)?;
        }
        if let Some(v) = get("ARTIFACTS_DIR") {
            self.artifacts_dir = PathBuf::from(v);
        }
        if let Some(v) = get("PROBE_TIMEOUT_MS") {
            self.probe_timeout_ms = parse_number("PROBE_TIMEOUT_MS", &v)?;
        }
        Ok(self)
    }

    /// Set the Appium server URL
    #[must_use]
    pub fn with_server(mut self, url: impl Into<String>) -> Self {
        self.appium_server = url.into();
        self
    }

    /// Set the launch activity
    #[must_use]
    pub fn with_launch_activity(mut self, activity: impl Into<String>) -> Self {
        self.launch_activity = Some(activity.into());
        self
    }

    /// Set the launch package
    #[must_use]
    pub fn with_launch_package(mut self, package: impl Into<String>) -> Self {
        self.launch_package = Some(package.into());
        self
    }

    /// Set the artifacts directory
    #[must_use]
    pub fn with_artifacts_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.artifacts_dir = dir.into();
        self
    }

    /// Endpoint probe timeout
    #[must_use]
    pub const fn probe_timeout(&self) -> Duration {
        Duration::from_millis(self.probe_timeout_ms)
    }

    /// Wait used for the home screen check
    #[must_use]
    pub const fn home_wait(&self) -> WaitOptions {
        WaitOptions::seconds(self.home_wait_seconds)
    }

    /// W3C capabilities for a UiAutomator2 session
    #[must_use]
    pub fn capabilities(&self) -> Map<String, Value> {
        let mut caps = Map::new();
        let _ = caps.insert("platformName".into(), json!("Android"));
        let _ = caps.insert("appium:deviceName".into(), json!(self.device_name));
        let _ = caps.insert("appium:app".into(), json!(self.app_path));
        let _ = caps.insert("appium:automationName".into(), json!("UiAutomator2"));
        if let Some(package) = &self.launch_package {
            let _ = caps.insert("appium:appPackage".into(), json!(package));
        }
        if let Some(activity) = &self.launch_activity {
            let _ = caps.insert("appium:appActivity".into(), json!(activity));
            let _ = caps.insert(
                "appium:appWaitActivity".into(),
                json!(format!("{activity},*")),
            );
        }
        caps
    }
}

fn parse_number(name: &str, value: &str) -> ProbeResult<u64> {
    value
        .trim()
        .parse()
        .map_err(|_| ProbeError::config(format!("{name} must be a whole number, got '{value}'")))
}
