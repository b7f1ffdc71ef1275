//! Session bootstrap seam.
//!
//! Opening the app touches the host (Android SDK, adb), the network (Appium
//! status probes) and a real device. [`SessionLauncher`] bundles those three
//! effects so step logic can run against a scripted launcher in unit tests.

use crate::driver::SharedDriver;
use crate::endpoint;
use crate::environment::{self, EnvironmentReport};
use crate::result::ProbeResult;
use crate::webdriver::AppiumDriver;
use async_trait::async_trait;
use serde_json::{Map, Value};
use std::sync::Arc;
use std::time::Duration;

/// Host checks, endpoint resolution and session creation
#[async_trait]
pub trait SessionLauncher: Send + Sync {
    /// Check the Android toolchain
    fn check_environment(&self) -> EnvironmentReport;

    /// Resolve the command endpoint for `base_url`
    async fn probe_endpoint(&self, base_url: &str, timeout: Duration) -> String;

    /// Open an automation session
    async fn launch(
        &self,
        endpoint: &str,
        capabilities: Map<String, Value>,
    ) -> ProbeResult<SharedDriver>;
}

/// Launcher backed by the local host and a remote Appium server
#[derive(Debug, Clone, Copy, Default)]
pub struct AppiumLauncher;

#[async_trait]
impl SessionLauncher for AppiumLauncher {
    fn check_environment(&self) -> EnvironmentReport {
        environment::check_android_environment()
    }

    async fn probe_endpoint(&self, base_url: &str, timeout: Duration) -> String {
        endpoint::detect_appium_endpoint(base_url, timeout).await
    }

    async fn launch(
        &self,
        endpoint: &str,
        capabilities: Map<String, Value>,
    ) -> ProbeResult<SharedDriver> {
        let driver = AppiumDriver::start(endpoint, capabilities).await?;
        Ok(Arc::new(driver))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_appium_launcher_probes_and_starts_session() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/status"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "value": { "ready": true }
            })))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/session"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "value": { "sessionId": "abc123", "capabilities": {} }
            })))
            .mount(&server)
            .await;

        let launcher = AppiumLauncher;
        let endpoint = launcher
            .probe_endpoint(&server.uri(), Duration::from_secs(1))
            .await;
        assert_eq!(endpoint, server.uri());

        let driver = launcher.launch(&endpoint, Map::new()).await;
        assert!(driver.is_ok());
    }
}
