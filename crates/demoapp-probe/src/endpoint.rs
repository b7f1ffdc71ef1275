//! Appium endpoint detection.
//!
//! Appium 2 serves commands at the server root while Appium 1 (and many CI
//! images) still mount them under `/wd/hub`. The right command executor is
//! whichever answers `GET <candidate>/status` with HTTP 200.

use std::time::Duration;
use tracing::{debug, info, warn};

/// Default per-candidate probe timeout
pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_secs(2);

/// Legacy command path suffix
pub const WD_HUB: &str = "/wd/hub";

/// Candidate command endpoints for `base_url`, in probe order
#[must_use]
pub fn candidates(base_url: &str) -> [String; 2] {
    let base = base_url.trim_end_matches('/');
    [base.to_string(), format!("{base}{WD_HUB}")]
}

/// Resolve the command endpoint for an Appium server.
///
/// Returns the first candidate whose `/status` answers 200. When none does,
/// the trimmed base URL is returned so the session request surfaces the real
/// connection error.
pub async fn detect_appium_endpoint(base_url: &str, timeout: Duration) -> String {
    let client = match reqwest::Client::builder().timeout(timeout).build() {
        Ok(client) => client,
        Err(e) => {
            warn!(error = %e, "could not build probe client");
            return base_url.trim_end_matches('/').to_string();
        }
    };
    detect_with_client(&client, base_url).await
}

/// [`detect_appium_endpoint`] with a caller-provided HTTP client
pub async fn detect_with_client(client: &reqwest::Client, base_url: &str) -> String {
    let [base, hub] = candidates(base_url);
    for candidate in [&base, &hub] {
        let status_url = format!("{candidate}/status");
        match client.get(&status_url).send().await {
            Ok(resp) if resp.status() == reqwest::StatusCode::OK => {
                info!(endpoint = %candidate, "Appium endpoint detected");
                return candidate.clone();
            }
            Ok(resp) => debug!(url = %status_url, status = %resp.status(), "status probe rejected"),
            Err(e) => debug!(url = %status_url, error = %e, "status probe failed"),
        }
    }
    warn!(%base, "no Appium status endpoint answered; using base URL");
    base
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn status_ok() -> ResponseTemplate {
        ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "value": { "ready": true, "message": "The server is ready to accept new connections" }
        }))
    }

    #[test]
    fn test_candidates_strip_trailing_slash() {
        let [base, hub] = candidates("http://localhost:4723/");
        assert_eq!(base, "http://localhost:4723");
        assert_eq!(hub, "http://localhost:4723/wd/hub");
    }

    #[tokio::test]
    async fn test_base_status_ok_returns_base() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/status"))
            .respond_with(status_ok())
            .mount(&server)
            .await;

        let endpoint = detect_appium_endpoint(&server.uri(), DEFAULT_PROBE_TIMEOUT).await;
        assert_eq!(endpoint, server.uri());
    }

    #[tokio::test]
    async fn test_only_wd_hub_status_ok_returns_wd_hub() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/status"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/wd/hub/status"))
            .respond_with(status_ok())
            .mount(&server)
            .await;

        let endpoint = detect_appium_endpoint(&format!("{}/", server.uri()), DEFAULT_PROBE_TIMEOUT).await;
        assert_eq!(endpoint, format!("{}/wd/hub", server.uri()));
    }

    #[tokio::test]
    async fn test_nothing_answers_returns_trimmed_base() {
        let server = MockServer::start().await;
        let endpoint = detect_appium_endpoint(&format!("{}/", server.uri()), DEFAULT_PROBE_TIMEOUT).await;
        assert_eq!(endpoint, server.uri());
    }

    #[tokio::test]
    async fn test_unreachable_server_returns_base() {
        // port 9 (discard) is not expected to run an HTTP server
        let endpoint =
            detect_appium_endpoint("http://127.0.0.1:9", Duration::from_millis(200)).await;
        assert_eq!(endpoint, "http://127.0.0.1:9");
    }
}
