//! W3C WebDriver client for an Appium server.
//!
//! Speaks the JSON wire format directly over reqwest: every response is
//! `{"value": ...}`, errors are `{"value": {"error", "message"}}`, and element
//! references are objects keyed by the W3C element identifier.

use crate::driver::{ElementRef, MobileDriver, WindowSize};
use crate::locator::Locator;
use crate::result::{ProbeError, ProbeResult};
use async_trait::async_trait;
use base64::Engine;
use serde_json::{json, Map, Value};
use std::time::Duration;
use tracing::{debug, info};

/// W3C element reference key
pub const ELEMENT_KEY: &str = "element-6066-11e4-a52e-4f735466cecf";

/// Pre-W3C (JSONWP) element reference key, still emitted by some servers
const LEGACY_ELEMENT_KEY: &str = "ELEMENT";

/// Default HTTP timeout for driver commands (app install can be slow)
pub const DEFAULT_COMMAND_TIMEOUT: Duration = Duration::from_secs(300);

/// Appium session over HTTP
#[derive(Debug, Clone)]
pub struct AppiumDriver {
    client: reqwest::Client,
    endpoint: String,
    session_id: String,
}

impl AppiumDriver {
    /// Open a new session at `endpoint` with the given capabilities
    pub async fn start(endpoint: &str, capabilities: Map<String, Value>) -> ProbeResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(DEFAULT_COMMAND_TIMEOUT)
            .build()?;
        Self::start_with_client(client, endpoint, capabilities).await
    }

    /// Open a new session using a caller-provided HTTP client
    pub async fn start_with_client(
        client: reqwest::Client,
        endpoint: &str,
        capabilities: Map<String, Value>,
    ) -> ProbeResult<Self> {
        let endpoint = endpoint.trim_end_matches('/').to_string();
        let body = json!({
            "capabilities": {
                "alwaysMatch": capabilities,
                "firstMatch": [{}],
            }
        });
        info!(%endpoint, "creating Appium session");
        let value = send(client.post(format!("{endpoint}/session")).json(&body), "session").await?;
        let session_id = value
            .get("sessionId")
            .and_then(Value::as_str)
            .ok_or_else(|| malformed("new session response without sessionId"))?
            .to_string();
        info!(%session_id, "session created");
        Ok(Self {
            client,
            endpoint,
            session_id,
        })
    }

    /// Session id assigned by the server
    #[must_use]
    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// Command endpoint this session talks to
    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn url(&self, path: &str) -> String {
        format!("{}/session/{}{}", self.endpoint, self.session_id, path)
    }

    async fn get(&self, path: &str, subject: &str) -> ProbeResult<Value> {
        debug!(path, "GET");
        send(self.client.get(self.url(path)), subject).await
    }

    async fn post(&self, path: &str, body: Value, subject: &str) -> ProbeResult<Value> {
        debug!(path, "POST");
        send(self.client.post(self.url(path)).json(&body), subject).await
    }
}

async fn send(request: reqwest::RequestBuilder, subject: &str) -> ProbeResult<Value> {
    let response = request.send().await?;
    let status = response.status();
    let text = response.text().await?;
    let body: Value = if text.is_empty() {
        Value::Null
    } else {
        match serde_json::from_str(&text) {
            Ok(body) => body,
            // proxies and crashed servers answer with plain text or HTML
            Err(_) if !status.is_success() => {
                return Err(ProbeError::WebDriver {
                    status: status.as_u16(),
                    error: "unknown error".to_string(),
                    message: text,
                });
            }
            Err(e) => return Err(e.into()),
        }
    };
    let value = body.get("value").cloned().unwrap_or(Value::Null);
    if status.is_success() {
        return Ok(value);
    }
    Err(wire_error(status.as_u16(), &value, subject))
}

fn wire_error(status: u16, value: &Value, subject: &str) -> ProbeError {
    let error = value
        .get("error")
        .and_then(Value::as_str)
        .unwrap_or("unknown error");
    let message = value
        .get("message")
        .and_then(Value::as_str)
        .unwrap_or_default();
    match error {
        "no such element" => ProbeError::NoSuchElement {
            locator: subject.to_string(),
        },
        _ => ProbeError::WebDriver {
            status,
            error: error.to_string(),
            message: message.to_string(),
        },
    }
}

fn malformed(message: &str) -> ProbeError {
    ProbeError::WebDriver {
        status: 200,
        error: "malformed response".to_string(),
        message: message.to_string(),
    }
}

fn element_from(value: &Value) -> ProbeResult<ElementRef> {
    value
        .get(ELEMENT_KEY)
        .or_else(|| value.get(LEGACY_ELEMENT_KEY))
        .and_then(Value::as_str)
        .map(ElementRef::new)
        .ok_or_else(|| malformed("element reference missing"))
}

fn locator_body(locator: &Locator) -> Value {
    json!({ "using": locator.by.strategy(), "value": locator.value() })
}

fn as_bool(value: &Value) -> ProbeResult<bool> {
    value.as_bool().ok_or_else(|| malformed("expected boolean"))
}

#[async_trait]
impl MobileDriver for AppiumDriver {
    async fn find_element(&self, locator: &Locator) -> ProbeResult<ElementRef> {
        let subject = locator.to_string();
        let value = self.post("/element", locator_body(locator), &subject).await?;
        element_from(&value)
    }

    async fn find_elements(&self, locator: &Locator) -> ProbeResult<Vec<ElementRef>> {
        let subject = locator.to_string();
        let value = self
            .post("/elements", locator_body(locator), &subject)
            .await?;
        value
            .as_array()
            .map(|items| items.iter().map(element_from).collect())
            .unwrap_or_else(|| Ok(Vec::new()))
    }

    async fn find_child_element(
        &self,
        parent: &ElementRef,
        locator: &Locator,
    ) -> ProbeResult<ElementRef> {
        let subject = locator.to_string();
        let value = self
            .post(
                &format!("/element/{parent}/element"),
                locator_body(locator),
                &subject,
            )
            .await?;
        element_from(&value)
    }

    async fn element_text(&self, element: &ElementRef) -> ProbeResult<String> {
        let value = self
            .get(&format!("/element/{element}/text"), element.id())
            .await?;
        Ok(value.as_str().unwrap_or_default().to_string())
    }

    async fn element_click(&self, element: &ElementRef) -> ProbeResult<()> {
        let _ = self
            .post(&format!("/element/{element}/click"), json!({}), element.id())
            .await?;
        Ok(())
    }

    async fn element_clear(&self, element: &ElementRef) -> ProbeResult<()> {
        let _ = self
            .post(&format!("/element/{element}/clear"), json!({}), element.id())
            .await?;
        Ok(())
    }

    async fn element_send_keys(&self, element: &ElementRef, text: &str) -> ProbeResult<()> {
        let _ = self
            .post(
                &format!("/element/{element}/value"),
                json!({ "text": text }),
                element.id(),
            )
            .await?;
        Ok(())
    }

    async fn element_displayed(&self, element: &ElementRef) -> ProbeResult<bool> {
        let value = self
            .get(&format!("/element/{element}/displayed"), element.id())
            .await?;
        as_bool(&value)
    }

    async fn element_enabled(&self, element: &ElementRef) -> ProbeResult<bool> {
        let value = self
            .get(&format!("/element/{element}/enabled"), element.id())
            .await?;
        as_bool(&value)
    }

    async fn page_source(&self) -> ProbeResult<String> {
        let value = self.get("/source", "page source").await?;
        Ok(value.as_str().unwrap_or_default().to_string())
    }

    async fn screenshot_png(&self) -> ProbeResult<Vec<u8>> {
        let value = self.get("/screenshot", "screenshot").await?;
        let encoded = value
            .as_str()
            .ok_or_else(|| malformed("screenshot is not a string"))?;
        base64::engine::general_purpose::STANDARD
            .decode(encoded)
            .map_err(|e| malformed(&format!("screenshot is not base64: {e}")))
    }

    async fn window_size(&self) -> ProbeResult<WindowSize> {
        let value = self.get("/window/rect", "window rect").await?;
        let dim = |key: &str| {
            value
                .get(key)
                .and_then(Value::as_f64)
                .map(|v| v as i64)
                .ok_or_else(|| malformed("window rect without width/height"))
        };
        Ok(WindowSize::new(dim("width")?, dim("height")?))
    }

    async fn execute_script(&self, script: &str, args: Value) -> ProbeResult<Value> {
        self.post(
            "/execute/sync",
            json!({ "script": script, "args": [args] }),
            script,
        )
        .await
    }

    async fn perform_actions(&self, actions: Value) -> ProbeResult<()> {
        let _ = self
            .post("/actions", json!({ "actions": actions }), "actions")
            .await?;
        Ok(())
    }

    async fn hide_keyboard(&self) -> ProbeResult<()> {
        let _ = self
            .post("/appium/device/hide_keyboard", json!({}), "hide keyboard")
            .await?;
        Ok(())
    }

    async fn quit(&self) -> ProbeResult<()> {
        info!(session_id = %self.session_id, "deleting session");
        let _ = send(self.client.delete(self.url("")), "session").await?;
        Ok(())
    }
}
