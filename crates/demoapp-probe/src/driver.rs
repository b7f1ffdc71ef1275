//! MobileDriver - Abstract Mobile Automation Trait
//!
//! Page objects and steps talk to the device through this trait only, so the
//! same code runs against a live Appium session ([`crate::AppiumDriver`]) or
//! the scripted [`crate::MockDriver`] in unit tests.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │  MobileDriver (async trait)                               │
//! ├──────────────────────────────────────────────────────────┤
//! │  ┌──────────────────────┐     ┌──────────────────────┐   │
//! │  │  AppiumDriver        │     │  MockDriver          │   │
//! │  │  W3C WebDriver over  │     │  scripted elements,  │   │
//! │  │  HTTP (reqwest)      │     │  call history        │   │
//! │  └──────────────────────┘     └──────────────────────┘   │
//! └──────────────────────────────────────────────────────────┘
//! ```

use crate::locator::Locator;
use crate::result::ProbeResult;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Opaque reference to an element inside a driver session
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ElementRef(pub String);

impl ElementRef {
    /// Wrap a driver element id
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Driver element id
    #[must_use]
    pub fn id(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ElementRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Device window dimensions in pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowSize {
    /// Width in pixels
    pub width: i64,
    /// Height in pixels
    pub height: i64,
}

impl WindowSize {
    /// Create a window size
    #[must_use]
    pub const fn new(width: i64, height: i64) -> Self {
        Self { width, height }
    }

    /// Vertical swipe path: centre column, from 80% down to 30% of the height
    #[must_use]
    pub fn forward_swipe(&self) -> SwipePath {
        let x = self.width / 2;
        SwipePath {
            start_x: x,
            start_y: self.height * 8 / 10,
            end_x: x,
            end_y: self.height * 3 / 10,
        }
    }
}

/// Start and end points of a swipe gesture
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SwipePath {
    /// Start x
    pub start_x: i64,
    /// Start y
    pub start_y: i64,
    /// End x
    pub end_x: i64,
    /// End y
    pub end_y: i64,
}

/// Abstract driver trait for mobile automation.
///
/// # Implementations
///
/// - `AppiumDriver` - W3C WebDriver client for an Appium server
/// - `MockDriver` - For unit testing
#[async_trait]
pub trait MobileDriver: Send + Sync + fmt::Debug {
    /// Find the first element matching the locator
    async fn find_element(&self, locator: &Locator) -> ProbeResult<ElementRef>;

    /// Find all elements matching the locator (possibly none)
    async fn find_elements(&self, locator: &Locator) -> ProbeResult<Vec<ElementRef>>;

    /// Find an element relative to `parent`
    async fn find_child_element(
        &self,
        parent: &ElementRef,
        locator: &Locator,
    ) -> ProbeResult<ElementRef>;

    /// Visible text of an element
    async fn element_text(&self, element: &ElementRef) -> ProbeResult<String>;

    /// Click (tap) an element
    async fn element_click(&self, element: &ElementRef) -> ProbeResult<()>;

    /// Clear an editable element
    async fn element_clear(&self, element: &ElementRef) -> ProbeResult<()>;

    /// Type text into an element
    async fn element_send_keys(&self, element: &ElementRef, text: &str) -> ProbeResult<()>;

    /// Whether the element is displayed
    async fn element_displayed(&self, element: &ElementRef) -> ProbeResult<bool>;

    /// Whether the element is enabled
    async fn element_enabled(&self, element: &ElementRef) -> ProbeResult<bool>;

    /// Current UI hierarchy as XML
    async fn page_source(&self) -> ProbeResult<String>;

    /// Screenshot as PNG bytes
    async fn screenshot_png(&self) -> ProbeResult<Vec<u8>>;

    /// Current window size
    async fn window_size(&self) -> ProbeResult<WindowSize>;

    /// Execute a script, typically an Appium `mobile:` extension
    async fn execute_script(
        &self,
        script: &str,
        args: serde_json::Value,
    ) -> ProbeResult<serde_json::Value>;

    /// Perform W3C input actions
    async fn perform_actions(&self, actions: serde_json::Value) -> ProbeResult<()>;

    /// Dismiss the soft keyboard
    async fn hide_keyboard(&self) -> ProbeResult<()>;

    /// End the session
    async fn quit(&self) -> ProbeResult<()>;
}

/// Driver shared between page objects of one scenario
pub type SharedDriver = Arc<dyn MobileDriver>;
