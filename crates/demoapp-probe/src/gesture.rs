//! Scroll gestures with fallbacks.
//!
//! Not every UiAutomator2 server build supports every gesture, so
//! [`scroll_forward`] walks a list of mechanisms and stops at the first one the
//! driver accepts. Success means the gesture ran, not that new content
//! appeared.

use crate::driver::{MobileDriver, SwipePath};
use crate::locator::{By, Locator};
use serde_json::json;
use tracing::debug;

/// UiAutomator expression that scrolls the first scrollable container forward
pub const UI_SCROLL_FORWARD: &str =
    "new UiScrollable(new UiSelector().scrollable(true)).scrollForward()";

/// Swipe duration in milliseconds
pub const SWIPE_DURATION_MS: u64 = 500;

/// Drag speed in pixels per second
pub const DRAG_SPEED: u64 = 1000;

/// Scroll the current screen forward. Returns `true` if some mechanism ran.
///
/// Order: `UiScrollable.scrollForward()`, then (given a window size)
/// `mobile: swipe`, `mobile: dragGesture`, `mobile: scroll`, and finally a
/// W3C pointer press-move-release.
pub async fn scroll_forward(driver: &dyn MobileDriver) -> bool {
    debug!("scroll_forward: attempt started");
    if driver
        .find_element(&Locator::ui_automator(UI_SCROLL_FORWARD))
        .await
        .is_ok()
    {
        debug!("scroll_forward: UiScrollable.scrollForward() succeeded");
        return true;
    }
    debug!("scroll_forward: UiScrollable.scrollForward() unavailable");

    let path = match driver.window_size().await {
        Ok(size) => size.forward_swipe(),
        Err(e) => {
            debug!(error = %e, "scroll_forward: could not read window size");
            debug!("scroll_forward: no scroll method worked");
            return false;
        }
    };

    for (script, args) in gesture_scripts(path) {
        match driver.execute_script(script, args).await {
            Ok(_) => {
                debug!(script, "scroll_forward: executed");
                return true;
            }
            Err(e) => debug!(script, error = %e, "scroll_forward: gesture failed"),
        }
    }

    match driver.perform_actions(pointer_swipe(path)).await {
        Ok(()) => {
            debug!("scroll_forward: pointer actions succeeded");
            true
        }
        Err(e) => {
            debug!(error = %e, "scroll_forward: no scroll method worked");
            false
        }
    }
}

/// Scroll until `locator` is on screen using `UiScrollable.scrollIntoView`.
pub async fn scroll_into_view(driver: &dyn MobileDriver, locator: &Locator) -> bool {
    let expression = format!(
        "new UiScrollable(new UiSelector().scrollable(true)).scrollIntoView({})",
        locator.to_ui_selector()
    );
    match driver
        .find_element(&Locator::new(By::AndroidUiAutomator, expression))
        .await
    {
        Ok(_) => {
            debug!(%locator, "scroll_into_view: element brought into view");
            true
        }
        Err(e) => {
            debug!(%locator, error = %e, "scroll_into_view: failed");
            false
        }
    }
}

fn gesture_scripts(path: SwipePath) -> [(&'static str, serde_json::Value); 3] {
    [
        (
            "mobile: swipe",
            json!({
                "startX": path.start_x,
                "startY": path.start_y,
                "endX": path.end_x,
                "endY": path.end_y,
                "duration": SWIPE_DURATION_MS,
            }),
        ),
        (
            "mobile: dragGesture",
            json!({
                "startX": path.start_x,
                "startY": path.start_y,
                "endX": path.end_x,
                "endY": path.end_y,
                "speed": DRAG_SPEED,
            }),
        ),
        ("mobile: scroll", json!({ "direction": "down" })),
    ]
}

/// W3C action sequence: touch down at start, hold 200ms, move, release
fn pointer_swipe(path: SwipePath) -> serde_json::Value {
    json!([{
        "type": "pointer",
        "id": "finger1",
        "parameters": { "pointerType": "touch" },
        "actions": [
            { "type": "pointerMove", "duration": 0, "x": path.start_x, "y": path.start_y },
            { "type": "pointerDown", "button": 0 },
            { "type": "pause", "duration": 200 },
            { "type": "pointerMove", "duration": SWIPE_DURATION_MS, "x": path.end_x, "y": path.end_y },
            { "type": "pointerUp", "button": 0 }
        ]
    }])
}
