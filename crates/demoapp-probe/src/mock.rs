//! Scripted driver for unit tests.
//!
//! `MockDriver` stands in for a device: tests register elements, decide which
//! locator returns which elements (optionally per viewport), switch scroll
//! mechanisms on or off, and inspect the recorded calls afterwards. Every
//! successful scroll gesture advances the viewport, so catalogs that reveal
//! more items as the user scrolls can be modelled directly.

use crate::driver::{ElementRef, MobileDriver, WindowSize};
use crate::locator::{By, Locator};
use crate::result::{ProbeError, ProbeResult};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, MutexGuard, PoisonError};

/// A fake element
#[derive(Debug, Clone)]
pub struct MockElement {
    /// Text; `None` makes `element_text` fail like a stale element
    pub text: Option<String>,
    /// Displayed flag
    pub displayed: bool,
    /// Enabled flag
    pub enabled: bool,
    /// Relative lookups answered from this element
    pub children: HashMap<Locator, String>,
}

impl MockElement {
    /// Displayed, enabled element with text
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            displayed: true,
            enabled: true,
            children: HashMap::new(),
        }
    }

    /// Element whose text cannot be read
    #[must_use]
    pub fn unreadable() -> Self {
        Self {
            text: None,
            ..Self::new("")
        }
    }

    /// Mark as not displayed
    #[must_use]
    pub fn hidden(mut self) -> Self {
        self.displayed = false;
        self
    }

    /// Mark as disabled
    #[must_use]
    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    /// Answer `locator` relative to this element with element `child_id`
    #[must_use]
    pub fn with_child(mut self, locator: Locator, child_id: impl Into<String>) -> Self {
        let _ = self.children.insert(locator, child_id.into());
        self
    }
}

#[derive(Debug, Default)]
struct MockState {
    elements: HashMap<String, MockElement>,
    results: HashMap<Locator, Vec<Vec<String>>>,
    failing: HashSet<Locator>,
    viewport: usize,
    ui_scrollable: bool,
    scripts: HashSet<String>,
    actions: bool,
    navigations: HashSet<String>,
    page_source: Option<String>,
    screenshot: Option<Vec<u8>>,
    window: Option<WindowSize>,
    clicked: Vec<String>,
    cleared: HashSet<String>,
    typed: HashMap<String, String>,
    keyboard_hidden: bool,
    quit: bool,
    history: Vec<String>,
}

/// Mock driver for unit testing
#[derive(Debug, Default)]
pub struct MockDriver {
    state: Mutex<MockState>,
}

impl MockDriver {
    /// Create new mock driver with no elements and no scroll support
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Register an element under `id`
    pub fn add_element(&self, id: impl Into<String>, element: MockElement) -> ElementRef {
        let id = id.into();
        let _ = self.state().elements.insert(id.clone(), element);
        ElementRef(id)
    }

    /// `locator` returns `ids` in every viewport
    pub fn set_results(&self, locator: Locator, ids: &[&str]) {
        self.set_viewports(locator, &[ids]);
    }

    /// `locator` returns `viewports[n]` while the mock is in viewport `n`
    /// (the last entry repeats once the list is exhausted)
    pub fn set_viewports(&self, locator: Locator, viewports: &[&[&str]]) {
        let pages = viewports
            .iter()
            .map(|ids| ids.iter().map(|id| (*id).to_string()).collect())
            .collect();
        let _ = self.state().results.insert(locator, pages);
    }

    /// Lookups of `locator` fail with a driver error
    pub fn fail_locator(&self, locator: Locator) {
        let _ = self.state().failing.insert(locator);
    }

    /// Accept `UiScrollable` expressions as scroll gestures
    pub fn enable_ui_scrollable(&self) {
        self.state().ui_scrollable = true;
    }

    /// Accept an `execute_script` name; `mobile:` gestures advance the viewport
    pub fn enable_script(&self, name: &str) {
        let _ = self.state().scripts.insert(name.to_string());
    }

    /// Accept W3C pointer actions as scroll gestures
    pub fn enable_actions(&self) {
        self.state().actions = true;
    }

    /// Clicking element `id` moves to the next viewport, like a screen change
    pub fn navigate_on_click(&self, id: &str) {
        let _ = self.state().navigations.insert(id.to_string());
    }

    /// Page source returned by `page_source`
    pub fn set_page_source(&self, source: impl Into<String>) {
        self.state().page_source = Some(source.into());
    }

    /// PNG bytes returned by `screenshot_png`
    pub fn set_screenshot(&self, png: Vec<u8>) {
        self.state().screenshot = Some(png);
    }

    /// Window size returned by `window_size`
    pub fn set_window_size(&self, size: WindowSize) {
        self.state().window = Some(size);
    }

    /// Current viewport index
    #[must_use]
    pub fn viewport(&self) -> usize {
        self.state().viewport
    }

    /// Get call history
    #[must_use]
    pub fn history(&self) -> Vec<String> {
        self.state().history.clone()
    }

    /// Check if method was called
    #[must_use]
    pub fn was_called(&self, method: &str) -> bool {
        self.state().history.iter().any(|c| c.starts_with(method))
    }

    /// Number of calls starting with `prefix`
    #[must_use]
    pub fn call_count(&self, prefix: &str) -> usize {
        self.state()
            .history
            .iter()
            .filter(|c| c.starts_with(prefix))
            .count()
    }

    /// Whether element `id` was clicked
    #[must_use]
    pub fn was_clicked(&self, id: &str) -> bool {
        self.state().clicked.iter().any(|c| c == id)
    }

    /// Whether element `id` was cleared
    #[must_use]
    pub fn was_cleared(&self, id: &str) -> bool {
        self.state().cleared.contains(id)
    }

    /// Text typed into element `id`
    #[must_use]
    pub fn typed_text(&self, id: &str) -> Option<String> {
        self.state().typed.get(id).cloned()
    }

    /// Whether `hide_keyboard` was called
    #[must_use]
    pub fn keyboard_hidden(&self) -> bool {
        self.state().keyboard_hidden
    }

    /// Whether `quit` was called
    #[must_use]
    pub fn is_quit(&self) -> bool {
        self.state().quit
    }

    fn lookup(state: &MockState, locator: &Locator) -> ProbeResult<Vec<ElementRef>> {
        if state.quit {
            return Err(ProbeError::WebDriver {
                status: 404,
                error: "invalid session id".to_string(),
                message: "session was deleted".to_string(),
            });
        }
        if state.failing.contains(locator) {
            return Err(ProbeError::WebDriver {
                status: 500,
                error: "unknown error".to_string(),
                message: format!("lookup of {locator} failed"),
            });
        }
        let ids = state
            .results
            .get(locator)
            .and_then(|pages| pages.get(state.viewport.min(pages.len().saturating_sub(1))))
            .cloned()
            .unwrap_or_default();
        Ok(ids.into_iter().map(ElementRef).collect())
    }

    fn element<'a>(state: &'a MockState, element: &ElementRef) -> ProbeResult<&'a MockElement> {
        state
            .elements
            .get(element.id())
            .ok_or_else(|| stale(element))
    }
}

fn stale(element: &ElementRef) -> ProbeError {
    ProbeError::WebDriver {
        status: 404,
        error: "stale element reference".to_string(),
        message: format!("element {element} is not attached"),
    }
}

fn is_scroll_expression(locator: &Locator) -> bool {
    locator.by == By::AndroidUiAutomator && locator.value().contains("UiScrollable")
}

#[async_trait]
impl MobileDriver for MockDriver {
    async fn find_element(&self, locator: &Locator) -> ProbeResult<ElementRef> {
        let mut state = self.state();
        state.history.push(format!("find_element:{locator}"));
        if is_scroll_expression(locator) {
            if state.ui_scrollable {
                state.viewport += 1;
                return Ok(ElementRef::new("scrollable"));
            }
            return Err(ProbeError::NoSuchElement {
                locator: locator.to_string(),
            });
        }
        Self::lookup(&state, locator)?
            .into_iter()
            .next()
            .ok_or_else(|| ProbeError::NoSuchElement {
                locator: locator.to_string(),
            })
    }

    async fn find_elements(&self, locator: &Locator) -> ProbeResult<Vec<ElementRef>> {
        let mut state = self.state();
        state.history.push(format!("find_elements:{locator}"));
        Self::lookup(&state, locator)
    }

    async fn find_child_element(
        &self,
        parent: &ElementRef,
        locator: &Locator,
    ) -> ProbeResult<ElementRef> {
        let mut state = self.state();
        state
            .history
            .push(format!("find_child_element:{parent}:{locator}"));
        Self::element(&state, parent)?
            .children
            .get(locator)
            .cloned()
            .map(ElementRef)
            .ok_or_else(|| ProbeError::NoSuchElement {
                locator: locator.to_string(),
            })
    }

    async fn element_text(&self, element: &ElementRef) -> ProbeResult<String> {
        let state = self.state();
        Self::element(&state, element)?
            .text
            .clone()
            .ok_or_else(|| stale(element))
    }

    async fn element_click(&self, element: &ElementRef) -> ProbeResult<()> {
        let mut state = self.state();
        let _ = Self::element(&state, element)?;
        state.history.push(format!("click:{element}"));
        state.clicked.push(element.id().to_string());
        if state.navigations.contains(element.id()) {
            state.viewport += 1;
        }
        Ok(())
    }

    async fn element_clear(&self, element: &ElementRef) -> ProbeResult<()> {
        let mut state = self.state();
        let _ = Self::element(&state, element)?;
        state.history.push(format!("clear:{element}"));
        let _ = state.cleared.insert(element.id().to_string());
        Ok(())
    }

    async fn element_send_keys(&self, element: &ElementRef, text: &str) -> ProbeResult<()> {
        let mut state = self.state();
        let _ = Self::element(&state, element)?;
        state.history.push(format!("send_keys:{element}"));
        let _ = state
            .typed
            .insert(element.id().to_string(), text.to_string());
        Ok(())
    }

    async fn element_displayed(&self, element: &ElementRef) -> ProbeResult<bool> {
        let state = self.state();
        Ok(Self::element(&state, element)?.displayed)
    }

    async fn element_enabled(&self, element: &ElementRef) -> ProbeResult<bool> {
        let state = self.state();
        Ok(Self::element(&state, element)?.enabled)
    }

    async fn page_source(&self) -> ProbeResult<String> {
        let mut state = self.state();
        state.history.push("page_source".to_string());
        state.page_source.clone().ok_or_else(|| ProbeError::WebDriver {
            status: 500,
            error: "unknown error".to_string(),
            message: "no mock page source set".to_string(),
        })
    }

    async fn screenshot_png(&self) -> ProbeResult<Vec<u8>> {
        let mut state = self.state();
        state.history.push("screenshot".to_string());
        state.screenshot.clone().ok_or_else(|| ProbeError::WebDriver {
            status: 500,
            error: "unable to capture screen".to_string(),
            message: "no mock screenshot set".to_string(),
        })
    }

    async fn window_size(&self) -> ProbeResult<WindowSize> {
        let mut state = self.state();
        state.history.push("window_size".to_string());
        state.window.ok_or_else(|| ProbeError::WebDriver {
            status: 500,
            error: "unknown error".to_string(),
            message: "no mock window size set".to_string(),
        })
    }

    async fn execute_script(
        &self,
        script: &str,
        _args: serde_json::Value,
    ) -> ProbeResult<serde_json::Value> {
        let mut state = self.state();
        state.history.push(format!("execute_script:{script}"));
        if !state.scripts.contains(script) {
            return Err(ProbeError::WebDriver {
                status: 404,
                error: "unknown method".to_string(),
                message: format!("{script} is not supported"),
            });
        }
        if script.starts_with("mobile:") {
            state.viewport += 1;
        }
        Ok(serde_json::Value::Null)
    }

    async fn perform_actions(&self, _actions: serde_json::Value) -> ProbeResult<()> {
        let mut state = self.state();
        state.history.push("perform_actions".to_string());
        if !state.actions {
            return Err(ProbeError::WebDriver {
                status: 500,
                error: "unsupported operation".to_string(),
                message: "pointer actions disabled".to_string(),
            });
        }
        state.viewport += 1;
        Ok(())
    }

    async fn hide_keyboard(&self) -> ProbeResult<()> {
        let mut state = self.state();
        state.history.push("hide_keyboard".to_string());
        state.keyboard_hidden = true;
        Ok(())
    }

    async fn quit(&self) -> ProbeResult<()> {
        let mut state = self.state();
        state.history.push("quit".to_string());
        state.quit = true;
        Ok(())
    }
}
