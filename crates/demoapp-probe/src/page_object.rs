//! Page Object Model support.
//!
//! Each screen of the app gets a struct holding a shared driver and exposing
//! the actions a scenario performs there. The trait below is the small common
//! surface: a name for logs and an anchor element that identifies the screen.

use crate::driver::MobileDriver;
use crate::locator::Locator;
use crate::wait::{self, WaitOptions};
use async_trait::async_trait;

/// A screen of the app under test.
///
/// # Example
///
/// ```ignore
/// struct CartPage { driver: SharedDriver }
///
/// impl PageObject for CartPage {
///     fn page_name(&self) -> &str { "cart" }
///     fn anchor(&self) -> Locator { Locator::accessibility_id("cart badge") }
///     fn driver(&self) -> &dyn MobileDriver { self.driver.as_ref() }
/// }
/// ```
#[async_trait]
pub trait PageObject: Send + Sync {
    /// Page name for logging/debugging
    fn page_name(&self) -> &str;

    /// Element whose presence means this screen is showing
    fn anchor(&self) -> Locator;

    /// Driver the page talks to
    fn driver(&self) -> &dyn MobileDriver;

    /// Default wait for this page's elements
    fn default_wait(&self) -> WaitOptions {
        WaitOptions::default()
    }

    /// Whether the anchor becomes visible within `options`
    async fn is_displayed(&self, options: WaitOptions) -> bool {
        let anchor = self.anchor();
        let shown = wait::until_visible(self.driver(), &anchor, options)
            .await
            .is_ok();
        tracing::debug!(page = self.page_name(), shown, "page display check");
        shown
    }
}
