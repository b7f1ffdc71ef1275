//! Login screen.

use crate::artifacts::{ArtifactCapture, ArtifactPaths};
use crate::driver::{ElementRef, MobileDriver, SharedDriver};
use crate::gesture;
use crate::locator::Locator;
use crate::page_object::PageObject;
use crate::result::ProbeResult;
use crate::wait::{self, WaitOptions};
use tracing::{debug, info, warn};

/// Username input
pub const USERNAME_FIELD: Locator = Locator::accessibility_id("test-Username");
/// Password input
pub const PASSWORD_FIELD: Locator = Locator::accessibility_id("test-Password");
/// Login button
pub const LOGIN_BUTTON: Locator = Locator::accessibility_id("test-LOGIN");
/// Error banner shown after a rejected login
pub const ERROR_MESSAGE: Locator = Locator::accessibility_id("test-Error");
/// Hamburger menu button, also the home screen marker
pub const MENU_BUTTON: Locator = Locator::accessibility_id("open menu");
/// "Log In" entry of the side menu
pub const MENU_LOGIN_TEXT: Locator = Locator::xpath("//*[@text='Log In']");

/// Default wait for login screen elements
pub const DEFAULT_WAIT_SECS: u64 = 10;
/// Default wait for the error banner
pub const ERROR_MESSAGE_WAIT_SECS: u64 = 3;

/// Page object for the login screen
#[derive(Debug, Clone)]
pub struct LoginPage {
    driver: SharedDriver,
    wait: WaitOptions,
    artifacts: ArtifactCapture,
}

impl LoginPage {
    /// Login page with a 10 second default wait
    #[must_use]
    pub fn new(driver: SharedDriver) -> Self {
        Self {
            driver,
            wait: WaitOptions::seconds(DEFAULT_WAIT_SECS),
            artifacts: ArtifactCapture::default(),
        }
    }

    /// Override the default wait
    #[must_use]
    pub fn with_wait(mut self, wait: WaitOptions) -> Self {
        self.wait = wait;
        self
    }

    /// Write failure artifacts through `artifacts`
    #[must_use]
    pub fn with_artifacts(mut self, artifacts: ArtifactCapture) -> Self {
        self.artifacts = artifacts;
        self
    }

    /// Shared driver handle
    #[must_use]
    pub fn shared_driver(&self) -> &SharedDriver {
        &self.driver
    }

    /// Wait until `locator` is visible. Timeouts capture artifacts.
    pub async fn wait_for_element(
        &self,
        locator: &Locator,
        options: Option<WaitOptions>,
    ) -> ProbeResult<ElementRef> {
        let result = wait::until_visible(self.driver(), locator, options.unwrap_or(self.wait)).await;
        self.capture_on_timeout(locator, result).await
    }

    /// Wait until `locator` is visible and enabled. Timeouts capture artifacts.
    pub async fn wait_for_clickable(
        &self,
        locator: &Locator,
        options: Option<WaitOptions>,
    ) -> ProbeResult<ElementRef> {
        let result =
            wait::until_clickable(self.driver(), locator, options.unwrap_or(self.wait)).await;
        self.capture_on_timeout(locator, result).await
    }

    async fn capture_on_timeout(
        &self,
        locator: &Locator,
        result: ProbeResult<ElementRef>,
    ) -> ProbeResult<ElementRef> {
        if let Err(e) = &result {
            if e.is_timeout() {
                let prefix = format!("wait_timeout_{}", artifact_slug(locator.value()));
                let _ = self.capture_debug_artifacts(&prefix).await;
            }
        }
        result
    }

    /// Clear the username field and type `username`
    pub async fn enter_username(&self, username: &str) -> ProbeResult<()> {
        self.fill(&USERNAME_FIELD, username).await
    }

    /// Clear the password field and type `password`
    pub async fn enter_password(&self, password: &str) -> ProbeResult<()> {
        self.fill(&PASSWORD_FIELD, password).await
    }

    async fn fill(&self, locator: &Locator, text: &str) -> ProbeResult<()> {
        let field = self.wait_for_clickable(locator, None).await?;
        self.driver.element_clear(&field).await?;
        self.driver.element_send_keys(&field, text).await
    }

    /// Tap the login button.
    ///
    /// If the button does not become clickable, the soft keyboard is hidden
    /// and the button is scrolled into view before one more wait. Artifacts
    /// are captured once if both attempts fail.
    pub async fn tap_login(&self) -> ProbeResult<()> {
        let first = wait::until_clickable(self.driver(), &LOGIN_BUTTON, self.wait).await;
        let button = match first {
            Ok(button) => button,
            Err(e) if e.is_timeout() => {
                debug!(error = %e, "login button not clickable, trying recovery");
                if let Err(e) = self.driver.hide_keyboard().await {
                    debug!(error = %e, "hide_keyboard failed");
                }
                let retried = if gesture::scroll_into_view(self.driver(), &LOGIN_BUTTON).await {
                    wait::until_clickable(self.driver(), &LOGIN_BUTTON, self.wait).await
                } else {
                    Err(e)
                };
                match retried {
                    Ok(button) => button,
                    Err(e) => {
                        warn!(error = %e, "login button still not clickable");
                        let _ = self.capture_debug_artifacts("tap_login_failure").await;
                        return Err(e);
                    }
                }
            }
            Err(e) => return Err(e),
        };
        self.driver.element_click(&button).await
    }

    /// Fill both fields and tap login
    pub async fn login(&self, username: &str, password: &str) -> ProbeResult<()> {
        info!(username, "logging in");
        self.enter_username(username).await?;
        self.enter_password(password).await?;
        self.tap_login().await
    }

    /// Whether the login button is enabled. `false` when it never shows up.
    pub async fn is_login_button_enabled(&self) -> bool {
        match wait::until_visible(self.driver(), &LOGIN_BUTTON, self.wait).await {
            Ok(button) => self.driver.element_enabled(&button).await.unwrap_or(false),
            Err(_) => false,
        }
    }

    /// Trimmed error banner text, `None` when no banner appears in time
    pub async fn get_error_message(&self, options: Option<WaitOptions>) -> ProbeResult<Option<String>> {
        let options = options.unwrap_or(WaitOptions::seconds(ERROR_MESSAGE_WAIT_SECS));
        match wait::until_visible(self.driver(), &ERROR_MESSAGE, options).await {
            Ok(banner) => Ok(Some(self.driver.element_text(&banner).await?.trim().to_string())),
            Err(e) if e.is_timeout() => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Open the side menu
    pub async fn open_menu(&self) -> ProbeResult<()> {
        let menu = self.wait_for_clickable(&MENU_BUTTON, None).await?;
        self.driver.element_click(&menu).await
    }

    /// Tap "Log In" in an open side menu
    pub async fn open_login_from_menu(&self) -> ProbeResult<()> {
        let entry = self.wait_for_clickable(&MENU_LOGIN_TEXT, None).await?;
        self.driver.element_click(&entry).await
    }

    /// Reach the login screen through the menu, then log in
    pub async fn login_via_menu(&self, username: &str, password: &str) -> ProbeResult<()> {
        info!("navigating to login through the side menu");
        self.open_menu().await?;
        self.open_login_from_menu().await?;
        self.login(username, password).await
    }

    /// Save a screenshot and page source under `prefix`
    pub async fn capture_debug_artifacts(&self, prefix: &str) -> ArtifactPaths {
        self.artifacts.capture(self.driver(), prefix).await
    }
}

impl PageObject for LoginPage {
    fn page_name(&self) -> &str {
        "login"
    }

    fn anchor(&self) -> Locator {
        USERNAME_FIELD
    }

    fn driver(&self) -> &dyn MobileDriver {
        self.driver.as_ref()
    }

    fn default_wait(&self) -> WaitOptions {
        self.wait
    }
}

fn artifact_slug(value: &str) -> String {
    value
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{MockDriver, MockElement};
    use crate::result::ProbeError;
    use std::sync::Arc;
    use tempfile::TempDir;

    fn quick() -> WaitOptions {
        WaitOptions::default()
            .with_timeout(40)
            .with_poll_interval(10)
    }

    fn page(driver: &Arc<MockDriver>, dir: &TempDir) -> LoginPage {
        LoginPage::new(driver.clone())
            .with_wait(quick())
            .with_artifacts(ArtifactCapture::new(dir.path()))
    }

    fn login_screen(driver: &MockDriver) {
        let _ = driver.add_element("user", MockElement::new(""));
        let _ = driver.add_element("pass", MockElement::new(""));
        let _ = driver.add_element("btn", MockElement::new("LOGIN"));
        driver.set_results(USERNAME_FIELD, &["user"]);
        driver.set_results(PASSWORD_FIELD, &["pass"]);
        driver.set_results(LOGIN_BUTTON, &["btn"]);
    }

    fn artifact_count(dir: &TempDir) -> usize {
        std::fs::read_dir(dir.path()).map(|d| d.count()).unwrap_or(0)
    }

    mod form_tests {
        use super::*;

        #[tokio::test]
        async fn test_login_fills_fields_and_taps() {
            let driver = Arc::new(MockDriver::new());
            let dir = TempDir::new().unwrap();
            login_screen(&driver);

            page(&driver, &dir)
                .login("bob@example.com", "10203040")
                .await
                .unwrap();

            assert!(driver.was_cleared("user"));
            assert_eq!(driver.typed_text("user").as_deref(), Some("bob@example.com"));
            assert!(driver.was_cleared("pass"));
            assert_eq!(driver.typed_text("pass").as_deref(), Some("10203040"));
            assert!(driver.was_clicked("btn"));
        }

        #[tokio::test]
        async fn test_missing_username_field_times_out_and_captures() {
            let driver = Arc::new(MockDriver::new());
            driver.set_screenshot(vec![0x89, b'P', b'N', b'G']);
            driver.set_page_source("<hierarchy/>");
            let dir = TempDir::new().unwrap();

            let err = page(&driver, &dir)
                .enter_username("bob@example.com")
                .await
                .unwrap_err();

            assert!(err.is_timeout());
            assert!(err.to_string().contains("test-Username"));
            let names: Vec<String> = std::fs::read_dir(dir.path())
                .unwrap()
                .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
                .collect();
            assert!(names.iter().all(|n| n.starts_with("wait_timeout_test_Username_")));
            assert_eq!(names.len(), 2);
        }

        #[tokio::test]
        async fn test_button_enabled_state() {
            let driver = Arc::new(MockDriver::new());
            let dir = TempDir::new().unwrap();
            let _ = driver.add_element("btn", MockElement::new("LOGIN").disabled());
            driver.set_results(LOGIN_BUTTON, &["btn"]);
            assert!(!page(&driver, &dir).is_login_button_enabled().await);

            let driver = Arc::new(MockDriver::new());
            login_screen(&driver);
            assert!(page(&driver, &dir).is_login_button_enabled().await);
        }

        #[tokio::test]
        async fn test_button_absent_is_not_enabled() {
            let driver = Arc::new(MockDriver::new());
            let dir = TempDir::new().unwrap();
            assert!(!page(&driver, &dir).is_login_button_enabled().await);
            assert_eq!(artifact_count(&dir), 0);
        }

        #[tokio::test]
        async fn test_error_message_trimmed() {
            let driver = Arc::new(MockDriver::new());
            let dir = TempDir::new().unwrap();
            let _ = driver.add_element(
                "err",
                MockElement::new("  Provided credentials do not match any user in this service.\n"),
            );
            driver.set_results(ERROR_MESSAGE, &["err"]);

            let msg = page(&driver, &dir)
                .get_error_message(Some(quick()))
                .await
                .unwrap();
            assert_eq!(
                msg.as_deref(),
                Some("Provided credentials do not match any user in this service.")
            );
        }

        #[tokio::test]
        async fn test_no_error_message() {
            let driver = Arc::new(MockDriver::new());
            let dir = TempDir::new().unwrap();
            let msg = page(&driver, &dir)
                .get_error_message(Some(quick()))
                .await
                .unwrap();
            assert!(msg.is_none());
        }
    }

    mod recovery_tests {
        use super::*;

        #[tokio::test]
        async fn test_tap_login_recovers_after_scroll() {
            let driver = Arc::new(MockDriver::new());
            let dir = TempDir::new().unwrap();
            let _ = driver.add_element("btn", MockElement::new("LOGIN"));
            // button only appears once the form is scrolled
            driver.set_viewports(LOGIN_BUTTON, &[&[], &["btn"]]);
            driver.enable_ui_scrollable();

            page(&driver, &dir).tap_login().await.unwrap();

            assert!(driver.keyboard_hidden());
            assert!(driver.was_called("find_element:-android uiautomator="));
            assert!(driver.was_clicked("btn"));
            assert_eq!(artifact_count(&dir), 0);
        }

        #[tokio::test]
        async fn test_tap_login_fails_once_with_single_capture() {
            let driver = Arc::new(MockDriver::new());
            driver.set_page_source("<hierarchy/>");
            let dir = TempDir::new().unwrap();

            let err = page(&driver, &dir).tap_login().await.unwrap_err();

            assert!(matches!(err, ProbeError::Timeout { .. }));
            assert!(driver.keyboard_hidden());
            let names: Vec<String> = std::fs::read_dir(dir.path())
                .unwrap()
                .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
                .collect();
            assert_eq!(names.len(), 1);
            assert!(names[0].starts_with("tap_login_failure_"));
        }

        #[tokio::test]
        async fn test_tap_login_retry_timeout_after_scroll() {
            let driver = Arc::new(MockDriver::new());
            let dir = TempDir::new().unwrap();
            driver.enable_ui_scrollable();

            let err = page(&driver, &dir).tap_login().await.unwrap_err();
            assert!(err.is_timeout());
            assert_eq!(driver.viewport(), 1);
        }
    }

    mod menu_tests {
        use super::*;

        fn menu(driver: &MockDriver) {
            let _ = driver.add_element("menu", MockElement::new(""));
            let _ = driver.add_element("menu-login", MockElement::new("Log In"));
            driver.set_results(MENU_BUTTON, &["menu"]);
            driver.set_results(MENU_LOGIN_TEXT, &["menu-login"]);
        }

        #[tokio::test]
        async fn test_open_login_from_menu_clicks_entry() {
            let driver = Arc::new(MockDriver::new());
            let dir = TempDir::new().unwrap();
            menu(&driver);

            page(&driver, &dir).open_login_from_menu().await.unwrap();
            assert!(driver.was_clicked("menu-login"));
            assert!(!driver.was_clicked("menu"));
        }

        #[tokio::test]
        async fn test_login_via_menu_clicks_menu_then_logs_in() {
            let driver = Arc::new(MockDriver::new());
            let dir = TempDir::new().unwrap();
            menu(&driver);
            login_screen(&driver);

            page(&driver, &dir)
                .login_via_menu("visual@example.com", "10203040")
                .await
                .unwrap();

            let clicks: Vec<String> = driver
                .history()
                .into_iter()
                .filter(|c| c.starts_with("click:"))
                .collect();
            assert_eq!(clicks, ["click:menu", "click:menu-login", "click:btn"]);
            assert_eq!(driver.typed_text("user").as_deref(), Some("visual@example.com"));
        }

        #[tokio::test]
        async fn test_login_via_menu_without_menu_fails() {
            let driver = Arc::new(MockDriver::new());
            let dir = TempDir::new().unwrap();
            let err = page(&driver, &dir)
                .login_via_menu("a", "b")
                .await
                .unwrap_err();
            assert!(err.to_string().contains("open menu"));
        }
    }

    #[tokio::test]
    async fn test_page_object_anchor() {
        let driver = Arc::new(MockDriver::new());
        let dir = TempDir::new().unwrap();
        login_screen(&driver);
        let page = page(&driver, &dir);
        assert_eq!(page.page_name(), "login");
        assert!(page.is_displayed(quick()).await);
    }

    #[test]
    fn test_artifact_slug() {
        assert_eq!(artifact_slug("test-LOGIN"), "test_LOGIN");
        assert_eq!(artifact_slug("//*[@text='Log In']"), "_____text__Log_In__");
    }
}
