//! Login flow steps.

use super::context::ScenarioContext;
use super::launcher::SessionLauncher;
use crate::locator::Locator;
use crate::pages::login::MENU_BUTTON;
use crate::result::{ProbeError, ProbeResult};
use crate::wait::{self, WaitOptions};
use tracing::{info, warn};

/// Element that marks the home screen
pub const HOME_SCREEN: Locator = MENU_BUTTON;

/// "que o app está aberto na tela de login"
///
/// Checks the Android toolchain, resolves the Appium endpoint, opens a
/// session with the configured capabilities and installs the login page.
pub async fn open_app(ctx: &mut ScenarioContext, launcher: &dyn SessionLauncher) -> ProbeResult<()> {
    let report = launcher.check_environment();
    if !report.ok {
        return Err(ProbeError::EnvironmentNotReady {
            notes: report.notes,
        });
    }

    let endpoint = launcher
        .probe_endpoint(&ctx.config.appium_server, ctx.config.probe_timeout())
        .await;
    let capabilities = ctx.config.capabilities();
    info!(%endpoint, device = %ctx.config.device_name, "opening app");
    let driver = launcher.launch(&endpoint, capabilities).await?;

    ctx.login_page = Some(ctx.new_login_page(driver.clone()));
    ctx.driver = Some(driver);
    Ok(())
}

/// "eu digito o usuário "{u}" e a senha "{p}""
///
/// When the username field never shows up the app is assumed to have opened
/// elsewhere; the login screen is reached through the side menu and the
/// username is typed again.
pub async fn enter_credentials(
    ctx: &ScenarioContext,
    username: &str,
    password: &str,
) -> ProbeResult<()> {
    let page = ctx.login_page()?;
    match page.enter_username(username).await {
        Ok(()) => {}
        Err(e) if e.is_timeout() => {
            warn!(error = %e, "username field not found, opening login from the menu");
            page.open_menu().await?;
            page.open_login_from_menu().await?;
            page.enter_username(username).await?;
        }
        Err(e) => return Err(e),
    }
    page.enter_password(password).await
}

/// "clico no botão de login"
pub async fn click_login(ctx: &ScenarioContext) -> ProbeResult<()> {
    ctx.login_page()?.tap_login().await
}

/// "devo ver a tela inicial do app"
///
/// Waits for the home screen marker, by default for `HOME_WAIT_SECONDS`.
pub async fn verify_home_screen(
    ctx: &ScenarioContext,
    timeout: Option<WaitOptions>,
) -> ProbeResult<()> {
    let driver = ctx.driver()?;
    let options = timeout.unwrap_or_else(|| ctx.config.home_wait());
    let _ = wait::until_visible(driver.as_ref(), &HOME_SCREEN, options).await?;
    info!("home screen visible");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SessionConfig;
    use crate::driver::{MobileDriver, SharedDriver};
    use crate::environment::EnvironmentReport;
    use crate::mock::{MockDriver, MockElement};
    use crate::pages::login::{LOGIN_BUTTON, MENU_LOGIN_TEXT, PASSWORD_FIELD, USERNAME_FIELD};
    use async_trait::async_trait;
    use serde_json::{Map, Value};
    use std::sync::{Arc, Mutex};
    use std::time::Duration;
    use tempfile::TempDir;

    fn quick() -> WaitOptions {
        WaitOptions::default()
            .with_timeout(40)
            .with_poll_interval(10)
    }

    #[derive(Debug, Default)]
    struct Calls {
        probed: Option<(String, Duration)>,
        launched: Option<(String, Map<String, Value>)>,
    }

    struct FakeLauncher {
        env_ok: bool,
        driver: Arc<MockDriver>,
        calls: Mutex<Calls>,
    }

    impl FakeLauncher {
        fn new(env_ok: bool) -> Self {
            Self {
                env_ok,
                driver: Arc::new(MockDriver::new()),
                calls: Mutex::new(Calls::default()),
            }
        }
    }

    #[async_trait]
    impl SessionLauncher for FakeLauncher {
        fn check_environment(&self) -> EnvironmentReport {
            EnvironmentReport {
                ok: self.env_ok,
                notes: "adb not found on PATH. ".to_string(),
                ..EnvironmentReport::default()
            }
        }

        async fn probe_endpoint(&self, base_url: &str, timeout: Duration) -> String {
            self.calls.lock().unwrap().probed = Some((base_url.to_string(), timeout));
            format!("{base_url}/wd/hub")
        }

        async fn launch(
            &self,
            endpoint: &str,
            capabilities: Map<String, Value>,
        ) -> ProbeResult<SharedDriver> {
            self.calls.lock().unwrap().launched = Some((endpoint.to_string(), capabilities));
            Ok(self.driver.clone())
        }
    }

    fn context(driver: &Arc<MockDriver>, dir: &TempDir) -> ScenarioContext {
        let config = SessionConfig::default().with_artifacts_dir(dir.path());
        ScenarioContext::with_driver(config, driver.clone()).with_page_wait(quick())
    }

    fn with_login_page(mut ctx: ScenarioContext) -> ScenarioContext {
        let driver = ctx.driver.clone().unwrap();
        ctx.login_page = Some(ctx.new_login_page(driver));
        ctx
    }

    mod open_app_tests {
        use super::*;

        #[tokio::test]
        async fn test_environment_problem_stops_before_launch() {
            let launcher = FakeLauncher::new(false);
            let mut ctx = ScenarioContext::default();

            let err = open_app(&mut ctx, &launcher).await.unwrap_err();
            assert!(matches!(err, ProbeError::EnvironmentNotReady { .. }));
            assert!(err.to_string().contains("adb not found"));
            let calls = launcher.calls.lock().unwrap();
            assert!(calls.probed.is_none());
            assert!(calls.launched.is_none());
            assert!(ctx.driver.is_none());
        }

        #[tokio::test]
        async fn test_launches_on_detected_endpoint() {
            let launcher = FakeLauncher::new(true);
            let config = SessionConfig::default()
                .with_server("http://appium:4723")
                .with_launch_activity(".MainActivity");
            let mut ctx = ScenarioContext::new(config);

            open_app(&mut ctx, &launcher).await.unwrap();

            let calls = launcher.calls.lock().unwrap();
            let (base, timeout) = calls.probed.clone().unwrap();
            assert_eq!(base, "http://appium:4723");
            assert_eq!(timeout, Duration::from_secs(2));
            let (endpoint, caps) = calls.launched.clone().unwrap();
            assert_eq!(endpoint, "http://appium:4723/wd/hub");
            assert_eq!(caps["appium:appWaitActivity"], ".MainActivity,*");
            assert!(ctx.driver.is_some());
            assert!(ctx.login_page.is_some());
        }
    }

    mod credential_tests {
        use super::*;

        fn form(driver: &MockDriver) {
            let _ = driver.add_element("user", MockElement::new(""));
            let _ = driver.add_element("pass", MockElement::new(""));
            let _ = driver.add_element("btn", MockElement::new("LOGIN"));
            driver.set_results(USERNAME_FIELD, &["user"]);
            driver.set_results(PASSWORD_FIELD, &["pass"]);
            driver.set_results(LOGIN_BUTTON, &["btn"]);
        }

        #[tokio::test]
        async fn test_enter_credentials_and_click() {
            let driver = Arc::new(MockDriver::new());
            let dir = TempDir::new().unwrap();
            form(&driver);
            let ctx = with_login_page(context(&driver, &dir));

            enter_credentials(&ctx, "bob@example.com", "10203040")
                .await
                .unwrap();
            click_login(&ctx).await.unwrap();

            assert_eq!(driver.typed_text("user").as_deref(), Some("bob@example.com"));
            assert_eq!(driver.typed_text("pass").as_deref(), Some("10203040"));
            assert!(driver.was_clicked("btn"));
            assert!(!driver.was_called("click:menu"));
        }

        #[tokio::test]
        async fn test_enter_credentials_falls_back_to_menu() {
            let driver = Arc::new(MockDriver::new());
            let dir = TempDir::new().unwrap();
            let _ = driver.add_element("menu", MockElement::new(""));
            let _ = driver.add_element("menu-login", MockElement::new("Log In"));
            let _ = driver.add_element("user", MockElement::new(""));
            let _ = driver.add_element("pass", MockElement::new(""));
            driver.set_results(MENU_BUTTON, &["menu"]);
            driver.set_results(MENU_LOGIN_TEXT, &["menu-login"]);
            // the form only exists after the menu entry is tapped
            driver.set_viewports(USERNAME_FIELD, &[&[], &["user"]]);
            driver.set_results(PASSWORD_FIELD, &["pass"]);
            driver.navigate_on_click("menu-login");
            let ctx = with_login_page(context(&driver, &dir));

            enter_credentials(&ctx, "usuarioX", "senhaX").await.unwrap();

            assert!(driver.was_clicked("menu"));
            assert!(driver.was_clicked("menu-login"));
            assert_eq!(driver.typed_text("user").as_deref(), Some("usuarioX"));
            assert_eq!(driver.typed_text("pass").as_deref(), Some("senhaX"));
        }

        #[tokio::test]
        async fn test_lost_session_skips_menu_fallback() {
            let driver = Arc::new(MockDriver::new());
            let dir = TempDir::new().unwrap();
            form(&driver);
            let ctx = with_login_page(context(&driver, &dir));
            MobileDriver::quit(driver.as_ref()).await.unwrap();

            let err = enter_credentials(&ctx, "bob@example.com", "10203040")
                .await
                .unwrap_err();

            assert!(err.is_session_lost());
            assert!(!driver.was_called("find_elements:accessibility id=open menu"));
            assert!(!driver.was_called("screenshot"));
        }

        #[tokio::test]
        async fn test_steps_without_login_page_fail() {
            let driver = Arc::new(MockDriver::new());
            let dir = TempDir::new().unwrap();
            let ctx = context(&driver, &dir);
            let err = click_login(&ctx).await.unwrap_err();
            assert!(matches!(err, ProbeError::InvalidState { .. }));
        }
    }

    mod home_tests {
        use super::*;

        #[tokio::test]
        async fn test_home_screen_visible() {
            let driver = Arc::new(MockDriver::new());
            let dir = TempDir::new().unwrap();
            let _ = driver.add_element("menu", MockElement::new(""));
            driver.set_results(HOME_SCREEN, &["menu"]);

            verify_home_screen(&context(&driver, &dir), Some(quick()))
                .await
                .unwrap();
        }

        #[tokio::test]
        async fn test_home_screen_missing_times_out() {
            let driver = Arc::new(MockDriver::new());
            let dir = TempDir::new().unwrap();
            let err = verify_home_screen(&context(&driver, &dir), Some(quick()))
                .await
                .unwrap_err();
            assert!(err.is_timeout());
            assert!(err.to_string().contains("open menu"));
        }

        #[tokio::test]
        async fn test_home_screen_requires_driver() {
            let err = verify_home_screen(&ScenarioContext::default(), Some(quick()))
                .await
                .unwrap_err();
            assert!(matches!(err, ProbeError::InvalidState { .. }));
        }
    }
}
