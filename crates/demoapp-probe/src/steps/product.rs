//! Catalog steps.

use super::context::ScenarioContext;
use crate::pages::product::{DEFAULT_COLLECT_SCROLLS, DEFAULT_WAIT_AFTER_SCROLL};
use crate::result::{ProbeError, ProbeResult};
use tracing::{info, warn};

/// "que estou logado como "{u}" e senha "{p}""
///
/// Tries the login form directly. If that times out (the app opened on
/// another screen), logs in through the side menu instead.
pub async fn logged_in(ctx: &ScenarioContext, username: &str, password: &str) -> ProbeResult<()> {
    let page = ctx.login_page()?;
    match page.login(username, password).await {
        Ok(()) => Ok(()),
        Err(e) if e.is_timeout() => {
            warn!(error = %e, "direct login timed out, retrying through the menu");
            page.login_via_menu(username, password).await
        }
        Err(e) => Err(e),
    }
}

/// "que o app está aberto na tela de produtos"
pub fn app_on_products(ctx: &mut ScenarioContext) -> ProbeResult<()> {
    let driver = ctx.driver()?.clone();
    ctx.product_page = Some(ctx.new_product_page(driver));
    Ok(())
}

/// "eu comparo os produtos {i1} e {i2}" (1-based positions)
///
/// Scrolls until both positions are known, then stores the comparison in
/// the context. Missing catalog entries fail the step with the titles that
/// were found.
pub async fn compare_products(ctx: &mut ScenarioContext, first: usize, second: usize) -> ProbeResult<()> {
    if first == 0 || second == 0 {
        return Err(ProbeError::invalid_argument(format!(
            "product positions are 1-based, got {first} and {second}"
        )));
    }
    if ctx.product_page.is_none() {
        app_on_products(ctx)?;
    }
    let page = ctx
        .product_page
        .as_mut()
        .ok_or_else(|| ProbeError::invalid_state("product page not initialised"))?;

    let required = first.max(second);
    if let Err(e) = page
        .ensure_minimum_products(required, DEFAULT_COLLECT_SCROLLS, DEFAULT_WAIT_AFTER_SCROLL)
        .await
    {
        let _ = page
            .capture_debug_artifacts("ensure_minimum_products_error")
            .await;
        return Err(e);
    }

    let titles = page.last_collected().unwrap_or_default().to_vec();
    if titles.len() < required {
        let _ = page
            .capture_debug_artifacts("compare_products_insufficient")
            .await;
        return Err(ProbeError::assertion(format!(
            "Não existem itens suficientes no catálogo para comparar. \
             Índice solicitado máximo: {required}. Produtos visíveis: {}. \
             Títulos visíveis: {titles:?}.",
            titles.len()
        )));
    }

    let result = page.compare_products(first - 1, second - 1).await?;
    info!(a = %result.product_a, b = %result.product_b, equal = result.equal, "products compared");
    ctx.compare_result = Some(result);
    Ok(())
}

/// "os títulos dos produtos devem ser diferentes"
pub fn assert_titles_different(ctx: &ScenarioContext) -> ProbeResult<()> {
    let result = comparison(ctx)?;
    if result.equal {
        return Err(ProbeError::assertion(format!(
            "expected different products, got: {} == {}",
            result.product_a, result.product_b
        )));
    }
    Ok(())
}

/// "os títulos dos produtos devem ser iguais"
pub fn assert_titles_equal(ctx: &ScenarioContext) -> ProbeResult<()> {
    let result = comparison(ctx)?;
    if !result.equal {
        return Err(ProbeError::assertion(format!(
            "expected equal products, got: {} != {}",
            result.product_a, result.product_b
        )));
    }
    Ok(())
}

fn comparison(ctx: &ScenarioContext) -> ProbeResult<&crate::pages::ComparisonResult> {
    ctx.compare_result
        .as_ref()
        .ok_or_else(|| ProbeError::assertion("no comparison result recorded in the scenario"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SessionConfig;
    use crate::mock::{MockDriver, MockElement};
    use crate::pages::login::{
        LOGIN_BUTTON, MENU_BUTTON, MENU_LOGIN_TEXT, PASSWORD_FIELD, USERNAME_FIELD,
    };
    use crate::pages::product::PRODUCT_TITLE;
    use crate::pages::ComparisonResult;
    use crate::wait::WaitOptions;
    use std::sync::Arc;
    use tempfile::TempDir;

    fn quick() -> WaitOptions {
        WaitOptions::default()
            .with_timeout(40)
            .with_poll_interval(10)
    }

    fn context(driver: &Arc<MockDriver>, dir: &TempDir) -> ScenarioContext {
        let config = SessionConfig::default().with_artifacts_dir(dir.path());
        ScenarioContext::with_driver(config, driver.clone()).with_page_wait(quick())
    }

    fn catalog(driver: &MockDriver, titles: &[&str]) {
        for title in titles {
            let _ = driver.add_element(*title, MockElement::new(*title));
        }
        driver.set_results(PRODUCT_TITLE, titles);
    }

    fn artifact_names(dir: &TempDir) -> Vec<String> {
        std::fs::read_dir(dir.path())
            .map(|entries| {
                entries
                    .filter_map(Result::ok)
                    .map(|e| e.file_name().to_string_lossy().into_owned())
                    .collect()
            })
            .unwrap_or_default()
    }

    mod login_tests {
        use super::*;

        fn form(driver: &MockDriver) {
            let _ = driver.add_element("user", MockElement::new(""));
            let _ = driver.add_element("pass", MockElement::new(""));
            let _ = driver.add_element("btn", MockElement::new("LOGIN"));
            driver.set_results(PASSWORD_FIELD, &["pass"]);
            driver.set_results(LOGIN_BUTTON, &["btn"]);
        }

        #[tokio::test]
        async fn test_logged_in_requires_login_page() {
            let driver = Arc::new(MockDriver::new());
            let dir = TempDir::new().unwrap();
            let err = logged_in(&context(&driver, &dir), "u", "p")
                .await
                .unwrap_err();
            assert!(matches!(err, ProbeError::InvalidState { .. }));
        }

        #[tokio::test]
        async fn test_logged_in_direct() {
            let driver = Arc::new(MockDriver::new());
            let dir = TempDir::new().unwrap();
            form(&driver);
            driver.set_results(USERNAME_FIELD, &["user"]);
            let mut ctx = context(&driver, &dir);
            ctx.login_page = Some(ctx.new_login_page(driver.clone()));

            logged_in(&ctx, "visual@example.com", "10203040")
                .await
                .unwrap();
            assert!(driver.was_clicked("btn"));
            assert!(!driver.was_called("click:menu"));
        }

        #[tokio::test]
        async fn test_logged_in_lost_session_skips_menu() {
            let driver = Arc::new(MockDriver::new());
            let dir = TempDir::new().unwrap();
            form(&driver);
            driver.set_results(USERNAME_FIELD, &["user"]);
            let mut ctx = context(&driver, &dir);
            ctx.login_page = Some(ctx.new_login_page(driver.clone()));
            crate::driver::MobileDriver::quit(driver.as_ref()).await.unwrap();

            let err = logged_in(&ctx, "visual@example.com", "10203040")
                .await
                .unwrap_err();
            assert!(err.is_session_lost());
            assert!(!driver.was_called("find_elements:accessibility id=open menu"));
        }

        #[tokio::test]
        async fn test_logged_in_falls_back_to_menu() {
            let driver = Arc::new(MockDriver::new());
            let dir = TempDir::new().unwrap();
            form(&driver);
            let _ = driver.add_element("menu", MockElement::new(""));
            let _ = driver.add_element("menu-login", MockElement::new("Log In"));
            driver.set_results(MENU_BUTTON, &["menu"]);
            driver.set_results(MENU_LOGIN_TEXT, &["menu-login"]);
            driver.set_viewports(USERNAME_FIELD, &[&[], &["user"]]);
            driver.navigate_on_click("menu-login");
            let mut ctx = context(&driver, &dir);
            ctx.login_page = Some(ctx.new_login_page(driver.clone()));

            logged_in(&ctx, "visual@example.com", "10203040")
                .await
                .unwrap();

            let clicks: Vec<String> = driver
                .history()
                .into_iter()
                .filter(|c| c.starts_with("click:"))
                .collect();
            assert_eq!(clicks, ["click:menu", "click:menu-login", "click:btn"]);
        }

        #[tokio::test]
        async fn test_logged_in_menu_failure_propagates() {
            let driver = Arc::new(MockDriver::new());
            let dir = TempDir::new().unwrap();
            let mut ctx = context(&driver, &dir);
            ctx.login_page = Some(ctx.new_login_page(driver.clone()));

            let err = logged_in(&ctx, "u", "p").await.unwrap_err();
            assert!(err.is_timeout());
            assert!(err.to_string().contains("open menu"));
        }
    }

    mod compare_tests {
        use super::*;

        #[test]
        fn test_app_on_products_requires_driver() {
            let mut ctx = ScenarioContext::default();
            let err = app_on_products(&mut ctx).unwrap_err();
            assert!(matches!(err, ProbeError::InvalidState { .. }));
        }

        #[tokio::test]
        async fn test_compare_stores_result() {
            let driver = Arc::new(MockDriver::new());
            let dir = TempDir::new().unwrap();
            catalog(&driver, &["Sauce Labs Backpack", "Sauce Labs Bike Light"]);
            let mut ctx = context(&driver, &dir);

            compare_products(&mut ctx, 1, 2).await.unwrap();

            assert!(ctx.product_page.is_some());
            assert_eq!(
                ctx.compare_result,
                Some(ComparisonResult::new("Sauce Labs Backpack", "Sauce Labs Bike Light"))
            );
            assert_titles_different(&ctx).unwrap();
            assert!(assert_titles_equal(&ctx).is_err());
        }

        #[tokio::test]
        async fn test_compare_same_position_is_equal() {
            let driver = Arc::new(MockDriver::new());
            let dir = TempDir::new().unwrap();
            catalog(&driver, &["Sauce Labs Onesie"]);
            let mut ctx = context(&driver, &dir);
            app_on_products(&mut ctx).unwrap();

            compare_products(&mut ctx, 1, 1).await.unwrap();
            assert_titles_equal(&ctx).unwrap();
            let err = assert_titles_different(&ctx).unwrap_err();
            assert!(err.to_string().contains("Sauce Labs Onesie == Sauce Labs Onesie"));
        }

        #[tokio::test]
        async fn test_compare_zero_position_rejected() {
            let driver = Arc::new(MockDriver::new());
            let dir = TempDir::new().unwrap();
            let mut ctx = context(&driver, &dir);
            let err = compare_products(&mut ctx, 0, 2).await.unwrap_err();
            assert!(matches!(err, ProbeError::InvalidArgument { .. }));
        }

        #[tokio::test]
        async fn test_insufficient_catalog_captures_and_fails() {
            let driver = Arc::new(MockDriver::new());
            driver.set_page_source("<hierarchy/>");
            let dir = TempDir::new().unwrap();
            catalog(&driver, &["Sauce Labs Backpack", "Sauce Labs Bike Light"]);
            let mut ctx = context(&driver, &dir);

            let err = compare_products(&mut ctx, 1, 4).await.unwrap_err();

            assert!(matches!(err, ProbeError::AssertionFailed { .. }));
            let message = err.to_string();
            assert!(message.contains("Não existem itens suficientes"));
            assert!(message.contains("Índice solicitado máximo: 4"));
            assert!(message.contains("Produtos visíveis: 2"));
            assert!(message.contains("Sauce Labs Bike Light"));
            assert!(ctx.compare_result.is_none());
            let names = artifact_names(&dir);
            assert_eq!(names.len(), 1);
            assert!(names[0].starts_with("compare_products_insufficient_"));
        }

        #[tokio::test]
        async fn test_collection_error_captures_and_propagates() {
            let driver = Arc::new(MockDriver::new());
            let dir = TempDir::new().unwrap();
            let mut ctx = context(&driver, &dir);
            app_on_products(&mut ctx).unwrap();
            crate::driver::MobileDriver::quit(driver.as_ref()).await.unwrap();

            let err = compare_products(&mut ctx, 1, 2).await.unwrap_err();
            assert!(err.is_session_lost());
            assert!(driver.was_called("page_source"));
        }

        #[test]
        fn test_assertions_without_result() {
            let ctx = ScenarioContext::default();
            assert!(matches!(
                assert_titles_equal(&ctx),
                Err(ProbeError::AssertionFailed { .. })
            ));
            assert!(assert_titles_different(&ctx).is_err());
        }
    }
}
