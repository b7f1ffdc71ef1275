//! Step definitions for the login and product comparison scenarios.
//!
//! Each step is a plain async function over a [`ScenarioContext`], so the
//! flows can be driven by the Gherkin runner or called directly from tests.

pub mod context;
pub mod launcher;
pub mod login;
pub mod product;

pub use context::ScenarioContext;
pub use launcher::{AppiumLauncher, SessionLauncher};
pub use login::{click_login, enter_credentials, open_app, verify_home_screen, HOME_SCREEN};
pub use product::{
    app_on_products, assert_titles_different, assert_titles_equal, compare_products, logged_in,
};

use tracing::{debug, warn};

/// Scenario teardown: ends the session and drops page state.
///
/// Quit failures are logged and never fail the scenario.
pub async fn after_scenario(ctx: &mut ScenarioContext) {
    ctx.login_page = None;
    ctx.product_page = None;
    ctx.compare_result = None;
    let Some(driver) = ctx.driver.take() else {
        return;
    };
    match driver.quit().await {
        Ok(()) => debug!("session closed"),
        Err(e) => warn!(error = %e, "failed to close session"),
    }
}
