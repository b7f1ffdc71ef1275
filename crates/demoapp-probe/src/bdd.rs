//! Gherkin runner binding the Portuguese scenario sentences to the steps.
//!
//! ```text
//! Funcionalidade: Login
//!   Cenário: Login com credenciais válidas
//!     Dado que o app está aberto na tela de login
//!     Quando eu digito o usuário "bob@example.com" e a senha "10203040"
//!     E clico no botão de login
//!     Então devo ver a tela inicial do app
//! ```

use crate::config::SessionConfig;
use crate::logging;
use crate::result::ProbeResult;
use crate::steps::{self, AppiumLauncher, ScenarioContext};
use cucumber::writer::Stats as _;
use cucumber::{given, then, when, World};
use futures::FutureExt;
use std::path::Path;
use tracing::info;

/// Scenario world around a [`ScenarioContext`]
#[derive(Debug, Default, World)]
pub struct DemoAppWorld {
    /// Step state
    pub ctx: ScenarioContext,
}

#[given("que o app está aberto na tela de login")]
async fn app_open_on_login(world: &mut DemoAppWorld) -> ProbeResult<()> {
    steps::open_app(&mut world.ctx, &AppiumLauncher).await
}

#[when(expr = "eu digito o usuário {string} e a senha {string}")]
async fn type_credentials(world: &mut DemoAppWorld, username: String, password: String) -> ProbeResult<()> {
    steps::enter_credentials(&world.ctx, &username, &password).await
}

#[when("clico no botão de login")]
async fn tap_login(world: &mut DemoAppWorld) -> ProbeResult<()> {
    steps::click_login(&world.ctx).await
}

#[then("devo ver a tela inicial do app")]
async fn home_screen_visible(world: &mut DemoAppWorld) -> ProbeResult<()> {
    steps::verify_home_screen(&world.ctx, None).await
}

#[given(expr = "que estou logado como {string} e senha {string}")]
async fn logged_in_as(world: &mut DemoAppWorld, username: String, password: String) -> ProbeResult<()> {
    steps::logged_in(&world.ctx, &username, &password).await
}

#[given("que o app está aberto na tela de produtos")]
fn app_open_on_products(world: &mut DemoAppWorld) -> ProbeResult<()> {
    steps::app_on_products(&mut world.ctx)
}

#[when(expr = "eu comparo os produtos {int} e {int}")]
async fn compare(world: &mut DemoAppWorld, first: usize, second: usize) -> ProbeResult<()> {
    steps::compare_products(&mut world.ctx, first, second).await
}

#[then("os títulos dos produtos devem ser diferentes")]
fn titles_differ(world: &mut DemoAppWorld) -> ProbeResult<()> {
    steps::assert_titles_different(&world.ctx)
}

#[then("os títulos dos produtos devem ser iguais")]
fn titles_match(world: &mut DemoAppWorld) -> ProbeResult<()> {
    steps::assert_titles_equal(&world.ctx)
}

/// Run every feature under `features`; returns `true` when nothing failed.
///
/// Each scenario starts with a copy of `config` and closes its session in
/// the after hook, whatever the outcome.
pub async fn run(features: impl AsRef<Path>, config: SessionConfig) -> bool {
    let _ = logging::init("debug");
    info!(features = %features.as_ref().display(), server = %config.appium_server, "running features");

    // argv belongs to the caller (CLI or test harness), not to cucumber
    let writer = DemoAppWorld::cucumber()
        .with_default_cli()
        .before(move |_feature, _rule, _scenario, world| {
            world.ctx = ScenarioContext::new(config.clone());
            futures::future::ready(()).boxed_local()
        })
        .after(|_feature, _rule, _scenario, _finished, world| {
            async move {
                if let Some(world) = world {
                    steps::after_scenario(&mut world.ctx).await;
                }
            }
            .boxed_local()
        })
        .run(features.as_ref())
        .await;

    !writer.execution_has_failed()
}
