//! Per-scenario state shared by step definitions.

use crate::artifacts::ArtifactCapture;
use crate::config::SessionConfig;
use crate::driver::SharedDriver;
use crate::pages::{ComparisonResult, LoginPage, ProductPage};
use crate::result::{ProbeError, ProbeResult};
use crate::wait::WaitOptions;

/// State carried from one step of a scenario to the next
#[derive(Debug, Default)]
pub struct ScenarioContext {
    /// Session and artifact settings
    pub config: SessionConfig,
    /// Open automation session, if any
    pub driver: Option<SharedDriver>,
    /// Login screen, installed when the app is opened
    pub login_page: Option<LoginPage>,
    /// Catalog screen, installed on demand
    pub product_page: Option<ProductPage>,
    /// Result of the last product comparison
    pub compare_result: Option<ComparisonResult>,
    /// Overrides the default element wait of every page object
    pub page_wait: Option<WaitOptions>,
}

impl ScenarioContext {
    /// Empty context with the given settings
    #[must_use]
    pub fn new(config: SessionConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    /// Context around an already open session
    #[must_use]
    pub fn with_driver(config: SessionConfig, driver: SharedDriver) -> Self {
        Self {
            config,
            driver: Some(driver),
            ..Self::default()
        }
    }

    /// Override page object waits
    #[must_use]
    pub fn with_page_wait(mut self, wait: WaitOptions) -> Self {
        self.page_wait = Some(wait);
        self
    }

    /// The open session
    pub fn driver(&self) -> ProbeResult<&SharedDriver> {
        self.driver.as_ref().ok_or_else(|| {
            ProbeError::invalid_state("driver not initialised; run the step that opens the app first")
        })
    }

    /// The login page
    pub fn login_page(&self) -> ProbeResult<&LoginPage> {
        self.login_page.as_ref().ok_or_else(|| {
            ProbeError::invalid_state("login page not found; run the step that opens the app first")
        })
    }

    /// Artifact writer for this scenario
    #[must_use]
    pub fn artifacts(&self) -> ArtifactCapture {
        ArtifactCapture::new(self.config.artifacts_dir.clone())
    }

    /// Build a login page on `driver`
    #[must_use]
    pub fn new_login_page(&self, driver: SharedDriver) -> LoginPage {
        let page = LoginPage::new(driver).with_artifacts(self.artifacts());
        match self.page_wait {
            Some(wait) => page.with_wait(wait),
            None => page,
        }
    }

    /// Build a catalog page on `driver`
    #[must_use]
    pub fn new_product_page(&self, driver: SharedDriver) -> ProductPage {
        let page = ProductPage::new(driver).with_artifacts(self.artifacts());
        match self.page_wait {
            Some(wait) => page.with_wait(wait),
            None => page,
        }
    }
}
