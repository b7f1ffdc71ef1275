//! demoapp-probe: UI test automation for the My Demo App Android catalog
//!
//! Drives the Sauce Labs "My Demo App" through an Appium server speaking the
//! W3C WebDriver protocol. The crate is layered so every flow can also run
//! against an in-memory driver:
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │   ┌────────────┐    ┌────────────┐    ┌────────────┐            │
//! │   │ .feature   │    │ Steps      │    │ Page       │            │
//! │   │ (Gherkin)  │───►│ (Scenario  │───►│ Objects    │            │
//! │   │            │    │  Context)  │    │            │            │
//! │   └────────────┘    └────────────┘    └─────┬──────┘            │
//! │                                             │                   │
//! │                          ┌──────────────────┴──────┐            │
//! │                          ▼                         ▼            │
//! │                    ┌────────────┐           ┌────────────┐      │
//! │                    │ Appium     │           │ MockDriver │      │
//! │                    │ (HTTP)     │           │ (tests)    │      │
//! │                    └────────────┘           └────────────┘      │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```no_run
//! use demoapp_probe::{LoginPage, SessionConfig, SharedDriver};
//! use demoapp_probe::{AppiumDriver, ProbeResult};
//! use std::sync::Arc;
//!
//! # async fn demo() -> ProbeResult<()> {
//! let config = SessionConfig::from_env()?;
//! let driver: SharedDriver =
//!     Arc::new(AppiumDriver::start(&config.appium_server, config.capabilities()).await?);
//! LoginPage::new(driver).login("bob@example.com", "10203040").await?;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![cfg_attr(test, allow(clippy::large_stack_arrays, clippy::large_stack_frames))]

mod artifacts;
mod config;
mod driver;
mod locator;
mod result;
mod wait;

/// Scroll gestures with fallbacks across driver capabilities
pub mod gesture;

/// Android toolchain checks
pub mod environment;

/// Appium endpoint discovery
pub mod endpoint;

/// Tracing subscriber setup
pub mod logging;

/// Scriptable in-memory driver for unit tests
#[allow(clippy::missing_panics_doc, clippy::must_use_candidate)]
pub mod mock;

/// Screen abstraction shared by page objects
pub mod page_object;

/// Login and catalog page objects
#[allow(clippy::missing_errors_doc)]
pub mod pages;

/// Scenario step definitions
#[allow(clippy::missing_errors_doc)]
pub mod steps;

/// W3C WebDriver client for Appium
#[allow(clippy::missing_errors_doc)]
pub mod webdriver;

/// Cucumber bindings
#[cfg(feature = "bdd")]
pub mod bdd;

pub use artifacts::{ArtifactCapture, ArtifactPaths, DEFAULT_ARTIFACTS_DIR};
pub use config::{SessionConfig, DEFAULT_APPIUM_SERVER, DEFAULT_APP_PATH, DEFAULT_DEVICE_NAME};
pub use driver::{ElementRef, MobileDriver, SharedDriver, SwipePath, WindowSize};
pub use environment::{check_android_environment, EnvironmentReport};
pub use locator::{By, Locator};
pub use mock::{MockDriver, MockElement};
pub use page_object::PageObject;
pub use pages::{ComparisonResult, LoginPage, ProductPage};
pub use result::{ProbeError, ProbeResult};
pub use steps::{after_scenario, AppiumLauncher, ScenarioContext, SessionLauncher};
pub use wait::{until_clickable, until_visible, WaitOptions, DEFAULT_POLL_INTERVAL_MS};
pub use webdriver::AppiumDriver;
