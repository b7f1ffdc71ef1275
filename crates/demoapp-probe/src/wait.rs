//! Explicit waits.
//!
//! Polls the driver until the first element matching a locator is displayed
//! (and, for clickability, enabled). Lookup errors while polling count as
//! "not there yet", except a lost session, which fails the wait at once.

use crate::driver::{ElementRef, MobileDriver};
use crate::locator::Locator;
use crate::result::{ProbeError, ProbeResult};
use std::time::Duration;
use tokio::time::Instant;

/// Default polling interval (250ms)
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 250;

/// Options for wait operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitOptions {
    /// Timeout in milliseconds
    pub timeout_ms: u64,
    /// Polling interval in milliseconds
    pub poll_interval_ms: u64,
}

impl Default for WaitOptions {
    fn default() -> Self {
        Self {
            timeout_ms: 10_000,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
        }
    }
}

impl WaitOptions {
    /// Wait options with a timeout in whole seconds
    #[must_use]
    pub const fn seconds(secs: u64) -> Self {
        Self {
            timeout_ms: secs.saturating_mul(1000),
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
        }
    }

    /// Set timeout in milliseconds
    #[must_use]
    pub const fn with_timeout(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    /// Set polling interval in milliseconds
    #[must_use]
    pub const fn with_poll_interval(mut self, poll_interval_ms: u64) -> Self {
        self.poll_interval_ms = poll_interval_ms;
        self
    }

    /// Get timeout as Duration
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Get poll interval as Duration
    #[must_use]
    pub const fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

/// Wait until the first match of `locator` is displayed
pub async fn until_visible(
    driver: &dyn MobileDriver,
    locator: &Locator,
    options: WaitOptions,
) -> ProbeResult<ElementRef> {
    poll(driver, locator, options, false).await
}

/// Wait until the first match of `locator` is displayed and enabled
pub async fn until_clickable(
    driver: &dyn MobileDriver,
    locator: &Locator,
    options: WaitOptions,
) -> ProbeResult<ElementRef> {
    poll(driver, locator, options, true).await
}

async fn poll(
    driver: &dyn MobileDriver,
    locator: &Locator,
    options: WaitOptions,
    require_enabled: bool,
) -> ProbeResult<ElementRef> {
    let started = Instant::now();
    let timeout = options.timeout();
    loop {
        if let Some(element) = ready_element(driver, locator, require_enabled).await? {
            return Ok(element);
        }
        let elapsed = started.elapsed();
        if elapsed >= timeout {
            tracing::debug!(%locator, timeout_ms = options.timeout_ms, "wait timed out");
            return Err(ProbeError::Timeout {
                locator: locator.to_string(),
                ms: options.timeout_ms,
            });
        }
        tokio::time::sleep(options.poll_interval().min(timeout - elapsed)).await;
    }
}

async fn ready_element(
    driver: &dyn MobileDriver,
    locator: &Locator,
    require_enabled: bool,
) -> ProbeResult<Option<ElementRef>> {
    let Some(element) = retryable(driver.find_elements(locator).await)?
        .and_then(|found| found.into_iter().next())
    else {
        return Ok(None);
    };
    if !retryable(driver.element_displayed(&element).await)?.unwrap_or(false) {
        return Ok(None);
    }
    if require_enabled && !retryable(driver.element_enabled(&element).await)?.unwrap_or(false) {
        return Ok(None);
    }
    Ok(Some(element))
}

/// `Ok(None)` for errors worth polling through; a lost session is returned as is
fn retryable<T>(result: ProbeResult<T>) -> ProbeResult<Option<T>> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(e) if e.is_session_lost() => Err(e),
        Err(e) => {
            tracing::trace!(error = %e, "lookup failed, polling again");
            Ok(None)
        }
    }
}
