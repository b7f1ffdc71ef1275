//! Product catalog screen.
//!
//! Catalog cards are an image (`productIV`) plus a title (`productTV`).
//! Depending on the build and the scroll position the title views are not
//! always exposed, so [`ProductPage::get_all_product_titles`] falls back
//! through image lookups, global XPath relations and a per-index mapping
//! before giving up. [`ProductPage::collect_product_titles`] scrolls and
//! merges consecutive viewports until enough titles are known.
//!
//! Lookup failures during title extraction count as "nothing found". The one
//! exception is a lost session, which is returned as an error.

use crate::artifacts::{ArtifactCapture, ArtifactPaths};
use crate::driver::{ElementRef, MobileDriver, SharedDriver};
use crate::gesture;
use crate::locator::{By, Locator};
use crate::page_object::PageObject;
use crate::result::{ProbeError, ProbeResult};
use crate::wait::WaitOptions;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, error};

/// Product title text views
pub const PRODUCT_TITLE: Locator = Locator::id("com.saucelabs.mydemoapp.android:id/productTV");

/// UiSelector matching every product image; append `.instance(n)` for one card
pub const PRODUCT_IMAGE_SELECTOR: &str =
    r#"new UiSelector().resourceId("com.saucelabs.mydemoapp.android:id/productIV")"#;

/// Default wait for catalog elements
pub const DEFAULT_WAIT_SECS: u64 = 5;
/// Scroll budget for [`ProductPage::collect_product_titles`]
pub const DEFAULT_COLLECT_SCROLLS: usize = 6;
/// Scroll budget for [`ProductPage::ensure_minimum_products`]
pub const DEFAULT_ENSURE_SCROLLS: usize = 8;
/// Settle time after each scroll
pub const DEFAULT_WAIT_AFTER_SCROLL: Duration = Duration::from_millis(600);

/// Texts that label the screen rather than a product (single viewport check)
const VIEWPORT_HEADERS: [&str; 3] = ["products", "product", ""];
/// Texts never accumulated as product titles
const CATALOG_HEADERS: [&str; 5] = ["", "products", "product", "title", "catalog"];

/// Page-wide image to title relations, most specific first
const GLOBAL_TITLE_XPATHS: [&str; 6] = [
    "//android.widget.ImageView[@resource-id='com.saucelabs.mydemoapp.android:id/productIV']/following-sibling::android.widget.TextView",
    "//android.widget.ImageView[@content-desc='Product Image']/following-sibling::android.widget.TextView",
    "(//android.widget.ImageView[@resource-id='com.saucelabs.mydemoapp.android:id/productIV'])/following::android.widget.TextView[1]",
    "//android.widget.ImageView[@resource-id='com.saucelabs.mydemoapp.android:id/productIV']/parent::*/android.widget.TextView",
    "//android.widget.ImageView[@content-desc='Product Image']/parent::*/android.widget.TextView",
    "//android.widget.ImageView[@resource-id='com.saucelabs.mydemoapp.android:id/productIV']/ancestor::android.view.ViewGroup//android.widget.TextView[@resource-id='com.saucelabs.mydemoapp.android:id/productTV']",
];

/// Relations tried from a single image element
const RELATIVE_TITLE_XPATHS: [&str; 4] = [
    "./following-sibling::android.widget.TextView",
    "./../following-sibling::android.widget.TextView",
    "ancestor::android.view.ViewGroup//android.widget.TextView",
    "ancestor::android.view.ViewGroup//android.widget.TextView[@resource-id='com.saucelabs.mydemoapp.android:id/productTV']",
];

/// Outcome of comparing two catalog entries
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComparisonResult {
    /// Title at the first index
    pub product_a: String,
    /// Title at the second index
    pub product_b: String,
    /// Whether both titles are identical
    pub equal: bool,
}

impl ComparisonResult {
    /// Compare two titles
    #[must_use]
    pub fn new(product_a: impl Into<String>, product_b: impl Into<String>) -> Self {
        let product_a = product_a.into();
        let product_b = product_b.into();
        let equal = product_a == product_b;
        Self {
            product_a,
            product_b,
            equal,
        }
    }
}

/// Locator for the `index`-th product image
#[must_use]
pub fn image_instance_locator(index: usize) -> Locator {
    Locator::new(
        By::AndroidUiAutomator,
        format!("{PRODUCT_IMAGE_SELECTOR}.instance({index})"),
    )
}

/// Page object for the product catalog
#[derive(Debug, Clone)]
pub struct ProductPage {
    driver: SharedDriver,
    wait: WaitOptions,
    artifacts: ArtifactCapture,
    last_collected: Option<Vec<String>>,
}

impl ProductPage {
    /// Catalog page with a 5 second default wait
    #[must_use]
    pub fn new(driver: SharedDriver) -> Self {
        Self {
            driver,
            wait: WaitOptions::seconds(DEFAULT_WAIT_SECS),
            artifacts: ArtifactCapture::default(),
            last_collected: None,
        }
    }

    /// Override the default wait
    #[must_use]
    pub fn with_wait(mut self, wait: WaitOptions) -> Self {
        self.wait = wait;
        self
    }

    /// Write debug artifacts through `artifacts`
    #[must_use]
    pub fn with_artifacts(mut self, artifacts: ArtifactCapture) -> Self {
        self.artifacts = artifacts;
        self
    }

    /// Titles accumulated by the last collection run
    #[must_use]
    pub fn last_collected(&self) -> Option<&[String]> {
        self.last_collected.as_deref()
    }

    /// Title of the `index`-th visible product (0-based)
    pub async fn get_product_title_by_index(&self, index: usize) -> ProbeResult<String> {
        let elements = self.driver.find_elements(&PRODUCT_TITLE).await?;
        let element = elements.get(index).ok_or(ProbeError::IndexOutOfRange {
            index,
            total: elements.len(),
        })?;
        self.driver.element_text(element).await
    }

    /// Tap the `index`-th visible product title (0-based)
    pub async fn select_product(&self, index: usize) -> ProbeResult<ElementRef> {
        let elements = self.driver.find_elements(&PRODUCT_TITLE).await?;
        let element = elements.get(index).ok_or(ProbeError::IndexOutOfRange {
            index,
            total: elements.len(),
        })?;
        self.driver.element_click(element).await?;
        Ok(element.clone())
    }

    /// Tap the `index`-th product image (0-based)
    pub async fn select_product_by_image_index(&self, index: usize) -> ProbeResult<ElementRef> {
        let locator = image_instance_locator(index);
        debug!(%locator, "selecting product by image");
        let image = self.driver.find_element(&locator).await?;
        self.driver.element_click(&image).await?;
        Ok(image)
    }

    /// Titles of the products currently on screen.
    ///
    /// Entries may be empty strings when a card's title could not be read.
    pub async fn get_all_product_titles(&self) -> ProbeResult<Vec<String>> {
        let elements = self.lookup(&PRODUCT_TITLE).await?;
        let mut titles = Vec::with_capacity(elements.len());
        for element in &elements {
            titles.push(self.text_or_empty(element).await);
        }
        debug!(?titles, "initial product titles");

        let header_like =
            titles.len() <= 1 && titles.iter().any(|t| is_header(t, &VIEWPORT_HEADERS));
        if !titles.is_empty() && !header_like {
            return Ok(titles);
        }
        debug!(header_like, count = titles.len(), "title fallback engaged");

        let images = self
            .lookup(&Locator::ui_automator(PRODUCT_IMAGE_SELECTOR))
            .await?;
        debug!(count = images.len(), "product images found");
        if images.is_empty() {
            return Ok(if header_like { Vec::new() } else { titles });
        }

        if let Some(found) = self.titles_from_global_xpaths().await? {
            return Ok(found);
        }
        let mapped = self.titles_by_image_index(&images).await?;
        debug!(titles = ?mapped, "hybrid title mapping");
        Ok(mapped)
    }

    async fn titles_from_global_xpaths(&self) -> ProbeResult<Option<Vec<String>>> {
        for xpath in GLOBAL_TITLE_XPATHS {
            let found = self.lookup(&Locator::xpath(xpath)).await?;
            let mut texts = Vec::new();
            for element in &found {
                let text = self.text_or_empty(element).await;
                let text = text.trim();
                if !is_header(text, &VIEWPORT_HEADERS) {
                    texts.push(text.to_string());
                }
            }
            debug!(xpath, ?texts, "global xpath candidate");
            if !texts.is_empty() {
                return Ok(Some(texts));
            }
        }
        Ok(None)
    }

    /// Per-image mapping: the title at the same index when it is usable,
    /// otherwise whatever the image element itself leads to
    async fn titles_by_image_index(&self, images: &[ElementRef]) -> ProbeResult<Vec<String>> {
        let elements = self.lookup(&PRODUCT_TITLE).await?;
        let mut title_texts = Vec::with_capacity(elements.len());
        for element in &elements {
            title_texts.push(self.text_or_empty(element).await.trim().to_string());
        }

        let valid: Vec<&String> = title_texts
            .iter()
            .filter(|t| !is_header(t, &VIEWPORT_HEADERS))
            .collect();
        if valid.len() >= images.len() {
            return Ok(valid.into_iter().take(images.len()).cloned().collect());
        }

        let mut titles = Vec::with_capacity(images.len());
        for (index, image) in images.iter().enumerate() {
            let chosen = match title_texts
                .get(index)
                .filter(|t| !is_header(t, &VIEWPORT_HEADERS))
            {
                Some(title) => title.clone(),
                None => self.title_from_image(image).await,
            };
            debug!(index, title = %chosen, "mapped image to title");
            titles.push(chosen);
        }
        Ok(titles)
    }

    async fn title_from_image(&self, image: &ElementRef) -> String {
        if let Ok(text) = self.driver.element_text(image).await {
            let text = text.trim();
            if !text.is_empty() {
                return text.to_string();
            }
        }
        for xpath in RELATIVE_TITLE_XPATHS {
            let Ok(element) = self
                .driver
                .find_child_element(image, &Locator::xpath(xpath))
                .await
            else {
                debug!(xpath, "relative lookup found nothing");
                continue;
            };
            let text = self.text_or_empty(&element).await;
            let text = text.trim();
            if !text.is_empty() {
                return text.to_string();
            }
        }
        String::new()
    }

    /// Scroll and accumulate titles until `min_count` are known.
    ///
    /// Stops early when a scroll gesture fails or when two consecutive
    /// scrolls reveal nothing new. The result is cached for
    /// [`compare_products`](Self::compare_products).
    pub async fn collect_product_titles(
        &mut self,
        min_count: usize,
        max_scrolls: usize,
        wait_after_scroll: Duration,
    ) -> ProbeResult<Vec<String>> {
        debug!(min_count, max_scrolls, "collecting product titles");
        let mut accumulated = Vec::new();
        let visible = catalog_titles(self.get_all_product_titles().await?);
        let _ = merge_viewport(&mut accumulated, &visible);
        if accumulated.len() >= min_count {
            debug!(total = accumulated.len(), "initial viewport is enough");
            return Ok(self.remember(accumulated));
        }

        let mut consecutive_no_new = 0;
        for attempt in 1..=max_scrolls {
            if !gesture::scroll_forward(self.driver()).await {
                debug!(attempt, "scroll failed, stopping");
                break;
            }
            tokio::time::sleep(wait_after_scroll).await;

            let visible = catalog_titles(self.get_all_product_titles().await?);
            let added = merge_viewport(&mut accumulated, &visible);
            debug!(attempt, added, total = accumulated.len(), "viewport merged");
            consecutive_no_new = if added > 0 { 0 } else { consecutive_no_new + 1 };

            if accumulated.len() >= min_count {
                break;
            }
            if consecutive_no_new >= 2 {
                debug!(attempt, "no new titles for two scrolls, stopping");
                break;
            }
        }
        debug!(total = accumulated.len(), "collection finished");
        Ok(self.remember(accumulated))
    }

    /// Scroll until at least `min_count` titles are known; returns the count
    pub async fn ensure_minimum_products(
        &mut self,
        min_count: usize,
        max_scrolls: usize,
        wait_after_scroll: Duration,
    ) -> ProbeResult<usize> {
        let titles = self
            .collect_product_titles(min_count, max_scrolls, wait_after_scroll)
            .await?;
        debug!(min_count, found = titles.len(), "ensure_minimum_products");
        Ok(titles.len())
    }

    /// Compare the titles at two 0-based catalog positions.
    ///
    /// Uses the cached collection when it is long enough, otherwise scrolls
    /// for more.
    pub async fn compare_products(
        &mut self,
        index_a: usize,
        index_b: usize,
    ) -> ProbeResult<ComparisonResult> {
        let required = index_a.max(index_b) + 1;
        let cached = self
            .last_collected
            .as_ref()
            .filter(|titles| titles.len() >= required)
            .cloned();
        let titles = match cached {
            Some(cached) => {
                debug!(cached = cached.len(), "comparing from cached titles");
                cached
            }
            None => {
                let settle = self.wait.timeout().mul_f64(0.1);
                self.collect_product_titles(required, DEFAULT_ENSURE_SCROLLS, settle)
                    .await?
            }
        };

        match (titles.get(index_a), titles.get(index_b)) {
            (Some(a), Some(b)) => Ok(ComparisonResult::new(a.as_str(), b.as_str())),
            _ => {
                error!(required, found = titles.len(), "not enough product titles");
                Err(ProbeError::InsufficientProducts {
                    required,
                    found: titles.len(),
                })
            }
        }
    }

    /// Save a screenshot and page source under `prefix`
    pub async fn capture_debug_artifacts(&self, prefix: &str) -> ArtifactPaths {
        self.artifacts.capture(self.driver(), prefix).await
    }

    fn remember(&mut self, titles: Vec<String>) -> Vec<String> {
        self.last_collected = Some(titles.clone());
        titles
    }

    async fn lookup(&self, locator: &Locator) -> ProbeResult<Vec<ElementRef>> {
        match self.driver.find_elements(locator).await {
            Ok(found) => Ok(found),
            Err(e) if e.is_session_lost() => Err(e),
            Err(e) => {
                debug!(%locator, error = %e, "lookup failed");
                Ok(Vec::new())
            }
        }
    }

    async fn text_or_empty(&self, element: &ElementRef) -> String {
        self.driver.element_text(element).await.unwrap_or_default()
    }
}

impl PageObject for ProductPage {
    fn page_name(&self) -> &str {
        "products"
    }

    fn anchor(&self) -> Locator {
        PRODUCT_TITLE
    }

    fn driver(&self) -> &dyn MobileDriver {
        self.driver.as_ref()
    }

    fn default_wait(&self) -> WaitOptions {
        self.wait
    }
}

fn is_header(text: &str, headers: &[&str]) -> bool {
    let normalized = text.trim().to_lowercase();
    headers.contains(&normalized.as_str())
}

fn catalog_titles(visible: Vec<String>) -> Vec<String> {
    visible
        .into_iter()
        .filter(|t| !is_header(t, &CATALOG_HEADERS))
        .collect()
}

/// Append `visible` to `accumulated`, skipping the longest prefix of
/// `visible` that repeats the tail of `accumulated`. Returns how many titles
/// were appended.
fn merge_viewport(accumulated: &mut Vec<String>, visible: &[String]) -> usize {
    let max_overlap = accumulated.len().min(visible.len());
    let overlap = (0..=max_overlap)
        .rev()
        .find(|&k| accumulated[accumulated.len() - k..] == visible[..k])
        .unwrap_or(0);
    accumulated.extend_from_slice(&visible[overlap..]);
    visible.len() - overlap
}
