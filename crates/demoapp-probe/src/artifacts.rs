//! Diagnostic artifact capture.
//!
//! On failure, page objects dump a screenshot and the page source into the
//! artifacts directory as `<prefix>_<unix-ts>.png` / `.xml`. Capture never
//! fails the caller: every problem is logged and the original error stays the
//! one reported.

use crate::driver::MobileDriver;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, error, warn};

/// Default artifacts directory, relative to the working directory
pub const DEFAULT_ARTIFACTS_DIR: &str = "artifacts";

/// Files written by one capture
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArtifactPaths {
    /// Screenshot path, if written
    pub screenshot: Option<PathBuf>,
    /// Page source path, if written
    pub page_source: Option<PathBuf>,
}

impl ArtifactPaths {
    /// Whether nothing was written
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.screenshot.is_none() && self.page_source.is_none()
    }
}

/// Writes screenshots and page sources into a directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactCapture {
    dir: PathBuf,
}

impl Default for ArtifactCapture {
    fn default() -> Self {
        Self::new(DEFAULT_ARTIFACTS_DIR)
    }
}

impl ArtifactCapture {
    /// Capture into `dir`
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Target directory
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Save screenshot and page source with the given file prefix
    pub async fn capture(&self, driver: &dyn MobileDriver, prefix: &str) -> ArtifactPaths {
        let mut paths = ArtifactPaths::default();
        if let Err(e) = fs::create_dir_all(&self.dir) {
            error!(dir = %self.dir.display(), error = %e, "could not create artifacts directory");
            return paths;
        }

        let ts = chrono::Utc::now().timestamp();
        let png_path = self.dir.join(format!("{prefix}_{ts}.png"));
        let xml_path = self.dir.join(format!("{prefix}_{ts}.xml"));

        match driver.screenshot_png().await {
            Ok(png) if png.is_empty() => {
                warn!(path = %png_path.display(), "driver returned an empty screenshot");
            }
            Ok(png) => match fs::write(&png_path, png) {
                Ok(()) => {
                    debug!(path = %png_path.display(), "screenshot saved");
                    paths.screenshot = Some(png_path);
                }
                Err(e) => error!(path = %png_path.display(), error = %e, "failed to write screenshot"),
            },
            Err(e) => error!(error = %e, "failed to take screenshot"),
        }

        let source = driver.page_source().await.unwrap_or_else(|e| {
            error!(error = %e, "failed to read page source");
            String::new()
        });
        if source.is_empty() {
            warn!(path = %xml_path.display(), "page source empty; not written");
        } else {
            match fs::write(&xml_path, source) {
                Ok(()) => {
                    debug!(path = %xml_path.display(), "page source saved");
                    paths.page_source = Some(xml_path);
                }
                Err(e) => {
                    error!(path = %xml_path.display(), error = %e, "failed to write page source");
                }
            }
        }
        paths
    }
}
