//! Locator abstraction for element selection on Android screens.
//!
//! A [`Locator`] pairs a lookup strategy ([`By`]) with a value. Page objects
//! declare their locators as associated constants, so the borrowed form is
//! `const`-constructible; computed locators (e.g. `UiSelector.instance(n)`)
//! carry an owned value.

use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt;

/// Element lookup strategy understood by Appium's UiAutomator2 driver
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum By {
    /// Android resource id (`package:id/name`)
    Id,
    /// Content description
    AccessibilityId,
    /// XPath over the page source hierarchy
    XPath,
    /// UiAutomator Java expression (`new UiSelector()...`)
    AndroidUiAutomator,
    /// Widget class name
    ClassName,
}

impl By {
    /// Strategy name sent in the `using` field of a find request
    #[must_use]
    pub const fn strategy(self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::AccessibilityId => "accessibility id",
            Self::XPath => "xpath",
            Self::AndroidUiAutomator => "-android uiautomator",
            Self::ClassName => "class name",
        }
    }
}

impl fmt::Display for By {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.strategy())
    }
}

/// A strategy plus value identifying one or more elements
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Locator {
    /// Lookup strategy
    pub by: By,
    /// Strategy specific value
    pub value: Cow<'static, str>,
}

impl Locator {
    /// Create a locator with an owned or borrowed value
    #[must_use]
    pub fn new(by: By, value: impl Into<Cow<'static, str>>) -> Self {
        Self {
            by,
            value: value.into(),
        }
    }

    /// Resource id locator
    #[must_use]
    pub const fn id(value: &'static str) -> Self {
        Self {
            by: By::Id,
            value: Cow::Borrowed(value),
        }
    }

    /// Accessibility id (content-desc) locator
    #[must_use]
    pub const fn accessibility_id(value: &'static str) -> Self {
        Self {
            by: By::AccessibilityId,
            value: Cow::Borrowed(value),
        }
    }

    /// XPath locator
    #[must_use]
    pub const fn xpath(value: &'static str) -> Self {
        Self {
            by: By::XPath,
            value: Cow::Borrowed(value),
        }
    }

    /// UiAutomator expression locator
    #[must_use]
    pub const fn ui_automator(value: &'static str) -> Self {
        Self {
            by: By::AndroidUiAutomator,
            value: Cow::Borrowed(value),
        }
    }

    /// Value as a string slice
    #[must_use]
    pub fn value(&self) -> &str {
        &self.value
    }

    /// `UiSelector` expression matching the same element.
    ///
    /// Resource ids map to `resourceId`, accessibility ids to `description`,
    /// class names to `className`; anything else is matched by visible text.
    /// A UiAutomator locator is returned unchanged.
    #[must_use]
    pub fn to_ui_selector(&self) -> String {
        let value = escape_java(&self.value);
        match self.by {
            By::Id => format!("new UiSelector().resourceId(\"{value}\")"),
            By::AccessibilityId => format!("new UiSelector().description(\"{value}\")"),
            By::ClassName => format!("new UiSelector().className(\"{value}\")"),
            By::AndroidUiAutomator => self.value.to_string(),
            By::XPath => format!("new UiSelector().text(\"{value}\")"),
        }
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.by, self.value)
    }
}

fn escape_java(s: &str) -> String {
    s.replace('\\', "\\\\").replace('"', "\\\"")
}
