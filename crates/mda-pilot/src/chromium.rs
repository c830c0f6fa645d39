//! Live browser locator over the Chrome `DevTools` Protocol.
//!
//! Compiled with the `browser` feature. The session owns a Tokio runtime
//! and blocks on each CDP call, so the page object stays synchronous.

#![allow(clippy::significant_drop_tightening)]

use std::sync::Arc;
use std::time::Duration;

use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::element::Element;
use chromiumoxide::error::CdpError;
use chromiumoxide::page::Page;
use futures::StreamExt;
use tokio::runtime::Runtime;

use crate::locator::{ElementLocator, Selector, UiElement};
use crate::result::{PilotError, PilotResult};

/// Browser launch settings
#[derive(Debug, Clone)]
pub struct ChromiumSettings {
    /// Run without a window
    pub headless: bool,
    /// Sandbox mode (disable for containers)
    pub sandbox: bool,
    /// Path to chromium binary (None = auto-detect)
    pub chromium_path: Option<String>,
    /// Timeout for each CDP request
    pub request_timeout_ms: u64,
}

impl Default for ChromiumSettings {
    fn default() -> Self {
        Self {
            headless: true,
            sandbox: true,
            chromium_path: None,
            request_timeout_ms: 30_000,
        }
    }
}

impl ChromiumSettings {
    /// Set headless mode
    #[must_use]
    pub const fn with_headless(mut self, headless: bool) -> Self {
        self.headless = headless;
        self
    }

    /// Disable sandbox (for containers/CI)
    #[must_use]
    pub const fn with_no_sandbox(mut self) -> Self {
        self.sandbox = false;
        self
    }

    /// Set chromium path
    #[must_use]
    pub fn with_chromium_path(mut self, path: impl Into<String>) -> Self {
        self.chromium_path = Some(path.into());
        self
    }
}

/// Chrome's wording when a node id no longer resolves
const DETACHED_NODE_MESSAGES: [&str; 2] = ["no node with given id", "could not find node"];

fn map_cdp(err: CdpError, timeout_ms: u64) -> PilotError {
    match err {
        CdpError::Timeout => PilotError::Timeout { ms: timeout_ms },
        other => driver_error(other.to_string()),
    }
}

/// Detached-node failures are stale handles; everything else is a driver fault
fn driver_error(message: String) -> PilotError {
    let lowered = message.to_lowercase();
    if DETACHED_NODE_MESSAGES
        .iter()
        .any(|needle| lowered.contains(needle))
    {
        PilotError::StaleElement { message }
    } else {
        PilotError::driver(message)
    }
}

/// A launched browser with one page open
#[derive(Debug)]
pub struct ChromiumSession {
    runtime: Arc<Runtime>,
    browser: Browser,
    handler: tokio::task::JoinHandle<()>,
    page: Page,
    timeout_ms: u64,
}

impl ChromiumSession {
    /// Launch a browser and open `url`
    pub fn launch(settings: &ChromiumSettings, url: &str) -> PilotResult<Self> {
        let runtime = Runtime::new()?;
        let timeout_ms = settings.request_timeout_ms;

        let mut builder = BrowserConfig::builder()
            .request_timeout(Duration::from_millis(timeout_ms));
        if !settings.headless {
            builder = builder.with_head();
        }
        if !settings.sandbox {
            builder = builder.no_sandbox();
        }
        if let Some(ref path) = settings.chromium_path {
            builder = builder.chrome_executable(path);
        }
        let config = builder.build().map_err(PilotError::driver)?;

        let (browser, mut handler) = runtime
            .block_on(Browser::launch(config))
            .map_err(|e| map_cdp(e, timeout_ms))?;
        let handler = runtime.spawn(async move {
            while let Some(event) = handler.next().await {
                if event.is_err() {
                    break;
                }
            }
        });

        let page = runtime
            .block_on(browser.new_page(url))
            .map_err(|e| map_cdp(e, timeout_ms))?;
        tracing::info!(event = "mda.browser.page_opened", url = url);

        Ok(Self {
            runtime: Arc::new(runtime),
            browser,
            handler,
            page,
            timeout_ms,
        })
    }

    /// Locator over the open page
    #[must_use]
    pub fn locator(&self) -> ChromiumLocator {
        ChromiumLocator {
            runtime: self.runtime.clone(),
            page: self.page.clone(),
            timeout_ms: self.timeout_ms,
        }
    }

    /// Close the browser and stop its event handler
    pub fn close(mut self) -> PilotResult<()> {
        let timeout_ms = self.timeout_ms;
        self.runtime
            .block_on(self.browser.close())
            .map_err(|e| map_cdp(e, timeout_ms))?;
        self.handler.abort();
        Ok(())
    }
}

/// Page-level queries against a live page
#[derive(Debug, Clone)]
pub struct ChromiumLocator {
    runtime: Arc<Runtime>,
    page: Page,
    timeout_ms: u64,
}

impl ChromiumLocator {
    fn wrap(&self, elements: Vec<Element>) -> Vec<ChromiumElement> {
        elements
            .into_iter()
            .map(|element| ChromiumElement {
                runtime: self.runtime.clone(),
                element,
                timeout_ms: self.timeout_ms,
            })
            .collect()
    }
}

impl ElementLocator for ChromiumLocator {
    type Element = ChromiumElement;

    fn find_all(&self, selector: &Selector) -> PilotResult<Vec<ChromiumElement>> {
        let found = match selector {
            Selector::XPath(expr) => self.runtime.block_on(self.page.find_xpaths(expr.as_str())),
            Selector::Css(css) | Selector::TagName(css) => {
                self.runtime.block_on(self.page.find_elements(css.as_str()))
            }
        };
        match found {
            Ok(elements) => Ok(self.wrap(elements)),
            // CDP reports an empty match as "not found"
            Err(CdpError::NotFound) => Ok(Vec::new()),
            Err(e) => Err(map_cdp(e, self.timeout_ms)),
        }
    }
}

/// An element of a live page
#[derive(Debug)]
pub struct ChromiumElement {
    runtime: Arc<Runtime>,
    element: Element,
    timeout_ms: u64,
}

impl UiElement for ChromiumElement {
    fn text(&self) -> PilotResult<String> {
        self.runtime
            .block_on(self.element.inner_text())
            .map(Option::unwrap_or_default)
            .map_err(|e| map_cdp(e, self.timeout_ms))
    }

    fn attribute(&self, name: &str) -> PilotResult<Option<String>> {
        self.runtime
            .block_on(self.element.attribute(name))
            .map_err(|e| map_cdp(e, self.timeout_ms))
    }

    fn click(&self) -> PilotResult<()> {
        self.runtime
            .block_on(self.element.click())
            .map(|_| ())
            .map_err(|e| map_cdp(e, self.timeout_ms))
    }

    fn find_all(&self, selector: &Selector) -> PilotResult<Vec<Self>> {
        let Some(css) = selector.as_css() else {
            return Err(PilotError::UnsupportedSelector {
                selector: selector.to_string(),
            });
        };
        match self.runtime.block_on(self.element.find_elements(css)) {
            Ok(elements) => Ok(elements
                .into_iter()
                .map(|element| Self {
                    runtime: self.runtime.clone(),
                    element,
                    timeout_ms: self.timeout_ms,
                })
                .collect()),
            Err(CdpError::NotFound) => Ok(Vec::new()),
            Err(e) => Err(map_cdp(e, self.timeout_ms)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod settings_tests {
        use super::*;

        #[test]
        fn test_defaults() {
            let settings = ChromiumSettings::default();
            assert!(settings.headless);
            assert!(settings.sandbox);
            assert_eq!(settings.request_timeout_ms, 30_000);
        }

        #[test]
        fn test_builders() {
            let settings = ChromiumSettings::default()
                .with_headless(false)
                .with_no_sandbox()
                .with_chromium_path("/usr/bin/chromium");
            assert!(!settings.headless);
            assert!(!settings.sandbox);
            assert_eq!(settings.chromium_path.as_deref(), Some("/usr/bin/chromium"));
        }

        #[test]
        fn test_timeout_maps_to_timeout() {
            assert!(matches!(
                map_cdp(CdpError::Timeout, 250),
                PilotError::Timeout { ms: 250 }
            ));
            assert!(!map_cdp(CdpError::NotFound, 250).is_transient());
        }
    }

    mod error_mapping_tests {
        use super::*;

        #[test]
        fn test_detached_node_is_stale() {
            let err = driver_error("-32000: No node with given id found".to_string());
            assert!(matches!(err, PilotError::StaleElement { .. }));
            assert!(err.is_transient());

            let err = driver_error("Could not find node with given id".to_string());
            assert!(matches!(err, PilotError::StaleElement { .. }));
        }

        #[test]
        fn test_other_messages_stay_driver_errors() {
            let err = driver_error("Target closed".to_string());
            assert!(matches!(err, PilotError::Driver { .. }));
            assert!(!err.is_transient());
        }
    }
}
