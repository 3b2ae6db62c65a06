use anyhow::Result;
use headless_chrome::browser::tab::NoElementFound;
use headless_chrome::protocol::cdp::Page::AddScriptToEvaluateOnNewDocument;
use headless_chrome::{Browser, LaunchOptions, Tab};
use once_cell::sync::Lazy;
use serde::Deserialize;
use std::ffi::OsStr;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

static USER_AGENTS: Lazy<Vec<&'static str>> = Lazy::new(|| {
    vec![
        "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/122.0.0.0 Safari/537.36",
        "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/123.0.0.0 Safari/537.36",
        "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/123.0.0.0 Safari/537.36",
        "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Edge/123.0.0.0 Safari/537.36",
    ]
});

const STEALTH_SCRIPT: &str = r#"
    Object.defineProperty(navigator, 'webdriver', { get: () => undefined });
    Object.defineProperty(navigator, 'hardwareConcurrency', { get: () => 4 });
    window.chrome = { runtime: {}, loadTimes: function() {}, csi: function() {}, app: {} };
"#;

/// What the harvester and the extractor need from a browser.
///
/// Absence of an element is not an error: `activate` reports it as `Ok(false)`.
pub trait PageDriver {
    /// Navigates to `url`, waits for the load to finish and returns the rendered HTML.
    fn open(&self, url: &str) -> Result<String>;

    /// Rendered HTML of the current page.
    fn content(&self) -> Result<String>;

    /// Clicks the first element matching `selector`. `Ok(false)` when nothing
    /// matches; other browser failures are errors.
    fn activate(&self, selector: &str) -> Result<bool>;
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct BrowserOptions {
    pub headless: bool,
    /// Fixed user agent; a random one from the built-in list otherwise.
    pub user_agent: Option<String>,
    /// Chrome is shut down after this long without a command.
    pub idle_timeout_secs: u64,
}

impl Default for BrowserOptions {
    fn default() -> Self {
        Self {
            headless: true,
            user_agent: None,
            idle_timeout_secs: 120,
        }
    }
}

impl BrowserOptions {
    fn pick_user_agent(&self) -> String {
        use rand::seq::SliceRandom;
        match &self.user_agent {
            Some(ua) => ua.clone(),
            None => USER_AGENTS
                .choose(&mut rand::thread_rng())
                .copied()
                .unwrap_or(USER_AGENTS[0])
                .to_string(),
        }
    }
}

/// The one Chrome instance of a run. Chrome is killed when this is dropped.
pub struct BrowserSession {
    tab: Arc<Tab>,
    _browser: Browser,
}

impl BrowserSession {
    pub fn launch(options: &BrowserOptions) -> Result<Self> {
        let user_agent = options.pick_user_agent();
        info!(%user_agent, headless = options.headless, "🚀 Launching Chrome");

        let ua_arg = format!("--user-agent={}", user_agent);
        let args = vec![
            OsStr::new("--disable-blink-features=AutomationControlled"),
            OsStr::new("--no-sandbox"),
            OsStr::new("--disable-dev-shm-usage"),
            OsStr::new("--disable-gpu"),
            OsStr::new("--disable-infobars"),
            OsStr::new(&ua_arg),
        ];

        let browser = Browser::new(LaunchOptions {
            headless: options.headless,
            window_size: Some((1920, 1080)),
            idle_browser_timeout: Duration::from_secs(options.idle_timeout_secs),
            args,
            ..Default::default()
        })?;

        let tab = browser.new_tab()?;
        tab.call_method(AddScriptToEvaluateOnNewDocument {
            source: STEALTH_SCRIPT.to_string(),
            world_name: None,
            include_command_line_api: None,
            run_immediately: None,
        })?;

        info!("✅ Browser session ready");
        Ok(Self { tab, _browser: browser })
    }

    pub fn close(self) {
        info!("Closing browser session");
    }
}

impl PageDriver for BrowserSession {
    fn open(&self, url: &str) -> Result<String> {
        debug!(url, "navigating");
        self.tab.navigate_to(url)?;
        self.tab.wait_until_navigated()?;
        Ok(self.tab.get_content()?)
    }

    fn content(&self) -> Result<String> {
        Ok(self.tab.get_content()?)
    }

    fn activate(&self, selector: &str) -> Result<bool> {
        match self.tab.find_element(selector) {
            Ok(element) => {
                element.click()?;
                Ok(true)
            }
            Err(e) if is_absent_element(&e) => Ok(false),
            Err(e) => Err(e),
        }
    }
}

fn is_absent_element(error: &anyhow::Error) -> bool {
    error.downcast_ref::<NoElementFound>().is_some()
}
