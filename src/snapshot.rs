//! Page snapshots: the markup the interpreter reads
//!
//! A snapshot comes from a saved file, a plain HTTP fetch, or a live page
//! driven over WebDriver. Live snapshots copy each control's current state
//! (checked, selected, typed value) into its attributes before the markup is
//! captured, so interpretation sees what the user sees.

use anyhow::{Context, Result};
use fantoccini::ClientBuilder;
use scraper::{Html, Selector};
use serde_json::json;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, info};

use crate::interpreter::Interpreter;
use crate::types::FieldDescriptor;

/// Supported browser types for live snapshots
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum BrowserType {
    Firefox,
    Chrome,
}

impl BrowserType {
    pub fn default_webdriver_url(&self) -> &'static str {
        match self {
            BrowserType::Firefox => "http://localhost:4444",
            BrowserType::Chrome => "http://localhost:9515",
        }
    }
}

/// Where to read a page from
#[derive(Debug, Clone, PartialEq)]
pub enum SnapshotSource {
    File(PathBuf),
    Url(String),
    Live {
        url: String,
        browser: BrowserType,
        webdriver_url: Option<String>,
        headless: bool,
    },
}

impl SnapshotSource {
    /// `http(s)://` targets are fetched, anything else is a file path
    pub fn from_target(target: &str) -> Self {
        if target.starts_with("http://") || target.starts_with("https://") {
            SnapshotSource::Url(target.to_string())
        } else {
            SnapshotSource::File(PathBuf::from(target))
        }
    }
}

const MIRROR_STATE_SCRIPT: &str = r#"
    document.querySelectorAll('input, select, textarea').forEach(function (el) {
        var type = (el.getAttribute('type') || '').toLowerCase();
        if (el.tagName === 'SELECT') {
            Array.prototype.forEach.call(el.options, function (o) {
                if (o.selected) { o.setAttribute('selected', ''); } else { o.removeAttribute('selected'); }
            });
        } else if (el.tagName === 'TEXTAREA') {
            el.textContent = el.value;
        } else if (type === 'checkbox' || type === 'radio') {
            if (el.checked) { el.setAttribute('checked', ''); } else { el.removeAttribute('checked'); }
        } else if (type !== 'password') {
            el.setAttribute('value', el.value);
        }
    });
    return true;
"#;

/// Markup of one page, plus where it came from
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub url: String,
    pub markup: String,
}

impl Snapshot {
    pub fn from_markup(url: impl Into<String>, markup: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            markup: markup.into(),
        }
    }

    pub async fn load(source: &SnapshotSource, timeout: Duration) -> Result<Self> {
        match source {
            SnapshotSource::File(path) => {
                let markup = tokio::fs::read_to_string(path)
                    .await
                    .with_context(|| format!("Failed to read page {}", path.display()))?;
                let url = std::fs::canonicalize(path)
                    .ok()
                    .and_then(|p| url::Url::from_file_path(p).ok())
                    .map(|u| u.to_string())
                    .unwrap_or_else(|| path.display().to_string());
                debug!("Read {} bytes from {}", markup.len(), path.display());
                Ok(Self { url, markup })
            }
            SnapshotSource::Url(url) => Self::fetch(url, timeout).await,
            SnapshotSource::Live {
                url,
                browser,
                webdriver_url,
                headless,
            } => {
                let webdriver_url = webdriver_url
                    .as_deref()
                    .unwrap_or_else(|| browser.default_webdriver_url());
                Self::capture_live(url, *browser, webdriver_url, *headless).await
            }
        }
    }

    async fn fetch(url: &str, timeout: Duration) -> Result<Self> {
        info!("Fetching {}", url);
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to create HTTP client")?;
        let response = client
            .get(url)
            .send()
            .await
            .with_context(|| format!("Failed to fetch {}", url))?
            .error_for_status()
            .with_context(|| format!("Failed to fetch {}", url))?;
        let final_url = response.url().to_string();
        let markup = response.text().await?;
        Ok(Self {
            url: final_url,
            markup,
        })
    }

    async fn capture_live(
        url: &str,
        browser: BrowserType,
        webdriver_url: &str,
        headless: bool,
    ) -> Result<Self> {
        info!("Connecting to {:?} WebDriver at {}", browser, webdriver_url);

        let mut caps = serde_json::Map::new();
        match browser {
            BrowserType::Firefox => {
                let args: Vec<&str> = if headless { vec!["-headless"] } else { vec![] };
                caps.insert("moz:firefoxOptions".to_string(), json!({ "args": args }));
            }
            BrowserType::Chrome => {
                let mut args = vec!["--disable-gpu", "--disable-dev-shm-usage"];
                if headless {
                    args.push("--headless=new");
                }
                caps.insert("goog:chromeOptions".to_string(), json!({ "args": args }));
            }
        }

        let client = ClientBuilder::rustls()
            .capabilities(caps)
            .connect(webdriver_url)
            .await
            .with_context(|| format!("Failed to connect to WebDriver at {}", webdriver_url))?;

        let captured = async {
            client.goto(url).await?;

            // Wait up to 2 seconds for the page to settle
            for _ in 0..20 {
                match client
                    .execute("return document.readyState === 'complete';", vec![])
                    .await
                {
                    Ok(ready) if ready.as_bool().unwrap_or(false) => break,
                    _ => tokio::time::sleep(Duration::from_millis(100)).await,
                }
            }

            client.execute(MIRROR_STATE_SCRIPT, vec![]).await?;
            let current = client.current_url().await?.to_string();
            let markup = client.source().await?;
            Ok::<_, fantoccini::error::CmdError>(Self {
                url: current,
                markup,
            })
        }
        .await;

        if let Err(e) = client.close().await {
            debug!("Note: could not close WebDriver session: {}", e);
        }
        captured.with_context(|| format!("Failed to capture {}", url))
    }

    pub fn parse(&self) -> Html {
        Html::parse_document(&self.markup)
    }
}

/// Find the eligible control a selector points at.
///
/// Labels resolve to the control they are bound to, so `label[for=x]`
/// works as well as `#x`.
pub fn find_control<'a>(
    html: &'a Html,
    interpreter: &Interpreter,
    selector: &str,
) -> Result<FieldDescriptor<'a>> {
    let parsed = Selector::parse(selector)
        .map_err(|e| anyhow::anyhow!("Invalid CSS selector '{}': {:?}", selector, e))?;

    html.select(&parsed)
        .find_map(|el| interpreter.resolve_target(html, el))
        .and_then(|control| interpreter.describe(control))
        .ok_or_else(|| anyhow::anyhow!("No form control found matching selector: {}", selector))
}
