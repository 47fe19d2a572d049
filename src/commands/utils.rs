use anyhow::Result;
use clap::Args;
use std::sync::Arc;

use formaid::config::Config;
use formaid::guidance::GuidanceBackend;
use formaid::panel::PanelView;
use formaid::snapshot::{BrowserType, Snapshot, SnapshotSource};
use formaid::types::OutputFormat;

/// Where the page comes from
#[derive(Args, Clone, Debug)]
pub struct PageArgs {
    /// Page to read: a saved HTML file or an http(s) URL
    pub target: String,

    /// Capture the page from a live browser over WebDriver
    #[arg(long)]
    pub live: bool,

    /// Browser to use with --live
    #[arg(short, long, default_value = "firefox")]
    pub browser: BrowserType,

    /// WebDriver endpoint (defaults to the browser's usual port)
    #[arg(long)]
    pub webdriver_url: Option<String>,

    /// Run browser in visible mode (disables headless)
    #[arg(long = "no-headless")]
    pub no_headless: bool,
}

impl PageArgs {
    pub fn source(&self) -> SnapshotSource {
        if self.live {
            SnapshotSource::Live {
                url: self.target.clone(),
                browser: self.browser,
                webdriver_url: self.webdriver_url.clone(),
                headless: !self.no_headless,
            }
        } else {
            SnapshotSource::from_target(&self.target)
        }
    }

    pub async fn load(&self, config: &Config) -> Result<Snapshot> {
        Snapshot::load(&self.source(), config.timeout()).await
    }
}

/// The configured backend as a trait object
pub fn backend(config: &Config) -> Result<Option<Arc<dyn GuidanceBackend>>> {
    Ok(config
        .client()?
        .map(|client| Arc::new(client) as Arc<dyn GuidanceBackend>))
}

pub fn print_view(view: &PanelView, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(view)?),
        OutputFormat::Simple => println!("{}", view),
    }
    Ok(())
}
