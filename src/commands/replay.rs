use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::{Instant, sleep_until};
use tracing::info;

use crate::commands::utils::{self, PageArgs};
use formaid::config::Config;
use formaid::interpreter::Interpreter;
use formaid::router::{Controller, DomEvent, RouterInput};
use formaid::session::Session;
use formaid::types::OutputFormat;

/// One scripted user action, `at_ms` after the replay starts
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ReplayStep {
    #[serde(default)]
    pub at_ms: u64,
    #[serde(flatten)]
    pub action: StepAction,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "action", rename_all = "kebab-case")]
pub enum StepAction {
    Focus { selector: String },
    Click { selector: String },
    /// Pick a clarification option, numbered from 1
    Select { option: usize },
    Close,
    /// Swap in new page markup
    Reload { file: String },
}

impl StepAction {
    fn into_input(self) -> Result<Option<RouterInput>> {
        Ok(match self {
            StepAction::Focus { selector } => Some(RouterInput::Event(DomEvent::focus(selector))),
            StepAction::Click { selector } => Some(RouterInput::Event(DomEvent::click(selector))),
            StepAction::Select { option } => option.checked_sub(1).map(RouterInput::SelectOption),
            StepAction::Close => Some(RouterInput::Close),
            StepAction::Reload { file } => {
                let markup = std::fs::read_to_string(&file)
                    .with_context(|| format!("Failed to read page {}", file))?;
                Some(RouterInput::Replace(markup))
            }
        })
    }
}

/// Read a script file; steps run in `at_ms` order
pub fn load_script(path: &Path) -> Result<Vec<ReplayStep>> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read script {}", path.display()))?;
    let mut steps: Vec<ReplayStep> = serde_json::from_str(&json)
        .with_context(|| format!("Invalid replay script {}", path.display()))?;
    steps.sort_by_key(|s| s.at_ms);
    Ok(steps)
}

pub async fn handle_replay(
    page: PageArgs,
    script: &Path,
    format: OutputFormat,
    config: &Config,
) -> Result<()> {
    let steps = load_script(script)?;
    let snapshot = page.load(config).await?;
    info!("Replaying {} steps on {}", steps.len(), snapshot.url);

    let backend = utils::backend(config)?;
    let session = Session::new(config.mode, config.form_context.clone(), backend.is_some());
    let controller = Controller::new(
        snapshot.parse(),
        Interpreter::new(config.panel_id.clone()),
        session,
        backend,
        config.debounce(),
    );

    let (input_tx, input_rx) = mpsc::channel(32);
    let (view_tx, mut view_rx) = mpsc::channel(32);

    let feed = async move {
        let start = Instant::now();
        for step in steps {
            sleep_until(start + Duration::from_millis(step.at_ms)).await;
            if let Some(input) = step.action.into_input()?
                && input_tx.send(input).await.is_err()
            {
                break;
            }
        }
        Ok::<_, anyhow::Error>(())
    };

    let print = async move {
        let mut count = 0usize;
        while let Some(view) = view_rx.recv().await {
            match format {
                OutputFormat::Json => println!("{}", serde_json::to_string(&view)?),
                OutputFormat::Simple => println!("{}\n", view),
            }
            count += 1;
        }
        Ok::<_, anyhow::Error>(count)
    };

    let (_, fed, printed) = tokio::join!(controller.run(input_rx, view_tx), feed, print);
    fed?;
    info!("Replay finished with {} panel updates", printed?);
    Ok(())
}
