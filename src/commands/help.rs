use anyhow::Result;
use tracing::{info, warn};

use crate::commands::utils::{self, PageArgs};
use formaid::config::Config;
use formaid::guidance::GuidanceError;
use formaid::interpreter::Interpreter;
use formaid::panel::render;
use formaid::session::{Action, Session};
use formaid::snapshot::find_control;
use formaid::types::OutputFormat;

/// One focus cycle on a single field: interpret, ask, render
pub async fn handle_help(
    page: PageArgs,
    selector: String,
    select: Option<usize>,
    format: OutputFormat,
    config: &Config,
) -> Result<()> {
    let snapshot = page.load(config).await?;
    let html = snapshot.parse();
    let interpreter = Interpreter::new(config.panel_id.clone());

    let field = find_control(&html, &interpreter, &selector)?;
    let query = interpreter.interpret_field(&html, &field);
    if query.is_empty() {
        anyhow::bail!("Could not interpret the field matching: {}", selector);
    }
    let key = interpreter.field_key(&field);

    let backend = utils::backend(config)?;
    let mut session = Session::new(config.mode, config.form_context.clone(), backend.is_some());

    match session.begin(key, query) {
        Action::Request { ticket, request } => {
            let backend = backend.ok_or(GuidanceError::NotConfigured)?;
            info!("Asking for guidance on '{}'", request.field_label);
            let result = backend.form_help(&request).await;
            let failure = result.as_ref().err().cloned();
            session.complete(&ticket, result);
            if let Some(err) = failure {
                // stdout carries the JSON error object; the panel goes to stderr
                eprintln!("{}", render(session.state()));
                return Err(err.into());
            }
        }
        Action::Render => {}
        Action::Ignore => return Err(GuidanceError::NotConfigured.into()),
    }

    // Options are numbered from 1 on screen
    if let Some(number) = select
        && number
            .checked_sub(1)
            .and_then(|i| session.select_option(i))
            .is_none()
    {
        warn!("No clarification option {} to select", number);
    }

    utils::print_view(&render(session.state()), format)
}
