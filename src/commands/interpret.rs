use anyhow::Result;
use serde_json::json;
use tracing::info;

use crate::commands::utils::PageArgs;
use formaid::config::Config;
use formaid::interpreter::Interpreter;
use formaid::snapshot::find_control;
use formaid::types::OutputFormat;

pub async fn handle_interpret(
    page: PageArgs,
    selector: String,
    format: OutputFormat,
    config: &Config,
) -> Result<()> {
    info!("Interpreting {} on {}", selector, page.target);

    let snapshot = page.load(config).await?;
    let html = snapshot.parse();
    let interpreter = Interpreter::new(config.panel_id.clone());

    let field = find_control(&html, &interpreter, &selector)?;
    let query = interpreter.interpret_field(&html, &field);
    if query.is_empty() {
        anyhow::bail!("Could not interpret the field matching: {}", selector);
    }
    let key = interpreter.field_key(&field);

    match format {
        OutputFormat::Json => {
            let output = json!({
                "key": key,
                "question": query.question,
                "kind": query.kind,
                "options": query.options,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Simple => {
            println!("{} ({})", query.question, query.kind);
            for option in &query.options {
                let mark = if option.is_currently_selected { "x" } else { " " };
                println!("  [{}] {} = {}", mark, option.label, option.value);
            }
        }
    }

    Ok(())
}
