use anyhow::Result;
use tracing::info;

use crate::commands::utils::PageArgs;
use formaid::config::Config;
use formaid::interpreter::Interpreter;
use formaid::types::OutputFormat;

pub async fn handle_scan(page: PageArgs, format: OutputFormat, config: &Config) -> Result<()> {
    let snapshot = page.load(config).await?;
    let html = snapshot.parse();
    let fields = Interpreter::new(config.panel_id.clone()).scan(&html);
    info!("Found {} fields on {}", fields.len(), snapshot.url);

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&fields)?),
        OutputFormat::Simple => {
            for (i, field) in fields.iter().enumerate() {
                let query = &field.query;
                if query.options.is_empty() {
                    println!("[{}] {} ({})", i, query.question, query.kind);
                } else {
                    println!(
                        "[{}] {} ({}): {}",
                        i,
                        query.question,
                        query.kind,
                        query.joined_option_labels()
                    );
                }
            }
        }
    }

    Ok(())
}
