use anyhow::Result;
use serde_json::json;
use tracing::info;

use crate::commands::utils::PageArgs;
use formaid::chat::{ChatEntry, ChatRequest, ChatStore, PageContext, Role, transcript_key};
use formaid::config::Config;
use formaid::guidance::{GuidanceBackend, GuidanceError};
use formaid::interpreter::Interpreter;
use formaid::types::OutputFormat;

pub async fn handle_chat(
    page: PageArgs,
    message: String,
    format: OutputFormat,
    config: &Config,
) -> Result<()> {
    let client = config.client()?.ok_or(GuidanceError::NotConfigured)?;

    let snapshot = page.load(config).await?;
    let page_context = {
        let html = snapshot.parse();
        PageContext::from_snapshot(&html, &snapshot.url, &Interpreter::new(config.panel_id.clone()))
    };

    let store = ChatStore::new()?;
    let mut transcript = store.open(&transcript_key(&snapshot.url))?;

    let request = ChatRequest {
        message: message.clone(),
        page_context,
        chat_history: transcript.context(),
    };
    transcript.push(ChatEntry::new(Role::User, message))?;

    info!(
        "Sending chat message with {} history entries",
        request.chat_history.len()
    );
    let reply = client.chat(&request).await?;
    transcript.push(ChatEntry::new(Role::Assistant, reply.response.clone()))?;

    match format {
        OutputFormat::Json => {
            let output = json!({
                "host": transcript.host(),
                "response": reply.response,
                "timestamp": reply.timestamp,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Simple => println!("{}", reply.response),
    }

    Ok(())
}
