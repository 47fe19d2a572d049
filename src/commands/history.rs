use anyhow::Result;
use clap::Subcommand;

use formaid::chat::{ChatStore, Role};
use formaid::types::OutputFormat;

#[derive(Subcommand)]
pub enum HistoryCommands {
    /// List hosts with a stored chat transcript
    List {
        /// Output format
        #[arg(short, long, default_value = "simple")]
        format: OutputFormat,
    },

    /// Show the chat transcript for a host
    Show {
        /// Host name, or "local" for pages read from files
        host: String,

        /// Output format
        #[arg(short, long, default_value = "simple")]
        format: OutputFormat,
    },

    /// Delete the chat transcript for a host
    Clear {
        /// Host name, or "local" for pages read from files
        host: String,
    },
}

pub async fn handle_history(command: HistoryCommands) -> Result<()> {
    let store = ChatStore::new()?;

    match command {
        HistoryCommands::List { format } => {
            let hosts = store.hosts()?;
            match format {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&hosts)?),
                OutputFormat::Simple => {
                    if hosts.is_empty() {
                        println!("No chat history");
                    }
                    for host in hosts {
                        println!("{}", host);
                    }
                }
            }
        }
        HistoryCommands::Show { host, format } => {
            let transcript = store.open(&host)?;
            match format {
                OutputFormat::Json => {
                    println!("{}", serde_json::to_string_pretty(transcript.entries())?)
                }
                OutputFormat::Simple => {
                    for entry in transcript.entries() {
                        let who = match entry.role {
                            Role::User => "You",
                            Role::Assistant => "Assistant",
                        };
                        println!(
                            "[{}] {}: {}",
                            entry.timestamp.format("%Y-%m-%d %H:%M"),
                            who,
                            entry.content
                        );
                    }
                }
            }
        }
        HistoryCommands::Clear { host } => {
            if store.clear(&host)? {
                println!("Cleared chat history for {}", host);
            } else {
                println!("No chat history for {}", host);
            }
        }
    }

    Ok(())
}
